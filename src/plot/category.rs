//! Composite category keys and line-chart construction.

use std::collections::HashMap;

use super::chart::{LineChart, LinePoint, LineSeries, PlotSurface, XValue};
use crate::error::{AbTestError, Result};
use crate::table::{Column, ObservationTable};

/// Column used for the horizontal axis.
pub const DATE_COLUMN: &str = "date";

/// Joins the labels of `category_columns` with `_`, row by row.
///
/// # Errors
///
/// - [`AbTestError::InvalidConfig`] if `category_columns` is empty
/// - [`AbTestError::ColumnNotFound`] if a column is absent
///
/// # Examples
///
/// ```
/// use u_abtest::plot::composite_key;
/// use u_abtest::table::{Column, ObservationTable};
///
/// let t = ObservationTable::new()
///     .with_column("platform", Column::text(["web", "ios"]))?
///     .with_column("cohort", Column::Numeric(vec![1.0, 2.0]))?;
/// assert_eq!(composite_key(&t, &["platform", "cohort"])?, ["web_1", "ios_2"]);
/// # Ok::<(), u_abtest::AbTestError>(())
/// ```
pub fn composite_key(table: &ObservationTable, category_columns: &[&str]) -> Result<Vec<String>> {
    if category_columns.is_empty() {
        return Err(AbTestError::InvalidConfig(
            "at least one category column is required".to_string(),
        ));
    }
    let columns = category_columns
        .iter()
        .map(|name| table.column(name))
        .collect::<Result<Vec<_>>>()?;

    let labels: Vec<_> = columns.iter().map(|c| c.labels()).collect();
    Ok((0..table.row_count())
        .map(|row| {
            labels
                .iter()
                .map(|col| &*col[row])
                .collect::<Vec<_>>()
                .join("_")
        })
        .collect())
}

/// Returns a copy of `table` with the composite key as an extra text column
/// named `category_columns.join("_")`.
///
/// # Errors
///
/// As [`composite_key`], plus [`AbTestError::DuplicateColumn`] if the joined
/// name is already taken (always the case for a single category column).
pub fn with_composite_key(
    table: &ObservationTable,
    category_columns: &[&str],
) -> Result<ObservationTable> {
    let keys = composite_key(table, category_columns)?;
    let mut out = table.clone();
    out.add_column(category_columns.join("_"), Column::Text(keys))?;
    Ok(out)
}

/// Builds a line chart of `target_column` over [`DATE_COLUMN`], one line per
/// composite key of `category_columns`.
///
/// Rows sharing a key and a date are averaged into one point.
///
/// # Errors
///
/// - [`AbTestError::InvalidConfig`] if `category_columns` is empty
/// - [`AbTestError::ColumnNotFound`] if the date, target or a category
///   column is absent
/// - [`AbTestError::ColumnTypeMismatch`] / [`AbTestError::NonFiniteValue`]
///   if the target is not finite numeric
pub fn build_category_chart(
    table: &ObservationTable,
    category_columns: &[&str],
    target_column: &str,
) -> Result<LineChart> {
    let keys = composite_key(table, category_columns)?;
    let dates = table.column(DATE_COLUMN)?;
    let targets = table.finite_numeric(target_column)?;

    let date_labels = dates.labels();

    // per key, in first-occurrence order: date label -> slot, [(x, sum, count)]
    let mut series_index: HashMap<&str, usize> = HashMap::new();
    let mut acc: Vec<SeriesAcc<'_>> = Vec::new();
    for (row, key) in keys.iter().enumerate() {
        let slot = *series_index.entry(key.as_str()).or_insert_with(|| {
            acc.push(SeriesAcc {
                key: key.as_str(),
                point_index: HashMap::new(),
                points: Vec::new(),
            });
            acc.len() - 1
        });
        let series = &mut acc[slot];
        let label = &*date_labels[row];
        match series.point_index.get(label) {
            Some(&i) => {
                series.points[i].1 += targets[row];
                series.points[i].2 += 1;
            }
            None => {
                let x = match dates {
                    Column::Numeric(v) => XValue::Numeric(v[row]),
                    Column::Text(v) => XValue::Text(v[row].clone()),
                };
                series.point_index.insert(label, series.points.len());
                series.points.push((x, targets[row], 1));
            }
        }
    }

    let series: Vec<LineSeries> = acc
        .into_iter()
        .map(|SeriesAcc { key, points, .. }| {
            let mut points: Vec<LinePoint> = points
                .into_iter()
                .map(|(x, sum, count)| LinePoint {
                    x,
                    y: sum / count as f64,
                    count,
                })
                .collect();
            points.sort_by(|a, b| a.x.axis_cmp(&b.x));
            LineSeries {
                key: key.to_string(),
                points,
            }
        })
        .collect();

    tracing::debug!(
        target_column,
        lines = series.len(),
        rows = table.row_count(),
        "built category chart"
    );

    Ok(LineChart {
        title: format!("Dynamic of {target_column} conversion rate"),
        x_label: DATE_COLUMN.to_string(),
        y_label: target_column.to_string(),
        hue: category_columns.join("_"),
        series,
    })
}

/// Running sums of one line while rows are scanned.
struct SeriesAcc<'a> {
    key: &'a str,
    point_index: HashMap<&'a str, usize>,
    points: Vec<(XValue, f64, usize)>,
}

/// Builds the category chart and renders it onto `surface`.
///
/// Returns the chart that was drawn.
///
/// # Errors
///
/// See [`build_category_chart`]. Nothing is drawn on error.
///
/// # Examples
///
/// ```
/// use u_abtest::plot::{line_plot_by_categories, RecordingSurface};
/// use u_abtest::table::{Column, ObservationTable};
///
/// let t = ObservationTable::new()
///     .with_column("date", Column::text(["2024-01-01", "2024-01-01", "2024-01-02"]))?
///     .with_column("group", Column::text(["control", "main", "main"]))?
///     .with_column("converted", Column::Numeric(vec![0.0, 1.0, 0.0]))?;
///
/// let mut surface = RecordingSurface::new();
/// let chart = line_plot_by_categories(&t, &["group"], "converted", &mut surface)?;
/// assert_eq!(surface.lines.len(), 2);
/// assert_eq!(chart.series("main").map(|s| s.points.len()), Some(2));
/// # Ok::<(), u_abtest::AbTestError>(())
/// ```
pub fn line_plot_by_categories<S: PlotSurface + ?Sized>(
    table: &ObservationTable,
    category_columns: &[&str],
    target_column: &str,
    surface: &mut S,
) -> Result<LineChart> {
    let chart = build_category_chart(table, category_columns, target_column)?;
    chart.render(surface);
    Ok(chart)
}
