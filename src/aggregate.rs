//! Per-group conversion statistics.
//!
//! Groups the rows of an [`ObservationTable`] by a label column and summarizes
//! a numeric target within each group.
//!
//! # Formulas
//!
//! For a group with target values x₁..xₙ:
//!
//! - target_count = Σxᵢ
//! - conversion_rate = target_count / n
//! - deviation σ = √(Σ(xᵢ - x̄)² / n)  (population, no Bessel correction)
//! - error = σ / √n
//!
//! # Examples
//!
//! ```
//! use u_abtest::aggregate::compute_group_stats;
//! use u_abtest::table::{Column, ObservationTable};
//!
//! let table = ObservationTable::new()
//!     .with_column("group", Column::text(["control", "control", "main", "main"]))?
//!     .with_column("converted", Column::Numeric(vec![0.0, 1.0, 1.0, 1.0]))?;
//!
//! let stats = compute_group_stats(&table, "group", "converted")?;
//! assert_eq!(stats[0].conversion_rate, 0.5);
//! assert_eq!(stats[1].deviation, 0.0);
//! # Ok::<(), u_abtest::AbTestError>(())
//! ```

use std::fmt;

use serde::Serialize;
use u_numflow::stats;

use crate::error::{AbTestError, Result};
use crate::table::ObservationTable;

/// Summary of the target column within one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStats {
    /// Group label.
    pub group: String,
    /// Rows in the group.
    pub total_count: usize,
    /// Sum of the target; the success count for binary targets.
    pub target_count: f64,
    /// target_count / total_count.
    pub conversion_rate: f64,
    /// Population standard deviation of the target.
    pub deviation: f64,
    /// Standard error of the mean, deviation / √total_count.
    pub error: f64,
}

impl GroupStats {
    /// Summarizes one group's target values.
    ///
    /// # Errors
    ///
    /// - [`AbTestError::DivisionByZero`] if `values` is empty
    /// - [`AbTestError::NumericOverflow`] if the sum or the spread of finite
    ///   values exceeds the `f64` range
    pub fn from_values(group: impl Into<String>, values: &[f64]) -> Result<Self> {
        let group = group.into();
        let n = values.len();
        if n == 0 {
            return Err(AbTestError::DivisionByZero { group });
        }
        let nf = n as f64;

        let target_count: f64 = values.iter().sum();
        let spread = (stats::population_variance(values), stats::mean(values));
        let (variance, mean) = match spread {
            (Some(v), Some(m)) if v.is_finite() && m.is_finite() && target_count.is_finite() => {
                (v, m)
            }
            _ => return Err(AbTestError::NumericOverflow { group }),
        };
        let deviation = variance.sqrt();

        tracing::trace!(group = %group, mean, "group spread");
        Ok(Self {
            group,
            total_count: n,
            target_count,
            conversion_rate: target_count / nf,
            deviation,
            error: deviation / nf.sqrt(),
        })
    }
}

/// Computes [`GroupStats`] for every distinct label of `group_column`.
///
/// Groups appear in order of first occurrence in the table.
///
/// # Errors
///
/// - [`AbTestError::ColumnNotFound`] if either column is absent
/// - [`AbTestError::ColumnTypeMismatch`] if the target column holds text
/// - [`AbTestError::NonFiniteValue`] if a target value is NaN or infinite
/// - [`AbTestError::DivisionByZero`] if a group is empty
/// - [`AbTestError::NumericOverflow`] if a group's sum or spread overflows
pub fn compute_group_stats(
    table: &ObservationTable,
    group_column: &str,
    target_column: &str,
) -> Result<Vec<GroupStats>> {
    let targets = table.finite_numeric(target_column)?;
    let partitions = table.partition(group_column)?;

    let mut buf = Vec::new();
    partitions
        .into_iter()
        .map(|part| {
            buf.clear();
            buf.extend(part.rows.iter().map(|&r| targets[r]));
            let g = GroupStats::from_values(part.label, &buf)?;
            tracing::trace!(
                group = %g.group,
                n = g.total_count,
                rate = g.conversion_rate,
                "group stats"
            );
            Ok(g)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Text table of group statistics.
///
/// Columns: `group`, `total_cnt`, `target_cnt`, `%conv_rate`, `deviation`,
/// `error`. Real-valued cells are printed with a fixed number of decimals
/// (5 by default).
#[derive(Debug, Clone)]
pub struct GroupStatsReport<'a> {
    stats: &'a [GroupStats],
    precision: usize,
}

impl<'a> GroupStatsReport<'a> {
    /// Creates a report with 5-decimal precision.
    pub fn new(stats: &'a [GroupStats]) -> Self {
        Self {
            stats,
            precision: 5,
        }
    }

    /// Sets the number of decimals for real-valued cells.
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }
}

impl fmt::Display for GroupStatsReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const HEADER: [&str; 6] = [
            "group",
            "total_cnt",
            "target_cnt",
            "%conv_rate",
            "deviation",
            "error",
        ];
        let p = self.precision;

        let rows: Vec<[String; 6]> = self
            .stats
            .iter()
            .map(|s| {
                [
                    s.group.clone(),
                    s.total_count.to_string(),
                    format!("{:.p$}", s.target_count),
                    format!("{:.p$}", s.conversion_rate),
                    format!("{:.p$}", s.deviation),
                    format!("{:.p$}", s.error),
                ]
            })
            .collect();

        let mut widths = HEADER.map(str::len);
        for row in &rows {
            for (w, cell) in widths.iter_mut().zip(row.iter()) {
                *w = (*w).max(cell.len());
            }
        }

        write!(f, "{:<w$}", HEADER[0], w = widths[0])?;
        for (h, &w) in HEADER.iter().zip(widths.iter()).skip(1) {
            write!(f, "  {h:>w$}")?;
        }
        writeln!(f)?;
        for row in &rows {
            write!(f, "{:<w$}", row[0], w = widths[0])?;
            for (cell, &w) in row.iter().zip(widths.iter()).skip(1) {
                write!(f, "  {cell:>w$}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
