//! Chart data types and the drawing surface trait.

use std::cmp::Ordering;

use serde::Serialize;

/// A value on the horizontal axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum XValue {
    /// Numeric position (e.g. a day index or timestamp).
    Numeric(f64),
    /// Text position (e.g. an ISO date), ordered lexicographically.
    Text(String),
}

impl XValue {
    /// Axis ordering: numbers before text, numbers by value, text by bytes.
    pub fn axis_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (XValue::Numeric(a), XValue::Numeric(b)) => a.total_cmp(b),
            (XValue::Text(a), XValue::Text(b)) => a.cmp(b),
            (XValue::Numeric(_), XValue::Text(_)) => Ordering::Less,
            (XValue::Text(_), XValue::Numeric(_)) => Ordering::Greater,
        }
    }
}

/// One point of a line: the mean target at an x position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinePoint {
    /// Horizontal position.
    pub x: XValue,
    /// Mean of the target over the rows at `x`.
    pub y: f64,
    /// Rows averaged into `y`.
    pub count: usize,
}

/// One line of the chart, for a single composite key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSeries {
    /// Composite key identifying the line.
    pub key: String,
    /// Points sorted by `x`.
    pub points: Vec<LinePoint>,
}

/// Full description of a category line chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineChart {
    /// Chart title.
    pub title: String,
    /// Horizontal axis label.
    pub x_label: String,
    /// Vertical axis label.
    pub y_label: String,
    /// Name of the composite key, the category columns joined with `_`.
    pub hue: String,
    /// One line per distinct key, in order of first occurrence.
    pub series: Vec<LineSeries>,
}

impl LineChart {
    /// Draws the chart: title, axis labels, then every line in order.
    pub fn render<S: PlotSurface + ?Sized>(&self, surface: &mut S) {
        surface.set_title(&self.title);
        surface.set_axis_labels(&self.x_label, &self.y_label);
        for line in &self.series {
            surface.draw_line(line);
        }
    }

    /// Looks up a line by its key.
    pub fn series(&self, key: &str) -> Option<&LineSeries> {
        self.series.iter().find(|s| s.key == key)
    }
}

/// A drawing context that line charts render onto.
///
/// Implement this for a plotting backend; the chart never touches global
/// figure state.
pub trait PlotSurface {
    /// Sets the chart title.
    fn set_title(&mut self, title: &str);

    /// Sets the horizontal and vertical axis labels.
    fn set_axis_labels(&mut self, x: &str, y: &str);

    /// Draws one line.
    fn draw_line(&mut self, series: &LineSeries);
}

/// A [`PlotSurface`] that records what was drawn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingSurface {
    /// Last title set.
    pub title: Option<String>,
    /// Last axis labels set, as (x, y).
    pub axis_labels: Option<(String, String)>,
    /// Lines drawn, in call order.
    pub lines: Vec<LineSeries>,
}

impl RecordingSurface {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PlotSurface for RecordingSurface {
    fn set_title(&mut self, title: &str) {
        self.title = Some(title.to_string());
    }

    fn set_axis_labels(&mut self, x: &str, y: &str) {
        self.axis_labels = Some((x.to_string(), y.to_string()));
    }

    fn draw_line(&mut self, series: &LineSeries) {
        self.lines.push(series.clone());
    }
}
