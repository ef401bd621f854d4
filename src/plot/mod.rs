//! Category line charts.
//!
//! Builds time-series line charts of a target column with one line per
//! combination of category values, and renders them onto a caller-supplied
//! [`PlotSurface`]. The chart data is returned as well, so callers and tests
//! can inspect exactly what was drawn.
//!
//! # Pipeline
//!
//! 1. [`composite_key`] joins the labels of several category columns with `_`
//!    (`["web", "US"]` → `"web_US"`).
//! 2. [`build_category_chart`] groups rows by that key, averages the target
//!    over repeated `date` values, and sorts each line by date.
//! 3. [`line_plot_by_categories`] renders the chart onto the surface.

mod category;
mod chart;

pub use category::{
    build_category_chart, composite_key, line_plot_by_categories, with_composite_key, DATE_COLUMN,
};
pub use chart::{LineChart, LinePoint, LineSeries, PlotSurface, RecordingSurface, XValue};
