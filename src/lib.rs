//! # u-abtest
//!
//! A/B test analysis over an in-memory observation table: per-group
//! conversion statistics, a two-proportion z-test with confidence
//! intervals, and time-series line charts faceted by category.
//!
//! Every function is a pure, synchronous computation over an immutable
//! table. Loading data and rendering pixels are left to the caller.
//!
//! ## Modules
//!
//! - [`table`] — Column-major observation table, partitioning by label
//! - [`aggregate`] — Count, sum, conversion rate, population deviation and standard error per group
//! - [`significance`] — Pooled two-proportion z-test, Wald and Wilson intervals, text report
//! - [`plot`] — Composite category keys, line-chart data, drawing-surface trait
//! - [`error`] — Error types
//!
//! ## Quick Start
//!
//! ```
//! use u_abtest::aggregate::{compute_group_stats, GroupStatsReport};
//! use u_abtest::significance::test_proportion_difference;
//! use u_abtest::table::{Column, ObservationTable};
//!
//! let table = ObservationTable::new()
//!     .with_column("group", Column::text(["control", "main", "control", "main", "main"]))?
//!     .with_column("converted", Column::Numeric(vec![0.0, 1.0, 1.0, 1.0, 0.0]))?;
//!
//! let stats = compute_group_stats(&table, "group", "converted")?;
//! println!("{}", GroupStatsReport::new(&stats));
//!
//! let result = test_proportion_difference(&table, "group", "converted")?;
//! println!("{result}");
//! # Ok::<(), u_abtest::AbTestError>(())
//! ```
//!
//! ## Logging
//!
//! The crate emits `tracing` events at `debug` and `trace` level and never
//! installs a subscriber.

pub mod aggregate;
pub mod error;
pub mod plot;
pub mod significance;
pub mod table;

pub use error::{AbTestError, Result};
