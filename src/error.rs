//! Error types.
//!
//! Every fallible operation in this crate returns [`Result<T>`]. Each variant
//! is a precondition violation the caller fixes by supplying valid input;
//! nothing is retried and no NaN or infinity is returned in place of an error.

use thiserror::Error;

/// Errors raised by table construction, aggregation, testing and plotting.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AbTestError {
    #[error("column not found: {name}")]
    ColumnNotFound { name: String },

    #[error("column '{name}' has the wrong type: expected {expected}")]
    ColumnTypeMismatch { name: String, expected: &'static str },

    #[error("column '{name}' already exists")]
    DuplicateColumn { name: String },

    #[error("column '{name}' has {actual} rows, table has {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("insufficient data: group '{group}' has no rows")]
    InsufficientData { group: String },

    #[error("degenerate input: pooled proportion is {pooled}, z-statistic is undefined")]
    DegenerateInput { pooled: f64 },

    #[error("division by zero: group '{group}' is empty")]
    DivisionByZero { group: String },

    #[error("non-finite value in column '{column}' at row {row}")]
    NonFiniteValue { column: String, row: usize },

    #[error("numeric overflow summarizing group '{group}'")]
    NumericOverflow { group: String },

    #[error("non-binary target {value} in column '{column}' at row {row}")]
    NonBinaryTarget {
        column: String,
        row: usize,
        value: f64,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for A/B test operations.
pub type Result<T> = std::result::Result<T, AbTestError>;
