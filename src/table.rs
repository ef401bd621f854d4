//! Observation table.
//!
//! A small column-major table of named columns. Rows are addressed by their
//! zero-based position; every column has the same length.
//!
//! Group membership is decided by *labels*: a text cell is its own label, a
//! numeric cell is rendered with its shortest `Display` form (`1.0` → `"1"`,
//! `-0.0` → `"0"`). NaN cannot form a group and is rejected when partitioning.
//!
//! # Examples
//!
//! ```
//! use u_abtest::table::{Column, ObservationTable};
//!
//! let table = ObservationTable::new()
//!     .with_column("group", Column::text(["control", "main", "control"]))?
//!     .with_column("converted", Column::Numeric(vec![0.0, 1.0, 1.0]))?;
//!
//! assert_eq!(table.row_count(), 3);
//! let parts = table.partition("group")?;
//! assert_eq!(parts[0].label, "control");
//! assert_eq!(parts[0].rows, vec![0, 2]);
//! # Ok::<(), u_abtest::AbTestError>(())
//! ```

use std::borrow::Cow;
use std::collections::HashMap;

use crate::error::{AbTestError, Result};

/// A single named column of values.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Categorical values: group labels, ISO dates, attributes.
    Text(Vec<String>),
    /// Numeric values: binary targets, amounts, numeric categories.
    Numeric(Vec<f64>),
}

impl Column {
    /// Builds a text column from anything string-like.
    pub fn text<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Column::Text(values.into_iter().map(Into::into).collect())
    }

    /// Number of values in the column.
    pub fn len(&self) -> usize {
        match self {
            Column::Text(v) => v.len(),
            Column::Numeric(v) => v.len(),
        }
    }

    /// Returns `true` if the column holds no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Label of the value at `row`, or `None` if out of range.
    pub fn label(&self, row: usize) -> Option<Cow<'_, str>> {
        match self {
            Column::Text(v) => v.get(row).map(|s| Cow::Borrowed(s.as_str())),
            Column::Numeric(v) => v.get(row).map(|&x| Cow::Owned(numeric_label(x))),
        }
    }

    /// Labels of every value, in row order.
    pub fn labels(&self) -> Vec<Cow<'_, str>> {
        match self {
            Column::Text(v) => v.iter().map(|s| Cow::Borrowed(s.as_str())).collect(),
            Column::Numeric(v) => v.iter().map(|&x| Cow::Owned(numeric_label(x))).collect(),
        }
    }

    /// Labels for grouping: as [`labels`](Self::labels), but NaN cells are
    /// rejected since NaN equals no value, itself included.
    fn group_labels(&self, name: &str) -> Result<Vec<Cow<'_, str>>> {
        if let Column::Numeric(v) = self {
            if let Some(row) = v.iter().position(|x| x.is_nan()) {
                return Err(AbTestError::NonFiniteValue {
                    column: name.to_string(),
                    row,
                });
            }
        }
        Ok(self.labels())
    }
}

/// `-0.0` shares the label of `0.0`, as the two compare equal.
fn numeric_label(x: f64) -> String {
    if x == 0.0 {
        "0".to_string()
    } else {
        format!("{x}")
    }
}

/// Rows sharing one label of a partitioning column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    /// The shared label.
    pub label: String,
    /// Row indices in ascending order.
    pub rows: Vec<usize>,
}

/// An immutable-by-convention table of equally long named columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationTable {
    names: Vec<String>,
    columns: Vec<Column>,
    row_count: usize,
}

impl ObservationTable {
    /// Creates an empty table with no columns and no rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a column and returns the table, for chained construction.
    ///
    /// # Errors
    ///
    /// See [`add_column`](Self::add_column).
    pub fn with_column(mut self, name: impl Into<String>, column: Column) -> Result<Self> {
        self.add_column(name, column)?;
        Ok(self)
    }

    /// Adds a column.
    ///
    /// The first column fixes the row count.
    ///
    /// # Errors
    ///
    /// - [`AbTestError::DuplicateColumn`] if the name is taken
    /// - [`AbTestError::LengthMismatch`] if the length differs from the row count
    pub fn add_column(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        let name = name.into();
        if self.names.iter().any(|n| *n == name) {
            return Err(AbTestError::DuplicateColumn { name });
        }
        if self.columns.is_empty() {
            self.row_count = column.len();
        } else if column.len() != self.row_count {
            return Err(AbTestError::LengthMismatch {
                name,
                expected: self.row_count,
                actual: column.len(),
            });
        }
        self.names.push(name);
        self.columns.push(column);
        Ok(())
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Column names in insertion order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Returns `true` if a column with this name exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Looks up a column by name.
    ///
    /// # Errors
    ///
    /// [`AbTestError::ColumnNotFound`] if absent.
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| &self.columns[i])
            .ok_or_else(|| AbTestError::ColumnNotFound {
                name: name.to_string(),
            })
    }

    /// Looks up a numeric column by name.
    ///
    /// # Errors
    ///
    /// - [`AbTestError::ColumnNotFound`] if absent
    /// - [`AbTestError::ColumnTypeMismatch`] if the column holds text
    pub fn numeric(&self, name: &str) -> Result<&[f64]> {
        match self.column(name)? {
            Column::Numeric(v) => Ok(v.as_slice()),
            Column::Text(_) => Err(AbTestError::ColumnTypeMismatch {
                name: name.to_string(),
                expected: "numeric",
            }),
        }
    }

    /// Like [`numeric`](Self::numeric), additionally rejecting NaN and infinity.
    ///
    /// # Errors
    ///
    /// [`AbTestError::NonFiniteValue`] naming the first offending row.
    pub fn finite_numeric(&self, name: &str) -> Result<&[f64]> {
        let values = self.numeric(name)?;
        if let Some(row) = values.iter().position(|v| !v.is_finite()) {
            return Err(AbTestError::NonFiniteValue {
                column: name.to_string(),
                row,
            });
        }
        Ok(values)
    }

    /// Splits row indices by the labels of `column`.
    ///
    /// Partitions appear in order of each label's first occurrence.
    ///
    /// # Errors
    ///
    /// - [`AbTestError::ColumnNotFound`] if absent
    /// - [`AbTestError::NonFiniteValue`] if a numeric cell is NaN
    pub fn partition(&self, column: &str) -> Result<Vec<Partition>> {
        let labels = self.column(column)?.group_labels(column)?;

        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut partitions: Vec<Partition> = Vec::new();
        for (row, label) in labels.iter().enumerate() {
            let slot = *index.entry(&**label).or_insert_with(|| {
                partitions.push(Partition {
                    label: label.to_string(),
                    rows: Vec::new(),
                });
                partitions.len() - 1
            });
            partitions[slot].rows.push(row);
        }

        tracing::debug!(
            column,
            rows = self.row_count,
            groups = partitions.len(),
            "partitioned table"
        );
        Ok(partitions)
    }

    /// Row indices whose label in `column` equals `label`.
    ///
    /// # Errors
    ///
    /// As [`partition`](Self::partition).
    pub fn rows_where(&self, column: &str, label: &str) -> Result<Vec<usize>> {
        let labels = self.column(column)?.group_labels(column)?;
        Ok(labels
            .iter()
            .enumerate()
            .filter_map(|(row, l)| (l == label).then_some(row))
            .collect())
    }
}
