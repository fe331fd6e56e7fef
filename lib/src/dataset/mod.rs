//! Tabular datasets and the mutable handle pieces operate on.
//!
//! # Core Concepts
//!
//! - **Dataset**: An ordered table of named [`Column`]s that all hold the same
//!   number of rows, plus an optional [`History`] of the pieces that produced it.
//! - **Handle**: A [`DatasetHandle`] owns a dataset for the duration of one
//!   pipeline run; pieces mutate the dataset through it in place.
//!
//! # Example
//!
//! ```rust
//! use mungeflow::dataset::Dataset;
//!
//! let data = Dataset::new()
//!     .with_column("X", vec![1.0, 2.0, 3.0])
//!     .unwrap()
//!     .with_column("label", vec!["a", "b", "c"])
//!     .unwrap();
//!
//! assert_eq!(data.n_rows(), 3);
//! assert_eq!(data.column_names(), vec!["X", "label"]);
//! assert!(data.history().is_none());
//! ```

use crate::error::{MungeError, Result};
use crate::history::History;

mod column;
mod handle;

pub use self::column::{Column, ColumnData, ColumnType};
pub use self::handle::DatasetHandle;

/// Name under which the applied-piece history is exposed.
pub const HISTORY_PROPERTY: &str = "mungepieces";

/// An ordered table of named, row-aligned columns.
///
/// Column order is insertion order. Names are unique and every column holds
/// [`Dataset::n_rows`] values. The attached [`History`] is only ever written by
/// the pipeline orchestrator.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    history: Option<History>,
}

impl Dataset {
    /// Create an empty dataset with no columns and no history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dataset from columns, validating names and row counts.
    ///
    /// # Errors
    /// - [`MungeError::DuplicateColumn`] if two columns share a name
    /// - [`MungeError::LengthMismatch`] if row counts differ
    pub fn from_columns(columns: Vec<Column>) -> Result<Self> {
        let mut dataset = Self::new();
        for column in columns {
            if dataset.has_column(column.name()) {
                return Err(MungeError::DuplicateColumn(column.name().to_string()));
            }
            dataset.check_rows(column.len())?;
            dataset.columns.push(column);
        }
        Ok(dataset)
    }

    /// Append a new column (builder style).
    pub fn with_column(mut self, name: &str, data: impl Into<ColumnData>) -> Result<Self> {
        if self.has_column(name) {
            return Err(MungeError::DuplicateColumn(name.to_string()));
        }
        let data = data.into();
        self.check_rows(data.len())?;
        self.columns.push(Column::new(name, data));
        Ok(self)
    }

    /// Number of rows (0 for a dataset without columns).
    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    /// Number of columns.
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Column names in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Like [`Dataset::column`], failing with [`MungeError::ColumnNotFound`].
    pub fn require(&self, name: &str) -> Result<&Column> {
        self.column(name)
            .ok_or_else(|| MungeError::ColumnNotFound(name.to_string()))
    }

    /// Borrow a float column.
    pub fn float_column(&self, name: &str) -> Result<&[f64]> {
        let column = self.require(name)?;
        column
            .data()
            .as_floats()
            .ok_or_else(|| type_mismatch(column, ColumnType::Float))
    }

    /// Mutably borrow a float column. The slice cannot change the row count.
    pub fn float_column_mut(&mut self, name: &str) -> Result<&mut [f64]> {
        let idx = self
            .position(name)
            .ok_or_else(|| MungeError::ColumnNotFound(name.to_string()))?;
        let column = &mut self.columns[idx];
        let found = column.column_type();
        column
            .data_mut()
            .as_floats_mut()
            .ok_or_else(|| MungeError::ColumnTypeMismatch {
                name: name.to_string(),
                expected: ColumnType::Float,
                found,
            })
    }

    pub fn int_column(&self, name: &str) -> Result<&[i64]> {
        let column = self.require(name)?;
        column
            .data()
            .as_ints()
            .ok_or_else(|| type_mismatch(column, ColumnType::Int))
    }

    pub fn text_column(&self, name: &str) -> Result<&[String]> {
        let column = self.require(name)?;
        column
            .data()
            .as_texts()
            .ok_or_else(|| type_mismatch(column, ColumnType::Text))
    }

    pub fn bool_column(&self, name: &str) -> Result<&[bool]> {
        let column = self.require(name)?;
        column
            .data()
            .as_bools()
            .ok_or_else(|| type_mismatch(column, ColumnType::Bool))
    }

    /// Insert a column, replacing an existing one of the same name in place.
    ///
    /// New columns are appended. The row count must match the other columns;
    /// replacing the only column may change it.
    pub fn insert_column(&mut self, name: &str, data: impl Into<ColumnData>) -> Result<()> {
        let data = data.into();
        match self.position(name) {
            Some(idx) => {
                if self.columns.len() > 1 && data.len() != self.n_rows() {
                    return Err(MungeError::LengthMismatch {
                        expected: self.n_rows(),
                        got: data.len(),
                    });
                }
                self.columns[idx].replace_data(data);
            }
            None => {
                self.check_rows(data.len())?;
                self.columns.push(Column::new(name, data));
            }
        }
        Ok(())
    }

    /// Remove a column and return it.
    pub fn remove_column(&mut self, name: &str) -> Result<Column> {
        let idx = self
            .position(name)
            .ok_or_else(|| MungeError::ColumnNotFound(name.to_string()))?;
        Ok(self.columns.remove(idx))
    }

    /// The history of pieces applied to reach this dataset, if any.
    pub fn history(&self) -> Option<&History> {
        self.history.as_ref()
    }

    pub(crate) fn set_history(&mut self, history: Option<History>) {
        self.history = history;
    }

    pub(crate) fn take_history(&mut self) -> Option<History> {
        self.history.take()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }

    fn check_rows(&self, got: usize) -> Result<()> {
        if !self.columns.is_empty() && got != self.n_rows() {
            return Err(MungeError::LengthMismatch {
                expected: self.n_rows(),
                got,
            });
        }
        Ok(())
    }
}

fn type_mismatch(column: &Column, expected: ColumnType) -> MungeError {
    MungeError::ColumnTypeMismatch {
        name: column.name().to_string(),
        expected,
        found: column.column_type(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::new()
            .with_column("X", vec![1.0, 2.0, 3.0])
            .unwrap()
            .with_column("Y", vec![10i64, 20, 30])
            .unwrap()
    }

    #[test]
    fn test_empty_dataset() {
        let data = Dataset::new();
        assert_eq!(data.n_rows(), 0);
        assert_eq!(data.n_cols(), 0);
        assert!(data.history().is_none());
    }

    #[test]
    fn test_column_order_is_insertion_order() {
        let data = sample();
        assert_eq!(data.column_names(), vec!["X", "Y"]);
        assert_eq!(data.n_rows(), 3);
    }

    #[test]
    fn test_from_columns_rejects_duplicates() {
        let result = Dataset::from_columns(vec![
            Column::new("X", vec![1.0]),
            Column::new("X", vec![2.0]),
        ]);
        assert!(matches!(result, Err(MungeError::DuplicateColumn(_))));
    }

    #[test]
    fn test_from_columns_rejects_ragged_rows() {
        let result = Dataset::from_columns(vec![
            Column::new("X", vec![1.0, 2.0]),
            Column::new("Y", vec![2.0]),
        ]);
        assert!(matches!(
            result,
            Err(MungeError::LengthMismatch {
                expected: 2,
                got: 1
            })
        ));
    }

    #[test]
    fn test_float_column_type_mismatch() {
        let data = sample();
        assert!(matches!(
            data.float_column("Y"),
            Err(MungeError::ColumnTypeMismatch { .. })
        ));
        assert!(matches!(
            data.float_column("Z"),
            Err(MungeError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn test_float_column_mut_in_place() {
        let mut data = sample();
        for v in data.float_column_mut("X").unwrap() {
            *v *= 2.0;
        }
        assert_eq!(data.float_column("X").unwrap(), &[2.0, 4.0, 6.0]);
    }

    #[test]
    fn test_insert_column_replaces_in_place() {
        let mut data = sample();
        data.insert_column("X", vec!["a", "b", "c"]).unwrap();
        assert_eq!(data.column_names(), vec!["X", "Y"]);
        assert_eq!(data.text_column("X").unwrap()[1], "b");
    }

    #[test]
    fn test_insert_column_checks_rows() {
        let mut data = sample();
        let result = data.insert_column("Z", vec![1.0]);
        assert!(matches!(result, Err(MungeError::LengthMismatch { .. })));
    }

    #[test]
    fn test_remove_column() {
        let mut data = sample();
        let removed = data.remove_column("X").unwrap();
        assert_eq!(removed.name(), "X");
        assert_eq!(data.column_names(), vec!["Y"]);
        assert!(data.remove_column("X").is_err());
    }
}
