use std::collections::HashMap;

use crate::error::{Result, SqlBulkError};

/// Column name the count variant of the bulk engine reads from each chunk's
/// first row. Statements passed to `bulk_get_count` must be
/// `SELECT COUNT(*)`-shaped so their single result column carries this name.
pub const COUNT_COLUMN: &str = "COUNT(*)";

/// Driver-agnostic raw result from a database query.
/// All values are converted to strings by the driver.
#[derive(Debug, Clone)]
pub struct RawQueryResult {
    /// Column names in order
    pub columns: Vec<String>,
    /// Rows, where each row is a vector of string values in column order
    pub rows: Vec<Vec<String>>,
}

impl RawQueryResult {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows }
    }

    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Converts the raw result into name-addressable rows.
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
            .into_iter()
            .map(|values| Row::new(&self.columns, values))
            .collect()
    }
}

/// A single row result from a query.
/// Values are stored as strings and accessed by column name.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    values: HashMap<String, String>,
}

impl Row {
    /// Creates a new Row from column names and values.
    pub fn new(columns: &[String], values: Vec<String>) -> Self {
        let values = columns
            .iter()
            .zip(values.into_iter())
            .map(|(col, val)| (col.clone(), val))
            .collect();
        Self { values }
    }

    /// Gets a value by column name.
    pub fn get(&self, column: &str) -> Result<&str> {
        self.values
            .get(column)
            .map(|s| s.as_str())
            .ok_or_else(|| SqlBulkError::ColumnNotFound(column.to_string()))
    }

    /// Gets the count column of a `SELECT COUNT(*)` row as an integer.
    pub fn count(&self) -> Result<i64> {
        let value = self.get(COUNT_COLUMN)?;
        value
            .parse::<i64>()
            .map_err(|_| SqlBulkError::InvalidCount(value.to_string()))
    }

    /// Returns all column names in this row.
    pub fn columns(&self) -> Vec<&str> {
        self.values.keys().map(|s| s.as_str()).collect()
    }

    /// Returns the number of columns in this row.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if this row has no columns.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
