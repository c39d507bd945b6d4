//! Tabular record set handed in by the dashboard layer.
//!
//! [`RecordTable`] is a small column-named, row-major table: enough to carry
//! filtered transaction records (a date-like column, a numeric value column,
//! arbitrary categorical columns) into the preprocessor, and to carry a
//! two-column forecast back out. It owns no time series invariants.

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};

/// A single cell of a [`RecordTable`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Missing entry
    Null,
    /// Numeric entry
    Number(f64),
    /// Textual entry (dates and categories arrive as text)
    Text(String),
}

impl Value {
    /// Coerce the cell to a number.
    ///
    /// Numbers pass through; text is parsed as `f64`; everything else is
    /// `None`. This mirrors lenient numeric coercion of loader output where
    /// numeric columns sometimes arrive as strings.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(x) => Some(*x),
            Value::Text(s) => s.trim().parse::<f64>().ok(),
            Value::Null => None,
        }
    }

    /// Borrow the cell as text, if textual.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Whether the cell is missing.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Number(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

/// Column-named, row-major table of [`Value`] cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordTable {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl RecordTable {
    /// Create an empty table with the given column names.
    pub fn new<S: Into<String>>(columns: Vec<S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row. The row must have one cell per column.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(ForecastError::InvalidParameter {
                name: "row".to_string(),
                reason: format!(
                    "expected {} cells, got {}",
                    self.columns.len(),
                    row.len()
                ),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Column names, in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at (row, column index).
    pub fn cell(&self, row: usize, col: usize) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Iterate over the cells of one column.
    pub fn column_values(&self, col: usize) -> impl Iterator<Item = &Value> {
        self.rows.iter().map(move |r| &r[col])
    }

    /// Whether a column is numeric: at least one non-null cell, and every
    /// non-null cell coerces to a number.
    pub fn is_numeric_column(&self, col: usize) -> bool {
        let mut seen = false;
        for cell in self.column_values(col) {
            if cell.is_null() {
                continue;
            }
            if cell.as_number().is_none() {
                return false;
            }
            seen = true;
        }
        seen
    }

    /// Drop every row that contains a null cell, returning a cleaned copy.
    pub fn drop_null_rows(&self) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .filter(|r| !r.iter().any(Value::is_null))
                .cloned()
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> RecordTable {
        let mut table = RecordTable::new(vec!["Date", "City", "Total"]);
        table
            .push_row(vec!["2023-01-01".into(), "Yangon".into(), 120.5.into()])
            .unwrap();
        table
            .push_row(vec!["2023-01-02".into(), "Mandalay".into(), Value::Null])
            .unwrap();
        table
            .push_row(vec!["2023-01-03".into(), "Yangon".into(), "88.25".into()])
            .unwrap();
        table
    }

    #[test]
    fn test_push_row_length_mismatch() {
        let mut table = RecordTable::new(vec!["Date", "Total"]);
        let result = table.push_row(vec!["2023-01-01".into()]);
        assert!(result.is_err());
    }

    #[test]
    fn test_value_coercion() {
        assert_eq!(Value::Number(3.5).as_number(), Some(3.5));
        assert_eq!(Value::Text(" 42 ".to_string()).as_number(), Some(42.0));
        assert_eq!(Value::Text("Yangon".to_string()).as_number(), None);
        assert_eq!(Value::Null.as_number(), None);
    }

    #[test]
    fn test_numeric_column_detection() {
        let table = sample_table();
        let total = table.column_index("Total").unwrap();
        let city = table.column_index("City").unwrap();
        // Nulls are ignored, text numbers coerce
        assert!(table.is_numeric_column(total));
        assert!(!table.is_numeric_column(city));
    }

    #[test]
    fn test_all_null_column_is_not_numeric() {
        let mut table = RecordTable::new(vec!["x"]);
        table.push_row(vec![Value::Null]).unwrap();
        table.push_row(vec![Value::Null]).unwrap();
        assert!(!table.is_numeric_column(0));
    }

    #[test]
    fn test_drop_null_rows() {
        let table = sample_table();
        let cleaned = table.drop_null_rows();
        assert_eq!(cleaned.len(), 2);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_column_lookup() {
        let table = sample_table();
        assert_eq!(table.column_index("Date"), Some(0));
        assert_eq!(table.column_index("Rating"), None);
    }
}
