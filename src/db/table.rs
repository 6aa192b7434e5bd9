//! Column-major table materialized from a row set.
//!
//! Queries do not describe their own column semantics, so the caller assigns
//! names when materializing. Accessors check types and fail with a query
//! error on mismatch.

use super::{QueryResult, Value};
use crate::error::{DashboardError, Result};

/// A row set reshaped into named columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Vec<Value>>,
    rows: usize,
}

impl Table {
    /// Materializes `result` under the given column names.
    ///
    /// The number of names must match the width of the result.
    pub fn from_result(result: QueryResult, names: &[&str]) -> Result<Self> {
        let width = result.width();
        if !result.is_empty() && width != names.len() {
            return Err(DashboardError::query(format!(
                "Expected {} columns ({}), query returned {}",
                names.len(),
                names.join(", "),
                width
            )));
        }

        let rows = result.rows.len();
        let mut columns: Vec<Vec<Value>> = names.iter().map(|_| Vec::with_capacity(rows)).collect();

        for (row_index, row) in result.rows.into_iter().enumerate() {
            if row.len() != names.len() {
                return Err(DashboardError::query(format!(
                    "Row {} has {} values, expected {}",
                    row_index,
                    row.len(),
                    names.len()
                )));
            }
            for (column, value) in columns.iter_mut().zip(row) {
                column.push(value);
            }
        }

        Ok(Self {
            names: names.iter().map(|n| n.to_string()).collect(),
            columns,
            rows,
        })
    }

    /// Column names in order.
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Raw values of a column.
    pub fn column(&self, name: &str) -> Result<&[Value]> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.columns[i].as_slice())
            .ok_or_else(|| DashboardError::query(format!("Unknown column '{name}'")))
    }

    /// A single cell.
    pub fn value(&self, row: usize, name: &str) -> Result<&Value> {
        self.column(name)?.get(row).ok_or_else(|| {
            DashboardError::query(format!(
                "Row {row} out of range for column '{name}' ({} rows)",
                self.rows
            ))
        })
    }

    /// A numeric column. NULLs and non-numeric values are type errors.
    pub fn f64_column(&self, name: &str) -> Result<Vec<f64>> {
        self.column(name)?
            .iter()
            .map(|v| {
                v.as_f64()
                    .ok_or_else(|| type_mismatch(name, "numeric", v))
            })
            .collect()
    }

    /// A column rendered as labels. NULL becomes `"NULL"`.
    pub fn label_column(&self, name: &str) -> Result<Vec<String>> {
        Ok(self
            .column(name)?
            .iter()
            .map(Value::to_display_string)
            .collect())
    }

    /// The numeric value in the first row, or None when NULL or absent.
    pub fn scalar_f64(&self, name: &str) -> Result<Option<f64>> {
        match self.column(name)?.first() {
            None | Some(Value::Null) => Ok(None),
            Some(v) => v
                .as_f64()
                .map(Some)
                .ok_or_else(|| type_mismatch(name, "numeric", v)),
        }
    }

    /// The integer value in the first row, or None when NULL or absent.
    pub fn scalar_i64(&self, name: &str) -> Result<Option<i64>> {
        match self.column(name)?.first() {
            None | Some(Value::Null) => Ok(None),
            Some(v) => v
                .as_i64()
                .map(Some)
                .ok_or_else(|| type_mismatch(name, "integer", v)),
        }
    }
}

fn type_mismatch(column: &str, expected: &str, found: &Value) -> DashboardError {
    DashboardError::query(format!(
        "Column '{column}' expected {expected} value, found {}",
        found.type_name()
    ))
}
