//! Database schema types.
//!
//! Represents the subset of the database structure the dashboard reads, and
//! the columns each report depends on.

use serde::Serialize;

/// Tables and columns every dashboard report relies on.
pub const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    (
        "customer_360",
        &[
            "customer_id",
            "first_name",
            "last_name",
            "total_lifetime_value",
            "average_order_value",
            "total_purchases",
            "customer_segment",
            "average_satisfaction_score",
            "churn_risk_score",
            "recency_score",
            "frequency_score",
            "monetary_score",
        ],
    ),
    (
        "purchase_transactions",
        &["purchase_date", "total_amount", "product_id"],
    ),
    ("product_catalog", &["product_id", "category"]),
];

/// Represents the introspected schema of a database.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Schema {
    /// Tables found in the schema.
    pub tables: Vec<TableSchema>,
}

impl Schema {
    /// Looks up a table by name.
    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Lists every required `table` or `table.column` absent from this schema.
    pub fn missing(&self, required: &[(&str, &[&str])]) -> Vec<String> {
        let mut missing = Vec::new();
        for (table_name, columns) in required {
            match self.table(table_name) {
                None => missing.push(table_name.to_string()),
                Some(table) => missing.extend(
                    columns
                        .iter()
                        .filter(|c| !table.has_column(c))
                        .map(|c| format!("{table_name}.{c}")),
                ),
            }
        }
        missing
    }
}

/// A table and its columns.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TableSchema {
    /// Table name.
    pub name: String,

    /// Columns in ordinal order.
    pub columns: Vec<Column>,
}

impl TableSchema {
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }
}

/// Represents a column in a table.
#[derive(Debug, Clone, Serialize)]
pub struct Column {
    /// Column name.
    pub name: String,

    /// Data type (e.g., "integer", "numeric", "text").
    pub data_type: String,

    /// Whether the column allows NULL values.
    pub is_nullable: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            is_nullable: true,
        }
    }
}
