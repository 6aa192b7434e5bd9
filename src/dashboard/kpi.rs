//! KPI summary and rounding.

use serde::Serialize;
use tracing::warn;

use crate::db::Table;
use crate::error::{DashboardError, Result};

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSummary {
    pub total_customers: i64,
    pub total_lifetime_value: f64,
    pub average_order_value: f64,
    /// Percentage of customers with more than one purchase (0–100).
    pub retention_rate: f64,
}

impl KpiSummary {
    /// Assembles the summary from the four single-value KPI tables.
    ///
    /// A NULL aggregate fails with [`DashboardError::NoData`].
    pub fn from_tables(
        customers: &Table,
        lifetime_value: &Table,
        order_value: &Table,
        retention: &Table,
    ) -> Result<Self> {
        let total_customers = require(customers.scalar_i64("total_customers")?, "customer count")?;
        let total_ltv = require(lifetime_value.scalar_f64("total_ltv")?, "total lifetime value")?;
        let avg_order = require(order_value.scalar_f64("avg_order_value")?, "average order value")?;
        let retention = require(retention.scalar_f64("retention_rate")?, "retention rate")?;

        Ok(Self {
            total_customers,
            total_lifetime_value: round2(total_ltv),
            average_order_value: round2(avg_order),
            retention_rate: round2(retention * 100.0),
        })
    }
}

/// Turns a NULL aggregate into a no-data error.
pub(crate) fn require<T>(value: Option<T>, what: &str) -> Result<T> {
    value.ok_or_else(|| {
        warn!(metric = what, "Aggregate returned NULL");
        DashboardError::no_data(format!("{what} is NULL; no non-NULL values to aggregate"))
    })
}

/// Rounds to two decimal places, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
