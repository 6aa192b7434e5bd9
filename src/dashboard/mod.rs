//! The dashboard query pipeline.
//!
//! Each report acquires its own session, runs one fixed query (the KPI
//! summary runs four in the same session), reshapes the rows into a
//! [`Table`] and returns either plain numbers or a [`ChartSpec`]. Nothing is
//! cached between calls.
//!
//! Empty tables: series-shaped reports return empty series, scalar reports
//! (KPI summary, satisfaction gauge) fail with [`DashboardError::NoData`].

mod kpi;
pub mod sql;

pub use kpi::{round2, KpiSummary};

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use futures::future::try_join_all;
use serde::Serialize;
use tracing::{debug, info};

use crate::chart::{ChartSpec, GaugeChart, PieChart, Scatter3dChart, XyChart};
use crate::config::ConnectionConfig;
use crate::db::{self, ensure_read_only, DatabaseClient, Schema, Table, REQUIRED_COLUMNS};
use crate::error::{DashboardError, Result};
use sql::ReportQuery;

/// A named analytic request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Report {
    Kpis,
    Segments,
    MonthlyRevenue,
    TopCustomers,
    Categories,
    Satisfaction,
    ChurnRisk,
    Rfm,
}

impl Report {
    /// Every report, in dashboard order.
    pub const ALL: [Report; 8] = [
        Report::Kpis,
        Report::Segments,
        Report::MonthlyRevenue,
        Report::TopCustomers,
        Report::Categories,
        Report::Satisfaction,
        Report::ChurnRisk,
        Report::Rfm,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Kpis => "kpis",
            Self::Segments => "segments",
            Self::MonthlyRevenue => "monthly-revenue",
            Self::TopCustomers => "top-customers",
            Self::Categories => "categories",
            Self::Satisfaction => "satisfaction",
            Self::ChurnRisk => "churn-risk",
            Self::Rfm => "rfm",
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Report {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|r| r.name() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(Report::name).collect();
                DashboardError::config(format!(
                    "Unknown report '{s}'. Expected one of: {}",
                    names.join(", ")
                ))
            })
    }
}

/// One of the top customers by lifetime value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopCustomer {
    pub customer_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub total_lifetime_value: Option<f64>,
}

/// The payload produced by a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReportOutput {
    Kpis(KpiSummary),
    Chart(ChartSpec),
    TopCustomers(Vec<TopCustomer>),
}

/// Runs dashboard reports against a database client.
#[derive(Clone)]
pub struct Dashboard {
    db: Arc<dyn DatabaseClient>,
}

impl Dashboard {
    /// Wraps an existing client.
    pub fn new(db: Arc<dyn DatabaseClient>) -> Self {
        Self { db }
    }

    /// Connects to PostgreSQL with the given configuration.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let client = db::connect(config).await?;
        Ok(Self::new(Arc::from(client)))
    }

    /// Closes the underlying client.
    pub async fn close(&self) -> Result<()> {
        self.db.close().await
    }

    /// Dispatches a named report.
    pub async fn run(&self, report: Report) -> Result<ReportOutput> {
        let output = match report {
            Report::Kpis => ReportOutput::Kpis(self.kpis().await?),
            Report::Segments => ReportOutput::Chart(self.customer_segments().await?),
            Report::MonthlyRevenue => ReportOutput::Chart(self.monthly_revenue().await?),
            Report::TopCustomers => ReportOutput::TopCustomers(self.top_customers().await?),
            Report::Categories => {
                ReportOutput::Chart(self.product_category_performance().await?)
            }
            Report::Satisfaction => ReportOutput::Chart(self.customer_satisfaction().await?),
            Report::ChurnRisk => ReportOutput::Chart(self.churn_risk().await?),
            Report::Rfm => ReportOutput::Chart(self.rfm_segmentation().await?),
        };
        info!(%report, "Report ready");
        Ok(output)
    }

    /// Runs every report concurrently, each on its own session.
    ///
    /// Fails with the first error; there is no partial result.
    pub async fn run_all(&self) -> Result<BTreeMap<&'static str, ReportOutput>> {
        let outputs = try_join_all(Report::ALL.into_iter().map(|report| async move {
            self.run(report).await.map(|output| (report.name(), output))
        }))
        .await?;
        Ok(outputs.into_iter().collect())
    }

    /// Headline KPIs: customer count, lifetime value, order value, retention.
    pub async fn kpis(&self) -> Result<KpiSummary> {
        let tables = self
            .fetch_tables(&[
                sql::TOTAL_CUSTOMERS,
                sql::TOTAL_LIFETIME_VALUE,
                sql::AVERAGE_ORDER_VALUE,
                sql::RETENTION_RATE,
            ])
            .await?;
        let [customers, lifetime_value, order_value, retention] = tables_array::<4>(tables)?;
        KpiSummary::from_tables(&customers, &lifetime_value, &order_value, &retention)
    }

    /// Customers per segment as a pie.
    pub async fn customer_segments(&self) -> Result<ChartSpec> {
        let table = self.fetch_table(sql::CUSTOMER_SEGMENTS).await?;
        Ok(ChartSpec::Pie(PieChart::from_table(
            &table,
            "customer_segment",
            "count",
            "Customer Segment Distribution",
        )?))
    }

    /// Revenue per calendar month as a line, oldest month first.
    pub async fn monthly_revenue(&self) -> Result<ChartSpec> {
        let table = self.fetch_table(sql::MONTHLY_REVENUE).await?;
        Ok(ChartSpec::Line(XyChart::from_table(
            &table,
            "month",
            "revenue",
            "Monthly Revenue Trend",
        )?))
    }

    /// The five customers with the highest lifetime value, highest first.
    pub async fn top_customers(&self) -> Result<Vec<TopCustomer>> {
        let table = self.fetch_table(sql::TOP_CUSTOMERS).await?;

        (0..table.len().min(sql::TOP_CUSTOMER_LIMIT))
            .map(|row| -> Result<TopCustomer> {
                Ok(TopCustomer {
                    customer_id: table.value(row, "customer_id")?.to_display_string(),
                    first_name: table.value(row, "first_name")?.as_str().map(String::from),
                    last_name: table.value(row, "last_name")?.as_str().map(String::from),
                    total_lifetime_value: table.value(row, "total_lifetime_value")?.as_f64(),
                })
            })
            .collect()
    }

    /// Revenue per product category as bars, highest first.
    pub async fn product_category_performance(&self) -> Result<ChartSpec> {
        let table = self.fetch_table(sql::CATEGORY_PERFORMANCE).await?;
        Ok(ChartSpec::Bar(XyChart::from_table(
            &table,
            "category",
            "total_revenue",
            "Product Category Performance",
        )?))
    }

    /// Average satisfaction on a 0–10 gauge.
    pub async fn customer_satisfaction(&self) -> Result<ChartSpec> {
        let table = self.fetch_table(sql::AVERAGE_SATISFACTION).await?;
        let average = kpi::require(
            table.scalar_f64("avg_satisfaction")?,
            "average satisfaction score",
        )?;
        Ok(ChartSpec::Gauge(GaugeChart::new(
            "Customer Satisfaction Score",
            average,
        )))
    }

    /// Customers per churn risk score as a pie.
    pub async fn churn_risk(&self) -> Result<ChartSpec> {
        let table = self.fetch_table(sql::CHURN_RISK).await?;
        Ok(ChartSpec::Pie(PieChart::from_table(
            &table,
            "churn_risk_score",
            "count",
            "Churn Risk Distribution",
        )?))
    }

    /// Recency, frequency and monetary scores per customer as a 3-D scatter.
    pub async fn rfm_segmentation(&self) -> Result<ChartSpec> {
        let table = self.fetch_table(sql::RFM_SCORES).await?;
        Ok(ChartSpec::Scatter3d(Scatter3dChart::from_table(
            &table,
            [
                ("recency_score", "Recency"),
                ("frequency_score", "Frequency"),
                ("monetary_score", "Monetary"),
            ],
            "RFM Segmentation",
        )?))
    }

    /// Verifies every table and column the reports read exists.
    pub async fn check_schema(&self) -> Result<Schema> {
        let schema = self.db.introspect_schema().await?;
        let missing = schema.missing(REQUIRED_COLUMNS);
        if !missing.is_empty() {
            return Err(DashboardError::query(format!(
                "Schema is missing: {}",
                missing.join(", ")
            )));
        }
        Ok(schema)
    }

    async fn fetch_table(&self, query: ReportQuery) -> Result<Table> {
        let mut tables = self.fetch_tables(&[query]).await?;
        tables
            .pop()
            .ok_or_else(|| DashboardError::internal("query produced no table"))
    }

    /// Runs queries in order on one session and materializes each result.
    ///
    /// The session is discarded on every path: explicitly on success, by
    /// drop when a query fails.
    async fn fetch_tables(&self, queries: &[ReportQuery]) -> Result<Vec<Table>> {
        for query in queries {
            ensure_read_only(query.sql)?;
        }

        let mut session = self.db.session().await?;
        let mut tables = Vec::with_capacity(queries.len());

        for query in queries {
            let result = session.execute_query(query.sql).await?;
            debug!(
                columns = ?query.columns,
                rows = result.row_count(),
                elapsed = ?result.execution_time,
                "Fetched rows"
            );
            tables.push(Table::from_result(result, query.columns)?);
        }

        session.finish().await?;
        Ok(tables)
    }
}

fn tables_array<const N: usize>(tables: Vec<Table>) -> Result<[Table; N]> {
    let found = tables.len();
    tables.try_into().map_err(|_| {
        DashboardError::internal(format!("expected {N} tables, fetched {found}"))
    })
}
