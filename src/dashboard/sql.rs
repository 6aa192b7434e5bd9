//! SQL issued by each report, with the column names assigned to its rows.
//!
//! Aggregates over NUMERIC columns are cast to DOUBLE PRECISION and grouping
//! keys to TEXT so every result decodes into a plain float or string.

/// A fixed read-only query and the names given to its result columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportQuery {
    pub sql: &'static str,
    pub columns: &'static [&'static str],
}

pub const TOTAL_CUSTOMERS: ReportQuery = ReportQuery {
    sql: "SELECT COUNT(DISTINCT customer_id) AS total_customers FROM customer_360",
    columns: &["total_customers"],
};

pub const TOTAL_LIFETIME_VALUE: ReportQuery = ReportQuery {
    sql: "SELECT CAST(SUM(total_lifetime_value) AS DOUBLE PRECISION) AS total_ltv \
          FROM customer_360",
    columns: &["total_ltv"],
};

pub const AVERAGE_ORDER_VALUE: ReportQuery = ReportQuery {
    sql: "SELECT CAST(AVG(average_order_value) AS DOUBLE PRECISION) AS avg_order_value \
          FROM customer_360",
    columns: &["avg_order_value"],
};

/// Share of customers with more than one purchase, as a fraction.
/// NULL (not a division error) when the table is empty.
pub const RETENTION_RATE: ReportQuery = ReportQuery {
    sql: "SELECT CAST(COUNT(CASE WHEN total_purchases > 1 THEN 1 END) AS DOUBLE PRECISION) \
          / NULLIF(COUNT(*), 0) AS retention_rate \
          FROM customer_360",
    columns: &["retention_rate"],
};

pub const CUSTOMER_SEGMENTS: ReportQuery = ReportQuery {
    sql: "SELECT CAST(customer_segment AS TEXT) AS customer_segment, COUNT(*) AS count \
          FROM customer_360 \
          GROUP BY customer_segment \
          ORDER BY customer_segment",
    columns: &["customer_segment", "count"],
};

/// Revenue per calendar month, oldest first. Months render as `YYYY-MM-01`.
pub const MONTHLY_REVENUE: ReportQuery = ReportQuery {
    sql: "SELECT CAST(CAST(DATE_TRUNC('month', purchase_date) AS DATE) AS TEXT) AS month, \
          CAST(SUM(total_amount) AS DOUBLE PRECISION) AS revenue \
          FROM purchase_transactions \
          WHERE purchase_date IS NOT NULL AND total_amount IS NOT NULL \
          GROUP BY DATE_TRUNC('month', purchase_date) \
          ORDER BY DATE_TRUNC('month', purchase_date)",
    columns: &["month", "revenue"],
};

pub const TOP_CUSTOMER_LIMIT: usize = 5;

pub const TOP_CUSTOMERS: ReportQuery = ReportQuery {
    sql: "SELECT CAST(customer_id AS TEXT) AS customer_id, \
          CAST(first_name AS TEXT) AS first_name, \
          CAST(last_name AS TEXT) AS last_name, \
          CAST(total_lifetime_value AS DOUBLE PRECISION) AS total_lifetime_value \
          FROM customer_360 \
          ORDER BY total_lifetime_value DESC NULLS LAST \
          LIMIT 5",
    columns: &[
        "customer_id",
        "first_name",
        "last_name",
        "total_lifetime_value",
    ],
};

pub const CATEGORY_PERFORMANCE: ReportQuery = ReportQuery {
    sql: "SELECT CAST(pc.category AS TEXT) AS category, \
          CAST(SUM(pt.total_amount) AS DOUBLE PRECISION) AS total_revenue \
          FROM purchase_transactions pt \
          JOIN product_catalog pc ON pt.product_id = pc.product_id \
          WHERE pt.total_amount IS NOT NULL \
          GROUP BY pc.category \
          ORDER BY total_revenue DESC",
    columns: &["category", "total_revenue"],
};

pub const AVERAGE_SATISFACTION: ReportQuery = ReportQuery {
    sql: "SELECT CAST(AVG(average_satisfaction_score) AS DOUBLE PRECISION) AS avg_satisfaction \
          FROM customer_360",
    columns: &["avg_satisfaction"],
};

pub const CHURN_RISK: ReportQuery = ReportQuery {
    sql: "SELECT CAST(churn_risk_score AS TEXT) AS churn_risk_score, COUNT(*) AS count \
          FROM customer_360 \
          GROUP BY churn_risk_score \
          ORDER BY churn_risk_score",
    columns: &["churn_risk_score", "count"],
};

pub const RFM_SCORES: ReportQuery = ReportQuery {
    sql: "SELECT CAST(recency_score AS DOUBLE PRECISION) AS recency_score, \
          CAST(frequency_score AS DOUBLE PRECISION) AS frequency_score, \
          CAST(monetary_score AS DOUBLE PRECISION) AS monetary_score \
          FROM customer_360 \
          WHERE recency_score IS NOT NULL \
          AND frequency_score IS NOT NULL \
          AND monetary_score IS NOT NULL \
          ORDER BY customer_id",
    columns: &["recency_score", "frequency_score", "monetary_score"],
};

/// Every query the dashboard can issue.
pub const ALL_QUERIES: &[ReportQuery] = &[
    TOTAL_CUSTOMERS,
    TOTAL_LIFETIME_VALUE,
    AVERAGE_ORDER_VALUE,
    RETENTION_RATE,
    CUSTOMER_SEGMENTS,
    MONTHLY_REVENUE,
    TOP_CUSTOMERS,
    CATEGORY_PERFORMANCE,
    AVERAGE_SATISFACTION,
    CHURN_RISK,
    RFM_SCORES,
];
