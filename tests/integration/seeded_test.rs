//! Report SQL against a seeded PostgreSQL schema.
//!
//! Each test creates its own schema through a plain pool connection, loads a
//! small customer dataset and points the dashboard at it with `search_path`.
//! Skipped unless DATABASE_URL is set.

use customer_dashboard::chart::{BandColor, ChartSpec};
use customer_dashboard::config::ConnectionConfig;
use customer_dashboard::dashboard::{sql, Dashboard};
use customer_dashboard::error::DashboardError;
use pretty_assertions::assert_eq;
use sqlx::postgres::PgPool;

const SEED: &str = r#"
CREATE TABLE customer_360 (
    customer_id INTEGER PRIMARY KEY,
    first_name TEXT,
    last_name TEXT,
    total_lifetime_value NUMERIC(12, 2),
    average_order_value NUMERIC(12, 2),
    total_purchases INTEGER,
    customer_segment TEXT,
    average_satisfaction_score NUMERIC(4, 2),
    churn_risk_score TEXT,
    recency_score INTEGER,
    frequency_score INTEGER,
    monetary_score INTEGER
);

CREATE TABLE product_catalog (
    product_id INTEGER PRIMARY KEY,
    category TEXT
);

CREATE TABLE purchase_transactions (
    transaction_id SERIAL PRIMARY KEY,
    product_id INTEGER REFERENCES product_catalog (product_id),
    purchase_date DATE,
    total_amount NUMERIC(12, 2)
);

INSERT INTO customer_360 VALUES
    (3, 'Alan', 'Turing', NULL, NULL, 1, 'B', 8.00, 'high', 1, 1, 1),
    (1, 'Ada', 'Lovelace', 1500.00, 50.00, 3, 'A', 9.00, 'low', 5, 4, 5),
    (2, 'Grace', 'Hopper', 700.50, 35.25, 1, 'A', 7.00, 'low', 3, 2, 3);

INSERT INTO product_catalog VALUES (2, 'Books'), (1, 'Electronics');

INSERT INTO purchase_transactions (product_id, purchase_date, total_amount) VALUES
    (1, '2024-02-11', 10.00),
    (1, '2024-01-05', 20.00),
    (2, '2023-12-31', 7.25),
    (2, '2024-01-20', 5.50);
"#;

/// A throwaway schema holding the seeded tables.
struct SeededSchema {
    pool: PgPool,
    name: String,
    config: ConnectionConfig,
}

impl SeededSchema {
    async fn create(tag: &str) -> Option<Self> {
        let url = std::env::var("DATABASE_URL").ok()?;
        let mut config = ConnectionConfig::from_connection_string(&url).ok()?;
        if config.user.is_none() {
            eprintln!("DATABASE_URL has no user");
            return None;
        }
        let pool = PgPool::connect(&url).await.ok()?;
        let name = format!("dashboard_it_{tag}_{}", std::process::id());

        sqlx::raw_sql(&format!(
            "DROP SCHEMA IF EXISTS {name} CASCADE; CREATE SCHEMA {name};"
        ))
        .execute(&pool)
        .await
        .unwrap();
        // search_path is per connection, so the seed runs on one
        let mut conn = pool.acquire().await.unwrap();
        sqlx::raw_sql(&format!("SET search_path TO {name}; {SEED}"))
            .execute(&mut *conn)
            .await
            .unwrap();
        drop(conn);

        config.schema = Some(name.clone());

        Some(Self { pool, name, config })
    }

    async fn execute(&self, statement: &str) {
        sqlx::raw_sql(&format!("SET search_path TO {}; {statement}", self.name))
            .execute(&mut *self.pool.acquire().await.unwrap())
            .await
            .unwrap();
    }

    async fn drop_schema(self) {
        sqlx::raw_sql(&format!("DROP SCHEMA IF EXISTS {} CASCADE", self.name))
            .execute(&self.pool)
            .await
            .unwrap();
        self.pool.close().await;
    }
}

#[tokio::test]
async fn test_reports_over_seeded_tables() {
    let Some(seeded) = SeededSchema::create("reports").await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };
    let dashboard = Dashboard::connect(&seeded.config).await.unwrap();

    dashboard.check_schema().await.unwrap();

    let kpis = dashboard.kpis().await.unwrap();
    assert_eq!(kpis.total_customers, 3);
    assert_eq!(kpis.total_lifetime_value, 2200.5);
    assert_eq!(kpis.average_order_value, 42.63);
    assert_eq!(kpis.retention_rate, 33.33);

    let ChartSpec::Pie(segments) = dashboard.customer_segments().await.unwrap() else {
        panic!("Expected pie chart");
    };
    assert_eq!(segments.labels, vec!["A", "B"]);
    assert_eq!(segments.values, vec![2.0, 1.0]);

    // One entry per month, oldest first, regardless of insertion order
    let ChartSpec::Line(monthly) = dashboard.monthly_revenue().await.unwrap() else {
        panic!("Expected line chart");
    };
    assert_eq!(monthly.x, vec!["2023-12-01", "2024-01-01", "2024-02-01"]);
    assert_eq!(monthly.y, vec![7.25, 25.5, 10.0]);

    let ChartSpec::Bar(categories) = dashboard.product_category_performance().await.unwrap()
    else {
        panic!("Expected bar chart");
    };
    assert_eq!(categories.x, vec!["Electronics", "Books"]);
    assert_eq!(categories.y, vec![30.0, 12.75]);

    // NULL lifetime value sorts last
    let top = dashboard.top_customers().await.unwrap();
    assert!(top.len() <= sql::TOP_CUSTOMER_LIMIT);
    let ids: Vec<&str> = top.iter().map(|c| c.customer_id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
    assert_eq!(top[0].total_lifetime_value, Some(1500.0));
    assert_eq!(top[2].total_lifetime_value, None);

    let ChartSpec::Gauge(gauge) = dashboard.customer_satisfaction().await.unwrap() else {
        panic!("Expected gauge chart");
    };
    assert_eq!(gauge.value, 8.0);
    assert_eq!(gauge.threshold.value, 8.0);
    assert_eq!(gauge.threshold.band, Some(BandColor::Green));

    let ChartSpec::Pie(churn) = dashboard.churn_risk().await.unwrap() else {
        panic!("Expected pie chart");
    };
    assert_eq!(churn.labels, vec!["high", "low"]);
    assert_eq!(churn.values, vec![1.0, 2.0]);

    let ChartSpec::Scatter3d(rfm) = dashboard.rfm_segmentation().await.unwrap() else {
        panic!("Expected scatter chart");
    };
    assert_eq!(rfm.x, vec![5.0, 3.0, 1.0]);
    assert_eq!(rfm.y, vec![4.0, 2.0, 1.0]);
    assert_eq!(rfm.z, vec![5.0, 3.0, 1.0]);

    dashboard.close().await.unwrap();
    seeded.drop_schema().await;
}

#[tokio::test]
async fn test_empty_tables_over_seeded_schema() {
    let Some(seeded) = SeededSchema::create("empty").await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };
    let dashboard = Dashboard::connect(&seeded.config).await.unwrap();

    seeded.execute("TRUNCATE purchase_transactions").await;

    let monthly = dashboard.monthly_revenue().await.unwrap();
    assert_eq!(monthly.kind(), "line");
    assert_eq!(monthly.series_len(), 0);
    assert_eq!(
        dashboard.product_category_performance().await.unwrap().series_len(),
        0
    );
    // Customers are untouched
    assert_eq!(dashboard.kpis().await.unwrap().total_customers, 3);

    seeded.execute("TRUNCATE customer_360").await;

    // NULLIF keeps retention from dividing by zero; the NULL surfaces as NoData
    let err = dashboard.kpis().await.unwrap_err();
    assert!(matches!(err, DashboardError::NoData(_)));
    let err = dashboard.customer_satisfaction().await.unwrap_err();
    assert!(matches!(err, DashboardError::NoData(_)));
    assert!(dashboard.top_customers().await.unwrap().is_empty());
    assert_eq!(dashboard.customer_segments().await.unwrap().series_len(), 0);

    dashboard.close().await.unwrap();
    seeded.drop_schema().await;
}
