//! PostgreSQL integration tests.
//!
//! Run the dashboard against a live database. Skipped unless DATABASE_URL
//! is set. The reports themselves only run when the database carries the
//! customer tables.

use customer_dashboard::config::ConnectionConfig;
use customer_dashboard::dashboard::{Dashboard, Report};
use customer_dashboard::error::DashboardError;

fn test_config() -> Option<ConnectionConfig> {
    let url = std::env::var("DATABASE_URL").ok()?;
    ConnectionConfig::from_connection_string(&url).ok()
}

async fn test_dashboard() -> Option<Dashboard> {
    Dashboard::connect(&test_config()?).await.ok()
}

#[tokio::test]
async fn test_connect_and_close() {
    let Some(dashboard) = test_dashboard().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    dashboard.close().await.unwrap();
}

#[tokio::test]
async fn test_reports_against_live_schema() {
    let Some(dashboard) = test_dashboard().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    match dashboard.check_schema().await {
        Ok(_) => {
            for report in Report::ALL {
                match dashboard.run(report).await {
                    Ok(output) => {
                        let json = serde_json::to_value(&output).unwrap();
                        assert!(json.is_object() || json.is_array(), "{report}");
                    }
                    // Scalar reports over empty tables
                    Err(DashboardError::NoData(_)) => {}
                    Err(e) => panic!("{report} failed: {e}"),
                }
            }
        }
        Err(e) => {
            assert!(matches!(e, DashboardError::Query(_)));
            assert!(e.to_string().contains("Schema is missing"));
        }
    }

    dashboard.close().await.unwrap();
}

#[tokio::test(flavor = "current_thread")]
async fn test_wrong_password_is_connection_error() {
    let Some(mut config) = test_config() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };
    config.password = Some("definitely-not-the-password".to_string());
    config.acquire_timeout_secs = 5;

    match Dashboard::connect(&config).await {
        Err(e) => assert!(matches!(e, DashboardError::Connection(_))),
        // Trust authentication ignores the password
        Ok(dashboard) => dashboard.close().await.unwrap(),
    }
}

#[tokio::test(flavor = "current_thread")]
async fn test_missing_proxy_socket_is_connection_error() {
    let socket_dir = tempfile::tempdir().unwrap();
    let config = ConnectionConfig {
        instance: Some("acme:us-central1:crm".to_string()),
        database: Some("crm".to_string()),
        user: Some("reader".to_string()),
        password: Some("secret".to_string()),
        socket_dir: Some(socket_dir.path().to_path_buf()),
        acquire_timeout_secs: 2,
        ..Default::default()
    };

    let Err(err) = Dashboard::connect(&config).await else {
        panic!("Expected connection failure");
    };
    assert!(matches!(err, DashboardError::Connection(_)));
    assert_eq!(err.category(), "Connection Error");
}
