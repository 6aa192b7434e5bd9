//! PostgreSQL database client implementation.
//!
//! Provides the `PostgresClient` struct that implements the `DatabaseClient`
//! trait on top of a sqlx connection pool. Each session is a `READ ONLY`
//! transaction; sqlx rolls a transaction back when it is dropped unfinished.

use crate::config::ConnectionConfig;
use crate::db::{
    Column, ColumnInfo, DatabaseClient, QueryResult, Row, Schema, Session, TableSchema, Value,
    REQUIRED_COLUMNS,
};
use crate::error::{DashboardError, Result};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Column as SqlxColumn, Postgres, Row as SqlxRow, Transaction, TypeInfo};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// PostgreSQL database client.
#[derive(Debug)]
pub struct PostgresClient {
    pool: PgPool,
    query_timeout: Duration,
}

impl PostgresClient {
    /// Opens a connection pool for the given configuration.
    ///
    /// Connection failures are mapped to user-facing messages and returned
    /// immediately.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let options = config.to_connect_options()?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout())
            .connect_with(options)
            .await
            .map_err(|e| map_connection_error(e, config))?;

        info!(
            instance = %config.display_string(),
            max_connections = config.max_connections,
            "Connected to database"
        );

        Ok(Self {
            pool,
            query_timeout: config.query_timeout(),
        })
    }
}

#[async_trait]
impl DatabaseClient for PostgresClient {
    async fn session(&self) -> Result<Box<dyn Session>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DashboardError::connection(format!("Failed to acquire session: {e}")))?;

        sqlx::query("SET TRANSACTION READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(|e| DashboardError::query(format_query_error(e)))?;

        Ok(Box::new(PostgresSession {
            tx,
            query_timeout: self.query_timeout,
        }))
    }

    async fn introspect_schema(&self) -> Result<Schema> {
        let table_names: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .map(|(table, _)| table.to_string())
            .collect();

        let rows: Vec<(String, String, String, String)> = sqlx::query_as(
            r#"
            SELECT
                table_name::text,
                column_name::text,
                data_type::text,
                is_nullable::text
            FROM information_schema.columns
            WHERE table_schema = current_schema() AND table_name = ANY($1)
            ORDER BY table_name, ordinal_position
            "#,
        )
        .bind(table_names)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DashboardError::query(format!("Failed to fetch columns: {e}")))?;

        let mut tables: Vec<TableSchema> = Vec::new();
        for (table_name, name, data_type, is_nullable) in rows {
            let column = Column {
                name,
                data_type,
                is_nullable: is_nullable == "YES",
            };
            match tables.last_mut() {
                Some(table) if table.name == table_name => table.columns.push(column),
                _ => tables.push(TableSchema {
                    name: table_name,
                    columns: vec![column],
                }),
            }
        }

        Ok(Schema { tables })
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}

/// A read-only transaction on one pooled connection.
struct PostgresSession {
    tx: Transaction<'static, Postgres>,
    query_timeout: Duration,
}

#[async_trait]
impl Session for PostgresSession {
    async fn execute_query(&mut self, sql: &str) -> Result<QueryResult> {
        let start = Instant::now();

        let result = tokio::time::timeout(
            self.query_timeout,
            sqlx::query(sql).fetch_all(&mut *self.tx),
        )
        .await
        .map_err(|_| {
            DashboardError::query(format!(
                "Query timed out after {} seconds",
                self.query_timeout.as_secs()
            ))
        })?
        .map_err(|e| DashboardError::query(format_query_error(e)))?;

        let execution_time = start.elapsed();

        let columns: Vec<ColumnInfo> = result
            .first()
            .map(|row| {
                row.columns()
                    .iter()
                    .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
                    .collect()
            })
            .unwrap_or_default();

        let rows = result
            .iter()
            .map(convert_row)
            .collect::<Result<Vec<Row>>>()?;

        debug!(rows = rows.len(), elapsed = ?execution_time, "Query finished");

        Ok(QueryResult::with_data(columns, rows).with_execution_time(execution_time))
    }

    async fn finish(self: Box<Self>) -> Result<()> {
        let session = *self;
        session
            .tx
            .rollback()
            .await
            .map_err(|e| DashboardError::connection(format!("Failed to release session: {e}")))
    }
}

/// Converts a sqlx PgRow to our Row type.
fn convert_row(row: &PgRow) -> Result<Row> {
    row.columns()
        .iter()
        .map(|col| convert_value(row, col.ordinal(), col.name(), col.type_info().name()))
        .collect()
}

/// Converts a single column value from a PgRow to our Value type.
///
/// SQL NULL becomes `Value::Null`; a value that cannot be decoded is a
/// query error.
fn convert_value(row: &PgRow, index: usize, name: &str, type_name: &str) -> Result<Value> {
    let value = match type_name.to_uppercase().as_str() {
        "BOOL" | "BOOLEAN" => decode::<bool>(row, index, name)?.map(Value::Bool),
        "INT2" | "SMALLINT" => decode::<i16>(row, index, name)?.map(|v| Value::Int(v as i64)),
        "INT4" | "INT" | "INTEGER" => {
            decode::<i32>(row, index, name)?.map(|v| Value::Int(v as i64))
        }
        "INT8" | "BIGINT" => decode::<i64>(row, index, name)?.map(Value::Int),
        "FLOAT4" | "REAL" => decode::<f32>(row, index, name)?.map(|v| Value::Float(v as f64)),
        "FLOAT8" | "DOUBLE PRECISION" => decode::<f64>(row, index, name)?.map(Value::Float),
        "BYTEA" => decode::<Vec<u8>>(row, index, name)?.map(Value::Bytes),
        // NUMERIC, DATE and friends are cast to float8/text in SQL before they get here
        _ => decode::<String>(row, index, name)?.map(Value::String),
    };
    Ok(value.unwrap_or(Value::Null))
}

fn decode<'r, T>(row: &'r PgRow, index: usize, name: &str) -> Result<Option<T>>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get::<Option<T>, _>(index)
        .map_err(|e| DashboardError::query(format!("Cannot decode column '{name}': {e}")))
}

/// Maps sqlx connection errors to user-friendly messages.
fn map_connection_error(error: sqlx::Error, config: &ConnectionConfig) -> DashboardError {
    let target = config.display_string();
    let user = config.user.as_deref().unwrap_or("unknown");
    let database = config.database.as_deref().unwrap_or("unknown");

    let error_str = error.to_string().to_lowercase();

    if error_str.contains("connection refused") || error_str.contains("could not connect") {
        DashboardError::connection(format!(
            "Cannot connect to {target}. Check that the server or auth proxy is running."
        ))
    } else if error_str.contains("password authentication failed")
        || error_str.contains("authentication failed")
    {
        DashboardError::connection(format!(
            "Authentication failed for user '{user}'. Check your credentials."
        ))
    } else if error_str.contains("does not exist") && error_str.contains("database") {
        DashboardError::connection(format!("Database '{database}' does not exist."))
    } else if error_str.contains("no such file or directory") {
        DashboardError::connection(format!(
            "Instance socket for {target} not found. Is the Cloud SQL auth proxy running?"
        ))
    } else if error_str.contains("timed out") || error_str.contains("timeout") {
        DashboardError::connection(format!(
            "Connection to {target} timed out. The server may be overloaded or unreachable."
        ))
    } else {
        DashboardError::connection(error.to_string())
    }
}

/// Formats a query error with PostgreSQL detail and hints if available.
fn format_query_error(error: sqlx::Error) -> String {
    let Some(db_error) = error.as_database_error() else {
        return error.to_string();
    };

    let mut result = String::from("ERROR: ");
    result.push_str(db_error.message());

    if let Some(pg_error) = db_error.try_downcast_ref::<sqlx::postgres::PgDatabaseError>() {
        if let Some(detail) = pg_error.detail() {
            result.push_str("\n  DETAIL: ");
            result.push_str(detail);
        }

        if let Some(hint) = pg_error.hint() {
            result.push_str("\n  HINT: ");
            result.push_str(hint);
        }

        if let Some(table) = pg_error.table() {
            result.push_str("\n  TABLE: ");
            result.push_str(table);
        }

        if let Some(column) = pg_error.column() {
            result.push_str("\n  COLUMN: ");
            result.push_str(column);
        }
    }

    result
}
