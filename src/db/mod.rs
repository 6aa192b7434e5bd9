//! Database abstraction layer.
//!
//! Provides a trait-based interface over the connection broker so the
//! dashboard pipeline can run against PostgreSQL or an in-memory mock.
//! All access goes through short-lived [`Session`]s.

mod guard;
mod mock;
mod postgres;
mod schema;
mod table;
mod types;

pub use guard::ensure_read_only;
pub use mock::{FailingDatabaseClient, MockDatabaseClient, SessionStats};
pub use postgres::PostgresClient;
pub use schema::{Column, Schema, TableSchema, REQUIRED_COLUMNS};
pub use table::Table;
pub use types::{ColumnInfo, QueryResult, Row, Value};

use crate::config::ConnectionConfig;
use crate::error::Result;
use async_trait::async_trait;

/// Creates a PostgreSQL client for the given configuration.
///
/// This is the central factory function for database connections.
pub async fn connect(config: &ConnectionConfig) -> Result<Box<dyn DatabaseClient>> {
    let client = PostgresClient::connect(config).await?;
    Ok(Box::new(client))
}

/// Trait defining the interface for database clients.
///
/// All database operations are async and return Results with DashboardError.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Acquires a read-only session on one connection.
    ///
    /// Failure to acquire is a connection error and is not retried.
    async fn session(&self) -> Result<Box<dyn Session>>;

    /// Introspects the tables the dashboard depends on.
    async fn introspect_schema(&self) -> Result<Schema>;

    /// Closes the client and all pooled connections.
    async fn close(&self) -> Result<()>;
}

/// A scoped, read-only unit of work on a single connection.
///
/// Dropping a session discards it and releases the connection, so every exit
/// path (including errors and cancellation) gives the connection back.
#[async_trait]
pub trait Session: Send {
    /// Executes a SQL query and returns the raw row set.
    async fn execute_query(&mut self, sql: &str) -> Result<QueryResult>;

    /// Ends the session explicitly, discarding the transaction.
    async fn finish(self: Box<Self>) -> Result<()>;
}
