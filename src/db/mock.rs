//! Mock database clients for testing.
//!
//! `MockDatabaseClient` answers queries from canned row sets registered by
//! SQL fragment and counts session acquisition and release.
//! `FailingDatabaseClient` never connects.

use super::{ColumnInfo, DatabaseClient, QueryResult, Row, Schema, Session};
use crate::error::{DashboardError, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Counters shared between a mock client and its sessions.
#[derive(Debug, Default)]
pub struct SessionStats {
    opened: AtomicUsize,
    released: AtomicUsize,
    queries: Mutex<Vec<String>>,
}

impl SessionStats {
    /// Sessions handed out so far.
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Sessions finished or dropped so far.
    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    /// Every SQL string executed, in order.
    pub fn queries(&self) -> Vec<String> {
        self.queries
            .lock()
            .map(|q| q.clone())
            .unwrap_or_default()
    }
}

/// A mock database client that returns predefined results.
#[derive(Default)]
pub struct MockDatabaseClient {
    responses: Arc<Vec<(String, QueryResult)>>,
    schema: Schema,
    stats: Arc<SessionStats>,
}

impl MockDatabaseClient {
    /// Creates a mock with no registered responses and an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the row set returned for any query containing `fragment`.
    ///
    /// Fragments are matched in registration order.
    pub fn with_response(mut self, fragment: &str, columns: &[&str], rows: Vec<Row>) -> Self {
        let columns = columns
            .iter()
            .map(|name| ColumnInfo::new(*name, "mock"))
            .collect();
        let result = QueryResult::with_data(columns, rows).with_execution_time(Duration::from_millis(1));
        Arc::make_mut(&mut self.responses).push((fragment.to_string(), result));
        self
    }

    /// Sets the schema returned by introspection.
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }

    /// Shared session counters.
    pub fn stats(&self) -> Arc<SessionStats> {
        Arc::clone(&self.stats)
    }
}

#[async_trait]
impl DatabaseClient for MockDatabaseClient {
    async fn session(&self) -> Result<Box<dyn Session>> {
        self.stats.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockSession {
            responses: Arc::clone(&self.responses),
            stats: Arc::clone(&self.stats),
        }))
    }

    async fn introspect_schema(&self) -> Result<Schema> {
        Ok(self.schema.clone())
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

struct MockSession {
    responses: Arc<Vec<(String, QueryResult)>>,
    stats: Arc<SessionStats>,
}

#[async_trait]
impl Session for MockSession {
    async fn execute_query(&mut self, sql: &str) -> Result<QueryResult> {
        if let Ok(mut queries) = self.stats.queries.lock() {
            queries.push(sql.to_string());
        }

        self.responses
            .iter()
            .find(|(fragment, _)| sql.contains(fragment.as_str()))
            .map(|(_, result)| result.clone())
            .ok_or_else(|| {
                DashboardError::query(format!("ERROR: relation does not exist for query: {sql}"))
            })
    }

    async fn finish(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

impl Drop for MockSession {
    fn drop(&mut self) {
        self.stats.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// A client whose broker always fails to connect.
pub struct FailingDatabaseClient {
    message: String,
}

impl FailingDatabaseClient {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Default for FailingDatabaseClient {
    fn default() -> Self {
        Self::new("Cannot connect to crm @ localhost:5432. Check that the server is running.")
    }
}

#[async_trait]
impl DatabaseClient for FailingDatabaseClient {
    async fn session(&self) -> Result<Box<dyn Session>> {
        Err(DashboardError::connection(self.message.clone()))
    }

    async fn introspect_schema(&self) -> Result<Schema> {
        Err(DashboardError::connection(self.message.clone()))
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
