//! Mock database clients for testing.
//!
//! Provides in-memory implementations that return a preset result or fail.

use super::{DatabaseClient, QueryResult};
use crate::error::{LcError, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// A mock database client that returns a predefined result for every query.
#[derive(Debug, Default)]
pub struct MockDatabaseClient {
    result: QueryResult,
    executed: Mutex<Vec<String>>,
    closed: AtomicBool,
}

impl MockDatabaseClient {
    /// Creates a mock client that returns an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock client that returns the given result.
    pub fn with_result(result: QueryResult) -> Self {
        Self {
            result,
            ..Self::default()
        }
    }

    /// Returns the SQL statements executed so far, in order.
    pub fn executed_queries(&self) -> Vec<String> {
        self.executed
            .lock()
            .map(|queries| queries.clone())
            .unwrap_or_default()
    }

    /// Returns true once `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DatabaseClient for MockDatabaseClient {
    async fn execute_query(&self, sql: &str) -> Result<QueryResult> {
        if self.is_closed() {
            return Err(LcError::connection("Connection is closed"));
        }

        self.executed
            .lock()
            .map_err(|_| LcError::internal("Mock query log poisoned"))?
            .push(sql.to_string());

        Ok(self
            .result
            .clone()
            .with_execution_time(Duration::from_millis(1)))
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// A mock database client whose queries always fail.
#[derive(Debug)]
pub struct FailingDatabaseClient {
    message: String,
    closed: AtomicBool,
}

impl FailingDatabaseClient {
    /// Creates a client that fails every query with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            closed: AtomicBool::new(false),
        }
    }

    /// Returns true once `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DatabaseClient for FailingDatabaseClient {
    async fn execute_query(&self, _sql: &str) -> Result<QueryResult> {
        Err(LcError::query(self.message.clone()))
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
