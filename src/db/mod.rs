//! Database abstraction layer for wsdb-lc.
//!
//! Provides a trait-based interface for database operations, so the
//! lightcurve pipeline can run against PostgreSQL or an in-memory mock.

mod columns;
mod mock;
mod postgres;
mod types;

pub use columns::{ColumnData, ColumnSet};
pub use mock::{FailingDatabaseClient, MockDatabaseClient};
pub use postgres::PostgresClient;
pub use types::{ColumnInfo, QueryResult, Row, Value};

use crate::config::ConnectionConfig;
use crate::error::Result;
use async_trait::async_trait;
use tracing::debug;

/// Opens a database session for the given configuration.
///
/// Fails immediately on an unreachable host or bad credentials; there is
/// no retry.
pub async fn connect(config: &ConnectionConfig) -> Result<Box<dyn DatabaseClient>> {
    let client = PostgresClient::connect(config).await?;
    Ok(Box::new(client))
}

/// Executes a query and returns its result column by column.
///
/// An empty result is not an error: every column comes back empty.
pub async fn query(sql: &str, client: &dyn DatabaseClient) -> Result<ColumnSet> {
    let result = client.execute_query(sql).await?;
    debug!(
        "Query returned {} rows in {:?}",
        result.row_count, result.execution_time
    );
    ColumnSet::from_result(&result)
}

/// Trait defining the interface for database clients.
///
/// All database operations are async and return Results with LcError.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Executes a SQL query and returns the results.
    async fn execute_query(&self, sql: &str) -> Result<QueryResult>;

    /// Closes the database connection.
    async fn close(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_query_transposes_mock_result() {
        let client = MockDatabaseClient::with_result(QueryResult::with_data(
            vec![ColumnInfo::new("mag", "FLOAT4")],
            vec![vec![Value::Float(12.5)], vec![Value::Float(12.75)]],
        ));

        let columns = query("select unnest(mag) as mag from virac_lc", &client)
            .await
            .unwrap();

        assert_eq!(columns.len(), 2);
        assert_eq!(columns.floats("mag").unwrap(), vec![12.5, 12.75]);
        assert_eq!(
            client.executed_queries(),
            vec!["select unnest(mag) as mag from virac_lc".to_string()]
        );
    }

    #[tokio::test]
    async fn test_query_propagates_failure() {
        let client = FailingDatabaseClient::new("relation \"virac_lc\" does not exist");
        let err = query("select 1", &client).await.unwrap_err();
        assert!(matches!(err, crate::error::LcError::Query(_)));
    }
}
