//! PostgreSQL database client implementation.
//!
//! Provides the `PostgresClient` struct that implements the `DatabaseClient` trait
//! for PostgreSQL databases using sqlx.

use crate::config::{ConnectionConfig, DEFAULT_DATABASE};
use crate::db::{ColumnInfo, DatabaseClient, QueryResult, Row, Value};
use crate::error::{LcError, Result};
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgRow};
use sqlx::{Column as SqlxColumn, Executor, Row as SqlxRow, TypeInfo};
use std::time::{Duration, Instant};
use tracing::debug;

/// How long to wait for the server to accept the connection.
const ACQUIRE_TIMEOUT_SECS: u64 = 10;

/// PostgreSQL database client.
///
/// Holds a pool capped at a single connection: the pipeline runs one query.
#[derive(Debug)]
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Connects to the database described by `config`.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let options = connect_options(config);
        debug!("Connecting to {}", config.display_string());

        let pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(ACQUIRE_TIMEOUT_SECS))
            .connect_with(options)
            .await
            .map_err(|e| map_connection_error(e, config))?;

        debug!("Successfully connected to database");
        Ok(Self { pool })
    }

    /// Fetches column metadata for a statement without rows to inspect.
    async fn fetch_column_metadata(&self, sql: &str) -> Result<Vec<ColumnInfo>> {
        let described = (&self.pool)
            .describe(sql)
            .await
            .map_err(|e| LcError::query(format_query_error(e)))?;

        Ok(described
            .columns()
            .iter()
            .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
            .collect())
    }
}

#[async_trait]
impl DatabaseClient for PostgresClient {
    async fn execute_query(&self, sql: &str) -> Result<QueryResult> {
        let start = Instant::now();

        let result = sqlx::query(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| LcError::query(format_query_error(e)))?;

        let execution_time = start.elapsed();

        let columns: Vec<ColumnInfo> = if let Some(first_row) = result.first() {
            first_row
                .columns()
                .iter()
                .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
                .collect()
        } else {
            match self.fetch_column_metadata(sql).await {
                Ok(columns) => columns,
                Err(e) => {
                    debug!("No column metadata for empty result: {}", e);
                    Vec::new()
                }
            }
        };

        let rows = result.iter().map(convert_row).collect::<Result<Vec<Row>>>()?;

        Ok(QueryResult::with_data(columns, rows).with_execution_time(execution_time))
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}

/// Builds sqlx connect options from a resolved connection config.
///
/// The password file has already been consulted during resolution, so sqlx's
/// own `.pgpass` handling is bypassed.
fn connect_options(config: &ConnectionConfig) -> PgConnectOptions {
    let mut options = PgConnectOptions::new_without_pgpass()
        .host(config.host.as_deref().unwrap_or("localhost"))
        .port(config.port)
        .database(config.database.as_deref().unwrap_or(DEFAULT_DATABASE))
        .application_name("wsdb-lc");

    if let Some(user) = &config.user {
        options = options.username(user);
    }
    if let Some(password) = &config.password {
        options = options.password(password);
    }

    options
}

/// Converts a sqlx PgRow to our Row type.
fn convert_row(row: &PgRow) -> Result<Row> {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| convert_value(row, i, col.name(), col.type_info().name()))
        .collect()
}

/// Converts a single column value from a PgRow to our Value type.
///
/// Only SQL NULL becomes `Value::Null`; a value that cannot be decoded is an
/// error naming the column.
fn convert_value(row: &PgRow, index: usize, name: &str, type_name: &str) -> Result<Value> {
    let decoded = match type_name.to_uppercase().as_str() {
        "BOOL" | "BOOLEAN" => row
            .try_get::<Option<bool>, _>(index)
            .map(|v| v.map(Value::Bool)),

        "INT2" | "SMALLINT" => row
            .try_get::<Option<i16>, _>(index)
            .map(|v| v.map(|v| Value::Int(v as i64))),

        "INT4" | "INT" | "INTEGER" => row
            .try_get::<Option<i32>, _>(index)
            .map(|v| v.map(|v| Value::Int(v as i64))),

        "INT8" | "BIGINT" => row
            .try_get::<Option<i64>, _>(index)
            .map(|v| v.map(Value::Int)),

        "FLOAT4" | "REAL" => row
            .try_get::<Option<f32>, _>(index)
            .map(|v| v.map(|v| Value::Float(v as f64))),

        "FLOAT8" | "DOUBLE PRECISION" => row
            .try_get::<Option<f64>, _>(index)
            .map(|v| v.map(Value::Float)),

        "BYTEA" => row
            .try_get::<Option<Vec<u8>>, _>(index)
            .map(|v| v.map(Value::Bytes)),

        "NUMERIC" => {
            return Err(LcError::query(format!(
                "Column '{name}' has type NUMERIC; cast it to double precision"
            )));
        }

        // Text-like types
        _ => row
            .try_get::<Option<String>, _>(index)
            .map(|v| v.map(Value::String)),
    };

    decoded
        .map(|v| v.unwrap_or(Value::Null))
        .map_err(|e| decode_error(name, type_name, e))
}

fn decode_error(name: &str, type_name: &str, error: sqlx::Error) -> LcError {
    LcError::query(format!(
        "Cannot decode column '{name}' of type {type_name}: {error}"
    ))
}

/// Maps sqlx connection errors to user-friendly messages.
fn map_connection_error(error: sqlx::Error, config: &ConnectionConfig) -> LcError {
    let host = config.host.as_deref().unwrap_or("localhost");
    let port = config.port;
    let user = config.user.as_deref().unwrap_or("unknown");
    let database = config.database.as_deref().unwrap_or(DEFAULT_DATABASE);

    let error_str = error.to_string().to_lowercase();

    if error_str.contains("connection refused") || error_str.contains("could not connect") {
        LcError::connection(format!(
            "Cannot connect to {host}:{port}. Check that the server is running."
        ))
    } else if error_str.contains("password authentication failed")
        || error_str.contains("authentication failed")
    {
        LcError::connection(format!(
            "Authentication failed for user '{user}'. Check your credentials \
             (~/.pgpass, PGPASSWORD or the config file)."
        ))
    } else if error_str.contains("does not exist") && error_str.contains("database") {
        LcError::connection(format!("Database '{database}' does not exist."))
    } else if error_str.contains("ssl") || error_str.contains("tls") {
        LcError::connection(format!("TLS negotiation with {host}:{port} failed: {error}"))
    } else if error_str.contains("timed out") || error_str.contains("timeout") {
        LcError::connection(format!(
            "Connection to {host}:{port} timed out. The server may be overloaded or unreachable."
        ))
    } else {
        LcError::connection(error.to_string())
    }
}

/// Formats a query error with hints if available.
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
