//! Error types for wsdb-lc.
//!
//! Defines the main error enum used throughout the application.

use thiserror::Error;

/// Main error type for lightcurve operations.
#[derive(Error, Debug)]
pub enum LcError {
    /// Database connection errors (host unreachable, auth failed, etc.)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution errors (syntax errors, missing table or columns, bad data, etc.)
    #[error("Query error: {0}")]
    Query(String),

    /// Configuration errors (invalid config file, bad arguments, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Computation errors on lightcurve data (no valid shift, double conversion, etc.)
    #[error("Computation error: {0}")]
    Computation(String),

    /// Plot rendering or image output errors.
    #[error("Plot error: {0}")]
    Plot(String),

    /// Internal application errors (terminal setup, unexpected states, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LcError {
    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a computation error with the given message.
    pub fn computation(msg: impl Into<String>) -> Self {
        Self::Computation(msg.into())
    }

    /// Creates a plot error with the given message.
    pub fn plot(msg: impl Into<String>) -> Self {
        Self::Plot(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection(_) => "Connection Error",
            Self::Query(_) => "Query Error",
            Self::Config(_) => "Configuration Error",
            Self::Computation(_) => "Computation Error",
            Self::Plot(_) => "Plot Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Result type alias using LcError.
pub type Result<T> = std::result::Result<T, LcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_connection() {
        let err = LcError::connection("Cannot connect to wsdb.example.org:5432");
        assert_eq!(
            err.to_string(),
            "Connection error: Cannot connect to wsdb.example.org:5432"
        );
        assert_eq!(err.category(), "Connection Error");
    }

    #[test]
    fn test_error_display_query() {
        let err = LcError::query("relation \"virac_lc\" does not exist");
        assert_eq!(
            err.to_string(),
            "Query error: relation \"virac_lc\" does not exist"
        );
        assert_eq!(err.category(), "Query Error");
    }

    #[test]
    fn test_error_display_config() {
        let err = LcError::config("missing field 'database' in connections.default");
        assert_eq!(
            err.to_string(),
            "Configuration error: missing field 'database' in connections.default"
        );
        assert_eq!(err.category(), "Configuration Error");
    }

    #[test]
    fn test_error_display_computation() {
        let err = LcError::computation("no detection with a valid magnitude error");
        assert_eq!(
            err.to_string(),
            "Computation error: no detection with a valid magnitude error"
        );
        assert_eq!(err.category(), "Computation Error");
    }

    #[test]
    fn test_error_display_plot() {
        let err = LcError::plot("permission denied");
        assert_eq!(err.to_string(), "Plot error: permission denied");
        assert_eq!(err.category(), "Plot Error");
    }

    #[test]
    fn test_error_display_internal() {
        let err = LcError::internal("unexpected state");
        assert_eq!(err.to_string(), "Internal error: unexpected state");
        assert_eq!(err.category(), "Internal Error");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<LcError>();
    }
}
