//! Integration tests for wsdb-lc.

mod config_test;
mod pipeline_test;
mod postgres_test;
