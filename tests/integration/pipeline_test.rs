//! End-to-end pipeline tests against the mock database client.

use pretty_assertions::assert_eq;
use wsdb_lc::app::{run_pipeline, RunOptions};
use wsdb_lc::db::{ColumnInfo, FailingDatabaseClient, MockDatabaseClient, QueryResult, Value};
use wsdb_lc::error::LcError;
use wsdb_lc::lightcurve::{LightcurveQuery, DEFAULT_COLUMNS};

/// Builds a mock returning one row per `(mjd, mag, emag)` epoch.
fn client_with_epochs(epochs: &[(f64, f64, Option<f64>)]) -> MockDatabaseClient {
    let columns = DEFAULT_COLUMNS
        .iter()
        .map(|name| ColumnInfo::new(*name, ""))
        .collect();

    let rows = epochs
        .iter()
        .enumerate()
        .map(|(i, &(mjd, mag, emag))| {
            DEFAULT_COLUMNS
                .iter()
                .map(|name| match *name {
                    "detid" => Value::Int(1000 + i as i64),
                    "catid" => Value::Int(7),
                    "mjdobs" => Value::Float(mjd),
                    "mag" => Value::Float(mag),
                    "emag" => emag.map(Value::Float).unwrap_or(Value::Null),
                    "dp_objtype" => Value::Int(1),
                    "ext" => Value::Int(0),
                    _ => Value::Float(0.5),
                })
                .collect()
        })
        .collect();

    MockDatabaseClient::with_result(QueryResult::with_data(columns, rows))
}

fn three_epochs() -> MockDatabaseClient {
    client_with_epochs(&[
        (57000.0, 14.0, Some(0.05)),
        (57001.0, 14.1, Some(0.04)),
        (57002.0, 13.9, Some(0.06)),
    ])
}

#[tokio::test]
async fn test_saveimage_writes_named_png() {
    let dir = tempfile::tempdir().unwrap();
    let client = three_epochs();
    let options = RunOptions {
        save_image: true,
        output_dir: dir.path().to_path_buf(),
        ..RunOptions::new(42)
    };

    let outcome = run_pipeline(&options, LightcurveQuery::new(), &client)
        .await
        .unwrap();

    let path = dir.path().join("Vv2_KsLC_42.png");
    assert_eq!(outcome.image.as_deref(), Some(path.as_path()));
    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"\x89PNG"));
    assert!(client.is_closed());
}

#[tokio::test]
async fn test_query_is_sent_once_for_the_source() {
    let client = three_epochs();
    run_pipeline(&RunOptions::new(42), LightcurveQuery::new(), &client)
        .await
        .unwrap();

    let queries = client.executed_queries();
    assert_eq!(queries.len(), 1);
    assert!(queries[0].starts_with("select unnest(detid) as detid"));
    assert!(queries[0].ends_with("from virac_lc where sourceid=42"));
}

#[tokio::test]
async fn test_unknown_source_without_plot_succeeds() {
    let client = MockDatabaseClient::new();
    let outcome = run_pipeline(&RunOptions::new(123), LightcurveQuery::new(), &client)
        .await
        .unwrap();

    assert_eq!(outcome.summary.epoch_count, 0);
    assert_eq!(outcome.summary.time_span, None);
    assert_eq!(outcome.image, None);
}

#[tokio::test]
async fn test_unknown_source_raw_plot_is_empty_figure() {
    let dir = tempfile::tempdir().unwrap();
    let client = MockDatabaseClient::new();
    let options = RunOptions {
        save_image: true,
        output_dir: dir.path().to_path_buf(),
        ..RunOptions::new(123)
    };

    run_pipeline(&options, LightcurveQuery::new(), &client)
        .await
        .unwrap();

    assert!(dir.path().join("Vv2_KsLC_123.png").exists());
}

#[tokio::test]
async fn test_shift_without_valid_errors_fails() {
    let dir = tempfile::tempdir().unwrap();
    let client = client_with_epochs(&[(57000.0, 14.0, None), (57001.0, 14.1, None)]);
    let options = RunOptions {
        save_image: true,
        shift: true,
        output_dir: dir.path().to_path_buf(),
        ..RunOptions::new(42)
    };

    let err = run_pipeline(&options, LightcurveQuery::new(), &client)
        .await
        .unwrap_err();

    assert!(matches!(err, LcError::Computation(_)));
    assert_eq!(err.category(), "Computation Error");
    assert!(!dir.path().join("Vv2_KsLC_42.png").exists());
}

#[tokio::test]
async fn test_fold_in_years_writes_png() {
    let dir = tempfile::tempdir().unwrap();
    let client = three_epochs();
    let options = RunOptions {
        save_image: true,
        years: true,
        fold: 0.5,
        xscale: true,
        output_dir: dir.path().to_path_buf(),
        ..RunOptions::new(42)
    };

    let outcome = run_pipeline(&options, LightcurveQuery::new(), &client)
        .await
        .unwrap();

    let (start, end) = outcome.summary.time_span.unwrap();
    assert!(start > 2014.0 && end < 2015.0);
    assert!(dir.path().join("Vv2_KsLC_42.png").exists());
}

#[tokio::test]
async fn test_query_failure_is_reported_and_client_closed() {
    let client = FailingDatabaseClient::new("permission denied for table virac_lc");
    let err = run_pipeline(&RunOptions::new(42), LightcurveQuery::new(), &client)
        .await
        .unwrap_err();

    assert_eq!(err.category(), "Query Error");
    assert!(err.to_string().contains("permission denied"));
    assert!(client.is_closed());
}
