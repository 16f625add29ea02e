//! Lightcurve fetches against a live PostgreSQL database.
//!
//! Skipped unless DATABASE_URL is set. Each test creates its own array
//! table shaped like `virac_lc` and drops it afterwards.

use wsdb_lc::app::{run_pipeline, RunOptions};
use wsdb_lc::config::ConnectionConfig;
use wsdb_lc::db::{DatabaseClient, PostgresClient};
use wsdb_lc::lightcurve::{LightcurveQuery, LightcurveRecord};

fn get_test_database_url() -> Option<String> {
    std::env::var("DATABASE_URL").ok()
}

async fn get_test_client() -> Option<PostgresClient> {
    let url = get_test_database_url()?;
    let config = ConnectionConfig::from_connection_string(&url).ok()?;
    PostgresClient::connect(&config).await.ok()
}

async fn create_lightcurve_table(client: &PostgresClient, table: &str) {
    client
        .execute_query(&format!(
            "create table {table} (
                sourceid bigint primary key,
                detid bigint[], catid bigint[], mjdobs float8[], mag float8[],
                emag float8[], x float8[], y float8[], dp_objtype bigint[],
                dp_chi float8[], ext bigint[], pxl_cnf float8[], sky float8[]
            )"
        ))
        .await
        .unwrap();

    client
        .execute_query(&format!(
            "insert into {table} values (
                42,
                array[1, 2, 3], array[10, 10, 11],
                array[57000.0, 57001.5, 57003.0], array[14.0, 14.2, 13.9],
                array[0.05, null, 0.04], array[1.0, 2.0, 3.0], array[4.0, 5.0, 6.0],
                array[1, 1, 2], array[0.9, 1.1, 1.0], array[0, 0, 1],
                array[0.5, 0.6, 0.7], array[100.0, 101.0, 102.0]
            )"
        ))
        .await
        .unwrap();
}

async fn drop_table(table: &str) {
    if let Some(client) = get_test_client().await {
        let _ = client
            .execute_query(&format!("drop table if exists {table}"))
            .await;
        let _ = client.close().await;
    }
}

#[tokio::test]
async fn test_fetch_unnests_arrays() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };
    let table = "wsdb_lc_test_fetch";
    let _ = client
        .execute_query(&format!("drop table if exists {table}"))
        .await;
    create_lightcurve_table(&client, table).await;

    let record = LightcurveRecord::fetch_with(LightcurveQuery::new().table(table), 42, &client)
        .await
        .unwrap();

    assert_eq!(record.epoch_count(), 3);
    assert_eq!(record.detection_id, vec![1, 2, 3]);
    assert_eq!(record.time, vec![57000.0, 57001.5, 57003.0]);
    assert!(record.magnitude_error[1].is_nan());
    assert_eq!(record.extinction_flag, vec![0, 0, 1]);

    let missing = LightcurveRecord::fetch_with(LightcurveQuery::new().table(table), 7, &client)
        .await
        .unwrap();
    assert!(missing.is_empty());

    client.close().await.unwrap();
    drop_table(table).await;
}

#[tokio::test]
async fn test_pipeline_saves_image_from_database() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };
    let table = "wsdb_lc_test_pipeline";
    let _ = client
        .execute_query(&format!("drop table if exists {table}"))
        .await;
    create_lightcurve_table(&client, table).await;

    let dir = tempfile::tempdir().unwrap();
    let options = RunOptions {
        save_image: true,
        shift: true,
        output_dir: dir.path().to_path_buf(),
        ..RunOptions::new(42)
    };

    let outcome = run_pipeline(&options, LightcurveQuery::new().table(table), &client)
        .await
        .unwrap();

    assert_eq!(outcome.summary.epoch_count, 3);
    assert!(dir.path().join("Vv2_KsLC_42.png").exists());
    drop_table(table).await;
}
