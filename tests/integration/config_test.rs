//! Connection resolution tests using real config and password files.

use std::fs;
use wsdb_lc::config::{Config, ConnectionConfig, PgPass};

#[test]
fn test_load_config_with_named_connections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
[lightcurve]
table = "virac2.lc"

[connections.default]
host = "wsdb.example.org"
database = "wsdb"
user = "astro"

[connections.local]
host = "localhost"
port = 5433
keyring = true
"#,
    )
    .unwrap();

    let config = Config::load_from_file(&path).unwrap();

    assert_eq!(config.lightcurve.table, "virac2.lc");
    let default = config.get_connection(None).unwrap();
    assert_eq!(default.host.as_deref(), Some("wsdb.example.org"));
    assert_eq!(default.port, 5432);
    let local = config.get_connection(Some("local")).unwrap();
    assert_eq!(local.port, 5433);
    assert!(local.keyring);
}

#[test]
fn test_missing_config_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load_from_file(&dir.path().join("absent.toml")).unwrap();

    assert_eq!(config.lightcurve.table, "virac_lc");
    assert!(config.connections.is_empty());
}

#[test]
fn test_invalid_config_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "connections = 3").unwrap();

    let err = Config::load_from_file(&path).unwrap_err();
    assert_eq!(err.category(), "Configuration Error");
}

#[cfg(unix)]
#[test]
fn test_pgpass_supplies_password() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pgpass");
    fs::write(&path, "wsdb.example.org:5432:wsdb:astro:s3cret\n").unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o600)).unwrap();

    let mut connection = ConnectionConfig {
        host: Some("wsdb.example.org".to_string()),
        database: Some("wsdb".to_string()),
        user: Some("astro".to_string()),
        ..ConnectionConfig::default()
    };

    assert!(connection.apply_pgpass(&path));
    assert_eq!(connection.password.as_deref(), Some("s3cret"));
    assert!(!connection.display_string().contains("s3cret"));
}

#[cfg(unix)]
#[test]
fn test_world_readable_pgpass_is_ignored() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pgpass");
    fs::write(&path, "*:*:*:*:s3cret\n").unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

    assert!(PgPass::load(&path).is_err());

    let mut connection = ConnectionConfig {
        user: Some("astro".to_string()),
        ..ConnectionConfig::default()
    };
    connection.apply_builtin_defaults();
    assert!(!connection.apply_pgpass(&path));
    assert_eq!(connection.password, None);
}
