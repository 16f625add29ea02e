//! Password lookup in the OS keyring.
//!
//! Connections with `keyring = true` in the config file resolve their
//! password from an entry under the `wsdb-lc` service, keyed by
//! `user@host:port/database`.

use crate::config::ConnectionConfig;
use crate::error::{LcError, Result};
use keyring::Entry;
use tracing::debug;

const SERVICE_NAME: &str = "wsdb-lc";

/// Returns the keyring account name for a connection.
pub fn keyring_key(config: &ConnectionConfig) -> String {
    format!(
        "{}@{}:{}/{}",
        config.user.as_deref().unwrap_or_default(),
        config.host.as_deref().unwrap_or("localhost"),
        config.port,
        config.database.as_deref().unwrap_or(crate::config::DEFAULT_DATABASE),
    )
}

/// Retrieves the password for a connection from the keyring.
///
/// A missing entry is `Ok(None)`; an unusable keyring is an error.
pub fn retrieve_password(config: &ConnectionConfig) -> Result<Option<String>> {
    let key = keyring_key(config);
    debug!("Looking up keyring entry {}", key);

    let entry = Entry::new(SERVICE_NAME, &key)
        .map_err(|e| LcError::config(format!("Failed to access keyring: {e}")))?;

    match entry.get_password() {
        Ok(secret) => Ok(Some(secret)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(LcError::config(format!(
            "Failed to retrieve password from keyring: {e}"
        ))),
    }
}
