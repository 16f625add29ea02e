//! Command-line argument parsing for wsdb-lc.
//!
//! Uses clap to parse the lightcurve options and the connection overrides.

use crate::config::ConnectionConfig;
use crate::error::Result;
use clap::Parser;
use std::path::PathBuf;

/// Grab a lightcurve from VIRAC v2 in the wsdb.
#[derive(Parser, Debug, Clone)]
#[command(name = "wsdb-lc")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Source ID
    #[arg(value_name = "SOURCEID", allow_negative_numbers = true)]
    pub sourceid: i64,

    /// Display lightcurve figure
    #[arg(short = 'p', long)]
    pub plot: bool,

    /// Save lightcurve figure to disk
    #[arg(short = 'i', long)]
    pub saveimage: bool,

    /// Phase fold period (days default, or years with -y flag)
    #[arg(short = 'f', long, value_name = "PERIOD", default_value_t = 0.0)]
    pub fold: f64,

    /// Time axis in decimal years (default days)
    #[arg(short = 'y', long)]
    pub years: bool,

    /// Scale the time axis to epochs with detections (accepted, currently has no effect)
    #[arg(short = 'x', long)]
    pub xscale: bool,

    /// Shift the time axis so the first detection is at t=0
    #[arg(short = 's', long)]
    pub shiftx: bool,

    /// Directory the saved figure is written to
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    // === Connection options ===
    /// PostgreSQL connection string (e.g., postgres://user@host:port/wsdb)
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Database host
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Database port
    #[arg(long, value_name = "PORT", default_value = "5432")]
    pub port: u16,

    /// Database name
    #[arg(long, value_name = "DATABASE")]
    pub database: Option<String>,

    /// Database user
    #[arg(long, value_name = "USER")]
    pub user: Option<String>,

    /// Use named connection from config
    #[arg(long, value_name = "NAME")]
    pub connection: Option<String>,

    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Converts CLI arguments to a ConnectionConfig.
    ///
    /// This creates a config from CLI args only, without merging with file config.
    pub fn to_connection_config(&self) -> Result<Option<ConnectionConfig>> {
        if let Some(url) = &self.url {
            return Ok(Some(ConnectionConfig::from_connection_string(url)?));
        }

        if self.host.is_some() || self.database.is_some() || self.user.is_some() {
            return Ok(Some(ConnectionConfig {
                host: self.host.clone(),
                port: self.port,
                database: self.database.clone(),
                user: self.user.clone(),
                // Passwords never come from flags
                password: None,
                keyring: false,
            }));
        }

        Ok(None)
    }

    /// Returns the config file path to use.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(crate::config::Config::default_path)
    }

    /// Returns the named connection to use, if specified.
    pub fn connection_name(&self) -> Option<&str> {
        self.connection.as_deref()
    }
}
