//! wsdb-lc - Grab and plot VIRAC v2 lightcurves from the wsdb.
//!
//! This library exposes the core modules for use in integration tests.

pub mod app;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod lightcurve;
pub mod logging;
pub mod plot;
pub mod secrets;
