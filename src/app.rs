//! The lightcurve pipeline: fetch, convert, lay out the axis, render.
//!
//! One invocation handles a single source. The database session is opened
//! once, closed as soon as the data is in memory, and never shared.

use crate::cli::Cli;
use crate::config::{Config, ConnectionConfig, PgPass};
use crate::db::{self, DatabaseClient};
use crate::error::{LcError, Result};
use crate::lightcurve::{LightcurveQuery, LightcurveRecord, LightcurveSummary};
use crate::plot::{self, image_filename, render_png, AxisMode, DisplayAxis, PlotData, PlotOptions};
use crate::secrets;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// What to do with the fetched lightcurve.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub source_id: i64,
    /// Show the interactive view.
    pub plot: bool,
    /// Write the PNG file.
    pub save_image: bool,
    /// Fold period; 0 disables folding.
    pub fold: f64,
    /// Convert the time axis to Julian years.
    pub years: bool,
    pub xscale: bool,
    pub shift: bool,
    pub output_dir: PathBuf,
}

impl RunOptions {
    /// Options for `source_id` with everything switched off.
    pub fn new(source_id: i64) -> Self {
        Self {
            source_id,
            plot: false,
            save_image: false,
            fold: 0.0,
            years: false,
            xscale: false,
            shift: false,
            output_dir: PathBuf::from("."),
        }
    }

    pub fn wants_plot(&self) -> bool {
        self.plot || self.save_image
    }

    /// Path the figure is saved to.
    pub fn image_path(&self) -> PathBuf {
        self.output_dir.join(image_filename(self.source_id))
    }
}

impl From<&Cli> for RunOptions {
    fn from(cli: &Cli) -> Self {
        Self {
            source_id: cli.sourceid,
            plot: cli.plot,
            save_image: cli.saveimage,
            fold: cli.fold,
            years: cli.years,
            xscale: cli.xscale,
            shift: cli.shiftx,
            output_dir: cli.output_dir.clone(),
        }
    }
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutcome {
    pub summary: LightcurveSummary,
    /// Where the figure was saved, if it was.
    pub image: Option<PathBuf>,
}

/// Runs the whole pipeline against the database the CLI points at.
pub async fn run(cli: &Cli) -> Result<PipelineOutcome> {
    let options = RunOptions::from(cli);

    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?;

    let connection = resolve_connection(cli, &config)?;
    info!("Connection: {}", connection.display_string());

    let client = db::connect(&connection).await?;
    let query = LightcurveQuery::new().table(&config.lightcurve.table);

    run_pipeline(&options, query, client.as_ref()).await
}

/// Fetches the lightcurve through `client` and presents it.
///
/// `client` is closed as soon as the query has finished, whatever its
/// outcome. Nothing fallible runs before that.
pub async fn run_pipeline(
    options: &RunOptions,
    query: LightcurveQuery<'_>,
    client: &dyn DatabaseClient,
) -> Result<PipelineOutcome> {
    let fetched = LightcurveRecord::fetch_with(query, options.source_id, client).await;
    let closed = client.close().await;
    let mut record = fetched?;
    closed?;

    let mode = AxisMode::from_options(options.fold, options.shift);
    if options.xscale {
        warn!("--xscale is accepted but has no effect");
    }

    if options.years {
        record.to_years()?;
    }

    let summary = record.summary();
    log_summary(options.source_id, &record, &summary);

    let image = present(&record, options, mode)?;

    Ok(PipelineOutcome { summary, image })
}

/// Builds the plot and sends it to the requested outputs.
///
/// The file is written before the interactive view opens.
fn present(
    record: &LightcurveRecord,
    options: &RunOptions,
    mode: AxisMode,
) -> Result<Option<PathBuf>> {
    if !options.wants_plot() {
        return Ok(None);
    }

    let axis = DisplayAxis::compute(record, mode)?;
    if let Some(shift) = axis.shift {
        debug!("Shifted time axis by {}", shift);
    }
    let data = PlotData::new(record, axis);

    let mut image = None;
    if options.save_image {
        std::fs::create_dir_all(&options.output_dir).map_err(|e| {
            LcError::plot(format!(
                "Failed to create output directory {}: {e}",
                options.output_dir.display()
            ))
        })?;

        let path = options.image_path();
        render_png(&data, &path, &PlotOptions::default())?;
        info!("Saved lightcurve figure to {}", path.display());
        image = Some(path);
    }

    if options.plot {
        plot::terminal::show(&data)?;
    }

    Ok(image)
}

fn log_summary(source_id: i64, record: &LightcurveRecord, summary: &LightcurveSummary) {
    if summary.epoch_count == 0 {
        warn!("Source {} has no detections", source_id);
        return;
    }

    info!(
        "Source {}: {} epochs ({} with magnitude errors)",
        source_id, summary.epoch_count, summary.valid_errors
    );
    if let Some((start, end)) = summary.time_span {
        info!("Time span {:.3} - {:.3} {}", start, end, record.time_unit());
    }
    if let Some((bright, faint)) = summary.magnitude_range {
        info!("Ks range {:.3} - {:.3} mag", bright, faint);
    }
}

/// Resolves the final connection configuration.
///
/// Precedence, highest first:
/// 1. CLI arguments
/// 2. Named connection from config, or its `default` connection
/// 3. Environment variables
/// 4. Keyring (when enabled for the connection), then `~/.pgpass`, for the password
/// 5. Built-in defaults
pub fn resolve_connection(cli: &Cli, config: &Config) -> Result<ConnectionConfig> {
    let mut connection = match cli.connection_name() {
        Some(name) => config.get_connection(Some(name)).cloned().ok_or_else(|| {
            LcError::config(format!("Connection '{}' not found in config file", name))
        })?,
        None => config.get_connection(None).cloned().unwrap_or_default(),
    };

    if let Some(overrides) = cli.to_connection_config()? {
        connection.merge(&overrides);
    }

    connection.apply_env_defaults();
    connection.apply_builtin_defaults();

    if connection.password.is_none() && connection.keyring {
        connection.password = secrets::retrieve_password(&connection)?;
        if connection.password.is_some() {
            debug!("Password taken from keyring");
        }
    }

    if connection.password.is_none() {
        if let Some(path) = PgPass::default_path() {
            if connection.apply_pgpass(&path) {
                debug!("Password taken from {}", path.display());
            }
        }
    }

    Ok(connection)
}
