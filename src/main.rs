//! wsdb-lc - Grab and plot VIRAC v2 lightcurves from the wsdb.

use tracing::error;
use wsdb_lc::cli::Cli;
use wsdb_lc::{app, logging};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();

    // File logging while the terminal view owns the screen
    if cli.plot {
        logging::init_file_logging();
    } else {
        logging::init_stderr_logging();
    }

    if let Err(e) = app::run(&cli).await {
        error!("{}: {}", e.category(), e);
        if cli.plot {
            eprintln!("{}: {}", e.category(), e);
        }
        std::process::exit(1);
    }
}
