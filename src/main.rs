//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `osm_changesets` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output and exit codes
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use osm_changesets::initialization::init_logger_with;
use osm_changesets::{ingest, Config, Opt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Connection parameters may come from a .env file next to the dump
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("osm_changesets: ignoring unreadable .env file: {e}");
        }
    }

    // Missing or extra arguments and nonexistent paths exit with status 2 here
    let opt = Opt::parse();

    init_logger_with(opt.log_level.clone().into(), opt.log_format.clone())
        .context("Failed to initialize logger")?;

    let config = match Config::from_env(opt) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("osm_changesets error: {e}");
            process::exit(2);
        }
    };

    match ingest(&config).await {
        Ok(report) => {
            println!(
                "Loaded {} changeset{} in {} batch{} ({} rows) in {:.1}s",
                report.records,
                if report.records == 1 { "" } else { "s" },
                report.batches,
                if report.batches == 1 { "" } else { "es" },
                report.rows_loaded,
                report.elapsed_seconds
            );
            Ok(())
        }
        Err(e) => {
            let code = e.exit_code();
            log::error!("Ingest failed: {e}");
            eprintln!("osm_changesets error: {:#}", anyhow::Error::new(e));
            process::exit(code);
        }
    }
}
