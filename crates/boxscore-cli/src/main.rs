//! Batch binary for Boxscore.
//!
//! Folds a newline-delimited JSON archive of game ticks into per-pitcher
//! ledgers and writes the results as JSON files.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `boxscore-config.yaml` (or `BOXSCORE_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Build the stats pipeline
//! 4. Fold every tick of the feed
//! 5. Finalize the ledgers
//! 6. Write the output files
//!
//! Recoverable problems are logged as warnings and do not change the exit
//! status. A feed that cannot be read or parsed aborts the run.

mod error;
mod feed;
mod output;

use std::path::{Path, PathBuf};

use boxscore_core::StatsPipeline;
use boxscore_core::config::{BoxscoreConfig, LogFormat, LoggingConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::CliError;
use crate::feed::FeedReader;

/// Config file read when `BOXSCORE_CONFIG` is unset.
const DEFAULT_CONFIG_PATH: &str = "boxscore-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if the config, the feed, or an output file fails.
fn main() -> Result<(), CliError> {
    // 1. Load configuration.
    let config_path = std::env::var("BOXSCORE_CONFIG")
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let (config, from_file) = load_config(&config_path)?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!("boxscore starting");
    if from_file {
        info!(path = %config_path.display(), "Configuration loaded");
    } else {
        info!(path = %config_path.display(), "Config file not found, using defaults");
    }

    // 3. Build the pipeline.
    let mut pipeline = StatsPipeline::new(&config.pipeline)?;

    // 4. Fold the feed.
    info!(feed = %config.feed.path.display(), "Reading feed");
    let mut feed = FeedReader::open(&config.feed.path)?;
    for tick in feed.by_ref() {
        pipeline.ingest(tick?);
    }
    info!(lines = feed.lines_read(), "Feed exhausted");

    // 5. Finalize.
    let report = pipeline.finish();

    // 6. Write output.
    output::write_report(&report, &config.output)?;

    info!(
        pitchers = report.pitchers.len(),
        players = report.roster.len(),
        ticks = report.run.ticks,
        warnings = report.run.events_rejected.saturating_add(report.run.removals_unmatched),
        "boxscore finished"
    );
    Ok(())
}

/// Load configuration, falling back to defaults when the file is missing.
///
/// The flag reports whether the file was found.
fn load_config(path: &Path) -> Result<(BoxscoreConfig, bool), CliError> {
    if path.exists() {
        Ok((BoxscoreConfig::from_file(path)?, true))
    } else {
        let mut config = BoxscoreConfig::default();
        config.apply_env_overrides();
        Ok((config, false))
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    match logging.format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}
