//! Error types for the Boxscore binary.
//!
//! [`CliError`] wraps every failure that aborts a run. Recoverable problems
//! inside the fold are logged by the pipeline and never reach this type.

use std::path::PathBuf;

use crate::feed::FeedError;

/// Top-level error for the Boxscore binary.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: boxscore_core::config::ConfigError,
    },

    /// The pipeline could not be built.
    #[error("pipeline error: {source}")]
    Pipeline {
        /// The underlying pipeline error.
        #[from]
        source: boxscore_core::PipelineError,
    },

    /// The feed could not be read.
    #[error("feed error: {source}")]
    Feed {
        /// The underlying feed error.
        #[from]
        source: FeedError,
    },

    /// An output file could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// The file or directory being written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// An output record could not be serialized.
    #[error("failed to serialize {}: {source}", path.display())]
    Serialize {
        /// The file the record was meant for.
        path: PathBuf,
        /// The underlying JSON error.
        source: serde_json::Error,
    },
}
