//! Configuration loading and typed config structures for Boxscore.
//!
//! The configuration lives in `boxscore-config.yaml` next to the feed
//! archive. This module defines strongly-typed structs that mirror the YAML
//! structure and a loader that reads and parses the file. Every key is
//! optional; a missing file means defaults throughout.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::classifier::{ClassifierSettings, EarnedRunRule, QualityStartRule};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BoxscoreConfig {
    /// How the fold classifies and what it retains.
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Where the feed archive is read from.
    #[serde(default)]
    pub feed: FeedConfig,

    /// Where results are written.
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BoxscoreConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values for paths:
    /// - `BOXSCORE_FEED_PATH` overrides `feed.path`
    /// - `BOXSCORE_OUTPUT_DIR` overrides `output.dir`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Override paths with environment variables when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("BOXSCORE_FEED_PATH") {
            self.feed.path = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("BOXSCORE_OUTPUT_DIR") {
            self.output.dir = PathBuf::from(val);
        }
    }
}

/// Fold behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PipelineConfig {
    /// Keep every classified event as a per-player log.
    #[serde(default)]
    pub retain_events: bool,

    /// Derive a play record for every changed snapshot.
    #[serde(default)]
    pub record_plays: bool,

    /// How quality starts are credited.
    #[serde(default)]
    pub quality_start_rule: QualityStartRule,

    /// How earned runs are charged.
    #[serde(default)]
    pub earned_run_rule: EarnedRunRule,
}

impl PipelineConfig {
    /// The subset of settings the classifier needs.
    pub const fn classifier_settings(&self) -> ClassifierSettings {
        ClassifierSettings {
            quality_start_rule: self.quality_start_rule,
            earned_run_rule: self.earned_run_rule,
        }
    }
}

/// Feed location.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedConfig {
    /// Newline-delimited JSON archive of ticks.
    #[serde(default = "default_feed_path")]
    pub path: PathBuf,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            path: default_feed_path(),
        }
    }
}

/// Output locations.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutputConfig {
    /// Directory for pitcher summaries and logs.
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// Directory for the roster list.
    #[serde(default = "default_players_dir")]
    pub players_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            players_dir: default_players_dir(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error), used when `RUST_LOG`
    /// is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_feed_path() -> PathBuf {
    PathBuf::from("data/blaseball-log.json")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data/pitching")
}

fn default_players_dir() -> PathBuf {
    PathBuf::from("data/players")
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = BoxscoreConfig::default();
        assert!(!config.pipeline.retain_events);
        assert_eq!(config.pipeline.quality_start_rule, QualityStartRule::RunsAllowed);
        assert_eq!(config.pipeline.earned_run_rule, EarnedRunRule::HalfInning);
        assert_eq!(config.output.players_dir, PathBuf::from("data/players"));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
pipeline:
  retain_events: true
  record_plays: true
  quality_start_rule: home_score_literal
  earned_run_rule: score_delta

output:
  players_dir: "out/players"

logging:
  level: "debug"
  format: json
"#;

        let config = BoxscoreConfig::parse(yaml);
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();

        assert!(config.pipeline.retain_events);
        assert!(config.pipeline.record_plays);
        assert_eq!(
            config.pipeline.quality_start_rule,
            QualityStartRule::HomeScoreLiteral
        );
        assert_eq!(config.pipeline.earned_run_rule, EarnedRunRule::ScoreDelta);
        assert_eq!(config.output.players_dir, PathBuf::from("out/players"));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = BoxscoreConfig::parse("pipeline:\n  retain_events: true\n");
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();

        assert!(config.pipeline.retain_events);
        assert!(!config.pipeline.record_plays);
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn unknown_rule_is_rejected() {
        let config = BoxscoreConfig::parse("pipeline:\n  earned_run_rule: vibes\n");
        assert!(matches!(config, Err(ConfigError::Yaml { .. })));
    }
}
