//! Writes a finished [`StatsReport`] to disk.
//!
//! Layout under `output.dir`:
//!
//! ```text
//! pitchers.json            every pitcher summary, keyed by player id
//! <slug>/summary.json      one pitcher summary
//! events.json              per-player event log (event-log mode)
//! plays.ndjson             one play record per line (when recording plays)
//! ```
//!
//! and `players.json` under `output.players_dir`.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use boxscore_core::StatsReport;
use boxscore_core::config::OutputConfig;

use crate::error::CliError;

/// Write every file of `report`. Returns the number of files written.
pub fn write_report(report: &StatsReport, output: &OutputConfig) -> Result<usize, CliError> {
    let mut written: usize = 0;

    write_json(&output.dir.join("pitchers.json"), &report.pitchers)?;
    written = written.saturating_add(1);

    for summary in report.pitchers.values() {
        let path = output.dir.join(&summary.slug).join("summary.json");
        write_json(&path, summary)?;
        written = written.saturating_add(1);
    }

    write_json(&output.players_dir.join("players.json"), &report.roster)?;
    written = written.saturating_add(1);

    if let Some(events) = &report.events {
        write_json(&output.dir.join("events.json"), events)?;
        written = written.saturating_add(1);
    }

    if let Some(plays) = &report.plays {
        write_lines(&output.dir.join("plays.ndjson"), plays)?;
        written = written.saturating_add(1);
    }

    info!(
        files = written,
        dir = %output.dir.display(),
        players_dir = %output.players_dir.display(),
        "Output written"
    );
    Ok(written)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), CliError> {
    let body = serde_json::to_string_pretty(value).map_err(|source| CliError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    write_file(path, &body)
}

fn write_lines<T: Serialize>(path: &Path, records: &[T]) -> Result<(), CliError> {
    let mut body = String::new();
    for record in records {
        let line = serde_json::to_string(record).map_err(|source| CliError::Serialize {
            path: path.to_path_buf(),
            source,
        })?;
        // Writing to a String cannot fail.
        let _ = writeln!(body, "{line}");
    }
    write_file(path, &body)
}

fn write_file(path: &Path, body: &str) -> Result<(), CliError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| write_error(parent, source))?;
    }
    fs::write(path, body).map_err(|source| write_error(path, source))?;
    debug!(path = %path.display(), bytes = body.len(), "Wrote file");
    Ok(())
}

fn write_error(path: &Path, source: std::io::Error) -> CliError {
    CliError::Write {
        path: PathBuf::from(path),
        source,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use boxscore_core::StatsPipeline;
    use boxscore_core::config::PipelineConfig;
    use boxscore_types::Tick;
    use serde_json::{Value, json};

    use super::*;

    fn report() -> StatsReport {
        report_with_names("Ñoño Arm", "Other Arm")
    }

    fn report_with_names(home: &str, away: &str) -> StatsReport {
        let config = PipelineConfig {
            retain_events: true,
            record_plays: true,
            ..PipelineConfig::default()
        };
        let mut pipeline = StatsPipeline::new(&config).unwrap();
        let tick: Tick = serde_json::from_value(json!({
            "schedule": [{
                "id": "g1",
                "gameStart": true,
                "season": 0,
                "topOfInning": true,
                "homePitcher": "p1",
                "homePitcherName": home,
                "awayPitcher": "p2",
                "awayPitcherName": away,
                "lastUpdate": "X batting for Y.",
            }],
        }))
        .unwrap();
        pipeline.ingest(tick);
        pipeline.finish()
    }

    #[test]
    fn writes_every_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let output = OutputConfig {
            dir: temp_dir.path().join("pitching"),
            players_dir: temp_dir.path().join("players"),
        };

        let written = write_report(&report(), &output).unwrap();
        assert_eq!(written, 6);

        let summary: Value = serde_json::from_str(
            &fs::read_to_string(output.dir.join("nono-arm").join("summary.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(summary["id"], "p1");
        assert_eq!(summary["seasons"]["0"]["battersFaced"], 1);

        let players: Value = serde_json::from_str(
            &fs::read_to_string(output.players_dir.join("players.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(players.as_array().map(Vec::len), Some(2));

        let plays = fs::read_to_string(output.dir.join("plays.ndjson")).unwrap();
        assert_eq!(plays.lines().count(), 1);
        assert!(output.dir.join("events.json").exists());
    }

    #[test]
    fn summaries_stay_inside_the_output_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let output = OutputConfig {
            dir: temp_dir.path().join("pitching"),
            players_dir: temp_dir.path().join("players"),
        };

        let escape = temp_dir.path().join("escaped");
        let absolute = format!("{}/name", escape.display());
        write_report(&report_with_names(&absolute, "../up"), &output).unwrap();

        assert!(!escape.exists());
        assert!(!temp_dir.path().join("up").exists());
        assert!(output.dir.join("---up").join("summary.json").exists());

        let entries: Vec<_> = fs::read_dir(&output.dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        // pitchers.json, events.json, plays.ndjson, and two summary dirs.
        assert_eq!(entries.len(), 5);
    }
}
