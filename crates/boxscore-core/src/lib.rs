//! Tick diffing, event classification, and the stats fold for Boxscore.
//!
//! This crate turns an ordered feed of full-state game snapshots into
//! per-pitcher ledgers. The fold is single-threaded and strictly ordered:
//! each tick is diffed, classified, and applied before the next one is read.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `boxscore-config.yaml` into
//!   strongly-typed structs.
//! - [`differ`] -- Pairs each game with its previous snapshot and filters
//!   out games with nothing new.
//! - [`roster`] -- [`RosterDirectory`]: player identity, aliases, removals.
//! - [`classifier`] -- [`EventClassifier`]: the ordered rule table over
//!   narration and numeric deltas.
//! - [`plays`] -- Flat per-transition play records.
//! - [`pipeline`] -- [`StatsPipeline`]: the fold itself.
//! - [`finalize`] -- Career sums, rates, and the output records.
//!
//! [`RosterDirectory`]: roster::RosterDirectory
//! [`EventClassifier`]: classifier::EventClassifier
//! [`StatsPipeline`]: pipeline::StatsPipeline

pub mod classifier;
pub mod config;
pub mod differ;
pub mod finalize;
pub mod pipeline;
pub mod plays;
pub mod roster;

pub use config::BoxscoreConfig;
pub use finalize::{PitcherSummary, StatsReport};
pub use pipeline::{AggregationStore, PipelineError, RunStats, StatsPipeline, TickReport};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation for the run output types.

    #[test]
    fn export_bindings() {
        use ts_rs::TS;

        let _ = crate::finalize::PitcherSummary::export_all();
        let _ = crate::pipeline::RunStats::export_all();
    }
}
