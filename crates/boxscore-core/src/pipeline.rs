//! The stats fold: ticks in, ledgers and roster out.
//!
//! [`StatsPipeline`] owns the whole run state: the aggregation store, the
//! previous tick, and the optional event and play logs. Each call to
//! [`StatsPipeline::ingest`] processes one tick completely:
//!
//! 1. **Diff** -- pair every game with its previous snapshot and drop the
//!    games that did not change.
//! 2. **Resolve** -- get-or-create both starters in the roster and open
//!    their ledgers for the current season.
//! 3. **Classify** -- run the rule table over the transition.
//! 4. **Apply** -- mark removals in the roster, fold events into ledgers.
//! 5. **Record** -- keep the events and play records if configured.
//!
//! [`StatsPipeline::finish`] consumes the pipeline, so nothing can be
//! ingested after the ledgers are finalized.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use ts_rs::TS;

use boxscore_ledger::{LedgerKey, PitcherLedger, TeamTag};
use boxscore_types::{AttributedEvent, PlayRecord, Side, Tick};

use crate::classifier::{ClassifierError, EventClassifier};
use crate::config::PipelineConfig;
use crate::differ::{DiffContext, diff_tick};
use crate::finalize::{self, StatsReport};
use crate::plays::PlayRecorder;
use crate::roster::RosterDirectory;

/// Errors that can occur when building a pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The classifier could not be built.
    #[error("classifier error: {source}")]
    Classifier {
        /// The underlying classifier error.
        #[from]
        source: ClassifierError,
    },
}

/// Everything the fold mutates: every pitcher's ledgers and the roster.
#[derive(Debug, Default)]
pub struct AggregationStore {
    /// Per-pitcher season and postseason ledgers.
    pub ledger: PitcherLedger,
    /// Player identities.
    pub roster: RosterDirectory,
}

/// Running totals for a whole fold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct RunStats {
    /// Ticks ingested.
    pub ticks: u64,
    /// Ticks skipped as exact repeats of their predecessor.
    pub duplicate_ticks: u64,
    /// Game transitions handed to the classifier.
    pub transitions: u64,
    /// Games filtered out by the differ.
    pub skipped_games: u64,
    /// Events applied to a ledger.
    pub events_applied: u64,
    /// Events a ledger refused.
    pub events_rejected: u64,
    /// Removals applied to the roster.
    pub removals: u64,
    /// Removals whose player was not in the roster.
    pub removals_unmatched: u64,
}

/// What one call to [`StatsPipeline::ingest`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// The tick repeated its predecessor and was skipped.
    pub duplicate: bool,
    /// Games that changed.
    pub transitions: usize,
    /// Events applied across those games.
    pub events: usize,
}

/// The single-threaded stats fold.
#[derive(Debug)]
pub struct StatsPipeline {
    config: PipelineConfig,
    classifier: EventClassifier,
    recorder: Option<PlayRecorder>,
    store: AggregationStore,
    previous: Option<Tick>,
    events: Vec<AttributedEvent>,
    plays: Vec<PlayRecord>,
    stats: RunStats,
}

impl StatsPipeline {
    /// Build a pipeline with an empty store.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Classifier`] if a narration pattern fails to
    /// compile.
    pub fn new(config: &PipelineConfig) -> Result<Self, PipelineError> {
        let classifier = EventClassifier::new(config.classifier_settings())?;
        let recorder = if config.record_plays {
            Some(PlayRecorder::new()?)
        } else {
            None
        };

        info!(
            retain_events = config.retain_events,
            record_plays = config.record_plays,
            quality_start_rule = ?config.quality_start_rule,
            earned_run_rule = ?config.earned_run_rule,
            "Stats pipeline ready"
        );

        Ok(Self {
            config: *config,
            classifier,
            recorder,
            store: AggregationStore::default(),
            previous: None,
            events: Vec::new(),
            plays: Vec::new(),
            stats: RunStats::default(),
        })
    }

    /// The aggregation store as it stands.
    pub const fn store(&self) -> &AggregationStore {
        &self.store
    }

    /// Running totals so far.
    pub const fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Fold one tick into the store.
    pub fn ingest(&mut self, tick: Tick) -> TickReport {
        self.stats.ticks = self.stats.ticks.saturating_add(1);
        let perceived_at = tick.perceived_at();

        let previous = self.previous.take();
        let diff = diff_tick(previous.as_ref(), &tick);
        let mut report = TickReport {
            duplicate: diff.duplicate,
            transitions: diff.contexts.len(),
            events: 0,
        };

        if diff.duplicate {
            self.stats.duplicate_ticks = self.stats.duplicate_ticks.saturating_add(1);
        }
        self.stats.skipped_games = self
            .stats
            .skipped_games
            .saturating_add(count(diff.skipped.len()));
        self.stats.transitions = self.stats.transitions.saturating_add(count(diff.contexts.len()));

        for ctx in &diff.contexts {
            let applied = self.process(ctx, perceived_at);
            report.events = report.events.saturating_add(applied);
        }

        self.previous = Some(tick);
        report
    }

    /// Fold every tick of an iterator.
    pub fn ingest_all<I>(&mut self, ticks: I)
    where
        I: IntoIterator<Item = Tick>,
    {
        for tick in ticks {
            self.ingest(tick);
        }
    }

    /// Close the fold and finalize every ledger.
    pub fn finish(self) -> StatsReport {
        info!(
            ticks = self.stats.ticks,
            duplicate_ticks = self.stats.duplicate_ticks,
            transitions = self.stats.transitions,
            events_applied = self.stats.events_applied,
            pitchers = self.store.ledger.player_count(),
            "Feed exhausted, finalizing"
        );

        let events = self.config.retain_events.then_some(self.events);
        let plays = self.config.record_plays.then_some(self.plays);
        finalize::finalize(self.store, events, plays, self.stats)
    }

    /// Process one changed game. Returns the number of events applied.
    fn process(&mut self, ctx: &DiffContext<'_>, perceived_at: Option<DateTime<Utc>>) -> usize {
        let current = ctx.current;

        for side in [Side::Away, Side::Home] {
            let Some(player) = current.pitcher(side) else {
                continue;
            };
            self.store.roster.resolve(
                player,
                current.pitcher_name(side),
                current,
                ctx.game_id,
                side,
            );

            match current.season {
                Some(season) => {
                    let key = LedgerKey {
                        season,
                        postseason: current.is_postseason,
                    };
                    let tag = TeamTag {
                        team: current.team(side).cloned(),
                        team_name: current.team_name(side).map(str::to_owned),
                    };
                    self.store.ledger.ensure_season(player, key, &tag);
                }
                None => {
                    warn!(
                        game_id = %ctx.game_id,
                        player = %player,
                        "Snapshot has no season, ledger not opened"
                    );
                }
            }
        }

        let classification = self.classifier.classify(ctx);

        for removal in classification.removals {
            if self.store.roster.mark_removed(&removal.name, removal.at).is_some() {
                self.stats.removals = self.stats.removals.saturating_add(1);
            } else {
                warn!(
                    name = %removal.name,
                    game_id = %ctx.game_id,
                    "Unable to locate incinerated player"
                );
                self.stats.removals_unmatched = self.stats.removals_unmatched.saturating_add(1);
            }
        }

        let mut applied: usize = 0;
        for event in classification.events {
            match self.store.ledger.apply(&event) {
                Ok(()) => {
                    applied = applied.saturating_add(1);
                    if self.config.retain_events {
                        self.events.push(event);
                    }
                }
                Err(err) => {
                    warn!(
                        player = %event.player_id,
                        game_id = %event.event.game_id,
                        error = %err,
                        "Ledger rejected event"
                    );
                    self.stats.events_rejected = self.stats.events_rejected.saturating_add(1);
                }
            }
        }
        self.stats.events_applied = self.stats.events_applied.saturating_add(count(applied));

        if let Some(recorder) = &self.recorder {
            self.plays.push(recorder.record(ctx, perceived_at));
        }

        debug!(game_id = %ctx.game_id, events = applied, "Transition processed");
        applied
    }
}

fn count(n: usize) -> u64 {
    u64::try_from(n).unwrap_or(u64::MAX)
}
