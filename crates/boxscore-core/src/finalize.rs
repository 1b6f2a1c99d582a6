//! Finalizer: closes the store and assembles the output records.
//!
//! Runs exactly once, after the feed is exhausted. Ledgers get their career
//! sums and rate statistics; each pitcher summary is joined with its roster
//! identity. In event-log mode the retained events are grouped per player
//! and checked for decision balance.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{info, warn};
use ts_rs::TS;

use boxscore_ledger::conservation::{ConservationResult, verify_decisions};
use boxscore_ledger::{DecisionAnomaly, FinalizedPitcher};
use boxscore_types::{AttributedEvent, DomainEvent, PlayRecord, PlayerId, PlayerIdentity};

use crate::pipeline::{AggregationStore, RunStats};
use crate::roster::slugify;

/// A finalized pitcher joined with its identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PitcherSummary {
    /// Player identifier.
    pub id: PlayerId,
    /// Canonical display name.
    pub name: String,
    /// URL-safe name, used as the output directory.
    pub slug: String,
    /// Career, season, and postseason ledgers.
    #[serde(flatten)]
    pub stats: FinalizedPitcher,
}

/// The complete result of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsReport {
    /// Every pitcher with at least one ledger.
    pub pitchers: BTreeMap<PlayerId, PitcherSummary>,
    /// Every identity, in order of first appearance.
    pub roster: Vec<PlayerIdentity>,
    /// Retained events per player, in feed order (event-log mode only).
    pub events: Option<BTreeMap<PlayerId, Vec<DomainEvent>>>,
    /// Play records in feed order (only when recording plays).
    pub plays: Option<Vec<PlayRecord>>,
    /// Games without exactly one win and one loss (event-log mode only).
    pub decision_anomaly: Option<DecisionAnomaly>,
    /// Run totals.
    pub run: RunStats,
}

/// Finalize the store.
pub fn finalize(
    store: AggregationStore,
    events: Option<Vec<AttributedEvent>>,
    plays: Option<Vec<PlayRecord>>,
    run: RunStats,
) -> StatsReport {
    let roster = store.roster.into_players();
    let identities: BTreeMap<&PlayerId, &PlayerIdentity> =
        roster.iter().map(|identity| (&identity.id, identity)).collect();

    let pitchers: BTreeMap<PlayerId, PitcherSummary> = store
        .ledger
        .finalize()
        .into_iter()
        .map(|(id, stats)| {
            let (name, slug) = identities.get(&id).map_or_else(
                || (id.as_str().to_owned(), slugify(id.as_str(), &id)),
                |identity| (identity.name.clone(), identity.slug.clone()),
            );
            let summary = PitcherSummary {
                id: id.clone(),
                name,
                slug,
                stats,
            };
            (id, summary)
        })
        .collect();

    let decision_anomaly = events.as_deref().and_then(|log| match verify_decisions(log) {
        ConservationResult::Balanced => None,
        ConservationResult::Anomaly(anomaly) => {
            warn!(games = anomaly.imbalances.len(), "{anomaly}");
            Some(anomaly)
        }
    });

    let events = events.map(group_by_player);

    info!(
        pitchers = pitchers.len(),
        players = roster.len(),
        "Ledgers finalized"
    );

    StatsReport {
        pitchers,
        roster,
        events,
        plays,
        decision_anomaly,
        run,
    }
}

fn group_by_player(events: Vec<AttributedEvent>) -> BTreeMap<PlayerId, Vec<DomainEvent>> {
    let mut grouped: BTreeMap<PlayerId, Vec<DomainEvent>> = BTreeMap::new();
    for attributed in events {
        grouped
            .entry(attributed.player_id)
            .or_default()
            .push(attributed.event);
    }
    grouped
}
