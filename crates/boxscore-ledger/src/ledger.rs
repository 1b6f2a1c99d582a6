//! The aggregation store: every pitcher's season and postseason ledgers.
//!
//! The [`PitcherLedger`] is keyed by player and by [`LedgerKey`] (season id
//! plus postseason flag). During the fold it only holds raw counters;
//! [`PitcherLedger::finalize`] consumes it and produces the
//! [`FinalizedPitcher`] records with career sums and derived rates. Rates
//! therefore cannot be read before the fold is over.
//!
//! # Design
//!
//! - **Get-or-create**: [`ensure_season`] is the only way a ledger comes
//!   into existence, and it hands back the ledger it found or made.
//! - **First team wins**: a season ledger records the first team observed
//!   for it. Mid-season trades are not applied retroactively.
//! - **Checked**: counter updates go through [`PitchingCounters::apply`].
//!
//! [`ensure_season`]: PitcherLedger::ensure_season

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;
use ts_rs::TS;

use boxscore_types::{AttributedEvent, PlayerId, TeamId};

use crate::LedgerError;
use crate::counters::PitchingCounters;
use crate::rates::RateStats;

// ---------------------------------------------------------------------------
// Keys and raw ledgers
// ---------------------------------------------------------------------------

/// Which ledger of a player an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LedgerKey {
    /// Season id.
    pub season: u32,
    /// Whether the ledger covers that season's postseason.
    pub postseason: bool,
}

impl LedgerKey {
    /// Key of the regular-season ledger.
    pub const fn season(season: u32) -> Self {
        Self {
            season,
            postseason: false,
        }
    }

    /// Key of the postseason ledger.
    pub const fn postseason(season: u32) -> Self {
        Self {
            season,
            postseason: true,
        }
    }
}

/// The team a ledger is attributed to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamTag {
    /// Team identifier.
    pub team: Option<TeamId>,
    /// Team display name.
    pub team_name: Option<String>,
}

/// Raw counters of one player in one season or postseason.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeasonLedger {
    /// First team observed for this ledger.
    pub team: Option<TeamId>,
    /// Display name of that team.
    pub team_name: Option<String>,
    /// The tallies.
    pub counters: PitchingCounters,
}

impl SeasonLedger {
    /// Fill in the team fields that are still empty.
    fn adopt_team(&mut self, tag: &TeamTag) {
        if self.team.is_none() {
            self.team.clone_from(&tag.team);
        }
        if self.team_name.is_none() {
            self.team_name.clone_from(&tag.team_name);
        }
    }
}

/// All ledgers of one player.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerLedgers {
    /// Regular-season ledgers by season id.
    pub seasons: BTreeMap<u32, SeasonLedger>,
    /// Postseason ledgers by season id.
    pub postseasons: BTreeMap<u32, SeasonLedger>,
}

impl PlayerLedgers {
    fn entry(&mut self, key: LedgerKey) -> &mut SeasonLedger {
        let book = if key.postseason {
            &mut self.postseasons
        } else {
            &mut self.seasons
        };
        book.entry(key.season).or_default()
    }

    fn get(&self, key: LedgerKey) -> Option<&SeasonLedger> {
        let book = if key.postseason {
            &self.postseasons
        } else {
            &self.seasons
        };
        book.get(&key.season)
    }
}

// ---------------------------------------------------------------------------
// PitcherLedger
// ---------------------------------------------------------------------------

/// Per-player ledgers for a whole run.
#[derive(Debug, Default)]
pub struct PitcherLedger {
    players: BTreeMap<PlayerId, PlayerLedgers>,
}

impl PitcherLedger {
    /// Create an empty store.
    pub const fn new() -> Self {
        Self {
            players: BTreeMap::new(),
        }
    }

    /// Number of players with at least one ledger.
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Whether no ledger exists yet.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Get or create the ledger for `player` under `key`.
    ///
    /// Team fields that are still empty are filled from `tag`; fields that
    /// were already set are left alone.
    pub fn ensure_season(
        &mut self,
        player: &PlayerId,
        key: LedgerKey,
        tag: &TeamTag,
    ) -> &mut SeasonLedger {
        let ledger = self.ledger_mut(player, key);
        ledger.adopt_team(tag);
        ledger
    }

    /// Apply one event to the ledger it is attributed to.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the quantity is zero or the counter would
    /// overflow. Nothing is modified on error.
    pub fn apply(&mut self, attributed: &AttributedEvent) -> Result<(), LedgerError> {
        let event = &attributed.event;
        let key = LedgerKey {
            season: event.season_id,
            postseason: event.is_postseason,
        };
        self.ledger_mut(&attributed.player_id, key)
            .counters
            .apply(event.kind, event.quantity)
    }

    /// Look up a ledger without creating it.
    pub fn get(&self, player: &PlayerId, key: LedgerKey) -> Option<&SeasonLedger> {
        self.players.get(player).and_then(|ledgers| ledgers.get(key))
    }

    /// All ledgers of one player.
    pub fn player(&self, player: &PlayerId) -> Option<&PlayerLedgers> {
        self.players.get(player)
    }

    /// Close the store: compute career sums and derived rates for every
    /// ledger.
    pub fn finalize(self) -> BTreeMap<PlayerId, FinalizedPitcher> {
        debug!(players = self.players.len(), "Finalizing pitcher ledgers");
        self.players
            .into_iter()
            .map(|(player, ledgers)| (player, FinalizedPitcher::from_ledgers(ledgers)))
            .collect()
    }

    fn ledger_mut(&mut self, player: &PlayerId, key: LedgerKey) -> &mut SeasonLedger {
        self.players.entry(player.clone()).or_default().entry(key)
    }
}

// ---------------------------------------------------------------------------
// Finalized output
// ---------------------------------------------------------------------------

/// A ledger with its derived rates, as handed to persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct FinalizedLedger {
    /// Team of the ledger; `None` for career ledgers.
    pub team: Option<TeamId>,
    /// Display name of that team.
    pub team_name: Option<String>,
    /// Final tallies.
    #[serde(flatten)]
    pub counters: PitchingCounters,
    /// Derived statistics.
    #[serde(flatten)]
    pub rates: RateStats,
}

impl FinalizedLedger {
    fn new(team: Option<TeamId>, team_name: Option<String>, counters: PitchingCounters) -> Self {
        Self {
            team,
            team_name,
            rates: RateStats::from_counters(&counters),
            counters,
        }
    }

    fn from_season(ledger: SeasonLedger) -> Self {
        Self::new(ledger.team, ledger.team_name, ledger.counters)
    }
}

/// Every finalized ledger of one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct FinalizedPitcher {
    /// Sum of all regular-season ledgers.
    pub career_season: FinalizedLedger,
    /// Sum of all postseason ledgers.
    pub career_postseason: FinalizedLedger,
    /// Regular-season ledgers by season id.
    pub seasons: BTreeMap<u32, FinalizedLedger>,
    /// Postseason ledgers by season id.
    pub postseasons: BTreeMap<u32, FinalizedLedger>,
}

impl FinalizedPitcher {
    fn from_ledgers(ledgers: PlayerLedgers) -> Self {
        let career_season = career(&ledgers.seasons);
        let career_postseason = career(&ledgers.postseasons);
        Self {
            career_season: FinalizedLedger::new(None, None, career_season),
            career_postseason: FinalizedLedger::new(None, None, career_postseason),
            seasons: finalize_book(ledgers.seasons),
            postseasons: finalize_book(ledgers.postseasons),
        }
    }
}

fn career(book: &BTreeMap<u32, SeasonLedger>) -> PitchingCounters {
    let mut total = PitchingCounters::default();
    for ledger in book.values() {
        total.absorb(&ledger.counters);
    }
    total
}

fn finalize_book(book: BTreeMap<u32, SeasonLedger>) -> BTreeMap<u32, FinalizedLedger> {
    book.into_iter()
        .map(|(season, ledger)| (season, FinalizedLedger::from_season(ledger)))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use boxscore_types::{DomainEvent, EventKind, GameId};
    use rust_decimal::Decimal;

    use super::*;

    fn event(
        player: &str,
        kind: EventKind,
        quantity: u32,
        season: u32,
        post: bool,
    ) -> AttributedEvent {
        AttributedEvent {
            player_id: PlayerId::from(player),
            event: DomainEvent {
                kind,
                quantity,
                game_id: GameId::from("g-1"),
                inning: Some(1),
                outs_at_event: Some(0),
                season_id: season,
                is_postseason: post,
            },
        }
    }

    fn tag(team: &str) -> TeamTag {
        TeamTag {
            team: Some(TeamId::from(team)),
            team_name: Some(format!("The {team}")),
        }
    }

    #[test]
    fn new_store_is_empty() {
        let store = PitcherLedger::new();
        assert!(store.is_empty());
        assert_eq!(store.player_count(), 0);
    }

    #[test]
    fn apply_touches_exactly_one_ledger() {
        let mut store = PitcherLedger::new();
        store
            .apply(&event("p1", EventKind::Strikeout, 1, 2, false))
            .unwrap();
        store
            .apply(&event("p1", EventKind::Strikeout, 1, 2, true))
            .unwrap();

        let player = PlayerId::from("p1");
        let regular = store.get(&player, LedgerKey::season(2)).unwrap();
        let post = store.get(&player, LedgerKey::postseason(2)).unwrap();
        assert_eq!(regular.counters.strikeouts, 1);
        assert_eq!(post.counters.strikeouts, 1);
        assert!(store.get(&player, LedgerKey::season(3)).is_none());
    }

    #[test]
    fn first_team_written_wins() {
        let mut store = PitcherLedger::new();
        let player = PlayerId::from("p1");
        store.ensure_season(&player, LedgerKey::season(0), &tag("crabs"));
        store.ensure_season(&player, LedgerKey::season(0), &tag("moist-talkers"));

        let ledger = store.get(&player, LedgerKey::season(0)).unwrap();
        assert_eq!(ledger.team.as_ref().map(TeamId::as_str), Some("crabs"));
        assert_eq!(ledger.team_name.as_deref(), Some("The crabs"));
    }

    #[test]
    fn team_is_adopted_by_ledger_created_without_one() {
        let mut store = PitcherLedger::new();
        let player = PlayerId::from("p1");
        store
            .apply(&event("p1", EventKind::Hit, 1, 0, false))
            .unwrap();
        store.ensure_season(&player, LedgerKey::season(0), &tag("tigers"));

        let ledger = store.get(&player, LedgerKey::season(0)).unwrap();
        assert_eq!(ledger.team.as_ref().map(TeamId::as_str), Some("tigers"));
        assert_eq!(ledger.counters.hits_allowed, 1);
    }

    #[test]
    fn rejected_event_changes_nothing() {
        let mut store = PitcherLedger::new();
        let result = store.apply(&event("p1", EventKind::EarnedRunAllowed, 0, 0, false));
        assert!(result.is_err());
        let ledger = store.get(&PlayerId::from("p1"), LedgerKey::season(0)).unwrap();
        assert_eq!(ledger.counters, PitchingCounters::default());
    }

    #[test]
    fn finalize_sums_careers_separately() {
        let mut store = PitcherLedger::new();
        store.apply(&event("p1", EventKind::Win, 1, 0, false)).unwrap();
        store.apply(&event("p1", EventKind::Win, 1, 1, false)).unwrap();
        store.apply(&event("p1", EventKind::Loss, 1, 1, true)).unwrap();
        store
            .apply(&event("p1", EventKind::InningPitched, 1, 1, false))
            .unwrap();
        store
            .apply(&event("p1", EventKind::EarnedRunAllowed, 2, 1, false))
            .unwrap();

        let finalized = store.finalize();
        let pitcher = finalized.get(&PlayerId::from("p1")).unwrap();

        assert_eq!(pitcher.seasons.len(), 2);
        assert_eq!(pitcher.postseasons.len(), 1);
        assert_eq!(pitcher.career_season.counters.wins, 2);
        assert_eq!(pitcher.career_season.counters.losses, 0);
        assert_eq!(pitcher.career_postseason.counters.losses, 1);
        assert_eq!(pitcher.career_season.team, None);
        assert_eq!(pitcher.career_season.rates.earned_run_average, Decimal::new(18, 0));
        assert_eq!(pitcher.career_postseason.rates.winning_percentage, Decimal::ZERO);
    }

    #[test]
    fn finalized_ledger_serializes_flat() {
        let mut store = PitcherLedger::new();
        let player = PlayerId::from("p1");
        store.ensure_season(&player, LedgerKey::season(0), &tag("crabs"));
        store.apply(&event("p1", EventKind::Win, 1, 0, false)).unwrap();

        let finalized = store.finalize();
        let json = serde_json::to_value(finalized.get(&player).unwrap()).unwrap();
        let season = &json["seasons"]["0"];
        assert_eq!(season["wins"], 1);
        assert_eq!(season["team"], "crabs");
        assert_eq!(season["winningPercentage"], "1");
        assert!(json["careerPostseason"]["earnedRunAverage"].is_string());
    }
}
