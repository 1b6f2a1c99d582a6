//! Per-pitcher ledgers for the Boxscore pipeline.
//!
//! Every pitching event extracted from the feed lands in exactly one ledger:
//! the (player, season, postseason) ledger it is attributed to. Ledgers hold
//! raw tallies while the feed is folded; career sums and rate statistics
//! only exist once the store is finalized.
//!
//! # Architecture
//!
//! - [`counters`] -- [`PitchingCounters`]: the tally set and its checked updates.
//! - [`ledger`] -- [`PitcherLedger`]: the keyed store, get-or-create, finalize.
//! - [`rates`] -- [`RateStats`]: ERA, WHIP, K/BB, per-nine rates, winning percentage.
//! - [`conservation`] -- one-win-one-loss verification over an event log.
//!
//! # Usage
//!
//! ```
//! use boxscore_ledger::{LedgerKey, PitcherLedger};
//! use boxscore_types::{AttributedEvent, DomainEvent, EventKind, GameId, PlayerId};
//!
//! let mut store = PitcherLedger::new();
//! let event = AttributedEvent {
//!     player_id: PlayerId::from("p1"),
//!     event: DomainEvent {
//!         kind: EventKind::InningPitched,
//!         quantity: 1,
//!         game_id: GameId::from("g1"),
//!         inning: Some(0),
//!         outs_at_event: Some(2),
//!         season_id: 0,
//!         is_postseason: false,
//!     },
//! };
//! store.apply(&event).ok();
//!
//! let finalized = store.finalize();
//! let career = &finalized[&PlayerId::from("p1")].career_season;
//! assert_eq!(career.counters.innings_pitched, 1);
//! ```

pub mod conservation;
pub mod counters;
pub mod ledger;
pub mod rates;

// Re-export primary types at crate root.
pub use conservation::ConservationResult;
pub use counters::PitchingCounters;
pub use ledger::{
    FinalizedLedger, FinalizedPitcher, LedgerKey, PitcherLedger, PlayerLedgers, SeasonLedger,
    TeamTag,
};
pub use rates::RateStats;

use std::collections::BTreeMap;

use boxscore_types::{EventKind, GameId};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when applying an event to a ledger.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// Events must carry a positive quantity.
    #[error("{kind} event quantity must be non-zero")]
    ZeroQuantity {
        /// The kind of the rejected event.
        kind: EventKind,
    },

    /// The counter would exceed `u32::MAX`.
    #[error("{kind} counter overflow")]
    Overflow {
        /// The kind of the rejected event.
        kind: EventKind,
    },
}

// ---------------------------------------------------------------------------
// Anomaly type
// ---------------------------------------------------------------------------

/// Games whose win/loss tallies are not exactly one each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionAnomaly {
    /// Per-game (wins, losses) for every unbalanced game.
    pub imbalances: BTreeMap<GameId, (u32, u32)>,
    /// Human-readable description of the anomaly.
    pub message: String,
}

impl core::fmt::Display for DecisionAnomaly {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation for the ledger output types.

    #[test]
    fn export_bindings() {
        use ts_rs::TS;

        let _ = crate::counters::PitchingCounters::export_all();
        let _ = crate::rates::RateStats::export_all();
        let _ = crate::ledger::FinalizedLedger::export_all();
        let _ = crate::ledger::FinalizedPitcher::export_all();
    }
}
