//! Raw tally counters of one pitching ledger.
//!
//! Counters only ever grow during the fold. Each [`EventKind`] maps onto
//! exactly one counter, and every increment is checked: an overflow is an
//! error, never a wrap.

use serde::Serialize;
use ts_rs::TS;

use boxscore_types::EventKind;

use crate::LedgerError;

/// The tally counters kept for one player in one season, postseason, or
/// career.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PitchingCounters {
    /// Games started that reached "Game Over".
    pub appearances: u32,
    /// Batters who stepped up against this pitcher.
    pub batters_faced: u32,
    /// Walks issued.
    pub bases_on_balls: u32,
    /// Runs charged.
    pub earned_runs: u32,
    /// Batters retired on fly balls.
    pub flyouts: u32,
    /// Batters retired on ground balls.
    pub groundouts: u32,
    /// Hits allowed, home runs included.
    pub hits_allowed: u32,
    /// Home runs allowed.
    pub home_runs: u32,
    /// Half innings completed on the mound.
    pub innings_pitched: u32,
    /// Decisions lost.
    pub losses: u32,
    /// Completed games with three runs allowed or fewer.
    pub quality_starts: u32,
    /// Completed games with zero runs allowed.
    pub shutouts: u32,
    /// Batters struck out.
    pub strikeouts: u32,
    /// Decisions won.
    pub wins: u32,
}

impl PitchingCounters {
    /// Add `quantity` to the counter that `kind` maps onto.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::ZeroQuantity`] for a zero quantity and
    /// [`LedgerError::Overflow`] if the counter would overflow. The counters
    /// are left untouched on error.
    pub fn apply(&mut self, kind: EventKind, quantity: u32) -> Result<(), LedgerError> {
        if quantity == 0 {
            return Err(LedgerError::ZeroQuantity { kind });
        }

        let counter = self.counter_mut(kind);
        *counter = counter
            .checked_add(quantity)
            .ok_or(LedgerError::Overflow { kind })?;
        Ok(())
    }

    /// Read the counter that `kind` maps onto.
    pub const fn get(&self, kind: EventKind) -> u32 {
        match kind {
            EventKind::Appearance => self.appearances,
            EventKind::Win => self.wins,
            EventKind::Loss => self.losses,
            EventKind::InningPitched => self.innings_pitched,
            EventKind::Flyout => self.flyouts,
            EventKind::Groundout => self.groundouts,
            EventKind::Hit => self.hits_allowed,
            EventKind::BaseOnBalls => self.bases_on_balls,
            EventKind::Strikeout => self.strikeouts,
            EventKind::BatterFaced => self.batters_faced,
            EventKind::EarnedRunAllowed => self.earned_runs,
            EventKind::HomeRun => self.home_runs,
            EventKind::QualityStart => self.quality_starts,
            EventKind::Shutout => self.shutouts,
        }
    }

    /// Add every counter of `other` into `self`, saturating at `u32::MAX`.
    pub const fn absorb(&mut self, other: &Self) {
        self.appearances = self.appearances.saturating_add(other.appearances);
        self.batters_faced = self.batters_faced.saturating_add(other.batters_faced);
        self.bases_on_balls = self.bases_on_balls.saturating_add(other.bases_on_balls);
        self.earned_runs = self.earned_runs.saturating_add(other.earned_runs);
        self.flyouts = self.flyouts.saturating_add(other.flyouts);
        self.groundouts = self.groundouts.saturating_add(other.groundouts);
        self.hits_allowed = self.hits_allowed.saturating_add(other.hits_allowed);
        self.home_runs = self.home_runs.saturating_add(other.home_runs);
        self.innings_pitched = self.innings_pitched.saturating_add(other.innings_pitched);
        self.losses = self.losses.saturating_add(other.losses);
        self.quality_starts = self.quality_starts.saturating_add(other.quality_starts);
        self.shutouts = self.shutouts.saturating_add(other.shutouts);
        self.strikeouts = self.strikeouts.saturating_add(other.strikeouts);
        self.wins = self.wins.saturating_add(other.wins);
    }

    const fn counter_mut(&mut self, kind: EventKind) -> &mut u32 {
        match kind {
            EventKind::Appearance => &mut self.appearances,
            EventKind::Win => &mut self.wins,
            EventKind::Loss => &mut self.losses,
            EventKind::InningPitched => &mut self.innings_pitched,
            EventKind::Flyout => &mut self.flyouts,
            EventKind::Groundout => &mut self.groundouts,
            EventKind::Hit => &mut self.hits_allowed,
            EventKind::BaseOnBalls => &mut self.bases_on_balls,
            EventKind::Strikeout => &mut self.strikeouts,
            EventKind::BatterFaced => &mut self.batters_faced,
            EventKind::EarnedRunAllowed => &mut self.earned_runs,
            EventKind::HomeRun => &mut self.home_runs,
            EventKind::QualityStart => &mut self.quality_starts,
            EventKind::Shutout => &mut self.shutouts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_increments_the_mapped_counter() {
        let mut counters = PitchingCounters::default();
        assert!(counters.apply(EventKind::EarnedRunAllowed, 3).is_ok());
        assert!(counters.apply(EventKind::Hit, 1).is_ok());

        assert_eq!(counters.earned_runs, 3);
        assert_eq!(counters.get(EventKind::Hit), 1);
        assert_eq!(counters.home_runs, 0);
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let mut counters = PitchingCounters::default();
        let result = counters.apply(EventKind::Strikeout, 0);
        assert!(matches!(result, Err(LedgerError::ZeroQuantity { .. })));
        assert_eq!(counters, PitchingCounters::default());
    }

    #[test]
    fn overflow_leaves_counter_untouched() {
        let mut counters = PitchingCounters {
            strikeouts: u32::MAX,
            ..PitchingCounters::default()
        };
        let result = counters.apply(EventKind::Strikeout, 1);
        assert!(matches!(result, Err(LedgerError::Overflow { .. })));
        assert_eq!(counters.strikeouts, u32::MAX);
    }

    #[test]
    fn absorb_sums_element_wise() {
        let mut career = PitchingCounters {
            wins: 2,
            innings_pitched: 10,
            ..PitchingCounters::default()
        };
        let season = PitchingCounters {
            wins: 1,
            losses: 4,
            innings_pitched: 5,
            ..PitchingCounters::default()
        };
        career.absorb(&season);

        assert_eq!(career.wins, 3);
        assert_eq!(career.losses, 4);
        assert_eq!(career.innings_pitched, 15);
    }
}
