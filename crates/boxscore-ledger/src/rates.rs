//! Derived (non-tally) pitching statistics.
//!
//! Rates are pure functions of the final counters and are only computed at
//! finalize. Every quotient uses [`Decimal`] and yields zero when its
//! denominator is zero.

use rust_decimal::Decimal;
use serde::Serialize;
use ts_rs::TS;

use crate::counters::PitchingCounters;

/// Innings in a regulation game, the scale of every per-nine rate.
const NINE: Decimal = Decimal::from_parts(9, 0, 0, false, 0);

/// The derived statistics of one finalized ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct RateStats {
    /// Walks per nine innings.
    #[ts(as = "String")]
    pub bases_on_balls_per_nine: Decimal,
    /// Earned runs per nine innings (ERA).
    #[ts(as = "String")]
    pub earned_run_average: Decimal,
    /// Hits allowed per nine innings.
    #[ts(as = "String")]
    pub hits_allowed_per_nine: Decimal,
    /// Home runs allowed per nine innings.
    #[ts(as = "String")]
    pub home_runs_per_nine: Decimal,
    /// Strikeouts per nine innings.
    #[ts(as = "String")]
    pub strikeouts_per_nine: Decimal,
    /// Strikeouts per batter faced.
    #[ts(as = "String")]
    pub strikeout_rate: Decimal,
    /// Strikeouts per walk (K/BB).
    #[ts(as = "String")]
    pub strikeout_to_walk_ratio: Decimal,
    /// Walks plus hits per inning pitched (WHIP).
    #[ts(as = "String")]
    pub walks_and_hits_per_inning_pitched: Decimal,
    /// Walks per batter faced.
    #[ts(as = "String")]
    pub walk_rate: Decimal,
    /// Share of decisions won.
    #[ts(as = "String")]
    pub winning_percentage: Decimal,
}

impl RateStats {
    /// Compute every derived statistic from final counters.
    pub fn from_counters(counters: &PitchingCounters) -> Self {
        let innings = Decimal::from(counters.innings_pitched);
        let batters = Decimal::from(counters.batters_faced);
        let walks = Decimal::from(counters.bases_on_balls);
        let hits = Decimal::from(counters.hits_allowed);
        let strikeouts = Decimal::from(counters.strikeouts);

        Self {
            bases_on_balls_per_nine: per_nine(walks, innings),
            earned_run_average: earned_run_average(counters),
            hits_allowed_per_nine: per_nine(hits, innings),
            home_runs_per_nine: per_nine(Decimal::from(counters.home_runs), innings),
            strikeouts_per_nine: per_nine(strikeouts, innings),
            strikeout_rate: ratio(strikeouts, batters),
            strikeout_to_walk_ratio: ratio(strikeouts, walks),
            walks_and_hits_per_inning_pitched: ratio(
                walks.checked_add(hits).unwrap_or(Decimal::MAX),
                innings,
            ),
            walk_rate: ratio(walks, batters),
            winning_percentage: winning_percentage(counters.wins, counters.losses),
        }
    }
}

/// `9 * earned_runs / innings_pitched`, or zero with no innings.
pub fn earned_run_average(counters: &PitchingCounters) -> Decimal {
    per_nine(
        Decimal::from(counters.earned_runs),
        Decimal::from(counters.innings_pitched),
    )
}

/// Share of decisions won.
///
/// A pitcher with wins gets `wins / (wins + losses)`; one with only losses
/// gets zero; one with no decisions at all gets one.
pub fn winning_percentage(wins: u32, losses: u32) -> Decimal {
    if wins > 0 {
        let decisions = u64::from(wins).saturating_add(u64::from(losses));
        ratio(Decimal::from(wins), Decimal::from(decisions))
    } else if losses > 0 {
        Decimal::ZERO
    } else {
        Decimal::ONE
    }
}

fn per_nine(count: Decimal, innings: Decimal) -> Decimal {
    count
        .checked_mul(NINE)
        .map_or(Decimal::ZERO, |scaled| ratio(scaled, innings))
}

fn ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        return Decimal::ZERO;
    }
    numerator
        .checked_div(denominator)
        .map_or(Decimal::ZERO, |q| q.normalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counters(earned_runs: u32, innings_pitched: u32) -> PitchingCounters {
        PitchingCounters {
            earned_runs,
            innings_pitched,
            ..PitchingCounters::default()
        }
    }

    #[test]
    fn era_scales_to_nine_innings() {
        assert_eq!(earned_run_average(&counters(3, 9)), Decimal::new(3, 0));
        assert_eq!(earned_run_average(&counters(1, 2)), Decimal::new(45, 1));
    }

    #[test]
    fn era_is_zero_without_innings() {
        assert_eq!(earned_run_average(&counters(5, 0)), Decimal::ZERO);
    }

    #[test]
    fn winning_percentage_edges() {
        assert_eq!(winning_percentage(0, 0), Decimal::ONE);
        assert_eq!(winning_percentage(0, 3), Decimal::ZERO);
        assert_eq!(winning_percentage(2, 2), Decimal::new(5, 1));
        assert_eq!(winning_percentage(3, 0), Decimal::ONE);
    }

    #[test]
    fn rates_guard_zero_denominators() {
        let stats = RateStats::from_counters(&PitchingCounters {
            strikeouts: 7,
            ..PitchingCounters::default()
        });
        assert_eq!(stats.strikeout_to_walk_ratio, Decimal::ZERO);
        assert_eq!(stats.strikeout_rate, Decimal::ZERO);
        assert_eq!(stats.strikeouts_per_nine, Decimal::ZERO);
        assert_eq!(stats.walks_and_hits_per_inning_pitched, Decimal::ZERO);
    }

    #[test]
    fn full_stat_line() {
        let stats = RateStats::from_counters(&PitchingCounters {
            batters_faced: 40,
            bases_on_balls: 4,
            hits_allowed: 8,
            home_runs: 2,
            innings_pitched: 6,
            strikeouts: 10,
            earned_runs: 4,
            wins: 1,
            ..PitchingCounters::default()
        });

        assert_eq!(stats.earned_run_average, Decimal::new(6, 0));
        assert_eq!(stats.walks_and_hits_per_inning_pitched, Decimal::new(2, 0));
        assert_eq!(stats.walk_rate, Decimal::new(1, 1));
        assert_eq!(stats.strikeout_rate, Decimal::new(25, 2));
        assert_eq!(stats.strikeout_to_walk_ratio, Decimal::new(25, 1));
        assert_eq!(stats.strikeouts_per_nine, Decimal::new(15, 0));
        assert_eq!(stats.home_runs_per_nine, Decimal::new(3, 0));
        assert_eq!(stats.bases_on_balls_per_nine, Decimal::new(6, 0));
        assert_eq!(stats.hits_allowed_per_nine, Decimal::new(12, 0));
        assert_eq!(stats.winning_percentage, Decimal::ONE);
    }
}
