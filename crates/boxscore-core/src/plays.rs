//! Flat play records, one per changed snapshot.

use chrono::{DateTime, Utc};
use regex::Regex;

use boxscore_types::{PlayRecord, Side};

use crate::classifier::ClassifierError;
use crate::differ::DiffContext;

/// Derives [`PlayRecord`]s from transitions.
#[derive(Debug)]
pub struct PlayRecorder {
    pinch_hit: Regex,
}

impl PlayRecorder {
    /// Compile the recorder's narration pattern.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError::Pattern`] if the pattern does not compile.
    pub fn new() -> Result<Self, ClassifierError> {
        let pinch_hit = Regex::new(r"(?i)Rogue Umpire incinerated \w+ hitter").map_err(|source| {
            ClassifierError::Pattern {
                rule: "pinch_hit",
                source,
            }
        })?;
        Ok(Self { pinch_hit })
    }

    /// Build the record for one transition.
    pub fn record(&self, ctx: &DiffContext<'_>, perceived_at: Option<DateTime<Utc>>) -> PlayRecord {
        let current = ctx.current;
        let batting = Side::batting(current.top_of_inning);
        let pitching = batting.opponent();
        let batter_count = current.batter_count(batting);

        let rolled_over = ctx.previous.is_some_and(|prev| {
            prev.half_inning_outs == Some(2) && current.half_inning_outs == Some(0)
        });

        PlayRecord {
            perceived_at,
            game_id: ctx.game_id.clone(),
            inning: current.inning,
            outs_before_play: current.half_inning_outs,
            batter_id: current.batter(batting).cloned(),
            batter_team_id: current.team(batting).cloned(),
            pitcher_id: current.pitcher(pitching).cloned(),
            pitcher_team_id: current.team(pitching).cloned(),
            home_score: current.home_score,
            away_score: current.away_score,
            home_strike_count: current.home_strikes,
            away_strike_count: current.away_strikes,
            batter_count,
            total_strikes: current.at_bat_strikes,
            total_balls: current.at_bat_balls,
            is_leadoff: batter_count == Some(0) || rolled_over,
            is_pinch_hit: ctx
                .previous
                .is_some_and(|prev| self.pinch_hit.is_match(prev.narration())),
        }
    }
}
