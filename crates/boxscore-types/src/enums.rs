//! Enumeration types shared by the classifier, the ledger, and the output.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Event kinds
// ---------------------------------------------------------------------------

/// The kind of a pitching [`DomainEvent`](crate::DomainEvent).
///
/// Every kind maps onto exactly one raw counter of a season ledger. The
/// serialized names match the `result` values of the historical event logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub enum EventKind {
    /// The pitcher started a game that reached "Game Over".
    Appearance,
    /// The pitcher's team won.
    Win,
    /// The pitcher's team lost.
    Loss,
    /// A half inning was completed with this pitcher on the mound.
    InningPitched,
    /// A batter flew out.
    Flyout,
    /// A batter grounded out.
    Groundout,
    /// A batter got a hit (any kind, home runs included).
    Hit,
    /// A batter drew a walk.
    BaseOnBalls,
    /// A batter struck out.
    Strikeout,
    /// A new batter stepped up.
    BatterFaced,
    /// Runs charged to the pitcher.
    EarnedRunAllowed,
    /// A home run or grand slam was hit.
    HomeRun,
    /// The starter allowed three runs or fewer in a completed game.
    QualityStart,
    /// The opponent was held scoreless.
    Shutout,
}

impl EventKind {
    /// Stable label used in log fields.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Appearance => "appearance",
            Self::Win => "win",
            Self::Loss => "loss",
            Self::InningPitched => "inningPitched",
            Self::Flyout => "flyout",
            Self::Groundout => "groundout",
            Self::Hit => "hit",
            Self::BaseOnBalls => "baseOnBalls",
            Self::Strikeout => "strikeout",
            Self::BatterFaced => "batterFaced",
            Self::EarnedRunAllowed => "earnedRunAllowed",
            Self::HomeRun => "homeRun",
            Self::QualityStart => "qualityStart",
            Self::Shutout => "shutout",
        }
    }
}

impl core::fmt::Display for EventKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Sides
// ---------------------------------------------------------------------------

/// One of the two teams in a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Side {
    /// The home team.
    Home,
    /// The away (visiting) team.
    Away,
}

impl Side {
    /// The side whose pitcher is on the mound.
    ///
    /// In the top of an inning the away team bats, so the home pitcher
    /// pitches; in the bottom it is the other way round.
    pub const fn pitching(top_of_inning: bool) -> Self {
        if top_of_inning { Self::Home } else { Self::Away }
    }

    /// The side currently at bat.
    pub const fn batting(top_of_inning: bool) -> Self {
        Self::pitching(top_of_inning).opponent()
    }

    /// The other side.
    pub const fn opponent(self) -> Self {
        match self {
            Self::Home => Self::Away,
            Self::Away => Self::Home,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_of_inning_puts_home_pitcher_on_the_mound() {
        assert_eq!(Side::pitching(true), Side::Home);
        assert_eq!(Side::pitching(false), Side::Away);
        assert_eq!(Side::batting(true), Side::Away);
    }

    #[test]
    fn event_kind_serializes_camel_case() {
        let json = serde_json::to_string(&EventKind::BaseOnBalls).ok();
        assert_eq!(json.as_deref(), Some("\"baseOnBalls\""));
        assert_eq!(EventKind::EarnedRunAllowed.to_string(), "earnedRunAllowed");
    }
}
