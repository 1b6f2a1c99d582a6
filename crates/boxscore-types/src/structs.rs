//! Core record structs: player identities, domain events, and play records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::EventKind;
use crate::ids::{GameId, PlayerId, TeamId};

// ---------------------------------------------------------------------------
// Player identity
// ---------------------------------------------------------------------------

/// Where and when something happened to a player: a game within a season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct GameMarker {
    /// Day of the season.
    pub day: Option<u32>,
    /// The game.
    pub game_id: GameId,
    /// The season.
    pub season: Option<u32>,
}

/// The roster record for one pitcher.
///
/// Created the first time the player is seen pitching and mutated as names
/// and teams change. Identities are never removed; an incinerated player
/// keeps its record with the removal marker set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PlayerIdentity {
    /// Player identifier.
    pub id: PlayerId,
    /// Canonical (most recently observed) display name.
    pub name: String,
    /// URL-safe form of [`name`](Self::name).
    pub slug: String,
    /// Earlier display names, oldest first, without duplicates.
    pub aliases: Vec<String>,
    /// Team the player last pitched for.
    pub current_team_id: Option<TeamId>,
    /// Display name of [`current_team_id`](Self::current_team_id).
    pub current_team_name: Option<String>,
    /// Team the player debuted with.
    pub debut_team_id: Option<TeamId>,
    /// Display name of [`debut_team_id`](Self::debut_team_id).
    pub debut_team_name: Option<String>,
    /// First game the player was seen in.
    pub debut: GameMarker,
    /// Most recent game the player was seen in.
    pub last_game: GameMarker,
    /// Game in which the player was removed from play, if any.
    pub incinerated: Option<GameMarker>,
    /// Whether the player has been removed from play.
    pub is_incinerated: bool,
    /// Roster role; always `rotation` for tracked pitchers.
    pub position: String,
}

// ---------------------------------------------------------------------------
// Domain events
// ---------------------------------------------------------------------------

/// One immutable pitching fact extracted from a snapshot transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct DomainEvent {
    /// What happened.
    #[serde(rename = "result")]
    pub kind: EventKind,
    /// How many times (runs for [`EventKind::EarnedRunAllowed`], else 1).
    pub quantity: u32,
    /// The game it happened in.
    pub game_id: GameId,
    /// Inning of the snapshot the event is anchored to.
    pub inning: Option<u32>,
    /// Outs in the half inning of that snapshot.
    #[serde(rename = "outs")]
    pub outs_at_event: Option<u32>,
    /// Season of that snapshot.
    pub season_id: u32,
    /// Whether that snapshot belongs to the postseason.
    pub is_postseason: bool,
}

/// A [`DomainEvent`] together with the player whose ledger it updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct AttributedEvent {
    /// The player the event is credited or charged to.
    pub player_id: PlayerId,
    /// The event itself.
    pub event: DomainEvent,
}

// ---------------------------------------------------------------------------
// Play records
// ---------------------------------------------------------------------------

/// A flat per-transition record of who was batting and pitching and what the
/// count and score were, for loading into an event table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PlayRecord {
    /// When the archiving client saw the snapshot.
    pub perceived_at: Option<DateTime<Utc>>,
    /// The game.
    pub game_id: GameId,
    /// Current inning.
    pub inning: Option<u32>,
    /// Outs in the half inning when the play began.
    pub outs_before_play: Option<u32>,
    /// The batter at the plate.
    pub batter_id: Option<PlayerId>,
    /// The batting team.
    pub batter_team_id: Option<TeamId>,
    /// The pitcher of record.
    pub pitcher_id: Option<PlayerId>,
    /// The pitching team.
    pub pitcher_team_id: Option<TeamId>,
    /// Cumulative home score.
    pub home_score: Option<u32>,
    /// Cumulative away score.
    pub away_score: Option<u32>,
    /// Strikes for a strikeout against the home team.
    pub home_strike_count: Option<u32>,
    /// Strikes for a strikeout against the away team.
    pub away_strike_count: Option<u32>,
    /// Batters the batting team has sent up.
    pub batter_count: Option<u32>,
    /// Strikes in the current at-bat.
    pub total_strikes: Option<u32>,
    /// Balls in the current at-bat.
    pub total_balls: Option<u32>,
    /// First batter of the half inning.
    pub is_leadoff: bool,
    /// The previous batter was incinerated and replaced.
    pub is_pinch_hit: bool,
}
