//! Input records: one [`Tick`] per feed line, one [`GameSnapshot`] per game.
//!
//! Snapshots are parsed leniently. Numeric fields that are absent, null, or
//! not a non-negative integer become `None`, so a single odd value costs one
//! classification rule instead of the whole tick. Every key not modelled
//! here is kept in [`GameSnapshot::extra`], which makes `==` on two
//! snapshots a comparison of the full record.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::enums::Side;
use crate::ids::{GameId, PlayerId, TeamId};

// ---------------------------------------------------------------------------
// Tick
// ---------------------------------------------------------------------------

/// One poll of the feed: the state of every scheduled game at that moment.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tick {
    /// Snapshots of every game on the schedule, in feed order. Required: a
    /// record without it is not a tick.
    pub schedule: Vec<GameSnapshot>,

    /// Metadata recorded by the client that captured the tick.
    #[serde(default)]
    pub client_meta: Option<ClientMeta>,
}

impl Tick {
    /// Client-perceived capture time, if the archive recorded one.
    pub fn perceived_at(&self) -> Option<DateTime<Utc>> {
        self.client_meta.as_ref().and_then(ClientMeta::perceived_at)
    }
}

/// Capture metadata attached to a tick by the archiving client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ClientMeta {
    /// Capture time in milliseconds since the Unix epoch.
    #[serde(default, deserialize_with = "lenient_i64")]
    pub timestamp: Option<i64>,
}

impl ClientMeta {
    /// The capture timestamp as a UTC date-time.
    pub fn perceived_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp.and_then(DateTime::from_timestamp_millis)
    }
}

// ---------------------------------------------------------------------------
// GameSnapshot
// ---------------------------------------------------------------------------

/// The recorded state of one game within one tick.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    /// Canonical game identifier.
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<GameId>,

    /// Identifier used by older archives before `id` existed.
    #[serde(rename = "_id", default, deserialize_with = "lenient_id")]
    pub legacy_id: Option<GameId>,

    /// Whether the game has started.
    #[serde(default, deserialize_with = "lenient_flag")]
    pub game_start: bool,

    /// Whether the game has finished.
    #[serde(default, deserialize_with = "lenient_flag")]
    pub game_complete: bool,

    /// Whether the game belongs to the postseason.
    #[serde(default, deserialize_with = "lenient_flag")]
    pub is_postseason: bool,

    /// Season identifier (zero-based).
    #[serde(default, deserialize_with = "lenient_u32")]
    pub season: Option<u32>,

    /// Day within the season (zero-based).
    #[serde(default, deserialize_with = "lenient_u32")]
    pub day: Option<u32>,

    /// Current inning (zero-based).
    #[serde(default, deserialize_with = "lenient_u32")]
    pub inning: Option<u32>,

    /// `true` while the away team bats and the home pitcher pitches.
    #[serde(default, deserialize_with = "lenient_flag")]
    pub top_of_inning: bool,

    /// Outs recorded in the current half inning (0 to 2).
    #[serde(default, deserialize_with = "lenient_u32")]
    pub half_inning_outs: Option<u32>,

    /// Runs scored in the current half inning.
    #[serde(default, deserialize_with = "lenient_u32")]
    pub half_inning_score: Option<u32>,

    /// Cumulative home score.
    #[serde(default, deserialize_with = "lenient_u32")]
    pub home_score: Option<u32>,

    /// Cumulative away score.
    #[serde(default, deserialize_with = "lenient_u32")]
    pub away_score: Option<u32>,

    /// Strikes needed for a strikeout against the home team.
    #[serde(default, deserialize_with = "lenient_u32")]
    pub home_strikes: Option<u32>,

    /// Strikes needed for a strikeout against the away team.
    #[serde(default, deserialize_with = "lenient_u32")]
    pub away_strikes: Option<u32>,

    /// Strikes in the current at-bat.
    #[serde(default, deserialize_with = "lenient_u32")]
    pub at_bat_strikes: Option<u32>,

    /// Balls in the current at-bat.
    #[serde(default, deserialize_with = "lenient_u32")]
    pub at_bat_balls: Option<u32>,

    /// Home team identifier.
    #[serde(default, deserialize_with = "lenient_id")]
    pub home_team: Option<TeamId>,

    /// Away team identifier.
    #[serde(default, deserialize_with = "lenient_id")]
    pub away_team: Option<TeamId>,

    /// Home team display name.
    #[serde(default, deserialize_with = "lenient_text")]
    pub home_team_name: Option<String>,

    /// Away team display name.
    #[serde(default, deserialize_with = "lenient_text")]
    pub away_team_name: Option<String>,

    /// Home pitcher identifier.
    #[serde(default, deserialize_with = "lenient_id")]
    pub home_pitcher: Option<PlayerId>,

    /// Away pitcher identifier.
    #[serde(default, deserialize_with = "lenient_id")]
    pub away_pitcher: Option<PlayerId>,

    /// Home pitcher display name.
    #[serde(default, deserialize_with = "lenient_text")]
    pub home_pitcher_name: Option<String>,

    /// Away pitcher display name.
    #[serde(default, deserialize_with = "lenient_text")]
    pub away_pitcher_name: Option<String>,

    /// Home batter identifier (empty between at-bats).
    #[serde(default, deserialize_with = "lenient_id")]
    pub home_batter: Option<PlayerId>,

    /// Away batter identifier (empty between at-bats).
    #[serde(default, deserialize_with = "lenient_id")]
    pub away_batter: Option<PlayerId>,

    /// Batters the home team has sent to the plate.
    #[serde(default, deserialize_with = "lenient_u32")]
    pub home_team_batter_count: Option<u32>,

    /// Batters the away team has sent to the plate.
    #[serde(default, deserialize_with = "lenient_u32")]
    pub away_team_batter_count: Option<u32>,

    /// Free-text narration of the latest interval.
    #[serde(default, deserialize_with = "lenient_narration")]
    pub last_update: String,

    /// Every other key of the record, kept for structural comparison.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl GameSnapshot {
    /// The identifier this game is keyed by: `id`, or `_id` for legacy records.
    pub fn key(&self) -> Option<&GameId> {
        self.id.as_ref().or(self.legacy_id.as_ref())
    }

    /// The narration text.
    pub fn narration(&self) -> &str {
        &self.last_update
    }

    /// The side whose pitcher is on the mound.
    pub const fn pitching_side(&self) -> Side {
        Side::pitching(self.top_of_inning)
    }

    /// The pitcher currently facing batters.
    pub const fn pitcher_of_record(&self) -> Option<&PlayerId> {
        self.pitcher(self.pitching_side())
    }

    /// The pitcher for the given side.
    pub const fn pitcher(&self, side: Side) -> Option<&PlayerId> {
        match side {
            Side::Home => self.home_pitcher.as_ref(),
            Side::Away => self.away_pitcher.as_ref(),
        }
    }

    /// The pitcher display name for the given side.
    pub fn pitcher_name(&self, side: Side) -> Option<&str> {
        match side {
            Side::Home => self.home_pitcher_name.as_deref(),
            Side::Away => self.away_pitcher_name.as_deref(),
        }
    }

    /// The team identifier for the given side.
    pub const fn team(&self, side: Side) -> Option<&TeamId> {
        match side {
            Side::Home => self.home_team.as_ref(),
            Side::Away => self.away_team.as_ref(),
        }
    }

    /// The team display name for the given side.
    pub fn team_name(&self, side: Side) -> Option<&str> {
        match side {
            Side::Home => self.home_team_name.as_deref(),
            Side::Away => self.away_team_name.as_deref(),
        }
    }

    /// The cumulative score of the given side.
    pub const fn score(&self, side: Side) -> Option<u32> {
        match side {
            Side::Home => self.home_score,
            Side::Away => self.away_score,
        }
    }

    /// The batter at the plate for the given side.
    pub const fn batter(&self, side: Side) -> Option<&PlayerId> {
        match side {
            Side::Home => self.home_batter.as_ref(),
            Side::Away => self.away_batter.as_ref(),
        }
    }

    /// The number of batters the given side has sent up.
    pub const fn batter_count(&self, side: Side) -> Option<u32> {
        match side {
            Side::Home => self.home_team_batter_count,
            Side::Away => self.away_team_batter_count,
        }
    }
}

// ---------------------------------------------------------------------------
// Lenient field parsers
// ---------------------------------------------------------------------------

fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok()))
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Value::as_i64))
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Value::as_bool).unwrap_or(false))
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

fn lenient_narration<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_text(deserializer)?.unwrap_or_default())
}

fn lenient_id<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    Ok(lenient_text(deserializer)?
        .filter(|s| !s.is_empty())
        .map(T::from))
}
