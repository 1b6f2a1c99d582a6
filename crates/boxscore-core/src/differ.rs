//! Tick differ: pairs each game's snapshot with its previous snapshot.
//!
//! The differ is a pure function of two ticks. It never remembers anything
//! itself; the pipeline hands it the previous tick explicitly. Games that
//! carry no new information are filtered out here so the classifier only
//! ever sees real transitions.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use boxscore_types::{GameId, GameSnapshot, Tick};

/// One game's transition between two consecutive ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiffContext<'a> {
    /// The game both snapshots describe.
    pub game_id: &'a GameId,
    /// The game's snapshot in the previous tick, if it was present.
    pub previous: Option<&'a GameSnapshot>,
    /// The game's snapshot in the current tick.
    pub current: &'a GameSnapshot,
}

/// Why a game produced no [`DiffContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SkipReason {
    /// The game has not started yet.
    NotStarted,
    /// Both snapshots report the game as complete.
    AlreadyComplete,
    /// The snapshot is identical to the previous one.
    Unchanged,
    /// The snapshot carries neither `id` nor `_id`.
    MissingId,
}

/// The outcome of diffing one tick against its predecessor.
#[derive(Debug, Default)]
pub struct TickDiff<'a> {
    /// Whether the whole schedule repeated the previous tick.
    pub duplicate: bool,
    /// Games that changed, in schedule order.
    pub contexts: Vec<DiffContext<'a>>,
    /// Games that were filtered out, in schedule order.
    pub skipped: Vec<SkipReason>,
}

/// Diff `current` against `previous`.
///
/// A tick whose schedule is identical to the previous schedule yields no
/// contexts at all. Client metadata does not take part in the comparison.
pub fn diff_tick<'a>(previous: Option<&'a Tick>, current: &'a Tick) -> TickDiff<'a> {
    if previous.is_some_and(|prev| prev.schedule == current.schedule) {
        debug!(games = current.schedule.len(), "Skipping duplicate tick");
        return TickDiff {
            duplicate: true,
            ..TickDiff::default()
        };
    }

    // First snapshot per key wins if a tick ever lists a game twice.
    let mut earlier: BTreeMap<&GameId, &GameSnapshot> = BTreeMap::new();
    for snapshot in previous.map_or(&[][..], |prev| prev.schedule.as_slice()) {
        if let Some(key) = snapshot.key() {
            earlier.entry(key).or_insert(snapshot);
        }
    }

    let mut diff = TickDiff::default();
    for snapshot in &current.schedule {
        match pair(&earlier, snapshot) {
            Ok(context) => diff.contexts.push(context),
            Err(reason) => diff.skipped.push(reason),
        }
    }
    diff
}

fn pair<'a>(
    earlier: &BTreeMap<&GameId, &'a GameSnapshot>,
    current: &'a GameSnapshot,
) -> Result<DiffContext<'a>, SkipReason> {
    let Some(game_id) = current.key() else {
        warn!("Snapshot without id or _id, skipping");
        return Err(SkipReason::MissingId);
    };
    let previous = earlier.get(game_id).copied();

    let reason = if !current.game_start {
        Some(SkipReason::NotStarted)
    } else if current.game_complete && previous.is_some_and(|prev| prev.game_complete) {
        Some(SkipReason::AlreadyComplete)
    } else if previous == Some(current) {
        Some(SkipReason::Unchanged)
    } else {
        None
    };

    if let Some(reason) = reason {
        debug!(game_id = %game_id, ?reason, "Skipping game");
        return Err(reason);
    }

    Ok(DiffContext {
        game_id,
        previous,
        current,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn tick(games: serde_json::Value) -> Tick {
        serde_json::from_value(json!({ "schedule": games })).unwrap()
    }

    #[test]
    fn first_tick_has_no_previous() {
        let current = tick(json!([{ "id": "g1", "gameStart": true, "lastUpdate": "Play ball!" }]));
        let diff = diff_tick(None, &current);

        assert!(!diff.duplicate);
        assert_eq!(diff.contexts.len(), 1);
        assert!(diff.contexts.first().unwrap().previous.is_none());
    }

    #[test]
    fn identical_schedule_is_a_duplicate() {
        let prev = tick(json!([{ "id": "g1", "gameStart": true }]));
        let mut current = prev.clone();
        current.client_meta = serde_json::from_value(json!({ "timestamp": 1 })).unwrap();

        let diff = diff_tick(Some(&prev), &current);
        assert!(diff.duplicate);
        assert!(diff.contexts.is_empty());
    }

    #[test]
    fn filters_apply_per_game() {
        let prev = tick(json!([
            { "id": "done", "gameStart": true, "gameComplete": true, "lastUpdate": "Game over." },
            { "id": "same", "gameStart": true, "lastUpdate": "Ball." },
            { "id": "live", "gameStart": true, "lastUpdate": "Ball." },
        ]));
        let current = tick(json!([
            { "id": "done", "gameStart": true, "gameComplete": true, "lastUpdate": "Game over!" },
            { "id": "same", "gameStart": true, "lastUpdate": "Ball." },
            { "id": "live", "gameStart": true, "lastUpdate": "Strike, looking." },
            { "id": "later", "gameStart": false },
            { "gameStart": true },
        ]));

        let diff = diff_tick(Some(&prev), &current);
        assert!(!diff.duplicate);
        assert_eq!(diff.contexts.len(), 1);
        assert_eq!(diff.contexts.first().unwrap().game_id.as_str(), "live");
        assert_eq!(
            diff.skipped,
            vec![
                SkipReason::AlreadyComplete,
                SkipReason::Unchanged,
                SkipReason::NotStarted,
                SkipReason::MissingId,
            ]
        );
    }

    #[test]
    fn legacy_records_pair_by_underscore_id() {
        let prev = tick(json!([{ "_id": "g1", "gameStart": true, "halfInningOuts": 1 }]));
        let current = tick(json!([{ "_id": "g1", "gameStart": true, "halfInningOuts": 2 }]));

        let diff = diff_tick(Some(&prev), &current);
        let context = diff.contexts.first().unwrap();
        assert_eq!(context.game_id.as_str(), "g1");
        assert_eq!(context.previous.unwrap().half_inning_outs, Some(1));
    }

    #[test]
    fn completion_transition_is_kept() {
        let prev = tick(json!([{ "id": "g1", "gameStart": true, "gameComplete": false }]));
        let current = tick(json!([{ "id": "g1", "gameStart": true, "gameComplete": true }]));

        let diff = diff_tick(Some(&prev), &current);
        assert_eq!(diff.contexts.len(), 1);
    }
}
