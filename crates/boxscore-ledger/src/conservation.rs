//! Decision conservation for retained event logs.
//!
//! Every completed game hands out exactly one win and exactly one loss. For
//! each game G in an event log the check is:
//!
//! ```text
//! wins(G) == 1 && losses(G) == 1   (or both zero: game never finished)
//! ```
//!
//! A violation produces a [`DecisionAnomaly`]. It usually means a game's
//! "Game Over" narration survived into a second, non-identical snapshot.

use std::collections::BTreeMap;

use boxscore_types::{AttributedEvent, EventKind, GameId};

use crate::DecisionAnomaly;

/// The result of a decision conservation check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConservationResult {
    /// Every decided game has one win and one loss.
    Balanced,
    /// At least one game is unbalanced.
    Anomaly(DecisionAnomaly),
}

/// Verify that every decided game in `events` has one win and one loss.
pub fn verify_decisions(events: &[AttributedEvent]) -> ConservationResult {
    // (wins, losses) per game.
    let mut tallies: BTreeMap<&GameId, (u32, u32)> = BTreeMap::new();

    for attributed in events {
        let event = &attributed.event;
        let tally = match event.kind {
            EventKind::Win | EventKind::Loss => tallies.entry(&event.game_id).or_default(),
            _ => continue,
        };
        if event.kind == EventKind::Win {
            tally.0 = tally.0.saturating_add(event.quantity);
        } else {
            tally.1 = tally.1.saturating_add(event.quantity);
        }
    }

    let imbalances: BTreeMap<GameId, (u32, u32)> = tallies
        .into_iter()
        .filter(|(_, (wins, losses))| (*wins, *losses) != (1, 1))
        .map(|(game, tally)| (game.clone(), tally))
        .collect();

    if imbalances.is_empty() {
        ConservationResult::Balanced
    } else {
        let count = imbalances.len();
        ConservationResult::Anomaly(DecisionAnomaly {
            imbalances,
            message: format!("DECISION_ANOMALY: {count} game(s) without exactly one win and one loss"),
        })
    }
}

#[cfg(test)]
mod tests {
    use boxscore_types::{DomainEvent, PlayerId};

    use super::*;

    fn decision(game: &str, player: &str, kind: EventKind) -> AttributedEvent {
        AttributedEvent {
            player_id: PlayerId::from(player),
            event: DomainEvent {
                kind,
                quantity: 1,
                game_id: GameId::from(game),
                inning: Some(8),
                outs_at_event: Some(0),
                season_id: 0,
                is_postseason: false,
            },
        }
    }

    #[test]
    fn one_win_one_loss_balances() {
        let events = vec![
            decision("g1", "home", EventKind::Win),
            decision("g1", "away", EventKind::Loss),
            decision("g1", "home", EventKind::Strikeout),
        ];
        assert_eq!(verify_decisions(&events), ConservationResult::Balanced);
    }

    #[test]
    fn empty_log_balances() {
        assert_eq!(verify_decisions(&[]), ConservationResult::Balanced);
    }

    #[test]
    fn double_counted_game_is_reported() {
        let events = vec![
            decision("g1", "home", EventKind::Win),
            decision("g1", "away", EventKind::Loss),
            decision("g1", "home", EventKind::Win),
            decision("g1", "away", EventKind::Loss),
            decision("g2", "a", EventKind::Win),
            decision("g2", "b", EventKind::Loss),
        ];

        let result = verify_decisions(&events);
        assert!(matches!(result, ConservationResult::Anomaly(_)));
        if let ConservationResult::Anomaly(anomaly) = result {
            assert_eq!(anomaly.imbalances.len(), 1);
            assert_eq!(anomaly.imbalances.get(&GameId::from("g1")), Some(&(2, 2)));
        }
    }
}
