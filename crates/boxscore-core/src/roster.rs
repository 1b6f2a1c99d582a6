//! Player identity across snapshots.
//!
//! The roster is get-or-create: [`RosterDirectory::resolve`] hands back the
//! identity it found or made, refreshing the moving parts (name, team, last
//! game) on the way. Identities are never removed; incineration only marks
//! them.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::collections::btree_map::Entry;

use tracing::{debug, info};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use boxscore_types::{GameId, GameMarker, GameSnapshot, PlayerId, PlayerIdentity, Side};

/// Role given to every pitcher the roster creates.
const ROTATION: &str = "rotation";

/// Every pitcher seen so far, in order of first appearance.
#[derive(Debug, Default)]
pub struct RosterDirectory {
    players: BTreeMap<PlayerId, PlayerIdentity>,
    order: Vec<PlayerId>,
}

impl RosterDirectory {
    /// Create an empty roster.
    pub const fn new() -> Self {
        Self {
            players: BTreeMap::new(),
            order: Vec::new(),
        }
    }

    /// Number of known players.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether no player has been seen.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Look up a player without creating it.
    pub fn get(&self, player: &PlayerId) -> Option<&PlayerIdentity> {
        self.players.get(player)
    }

    /// Get or create the identity of the pitcher on `side` of `snapshot`.
    ///
    /// `name` falls back to the player id when the snapshot carries no
    /// display name.
    pub fn resolve(
        &mut self,
        player: &PlayerId,
        name: Option<&str>,
        snapshot: &GameSnapshot,
        game_id: &GameId,
        side: Side,
    ) -> &PlayerIdentity {
        let name = name.unwrap_or_else(|| player.as_str());
        let seen_in = GameMarker {
            day: snapshot.day,
            game_id: game_id.clone(),
            season: snapshot.season,
        };
        let team = snapshot.team(side).cloned();
        let team_name = snapshot.team_name(side).map(str::to_owned);

        match self.players.entry(player.clone()) {
            Entry::Vacant(slot) => {
                debug!(player = %player, name, "New pitcher");
                self.order.push(player.clone());
                slot.insert(PlayerIdentity {
                    id: player.clone(),
                    name: name.to_owned(),
                    slug: slugify(name, player),
                    aliases: Vec::new(),
                    current_team_id: team.clone(),
                    current_team_name: team_name.clone(),
                    debut_team_id: team,
                    debut_team_name: team_name,
                    debut: seen_in.clone(),
                    last_game: seen_in,
                    incinerated: None,
                    is_incinerated: false,
                    position: ROTATION.to_owned(),
                })
            }
            Entry::Occupied(slot) => {
                let identity = slot.into_mut();
                if identity.name != name {
                    debug!(player = %player, from = %identity.name, to = name, "Pitcher renamed");
                    if !identity.aliases.contains(&identity.name) {
                        identity.aliases.push(identity.name.clone());
                    }
                    name.clone_into(&mut identity.name);
                    identity.slug = slugify(name, player);
                }
                identity.current_team_id = team;
                identity.current_team_name = team_name;
                identity.last_game = seen_in;
                identity
            }
        }
    }

    /// Mark the player whose canonical name is `name` as incinerated.
    ///
    /// Returns `None` when no such player is known. If several players share
    /// the name, the one seen first is marked.
    pub fn mark_removed(&mut self, name: &str, at: GameMarker) -> Option<&PlayerIdentity> {
        let player = self
            .order
            .iter()
            .find(|id| self.players.get(*id).is_some_and(|p| p.name == name))?;
        let identity = self.players.get_mut(player)?;

        info!(player = %identity.id, name, game_id = %at.game_id, "Pitcher incinerated");
        identity.incinerated = Some(at);
        identity.is_incinerated = true;
        Some(identity)
    }

    /// Consume the roster, yielding identities in order of first appearance.
    pub fn into_players(mut self) -> Vec<PlayerIdentity> {
        self.order
            .iter()
            .filter_map(|id| self.players.remove(id))
            .collect()
    }
}

/// Path-safe slug of a display name: diacritics stripped, lowercased, and
/// every character outside `[a-z0-9-]` replaced with `-`.
///
/// A name with no letter or digit left falls back to the player id, so the
/// slug is never empty and never a path of its own.
pub fn slugify(name: &str, player: &PlayerId) -> String {
    let slug = path_safe(name);
    if has_alphanumeric(&slug) {
        return slug;
    }
    let fallback = path_safe(player.as_str());
    if has_alphanumeric(&fallback) {
        return fallback;
    }
    let mut hex = String::from("player-");
    for byte in player.as_str().bytes() {
        // Writing to a String cannot fail.
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}

fn path_safe(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else {
                '-'
            }
        })
        .collect()
}

fn has_alphanumeric(slug: &str) -> bool {
    slug.bytes().any(|b| b.is_ascii_alphanumeric())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use boxscore_types::TeamId;
    use serde_json::json;

    use super::*;

    fn snapshot(day: u32) -> GameSnapshot {
        serde_json::from_value(json!({
            "id": "g1",
            "season": 2,
            "day": day,
            "homeTeam": "crabs",
            "homeTeamName": "Baltimore Crabs",
            "awayTeam": "tigers",
            "awayTeamName": "Hades Tigers",
        }))
        .unwrap()
    }

    fn game() -> GameId {
        GameId::from("g1")
    }

    #[test]
    fn slug_strips_diacritics() {
        let player = PlayerId::from("p1");
        assert_eq!(slugify("Jaylen Hotdogfingers", &player), "jaylen-hotdogfingers");
        assert_eq!(slugify("Çhorby Şoul", &player), "chorby-soul");
        assert_eq!(slugify("Nagomi  Mcdaniel", &player), "nagomi--mcdaniel");
    }

    #[test]
    fn slug_never_leaves_its_directory() {
        let player = PlayerId::from("p1");
        assert_eq!(slugify("/abs/name", &player), "-abs-name");
        assert_eq!(slugify("../up", &player), "---up");
        assert_eq!(slugify("Dr. Arm", &player), "dr--arm");
        assert_eq!(slugify("", &player), "p1");
        assert_eq!(slugify("..", &player), "p1");
        assert_eq!(slugify("..", &PlayerId::from("..")), "player-2e2e");
    }

    #[test]
    fn creation_seeds_debut_and_team() {
        let mut roster = RosterDirectory::new();
        let player = PlayerId::from("p1");
        let identity =
            roster.resolve(&player, Some("Sutton Dreamy"), &snapshot(4), &game(), Side::Away);

        assert_eq!(identity.slug, "sutton-dreamy");
        assert_eq!(identity.debut.day, Some(4));
        assert_eq!(identity.debut.season, Some(2));
        assert_eq!(identity.debut_team_id, Some(TeamId::from("tigers")));
        assert_eq!(identity.current_team_name.as_deref(), Some("Hades Tigers"));
        assert_eq!(identity.position, "rotation");
        assert!(!identity.is_incinerated);
    }

    #[test]
    fn rename_records_alias_once() {
        let mut roster = RosterDirectory::new();
        let player = PlayerId::from("p1");
        roster.resolve(&player, Some("Old Name"), &snapshot(1), &game(), Side::Home);
        roster.resolve(&player, Some("New Name"), &snapshot(2), &game(), Side::Home);
        roster.resolve(&player, Some("Old Name"), &snapshot(3), &game(), Side::Home);
        let identity = roster.resolve(&player, Some("New Name"), &snapshot(4), &game(), Side::Home);

        assert_eq!(identity.name, "New Name");
        assert_eq!(identity.aliases, vec!["Old Name".to_owned(), "New Name".to_owned()]);
        assert_eq!(identity.last_game.day, Some(4));
        assert_eq!(identity.debut.day, Some(1));
    }

    #[test]
    fn team_change_refreshes_current_team_only() {
        let mut roster = RosterDirectory::new();
        let player = PlayerId::from("p1");
        roster.resolve(&player, Some("Traded"), &snapshot(1), &game(), Side::Home);
        let identity = roster.resolve(&player, Some("Traded"), &snapshot(2), &game(), Side::Away);

        assert_eq!(identity.current_team_id, Some(TeamId::from("tigers")));
        assert_eq!(identity.debut_team_id, Some(TeamId::from("crabs")));
    }

    #[test]
    fn missing_name_falls_back_to_id() {
        let mut roster = RosterDirectory::new();
        let player = PlayerId::from("p-anon");
        let identity = roster.resolve(&player, None, &snapshot(1), &game(), Side::Home);
        assert_eq!(identity.name, "p-anon");
    }

    #[test]
    fn removal_marks_by_name() {
        let mut roster = RosterDirectory::new();
        roster.resolve(
            &PlayerId::from("p1"),
            Some("Unlucky Arm"),
            &snapshot(1),
            &game(),
            Side::Home,
        );

        let marker = GameMarker {
            day: Some(9),
            game_id: GameId::from("g9"),
            season: Some(2),
        };
        let removed = roster.mark_removed("Unlucky Arm", marker.clone()).unwrap();
        assert!(removed.is_incinerated);
        assert_eq!(removed.incinerated, Some(marker.clone()));

        assert!(roster.mark_removed("Nobody Here", marker).is_none());
    }

    #[test]
    fn players_come_out_in_first_seen_order() {
        let mut roster = RosterDirectory::new();
        roster.resolve(&PlayerId::from("zz"), Some("Last Id"), &snapshot(1), &game(), Side::Home);
        roster.resolve(&PlayerId::from("aa"), Some("First Id"), &snapshot(1), &game(), Side::Away);

        assert_eq!(roster.len(), 2);
        let ids: Vec<String> = roster
            .into_players()
            .into_iter()
            .map(|p| p.id.as_str().to_owned())
            .collect();
        assert_eq!(ids, vec!["zz", "aa"]);
    }
}
