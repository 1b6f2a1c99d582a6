//! Event classifier: turns one snapshot transition into domain events.
//!
//! Classification is an ordered, declarative rule table. Every rule is
//! evaluated against every transition; rules never short-circuit each other,
//! so a single "Game Over" snapshot can fire appearances, decisions, innings
//! pitched, quality starts, and shutouts at once.
//!
//! Each [`Rule`] pairs a matcher with a handler:
//!
//! | Matcher | Fires when |
//! |---|---|
//! | `Narration(regex)` | the current narration matches |
//! | `GameOver` | the current narration reports the end of the game |
//! | `Transition` | always; the handler inspects the numeric deltas |
//!
//! A handler that finds a required field missing returns a [`RuleFault`].
//! The fault is logged and only that rule's output is dropped.
//!
//! # Attribution
//!
//! The player-of-record is the pitcher on the mound: the home pitcher while
//! the away team bats (`topOfInning`), the away pitcher otherwise. Events
//! describing the play that just ended go to the player-of-record of the
//! *previous* snapshot and carry that snapshot's inning, outs, and season.
//! Events about the starters or the current batter use the current snapshot.

use regex::Regex;
use serde::Deserialize;
use tracing::warn;

use boxscore_types::{
    AttributedEvent, DomainEvent, EventKind, GameMarker, GameSnapshot, PlayerId, Side,
};

use crate::differ::DiffContext;

/// Most runs a starter may allow and still earn a quality start.
const QUALITY_START_MAX_RUNS: u32 = 3;

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// How quality starts are credited at the end of a game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityStartRule {
    /// Each starter is judged on the runs the opposing team scored.
    #[default]
    RunsAllowed,
    /// Both starters are judged on the home team's score, as the historical
    /// stat pages did.
    HomeScoreLiteral,
}

/// How earned runs are charged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EarnedRunRule {
    /// The half inning's score is charged to the pitcher on the mound when
    /// the half ends or the game completes.
    #[default]
    HalfInning,
    /// Every increase of a team's score is charged to the opposing starter
    /// immediately.
    ScoreDelta,
}

/// Classifier behaviour switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassifierSettings {
    /// Quality-start rule.
    pub quality_start_rule: QualityStartRule,
    /// Earned-run rule.
    pub earned_run_rule: EarnedRunRule,
}

// ---------------------------------------------------------------------------
// Errors and output
// ---------------------------------------------------------------------------

/// Errors that can occur when building a classifier.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    /// A rule's narration pattern failed to compile.
    #[error("invalid pattern for rule {rule}: {source}")]
    Pattern {
        /// Name of the rule.
        rule: &'static str,
        /// The underlying regex error.
        source: regex::Error,
    },
}

/// A removal-from-play reported by the narration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    /// Display name of the removed pitcher, as narrated.
    pub name: String,
    /// The game the removal happened in, taken from the previous snapshot.
    pub at: GameMarker,
}

/// Everything one transition produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    /// Attributed events, in rule-table order.
    pub events: Vec<AttributedEvent>,
    /// Removals-from-play to apply to the roster.
    pub removals: Vec<Removal>,
}

/// Why a single rule could not be evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RuleFault {
    /// A snapshot field the rule needs is absent or malformed.
    #[error("missing or malformed field `{0}`")]
    MissingField(&'static str),
}

enum Outcome {
    Event(AttributedEvent),
    Removal(Removal),
}

// ---------------------------------------------------------------------------
// Rule table
// ---------------------------------------------------------------------------

type Handler = fn(&RuleInput<'_>, Option<&str>) -> Result<Vec<Outcome>, RuleFault>;

enum Matcher {
    Narration(Regex),
    GameOver,
    Transition,
}

/// One entry of the rule table.
pub struct Rule {
    name: &'static str,
    matcher: Matcher,
    handler: Handler,
}

impl Rule {
    fn narration(
        name: &'static str,
        pattern: &str,
        handler: Handler,
    ) -> Result<Self, ClassifierError> {
        let regex =
            Regex::new(pattern).map_err(|source| ClassifierError::Pattern { rule: name, source })?;
        Ok(Self {
            name,
            matcher: Matcher::Narration(regex),
            handler,
        })
    }

    const fn game_over(name: &'static str, handler: Handler) -> Self {
        Self {
            name,
            matcher: Matcher::GameOver,
            handler,
        }
    }

    const fn transition(name: &'static str, handler: Handler) -> Self {
        Self {
            name,
            matcher: Matcher::Transition,
            handler,
        }
    }

    /// The rule's name, as it appears in logs.
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl core::fmt::Debug for Rule {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish_non_exhaustive()
    }
}

fn rule_table() -> Result<Vec<Rule>, ClassifierError> {
    Ok(vec![
        Rule::game_over("appearances", appearances),
        Rule::transition("innings_pitched", innings_pitched),
        Rule::game_over("decisions", decisions),
        Rule::narration("flyout", r"(?i)flyout", flyout)?,
        Rule::narration("groundout", r"(?i)ground out", groundout)?,
        Rule::narration(
            "removal",
            r"(?i)Rogue Umpire incinerated [\w\s]+ pitcher ([\w\s]+)!",
            removal,
        )?,
        Rule::narration("hits", r"(?i)hits a", hit)?,
        Rule::narration("walks", r"(?i)draws a walk", walk)?,
        Rule::narration("strikeouts", r"(?i)strikes out|struck out", strikeout)?,
        Rule::narration("batters_faced", r"(?i)batting for", batter_faced)?,
        Rule::transition("earned_runs", earned_runs),
        Rule::narration("home_runs", r"(?i)home run|grand slam", home_run)?,
        Rule::game_over("quality_starts", quality_starts),
        Rule::game_over("shutouts", shutouts),
    ])
}

// ---------------------------------------------------------------------------
// EventClassifier
// ---------------------------------------------------------------------------

/// Applies the rule table to snapshot transitions.
#[derive(Debug)]
pub struct EventClassifier {
    game_over: Regex,
    rules: Vec<Rule>,
    settings: ClassifierSettings,
}

impl EventClassifier {
    /// Compile the rule table.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError::Pattern`] if a narration pattern does not
    /// compile.
    pub fn new(settings: ClassifierSettings) -> Result<Self, ClassifierError> {
        let game_over = Regex::new(r"(?i)game over").map_err(|source| ClassifierError::Pattern {
            rule: "game_over",
            source,
        })?;
        Ok(Self {
            game_over,
            rules: rule_table()?,
            settings,
        })
    }

    /// The rules in evaluation order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Classify one transition.
    pub fn classify(&self, ctx: &DiffContext<'_>) -> Classification {
        let narration = ctx.current.narration();
        let input = RuleInput {
            ctx: *ctx,
            game_over: self.game_over.is_match(narration),
            settings: self.settings,
        };

        let mut classification = Classification::default();
        for rule in &self.rules {
            let capture = match &rule.matcher {
                Matcher::Narration(pattern) => {
                    let Some(found) = pattern.captures(narration) else {
                        continue;
                    };
                    found.get(1).map(|m| m.as_str())
                }
                Matcher::GameOver if !input.game_over => continue,
                Matcher::GameOver | Matcher::Transition => None,
            };

            match (rule.handler)(&input, capture) {
                Ok(outcomes) => {
                    for outcome in outcomes {
                        match outcome {
                            Outcome::Event(event) => classification.events.push(event),
                            Outcome::Removal(removal) => classification.removals.push(removal),
                        }
                    }
                }
                Err(fault) => {
                    warn!(
                        rule = rule.name,
                        game_id = %ctx.game_id,
                        %fault,
                        "Classification rule skipped"
                    );
                }
            }
        }
        classification
    }
}

// ---------------------------------------------------------------------------
// Rule input and attribution helpers
// ---------------------------------------------------------------------------

struct RuleInput<'a> {
    ctx: DiffContext<'a>,
    game_over: bool,
    settings: ClassifierSettings,
}

impl RuleInput<'_> {
    /// The game ended on this transition: it was still open before and the
    /// narration reports the end.
    fn decided(&self) -> bool {
        self.game_over && self.ctx.previous.is_some_and(|prev| !prev.game_complete)
    }

    fn event(
        &self,
        snapshot: &GameSnapshot,
        player: &PlayerId,
        kind: EventKind,
        quantity: u32,
    ) -> Result<Outcome, RuleFault> {
        let season_id = snapshot.season.ok_or(RuleFault::MissingField("season"))?;
        Ok(Outcome::Event(AttributedEvent {
            player_id: player.clone(),
            event: DomainEvent {
                kind,
                quantity,
                game_id: self.ctx.game_id.clone(),
                inning: snapshot.inning,
                outs_at_event: snapshot.half_inning_outs,
                season_id,
                is_postseason: snapshot.is_postseason,
            },
        }))
    }

    /// Credit the current snapshot's pitcher for `side`.
    fn starter(&self, side: Side, kind: EventKind, quantity: u32) -> Result<Outcome, RuleFault> {
        let current = self.ctx.current;
        let player = current
            .pitcher(side)
            .ok_or(RuleFault::MissingField(pitcher_field(side)))?;
        self.event(current, player, kind, quantity)
    }

    /// Credit the player-of-record of `snapshot`.
    fn on_mound(
        &self,
        snapshot: &GameSnapshot,
        kind: EventKind,
        quantity: u32,
    ) -> Result<Outcome, RuleFault> {
        let player = snapshot
            .pitcher_of_record()
            .ok_or(RuleFault::MissingField(pitcher_field(snapshot.pitching_side())))?;
        self.event(snapshot, player, kind, quantity)
    }

    /// Credit the previous player-of-record; nothing on a game's first
    /// transition.
    fn previous_on_mound(&self, kind: EventKind) -> Result<Vec<Outcome>, RuleFault> {
        match self.ctx.previous {
            Some(previous) => Ok(vec![self.on_mound(previous, kind, 1)?]),
            None => Ok(Vec::new()),
        }
    }

    fn current_on_mound(&self, kind: EventKind) -> Result<Vec<Outcome>, RuleFault> {
        Ok(vec![self.on_mound(self.ctx.current, kind, 1)?])
    }
}

const fn pitcher_field(side: Side) -> &'static str {
    match side {
        Side::Home => "homePitcher",
        Side::Away => "awayPitcher",
    }
}

const fn score_field(side: Side) -> &'static str {
    match side {
        Side::Home => "homeScore",
        Side::Away => "awayScore",
    }
}

fn score(snapshot: &GameSnapshot, side: Side) -> Result<u32, RuleFault> {
    snapshot
        .score(side)
        .ok_or(RuleFault::MissingField(score_field(side)))
}

/// Runs scored against the pitcher of `side`.
fn runs_against(snapshot: &GameSnapshot, side: Side) -> Result<u32, RuleFault> {
    score(snapshot, side.opponent())
}

/// Whether the half inning rolled over: two outs before, zero after.
fn rolled_over(previous: &GameSnapshot, current: &GameSnapshot) -> Result<bool, RuleFault> {
    let before = previous
        .half_inning_outs
        .ok_or(RuleFault::MissingField("halfInningOuts"))?;
    let after = current
        .half_inning_outs
        .ok_or(RuleFault::MissingField("halfInningOuts"))?;
    Ok(before == 2 && after == 0)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn appearances(input: &RuleInput<'_>, _: Option<&str>) -> Result<Vec<Outcome>, RuleFault> {
    if !input.decided() {
        return Ok(Vec::new());
    }
    Ok(vec![
        input.starter(Side::Away, EventKind::Appearance, 1)?,
        input.starter(Side::Home, EventKind::Appearance, 1)?,
    ])
}

fn innings_pitched(input: &RuleInput<'_>, _: Option<&str>) -> Result<Vec<Outcome>, RuleFault> {
    let Some(previous) = input.ctx.previous else {
        return Ok(Vec::new());
    };
    if input.game_over || rolled_over(previous, input.ctx.current)? {
        Ok(vec![input.on_mound(previous, EventKind::InningPitched, 1)?])
    } else {
        Ok(Vec::new())
    }
}

fn decisions(input: &RuleInput<'_>, _: Option<&str>) -> Result<Vec<Outcome>, RuleFault> {
    if !input.decided() {
        return Ok(Vec::new());
    }
    let current = input.ctx.current;
    // Ties go to the away team.
    let (winner, loser) = if score(current, Side::Home)? > score(current, Side::Away)? {
        (Side::Home, Side::Away)
    } else {
        (Side::Away, Side::Home)
    };
    Ok(vec![
        input.starter(winner, EventKind::Win, 1)?,
        input.starter(loser, EventKind::Loss, 1)?,
    ])
}

fn flyout(input: &RuleInput<'_>, _: Option<&str>) -> Result<Vec<Outcome>, RuleFault> {
    input.previous_on_mound(EventKind::Flyout)
}

fn groundout(input: &RuleInput<'_>, _: Option<&str>) -> Result<Vec<Outcome>, RuleFault> {
    input.previous_on_mound(EventKind::Groundout)
}

fn removal(input: &RuleInput<'_>, name: Option<&str>) -> Result<Vec<Outcome>, RuleFault> {
    let Some(previous) = input.ctx.previous else {
        return Ok(Vec::new());
    };
    let name = name.ok_or(RuleFault::MissingField("lastUpdate"))?;
    Ok(vec![Outcome::Removal(Removal {
        name: name.to_owned(),
        at: GameMarker {
            day: previous.day,
            game_id: input.ctx.game_id.clone(),
            season: previous.season,
        },
    })])
}

fn hit(input: &RuleInput<'_>, _: Option<&str>) -> Result<Vec<Outcome>, RuleFault> {
    input.previous_on_mound(EventKind::Hit)
}

fn walk(input: &RuleInput<'_>, _: Option<&str>) -> Result<Vec<Outcome>, RuleFault> {
    input.previous_on_mound(EventKind::BaseOnBalls)
}

fn strikeout(input: &RuleInput<'_>, _: Option<&str>) -> Result<Vec<Outcome>, RuleFault> {
    input.current_on_mound(EventKind::Strikeout)
}

fn batter_faced(input: &RuleInput<'_>, _: Option<&str>) -> Result<Vec<Outcome>, RuleFault> {
    input.current_on_mound(EventKind::BatterFaced)
}

fn home_run(input: &RuleInput<'_>, _: Option<&str>) -> Result<Vec<Outcome>, RuleFault> {
    input.previous_on_mound(EventKind::HomeRun)
}

fn earned_runs(input: &RuleInput<'_>, _: Option<&str>) -> Result<Vec<Outcome>, RuleFault> {
    let Some(previous) = input.ctx.previous else {
        return Ok(Vec::new());
    };
    match input.settings.earned_run_rule {
        EarnedRunRule::HalfInning => half_inning_runs(input, previous),
        EarnedRunRule::ScoreDelta => score_delta_runs(input, previous),
    }
}

fn half_inning_runs(
    input: &RuleInput<'_>,
    previous: &GameSnapshot,
) -> Result<Vec<Outcome>, RuleFault> {
    let current = input.ctx.current;
    let completed = !previous.game_complete && current.game_complete;
    if !completed && !rolled_over(previous, current)? {
        return Ok(Vec::new());
    }

    let runs = previous
        .half_inning_score
        .ok_or(RuleFault::MissingField("halfInningScore"))?;
    if runs == 0 {
        return Ok(Vec::new());
    }
    Ok(vec![input.on_mound(previous, EventKind::EarnedRunAllowed, runs)?])
}

fn score_delta_runs(
    input: &RuleInput<'_>,
    previous: &GameSnapshot,
) -> Result<Vec<Outcome>, RuleFault> {
    let mut outcomes = Vec::new();
    for batting in [Side::Away, Side::Home] {
        let runs = score(input.ctx.current, batting)?.saturating_sub(score(previous, batting)?);
        if runs > 0 {
            outcomes.push(input.starter(batting.opponent(), EventKind::EarnedRunAllowed, runs)?);
        }
    }
    Ok(outcomes)
}

fn quality_starts(input: &RuleInput<'_>, _: Option<&str>) -> Result<Vec<Outcome>, RuleFault> {
    if !input.decided() {
        return Ok(Vec::new());
    }
    let current = input.ctx.current;
    let mut outcomes = Vec::new();
    for side in [Side::Away, Side::Home] {
        let allowed = match input.settings.quality_start_rule {
            QualityStartRule::RunsAllowed => runs_against(current, side)?,
            QualityStartRule::HomeScoreLiteral => score(current, Side::Home)?,
        };
        if allowed <= QUALITY_START_MAX_RUNS {
            outcomes.push(input.starter(side, EventKind::QualityStart, 1)?);
        }
    }
    Ok(outcomes)
}

fn shutouts(input: &RuleInput<'_>, _: Option<&str>) -> Result<Vec<Outcome>, RuleFault> {
    if !input.decided() {
        return Ok(Vec::new());
    }
    let current = input.ctx.current;
    let mut outcomes = Vec::new();
    for side in [Side::Away, Side::Home] {
        if runs_against(current, side)? == 0 {
            outcomes.push(input.starter(side, EventKind::Shutout, 1)?);
        }
    }
    Ok(outcomes)
}
