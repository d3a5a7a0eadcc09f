//! Testing utilities for TERMINAL.EXIT.
//!
//! This module provides tools for deterministic tests:
//! - `ScriptedRoller` for exact control over every random decision
//! - `ScriptedConsole` for scripted input and a recorded transcript
//! - `TestHarness` for driving a whole session
//! - Assertion helpers for verifying game state

use crate::combat::{EncounterOutcome, EncounterReport};
use crate::companion::Mood;
use crate::config::GameConfig;
use crate::console::{Console, Tone};
use crate::dice::Roller;
use crate::enemies::EnemyCatalog;
use crate::session::{CommandResult, GameSession};
use crate::strike::{HitClass, StrikeBar};
use crate::world::World;
use std::collections::VecDeque;
use std::time::Duration;

// ============================================================================
// ScriptedRoller
// ============================================================================

/// A roller that replays queued values.
///
/// Queued integers are clamped into the requested range. Once a queue runs
/// dry, `range` returns its lower bound and `chance` returns 0.999, so every
/// unscripted roll is the minimum and every unscripted probability check
/// below 1.0 fails.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRoller {
    ranges: VecDeque<u32>,
    chances: VecDeque<f64>,
}

impl ScriptedRoller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue integer results, consumed by `range` and everything built on it.
    pub fn with_ranges(mut self, values: impl IntoIterator<Item = u32>) -> Self {
        self.ranges.extend(values);
        self
    }

    /// Queue probability draws, consumed by `chance` and `succeeds`.
    pub fn with_chances(mut self, values: impl IntoIterator<Item = f64>) -> Self {
        self.chances.extend(values);
        self
    }

    /// Number of queued integers not yet consumed.
    pub fn remaining_ranges(&self) -> usize {
        self.ranges.len()
    }
}

impl Roller for ScriptedRoller {
    fn range(&mut self, low: u32, high: u32) -> u32 {
        match self.ranges.pop_front() {
            Some(value) => value.clamp(low, high.max(low)),
            None => low,
        }
    }

    fn chance(&mut self) -> f64 {
        self.chances.pop_front().unwrap_or(0.999)
    }
}

// ============================================================================
// ScriptedConsole
// ============================================================================

/// A console fed from a script that records everything shown.
///
/// Each minigame sweep takes the next entry from the strike plan: `Some(pos)`
/// fires when the cursor reaches `pos`, `None` never fires.
#[derive(Debug, Clone, Default)]
pub struct ScriptedConsole {
    lines: VecDeque<String>,
    strikes: VecDeque<Option<u32>>,
    target: Option<u32>,
    cursor: u32,
    transcript: Vec<String>,
}

impl ScriptedConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue input lines.
    pub fn with_lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines.extend(lines.into_iter().map(Into::into));
        self
    }

    /// Queue minigame targets, one per sweep.
    pub fn with_strikes(mut self, strikes: impl IntoIterator<Item = Option<u32>>) -> Self {
        self.strikes.extend(strikes);
        self
    }

    pub fn push_line(&mut self, line: impl Into<String>) {
        self.lines.push_back(line.into());
    }

    pub fn push_strike(&mut self, target: Option<u32>) {
        self.strikes.push_back(target);
    }

    /// Everything shown so far, one entry per line.
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    /// Whether any transcript line contains `text`.
    pub fn contains(&self, text: &str) -> bool {
        self.transcript.iter().any(|line| line.contains(text))
    }

    /// Number of transcript lines containing `text`.
    pub fn count_containing(&self, text: &str) -> usize {
        self.transcript.iter().filter(|line| line.contains(text)).count()
    }

    pub fn clear_transcript(&mut self) {
        self.transcript.clear();
    }
}

impl Console for ScriptedConsole {
    fn show_face(&mut self, mood: Mood) {
        self.transcript.push(format!("[face:{mood}]"));
    }

    fn show_box(&mut self, title: &str, lines: &[String], _tone: Tone) {
        self.transcript.push(format!("== {title} =="));
        self.transcript.extend(lines.iter().cloned());
    }

    fn show_bar(&mut self, label: &str, current: i32, max: i32, _tone: Tone) {
        self.transcript.push(format!("{label}: {current}/{max}"));
    }

    fn say(&mut self, text: &str, _tone: Tone) {
        self.transcript.push(text.to_string());
    }

    fn render_strike(&mut self, bar: &StrikeBar) {
        self.cursor = bar.cursor();
    }

    fn read_line(&mut self, _prompt: &str) -> Option<String> {
        self.lines.pop_front()
    }

    fn poll_strike(&mut self, _timeout: Duration) -> bool {
        self.target == Some(self.cursor)
    }

    fn begin_strike(&mut self, _bar: &StrikeBar) {
        self.target = self.strikes.pop_front().flatten();
    }

    fn end_strike(&mut self, result: HitClass) {
        self.target = None;
        self.transcript.push(format!("[strike:{result:?}]"));
    }
}

// ============================================================================
// TestHarness
// ============================================================================

/// Test harness for running whole sessions.
pub struct TestHarness {
    /// The session under test.
    pub session: GameSession,
    /// The console the session talks to.
    pub console: ScriptedConsole,
}

impl TestHarness {
    /// Standard world and enemies, default config, all rolls at minimum.
    pub fn new() -> Self {
        Self::with_roller(ScriptedRoller::new())
    }

    /// Standard world and enemies with a specific roller.
    pub fn with_roller(roller: ScriptedRoller) -> Self {
        Self::with_config(GameConfig::default(), roller)
    }

    /// Standard world and enemies with a custom config.
    pub fn with_config(config: GameConfig, roller: ScriptedRoller) -> Self {
        let world = World::standard().unwrap_or_else(|e| panic!("standard world invalid: {e}"));
        let session =
            GameSession::with_parts(config, world, EnemyCatalog::standard(), Box::new(roller));
        Self {
            session,
            console: ScriptedConsole::new(),
        }
    }

    /// Queue input lines.
    pub fn lines<I, S>(&mut self, lines: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for line in lines {
            self.console.push_line(line);
        }
        self
    }

    /// Queue minigame targets.
    pub fn strikes(&mut self, strikes: impl IntoIterator<Item = Option<u32>>) -> &mut Self {
        for strike in strikes {
            self.console.push_strike(strike);
        }
        self
    }

    /// Run one exploration command.
    pub fn input(&mut self, line: &str) -> CommandResult {
        self.session.handle_command(line, &mut self.console)
    }

    /// Resolve the current room's encounter, if any.
    pub fn fight(&mut self) -> Option<EncounterReport> {
        self.session
            .resolve_pending_encounter(&mut self.console)
            .unwrap_or_else(|e| panic!("encounter failed: {e}"))
    }

    /// Play the full loop until the script runs out.
    pub fn run(&mut self) {
        self.session.run(&mut self.console);
    }

    pub fn room(&self) -> &str {
        &self.session.world().current().name
    }

    pub fn bond(&self) -> f64 {
        self.session.companion().bond()
    }

    pub fn has_item(&self, name: &str) -> bool {
        self.session.inventory().has_item(name)
    }

    pub fn transcript_contains(&self, text: &str) -> bool {
        self.console.contains(text)
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Assert the player is in the named room.
#[track_caller]
pub fn assert_in_room(harness: &TestHarness, name: &str) {
    assert_eq!(
        harness.room(),
        name,
        "Expected to be in '{name}', but in '{}'",
        harness.room()
    );
}

/// Assert the companion bond, within floating point tolerance.
#[track_caller]
pub fn assert_bond(harness: &TestHarness, expected: f64) {
    let actual = harness.bond();
    assert!(
        (actual - expected).abs() < 1e-9,
        "Expected bond {expected}, got {actual}"
    );
}

/// Assert the inventory holds an item.
#[track_caller]
pub fn assert_has_item(harness: &TestHarness, name: &str) {
    assert!(harness.has_item(name), "Expected item '{name}' in inventory");
}

/// Assert an encounter ended a particular way.
#[track_caller]
pub fn assert_outcome(report: &EncounterReport, expected: EncounterOutcome) {
    assert_eq!(
        report.outcome, expected,
        "Expected {expected} against {}, got {}",
        report.enemy, report.outcome
    );
}

/// Assert a room's encounter has been cleared.
#[track_caller]
pub fn assert_encounter_cleared(harness: &TestHarness, room: &str) {
    let room = harness
        .session
        .world()
        .room(room)
        .unwrap_or_else(|| panic!("No room named '{room}'"));
    let cleared = room.encounter.as_ref().map(|tag| tag.cleared);
    assert_eq!(
        cleared,
        Some(true),
        "Expected the encounter in '{}' to be cleared",
        room.name
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_roller_clamps_and_falls_back() {
        let mut roller = ScriptedRoller::new().with_ranges([50, 0]).with_chances([0.25]);
        assert_eq!(roller.range(1, 8), 8);
        assert_eq!(roller.range(3, 6), 3);
        assert_eq!(roller.range(10, 16), 10);
        assert_eq!(roller.chance(), 0.25);
        assert!(!roller.succeeds(0.99));
        assert!(roller.succeeds(1.0));
    }

    #[test]
    fn test_scripted_console_transcript() {
        let mut console = ScriptedConsole::new().with_lines(["hello"]);
        console.say("one", Tone::Info);
        console.show_box("Box", &["two".to_string()], Tone::Good);
        console.show_bar("HP", 5, 10, Tone::Good);
        assert_eq!(console.read_line(">").as_deref(), Some("hello"));
        assert_eq!(console.read_line(">"), None);
        assert_eq!(console.transcript(), ["one", "== Box ==", "two", "HP: 5/10"]);
        assert_eq!(console.count_containing("o"), 3);
    }

    #[test]
    fn test_harness_starts_at_awakening_point() {
        let harness = TestHarness::new();
        assert_in_room(&harness, "Awakening Point");
        assert_bond(&harness, 0.0);
    }
}
