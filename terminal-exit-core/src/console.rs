//! The presentation and input boundary.
//!
//! Combat and exploration never print or read directly. Everything goes
//! through a [`Console`], which the binary implements for a real terminal and
//! tests implement with a scripted transcript.

use crate::companion::Mood;
use crate::strike::{HitClass, StrikeBar};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Emphasis for a line of output. Front ends map this to colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Tone {
    #[default]
    Info,
    Good,
    Bad,
    Warn,
    Companion,
    Enemy,
}

/// Terminal-like device the game talks to.
pub trait Console {
    /// Show the companion's face for a mood.
    fn show_face(&mut self, mood: Mood);

    /// Show a framed box of lines.
    fn show_box(&mut self, title: &str, lines: &[String], tone: Tone);

    /// Show a labelled HP-style bar.
    fn show_bar(&mut self, label: &str, current: i32, max: i32, tone: Tone);

    /// Print one line.
    fn say(&mut self, text: &str, tone: Tone);

    /// Draw the minigame bar in its current state.
    fn render_strike(&mut self, bar: &StrikeBar);

    /// Read one line of input. `None` means the input is closed.
    fn read_line(&mut self, prompt: &str) -> Option<String>;

    /// Wait up to `timeout` for the "act now" signal.
    fn poll_strike(&mut self, timeout: Duration) -> bool;

    /// Whether the player gave up on the current sweep. Checked after each
    /// poll that did not fire; a cancelled sweep resolves as a miss.
    fn strike_cancelled(&self) -> bool {
        false
    }

    /// Called once before a sweep starts.
    fn begin_strike(&mut self, _bar: &StrikeBar) {}

    /// Called once after a sweep resolves.
    fn end_strike(&mut self, _result: HitClass) {}

    /// A line spoken by the companion.
    fn companion_says(&mut self, name: &str, text: &str) {
        self.say(&format!("▸ {name}: \"{text}\""), Tone::Companion);
    }
}
