//! The AI companion and its bond with the player.
//!
//! Bond only ever grows. Combat reads it for damage mitigation and mercy
//! odds, and strengthens it at fixed story beats; nothing can lower it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Companion facial expression. Purely cosmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    #[default]
    Happy,
    Neutral,
    Thinking,
    Nervous,
    Sad,
}

impl Mood {
    pub fn name(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Neutral => "neutral",
            Mood::Thinking => "thinking",
            Mood::Nervous => "nervous",
            Mood::Sad => "sad",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Bond increase for winning a fight.
pub const VICTORY_BOND: f64 = 0.10;
/// Bond increase for a successful act of mercy.
pub const MERCY_BOND: f64 = 0.15;
/// Bond increase when the companion pulls the player back from defeat.
pub const DEFEAT_BOND: f64 = 0.05;
/// Bond increase for installing an upgrade.
pub const UPGRADE_BOND: f64 = 0.05;

/// The AI companion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Companion {
    name: String,
    mood: Mood,
    bond: f64,
    upgrades: Vec<String>,
}

impl Companion {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mood: Mood::Happy,
            bond: 0.0,
            upgrades: Vec::new(),
        }
    }

    /// Start from an existing bond value, clamped into `[0, 1]`.
    pub fn with_bond(mut self, bond: f64) -> Self {
        self.bond = if bond.is_nan() { 0.0 } else { bond.clamp(0.0, 1.0) };
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mood(&self) -> Mood {
        self.mood
    }

    pub fn set_mood(&mut self, mood: Mood) {
        self.mood = mood;
    }

    pub fn bond(&self) -> f64 {
        self.bond
    }

    /// Bond as a whole percentage, for display.
    pub fn bond_percent(&self) -> u32 {
        (self.bond * 100.0).round() as u32
    }

    /// Raise the bond by `amount`, clamped at 1.0. Negative or NaN amounts
    /// are ignored. Returns the new bond.
    pub fn strengthen_bond(&mut self, amount: f64) -> f64 {
        if amount > 0.0 {
            self.bond = (self.bond + amount).min(1.0);
        }
        self.bond
    }

    pub fn upgrades(&self) -> &[String] {
        &self.upgrades
    }

    pub fn has_upgrade(&self, name: &str) -> bool {
        self.upgrades.iter().any(|u| u.eq_ignore_ascii_case(name))
    }

    /// Append an upgrade. The list never shrinks.
    pub fn install_upgrade(&mut self, name: impl Into<String>) {
        self.upgrades.push(name.into());
    }

    /// Damage the companion absorbs from each enemy hit: `floor(bond * 4)`.
    pub fn mitigation(&self) -> i32 {
        ((self.bond * 4.0).floor() as i32).clamp(0, 4)
    }

    /// Probability that an act of mercy is accepted.
    pub fn mercy_chance(&self) -> f64 {
        0.4 + self.bond * 0.3
    }

    /// Status lines for the companion panel.
    pub fn describe(&self) -> Vec<String> {
        vec![
            format!("Current Mood: {}", self.mood),
            format!("Upgrades: {}", self.upgrades.len()),
            format!("Bond: {}%", self.bond_percent()),
        ]
    }
}

impl Default for Companion {
    fn default() -> Self {
        Self::new("Aria")
    }
}
