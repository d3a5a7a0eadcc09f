//! Game configuration.
//!
//! Every tunable constant lives here so a JSON file can override it. Missing
//! fields fall back to the stock game values.

use crate::combat::CombatConfig;
use crate::strike::StrikeConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration for a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Fixed RNG seed. `None` seeds from entropy.
    pub seed: Option<u64>,

    /// The companion's name.
    pub companion_name: String,

    pub combat: CombatConfig,

    pub strike: StrikeConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: None,
            companion_name: "Aria".to_string(),
            combat: CombatConfig::default(),
            strike: StrikeConfig::default(),
        }
    }
}

impl GameConfig {
    /// Read and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse and validate JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the companion's name.
    pub fn with_companion_name(mut self, name: impl Into<String>) -> Self {
        self.companion_name = name.into();
        self
    }

    /// Replace the combat rules.
    pub fn with_combat(mut self, combat: CombatConfig) -> Self {
        self.combat = combat;
        self
    }

    /// Replace the minigame settings.
    pub fn with_strike(mut self, strike: StrikeConfig) -> Self {
        self.strike = strike;
        self
    }

    /// Set the minigame tick length.
    pub fn with_tick_interval_ms(mut self, ms: u64) -> Self {
        self.strike.tick_interval_ms = ms;
        self
    }

    /// Reject values the game cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let strike = &self.strike;
        let combat = &self.combat;
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if strike.width < 2 {
            return invalid(format!("strike bar width must be at least 2, got {}", strike.width));
        }
        if strike.base_width == 0 {
            return invalid("base zone width must be positive".to_string());
        }
        if strike.base_start_min > strike.base_start_max {
            return invalid(format!(
                "base zone start range {}..={} is empty",
                strike.base_start_min, strike.base_start_max
            ));
        }
        match strike.base_start_max.checked_add(strike.base_width) {
            Some(end) if end <= strike.width => {}
            _ => {
                return invalid(format!(
                    "base zone starting at {} with width {} does not fit on a bar of {}",
                    strike.base_start_max, strike.base_width, strike.width
                ));
            }
        }
        if strike.max_ticks == 0 {
            return invalid("max_ticks must be positive".to_string());
        }
        if !strike.damage.is_ordered() {
            return invalid(format!(
                "strike damage must rank miss < base < bonus, got {} / {} / {}",
                strike.damage.miss, strike.damage.base, strike.damage.bonus
            ));
        }

        if combat.max_player_hp <= 0 {
            return invalid("max_player_hp must be positive".to_string());
        }
        if combat.max_turns == 0 {
            return invalid("max_turns must be positive".to_string());
        }
        if !(0..=100).contains(&combat.mercy_threshold) {
            return invalid(format!(
                "mercy_threshold is a percentage, got {}",
                combat.mercy_threshold
            ));
        }
        if combat.potion_heal < 0 {
            return invalid("potion_heal cannot be negative".to_string());
        }
        if combat.analyze_damage.min() < 1 {
            return invalid(format!(
                "analyze damage {} can roll below 1",
                combat.analyze_damage
            ));
        }
        if !(combat.flee_base_chance >= 0.0 && combat.flee_chance_per_strike >= 0.0) {
            return invalid("flee chances cannot be negative".to_string());
        }
        Ok(())
    }
}
