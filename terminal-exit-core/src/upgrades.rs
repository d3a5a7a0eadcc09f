//! Companion upgrade modules.
//!
//! Upgrades are found as inventory items and installed into the companion by
//! name. Two keywords matter to combat: names containing "Precision" or
//! "Power" open bonus strike zones.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad grouping of upgrades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeCategory {
    Analysis,
    Combat,
    Utility,
    Progression,
}

impl fmt::Display for UpgradeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UpgradeCategory::Analysis => "analysis",
            UpgradeCategory::Combat => "combat",
            UpgradeCategory::Utility => "utility",
            UpgradeCategory::Progression => "progression",
        };
        write!(f, "{name}")
    }
}

/// A known upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Upgrade {
    pub id: &'static str,
    pub name: &'static str,
    pub category: UpgradeCategory,
    pub description: &'static str,
}

const fn upgrade(
    id: &'static str,
    name: &'static str,
    category: UpgradeCategory,
    description: &'static str,
) -> Upgrade {
    Upgrade {
        id,
        name,
        category,
        description,
    }
}

/// Every upgrade that exists in the game.
pub const UPGRADES: &[Upgrade] = &[
    upgrade(
        "scanner",
        "Basic Scanner",
        UpgradeCategory::Analysis,
        "Examine objects and enemies in detail",
    ),
    upgrade(
        "pattern_recognition",
        "Pattern Recognition",
        UpgradeCategory::Analysis,
        "Predict attack patterns in combat",
    ),
    upgrade(
        "weakness_detector",
        "Weakness Detector",
        UpgradeCategory::Analysis,
        "Reveal enemy vulnerabilities",
    ),
    upgrade(
        "environmental_analysis",
        "Environmental Analysis",
        UpgradeCategory::Analysis,
        "Understand area hazards and secrets",
    ),
    upgrade(
        "corruption_reader",
        "Corruption Reader",
        UpgradeCategory::Analysis,
        "Decrypt hidden messages and corrupted text",
    ),
    upgrade(
        "tactical_advisor",
        "Tactical Advisor",
        UpgradeCategory::Combat,
        "Suggests optimal combat moves",
    ),
    upgrade(
        "shield_subroutine",
        "Shield Subroutine",
        UpgradeCategory::Combat,
        "Reduce incoming damage by analyzing attacks",
    ),
    upgrade(
        "mercy_protocol",
        "Mercy Protocol",
        UpgradeCategory::Combat,
        "Allow sparing enemies instead of defeating them",
    ),
    upgrade(
        "precision_targeting",
        "Precision Targeting",
        UpgradeCategory::Combat,
        "Opens a wide bonus strike zone",
    ),
    upgrade(
        "power_surge",
        "Power Surge",
        UpgradeCategory::Combat,
        "Opens an early, aggressive bonus strike zone",
    ),
    upgrade(
        "navigation_assist",
        "Navigation Assist",
        UpgradeCategory::Utility,
        "Improved map system and path finding",
    ),
    upgrade(
        "memory_banks",
        "Memory Banks",
        UpgradeCategory::Utility,
        "Store important lore and information",
    ),
    upgrade(
        "firewall_bypass",
        "Firewall Bypass",
        UpgradeCategory::Progression,
        "Access restricted zones",
    ),
    upgrade(
        "data_recovery",
        "Data Recovery",
        UpgradeCategory::Progression,
        "Restore corrupted areas",
    ),
];

/// Look up an upgrade by id.
pub fn get_upgrade(id: &str) -> Option<&'static Upgrade> {
    UPGRADES.iter().find(|u| u.id == id)
}

/// Look up an upgrade by display name, ignoring case.
pub fn find_by_name(name: &str) -> Option<&'static Upgrade> {
    UPGRADES.iter().find(|u| u.name.eq_ignore_ascii_case(name))
}

/// All upgrades in a category.
pub fn by_category(category: UpgradeCategory) -> Vec<&'static Upgrade> {
    UPGRADES.iter().filter(|u| u.category == category).collect()
}
