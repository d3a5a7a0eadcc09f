//! Enemy catalog.
//!
//! Templates are immutable and owned by the [`EnemyCatalog`]. Each encounter
//! gets its own [`EnemyInstance`] cloned from a template, so damage never
//! leaks back into the catalog.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

/// Errors from building a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Enemy '{0}' must have positive max HP")]
    NonPositiveHp(String),

    #[error("Enemy '{0}' needs at least two distinct attacks")]
    TooFewAttacks(String),

    #[error("Duplicate enemy key: {0}")]
    DuplicateKey(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Static definition of an enemy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyTemplate {
    pub id: String,
    pub name: String,
    pub max_hp: i32,
    pub attacks: Vec<String>,
    pub description: String,
    pub weakness_hint: String,
}

impl EnemyTemplate {
    pub fn new(id: impl Into<String>, name: impl Into<String>, max_hp: i32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            max_hp,
            attacks: Vec::new(),
            description: String::new(),
            weakness_hint: "No obvious weakness".to_string(),
        }
    }

    pub fn with_attacks<I, S>(mut self, attacks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attacks = attacks.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_weakness(mut self, hint: impl Into<String>) -> Self {
        self.weakness_hint = hint.into();
        self
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.max_hp <= 0 {
            return Err(CatalogError::NonPositiveHp(self.id.clone()));
        }
        let distinct: HashSet<&str> = self.attacks.iter().map(String::as_str).collect();
        if distinct.len() < 2 {
            return Err(CatalogError::TooFewAttacks(self.id.clone()));
        }
        Ok(())
    }
}

/// An enemy taking part in one encounter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnemyInstance {
    pub name: String,
    hp: i32,
    max_hp: i32,
    pub attacks: Vec<String>,
    pub description: String,
    pub weakness_hint: String,
}

impl From<&EnemyTemplate> for EnemyInstance {
    fn from(template: &EnemyTemplate) -> Self {
        Self {
            name: template.name.clone(),
            hp: template.max_hp,
            max_hp: template.max_hp,
            attacks: template.attacks.clone(),
            description: template.description.clone(),
            weakness_hint: template.weakness_hint.clone(),
        }
    }
}

impl EnemyInstance {
    pub fn hp(&self) -> i32 {
        self.hp
    }

    pub fn max_hp(&self) -> i32 {
        self.max_hp
    }

    /// Apply damage, clamping at zero. Returns true while the enemy still stands.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        self.hp = (self.hp - amount.max(0)).max(0);
        self.hp > 0
    }

    pub fn is_defeated(&self) -> bool {
        self.hp == 0
    }

    /// Remaining HP as a whole percentage of max.
    pub fn hp_percent(&self) -> i32 {
        if self.max_hp <= 0 {
            return 0;
        }
        let percent = i64::from(self.hp) * 100 / i64::from(self.max_hp);
        i32::try_from(percent).unwrap_or(100)
    }

    /// True when `hp <= threshold_percent% of max_hp`, compared in integers.
    pub fn within_mercy_range(&self, threshold_percent: i32) -> bool {
        i64::from(self.hp) * 100 <= i64::from(self.max_hp) * i64::from(threshold_percent)
    }
}

/// Immutable lookup table of enemy templates keyed by id.
#[derive(Debug, Clone, Default)]
pub struct EnemyCatalog {
    templates: BTreeMap<String, EnemyTemplate>,
}

impl EnemyCatalog {
    /// Build a catalog from templates, rejecting invalid or duplicate entries.
    pub fn from_templates(
        templates: impl IntoIterator<Item = EnemyTemplate>,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self::default();
        for template in templates {
            template.validate()?;
            if catalog.templates.contains_key(&template.id) {
                return Err(CatalogError::DuplicateKey(template.id));
            }
            catalog.templates.insert(template.id.clone(), template);
        }
        Ok(catalog)
    }

    /// Parse a JSON array of templates.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let templates: Vec<EnemyTemplate> = serde_json::from_str(json)?;
        Self::from_templates(templates)
    }

    /// Return a new catalog with additional templates merged in.
    pub fn extended_with(
        &self,
        extra: impl IntoIterator<Item = EnemyTemplate>,
    ) -> Result<Self, CatalogError> {
        Self::from_templates(self.templates.values().cloned().chain(extra))
    }

    /// The four enemies of the standard campaign.
    pub fn standard() -> Self {
        let mut templates = BTreeMap::new();
        for template in standard_templates() {
            templates.insert(template.id.clone(), template);
        }
        Self { templates }
    }

    pub fn get(&self, key: &str) -> Option<&EnemyTemplate> {
        self.templates.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.templates.contains_key(key)
    }

    /// Clone a fresh instance for a new encounter.
    pub fn spawn(&self, key: &str) -> Option<EnemyInstance> {
        self.get(key).map(EnemyInstance::from)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

fn standard_templates() -> Vec<EnemyTemplate> {
    vec![
        EnemyTemplate::new("glitch", "Glitched Sentinel", 30)
            .with_attacks([
                "jabs at you erratically",
                "lets out a digital shriek",
                "fragments into shards",
            ])
            .with_description(
                "A corrupted program with distorted edges and flickering form.\n\
                 Its attacks are unpredictable and violent.",
            )
            .with_weakness("It seems to follow a pattern beneath the chaos"),
        EnemyTemplate::new("phantom", "Data Phantom", 25)
            .with_attacks([
                "phases through your guard",
                "drains your concentration",
                "whispers confusing code",
            ])
            .with_description(
                "An ethereal entity made of pure data. It shifts when you look at it.\n\
                 Its presence makes your thoughts fuzzy.",
            )
            .with_weakness("It needs a solid connection. Disruption could work"),
        EnemyTemplate::new("fragment", "Corrupted Fragment", 20)
            .with_attacks([
                "strikes with broken code",
                "spins chaotically",
                "emits a high-frequency pulse",
            ])
            .with_description(
                "A shard of corrupted data, hostile and unpredictable.\n\
                 Smaller, but no less dangerous.",
            )
            .with_weakness("Its spin attack leaves it temporarily exposed"),
        EnemyTemplate::new("echo", "System Echo", 35)
            .with_attacks([
                "echoes your weakness",
                "amplifies your fear",
                "mirrors your movements",
            ])
            .with_description(
                "A reflection of corrupted consciousness. It mirrors your movements.\n\
                 The more you fight, the stronger it becomes.",
            )
            .with_weakness("It's powered by negative emotions. Compassion confuses it"),
    ]
}
