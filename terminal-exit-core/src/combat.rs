//! Combat encounter state machine.
//!
//! An [`Encounter`] owns one enemy instance and the per-fight counters. The
//! caller feeds it one [`TurnChoice`] at a time; it resolves the player's
//! action, lets the enemy retaliate when appropriate, and reports what
//! happened as a list of [`CombatEvent`]s. No I/O happens here.

use crate::companion::{Companion, Mood, DEFEAT_BOND, MERCY_BOND, VICTORY_BOND};
use crate::config::GameConfig;
use crate::dice::{fixed, DiceExpression, Roller};
use crate::enemies::{EnemyCatalog, EnemyInstance};
use crate::inventory::Inventory;
use crate::strike::{HitClass, StrikeDamage};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors from starting or driving an encounter.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncounterError {
    #[error("Unknown enemy: {0}")]
    UnknownEnemy(String),

    #[error("Encounter already ended")]
    AlreadyOver,
}

// ============================================================================
// Configuration
// ============================================================================

/// Tunable combat rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub max_player_hp: i32,
    /// Consumed turns before the fight ends in a stalemate.
    pub max_turns: u32,
    /// Mercy is offered at or below this percentage of enemy max HP.
    pub mercy_threshold: i32,
    pub potion_heal: i32,
    pub enemy_damage: DiceExpression,
    pub analyze_damage: DiceExpression,
    pub flee_base_chance: f64,
    /// Added to the flee chance per landed strike. Uncapped.
    pub flee_chance_per_strike: f64,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            max_player_hp: 100,
            max_turns: 30,
            mercy_threshold: 30,
            potion_heal: 30,
            enemy_damage: fixed("1d8+4"),
            analyze_damage: fixed("1d6+3"),
            flee_base_chance: 0.3,
            flee_chance_per_strike: 0.15,
        }
    }
}

impl CombatConfig {
    pub fn with_max_turns(mut self, turns: u32) -> Self {
        self.max_turns = turns;
        self
    }

    pub fn with_max_player_hp(mut self, hp: i32) -> Self {
        self.max_player_hp = hp;
        self
    }

    pub fn with_potion_heal(mut self, heal: i32) -> Self {
        self.potion_heal = heal;
        self
    }

    /// Flee probability after `strikes_landed` landed strikes.
    pub fn flee_chance(&self, strikes_landed: u32) -> f64 {
        self.flee_base_chance + f64::from(strikes_landed) * self.flee_chance_per_strike
    }
}

// ============================================================================
// Actions and Events
// ============================================================================

/// A top-level menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CombatAction {
    Attack,
    Analyze,
    Item,
    Mercy,
    Flee,
}

impl CombatAction {
    pub const ALL: [CombatAction; 5] = [
        CombatAction::Attack,
        CombatAction::Analyze,
        CombatAction::Item,
        CombatAction::Mercy,
        CombatAction::Flee,
    ];

    /// Parse a menu line: `1`-`5` or the action word.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "1" | "attack" => Some(CombatAction::Attack),
            "2" | "analyze" => Some(CombatAction::Analyze),
            "3" | "item" => Some(CombatAction::Item),
            "4" | "mercy" => Some(CombatAction::Mercy),
            "5" | "flee" => Some(CombatAction::Flee),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CombatAction::Attack => "ATTACK (minigame)",
            CombatAction::Analyze => "ANALYZE (AI insight)",
            CombatAction::Item => "ITEM (use potion)",
            CombatAction::Mercy => "MERCY (spare if weak)",
            CombatAction::Flee => "FLEE (try to escape)",
        }
    }
}

/// A fully decided player action, ready to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnChoice {
    /// Attack with the minigame's classification.
    Attack(HitClass),
    Analyze,
    /// Use the named consumable, or nothing.
    UseItem(Option<String>),
    Mercy,
    Flee,
}

/// Something the companion noticed while analysing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Insight {
    Weakness(String),
    Health { hp: i32, max_hp: i32, percent: i32 },
    NextAttack(String),
    Pattern,
    Exhaustion,
}

impl fmt::Display for Insight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Insight::Weakness(hint) => write!(f, "Weakness: {hint}"),
            Insight::Health { hp, max_hp, percent } => {
                write!(f, "Current HP: {hp}/{max_hp} ({percent}%)")
            }
            Insight::NextAttack(attack) => write!(f, "Next attack likely: {attack}"),
            Insight::Pattern => {
                write!(f, "Pattern detected! Keep attacking now while it's vulnerable!")
            }
            Insight::Exhaustion => write!(f, "I can sense its exhaustion... it's weakening!"),
        }
    }
}

/// Something that happened during a turn.
#[derive(Debug, Clone, PartialEq)]
pub enum CombatEvent {
    Strike { hit: HitClass, damage: i32, enemy_hp: i32 },
    Analyzed { insight: Insight, damage: i32, enemy_hp: i32 },
    Healed { item: String, amount: i32, player_hp: i32 },
    ItemUsed { item: String },
    NoConsumables,
    NothingUsed,
    /// Enemy too healthy; the offer was never made.
    MercyRefused,
    MercyRejected,
    MercyAccepted,
    FleeFailed,
    FleeSucceeded,
    EnemyAttack { attack: String, damage: i32, mitigated: i32, player_hp: i32 },
    BondStrengthened { amount: f64, bond: f64 },
    Ended(EncounterOutcome),
}

/// How a fight ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EncounterOutcome {
    Victory,
    Spared,
    Defeat,
    Fled,
    Stalemate,
}

impl EncounterOutcome {
    /// Victory and mercy both count as winning.
    pub fn is_win(&self) -> bool {
        matches!(self, EncounterOutcome::Victory | EncounterOutcome::Spared)
    }
}

impl fmt::Display for EncounterOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EncounterOutcome::Victory => "victory",
            EncounterOutcome::Spared => "spared",
            EncounterOutcome::Defeat => "defeat",
            EncounterOutcome::Fled => "fled",
            EncounterOutcome::Stalemate => "stalemate",
        };
        write!(f, "{name}")
    }
}

/// Result of resolving one [`TurnChoice`].
#[derive(Debug, Clone, PartialEq)]
pub struct TurnResolution {
    pub events: Vec<CombatEvent>,
    /// False when the choice was refused without using up the turn.
    pub consumed_turn: bool,
    pub outcome: Option<EncounterOutcome>,
}

/// Summary handed back to the caller when a fight is over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterReport {
    pub enemy: String,
    pub outcome: EncounterOutcome,
    pub turns: u32,
    pub strikes_landed: u32,
    pub strikes_missed: u32,
    /// Landed strikes as a percentage of all strikes.
    pub accuracy: u32,
    pub player_hp: i32,
}

impl EncounterReport {
    pub fn won(&self) -> bool {
        self.outcome.is_win()
    }
}

// ============================================================================
// State
// ============================================================================

/// Mutable state of one fight.
#[derive(Debug, Clone)]
pub struct CombatState {
    pub enemy: EnemyInstance,
    pub player_hp: i32,
    pub max_player_hp: i32,
    pub turn_count: u32,
    pub strikes_landed: u32,
    pub strikes_missed: u32,
    /// Attack index revealed by analysis; used by the next enemy turn.
    telegraphed: Option<usize>,
}

impl CombatState {
    fn new(enemy: EnemyInstance, max_player_hp: i32) -> Self {
        Self {
            enemy,
            player_hp: max_player_hp,
            max_player_hp,
            turn_count: 0,
            strikes_landed: 0,
            strikes_missed: 0,
            telegraphed: None,
        }
    }

    pub fn accuracy(&self) -> u32 {
        let total = self.strikes_landed.saturating_add(self.strikes_missed);
        if total == 0 {
            0
        } else {
            let percent = u64::from(self.strikes_landed) * 100 / u64::from(total);
            u32::try_from(percent).unwrap_or(100)
        }
    }
}

/// One battle against one enemy.
#[derive(Debug, Clone)]
pub struct Encounter {
    state: CombatState,
    rules: CombatConfig,
    damage: StrikeDamage,
    outcome: Option<EncounterOutcome>,
}

impl Encounter {
    /// Spawn the enemy and reset the player for a new fight.
    pub fn begin(
        catalog: &EnemyCatalog,
        key: &str,
        config: &GameConfig,
    ) -> Result<Self, EncounterError> {
        let Some(enemy) = catalog.spawn(key) else {
            warn!("Encounter requested for unknown enemy '{key}'");
            return Err(EncounterError::UnknownEnemy(key.to_string()));
        };
        info!("Encounter started: {} ({} HP)", enemy.name, enemy.max_hp());

        Ok(Self {
            state: CombatState::new(enemy, config.combat.max_player_hp),
            rules: config.combat.clone(),
            damage: config.strike.damage.clone(),
            outcome: None,
        })
    }

    pub fn state(&self) -> &CombatState {
        &self.state
    }

    pub fn enemy(&self) -> &EnemyInstance {
        &self.state.enemy
    }

    pub fn outcome(&self) -> Option<EncounterOutcome> {
        self.outcome
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn rules(&self) -> &CombatConfig {
        &self.rules
    }

    /// Whether mercy would be offered right now.
    pub fn mercy_available(&self) -> bool {
        self.state.enemy.within_mercy_range(self.rules.mercy_threshold)
    }

    /// Resolve one player choice and, where it applies, the enemy's reply.
    pub fn take_turn(
        &mut self,
        choice: TurnChoice,
        companion: &mut Companion,
        inventory: &mut Inventory,
        roller: &mut dyn Roller,
    ) -> Result<TurnResolution, EncounterError> {
        if self.is_over() {
            return Err(EncounterError::AlreadyOver);
        }
        debug!("Turn {}: {:?}", self.state.turn_count + 1, choice);

        let mut events = Vec::new();
        let mut enemy_acts = true;
        let mut consumed = true;

        match choice {
            TurnChoice::Attack(hit) => {
                let damage = self.damage.roll(hit, roller);
                if hit.landed() {
                    self.state.strikes_landed += 1;
                } else {
                    self.state.strikes_missed += 1;
                }
                self.state.enemy.take_damage(damage);
                events.push(CombatEvent::Strike {
                    hit,
                    damage,
                    enemy_hp: self.state.enemy.hp(),
                });
            }
            TurnChoice::Analyze => {
                let insight = self.insight(roller);
                let damage = self.rules.analyze_damage.roll(roller).max(1);
                self.state.enemy.take_damage(damage);
                events.push(CombatEvent::Analyzed {
                    insight,
                    damage,
                    enemy_hp: self.state.enemy.hp(),
                });
            }
            TurnChoice::UseItem(name) => events.push(self.use_item(name, inventory)),
            TurnChoice::Mercy => {
                if !self.mercy_available() {
                    events.push(CombatEvent::MercyRefused);
                    consumed = false;
                    enemy_acts = false;
                } else if roller.succeeds(companion.mercy_chance()) {
                    events.push(CombatEvent::MercyAccepted);
                    let bond = companion.strengthen_bond(MERCY_BOND);
                    events.push(CombatEvent::BondStrengthened {
                        amount: MERCY_BOND,
                        bond,
                    });
                    self.outcome = Some(EncounterOutcome::Spared);
                } else {
                    events.push(CombatEvent::MercyRejected);
                }
            }
            TurnChoice::Flee => {
                let chance = self.rules.flee_chance(self.state.strikes_landed);
                if roller.succeeds(chance) {
                    events.push(CombatEvent::FleeSucceeded);
                    self.outcome = Some(EncounterOutcome::Fled);
                } else {
                    events.push(CombatEvent::FleeFailed);
                }
            }
        }

        if consumed {
            self.state.turn_count += 1;
        }

        if self.outcome.is_none() && self.state.enemy.is_defeated() {
            self.outcome = Some(EncounterOutcome::Victory);
        }

        if self.outcome.is_none() && enemy_acts {
            events.push(self.enemy_turn(companion, roller));
            if self.state.player_hp == 0 {
                self.outcome = Some(EncounterOutcome::Defeat);
            }
        }

        if self.outcome.is_none() && self.state.turn_count >= self.rules.max_turns {
            self.outcome = Some(EncounterOutcome::Stalemate);
        }

        if let Some(outcome) = self.outcome {
            self.conclude(outcome, companion, &mut events);
        }

        Ok(TurnResolution {
            events,
            consumed_turn: consumed,
            outcome: self.outcome,
        })
    }

    /// Summary of the fight so far.
    pub fn report(&self) -> Option<EncounterReport> {
        let outcome = self.outcome?;
        Some(EncounterReport {
            enemy: self.state.enemy.name.clone(),
            outcome,
            turns: self.state.turn_count,
            strikes_landed: self.state.strikes_landed,
            strikes_missed: self.state.strikes_missed,
            accuracy: self.state.accuracy(),
            player_hp: self.state.player_hp,
        })
    }

    fn insight(&mut self, roller: &mut dyn Roller) -> Insight {
        let enemy = &self.state.enemy;
        match roller.range(0, 4) {
            0 => Insight::Weakness(enemy.weakness_hint.clone()),
            1 => Insight::Health {
                hp: enemy.hp(),
                max_hp: enemy.max_hp(),
                percent: enemy.hp_percent(),
            },
            2 => {
                let index = roller.choose_index(enemy.attacks.len());
                self.state.telegraphed = Some(index);
                Insight::NextAttack(enemy.attacks[index].clone())
            }
            3 => Insight::Pattern,
            _ => Insight::Exhaustion,
        }
    }

    fn use_item(&mut self, name: Option<String>, inventory: &mut Inventory) -> CombatEvent {
        if inventory.consumables().is_empty() {
            return CombatEvent::NoConsumables;
        }
        let Some(item) = name.and_then(|n| inventory.remove(&n)) else {
            return CombatEvent::NothingUsed;
        };

        if item.is_potion() {
            let before = self.state.player_hp;
            self.state.player_hp = before
                .saturating_add(self.rules.potion_heal)
                .min(self.state.max_player_hp);
            CombatEvent::Healed {
                item: item.name,
                amount: self.state.player_hp - before,
                player_hp: self.state.player_hp,
            }
        } else {
            CombatEvent::ItemUsed { item: item.name }
        }
    }

    fn enemy_turn(&mut self, companion: &Companion, roller: &mut dyn Roller) -> CombatEvent {
        let enemy = &self.state.enemy;
        let index = match self.state.telegraphed.take() {
            Some(index) if index < enemy.attacks.len() => index,
            _ => roller.choose_index(enemy.attacks.len()),
        };
        let attack = enemy.attacks.get(index).cloned().unwrap_or_default();

        let base = self.rules.enemy_damage.roll(roller);
        let mitigated = companion.mitigation();
        let damage = (base - mitigated).max(1);
        self.state.player_hp = (self.state.player_hp - damage).max(0);
        debug!("Enemy rolled {base}, mitigated {mitigated}, dealt {damage}");

        CombatEvent::EnemyAttack {
            attack,
            damage,
            mitigated,
            player_hp: self.state.player_hp,
        }
    }

    fn conclude(
        &mut self,
        outcome: EncounterOutcome,
        companion: &mut Companion,
        events: &mut Vec<CombatEvent>,
    ) {
        match outcome {
            EncounterOutcome::Victory => {
                let bond = companion.strengthen_bond(VICTORY_BOND);
                events.push(CombatEvent::BondStrengthened {
                    amount: VICTORY_BOND,
                    bond,
                });
                companion.set_mood(Mood::Happy);
            }
            EncounterOutcome::Spared => companion.set_mood(Mood::Happy),
            EncounterOutcome::Defeat => {
                self.state.player_hp = self.state.max_player_hp / 2;
                let bond = companion.strengthen_bond(DEFEAT_BOND);
                events.push(CombatEvent::BondStrengthened {
                    amount: DEFEAT_BOND,
                    bond,
                });
                companion.set_mood(Mood::Nervous);
            }
            EncounterOutcome::Fled | EncounterOutcome::Stalemate => {}
        }
        events.push(CombatEvent::Ended(outcome));
        info!(
            "Encounter with {} ended: {} after {} turns",
            self.state.enemy.name, outcome, self.state.turn_count
        );
    }
}
