//! Interactive combat driver.
//!
//! [`CombatSystem`] runs an [`Encounter`] against a [`Console`]: it shows the
//! status panel, reads menu choices, runs the strike minigame, and narrates
//! the events each turn produces.

use crate::combat::{
    CombatAction, CombatEvent, Encounter, EncounterError, EncounterOutcome, EncounterReport,
    TurnChoice,
};
use crate::companion::{Companion, Mood};
use crate::config::GameConfig;
use crate::console::{Console, Tone};
use crate::dice::Roller;
use crate::enemies::EnemyCatalog;
use crate::inventory::Inventory;
use crate::strike::{HitClass, StrikeBar};

/// Runs whole encounters against a console.
pub struct CombatSystem<'a> {
    catalog: &'a EnemyCatalog,
    config: &'a GameConfig,
}

impl<'a> CombatSystem<'a> {
    pub fn new(catalog: &'a EnemyCatalog, config: &'a GameConfig) -> Self {
        Self { catalog, config }
    }

    /// Fight the enemy registered under `key` until the encounter ends.
    ///
    /// Fails without touching the companion if the key is unknown.
    pub fn start_encounter(
        &self,
        key: &str,
        console: &mut dyn Console,
        companion: &mut Companion,
        inventory: &mut Inventory,
        roller: &mut dyn Roller,
    ) -> Result<EncounterReport, EncounterError> {
        let mut encounter = Encounter::begin(self.catalog, key, self.config)?;
        self.intro(console, &encounter);

        let report = loop {
            if let Some(report) = encounter.report() {
                break report;
            }
            self.show_status(console, &encounter, companion);

            let choice = match self.read_action(console) {
                CombatAction::Attack => TurnChoice::Attack(self.strike(console, companion, roller)),
                CombatAction::Analyze => {
                    console.show_face(Mood::Thinking);
                    TurnChoice::Analyze
                }
                CombatAction::Item => TurnChoice::UseItem(self.choose_item(console, inventory)),
                CombatAction::Mercy => TurnChoice::Mercy,
                CombatAction::Flee => TurnChoice::Flee,
            };

            let resolution = encounter.take_turn(choice, companion, inventory, roller)?;
            for event in &resolution.events {
                self.narrate(console, companion, &encounter, event);
            }
        };

        Ok(report)
    }

    fn intro(&self, console: &mut dyn Console, encounter: &Encounter) {
        let enemy = encounter.enemy();
        console.say(&format!("⚔  {} appears!", enemy.name), Tone::Enemy);
        for line in enemy.description.lines() {
            console.say(line.trim(), Tone::Enemy);
        }
    }

    fn show_status(&self, console: &mut dyn Console, encounter: &Encounter, companion: &Companion) {
        let state = encounter.state();
        console.say(&format!("⚔  {}", state.enemy.name), Tone::Enemy);
        console.show_bar("Enemy", state.enemy.hp(), state.enemy.max_hp(), Tone::Enemy);
        console.say("▸ You", Tone::Info);
        console.show_bar("HP", state.player_hp, state.max_player_hp, Tone::Good);
        console.say(
            &format!("{} bond: {}%", companion.name(), companion.bond_percent()),
            Tone::Companion,
        );
        if encounter.mercy_available() {
            console.say("[MERCY AVAILABLE]", Tone::Good);
        }

        let menu: Vec<String> = CombatAction::ALL
            .iter()
            .enumerate()
            .map(|(i, action)| format!("{}. {}", i + 1, action.label()))
            .collect();
        console.show_box("TURN OPTIONS", &menu, Tone::Info);
    }

    /// Read until a valid menu choice. Closed input means flee.
    fn read_action(&self, console: &mut dyn Console) -> CombatAction {
        loop {
            let Some(line) = console.read_line("Choose action (1-5)") else {
                return CombatAction::Flee;
            };
            match CombatAction::parse(&line) {
                Some(action) => return action,
                None => console.say("Invalid choice. Pick 1-5.", Tone::Warn),
            }
        }
    }

    fn strike(
        &self,
        console: &mut dyn Console,
        companion: &Companion,
        roller: &mut dyn Roller,
    ) -> HitClass {
        let strike = &self.config.strike;
        let mut bar = StrikeBar::new(strike, companion.upgrades(), roller);

        let base = bar.base_zone();
        let mut lines = vec![format!(
            "Base zone: positions {}-{}",
            base.start,
            base.end() - 1
        )];
        for (i, zone) in bar.bonus_zones().iter().enumerate() {
            lines.push(format!(
                "Bonus zone #{}: positions {}-{}",
                i + 1,
                zone.start,
                zone.end() - 1
            ));
        }
        console.show_box("HIT THE STRIKE ZONE!", &lines, Tone::Warn);

        bar.run(console, strike)
    }

    /// Pick a consumable. `None` when there is nothing to use or input closed.
    fn choose_item(&self, console: &mut dyn Console, inventory: &Inventory) -> Option<String> {
        let names: Vec<String> = inventory
            .consumables()
            .iter()
            .map(|item| item.name.clone())
            .collect();
        if names.is_empty() {
            return None;
        }

        let lines: Vec<String> = names
            .iter()
            .enumerate()
            .map(|(i, name)| format!("{}. {}", i + 1, name))
            .collect();
        console.show_box("ITEMS", &lines, Tone::Info);

        loop {
            let line = console.read_line("Use which item?")?;
            let line = line.trim();
            if let Ok(n) = line.parse::<usize>() {
                if (1..=names.len()).contains(&n) {
                    return Some(names[n - 1].clone());
                }
            } else if let Some(name) = names.iter().find(|n| n.eq_ignore_ascii_case(line)) {
                return Some(name.clone());
            }
            console.say("Invalid choice!", Tone::Warn);
        }
    }

    fn narrate(
        &self,
        console: &mut dyn Console,
        companion: &Companion,
        encounter: &Encounter,
        event: &CombatEvent,
    ) {
        let aria = companion.name();
        match event {
            CombatEvent::Strike { hit, damage, .. } => match hit {
                HitClass::Bonus => {
                    console.say(&format!("✓ BONUS HIT! Dealt {damage} damage!"), Tone::Good)
                }
                HitClass::Base => {
                    console.say(&format!("✓ STRIKE! Dealt {damage} damage!"), Tone::Good)
                }
                HitClass::Miss => console.say(
                    &format!("✗ MISS! Barely scratched... {damage} damage."),
                    Tone::Bad,
                ),
            },
            CombatEvent::Analyzed { insight, damage, .. } => {
                console.show_box("AI Analysis", &[insight.to_string()], Tone::Companion);
                console.say(
                    &format!("▸ Your focused analysis dealt {damage} damage!"),
                    Tone::Warn,
                );
            }
            CombatEvent::Healed { item, amount, .. } => {
                console.say(&format!("Used {item}. Recovered {amount} HP!"), Tone::Good)
            }
            CombatEvent::ItemUsed { item } => console.say(&format!("Used {item}!"), Tone::Good),
            CombatEvent::NoConsumables => console.say("You have no consumable items!", Tone::Bad),
            CombatEvent::NothingUsed => console.say("You fumble and use nothing.", Tone::Bad),
            CombatEvent::MercyRefused => {
                console.show_face(Mood::Nervous);
                console.companion_says(aria, "It's too strong right now... it won't listen.");
            }
            CombatEvent::MercyRejected => {
                console.say("You reach out with compassion...", Tone::Info);
                console.say("But it doesn't understand mercy.", Tone::Bad);
            }
            CombatEvent::MercyAccepted => {
                console.say("You reach out with compassion...", Tone::Info);
                console.say("The enemy hesitates... and retreats.", Tone::Good);
                console.show_face(Mood::Happy);
                console.companion_says(
                    aria,
                    "You... you showed mercy. That means something to me.",
                );
            }
            CombatEvent::FleeFailed => {
                console.say("You try to escape...", Tone::Info);
                console.say("You can't get away!", Tone::Bad);
            }
            CombatEvent::FleeSucceeded => {
                console.say("You try to escape...", Tone::Info);
                console.say("You manage to escape!", Tone::Good);
            }
            CombatEvent::EnemyAttack {
                attack,
                damage,
                mitigated,
                ..
            } => {
                console.say(&format!("⚡ {} {attack}!", encounter.enemy().name), Tone::Enemy);
                if *mitigated > 0 {
                    let line = format!("I've got your back! (-{mitigated} damage)");
                    console.companion_says(aria, &line);
                }
                console.say(&format!("You took {damage} damage!"), Tone::Bad);
            }
            CombatEvent::BondStrengthened { bond, .. } => console.say(
                &format!("Bond with {aria}: {}%", (bond * 100.0).round() as u32),
                Tone::Companion,
            ),
            CombatEvent::Ended(outcome) => self.conclude(console, companion, encounter, *outcome),
        }
    }

    fn conclude(
        &self,
        console: &mut dyn Console,
        companion: &Companion,
        encounter: &Encounter,
        outcome: EncounterOutcome,
    ) {
        let aria = companion.name();
        let state = encounter.state();
        match outcome {
            EncounterOutcome::Victory => {
                console.show_box(
                    "VICTORY!",
                    &[
                        format!("You defeated the {}!", state.enemy.name),
                        format!("Accuracy: {}% | Turns: {}", state.accuracy(), state.turn_count),
                    ],
                    Tone::Good,
                );
                console.show_face(Mood::Happy);
                console.companion_says(aria, "We did it! That was amazing!");
            }
            EncounterOutcome::Spared => console.show_box(
                "SPARED",
                &[format!("The {} fades away, unharmed.", state.enemy.name)],
                Tone::Good,
            ),
            EncounterOutcome::Defeat => {
                console.show_box(
                    "DEFEATED!",
                    &[
                        "The darkness claims you...".to_string(),
                        "But then, a voice...".to_string(),
                    ],
                    Tone::Bad,
                );
                console.show_face(Mood::Nervous);
                console.companion_says(aria, "No, no no NO! Please... I can't lose you!");
                console.say("You wake up, battered but alive.", Tone::Info);
                console.say(&format!("{aria} looks genuinely worried."), Tone::Companion);
            }
            EncounterOutcome::Fled => {
                console.say("You slip away from the fight.", Tone::Info);
            }
            EncounterOutcome::Stalemate => {
                console.say("The battle drags on indefinitely...", Tone::Warn);
                console.say("You both pause, at an impasse.", Tone::Warn);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::Item;
    use crate::testing::{ScriptedConsole, ScriptedRoller};

    #[test]
    fn test_unknown_enemy_leaves_companion_alone() {
        let catalog = EnemyCatalog::standard();
        let config = GameConfig::default();
        let system = CombatSystem::new(&catalog, &config);
        let mut console = ScriptedConsole::new();
        let mut aria = Companion::default();
        let mut inv = Inventory::new();

        let mut roller = ScriptedRoller::new();
        let err = system
            .start_encounter("nonexistent", &mut console, &mut aria, &mut inv, &mut roller)
            .unwrap_err();
        assert_eq!(err, EncounterError::UnknownEnemy("nonexistent".to_string()));
        assert_eq!(aria.bond(), 0.0);
        assert!(console.transcript().is_empty());
    }

    #[test]
    fn test_invalid_input_is_reprompted() {
        let catalog = EnemyCatalog::standard();
        let config = GameConfig::default();
        let system = CombatSystem::new(&catalog, &config);
        let mut console = ScriptedConsole::new()
            .with_lines(["9", "dance", "1", "1"])
            .with_strikes([Some(3), Some(3)]);
        let mut aria = Companion::default();
        aria.install_upgrade("Power Surge");
        let mut inv = Inventory::new();

        let mut roller = ScriptedRoller::new();
        let report = system
            .start_encounter("fragment", &mut console, &mut aria, &mut inv, &mut roller)
            .unwrap();
        assert_eq!(report.outcome, EncounterOutcome::Victory);
        assert_eq!(report.turns, 2);
        assert_eq!(console.count_containing("Invalid choice"), 2);
        assert_eq!(console.count_containing("BONUS HIT"), 2);
    }

    #[test]
    fn test_closed_input_flees() {
        let catalog = EnemyCatalog::standard();
        let config = GameConfig::default();
        let system = CombatSystem::new(&catalog, &config);
        let mut console = ScriptedConsole::new();
        let mut aria = Companion::default();
        let mut inv = Inventory::new();
        inv.add(Item::consumable("Health Potion"));
        let mut roller = ScriptedRoller::new().with_chances([0.0]);

        let report = system
            .start_encounter("glitch", &mut console, &mut aria, &mut inv, &mut roller)
            .unwrap();
        assert_eq!(report.outcome, EncounterOutcome::Fled);
        assert!(!report.won());
        assert_eq!(inv.len(), 1);
    }

    #[test]
    fn test_analyze_shows_thinking_face_only() {
        let catalog = EnemyCatalog::standard();
        let config = GameConfig::default();
        let system = CombatSystem::new(&catalog, &config);
        let mut console = ScriptedConsole::new().with_lines(["analyze", "flee"]);
        let mut aria = Companion::default();
        aria.set_mood(Mood::Neutral);
        let mut roller = ScriptedRoller::new().with_chances([0.0]);

        let report = system
            .start_encounter("glitch", &mut console, &mut aria, &mut Inventory::new(), &mut roller)
            .unwrap();
        assert_eq!(report.outcome, EncounterOutcome::Fled);
        assert!(console.contains("[face:thinking]"));
        assert_eq!(aria.mood(), Mood::Neutral);
    }

    #[test]
    fn test_item_menu_uses_selected_potion() {
        let catalog = EnemyCatalog::standard();
        let config = GameConfig::default();
        let system = CombatSystem::new(&catalog, &config);
        let mut console = ScriptedConsole::new().with_lines(["item", "7", "1"]);
        let mut aria = Companion::default();
        let mut inv = Inventory::new();
        inv.add(Item::consumable("Health Potion"));
        let mut roller = ScriptedRoller::new().with_chances([0.99, 0.0]);

        system
            .start_encounter("glitch", &mut console, &mut aria, &mut inv, &mut roller)
            .unwrap();
        assert!(inv.consumables().is_empty());
        assert_eq!(console.count_containing("Recovered 0 HP"), 1);
        assert_eq!(console.count_containing("Invalid choice!"), 1);
    }
}
