//! GameSession - the exploration loop around combat.
//!
//! The session owns the world, the companion, the inventory and the random
//! source. It moves the player between rooms, picks up loot, installs
//! upgrades, and hands uncleared encounters to the [`CombatSystem`].

use crate::combat::{EncounterError, EncounterReport};
use crate::companion::{Companion, Mood, UPGRADE_BOND};
use crate::config::{ConfigError, GameConfig};
use crate::console::{Console, Tone};
use crate::dice::{RngRoller, Roller};
use crate::encounter::CombatSystem;
use crate::enemies::EnemyCatalog;
use crate::inventory::Inventory;
use crate::world::{Direction, World, WorldError};
use log::{debug, info, warn};
use thiserror::Error;

/// Errors from setting up a session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("World error: {0}")]
    World(#[from] WorldError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// What the caller should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandResult {
    Continue,
    Quit,
}

/// A running game.
pub struct GameSession {
    world: World,
    companion: Companion,
    inventory: Inventory,
    catalog: EnemyCatalog,
    roller: Box<dyn Roller>,
    config: GameConfig,
    history: Vec<EncounterReport>,
}

impl GameSession {
    /// Start a game on the standard map with the standard enemies.
    pub fn new(config: GameConfig) -> Result<Self, SessionError> {
        config.validate()?;
        let roller: Box<dyn Roller> = match config.seed {
            Some(seed) => {
                info!("Seeding RNG with {seed}");
                Box::new(RngRoller::seeded(seed))
            }
            None => Box::new(RngRoller::from_entropy()),
        };
        Ok(Self::with_parts(
            config,
            World::standard()?,
            EnemyCatalog::standard(),
            roller,
        ))
    }

    /// Assemble a session from explicit parts.
    pub fn with_parts(
        config: GameConfig,
        world: World,
        catalog: EnemyCatalog,
        roller: Box<dyn Roller>,
    ) -> Self {
        Self {
            world,
            companion: Companion::new(config.companion_name.clone()),
            inventory: Inventory::new(),
            catalog,
            roller,
            config,
            history: Vec::new(),
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn companion(&self) -> &Companion {
        &self.companion
    }

    pub fn companion_mut(&mut self) -> &mut Companion {
        &mut self.companion
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn inventory_mut(&mut self) -> &mut Inventory {
        &mut self.inventory
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Reports of every finished encounter, oldest first.
    pub fn history(&self) -> &[EncounterReport] {
        &self.history
    }

    // ========================================================================
    // Encounters
    // ========================================================================

    /// Fight whatever is waiting in the current room.
    ///
    /// Returns `Ok(None)` when the room is quiet. The encounter is marked
    /// cleared whatever happens, including an unknown enemy key.
    pub fn resolve_pending_encounter(
        &mut self,
        console: &mut dyn Console,
    ) -> Result<Option<EncounterReport>, EncounterError> {
        let Some(key) = self.world.pending_encounter().map(str::to_string) else {
            return Ok(None);
        };

        console.show_face(Mood::Nervous);
        console.companion_says(self.companion.name(), "Wait... I sense something in this area!");

        let system = CombatSystem::new(&self.catalog, &self.config);
        let result = system.start_encounter(
            &key,
            console,
            &mut self.companion,
            &mut self.inventory,
            self.roller.as_mut(),
        );
        self.world.mark_encounter_cleared();

        let report = result?;
        if report.won() {
            self.companion.set_mood(Mood::Happy);
            console.say("You take a moment to catch your breath.", Tone::Info);
        } else {
            console.say("You need to regroup...", Tone::Warn);
        }
        self.history.push(report.clone());
        Ok(Some(report))
    }

    // ========================================================================
    // Exploration
    // ========================================================================

    /// Show the current room, the map and the action menu.
    pub fn describe_location(&self, console: &mut dyn Console) {
        let room = self.world.current();
        console.show_box(
            &room.name,
            &[room.description.clone(), format!("Exits: {}", room.exits())],
            Tone::Info,
        );
        console.show_box("MAP", &self.world.minimap(), Tone::Info);

        let mut actions: Vec<String> = room
            .options
            .iter()
            .enumerate()
            .map(|(i, option)| format!("{}. {}", i + 1, option))
            .collect();
        let n = room.options.len();
        actions.push(format!("{}. Check {} Status", n + 1, self.companion.name()));
        actions.push(format!("{}. Inventory", n + 2));
        actions.push(format!("{}. Quit", n + 3));
        console.show_box("EXPLORATION ACTIONS", &actions, Tone::Info);
        console.say("MOVEMENT: north/south/east/west (or up/down/left/right)", Tone::Info);
    }

    /// Handle one line typed at the exploration prompt.
    pub fn handle_command(&mut self, line: &str, console: &mut dyn Console) -> CommandResult {
        let input = line.trim().to_lowercase();
        debug!("Command: {input:?}");

        if let Some(direction) = Direction::parse(&input) {
            self.travel(direction, console);
            return CommandResult::Continue;
        }

        match input.as_str() {
            "status" | "companion" => {
                self.companion_status(console);
                return CommandResult::Continue;
            }
            "inventory" | "inv" | "i" => {
                self.show_inventory(console);
                return CommandResult::Continue;
            }
            "map" => {
                console.show_box("MAP", &self.world.minimap(), Tone::Info);
                return CommandResult::Continue;
            }
            "quit" | "exit" | "q" => return CommandResult::Quit,
            _ => {}
        }

        let options = self.world.current().options.clone();
        let n = options.len();
        match input.parse::<usize>() {
            Ok(i) if (1..=n).contains(&i) => self.examine(&options[i - 1], console),
            Ok(i) if i == n + 1 => self.companion_status(console),
            Ok(i) if i == n + 2 => self.show_inventory(console),
            Ok(i) if i == n + 3 => return CommandResult::Quit,
            Ok(_) => console.say("Invalid choice. Try again.", Tone::Warn),
            Err(_) => {
                self.companion.set_mood(Mood::Neutral);
                console.show_face(Mood::Neutral);
                console.companion_says(
                    self.companion.name(),
                    "I didn't understand that. Use up/down/left/right to move, or enter a number.",
                );
            }
        }
        CommandResult::Continue
    }

    /// Play until the player quits or input closes.
    pub fn run(&mut self, console: &mut dyn Console) {
        info!("Session started in {}", self.world.current().name);
        self.collect_loot(console);

        loop {
            match self.resolve_pending_encounter(console) {
                Ok(Some(_)) => continue,
                Ok(None) => {}
                Err(err) => {
                    warn!("Skipping encounter: {err}");
                    console.say(&format!("The area flickers and goes still. ({err})"), Tone::Warn);
                    continue;
                }
            }

            self.describe_location(console);
            let Some(line) = console.read_line(">") else {
                break;
            };
            if self.handle_command(&line, console) == CommandResult::Quit {
                break;
            }
        }

        console.companion_says(self.companion.name(), "Until next time...");
        info!("Session ended after {} encounter(s)", self.history.len());
    }

    /// Move the player and pick up any loot in the new room.
    fn travel(&mut self, direction: Direction, console: &mut dyn Console) {
        match self.world.move_to(direction) {
            Ok(room) => {
                let text = format!("You head {direction} into {}.", room.name);
                console.say(&text, Tone::Info);
                self.collect_loot(console);
            }
            Err(err) => console.say(&err.to_string(), Tone::Warn),
        }
    }

    fn collect_loot(&mut self, console: &mut dyn Console) {
        for item in self.world.take_loot() {
            console.say(&format!("Picked up: {}", item.name), Tone::Good);
            self.inventory.add(item);
        }
    }

    fn examine(&mut self, option: &str, console: &mut dyn Console) {
        self.companion.set_mood(Mood::Thinking);
        console.say(&format!("You examine {option}... It's interesting."), Tone::Info);
        console.show_face(Mood::Thinking);
        console.companion_says(self.companion.name(), "I'm analyzing this...");
    }

    fn show_inventory(&self, console: &mut dyn Console) {
        console.show_box("INVENTORY", &self.inventory.listing(), Tone::Info);
    }

    /// Companion panel with the upgrade installer.
    fn companion_status(&mut self, console: &mut dyn Console) {
        loop {
            console.show_face(self.companion.mood());
            console.show_box(self.companion.name(), &self.companion.describe(), Tone::Companion);

            let upgrades: Vec<(String, String)> = self
                .inventory
                .upgrades()
                .iter()
                .map(|item| (item.name.clone(), item.description.clone()))
                .collect();
            if upgrades.is_empty() {
                console.say("No upgrades available yet. Defeat enemies!", Tone::Info);
                return;
            }

            let mut lines: Vec<String> = upgrades
                .iter()
                .enumerate()
                .map(|(i, (name, description))| format!("{}. {name} - {description}", i + 1))
                .collect();
            lines.push("0. Return to Game".to_string());
            console.show_box("AVAILABLE UPGRADES", &lines, Tone::Info);

            let Some(choice) = console.read_line("Install which upgrade?") else {
                return;
            };
            match choice.trim().parse::<usize>() {
                Ok(0) => return,
                Ok(i) if (1..=upgrades.len()).contains(&i) => {
                    let name = &upgrades[i - 1].0;
                    if self.install_upgrade(name) {
                        self.narrate_install(name, console);
                    }
                }
                _ => continue,
            }
        }
    }

    /// Move an upgrade from the inventory into the companion.
    ///
    /// Returns false if no such upgrade is being carried.
    pub fn install_upgrade(&mut self, name: &str) -> bool {
        let carried = self
            .inventory
            .upgrades()
            .iter()
            .any(|item| item.name.eq_ignore_ascii_case(name));
        if !carried {
            return false;
        }
        let Some(item) = self.inventory.remove(name) else {
            return false;
        };

        info!("Installing upgrade {}", item.name);
        self.companion.install_upgrade(item.name);
        self.companion.strengthen_bond(UPGRADE_BOND);
        self.companion.set_mood(Mood::Happy);
        true
    }

    fn narrate_install(&mut self, name: &str, console: &mut dyn Console) {
        let lines = [
            format!("I can feel the {name} integrating!"),
            "This is amazing! Thank you for this upgrade!".to_string(),
            format!("I feel stronger with the {name}!"),
            "This will help us on our journey!".to_string(),
        ];
        let line = &lines[self.roller.choose_index(lines.len())];
        console.say(&format!("Installing: {name}"), Tone::Good);
        console.show_face(Mood::Happy);
        console.companion_says(self.companion.name(), line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::Item;
    use crate::testing::{ScriptedConsole, ScriptedRoller};

    fn session() -> GameSession {
        GameSession::with_parts(
            GameConfig::default(),
            World::standard().unwrap(),
            EnemyCatalog::standard(),
            Box::new(ScriptedRoller::new()),
        )
    }

    #[test]
    fn test_new_with_seed() {
        let session = GameSession::new(GameConfig::default().with_seed(1)).unwrap();
        assert_eq!(session.world().current().name, "Awakening Point");
        assert_eq!(session.companion().name(), "Aria");
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = GameConfig::default();
        config.combat.max_turns = 0;
        assert!(matches!(
            GameSession::new(config),
            Err(SessionError::Config(_))
        ));
    }

    #[test]
    fn test_movement_picks_up_loot() {
        let mut session = session();
        let mut console = ScriptedConsole::new();
        assert_eq!(session.handle_command("up", &mut console), CommandResult::Continue);
        assert_eq!(session.world().current().name, "Void Corridor");
        assert!(session.inventory().has_item("Basic Scanner"));
        assert!(console.contains("Picked up: Basic Scanner"));
    }

    #[test]
    fn test_blocked_move() {
        let mut session = session();
        let mut console = ScriptedConsole::new();
        session.handle_command("west", &mut console);
        assert_eq!(session.world().current().name, "Awakening Point");
        assert!(console.contains("You cannot go west."));
    }

    #[test]
    fn test_gibberish_makes_companion_neutral() {
        let mut session = session();
        let mut console = ScriptedConsole::new();
        session.handle_command("dance", &mut console);
        assert_eq!(session.companion().mood(), Mood::Neutral);
        assert!(console.contains("I didn't understand that"));
    }

    #[test]
    fn test_quit_by_number() {
        let mut session = session();
        let mut console = ScriptedConsole::new();
        // one examine option, then status, inventory, quit
        assert_eq!(session.handle_command("4", &mut console), CommandResult::Quit);
        assert_eq!(session.handle_command("1", &mut console), CommandResult::Continue);
        assert_eq!(session.companion().mood(), Mood::Thinking);
    }

    #[test]
    fn test_install_upgrade() {
        let mut session = session();
        session.inventory_mut().add(Item::from_name("Power Surge"));
        assert!(!session.install_upgrade("Health Potion"));
        assert!(session.install_upgrade("power surge"));
        assert!(session.companion().has_upgrade("Power Surge"));
        assert!(session.inventory().upgrades().is_empty());
        assert!((session.companion().bond() - UPGRADE_BOND).abs() < 1e-9);
    }

    #[test]
    fn test_status_menu_installs_upgrade() {
        let mut session = session();
        session.inventory_mut().add(Item::from_name("Precision Targeting"));
        let mut console = ScriptedConsole::new().with_lines(["1"]);
        session.handle_command("status", &mut console);
        assert!(session.companion().has_upgrade("Precision Targeting"));
        assert!(console.contains("Installing: Precision Targeting"));
        assert!(console.contains("No upgrades available yet"));
    }

    #[test]
    fn test_quiet_room_has_no_encounter() {
        let mut session = session();
        let mut console = ScriptedConsole::new();
        assert_eq!(session.resolve_pending_encounter(&mut console), Ok(None));
    }
}
