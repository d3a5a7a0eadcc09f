//! TERMINAL.EXIT game engine.
//!
//! This crate provides:
//! - A turn-based combat system with a real-time strike-zone minigame
//! - An AI companion whose bond shapes combat
//! - A small room graph to explore, with encounters and loot
//! - A [`Console`] trait so any front end can drive the game
//!
//! # Quick Start
//!
//! ```ignore
//! use terminal_exit_core::{GameConfig, GameSession};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GameConfig::default().with_seed(42);
//!     let mut session = GameSession::new(config)?;
//!
//!     let mut console = MyConsole::new();
//!     session.run(&mut console);
//!     Ok(())
//! }
//! ```

pub mod combat;
pub mod companion;
pub mod config;
pub mod console;
pub mod dice;
pub mod encounter;
pub mod enemies;
pub mod inventory;
pub mod session;
pub mod strike;
pub mod testing;
pub mod upgrades;
pub mod world;

// Primary public API
pub use combat::{
    CombatAction, CombatConfig, CombatEvent, Encounter, EncounterError, EncounterOutcome,
    EncounterReport, TurnChoice,
};
pub use companion::{Companion, Mood};
pub use config::{ConfigError, GameConfig};
pub use console::{Console, Tone};
pub use dice::{DiceExpression, Roller, RngRoller};
pub use encounter::CombatSystem;
pub use enemies::{CatalogError, EnemyCatalog, EnemyInstance, EnemyTemplate};
pub use inventory::{Inventory, Item, ItemType};
pub use session::{CommandResult, GameSession, SessionError};
pub use strike::{HitClass, StrikeBar, StrikeConfig, StrikeZone, ZoneKind};
pub use testing::{ScriptedConsole, ScriptedRoller, TestHarness};
pub use world::{Direction, MoveError, Room, World, WorldError};
