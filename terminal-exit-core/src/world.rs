//! The world graph: rooms on a grid, linked by compass directions.
//!
//! Every link is two-way and joins grid neighbours. North is toward smaller
//! `y`, so it renders above on the minimap.

use crate::inventory::Item;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Errors from moving around.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoveError {
    #[error("'{0}' is not a direction")]
    UnknownDirection(String),

    #[error("You cannot go {0}.")]
    NoExit(Direction),

    #[error("Unknown room: {0}")]
    UnknownRoom(String),
}

/// Structural problems in a world definition.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorldError {
    #[error("Duplicate room: {0}")]
    DuplicateRoom(String),

    #[error("Unknown room: {0}")]
    UnknownRoom(String),

    #[error("{room} links {direction} to missing room '{target}'")]
    DanglingLink {
        room: String,
        direction: Direction,
        target: String,
    },

    #[error("{room} links {direction} to '{target}', which does not link back")]
    OneWayLink {
        room: String,
        direction: Direction,
        target: String,
    },

    #[error("{room} links {direction} to '{target}', which is not adjacent on the grid")]
    NotAdjacent {
        room: String,
        direction: Direction,
        target: String,
    },
}

/// Compass direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// Parse a direction word. Accepts compass names, their initials, and
    /// `up`/`down`/`right`/`left`.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "north" | "n" | "up" => Some(Direction::North),
            "south" | "s" | "down" => Some(Direction::South),
            "east" | "e" | "right" => Some(Direction::East),
            "west" | "w" | "left" => Some(Direction::West),
            _ => None,
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    /// Grid offset of one step in this direction.
    pub fn offset(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A fight waiting in a room. Cleared once, whatever the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterTag {
    pub enemy: String,
    pub cleared: bool,
}

/// A location in the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub name: String,
    pub description: String,
    pub coord: (i32, i32),
    pub neighbours: BTreeMap<Direction, String>,
    /// Examine actions offered in this room.
    pub options: Vec<String>,
    pub visited: bool,
    pub encounter: Option<EncounterTag>,
    /// Picked up on first entry.
    pub loot: Vec<Item>,
}

impl Room {
    pub fn new(name: impl Into<String>, description: impl Into<String>, coord: (i32, i32)) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            coord,
            neighbours: BTreeMap::new(),
            options: Vec::new(),
            visited: false,
            encounter: None,
            loot: Vec::new(),
        }
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_encounter(mut self, enemy: impl Into<String>) -> Self {
        self.encounter = Some(EncounterTag {
            enemy: enemy.into(),
            cleared: false,
        });
        self
    }

    pub fn with_loot(mut self, item: Item) -> Self {
        self.loot.push(item);
        self
    }

    /// Enemy key of an encounter that has not been cleared yet.
    pub fn pending_encounter(&self) -> Option<&str> {
        self.encounter
            .as_ref()
            .filter(|tag| !tag.cleared)
            .map(|tag| tag.enemy.as_str())
    }

    /// Exits as "north, east" for display.
    pub fn exits(&self) -> String {
        let names: Vec<&str> = self.neighbours.keys().map(Direction::name).collect();
        if names.is_empty() {
            "none".to_string()
        } else {
            names.join(", ")
        }
    }
}

/// The room graph and the player's position in it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    rooms: BTreeMap<String, Room>,
    current: String,
}

impl World {
    /// Build a world from rooms and a starting room, then validate it.
    pub fn from_rooms(
        rooms: impl IntoIterator<Item = Room>,
        start: &str,
    ) -> Result<Self, WorldError> {
        let mut map = BTreeMap::new();
        for room in rooms {
            if map.contains_key(&room.name) {
                return Err(WorldError::DuplicateRoom(room.name));
            }
            map.insert(room.name.clone(), room);
        }
        let Some(start_room) = map.get_mut(start) else {
            return Err(WorldError::UnknownRoom(start.to_string()));
        };
        start_room.visited = true;

        let world = Self {
            rooms: map,
            current: start.to_string(),
        };
        world.validate()?;
        Ok(world)
    }

    /// Link two rooms both ways. `from` gets `direction`, `to` the opposite.
    pub fn link(rooms: &mut [Room], from: &str, direction: Direction, to: &str) {
        for room in rooms.iter_mut() {
            if room.name == from {
                room.neighbours.insert(direction, to.to_string());
            } else if room.name == to {
                room.neighbours.insert(direction.opposite(), from.to_string());
            }
        }
    }

    /// Check that every link targets an existing, adjacent room that links back.
    pub fn validate(&self) -> Result<(), WorldError> {
        for room in self.rooms.values() {
            for (&direction, target) in &room.neighbours {
                let link = || (room.name.clone(), direction, target.clone());
                let Some(other) = self.rooms.get(target) else {
                    let (room, direction, target) = link();
                    return Err(WorldError::DanglingLink {
                        room,
                        direction,
                        target,
                    });
                };
                if other.neighbours.get(&direction.opposite()) != Some(&room.name) {
                    let (room, direction, target) = link();
                    return Err(WorldError::OneWayLink {
                        room,
                        direction,
                        target,
                    });
                }
                let (dx, dy) = direction.offset();
                if other.coord != (room.coord.0 + dx, room.coord.1 + dy) {
                    let (room, direction, target) = link();
                    return Err(WorldError::NotAdjacent {
                        room,
                        direction,
                        target,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn current(&self) -> &Room {
        // only ever set to a key of `rooms`
        &self.rooms[&self.current]
    }

    pub fn room(&self, name: &str) -> Option<&Room> {
        self.rooms.get(name)
    }

    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Step one room in a direction.
    pub fn move_to(&mut self, direction: Direction) -> Result<&Room, MoveError> {
        let target = self
            .current()
            .neighbours
            .get(&direction)
            .cloned()
            .ok_or(MoveError::NoExit(direction))?;
        let room = self
            .rooms
            .get_mut(&target)
            .ok_or_else(|| MoveError::UnknownRoom(target.clone()))?;
        room.visited = true;
        info!("Moved {direction} to {target}");
        self.current = target;
        Ok(self.current())
    }

    /// Parse a direction word and move.
    pub fn go(&mut self, input: &str) -> Result<&Room, MoveError> {
        let direction =
            Direction::parse(input).ok_or_else(|| MoveError::UnknownDirection(input.to_string()))?;
        self.move_to(direction)
    }

    /// Enemy key waiting in the current room, if not yet cleared.
    pub fn pending_encounter(&self) -> Option<&str> {
        self.current().pending_encounter()
    }

    /// Mark the current room's encounter cleared. Returns false if there was
    /// nothing left to clear.
    pub fn mark_encounter_cleared(&mut self) -> bool {
        let tag = self
            .rooms
            .get_mut(&self.current)
            .and_then(|room| room.encounter.as_mut());
        match tag {
            Some(tag) if !tag.cleared => {
                tag.cleared = true;
                true
            }
            _ => false,
        }
    }

    /// Take whatever loot is lying in the current room.
    pub fn take_loot(&mut self) -> Vec<Item> {
        self.rooms
            .get_mut(&self.current)
            .map(|room| std::mem::take(&mut room.loot))
            .unwrap_or_default()
    }

    /// Grid of the known map: `P` current, `.` visited, `?` unvisited.
    pub fn minimap(&self) -> Vec<String> {
        let coords: Vec<(i32, i32)> = self.rooms.values().map(|r| r.coord).collect();
        let (Some(min_x), Some(max_x)) = (
            coords.iter().map(|c| c.0).min(),
            coords.iter().map(|c| c.0).max(),
        ) else {
            return Vec::new();
        };
        let min_y = coords.iter().map(|c| c.1).min().unwrap_or(0);
        let max_y = coords.iter().map(|c| c.1).max().unwrap_or(0);

        (min_y..=max_y)
            .map(|y| {
                (min_x..=max_x)
                    .map(|x| match self.rooms.values().find(|r| r.coord == (x, y)) {
                        Some(room) if room.name == self.current => " P ",
                        Some(room) if room.visited => " . ",
                        Some(_) => " ? ",
                        None => "   ",
                    })
                    .collect()
            })
            .collect()
    }

    /// The standard six-room map.
    pub fn standard() -> Result<Self, WorldError> {
        let mut rooms = vec![
            Room::new(
                "Awakening Point",
                "A dim corridor with flickering symbols.",
                (0, 2),
            )
            .with_options(["Examine Wall"])
            .with_loot(Item::consumable("Health Potion").with_description("Restores 30 HP")),
            Room::new(
                "Void Corridor",
                "A longer hallway; the lights glitch in waves.",
                (0, 1),
            )
            .with_options(["Examine Console"])
            .with_encounter("fragment")
            .with_loot(Item::from_name("Basic Scanner")),
            Room::new(
                "Junction",
                "A junction with several paths. A humming sound comes from the East.",
                (1, 1),
            )
            .with_options(["Examine Signpost"])
            .with_encounter("glitch")
            .with_loot(Item::from_name("Power Surge")),
            Room::new(
                "Data Archive",
                "Shelves of crystallised records stretch into the dark.",
                (1, 0),
            )
            .with_options(["Examine Records", "Examine Terminal"])
            .with_encounter("phantom")
            .with_loot(Item::from_name("Precision Targeting")),
            Room::new(
                "Signal Tower",
                "A spire of antennae pulses with a steady carrier tone.",
                (2, 1),
            )
            .with_options(["Examine Antenna"])
            .with_loot(Item::consumable("Health Potion").with_description("Restores 30 HP")),
            Room::new(
                "Core Gateway",
                "A vast door of light. Beyond it, something like an exit.",
                (2, 0),
            )
            .with_options(["Examine Gateway"])
            .with_encounter("echo")
            .with_loot(Item::key_item("Root Access Key").with_description("Opens the way out")),
        ];

        let links = [
            ("Awakening Point", Direction::North, "Void Corridor"),
            ("Void Corridor", Direction::East, "Junction"),
            ("Junction", Direction::North, "Data Archive"),
            ("Junction", Direction::East, "Signal Tower"),
            ("Signal Tower", Direction::North, "Core Gateway"),
            ("Data Archive", Direction::East, "Core Gateway"),
        ];
        for (from, direction, to) in links {
            Self::link(&mut rooms, from, direction, to);
        }

        Self::from_rooms(rooms, "Awakening Point")
    }
}
