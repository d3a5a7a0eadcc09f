//! Player inventory.

use crate::upgrades;
use serde::{Deserialize, Serialize};

/// What kind of thing an item is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Gear,
    Upgrade,
    KeyItem,
    Consumable,
}

/// Inventory item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub description: String,
    pub item_type: ItemType,
    /// Key items survive ordinary use.
    pub key: bool,
}

impl Item {
    pub fn new(name: impl Into<String>, item_type: ItemType) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            item_type,
            key: item_type == ItemType::KeyItem,
        }
    }

    pub fn consumable(name: impl Into<String>) -> Self {
        Self::new(name, ItemType::Consumable)
    }

    pub fn upgrade(name: impl Into<String>) -> Self {
        Self::new(name, ItemType::Upgrade)
    }

    pub fn gear(name: impl Into<String>) -> Self {
        Self::new(name, ItemType::Gear)
    }

    pub fn key_item(name: impl Into<String>) -> Self {
        Self::new(name, ItemType::KeyItem)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Infer an item's type from its name: potions are consumable, known
    /// upgrade names are upgrades, everything else is gear.
    pub fn from_name(name: impl Into<String>) -> Self {
        let name = name.into();
        if name.contains("Potion") {
            Self::consumable(name)
        } else if let Some(upgrade) = upgrades::find_by_name(&name) {
            Self::upgrade(upgrade.name).with_description(upgrade.description)
        } else {
            Self::gear(name)
        }
    }

    pub fn is_potion(&self) -> bool {
        self.name.contains("Potion")
    }
}

/// Ordered list of carried items.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inventory {
    items: Vec<Item>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, item: Item) {
        self.items.push(item);
    }

    /// Add an item, inferring its type from the name.
    pub fn add_named(&mut self, name: impl Into<String>) {
        self.add(Item::from_name(name));
    }

    /// Remove the first item with this name. Key items are never removed.
    /// Returns the removed item.
    pub fn remove(&mut self, name: &str) -> Option<Item> {
        let idx = self
            .items
            .iter()
            .position(|i| i.name.eq_ignore_ascii_case(name) && !i.key)?;
        Some(self.items.remove(idx))
    }

    /// Consumables that ordinary use may spend.
    pub fn consumables(&self) -> Vec<&Item> {
        self.items
            .iter()
            .filter(|i| i.item_type == ItemType::Consumable && !i.key)
            .collect()
    }

    pub fn upgrades(&self) -> Vec<&Item> {
        self.items
            .iter()
            .filter(|i| i.item_type == ItemType::Upgrade)
            .collect()
    }

    pub fn find(&self, name: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.name.eq_ignore_ascii_case(name))
    }

    pub fn has_item(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// One display line per item.
    pub fn listing(&self) -> Vec<String> {
        if self.items.is_empty() {
            return vec!["(empty)".to_string()];
        }
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                if item.description.is_empty() {
                    format!("{}. {}", i + 1, item.name)
                } else {
                    format!("{}. {} - {}", i + 1, item.name, item.description)
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_inference() {
        let mut inv = Inventory::new();
        inv.add_named("Health Potion");
        inv.add_named("Health Potion");
        inv.add_named("Test Gear");
        inv.add_named("Power Surge");

        assert_eq!(inv.len(), 4);
        assert_eq!(inv.consumables().len(), 2);
        assert_eq!(inv.upgrades().len(), 1);
        assert_eq!(inv.find("test gear").unwrap().item_type, ItemType::Gear);
    }

    #[test]
    fn test_remove_takes_one() {
        let mut inv = Inventory::new();
        inv.add(Item::consumable("Health Potion"));
        inv.add(Item::consumable("Health Potion"));

        assert!(inv.remove("health potion").is_some());
        assert_eq!(inv.consumables().len(), 1);
        assert!(inv.remove("Elixir").is_none());
    }

    #[test]
    fn test_key_items_survive_removal() {
        let mut inv = Inventory::new();
        inv.add(Item::key_item("Fragment of Corrupted Code"));
        assert!(inv.remove("Fragment of Corrupted Code").is_none());
        assert!(inv.has_item("Fragment of Corrupted Code"));
    }

    #[test]
    fn test_key_consumables_are_not_offered() {
        let mut inv = Inventory::new();
        let mut relic = Item::consumable("Eternal Potion");
        relic.key = true;
        inv.add(relic);
        assert!(inv.consumables().is_empty());
    }

    #[test]
    fn test_listing() {
        let mut inv = Inventory::new();
        assert_eq!(inv.listing(), vec!["(empty)"]);
        inv.add(Item::gear("Lantern").with_description("Flickers"));
        assert_eq!(inv.listing(), vec!["1. Lantern - Flickers"]);
    }
}
