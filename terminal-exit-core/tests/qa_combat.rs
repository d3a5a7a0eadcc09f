//! QA tests for the combat system, driven through the public API.
//!
//! Every random decision goes through a `ScriptedRoller`, so these run
//! deterministically. Unscripted rolls come out at their minimum and
//! unscripted probability checks fail.

use terminal_exit_core::combat::{CombatEvent, TurnChoice};
use terminal_exit_core::testing::assert_outcome;
use terminal_exit_core::{
    CombatConfig, CombatSystem, Companion, DiceExpression, Encounter, EncounterError,
    EncounterOutcome, EnemyCatalog, EnemyTemplate, GameConfig, HitClass, Inventory, Item, Mood,
    ScriptedConsole, ScriptedRoller,
};

fn sandbag_catalog() -> EnemyCatalog {
    EnemyCatalog::standard()
        .extended_with([EnemyTemplate::new("firewall", "Firewall", 500)
            .with_attacks(["blocks your path", "scans your packets"])])
        .unwrap()
}

// =============================================================================
// TEST 1: Bonus strikes finish a weak enemy on the second hit
// =============================================================================

#[test]
fn test_power_surge_bonus_strikes() {
    let catalog = EnemyCatalog::standard();
    let config = GameConfig::default();
    let system = CombatSystem::new(&catalog, &config);

    let mut aria = Companion::default();
    aria.install_upgrade("Power Surge");
    let mut inventory = Inventory::new();
    let mut roller = ScriptedRoller::new();
    // Power Surge opens [2, 7); position 3 is a bonus hit worth 17
    let mut console = ScriptedConsole::new()
        .with_lines(["1", "1", "1"])
        .with_strikes([Some(3), Some(3), Some(3)]);

    let report = system
        .start_encounter("fragment", &mut console, &mut aria, &mut inventory, &mut roller)
        .unwrap();

    assert_outcome(&report, EncounterOutcome::Victory);
    assert_eq!(report.turns, 2);
    assert_eq!(report.strikes_landed, 2);
    assert_eq!(report.accuracy, 100);
    assert_eq!(report.player_hp, 95);
    assert_eq!(console.count_containing("BONUS HIT! Dealt 17 damage"), 2);
    assert!(console.contains("Accuracy: 100% | Turns: 2"));
    assert!((aria.bond() - 0.10).abs() < 1e-9);
    assert_eq!(aria.mood(), Mood::Happy);
}

// =============================================================================
// TEST 2: Item with nothing to use
// =============================================================================

#[test]
fn test_item_with_no_consumables() {
    let catalog = EnemyCatalog::standard();
    let mut encounter = Encounter::begin(&catalog, "glitch", &GameConfig::default()).unwrap();
    let mut aria = Companion::default();
    let mut inventory = Inventory::new();
    inventory.add(Item::gear("Flashlight"));
    let mut roller = ScriptedRoller::new();

    let res = encounter
        .take_turn(TurnChoice::UseItem(None), &mut aria, &mut inventory, &mut roller)
        .unwrap();

    assert_eq!(res.events[0], CombatEvent::NoConsumables);
    assert!(matches!(
        res.events[1],
        CombatEvent::EnemyAttack { damage: 5, player_hp: 95, .. }
    ));
    assert_eq!(inventory.len(), 1);
}

// =============================================================================
// TEST 3: Unknown enemy key
// =============================================================================

#[test]
fn test_unknown_enemy_key() {
    let catalog = EnemyCatalog::standard();
    let config = GameConfig::default();
    let system = CombatSystem::new(&catalog, &config);
    let mut aria = Companion::default().with_bond(0.3);
    let mut console = ScriptedConsole::new().with_lines(["1"]);

    let err = system
        .start_encounter(
            "nonexistent",
            &mut console,
            &mut aria,
            &mut Inventory::new(),
            &mut ScriptedRoller::new(),
        )
        .unwrap_err();

    assert_eq!(err, EncounterError::UnknownEnemy("nonexistent".to_string()));
    assert!((aria.bond() - 0.3).abs() < 1e-9);
}

// =============================================================================
// TEST 4: Full bond still takes at least one damage
// =============================================================================

#[test]
fn test_max_bond_minimum_damage() {
    let catalog = EnemyCatalog::standard();
    let mut encounter = Encounter::begin(&catalog, "echo", &GameConfig::default()).unwrap();
    let mut aria = Companion::default().with_bond(1.0);
    let mut roller = ScriptedRoller::new();

    let res = encounter
        .take_turn(TurnChoice::Flee, &mut aria, &mut Inventory::new(), &mut roller)
        .unwrap();

    assert!(res.events.contains(&CombatEvent::EnemyAttack {
        attack: "echoes your weakness".to_string(),
        damage: 1,
        mitigated: 4,
        player_hp: 99,
    }));
}

// =============================================================================
// TEST 5: Five landed strikes guarantee escape
// =============================================================================

#[test]
fn test_flee_certain_after_five_strikes() {
    let catalog = sandbag_catalog();
    let mut encounter = Encounter::begin(&catalog, "firewall", &GameConfig::default()).unwrap();
    let mut aria = Companion::default();
    let mut inventory = Inventory::new();
    let mut roller = ScriptedRoller::new();

    for _ in 0..5 {
        encounter
            .take_turn(TurnChoice::Attack(HitClass::Base), &mut aria, &mut inventory, &mut roller)
            .unwrap();
    }
    assert_eq!(encounter.state().strikes_landed, 5);

    // 0.999 would fail any flee chance below 1.0
    let res = encounter
        .take_turn(TurnChoice::Flee, &mut aria, &mut inventory, &mut roller)
        .unwrap();
    assert_eq!(res.outcome, Some(EncounterOutcome::Fled));
    assert!(!encounter.report().unwrap().won());
    assert_eq!(aria.bond(), 0.0);
}

// =============================================================================
// TEST 6: Thirty turns end in a stalemate
// =============================================================================

#[test]
fn test_stalemate_at_thirty_turns() {
    let catalog = sandbag_catalog();
    let config = GameConfig::default();
    let system = CombatSystem::new(&catalog, &config);
    let mut aria = Companion::default().with_bond(1.0);
    let lines: Vec<String> = (0..40).map(|_| "attack".to_string()).collect();
    let mut console = ScriptedConsole::new().with_lines(lines);

    let report = system
        .start_encounter(
            "firewall",
            &mut console,
            &mut aria,
            &mut Inventory::new(),
            &mut ScriptedRoller::new(),
        )
        .unwrap();

    assert_outcome(&report, EncounterOutcome::Stalemate);
    assert_eq!(report.turns, 30);
    assert_eq!(report.strikes_missed, 30);
    assert_eq!(report.accuracy, 0);
    assert_eq!(report.player_hp, 70);
    assert!(console.contains("You both pause, at an impasse."));
    assert_eq!(aria.bond(), 1.0);
}

// =============================================================================
// TEST 7: Defeat revives the player at half HP
// =============================================================================

#[test]
fn test_defeat_revives_at_fifty() {
    let catalog = sandbag_catalog();
    let mut combat = CombatConfig::default();
    combat.enemy_damage = DiceExpression::parse("12").unwrap();
    let config = GameConfig::default().with_combat(combat);
    let system = CombatSystem::new(&catalog, &config);
    let mut aria = Companion::default();
    let mut console = ScriptedConsole::new();

    let report = system
        .start_encounter(
            "firewall",
            &mut console,
            &mut aria,
            &mut Inventory::new(),
            &mut ScriptedRoller::new(),
        )
        .unwrap();

    assert_outcome(&report, EncounterOutcome::Defeat);
    assert_eq!(report.turns, 9);
    assert_eq!(report.player_hp, 50);
    assert!((aria.bond() - 0.05).abs() < 1e-9);
    assert_eq!(aria.mood(), Mood::Nervous);
    assert!(console.contains("You wake up, battered but alive."));
}

// =============================================================================
// TEST 8: Mercy refused above the threshold costs nothing
// =============================================================================

#[test]
fn test_refused_mercy_is_free() {
    let catalog = EnemyCatalog::standard();
    let config = GameConfig::default();
    let system = CombatSystem::new(&catalog, &config);
    let mut aria = Companion::default();
    let mut console = ScriptedConsole::new().with_lines(["4", "mercy", "flee"]);
    let mut roller = ScriptedRoller::new().with_chances([0.0]);

    let report = system
        .start_encounter("phantom", &mut console, &mut aria, &mut Inventory::new(), &mut roller)
        .unwrap();

    assert_outcome(&report, EncounterOutcome::Fled);
    assert_eq!(report.turns, 1);
    assert_eq!(report.player_hp, 100);
    assert_eq!(console.count_containing("it won't listen"), 2);
    assert_eq!(aria.bond(), 0.0);
}

// =============================================================================
// TEST 9: Mercy on a weakened enemy
// =============================================================================

#[test]
fn test_mercy_spares_weakened_enemy() {
    let catalog = EnemyCatalog::standard();
    let config = GameConfig::default();
    let system = CombatSystem::new(&catalog, &config);
    let mut aria = Companion::default();
    aria.install_upgrade("Power Surge");
    let mut console = ScriptedConsole::new()
        .with_lines(["1", "4"])
        .with_strikes([Some(4)]);
    let mut roller = ScriptedRoller::new().with_chances([0.39]);

    let report = system
        .start_encounter("fragment", &mut console, &mut aria, &mut Inventory::new(), &mut roller)
        .unwrap();

    assert_outcome(&report, EncounterOutcome::Spared);
    assert!(report.won());
    assert!(console.contains("[MERCY AVAILABLE]"));
    assert!(console.contains("The enemy hesitates... and retreats."));
    assert!((aria.bond() - 0.15).abs() < 1e-9);
}

// =============================================================================
// TEST 10: Analysis can land the final blow
// =============================================================================

#[test]
fn test_analysis_finishes_enemy() {
    let catalog = EnemyCatalog::standard();
    let config = GameConfig::default();
    let system = CombatSystem::new(&catalog, &config);
    let mut aria = Companion::default();
    aria.install_upgrade("Power Surge");
    let mut console = ScriptedConsole::new()
        .with_lines(["attack", "analyze"])
        .with_strikes([Some(3)]);

    let report = system
        .start_encounter(
            "fragment",
            &mut console,
            &mut aria,
            &mut Inventory::new(),
            &mut ScriptedRoller::new(),
        )
        .unwrap();

    assert_outcome(&report, EncounterOutcome::Victory);
    assert_eq!(report.turns, 2);
    assert!(console.contains("Weakness: Its spin attack leaves it temporarily exposed"));
    assert!(console.contains("Your focused analysis dealt 4 damage!"));
}

// =============================================================================
// TEST 11: Potions heal and are used up
// =============================================================================

#[test]
fn test_potion_in_battle() {
    let catalog = EnemyCatalog::standard();
    let config = GameConfig::default();
    let system = CombatSystem::new(&catalog, &config);
    let mut aria = Companion::default();
    let mut inventory = Inventory::new();
    inventory.add_named("Health Potion");
    inventory.add_named("Lucky Coin");
    // flee fails, then the potion, then a successful flee
    let mut console = ScriptedConsole::new().with_lines(["5", "3", "1", "5"]);
    let mut roller = ScriptedRoller::new().with_chances([0.9, 0.0]);

    let report = system
        .start_encounter("glitch", &mut console, &mut aria, &mut inventory, &mut roller)
        .unwrap();

    assert_outcome(&report, EncounterOutcome::Fled);
    assert_eq!(report.turns, 3);
    assert!(console.contains("Used Health Potion. Recovered 5 HP!"));
    assert_eq!(report.player_hp, 95);
    assert!(inventory.consumables().is_empty());
    assert!(inventory.has_item("Lucky Coin"));
}
