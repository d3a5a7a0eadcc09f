//! The strike-zone timing minigame.
//!
//! A cursor bounces across a bar one position per tick. The player gets a
//! single "act now" input; where the cursor sits when it arrives decides
//! whether the attack misses, lands in the base zone, or lands in a bonus
//! zone opened by a companion upgrade.

use crate::console::Console;
use crate::dice::{fixed, DiceExpression, Roller};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which kind of zone a position belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneKind {
    Base,
    Bonus,
}

/// A half-open window `[start, start + width)` on the bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrikeZone {
    pub start: u32,
    pub width: u32,
    pub kind: ZoneKind,
}

impl StrikeZone {
    pub fn new(start: u32, width: u32, kind: ZoneKind) -> Self {
        Self { start, width, kind }
    }

    pub fn end(&self) -> u32 {
        self.start + self.width
    }

    pub fn contains(&self, position: u32) -> bool {
        position >= self.start && position < self.end()
    }
}

/// Result of one sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitClass {
    Miss,
    Base,
    Bonus,
}

impl HitClass {
    /// Base and bonus hits count as landed strikes.
    pub fn landed(&self) -> bool {
        !matches!(self, HitClass::Miss)
    }
}

/// Damage dice for each hit class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrikeDamage {
    pub miss: DiceExpression,
    pub base: DiceExpression,
    pub bonus: DiceExpression,
}

impl Default for StrikeDamage {
    fn default() -> Self {
        Self {
            miss: fixed("1d4+1"),
            base: fixed("1d6+12"),
            bonus: fixed("1d8+16"),
        }
    }
}

impl StrikeDamage {
    pub fn dice_for(&self, hit: HitClass) -> &DiceExpression {
        match hit {
            HitClass::Miss => &self.miss,
            HitClass::Base => &self.base,
            HitClass::Bonus => &self.bonus,
        }
    }

    /// Roll damage for a hit. Never below 1.
    pub fn roll(&self, hit: HitClass, roller: &mut dyn Roller) -> i32 {
        self.dice_for(hit).roll(roller).max(1)
    }

    /// True when every miss is below every base hit and bonus hits start
    /// above base hits.
    pub fn is_ordered(&self) -> bool {
        self.miss.max() < self.base.min()
            && self.bonus.min() > self.base.min()
            && self.bonus.max() > self.base.max()
    }
}

/// Geometry and timing of the minigame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrikeConfig {
    /// Number of positions on the bar.
    pub width: u32,
    /// Lowest start of the base zone.
    pub base_start_min: u32,
    /// Highest start of the base zone (inclusive).
    pub base_start_max: u32,
    pub base_width: u32,
    /// How long each tick waits for input.
    pub tick_interval_ms: u64,
    /// Ticks without input before the sweep resolves as a miss.
    pub max_ticks: u32,
    pub damage: StrikeDamage,
}

impl Default for StrikeConfig {
    fn default() -> Self {
        Self {
            width: 30,
            base_start_min: 10,
            base_start_max: 16,
            base_width: 6,
            tick_interval_ms: 60,
            max_ticks: 600,
            damage: StrikeDamage::default(),
        }
    }
}

impl StrikeConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn with_tick_interval_ms(mut self, ms: u64) -> Self {
        self.tick_interval_ms = ms;
        self
    }

    pub fn with_max_ticks(mut self, ticks: u32) -> Self {
        self.max_ticks = ticks;
        self
    }

    pub fn with_base_start(mut self, min: u32, max: u32) -> Self {
        self.base_start_min = min;
        self.base_start_max = max;
        self
    }
}

/// Bonus zones opened by the installed upgrades, in upgrade order.
pub fn bonus_zones_for(upgrades: &[String]) -> Vec<StrikeZone> {
    upgrades
        .iter()
        .filter_map(|upgrade| {
            if upgrade.contains("Precision") {
                Some(StrikeZone::new(8, 8, ZoneKind::Bonus))
            } else if upgrade.contains("Power") {
                Some(StrikeZone::new(2, 5, ZoneKind::Bonus))
            } else {
                None
            }
        })
        .collect()
}

/// One sweep of the minigame.
#[derive(Debug, Clone)]
pub struct StrikeBar {
    width: u32,
    cursor: u32,
    forward: bool,
    base: StrikeZone,
    bonus: Vec<StrikeZone>,
    ticks: u32,
}

impl StrikeBar {
    /// Lay out a fresh bar. The base zone start is drawn from the roller.
    pub fn new(config: &StrikeConfig, upgrades: &[String], roller: &mut dyn Roller) -> Self {
        let start = roller.range(config.base_start_min, config.base_start_max);
        let bar = Self::with_zones(
            config.width,
            StrikeZone::new(start, config.base_width, ZoneKind::Base),
            bonus_zones_for(upgrades),
        );
        debug!(
            "Strike bar: base [{}, {}), {} bonus zone(s)",
            bar.base.start,
            bar.base.end(),
            bar.bonus.len()
        );
        bar
    }

    /// Build a bar with explicit zones.
    pub fn with_zones(width: u32, base: StrikeZone, bonus: Vec<StrikeZone>) -> Self {
        Self {
            width: width.max(1),
            cursor: 0,
            forward: true,
            base,
            bonus,
            ticks: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    pub fn base_zone(&self) -> StrikeZone {
        self.base
    }

    pub fn bonus_zones(&self) -> &[StrikeZone] {
        &self.bonus
    }

    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// The zone covering a position. The base zone wins over bonus zones.
    pub fn zone_at(&self, position: u32) -> Option<ZoneKind> {
        if self.base.contains(position) {
            Some(ZoneKind::Base)
        } else if self.bonus.iter().any(|z| z.contains(position)) {
            Some(ZoneKind::Bonus)
        } else {
            None
        }
    }

    pub fn classify(&self, position: u32) -> HitClass {
        match self.zone_at(position) {
            Some(ZoneKind::Base) => HitClass::Base,
            Some(ZoneKind::Bonus) => HitClass::Bonus,
            None => HitClass::Miss,
        }
    }

    /// Move the cursor one step, bouncing off both ends.
    pub fn advance(&mut self) {
        self.ticks += 1;
        if self.width < 2 {
            return;
        }
        if self.forward {
            self.cursor += 1;
        } else {
            self.cursor -= 1;
        }
        if self.cursor == 0 || self.cursor == self.width - 1 {
            self.forward = !self.forward;
        }
    }

    /// Plain-text rendering: `-` empty, `=` base, `*` bonus, `|` cursor.
    pub fn render_text(&self) -> String {
        (0..self.width)
            .map(|pos| {
                if pos == self.cursor {
                    '|'
                } else {
                    match self.zone_at(pos) {
                        Some(ZoneKind::Base) => '=',
                        Some(ZoneKind::Bonus) => '*',
                        None => '-',
                    }
                }
            })
            .collect()
    }

    /// Run the sweep against a console until it signals or the tick budget
    /// runs out.
    pub fn run(&mut self, console: &mut dyn Console, config: &StrikeConfig) -> HitClass {
        console.begin_strike(self);
        let tick = config.tick_interval();

        let result = loop {
            if self.ticks >= config.max_ticks {
                warn!("Strike sweep hit the {} tick limit; resolving as miss", config.max_ticks);
                break HitClass::Miss;
            }
            console.render_strike(self);
            if console.poll_strike(tick) {
                break self.classify(self.cursor);
            }
            if console.strike_cancelled() {
                debug!("Strike sweep cancelled at tick {}", self.ticks);
                break HitClass::Miss;
            }
            self.advance();
        };

        debug!("Strike resolved at position {} as {:?}", self.cursor, result);
        console.end_strike(result);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedConsole, ScriptedRoller};

    fn bar_with(upgrades: &[&str]) -> StrikeBar {
        let upgrades: Vec<String> = upgrades.iter().map(|s| s.to_string()).collect();
        StrikeBar::new(&StrikeConfig::default(), &upgrades, &mut ScriptedRoller::new())
    }

    #[test]
    fn test_zone_is_half_open() {
        let zone = StrikeZone::new(10, 6, ZoneKind::Base);
        assert!(!zone.contains(9));
        assert!(zone.contains(10));
        assert!(zone.contains(15));
        assert!(!zone.contains(16));
    }

    #[test]
    fn test_bonus_zones_follow_upgrades() {
        let upgrades = vec![
            "Power Surge".to_string(),
            "Basic Scanner".to_string(),
            "Precision Targeting".to_string(),
        ];
        let zones = bonus_zones_for(&upgrades);
        assert_eq!(
            zones,
            vec![
                StrikeZone::new(2, 5, ZoneKind::Bonus),
                StrikeZone::new(8, 8, ZoneKind::Bonus),
            ]
        );
        assert!(bonus_zones_for(&[]).is_empty());
    }

    #[test]
    fn test_base_zone_beats_bonus_on_overlap() {
        let bar = bar_with(&["Precision Targeting"]);
        // base [10, 16), precision [8, 16)
        assert_eq!(bar.classify(8), HitClass::Bonus);
        assert_eq!(bar.classify(12), HitClass::Base);
        assert_eq!(bar.classify(16), HitClass::Miss);
        assert_eq!(bar.classify(0), HitClass::Miss);
    }

    #[test]
    fn test_base_start_drawn_from_roller() {
        let mut roller = ScriptedRoller::new().with_ranges([14]);
        let bar = StrikeBar::new(&StrikeConfig::default(), &[], &mut roller);
        assert_eq!(bar.base_zone(), StrikeZone::new(14, 6, ZoneKind::Base));
    }

    #[test]
    fn test_cursor_bounces() {
        let mut bar = StrikeBar::with_zones(4, StrikeZone::new(1, 1, ZoneKind::Base), Vec::new());
        let mut seen = vec![bar.cursor()];
        for _ in 0..7 {
            bar.advance();
            seen.push(bar.cursor());
        }
        assert_eq!(seen, vec![0, 1, 2, 3, 2, 1, 0, 1]);
    }

    #[test]
    fn test_render_text() {
        let bar = StrikeBar::with_zones(
            8,
            StrikeZone::new(4, 2, ZoneKind::Base),
            vec![StrikeZone::new(1, 2, ZoneKind::Bonus)],
        );
        assert_eq!(bar.render_text(), "|**-==--");
    }

    #[test]
    fn test_run_fires_at_target() {
        let mut console = ScriptedConsole::new().with_strikes([Some(12)]);
        let config = StrikeConfig::default();
        let mut bar = bar_with(&[]);
        assert_eq!(bar.run(&mut console, &config), HitClass::Base);
        assert_eq!(bar.cursor(), 12);
    }

    #[test]
    fn test_run_without_input_misses_at_limit() {
        let mut console = ScriptedConsole::new();
        let config = StrikeConfig::default().with_max_ticks(50);
        let mut bar = bar_with(&[]);
        assert_eq!(bar.run(&mut console, &config), HitClass::Miss);
        assert_eq!(bar.ticks(), 50);
    }

    /// Never fires; gives up after a number of polls.
    struct Impatient {
        polls: u32,
        patience: u32,
    }

    impl Console for Impatient {
        fn show_face(&mut self, _mood: crate::companion::Mood) {}
        fn show_box(&mut self, _title: &str, _lines: &[String], _tone: crate::console::Tone) {}
        fn show_bar(&mut self, _label: &str, _cur: i32, _max: i32, _tone: crate::console::Tone) {}
        fn say(&mut self, _text: &str, _tone: crate::console::Tone) {}
        fn render_strike(&mut self, _bar: &StrikeBar) {}
        fn read_line(&mut self, _prompt: &str) -> Option<String> {
            None
        }
        fn poll_strike(&mut self, _timeout: Duration) -> bool {
            self.polls += 1;
            false
        }
        fn strike_cancelled(&self) -> bool {
            self.polls >= self.patience
        }
    }

    #[test]
    fn test_cancelled_sweep_misses_early() {
        let mut console = Impatient {
            polls: 0,
            patience: 4,
        };
        let config = StrikeConfig::default();
        // cursor at 3 would be a bonus hit with Power Surge; cancelling still misses
        let mut bar = bar_with(&["Power Surge"]);
        assert_eq!(bar.run(&mut console, &config), HitClass::Miss);
        assert_eq!(console.polls, 4);
        assert_eq!(bar.cursor(), 3);
        assert_eq!(bar.ticks(), 3);
    }

    #[test]
    fn test_default_damage_is_ordered() {
        let damage = StrikeDamage::default();
        assert!(damage.is_ordered());
        assert_eq!((damage.miss.min(), damage.miss.max()), (2, 5));
        assert_eq!((damage.base.min(), damage.base.max()), (13, 18));
        assert_eq!((damage.bonus.min(), damage.bonus.max()), (17, 24));
    }
}
