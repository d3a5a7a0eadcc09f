//! Dice notation and the injectable random source.
//!
//! Every random decision in the game (damage, strike-zone placement, enemy
//! attack choice, mercy and flee rolls) goes through a [`Roller`], so tests
//! can swap in a seeded or scripted source.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for dice parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiceError {
    #[error("Invalid dice notation: {0}")]
    InvalidNotation(String),
    #[error("Invalid die size: {0}")]
    InvalidDieSize(u32),
    #[error("No dice specified")]
    NoDice,
    #[error("Too many dice: {0}")]
    TooManyDice(u64),
    #[error("Modifier out of range: {0}")]
    ModifierOutOfRange(i64),
}

/// Most dice one expression may roll in total.
pub const MAX_DICE: u32 = 1000;
/// Largest die accepted.
pub const MAX_SIDES: u32 = 1000;
/// Largest absolute flat modifier accepted.
pub const MAX_MODIFIER: i64 = 1_000_000;

/// Source of randomness for game rules.
pub trait Roller {
    /// Uniform integer in `low..=high`. Callers guarantee `low <= high`.
    fn range(&mut self, low: u32, high: u32) -> u32;

    /// Uniform float in `[0, 1)`.
    fn chance(&mut self) -> f64;

    /// Roll one die with `sides` faces.
    fn roll_die(&mut self, sides: u32) -> u32 {
        self.range(1, sides.max(1))
    }

    /// Pick an index into a non-empty slice of length `len`.
    fn choose_index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        let high = u32::try_from(len - 1).unwrap_or(u32::MAX);
        self.range(0, high) as usize
    }

    /// Bernoulli trial with success probability `p`. `p >= 1.0` always succeeds.
    fn succeeds(&mut self, p: f64) -> bool {
        self.chance() < p
    }
}

/// [`Roller`] backed by any `rand` generator.
#[derive(Debug, Clone)]
pub struct RngRoller<R: Rng> {
    rng: R,
}

impl<R: Rng> RngRoller<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngRoller<StdRng> {
    /// Deterministic roller for replays and tests.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Roller seeded from system entropy.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> Roller for RngRoller<R> {
    fn range(&mut self, low: u32, high: u32) -> u32 {
        if low >= high {
            return low;
        }
        self.rng.gen_range(low..=high)
    }

    fn chance(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// A single die component of a dice expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceComponent {
    pub count: u32,
    pub sides: u32,
}

/// A dice expression such as `1d6+12`.
///
/// Serialized as its notation string so configs can say `"1d8+4"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DiceExpression {
    pub components: Vec<DiceComponent>,
    pub modifier: i32,
    original: String,
}

impl DiceExpression {
    /// Parse a dice notation string.
    pub fn parse(notation: &str) -> Result<Self, DiceError> {
        let notation = notation.trim().to_lowercase();
        if notation.is_empty() {
            return Err(DiceError::NoDice);
        }

        let mut components = Vec::new();
        let mut modifier: i64 = 0;
        let mut current = String::new();
        let mut sign: i64 = 1;

        for ch in notation.chars() {
            match ch {
                '+' | '-' => {
                    if !current.is_empty() {
                        Self::parse_component(&current, sign, &mut components, &mut modifier)?;
                        current.clear();
                    }
                    sign = if ch == '+' { 1 } else { -1 };
                }
                ' ' => continue,
                _ => current.push(ch),
            }
        }

        if !current.is_empty() {
            Self::parse_component(&current, sign, &mut components, &mut modifier)?;
        }

        if components.is_empty() && modifier == 0 {
            return Err(DiceError::NoDice);
        }

        let dice: u64 = components.iter().map(|c| u64::from(c.count)).sum();
        if dice > u64::from(MAX_DICE) {
            return Err(DiceError::TooManyDice(dice));
        }
        if !(-MAX_MODIFIER..=MAX_MODIFIER).contains(&modifier) {
            return Err(DiceError::ModifierOutOfRange(modifier));
        }
        let modifier =
            i32::try_from(modifier).map_err(|_| DiceError::ModifierOutOfRange(modifier))?;

        Ok(DiceExpression {
            components,
            modifier,
            original: notation,
        })
    }

    fn parse_component(
        s: &str,
        sign: i64,
        components: &mut Vec<DiceComponent>,
        modifier: &mut i64,
    ) -> Result<(), DiceError> {
        if let Some(d_pos) = s.find('d') {
            if sign < 0 {
                return Err(DiceError::InvalidNotation(s.to_string()));
            }
            let count_str = &s[..d_pos];
            let count: u32 = if count_str.is_empty() {
                1
            } else {
                count_str
                    .parse()
                    .map_err(|_| DiceError::InvalidNotation(s.to_string()))?
            };
            let sides: u32 = s[d_pos + 1..]
                .parse()
                .map_err(|_| DiceError::InvalidNotation(s.to_string()))?;
            if count == 0 {
                return Err(DiceError::NoDice);
            }
            if count > MAX_DICE {
                return Err(DiceError::TooManyDice(u64::from(count)));
            }
            if !(2..=MAX_SIDES).contains(&sides) {
                return Err(DiceError::InvalidDieSize(sides));
            }
            components.push(DiceComponent { count, sides });
        } else {
            let value: i64 = s
                .parse()
                .map_err(|_| DiceError::InvalidNotation(s.to_string()))?;
            *modifier = modifier
                .checked_add(sign * value)
                .ok_or(DiceError::ModifierOutOfRange(value))?;
        }

        Ok(())
    }

    /// Smallest possible total.
    pub fn min(&self) -> i32 {
        let dice: i64 = self.components.iter().map(|c| i64::from(c.count)).sum();
        saturate(dice + i64::from(self.modifier))
    }

    /// Largest possible total.
    pub fn max(&self) -> i32 {
        let dice: i64 = self
            .components
            .iter()
            .map(|c| i64::from(c.count) * i64::from(c.sides))
            .sum();
        saturate(dice + i64::from(self.modifier))
    }

    /// Roll the expression with the given roller.
    pub fn roll(&self, roller: &mut dyn Roller) -> i32 {
        let dice: i64 = self
            .components
            .iter()
            .flat_map(|c| std::iter::repeat(c.sides).take(c.count as usize))
            .map(|sides| i64::from(roller.roll_die(sides)))
            .sum();
        saturate(dice + i64::from(self.modifier))
    }
}

impl FromStr for DiceExpression {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DiceExpression::parse(s)
    }
}

impl TryFrom<String> for DiceExpression {
    type Error = DiceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        DiceExpression::parse(&value)
    }
}

impl From<DiceExpression> for String {
    fn from(value: DiceExpression) -> Self {
        value.original
    }
}

impl fmt::Display for DiceExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.original)
    }
}

fn saturate(total: i64) -> i32 {
    i32::try_from(total).unwrap_or(if total < 0 { i32::MIN } else { i32::MAX })
}

/// Parse notation that is known to be valid at compile time.
pub(crate) fn fixed(notation: &str) -> DiceExpression {
    DiceExpression::parse(notation).unwrap_or_else(|_| DiceExpression {
        components: Vec::new(),
        modifier: 1,
        original: "1".to_string(),
    })
}
