//! Transition rules.
//!
//! The dispatcher only sees [`EvolutionRule`], so any pure
//! `(state, neighbours) -> state` table can be plugged in. [`LifeLikeRule`]
//! covers the outer-totalistic "B/S" family and is what configs name.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Cell;

/// Pure per-cell transition function.
///
/// Implementations must be deterministic and side-effect free; the
/// dispatcher calls them from many threads at once.
pub trait EvolutionRule: Send + Sync {
    fn next_state(&self, current: Cell, neighbors: u8) -> Cell;
}

impl<F> EvolutionRule for F
where
    F: Fn(Cell, u8) -> Cell + Send + Sync,
{
    #[inline]
    fn next_state(&self, current: Cell, neighbors: u8) -> Cell {
        self(current, neighbors)
    }
}

/// Conway's rule as a fixed match table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConwayRule;

impl EvolutionRule for ConwayRule {
    #[inline]
    fn next_state(&self, current: Cell, neighbors: u8) -> Cell {
        match (current, neighbors) {
            (Cell::Alive, 2 | 3) => Cell::Alive,
            (Cell::Dead, 3) => Cell::Alive,
            _ => Cell::Dead,
        }
    }
}

/// Life-like rule stored as birth/survival bitmasks over neighbour counts
/// `0..=8` (bit `n` set means "applies at `n` neighbours").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LifeLikeRule {
    birth: u16,
    survival: u16,
}

const COUNT_MASK: u16 = 0x01FF;

impl LifeLikeRule {
    /// Build from neighbour-count lists. Counts above 8 are ignored.
    pub fn new(birth: &[u8], survival: &[u8]) -> Self {
        Self {
            birth: mask_of(birth),
            survival: mask_of(survival),
        }
    }

    /// B3/S23
    pub fn conway() -> Self {
        Self::new(&[3], &[2, 3])
    }

    /// B36/S23
    pub fn high_life() -> Self {
        Self::new(&[3, 6], &[2, 3])
    }

    /// B3678/S34678
    pub fn day_and_night() -> Self {
        Self::new(&[3, 6, 7, 8], &[3, 4, 6, 7, 8])
    }

    /// B2/S
    pub fn seeds() -> Self {
        Self::new(&[2], &[])
    }

    /// B3/S012345678
    pub fn life_without_death() -> Self {
        Self::new(&[3], &[0, 1, 2, 3, 4, 5, 6, 7, 8])
    }

    /// Parse `B…/S…` notation, e.g. `"B36/S23"`. Case-insensitive and the
    /// two halves may come in either order.
    pub fn parse(notation: &str) -> Result<Self, RuleParseError> {
        let trimmed = notation.trim();
        let (left, right) = trimmed
            .split_once('/')
            .ok_or_else(|| RuleParseError::MissingSeparator(trimmed.to_string()))?;

        let mut birth = None;
        let mut survival = None;
        for part in [left, right] {
            let part = part.trim();
            let mut chars = part.chars();
            let slot = match chars.next().map(|c| c.to_ascii_uppercase()) {
                Some('B') => &mut birth,
                Some('S') => &mut survival,
                _ => return Err(RuleParseError::BadSection(part.to_string())),
            };
            if slot.is_some() {
                return Err(RuleParseError::BadSection(part.to_string()));
            }
            let mut mask = 0u16;
            for c in chars {
                let digit = c
                    .to_digit(10)
                    .filter(|&d| d <= 8)
                    .ok_or(RuleParseError::InvalidCount(c))?;
                mask |= 1 << digit;
            }
            *slot = Some(mask);
        }

        match (birth, survival) {
            (Some(birth), Some(survival)) => Ok(Self { birth, survival }),
            _ => Err(RuleParseError::BadSection(trimmed.to_string())),
        }
    }

    /// Whether a dead cell with `neighbors` live neighbours is born.
    #[inline]
    pub fn born_on(&self, neighbors: u8) -> bool {
        neighbors <= 8 && self.birth & (1 << neighbors) != 0
    }

    /// Whether a live cell with `neighbors` live neighbours survives.
    #[inline]
    pub fn survives_on(&self, neighbors: u8) -> bool {
        neighbors <= 8 && self.survival & (1 << neighbors) != 0
    }
}

fn mask_of(counts: &[u8]) -> u16 {
    counts
        .iter()
        .filter(|&&n| n <= 8)
        .fold(0, |mask, &n| mask | (1 << n))
        & COUNT_MASK
}

impl Default for LifeLikeRule {
    fn default() -> Self {
        Self::conway()
    }
}

impl EvolutionRule for LifeLikeRule {
    #[inline]
    fn next_state(&self, current: Cell, neighbors: u8) -> Cell {
        let alive = match current {
            Cell::Alive => self.survives_on(neighbors),
            Cell::Dead => self.born_on(neighbors),
        };
        Cell::from(alive)
    }
}

impl fmt::Display for LifeLikeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = |mask: u16| -> String {
            (0..=8u8)
                .filter(|&n| mask & (1 << n) != 0)
                .map(|n| char::from(b'0' + n))
                .collect()
        };
        write!(f, "B{}/S{}", digits(self.birth), digits(self.survival))
    }
}

impl FromStr for LifeLikeRule {
    type Err = RuleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for LifeLikeRule {
    type Error = RuleParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<LifeLikeRule> for String {
    fn from(rule: LifeLikeRule) -> Self {
        rule.to_string()
    }
}

/// Errors from parsing `B…/S…` rule notation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleParseError {
    #[error("Rule {0:?} must have the form B<digits>/S<digits>")]
    MissingSeparator(String),
    #[error("Rule section {0:?} must start with a single B or S")]
    BadSection(String),
    #[error("Neighbour count {0:?} is not a digit in 0..=8")]
    InvalidCount(char),
}
