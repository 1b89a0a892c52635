use std::fmt;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

pub mod character;
mod coerce;
pub mod config;
pub mod content;
pub mod session;
pub mod sheet;
pub mod stats;
pub mod store;

pub use character::{Action, Character, CharacterField, Entry, Item, Section, SheetError};
pub use session::{Notice, Session, SheetEvent};
pub use stats::{recompute_derived, Ability, AbilityScores, DerivedStats, Proficiencies, ProficiencyTier, Skill};
pub use store::{CharacterStore, FileStorage, ListEntry, MemoryStorage, Storage, StoreError};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdMode { Normal, Advantage, Disadvantage }

pub struct Dice { rng: ChaCha8Rng }

impl Dice {
    pub fn from_seed(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    pub fn from_entropy() -> Self {
        Self { rng: ChaCha8Rng::from_entropy() }
    }

    pub fn d20(&mut self, mode: AdMode) -> u8 {
        let mut roll = || self.rng.gen_range(1..=20);
        match mode {
            AdMode::Normal => roll(),
            AdMode::Advantage => { let a = roll(); let b = roll(); a.max(b) }
            AdMode::Disadvantage => { let a = roll(); let b = roll(); a.min(b) }
        }
    }
}

/// A single d20 roll with the modifier that was added to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RollResult {
    pub roll: i32,
    pub modifier: i32,
    pub total: i32,
}

impl fmt::Display for RollResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rolled: {} + {} = {}", self.roll, self.modifier, self.total)
    }
}

/// Roll a d20 (with advantage/disadvantage) and add a modifier.
pub fn roll_d20(dice: &mut Dice, modifier: i32, mode: AdMode) -> RollResult {
    let roll = dice.d20(mode) as i32;
    RollResult { roll, modifier, total: roll.saturating_add(modifier) }
}

/// D&D ability modifier = floor((score - 10) / 2) for integer scores.
pub fn ability_modifier(score: i32) -> i32 {
    // `div_euclid` with positive divisor matches mathematical floor division;
    // widened so every i32 score has a modifier.
    ((score as i64 - 10).div_euclid(2)) as i32
}

/// Proficiency bonus by character level. Levels below 1 are treated as level 1.
pub fn proficiency_bonus(level: i32) -> i32 {
    (level.max(1) - 1).div_euclid(4) + 2
}

/// `+3`, `+0`, `-2`.
pub fn format_signed(n: i32) -> String {
    if n >= 0 {
        format!("+{}", n)
    } else {
        n.to_string()
    }
}
