//! Core Score trait definition

use std::fmt::{Debug, Display};
use std::ops::{Add, Neg, Sub};

use rust_decimal::Decimal;

use super::impact::scale_level;
use super::ScoreLevel;

/// Core trait for all score types in Planwright.
///
/// Scores are immutable, totally ordered values. Higher-priority levels are
/// compared first; a higher score is better.
pub trait Score:
    Copy
    + Debug
    + Display
    + Default
    + Send
    + Sync
    + PartialEq
    + Eq
    + PartialOrd
    + Ord
    + std::hash::Hash
    + Add<Output = Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
    + 'static
{
    /// Returns true if the highest-priority level is not negative.
    fn is_feasible(&self) -> bool;

    /// Returns the zero score (identity element for addition).
    fn zero() -> Self;

    /// Returns the number of score levels.
    fn levels_count() -> usize;

    /// Returns the score values, highest priority first.
    fn to_level_numbers(&self) -> Vec<i64>;

    /// Creates a score from level numbers.
    ///
    /// # Panics
    /// Panics if the number of levels doesn't match `levels_count()`.
    fn from_level_numbers(levels: &[i64]) -> Self;

    /// Multiplies every level by an integral factor, or `None` when a level
    /// overflows.
    ///
    /// Used to scale a constraint weight by the summed match weights of
    /// that constraint.
    fn checked_multiply(&self, factor: i64) -> Option<Self> {
        let levels = self
            .to_level_numbers()
            .into_iter()
            .map(|level| level.checked_mul(factor))
            .collect::<Option<Vec<i64>>>()?;
        Some(Self::from_level_numbers(&levels))
    }

    /// Multiplies every level by a decimal factor, rounding each level half
    /// away from zero. `None` when a level overflows.
    fn checked_multiply_decimal(&self, factor: Decimal) -> Option<Self> {
        let levels = self
            .to_level_numbers()
            .into_iter()
            .map(|level| scale_level(level, factor))
            .collect::<Option<Vec<i64>>>()?;
        Some(Self::from_level_numbers(&levels))
    }

    /// Level-wise sum, or `None` when a level overflows.
    fn checked_add(&self, other: &Self) -> Option<Self> {
        let levels = self
            .to_level_numbers()
            .into_iter()
            .zip(other.to_level_numbers())
            .map(|(a, b)| a.checked_add(b))
            .collect::<Option<Vec<i64>>>()?;
        Some(Self::from_level_numbers(&levels))
    }

    /// Returns the absolute value of this score.
    fn abs(&self) -> Self;

    /// Returns the semantic label for the score level at the given index.
    ///
    /// # Panics
    /// Panics if `index >= levels_count()`.
    fn level_label(index: usize) -> ScoreLevel;

    /// Returns true if every level is zero.
    fn is_zero(&self) -> bool {
        *self == Self::zero()
    }

    /// Returns true if the score has a non-zero hard level.
    fn has_hard_component(&self) -> bool {
        self.to_level_numbers()
            .iter()
            .enumerate()
            .any(|(i, level)| *level != 0 && Self::level_label(i) == ScoreLevel::Hard)
    }
}

/// Scores that can be parsed from, and printed to, their string form.
pub trait ParseableScore: Score {
    /// Parses a score from a string representation.
    ///
    /// # Format
    /// - SimpleScore: "42"
    /// - HardSoftScore: "0hard/-100soft"
    /// - HardMediumSoftScore: "0hard/0medium/-100soft"
    /// - HardSoftDecimalScore: "-1.5hard/0soft"
    /// - BendableScore: "[0/-1]hard/[-2/0/-3]soft"
    fn parse(s: &str) -> Result<Self, ScoreParseError>;

    /// Returns the string representation of this score.
    fn to_string_repr(&self) -> String;
}

/// Error when parsing a score from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreParseError {
    pub message: String,
}

impl std::fmt::Display for ScoreParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Score parse error: {}", self.message)
    }
}

impl std::error::Error for ScoreParseError {}
