//! HardSoftDecimalScore: two levels stored as `i64` scaled by 100000.
//!
//! Five decimal places without heap allocation. Conversions to and from
//! text go through [`Decimal`] so no precision is lost on the way.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Neg, Sub};
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use super::traits::{ParseableScore, Score, ScoreParseError};
use super::ScoreLevel;

/// Scale factor for 5 decimal places.
const SCALE: i64 = 100_000;
const SCALE_DIGITS: u32 = 5;

/// A hard/soft score with five decimal places per level.
///
/// Levels are stored pre-scaled. Use [`of`](Self::of) for whole numbers,
/// [`of_decimal`](Self::of_decimal) for fractions, or
/// [`of_scaled`](Self::of_scaled) for raw scaled values.
///
/// ```
/// use planwright_core::{HardSoftDecimalScore, Score};
///
/// let score = HardSoftDecimalScore::of_scaled(-150000, -250000);
/// assert_eq!(score.to_string(), "-1.5hard/-2.5soft");
/// assert!(!score.is_feasible());
/// assert_eq!(HardSoftDecimalScore::of(-1, 0).hard_scaled(), -100000);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HardSoftDecimalScore {
    hard: i64,
    soft: i64,
}

impl HardSoftDecimalScore {
    pub const ZERO: HardSoftDecimalScore = HardSoftDecimalScore { hard: 0, soft: 0 };

    /// One whole hard point.
    pub const ONE_HARD: HardSoftDecimalScore = HardSoftDecimalScore {
        hard: SCALE,
        soft: 0,
    };

    /// One whole soft point.
    pub const ONE_SOFT: HardSoftDecimalScore = HardSoftDecimalScore {
        hard: 0,
        soft: SCALE,
    };

    /// Creates a score from whole-number levels.
    #[inline]
    pub const fn of(hard: i64, soft: i64) -> Self {
        HardSoftDecimalScore {
            hard: hard * SCALE,
            soft: soft * SCALE,
        }
    }

    /// Creates a score from pre-scaled levels.
    #[inline]
    pub const fn of_scaled(hard: i64, soft: i64) -> Self {
        HardSoftDecimalScore { hard, soft }
    }

    /// Creates a score from decimal levels, rounding beyond five places
    /// half away from zero. `None` when a level does not fit.
    pub fn of_decimal(hard: Decimal, soft: Decimal) -> Option<Self> {
        Some(HardSoftDecimalScore {
            hard: to_scaled(hard)?,
            soft: to_scaled(soft)?,
        })
    }

    #[inline]
    pub const fn hard_scaled(&self) -> i64 {
        self.hard
    }

    #[inline]
    pub const fn soft_scaled(&self) -> i64 {
        self.soft
    }

    pub fn hard(&self) -> Decimal {
        from_scaled(self.hard)
    }

    pub fn soft(&self) -> Decimal {
        from_scaled(self.soft)
    }
}

fn to_scaled(value: Decimal) -> Option<i64> {
    value
        .checked_mul(Decimal::from(SCALE))?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

fn from_scaled(scaled: i64) -> Decimal {
    Decimal::new(scaled, SCALE_DIGITS).normalize()
}

impl Score for HardSoftDecimalScore {
    #[inline]
    fn is_feasible(&self) -> bool {
        self.hard >= 0
    }

    #[inline]
    fn zero() -> Self {
        HardSoftDecimalScore::ZERO
    }

    #[inline]
    fn levels_count() -> usize {
        2
    }

    fn to_level_numbers(&self) -> Vec<i64> {
        vec![self.hard, self.soft]
    }

    fn from_level_numbers(levels: &[i64]) -> Self {
        assert_eq!(levels.len(), 2, "HardSoftDecimalScore requires exactly 2 levels");
        HardSoftDecimalScore::of_scaled(levels[0], levels[1])
    }

    fn checked_multiply(&self, factor: i64) -> Option<Self> {
        Some(HardSoftDecimalScore::of_scaled(
            self.hard.checked_mul(factor)?,
            self.soft.checked_mul(factor)?,
        ))
    }

    fn checked_add(&self, other: &Self) -> Option<Self> {
        Some(HardSoftDecimalScore::of_scaled(
            self.hard.checked_add(other.hard)?,
            self.soft.checked_add(other.soft)?,
        ))
    }

    fn abs(&self) -> Self {
        HardSoftDecimalScore::of_scaled(self.hard.saturating_abs(), self.soft.saturating_abs())
    }

    fn level_label(index: usize) -> ScoreLevel {
        [ScoreLevel::Hard, ScoreLevel::Soft][index]
    }
}

impl Ord for HardSoftDecimalScore {
    fn cmp(&self, other: &Self) -> Ordering {
        self.hard
            .cmp(&other.hard)
            .then_with(|| self.soft.cmp(&other.soft))
    }
}

impl PartialOrd for HardSoftDecimalScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Add for HardSoftDecimalScore {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        HardSoftDecimalScore::of_scaled(
            self.hard.saturating_add(other.hard),
            self.soft.saturating_add(other.soft),
        )
    }
}

impl Sub for HardSoftDecimalScore {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        HardSoftDecimalScore::of_scaled(
            self.hard.saturating_sub(other.hard),
            self.soft.saturating_sub(other.soft),
        )
    }
}

impl Neg for HardSoftDecimalScore {
    type Output = Self;

    fn neg(self) -> Self {
        HardSoftDecimalScore::of_scaled(self.hard.saturating_neg(), self.soft.saturating_neg())
    }
}

impl fmt::Debug for HardSoftDecimalScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HardSoftDecimalScore({}, {})", self.hard(), self.soft())
    }
}

impl fmt::Display for HardSoftDecimalScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}hard/{}soft", self.hard(), self.soft())
    }
}

impl ParseableScore for HardSoftDecimalScore {
    fn parse(s: &str) -> Result<Self, ScoreParseError> {
        let s = s.trim();
        let parts: Vec<&str> = s.split('/').collect();
        if parts.len() != 2 {
            return Err(ScoreParseError {
                message: format!(
                    "Invalid HardSoftDecimalScore format '{}': expected 'Xhard/Ysoft'",
                    s
                ),
            });
        }

        let level = |part: &str, suffix: &str| -> Result<i64, ScoreParseError> {
            let digits = part.trim().strip_suffix(suffix).ok_or_else(|| ScoreParseError {
                message: format!("{} part '{}' must end with '{}'", suffix, part, suffix),
            })?;
            let value = Decimal::from_str(digits).map_err(|e| ScoreParseError {
                message: format!("Invalid {} level '{}': {}", suffix, digits, e),
            })?;
            to_scaled(value).ok_or_else(|| ScoreParseError {
                message: format!("{} level '{}' is out of range", suffix, digits),
            })
        };

        Ok(HardSoftDecimalScore::of_scaled(
            level(parts[0], "hard")?,
            level(parts[1], "soft")?,
        ))
    }

    fn to_string_repr(&self) -> String {
        self.to_string()
    }
}
