//! BendableScore: a configurable number of hard and soft levels.
//!
//! The level counts are const parameters so the score stays `Copy` and
//! every score of one model has the same shape.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Neg, Sub};

use super::traits::{ParseableScore, Score, ScoreParseError};
use super::ScoreLevel;

/// A score with `H` hard levels followed by `S` soft levels.
///
/// Levels compare in order, every hard level before any soft level. The
/// score is feasible when no hard level is negative.
///
/// ```
/// use planwright_core::{BendableScore, Score};
///
/// let a = BendableScore::<1, 2>::of([0], [-5, 0]);
/// let b = BendableScore::<1, 2>::of([0], [-1, -100]);
/// assert!(b > a);
/// assert_eq!(a.to_string(), "[0]hard/[-5/0]soft");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BendableScore<const H: usize, const S: usize> {
    hard: [i64; H],
    soft: [i64; S],
}

impl<const H: usize, const S: usize> BendableScore<H, S> {
    pub const ZERO: Self = BendableScore {
        hard: [0; H],
        soft: [0; S],
    };

    pub const fn of(hard: [i64; H], soft: [i64; S]) -> Self {
        BendableScore { hard, soft }
    }

    /// A score with one point on the given hard level.
    ///
    /// # Panics
    /// Panics if `level >= H`.
    pub fn of_hard(level: usize, value: i64) -> Self {
        let mut score = Self::ZERO;
        score.hard[level] = value;
        score
    }

    /// A score with one point on the given soft level.
    ///
    /// # Panics
    /// Panics if `level >= S`.
    pub fn of_soft(level: usize, value: i64) -> Self {
        let mut score = Self::ZERO;
        score.soft[level] = value;
        score
    }

    pub fn hard_scores(&self) -> &[i64; H] {
        &self.hard
    }

    pub fn soft_scores(&self) -> &[i64; S] {
        &self.soft
    }

    fn levels(&self) -> impl Iterator<Item = i64> + '_ {
        self.hard.iter().chain(self.soft.iter()).copied()
    }

    fn zip_with(self, other: Self, op: impl Fn(i64, i64) -> i64) -> Self {
        let mut out = self;
        for (a, b) in out.hard.iter_mut().zip(other.hard) {
            *a = op(*a, b);
        }
        for (a, b) in out.soft.iter_mut().zip(other.soft) {
            *a = op(*a, b);
        }
        out
    }
}

impl<const H: usize, const S: usize> Default for BendableScore<H, S> {
    fn default() -> Self {
        Self::ZERO
    }
}

impl<const H: usize, const S: usize> Score for BendableScore<H, S> {
    fn is_feasible(&self) -> bool {
        self.hard.iter().all(|&level| level >= 0)
    }

    fn zero() -> Self {
        Self::ZERO
    }

    fn levels_count() -> usize {
        H + S
    }

    fn to_level_numbers(&self) -> Vec<i64> {
        self.levels().collect()
    }

    fn from_level_numbers(levels: &[i64]) -> Self {
        assert_eq!(levels.len(), H + S, "BendableScore requires exactly {} levels", H + S);
        let mut score = Self::ZERO;
        score.hard.copy_from_slice(&levels[..H]);
        score.soft.copy_from_slice(&levels[H..]);
        score
    }

    fn abs(&self) -> Self {
        let mut out = *self;
        out.hard.iter_mut().chain(out.soft.iter_mut()).for_each(|l| *l = l.saturating_abs());
        out
    }

    fn level_label(index: usize) -> ScoreLevel {
        assert!(index < H + S, "level {} out of range for BendableScore", index);
        if index < H {
            ScoreLevel::Hard
        } else {
            ScoreLevel::Soft
        }
    }
}

impl<const H: usize, const S: usize> Ord for BendableScore<H, S> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.levels().cmp(other.levels())
    }
}

impl<const H: usize, const S: usize> PartialOrd for BendableScore<H, S> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<const H: usize, const S: usize> Add for BendableScore<H, S> {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        self.zip_with(other, i64::saturating_add)
    }
}

impl<const H: usize, const S: usize> Sub for BendableScore<H, S> {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        self.zip_with(other, i64::saturating_sub)
    }
}

impl<const H: usize, const S: usize> Neg for BendableScore<H, S> {
    type Output = Self;

    fn neg(self) -> Self {
        Self::ZERO.zip_with(self, i64::saturating_sub)
    }
}

fn join(levels: &[i64]) -> String {
    levels.iter().map(i64::to_string).collect::<Vec<_>>().join("/")
}

impl<const H: usize, const S: usize> fmt::Debug for BendableScore<H, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BendableScore(hard: {:?}, soft: {:?})", self.hard, self.soft)
    }
}

impl<const H: usize, const S: usize> fmt::Display for BendableScore<H, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]hard/[{}]soft", join(&self.hard), join(&self.soft))
    }
}

fn parse_levels<const N: usize>(part: &str, label: &str) -> Result<[i64; N], ScoreParseError> {
    let inner = part
        .trim()
        .strip_prefix('[')
        .and_then(|p| p.strip_suffix(']'))
        .ok_or_else(|| ScoreParseError {
            message: format!("{} part '{}' must be wrapped in brackets", label, part),
        })?;
    let values = inner
        .split('/')
        .filter(|p| !p.trim().is_empty())
        .map(|p| {
            p.trim().parse::<i64>().map_err(|e| ScoreParseError {
                message: format!("Invalid {} level '{}': {}", label, p, e),
            })
        })
        .collect::<Result<Vec<i64>, _>>()?;
    <[i64; N]>::try_from(values.as_slice()).map_err(|_| ScoreParseError {
        message: format!("expected {} {} levels, found {}", N, label, values.len()),
    })
}

impl<const H: usize, const S: usize> ParseableScore for BendableScore<H, S> {
    fn parse(s: &str) -> Result<Self, ScoreParseError> {
        let s = s.trim();
        let (hard, soft) = s
            .strip_suffix("soft")
            .and_then(|rest| rest.split_once("hard/"))
            .ok_or_else(|| ScoreParseError {
                message: format!(
                    "Invalid BendableScore format '{}': expected '[...]hard/[...]soft'",
                    s
                ),
            })?;
        Ok(BendableScore {
            hard: parse_levels(hard, "hard")?,
            soft: parse_levels(soft, "soft")?,
        })
    }

    fn to_string_repr(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Score2x3 = BendableScore<2, 3>;

    #[test]
    fn test_levels_compare_in_order() {
        let a = Score2x3::of([0, -1], [0, 0, 0]);
        let b = Score2x3::of([0, 0], [-100, -100, -100]);
        let c = Score2x3::of([0, 0], [-100, -99, -1000]);
        assert!(b > a);
        assert!(c > b);
        assert!(!a.is_feasible());
        assert!(b.is_feasible());
    }

    #[test]
    fn test_level_labels_and_numbers() {
        assert_eq!(Score2x3::levels_count(), 5);
        assert_eq!(Score2x3::level_label(1), ScoreLevel::Hard);
        assert_eq!(Score2x3::level_label(2), ScoreLevel::Soft);
        let score = Score2x3::of([1, 2], [3, 4, 5]);
        assert_eq!(score.to_level_numbers(), vec![1, 2, 3, 4, 5]);
        assert_eq!(Score2x3::from_level_numbers(&[1, 2, 3, 4, 5]), score);
        assert!(Score2x3::of_hard(1, 1).has_hard_component());
        assert!(!Score2x3::of_soft(2, 1).has_hard_component());
    }

    #[test]
    fn test_arithmetic() {
        let a = Score2x3::of([1, 0], [0, -2, 3]);
        let b = Score2x3::of([0, 1], [1, 1, 1]);
        assert_eq!(a + b, Score2x3::of([1, 1], [1, -1, 4]));
        assert_eq!(a - b, Score2x3::of([1, -1], [-1, -3, 2]));
        assert_eq!(-a, Score2x3::of([-1, 0], [0, 2, -3]));
        assert_eq!(a.checked_multiply(2), Some(Score2x3::of([2, 0], [0, -4, 6])));
        assert_eq!(a.checked_multiply(i64::MAX), None);
    }

    #[test]
    fn test_parse_and_display() {
        let score = Score2x3::of([0, -1], [-2, 0, -3]);
        assert_eq!(score.to_string(), "[0/-1]hard/[-2/0/-3]soft");
        assert_eq!(Score2x3::parse("[0/-1]hard/[-2/0/-3]soft").unwrap(), score);
        assert!(Score2x3::parse("[0]hard/[-2/0/-3]soft").is_err());
        assert!(Score2x3::parse("0/-1hard/[-2/0/-3]soft").is_err());
        assert_eq!(BendableScore::<0, 1>::parse("[]hard/[4]soft").unwrap().soft_scores(), &[4]);
    }
}
