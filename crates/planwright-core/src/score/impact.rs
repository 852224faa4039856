//! Match weights: the per-match impact a weigher assigns.
//!
//! Integral constraints weigh matches with `i64`; decimal constraints with
//! [`Decimal`]. All arithmetic is checked, so an overflowing total is
//! reported instead of wrapping.

use std::fmt::{Debug, Display};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use super::Score;

/// A per-match impact value.
pub trait MatchWeight: Copy + PartialOrd + Debug + Display + Send + Sync + 'static {
    fn zero() -> Self;

    fn checked_add(self, other: Self) -> Option<Self>;

    fn checked_sub(self, other: Self) -> Option<Self>;

    fn checked_neg(self) -> Option<Self>;

    /// Exact decimal form, used by match analysis.
    fn to_decimal(self) -> Decimal;

    /// `weight` scaled by this impact, or `None` on overflow.
    fn scale<Sc: Score>(self, weight: &Sc) -> Option<Sc>;

    fn is_negative(self) -> bool {
        self < Self::zero()
    }
}

impl MatchWeight for i64 {
    fn zero() -> Self {
        0
    }

    fn checked_add(self, other: Self) -> Option<Self> {
        i64::checked_add(self, other)
    }

    fn checked_sub(self, other: Self) -> Option<Self> {
        i64::checked_sub(self, other)
    }

    fn checked_neg(self) -> Option<Self> {
        i64::checked_neg(self)
    }

    fn to_decimal(self) -> Decimal {
        Decimal::from(self)
    }

    fn scale<Sc: Score>(self, weight: &Sc) -> Option<Sc> {
        weight.checked_multiply(self)
    }
}

impl MatchWeight for Decimal {
    fn zero() -> Self {
        Decimal::ZERO
    }

    fn checked_add(self, other: Self) -> Option<Self> {
        Decimal::checked_add(self, other)
    }

    fn checked_sub(self, other: Self) -> Option<Self> {
        Decimal::checked_sub(self, other)
    }

    fn checked_neg(self) -> Option<Self> {
        Some(-self)
    }

    fn to_decimal(self) -> Decimal {
        self
    }

    fn scale<Sc: Score>(self, weight: &Sc) -> Option<Sc> {
        weight.checked_multiply_decimal(self)
    }
}

/// Multiplies one integral score level by a decimal factor, rounding half
/// away from zero.
pub fn scale_level(level: i64, factor: Decimal) -> Option<i64> {
    Decimal::from(level)
        .checked_mul(factor)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::HardSoftScore;

    #[test]
    fn test_integral_weights_are_checked() {
        assert_eq!(MatchWeight::checked_add(i64::MAX, 1), None);
        assert_eq!(MatchWeight::checked_neg(i64::MIN), None);
        assert!(MatchWeight::is_negative(-1i64));
        assert_eq!(3i64.scale(&HardSoftScore::of(1, 2)), Some(HardSoftScore::of(3, 6)));
        assert_eq!(2i64.scale(&HardSoftScore::of(0, i64::MAX)), None);
    }

    #[test]
    fn test_decimal_weights_round_half_away_from_zero() {
        assert_eq!(scale_level(3, Decimal::new(15, 1)), Some(5));
        assert_eq!(scale_level(-3, Decimal::new(15, 1)), Some(-5));
        assert_eq!(scale_level(i64::MAX, Decimal::from(2)), None);
        assert_eq!(
            Decimal::new(25, 1).scale(&HardSoftScore::of(0, 2)),
            Some(HardSoftScore::of(0, 5))
        );
    }
}
