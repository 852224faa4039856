//! Overlapping joiner for half-open interval overlap.

use std::marker::PhantomData;
use std::ops::Bound;

use super::{Joiner, JoinerKind, RangeBounds, RangeValue};
use crate::stream::tuple::TupleFn;

/// Creates a joiner matching when `[start_a, end_a)` overlaps `[start_b, end_b)`,
/// that is `start_a < end_b && start_b < end_a`.
///
/// Both sides are indexed by their start; a lookup bounds the other side's
/// start by this side's end and re-verifies the remaining half.
///
/// # Example
///
/// ```
/// use planwright_scoring::stream::joiner::{overlapping, Joiner};
///
/// #[derive(Clone, Debug)]
/// struct Shift { start: i64, end: i64 }
///
/// let overlap = overlapping(
///     |s: &Shift| s.start,
///     |s: &Shift| s.end,
///     |s: &Shift| s.start,
///     |s: &Shift| s.end,
/// );
///
/// let early = (Shift { start: 0, end: 10 },);
/// assert!(Joiner::<(Shift,), Shift>::matches(&overlap, &early, &Shift { start: 5, end: 15 }));
/// // touching intervals do not overlap
/// assert!(!Joiner::<(Shift,), Shift>::matches(&overlap, &early, &Shift { start: 10, end: 20 }));
/// ```
pub fn overlapping<B, K, Fsa, Fea, Fsb, Feb>(
    start_a: Fsa,
    end_a: Fea,
    start_b: Fsb,
    end_b: Feb,
) -> OverlappingJoiner<Fsa, Fea, Fsb, Feb, K>
where
    K: RangeValue,
    Fsb: Fn(&B) -> K + Send + Sync,
    Feb: Fn(&B) -> K + Send + Sync,
{
    OverlappingJoiner {
        start_a,
        end_a,
        start_b,
        end_b,
        _phantom: PhantomData,
    }
}

pub struct OverlappingJoiner<Fsa, Fea, Fsb, Feb, K> {
    start_a: Fsa,
    end_a: Fea,
    start_b: Fsb,
    end_b: Feb,
    _phantom: PhantomData<fn() -> K>,
}

impl<T, B, K, Fsa, Fea, Fsb, Feb> Joiner<T, B> for OverlappingJoiner<Fsa, Fea, Fsb, Feb, K>
where
    K: RangeValue,
    Fsa: TupleFn<T, K>,
    Fea: TupleFn<T, K>,
    Fsb: Fn(&B) -> K + Send + Sync,
    Feb: Fn(&B) -> K + Send + Sync,
{
    fn kind(&self) -> JoinerKind {
        JoinerKind::Overlapping
    }

    fn range_left(&self, left: &T) -> Option<i128> {
        Some(self.start_a.call(left).range_key())
    }

    fn range_right(&self, right: &B) -> Option<i128> {
        Some((self.start_b)(right).range_key())
    }

    fn right_bounds(&self, left: &T) -> Option<RangeBounds> {
        let end = self.end_a.call(left).range_key();
        Some((Bound::Unbounded, Bound::Excluded(end)))
    }

    fn left_bounds(&self, right: &B) -> Option<RangeBounds> {
        let end = (self.end_b)(right).range_key();
        Some((Bound::Unbounded, Bound::Excluded(end)))
    }

    #[inline]
    fn matches(&self, left: &T, right: &B) -> bool {
        self.start_a.call(left).range_key() < (self.end_b)(right).range_key()
            && (self.start_b)(right).range_key() < self.end_a.call(left).range_key()
    }
}
