//! Comparison joiners backed by a range index.

use std::marker::PhantomData;
use std::ops::Bound;

use super::{Joiner, JoinerKind, RangeBounds, RangeValue};
use crate::stream::tuple::TupleFn;

/// Creates a joiner matching when `left(a) < right(b)`.
///
/// # Example
///
/// ```
/// use planwright_scoring::stream::joiner::{less_than, Joiner};
///
/// #[derive(Clone, Debug)]
/// struct Visit { id: u32 }
///
/// let ordered = less_than(|a: &Visit| a.id, |b: &Visit| b.id);
/// assert!(Joiner::<(Visit,), Visit>::matches(&ordered, &(Visit { id: 1 },), &Visit { id: 2 }));
/// assert!(!Joiner::<(Visit,), Visit>::matches(&ordered, &(Visit { id: 2 },), &Visit { id: 2 }));
/// ```
pub fn less_than<B, K, Fl, Fr>(left: Fl, right: Fr) -> ComparisonJoiner<Fl, Fr, K>
where
    K: RangeValue,
    Fr: Fn(&B) -> K + Send + Sync,
{
    ComparisonJoiner::new(JoinerKind::LessThan, left, right)
}

/// Creates a joiner matching when `left(a) <= right(b)`.
pub fn less_than_or_equal<B, K, Fl, Fr>(left: Fl, right: Fr) -> ComparisonJoiner<Fl, Fr, K>
where
    K: RangeValue,
    Fr: Fn(&B) -> K + Send + Sync,
{
    ComparisonJoiner::new(JoinerKind::LessThanOrEqual, left, right)
}

/// Creates a joiner matching when `left(a) > right(b)`.
pub fn greater_than<B, K, Fl, Fr>(left: Fl, right: Fr) -> ComparisonJoiner<Fl, Fr, K>
where
    K: RangeValue,
    Fr: Fn(&B) -> K + Send + Sync,
{
    ComparisonJoiner::new(JoinerKind::GreaterThan, left, right)
}

/// Creates a joiner matching when `left(a) >= right(b)`.
pub fn greater_than_or_equal<B, K, Fl, Fr>(left: Fl, right: Fr) -> ComparisonJoiner<Fl, Fr, K>
where
    K: RangeValue,
    Fr: Fn(&B) -> K + Send + Sync,
{
    ComparisonJoiner::new(JoinerKind::GreaterThanOrEqual, left, right)
}

/// Joiner comparing a left key with a right key.
///
/// Both sides are indexed by their key; a lookup from one side turns the
/// comparison into bounds on the other side's keys.
pub struct ComparisonJoiner<Fl, Fr, K> {
    kind: JoinerKind,
    left: Fl,
    right: Fr,
    _phantom: PhantomData<fn() -> K>,
}

impl<Fl, Fr, K> ComparisonJoiner<Fl, Fr, K> {
    fn new(kind: JoinerKind, left: Fl, right: Fr) -> Self {
        Self {
            kind,
            left,
            right,
            _phantom: PhantomData,
        }
    }

    fn compare(&self, left: i128, right: i128) -> bool {
        match self.kind {
            JoinerKind::LessThan => left < right,
            JoinerKind::LessThanOrEqual => left <= right,
            JoinerKind::GreaterThan => left > right,
            JoinerKind::GreaterThanOrEqual => left >= right,
            _ => false,
        }
    }
}

impl<T, B, K, Fl, Fr> Joiner<T, B> for ComparisonJoiner<Fl, Fr, K>
where
    K: RangeValue,
    Fl: TupleFn<T, K>,
    Fr: Fn(&B) -> K + Send + Sync,
{
    fn kind(&self) -> JoinerKind {
        self.kind
    }

    fn range_left(&self, left: &T) -> Option<i128> {
        Some(self.left.call(left).range_key())
    }

    fn range_right(&self, right: &B) -> Option<i128> {
        Some((self.right)(right).range_key())
    }

    fn right_bounds(&self, left: &T) -> Option<RangeBounds> {
        let key = self.left.call(left).range_key();
        Some(match self.kind {
            JoinerKind::LessThan => (Bound::Excluded(key), Bound::Unbounded),
            JoinerKind::LessThanOrEqual => (Bound::Included(key), Bound::Unbounded),
            JoinerKind::GreaterThan => (Bound::Unbounded, Bound::Excluded(key)),
            _ => (Bound::Unbounded, Bound::Included(key)),
        })
    }

    fn left_bounds(&self, right: &B) -> Option<RangeBounds> {
        let key = (self.right)(right).range_key();
        Some(match self.kind {
            JoinerKind::LessThan => (Bound::Unbounded, Bound::Excluded(key)),
            JoinerKind::LessThanOrEqual => (Bound::Unbounded, Bound::Included(key)),
            JoinerKind::GreaterThan => (Bound::Excluded(key), Bound::Unbounded),
            _ => (Bound::Included(key), Bound::Unbounded),
        })
    }

    #[inline]
    fn matches(&self, left: &T, right: &B) -> bool {
        self.compare(self.left.call(left).range_key(), (self.right)(right).range_key())
    }
}
