//! Joiners for constraint stream joins and semi-joins.
//!
//! A joiner decides which left rows match which right facts. Indexing
//! joiners (equality and comparisons) also describe how to index both sides,
//! so a join looks up candidates instead of scanning the cross-product.
//! Filtering joiners are plain predicates evaluated on indexed candidates.
//!
//! # Example
//!
//! ```
//! use planwright_scoring::stream::joiner::{equal_bi, filtering, JoinerList};
//!
//! #[derive(Clone, Debug)]
//! struct Shift { employee: usize, start: i64 }
//! #[derive(Clone, Debug)]
//! struct Employee { id: usize }
//!
//! let joiners = (
//!     equal_bi(|s: &Shift| s.employee, |e: &Employee| e.id),
//!     filtering(|s: &Shift, _e: &Employee| s.start >= 0),
//! );
//! assert!(JoinerList::<(Shift,), Employee>::validate(&joiners).is_ok());
//! ```

mod comparison;
mod equal;
mod filtering;
mod overlapping;

#[cfg(test)]
mod tests;

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::Hasher;
use std::ops::Bound;

use num_traits::PrimInt;
use planwright_core::{PlanwrightError, Result};

pub use comparison::{
    greater_than, greater_than_or_equal, less_than, less_than_or_equal, ComparisonJoiner,
};
pub use equal::{equal, equal_bi, EqualJoiner};
pub use filtering::{filtering, FilteringJoiner};
pub use overlapping::{overlapping, OverlappingJoiner};

/// Bounds of a range lookup in a join index.
pub type RangeBounds = (Bound<i128>, Bound<i128>);

/// Classification of a joiner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinerKind {
    Equal,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Overlapping,
    Filtering,
}

impl JoinerKind {
    /// Returns true for joiners that contribute to the join index.
    pub fn is_indexing(self) -> bool {
        !matches!(self, JoinerKind::Filtering)
    }

    /// Returns true for joiners that index by range.
    pub fn is_range(self) -> bool {
        !matches!(self, JoinerKind::Equal | JoinerKind::Filtering)
    }

    pub fn label(self) -> &'static str {
        match self {
            JoinerKind::Equal => "equal",
            JoinerKind::LessThan => "less_than",
            JoinerKind::LessThanOrEqual => "less_than_or_equal",
            JoinerKind::GreaterThan => "greater_than",
            JoinerKind::GreaterThanOrEqual => "greater_than_or_equal",
            JoinerKind::Overlapping => "overlapping",
            JoinerKind::Filtering => "filtering",
        }
    }
}

impl fmt::Display for JoinerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Values usable as range-index keys.
///
/// Implemented for every primitive integer. Map richer types (timestamps,
/// durations) to an integer in the joiner's key function.
///
/// The key must be strictly monotonic within one key type: distinct values
/// get distinct keys in the same order. Keys of different types are never
/// compared with each other.
///
/// ```
/// use planwright_scoring::stream::joiner::RangeValue;
///
/// assert!(u128::MAX.range_key() > (u128::MAX - 1).range_key());
/// assert_eq!((-3i32).range_key(), -3);
/// ```
pub trait RangeValue: Send + Sync {
    fn range_key(&self) -> i128;
}

impl<T: PrimInt + Send + Sync> RangeValue for T {
    #[inline]
    fn range_key(&self) -> i128 {
        match self.to_i128() {
            Some(key) if !is_u128::<T>() => key,
            // the full u128 range, shifted down by 2^127
            _ => (self.to_u128().unwrap_or_default() ^ (1 << 127)) as i128,
        }
    }
}

fn is_u128<T: PrimInt>() -> bool {
    T::min_value() == T::zero() && std::mem::size_of::<T>() == 16
}

/// A matching rule between a left tuple `T` and a right fact `B`.
pub trait Joiner<T, B>: Send + Sync {
    fn kind(&self) -> JoinerKind;

    /// Feeds the left side's equality key into the composite bucket hash.
    fn hash_left(&self, _left: &T, _state: &mut DefaultHasher) {}

    /// Feeds the right side's equality key into the composite bucket hash.
    fn hash_right(&self, _right: &B, _state: &mut DefaultHasher) {}

    /// Range key of the left side, for range joiners.
    fn range_left(&self, _left: &T) -> Option<i128> {
        None
    }

    /// Range key of the right side, for range joiners.
    fn range_right(&self, _right: &B) -> Option<i128> {
        None
    }

    /// Bounds on right range keys that can match `left`.
    fn right_bounds(&self, _left: &T) -> Option<RangeBounds> {
        None
    }

    /// Bounds on left range keys that can match `right`.
    fn left_bounds(&self, _right: &B) -> Option<RangeBounds> {
        None
    }

    fn matches(&self, left: &T, right: &B) -> bool;
}

/// Position of a row in a join index: equality bucket plus range key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexKey {
    pub bucket: u64,
    pub range: Option<i128>,
}

/// An ordered list of joiners, implemented for tuples of joiners.
///
/// Equality joiners hash into one composite bucket key; the first range
/// joiner supplies the range key. Every indexed candidate is re-verified
/// against all joiners.
pub trait JoinerList<T, B>: Send + Sync {
    fn kinds(&self) -> Vec<JoinerKind>;

    fn left_key(&self, left: &T) -> IndexKey;

    fn right_key(&self, right: &B) -> IndexKey;

    fn right_bounds(&self, left: &T) -> RangeBounds;

    fn left_bounds(&self, right: &B) -> RangeBounds;

    fn matches(&self, left: &T, right: &B) -> bool;

    /// Rejects an indexing joiner placed after a filtering joiner.
    fn validate(&self) -> Result<()> {
        let kinds = self.kinds();
        let Some(first_filter) = kinds.iter().position(|k| !k.is_indexing()) else {
            return Ok(());
        };
        match kinds
            .iter()
            .enumerate()
            .skip(first_filter + 1)
            .find(|(_, k)| k.is_indexing())
        {
            Some((position, kind)) => Err(PlanwrightError::Config(format!(
                "joiner at position {} ({}) is an indexing joiner after the filtering joiner \
                 at position {}; indexing joiners must come before filtering joiners",
                position, kind, first_filter
            ))),
            None => Ok(()),
        }
    }
}

const UNBOUNDED: RangeBounds = (Bound::Unbounded, Bound::Unbounded);

impl<T, B> JoinerList<T, B> for () {
    fn kinds(&self) -> Vec<JoinerKind> {
        Vec::new()
    }

    fn left_key(&self, _left: &T) -> IndexKey {
        IndexKey { bucket: DefaultHasher::new().finish(), range: None }
    }

    fn right_key(&self, _right: &B) -> IndexKey {
        IndexKey { bucket: DefaultHasher::new().finish(), range: None }
    }

    fn right_bounds(&self, _left: &T) -> RangeBounds {
        UNBOUNDED
    }

    fn left_bounds(&self, _right: &B) -> RangeBounds {
        UNBOUNDED
    }

    fn matches(&self, _left: &T, _right: &B) -> bool {
        true
    }
}

macro_rules! impl_joiner_list {
    ($($idx:tt: $J:ident),+) => {
        impl<T, B, $($J),+> JoinerList<T, B> for ($($J,)+)
        where
            $($J: Joiner<T, B>,)+
        {
            fn kinds(&self) -> Vec<JoinerKind> {
                vec![$(self.$idx.kind()),+]
            }

            fn left_key(&self, left: &T) -> IndexKey {
                let mut state = DefaultHasher::new();
                let mut range = None;
                $(
                    self.$idx.hash_left(left, &mut state);
                    if range.is_none() {
                        range = self.$idx.range_left(left);
                    }
                )+
                IndexKey { bucket: state.finish(), range }
            }

            fn right_key(&self, right: &B) -> IndexKey {
                let mut state = DefaultHasher::new();
                let mut range = None;
                $(
                    self.$idx.hash_right(right, &mut state);
                    if range.is_none() {
                        range = self.$idx.range_right(right);
                    }
                )+
                IndexKey { bucket: state.finish(), range }
            }

            fn right_bounds(&self, left: &T) -> RangeBounds {
                $(
                    if let Some(bounds) = self.$idx.right_bounds(left) {
                        return bounds;
                    }
                )+
                UNBOUNDED
            }

            fn left_bounds(&self, right: &B) -> RangeBounds {
                $(
                    if let Some(bounds) = self.$idx.left_bounds(right) {
                        return bounds;
                    }
                )+
                UNBOUNDED
            }

            #[inline]
            fn matches(&self, left: &T, right: &B) -> bool {
                $(self.$idx.matches(left, right))&&+
            }
        }
    };
}

impl_joiner_list!(0: J0);
impl_joiner_list!(0: J0, 1: J1);
impl_joiner_list!(0: J0, 1: J1, 2: J2);
impl_joiner_list!(0: J0, 1: J1, 2: J2, 3: J3);
impl_joiner_list!(0: J0, 1: J1, 2: J2, 3: J3, 4: J4);
impl_joiner_list!(0: J0, 1: J1, 2: J2, 3: J3, 4: J4, 5: J5);
