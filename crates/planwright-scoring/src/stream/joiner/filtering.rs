//! Filtering joiner for predicates no index can serve.

use super::{Joiner, JoinerKind};
use crate::stream::tuple::JoinFn;

/// Creates a joiner from a predicate over the left facts and the right fact.
///
/// Filtering joiners only narrow indexed candidates, so they must come
/// after every indexing joiner in a joiner list.
///
/// # Example
///
/// ```
/// use planwright_scoring::stream::joiner::{filtering, Joiner};
///
/// #[derive(Clone, Debug)]
/// struct Task { priority: i32 }
///
/// let higher = filtering(|a: &Task, b: &Task| a.priority > b.priority);
/// let urgent = (Task { priority: 10 },);
/// assert!(Joiner::<(Task,), Task>::matches(&higher, &urgent, &Task { priority: 5 }));
/// ```
pub fn filtering<F>(predicate: F) -> FilteringJoiner<F> {
    FilteringJoiner { predicate }
}

pub struct FilteringJoiner<F> {
    predicate: F,
}

impl<T, B, F> Joiner<T, B> for FilteringJoiner<F>
where
    F: JoinFn<T, B, bool>,
{
    fn kind(&self) -> JoinerKind {
        JoinerKind::Filtering
    }

    #[inline]
    fn matches(&self, left: &T, right: &B) -> bool {
        self.predicate.call(left, right)
    }
}
