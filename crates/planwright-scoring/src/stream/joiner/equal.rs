//! Equal joiner: hash-indexed matching on key equality.

use std::collections::hash_map::DefaultHasher;
use std::hash::Hash;
use std::marker::PhantomData;

use super::{Joiner, JoinerKind};
use crate::stream::tuple::TupleFn;

/// Creates a joiner matching when both sides share a key, with one key
/// function used on both sides of a uni-stream self-join.
///
/// # Example
///
/// ```
/// use planwright_scoring::stream::joiner::{equal, Joiner};
///
/// #[derive(Clone, Debug)]
/// struct Shift { employee: Option<usize>, start: i64 }
///
/// let same_employee = equal(|s: &Shift| s.employee);
///
/// let a = Shift { employee: Some(5), start: 0 };
/// let b = Shift { employee: Some(5), start: 8 };
/// let c = Shift { employee: Some(3), start: 16 };
///
/// assert!(Joiner::<(Shift,), Shift>::matches(&same_employee, &(a.clone(),), &b));
/// assert!(!Joiner::<(Shift,), Shift>::matches(&same_employee, &(a,), &c));
/// ```
pub fn equal<A, K, F>(key: F) -> EqualJoiner<F, F, K>
where
    K: Hash + Eq,
    F: Fn(&A) -> K + Clone + Send + Sync,
{
    EqualJoiner {
        left: key.clone(),
        right: key,
        _phantom: PhantomData,
    }
}

/// Creates a joiner matching when the left tuple's key equals the right
/// fact's key. The left function takes one argument per tuple slot.
///
/// # Example
///
/// ```
/// use planwright_scoring::stream::joiner::{equal_bi, Joiner};
///
/// #[derive(Clone, Debug)]
/// struct Employee { id: usize }
/// #[derive(Clone, Debug)]
/// struct Task { assigned_to: usize }
///
/// let by_id = equal_bi(|e: &Employee| e.id, |t: &Task| t.assigned_to);
///
/// let emp = (Employee { id: 5 },);
/// let matches = |t: &Task| Joiner::<(Employee,), Task>::matches(&by_id, &emp, t);
/// assert!(matches(&Task { assigned_to: 5 }));
/// assert!(!matches(&Task { assigned_to: 3 }));
/// ```
pub fn equal_bi<B, K, Fl, Fr>(left: Fl, right: Fr) -> EqualJoiner<Fl, Fr, K>
where
    K: Hash + Eq,
    Fr: Fn(&B) -> K + Send + Sync,
{
    EqualJoiner {
        left,
        right,
        _phantom: PhantomData,
    }
}

/// Joiner matching on equal keys; both keys feed the composite bucket hash.
pub struct EqualJoiner<Fl, Fr, K> {
    left: Fl,
    right: Fr,
    _phantom: PhantomData<fn() -> K>,
}

impl<T, B, K, Fl, Fr> Joiner<T, B> for EqualJoiner<Fl, Fr, K>
where
    K: Hash + Eq,
    Fl: TupleFn<T, K>,
    Fr: Fn(&B) -> K + Send + Sync,
{
    fn kind(&self) -> JoinerKind {
        JoinerKind::Equal
    }

    fn hash_left(&self, left: &T, state: &mut DefaultHasher) {
        self.left.call(left).hash(state);
    }

    fn hash_right(&self, right: &B, state: &mut DefaultHasher) {
        (self.right)(right).hash(state);
    }

    #[inline]
    fn matches(&self, left: &T, right: &B) -> bool {
        self.left.call(left) == (self.right)(right)
    }
}
