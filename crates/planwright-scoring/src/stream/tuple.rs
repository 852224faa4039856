// Tuples flowing through the constraint-stream network.
//
// Plain Rust tuples `(A,)` through `(A, B, C, D, E)` are the stream rows.
// Every element is an owned clone of a fact, so a node can retract a row
// without reading the working solution again.

use std::fmt::Debug;

use crate::api::analysis::EntityRef;

/// Anything that can sit in a tuple slot.
pub trait Element: Clone + Debug + Send + Sync + 'static {}

impl<T: Clone + Debug + Send + Sync + 'static> Element for T {}

/// A row of one to five facts.
pub trait Tuple: Clone + Debug + Send + Sync + 'static {
    /// Number of facts in the row.
    const ARITY: usize;

    /// Returns one entity reference per fact, in slot order.
    fn justification(&self) -> Vec<EntityRef>;
}

/// Extends a tuple by one fact, as a join does.
pub trait Append<X>: Tuple {
    type Output: Tuple;

    fn append(self, x: X) -> Self::Output;
}

/// A function over the facts of a tuple, taking one argument per slot.
///
/// Closures `Fn(&A) -> R`, `Fn(&A, &B) -> R` and so on implement this for
/// the matching tuple arity, so stream operations accept the same closures
/// regardless of how many facts a row carries.
pub trait TupleFn<T, R>: Send + Sync {
    fn call(&self, tuple: &T) -> R;
}

/// A function over a left tuple plus one right fact, taking one argument
/// per slot followed by the fact.
pub trait JoinFn<T, X, R>: Send + Sync {
    fn call(&self, tuple: &T, fact: &X) -> R;
}

macro_rules! impl_tuple {
    ($arity:expr; $($idx:tt: $T:ident),+) => {
        impl<$($T: Element),+> Tuple for ($($T,)+) {
            const ARITY: usize = $arity;

            fn justification(&self) -> Vec<EntityRef> {
                vec![$(EntityRef::new(&self.$idx)),+]
            }
        }

        impl<Func, Ret, $($T),+> TupleFn<($($T,)+), Ret> for Func
        where
            Func: Fn($(&$T),+) -> Ret + Send + Sync,
        {
            #[inline]
            fn call(&self, tuple: &($($T,)+)) -> Ret {
                self($(&tuple.$idx),+)
            }
        }

        impl<Func, Ret, X, $($T),+> JoinFn<($($T,)+), X, Ret> for Func
        where
            Func: Fn($(&$T,)+ &X) -> Ret + Send + Sync,
        {
            #[inline]
            fn call(&self, tuple: &($($T,)+), fact: &X) -> Ret {
                self($(&tuple.$idx,)+ fact)
            }
        }
    };
}

impl_tuple!(1; 0: A);
impl_tuple!(2; 0: A, 1: B);
impl_tuple!(3; 0: A, 1: B, 2: C);
impl_tuple!(4; 0: A, 1: B, 2: C, 3: D);
impl_tuple!(5; 0: A, 1: B, 2: C, 3: D, 4: E);

macro_rules! impl_append {
    ($($idx:tt: $T:ident),+) => {
        impl<X: Element, $($T: Element),+> Append<X> for ($($T,)+) {
            type Output = ($($T,)+ X);

            #[inline]
            fn append(self, x: X) -> Self::Output {
                ($(self.$idx,)+ x)
            }
        }
    };
}

impl_append!(0: A);
impl_append!(0: A, 1: B);
impl_append!(0: A, 1: B, 2: C);
impl_append!(0: A, 1: B, 2: C, 3: D);

/// Weigher giving every match an impact of one.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitWeight;

impl<T> TupleFn<T, i64> for UnitWeight {
    #[inline]
    fn call(&self, _tuple: &T) -> i64 {
        1
    }
}

/// Group key putting every row into one global group.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalKey;

impl<T> TupleFn<T, ()> for GlobalKey {
    #[inline]
    fn call(&self, _tuple: &T) {}
}
