//! Sum collector over values mapped from each tuple.

use std::fmt::Debug;
use std::marker::PhantomData;
use std::ops::{AddAssign, SubAssign};

use super::{Accumulator, Collector};
use crate::stream::tuple::TupleFn;

/// Creates a collector summing a value mapped from each tuple. The mapper
/// takes one argument per tuple slot.
///
/// # Example
///
/// ```
/// use planwright_scoring::stream::collector::{sum, Accumulator, Collector};
///
/// #[derive(Clone, Debug)]
/// struct Shift { hours: i64 }
///
/// let collector = sum(|s: &Shift| s.hours);
/// let mut acc = Collector::<(Shift,)>::create_accumulator(&collector);
/// acc.accumulate(&Collector::<(Shift,)>::extract(&collector, &(Shift { hours: 8 },)));
/// acc.accumulate(&4);
/// acc.retract(&8);
/// assert_eq!(acc.finish(), 4);
/// ```
pub fn sum<V, F>(mapper: F) -> SumCollector<F, V>
where
    V: Default + Copy + AddAssign + SubAssign,
{
    SumCollector {
        mapper,
        _phantom: PhantomData,
    }
}

/// The mapper is stored once in the collector, not cloned into accumulators.
pub struct SumCollector<F, V> {
    mapper: F,
    _phantom: PhantomData<fn() -> V>,
}

impl<T, V, F> Collector<T> for SumCollector<F, V>
where
    V: Default + Copy + AddAssign + SubAssign + PartialEq + Debug + Send + Sync + 'static,
    F: TupleFn<T, V>,
{
    type Value = V;
    type Result = V;
    type Accumulator = SumAccumulator<V>;

    #[inline]
    fn extract(&self, tuple: &T) -> V {
        self.mapper.call(tuple)
    }

    fn create_accumulator(&self) -> Self::Accumulator {
        SumAccumulator { sum: V::default() }
    }
}

pub struct SumAccumulator<V> {
    sum: V,
}

impl<V> Accumulator<V, V> for SumAccumulator<V>
where
    V: Default + Copy + AddAssign + SubAssign + Send + Sync,
{
    #[inline]
    fn accumulate(&mut self, value: &V) {
        self.sum += *value;
    }

    #[inline]
    fn retract(&mut self, value: &V) {
        self.sum -= *value;
    }

    #[inline]
    fn finish(&self) -> V {
        self.sum
    }

    #[inline]
    fn reset(&mut self) {
        self.sum = V::default();
    }
}
