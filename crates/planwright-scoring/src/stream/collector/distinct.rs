//! Count-distinct collector.

use std::collections::HashMap;
use std::hash::Hash;
use std::marker::PhantomData;

use super::{Accumulator, Collector};
use crate::stream::tuple::TupleFn;

/// Creates a collector counting distinct values mapped from each tuple.
pub fn count_distinct<V, F>(mapper: F) -> CountDistinctCollector<F, V>
where
    V: Eq + Hash,
{
    CountDistinctCollector {
        mapper,
        _phantom: PhantomData,
    }
}

pub struct CountDistinctCollector<F, V> {
    mapper: F,
    _phantom: PhantomData<fn() -> V>,
}

impl<T, V, F> Collector<T> for CountDistinctCollector<F, V>
where
    V: Eq + Hash + Clone + Send + Sync,
    F: TupleFn<T, V>,
{
    type Value = V;
    type Result = usize;
    type Accumulator = DistinctAccumulator<V>;

    fn extract(&self, tuple: &T) -> V {
        self.mapper.call(tuple)
    }

    fn create_accumulator(&self) -> Self::Accumulator {
        DistinctAccumulator {
            counts: HashMap::new(),
        }
    }
}

/// Reference-counted set of values.
pub struct DistinctAccumulator<V> {
    counts: HashMap<V, usize>,
}

impl<V> Accumulator<V, usize> for DistinctAccumulator<V>
where
    V: Eq + Hash + Clone + Send + Sync,
{
    fn accumulate(&mut self, value: &V) {
        *self.counts.entry(value.clone()).or_insert(0) += 1;
    }

    fn retract(&mut self, value: &V) {
        if let Some(count) = self.counts.get_mut(value) {
            *count -= 1;
            if *count == 0 {
                self.counts.remove(value);
            }
        }
    }

    fn finish(&self) -> usize {
        self.counts.len()
    }

    fn reset(&mut self) {
        self.counts.clear();
    }
}
