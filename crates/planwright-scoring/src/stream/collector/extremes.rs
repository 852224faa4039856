//! Min and max collectors.
//!
//! Both keep a counted multiset of values, so retracting the current
//! extreme falls back to the next one.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::marker::PhantomData;

use super::{Accumulator, Collector};
use crate::stream::tuple::TupleFn;

/// Creates a collector yielding the smallest mapped value, or `None` for an
/// empty group.
pub fn min<V, F>(mapper: F) -> ExtremeCollector<F, V>
where
    V: Ord,
{
    ExtremeCollector {
        mapper,
        largest: false,
        _phantom: PhantomData,
    }
}

/// Creates a collector yielding the largest mapped value.
pub fn max<V, F>(mapper: F) -> ExtremeCollector<F, V>
where
    V: Ord,
{
    ExtremeCollector {
        mapper,
        largest: true,
        _phantom: PhantomData,
    }
}

pub struct ExtremeCollector<F, V> {
    mapper: F,
    largest: bool,
    _phantom: PhantomData<fn() -> V>,
}

impl<T, V, F> Collector<T> for ExtremeCollector<F, V>
where
    V: Ord + Clone + Debug + Send + Sync + 'static,
    F: TupleFn<T, V>,
{
    type Value = V;
    type Result = Option<V>;
    type Accumulator = ExtremeAccumulator<V>;

    fn extract(&self, tuple: &T) -> V {
        self.mapper.call(tuple)
    }

    fn create_accumulator(&self) -> Self::Accumulator {
        ExtremeAccumulator {
            values: BTreeMap::new(),
            largest: self.largest,
        }
    }
}

pub struct ExtremeAccumulator<V> {
    values: BTreeMap<V, usize>,
    largest: bool,
}

impl<V> Accumulator<V, Option<V>> for ExtremeAccumulator<V>
where
    V: Ord + Clone + Send + Sync,
{
    fn accumulate(&mut self, value: &V) {
        *self.values.entry(value.clone()).or_insert(0) += 1;
    }

    fn retract(&mut self, value: &V) {
        if let Some(count) = self.values.get_mut(value) {
            *count -= 1;
            if *count == 0 {
                self.values.remove(value);
            }
        }
    }

    fn finish(&self) -> Option<V> {
        let entry = if self.largest {
            self.values.last_key_value()
        } else {
            self.values.first_key_value()
        };
        entry.map(|(v, _)| v.clone())
    }

    fn reset(&mut self) {
        self.values.clear();
    }
}
