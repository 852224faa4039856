//! To-list collector.

use std::fmt::Debug;
use std::marker::PhantomData;

use super::{Accumulator, Collector};
use crate::stream::tuple::TupleFn;

/// Creates a collector gathering mapped values in insertion order.
///
/// Retraction removes the first equal value, so duplicates are kept as
/// many times as they were inserted.
pub fn to_list<V, F>(mapper: F) -> ListCollector<F, V>
where
    V: PartialEq,
{
    ListCollector {
        mapper,
        _phantom: PhantomData,
    }
}

pub struct ListCollector<F, V> {
    mapper: F,
    _phantom: PhantomData<fn() -> V>,
}

impl<T, V, F> Collector<T> for ListCollector<F, V>
where
    V: PartialEq + Clone + Debug + Send + Sync + 'static,
    F: TupleFn<T, V>,
{
    type Value = V;
    type Result = Vec<V>;
    type Accumulator = ListAccumulator<V>;

    fn extract(&self, tuple: &T) -> V {
        self.mapper.call(tuple)
    }

    fn create_accumulator(&self) -> Self::Accumulator {
        ListAccumulator { items: Vec::new() }
    }
}

pub struct ListAccumulator<V> {
    items: Vec<V>,
}

impl<V> Accumulator<V, Vec<V>> for ListAccumulator<V>
where
    V: PartialEq + Clone + Send + Sync,
{
    fn accumulate(&mut self, value: &V) {
        self.items.push(value.clone());
    }

    fn retract(&mut self, value: &V) {
        if let Some(pos) = self.items.iter().position(|v| v == value) {
            self.items.remove(pos);
        }
    }

    fn finish(&self) -> Vec<V> {
        self.items.clone()
    }

    fn reset(&mut self) {
        self.items.clear();
    }
}
