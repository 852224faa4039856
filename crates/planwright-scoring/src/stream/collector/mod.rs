// Collectors for grouping and aggregating tuples.
//
// A collector extracts one value per incoming tuple and folds it into an
// accumulator that supports both insertion and retraction, so a group's
// result follows every change without being rebuilt.

mod consecutive;
mod count;
mod distinct;
mod extremes;
mod list;
mod sum;

#[cfg(test)]
mod tests;

use std::fmt::Debug;

pub use consecutive::{consecutive_sequences, Break, ConsecutiveCollector, Sequence, SequenceChain};
pub use count::{count, CountAccumulator, CountCollector};
pub use distinct::{count_distinct, CountDistinctCollector, DistinctAccumulator};
pub use extremes::{max, min, ExtremeAccumulator, ExtremeCollector};
pub use list::{to_list, ListAccumulator, ListCollector};
pub use sum::{sum, SumAccumulator, SumCollector};

/// Aggregates the tuples `T` of one group into a result.
pub trait Collector<T>: Send + Sync {
    /// Value extracted from one tuple and kept for its retraction.
    type Value: Clone + Send + Sync;
    type Result: Clone + PartialEq + Debug + Send + Sync + 'static;
    type Accumulator: Accumulator<Self::Value, Self::Result>;

    fn extract(&self, tuple: &T) -> Self::Value;

    fn create_accumulator(&self) -> Self::Accumulator;
}

/// Incremental fold over extracted values.
pub trait Accumulator<V, R>: Send + Sync {
    fn accumulate(&mut self, value: &V);

    /// Removes a value previously accumulated.
    fn retract(&mut self, value: &V);

    fn finish(&self) -> R;

    fn reset(&mut self);
}
