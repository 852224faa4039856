//! Count collector.

use super::{Accumulator, Collector};

/// Counts the tuples of a group.
///
/// # Example
///
/// ```
/// use planwright_scoring::stream::collector::{count, Accumulator, Collector};
///
/// let mut acc = Collector::<(i32,)>::create_accumulator(&count());
/// acc.accumulate(&());
/// acc.accumulate(&());
/// acc.retract(&());
/// assert_eq!(acc.finish(), 1);
/// ```
pub fn count() -> CountCollector {
    CountCollector
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CountCollector;

impl<T> Collector<T> for CountCollector {
    type Value = ();
    type Result = usize;
    type Accumulator = CountAccumulator;

    fn extract(&self, _tuple: &T) {}

    fn create_accumulator(&self) -> CountAccumulator {
        CountAccumulator(0)
    }
}

#[derive(Debug, Default)]
pub struct CountAccumulator(usize);

impl Accumulator<(), usize> for CountAccumulator {
    fn accumulate(&mut self, _: &()) {
        self.0 += 1;
    }

    fn retract(&mut self, _: &()) {
        debug_assert!(self.0 > 0, "count retracted below zero");
        self.0 = self.0.saturating_sub(1);
    }

    fn finish(&self) -> usize {
        self.0
    }

    fn reset(&mut self) {
        self.0 = 0;
    }
}
