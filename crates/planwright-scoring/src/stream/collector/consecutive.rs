//! Consecutive-sequence collector.
//!
//! Maps each tuple to an integer position and reports the runs of
//! consecutive positions together with the gaps between them.

use std::collections::BTreeMap;

use super::{Accumulator, Collector};
use crate::stream::tuple::TupleFn;

/// Creates a collector grouping mapped positions into consecutive runs.
///
/// # Example
///
/// ```
/// use planwright_scoring::stream::collector::{consecutive_sequences, Accumulator, Collector};
///
/// let collector = consecutive_sequences(|day: &i64| *day);
/// let mut acc = Collector::<(i64,)>::create_accumulator(&collector);
/// for day in [1, 2, 3, 7, 8] {
///     acc.accumulate(&day);
/// }
///
/// let chain = acc.finish();
/// assert_eq!(chain.sequences().len(), 2);
/// assert_eq!(chain.breaks()[0].length(), 4);
/// ```
pub fn consecutive_sequences<F>(position: F) -> ConsecutiveCollector<F> {
    ConsecutiveCollector { position }
}

pub struct ConsecutiveCollector<F> {
    position: F,
}

impl<T, F> Collector<T> for ConsecutiveCollector<F>
where
    F: TupleFn<T, i64>,
{
    type Value = i64;
    type Result = SequenceChain;
    type Accumulator = ConsecutiveAccumulator;

    fn extract(&self, tuple: &T) -> i64 {
        self.position.call(tuple)
    }

    fn create_accumulator(&self) -> Self::Accumulator {
        ConsecutiveAccumulator {
            positions: BTreeMap::new(),
        }
    }
}

/// A run of consecutive positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sequence {
    pub first: i64,
    pub last: i64,
    /// Number of items in the run, counting repeated positions.
    pub count: usize,
}

impl Sequence {
    /// Number of distinct positions covered.
    pub fn length(&self) -> i64 {
        self.last - self.first + 1
    }
}

/// Gap between two neighbouring runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Break {
    pub previous_last: i64,
    pub next_first: i64,
}

impl Break {
    /// Distance from the end of one run to the start of the next.
    pub fn length(&self) -> i64 {
        self.next_first - self.previous_last
    }
}

/// Result of [`consecutive_sequences`]: ordered runs and the breaks
/// between them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceChain {
    sequences: Vec<Sequence>,
}

impl SequenceChain {
    pub fn sequences(&self) -> &[Sequence] {
        &self.sequences
    }

    pub fn breaks(&self) -> Vec<Break> {
        self.sequences
            .windows(2)
            .map(|pair| Break {
                previous_last: pair[0].last,
                next_first: pair[1].first,
            })
            .collect()
    }

    pub fn first_sequence(&self) -> Option<&Sequence> {
        self.sequences.first()
    }

    pub fn last_sequence(&self) -> Option<&Sequence> {
        self.sequences.last()
    }
}

/// Counted positions; runs are derived on `finish`.
pub struct ConsecutiveAccumulator {
    positions: BTreeMap<i64, usize>,
}

impl Accumulator<i64, SequenceChain> for ConsecutiveAccumulator {
    fn accumulate(&mut self, value: &i64) {
        *self.positions.entry(*value).or_insert(0) += 1;
    }

    fn retract(&mut self, value: &i64) {
        if let Some(count) = self.positions.get_mut(value) {
            *count -= 1;
            if *count == 0 {
                self.positions.remove(value);
            }
        }
    }

    fn finish(&self) -> SequenceChain {
        let mut sequences: Vec<Sequence> = Vec::new();
        for (&position, &count) in &self.positions {
            match sequences.last_mut() {
                Some(run) if run.last.checked_add(1) == Some(position) => {
                    run.last = position;
                    run.count += count;
                }
                _ => sequences.push(Sequence {
                    first: position,
                    last: position,
                    count,
                }),
            }
        }
        SequenceChain { sequences }
    }

    fn reset(&mut self) {
        self.positions.clear();
    }
}
