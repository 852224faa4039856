//! Join index: equality buckets, each holding a range-ordered map.

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;

use smallvec::SmallVec;

use super::TupleId;
use crate::stream::joiner::{IndexKey, RangeBounds};

type Slot = SmallVec<[TupleId; 4]>;

/// Index over one side of a join.
///
/// Rows without a range key share key `0`, so a join without range
/// joiners degenerates to a plain hash lookup.
#[derive(Debug, Default)]
pub struct JoinIndex {
    buckets: HashMap<u64, BTreeMap<i128, Slot>>,
    len: usize,
}

impl JoinIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: IndexKey, id: TupleId) {
        self.buckets
            .entry(key.bucket)
            .or_default()
            .entry(key.range.unwrap_or(0))
            .or_default()
            .push(id);
        self.len += 1;
    }

    /// Removes `id`; returns false when it was not indexed under `key`.
    pub fn remove(&mut self, key: IndexKey, id: TupleId) -> bool {
        let Some(bucket) = self.buckets.get_mut(&key.bucket) else {
            return false;
        };
        let range = key.range.unwrap_or(0);
        let Some(slot) = bucket.get_mut(&range) else {
            return false;
        };
        let Some(pos) = slot.iter().position(|x| *x == id) else {
            return false;
        };
        slot.swap_remove(pos);
        if slot.is_empty() {
            bucket.remove(&range);
            if bucket.is_empty() {
                self.buckets.remove(&key.bucket);
            }
        }
        self.len -= 1;
        true
    }

    /// Returns the rows in `bucket` whose range key lies within `bounds`.
    pub fn candidates(&self, bucket: u64, bounds: RangeBounds) -> Vec<TupleId> {
        let Some(ranges) = self.buckets.get(&bucket) else {
            return Vec::new();
        };
        if is_empty_range(&bounds) {
            return Vec::new();
        }
        ranges
            .range(bounds)
            .flat_map(|(_, slot)| slot.iter().copied())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
        self.len = 0;
    }
}

// BTreeMap::range panics on inverted bounds and on equal excluded bounds.
fn is_empty_range(bounds: &RangeBounds) -> bool {
    match bounds {
        (Bound::Included(s), Bound::Included(e)) => s > e,
        (Bound::Included(s), Bound::Excluded(e))
        | (Bound::Excluded(s), Bound::Included(e))
        | (Bound::Excluded(s), Bound::Excluded(e)) => s >= e,
        _ => false,
    }
}
