//! Externalized inverse supplies for basic and chained variables.
//!
//! Both supplies are plain maps keyed by [`ValueRef`]. The manager feeds them
//! the value an entity points at before and after each change, so neither
//! ever reads the working solution itself.

use std::collections::{BTreeSet, HashMap};

use crate::domain::handle::ValueRef;
use crate::error::{PlanwrightError, Result};

/// Answers "which single entity points at this value?" for a chained
/// variable, where at most one entity may point at any value.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SingletonInverseSupply {
    inverse: HashMap<ValueRef, usize>,
}

impl SingletonInverseSupply {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entity index pointing at `value`, if any.
    #[inline]
    pub fn get(&self, value: &ValueRef) -> Option<usize> {
        self.inverse.get(value).copied()
    }

    /// Records that `entity` now points at `value`.
    ///
    /// # Errors
    ///
    /// Fails with `StateCorruption` if another entity already points there.
    pub fn insert(&mut self, value: ValueRef, entity: usize) -> Result<()> {
        if let Some(existing) = self.inverse.insert(value, entity) {
            return Err(PlanwrightError::StateCorruption(format!(
                "Singleton inverse for value ({}) already holds entity ({}) while inserting \
                 entity ({})",
                value, existing, entity
            )));
        }
        Ok(())
    }

    /// Removes the record that `entity` points at `value`.
    ///
    /// # Errors
    ///
    /// Fails with `StateCorruption` if the record does not name `entity`.
    pub fn retract(&mut self, value: ValueRef, entity: usize) -> Result<()> {
        match self.inverse.remove(&value) {
            Some(existing) if existing == entity => Ok(()),
            other => Err(PlanwrightError::StateCorruption(format!(
                "Singleton inverse for value ({}) holds {:?} while retracting entity ({})",
                value, other, entity
            ))),
        }
    }

    pub fn clear(&mut self) {
        self.inverse.clear();
    }

    pub fn len(&self) -> usize {
        self.inverse.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inverse.is_empty()
    }
}

/// Answers "which entities point at this value?" for a basic variable.
///
/// Entity sets are ordered so that lookups are deterministic.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CollectionInverseSupply {
    inverse: HashMap<ValueRef, BTreeSet<usize>>,
}

impl CollectionInverseSupply {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entity indices pointing at `value`, in ascending order.
    pub fn get(&self, value: &ValueRef) -> Vec<usize> {
        self.inverse
            .get(value)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Number of entities pointing at `value`.
    pub fn count(&self, value: &ValueRef) -> usize {
        self.inverse.get(value).map_or(0, BTreeSet::len)
    }

    /// # Errors
    ///
    /// Fails with `StateCorruption` if `entity` is already recorded.
    pub fn insert(&mut self, value: ValueRef, entity: usize) -> Result<()> {
        if !self.inverse.entry(value).or_default().insert(entity) {
            return Err(PlanwrightError::StateCorruption(format!(
                "Collection inverse for value ({}) already contains entity ({})",
                value, entity
            )));
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Fails with `StateCorruption` if `entity` is not recorded.
    pub fn retract(&mut self, value: ValueRef, entity: usize) -> Result<()> {
        let removed = match self.inverse.get_mut(&value) {
            Some(set) => {
                let removed = set.remove(&entity);
                if set.is_empty() {
                    self.inverse.remove(&value);
                }
                removed
            }
            None => false,
        };
        if !removed {
            return Err(PlanwrightError::StateCorruption(format!(
                "Collection inverse for value ({}) does not contain entity ({})",
                value, entity
            )));
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.inverse.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.inverse.is_empty()
    }
}
