//! Inverse listeners for basic and chained source variables.

use super::traits::VariableListener;
use crate::domain::descriptor::{
    BasicAccessor, CollectionAccessor, SlotAccessor, SolutionDescriptor,
};
use crate::domain::handle::{EntityHandle, ValueRef, VariableId};
use crate::error::{PlanwrightError, Result};

/// Maintains a singleton inverse shadow: the holder's slot names the one
/// source entity whose chained variable points at the holder.
///
/// Only values that are entities of the holder class are handled, so a
/// chained source with anchors and visits registers one listener per
/// holder class.
pub struct SingletonInverseListener<S> {
    shadow: VariableId,
    source: VariableId,
    source_access: BasicAccessor<S>,
    slot: SlotAccessor<S>,
}

impl<S> SingletonInverseListener<S> {
    pub fn new(
        shadow: VariableId,
        source: VariableId,
        source_access: BasicAccessor<S>,
        slot: SlotAccessor<S>,
    ) -> Self {
        Self {
            shadow,
            source,
            source_access,
            slot,
        }
    }

    pub fn shadow(&self) -> VariableId {
        self.shadow
    }

    fn holder(&self, solution: &S, entity: usize) -> Option<usize> {
        (self.source_access.get)(solution, entity)
            .and_then(|v| v.entity_index_in(self.shadow.entity))
    }
}

impl<S> VariableListener<S> for SingletonInverseListener<S> {
    fn before_variable_changed(
        &mut self,
        solution: &mut S,
        entity: usize,
        touched: &mut Vec<EntityHandle>,
    ) -> Result<()> {
        let Some(holder) = self.holder(solution, entity) else {
            return Ok(());
        };
        let current = (self.slot.get)(solution, holder);
        if current != Some(entity) {
            return Err(PlanwrightError::StateCorruption(format!(
                "Singleton inverse {:?} of holder ({}) is {:?} while retracting source entity ({})",
                self.shadow, holder, current, entity
            )));
        }
        (self.slot.set)(solution, holder, None);
        touched.push(self.shadow.handle(holder));
        Ok(())
    }

    fn after_variable_changed(
        &mut self,
        solution: &mut S,
        entity: usize,
        touched: &mut Vec<EntityHandle>,
    ) -> Result<()> {
        let Some(holder) = self.holder(solution, entity) else {
            return Ok(());
        };
        if let Some(existing) = (self.slot.get)(solution, holder) {
            return Err(PlanwrightError::StateCorruption(format!(
                "Singleton inverse {:?} of holder ({}) already names entity ({}) while inserting \
                 entity ({})",
                self.shadow, holder, existing, entity
            )));
        }
        (self.slot.set)(solution, holder, Some(entity));
        touched.push(self.shadow.handle(holder));
        Ok(())
    }

    fn reset_working_solution(
        &mut self,
        descriptor: &SolutionDescriptor<S>,
        solution: &mut S,
    ) -> Result<()> {
        for holder in 0..descriptor.entity_count(solution, self.shadow.entity) {
            (self.slot.set)(solution, holder, None);
        }
        let mut touched = Vec::new();
        for entity in 0..descriptor.entity_count(solution, self.source.entity) {
            self.after_variable_changed(solution, entity, &mut touched)?;
        }
        Ok(())
    }

    fn assert_not_stale(&self, descriptor: &SolutionDescriptor<S>, solution: &S) -> Result<()> {
        let mut expected = vec![None; descriptor.entity_count(solution, self.shadow.entity)];
        for entity in 0..descriptor.entity_count(solution, self.source.entity) {
            if let Some(slot) = self.holder(solution, entity).and_then(|h| expected.get_mut(h)) {
                *slot = Some(entity);
            }
        }
        for (holder, expected) in expected.into_iter().enumerate() {
            let actual = (self.slot.get)(solution, holder);
            if actual != expected {
                return Err(stale(descriptor, self.shadow, holder, &expected, &actual));
            }
        }
        Ok(())
    }
}

/// Maintains a collection inverse shadow: the holder's collection lists
/// every source entity whose basic variable points at the holder.
pub struct CollectionInverseListener<S> {
    shadow: VariableId,
    source: VariableId,
    source_access: BasicAccessor<S>,
    collection: CollectionAccessor<S>,
}

impl<S> CollectionInverseListener<S> {
    pub fn new(
        shadow: VariableId,
        source: VariableId,
        source_access: BasicAccessor<S>,
        collection: CollectionAccessor<S>,
    ) -> Self {
        Self {
            shadow,
            source,
            source_access,
            collection,
        }
    }

    pub fn shadow(&self) -> VariableId {
        self.shadow
    }

    fn holder(&self, solution: &S, entity: usize) -> Option<usize> {
        (self.source_access.get)(solution, entity)
            .and_then(|v: ValueRef| v.entity_index_in(self.shadow.entity))
    }

    fn missing_collection(&self, holder: usize) -> PlanwrightError {
        PlanwrightError::StateCorruption(format!(
            "Collection inverse {:?} of holder ({}) has no collection",
            self.shadow, holder
        ))
    }
}

impl<S> VariableListener<S> for CollectionInverseListener<S> {
    fn before_variable_changed(
        &mut self,
        solution: &mut S,
        entity: usize,
        touched: &mut Vec<EntityHandle>,
    ) -> Result<()> {
        let Some(holder) = self.holder(solution, entity) else {
            return Ok(());
        };
        let entities = (self.collection.slot)(solution, holder)
            .as_mut()
            .ok_or_else(|| self.missing_collection(holder))?;
        let Some(position) = entities.iter().position(|&e| e == entity) else {
            return Err(PlanwrightError::StateCorruption(format!(
                "Collection inverse {:?} of holder ({}) does not contain entity ({}) while \
                 retracting it",
                self.shadow, holder, entity
            )));
        };
        entities.remove(position);
        touched.push(self.shadow.handle(holder));
        Ok(())
    }

    fn after_variable_changed(
        &mut self,
        solution: &mut S,
        entity: usize,
        touched: &mut Vec<EntityHandle>,
    ) -> Result<()> {
        let Some(holder) = self.holder(solution, entity) else {
            return Ok(());
        };
        let entities = (self.collection.slot)(solution, holder)
            .as_mut()
            .ok_or_else(|| self.missing_collection(holder))?;
        if entities.contains(&entity) {
            return Err(PlanwrightError::StateCorruption(format!(
                "Collection inverse {:?} of holder ({}) already contains entity ({}) while \
                 inserting it",
                self.shadow, holder, entity
            )));
        }
        entities.push(entity);
        touched.push(self.shadow.handle(holder));
        Ok(())
    }

    fn reset_working_solution(
        &mut self,
        descriptor: &SolutionDescriptor<S>,
        solution: &mut S,
    ) -> Result<()> {
        for holder in 0..descriptor.entity_count(solution, self.shadow.entity) {
            (self.collection.slot)(solution, holder)
                .as_mut()
                .ok_or_else(|| self.missing_collection(holder))?
                .clear();
        }
        let mut touched = Vec::new();
        for entity in 0..descriptor.entity_count(solution, self.source.entity) {
            self.after_variable_changed(solution, entity, &mut touched)?;
        }
        Ok(())
    }

    fn assert_not_stale(&self, descriptor: &SolutionDescriptor<S>, solution: &S) -> Result<()> {
        let mut expected = vec![Vec::new(); descriptor.entity_count(solution, self.shadow.entity)];
        for entity in 0..descriptor.entity_count(solution, self.source.entity) {
            let holder = self.holder(solution, entity);
            if let Some(entities) = holder.and_then(|h| expected.get_mut(h)) {
                entities.push(entity);
            }
        }
        for (holder, expected) in expected.into_iter().enumerate() {
            let mut actual = (self.collection.get)(solution, holder).map(<[usize]>::to_vec);
            if let Some(actual) = actual.as_mut() {
                actual.sort_unstable();
            }
            if actual.as_ref() != Some(&expected) {
                return Err(stale(descriptor, self.shadow, holder, &Some(expected), &actual));
            }
        }
        Ok(())
    }
}

pub(super) fn stale<S, T: std::fmt::Debug>(
    descriptor: &SolutionDescriptor<S>,
    shadow: VariableId,
    entity: usize,
    expected: &T,
    actual: &T,
) -> PlanwrightError {
    PlanwrightError::StateCorruption(format!(
        "Shadow variable ({}) of entity ({}) is stale: expected {:?} but found {:?}",
        descriptor.variable_name(shadow),
        shadow.handle(entity),
        expected,
        actual
    ))
}
