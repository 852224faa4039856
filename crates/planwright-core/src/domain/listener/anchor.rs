//! Anchor listener for chained source variables.

use super::inverse::stale;
use super::traits::VariableListener;
use crate::domain::descriptor::{BasicAccessor, SlotAccessor, SolutionDescriptor};
use crate::domain::handle::{EntityHandle, ValueRef, VariableId};
use crate::error::{PlanwrightError, Result};

/// Maintains an anchor shadow: each entity of a chained class names the
/// anchor its chain starts from.
///
/// The anchor is the first value up the chain that is not an entity of
/// the chained class; its index is stored whether it is a fact or an
/// entity of another class. An unassigned link leaves the anchor empty.
///
/// Moving one entity changes the anchor of every entity trailing it, so
/// each after-event rewrites the whole downstream part of the chain.
pub struct AnchorListener<S> {
    shadow: VariableId,
    source_access: BasicAccessor<S>,
    slot: SlotAccessor<S>,
    count: fn(&S) -> usize,
}

impl<S> AnchorListener<S> {
    pub fn new(
        shadow: VariableId,
        source_access: BasicAccessor<S>,
        slot: SlotAccessor<S>,
        count: fn(&S) -> usize,
    ) -> Self {
        Self {
            shadow,
            source_access,
            slot,
            count,
        }
    }

    pub fn shadow(&self) -> VariableId {
        self.shadow
    }

    /// Walks up the chain from `entity` to its anchor.
    fn resolve(&self, solution: &S, entity: usize) -> Result<Option<usize>> {
        let limit = (self.count)(solution);
        let mut current = entity;
        for _ in 0..=limit {
            let Some(value) = (self.source_access.get)(solution, current) else {
                return Ok(None);
            };
            match value {
                ValueRef::Entity(h) if h.descriptor == self.shadow.entity => current = h.index,
                ValueRef::Entity(h) => return Ok(Some(h.index)),
                ValueRef::Fact(index) => return Ok(Some(index)),
            }
        }
        Err(PlanwrightError::StateCorruption(format!(
            "Chain of entity ({}) does not reach an anchor within {} links",
            self.shadow.handle(entity),
            limit
        )))
    }

    /// Trailing entities of each chain link, indexed by the previous entity.
    fn trailing(&self, solution: &S) -> Vec<Vec<usize>> {
        let count = (self.count)(solution);
        let mut trailing = vec![Vec::new(); count];
        for entity in 0..count {
            let previous = (self.source_access.get)(solution, entity)
                .and_then(|v| v.entity_index_in(self.shadow.entity));
            if let Some(list) = previous.and_then(|p| trailing.get_mut(p)) {
                list.push(entity);
            }
        }
        trailing
    }

    fn write(
        &self,
        solution: &mut S,
        entity: usize,
        anchor: Option<usize>,
        touched: &mut Vec<EntityHandle>,
    ) {
        if (self.slot.get)(solution, entity) != anchor {
            (self.slot.set)(solution, entity, anchor);
            touched.push(self.shadow.handle(entity));
        }
    }
}

impl<S> VariableListener<S> for AnchorListener<S> {
    /// The old anchor needs no retraction; the after-event overwrites it.
    fn before_variable_changed(
        &mut self,
        _solution: &mut S,
        _entity: usize,
        _touched: &mut Vec<EntityHandle>,
    ) -> Result<()> {
        Ok(())
    }

    fn after_variable_changed(
        &mut self,
        solution: &mut S,
        entity: usize,
        touched: &mut Vec<EntityHandle>,
    ) -> Result<()> {
        let anchor = self.resolve(solution, entity)?;
        let trailing = self.trailing(solution);
        let mut seen = vec![false; trailing.len()];
        let mut stack = vec![entity];
        while let Some(current) = stack.pop() {
            if std::mem::replace(&mut seen[current], true) {
                continue;
            }
            self.write(solution, current, anchor, touched);
            stack.extend(trailing[current].iter().copied());
        }
        Ok(())
    }

    fn reset_working_solution(
        &mut self,
        _descriptor: &SolutionDescriptor<S>,
        solution: &mut S,
    ) -> Result<()> {
        let mut touched = Vec::new();
        for entity in 0..(self.count)(solution) {
            let anchor = self.resolve(solution, entity)?;
            self.write(solution, entity, anchor, &mut touched);
        }
        Ok(())
    }

    fn assert_not_stale(&self, descriptor: &SolutionDescriptor<S>, solution: &S) -> Result<()> {
        for entity in 0..(self.count)(solution) {
            let expected = self.resolve(solution, entity)?;
            let actual = (self.slot.get)(solution, entity);
            if actual != expected {
                return Err(stale(descriptor, self.shadow, entity, &expected, &actual));
            }
        }
        Ok(())
    }
}
