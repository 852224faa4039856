//! User-defined shadow variables.

use crate::domain::descriptor::SolutionDescriptor;
use crate::domain::handle::{EntityHandle, VariableId};

/// Recomputes a custom shadow of one entity from that entity's sources.
///
/// Custom updates are never called directly on source events. The listener
/// support queues them by topological rank so that a custom shadow sourced
/// on another shadow always sees its final value.
pub struct CustomShadowListener<S> {
    shadow: VariableId,
    update: fn(&mut S, usize),
}

impl<S> CustomShadowListener<S> {
    pub fn new(shadow: VariableId, update: fn(&mut S, usize)) -> Self {
        Self { shadow, update }
    }

    pub fn shadow(&self) -> VariableId {
        self.shadow
    }

    pub fn update(&self, solution: &mut S, entity: usize, touched: &mut Vec<EntityHandle>) {
        (self.update)(solution, entity);
        touched.push(self.shadow.handle(entity));
    }

    /// Recomputes the shadow on every entity of its class.
    pub fn reset_working_solution(&self, descriptor: &SolutionDescriptor<S>, solution: &mut S) {
        for entity in 0..descriptor.entity_count(solution, self.shadow.entity) {
            (self.update)(solution, entity);
        }
    }
}
