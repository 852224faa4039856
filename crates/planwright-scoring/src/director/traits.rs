// Score director trait definition.

use std::sync::Arc;

use planwright_core::domain::{EntityHandle, PlanningSolution, SolutionDescriptor, VariableId};
use planwright_core::Result;

// The score director owns the working solution and keeps its score current.
//
// It is responsible for:
// - Bracketing every genuine-variable change with before/after events
// - Keeping shadow variables and supplies in step with those changes
// - Feeding changed entities through the constraint network
// - Calculating the score incrementally
//
// Every bracket method fails with `StateCorruption` when the brackets do
// not pair up.
pub trait ScoreDirector<S: PlanningSolution>: Send {
    // Returns a reference to the working solution.
    fn working_solution(&self) -> &S;

    // Returns a mutable reference to the working solution.
    //
    // Writes through this reference must be bracketed.
    fn working_solution_mut(&mut self) -> &mut S;

    // Returns the solution descriptor for this solution type.
    fn solution_descriptor(&self) -> &Arc<SolutionDescriptor<S>>;

    // Flushes pending events and returns the current score.
    fn calculate_score(&mut self) -> Result<S::Score>;

    fn before_variable_changed(&mut self, variable: VariableId, entity: usize) -> Result<()>;

    fn after_variable_changed(&mut self, variable: VariableId, entity: usize) -> Result<()>;

    // Called before the elements `[from, to)` of a list variable change.
    fn before_list_variable_changed(
        &mut self,
        variable: VariableId,
        owner: usize,
        from: usize,
        to: usize,
    ) -> Result<()>;

    // Called after the change, with `[from, to)` now covering the new elements.
    fn after_list_variable_changed(
        &mut self,
        variable: VariableId,
        owner: usize,
        from: usize,
        to: usize,
    ) -> Result<()>;

    fn before_entity_added(&mut self, entity: EntityHandle) -> Result<()>;

    fn after_entity_added(&mut self, entity: EntityHandle) -> Result<()>;

    fn before_entity_removed(&mut self, entity: EntityHandle) -> Result<()>;

    fn after_entity_removed(&mut self, entity: EntityHandle) -> Result<()>;

    // Propagates shadow variables and re-inserts every affected entity.
    fn trigger_variable_listeners(&mut self) -> Result<()>;

    // Returns the number of entities for a given descriptor index.
    fn entity_count(&self, descriptor_index: usize) -> usize {
        self.solution_descriptor()
            .entity_count(self.working_solution(), descriptor_index)
    }

    // Returns the total number of entities across all collections.
    fn total_entity_count(&self) -> usize {
        self.solution_descriptor()
            .total_entity_count(self.working_solution())
    }
}
