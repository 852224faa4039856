//! Listener traits.

use crate::domain::descriptor::SolutionDescriptor;
use crate::domain::handle::EntityHandle;
use crate::error::Result;

/// A listener on a basic or chained source variable.
///
/// Listeners maintain one shadow variable. Every hook pushes the handle of
/// each entity whose shadow it wrote onto `touched`, so callers can route
/// the change to dependent shadows and to score streams.
///
/// Hooks fail with `StateCorruption` when the shadow they are about to
/// update does not hold the value the source implies.
pub trait VariableListener<S> {
    /// Called before the source variable of `entity` changes.
    fn before_variable_changed(
        &mut self,
        solution: &mut S,
        entity: usize,
        touched: &mut Vec<EntityHandle>,
    ) -> Result<()>;

    /// Called after the source variable of `entity` changed.
    fn after_variable_changed(
        &mut self,
        solution: &mut S,
        entity: usize,
        touched: &mut Vec<EntityHandle>,
    ) -> Result<()>;

    /// An added entity counts as its variable being set.
    fn after_entity_added(
        &mut self,
        solution: &mut S,
        entity: usize,
        touched: &mut Vec<EntityHandle>,
    ) -> Result<()> {
        self.after_variable_changed(solution, entity, touched)
    }

    /// A removed entity counts as its variable being cleared.
    fn before_entity_removed(
        &mut self,
        solution: &mut S,
        entity: usize,
        touched: &mut Vec<EntityHandle>,
    ) -> Result<()> {
        self.before_variable_changed(solution, entity, touched)
    }

    /// Recomputes the shadow from scratch. Running it twice in a row leaves
    /// the solution unchanged.
    fn reset_working_solution(
        &mut self,
        descriptor: &SolutionDescriptor<S>,
        solution: &mut S,
    ) -> Result<()>;

    /// Fails with `StateCorruption` if the shadow differs from what the
    /// source variable implies.
    fn assert_not_stale(&self, descriptor: &SolutionDescriptor<S>, solution: &S) -> Result<()>;
}

/// A listener on a list source variable.
///
/// Ranges are half-open: `[from, to)` of the owner's list. The before range
/// covers elements about to leave or move, the after range the elements
/// that arrived or moved, and positions after `to` may shift.
pub trait ListVariableListener<S> {
    fn before_list_variable_changed(
        &mut self,
        solution: &mut S,
        owner: usize,
        from: usize,
        to: usize,
        touched: &mut Vec<EntityHandle>,
    ) -> Result<()>;

    fn after_list_variable_changed(
        &mut self,
        solution: &mut S,
        owner: usize,
        from: usize,
        to: usize,
        touched: &mut Vec<EntityHandle>,
    ) -> Result<()>;

    /// Current length of the owner's list.
    fn list_len(&self, solution: &S, owner: usize) -> usize;

    fn after_entity_added(
        &mut self,
        solution: &mut S,
        owner: usize,
        touched: &mut Vec<EntityHandle>,
    ) -> Result<()> {
        let len = self.list_len(solution, owner);
        self.after_list_variable_changed(solution, owner, 0, len, touched)
    }

    fn before_entity_removed(
        &mut self,
        solution: &mut S,
        owner: usize,
        touched: &mut Vec<EntityHandle>,
    ) -> Result<()> {
        let len = self.list_len(solution, owner);
        self.before_list_variable_changed(solution, owner, 0, len, touched)
    }

    fn reset_working_solution(
        &mut self,
        descriptor: &SolutionDescriptor<S>,
        solution: &mut S,
    ) -> Result<()>;

    fn assert_not_stale(&self, descriptor: &SolutionDescriptor<S>, solution: &S) -> Result<()>;
}
