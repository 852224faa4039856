// Scoped change brackets.

use std::sync::Arc;

use planwright_core::domain::{PlanningSolution, ValueRef, VariableId};
use planwright_core::{PlanwrightError, Result};
use tracing::warn;

use super::incremental::IncrementalScoreDirector;
use super::traits::ScoreDirector;
use crate::api::constraint_set::ConstraintSet;

#[derive(Debug, Clone, Copy)]
pub(super) enum PendingChange {
    Variable {
        variable: VariableId,
        entity: usize,
    },
    List {
        variable: VariableId,
        owner: usize,
        from: usize,
        to: usize,
    },
}

/// An open change bracket on one variable.
///
/// Created by [`IncrementalScoreDirector::begin_change`] and
/// [`IncrementalScoreDirector::begin_list_change`]. [`ChangeGuard::commit`]
/// closes the bracket and reports any failure. A guard dropped without a
/// commit still closes the bracket; a failure is then kept by the director
/// and returned from its next score calculation.
pub struct ChangeGuard<'a, S, C>
where
    S: PlanningSolution,
    C: ConstraintSet<S, S::Score>,
{
    director: &'a mut IncrementalScoreDirector<S, C>,
    change: PendingChange,
    closed: bool,
}

impl<'a, S, C> ChangeGuard<'a, S, C>
where
    S: PlanningSolution,
    C: ConstraintSet<S, S::Score>,
{
    pub(super) fn new(
        director: &'a mut IncrementalScoreDirector<S, C>,
        change: PendingChange,
    ) -> Self {
        Self {
            director,
            change,
            closed: false,
        }
    }

    /// The working solution, for writes inside the bracket.
    pub fn solution_mut(&mut self) -> &mut S {
        self.director.working_solution_mut()
    }

    /// Writes the bracketed basic or chained variable.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` on a list bracket.
    pub fn set_value(&mut self, value: Option<ValueRef>) -> Result<()> {
        match self.change {
            PendingChange::Variable { variable, entity } => {
                let descriptor = Arc::clone(self.director.solution_descriptor());
                descriptor.set_value(self.director.working_solution_mut(), variable, entity, value)
            }
            PendingChange::List { .. } => Err(PlanwrightError::InvalidState(
                "set_value called on a list variable change".to_string(),
            )),
        }
    }

    /// Sets the end of the range reported when a list bracket closes, for
    /// changes that grow or shrink the list.
    pub fn set_after_range(&mut self, new_to: usize) {
        if let PendingChange::List { ref mut to, .. } = self.change {
            *to = new_to;
        }
    }

    /// Closes the bracket.
    pub fn commit(mut self) -> Result<()> {
        self.closed = true;
        self.close()
    }

    fn close(&mut self) -> Result<()> {
        match self.change {
            PendingChange::Variable { variable, entity } => {
                self.director.after_variable_changed(variable, entity)
            }
            PendingChange::List {
                variable,
                owner,
                from,
                to,
            } => self
                .director
                .after_list_variable_changed(variable, owner, from, to),
        }
    }
}

impl<S, C> Drop for ChangeGuard<'_, S, C>
where
    S: PlanningSolution,
    C: ConstraintSet<S, S::Score>,
{
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(error) = self.close() {
            warn!(event = "change_guard_failed", error = %error);
            self.director.store_pending_error(error);
        }
    }
}
