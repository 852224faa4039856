//! Incremental score director.
//!
//! [`IncrementalScoreDirector`] drives the whole engine for one working
//! solution: bracket events go to the listener support (supplies and
//! shadow variables) and changed entities are retracted from and re-inserted
//! into the constraint network.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;

use planwright_config::{EngineConfig, EnvironmentMode};
use planwright_core::domain::{
    Demand, EntityHandle, PlanningSolution, SolutionDescriptor, Supply, SupplyId, SupplyManager,
    VariableId, VariableListenerSupport,
};
use planwright_core::score::ParseableScore;
use planwright_core::{PlanwrightError, Result};
use tracing::{debug, info, trace};

use super::guard::{ChangeGuard, PendingChange};
use super::traits::ScoreDirector;
use crate::api::analysis::{ConstraintMatchTotal, IndictmentMap, ScoreExplanation};
use crate::api::constraint_set::ConstraintSet;
use crate::api::weight_overrides::ConstraintWeightOverrides;

/// A score director with incremental constraint scoring.
///
/// Only entities touched since the last calculation are retracted from and
/// re-inserted into the constraint network, so the cost of a score
/// calculation follows the size of the change rather than the size of the
/// solution.
///
/// # Type Parameters
///
/// - `S`: The solution type (must implement `PlanningSolution`)
/// - `C`: The constraint set (a tuple of constraints, or a `Vec` of boxed ones)
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use planwright_core::domain::VariableId;
/// use planwright_core::SimpleScore;
/// use planwright_scoring::director::{IncrementalScoreDirector, ScoreDirector};
/// use planwright_scoring::stream::joiner::equal;
/// use planwright_scoring::stream::ConstraintFactory;
/// use planwright_test::pair::{assignments, pair_descriptor, Assignment, PairSchedule, ASSIGNMENT};
///
/// let conflict = ConstraintFactory::<PairSchedule, SimpleScore>::new()
///     .for_each(assignments)
///     .join(
///         ConstraintFactory::new().for_each(assignments),
///         (equal(|a: &Assignment| a.value),),
///     )
///     .unwrap()
///     .filter(|a: &Assignment, b: &Assignment| a.id < b.id)
///     .penalize(SimpleScore::of(1))
///     .as_constraint("Conflict");
///
/// let solution = PairSchedule::new(2, &[Some(0), Some(0), Some(1)]);
/// let mut director =
///     IncrementalScoreDirector::new(Arc::new(pair_descriptor()), (conflict,), solution).unwrap();
/// assert_eq!(director.calculate_score().unwrap(), SimpleScore::of(-1));
///
/// let value = VariableId::new(ASSIGNMENT, 0);
/// director.before_variable_changed(value, 1).unwrap();
/// director.working_solution_mut().assignments[1].value = Some(1);
/// director.after_variable_changed(value, 1).unwrap();
/// assert_eq!(director.calculate_score().unwrap(), SimpleScore::of(-1));
/// ```
pub struct IncrementalScoreDirector<S, C>
where
    S: PlanningSolution,
    C: ConstraintSet<S, S::Score>,
{
    descriptor: Arc<SolutionDescriptor<S>>,
    working_solution: S,
    listeners: VariableListenerSupport<S>,
    constraints: C,
    weights: ConstraintWeightOverrides<S::Score>,
    environment_mode: EnvironmentMode,
    constraint_match_enabled: bool,
    /// Open basic/chained brackets, by (variable, entity index).
    open_variables: HashSet<(VariableId, usize)>,
    /// Open list brackets, by (variable, owner index).
    open_lists: HashSet<(VariableId, usize)>,
    open_additions: HashSet<EntityHandle>,
    open_removals: HashSet<EntityHandle>,
    /// Entities retracted from the network and waiting for re-insertion.
    dirty: BTreeSet<EntityHandle>,
    /// Set when an insert or retract failed halfway; the next flush reloads
    /// the whole network instead of the dirty entities.
    network_stale: bool,
    /// Failure of a dropped, uncommitted change guard.
    pending_error: Option<PlanwrightError>,
    calculation_count: u64,
}

impl<S, C> IncrementalScoreDirector<S, C>
where
    S: PlanningSolution,
    C: ConstraintSet<S, S::Score>,
{
    /// Creates a director with default settings and sets `solution` as the
    /// working solution.
    pub fn new(
        descriptor: Arc<SolutionDescriptor<S>>,
        constraints: C,
        solution: S,
    ) -> Result<Self> {
        Self::build(
            descriptor,
            constraints,
            solution,
            ConstraintWeightOverrides::new(),
            EnvironmentMode::default(),
            false,
        )
    }

    /// Creates a director from an engine configuration.
    ///
    /// # Errors
    ///
    /// Returns `Config` when a configured constraint weight does not parse.
    pub fn with_config(
        descriptor: Arc<SolutionDescriptor<S>>,
        constraints: C,
        solution: S,
        config: &EngineConfig,
    ) -> Result<Self>
    where
        S::Score: ParseableScore,
    {
        let weights =
            ConstraintWeightOverrides::from_config(&config.score_director.constraint_weights)?;
        Self::build(
            descriptor,
            constraints,
            solution,
            weights,
            config.environment_mode,
            config.score_director.constraint_match_enabled,
        )
    }

    fn build(
        descriptor: Arc<SolutionDescriptor<S>>,
        constraints: C,
        solution: S,
        weights: ConstraintWeightOverrides<S::Score>,
        environment_mode: EnvironmentMode,
        constraint_match_enabled: bool,
    ) -> Result<Self> {
        let listeners = VariableListenerSupport::new(Arc::clone(&descriptor))?;
        let mut director = Self {
            descriptor,
            working_solution: solution,
            listeners,
            constraints,
            weights,
            environment_mode,
            constraint_match_enabled,
            open_variables: HashSet::new(),
            open_lists: HashSet::new(),
            open_additions: HashSet::new(),
            open_removals: HashSet::new(),
            dirty: BTreeSet::new(),
            network_stale: false,
            pending_error: None,
            calculation_count: 0,
        };
        director.rebuild()?;
        Ok(director)
    }

    /// Replaces the working solution and rebuilds shadows, supplies and the
    /// constraint network from scratch.
    pub fn set_working_solution(&mut self, solution: S) -> Result<()> {
        self.working_solution = solution;
        self.rebuild()
    }

    fn rebuild(&mut self) -> Result<()> {
        self.open_variables.clear();
        self.open_lists.clear();
        self.open_additions.clear();
        self.open_removals.clear();
        self.dirty.clear();
        self.pending_error = None;
        self.listeners.reset_working_solution(&mut self.working_solution)?;
        self.constraints.clear_all();
        self.constraints.initialize_all(&self.descriptor)?;
        self.constraints
            .set_justification_tracking(self.constraint_match_enabled);
        let entities = self.reinsert_all()?;
        debug!(
            event = "working_solution_set",
            solution = self.descriptor.type_name,
            entities,
            constraints = self.constraints.constraint_count(),
            environment_mode = ?self.environment_mode,
        );
        Ok(())
    }

    pub fn constraints(&self) -> &C {
        &self.constraints
    }

    pub fn weights(&self) -> &ConstraintWeightOverrides<S::Score> {
        &self.weights
    }

    /// Replaces the constraint weight overrides.
    pub fn set_weights(&mut self, weights: ConstraintWeightOverrides<S::Score>) {
        self.weights = weights;
    }

    pub fn environment_mode(&self) -> EnvironmentMode {
        self.environment_mode
    }

    pub fn is_constraint_match_enabled(&self) -> bool {
        self.constraint_match_enabled
    }

    /// Number of completed score calculations.
    pub fn calculation_count(&self) -> u64 {
        self.calculation_count
    }

    /// Whether any bracket is open.
    pub fn has_open_changes(&self) -> bool {
        !(self.open_variables.is_empty()
            && self.open_lists.is_empty()
            && self.open_additions.is_empty()
            && self.open_removals.is_empty())
    }

    fn mark_dirty(&mut self, entity: EntityHandle) -> Result<()> {
        if self.dirty.insert(entity) && !self.network_stale {
            if let Err(error) = self.constraints.retract_all(entity) {
                self.network_stale = true;
                return Err(error);
            }
        }
        Ok(())
    }

    /// Clears the constraint network and inserts every entity of the
    /// working solution. Returns the number of entities inserted.
    fn reinsert_all(&mut self) -> Result<usize> {
        self.constraints.clear_all();
        self.dirty.clear();
        let handles = self.descriptor.entity_handles(&self.working_solution);
        for &handle in &handles {
            if let Err(error) = self.constraints.insert_all(&self.working_solution, handle) {
                self.network_stale = true;
                return Err(error);
            }
        }
        self.network_stale = false;
        Ok(handles.len())
    }

    fn check_in_bounds(&self, entity: EntityHandle) -> Result<()> {
        let count = self.descriptor.entity_count(&self.working_solution, entity.descriptor);
        if entity.index >= count {
            return Err(PlanwrightError::InvalidState(format!(
                "entity {} is out of bounds ({} entities in its class)",
                entity, count
            )));
        }
        Ok(())
    }

    // ========================================================================
    // Change guards
    // ========================================================================

    /// Opens a bracket on a basic or chained variable and returns a guard
    /// that closes it.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    ///
    /// use planwright_core::domain::ValueRef;
    /// use planwright_core::SimpleScore;
    /// use planwright_scoring::director::{IncrementalScoreDirector, ScoreDirector};
    /// use planwright_test::pair::{pair_descriptor, value_variable, PairSchedule};
    ///
    /// let solution = PairSchedule::new(2, &[Some(0)]);
    /// let descriptor = Arc::new(pair_descriptor());
    /// let mut director = IncrementalScoreDirector::new(descriptor, (), solution).unwrap();
    ///
    /// let mut change = director.begin_change(value_variable(), 0).unwrap();
    /// change.set_value(Some(ValueRef::Fact(1))).unwrap();
    /// change.commit().unwrap();
    ///
    /// assert_eq!(director.working_solution().assignments[0].value, Some(1));
    /// assert_eq!(director.calculate_score().unwrap(), SimpleScore::of(0));
    /// ```
    pub fn begin_change(
        &mut self,
        variable: VariableId,
        entity: usize,
    ) -> Result<ChangeGuard<'_, S, C>> {
        self.before_variable_changed(variable, entity)?;
        Ok(ChangeGuard::new(self, PendingChange::Variable { variable, entity }))
    }

    /// Opens a bracket on the range `[from, to)` of a list variable.
    ///
    /// The guard closes it with the same range unless
    /// [`ChangeGuard::set_after_range`] says otherwise.
    pub fn begin_list_change(
        &mut self,
        variable: VariableId,
        owner: usize,
        from: usize,
        to: usize,
    ) -> Result<ChangeGuard<'_, S, C>> {
        self.before_list_variable_changed(variable, owner, from, to)?;
        Ok(ChangeGuard::new(
            self,
            PendingChange::List {
                variable,
                owner,
                from,
                to,
            },
        ))
    }

    pub(super) fn store_pending_error(&mut self, error: PlanwrightError) {
        if self.pending_error.is_none() {
            self.pending_error = Some(error);
        }
    }

    fn take_pending_error(&mut self) -> Result<()> {
        match self.pending_error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    // ========================================================================
    // Analysis
    // ========================================================================

    fn require_match_tracking(&self, operation: &str) -> Result<()> {
        if self.constraint_match_enabled {
            Ok(())
        } else {
            Err(PlanwrightError::InvalidState(format!(
                "{} requires constraint match tracking, which is disabled",
                operation
            )))
        }
    }

    /// Per-constraint totals with every current match.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` when constraint match tracking is disabled.
    pub fn constraint_match_totals(&mut self) -> Result<Vec<ConstraintMatchTotal<S::Score>>> {
        self.require_match_tracking("constraint_match_totals")?;
        self.flush()?;
        self.constraints.analyze_all(&self.weights)
    }

    /// Every entity or fact that takes part in a match, with its matches.
    pub fn indictment_map(&mut self) -> Result<IndictmentMap<S::Score>> {
        let totals = self.constraint_match_totals()?;
        Ok(IndictmentMap::from_matches(totals.into_iter().flat_map(|t| t.matches)))
    }

    /// The current score broken down by constraint.
    pub fn explain_score(&mut self) -> Result<ScoreExplanation<S::Score>> {
        let score = self.calculate_score()?;
        let totals = self.constraint_match_totals()?;
        Ok(ScoreExplanation::new(score, totals))
    }

    // ========================================================================
    // Assertions
    // ========================================================================

    /// Rebuilds the constraint network from the working solution and
    /// compares every constraint's score with its incremental value.
    ///
    /// # Errors
    ///
    /// Returns `ScoreCorruption` naming each diverging constraint.
    pub fn assert_working_score_from_scratch(&mut self) -> Result<()> {
        self.flush()?;
        let incremental = self.constraints.evaluate_each(&self.weights)?;
        self.reinsert_all()?;
        let rebuilt = self.constraints.evaluate_each(&self.weights)?;

        let diverging: Vec<String> = incremental
            .iter()
            .zip(&rebuilt)
            .filter(|(i, r)| i.score != r.score || i.match_count != r.match_count)
            .map(|(i, r)| {
                format!(
                    "{}: incremental {} ({} matches), from scratch {} ({} matches)",
                    i.constraint_ref, i.score, i.match_count, r.score, r.match_count
                )
            })
            .collect();
        if diverging.is_empty() {
            trace!(event = "score_asserted", constraints = rebuilt.len());
            Ok(())
        } else {
            Err(PlanwrightError::ScoreCorruption(format!(
                "incremental score diverged from a from-scratch calculation: {}",
                diverging.join("; ")
            )))
        }
    }

    /// Compares every built-in shadow variable and externalized supply with
    /// a from-scratch recomputation.
    pub fn assert_shadow_variables_not_stale(&mut self) -> Result<()> {
        self.flush()?;
        self.listeners.assert_shadows_not_stale(&self.working_solution)?;
        self.listeners.assert_supplies_consistent(&self.working_solution)
    }

    // ========================================================================
    // Supplies
    // ========================================================================

    /// Demands a supply; equal demands share one supply.
    pub fn demand(&mut self, demand: Demand) -> Result<SupplyId> {
        self.listeners.demand(demand, &self.working_solution)
    }

    /// Cancels one demand. Returns true when the supply was released.
    pub fn cancel_demand(&mut self, demand: Demand) -> Result<bool> {
        self.listeners.cancel(demand)
    }

    pub fn supply(&self, id: SupplyId) -> Result<&Supply> {
        self.listeners.supplies().get(id)
    }

    pub fn supplies(&self) -> &SupplyManager<S> {
        self.listeners.supplies()
    }

    /// Drops the constraint network, every supply and all bracket state.
    /// The working solution itself is kept.
    pub fn clear_working_solution(&mut self) {
        self.constraints.clear_all();
        self.listeners.clear_working_solution();
        self.open_variables.clear();
        self.open_lists.clear();
        self.open_additions.clear();
        self.open_removals.clear();
        self.dirty.clear();
        self.network_stale = false;
        self.pending_error = None;
        debug!(event = "working_solution_cleared", solution = self.descriptor.type_name);
    }

    /// Consumes the director and returns the working solution.
    pub fn into_working_solution(self) -> S {
        self.working_solution
    }

    fn flush(&mut self) -> Result<()> {
        self.take_pending_error()?;
        ScoreDirector::trigger_variable_listeners(self)
    }
}

impl<S, C> ScoreDirector<S> for IncrementalScoreDirector<S, C>
where
    S: PlanningSolution,
    C: ConstraintSet<S, S::Score>,
{
    fn working_solution(&self) -> &S {
        &self.working_solution
    }

    fn working_solution_mut(&mut self) -> &mut S {
        &mut self.working_solution
    }

    fn solution_descriptor(&self) -> &Arc<SolutionDescriptor<S>> {
        &self.descriptor
    }

    fn calculate_score(&mut self) -> Result<S::Score> {
        self.flush()?;
        let score = self.constraints.score_all(&self.weights)?;
        self.working_solution.set_score(Some(score));
        self.calculation_count += 1;

        if self.environment_mode.is_asserted() {
            if self.calculation_count == 1 {
                info!(
                    event = "score_assertions_enabled",
                    environment_mode = ?self.environment_mode,
                );
            }
            self.assert_working_score_from_scratch()?;
            if self.environment_mode.is_fully_asserted() {
                self.assert_shadow_variables_not_stale()?;
            }
        }
        trace!(event = "score_calculated", score = %score, count = self.calculation_count);
        Ok(score)
    }

    fn before_variable_changed(&mut self, variable: VariableId, entity: usize) -> Result<()> {
        let handle = EntityHandle::new(variable.entity, entity);
        self.check_in_bounds(handle)?;
        if !self.open_variables.insert((variable, entity)) {
            return Err(PlanwrightError::StateCorruption(format!(
                "before_variable_changed called twice for {} of entity {} without an after",
                self.descriptor.variable_name(variable),
                entity
            )));
        }
        self.mark_dirty(handle)?;
        self.listeners
            .before_variable_changed(&mut self.working_solution, variable, entity)
    }

    fn after_variable_changed(&mut self, variable: VariableId, entity: usize) -> Result<()> {
        if !self.open_variables.remove(&(variable, entity)) {
            return Err(PlanwrightError::StateCorruption(format!(
                "after_variable_changed called for {} of entity {} without a matching before",
                self.descriptor.variable_name(variable),
                entity
            )));
        }
        self.listeners
            .after_variable_changed(&self.working_solution, variable, entity)
    }

    fn before_list_variable_changed(
        &mut self,
        variable: VariableId,
        owner: usize,
        from: usize,
        to: usize,
    ) -> Result<()> {
        let handle = EntityHandle::new(variable.entity, owner);
        self.check_in_bounds(handle)?;
        if !self.open_lists.insert((variable, owner)) {
            return Err(PlanwrightError::StateCorruption(format!(
                "before_list_variable_changed called twice for {} of entity {} without an after",
                self.descriptor.variable_name(variable),
                owner
            )));
        }
        self.mark_dirty(handle)?;
        self.listeners
            .before_list_variable_changed(&mut self.working_solution, variable, owner, from, to)
    }

    fn after_list_variable_changed(
        &mut self,
        variable: VariableId,
        owner: usize,
        from: usize,
        to: usize,
    ) -> Result<()> {
        if !self.open_lists.remove(&(variable, owner)) {
            return Err(PlanwrightError::StateCorruption(format!(
                "after_list_variable_changed called for {} of entity {} without a matching before",
                self.descriptor.variable_name(variable),
                owner
            )));
        }
        self.listeners
            .after_list_variable_changed(&self.working_solution, variable, owner, from, to)
    }

    fn before_entity_added(&mut self, entity: EntityHandle) -> Result<()> {
        let count = self.descriptor.entity_count(&self.working_solution, entity.descriptor);
        if entity.index != count {
            return Err(PlanwrightError::InvalidState(format!(
                "entity {} must be appended at index {}",
                entity, count
            )));
        }
        if !self.open_additions.insert(entity) {
            return Err(PlanwrightError::StateCorruption(format!(
                "before_entity_added called twice for {}",
                entity
            )));
        }
        Ok(())
    }

    fn after_entity_added(&mut self, entity: EntityHandle) -> Result<()> {
        if !self.open_additions.remove(&entity) {
            return Err(PlanwrightError::StateCorruption(format!(
                "after_entity_added called for {} without a matching before",
                entity
            )));
        }
        self.check_in_bounds(entity)?;
        self.listeners
            .after_entity_added(&self.working_solution, entity)?;
        // Never inserted, so only queue it.
        self.dirty.insert(entity);
        Ok(())
    }

    fn before_entity_removed(&mut self, entity: EntityHandle) -> Result<()> {
        let count = self.descriptor.entity_count(&self.working_solution, entity.descriptor);
        if entity.index + 1 != count {
            return Err(PlanwrightError::InvalidState(format!(
                "entity {} cannot be removed: only the last entity of a class ({} entities) \
                 can be removed without moving other entities",
                entity, count
            )));
        }
        if !self.open_removals.insert(entity) {
            return Err(PlanwrightError::StateCorruption(format!(
                "before_entity_removed called twice for {}",
                entity
            )));
        }
        self.mark_dirty(entity)?;
        self.dirty.remove(&entity);
        self.listeners
            .before_entity_removed(&mut self.working_solution, entity)
    }

    fn after_entity_removed(&mut self, entity: EntityHandle) -> Result<()> {
        if !self.open_removals.remove(&entity) {
            return Err(PlanwrightError::StateCorruption(format!(
                "after_entity_removed called for {} without a matching before",
                entity
            )));
        }
        self.listeners
            .after_entity_removed(&self.working_solution, entity);
        Ok(())
    }

    fn trigger_variable_listeners(&mut self) -> Result<()> {
        if self.has_open_changes() {
            return Err(PlanwrightError::StateCorruption(format!(
                "variable listeners triggered with {} open change brackets",
                self.open_variables.len()
                    + self.open_lists.len()
                    + self.open_additions.len()
                    + self.open_removals.len()
            )));
        }
        let touched = self
            .listeners
            .trigger_variable_listeners(&mut self.working_solution)?;
        for handle in touched {
            let count = self.descriptor.entity_count(&self.working_solution, handle.descriptor);
            if handle.index < count {
                self.mark_dirty(handle)?;
            }
        }
        if self.network_stale {
            let entities = self.reinsert_all()?;
            debug!(event = "network_reloaded", entities);
            return Ok(());
        }
        if self.dirty.is_empty() {
            return Ok(());
        }
        let dirty = std::mem::take(&mut self.dirty);
        for &handle in &dirty {
            let count = self.descriptor.entity_count(&self.working_solution, handle.descriptor);
            if handle.index < count {
                if let Err(error) = self.constraints.insert_all(&self.working_solution, handle) {
                    self.network_stale = true;
                    return Err(error);
                }
            }
        }
        trace!(event = "entities_reinserted", entities = dirty.len());
        Ok(())
    }
}

impl<S, C> fmt::Debug for IncrementalScoreDirector<S, C>
where
    S: PlanningSolution,
    C: ConstraintSet<S, S::Score>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IncrementalScoreDirector")
            .field("solution", &self.descriptor.type_name)
            .field("constraints", &self.constraints.constraint_count())
            .field("environment_mode", &self.environment_mode)
            .field("dirty", &self.dirty.len())
            .field("network_stale", &self.network_stale)
            .field("calculation_count", &self.calculation_count)
            .finish()
    }
}
