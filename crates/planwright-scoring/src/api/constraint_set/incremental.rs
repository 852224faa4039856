//! Constraint sets for incremental scoring.
//!
//! A constraint owns its node network and is driven by entity events from
//! the score director. `ConstraintSet` is implemented for tuples of
//! constraints (fully monomorphized) and for a `Vec` of boxed constraints
//! when the set is only known at runtime.

use std::sync::Arc;

use planwright_core::domain::{EntityHandle, SolutionDescriptor};
use planwright_core::score::Score;
use planwright_core::{ConstraintRef, ImpactType, PlanwrightError, Result};

use super::super::analysis::{ConstraintMatch, ConstraintMatchTotal};
use super::super::weight_overrides::WeightProvider;

/// A single constraint with incremental scoring capability.
///
/// # Incremental Protocol
///
/// 1. Call `initialize` once per descriptor to resolve classes
/// 2. `insert` every entity of the working solution
/// 3. Before an entity changes: `retract` it
/// 4. After the change: `insert` it again
///
/// The summed impact is kept current by every event, so `score` costs one
/// weight lookup and one multiplication. A failed `insert` or `retract`
/// keeps the previous total and matches, but the node state may already
/// reflect the event; callers must `clear` and reinsert before scoring
/// again.
pub trait IncrementalConstraint<S, Sc: Score>: Send + Sync {
    fn constraint_ref(&self) -> &ConstraintRef;

    fn impact_type(&self) -> ImpactType;

    /// Resolves the classes of every source against the descriptor.
    fn initialize(&mut self, descriptor: &Arc<SolutionDescriptor<S>>) -> Result<()>;

    /// Enables or disables keeping a justification per match.
    ///
    /// Takes effect for matches inserted afterwards; callers toggle it
    /// before the working solution is inserted.
    fn set_justification_tracking(&mut self, enabled: bool);

    fn insert(&mut self, solution: &S, entity: EntityHandle) -> Result<()>;

    fn retract(&mut self, entity: EntityHandle) -> Result<()>;

    /// Drops every match and all node state.
    fn clear(&mut self);

    /// Resolves the weight against the configured overrides.
    fn resolve_weight(&self, weights: &dyn WeightProvider<Sc>) -> Result<Sc>;

    fn match_count(&self) -> usize;

    /// Current matches, scored with `weight`.
    ///
    /// Fails with `InvalidState` when justification tracking is disabled.
    fn matches(&self, weight: Sc) -> Result<Vec<ConstraintMatch<Sc>>>;

    /// The resolved weight scaled by the summed impact.
    ///
    /// Fails with `ScoreImpact` when the product overflows a level.
    fn score(&self, weights: &dyn WeightProvider<Sc>) -> Result<Sc>;
}

impl<S, Sc: Score> IncrementalConstraint<S, Sc> for Box<dyn IncrementalConstraint<S, Sc>> {
    fn constraint_ref(&self) -> &ConstraintRef {
        (**self).constraint_ref()
    }

    fn impact_type(&self) -> ImpactType {
        (**self).impact_type()
    }

    fn initialize(&mut self, descriptor: &Arc<SolutionDescriptor<S>>) -> Result<()> {
        (**self).initialize(descriptor)
    }

    fn set_justification_tracking(&mut self, enabled: bool) {
        (**self).set_justification_tracking(enabled)
    }

    fn insert(&mut self, solution: &S, entity: EntityHandle) -> Result<()> {
        (**self).insert(solution, entity)
    }

    fn retract(&mut self, entity: EntityHandle) -> Result<()> {
        (**self).retract(entity)
    }

    fn clear(&mut self) {
        (**self).clear()
    }

    fn resolve_weight(&self, weights: &dyn WeightProvider<Sc>) -> Result<Sc> {
        (**self).resolve_weight(weights)
    }

    fn score(&self, weights: &dyn WeightProvider<Sc>) -> Result<Sc> {
        (**self).score(weights)
    }

    fn match_count(&self) -> usize {
        (**self).match_count()
    }

    fn matches(&self, weight: Sc) -> Result<Vec<ConstraintMatch<Sc>>> {
        (**self).matches(weight)
    }
}

/// Result of evaluating a single constraint.
#[derive(Debug, Clone)]
pub struct ConstraintResult<Sc> {
    pub constraint_ref: ConstraintRef,
    pub impact_type: ImpactType,
    /// Score contribution from this constraint.
    pub score: Sc,
    pub match_count: usize,
}

fn analyze<S, Sc, C>(
    constraint: &C,
    weights: &dyn WeightProvider<Sc>,
) -> Result<ConstraintMatchTotal<Sc>>
where
    Sc: Score,
    C: IncrementalConstraint<S, Sc> + ?Sized,
{
    let weight = constraint.resolve_weight(weights)?;
    Ok(ConstraintMatchTotal::new(
        constraint.constraint_ref().clone(),
        constraint.impact_type(),
        weight,
        constraint.score(weights)?,
        constraint.matches(weight)?,
    ))
}

fn result<S, Sc, C>(
    constraint: &C,
    weights: &dyn WeightProvider<Sc>,
) -> Result<ConstraintResult<Sc>>
where
    Sc: Score,
    C: IncrementalConstraint<S, Sc> + ?Sized,
{
    Ok(ConstraintResult {
        constraint_ref: constraint.constraint_ref().clone(),
        impact_type: constraint.impact_type(),
        score: constraint.score(weights)?,
        match_count: constraint.match_count(),
    })
}

fn add_checked<S, Sc, C>(total: Sc, constraint: &C, weights: &dyn WeightProvider<Sc>) -> Result<Sc>
where
    Sc: Score,
    C: IncrementalConstraint<S, Sc> + ?Sized,
{
    let score = constraint.score(weights)?;
    total.checked_add(&score).ok_or_else(|| PlanwrightError::ScoreImpact {
        constraint: constraint.constraint_ref().full_name(),
        message: format!("adding {} to {} overflows the score", score, total),
    })
}

/// A set of constraints driven together by the score director.
pub trait ConstraintSet<S, Sc: Score>: Send + Sync {
    fn constraint_count(&self) -> usize;

    fn initialize_all(&mut self, descriptor: &Arc<SolutionDescriptor<S>>) -> Result<()>;

    fn set_justification_tracking(&mut self, enabled: bool);

    fn insert_all(&mut self, solution: &S, entity: EntityHandle) -> Result<()>;

    fn retract_all(&mut self, entity: EntityHandle) -> Result<()>;

    fn clear_all(&mut self);

    /// Total score over all constraints, resolving every weight once.
    fn score_all(&self, weights: &dyn WeightProvider<Sc>) -> Result<Sc>;

    /// Per-constraint score and match count.
    fn evaluate_each(&self, weights: &dyn WeightProvider<Sc>) -> Result<Vec<ConstraintResult<Sc>>>;

    /// Per-constraint analysis with every match; needs justification tracking.
    fn analyze_all(
        &self,
        weights: &dyn WeightProvider<Sc>,
    ) -> Result<Vec<ConstraintMatchTotal<Sc>>>;
}

// ============================================================================
// Tuple implementations
// ============================================================================

impl<S: Send + Sync, Sc: Score> ConstraintSet<S, Sc> for () {
    #[inline]
    fn constraint_count(&self) -> usize {
        0
    }

    #[inline]
    fn initialize_all(&mut self, _descriptor: &Arc<SolutionDescriptor<S>>) -> Result<()> {
        Ok(())
    }

    #[inline]
    fn set_justification_tracking(&mut self, _enabled: bool) {}

    #[inline]
    fn insert_all(&mut self, _solution: &S, _entity: EntityHandle) -> Result<()> {
        Ok(())
    }

    #[inline]
    fn retract_all(&mut self, _entity: EntityHandle) -> Result<()> {
        Ok(())
    }

    #[inline]
    fn clear_all(&mut self) {}

    #[inline]
    fn score_all(&self, _weights: &dyn WeightProvider<Sc>) -> Result<Sc> {
        Ok(Sc::zero())
    }

    fn evaluate_each(
        &self,
        _weights: &dyn WeightProvider<Sc>,
    ) -> Result<Vec<ConstraintResult<Sc>>> {
        Ok(Vec::new())
    }

    fn analyze_all(
        &self,
        _weights: &dyn WeightProvider<Sc>,
    ) -> Result<Vec<ConstraintMatchTotal<Sc>>> {
        Ok(Vec::new())
    }
}

macro_rules! impl_constraint_set_for_tuple {
    ($($idx:tt: $T:ident),+) => {
        impl<S, Sc, $($T),+> ConstraintSet<S, Sc> for ($($T,)+)
        where
            S: Send + Sync,
            Sc: Score,
            $($T: IncrementalConstraint<S, Sc>,)+
        {
            #[inline]
            fn constraint_count(&self) -> usize {
                let mut count = 0;
                $(let _ = &self.$idx; count += 1;)+
                count
            }

            fn initialize_all(&mut self, descriptor: &Arc<SolutionDescriptor<S>>) -> Result<()> {
                $(self.$idx.initialize(descriptor)?;)+
                Ok(())
            }

            fn set_justification_tracking(&mut self, enabled: bool) {
                $(self.$idx.set_justification_tracking(enabled);)+
            }

            #[inline]
            fn insert_all(&mut self, solution: &S, entity: EntityHandle) -> Result<()> {
                $(self.$idx.insert(solution, entity)?;)+
                Ok(())
            }

            #[inline]
            fn retract_all(&mut self, entity: EntityHandle) -> Result<()> {
                $(self.$idx.retract(entity)?;)+
                Ok(())
            }

            fn clear_all(&mut self) {
                $(self.$idx.clear();)+
            }

            #[inline]
            fn score_all(&self, weights: &dyn WeightProvider<Sc>) -> Result<Sc> {
                let mut total = Sc::zero();
                $(total = add_checked::<S, Sc, _>(total, &self.$idx, weights)?;)+
                Ok(total)
            }

            fn evaluate_each(
                &self,
                weights: &dyn WeightProvider<Sc>,
            ) -> Result<Vec<ConstraintResult<Sc>>> {
                Ok(vec![$(result::<S, Sc, _>(&self.$idx, weights)?),+])
            }

            fn analyze_all(
                &self,
                weights: &dyn WeightProvider<Sc>,
            ) -> Result<Vec<ConstraintMatchTotal<Sc>>> {
                Ok(vec![$(analyze::<S, Sc, _>(&self.$idx, weights)?),+])
            }
        }
    };
}

impl_constraint_set_for_tuple!(0: C0);
impl_constraint_set_for_tuple!(0: C0, 1: C1);
impl_constraint_set_for_tuple!(0: C0, 1: C1, 2: C2);
impl_constraint_set_for_tuple!(0: C0, 1: C1, 2: C2, 3: C3);
impl_constraint_set_for_tuple!(0: C0, 1: C1, 2: C2, 3: C3, 4: C4);
impl_constraint_set_for_tuple!(0: C0, 1: C1, 2: C2, 3: C3, 4: C4, 5: C5);
impl_constraint_set_for_tuple!(0: C0, 1: C1, 2: C2, 3: C3, 4: C4, 5: C5, 6: C6);
impl_constraint_set_for_tuple!(0: C0, 1: C1, 2: C2, 3: C3, 4: C4, 5: C5, 6: C6, 7: C7);
impl_constraint_set_for_tuple!(0: C0, 1: C1, 2: C2, 3: C3, 4: C4, 5: C5, 6: C6, 7: C7, 8: C8);
impl_constraint_set_for_tuple!(
    0: C0, 1: C1, 2: C2, 3: C3, 4: C4, 5: C5, 6: C6, 7: C7, 8: C8, 9: C9
);
impl_constraint_set_for_tuple!(
    0: C0, 1: C1, 2: C2, 3: C3, 4: C4, 5: C5, 6: C6, 7: C7, 8: C8, 9: C9, 10: C10
);
impl_constraint_set_for_tuple!(
    0: C0, 1: C1, 2: C2, 3: C3, 4: C4, 5: C5, 6: C6, 7: C7, 8: C8, 9: C9, 10: C10, 11: C11
);
impl_constraint_set_for_tuple!(
    0: C0, 1: C1, 2: C2, 3: C3, 4: C4, 5: C5, 6: C6, 7: C7, 8: C8, 9: C9, 10: C10, 11: C11, 12: C12
);
impl_constraint_set_for_tuple!(
    0: C0, 1: C1, 2: C2, 3: C3, 4: C4, 5: C5, 6: C6, 7: C7, 8: C8, 9: C9, 10: C10, 11: C11, 12: C12,
    13: C13
);
impl_constraint_set_for_tuple!(
    0: C0, 1: C1, 2: C2, 3: C3, 4: C4, 5: C5, 6: C6, 7: C7, 8: C8, 9: C9, 10: C10, 11: C11, 12: C12,
    13: C13, 14: C14
);
impl_constraint_set_for_tuple!(
    0: C0, 1: C1, 2: C2, 3: C3, 4: C4, 5: C5, 6: C6, 7: C7, 8: C8, 9: C9, 10: C10, 11: C11, 12: C12,
    13: C13, 14: C14, 15: C15
);

// ============================================================================
// Runtime-sized sets
// ============================================================================

impl<S, Sc> ConstraintSet<S, Sc> for Vec<Box<dyn IncrementalConstraint<S, Sc>>>
where
    S: Send + Sync,
    Sc: Score,
{
    fn constraint_count(&self) -> usize {
        self.len()
    }

    fn initialize_all(&mut self, descriptor: &Arc<SolutionDescriptor<S>>) -> Result<()> {
        self.iter_mut().try_for_each(|c| c.initialize(descriptor))
    }

    fn set_justification_tracking(&mut self, enabled: bool) {
        for c in self.iter_mut() {
            c.set_justification_tracking(enabled);
        }
    }

    fn insert_all(&mut self, solution: &S, entity: EntityHandle) -> Result<()> {
        self.iter_mut().try_for_each(|c| c.insert(solution, entity))
    }

    fn retract_all(&mut self, entity: EntityHandle) -> Result<()> {
        self.iter_mut().try_for_each(|c| c.retract(entity))
    }

    fn clear_all(&mut self) {
        for c in self.iter_mut() {
            c.clear();
        }
    }

    fn score_all(&self, weights: &dyn WeightProvider<Sc>) -> Result<Sc> {
        self.iter()
            .try_fold(Sc::zero(), |total, c| add_checked::<S, Sc, _>(total, &**c, weights))
    }

    fn evaluate_each(
        &self,
        weights: &dyn WeightProvider<Sc>,
    ) -> Result<Vec<ConstraintResult<Sc>>> {
        self.iter().map(|c| result::<S, Sc, _>(&**c, weights)).collect()
    }

    fn analyze_all(
        &self,
        weights: &dyn WeightProvider<Sc>,
    ) -> Result<Vec<ConstraintMatchTotal<Sc>>> {
        self.iter().map(|c| analyze::<S, Sc, _>(&**c, weights)).collect()
    }
}
