//! Terminal penalize/reward node.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use planwright_core::domain::{EntityHandle, SolutionDescriptor};
use planwright_core::score::{MatchWeight, Score};
use planwright_core::{ConstraintRef, ImpactType, PlanwrightError, Result};
use tracing::{debug, trace};

use super::weight::ConstraintWeight;
use crate::api::analysis::{ConstraintJustification, ConstraintMatch, EntityRef};
use crate::api::constraint_set::IncrementalConstraint;
use crate::api::weight_overrides::WeightProvider;
use crate::node::{Delta, Node, TupleId};
use crate::stream::tuple::{Tuple, TupleFn};

/// A constraint materialized from a stream.
///
/// Each surviving row gets a match weight from the weigher: `i64` for
/// integral constraints, [`Decimal`](planwright_core::Decimal) for decimal
/// ones. The impact type signs it: penalties subtract, rewards and mixed
/// impacts add. A negative match weight on a pure penalty or reward, or a
/// total that overflows, is rejected with [`PlanwrightError::ScoreImpact`].
///
/// The constraint keeps the signed impact of every row, so the running
/// total follows each insert and retract exactly. A batch of deltas is
/// applied whole or not at all.
pub struct StreamConstraint<S, N, W, Sc, I = i64> {
    constraint_ref: ConstraintRef,
    impact_type: ImpactType,
    weight: ConstraintWeight<Sc>,
    node: N,
    weigher: W,
    impacts: HashMap<TupleId, I>,
    justifications: Option<HashMap<TupleId, Vec<EntityRef>>>,
    total: I,
    _phantom: PhantomData<fn(&S)>,
}

impl<S, N, W, Sc, I> StreamConstraint<S, N, W, Sc, I>
where
    N: Node<S>,
    W: TupleFn<N::Out, I>,
    Sc: Score,
    I: MatchWeight,
{
    pub fn new(
        constraint_ref: ConstraintRef,
        impact_type: ImpactType,
        weight: ConstraintWeight<Sc>,
        node: N,
        weigher: W,
    ) -> Self {
        Self {
            constraint_ref,
            impact_type,
            weight,
            node,
            weigher,
            impacts: HashMap::new(),
            justifications: None,
            total: I::zero(),
            _phantom: PhantomData,
        }
    }

    pub fn weight(&self) -> ConstraintWeight<Sc> {
        self.weight
    }

    /// Sum of the signed impacts of all current matches.
    pub fn total_impact(&self) -> I {
        self.total
    }

    fn impact_error(&self, message: String) -> PlanwrightError {
        PlanwrightError::ScoreImpact {
            constraint: self.constraint_ref.full_name(),
            message,
        }
    }

    fn corruption(&self, what: &str, id: TupleId) -> PlanwrightError {
        PlanwrightError::StateCorruption(format!(
            "constraint {} {} row {:?}",
            self.constraint_ref, what, id
        ))
    }

    fn apply(&mut self, deltas: Vec<Delta<N::Out>>) -> Result<()> {
        // Weigh and total the whole batch before touching any state.
        let mut total = self.total;
        let mut staged: HashMap<TupleId, Option<I>> = HashMap::new();
        let mut weighed = Vec::with_capacity(deltas.len());
        for delta in &deltas {
            match delta {
                Delta::Insert(id, row) => {
                    let present = match staged.get(id) {
                        Some(current) => current.is_some(),
                        None => self.impacts.contains_key(id),
                    };
                    if present {
                        return Err(self.corruption("received twice", *id));
                    }
                    let signed = self
                        .impact_type
                        .signed(self.weigher.call(row))
                        .map_err(|message| self.impact_error(message))?;
                    total = total.checked_add(signed).ok_or_else(|| {
                        self.impact_error(format!("total impact overflows adding {}", signed))
                    })?;
                    staged.insert(*id, Some(signed));
                    weighed.push(signed);
                }
                Delta::Retract(id) => {
                    let current = match staged.get(id) {
                        Some(current) => *current,
                        None => self.impacts.get(id).copied(),
                    };
                    let signed = current.ok_or_else(|| self.corruption("retracted unknown", *id))?;
                    total = total.checked_sub(signed).ok_or_else(|| {
                        self.impact_error(format!("total impact overflows removing {}", signed))
                    })?;
                    staged.insert(*id, None);
                }
            }
        }

        let mut weighed = weighed.into_iter();
        for delta in deltas {
            match delta {
                Delta::Insert(id, row) => {
                    if let Some(signed) = weighed.next() {
                        self.impacts.insert(id, signed);
                    }
                    if let Some(justifications) = self.justifications.as_mut() {
                        justifications.insert(id, row.justification());
                    }
                }
                Delta::Retract(id) => {
                    self.impacts.remove(&id);
                    if let Some(justifications) = self.justifications.as_mut() {
                        justifications.remove(&id);
                    }
                }
            }
        }
        self.total = total;
        Ok(())
    }
}

impl<S, N, W, Sc, I> IncrementalConstraint<S, Sc> for StreamConstraint<S, N, W, Sc, I>
where
    N: Node<S>,
    W: TupleFn<N::Out, I>,
    Sc: Score,
    I: MatchWeight,
{
    fn constraint_ref(&self) -> &ConstraintRef {
        &self.constraint_ref
    }

    fn impact_type(&self) -> ImpactType {
        self.impact_type
    }

    fn initialize(&mut self, descriptor: &Arc<SolutionDescriptor<S>>) -> Result<()> {
        self.node.initialize(descriptor)?;
        debug!(
            event = "constraint_initialized",
            constraint = %self.constraint_ref,
            arity = <N::Out as Tuple>::ARITY,
            configurable = self.weight.is_configurable(),
        );
        Ok(())
    }

    fn set_justification_tracking(&mut self, enabled: bool) {
        match (enabled, self.justifications.is_some()) {
            (true, false) => self.justifications = Some(HashMap::new()),
            (false, true) => self.justifications = None,
            _ => {}
        }
    }

    fn insert(&mut self, solution: &S, entity: EntityHandle) -> Result<()> {
        let mut deltas = Vec::new();
        self.node.insert(solution, entity, &mut deltas)?;
        if !deltas.is_empty() {
            trace!(
                event = "constraint_insert",
                constraint = %self.constraint_ref,
                entity = %entity,
                deltas = deltas.len(),
            );
        }
        self.apply(deltas)
    }

    fn retract(&mut self, entity: EntityHandle) -> Result<()> {
        let mut deltas = Vec::new();
        self.node.retract(entity, &mut deltas)?;
        if !deltas.is_empty() {
            trace!(
                event = "constraint_retract",
                constraint = %self.constraint_ref,
                entity = %entity,
                deltas = deltas.len(),
            );
        }
        self.apply(deltas)
    }

    fn clear(&mut self) {
        self.node.clear();
        self.impacts.clear();
        if let Some(justifications) = self.justifications.as_mut() {
            justifications.clear();
        }
        self.total = I::zero();
    }

    fn resolve_weight(&self, weights: &dyn WeightProvider<Sc>) -> Result<Sc> {
        self.weight.resolve(&self.constraint_ref, weights)
    }

    fn score(&self, weights: &dyn WeightProvider<Sc>) -> Result<Sc> {
        let weight = self.resolve_weight(weights)?;
        self.total.scale(&weight).ok_or_else(|| {
            self.impact_error(format!("weight {} scaled by {} overflows", weight, self.total))
        })
    }

    fn match_count(&self) -> usize {
        self.impacts.len()
    }

    fn matches(&self, weight: Sc) -> Result<Vec<ConstraintMatch<Sc>>> {
        let justifications = self.justifications.as_ref().ok_or_else(|| {
            PlanwrightError::InvalidState(format!(
                "constraint match tracking is disabled; cannot list matches of {}",
                self.constraint_ref
            ))
        })?;
        let mut rows: Vec<(&TupleId, &I)> = self.impacts.iter().collect();
        rows.sort_by_key(|(id, _)| **id);
        rows.into_iter()
            .map(|(id, impact)| {
                let entities = justifications.get(id).cloned().unwrap_or_default();
                ConstraintMatch::new(
                    self.constraint_ref.clone(),
                    *impact,
                    weight,
                    ConstraintJustification::new(entities),
                )
            })
            .collect()
    }
}

impl<S, N, W, Sc: fmt::Debug, I: fmt::Debug> fmt::Debug for StreamConstraint<S, N, W, Sc, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamConstraint")
            .field("constraint_ref", &self.constraint_ref)
            .field("impact_type", &self.impact_type)
            .field("weight", &self.weight)
            .field("matches", &self.impacts.len())
            .field("total", &self.total)
            .finish()
    }
}
