//! Supply arena with demand reference counting.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, trace};

use super::{
    CollectionInverseSupply, Demand, ElementPosition, ListStateSupply, SingletonInverseSupply,
    Supply, SupplyId, SupplyKind,
};
use crate::domain::descriptor::{ShadowKind, SolutionDescriptor, VariableKind};
use crate::domain::handle::{EntityHandle, ValueRef, VariableId};
use crate::error::{PlanwrightError, Result};

struct SupplySlot {
    demand: Demand,
    supply: Supply,
    demands: usize,
    /// Element class of a list-state supply.
    element_class: Option<usize>,
}

/// Owns every live supply of one working solution.
///
/// Supplies are addressed by [`SupplyId`]. Externalized supplies are
/// updated through the `before_*`/`after_*` event methods, which the
/// listener support calls in the same bracket as the shadow listeners.
pub struct SupplyManager<S> {
    descriptor: Arc<SolutionDescriptor<S>>,
    slots: Vec<Option<SupplySlot>>,
    by_demand: HashMap<Demand, SupplyId>,
}

impl<S> SupplyManager<S> {
    pub fn new(descriptor: Arc<SolutionDescriptor<S>>) -> Self {
        Self {
            descriptor,
            slots: Vec::new(),
            by_demand: HashMap::new(),
        }
    }

    /// Returns the supply for `demand`, creating it on first demand.
    ///
    /// Equal demands return the same id and increment its demand count.
    ///
    /// # Errors
    ///
    /// Returns `Config` when the source variable is unknown or of the wrong
    /// kind, and `StateCorruption` when the working solution already
    /// violates the relation (for example two chained entities pointing at
    /// the same value).
    pub fn demand(&mut self, demand: Demand, solution: &S) -> Result<SupplyId> {
        if let Some(&id) = self.by_demand.get(&demand) {
            if let Some(slot) = self.slots[id.0].as_mut() {
                slot.demands += 1;
                trace!(event = "supply_shared", demand = %demand, demands = slot.demands);
            }
            return Ok(id);
        }
        self.validate(demand)?;
        let element_class = match demand.kind {
            SupplyKind::ListState => Some(element_class(&self.descriptor, demand.source)?),
            _ => None,
        };
        let supply = match self.inline_shadows(demand) {
            Some(shadows) => Supply::Inline { shadows },
            None => build_externalized(&self.descriptor, demand, solution)?,
        };
        debug!(
            event = "supply_created",
            demand = %demand,
            variable = %self.descriptor.variable_name(demand.source),
            externalized = supply.is_externalized(),
        );
        let id = SupplyId(self.slots.len());
        self.slots.push(Some(SupplySlot {
            demand,
            supply,
            demands: 1,
            element_class,
        }));
        self.by_demand.insert(demand, id);
        Ok(id)
    }

    /// Releases one demand. Returns true when this was the last demand and
    /// the supply was dropped.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if `demand` was never demanded.
    pub fn cancel(&mut self, demand: Demand) -> Result<bool> {
        let id = self.by_demand.get(&demand).copied().ok_or_else(|| {
            PlanwrightError::InvalidState(format!("Cancelled demand ({}) is not active", demand))
        })?;
        let Some(slot) = self.slots[id.0].as_mut() else {
            return Err(PlanwrightError::InvalidState(format!(
                "Cancelled demand ({}) has no supply",
                demand
            )));
        };
        slot.demands -= 1;
        if slot.demands > 0 {
            return Ok(false);
        }
        self.slots[id.0] = None;
        self.by_demand.remove(&demand);
        debug!(event = "supply_dropped", demand = %demand);
        Ok(true)
    }

    pub fn get(&self, id: SupplyId) -> Result<&Supply> {
        self.slot(id).map(|slot| &slot.supply)
    }

    /// Number of outstanding demands for `demand`.
    pub fn demand_count(&self, demand: &Demand) -> usize {
        self.by_demand
            .get(demand)
            .and_then(|id| self.slots[id.0].as_ref())
            .map_or(0, |slot| slot.demands)
    }

    /// Number of live supplies.
    pub fn len(&self) -> usize {
        self.by_demand.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_demand.is_empty()
    }

    /// The entity whose chained variable points at `value`, if any.
    pub fn singleton_inverse(
        &self,
        id: SupplyId,
        solution: &S,
        value: ValueRef,
    ) -> Result<Option<usize>> {
        let slot = self.slot(id)?;
        match &slot.supply {
            Supply::SingletonInverse(supply) => Ok(supply.get(&value)),
            Supply::Inline { shadows } => {
                if let Some(handle) = value.as_entity() {
                    for &shadow in shadows.iter().filter(|s| s.entity == handle.descriptor) {
                        let kind = self.shadow_kind(shadow);
                        if let Some(ShadowKind::SingletonInverse(access)) = kind {
                            return Ok((access.get)(solution, handle.index));
                        }
                    }
                }
                Ok(self.scan(solution, slot.demand.source, value)?.into_iter().next())
            }
            _ => Err(self.kind_mismatch(slot, SupplyKind::SingletonInverse)),
        }
    }

    /// Entities whose basic variable points at `value`, ascending.
    pub fn collection_inverse(
        &self,
        id: SupplyId,
        solution: &S,
        value: ValueRef,
    ) -> Result<Vec<usize>> {
        let slot = self.slot(id)?;
        match &slot.supply {
            Supply::CollectionInverse(supply) => Ok(supply.get(&value)),
            Supply::Inline { shadows } => {
                if let Some(handle) = value.as_entity() {
                    for &shadow in shadows.iter().filter(|s| s.entity == handle.descriptor) {
                        let kind = self.shadow_kind(shadow);
                        if let Some(ShadowKind::CollectionInverse(access)) = kind {
                            let mut entities = (access.get)(solution, handle.index)
                                .map(<[usize]>::to_vec)
                                .unwrap_or_default();
                            entities.sort_unstable();
                            return Ok(entities);
                        }
                    }
                }
                self.scan(solution, slot.demand.source, value)
            }
            _ => Err(self.kind_mismatch(slot, SupplyKind::CollectionInverse)),
        }
    }

    /// Owner and index of a list element, or `None` if unassigned.
    pub fn list_position(&self, id: SupplyId, element: usize) -> Result<Option<ElementPosition>> {
        Ok(self.list_state(id)?.position(element))
    }

    /// Number of elements of the element class not in any list.
    pub fn unassigned_count(&self, id: SupplyId) -> Result<usize> {
        Ok(self.list_state(id)?.unassigned_count())
    }

    pub fn before_variable_changed(
        &mut self,
        solution: &S,
        variable: VariableId,
        entity: usize,
    ) -> Result<()> {
        let descriptor = &self.descriptor;
        for slot in self.slots.iter_mut().flatten() {
            if slot.demand.source == variable {
                retract_entity(descriptor, slot, solution, entity)?;
            }
        }
        Ok(())
    }

    pub fn after_variable_changed(
        &mut self,
        solution: &S,
        variable: VariableId,
        entity: usize,
    ) -> Result<()> {
        let descriptor = &self.descriptor;
        for slot in self.slots.iter_mut().flatten() {
            if slot.demand.source == variable {
                insert_entity(descriptor, slot, solution, entity)?;
            }
        }
        Ok(())
    }

    pub fn before_list_variable_changed(
        &mut self,
        solution: &S,
        variable: VariableId,
        owner: usize,
        from: usize,
        to: usize,
    ) -> Result<()> {
        let list = self.descriptor.list_elements(solution, variable, owner)?;
        for slot in self.slots.iter_mut().flatten() {
            if slot.demand.source != variable {
                continue;
            }
            if let Supply::ListState(supply) = &mut slot.supply {
                supply.retract_range(owner, list, from, to)?;
            }
        }
        Ok(())
    }

    pub fn after_list_variable_changed(
        &mut self,
        solution: &S,
        variable: VariableId,
        owner: usize,
        from: usize,
        to: usize,
    ) -> Result<()> {
        let list = self.descriptor.list_elements(solution, variable, owner)?;
        for slot in self.slots.iter_mut().flatten() {
            if slot.demand.source != variable {
                continue;
            }
            if let Supply::ListState(supply) = &mut slot.supply {
                supply.insert_range(owner, list, from, to)?;
            }
        }
        Ok(())
    }

    /// Records a newly added entity (its variables already hold values).
    pub fn after_entity_added(&mut self, solution: &S, entity: EntityHandle) -> Result<()> {
        let descriptor = &self.descriptor;
        for slot in self.slots.iter_mut().flatten() {
            if slot.demand.source.entity == entity.descriptor {
                insert_entity(descriptor, slot, solution, entity.index)?;
            }
        }
        self.refresh_element_counts(solution, entity.descriptor);
        Ok(())
    }

    /// Forgets an entity that is about to be removed.
    pub fn before_entity_removed(&mut self, solution: &S, entity: EntityHandle) -> Result<()> {
        let descriptor = &self.descriptor;
        for slot in self.slots.iter_mut().flatten() {
            if slot.demand.source.entity == entity.descriptor {
                retract_entity(descriptor, slot, solution, entity.index)?;
            }
        }
        Ok(())
    }

    pub fn after_entity_removed(&mut self, solution: &S, entity: EntityHandle) {
        self.refresh_element_counts(solution, entity.descriptor);
    }

    /// Rebuilds every externalized supply from the working solution.
    pub fn reset_working_solution(&mut self, solution: &S) -> Result<()> {
        let descriptor = &self.descriptor;
        for slot in self.slots.iter_mut().flatten() {
            if slot.supply.is_externalized() {
                slot.supply = build_externalized(descriptor, slot.demand, solution)?;
            }
        }
        debug!(event = "supplies_reset", supplies = self.by_demand.len());
        Ok(())
    }

    /// Drops every supply; outstanding ids become invalid.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.by_demand.clear();
    }

    /// Compares every externalized supply against a fresh rebuild.
    ///
    /// # Errors
    ///
    /// Returns `StateCorruption` naming the first stale supply.
    pub fn assert_consistent(&self, solution: &S) -> Result<()> {
        for slot in self.slots.iter().flatten() {
            if !slot.supply.is_externalized() {
                continue;
            }
            let fresh = build_externalized(&self.descriptor, slot.demand, solution)?;
            if fresh != slot.supply {
                return Err(PlanwrightError::StateCorruption(format!(
                    "Supply ({}) of variable ({}) is stale: it differs from a rebuild from the \
                     working solution",
                    slot.demand,
                    self.descriptor.variable_name(slot.demand.source)
                )));
            }
        }
        Ok(())
    }

    fn slot(&self, id: SupplyId) -> Result<&SupplySlot> {
        self.slots
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or_else(|| {
                PlanwrightError::InvalidState(format!("Supply ({:?}) is not active", id))
            })
    }

    fn list_state(&self, id: SupplyId) -> Result<&ListStateSupply> {
        let slot = self.slot(id)?;
        match &slot.supply {
            Supply::ListState(supply) => Ok(supply),
            _ => Err(self.kind_mismatch(slot, SupplyKind::ListState)),
        }
    }

    fn kind_mismatch(&self, slot: &SupplySlot, wanted: SupplyKind) -> PlanwrightError {
        PlanwrightError::InvalidState(format!(
            "Supply ({}) was queried as a {} supply",
            slot.demand,
            wanted.label()
        ))
    }

    fn shadow_kind(&self, shadow: VariableId) -> Option<&ShadowKind<S>> {
        self.descriptor
            .variable(shadow)
            .and_then(|v| v.shadow_descriptor())
            .map(|d| &d.kind)
    }

    fn validate(&self, demand: Demand) -> Result<()> {
        let variable = self.descriptor.variable(demand.source).ok_or_else(|| {
            PlanwrightError::Config(format!("Demand ({}) names an unknown variable", demand))
        })?;
        let compatible = match demand.kind {
            SupplyKind::SingletonInverse => variable.is_chained(),
            SupplyKind::CollectionInverse => matches!(variable.kind, VariableKind::Basic(_)),
            SupplyKind::ListState => variable.is_list(),
        };
        if !compatible {
            return Err(PlanwrightError::Config(format!(
                "A {} supply cannot be sourced on {} variable ({})",
                demand.kind.label(),
                variable.kind.label(),
                self.descriptor.variable_name(demand.source)
            )));
        }
        Ok(())
    }

    /// Shadow variables that already maintain the demanded relation.
    fn inline_shadows(&self, demand: Demand) -> Option<Vec<VariableId>> {
        let shadows: Vec<VariableId> = self
            .descriptor
            .shadow_graph()
            .dependents_of(demand.source)
            .iter()
            .copied()
            .filter(|&shadow| {
                matches!(
                    (demand.kind, self.shadow_kind(shadow)),
                    (SupplyKind::SingletonInverse, Some(ShadowKind::SingletonInverse(_)))
                        | (SupplyKind::CollectionInverse, Some(ShadowKind::CollectionInverse(_)))
                )
            })
            .collect();
        (!shadows.is_empty()).then_some(shadows)
    }

    /// Linear fallback for values no inline shadow covers.
    fn scan(&self, solution: &S, source: VariableId, value: ValueRef) -> Result<Vec<usize>> {
        let mut entities = Vec::new();
        for index in 0..self.descriptor.entity_count(solution, source.entity) {
            if self.descriptor.get_value(solution, source, index)? == Some(value) {
                entities.push(index);
            }
        }
        Ok(entities)
    }

    fn refresh_element_counts(&mut self, solution: &S, class: usize) {
        let count = self.descriptor.entity_count(solution, class);
        for slot in self.slots.iter_mut().flatten() {
            if slot.element_class != Some(class) {
                continue;
            }
            if let Supply::ListState(supply) = &mut slot.supply {
                supply.set_element_count(count);
            }
        }
    }
}

fn element_class<S>(descriptor: &SolutionDescriptor<S>, source: VariableId) -> Result<usize> {
    let element_type = descriptor
        .variable_or_fail(source)?
        .list_accessor()
        .map(|access| access.element_type)
        .unwrap_or_default();
    descriptor.find_entity_descriptor(element_type).ok_or_else(|| {
        PlanwrightError::Config(format!(
            "List variable ({}) has element class ({}) which is not registered",
            descriptor.variable_name(source),
            element_type
        ))
    })
}

fn build_externalized<S>(
    descriptor: &SolutionDescriptor<S>,
    demand: Demand,
    solution: &S,
) -> Result<Supply> {
    let source = demand.source;
    let count = descriptor.entity_count(solution, source.entity);
    Ok(match demand.kind {
        SupplyKind::SingletonInverse => {
            let mut supply = SingletonInverseSupply::new();
            for index in 0..count {
                if let Some(value) = descriptor.get_value(solution, source, index)? {
                    supply.insert(value, index)?;
                }
            }
            Supply::SingletonInverse(supply)
        }
        SupplyKind::CollectionInverse => {
            let mut supply = CollectionInverseSupply::new();
            for index in 0..count {
                if let Some(value) = descriptor.get_value(solution, source, index)? {
                    supply.insert(value, index)?;
                }
            }
            Supply::CollectionInverse(supply)
        }
        SupplyKind::ListState => {
            let mut supply = ListStateSupply::new();
            let class = element_class(descriptor, source)?;
            supply.set_element_count(descriptor.entity_count(solution, class));
            for owner in 0..count {
                let list = descriptor.list_elements(solution, source, owner)?;
                supply.insert_range(owner, list, 0, list.len())?;
            }
            Supply::ListState(supply)
        }
    })
}

fn retract_entity<S>(
    descriptor: &SolutionDescriptor<S>,
    slot: &mut SupplySlot,
    solution: &S,
    entity: usize,
) -> Result<()> {
    let source = slot.demand.source;
    match &mut slot.supply {
        Supply::SingletonInverse(supply) => {
            if let Some(value) = descriptor.get_value(solution, source, entity)? {
                supply.retract(value, entity)?;
            }
        }
        Supply::CollectionInverse(supply) => {
            if let Some(value) = descriptor.get_value(solution, source, entity)? {
                supply.retract(value, entity)?;
            }
        }
        Supply::ListState(supply) => {
            let list = descriptor.list_elements(solution, source, entity)?;
            supply.retract_range(entity, list, 0, list.len())?;
        }
        Supply::Inline { .. } => {}
    }
    Ok(())
}

fn insert_entity<S>(
    descriptor: &SolutionDescriptor<S>,
    slot: &mut SupplySlot,
    solution: &S,
    entity: usize,
) -> Result<()> {
    let source = slot.demand.source;
    match &mut slot.supply {
        Supply::SingletonInverse(supply) => {
            if let Some(value) = descriptor.get_value(solution, source, entity)? {
                supply.insert(value, entity)?;
            }
        }
        Supply::CollectionInverse(supply) => {
            if let Some(value) = descriptor.get_value(solution, source, entity)? {
                supply.insert(value, entity)?;
            }
        }
        Supply::ListState(supply) => {
            let list = descriptor.list_elements(solution, source, entity)?;
            supply.insert_range(entity, list, 0, list.len())?;
        }
        Supply::Inline { .. } => {}
    }
    Ok(())
}
