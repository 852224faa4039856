//! Routing of change notifications to shadow listeners and supplies.

use std::collections::{BTreeSet, HashMap};
use std::mem;
use std::sync::Arc;

use tracing::{debug, trace};

use super::anchor::AnchorListener;
use super::custom::CustomShadowListener;
use super::inverse::{CollectionInverseListener, SingletonInverseListener};
use super::list::{ListIndexListener, ListInverseListener};
use super::traits::{ListVariableListener, VariableListener};
use crate::domain::descriptor::{ShadowGraph, ShadowKind, SolutionDescriptor};
use crate::domain::handle::{EntityHandle, VariableId};
use crate::domain::supply::{Demand, SupplyId, SupplyManager};
use crate::error::{PlanwrightError, Result};

/// The listener maintaining one shadow variable.
pub enum ShadowListener<S> {
    SingletonInverse(SingletonInverseListener<S>),
    Anchor(AnchorListener<S>),
    CollectionInverse(CollectionInverseListener<S>),
    ListInverse(ListInverseListener<S>),
    ListIndex(ListIndexListener<S>),
    Custom(CustomShadowListener<S>),
}

impl<S> ShadowListener<S> {
    /// Builds the listener for a resolved shadow variable.
    pub fn for_shadow(descriptor: &SolutionDescriptor<S>, shadow: VariableId) -> Result<Self> {
        let variable = descriptor.variable_or_fail(shadow)?;
        let kind = &variable
            .shadow_descriptor()
            .ok_or_else(|| {
                PlanwrightError::Config(format!(
                    "Variable ({}) is not a shadow variable",
                    descriptor.variable_name(shadow)
                ))
            })?
            .kind;
        let source = descriptor.source_variables(shadow).first().copied().ok_or_else(|| {
            PlanwrightError::Config(format!(
                "Shadow variable ({}) has no resolved source",
                descriptor.variable_name(shadow)
            ))
        })?;
        let source_variable = descriptor.variable_or_fail(source)?;
        let mismatch = || {
            PlanwrightError::Config(format!(
                "Shadow variable ({}) cannot listen to {} variable ({})",
                descriptor.variable_name(shadow),
                source_variable.kind.label(),
                descriptor.variable_name(source)
            ))
        };
        Ok(match kind {
            ShadowKind::SingletonInverse(slot) => {
                let access = source_variable.basic_accessor().copied().ok_or_else(mismatch)?;
                ShadowListener::SingletonInverse(SingletonInverseListener::new(
                    shadow, source, access, *slot,
                ))
            }
            ShadowKind::Anchor(slot) => {
                let access = source_variable.basic_accessor().copied().ok_or_else(mismatch)?;
                let count = descriptor
                    .entity_descriptor(shadow.entity)
                    .map(|d| d.counter())
                    .ok_or_else(mismatch)?;
                ShadowListener::Anchor(AnchorListener::new(shadow, access, *slot, count))
            }
            ShadowKind::CollectionInverse(collection) => {
                let access = source_variable.basic_accessor().copied().ok_or_else(mismatch)?;
                ShadowListener::CollectionInverse(CollectionInverseListener::new(
                    shadow,
                    source,
                    access,
                    *collection,
                ))
            }
            ShadowKind::ListInverse(slot) => {
                let list = source_variable.list_accessor().copied().ok_or_else(mismatch)?;
                ShadowListener::ListInverse(ListInverseListener::new(shadow, source, list, *slot))
            }
            ShadowKind::ListIndex(slot) => {
                let list = source_variable.list_accessor().copied().ok_or_else(mismatch)?;
                ShadowListener::ListIndex(ListIndexListener::new(shadow, source, list, *slot))
            }
            ShadowKind::Custom { update } => {
                ShadowListener::Custom(CustomShadowListener::new(shadow, *update))
            }
        })
    }

    pub fn shadow(&self) -> VariableId {
        match self {
            ShadowListener::SingletonInverse(l) => l.shadow(),
            ShadowListener::Anchor(l) => l.shadow(),
            ShadowListener::CollectionInverse(l) => l.shadow(),
            ShadowListener::ListInverse(l) => l.shadow(),
            ShadowListener::ListIndex(l) => l.shadow(),
            ShadowListener::Custom(l) => l.shadow(),
        }
    }

    /// The basic-variable listener behind this shadow, if any.
    fn as_variable_listener(&mut self) -> Option<&mut dyn VariableListener<S>> {
        match self {
            ShadowListener::SingletonInverse(l) => Some(l),
            ShadowListener::Anchor(l) => Some(l),
            ShadowListener::CollectionInverse(l) => Some(l),
            _ => None,
        }
    }

    fn before_entity_removed(
        &mut self,
        solution: &mut S,
        entity: usize,
        touched: &mut Vec<EntityHandle>,
    ) -> Result<()> {
        match self {
            ShadowListener::ListInverse(l) => {
                ListVariableListener::before_entity_removed(l, solution, entity, touched)
            }
            ShadowListener::ListIndex(l) => {
                ListVariableListener::before_entity_removed(l, solution, entity, touched)
            }
            ShadowListener::Custom(_) => Ok(()),
            other => match other.as_variable_listener() {
                Some(l) => l.before_entity_removed(solution, entity, touched),
                None => Ok(()),
            },
        }
    }

    fn after_entity_added(
        &mut self,
        solution: &mut S,
        entity: usize,
        touched: &mut Vec<EntityHandle>,
    ) -> Result<()> {
        match self {
            ShadowListener::ListInverse(l) => {
                ListVariableListener::after_entity_added(l, solution, entity, touched)
            }
            ShadowListener::ListIndex(l) => {
                ListVariableListener::after_entity_added(l, solution, entity, touched)
            }
            ShadowListener::Custom(_) => Ok(()),
            other => match other.as_variable_listener() {
                Some(l) => l.after_entity_added(solution, entity, touched),
                None => Ok(()),
            },
        }
    }
}

/// A change whose after-listeners have not run yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Notification {
    Variable { variable: VariableId, entity: usize },
    List { variable: VariableId, owner: usize, from: usize, to: usize },
    EntityAdded(EntityHandle),
}

/// Keeps every shadow variable and supply of a working solution current.
///
/// Before-events are applied immediately, because they must observe the
/// old source value. After-events are queued and only applied by
/// [`trigger_variable_listeners`](Self::trigger_variable_listeners), which
/// also reruns custom shadows in topological order and reports every
/// entity whose shadow state changed.
pub struct VariableListenerSupport<S> {
    descriptor: Arc<SolutionDescriptor<S>>,
    /// One listener per shadow variable, indexed by topological rank.
    listeners: Vec<ShadowListener<S>>,
    by_source: HashMap<VariableId, Vec<usize>>,
    pending: Vec<Notification>,
    touched: BTreeSet<EntityHandle>,
    /// Custom shadows awaiting recomputation, as (rank, entity index).
    stale_customs: BTreeSet<(usize, usize)>,
    supplies: SupplyManager<S>,
}

impl<S> VariableListenerSupport<S> {
    pub fn new(descriptor: Arc<SolutionDescriptor<S>>) -> Result<Self> {
        let graph = descriptor.shadow_graph();
        let mut listeners = Vec::with_capacity(graph.shadow_count());
        let mut by_source: HashMap<VariableId, Vec<usize>> = HashMap::new();
        for (rank, &shadow) in graph.topological_order().iter().enumerate() {
            listeners.push(ShadowListener::for_shadow(&descriptor, shadow)?);
            for &source in graph.sources_of(shadow) {
                by_source.entry(source).or_default().push(rank);
            }
        }
        debug!(
            event = "listeners_linked",
            solution = descriptor.type_name,
            listeners = listeners.len(),
            sources = by_source.len(),
        );
        Ok(Self {
            supplies: SupplyManager::new(Arc::clone(&descriptor)),
            descriptor,
            listeners,
            by_source,
            pending: Vec::new(),
            touched: BTreeSet::new(),
            stale_customs: BTreeSet::new(),
        })
    }

    pub fn descriptor(&self) -> &Arc<SolutionDescriptor<S>> {
        &self.descriptor
    }

    pub fn listeners(&self) -> &[ShadowListener<S>] {
        &self.listeners
    }

    pub fn supplies(&self) -> &SupplyManager<S> {
        &self.supplies
    }

    /// Demands a supply; see [`SupplyManager::demand`].
    pub fn demand(&mut self, demand: Demand, solution: &S) -> Result<SupplyId> {
        self.supplies.demand(demand, solution)
    }

    pub fn cancel(&mut self, demand: Demand) -> Result<bool> {
        self.supplies.cancel(demand)
    }

    /// Whether after-events are waiting for a trigger.
    pub fn has_pending_notifications(&self) -> bool {
        !self.pending.is_empty() || !self.stale_customs.is_empty()
    }

    pub fn before_variable_changed(
        &mut self,
        solution: &mut S,
        variable: VariableId,
        entity: usize,
    ) -> Result<()> {
        self.supplies.before_variable_changed(solution, variable, entity)?;
        let descriptor = Arc::clone(&self.descriptor);
        let mut buffer = Vec::new();
        for &rank in self.by_source.get(&variable).map(Vec::as_slice).unwrap_or(&[]) {
            if let Some(l) = self.listeners[rank].as_variable_listener() {
                l.before_variable_changed(solution, entity, &mut buffer)?;
            }
            route(
                descriptor.shadow_graph(),
                &self.listeners[rank],
                &mut buffer,
                &mut self.touched,
                &mut self.stale_customs,
            );
        }
        Ok(())
    }

    pub fn after_variable_changed(
        &mut self,
        solution: &S,
        variable: VariableId,
        entity: usize,
    ) -> Result<()> {
        self.supplies.after_variable_changed(solution, variable, entity)?;
        self.pending.push(Notification::Variable { variable, entity });
        Ok(())
    }

    pub fn before_list_variable_changed(
        &mut self,
        solution: &mut S,
        variable: VariableId,
        owner: usize,
        from: usize,
        to: usize,
    ) -> Result<()> {
        self.supplies.before_list_variable_changed(solution, variable, owner, from, to)?;
        let descriptor = Arc::clone(&self.descriptor);
        let mut buffer = Vec::new();
        for &rank in self.by_source.get(&variable).map(Vec::as_slice).unwrap_or(&[]) {
            match &mut self.listeners[rank] {
                ShadowListener::ListInverse(l) => {
                    l.before_list_variable_changed(solution, owner, from, to, &mut buffer)?
                }
                ShadowListener::ListIndex(l) => {
                    l.before_list_variable_changed(solution, owner, from, to, &mut buffer)?
                }
                _ => {}
            }
            route(
                descriptor.shadow_graph(),
                &self.listeners[rank],
                &mut buffer,
                &mut self.touched,
                &mut self.stale_customs,
            );
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
        self.supplies.after_list_variable_changed(solution, variable, owner, from, to)?;
        self.pending.push(Notification::List {
            variable,
            owner,
            from,
            to,
        });
        Ok(())
    }

    pub fn after_entity_added(&mut self, solution: &S, entity: EntityHandle) -> Result<()> {
        self.supplies.after_entity_added(solution, entity)?;
        self.pending.push(Notification::EntityAdded(entity));
        Ok(())
    }

    pub fn before_entity_removed(&mut self, solution: &mut S, entity: EntityHandle) -> Result<()> {
        self.supplies.before_entity_removed(solution, entity)?;
        let descriptor = Arc::clone(&self.descriptor);
        let mut buffer = Vec::new();
        for variable in genuine_variables_of(&descriptor, entity.descriptor) {
            for &rank in self.by_source.get(&variable).map(Vec::as_slice).unwrap_or(&[]) {
                self.listeners[rank].before_entity_removed(solution, entity.index, &mut buffer)?;
                route(
                    descriptor.shadow_graph(),
                    &self.listeners[rank],
                    &mut buffer,
                    &mut self.touched,
                    &mut self.stale_customs,
                );
            }
        }
        Ok(())
    }

    /// Forgets pending work on the removed slot, which no longer exists.
    pub fn after_entity_removed(&mut self, solution: &S, entity: EntityHandle) {
        self.supplies.after_entity_removed(solution, entity);
        self.touched.remove(&entity);
        let ranks: Vec<usize> = self
            .listeners
            .iter()
            .enumerate()
            .filter(|(_, l)| l.shadow().entity == entity.descriptor)
            .map(|(rank, _)| rank)
            .collect();
        for rank in ranks {
            self.stale_customs.remove(&(rank, entity.index));
        }
    }

    /// Applies every queued after-event, then reruns affected custom
    /// shadows in topological order.
    ///
    /// Returns the handles of all entities whose shadow state changed since
    /// the previous trigger, in ascending order.
    pub fn trigger_variable_listeners(&mut self, solution: &mut S) -> Result<Vec<EntityHandle>> {
        let pending = mem::take(&mut self.pending);
        let descriptor = Arc::clone(&self.descriptor);
        let graph = descriptor.shadow_graph();
        let mut queue = mem::take(&mut self.stale_customs);
        let mut buffer = Vec::new();

        for notification in &pending {
            match *notification {
                Notification::Variable { variable, entity } => {
                    let ranks = self.by_source.get(&variable).map(Vec::as_slice).unwrap_or(&[]);
                    for &rank in ranks {
                        let listener = &mut self.listeners[rank];
                        if let ShadowListener::Custom(_) = listener {
                            queue.insert((rank, entity));
                        } else if let Some(l) = listener.as_variable_listener() {
                            l.after_variable_changed(solution, entity, &mut buffer)?;
                        }
                        route(graph, listener, &mut buffer, &mut self.touched, &mut queue);
                    }
                }
                Notification::List {
                    variable,
                    owner,
                    from,
                    to,
                } => {
                    let ranks = self.by_source.get(&variable).map(Vec::as_slice).unwrap_or(&[]);
                    for &rank in ranks {
                        match &mut self.listeners[rank] {
                            ShadowListener::ListInverse(l) => {
                                l.after_list_variable_changed(
                                    solution,
                                    owner,
                                    from,
                                    to,
                                    &mut buffer,
                                )?
                            }
                            ShadowListener::ListIndex(l) => {
                                l.after_list_variable_changed(
                                    solution,
                                    owner,
                                    from,
                                    to,
                                    &mut buffer,
                                )?
                            }
                            ShadowListener::Custom(_) => {
                                queue.insert((rank, owner));
                            }
                            _ => {}
                        }
                        let listener = &self.listeners[rank];
                        route(graph, listener, &mut buffer, &mut self.touched, &mut queue);
                    }
                }
                Notification::EntityAdded(entity) => {
                    for variable in genuine_variables_of(&descriptor, entity.descriptor) {
                        let ranks = self.by_source.get(&variable).map(Vec::as_slice).unwrap_or(&[]);
                        for &rank in ranks {
                            let listener = &mut self.listeners[rank];
                            listener.after_entity_added(solution, entity.index, &mut buffer)?;
                            route(graph, listener, &mut buffer, &mut self.touched, &mut queue);
                        }
                    }
                    for (rank, listener) in self.listeners.iter().enumerate() {
                        if let ShadowListener::Custom(l) = listener {
                            if l.shadow().entity == entity.descriptor {
                                queue.insert((rank, entity.index));
                            }
                        }
                    }
                }
            }
        }

        while let Some((rank, entity)) = queue.pop_first() {
            if let ShadowListener::Custom(l) = &self.listeners[rank] {
                l.update(solution, entity, &mut buffer);
            }
            let listener = &self.listeners[rank];
            route(graph, listener, &mut buffer, &mut self.touched, &mut queue);
        }

        let touched: Vec<EntityHandle> = mem::take(&mut self.touched).into_iter().collect();
        trace!(
            event = "listeners_triggered",
            notifications = pending.len(),
            touched = touched.len(),
        );
        Ok(touched)
    }

    /// Recomputes every shadow variable and externalized supply from the
    /// genuine variables. Idempotent.
    pub fn reset_working_solution(&mut self, solution: &mut S) -> Result<()> {
        self.pending.clear();
        self.touched.clear();
        self.stale_customs.clear();
        let descriptor = Arc::clone(&self.descriptor);
        for listener in &mut self.listeners {
            match listener {
                ShadowListener::ListInverse(l) => l.reset_working_solution(&descriptor, solution)?,
                ShadowListener::ListIndex(l) => l.reset_working_solution(&descriptor, solution)?,
                ShadowListener::Custom(_) => {}
                other => {
                    if let Some(l) = other.as_variable_listener() {
                        l.reset_working_solution(&descriptor, solution)?;
                    }
                }
            }
        }
        for listener in &self.listeners {
            if let ShadowListener::Custom(l) = listener {
                l.reset_working_solution(&descriptor, solution);
            }
        }
        self.supplies.reset_working_solution(solution)?;
        debug!(event = "shadows_reset", listeners = self.listeners.len());
        Ok(())
    }

    /// Drops queued events and every supply.
    pub fn clear_working_solution(&mut self) {
        self.pending.clear();
        self.touched.clear();
        self.stale_customs.clear();
        self.supplies.clear();
    }

    /// Compares every built-in shadow against the value implied by its
    /// source. Custom shadows are opaque and are not checked.
    pub fn assert_shadows_not_stale(&self, solution: &S) -> Result<()> {
        for listener in &self.listeners {
            let descriptor = &self.descriptor;
            match listener {
                ShadowListener::SingletonInverse(l) => l.assert_not_stale(descriptor, solution)?,
                ShadowListener::Anchor(l) => l.assert_not_stale(descriptor, solution)?,
                ShadowListener::CollectionInverse(l) => l.assert_not_stale(descriptor, solution)?,
                ShadowListener::ListInverse(l) => l.assert_not_stale(descriptor, solution)?,
                ShadowListener::ListIndex(l) => l.assert_not_stale(descriptor, solution)?,
                ShadowListener::Custom(_) => {}
            }
        }
        Ok(())
    }

    /// See [`SupplyManager::assert_consistent`].
    pub fn assert_supplies_consistent(&self, solution: &S) -> Result<()> {
        self.supplies.assert_consistent(solution)
    }
}

fn genuine_variables_of<S>(descriptor: &SolutionDescriptor<S>, class: usize) -> Vec<VariableId> {
    descriptor
        .entity_descriptor(class)
        .map(|d| d.genuine_variables().map(|(v, _)| VariableId::new(class, v)).collect())
        .unwrap_or_default()
}

/// Records the handles a listener touched and queues the custom shadows
/// that depend on its shadow for those entities.
fn route<S>(
    graph: &ShadowGraph,
    listener: &ShadowListener<S>,
    buffer: &mut Vec<EntityHandle>,
    touched: &mut BTreeSet<EntityHandle>,
    queue: &mut BTreeSet<(usize, usize)>,
) {
    let dependents = graph.dependents_of(listener.shadow());
    for handle in buffer.drain(..) {
        touched.insert(handle);
        for &dependent in dependents {
            if let Some(rank) = graph.rank_of(dependent) {
                queue.insert((rank, handle.index));
            }
        }
    }
}
