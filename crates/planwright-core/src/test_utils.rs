//! Test utilities for planwright-core
//!
//! Small domain models covering each shadow-variable kind.

use crate::domain::{EntityDescriptor, SolutionDescriptor, SourceRef, ValueRef, VariableDescriptor};

pub const ANCHOR: usize = 0;
pub const VISIT: usize = 1;

/// A chain anchor. `next` is the singleton inverse of `Visit.previous`.
#[derive(Clone, Debug, Default)]
pub struct Anchor {
    pub next: Option<usize>,
}

/// A chained visit. `anchor` is only maintained by
/// [`anchored_chain_descriptor`].
#[derive(Clone, Debug, Default)]
pub struct Visit {
    pub previous: Option<ValueRef>,
    pub next: Option<usize>,
    pub anchor: Option<usize>,
}

#[derive(Clone, Debug, Default)]
pub struct ChainSolution {
    pub anchors: Vec<Anchor>,
    pub visits: Vec<Visit>,
}

impl ChainSolution {
    /// Builds anchors and visits; `previous[i]` is the chained value of visit `i`.
    pub fn new(anchor_count: usize, previous: &[Option<ValueRef>]) -> Self {
        Self {
            anchors: vec![Anchor::default(); anchor_count],
            visits: previous
                .iter()
                .map(|p| Visit {
                    previous: *p,
                    ..Visit::default()
                })
                .collect(),
        }
    }
}

pub fn anchor(i: usize) -> Option<ValueRef> {
    Some(ValueRef::Entity(crate::domain::EntityHandle::new(ANCHOR, i)))
}

pub fn visit(i: usize) -> Option<ValueRef> {
    Some(ValueRef::Entity(crate::domain::EntityHandle::new(VISIT, i)))
}

fn anchor_count(s: &ChainSolution) -> usize {
    s.anchors.len()
}

fn visit_count(s: &ChainSolution) -> usize {
    s.visits.len()
}

fn get_previous(s: &ChainSolution, i: usize) -> Option<ValueRef> {
    s.visits[i].previous
}

fn set_previous(s: &mut ChainSolution, i: usize, v: Option<ValueRef>) {
    s.visits[i].previous = v;
}

fn get_anchor_next(s: &ChainSolution, i: usize) -> Option<usize> {
    s.anchors[i].next
}

fn set_anchor_next(s: &mut ChainSolution, i: usize, v: Option<usize>) {
    s.anchors[i].next = v;
}

fn get_visit_next(s: &ChainSolution, i: usize) -> Option<usize> {
    s.visits[i].next
}

fn set_visit_next(s: &mut ChainSolution, i: usize, v: Option<usize>) {
    s.visits[i].next = v;
}

fn get_visit_anchor(s: &ChainSolution, i: usize) -> Option<usize> {
    s.visits[i].anchor
}

fn set_visit_anchor(s: &mut ChainSolution, i: usize, v: Option<usize>) {
    s.visits[i].anchor = v;
}

/// Chain model without shadow variables, so supplies are externalized.
pub fn bare_chain_descriptor() -> SolutionDescriptor<ChainSolution> {
    SolutionDescriptor::new("ChainSolution")
        .with_entity(EntityDescriptor::new::<Anchor>("Anchor", "anchors", anchor_count))
        .with_entity(
            EntityDescriptor::new::<Visit>("Visit", "visits", visit_count)
                .with_variable(VariableDescriptor::chained("previous", get_previous, set_previous)),
        )
        .build()
        .expect("bare chain descriptor is valid")
}

pub fn chain_descriptor() -> SolutionDescriptor<ChainSolution> {
    let source = SourceRef::new("Visit", "previous");
    SolutionDescriptor::new("ChainSolution")
        .with_entity(
            EntityDescriptor::new::<Anchor>("Anchor", "anchors", anchor_count).with_variable(
                VariableDescriptor::singleton_inverse(
                    "next",
                    source,
                    get_anchor_next,
                    set_anchor_next,
                ),
            ),
        )
        .with_entity(
            EntityDescriptor::new::<Visit>("Visit", "visits", visit_count)
                .with_variable(VariableDescriptor::chained("previous", get_previous, set_previous))
                .with_variable(VariableDescriptor::singleton_inverse(
                    "next",
                    source,
                    get_visit_next,
                    set_visit_next,
                )),
        )
        .build()
        .expect("chain descriptor is valid")
}

/// Chain model where each visit only tracks its anchor.
pub fn anchored_chain_descriptor() -> SolutionDescriptor<ChainSolution> {
    SolutionDescriptor::new("ChainSolution")
        .with_entity(EntityDescriptor::new::<Anchor>("Anchor", "anchors", anchor_count))
        .with_entity(
            EntityDescriptor::new::<Visit>("Visit", "visits", visit_count)
                .with_variable(VariableDescriptor::chained("previous", get_previous, set_previous))
                .with_variable(VariableDescriptor::anchor(
                    "anchor",
                    SourceRef::new("Visit", "previous"),
                    get_visit_anchor,
                    set_visit_anchor,
                )),
        )
        .build()
        .expect("anchored chain descriptor is valid")
}

pub const WORKER: usize = 0;
pub const TASK: usize = 1;

#[derive(Clone, Debug)]
pub struct Worker {
    pub tasks: Option<Vec<usize>>,
}

#[derive(Clone, Debug)]
pub struct Task {
    pub worker: Option<ValueRef>,
}

#[derive(Clone, Debug)]
pub struct Roster {
    pub workers: Vec<Worker>,
    pub tasks: Vec<Task>,
}

impl Roster {
    /// `assignment[t]` is the worker index of task `t`.
    pub fn new(worker_count: usize, assignment: &[Option<usize>]) -> Self {
        Self {
            workers: vec![Worker { tasks: Some(Vec::new()) }; worker_count],
            tasks: assignment
                .iter()
                .map(|w| Task {
                    worker: w.map(worker),
                })
                .collect(),
        }
    }
}

pub fn worker(i: usize) -> ValueRef {
    ValueRef::Entity(crate::domain::EntityHandle::new(WORKER, i))
}

fn worker_count(s: &Roster) -> usize {
    s.workers.len()
}

fn task_count(s: &Roster) -> usize {
    s.tasks.len()
}

fn get_worker(s: &Roster, i: usize) -> Option<ValueRef> {
    s.tasks[i].worker
}

fn set_worker(s: &mut Roster, i: usize, v: Option<ValueRef>) {
    s.tasks[i].worker = v;
}

fn get_tasks(s: &Roster, i: usize) -> Option<&[usize]> {
    s.workers[i].tasks.as_deref()
}

fn tasks_slot(s: &mut Roster, i: usize) -> &mut Option<Vec<usize>> {
    &mut s.workers[i].tasks
}

/// Roster model without the collection inverse shadow.
pub fn bare_roster_descriptor() -> SolutionDescriptor<Roster> {
    SolutionDescriptor::new("Roster")
        .with_entity(EntityDescriptor::new::<Worker>("Worker", "workers", worker_count))
        .with_entity(
            EntityDescriptor::new::<Task>("Task", "tasks", task_count).with_variable(
                VariableDescriptor::basic("worker", get_worker, set_worker).allowing_unassigned(),
            ),
        )
        .build()
        .expect("bare roster descriptor is valid")
}

pub fn roster_descriptor() -> SolutionDescriptor<Roster> {
    SolutionDescriptor::new("Roster")
        .with_entity(
            EntityDescriptor::new::<Worker>("Worker", "workers", worker_count).with_variable(
                VariableDescriptor::collection_inverse(
                    "tasks",
                    SourceRef::new("Task", "worker"),
                    get_tasks,
                    tasks_slot,
                ),
            ),
        )
        .with_entity(
            EntityDescriptor::new::<Task>("Task", "tasks", task_count).with_variable(
                VariableDescriptor::basic("worker", get_worker, set_worker).allowing_unassigned(),
            ),
        )
        .build()
        .expect("roster descriptor is valid")
}

pub const VEHICLE: usize = 0;
pub const STOP: usize = 1;

#[derive(Clone, Debug, Default)]
pub struct Vehicle {
    pub stops: Vec<usize>,
}

#[derive(Clone, Debug, Default)]
pub struct Stop {
    pub vehicle: Option<usize>,
    pub index: Option<usize>,
    /// Custom shadow: ten minutes per preceding stop.
    pub arrival: Option<i64>,
}

#[derive(Clone, Debug, Default)]
pub struct Fleet {
    pub vehicles: Vec<Vehicle>,
    pub stops: Vec<Stop>,
}

impl Fleet {
    pub fn new(stop_count: usize, routes: Vec<Vec<usize>>) -> Self {
        Self {
            vehicles: routes.into_iter().map(|stops| Vehicle { stops }).collect(),
            stops: vec![Stop::default(); stop_count],
        }
    }
}

fn vehicle_count(s: &Fleet) -> usize {
    s.vehicles.len()
}

fn stop_count(s: &Fleet) -> usize {
    s.stops.len()
}

fn get_stops(s: &Fleet, i: usize) -> &[usize] {
    &s.vehicles[i].stops
}

fn get_stops_mut(s: &mut Fleet, i: usize) -> &mut Vec<usize> {
    &mut s.vehicles[i].stops
}

fn get_vehicle(s: &Fleet, i: usize) -> Option<usize> {
    s.stops[i].vehicle
}

fn set_vehicle(s: &mut Fleet, i: usize, v: Option<usize>) {
    s.stops[i].vehicle = v;
}

fn get_index(s: &Fleet, i: usize) -> Option<usize> {
    s.stops[i].index
}

fn set_index(s: &mut Fleet, i: usize, v: Option<usize>) {
    s.stops[i].index = v;
}

fn update_arrival(s: &mut Fleet, i: usize) {
    s.stops[i].arrival = s.stops[i].index.map(|idx| idx as i64 * 10);
}

pub fn fleet_descriptor() -> SolutionDescriptor<Fleet> {
    let source = SourceRef::new("Vehicle", "stops");
    SolutionDescriptor::new("Fleet")
        .with_entity(
            EntityDescriptor::new::<Vehicle>("Vehicle", "vehicles", vehicle_count).with_variable(
                VariableDescriptor::list("stops", "Stop", get_stops, get_stops_mut),
            ),
        )
        .with_entity(
            EntityDescriptor::new::<Stop>("Stop", "stops", stop_count)
                .with_variable(VariableDescriptor::list_inverse(
                    "vehicle",
                    source,
                    get_vehicle,
                    set_vehicle,
                ))
                .with_variable(VariableDescriptor::list_index(
                    "index",
                    source,
                    get_index,
                    set_index,
                ))
                .with_variable(VariableDescriptor::custom(
                    "arrival",
                    vec![SourceRef::new("Stop", "index")],
                    update_arrival,
                )),
        )
        .build()
        .expect("fleet descriptor is valid")
}
