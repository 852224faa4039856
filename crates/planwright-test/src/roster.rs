//! Collection-inverse fixture: tasks pick a worker, workers list their
//! tasks.

use planwright_core::domain::{
    EntityDescriptor, EntityHandle, PlanningSolution, SolutionDescriptor, SourceRef, ValueRef,
    VariableDescriptor, VariableId,
};
use planwright_core::score::HardSoftScore;

pub const WORKER: usize = 0;
pub const TASK: usize = 1;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Worker {
    pub id: usize,
    pub capacity: usize,
    /// Collection inverse of `Task.worker`; never `None` once built.
    pub tasks: Option<Vec<usize>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Task {
    pub id: usize,
    pub day: i64,
    pub worker: Option<ValueRef>,
}

#[derive(Clone, Debug)]
pub struct Roster {
    pub workers: Vec<Worker>,
    pub tasks: Vec<Task>,
    pub score: Option<HardSoftScore>,
}

impl Roster {
    /// `assignment[t]` is the worker of task `t`; task `t` falls on day `t`.
    pub fn new(capacities: &[usize], assignment: &[Option<usize>]) -> Self {
        Self {
            workers: capacities
                .iter()
                .enumerate()
                .map(|(id, capacity)| Worker {
                    id,
                    capacity: *capacity,
                    tasks: Some(Vec::new()),
                })
                .collect(),
            tasks: assignment
                .iter()
                .enumerate()
                .map(|(id, w)| Task {
                    id,
                    day: id as i64,
                    worker: w.map(worker),
                })
                .collect(),
            score: None,
        }
    }
}

impl PlanningSolution for Roster {
    type Score = HardSoftScore;

    fn score(&self) -> Option<Self::Score> {
        self.score
    }

    fn set_score(&mut self, score: Option<Self::Score>) {
        self.score = score;
    }
}

pub fn worker(i: usize) -> ValueRef {
    ValueRef::Entity(EntityHandle::new(WORKER, i))
}

/// The `Task.worker` variable.
pub fn worker_variable() -> VariableId {
    VariableId::new(TASK, 0)
}

pub fn workers(s: &Roster) -> &[Worker] {
    &s.workers
}

pub fn tasks(s: &Roster) -> &[Task] {
    &s.tasks
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
