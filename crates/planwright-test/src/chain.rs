//! Chained fixture: visits hang off anchors through a chained `previous`
//! variable; anchors and visits both carry the singleton inverse `next`,
//! and each visit names the anchor heading its chain.

use planwright_core::domain::{
    EntityDescriptor, EntityHandle, PlanningSolution, SolutionDescriptor, SourceRef, ValueRef,
    VariableDescriptor, VariableId,
};
use planwright_core::score::SimpleScore;

pub const ANCHOR: usize = 0;
pub const VISIT: usize = 1;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Anchor {
    pub id: usize,
    pub next: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Visit {
    pub id: usize,
    pub previous: Option<ValueRef>,
    pub next: Option<usize>,
    pub anchor: Option<usize>,
}

#[derive(Clone, Debug)]
pub struct ChainSolution {
    pub anchors: Vec<Anchor>,
    pub visits: Vec<Visit>,
    pub score: Option<SimpleScore>,
}

impl ChainSolution {
    /// `previous[i]` is the chained value of visit `i`; inverse shadows
    /// start empty.
    pub fn new(anchor_count: usize, previous: &[Option<ValueRef>]) -> Self {
        Self {
            anchors: (0..anchor_count).map(|id| Anchor { id, next: None }).collect(),
            visits: previous
                .iter()
                .enumerate()
                .map(|(id, p)| Visit {
                    id,
                    previous: *p,
                    next: None,
                    anchor: None,
                })
                .collect(),
            score: None,
        }
    }
}

impl PlanningSolution for ChainSolution {
    type Score = SimpleScore;

    fn score(&self) -> Option<Self::Score> {
        self.score
    }

    fn set_score(&mut self, score: Option<Self::Score>) {
        self.score = score;
    }
}

pub fn anchor(i: usize) -> ValueRef {
    ValueRef::Entity(EntityHandle::new(ANCHOR, i))
}

pub fn visit(i: usize) -> ValueRef {
    ValueRef::Entity(EntityHandle::new(VISIT, i))
}

/// The `Visit.previous` variable.
pub fn previous_variable() -> VariableId {
    VariableId::new(VISIT, 0)
}

pub fn anchors(s: &ChainSolution) -> &[Anchor] {
    &s.anchors
}

pub fn visits(s: &ChainSolution) -> &[Visit] {
    &s.visits
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
                ))
                .with_variable(VariableDescriptor::anchor(
                    "anchor",
                    source,
                    get_visit_anchor,
                    set_visit_anchor,
                )),
        )
        .build()
        .expect("chain descriptor is valid")
}
