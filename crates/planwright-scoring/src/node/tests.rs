use std::sync::Arc;

use planwright_core::domain::{EntityHandle, SolutionDescriptor};
use planwright_core::PlanwrightError;
use planwright_test::pair::{pair_descriptor, Assignment, PairSchedule, ASSIGNMENT};

use super::*;
use crate::stream::collector::{count, count_distinct};
use crate::stream::joiner::{equal, filtering};
use crate::stream::tuple::GlobalKey;

fn assignments(s: &PairSchedule) -> &[Assignment] {
    s.assignments.as_slice()
}

fn handle(index: usize) -> EntityHandle {
    EntityHandle::new(ASSIGNMENT, index)
}

fn descriptor() -> Arc<SolutionDescriptor<PairSchedule>> {
    Arc::new(pair_descriptor())
}

fn source() -> SourceNode<PairSchedule, Assignment, fn(&PairSchedule) -> &[Assignment]> {
    SourceNode::new(assignments as fn(&PairSchedule) -> &[Assignment], false)
}

fn insert_all<N: Node<PairSchedule>>(node: &mut N, schedule: &PairSchedule) -> Vec<Delta<N::Out>> {
    let mut out = Vec::new();
    for index in 0..schedule.assignments.len() {
        node.insert(schedule, handle(index), &mut out).unwrap();
    }
    out
}

fn inserts<T>(deltas: &[Delta<T>]) -> usize {
    deltas.iter().filter(|d| matches!(d, Delta::Insert(..))).count()
}

fn retracts<T>(deltas: &[Delta<T>]) -> usize {
    deltas.iter().filter(|d| matches!(d, Delta::Retract(_))).count()
}

#[test]
fn test_source_holds_back_unassigned_entities() {
    let schedule = PairSchedule::new(2, &[Some(0), None]);
    let mut node = source();
    node.initialize(&descriptor()).unwrap();

    let out = insert_all(&mut node, &schedule);
    assert_eq!(out.len(), 1);

    let mut out = Vec::new();
    node.retract(handle(1), &mut out).unwrap();
    assert!(out.is_empty());

    let err = node.retract(handle(1), &mut out).unwrap_err();
    assert!(matches!(err, PlanwrightError::StateCorruption(_)));
}

#[test]
fn test_source_ignores_other_classes() {
    let schedule = PairSchedule::new(2, &[Some(0)]);
    let mut node = source();
    node.initialize(&descriptor()).unwrap();

    let mut out = Vec::new();
    node.insert(&schedule, EntityHandle::new(0, 1), &mut out).unwrap();
    assert!(out.is_empty());
}

#[test]
fn test_source_double_insert_is_corruption() {
    let schedule = PairSchedule::new(1, &[Some(0)]);
    let mut node = source();
    node.initialize(&descriptor()).unwrap();

    let mut out = Vec::new();
    node.insert(&schedule, handle(0), &mut out).unwrap();
    let err = node.insert(&schedule, handle(0), &mut out).unwrap_err();
    assert!(err.is_corruption());
}

#[test]
fn test_self_join_pairs_each_entity_once() {
    let schedule = PairSchedule::new(1, &[Some(0), Some(0), Some(0)]);
    let mut node = JoinNode::new(source(), source(), (equal(|a: &Assignment| a.value),));
    node.initialize(&descriptor()).unwrap();

    let out = insert_all(&mut node, &schedule);
    // every ordered pair including each entity with itself
    assert_eq!(inserts(&out), 9);
    assert_eq!(node.pair_count(), 9);
}

#[test]
fn test_join_retract_withdraws_pairs() {
    let schedule = PairSchedule::new(2, &[Some(0), Some(0), Some(0), Some(1)]);
    let mut node = JoinNode::new(
        source(),
        source(),
        (
            equal(|a: &Assignment| a.value),
            filtering(|a: &Assignment, b: &Assignment| a.id < b.id),
        ),
    );
    node.initialize(&descriptor()).unwrap();

    let out = insert_all(&mut node, &schedule);
    assert_eq!(inserts(&out), 3);

    let mut out = Vec::new();
    node.retract(handle(0), &mut out).unwrap();
    assert_eq!(retracts(&out), 2);
    assert_eq!(node.pair_count(), 1);
}

#[test]
fn test_exists_emits_on_crossing() {
    let schedule = PairSchedule::new(2, &[Some(0), Some(0), Some(1)]);
    let joiners = (
        equal(|a: &Assignment| a.value),
        filtering(|a: &Assignment, b: &Assignment| a.id != b.id),
    );
    let mut node = ExistsNode::new(source(), source(), joiners, false);
    node.initialize(&descriptor()).unwrap();

    let mut out = Vec::new();
    node.insert(&schedule, handle(0), &mut out).unwrap();
    assert!(out.is_empty());

    node.insert(&schedule, handle(1), &mut out).unwrap();
    assert_eq!(inserts(&out), 2);

    let mut out = Vec::new();
    node.insert(&schedule, handle(2), &mut out).unwrap();
    assert!(out.is_empty());

    node.retract(handle(1), &mut out).unwrap();
    assert_eq!(retracts(&out), 2);
}

#[test]
fn test_not_exists_passes_unmatched_rows() {
    let schedule = PairSchedule::new(2, &[Some(0), Some(0), Some(1)]);
    let joiners = (
        equal(|a: &Assignment| a.value),
        filtering(|a: &Assignment, b: &Assignment| a.id != b.id),
    );
    let mut node = ExistsNode::new(source(), source(), joiners, true);
    node.initialize(&descriptor()).unwrap();

    let out = insert_all(&mut node, &schedule);
    let net = inserts(&out) - retracts(&out);
    assert_eq!(net, 1);
}

#[test]
fn test_filter_keeps_parent_ids() {
    let schedule = PairSchedule::new(2, &[Some(0), Some(1)]);
    let mut node = FilterNode::new(source(), |a: &Assignment| a.value == Some(1));
    node.initialize(&descriptor()).unwrap();

    let out = insert_all(&mut node, &schedule);
    assert_eq!(out.len(), 1);

    let mut out = Vec::new();
    node.retract(handle(0), &mut out).unwrap();
    assert!(out.is_empty());
    node.retract(handle(1), &mut out).unwrap();
    assert_eq!(retracts(&out), 1);
}

#[test]
fn test_group_counts_per_key() {
    let schedule = PairSchedule::new(2, &[Some(0), Some(0), Some(1)]);
    let mut node: GroupNode<_, _, _, KeyAndResult, (Assignment,), Option<usize>> =
        GroupNode::new(source(), |a: &Assignment| a.value, count());
    node.initialize(&descriptor()).unwrap();

    insert_all(&mut node, &schedule);
    assert_eq!(node.group_count(), 2);

    let mut out = Vec::new();
    node.retract(handle(2), &mut out).unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(node.group_count(), 1);
}

#[test]
fn test_group_unchanged_result_emits_nothing() {
    let schedule = PairSchedule::new(2, &[Some(0), Some(0)]);
    let mut node: GroupNode<_, _, _, ResultOnly, (Assignment,), ()> =
        GroupNode::new(source(), GlobalKey, count_distinct(|a: &Assignment| a.value));
    node.initialize(&descriptor()).unwrap();

    let mut out = Vec::new();
    node.insert(&schedule, handle(0), &mut out).unwrap();
    assert_eq!(out.len(), 1);

    let mut out = Vec::new();
    node.insert(&schedule, handle(1), &mut out).unwrap();
    assert!(out.is_empty());
}

#[test]
fn test_clear_allows_reinsertion() {
    let schedule = PairSchedule::new(1, &[Some(0), Some(0)]);
    let mut node = JoinNode::new(source(), source(), (equal(|a: &Assignment| a.value),));
    node.initialize(&descriptor()).unwrap();

    insert_all(&mut node, &schedule);
    node.clear();
    assert_eq!(node.pair_count(), 0);

    let out = insert_all(&mut node, &schedule);
    assert_eq!(inserts(&out), 4);
}
