use std::sync::Arc;

use super::*;
use crate::domain::handle::{EntityHandle, VariableId};
use crate::domain::SolutionDescriptor;
use crate::error::PlanwrightError;
use crate::test_utils::*;

fn support<S>(descriptor: SolutionDescriptor<S>) -> VariableListenerSupport<S> {
    VariableListenerSupport::new(Arc::new(descriptor)).unwrap()
}

fn var<S>(support: &VariableListenerSupport<S>, entity: &str, variable: &str) -> VariableId {
    support.descriptor().find_variable(entity, variable).unwrap()
}

fn stop_state(fleet: &Fleet) -> Vec<(Option<usize>, Option<usize>, Option<i64>)> {
    fleet.stops.iter().map(|s| (s.vehicle, s.index, s.arrival)).collect()
}

/// anchor0 <- a, anchor1 <- b <- c
fn chains() -> ChainSolution {
    ChainSolution::new(2, &[anchor(0), anchor(1), visit(1)])
}

#[test]
fn test_listeners_follow_topological_order() {
    let support = support(fleet_descriptor());
    let shadows: Vec<VariableId> = support.listeners().iter().map(ShadowListener::shadow).collect();
    let index = var(&support, "Stop", "index");
    let arrival = var(&support, "Stop", "arrival");
    let index_pos = shadows.iter().position(|s| *s == index).unwrap();
    let arrival_pos = shadows.iter().position(|s| *s == arrival).unwrap();
    assert!(index_pos < arrival_pos);
    assert_eq!(shadows.len(), 3);
}

#[test]
fn test_reset_populates_singleton_inverse() {
    let mut support = support(chain_descriptor());
    let mut solution = chains();
    support.reset_working_solution(&mut solution).unwrap();

    assert_eq!(solution.anchors[0].next, Some(0));
    assert_eq!(solution.anchors[1].next, Some(1));
    assert_eq!(solution.visits[1].next, Some(2));
    assert_eq!(solution.visits[0].next, None);
    assert_eq!(solution.visits[2].next, None);
    support.assert_shadows_not_stale(&solution).unwrap();
}

#[test]
fn test_chained_move_updates_both_inverses() {
    let mut support = support(chain_descriptor());
    let mut solution = chains();
    support.reset_working_solution(&mut solution).unwrap();
    let previous = var(&support, "Visit", "previous");

    support.before_variable_changed(&mut solution, previous, 2).unwrap();
    assert_eq!(solution.visits[1].next, None);
    solution.visits[2].previous = visit(0);
    support.after_variable_changed(&solution, previous, 2).unwrap();
    assert!(support.has_pending_notifications());
    assert_eq!(solution.visits[0].next, None);

    let touched = support.trigger_variable_listeners(&mut solution).unwrap();
    assert_eq!(solution.visits[0].next, Some(2));
    assert_eq!(solution.visits[1].next, None);
    assert_eq!(solution.anchors[0].next, Some(0));
    assert_eq!(touched, vec![EntityHandle::new(VISIT, 0), EntityHandle::new(VISIT, 1)]);
    assert!(!support.has_pending_notifications());
    support.assert_shadows_not_stale(&solution).unwrap();
}

#[test]
fn test_singleton_double_insert_is_corruption() {
    let mut support = support(chain_descriptor());
    let mut solution = chains();
    support.reset_working_solution(&mut solution).unwrap();
    let previous = var(&support, "Visit", "previous");

    support.before_variable_changed(&mut solution, previous, 2).unwrap();
    solution.visits[2].previous = anchor(0);
    support.after_variable_changed(&solution, previous, 2).unwrap();

    let err = support.trigger_variable_listeners(&mut solution).unwrap_err();
    assert!(matches!(err, PlanwrightError::StateCorruption(_)));
}

#[test]
fn test_singleton_retract_of_stale_shadow_is_corruption() {
    let mut support = support(chain_descriptor());
    let mut solution = chains();
    support.reset_working_solution(&mut solution).unwrap();
    solution.visits[1].next = None;

    let previous = var(&support, "Visit", "previous");
    let err = support.before_variable_changed(&mut solution, previous, 2).unwrap_err();
    assert!(err.is_corruption());
    assert!(support.assert_shadows_not_stale(&solution).is_err());
}

#[test]
fn test_collection_inverse_moves_entity_between_holders() {
    let mut support = support(roster_descriptor());
    let mut roster = Roster::new(2, &[Some(0), Some(0), Some(1)]);
    support.reset_working_solution(&mut roster).unwrap();
    assert_eq!(roster.workers[0].tasks.as_deref(), Some(&[0, 1][..]));
    let source = var(&support, "Task", "worker");

    support.before_variable_changed(&mut roster, source, 1).unwrap();
    roster.tasks[1].worker = Some(worker(1));
    support.after_variable_changed(&roster, source, 1).unwrap();
    let touched = support.trigger_variable_listeners(&mut roster).unwrap();

    assert_eq!(roster.workers[0].tasks.as_deref(), Some(&[0][..]));
    assert_eq!(roster.workers[1].tasks.as_deref(), Some(&[2, 1][..]));
    assert_eq!(touched, vec![EntityHandle::new(WORKER, 0), EntityHandle::new(WORKER, 1)]);
    support.assert_shadows_not_stale(&roster).unwrap();
}

#[test]
fn test_unassigned_value_touches_no_holder() {
    let mut support = support(roster_descriptor());
    let mut roster = Roster::new(1, &[Some(0), None]);
    support.reset_working_solution(&mut roster).unwrap();
    let source = var(&support, "Task", "worker");

    support.before_variable_changed(&mut roster, source, 0).unwrap();
    roster.tasks[0].worker = None;
    support.after_variable_changed(&roster, source, 0).unwrap();
    let touched = support.trigger_variable_listeners(&mut roster).unwrap();

    assert_eq!(roster.workers[0].tasks.as_deref(), Some(&[][..]));
    assert_eq!(touched, vec![EntityHandle::new(WORKER, 0)]);
}

#[test]
fn test_missing_collection_is_corruption() {
    let mut support = support(roster_descriptor());
    let mut roster = Roster::new(2, &[Some(0)]);
    roster.workers[1].tasks = None;
    let err = support.reset_working_solution(&mut roster).unwrap_err();
    assert!(matches!(err, PlanwrightError::StateCorruption(_)));
}

#[test]
fn test_list_move_shifts_indexes_and_reruns_custom_shadow() {
    let mut support = support(fleet_descriptor());
    let mut fleet = Fleet::new(5, vec![vec![0, 1, 2], vec![3]]);
    support.reset_working_solution(&mut fleet).unwrap();
    assert_eq!(fleet.stops[2].arrival, Some(20));
    assert_eq!(fleet.stops[4].vehicle, None);
    let stops = var(&support, "Vehicle", "stops");

    support.before_list_variable_changed(&mut fleet, stops, 0, 0, 1).unwrap();
    fleet.vehicles[0].stops.remove(0);
    support.after_list_variable_changed(&fleet, stops, 0, 0, 0).unwrap();
    support.before_list_variable_changed(&mut fleet, stops, 1, 1, 1).unwrap();
    fleet.vehicles[1].stops.push(0);
    support.after_list_variable_changed(&fleet, stops, 1, 1, 2).unwrap();
    let touched = support.trigger_variable_listeners(&mut fleet).unwrap();

    assert_eq!(
        stop_state(&fleet),
        vec![
            (Some(1), Some(1), Some(10)),
            (Some(0), Some(0), Some(0)),
            (Some(0), Some(1), Some(10)),
            (Some(1), Some(0), Some(0)),
            (None, None, None),
        ]
    );
    assert_eq!(
        touched,
        vec![
            EntityHandle::new(STOP, 0),
            EntityHandle::new(STOP, 1),
            EntityHandle::new(STOP, 2),
        ]
    );
    support.assert_shadows_not_stale(&fleet).unwrap();
}

#[test]
fn test_list_range_out_of_bounds_is_rejected() {
    let mut support = support(fleet_descriptor());
    let mut fleet = Fleet::new(2, vec![vec![0]]);
    support.reset_working_solution(&mut fleet).unwrap();
    let stops = var(&support, "Vehicle", "stops");
    let err = support
        .before_list_variable_changed(&mut fleet, stops, 0, 0, 3)
        .unwrap_err();
    assert!(matches!(err, PlanwrightError::InvalidState(_)));
}

#[test]
fn test_reset_is_idempotent() {
    let mut support = support(fleet_descriptor());
    let mut fleet = Fleet::new(4, vec![vec![2, 0], vec![1]]);
    support.reset_working_solution(&mut fleet).unwrap();
    let first = stop_state(&fleet);
    support.reset_working_solution(&mut fleet).unwrap();
    assert_eq!(stop_state(&fleet), first);

    let mut roster = Roster::new(2, &[Some(1), Some(1), Some(0)]);
    let mut roster_support = self::support(roster_descriptor());
    roster_support.reset_working_solution(&mut roster).unwrap();
    let first = roster.workers.iter().map(|w| w.tasks.clone()).collect::<Vec<_>>();
    roster_support.reset_working_solution(&mut roster).unwrap();
    let second = roster.workers.iter().map(|w| w.tasks.clone()).collect::<Vec<_>>();
    assert_eq!(first, second);
}

#[test]
fn test_added_owner_assigns_its_elements() {
    let mut support = support(fleet_descriptor());
    let mut fleet = Fleet::new(5, vec![vec![0, 1], vec![3]]);
    support.reset_working_solution(&mut fleet).unwrap();

    fleet.vehicles.push(Vehicle { stops: vec![4, 2] });
    support.after_entity_added(&fleet, EntityHandle::new(VEHICLE, 2)).unwrap();
    let touched = support.trigger_variable_listeners(&mut fleet).unwrap();

    assert_eq!(fleet.stops[4].vehicle, Some(2));
    assert_eq!(fleet.stops[2].index, Some(1));
    assert_eq!(fleet.stops[2].arrival, Some(10));
    assert!(touched.contains(&EntityHandle::new(STOP, 4)));
    support.assert_shadows_not_stale(&fleet).unwrap();
}

#[test]
fn test_removed_owner_unassigns_its_elements() {
    let mut support = support(fleet_descriptor());
    let mut fleet = Fleet::new(4, vec![vec![0, 1], vec![3, 2]]);
    support.reset_working_solution(&mut fleet).unwrap();

    support
        .before_entity_removed(&mut fleet, EntityHandle::new(VEHICLE, 1))
        .unwrap();
    fleet.vehicles.pop();
    support.after_entity_removed(&fleet, EntityHandle::new(VEHICLE, 1));
    let touched = support.trigger_variable_listeners(&mut fleet).unwrap();

    assert_eq!(fleet.stops[3].vehicle, None);
    assert_eq!(fleet.stops[2].index, None);
    assert_eq!(fleet.stops[2].arrival, None);
    assert_eq!(touched, vec![EntityHandle::new(STOP, 2), EntityHandle::new(STOP, 3)]);
    support.assert_shadows_not_stale(&fleet).unwrap();
}

#[test]
fn test_supplies_share_bracket_events() {
    let mut support = support(bare_chain_descriptor());
    let mut solution = chains();
    support.reset_working_solution(&mut solution).unwrap();
    let previous = var(&support, "Visit", "previous");
    let demand = crate::domain::Demand::singleton_inverse(previous);
    let id = support.demand(demand, &solution).unwrap();

    support.before_variable_changed(&mut solution, previous, 2).unwrap();
    solution.visits[2].previous = visit(0);
    support.after_variable_changed(&solution, previous, 2).unwrap();
    support.trigger_variable_listeners(&mut solution).unwrap();

    assert_eq!(
        support.supplies().singleton_inverse(id, &solution, visit(0).unwrap()).unwrap(),
        Some(2)
    );
    support.assert_supplies_consistent(&solution).unwrap();
    assert!(support.cancel(demand).unwrap());
}

#[test]
fn test_reset_resolves_anchors_along_chains() {
    let mut support = support(anchored_chain_descriptor());
    let mut solution = chains();
    support.reset_working_solution(&mut solution).unwrap();

    let anchors: Vec<Option<usize>> = solution.visits.iter().map(|v| v.anchor).collect();
    assert_eq!(anchors, vec![Some(0), Some(1), Some(1)]);
    support.assert_shadows_not_stale(&solution).unwrap();
}

#[test]
fn test_moving_chain_head_reanchors_trailing_visits() {
    let mut support = support(anchored_chain_descriptor());
    let mut solution = chains();
    support.reset_working_solution(&mut solution).unwrap();
    let previous = var(&support, "Visit", "previous");

    // anchor0 <- a <- b <- c, anchor1 left empty
    support.before_variable_changed(&mut solution, previous, 1).unwrap();
    solution.visits[1].previous = visit(0);
    support.after_variable_changed(&solution, previous, 1).unwrap();
    let touched = support.trigger_variable_listeners(&mut solution).unwrap();

    assert_eq!(solution.visits[1].anchor, Some(0));
    assert_eq!(solution.visits[2].anchor, Some(0));
    assert_eq!(touched, vec![EntityHandle::new(VISIT, 1), EntityHandle::new(VISIT, 2)]);
    support.assert_shadows_not_stale(&solution).unwrap();
}

#[test]
fn test_unassigned_link_clears_trailing_anchors() {
    let mut support = support(anchored_chain_descriptor());
    let mut solution = chains();
    support.reset_working_solution(&mut solution).unwrap();
    let previous = var(&support, "Visit", "previous");

    support.before_variable_changed(&mut solution, previous, 1).unwrap();
    solution.visits[1].previous = None;
    support.after_variable_changed(&solution, previous, 1).unwrap();
    support.trigger_variable_listeners(&mut solution).unwrap();

    assert_eq!(solution.visits[0].anchor, Some(0));
    assert_eq!(solution.visits[1].anchor, None);
    assert_eq!(solution.visits[2].anchor, None);
}

#[test]
fn test_stale_anchor_is_detected() {
    let mut support = support(anchored_chain_descriptor());
    let mut solution = chains();
    support.reset_working_solution(&mut solution).unwrap();
    solution.visits[2].anchor = Some(0);

    let err = support.assert_shadows_not_stale(&solution).unwrap_err();
    assert!(err.is_corruption());
}

#[test]
fn test_chain_cycle_is_corruption() {
    let mut support = support(anchored_chain_descriptor());
    let mut solution = ChainSolution::new(1, &[visit(1), visit(0)]);
    let err = support.reset_working_solution(&mut solution).unwrap_err();
    assert!(matches!(err, PlanwrightError::StateCorruption(_)));
}
