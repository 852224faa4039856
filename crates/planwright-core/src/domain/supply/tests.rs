use std::sync::Arc;

use super::*;
use crate::domain::handle::{ValueRef, VariableId};
use crate::domain::SolutionDescriptor;
use crate::error::PlanwrightError;
use crate::test_utils::*;

fn manager<S>(descriptor: SolutionDescriptor<S>) -> (SupplyManager<S>, Arc<SolutionDescriptor<S>>) {
    let descriptor = Arc::new(descriptor);
    (SupplyManager::new(Arc::clone(&descriptor)), descriptor)
}

fn var<S>(descriptor: &SolutionDescriptor<S>, entity: &str, variable: &str) -> VariableId {
    descriptor.find_variable(entity, variable).expect("variable exists")
}

/// anchor0 <- v0, anchor1 <- v1 <- v2
fn two_chains() -> ChainSolution {
    ChainSolution::new(2, &[anchor(0), anchor(1), visit(1)])
}

#[test]
fn test_equal_demands_share_one_supply() {
    let (mut supplies, descriptor) = manager(bare_chain_descriptor());
    let solution = two_chains();
    let demand = Demand::singleton_inverse(var(&descriptor, "Visit", "previous"));

    let first = supplies.demand(demand, &solution).unwrap();
    let second = supplies.demand(demand, &solution).unwrap();
    assert_eq!(first, second);
    assert_eq!(supplies.demand_count(&demand), 2);
    assert_eq!(supplies.len(), 1);

    assert!(!supplies.cancel(demand).unwrap());
    assert!(supplies.get(first).is_ok());
    assert!(supplies.cancel(demand).unwrap());
    assert!(supplies.is_empty());
    assert!(matches!(supplies.get(first), Err(PlanwrightError::InvalidState(_))));
    assert!(matches!(supplies.cancel(demand), Err(PlanwrightError::InvalidState(_))));
}

#[test]
fn test_shadow_backed_demand_is_inline() {
    let (mut supplies, descriptor) = manager(chain_descriptor());
    let mut solution = two_chains();
    solution.anchors[0].next = Some(0);
    solution.visits[1].next = Some(2);
    let id = supplies
        .demand(Demand::singleton_inverse(var(&descriptor, "Visit", "previous")), &solution)
        .unwrap();

    assert!(!supplies.get(id).unwrap().is_externalized());
    assert_eq!(supplies.singleton_inverse(id, &solution, anchor(0).unwrap()).unwrap(), Some(0));
    assert_eq!(supplies.singleton_inverse(id, &solution, visit(1).unwrap()).unwrap(), Some(2));
    assert_eq!(supplies.singleton_inverse(id, &solution, ValueRef::Fact(7)).unwrap(), None);
}

#[test]
fn test_externalized_singleton_follows_bracketed_change() {
    let (mut supplies, descriptor) = manager(bare_chain_descriptor());
    let mut solution = two_chains();
    let previous = var(&descriptor, "Visit", "previous");
    let id = supplies.demand(Demand::singleton_inverse(previous), &solution).unwrap();

    assert!(supplies.get(id).unwrap().is_externalized());
    assert_eq!(supplies.singleton_inverse(id, &solution, anchor(1).unwrap()).unwrap(), Some(1));
    assert_eq!(supplies.singleton_inverse(id, &solution, visit(1).unwrap()).unwrap(), Some(2));

    supplies.before_variable_changed(&solution, previous, 2).unwrap();
    solution.visits[2].previous = visit(0);
    supplies.after_variable_changed(&solution, previous, 2).unwrap();

    assert_eq!(supplies.singleton_inverse(id, &solution, visit(0).unwrap()).unwrap(), Some(2));
    assert_eq!(supplies.singleton_inverse(id, &solution, visit(1).unwrap()).unwrap(), None);
    supplies.assert_consistent(&solution).unwrap();
}

#[test]
fn test_unbracketed_change_leaves_supply_stale() {
    let (mut supplies, descriptor) = manager(bare_chain_descriptor());
    let mut solution = two_chains();
    let previous = var(&descriptor, "Visit", "previous");
    supplies.demand(Demand::singleton_inverse(previous), &solution).unwrap();

    solution.visits[2].previous = visit(0);
    let err = supplies.assert_consistent(&solution).unwrap_err();
    assert!(err.is_corruption());
    assert!(err.to_string().contains("Visit.previous"));

    supplies.reset_working_solution(&solution).unwrap();
    supplies.assert_consistent(&solution).unwrap();
}

#[test]
fn test_shared_chained_value_is_corruption() {
    let (mut supplies, descriptor) = manager(bare_chain_descriptor());
    let solution = ChainSolution::new(1, &[anchor(0), anchor(0)]);
    let err = supplies
        .demand(Demand::singleton_inverse(var(&descriptor, "Visit", "previous")), &solution)
        .unwrap_err();
    assert!(matches!(err, PlanwrightError::StateCorruption(_)));
}

#[test]
fn test_retract_of_unknown_mapping_is_corruption() {
    let mut supply = SingletonInverseSupply::new();
    supply.insert(ValueRef::Fact(1), 0).unwrap();
    assert!(supply.retract(ValueRef::Fact(1), 3).is_err());

    let mut collection = CollectionInverseSupply::new();
    collection.insert(ValueRef::Fact(1), 0).unwrap();
    assert!(collection.insert(ValueRef::Fact(1), 0).is_err());
    assert!(collection.retract(ValueRef::Fact(2), 0).is_err());
}

#[test]
fn test_collection_inverse_tracks_reassignment() {
    let (mut supplies, descriptor) = manager(bare_roster_descriptor());
    let mut roster = Roster::new(2, &[Some(0), Some(0), Some(1), None]);
    let source = var(&descriptor, "Task", "worker");
    let id = supplies.demand(Demand::collection_inverse(source), &roster).unwrap();

    assert_eq!(supplies.collection_inverse(id, &roster, worker(0)).unwrap(), vec![0, 1]);

    supplies.before_variable_changed(&roster, source, 1).unwrap();
    roster.tasks[1].worker = Some(worker(1));
    supplies.after_variable_changed(&roster, source, 1).unwrap();
    supplies.before_variable_changed(&roster, source, 3).unwrap();
    roster.tasks[3].worker = Some(worker(1));
    supplies.after_variable_changed(&roster, source, 3).unwrap();

    assert_eq!(supplies.collection_inverse(id, &roster, worker(0)).unwrap(), vec![0]);
    assert_eq!(supplies.collection_inverse(id, &roster, worker(1)).unwrap(), vec![1, 2, 3]);
    supplies.assert_consistent(&roster).unwrap();
}

#[test]
fn test_list_state_shifts_following_elements() {
    let (mut supplies, descriptor) = manager(fleet_descriptor());
    let mut fleet = Fleet::new(5, vec![vec![0, 1, 2], vec![3]]);
    let stops = var(&descriptor, "Vehicle", "stops");
    let id = supplies.demand(Demand::list_state(stops), &fleet).unwrap();

    assert_eq!(supplies.unassigned_count(id).unwrap(), 1);
    assert_eq!(supplies.list_position(id, 2).unwrap(), Some(ElementPosition::new(0, 2)));

    supplies.before_list_variable_changed(&fleet, stops, 0, 0, 1).unwrap();
    fleet.vehicles[0].stops.remove(0);
    supplies.after_list_variable_changed(&fleet, stops, 0, 0, 0).unwrap();

    assert_eq!(supplies.list_position(id, 0).unwrap(), None);
    assert_eq!(supplies.list_position(id, 1).unwrap(), Some(ElementPosition::new(0, 0)));
    assert_eq!(supplies.list_position(id, 2).unwrap(), Some(ElementPosition::new(0, 1)));
    assert_eq!(supplies.unassigned_count(id).unwrap(), 2);

    supplies.before_list_variable_changed(&fleet, stops, 1, 0, 0).unwrap();
    fleet.vehicles[1].stops.insert(0, 0);
    supplies.after_list_variable_changed(&fleet, stops, 1, 0, 1).unwrap();

    assert_eq!(supplies.list_position(id, 0).unwrap(), Some(ElementPosition::new(1, 0)));
    assert_eq!(supplies.list_position(id, 3).unwrap(), Some(ElementPosition::new(1, 1)));
    supplies.assert_consistent(&fleet).unwrap();
}

#[test]
fn test_demand_on_incompatible_variable_is_config_error() {
    let (mut supplies, descriptor) = manager(bare_chain_descriptor());
    let solution = two_chains();
    let err = supplies
        .demand(Demand::list_state(var(&descriptor, "Visit", "previous")), &solution)
        .unwrap_err();
    assert!(matches!(err, PlanwrightError::Config(_)));

    let err = supplies
        .demand(Demand::singleton_inverse(VariableId::new(0, 9)), &solution)
        .unwrap_err();
    assert!(matches!(err, PlanwrightError::Config(_)));
}

#[test]
fn test_clear_drops_every_supply() {
    let (mut supplies, descriptor) = manager(bare_chain_descriptor());
    let solution = two_chains();
    let id = supplies
        .demand(Demand::singleton_inverse(var(&descriptor, "Visit", "previous")), &solution)
        .unwrap();
    supplies.clear();
    assert!(supplies.is_empty());
    assert!(supplies.get(id).is_err());
}
