use super::*;
use crate::domain::{EntityHandle, ValueRef, VariableId};
use crate::error::PlanwrightError;
use crate::test_utils::*;

#[derive(Default)]
struct Broken {
    items: Vec<(Option<ValueRef>, Option<usize>)>,
    lists: Vec<Vec<usize>>,
    followers: Vec<Option<Vec<usize>>>,
}

fn count(s: &Broken) -> usize {
    s.items.len()
}

fn get(s: &Broken, i: usize) -> Option<ValueRef> {
    s.items[i].0
}

fn set(s: &mut Broken, i: usize, v: Option<ValueRef>) {
    s.items[i].0 = v;
}

fn get_slot(s: &Broken, i: usize) -> Option<usize> {
    s.items[i].1
}

fn set_slot(s: &mut Broken, i: usize, v: Option<usize>) {
    s.items[i].1 = v;
}

fn get_list(s: &Broken, i: usize) -> &[usize] {
    &s.lists[i]
}

fn get_list_mut(s: &mut Broken, i: usize) -> &mut Vec<usize> {
    &mut s.lists[i]
}

fn get_followers(s: &Broken, i: usize) -> Option<&[usize]> {
    s.followers[i].as_deref()
}

fn followers_slot(s: &mut Broken, i: usize) -> &mut Option<Vec<usize>> {
    &mut s.followers[i]
}

fn noop(_: &mut Broken, _: usize) {}

fn item_class() -> EntityDescriptor<Broken> {
    EntityDescriptor::new::<u8>("Item", "items", count)
        .with_variable(VariableDescriptor::basic("value", get, set))
}

fn expect_config_error(descriptor: SolutionDescriptor<Broken>, fragment: &str) {
    match descriptor.build() {
        Err(PlanwrightError::Config(message)) => {
            assert!(message.contains(fragment), "unexpected message: {}", message)
        }
        other => panic!("expected config error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_chain_descriptor_resolves_sources() {
    let descriptor = chain_descriptor();
    let previous = descriptor.find_variable("Visit", "previous").unwrap();
    let anchor_next = descriptor.find_variable("Anchor", "next").unwrap();
    let visit_next = descriptor.find_variable("Visit", "next").unwrap();

    assert_eq!(descriptor.source_variables(anchor_next), &[previous]);
    assert_eq!(descriptor.source_variables(visit_next), &[previous]);
    assert_eq!(descriptor.shadow_graph().dependents_of(previous).len(), 2);
    assert!(descriptor.source_variables(previous).is_empty());
    assert_eq!(descriptor.genuine_variables(), vec![previous]);
}

#[test]
fn test_find_by_type() {
    let descriptor = chain_descriptor();
    assert_eq!(
        descriptor.find_entity_descriptor_by_type(std::any::TypeId::of::<Visit>()),
        Some(VISIT)
    );
    assert_eq!(descriptor.find_entity_descriptor("Anchor"), Some(ANCHOR));
    assert_eq!(descriptor.find_entity_descriptor("Nope"), None);
}

#[test]
fn test_value_access_and_handles() {
    let descriptor = chain_descriptor();
    let mut solution = ChainSolution::new(1, &[anchor(0), None]);
    let previous = descriptor.find_variable("Visit", "previous").unwrap();

    assert_eq!(descriptor.get_value(&solution, previous, 0).unwrap(), anchor(0));
    assert!(!descriptor.is_initialized(&solution));

    descriptor.set_value(&mut solution, previous, 1, visit(0)).unwrap();
    assert!(descriptor.is_initialized(&solution));
    assert_eq!(
        descriptor.entity_handles(&solution),
        vec![
            EntityHandle::new(ANCHOR, 0),
            EntityHandle::new(VISIT, 0),
            EntityHandle::new(VISIT, 1)
        ]
    );

    let next = descriptor.find_variable("Visit", "next").unwrap();
    assert!(matches!(
        descriptor.get_value(&solution, next, 0),
        Err(PlanwrightError::InvalidState(_))
    ));
}

#[test]
fn test_custom_shadow_ordered_after_its_source() {
    let descriptor = fleet_descriptor();
    let index = descriptor.find_variable("Stop", "index").unwrap();
    let arrival = descriptor.find_variable("Stop", "arrival").unwrap();
    let graph = descriptor.shadow_graph();

    assert!(graph.rank_of(index).unwrap() < graph.rank_of(arrival).unwrap());
    assert_eq!(graph.dependents_of(index), &[arrival]);
    assert_eq!(graph.topological_order().len(), 3);
}

#[test]
fn test_collection_inverse_rejects_chained_source() {
    let descriptor = SolutionDescriptor::new("Broken").with_entity(
        EntityDescriptor::new::<u8>("Item", "items", count)
            .with_variable(VariableDescriptor::chained("previous", get, set))
            .with_variable(VariableDescriptor::collection_inverse(
                "followers",
                SourceRef::new("Item", "previous"),
                get_followers,
                followers_slot,
            )),
    );
    expect_config_error(descriptor, "non-chained basic");
}

#[test]
fn test_unknown_source_class_rejected() {
    let descriptor = SolutionDescriptor::new("Broken").with_entity(item_class().with_variable(
        VariableDescriptor::singleton_inverse(
            "inverse",
            SourceRef::new("Ghost", "value"),
            get_slot,
            set_slot,
        ),
    ));
    expect_config_error(descriptor, "not registered");
}

#[test]
fn test_missing_source_variable_rejected() {
    let descriptor = SolutionDescriptor::new("Broken").with_entity(item_class().with_variable(
        VariableDescriptor::singleton_inverse(
            "inverse",
            SourceRef::new("Item", "missing"),
            get_slot,
            set_slot,
        ),
    ));
    expect_config_error(descriptor, "does not exist");
}

#[test]
fn test_singleton_inverse_requires_chained_source() {
    let descriptor = SolutionDescriptor::new("Broken").with_entity(item_class().with_variable(
        VariableDescriptor::singleton_inverse(
            "inverse",
            SourceRef::new("Item", "value"),
            get_slot,
            set_slot,
        ),
    ));
    expect_config_error(descriptor, "requires a chained source");
}

#[test]
fn test_anchor_requires_chained_source() {
    let descriptor = SolutionDescriptor::new("Broken").with_entity(item_class().with_variable(
        VariableDescriptor::anchor("anchor", SourceRef::new("Item", "value"), get_slot, set_slot),
    ));
    expect_config_error(descriptor, "anchor shadow, which requires a chained source");
}

#[test]
fn test_anchor_must_live_on_chained_class() {
    let descriptor = SolutionDescriptor::new("Broken")
        .with_entity(
            EntityDescriptor::new::<u8>("Item", "items", count)
                .with_variable(VariableDescriptor::chained("previous", get, set)),
        )
        .with_entity(EntityDescriptor::new::<u16>("Head", "heads", count).with_variable(
            VariableDescriptor::anchor(
                "anchor",
                SourceRef::new("Item", "previous"),
                get_slot,
                set_slot,
            ),
        ));
    expect_config_error(descriptor, "class of its chained source");
}

#[test]
fn test_anchored_chain_resolves() {
    let descriptor = anchored_chain_descriptor();
    let previous = descriptor.find_variable("Visit", "previous").unwrap();
    let anchor = descriptor.find_variable("Visit", "anchor").unwrap();
    assert_eq!(descriptor.source_variables(anchor), &[previous]);
    assert_eq!(descriptor.shadow_graph().dependents_of(previous), &[anchor]);
}

#[test]
fn test_list_shadow_requires_list_source() {
    let descriptor = SolutionDescriptor::new("Broken").with_entity(item_class().with_variable(
        VariableDescriptor::list_index(
            "position",
            SourceRef::new("Item", "value"),
            get_slot,
            set_slot,
        ),
    ));
    expect_config_error(descriptor, "requires a list source");
}

#[test]
fn test_list_shadow_must_live_on_element_class() {
    let descriptor = SolutionDescriptor::new("Broken").with_entity(
        item_class()
            .with_variable(VariableDescriptor::list("members", "Other", get_list, get_list_mut))
            .with_variable(VariableDescriptor::list_inverse(
                "owner",
                SourceRef::new("Item", "members"),
                get_slot,
                set_slot,
            )),
    );
    expect_config_error(descriptor, "element class (Other)");
}

#[test]
fn test_shadow_cycle_rejected() {
    let descriptor = SolutionDescriptor::new("Broken").with_entity(
        item_class()
            .with_variable(VariableDescriptor::custom("a", vec![SourceRef::new("Item", "b")], noop))
            .with_variable(VariableDescriptor::custom(
                "b",
                vec![SourceRef::new("Item", "a")],
                noop,
            )),
    );
    expect_config_error(descriptor, "cycle");
}

#[test]
fn test_shadow_without_sources_rejected() {
    let descriptor = SolutionDescriptor::new("Broken")
        .with_entity(
            item_class().with_variable(VariableDescriptor::custom("lonely", Vec::new(), noop)),
        );
    expect_config_error(descriptor, "no source variables");
}

#[test]
fn test_duplicate_class_rejected() {
    let descriptor = SolutionDescriptor::new("Broken")
        .with_entity(item_class())
        .with_entity(item_class());
    expect_config_error(descriptor, "registered twice");
}

#[test]
fn test_variable_ids_are_positions() {
    let descriptor = roster_descriptor();
    assert_eq!(descriptor.find_variable("Task", "worker"), Some(VariableId::new(TASK, 0)));
    assert_eq!(descriptor.variable_name(VariableId::new(WORKER, 0)), "Worker.tasks");
}
