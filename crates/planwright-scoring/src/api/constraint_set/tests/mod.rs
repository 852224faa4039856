//! Tests for constraint set types.

use std::sync::Arc;

use planwright_core::domain::EntityHandle;
use planwright_core::score::SimpleScore;
use planwright_core::PlanwrightError;
use planwright_test::pair::{
    assignments, pair_descriptor, values, Assignment, PairSchedule, Value, ASSIGNMENT,
};

use super::*;
use crate::api::weight_overrides::ConstraintWeightOverrides;
use crate::stream::joiner::equal_bi;
use crate::stream::ConstraintFactory;

fn factory() -> ConstraintFactory<PairSchedule, SimpleScore> {
    ConstraintFactory::new()
}

fn assigned() -> impl IncrementalConstraint<PairSchedule, SimpleScore> {
    factory()
        .for_each(assignments)
        .reward(SimpleScore::of(1))
        .as_constraint("Assigned")
}

fn used_values() -> impl IncrementalConstraint<PairSchedule, SimpleScore> {
    factory()
        .for_each(values)
        .if_exists(
            factory().for_each(assignments),
            (equal_bi(|v: &Value| Some(v.id), |a: &Assignment| a.value),),
        )
        .unwrap()
        .penalize(SimpleScore::of(10))
        .as_constraint("Used value")
}

fn load<C: ConstraintSet<PairSchedule, SimpleScore>>(set: &mut C, schedule: &PairSchedule) {
    let descriptor = Arc::new(pair_descriptor());
    set.initialize_all(&descriptor).unwrap();
    for handle in descriptor.entity_handles(schedule) {
        set.insert_all(schedule, handle).unwrap();
    }
}

#[test]
fn test_empty_set_scores_zero() {
    let set = ();
    let weights = ConstraintWeightOverrides::new();
    assert_eq!(ConstraintSet::<PairSchedule, SimpleScore>::constraint_count(&set), 0);
    assert_eq!(
        ConstraintSet::<PairSchedule, SimpleScore>::score_all(&set, &weights).unwrap(),
        SimpleScore::of(0)
    );
}

#[test]
fn test_tuple_set_sums_constraints() {
    let schedule = PairSchedule::new(3, &[Some(0), Some(0), Some(2)]);
    let mut set = (assigned(), used_values());
    load(&mut set, &schedule);

    let weights = ConstraintWeightOverrides::new();
    assert_eq!(set.constraint_count(), 2);
    assert_eq!(set.score_all(&weights).unwrap(), SimpleScore::of(3 - 20));

    let results = set.evaluate_each(&weights).unwrap();
    assert_eq!(results[0].constraint_ref.name, "Assigned");
    assert_eq!(results[0].match_count, 3);
    assert_eq!(results[1].score, SimpleScore::of(-20));
}

#[test]
fn test_retract_all_then_insert_all() {
    let schedule = PairSchedule::new(3, &[Some(0), Some(1)]);
    let mut set = (assigned(), used_values());
    load(&mut set, &schedule);
    let weights = ConstraintWeightOverrides::new();
    let before = set.score_all(&weights).unwrap();

    let entity = EntityHandle::new(ASSIGNMENT, 1);
    set.retract_all(entity).unwrap();
    assert_eq!(set.score_all(&weights).unwrap(), SimpleScore::of(1 - 10));

    set.insert_all(&schedule, entity).unwrap();
    assert_eq!(set.score_all(&weights).unwrap(), before);
}

#[test]
fn test_boxed_set_matches_tuple_set() {
    let schedule = PairSchedule::new(3, &[Some(1), Some(1), None]);
    let mut tuple = (assigned(), used_values());
    let mut boxed: Vec<Box<dyn IncrementalConstraint<PairSchedule, SimpleScore>>> =
        vec![Box::new(assigned()), Box::new(used_values())];
    load(&mut tuple, &schedule);
    load(&mut boxed, &schedule);

    let weights = ConstraintWeightOverrides::from_pairs([("Used value", SimpleScore::of(3))]);
    assert_eq!(boxed.constraint_count(), 2);
    assert_eq!(boxed.score_all(&weights).unwrap(), tuple.score_all(&weights).unwrap());
    assert_eq!(boxed.score_all(&weights).unwrap(), SimpleScore::of(2 - 3));
}

#[test]
fn test_analysis_follows_tracking() {
    let schedule = PairSchedule::new(2, &[Some(0)]);
    let weights = ConstraintWeightOverrides::new();

    let mut untracked = (assigned(),);
    load(&mut untracked, &schedule);
    assert!(matches!(
        untracked.analyze_all(&weights),
        Err(PlanwrightError::InvalidState(_))
    ));

    let mut tracked = (assigned(), used_values());
    tracked.set_justification_tracking(true);
    load(&mut tracked, &schedule);
    let analyses = tracked.analyze_all(&weights).unwrap();
    assert_eq!(analyses.len(), 2);
    assert_eq!(analyses[0].score, SimpleScore::of(1));
    assert_eq!(analyses[1].match_count(), 1);
    assert_eq!(analyses[1].weight, SimpleScore::of(10));

    tracked.clear_all();
    assert_eq!(tracked.score_all(&weights).unwrap(), SimpleScore::of(0));
}

#[test]
fn test_score_sum_overflow_names_constraint() {
    let large = |name: &str| {
        factory()
            .for_each(assignments)
            .reward_with(SimpleScore::of(1), |_a: &Assignment| i64::MAX / 2 + 1)
            .as_constraint(name)
    };
    let schedule = PairSchedule::new(1, &[Some(0)]);
    let weights = ConstraintWeightOverrides::new();

    let mut set = (large("First"), large("Second"));
    load(&mut set, &schedule);
    match set.score_all(&weights) {
        Err(PlanwrightError::ScoreImpact { constraint, .. }) => assert_eq!(constraint, "Second"),
        other => panic!("expected a score impact error, got {:?}", other),
    }

    let mut boxed: Vec<Box<dyn IncrementalConstraint<PairSchedule, SimpleScore>>> =
        vec![Box::new(large("First")), Box::new(large("Second"))];
    load(&mut boxed, &schedule);
    assert!(matches!(
        boxed.score_all(&weights),
        Err(PlanwrightError::ScoreImpact { .. })
    ));
}
