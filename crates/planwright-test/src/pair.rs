//! Pair-conflict fixture.
//!
//! Assignments pick one of a set of value facts. A typical constraint
//! penalizes every pair of assignments sharing a value.
//!
//! ```
//! use planwright_test::pair::{pair_descriptor, PairSchedule};
//!
//! let schedule = PairSchedule::new(2, &[Some(0), Some(0), Some(1)]);
//! let descriptor = pair_descriptor();
//! assert_eq!(descriptor.total_entity_count(&schedule), 5);
//! ```

use planwright_core::domain::{
    EntityDescriptor, PlanningSolution, SolutionDescriptor, ValueRef, VariableDescriptor,
    VariableId,
};
use planwright_core::score::SimpleScore;

pub const VALUE: usize = 0;
pub const ASSIGNMENT: usize = 1;

/// A value fact.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Value {
    pub id: usize,
}

/// A planning entity whose `value` indexes `PairSchedule::values`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Assignment {
    pub id: usize,
    pub value: Option<usize>,
}

#[derive(Clone, Debug)]
pub struct PairSchedule {
    pub values: Vec<Value>,
    pub assignments: Vec<Assignment>,
    pub score: Option<SimpleScore>,
}

impl PairSchedule {
    /// `assigned[i]` is the value index of assignment `i`.
    pub fn new(value_count: usize, assigned: &[Option<usize>]) -> Self {
        Self {
            values: (0..value_count).map(|id| Value { id }).collect(),
            assignments: assigned
                .iter()
                .enumerate()
                .map(|(id, value)| Assignment { id, value: *value })
                .collect(),
            score: None,
        }
    }
}

impl PlanningSolution for PairSchedule {
    type Score = SimpleScore;

    fn score(&self) -> Option<Self::Score> {
        self.score
    }

    fn set_score(&mut self, score: Option<Self::Score>) {
        self.score = score;
    }
}

/// The `Assignment.value` variable.
pub fn value_variable() -> VariableId {
    VariableId::new(ASSIGNMENT, 0)
}

/// Stream source over the value facts.
pub fn values(s: &PairSchedule) -> &[Value] {
    &s.values
}

/// Stream source over the assignments.
pub fn assignments(s: &PairSchedule) -> &[Assignment] {
    &s.assignments
}

fn value_count(s: &PairSchedule) -> usize {
    s.values.len()
}

fn assignment_count(s: &PairSchedule) -> usize {
    s.assignments.len()
}

fn get_value(s: &PairSchedule, i: usize) -> Option<ValueRef> {
    s.assignments[i].value.map(ValueRef::Fact)
}

fn set_value(s: &mut PairSchedule, i: usize, v: Option<ValueRef>) {
    s.assignments[i].value = match v {
        Some(ValueRef::Fact(f)) => Some(f),
        _ => None,
    };
}

pub fn pair_descriptor() -> SolutionDescriptor<PairSchedule> {
    SolutionDescriptor::new("PairSchedule")
        .with_entity(EntityDescriptor::new::<Value>("Value", "values", value_count))
        .with_entity(
            EntityDescriptor::new::<Assignment>("Assignment", "assignments", assignment_count)
                .with_variable(VariableDescriptor::basic("value", get_value, set_value)),
        )
        .build()
        .expect("pair descriptor is valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unassigned_entity_is_not_initialized() {
        let schedule = PairSchedule::new(2, &[Some(1), None]);
        let descriptor = pair_descriptor();
        assert!(!descriptor.is_initialized(&schedule));
        assert_eq!(
            descriptor.get_value(&schedule, value_variable(), 0).ok(),
            Some(Some(ValueRef::Fact(1)))
        );
    }
}
