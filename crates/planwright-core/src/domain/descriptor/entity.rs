//! Entity descriptor.

use std::any::TypeId;
use std::fmt;

use super::{VariableDescriptor, VariableKind};

/// Describes one class of the working solution at runtime.
///
/// A class with genuine variables is a planning entity class. A class
/// without any variables is a problem-fact class; it can still feed
/// constraint streams and be added or removed through problem changes.
pub struct EntityDescriptor<S> {
    /// Name of the entity type.
    pub type_name: &'static str,
    /// TypeId of the entity type, used by stream sources to find their class.
    pub type_id: TypeId,
    /// Field name in the solution holding the collection.
    pub solution_field: &'static str,
    count: fn(&S) -> usize,
    variables: Vec<VariableDescriptor<S>>,
}

impl<S> EntityDescriptor<S> {
    /// Creates a descriptor for the collection of `E` counted by `count`.
    pub fn new<E: 'static>(
        type_name: &'static str,
        solution_field: &'static str,
        count: fn(&S) -> usize,
    ) -> Self {
        EntityDescriptor {
            type_name,
            type_id: TypeId::of::<E>(),
            solution_field,
            count,
            variables: Vec::new(),
        }
    }

    /// Adds a variable descriptor.
    pub fn with_variable(mut self, descriptor: VariableDescriptor<S>) -> Self {
        self.variables.push(descriptor);
        self
    }

    pub fn variables(&self) -> &[VariableDescriptor<S>] {
        &self.variables
    }

    pub fn variable(&self, index: usize) -> Option<&VariableDescriptor<S>> {
        self.variables.get(index)
    }

    /// Finds a variable's position by name.
    pub fn find_variable_index(&self, name: &str) -> Option<usize> {
        self.variables.iter().position(|v| v.name == name)
    }

    /// Returns genuine variables with their positions.
    pub fn genuine_variables(&self) -> impl Iterator<Item = (usize, &VariableDescriptor<S>)> {
        self.variables.iter().enumerate().filter(|(_, v)| v.is_genuine())
    }

    /// Returns shadow variables with their positions.
    pub fn shadow_variables(&self) -> impl Iterator<Item = (usize, &VariableDescriptor<S>)> {
        self.variables.iter().enumerate().filter(|(_, v)| v.is_shadow())
    }

    pub fn has_genuine_variables(&self) -> bool {
        self.variables.iter().any(|v| v.is_genuine())
    }

    /// Returns true for classes without variables.
    pub fn is_problem_fact_class(&self) -> bool {
        self.variables.is_empty()
    }

    /// Returns the number of entities of this class in the solution.
    pub fn entity_count(&self, solution: &S) -> usize {
        (self.count)(solution)
    }

    pub(crate) fn counter(&self) -> fn(&S) -> usize {
        self.count
    }

    /// Returns true if every basic or chained variable that must be
    /// assigned holds a value for the entity at `index`.
    pub fn is_entity_initialized(&self, solution: &S, index: usize) -> bool {
        self.variables.iter().all(|v| match &v.kind {
            VariableKind::Basic(access) | VariableKind::Chained(access) => {
                access.allows_unassigned || (access.get)(solution, index).is_some()
            }
            _ => true,
        })
    }
}

impl<S> fmt::Debug for EntityDescriptor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityDescriptor")
            .field("type_name", &self.type_name)
            .field("solution_field", &self.solution_field)
            .field("variables", &self.variables)
            .finish()
    }
}
