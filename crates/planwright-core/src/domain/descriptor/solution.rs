//! Solution descriptor.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use super::{EntityDescriptor, ShadowGraph, VariableDescriptor};
use crate::domain::handle::{EntityHandle, ValueRef, VariableId};
use crate::error::{PlanwrightError, Result};

/// Describes a planning solution shape at runtime.
///
/// Built once per problem shape and immutable afterwards, so one descriptor
/// (usually behind an `Arc`) serves every working solution of that shape.
pub struct SolutionDescriptor<S> {
    /// Name of the solution type.
    pub type_name: &'static str,
    entity_descriptors: Vec<EntityDescriptor<S>>,
    entity_type_index: HashMap<TypeId, usize>,
    graph: ShadowGraph,
}

impl<S> SolutionDescriptor<S> {
    /// Creates an empty descriptor.
    pub fn new(type_name: &'static str) -> Self {
        SolutionDescriptor {
            type_name,
            entity_descriptors: Vec::new(),
            entity_type_index: HashMap::new(),
            graph: ShadowGraph::default(),
        }
    }

    /// Adds an entity descriptor and indexes it by TypeId.
    pub fn with_entity(mut self, descriptor: EntityDescriptor<S>) -> Self {
        let index = self.entity_descriptors.len();
        self.entity_type_index.insert(descriptor.type_id, index);
        self.entity_descriptors.push(descriptor);
        self
    }

    /// Resolves and validates every shadow variable's sources.
    ///
    /// # Errors
    ///
    /// Returns [`PlanwrightError::Config`] when a source does not exist, its
    /// kind conflicts with the shadow kind, or the sources form a cycle.
    pub fn build(mut self) -> Result<Self> {
        let mut seen = HashMap::new();
        for descriptor in &self.entity_descriptors {
            if let Some(previous) = seen.insert(descriptor.type_name, descriptor.solution_field) {
                return Err(PlanwrightError::Config(format!(
                    "Entity class ({}) is registered twice (fields {} and {})",
                    descriptor.type_name, previous, descriptor.solution_field
                )));
            }
        }
        self.graph = ShadowGraph::resolve(&self.entity_descriptors)?;
        debug!(
            event = "descriptor_built",
            solution = self.type_name,
            entity_classes = self.entity_descriptors.len(),
            shadow_variables = self.graph.shadow_count(),
        );
        Ok(self)
    }

    pub fn entity_descriptors(&self) -> &[EntityDescriptor<S>] {
        &self.entity_descriptors
    }

    pub fn entity_descriptor(&self, index: usize) -> Option<&EntityDescriptor<S>> {
        self.entity_descriptors.get(index)
    }

    pub fn entity_descriptor_count(&self) -> usize {
        self.entity_descriptors.len()
    }

    /// Finds an entity descriptor index by type name.
    pub fn find_entity_descriptor(&self, type_name: &str) -> Option<usize> {
        self.entity_descriptors
            .iter()
            .position(|d| d.type_name == type_name)
    }

    /// Finds an entity descriptor index by type ID.
    pub fn find_entity_descriptor_by_type(&self, type_id: TypeId) -> Option<usize> {
        self.entity_type_index.get(&type_id).copied()
    }

    /// Resolves a variable by entity type name and variable name.
    pub fn find_variable(&self, entity: &str, variable: &str) -> Option<VariableId> {
        let entity_idx = self.find_entity_descriptor(entity)?;
        let var_idx = self.entity_descriptors[entity_idx].find_variable_index(variable)?;
        Some(VariableId::new(entity_idx, var_idx))
    }

    pub fn variable(&self, id: VariableId) -> Option<&VariableDescriptor<S>> {
        self.entity_descriptors.get(id.entity)?.variable(id.variable)
    }

    /// Like [`variable`](Self::variable) but fails with `InvalidState`.
    pub fn variable_or_fail(&self, id: VariableId) -> Result<&VariableDescriptor<S>> {
        self.variable(id).ok_or_else(|| {
            PlanwrightError::InvalidState(format!(
                "No variable is registered at {:?} in solution ({})",
                id, self.type_name
            ))
        })
    }

    /// Qualified `Entity.variable` name for messages.
    pub fn variable_name(&self, id: VariableId) -> String {
        match (self.entity_descriptor(id.entity), self.variable(id)) {
            (Some(entity), Some(variable)) => format!("{}.{}", entity.type_name, variable.name),
            _ => format!("{:?}", id),
        }
    }

    /// Resolved source variables of a shadow variable.
    pub fn source_variables(&self, shadow: VariableId) -> &[VariableId] {
        self.graph.sources_of(shadow)
    }

    pub fn shadow_graph(&self) -> &ShadowGraph {
        &self.graph
    }

    /// Returns all genuine variable ids across all classes.
    pub fn genuine_variables(&self) -> Vec<VariableId> {
        self.entity_descriptors
            .iter()
            .enumerate()
            .flat_map(|(e, d)| d.genuine_variables().map(move |(v, _)| VariableId::new(e, v)))
            .collect()
    }

    /// Number of entities of one class in the solution.
    pub fn entity_count(&self, solution: &S, descriptor: usize) -> usize {
        self.entity_descriptors
            .get(descriptor)
            .map_or(0, |d| d.entity_count(solution))
    }

    /// Total number of entities across all classes.
    pub fn total_entity_count(&self, solution: &S) -> usize {
        self.entity_descriptors
            .iter()
            .map(|d| d.entity_count(solution))
            .sum()
    }

    /// Handles of every entity in the solution, class by class.
    pub fn entity_handles(&self, solution: &S) -> Vec<EntityHandle> {
        let mut handles = Vec::with_capacity(self.total_entity_count(solution));
        for (descriptor, entity) in self.entity_descriptors.iter().enumerate() {
            for index in 0..entity.entity_count(solution) {
                handles.push(EntityHandle::new(descriptor, index));
            }
        }
        handles
    }

    /// Reads a basic or chained variable.
    pub fn get_value(
        &self,
        solution: &S,
        variable: VariableId,
        index: usize,
    ) -> Result<Option<ValueRef>> {
        let access = self.basic_accessor(variable)?;
        Ok((access.get)(solution, index))
    }

    /// Writes a basic or chained variable. The caller brackets the write.
    pub fn set_value(
        &self,
        solution: &mut S,
        variable: VariableId,
        index: usize,
        value: Option<ValueRef>,
    ) -> Result<()> {
        let access = self.basic_accessor(variable)?;
        (access.set)(solution, index, value);
        Ok(())
    }

    /// Reads the elements of a list variable.
    pub fn list_elements<'a>(
        &self,
        solution: &'a S,
        variable: VariableId,
        index: usize,
    ) -> Result<&'a [usize]> {
        let access = self
            .variable_or_fail(variable)?
            .list_accessor()
            .ok_or_else(|| {
                PlanwrightError::InvalidState(format!(
                    "Variable ({}) is not a list variable",
                    self.variable_name(variable)
                ))
            })?;
        Ok((access.get)(solution, index))
    }

    /// Returns true if every entity has all its required variables assigned.
    pub fn is_initialized(&self, solution: &S) -> bool {
        self.entity_descriptors.iter().all(|d| {
            (0..d.entity_count(solution)).all(|i| d.is_entity_initialized(solution, i))
        })
    }

    fn basic_accessor(&self, variable: VariableId) -> Result<&super::BasicAccessor<S>> {
        self.variable_or_fail(variable)?.basic_accessor().ok_or_else(|| {
            PlanwrightError::InvalidState(format!(
                "Variable ({}) is not a basic or chained variable",
                self.variable_name(variable)
            ))
        })
    }
}

impl<S> fmt::Debug for SolutionDescriptor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolutionDescriptor")
            .field("type_name", &self.type_name)
            .field("entities", &self.entity_descriptors.len())
            .field("shadows", &self.graph.shadow_count())
            .finish()
    }
}
