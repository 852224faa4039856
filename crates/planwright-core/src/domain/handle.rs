//! Arena addresses for entities, values and variables.

use std::fmt;

/// Address of one entity: the class (entity descriptor index) and the slot
/// within that class's collection in the working solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityHandle {
    pub descriptor: usize,
    pub index: usize,
}

impl EntityHandle {
    pub const fn new(descriptor: usize, index: usize) -> Self {
        Self { descriptor, index }
    }
}

impl fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}:{}", self.descriptor, self.index)
    }
}

/// Value of a basic or chained planning variable.
///
/// `Fact` indexes the variable's value range; `Entity` points at another
/// entity, which is how chains and inverse relations are expressed without
/// back-references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueRef {
    Fact(usize),
    Entity(EntityHandle),
}

impl ValueRef {
    /// Returns the entity handle if this value is an entity.
    pub fn as_entity(&self) -> Option<EntityHandle> {
        match self {
            ValueRef::Entity(handle) => Some(*handle),
            ValueRef::Fact(_) => None,
        }
    }

    /// Returns the slot index if this value is an entity of the given class.
    pub fn entity_index_in(&self, descriptor: usize) -> Option<usize> {
        match self {
            ValueRef::Entity(h) if h.descriptor == descriptor => Some(h.index),
            _ => None,
        }
    }
}

impl fmt::Display for ValueRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueRef::Fact(i) => write!(f, "fact#{}", i),
            ValueRef::Entity(h) => write!(f, "entity{}", h),
        }
    }
}

/// Resolved identity of a variable: entity descriptor index plus the
/// variable's position within that descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableId {
    pub entity: usize,
    pub variable: usize,
}

impl VariableId {
    pub const fn new(entity: usize, variable: usize) -> Self {
        Self { entity, variable }
    }

    /// Returns the handle of the entity at `index` owning this variable.
    pub const fn handle(&self, index: usize) -> EntityHandle {
        EntityHandle::new(self.entity, index)
    }
}
