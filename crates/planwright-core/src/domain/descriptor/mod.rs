//! Descriptor model: static metadata about the solution shape.

mod entity;
mod graph;
mod solution;
mod variable;

#[cfg(test)]
mod tests;

pub use entity::EntityDescriptor;
pub use graph::ShadowGraph;
pub use solution::SolutionDescriptor;
pub use variable::{
    BasicAccessor, CollectionAccessor, ListAccessor, ShadowDescriptor, ShadowKind, SlotAccessor,
    SourceRef, VariableDescriptor, VariableKind,
};
