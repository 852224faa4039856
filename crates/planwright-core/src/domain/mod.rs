//! Domain model: arena handles, the descriptor model, supplies and shadow
//! variable listeners.
//!
//! - [`PlanningSolution`]: the working solution owning every entity
//! - [`SolutionDescriptor`]: runtime metadata about classes and variables
//! - [`SupplyManager`]: demand-driven cache of derived relations
//! - [`VariableListenerSupport`]: keeps shadow variables current

mod descriptor;
mod handle;
pub mod listener;
pub mod supply;
mod traits;

pub use descriptor::{
    BasicAccessor, CollectionAccessor, EntityDescriptor, ListAccessor, ShadowDescriptor,
    ShadowGraph, ShadowKind, SlotAccessor, SolutionDescriptor, SourceRef, VariableDescriptor,
    VariableKind,
};
pub use handle::{EntityHandle, ValueRef, VariableId};
pub use listener::{ListVariableListener, ShadowListener, VariableListener, VariableListenerSupport};
pub use supply::{Demand, ElementPosition, Supply, SupplyId, SupplyKind, SupplyManager};
pub use traits::PlanningSolution;
