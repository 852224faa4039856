//! Shadow variable listeners.
//!
//! Each shadow variable is maintained by one listener built from its
//! descriptor:
//!
//! - [`SingletonInverseListener`]: chained source, one entity per holder
//! - [`AnchorListener`]: chained source, the anchor heading each chain
//! - [`CollectionInverseListener`]: basic source, many entities per holder
//! - [`ListInverseListener`] / [`ListIndexListener`]: owner and position of
//!   list elements
//! - [`CustomShadowListener`]: user recomputation, chained by topological rank
//!
//! [`VariableListenerSupport`] routes before/after events to them and to the
//! externalized supplies.

mod anchor;
mod custom;
mod inverse;
mod list;
mod support;
mod traits;

#[cfg(test)]
mod tests;

pub use anchor::AnchorListener;
pub use custom::CustomShadowListener;
pub use inverse::{CollectionInverseListener, SingletonInverseListener};
pub use list::{ListIndexListener, ListInverseListener};
pub use support::{ShadowListener, VariableListenerSupport};
pub use traits::{ListVariableListener, VariableListener};
