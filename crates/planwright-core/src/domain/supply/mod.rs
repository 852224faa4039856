//! Demand/supply cache for derived variable relationships.
//!
//! Consumers (score streams, moves, user code) ask the [`SupplyManager`] for
//! a supply by [`Demand`]. Equal demands share one supply instance, which is
//! created on first demand and kept until its last demand is cancelled or
//! the working solution is cleared.
//!
//! A supply is either answered inline, by reading a shadow variable that
//! already maintains the relation, or externalized into its own map that is
//! kept current by the same before/after events that drive the listeners.

mod inverse;
mod list_state;
mod manager;

#[cfg(test)]
mod tests;

pub use inverse::{CollectionInverseSupply, SingletonInverseSupply};
pub use list_state::{ElementPosition, ListStateSupply};
pub use manager::SupplyManager;

use std::fmt;

use crate::domain::handle::VariableId;

/// The relation a supply maintains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SupplyKind {
    /// Value to the single entity whose chained variable points at it.
    SingletonInverse,
    /// Value to every entity whose basic variable points at it.
    CollectionInverse,
    /// List element to its owner and index.
    ListState,
}

impl SupplyKind {
    pub fn label(&self) -> &'static str {
        match self {
            SupplyKind::SingletonInverse => "singleton inverse",
            SupplyKind::CollectionInverse => "collection inverse",
            SupplyKind::ListState => "list state",
        }
    }
}

/// A request for a supply: the relation kind plus its source variable.
///
/// Demands compare by value, so two consumers describing the same relation
/// receive the same supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Demand {
    pub kind: SupplyKind,
    pub source: VariableId,
}

impl Demand {
    pub const fn new(kind: SupplyKind, source: VariableId) -> Self {
        Self { kind, source }
    }

    pub const fn singleton_inverse(source: VariableId) -> Self {
        Self::new(SupplyKind::SingletonInverse, source)
    }

    pub const fn collection_inverse(source: VariableId) -> Self {
        Self::new(SupplyKind::CollectionInverse, source)
    }

    pub const fn list_state(source: VariableId) -> Self {
        Self::new(SupplyKind::ListState, source)
    }
}

impl fmt::Display for Demand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of variable {}/{}",
            self.kind.label(),
            self.source.entity,
            self.source.variable
        )
    }
}

/// Handle to a live supply inside a [`SupplyManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SupplyId(pub(crate) usize);

impl SupplyId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A supply instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Supply {
    /// Answered by reading these shadow variables on the working solution.
    Inline { shadows: Vec<VariableId> },
    SingletonInverse(SingletonInverseSupply),
    CollectionInverse(CollectionInverseSupply),
    ListState(ListStateSupply),
}

impl Supply {
    /// Whether the supply keeps its own copy of the relation.
    pub fn is_externalized(&self) -> bool {
        !matches!(self, Supply::Inline { .. })
    }
}
