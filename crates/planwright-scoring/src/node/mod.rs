//! Incremental node network behind constraint streams.
//!
//! Every stream operation compiles to a node. The network is a tree of
//! statically typed nodes: a terminal constraint owns its root node, which
//! owns its parents, down to the sources. Entity events enter at the root
//! and are pushed down to every source; each node turns the deltas of its
//! parents into deltas of its own output.
//!
//! Nodes keep whatever they need to retract a row (keys, collector values,
//! match lists), so a retraction never reads the working solution.

mod exists;
mod filter;
mod group;
mod index;
mod join;
mod source;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use planwright_core::domain::{EntityHandle, SolutionDescriptor};
use planwright_core::Result;

use crate::stream::tuple::Tuple;

pub use exists::ExistsNode;
pub use filter::FilterNode;
pub use group::{GroupNode, GroupShape, KeyAndResult, KeyOnly, ResultOnly};
pub use index::JoinIndex;
pub use join::JoinNode;
pub use source::SourceNode;

/// Identity of a row within the node that emitted it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TupleId(pub(crate) u64);

/// A change in a node's output.
#[derive(Debug, Clone, PartialEq)]
pub enum Delta<T> {
    Insert(TupleId, T),
    Retract(TupleId),
}

/// Allocates row identities for one node.
#[derive(Debug, Default)]
pub(crate) struct TupleIds {
    next: u64,
}

impl TupleIds {
    pub(crate) fn next(&mut self) -> TupleId {
        let id = TupleId(self.next);
        self.next += 1;
        id
    }

    pub(crate) fn reset(&mut self) {
        self.next = 0;
    }
}

/// A node of the constraint-stream network.
pub trait Node<S>: Send + Sync {
    /// Rows emitted by this node.
    type Out: Tuple;

    /// Resolves classes against the descriptor. Called before any event.
    fn initialize(&mut self, descriptor: &Arc<SolutionDescriptor<S>>) -> Result<()>;

    /// Feeds the current state of `entity` into the network.
    fn insert(
        &mut self,
        solution: &S,
        entity: EntityHandle,
        out: &mut Vec<Delta<Self::Out>>,
    ) -> Result<()>;

    /// Withdraws everything previously derived from `entity`.
    fn retract(&mut self, entity: EntityHandle, out: &mut Vec<Delta<Self::Out>>) -> Result<()>;

    /// Drops all rows; `initialize` stays valid.
    fn clear(&mut self);
}
