//! Filter node.

use std::collections::HashSet;
use std::sync::Arc;

use planwright_core::domain::{EntityHandle, SolutionDescriptor};
use planwright_core::Result;

use super::{Delta, Node, TupleId};
use crate::stream::tuple::TupleFn;

/// Passes through the rows of its parent that satisfy a predicate,
/// keeping the parent's row identities.
pub struct FilterNode<N, P> {
    parent: N,
    predicate: P,
    passed: HashSet<TupleId>,
}

impl<N, P> FilterNode<N, P> {
    pub fn new(parent: N, predicate: P) -> Self {
        Self {
            parent,
            predicate,
            passed: HashSet::new(),
        }
    }
}

fn apply<T, P>(
    predicate: &P,
    passed: &mut HashSet<TupleId>,
    input: Vec<Delta<T>>,
    out: &mut Vec<Delta<T>>,
) where
    P: TupleFn<T, bool>,
{
    for delta in input {
        match delta {
            Delta::Insert(id, row) => {
                if predicate.call(&row) {
                    passed.insert(id);
                    out.push(Delta::Insert(id, row));
                }
            }
            Delta::Retract(id) => {
                if passed.remove(&id) {
                    out.push(Delta::Retract(id));
                }
            }
        }
    }
}

impl<S, N, P> Node<S> for FilterNode<N, P>
where
    N: Node<S>,
    P: TupleFn<N::Out, bool>,
{
    type Out = N::Out;

    fn initialize(&mut self, descriptor: &Arc<SolutionDescriptor<S>>) -> Result<()> {
        self.parent.initialize(descriptor)
    }

    fn insert(
        &mut self,
        solution: &S,
        entity: EntityHandle,
        out: &mut Vec<Delta<N::Out>>,
    ) -> Result<()> {
        let mut input = Vec::new();
        self.parent.insert(solution, entity, &mut input)?;
        apply(&self.predicate, &mut self.passed, input, out);
        Ok(())
    }

    fn retract(&mut self, entity: EntityHandle, out: &mut Vec<Delta<N::Out>>) -> Result<()> {
        let mut input = Vec::new();
        self.parent.retract(entity, &mut input)?;
        apply(&self.predicate, &mut self.passed, input, out);
        Ok(())
    }

    fn clear(&mut self) {
        self.parent.clear();
        self.passed.clear();
    }
}
