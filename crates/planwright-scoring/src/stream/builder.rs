//! Builder finalizing a stream into a constraint.

use std::fmt;
use std::marker::PhantomData;

use planwright_core::score::{MatchWeight, Score};
use planwright_core::{ConstraintRef, ImpactType};

use crate::constraint::{ConstraintWeight, StreamConstraint};
use crate::node::Node;
use crate::stream::tuple::TupleFn;

/// Holds a finished node tree with its impact until the constraint is
/// named. `I` is the match weight type of the weigher.
pub struct ConstraintBuilder<S, N, W, Sc, I = i64> {
    node: N,
    weigher: W,
    impact_type: ImpactType,
    weight: ConstraintWeight<Sc>,
    _phantom: PhantomData<fn(&S) -> I>,
}

impl<S, N, W, Sc, I> ConstraintBuilder<S, N, W, Sc, I>
where
    N: Node<S>,
    W: TupleFn<N::Out, I>,
    Sc: Score,
    I: MatchWeight,
{
    pub(crate) fn new(
        node: N,
        weigher: W,
        impact_type: ImpactType,
        weight: ConstraintWeight<Sc>,
    ) -> Self {
        Self {
            node,
            weigher,
            impact_type,
            weight,
            _phantom: PhantomData,
        }
    }

    /// Names the constraint in the default (empty) package.
    pub fn as_constraint(self, name: &str) -> StreamConstraint<S, N, W, Sc, I> {
        self.as_constraint_in("", name)
    }

    pub fn as_constraint_in(self, package: &str, name: &str) -> StreamConstraint<S, N, W, Sc, I> {
        StreamConstraint::new(
            ConstraintRef::new(package, name),
            self.impact_type,
            self.weight,
            self.node,
            self.weigher,
        )
    }
}

impl<S, N, W, Sc: fmt::Debug, I> fmt::Debug for ConstraintBuilder<S, N, W, Sc, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstraintBuilder")
            .field("impact_type", &self.impact_type)
            .field("weight", &self.weight)
            .finish()
    }
}
