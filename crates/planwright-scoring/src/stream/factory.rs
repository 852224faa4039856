//! Constraint factory for creating typed constraint streams.
//!
//! The factory is the entry point for the fluent constraint API.

use std::fmt;
use std::marker::PhantomData;

use planwright_core::score::Score;

use super::tuple::Element;
use super::UniConstraintStream;
use crate::node::SourceNode;

/// Factory for creating constraint streams.
///
/// `ConstraintFactory` is parameterized by the solution type `S` and score
/// type `Sc`. It is `Copy`, so one factory can start every stream of a
/// constraint, including both sides of a join.
///
/// # Example
///
/// ```
/// use planwright_scoring::stream::ConstraintFactory;
/// use planwright_core::score::SimpleScore;
///
/// #[derive(Clone, Debug)]
/// struct Task { worker: Option<usize> }
///
/// struct Plan { tasks: Vec<Task> }
///
/// let unassigned = ConstraintFactory::<Plan, SimpleScore>::new()
///     .for_each_including_unassigned(|p: &Plan| p.tasks.as_slice())
///     .filter(|t: &Task| t.worker.is_none())
///     .penalize(SimpleScore::of(1))
///     .as_constraint("Unassigned task");
/// # let _ = unassigned;
/// ```
pub struct ConstraintFactory<S, Sc> {
    _phantom: PhantomData<(fn(&S), fn() -> Sc)>,
}

impl<S, Sc> ConstraintFactory<S, Sc>
where
    S: Send + Sync + 'static,
    Sc: Score,
{
    pub fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }

    /// Starts a stream over the entities of the class holding `A`.
    ///
    /// Entities with an unassigned non-nullable variable are left out until
    /// they are assigned.
    pub fn for_each<A, E>(self, extractor: E) -> UniConstraintStream<S, SourceNode<S, A, E>, Sc>
    where
        A: Element,
        E: Fn(&S) -> &[A] + Send + Sync,
    {
        UniConstraintStream::from_node(SourceNode::new(extractor, false))
    }

    /// Starts a stream over every entity of the class, assigned or not.
    pub fn for_each_including_unassigned<A, E>(
        self,
        extractor: E,
    ) -> UniConstraintStream<S, SourceNode<S, A, E>, Sc>
    where
        A: Element,
        E: Fn(&S) -> &[A] + Send + Sync,
    {
        UniConstraintStream::from_node(SourceNode::new(extractor, true))
    }
}

impl<S, Sc> Default for ConstraintFactory<S, Sc>
where
    S: Send + Sync + 'static,
    Sc: Score,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S, Sc> Clone for ConstraintFactory<S, Sc> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S, Sc> Copy for ConstraintFactory<S, Sc> {}

impl<S, Sc> fmt::Debug for ConstraintFactory<S, Sc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstraintFactory").finish()
    }
}
