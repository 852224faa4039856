//! Source node: one row per entity of a class.

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use planwright_core::domain::{EntityHandle, SolutionDescriptor};
use planwright_core::{PlanwrightError, Result};
use tracing::trace;

use super::{Delta, Node, TupleId, TupleIds};
use crate::stream::tuple::Element;

/// Emits `(A,)` for every entity of the class holding `A`.
///
/// The class is found by `TypeId` when the network is initialized. Unless
/// built with `including_unassigned`, entities with an unassigned
/// non-nullable variable are held back until they are assigned.
pub struct SourceNode<S, A, E> {
    extractor: E,
    including_unassigned: bool,
    descriptor: Option<Arc<SolutionDescriptor<S>>>,
    class: usize,
    // entity index -> emitted row, `None` while held back
    known: HashMap<usize, Option<TupleId>>,
    ids: TupleIds,
    _phantom: PhantomData<fn() -> A>,
}

impl<S, A, E> SourceNode<S, A, E>
where
    A: Element,
    E: Fn(&S) -> &[A] + Send + Sync,
{
    pub fn new(extractor: E, including_unassigned: bool) -> Self {
        Self {
            extractor,
            including_unassigned,
            descriptor: None,
            class: usize::MAX,
            known: HashMap::new(),
            ids: TupleIds::default(),
            _phantom: PhantomData,
        }
    }

    fn admits(&self, solution: &S, index: usize) -> bool {
        if self.including_unassigned {
            return true;
        }
        self.descriptor
            .as_ref()
            .and_then(|d| d.entity_descriptor(self.class))
            .map_or(true, |d| d.is_entity_initialized(solution, index))
    }
}

impl<S, A, E> Node<S> for SourceNode<S, A, E>
where
    S: Send + Sync + 'static,
    A: Element,
    E: Fn(&S) -> &[A] + Send + Sync,
{
    type Out = (A,);

    fn initialize(&mut self, descriptor: &Arc<SolutionDescriptor<S>>) -> Result<()> {
        self.class = descriptor
            .find_entity_descriptor_by_type(TypeId::of::<A>())
            .ok_or_else(|| {
                PlanwrightError::Config(format!(
                    "no entity class in {} holds values of type {}",
                    descriptor.type_name,
                    type_name::<A>()
                ))
            })?;
        self.descriptor = Some(Arc::clone(descriptor));
        Ok(())
    }

    fn insert(
        &mut self,
        solution: &S,
        entity: EntityHandle,
        out: &mut Vec<Delta<(A,)>>,
    ) -> Result<()> {
        if entity.descriptor != self.class {
            return Ok(());
        }
        if self.known.contains_key(&entity.index) {
            return Err(PlanwrightError::StateCorruption(format!(
                "entity {} ({}) was inserted twice into its stream source",
                entity,
                type_name::<A>()
            )));
        }
        let emitted = if self.admits(solution, entity.index) {
            let fact = (self.extractor)(solution).get(entity.index).ok_or_else(|| {
                PlanwrightError::InvalidState(format!(
                    "entity {} is out of bounds for its collection",
                    entity
                ))
            })?;
            let id = self.ids.next();
            out.push(Delta::Insert(id, (fact.clone(),)));
            Some(id)
        } else {
            trace!(event = "source_held_back", entity = %entity);
            None
        };
        self.known.insert(entity.index, emitted);
        Ok(())
    }

    fn retract(&mut self, entity: EntityHandle, out: &mut Vec<Delta<(A,)>>) -> Result<()> {
        if entity.descriptor != self.class {
            return Ok(());
        }
        match self.known.remove(&entity.index) {
            Some(Some(id)) => {
                out.push(Delta::Retract(id));
                Ok(())
            }
            Some(None) => Ok(()),
            None => Err(PlanwrightError::StateCorruption(format!(
                "entity {} ({}) was retracted from its stream source without being inserted",
                entity,
                type_name::<A>()
            ))),
        }
    }

    fn clear(&mut self) {
        self.known.clear();
        self.ids.reset();
    }
}
