//! Group-by node.

use std::collections::HashMap;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

use planwright_core::domain::{EntityHandle, SolutionDescriptor};
use planwright_core::{PlanwrightError, Result};
use tracing::trace;

use super::{Delta, Node, TupleId, TupleIds};
use crate::stream::collector::{Accumulator, Collector};
use crate::stream::tuple::{Element, Tuple, TupleFn};

/// Shape of the row a group emits.
pub trait GroupShape<K, R>: Send + Sync {
    type Out: Tuple;

    fn row(key: &K, result: &R) -> Self::Out;
}

/// Emits `(key, result)`.
pub struct KeyAndResult;

/// Emits `(key,)`.
pub struct KeyOnly;

/// Emits `(result,)`.
pub struct ResultOnly;

impl<K: Element, R: Element> GroupShape<K, R> for KeyAndResult {
    type Out = (K, R);

    fn row(key: &K, result: &R) -> (K, R) {
        (key.clone(), result.clone())
    }
}

impl<K: Element, R> GroupShape<K, R> for KeyOnly {
    type Out = (K,);

    fn row(key: &K, _result: &R) -> (K,) {
        (key.clone(),)
    }
}

impl<K, R: Element> GroupShape<K, R> for ResultOnly {
    type Out = (R,);

    fn row(_key: &K, result: &R) -> (R,) {
        (result.clone(),)
    }
}

struct Group<A, R> {
    accumulator: A,
    size: usize,
    emitted: Option<(TupleId, R)>,
}

/// Groups parent rows by key and folds each group with a collector.
///
/// A group's row appears with its first member and disappears with its
/// last. A change that leaves the collector result equal emits nothing.
pub struct GroupNode<N, KF, C, G, T, K>
where
    C: Collector<T>,
{
    parent: N,
    key: KF,
    collector: C,
    inputs: HashMap<TupleId, (K, C::Value)>,
    groups: HashMap<K, Group<C::Accumulator, C::Result>>,
    ids: TupleIds,
    _phantom: PhantomData<fn() -> (G, T)>,
}

impl<N, KF, C, G, T, K> GroupNode<N, KF, C, G, T, K>
where
    C: Collector<T>,
    KF: TupleFn<T, K>,
    K: Element + Eq + Hash,
    G: GroupShape<K, C::Result>,
{
    pub fn new(parent: N, key: KF, collector: C) -> Self {
        Self {
            parent,
            key,
            collector,
            inputs: HashMap::new(),
            groups: HashMap::new(),
            ids: TupleIds::default(),
            _phantom: PhantomData,
        }
    }

    /// Number of non-empty groups.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    fn apply(&mut self, input: Vec<Delta<T>>, out: &mut Vec<Delta<G::Out>>) -> Result<()> {
        let mut dirty: Vec<K> = Vec::new();
        for delta in input {
            let key = match delta {
                Delta::Insert(id, row) => {
                    let key = self.key.call(&row);
                    let value = self.collector.extract(&row);
                    let collector = &self.collector;
                    let group = self.groups.entry(key.clone()).or_insert_with(|| Group {
                        accumulator: collector.create_accumulator(),
                        size: 0,
                        emitted: None,
                    });
                    group.accumulator.accumulate(&value);
                    group.size += 1;
                    self.inputs.insert(id, (key.clone(), value));
                    key
                }
                Delta::Retract(id) => {
                    let (key, value) = self.inputs.remove(&id).ok_or_else(|| {
                        PlanwrightError::StateCorruption(format!(
                            "group retracted unknown row {:?}",
                            id
                        ))
                    })?;
                    let group = self.groups.get_mut(&key).ok_or_else(|| {
                        PlanwrightError::StateCorruption(format!(
                            "group for row {:?} vanished before its retraction",
                            id
                        ))
                    })?;
                    group.accumulator.retract(&value);
                    group.size -= 1;
                    key
                }
            };
            if !dirty.contains(&key) {
                dirty.push(key);
            }
        }

        for key in dirty {
            let Some(group) = self.groups.get_mut(&key) else {
                continue;
            };
            if group.size == 0 {
                if let Some((id, _)) = group.emitted.take() {
                    out.push(Delta::Retract(id));
                }
                self.groups.remove(&key);
                continue;
            }
            let result = group.accumulator.finish();
            if matches!(&group.emitted, Some((_, previous)) if *previous == result) {
                trace!(event = "group_unchanged");
                continue;
            }
            if let Some((id, _)) = group.emitted.take() {
                out.push(Delta::Retract(id));
            }
            let id = self.ids.next();
            out.push(Delta::Insert(id, G::row(&key, &result)));
            group.emitted = Some((id, result));
        }
        Ok(())
    }
}

impl<S, N, KF, C, G, T, K> Node<S> for GroupNode<N, KF, C, G, T, K>
where
    N: Node<S, Out = T>,
    T: Tuple,
    C: Collector<T>,
    KF: TupleFn<T, K>,
    K: Element + Eq + Hash,
    G: GroupShape<K, C::Result>,
{
    type Out = G::Out;

    fn initialize(&mut self, descriptor: &Arc<SolutionDescriptor<S>>) -> Result<()> {
        self.parent.initialize(descriptor)
    }

    fn insert(
        &mut self,
        solution: &S,
        entity: EntityHandle,
        out: &mut Vec<Delta<G::Out>>,
    ) -> Result<()> {
        let mut input = Vec::new();
        self.parent.insert(solution, entity, &mut input)?;
        self.apply(input, out)
    }

    fn retract(&mut self, entity: EntityHandle, out: &mut Vec<Delta<G::Out>>) -> Result<()> {
        let mut input = Vec::new();
        self.parent.retract(entity, &mut input)?;
        self.apply(input, out)
    }

    fn clear(&mut self) {
        self.parent.clear();
        self.inputs.clear();
        self.groups.clear();
        self.ids.reset();
    }
}
