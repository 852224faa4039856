//! Join node: left rows crossed with right facts through a joiner list.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use planwright_core::domain::{EntityHandle, SolutionDescriptor};
use planwright_core::{PlanwrightError, Result};
use smallvec::SmallVec;

use super::{Delta, JoinIndex, Node, TupleId, TupleIds};
use crate::stream::joiner::{IndexKey, JoinerList};
use crate::stream::tuple::{Append, Element};

type Matches = SmallVec<[TupleId; 4]>;

struct LeftEntry<T> {
    row: T,
    key: IndexKey,
    matches: Matches,
}

struct RightEntry<B> {
    fact: B,
    key: IndexKey,
    matches: Matches,
}

/// Emits `left.append(right)` for every matching pair.
///
/// Both sides are indexed by the joiner list; an insert on one side only
/// visits the candidates the other side's index returns, and each
/// candidate is re-verified against every joiner.
pub struct JoinNode<L, R, J, T, B> {
    left: L,
    right: R,
    joiners: J,
    left_rows: HashMap<TupleId, LeftEntry<T>>,
    right_rows: HashMap<TupleId, RightEntry<B>>,
    left_index: JoinIndex,
    right_index: JoinIndex,
    pairs: HashMap<(TupleId, TupleId), TupleId>,
    ids: TupleIds,
    _phantom: PhantomData<fn() -> (T, B)>,
}

impl<L, R, J, T, B> JoinNode<L, R, J, T, B>
where
    T: Append<B>,
    B: Element,
    J: JoinerList<T, B>,
{
    /// Creates the node; the joiner list must already be validated.
    pub fn new(left: L, right: R, joiners: J) -> Self {
        Self {
            left,
            right,
            joiners,
            left_rows: HashMap::new(),
            right_rows: HashMap::new(),
            left_index: JoinIndex::new(),
            right_index: JoinIndex::new(),
            pairs: HashMap::new(),
            ids: TupleIds::default(),
            _phantom: PhantomData,
        }
    }

    fn apply_left(&mut self, input: Vec<Delta<T>>, out: &mut Vec<Delta<T::Output>>) -> Result<()> {
        for delta in input {
            match delta {
                Delta::Insert(left_id, row) => {
                    let key = self.joiners.left_key(&row);
                    let mut matches = Matches::new();
                    for right_id in self
                        .right_index
                        .candidates(key.bucket, self.joiners.right_bounds(&row))
                    {
                        let Some(right) = self.right_rows.get_mut(&right_id) else {
                            continue;
                        };
                        if !self.joiners.matches(&row, &right.fact) {
                            continue;
                        }
                        let id = self.ids.next();
                        self.pairs.insert((left_id, right_id), id);
                        right.matches.push(left_id);
                        matches.push(right_id);
                        out.push(Delta::Insert(id, row.clone().append(right.fact.clone())));
                    }
                    self.left_index.insert(key, left_id);
                    self.left_rows.insert(left_id, LeftEntry { row, key, matches });
                }
                Delta::Retract(left_id) => {
                    let entry = self.left_rows.remove(&left_id).ok_or_else(|| {
                        PlanwrightError::StateCorruption(format!(
                            "join retracted unknown left row {:?}",
                            left_id
                        ))
                    })?;
                    self.left_index.remove(entry.key, left_id);
                    for right_id in entry.matches {
                        if let Some(id) = self.pairs.remove(&(left_id, right_id)) {
                            out.push(Delta::Retract(id));
                        }
                        if let Some(right) = self.right_rows.get_mut(&right_id) {
                            right.matches.retain(|l| *l != left_id);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn apply_right(
        &mut self,
        input: Vec<Delta<(B,)>>,
        out: &mut Vec<Delta<T::Output>>,
    ) -> Result<()> {
        for delta in input {
            match delta {
                Delta::Insert(right_id, (fact,)) => {
                    let key = self.joiners.right_key(&fact);
                    let mut matches = Matches::new();
                    for left_id in self
                        .left_index
                        .candidates(key.bucket, self.joiners.left_bounds(&fact))
                    {
                        let Some(left) = self.left_rows.get_mut(&left_id) else {
                            continue;
                        };
                        if !self.joiners.matches(&left.row, &fact) {
                            continue;
                        }
                        let id = self.ids.next();
                        self.pairs.insert((left_id, right_id), id);
                        left.matches.push(right_id);
                        matches.push(left_id);
                        out.push(Delta::Insert(id, left.row.clone().append(fact.clone())));
                    }
                    self.right_index.insert(key, right_id);
                    self.right_rows.insert(right_id, RightEntry { fact, key, matches });
                }
                Delta::Retract(right_id) => {
                    let entry = self.right_rows.remove(&right_id).ok_or_else(|| {
                        PlanwrightError::StateCorruption(format!(
                            "join retracted unknown right row {:?}",
                            right_id
                        ))
                    })?;
                    self.right_index.remove(entry.key, right_id);
                    for left_id in entry.matches {
                        if let Some(id) = self.pairs.remove(&(left_id, right_id)) {
                            out.push(Delta::Retract(id));
                        }
                        if let Some(left) = self.left_rows.get_mut(&left_id) {
                            left.matches.retain(|r| *r != right_id);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Number of matched pairs currently emitted.
    pub fn pair_count(&self) -> usize {
        self.pairs.len()
    }
}

impl<S, L, R, J, T, B> Node<S> for JoinNode<L, R, J, T, B>
where
    L: Node<S, Out = T>,
    R: Node<S, Out = (B,)>,
    T: Append<B>,
    B: Element,
    J: JoinerList<T, B>,
{
    type Out = T::Output;

    fn initialize(&mut self, descriptor: &Arc<SolutionDescriptor<S>>) -> Result<()> {
        self.left.initialize(descriptor)?;
        self.right.initialize(descriptor)
    }

    // Left deltas are applied before right deltas, so an entity feeding both
    // sides pairs with itself exactly once.
    fn insert(
        &mut self,
        solution: &S,
        entity: EntityHandle,
        out: &mut Vec<Delta<T::Output>>,
    ) -> Result<()> {
        let mut left = Vec::new();
        let mut right = Vec::new();
        self.left.insert(solution, entity, &mut left)?;
        self.right.insert(solution, entity, &mut right)?;
        self.apply_left(left, out)?;
        self.apply_right(right, out)
    }

    fn retract(&mut self, entity: EntityHandle, out: &mut Vec<Delta<T::Output>>) -> Result<()> {
        let mut left = Vec::new();
        let mut right = Vec::new();
        self.left.retract(entity, &mut left)?;
        self.right.retract(entity, &mut right)?;
        self.apply_left(left, out)?;
        self.apply_right(right, out)
    }

    fn clear(&mut self) {
        self.left.clear();
        self.right.clear();
        self.left_rows.clear();
        self.right_rows.clear();
        self.left_index.clear();
        self.right_index.clear();
        self.pairs.clear();
        self.ids.reset();
    }
}
