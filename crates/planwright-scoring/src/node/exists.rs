//! Semi-join node for `if_exists` and `if_not_exists`.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use planwright_core::domain::{EntityHandle, SolutionDescriptor};
use planwright_core::{PlanwrightError, Result};
use smallvec::SmallVec;

use super::{Delta, JoinIndex, Node, TupleId};
use crate::stream::joiner::{IndexKey, JoinerList};
use crate::stream::tuple::{Element, Tuple};

type Matches = SmallVec<[TupleId; 4]>;

struct LeftEntry<T> {
    row: T,
    key: IndexKey,
    // matching right rows; the row's counter is their number
    matches: Matches,
    passed: bool,
}

struct RightEntry<B> {
    fact: B,
    key: IndexKey,
    matches: Matches,
}

/// Passes a left row through while at least one (or, negated, no) right
/// fact matches it.
///
/// Each left row keeps a match counter; the row is only re-emitted or
/// withdrawn when the counter crosses between zero and one.
pub struct ExistsNode<L, R, J, T, B> {
    left: L,
    right: R,
    joiners: J,
    negated: bool,
    left_rows: HashMap<TupleId, LeftEntry<T>>,
    right_rows: HashMap<TupleId, RightEntry<B>>,
    left_index: JoinIndex,
    right_index: JoinIndex,
    _phantom: PhantomData<fn() -> B>,
}

impl<L, R, J, T, B> ExistsNode<L, R, J, T, B>
where
    T: Tuple,
    B: Element,
    J: JoinerList<T, B>,
{
    pub fn new(left: L, right: R, joiners: J, negated: bool) -> Self {
        Self {
            left,
            right,
            joiners,
            negated,
            left_rows: HashMap::new(),
            right_rows: HashMap::new(),
            left_index: JoinIndex::new(),
            right_index: JoinIndex::new(),
            _phantom: PhantomData,
        }
    }

    fn apply_left(&mut self, input: Vec<Delta<T>>, out: &mut Vec<Delta<T>>) -> Result<()> {
        for delta in input {
            match delta {
                Delta::Insert(id, row) => {
                    let key = self.joiners.left_key(&row);
                    let mut matches = Matches::new();
                    for right_id in self
                        .right_index
                        .candidates(key.bucket, self.joiners.right_bounds(&row))
                    {
                        let Some(right) = self.right_rows.get_mut(&right_id) else {
                            continue;
                        };
                        if self.joiners.matches(&row, &right.fact) {
                            right.matches.push(id);
                            matches.push(right_id);
                        }
                    }
                    let passed = matches.is_empty() == self.negated;
                    if passed {
                        out.push(Delta::Insert(id, row.clone()));
                    }
                    self.left_index.insert(key, id);
                    self.left_rows.insert(id, LeftEntry { row, key, matches, passed });
                }
                Delta::Retract(id) => {
                    let entry = self.left_rows.remove(&id).ok_or_else(|| {
                        PlanwrightError::StateCorruption(format!(
                            "semi-join retracted unknown left row {:?}",
                            id
                        ))
                    })?;
                    self.left_index.remove(entry.key, id);
                    for right_id in entry.matches {
                        if let Some(right) = self.right_rows.get_mut(&right_id) {
                            right.matches.retain(|l| *l != id);
                        }
                    }
                    if entry.passed {
                        out.push(Delta::Retract(id));
                    }
                }
            }
        }
        Ok(())
    }

    fn apply_right(&mut self, input: Vec<Delta<(B,)>>, out: &mut Vec<Delta<T>>) -> Result<()> {
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
                        matches.push(left_id);
                        left.matches.push(right_id);
                        if left.matches.len() == 1 {
                            flip(left_id, left, out);
                        }
                    }
                    self.right_index.insert(key, right_id);
                    self.right_rows.insert(right_id, RightEntry { fact, key, matches });
                }
                Delta::Retract(right_id) => {
                    let entry = self.right_rows.remove(&right_id).ok_or_else(|| {
                        PlanwrightError::StateCorruption(format!(
                            "semi-join retracted unknown right row {:?}",
                            right_id
                        ))
                    })?;
                    self.right_index.remove(entry.key, right_id);
                    for left_id in entry.matches {
                        let Some(left) = self.left_rows.get_mut(&left_id) else {
                            continue;
                        };
                        left.matches.retain(|r| *r != right_id);
                        if left.matches.is_empty() {
                            flip(left_id, left, out);
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

// Toggles a left row's emission after its counter crossed zero.
fn flip<T: Clone>(id: TupleId, left: &mut LeftEntry<T>, out: &mut Vec<Delta<T>>) {
    if left.passed {
        out.push(Delta::Retract(id));
    } else {
        out.push(Delta::Insert(id, left.row.clone()));
    }
    left.passed = !left.passed;
}

impl<S, L, R, J, T, B> Node<S> for ExistsNode<L, R, J, T, B>
where
    L: Node<S, Out = T>,
    R: Node<S, Out = (B,)>,
    T: Tuple,
    B: Element,
    J: JoinerList<T, B>,
{
    type Out = T;

    fn initialize(&mut self, descriptor: &Arc<SolutionDescriptor<S>>) -> Result<()> {
        self.left.initialize(descriptor)?;
        self.right.initialize(descriptor)
    }

    fn insert(
        &mut self,
        solution: &S,
        entity: EntityHandle,
        out: &mut Vec<Delta<T>>,
    ) -> Result<()> {
        let mut left = Vec::new();
        let mut right = Vec::new();
        self.left.insert(solution, entity, &mut left)?;
        self.right.insert(solution, entity, &mut right)?;
        self.apply_left(left, out)?;
        self.apply_right(right, out)
    }

    fn retract(&mut self, entity: EntityHandle, out: &mut Vec<Delta<T>>) -> Result<()> {
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
    }
}
