//! Inverse and index listeners for list source variables.

use super::inverse::stale;
use super::traits::ListVariableListener;
use crate::domain::descriptor::{ListAccessor, SlotAccessor, SolutionDescriptor};
use crate::domain::handle::{EntityHandle, VariableId};
use crate::error::{PlanwrightError, Result};

/// Copies `list[from..]` of the owner after checking the range.
fn tail<S>(
    list: ListAccessor<S>,
    solution: &S,
    owner: usize,
    from: usize,
    to: usize,
) -> Result<Vec<usize>> {
    let elements = (list.get)(solution, owner);
    if from > to || to > elements.len() {
        return Err(PlanwrightError::InvalidState(format!(
            "List change range [{}, {}) is out of bounds for owner ({}) with {} elements",
            from,
            to,
            owner,
            elements.len()
        )));
    }
    Ok(elements[from..].to_vec())
}

/// Maintains the owner shadow of each list element.
pub struct ListInverseListener<S> {
    shadow: VariableId,
    source: VariableId,
    list: ListAccessor<S>,
    slot: SlotAccessor<S>,
}

impl<S> ListInverseListener<S> {
    pub fn new(
        shadow: VariableId,
        source: VariableId,
        list: ListAccessor<S>,
        slot: SlotAccessor<S>,
    ) -> Self {
        Self {
            shadow,
            source,
            list,
            slot,
        }
    }

    pub fn shadow(&self) -> VariableId {
        self.shadow
    }
}

impl<S> ListVariableListener<S> for ListInverseListener<S> {
    fn before_list_variable_changed(
        &mut self,
        solution: &mut S,
        owner: usize,
        from: usize,
        to: usize,
        touched: &mut Vec<EntityHandle>,
    ) -> Result<()> {
        for &element in &tail(self.list, solution, owner, from, to)?[..to - from] {
            let current = (self.slot.get)(solution, element);
            if current != Some(owner) {
                return Err(PlanwrightError::StateCorruption(format!(
                    "List inverse {:?} of element ({}) is {:?} while retracting it from owner ({})",
                    self.shadow, element, current, owner
                )));
            }
            (self.slot.set)(solution, element, None);
            touched.push(self.shadow.handle(element));
        }
        Ok(())
    }

    fn after_list_variable_changed(
        &mut self,
        solution: &mut S,
        owner: usize,
        from: usize,
        to: usize,
        touched: &mut Vec<EntityHandle>,
    ) -> Result<()> {
        for &element in &tail(self.list, solution, owner, from, to)?[..to - from] {
            if let Some(existing) = (self.slot.get)(solution, element) {
                return Err(PlanwrightError::StateCorruption(format!(
                    "List inverse {:?} of element ({}) already names owner ({}) while inserting \
                     it into owner ({})",
                    self.shadow, element, existing, owner
                )));
            }
            (self.slot.set)(solution, element, Some(owner));
            touched.push(self.shadow.handle(element));
        }
        Ok(())
    }

    fn list_len(&self, solution: &S, owner: usize) -> usize {
        (self.list.get)(solution, owner).len()
    }

    fn reset_working_solution(
        &mut self,
        descriptor: &SolutionDescriptor<S>,
        solution: &mut S,
    ) -> Result<()> {
        for element in 0..descriptor.entity_count(solution, self.shadow.entity) {
            (self.slot.set)(solution, element, None);
        }
        let mut touched = Vec::new();
        for owner in 0..descriptor.entity_count(solution, self.source.entity) {
            let len = self.list_len(solution, owner);
            self.after_list_variable_changed(solution, owner, 0, len, &mut touched)?;
        }
        Ok(())
    }

    fn assert_not_stale(&self, descriptor: &SolutionDescriptor<S>, solution: &S) -> Result<()> {
        let mut expected = vec![None; descriptor.entity_count(solution, self.shadow.entity)];
        for owner in 0..descriptor.entity_count(solution, self.source.entity) {
            for &element in (self.list.get)(solution, owner) {
                if let Some(slot) = expected.get_mut(element) {
                    *slot = Some(owner);
                }
            }
        }
        for (element, expected) in expected.into_iter().enumerate() {
            let actual = (self.slot.get)(solution, element);
            if actual != expected {
                return Err(stale(descriptor, self.shadow, element, &expected, &actual));
            }
        }
        Ok(())
    }
}

/// Maintains the position shadow of each list element.
///
/// After a change, positions following the changed range are shifted in the
/// same event until an element already holds its correct index, so a
/// removal or insertion is one range notification.
pub struct ListIndexListener<S> {
    shadow: VariableId,
    source: VariableId,
    list: ListAccessor<S>,
    slot: SlotAccessor<S>,
}

impl<S> ListIndexListener<S> {
    pub fn new(
        shadow: VariableId,
        source: VariableId,
        list: ListAccessor<S>,
        slot: SlotAccessor<S>,
    ) -> Self {
        Self {
            shadow,
            source,
            list,
            slot,
        }
    }

    pub fn shadow(&self) -> VariableId {
        self.shadow
    }
}

impl<S> ListVariableListener<S> for ListIndexListener<S> {
    fn before_list_variable_changed(
        &mut self,
        solution: &mut S,
        owner: usize,
        from: usize,
        to: usize,
        touched: &mut Vec<EntityHandle>,
    ) -> Result<()> {
        let elements = tail(self.list, solution, owner, from, to)?;
        for (index, &element) in (from..to).zip(&elements) {
            let current = (self.slot.get)(solution, element);
            if current != Some(index) {
                return Err(PlanwrightError::StateCorruption(format!(
                    "List index {:?} of element ({}) is {:?} while retracting it from position \
                     ({}) of owner ({})",
                    self.shadow, element, current, index, owner
                )));
            }
            (self.slot.set)(solution, element, None);
            touched.push(self.shadow.handle(element));
        }
        Ok(())
    }

    fn after_list_variable_changed(
        &mut self,
        solution: &mut S,
        owner: usize,
        from: usize,
        to: usize,
        touched: &mut Vec<EntityHandle>,
    ) -> Result<()> {
        let elements = tail(self.list, solution, owner, from, to)?;
        for (index, &element) in (from..to).zip(&elements) {
            if let Some(existing) = (self.slot.get)(solution, element) {
                return Err(PlanwrightError::StateCorruption(format!(
                    "List index {:?} of element ({}) already holds ({}) while inserting it at \
                     position ({}) of owner ({})",
                    self.shadow, element, existing, index, owner
                )));
            }
            (self.slot.set)(solution, element, Some(index));
            touched.push(self.shadow.handle(element));
        }
        for (index, &element) in (to..).zip(&elements[to - from..]) {
            match (self.slot.get)(solution, element) {
                Some(current) if current == index => break,
                Some(_) => {
                    (self.slot.set)(solution, element, Some(index));
                    touched.push(self.shadow.handle(element));
                }
                None => {
                    return Err(PlanwrightError::StateCorruption(format!(
                        "List index {:?} of element ({}) is unset although it follows the changed \
                         range of owner ({})",
                        self.shadow, element, owner
                    )))
                }
            }
        }
        Ok(())
    }

    fn list_len(&self, solution: &S, owner: usize) -> usize {
        (self.list.get)(solution, owner).len()
    }

    fn reset_working_solution(
        &mut self,
        descriptor: &SolutionDescriptor<S>,
        solution: &mut S,
    ) -> Result<()> {
        for element in 0..descriptor.entity_count(solution, self.shadow.entity) {
            (self.slot.set)(solution, element, None);
        }
        let mut touched = Vec::new();
        for owner in 0..descriptor.entity_count(solution, self.source.entity) {
            let len = self.list_len(solution, owner);
            self.after_list_variable_changed(solution, owner, 0, len, &mut touched)?;
        }
        Ok(())
    }

    fn assert_not_stale(&self, descriptor: &SolutionDescriptor<S>, solution: &S) -> Result<()> {
        let mut expected = vec![None; descriptor.entity_count(solution, self.shadow.entity)];
        for owner in 0..descriptor.entity_count(solution, self.source.entity) {
            for (index, &element) in (self.list.get)(solution, owner).iter().enumerate() {
                if let Some(slot) = expected.get_mut(element) {
                    *slot = Some(index);
                }
            }
        }
        for (element, expected) in expected.into_iter().enumerate() {
            let actual = (self.slot.get)(solution, element);
            if actual != expected {
                return Err(stale(descriptor, self.shadow, element, &expected, &actual));
            }
        }
        Ok(())
    }
}
