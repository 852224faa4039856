//! Externalized position tracking for list variables.

use std::collections::HashMap;

use crate::error::{PlanwrightError, Result};

/// Position of an element within a list variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementPosition {
    /// Index of the entity whose list contains the element.
    pub owner: usize,
    /// Index of the element within that list.
    pub index: usize,
}

impl ElementPosition {
    pub const fn new(owner: usize, index: usize) -> Self {
        Self { owner, index }
    }
}

/// Tracks the owner and index of every assigned element of one list
/// variable, plus how many elements of the element class are unassigned.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ListStateSupply {
    positions: HashMap<usize, ElementPosition>,
    element_count: usize,
}

impl ListStateSupply {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn position(&self, element: usize) -> Option<ElementPosition> {
        self.positions.get(&element).copied()
    }

    #[inline]
    pub fn owner(&self, element: usize) -> Option<usize> {
        self.positions.get(&element).map(|p| p.owner)
    }

    #[inline]
    pub fn index(&self, element: usize) -> Option<usize> {
        self.positions.get(&element).map(|p| p.index)
    }

    pub fn is_assigned(&self, element: usize) -> bool {
        self.positions.contains_key(&element)
    }

    pub fn assigned_count(&self) -> usize {
        self.positions.len()
    }

    pub fn unassigned_count(&self) -> usize {
        self.element_count.saturating_sub(self.positions.len())
    }

    pub(crate) fn set_element_count(&mut self, count: usize) {
        self.element_count = count;
    }

    /// Forgets the elements of `list[from..to]` before they change.
    ///
    /// # Errors
    ///
    /// Fails with `StateCorruption` if an element is not recorded at its
    /// current position.
    pub fn retract_range(
        &mut self,
        owner: usize,
        list: &[usize],
        from: usize,
        to: usize,
    ) -> Result<()> {
        for (index, &element) in list.iter().enumerate().take(to).skip(from) {
            let expected = ElementPosition::new(owner, index);
            match self.positions.remove(&element) {
                Some(found) if found == expected => {}
                found => {
                    return Err(PlanwrightError::StateCorruption(format!(
                        "List state for element ({}) holds {:?} but the list has it at {:?}",
                        element, found, expected
                    )))
                }
            }
        }
        Ok(())
    }

    /// Records the elements of `list[from..to]` after they changed, then
    /// shifts the positions of the elements following the range until one
    /// is already correct.
    ///
    /// # Errors
    ///
    /// Fails with `StateCorruption` if an inserted element is already
    /// recorded, or a following element is not recorded in this list.
    pub fn insert_range(
        &mut self,
        owner: usize,
        list: &[usize],
        from: usize,
        to: usize,
    ) -> Result<()> {
        for (index, &element) in list.iter().enumerate().take(to).skip(from) {
            let position = ElementPosition::new(owner, index);
            if let Some(found) = self.positions.insert(element, position) {
                return Err(PlanwrightError::StateCorruption(format!(
                    "List state for element ({}) already holds {:?} while inserting at {:?}",
                    element,
                    found,
                    ElementPosition::new(owner, index)
                )));
            }
        }
        for (index, &element) in list.iter().enumerate().skip(to) {
            match self.positions.get_mut(&element) {
                Some(position) if position.owner == owner => {
                    if position.index == index {
                        break;
                    }
                    position.index = index;
                }
                found => {
                    return Err(PlanwrightError::StateCorruption(format!(
                        "List state for element ({}) holds {:?} but it follows the changed range \
                         of entity ({})",
                        element, found, owner
                    )))
                }
            }
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.positions.clear();
    }
}
