// Constraint weights.

use planwright_core::score::Score;
use planwright_core::{ConstraintRef, PlanwrightError, Result};

use crate::api::weight_overrides::WeightProvider;

/// Where a constraint's weight comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintWeight<Sc> {
    /// Weight given at definition; a configured override still wins.
    Fixed(Sc),
    /// Weight must be configured per working solution.
    Configurable,
}

impl<Sc: Score> ConstraintWeight<Sc> {
    pub fn resolve(
        &self,
        constraint: &ConstraintRef,
        weights: &dyn WeightProvider<Sc>,
    ) -> Result<Sc> {
        match self {
            ConstraintWeight::Fixed(default) => {
                Ok(weights.weight_for(constraint).unwrap_or(*default))
            }
            ConstraintWeight::Configurable => weights.weight_for(constraint).ok_or_else(|| {
                PlanwrightError::Config(format!(
                    "constraint {} is configurable but no weight is configured for it",
                    constraint
                ))
            }),
        }
    }

    pub fn is_configurable(&self) -> bool {
        matches!(self, ConstraintWeight::Configurable)
    }
}
