//! Constraint API.
//!
//! This module provides:
//! - `IncrementalConstraint` and `ConstraintSet` for incremental evaluation
//! - Analysis types for score explanation and indictments
//! - Runtime weight override configuration

pub mod analysis;
pub mod constraint_set;
pub mod weight_overrides;


pub use analysis::{
    ConstraintJustification, ConstraintMatch, ConstraintMatchTotal, EntityRef, Indictment,
    IndictmentMap, ScoreExplanation,
};
pub use constraint_set::{ConstraintResult, ConstraintSet, IncrementalConstraint};
pub use weight_overrides::{ConstraintWeightOverrides, WeightProvider};
