//! Planwright Core - domain model and score types for incremental scoring
//!
//! This crate provides the fundamental abstractions for Planwright:
//! - Score types for representing solution quality
//! - The descriptor model of planning entities and variables
//! - Supplies and shadow variable listeners
//! - Constraint identity and impact types

pub mod constraint;
pub mod domain;
pub mod error;
pub mod score;

#[cfg(test)]
mod test_utils;

pub use constraint::{ConstraintRef, ImpactType};
pub use domain::{
    Demand, EntityDescriptor, EntityHandle, PlanningSolution, SolutionDescriptor, SourceRef,
    SupplyKind, ValueRef, VariableDescriptor, VariableId, VariableListenerSupport,
};
pub use error::{PlanwrightError, Result};
pub use score::{
    BendableScore, HardMediumSoftScore, HardSoftDecimalScore, HardSoftScore, MatchWeight,
    ParseableScore, Score, ScoreLevel, ScoreParseError, SimpleScore,
};

pub use rust_decimal::Decimal;
