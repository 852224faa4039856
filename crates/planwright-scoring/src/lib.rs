//! Incremental constraint scoring for Planwright.
//!
//! This crate provides the scoring side of the engine:
//! - Constraint streams compiled into a typed node network
//! - Terminal constraints that accumulate signed impacts and matches
//! - Tuple-based constraint sets
//! - The incremental score director driving supplies, shadow variables
//!   and the network through the before/after bracket protocol
//!
//! # Architecture
//!
//! Every stream operation wraps the node built so far, so a finished
//! constraint owns a fully monomorphized node tree. Closures are stored as
//! generic type parameters, not `Arc<dyn Fn>`.

// Node trees and stream types intentionally nest deep generic types
#![allow(clippy::type_complexity)]

pub mod api;
pub mod constraint;
pub mod director;
pub mod node;
pub mod stream;

// ============================================================================
// Constraints
// ============================================================================

pub use constraint::{ConstraintWeight, StreamConstraint};

// ============================================================================
// Constraint Set (Tuple-Based)
// ============================================================================

pub use api::constraint_set::{ConstraintResult, ConstraintSet, IncrementalConstraint};
pub use api::weight_overrides::{ConstraintWeightOverrides, WeightProvider};

// ============================================================================
// Score Director
// ============================================================================

pub use director::{ChangeGuard, IncrementalScoreDirector, ScoreDirector};

// ============================================================================
// Analysis (for score explanation)
// ============================================================================

pub use api::analysis::{
    ConstraintJustification, ConstraintMatch, ConstraintMatchTotal, EntityRef, Indictment,
    IndictmentMap, ScoreExplanation,
};

// ============================================================================
// Fluent Constraint Stream API
// ============================================================================

pub use stream::{
    BiConstraintStream, ConstraintBuilder, ConstraintFactory, PentaConstraintStream,
    QuadConstraintStream, TriConstraintStream, UniConstraintStream,
};
