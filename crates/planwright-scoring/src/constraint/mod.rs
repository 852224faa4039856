//! Terminal constraints of the stream network.
//!
//! A [`StreamConstraint`] owns the node tree built by a constraint stream
//! and turns its output rows into signed impacts. Everything is a concrete
//! generic type: the weigher, every predicate and every key function is
//! monomorphized into the constraint.

mod terminal;
mod weight;


pub use terminal::StreamConstraint;
pub use weight::ConstraintWeight;
