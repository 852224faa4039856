//! Uni-constraint stream: rows of one fact.
//!
//! # Example
//!
//! ```
//! use planwright_scoring::stream::ConstraintFactory;
//! use planwright_scoring::stream::joiner::{equal, filtering};
//! use planwright_core::score::SimpleScore;
//!
//! #[derive(Clone, Debug)]
//! struct Shift { id: usize, employee: Option<usize> }
//!
//! struct Schedule { shifts: Vec<Shift> }
//!
//! let factory = ConstraintFactory::<Schedule, SimpleScore>::new();
//! let conflict = factory
//!     .for_each(|s: &Schedule| s.shifts.as_slice())
//!     .join(
//!         factory.for_each(|s: &Schedule| s.shifts.as_slice()),
//!         (
//!             equal(|s: &Shift| s.employee),
//!             filtering(|a: &Shift, b: &Shift| a.id < b.id),
//!         ),
//!     )
//!     .unwrap()
//!     .penalize(SimpleScore::of(1))
//!     .as_constraint("Shift conflict");
//! # let _ = conflict;
//! ```

use super::arity_stream_macros::{impl_arity_stream, impl_stream_join};
use super::BiConstraintStream;

impl_arity_stream!(UniConstraintStream);
impl_stream_join!(UniConstraintStream => BiConstraintStream);
