//! Fluent constraint stream API.
//!
//! Streams describe a constraint as a pipeline; every operation wraps the
//! node built so far, so the finished constraint owns a fully typed node
//! tree with no virtual dispatch between nodes.
//!
//! # Architecture
//!
//! ```text
//! ConstraintFactory::new()
//!     .for_each(extractor)          -> UniConstraintStream<S, SourceNode, Sc>
//!     .join(other, joiners)?        -> BiConstraintStream<S, JoinNode, Sc>
//!     .filter(predicate)            -> BiConstraintStream<S, FilterNode, Sc>
//!     .penalize(weight)             -> ConstraintBuilder<S, N, UnitWeight, Sc>
//!     .as_constraint(name)          -> StreamConstraint<S, N, W, Sc>
//! ```
//!
//! Closures passed to stream operations take one argument per fact of the
//! row: a bi stream filters with `|a: &A, b: &B| ...`.

mod arity_stream_macros;
mod bi_stream;
mod builder;
pub mod collector;
mod factory;
pub mod joiner;
mod penta_stream;
mod quad_stream;
mod tri_stream;
pub mod tuple;
mod uni_stream;

pub use bi_stream::BiConstraintStream;
pub use builder::ConstraintBuilder;
pub use factory::ConstraintFactory;
pub use penta_stream::PentaConstraintStream;
pub use quad_stream::QuadConstraintStream;
pub use tri_stream::TriConstraintStream;
pub use uni_stream::UniConstraintStream;
