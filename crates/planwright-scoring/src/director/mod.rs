//! Score director.
//!
//! The score director owns the working solution and keeps its score
//! current as the solution changes.
//!
//! - [`ScoreDirector`] - bracket protocol and score calculation
//! - [`IncrementalScoreDirector`] - the incremental implementation
//! - [`ChangeGuard`] - a scoped bracket on one variable

mod guard;
mod incremental;
mod traits;


pub use guard::ChangeGuard;
pub use incremental::IncrementalScoreDirector;
pub use traits::ScoreDirector;
