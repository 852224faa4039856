//! Core domain traits

use crate::score::Score;

/// A planning solution: the working state the score director owns.
///
/// Entities live in index-addressed collections inside the solution; the
/// descriptor model reaches them through accessor functions, so this trait
/// only covers the score slot.
///
/// # Example
///
/// ```
/// use planwright_core::{PlanningSolution, SimpleScore};
///
/// struct Schedule {
///     assignments: Vec<Option<usize>>,
///     score: Option<SimpleScore>,
/// }
///
/// impl PlanningSolution for Schedule {
///     type Score = SimpleScore;
///
///     fn score(&self) -> Option<Self::Score> {
///         self.score
///     }
///
///     fn set_score(&mut self, score: Option<Self::Score>) {
///         self.score = score;
///     }
/// }
/// ```
pub trait PlanningSolution: Send + Sync + 'static {
    /// The score type used to evaluate this solution.
    type Score: Score;

    /// Returns the current score of this solution, if calculated.
    fn score(&self) -> Option<Self::Score>;

    /// Sets the score of this solution.
    fn set_score(&mut self, score: Option<Self::Score>);
}
