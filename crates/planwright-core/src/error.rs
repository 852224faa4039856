//! Error types for Planwright

use thiserror::Error;

/// Main error type for Planwright operations.
///
/// Every variant is a hard failure: the incremental engine has no safe
/// partial-failure mode, so callers abort the current solve instead of
/// retrying.
#[derive(Debug, Error)]
pub enum PlanwrightError {
    /// Invalid domain, stream or weight definition, detected at build time.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Derived state no longer matches the working solution.
    #[error("State corruption: {0}")]
    StateCorruption(String),

    /// A pure penalty or reward constraint produced a negative match weight.
    #[error("Score impact error in constraint ({constraint}): {message}")]
    ScoreImpact { constraint: String, message: String },

    /// The incremental score diverged from a from-scratch recalculation.
    #[error("Score corruption: {0}")]
    ScoreCorruption(String),

    /// Invalid operation for the current director state.
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl PlanwrightError {
    /// Returns true for errors detected per mutation rather than at build time.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            PlanwrightError::StateCorruption(_) | PlanwrightError::ScoreCorruption(_)
        )
    }
}

/// Result type alias for Planwright operations
pub type Result<T> = std::result::Result<T, PlanwrightError>;
