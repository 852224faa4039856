//! Score types for representing solution quality
//!
//! Scores are used to compare solutions and guide the optimization process.
//! All score types are immutable and implement arithmetic operations.

#[macro_use]
mod macros;
mod bendable;
mod decimal;
mod impact;
mod level;
mod traits;

#[cfg(test)]
mod tests;

pub use bendable::BendableScore;
pub use decimal::HardSoftDecimalScore;
pub use impact::{scale_level, MatchWeight};
pub use level::ScoreLevel;
pub use traits::{ParseableScore, Score, ScoreParseError};

define_score!(
    /// A single-level score.
    ///
    /// ```
    /// use planwright_core::{Score, SimpleScore};
    ///
    /// assert!(SimpleScore::of(-3) > SimpleScore::of(-5));
    /// assert!(!SimpleScore::of(-1).is_feasible());
    /// ```
    SimpleScore { score => "": Soft }
);

define_score!(
    /// A score with separate hard and soft levels.
    ///
    /// Hard levels are compared first; a solution is feasible when its hard
    /// level is not negative.
    ///
    /// ```
    /// use planwright_core::HardSoftScore;
    ///
    /// assert!(HardSoftScore::of(0, -200) > HardSoftScore::of(-1, -100));
    /// ```
    HardSoftScore { hard => "hard": Hard, soft => "soft": Soft }
);

define_score!(
    /// A three-level score with a medium level between hard and soft.
    HardMediumSoftScore {
        hard => "hard": Hard,
        medium => "medium": Medium,
        soft => "soft": Soft
    }
);

impl SimpleScore {
    /// A score of 1.
    pub const ONE: SimpleScore = SimpleScore::of(1);
}

impl HardSoftScore {
    /// One hard point.
    pub const ONE_HARD: HardSoftScore = HardSoftScore::of(1, 0);

    /// One soft point.
    pub const ONE_SOFT: HardSoftScore = HardSoftScore::of(0, 1);

    /// Creates a score with only a hard component.
    pub const fn of_hard(hard: i64) -> Self {
        HardSoftScore::of(hard, 0)
    }

    /// Creates a score with only a soft component.
    pub const fn of_soft(soft: i64) -> Self {
        HardSoftScore::of(0, soft)
    }
}

impl HardMediumSoftScore {
    /// One hard point.
    pub const ONE_HARD: HardMediumSoftScore = HardMediumSoftScore::of(1, 0, 0);

    /// One medium point.
    pub const ONE_MEDIUM: HardMediumSoftScore = HardMediumSoftScore::of(0, 1, 0);

    /// One soft point.
    pub const ONE_SOFT: HardMediumSoftScore = HardMediumSoftScore::of(0, 0, 1);
}
