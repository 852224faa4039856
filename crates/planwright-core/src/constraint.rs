//! Constraint identity and impact classification.

use std::fmt;

use crate::score::MatchWeight;

/// Reference to a constraint for identification.
///
/// # Example
///
/// ```
/// use planwright_core::ConstraintRef;
///
/// let cr = ConstraintRef::new("scheduling", "NoOverlap");
/// assert_eq!(cr.full_name(), "scheduling/NoOverlap");
///
/// let simple = ConstraintRef::new("", "Simple");
/// assert_eq!(simple.full_name(), "Simple");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstraintRef {
    /// Package/module containing the constraint.
    pub package: String,
    /// Name of the constraint.
    pub name: String,
}

impl ConstraintRef {
    /// Creates a new constraint reference.
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }

    /// Returns the fully qualified name.
    pub fn full_name(&self) -> String {
        if self.package.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.package, self.name)
        }
    }
}

impl fmt::Display for ConstraintRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

/// Type of impact a constraint has on the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImpactType {
    /// Subtract the match weight from the score.
    Penalty,
    /// Add the match weight to the score.
    Reward,
    /// Add the match weight, which may be positive or negative.
    Mixed,
}

impl ImpactType {
    /// Returns true when negative match weights are allowed.
    pub fn allows_negative(self) -> bool {
        matches!(self, ImpactType::Mixed)
    }

    /// Applies the impact sign to a raw match weight.
    ///
    /// Fails when a negative match weight reaches a pure penalty or reward
    /// constraint, or when negating it overflows; the returned message is
    /// meant to be wrapped with the constraint name by the caller.
    pub fn signed<W: MatchWeight>(self, match_weight: W) -> std::result::Result<W, String> {
        if match_weight.is_negative() && !self.allows_negative() {
            return Err(format!(
                "match weight ({}) is negative for a {:?} constraint; \
                 use a Mixed impact or flip the comparison in the weigher",
                match_weight, self
            ));
        }
        match self {
            ImpactType::Penalty => match_weight
                .checked_neg()
                .ok_or_else(|| format!("match weight ({}) overflows when negated", match_weight)),
            ImpactType::Reward | ImpactType::Mixed => Ok(match_weight),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_ref_full_name() {
        let cr = ConstraintRef::new("my.package", "TestConstraint");
        assert_eq!(cr.full_name(), "my.package/TestConstraint");
        assert_eq!(cr.to_string(), "my.package/TestConstraint");
    }

    #[test]
    fn test_constraint_ref_empty_package() {
        let cr = ConstraintRef::new("", "Simple");
        assert_eq!(cr.full_name(), "Simple");
    }

    #[test]
    fn test_impact_signs() {
        assert_eq!(ImpactType::Penalty.signed(3), Ok(-3));
        assert_eq!(ImpactType::Reward.signed(3), Ok(3));
        assert_eq!(ImpactType::Mixed.signed(-3), Ok(-3));
    }

    #[test]
    fn test_negative_weight_rejected_for_pure_impacts() {
        assert!(ImpactType::Penalty.signed(-1).is_err());
        assert!(ImpactType::Reward.signed(-1).is_err());
        assert_eq!(ImpactType::Penalty.signed(0), Ok(0));
    }

    #[test]
    fn test_decimal_weights_take_the_impact_sign() {
        let half = rust_decimal::Decimal::new(5, 1);
        assert_eq!(ImpactType::Penalty.signed(half), Ok(-half));
        assert!(ImpactType::Reward.signed(-half).is_err());
        assert!(ImpactType::Mixed.signed(i64::MIN).is_ok());
        assert!(ImpactType::Penalty.signed(i64::MIN).is_err());
    }
}
