// Runtime constraint weight configuration.
//
// Weights are looked up by full constraint name first (`package/name`),
// then by bare name. Configurable constraints must find a weight here;
// fixed-weight constraints fall back to the weight they were built with.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;
use std::sync::Arc;

use planwright_core::score::ParseableScore;
use planwright_core::{ConstraintRef, PlanwrightError, Result, Score};

// Holds runtime overrides for constraint weights, supplied per working
// solution.
#[derive(Clone)]
pub struct ConstraintWeightOverrides<Sc: Score> {
    weights: HashMap<String, Sc>,
}

impl<Sc: Score> Debug for ConstraintWeightOverrides<Sc> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstraintWeightOverrides")
            .field("count", &self.weights.len())
            .finish()
    }
}

impl<Sc: Score> Default for ConstraintWeightOverrides<Sc> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Sc: Score> ConstraintWeightOverrides<Sc> {
    // Creates an empty overrides container.
    pub fn new() -> Self {
        Self {
            weights: HashMap::new(),
        }
    }

    // Creates overrides from an iterator of (name, weight) pairs.
    pub fn from_pairs<I, N>(iter: I) -> Self
    where
        I: IntoIterator<Item = (N, Sc)>,
        N: Into<String>,
    {
        let weights = iter.into_iter().map(|(n, w)| (n.into(), w)).collect();
        Self { weights }
    }

    // Parses overrides from configured score strings.
    pub fn from_config(weights: &BTreeMap<String, String>) -> Result<Self>
    where
        Sc: ParseableScore,
    {
        let mut parsed = HashMap::with_capacity(weights.len());
        for (name, text) in weights {
            let weight = Sc::parse(text).map_err(|e| {
                PlanwrightError::Config(format!(
                    "weight {:?} of constraint {} is not a valid score: {}",
                    text, name, e
                ))
            })?;
            parsed.insert(name.clone(), weight);
        }
        Ok(Self { weights: parsed })
    }

    // Sets the weight for a constraint.
    pub fn put<N: Into<String>>(&mut self, name: N, weight: Sc) {
        self.weights.insert(name.into(), weight);
    }

    // Removes the override for a constraint.
    pub fn remove(&mut self, name: &str) -> Option<Sc> {
        self.weights.remove(name)
    }

    // Gets the overridden weight if present.
    pub fn get(&self, name: &str) -> Option<&Sc> {
        self.weights.get(name)
    }

    // Returns true if this constraint has an override.
    pub fn contains(&self, name: &str) -> bool {
        self.weights.contains_key(name)
    }

    // Returns the number of overrides.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    // Returns true if there are no overrides.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    // Creates an Arc-wrapped version for sharing across threads.
    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

// Source of constraint weights consulted once per score calculation.
pub trait WeightProvider<Sc: Score>: Send + Sync {
    // Gets the weight for a constraint by name.
    fn weight(&self, name: &str) -> Option<Sc>;

    // Looks up a constraint by full name, then by bare name.
    fn weight_for(&self, constraint: &ConstraintRef) -> Option<Sc> {
        self.weight(&constraint.full_name())
            .or_else(|| self.weight(&constraint.name))
    }
}

impl<Sc: Score> WeightProvider<Sc> for ConstraintWeightOverrides<Sc> {
    fn weight(&self, name: &str) -> Option<Sc> {
        self.get(name).copied()
    }
}

impl<Sc: Score> WeightProvider<Sc> for Arc<ConstraintWeightOverrides<Sc>> {
    fn weight(&self, name: &str) -> Option<Sc> {
        self.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use planwright_core::score::{HardSoftScore, SimpleScore};

    use super::*;

    #[test]
    fn test_put_get_remove() {
        let mut overrides = ConstraintWeightOverrides::<SimpleScore>::new();
        assert!(overrides.is_empty());

        overrides.put("Conflict", SimpleScore::of(5));
        assert_eq!(overrides.get("Conflict"), Some(&SimpleScore::of(5)));
        assert_eq!(overrides.get("Other"), None);

        assert_eq!(overrides.remove("Conflict"), Some(SimpleScore::of(5)));
        assert!(!overrides.contains("Conflict"));
    }

    #[test]
    fn test_full_name_wins_over_bare_name() {
        let overrides = ConstraintWeightOverrides::from_pairs([
            ("Conflict", SimpleScore::of(1)),
            ("rostering/Conflict", SimpleScore::of(7)),
        ]);

        let packaged = ConstraintRef::new("rostering", "Conflict");
        let other_package = ConstraintRef::new("routing", "Conflict");
        assert_eq!(overrides.weight_for(&packaged), Some(SimpleScore::of(7)));
        assert_eq!(overrides.weight_for(&other_package), Some(SimpleScore::of(1)));
        assert_eq!(overrides.weight_for(&ConstraintRef::new("", "Missing")), None);
    }

    #[test]
    fn test_from_config_parses_scores() {
        let mut config = BTreeMap::new();
        config.insert("Overtime".to_string(), "0hard/-2soft".to_string());
        config.insert("Capacity".to_string(), "1hard/0soft".to_string());

        let overrides = ConstraintWeightOverrides::<HardSoftScore>::from_config(&config).unwrap();
        assert_eq!(overrides.len(), 2);
        assert_eq!(overrides.weight("Capacity"), Some(HardSoftScore::of(1, 0)));
    }

    #[test]
    fn test_from_config_rejects_bad_score() {
        let mut config = BTreeMap::new();
        config.insert("Overtime".to_string(), "lots".to_string());

        let err = ConstraintWeightOverrides::<HardSoftScore>::from_config(&config).unwrap_err();
        match err {
            PlanwrightError::Config(message) => {
                assert!(message.contains("Overtime"), "{}", message)
            }
            other => panic!("expected a configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_arc_provider() {
        let overrides =
            ConstraintWeightOverrides::from_pairs([("A", SimpleScore::of(3))]).into_arc();
        assert_eq!(overrides.weight("A"), Some(SimpleScore::of(3)));
        assert_eq!(overrides.weight_for(&ConstraintRef::new("pkg", "A")), Some(SimpleScore::of(3)));
    }
}
