//! Score analysis: match totals, justifications and indictments.
//!
//! Only available when constraint-match tracking is enabled on the score
//! director. Every match then keeps the facts of its tuple, so the score
//! can be broken down per constraint and per fact.

use std::any::{type_name, Any};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use planwright_core::score::{MatchWeight, Score};
use planwright_core::{ConstraintRef, Decimal, ImpactType, PlanwrightError, Result};

/// A fact taking part in a constraint match.
///
/// Type-erased so facts of different classes fit in one justification.
/// Identity is the type name plus the debug rendering of the fact; this is
/// the key indictments are grouped by.
#[derive(Clone)]
pub struct EntityRef {
    pub type_name: &'static str,
    pub label: String,
    value: Arc<dyn Any + Send + Sync>,
}

impl EntityRef {
    pub fn new<T: Clone + fmt::Debug + Send + Sync + 'static>(fact: &T) -> Self {
        Self {
            type_name: type_name::<T>(),
            label: format!("{:?}", fact),
            value: Arc::new(fact.clone()),
        }
    }

    /// The fact as `T`, if it is one.
    pub fn as_entity<T: 'static>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Type name without its module path.
    pub fn short_type_name(&self) -> &'static str {
        self.type_name.rsplit("::").next().unwrap_or(self.type_name)
    }
}

impl fmt::Debug for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.short_type_name(), self.label)
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

impl PartialEq for EntityRef {
    fn eq(&self, other: &Self) -> bool {
        self.type_name == other.type_name && self.label == other.label
    }
}

impl Eq for EntityRef {}

impl Hash for EntityRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_name.hash(state);
        self.label.hash(state);
    }
}

/// The facts of one matched tuple, in slot order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintJustification {
    pub facts: Vec<EntityRef>,
}

impl ConstraintJustification {
    pub fn new(facts: Vec<EntityRef>) -> Self {
        Self { facts }
    }

    /// Facts with repeated slots removed, first occurrence kept.
    pub fn distinct_facts(&self) -> Vec<&EntityRef> {
        let mut distinct: Vec<&EntityRef> = Vec::with_capacity(self.facts.len());
        for fact in &self.facts {
            if !distinct.contains(&fact) {
                distinct.push(fact);
            }
        }
        distinct
    }
}

impl fmt::Display for ConstraintJustification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.facts.is_empty() {
            return f.write_str("no facts");
        }
        for (i, fact) in self.facts.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", fact)?;
        }
        Ok(())
    }
}

/// One match of a constraint.
#[derive(Debug, Clone)]
pub struct ConstraintMatch<Sc: Score> {
    pub constraint_ref: ConstraintRef,
    /// Signed match weight before scaling, exact for integral and decimal
    /// weights alike.
    pub impact: Decimal,
    /// `impact` scaled by the constraint weight.
    pub score: Sc,
    pub justification: ConstraintJustification,
}

impl<Sc: Score> ConstraintMatch<Sc> {
    /// Scores a match; fails with `ScoreImpact` when scaling overflows.
    pub fn new<I: MatchWeight>(
        constraint_ref: ConstraintRef,
        impact: I,
        weight: Sc,
        justification: ConstraintJustification,
    ) -> Result<Self> {
        let score = impact.scale(&weight).ok_or_else(|| PlanwrightError::ScoreImpact {
            constraint: constraint_ref.full_name(),
            message: format!("weight {} scaled by {} overflows", weight, impact),
        })?;
        Ok(Self {
            constraint_ref,
            impact: impact.to_decimal(),
            score,
            justification,
        })
    }
}

/// Everything one constraint contributes to the score.
#[derive(Debug, Clone)]
pub struct ConstraintMatchTotal<Sc: Score> {
    pub constraint_ref: ConstraintRef,
    pub impact_type: ImpactType,
    /// Resolved weight, score per unit of impact.
    pub weight: Sc,
    pub score: Sc,
    /// Matches in the order their tuples were first created.
    pub matches: Vec<ConstraintMatch<Sc>>,
}

impl<Sc: Score> ConstraintMatchTotal<Sc> {
    pub fn new(
        constraint_ref: ConstraintRef,
        impact_type: ImpactType,
        weight: Sc,
        score: Sc,
        matches: Vec<ConstraintMatch<Sc>>,
    ) -> Self {
        Self {
            constraint_ref,
            impact_type,
            weight,
            score,
            matches,
        }
    }

    pub fn name(&self) -> &str {
        &self.constraint_ref.name
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    /// True when the weight touches a hard level.
    pub fn is_hard(&self) -> bool {
        self.weight.has_hard_component()
    }
}

/// A score together with its per-constraint totals.
#[derive(Debug, Clone)]
pub struct ScoreExplanation<Sc: Score> {
    pub score: Sc,
    pub totals: Vec<ConstraintMatchTotal<Sc>>,
}

impl<Sc: Score> ScoreExplanation<Sc> {
    pub fn new(score: Sc, totals: Vec<ConstraintMatchTotal<Sc>>) -> Self {
        Self { score, totals }
    }

    pub fn total_match_count(&self) -> usize {
        self.totals.iter().map(ConstraintMatchTotal::match_count).sum()
    }

    /// Totals whose score is not zero.
    pub fn non_zero_constraints(&self) -> Vec<&ConstraintMatchTotal<Sc>> {
        self.totals.iter().filter(|t| t.score != Sc::zero()).collect()
    }

    pub fn matches(&self) -> impl Iterator<Item = &ConstraintMatch<Sc>> {
        self.totals.iter().flat_map(|t| t.matches.iter())
    }
}

impl<Sc: Score> fmt::Display for ScoreExplanation<Sc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "score {}", self.score)?;
        for total in &self.totals {
            writeln!(
                f,
                "  {}: {} over {} match(es)",
                total.constraint_ref,
                total.score,
                total.match_count()
            )?;
        }
        Ok(())
    }
}

/// The matches one fact takes part in.
#[derive(Debug, Clone)]
pub struct Indictment<Sc: Score> {
    pub fact: EntityRef,
    /// Sum of the scores of `matches`.
    pub score: Sc,
    pub matches: Vec<ConstraintMatch<Sc>>,
}

impl<Sc: Score> Indictment<Sc> {
    fn new(fact: EntityRef) -> Self {
        Self {
            fact,
            score: Sc::zero(),
            matches: Vec::new(),
        }
    }

    fn push(&mut self, constraint_match: ConstraintMatch<Sc>) {
        self.score = self.score + constraint_match.score;
        self.matches.push(constraint_match);
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    /// Distinct constraints among the matches.
    pub fn constraint_refs(&self) -> BTreeSet<&ConstraintRef> {
        self.matches.iter().map(|m| &m.constraint_ref).collect()
    }
}

/// Per-fact breakdown of the score.
#[derive(Debug, Clone)]
pub struct IndictmentMap<Sc: Score> {
    indictments: HashMap<EntityRef, Indictment<Sc>>,
}

impl<Sc: Score> IndictmentMap<Sc> {
    /// Indicts every distinct fact of every match; a fact filling two
    /// slots of one tuple is indicted for that match once.
    pub fn from_matches(matches: impl IntoIterator<Item = ConstraintMatch<Sc>>) -> Self {
        let mut indictments: HashMap<EntityRef, Indictment<Sc>> = HashMap::new();
        for m in matches {
            for fact in m.justification.distinct_facts() {
                indictments
                    .entry(fact.clone())
                    .or_insert_with(|| Indictment::new(fact.clone()))
                    .push(m.clone());
            }
        }
        Self { indictments }
    }

    pub fn get(&self, fact: &EntityRef) -> Option<&Indictment<Sc>> {
        self.indictments.get(fact)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Indictment<Sc>> {
        self.indictments.values()
    }

    /// Indictments from the lowest score up; ties ordered by fact label.
    pub fn worst(&self) -> Vec<&Indictment<Sc>> {
        let mut sorted: Vec<&Indictment<Sc>> = self.indictments.values().collect();
        sorted.sort_by(|a, b| {
            a.score
                .cmp(&b.score)
                .then_with(|| a.fact.label.cmp(&b.fact.label))
        });
        sorted
    }

    pub fn len(&self) -> usize {
        self.indictments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indictments.is_empty()
    }
}

impl<Sc: Score> Default for IndictmentMap<Sc> {
    fn default() -> Self {
        Self {
            indictments: HashMap::new(),
        }
    }
}
