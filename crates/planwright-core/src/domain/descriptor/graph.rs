//! Source-dependency graph of shadow variables.

use std::collections::HashMap;

use super::{EntityDescriptor, ShadowKind, SourceRef, VariableKind};
use crate::domain::handle::VariableId;
use crate::error::{PlanwrightError, Result};

/// Resolved shadow-variable dependencies.
///
/// Built once by [`SolutionDescriptor::build`](super::SolutionDescriptor::build);
/// holds every shadow's resolved sources, the reverse edges used to route
/// change notifications, and a topological order in which shadows can be
/// recomputed.
#[derive(Debug, Clone, Default)]
pub struct ShadowGraph {
    sources: HashMap<VariableId, Vec<VariableId>>,
    dependents: HashMap<VariableId, Vec<VariableId>>,
    order: Vec<VariableId>,
    rank: HashMap<VariableId, usize>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

impl ShadowGraph {
    pub(super) fn resolve<S>(entities: &[EntityDescriptor<S>]) -> Result<Self> {
        let mut sources: HashMap<VariableId, Vec<VariableId>> = HashMap::new();

        for (entity_idx, entity) in entities.iter().enumerate() {
            for (var_idx, variable) in entity.shadow_variables() {
                let id = VariableId::new(entity_idx, var_idx);
                let Some(shadow) = variable.shadow_descriptor() else {
                    continue;
                };
                let qualified = format!("{}.{}", entity.type_name, variable.name);

                if shadow.sources.is_empty() {
                    return Err(PlanwrightError::Config(format!(
                        "Shadow variable ({}) declares no source variables",
                        qualified
                    )));
                }

                let mut resolved = Vec::with_capacity(shadow.sources.len());
                for source in &shadow.sources {
                    resolved.push(resolve_source(entities, &qualified, source)?);
                }
                validate_kind(entities, entity_idx, &qualified, &shadow.kind, &resolved)?;
                sources.insert(id, resolved);
            }
        }

        let mut dependents: HashMap<VariableId, Vec<VariableId>> = HashMap::new();
        let mut shadow_ids: Vec<VariableId> = sources.keys().copied().collect();
        shadow_ids.sort();

        let mut marks: HashMap<VariableId, Mark> = HashMap::new();
        let mut order = Vec::with_capacity(shadow_ids.len());
        for id in &shadow_ids {
            visit(*id, entities, &sources, &mut marks, &mut order)?;
        }

        let rank: HashMap<VariableId, usize> =
            order.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        for shadow in &order {
            for source in &sources[shadow] {
                dependents.entry(*source).or_default().push(*shadow);
            }
        }

        Ok(Self {
            sources,
            dependents,
            order,
            rank,
        })
    }

    /// Resolved sources of a shadow variable; empty for genuine variables.
    pub fn sources_of(&self, shadow: VariableId) -> &[VariableId] {
        self.sources.get(&shadow).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Shadows sourced directly on `source`, in topological order.
    pub fn dependents_of(&self, source: VariableId) -> &[VariableId] {
        self.dependents.get(&source).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All shadow variables, sources before dependents.
    pub fn topological_order(&self) -> &[VariableId] {
        &self.order
    }

    /// Position of a shadow in the topological order.
    pub fn rank_of(&self, shadow: VariableId) -> Option<usize> {
        self.rank.get(&shadow).copied()
    }

    pub fn shadow_count(&self) -> usize {
        self.order.len()
    }
}

fn resolve_source<S>(
    entities: &[EntityDescriptor<S>],
    qualified: &str,
    source: &SourceRef,
) -> Result<VariableId> {
    let entity_idx = entities
        .iter()
        .position(|e| e.type_name == source.entity)
        .ok_or_else(|| {
            PlanwrightError::Config(format!(
                "Shadow variable ({}) has a source entity class ({}) that is not registered",
                qualified, source.entity
            ))
        })?;
    let var_idx = entities[entity_idx]
        .find_variable_index(source.variable)
        .ok_or_else(|| {
            PlanwrightError::Config(format!(
                "Shadow variable ({}) has a source variable ({}) that does not exist",
                qualified, source
            ))
        })?;
    Ok(VariableId::new(entity_idx, var_idx))
}

fn validate_kind<S>(
    entities: &[EntityDescriptor<S>],
    holder: usize,
    qualified: &str,
    kind: &ShadowKind<S>,
    sources: &[VariableId],
) -> Result<()> {
    let source_kind = |id: VariableId| &entities[id.entity].variables()[id.variable].kind;
    let source_name = |id: VariableId| {
        format!(
            "{}.{}",
            entities[id.entity].type_name,
            entities[id.entity].variables()[id.variable].name
        )
    };
    let single = || -> Result<VariableId> {
        match sources {
            [one] => Ok(*one),
            _ => Err(PlanwrightError::Config(format!(
                "Shadow variable ({}) of kind {} requires exactly one source variable, got {}",
                qualified,
                kind.label(),
                sources.len()
            ))),
        }
    };

    match kind {
        ShadowKind::SingletonInverse(_) => {
            let source = single()?;
            if !matches!(source_kind(source), VariableKind::Chained(_)) {
                return Err(PlanwrightError::Config(format!(
                    "Shadow variable ({}) is a singleton inverse, which requires a chained source \
                     variable, but ({}) is {}; use a collection inverse instead",
                    qualified,
                    source_name(source),
                    source_kind(source).label()
                )));
            }
        }
        ShadowKind::Anchor(_) => {
            let source = single()?;
            if !matches!(source_kind(source), VariableKind::Chained(_)) {
                return Err(PlanwrightError::Config(format!(
                    "Shadow variable ({}) is an anchor shadow, which requires a chained source \
                     variable, but ({}) is {}",
                    qualified,
                    source_name(source),
                    source_kind(source).label()
                )));
            }
            if source.entity != holder {
                return Err(PlanwrightError::Config(format!(
                    "Anchor shadow variable ({}) must be declared on the class of its chained \
                     source variable ({})",
                    qualified,
                    source_name(source)
                )));
            }
        }
        ShadowKind::CollectionInverse(_) => {
            let source = single()?;
            if !matches!(source_kind(source), VariableKind::Basic(_)) {
                return Err(PlanwrightError::Config(format!(
                    "Shadow variable ({}) is a collection inverse, which requires a non-chained \
                     basic source variable, but ({}) is {}",
                    qualified,
                    source_name(source),
                    source_kind(source).label()
                )));
            }
        }
        ShadowKind::ListInverse(_) | ShadowKind::ListIndex(_) => {
            let source = single()?;
            let VariableKind::List(list) = source_kind(source) else {
                return Err(PlanwrightError::Config(format!(
                    "Shadow variable ({}) is a {} shadow, which requires a list source variable, \
                     but ({}) is {}",
                    qualified,
                    kind.label(),
                    source_name(source),
                    source_kind(source).label()
                )));
            };
            if list.element_type != entities[holder].type_name {
                return Err(PlanwrightError::Config(format!(
                    "Shadow variable ({}) must be declared on the element class ({}) of its list \
                     source variable ({})",
                    qualified,
                    list.element_type,
                    source_name(source)
                )));
            }
        }
        ShadowKind::Custom { .. } => {
            if let Some(foreign) = sources.iter().find(|s| s.entity != holder) {
                return Err(PlanwrightError::Config(format!(
                    "Custom shadow variable ({}) can only source variables of its own class, \
                     but ({}) belongs to another class",
                    qualified,
                    source_name(*foreign)
                )));
            }
        }
    }
    Ok(())
}

fn visit<S>(
    id: VariableId,
    entities: &[EntityDescriptor<S>],
    sources: &HashMap<VariableId, Vec<VariableId>>,
    marks: &mut HashMap<VariableId, Mark>,
    order: &mut Vec<VariableId>,
) -> Result<()> {
    match marks.get(&id) {
        Some(Mark::Done) => return Ok(()),
        Some(Mark::Visiting) => {
            let entity = &entities[id.entity];
            return Err(PlanwrightError::Config(format!(
                "Shadow variable ({}.{}) is part of a source-dependency cycle",
                entity.type_name,
                entity.variables()[id.variable].name
            )));
        }
        None => {}
    }
    marks.insert(id, Mark::Visiting);
    if let Some(deps) = sources.get(&id) {
        for dep in deps {
            if sources.contains_key(dep) {
                visit(*dep, entities, sources, marks, order)?;
            }
        }
    }
    marks.insert(id, Mark::Done);
    order.push(id);
    Ok(())
}
