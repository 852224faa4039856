//! Variable descriptors.
//!
//! Variable kinds form a closed set. Each kind carries the accessor
//! functions for its field, so every read and write is a direct function
//! call resolved when the descriptor is declared.

use std::fmt;

use crate::domain::handle::ValueRef;

/// Getter/setter pair for a basic or chained variable.
pub struct BasicAccessor<S> {
    pub get: fn(&S, usize) -> Option<ValueRef>,
    pub set: fn(&mut S, usize, Option<ValueRef>),
    /// Whether the search may leave the variable unassigned.
    pub allows_unassigned: bool,
}

/// Accessors for a list variable holding element entity indices.
pub struct ListAccessor<S> {
    /// Type name of the element entity class.
    pub element_type: &'static str,
    pub get: fn(&S, usize) -> &[usize],
    pub get_mut: fn(&mut S, usize) -> &mut Vec<usize>,
}

/// Accessors for a shadow slot holding one entity index (or a list index).
pub struct SlotAccessor<S> {
    pub get: fn(&S, usize) -> Option<usize>,
    pub set: fn(&mut S, usize, Option<usize>),
}

/// Accessors for a collection-valued shadow slot.
///
/// The slot itself is optional so that a missing collection can be detected
/// as corruption instead of being silently created.
pub struct CollectionAccessor<S> {
    pub get: fn(&S, usize) -> Option<&[usize]>,
    pub slot: fn(&mut S, usize) -> &mut Option<Vec<usize>>,
}

impl<S> Clone for BasicAccessor<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for BasicAccessor<S> {}

impl<S> Clone for ListAccessor<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for ListAccessor<S> {}

impl<S> Clone for SlotAccessor<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for SlotAccessor<S> {}

impl<S> Clone for CollectionAccessor<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for CollectionAccessor<S> {}

/// Names a source variable by entity type name and variable name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceRef {
    pub entity: &'static str,
    pub variable: &'static str,
}

impl SourceRef {
    pub const fn new(entity: &'static str, variable: &'static str) -> Self {
        Self { entity, variable }
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.entity, self.variable)
    }
}

/// The derived relationship a shadow variable maintains.
pub enum ShadowKind<S> {
    /// The one entity whose chained variable points at this holder.
    SingletonInverse(SlotAccessor<S>),
    /// Index of the anchor at the head of this entity's chain.
    Anchor(SlotAccessor<S>),
    /// All entities whose basic variable points at this holder.
    CollectionInverse(CollectionAccessor<S>),
    /// The entity whose list variable currently contains this element.
    ListInverse(SlotAccessor<S>),
    /// The position of this element inside its owner's list.
    ListIndex(SlotAccessor<S>),
    /// User-defined recomputation of one entity's shadow state.
    Custom { update: fn(&mut S, usize) },
}

impl<S> ShadowKind<S> {
    /// Short label used in error messages and logs.
    pub fn label(&self) -> &'static str {
        match self {
            ShadowKind::SingletonInverse(_) => "singleton inverse",
            ShadowKind::Anchor(_) => "anchor",
            ShadowKind::CollectionInverse(_) => "collection inverse",
            ShadowKind::ListInverse(_) => "list inverse",
            ShadowKind::ListIndex(_) => "list index",
            ShadowKind::Custom { .. } => "custom",
        }
    }
}

/// Shadow variable metadata: its kind and the ordered source variables.
pub struct ShadowDescriptor<S> {
    pub sources: Vec<SourceRef>,
    pub kind: ShadowKind<S>,
}

/// Closed set of variable kinds.
pub enum VariableKind<S> {
    Basic(BasicAccessor<S>),
    Chained(BasicAccessor<S>),
    List(ListAccessor<S>),
    Shadow(ShadowDescriptor<S>),
}

impl<S> VariableKind<S> {
    pub fn label(&self) -> &'static str {
        match self {
            VariableKind::Basic(_) => "basic",
            VariableKind::Chained(_) => "chained",
            VariableKind::List(_) => "list",
            VariableKind::Shadow(shadow) => shadow.kind.label(),
        }
    }
}

/// Describes a planning variable at runtime.
pub struct VariableDescriptor<S> {
    /// Name of the variable (field name).
    pub name: &'static str,
    pub kind: VariableKind<S>,
}

impl<S> VariableDescriptor<S> {
    /// Creates a basic genuine variable that must be assigned.
    pub fn basic(
        name: &'static str,
        get: fn(&S, usize) -> Option<ValueRef>,
        set: fn(&mut S, usize, Option<ValueRef>),
    ) -> Self {
        Self {
            name,
            kind: VariableKind::Basic(BasicAccessor {
                get,
                set,
                allows_unassigned: false,
            }),
        }
    }

    /// Creates a chained genuine variable.
    ///
    /// Chained variables point either at an anchor or at another entity of
    /// the same chain, e.g. `Vehicle <- Customer1 <- Customer2`.
    pub fn chained(
        name: &'static str,
        get: fn(&S, usize) -> Option<ValueRef>,
        set: fn(&mut S, usize, Option<ValueRef>),
    ) -> Self {
        Self {
            name,
            kind: VariableKind::Chained(BasicAccessor {
                get,
                set,
                allows_unassigned: false,
            }),
        }
    }

    /// Creates a list genuine variable whose elements are entities of
    /// `element_type`.
    pub fn list(
        name: &'static str,
        element_type: &'static str,
        get: fn(&S, usize) -> &[usize],
        get_mut: fn(&mut S, usize) -> &mut Vec<usize>,
    ) -> Self {
        Self {
            name,
            kind: VariableKind::List(ListAccessor {
                element_type,
                get,
                get_mut,
            }),
        }
    }

    /// Marks a basic or chained variable as allowed to stay unassigned.
    pub fn allowing_unassigned(mut self) -> Self {
        if let VariableKind::Basic(access) | VariableKind::Chained(access) = &mut self.kind {
            access.allows_unassigned = true;
        }
        self
    }

    pub fn singleton_inverse(
        name: &'static str,
        source: SourceRef,
        get: fn(&S, usize) -> Option<usize>,
        set: fn(&mut S, usize, Option<usize>),
    ) -> Self {
        Self::shadow(name, vec![source], ShadowKind::SingletonInverse(SlotAccessor { get, set }))
    }

    /// Creates an anchor shadow on the class of a chained `source`.
    ///
    /// The slot holds the entity index of the first value up the chain
    /// that is not an entity of the chained class.
    pub fn anchor(
        name: &'static str,
        source: SourceRef,
        get: fn(&S, usize) -> Option<usize>,
        set: fn(&mut S, usize, Option<usize>),
    ) -> Self {
        Self::shadow(name, vec![source], ShadowKind::Anchor(SlotAccessor { get, set }))
    }

    pub fn collection_inverse(
        name: &'static str,
        source: SourceRef,
        get: fn(&S, usize) -> Option<&[usize]>,
        slot: fn(&mut S, usize) -> &mut Option<Vec<usize>>,
    ) -> Self {
        Self::shadow(
            name,
            vec![source],
            ShadowKind::CollectionInverse(CollectionAccessor { get, slot }),
        )
    }

    pub fn list_inverse(
        name: &'static str,
        source: SourceRef,
        get: fn(&S, usize) -> Option<usize>,
        set: fn(&mut S, usize, Option<usize>),
    ) -> Self {
        Self::shadow(name, vec![source], ShadowKind::ListInverse(SlotAccessor { get, set }))
    }

    pub fn list_index(
        name: &'static str,
        source: SourceRef,
        get: fn(&S, usize) -> Option<usize>,
        set: fn(&mut S, usize, Option<usize>),
    ) -> Self {
        Self::shadow(name, vec![source], ShadowKind::ListIndex(SlotAccessor { get, set }))
    }

    /// Creates a custom shadow recomputed by `update` whenever any source
    /// variable of the same entity changes.
    pub fn custom(name: &'static str, sources: Vec<SourceRef>, update: fn(&mut S, usize)) -> Self {
        Self::shadow(name, sources, ShadowKind::Custom { update })
    }

    fn shadow(name: &'static str, sources: Vec<SourceRef>, kind: ShadowKind<S>) -> Self {
        Self {
            name,
            kind: VariableKind::Shadow(ShadowDescriptor { sources, kind }),
        }
    }

    pub fn is_genuine(&self) -> bool {
        !self.is_shadow()
    }

    pub fn is_shadow(&self) -> bool {
        matches!(self.kind, VariableKind::Shadow(_))
    }

    pub fn is_chained(&self) -> bool {
        matches!(self.kind, VariableKind::Chained(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self.kind, VariableKind::List(_))
    }

    /// Returns the accessor of a basic or chained variable.
    pub fn basic_accessor(&self) -> Option<&BasicAccessor<S>> {
        match &self.kind {
            VariableKind::Basic(access) | VariableKind::Chained(access) => Some(access),
            _ => None,
        }
    }

    pub fn list_accessor(&self) -> Option<&ListAccessor<S>> {
        match &self.kind {
            VariableKind::List(access) => Some(access),
            _ => None,
        }
    }

    pub fn shadow_descriptor(&self) -> Option<&ShadowDescriptor<S>> {
        match &self.kind {
            VariableKind::Shadow(shadow) => Some(shadow),
            _ => None,
        }
    }

    /// Declared sources of a shadow variable; empty for genuine variables.
    pub fn source_refs(&self) -> &[SourceRef] {
        match &self.kind {
            VariableKind::Shadow(shadow) => &shadow.sources,
            _ => &[],
        }
    }
}

impl<S> fmt::Debug for VariableDescriptor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariableDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind.label())
            .field("sources", &self.source_refs())
            .finish()
    }
}
