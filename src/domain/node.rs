//! Read-only view over one declared fortnum.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use tracing::instrument;

use crate::domain::arena::{FortnumId, FortnumNode, NodeState};
use crate::domain::declaration::ItemClass;
use crate::domain::error::FortnumResult;
use crate::domain::ordering;
use crate::domain::registry::Registry;
use crate::domain::value::{Slot, Value};

/// A fortnum as seen through its registry.
///
/// Views are cheap to copy. Equality is identity: a view equals another view
/// of the same node, whether it was obtained by declaration, by name, or
/// through a forward reference bound later.
#[derive(Clone, Copy)]
pub struct Fortnum<'r> {
    registry: &'r Registry,
    id: FortnumId,
    node: &'r FortnumNode,
}

impl<'r> Fortnum<'r> {
    pub(crate) fn new(registry: &'r Registry, id: FortnumId, node: &'r FortnumNode) -> Self {
        Self { registry, id, node }
    }

    fn view(&self, id: FortnumId) -> Option<Fortnum<'r>> {
        self.registry.get(id).ok()
    }

    fn views<I>(&self, ids: I) -> Vec<Fortnum<'r>>
    where
        I: IntoIterator<Item = FortnumId>,
    {
        ids.into_iter().filter_map(|id| self.view(id)).collect()
    }

    pub fn id(&self) -> FortnumId {
        self.id
    }

    pub fn name(&self) -> &'r str {
        &self.node.name
    }

    /// Name-based encoding; [`Registry::deserialize`] is the inverse.
    pub fn serialize(&self) -> &'r str {
        self.name()
    }

    /// Alternate entry to [`Registry::deserialize`] from any node.
    pub fn deserialize(&self, name: &str) -> FortnumResult<Fortnum<'r>> {
        self.registry.deserialize(name)
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// False while the node only exists as a forward reference.
    pub fn is_declared(&self) -> bool {
        self.node.state == NodeState::Declared
    }

    pub fn is_abstract(&self) -> bool {
        self.node.is_abstract
    }

    pub fn item_class(&self) -> ItemClass {
        self.node.item_class
    }

    pub fn related_name(&self) -> Option<&'r str> {
        self.node.related_name.as_deref()
    }

    pub fn parent(&self) -> Option<Fortnum<'r>> {
        self.node.parent.and_then(|id| self.view(id))
    }

    /// The node this one extends.
    pub fn kind(&self) -> Option<Fortnum<'r>> {
        self.node.kind.and_then(|id| self.view(id))
    }

    pub fn is_kind_of(&self, kind: impl Into<FortnumId>) -> bool {
        self.registry
            .arena()
            .is_kind_of(self.id, kind.into())
            .unwrap_or(false)
    }

    /// Direct members in declaration order.
    pub fn members(&self) -> impl Iterator<Item = Fortnum<'r>> + 'r {
        let registry = self.registry;
        let node = self.node;
        node.members
            .iter()
            .filter_map(move |&id| registry.get(id).ok())
    }

    pub fn iter(&self) -> impl Iterator<Item = Fortnum<'r>> + 'r {
        self.members()
    }

    pub fn len(&self) -> usize {
        self.node.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node.members.is_empty()
    }

    /// Direct membership only.
    pub fn contains(&self, other: impl Into<FortnumId>) -> bool {
        self.node.members.contains(&other.into())
    }

    /// Membership at any depth below this node.
    pub fn contains_deep(&self, other: impl Into<FortnumId>) -> bool {
        let other = other.into();
        self.registry
            .arena()
            .descendants(self.id)
            .any(|id| id == other)
    }

    /// Breadth-first walk over every node below this one.
    pub fn descendants(&self) -> impl Iterator<Item = Fortnum<'r>> + 'r {
        let registry = self.registry;
        registry
            .arena()
            .descendants(self.id)
            .filter_map(move |id| registry.get(id).ok())
    }

    /// Structural ancestors, root first by default.
    ///
    /// With `include_self` the node closes the chain; `ascending` reverses it
    /// so the chain runs from the node (or its parent) up to the root.
    #[instrument(level = "trace", skip(self), fields(name = %self.name()))]
    pub fn ancestors(&self, include_self: bool, ascending: bool) -> Vec<Fortnum<'r>> {
        let mut chain = self.views(self.registry.arena().ancestors(self.id).unwrap_or_default());
        if include_self {
            chain.push(*self);
        }
        if ascending {
            chain.reverse();
        }
        chain
    }

    /// Top-most ancestor; a parentless node is its own root.
    pub fn root(&self) -> Fortnum<'r> {
        self.ancestors(false, false).first().copied().unwrap_or(*self)
    }

    /// Ancestors from the root down to this node, followed by its members.
    pub fn family(&self) -> Vec<Fortnum<'r>> {
        let mut family = self.ancestors(true, false);
        family.extend(self.members());
        family
    }

    pub fn has_attr(&self, field: &str) -> bool {
        self.node.slots.contains_key(field)
    }

    /// Declared field names, sorted.
    pub fn fields(&self) -> impl Iterator<Item = &'r str> + 'r {
        let node = self.node;
        node.slots.keys().map(String::as_str)
    }

    /// Value of a field. Computed fields are evaluated on every read.
    pub fn get(&self, field: &str) -> Option<Value> {
        match self.node.slots.get(field)? {
            Slot::Computed(computed) => Some(computed.eval(self)),
            slot => slot.stored_value(),
        }
    }

    /// The fortnum held by a field, if the field holds exactly one.
    pub fn member(&self, field: &str) -> Option<Fortnum<'r>> {
        self.get(field)?.as_fortnum().and_then(|id| self.view(id))
    }

    /// Fortnums that declared a relation towards this node under `related_name`,
    /// in declaration order. Empty when none did.
    pub fn related(&self, related_name: &str) -> Vec<Fortnum<'r>> {
        match self.node.slots.get(related_name) {
            Some(Slot::Related(ids)) => self.views(ids.iter().copied()),
            _ => Vec::new(),
        }
    }

    pub fn order_key(&self) -> FortnumResult<Vec<usize>> {
        ordering::order_key(self.registry.arena(), self.id)
    }

    /// Total order among nodes sharing a container or ancestor.
    pub fn try_cmp(&self, other: &Fortnum<'_>) -> FortnumResult<Ordering> {
        ordering::try_cmp(self.registry.arena(), self.id, other.id)
    }
}

impl PartialEq for Fortnum<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && std::ptr::eq(self.registry, other.registry)
    }
}

impl Eq for Fortnum<'_> {}

impl PartialEq<FortnumId> for Fortnum<'_> {
    fn eq(&self, other: &FortnumId) -> bool {
        self.id == *other
    }
}

impl Hash for Fortnum<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// `None` for incomparable nodes; use [`Fortnum::try_cmp`] to get the error.
impl PartialOrd for Fortnum<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.try_cmp(other).ok()
    }
}

impl From<Fortnum<'_>> for FortnumId {
    fn from(node: Fortnum<'_>) -> Self {
        node.id
    }
}

impl From<&Fortnum<'_>> for FortnumId {
    fn from(node: &Fortnum<'_>) -> Self {
        node.id
    }
}

impl<'r> IntoIterator for Fortnum<'r> {
    type Item = Fortnum<'r>;
    type IntoIter = Box<dyn Iterator<Item = Fortnum<'r>> + 'r>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.members())
    }
}

impl fmt::Display for Fortnum<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl fmt::Debug for Fortnum<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fortnum")
            .field("name", &self.node.name)
            .field("id", &self.id)
            .finish()
    }
}
