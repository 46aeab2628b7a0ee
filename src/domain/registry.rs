//! Identity registry: the uniqueness authority mapping names to fortnums.

use std::cmp::Ordering;
use std::collections::HashMap;

use regex::Regex;
use tracing::{debug, instrument, trace};

use crate::domain::arena::{FortnumArena, FortnumId, FortnumNode, NodeState};
use crate::domain::builder::FortnumBuilder;
use crate::domain::declaration::{Declaration, FortnumRef};
use crate::domain::error::{FortnumError, FortnumResult};
use crate::domain::node::Fortnum;
use crate::domain::ordering;

/// Owns every fortnum and the name index over them.
///
/// Lifecycle is explicit: create one, declare into it, read from it, and
/// [`clear`](Registry::clear) it wholesale when an isolated run needs a fresh
/// namespace. Nodes are never removed individually.
#[derive(Debug, Default)]
pub struct Registry {
    arena: FortnumArena,
    index: HashMap<String, FortnumId>,
    order: Vec<FortnumId>,
    name_pattern: Option<Regex>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: FortnumArena::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            order: Vec::with_capacity(capacity),
            name_pattern: None,
        }
    }

    /// Every name registered from now on must match `pattern`.
    pub fn with_name_pattern(mut self, pattern: Regex) -> Self {
        self.name_pattern = Some(pattern);
        self
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.order
            .iter()
            .filter_map(|&id| self.arena.get(id).ok())
            .map(|node| node.name.as_str())
    }

    /// Wholesale reset. Handles obtained before the reset stop resolving.
    #[instrument(level = "debug", skip(self))]
    pub fn clear(&mut self) {
        debug!(count = self.index.len(), "clearing registry");
        self.arena.clear();
        self.index.clear();
        self.order.clear();
    }

    #[instrument(level = "trace", skip(self))]
    pub fn lookup(&self, name: &str) -> Option<FortnumId> {
        self.index.get(name).copied()
    }

    /// Existing fortnum named `name`, or a new unparented forward reference.
    ///
    /// A later declaration with the same name binds to the returned node.
    #[instrument(level = "debug", skip(self))]
    pub fn resolve_or_create(&mut self, name: &str) -> FortnumResult<FortnumId> {
        if let Some(id) = self.lookup(name) {
            trace!(name, "fetched existing fortnum");
            return Ok(id);
        }
        self.validate_name(name)?;
        let id = self.arena.insert(FortnumNode::forward(name));
        self.index.insert(name.to_string(), id);
        self.order.push(id);
        debug!(name, "forward fortnum created");
        Ok(id)
    }

    /// Shorthand for [`resolve_or_create`](Registry::resolve_or_create): fetch by construction.
    pub fn fortnum(&mut self, name: &str) -> FortnumResult<FortnumId> {
        self.resolve_or_create(name)
    }

    pub fn resolve(&mut self, reference: &FortnumRef) -> FortnumResult<FortnumId> {
        match reference {
            FortnumRef::Id(id) => {
                self.arena.get(*id)?;
                Ok(*id)
            }
            FortnumRef::Name(name) => self.resolve_or_create(name),
        }
    }

    /// Binds `name` to a declared node.
    ///
    /// A forward reference under that name is bound in place and returned, so
    /// every holder of the forward handle observes the declared node. A name
    /// already bound by a declaration is a duplicate.
    #[instrument(level = "debug", skip(self))]
    pub fn register(&mut self, name: &str) -> FortnumResult<FortnumId> {
        if let Some(id) = self.lookup(name) {
            let node = self.arena.get_mut(id)?;
            return match node.state {
                NodeState::Forward => {
                    node.state = NodeState::Declared;
                    debug!(name, "forward fortnum bound");
                    Ok(id)
                }
                NodeState::Declared => Err(FortnumError::DuplicatedFortnum {
                    name: name.to_string(),
                }),
            };
        }
        let id = self.resolve_or_create(name)?;
        self.arena.get_mut(id)?.state = NodeState::Declared;
        Ok(id)
    }

    /// Runs the declaration engine over `decl`.
    pub fn declare(&mut self, decl: Declaration) -> FortnumResult<FortnumId> {
        FortnumBuilder::new(self).build(decl)
    }

    /// Read-only view over a node.
    pub fn get(&self, id: FortnumId) -> FortnumResult<Fortnum<'_>> {
        let node = self.arena.get(id)?;
        Ok(Fortnum::new(self, id, node))
    }

    pub fn try_cmp(&self, a: FortnumId, b: FortnumId) -> FortnumResult<Ordering> {
        ordering::try_cmp(&self.arena, a, b)
    }

    /// Sorts by tree order; fails with `Incomparable` on the first pair
    /// without a common container or ancestor.
    pub fn sorted<I>(&self, ids: I) -> FortnumResult<Vec<FortnumId>>
    where
        I: IntoIterator<Item = FortnumId>,
    {
        ordering::sorted(&self.arena, ids)
    }

    pub fn max<I>(&self, ids: I) -> FortnumResult<Option<FortnumId>>
    where
        I: IntoIterator<Item = FortnumId>,
    {
        ordering::max(&self.arena, ids)
    }

    pub fn min<I>(&self, ids: I) -> FortnumResult<Option<FortnumId>>
    where
        I: IntoIterator<Item = FortnumId>,
    {
        ordering::min(&self.arena, ids)
    }

    /// View of the node registered as `name`, or `NotFound`.
    #[instrument(level = "trace", skip(self))]
    pub fn deserialize(&self, name: &str) -> FortnumResult<Fortnum<'_>> {
        let id = self
            .lookup(name)
            .ok_or_else(|| FortnumError::NotFound(name.to_string()))?;
        self.get(id)
    }

    pub fn arena(&self) -> &FortnumArena {
        &self.arena
    }

    pub(crate) fn arena_mut(&mut self) -> &mut FortnumArena {
        &mut self.arena
    }

    fn validate_name(&self, name: &str) -> FortnumResult<()> {
        let pattern = self.name_pattern.as_ref().map(Regex::as_str).unwrap_or("non-empty");
        let valid = !name.is_empty()
            && self
                .name_pattern
                .as_ref()
                .map_or(true, |re| re.is_match(name));
        if valid {
            Ok(())
        } else {
            Err(FortnumError::InvalidName {
                name: name.to_string(),
                pattern: pattern.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn registry() -> Registry {
        Registry::new()
    }

    #[rstest]
    fn given_unknown_name_when_resolving_then_creates_forward(mut registry: Registry) {
        let id = registry.resolve_or_create("X").unwrap();

        assert_eq!(registry.lookup("X"), Some(id));
        assert_eq!(registry.arena().get(id).unwrap().state, NodeState::Forward);
        assert_eq!(registry.resolve_or_create("X").unwrap(), id);
    }

    #[rstest]
    fn given_forward_when_registering_then_binds_same_node(mut registry: Registry) {
        let forward = registry.fortnum("X").unwrap();

        let declared = registry.register("X").unwrap();

        assert_eq!(forward, declared);
        assert_eq!(registry.len(), 1);
    }

    #[rstest]
    fn given_declared_when_registering_again_then_duplicated(mut registry: Registry) {
        registry.register("X").unwrap();

        let result = registry.register("X");

        assert_eq!(
            result,
            Err(FortnumError::DuplicatedFortnum { name: "X".into() })
        );
    }

    #[rstest]
    fn given_registry_when_cleared_then_names_free_again(mut registry: Registry) {
        let old = registry.register("X").unwrap();

        registry.clear();
        let new = registry.register("X").unwrap();

        assert_ne!(old, new);
        assert!(registry.get(old).is_err());
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["X"]);
    }

    #[rstest]
    #[case("", false)]
    #[case("Fruits", true)]
    #[case("not valid", false)]
    fn given_name_pattern_when_registering_then_validates(#[case] name: &str, #[case] ok: bool) {
        let mut registry =
            Registry::new().with_name_pattern(Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

        assert_eq!(registry.register(name).is_ok(), ok);
    }

    #[rstest]
    fn given_unregistered_name_when_deserializing_then_not_found(registry: Registry) {
        assert_eq!(
            registry.deserialize("Nope").map(|f| f.id()),
            Err(FortnumError::NotFound("Nope".into()))
        );
    }
}
