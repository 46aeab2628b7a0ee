use std::collections::{BTreeMap, HashSet, VecDeque};
use std::fmt;

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::declaration::ItemClass;
use crate::domain::error::{FortnumError, FortnumResult};
use crate::domain::value::Slot;

/// Stable handle of a fortnum inside its registry.
///
/// Equality is identity: two handles are equal only if they denote the same
/// node. Handles from a cleared registry never resolve again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FortnumId(Index);

impl fmt::Display for FortnumId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (slot, generation) = self.0.into_raw_parts();
        write!(f, "#{}.{}", slot, generation)
    }
}

/// Binding state of a registered name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// Created by reference before its declaration ran.
    Forward,
    /// Bound by a declaration; a second declaration of the name is a duplicate.
    Declared,
}

/// One declared singleton.
#[derive(Debug)]
pub struct FortnumNode {
    pub name: String,
    /// Creation order inside the arena, forward nodes included
    pub seq: u64,
    pub state: NodeState,
    /// Structural parent, set once by the first scope that adopts the node
    pub parent: Option<FortnumId>,
    /// Members in declaration order, owned and borrowed alike
    pub members: Vec<FortnumId>,
    /// Scopes that borrowed this node as a member without owning it
    pub borrowers: Vec<FortnumId>,
    /// The node this one was extended from
    pub kind: Option<FortnumId>,
    pub is_abstract: bool,
    pub item_class: ItemClass,
    pub related_name: Option<String>,
    pub slots: BTreeMap<String, Slot>,
}

impl FortnumNode {
    pub fn forward(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            seq: 0,
            state: NodeState::Forward,
            parent: None,
            members: Vec::new(),
            borrowers: Vec::new(),
            kind: None,
            is_abstract: false,
            item_class: ItemClass::Any,
            related_name: None,
            slots: BTreeMap::new(),
        }
    }

    /// Containers holding this node as a member: structural parent first,
    /// then borrowers in borrow order.
    pub fn containers(&self) -> impl Iterator<Item = FortnumId> + '_ {
        self.parent.iter().copied().chain(self.borrowers.iter().copied())
    }

    /// Writes `slot` under `field` without dropping relations gathered earlier.
    ///
    /// A filled back-collection survives any slot that would accept relations
    /// (null, empty list, empty collection). Any other value on a filled
    /// collection is `UnableToAddRelatedFortnum`.
    pub fn merge_slot(&mut self, field: &str, slot: Slot) -> FortnumResult<()> {
        if let Some(Slot::Related(existing)) = self.slots.get(field) {
            if !existing.is_empty() {
                if slot.accepts_related() {
                    if let Slot::Related(more) = slot {
                        let mut merged = existing.clone();
                        merged.extend(more);
                        self.slots.insert(field.to_string(), Slot::Related(merged));
                    }
                    return Ok(());
                }
                return Err(FortnumError::UnableToAddRelatedFortnum {
                    target: self.name.clone(),
                    related_name: field.to_string(),
                });
            }
        }
        self.slots.insert(field.to_string(), slot);
        Ok(())
    }
}

/// Arena storage for every node of a registry.
///
/// Uses generational arena for memory-safe node handles and O(1) lookups.
#[derive(Debug, Default)]
pub struct FortnumArena {
    arena: Arena<FortnumNode>,
    next_seq: u64,
}

impl FortnumArena {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            next_seq: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: Arena::with_capacity(capacity),
            next_seq: 0,
        }
    }

    #[instrument(level = "trace", skip(self, node), fields(name = %node.name))]
    pub fn insert(&mut self, mut node: FortnumNode) -> FortnumId {
        node.seq = self.next_seq;
        self.next_seq += 1;
        FortnumId(self.arena.insert(node))
    }

    pub fn get(&self, id: FortnumId) -> FortnumResult<&FortnumNode> {
        self.arena.get(id.0).ok_or(FortnumError::UnknownId)
    }

    pub fn get_mut(&mut self, id: FortnumId) -> FortnumResult<&mut FortnumNode> {
        self.arena.get_mut(id.0).ok_or(FortnumError::UnknownId)
    }

    pub fn contains(&self, id: FortnumId) -> bool {
        self.arena.contains(id.0)
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Removes every node. Removal bumps the arena generation, so stale
    /// handles stop resolving instead of aliasing new nodes.
    #[instrument(level = "debug", skip(self))]
    pub fn clear(&mut self) {
        let indices: Vec<Index> = self.arena.iter().map(|(idx, _)| idx).collect();
        for idx in indices {
            self.arena.remove(idx);
        }
    }

    /// Name of a node, or a placeholder for stale handles. Used for error messages.
    pub fn name_of(&self, id: FortnumId) -> String {
        self.get(id)
            .map(|n| n.name.clone())
            .unwrap_or_else(|_| id.to_string())
    }

    /// Chain of structural ancestors from the root down to `id` (excluded).
    #[instrument(level = "trace", skip(self))]
    pub fn ancestors(&self, id: FortnumId) -> FortnumResult<Vec<FortnumId>> {
        let mut chain = Vec::new();
        let mut current = self.get(id)?.parent;
        while let Some(parent) = current {
            chain.push(parent);
            current = self.get(parent)?.parent;
        }
        chain.reverse();
        Ok(chain)
    }

    /// Whether `id` extends `kind`, directly or transitively. A node is a kind of itself.
    pub fn is_kind_of(&self, id: FortnumId, kind: FortnumId) -> FortnumResult<bool> {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == kind {
                return Ok(true);
            }
            current = self.get(node)?.kind;
        }
        Ok(false)
    }

    /// Whether `candidate` is reachable from `from` through members (or is `from`).
    pub fn reaches(&self, from: FortnumId, candidate: FortnumId) -> bool {
        from == candidate || self.descendants(from).any(|id| id == candidate)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn descendants(&self, id: FortnumId) -> Descendants<'_> {
        Descendants::new(self, id)
    }
}

/// Breadth-first walk over the members below a node, excluding the node itself.
///
/// Each node is yielded once even when it is reachable through borrowed
/// membership on more than one path.
pub struct Descendants<'a> {
    arena: &'a FortnumArena,
    queue: VecDeque<FortnumId>,
    seen: HashSet<FortnumId>,
}

impl<'a> Descendants<'a> {
    fn new(arena: &'a FortnumArena, start: FortnumId) -> Self {
        let mut seen = HashSet::new();
        seen.insert(start);
        let mut walk = Self {
            arena,
            queue: VecDeque::new(),
            seen,
        };
        walk.enqueue_members(start);
        walk
    }

    fn enqueue_members(&mut self, id: FortnumId) {
        if let Ok(node) = self.arena.get(id) {
            for &member in &node.members {
                if self.seen.insert(member) {
                    self.queue.push_back(member);
                }
            }
        }
    }
}

impl Iterator for Descendants<'_> {
    type Item = FortnumId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.queue.pop_front()?;
        self.enqueue_members(current);
        Some(current)
    }
}
