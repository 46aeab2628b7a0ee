//! Declaration engine: turns [`Declaration`] specs into wired-up fortnums.
//!
//! Declaration is not transactional. A failure part-way leaves the nodes
//! registered so far in place; callers reset the whole registry instead.

use tracing::{debug, instrument};

use crate::domain::arena::FortnumId;
use crate::domain::declaration::{Declaration, ItemClass, Member};
use crate::domain::error::{FortnumError, FortnumResult};
use crate::domain::registry::Registry;
use crate::domain::relation::{self, Relation};
use crate::domain::value::{Slot, Value};

/// Result type for declaration operations.
pub type BuildResult<T> = FortnumResult<T>;

/// Builds declarations into a registry.
pub struct FortnumBuilder<'r> {
    registry: &'r mut Registry,
}

impl<'r> FortnumBuilder<'r> {
    pub fn new(registry: &'r mut Registry) -> Self {
        Self { registry }
    }

    /// Registers `decl` (binding a forward reference of the same name if one
    /// exists), applies inheritance from its kind and processes its fields in
    /// declaration order.
    #[instrument(level = "debug", skip(self, decl), fields(name = %decl.name))]
    pub fn build(&mut self, decl: Declaration) -> BuildResult<FortnumId> {
        let Declaration {
            name,
            base,
            is_abstract,
            item_class,
            related_name,
            fields,
        } = decl;

        let id = self.registry.register(&name)?;
        self.apply_kind(id, base)?;
        {
            let node = self.registry.arena_mut().get_mut(id)?;
            node.is_abstract = is_abstract;
            if let Some(item_class) = item_class {
                node.item_class = item_class;
            }
            if related_name.is_some() {
                node.related_name = related_name;
            }
        }

        for (field, member) in fields {
            self.declare_field(id, &field, member)?;
        }
        debug!(name, "fortnum declared");
        Ok(id)
    }

    /// Inherits item_class, related_name and non-node slots from `base`.
    /// `abstract` is not inherited. Back-collections filled while the node was
    /// still a forward reference are kept.
    fn apply_kind(&mut self, id: FortnumId, base: Option<FortnumId>) -> BuildResult<()> {
        let Some(base) = base else {
            return Ok(());
        };
        let arena = self.registry.arena();
        if arena.is_kind_of(base, id)? {
            return Err(FortnumError::CycleDetected(arena.name_of(id)));
        }
        let base_node = arena.get(base)?;
        let item_class = base_node.item_class;
        let related_name = base_node.related_name.clone();
        let inherited: Vec<(String, Slot)> = base_node
            .slots
            .iter()
            .filter_map(|(field, slot)| slot.inherited().map(|s| (field.clone(), s)))
            .collect();

        let node = self.registry.arena_mut().get_mut(id)?;
        node.kind = Some(base);
        node.item_class = item_class;
        node.related_name = related_name;
        for (field, slot) in inherited {
            node.merge_slot(&field, slot)?;
        }
        Ok(())
    }

    fn declare_field(&mut self, id: FortnumId, field: &str, member: Member) -> BuildResult<()> {
        match member {
            Member::Value(Value::Fortnum(target)) | Member::Fortnum(target) => {
                self.place(id, field, target)
            }
            Member::Value(value) => self.set_slot(id, field, Slot::Value(value)),
            Member::Named(name) => {
                let target = self.registry.resolve_or_create(&name)?;
                self.place(id, field, target)
            }
            Member::Nested(decl) => {
                let child = self.build(decl)?;
                self.place(id, field, child)
            }
            Member::Borrowed(target) => self.borrow(id, field, target),
            Member::Relation(rel) => self.relate(id, field, rel),
            Member::Computed(computed) => self.set_slot(id, field, Slot::Computed(computed)),
            Member::Related => self.set_slot(id, field, Slot::Related(Vec::new())),
        }
    }

    /// Decides what a node-valued field means for the declaring scope:
    /// a relation (template field or scope-wide related_name), a member, or a
    /// plain reference when item_class excludes it.
    fn place(&mut self, id: FortnumId, field: &str, target: FortnumId) -> BuildResult<()> {
        let arena = self.registry.arena();
        let node = arena.get(id)?;

        if let Some(Slot::Relation {
            related_name,
            single,
            ..
        }) = node.slots.get(field)
        {
            let (related_name, single) = (related_name.clone(), *single);
            return relation::link(
                self.registry.arena_mut(),
                id,
                field,
                &related_name,
                &[target],
                single,
            );
        }
        if let Some(related_name) = node.related_name.clone() {
            return relation::link(
                self.registry.arena_mut(),
                id,
                field,
                &related_name,
                &[target],
                true,
            );
        }

        let is_member = match node.item_class {
            ItemClass::Any => true,
            ItemClass::Nothing => false,
            ItemClass::Kind(kind) => arena.is_kind_of(target, kind)?,
        };
        if is_member {
            self.adopt(id, field, target)
        } else {
            self.set_slot(id, field, Slot::Value(Value::Fortnum(target)))
        }
    }

    /// Attaches `child` as an owned member of `id`, setting its parent once.
    #[instrument(level = "debug", skip(self))]
    fn adopt(&mut self, id: FortnumId, field: &str, child: FortnumId) -> BuildResult<()> {
        let arena = self.registry.arena();
        if arena.reaches(child, id) {
            return Err(FortnumError::CycleDetected(arena.name_of(child)));
        }
        let parent = arena.get(child)?.parent;
        match parent {
            None => {
                self.registry.arena_mut().get_mut(child)?.parent = Some(id);
            }
            Some(parent) if parent == id => {}
            Some(parent) => {
                return Err(FortnumError::MultipleParents {
                    name: arena.name_of(child),
                    parent: arena.name_of(parent),
                    other: arena.name_of(id),
                });
            }
        }
        self.add_member(id, field, child)
    }

    /// Lists `target` among the members of `id` without touching its parent.
    #[instrument(level = "debug", skip(self))]
    fn borrow(&mut self, id: FortnumId, field: &str, target: FortnumId) -> BuildResult<()> {
        let arena = self.registry.arena_mut();
        if arena.reaches(target, id) {
            return Err(FortnumError::CycleDetected(arena.name_of(target)));
        }
        let node = arena.get_mut(target)?;
        if node.parent != Some(id) && !node.borrowers.contains(&id) {
            node.borrowers.push(id);
        }
        self.add_member(id, field, target)
    }

    fn add_member(&mut self, id: FortnumId, field: &str, member: FortnumId) -> BuildResult<()> {
        let node = self.registry.arena_mut().get_mut(id)?;
        if !node.members.contains(&member) {
            node.members.push(member);
        }
        node.merge_slot(field, Slot::Value(Value::Fortnum(member)))
    }

    #[instrument(level = "debug", skip(self, rel))]
    fn relate(&mut self, id: FortnumId, field: &str, rel: Relation) -> BuildResult<()> {
        let Relation {
            targets,
            related_name,
            single,
        } = rel;

        let node = self.registry.arena().get(id)?;
        let template_name = match node.slots.get(field) {
            Some(Slot::Relation { related_name, .. }) => Some(related_name.clone()),
            _ => None,
        };
        let related_name = related_name
            .or(template_name)
            .or_else(|| node.related_name.clone())
            .ok_or_else(|| FortnumError::MissingRelatedName {
                field: field.to_string(),
            })?;

        if targets.is_empty() {
            return self.set_slot(
                id,
                field,
                Slot::Relation {
                    related_name,
                    targets: Vec::new(),
                    single,
                },
            );
        }

        let targets = targets
            .iter()
            .map(|target| self.registry.resolve(target))
            .collect::<FortnumResult<Vec<_>>>()?;
        relation::link(
            self.registry.arena_mut(),
            id,
            field,
            &related_name,
            &targets,
            single,
        )
    }

    fn set_slot(&mut self, id: FortnumId, field: &str, slot: Slot) -> BuildResult<()> {
        self.registry.arena_mut().get_mut(id)?.merge_slot(field, slot)
    }
}
