//! Typed, named, bidirectional links between fortnums of independent trees.
//!
//! The declaring side stores its targets in a [`Slot::Relation`]; every target
//! accumulates the declaring node in a [`Slot::Related`] back-collection named
//! by `related_name`.

use tracing::{debug, instrument};

use crate::domain::arena::{FortnumArena, FortnumId};
use crate::domain::declaration::FortnumRef;
use crate::domain::error::{FortnumError, FortnumResult};
use crate::domain::value::Slot;

/// Relation declared on a field.
///
/// Without targets it is a template: extensions assigning a fortnum to the
/// same field establish the relation under the template's `related_name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub targets: Vec<FortnumRef>,
    pub related_name: Option<String>,
    pub single: bool,
}

impl Relation {
    /// Template relation, bound later by extensions.
    pub fn named(related_name: impl Into<String>) -> Self {
        Self {
            targets: Vec::new(),
            related_name: Some(related_name.into()),
            single: true,
        }
    }

    /// Relation towards one target ("set once").
    pub fn to(target: impl Into<FortnumRef>) -> Self {
        Self {
            targets: vec![target.into()],
            related_name: None,
            single: true,
        }
    }

    pub fn to_many<I, T>(targets: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<FortnumRef>,
    {
        Self {
            targets: targets.into_iter().map(Into::into).collect(),
            related_name: None,
            single: false,
        }
    }

    pub fn related_name(mut self, related_name: impl Into<String>) -> Self {
        self.related_name = Some(related_name.into());
        self
    }

    pub fn is_template(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Wires `source.field` to `targets` and appends `source` to each target's
/// `related_name` collection, in declaration order.
#[instrument(level = "debug", skip(arena, targets))]
pub(crate) fn link(
    arena: &mut FortnumArena,
    source: FortnumId,
    field: &str,
    related_name: &str,
    targets: &[FortnumId],
    single: bool,
) -> FortnumResult<()> {
    for &target in targets {
        add_related(arena, target, related_name, source)?;
    }
    arena.get_mut(source)?.merge_slot(
        field,
        Slot::Relation {
            related_name: related_name.to_string(),
            targets: targets.to_vec(),
            single,
        },
    )
}

fn add_related(
    arena: &mut FortnumArena,
    target: FortnumId,
    related_name: &str,
    source: FortnumId,
) -> FortnumResult<()> {
    let target_name = arena.name_of(target);
    let node = arena.get_mut(target)?;
    match node.slots.get_mut(related_name) {
        Some(Slot::Related(collection)) => collection.push(source),
        Some(slot) if slot.accepts_related() => *slot = Slot::Related(vec![source]),
        Some(_) => {
            return Err(FortnumError::UnableToAddRelatedFortnum {
                target: target_name,
                related_name: related_name.to_string(),
            })
        }
        None => {
            node.slots
                .insert(related_name.to_string(), Slot::Related(vec![source]));
        }
    }
    debug!(target = %target_name, related_name, "related fortnum added");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::arena::FortnumNode;
    use crate::domain::value::Value;

    #[test]
    fn given_unset_slot_when_linking_then_collection_created() {
        let mut arena = FortnumArena::new();
        let target = arena.insert(FortnumNode::forward("T"));
        let a = arena.insert(FortnumNode::forward("A"));
        let b = arena.insert(FortnumNode::forward("B"));

        link(&mut arena, a, "rel", "r", &[target], true).unwrap();
        link(&mut arena, b, "rel", "r", &[target], true).unwrap();

        match arena.get(target).unwrap().slots.get("r") {
            Some(Slot::Related(ids)) => assert_eq!(ids, &vec![a, b]),
            other => panic!("unexpected slot: {:?}", other),
        }
    }

    #[test]
    fn given_occupied_slot_when_linking_then_unable_to_add() {
        let mut arena = FortnumArena::new();
        let target = arena.insert(FortnumNode::forward("T"));
        arena
            .get_mut(target)
            .unwrap()
            .slots
            .insert("r".into(), Slot::Value(Value::from("taken")));
        let a = arena.insert(FortnumNode::forward("A"));

        let result = link(&mut arena, a, "rel", "r", &[target], true);

        assert!(matches!(
            result,
            Err(FortnumError::UnableToAddRelatedFortnum { .. })
        ));
    }

    #[test]
    fn given_template_when_checking_then_no_targets() {
        assert!(Relation::named("chemicals").is_template());
        assert!(!Relation::to("Liquid").is_template());
        assert!(!Relation::to_many(["A", "B"]).single);
    }
}
