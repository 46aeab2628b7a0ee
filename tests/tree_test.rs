//! Tree navigation: descendants, ancestors, root, family and rendering.

use rstest::{fixture, rstest};

use fortnum::util::testing;
use fortnum::{Declaration, FortnumId, Registry, TreeNodeConvert};

#[fixture]
fn registry() -> Registry {
    testing::init_test_setup();
    Registry::new()
}

/// GrandParent -> Parent -> Child, with Child created standalone first.
fn lineage(registry: &mut Registry) -> (FortnumId, FortnumId, FortnumId) {
    let child = registry.fortnum("Child").unwrap();
    let grand_parent = registry
        .declare(
            Declaration::new("GrandParent")
                .nested(Declaration::new("Parent").field("Child", child)),
        )
        .unwrap();
    let parent = registry.lookup("Parent").unwrap();
    (grand_parent, parent, child)
}

#[rstest]
fn given_three_levels_when_walking_descendants_then_breadth_first(mut registry: Registry) {
    // Arrange
    let root = registry
        .declare(
            Declaration::new("GrandParent")
                .nested(
                    Declaration::new("Parent1")
                        .named("Child1", "Child1")
                        .named("Child2", "Child2"),
                )
                .nested(
                    Declaration::new("Parent2")
                        .named("Child3", "Child3")
                        .named("Child4", "Child4"),
                ),
        )
        .unwrap();

    // Act
    let walk: Vec<_> = registry
        .get(root)
        .unwrap()
        .descendants()
        .map(|n| n.name())
        .collect();

    // Assert
    assert_eq!(
        walk,
        vec!["Parent1", "Parent2", "Child1", "Child2", "Child3", "Child4"]
    );
}

#[rstest]
fn given_nested_child_when_asking_root_then_top_most(mut registry: Registry) {
    let (grand_parent, _, child) = lineage(&mut registry);

    assert_eq!(registry.get(child).unwrap().root(), grand_parent);
    assert_eq!(registry.get(grand_parent).unwrap().root(), grand_parent);
}

#[rstest]
#[case(false, false, &["GrandParent", "Parent"])]
#[case(true, false, &["GrandParent", "Parent", "Child"])]
#[case(false, true, &["Parent", "GrandParent"])]
#[case(true, true, &["Child", "Parent", "GrandParent"])]
fn given_child_when_listing_ancestors_then_chain_per_flags(
    mut registry: Registry,
    #[case] include_self: bool,
    #[case] ascending: bool,
    #[case] expected: &[&str],
) {
    let (_, _, child) = lineage(&mut registry);

    let chain: Vec<_> = registry
        .get(child)
        .unwrap()
        .ancestors(include_self, ascending)
        .into_iter()
        .map(|n| n.name())
        .collect();

    assert_eq!(chain, expected);
}

#[rstest]
fn given_parent_when_listing_family_then_ancestors_then_members(mut registry: Registry) {
    let child1 = registry.fortnum("Child1").unwrap();
    let child2 = registry.fortnum("Child2").unwrap();
    registry
        .declare(
            Declaration::new("GrandParent").nested(
                Declaration::new("Parent")
                    .field("Child1", child1)
                    .field("Child2", child2),
            ),
        )
        .unwrap();

    let family: Vec<_> = registry
        .deserialize("Parent")
        .unwrap()
        .family()
        .into_iter()
        .map(|n| n.name())
        .collect();

    assert_eq!(family, vec!["GrandParent", "Parent", "Child1", "Child2"]);
}

#[rstest]
fn given_member_below_tree_when_checking_deep_containment_then_found(mut registry: Registry) {
    let (grand_parent, parent, child) = lineage(&mut registry);
    let grand_parent = registry.get(grand_parent).unwrap();

    assert!(grand_parent.contains_deep(child));
    assert!(grand_parent.contains(parent));
    assert!(!grand_parent.contains(child));
}

#[rstest]
fn given_tree_when_rendering_then_members_indented(mut registry: Registry) {
    let (grand_parent, _, _) = lineage(&mut registry);

    let rendered = registry
        .get(grand_parent)
        .unwrap()
        .to_tree_string()
        .to_string();

    let lines: Vec<_> = rendered.lines().collect();
    assert_eq!(lines[0], "GrandParent");
    assert!(lines[1].ends_with("Parent"));
    assert!(lines[2].ends_with("Child"));
}
