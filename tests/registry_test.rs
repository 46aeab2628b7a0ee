//! Identity, registration and name-based encoding.

use std::collections::HashMap;

use rstest::{fixture, rstest};
use serde::de::DeserializeSeed;

use fortnum::util::testing;
use fortnum::{Declaration, FortnumError, FortnumSeed, Registry};

#[fixture]
fn registry() -> Registry {
    testing::init_test_setup();
    Registry::new()
}

#[rstest]
fn given_two_declarations_when_comparing_then_identity_based(mut registry: Registry) {
    let f1 = registry.declare(Declaration::new("Fortnum1")).unwrap();
    let f2 = registry.declare(Declaration::new("Fortnum2")).unwrap();
    let f3 = registry.fortnum("Fortnum3").unwrap();

    assert_ne!(f1, f2);
    assert_ne!(f1, f3);
    assert_eq!(registry.get(f1).unwrap(), registry.deserialize("Fortnum1").unwrap());
    assert_ne!(registry.get(f1).unwrap(), registry.get(f2).unwrap());
}

#[rstest]
fn given_fortnums_as_keys_when_looking_up_then_found_by_identity(mut registry: Registry) {
    let f1 = registry.declare(Declaration::new("Fortnum1")).unwrap();
    let f2 = registry.declare(Declaration::new("Fortnum2")).unwrap();

    let d: HashMap<_, _> = [(f1, f1), (f2, f2)].into_iter().collect();
    let views: HashMap<_, _> = [f1, f2]
        .into_iter()
        .map(|id| (registry.get(id).unwrap(), id))
        .collect();

    assert_eq!(d[&f1], f1);
    assert_ne!(d[&f2], f1);
    assert_eq!(views[&registry.deserialize("Fortnum2").unwrap()], f2);
}

#[rstest]
fn given_declared_fortnum_when_serializing_then_roundtrips(mut registry: Registry) {
    let id = registry.declare(Declaration::new("Fortnum1")).unwrap();
    let node = registry.get(id).unwrap();

    assert_eq!(node.serialize(), "Fortnum1");
    assert_eq!(registry.deserialize(node.serialize()).unwrap(), node);
    assert_eq!(node.deserialize(node.serialize()).unwrap(), node);
}

#[rstest]
fn given_fortnum_inside_struct_when_encoding_json_then_uses_name(mut registry: Registry) {
    let id = registry
        .declare(Declaration::new("Colors").nested(Declaration::new("Red")))
        .unwrap();
    let red = registry.get(id).unwrap().members().next().unwrap();

    let json = serde_json::to_string(&vec![red]).unwrap();
    let back = FortnumSeed(&registry)
        .deserialize(&mut serde_json::Deserializer::from_str("\"Red\""))
        .unwrap();

    assert_eq!(json, r#"["Red"]"#);
    assert_eq!(back, red);
}

#[rstest]
fn given_unregistered_name_when_deserializing_then_not_found(registry: Registry) {
    let result = registry.deserialize("Nope");

    assert!(matches!(result, Err(FortnumError::NotFound(name)) if name == "Nope"));
}

#[rstest]
fn given_same_name_twice_when_declaring_then_duplicated(mut registry: Registry) {
    registry.declare(Declaration::new("Fortnum1")).unwrap();

    let result = registry.declare(Declaration::new("Fortnum1"));

    assert_eq!(
        result,
        Err(FortnumError::DuplicatedFortnum {
            name: "Fortnum1".into()
        })
    );
}

#[rstest]
fn given_forward_reference_when_declared_later_then_same_node(mut registry: Registry) {
    // Arrange
    let forward = registry.fortnum("Fortnum1").unwrap();
    assert!(!registry.get(forward).unwrap().is_declared());

    // Act
    let declared = registry
        .declare(Declaration::new("Fortnum1").field("key", "value"))
        .unwrap();

    // Assert
    assert_eq!(forward, declared);
    let node = registry.get(forward).unwrap();
    assert!(node.is_declared());
    assert_eq!(node.get("key").unwrap().as_str(), Some("value"));
    assert_eq!(registry.len(), 1);
}

#[rstest]
fn given_populated_registry_when_cleared_then_fresh_namespace(mut registry: Registry) {
    let old = registry.declare(Declaration::new("Fortnum1")).unwrap();

    registry.clear();

    assert!(registry.is_empty());
    assert!(registry.get(old).is_err());
    assert!(registry.declare(Declaration::new("Fortnum1")).is_ok());
}
