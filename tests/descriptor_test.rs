//! Host structs holding fortnum-restricted fields.

use fortnum::util::testing;
use fortnum::{ApplicationError, Declaration, FortnumField, FortnumId, Registry, Value};

struct Basket {
    fruit: FortnumField,
    plant: FortnumField,
}

fn setup() -> (Registry, Basket) {
    testing::init_test_setup();
    let mut registry = Registry::new();
    let fruits = registry
        .declare(
            Declaration::new("Fruits")
                .named("Banana", "Banana")
                .named("Tomato", "Tomato"),
        )
        .unwrap();
    let banana = registry.lookup("Banana").unwrap();
    let tomato = registry.lookup("Tomato").unwrap();
    let plants = registry
        .declare(
            Declaration::new("Plants")
                .named("Grass", "Grass")
                .borrow("Banana", banana)
                .borrow("Tomato", tomato),
        )
        .unwrap();
    let basket = Basket {
        fruit: FortnumField::new("fruits", fruits)
            .with_default(banana)
            .allow_none(false),
        plant: FortnumField::new("plants", plants).allow_none(false),
    };
    (registry, basket)
}

fn id(registry: &Registry, name: &str) -> FortnumId {
    registry.lookup(name).unwrap()
}

#[test]
fn given_default_when_assigning_member_then_value_replaced() {
    let (registry, mut basket) = setup();

    assert_eq!(basket.fruit.get(), Some(id(&registry, "Banana")));
    basket.fruit.set(&registry, Some(id(&registry, "Tomato"))).unwrap();

    assert_eq!(basket.fruit.get(), Some(id(&registry, "Tomato")));
}

#[test]
fn given_none_disallowed_when_assigning_none_then_invalid_value() {
    let (registry, mut basket) = setup();

    let result = basket.plant.set(&registry, None);

    assert!(matches!(
        result,
        Err(ApplicationError::InvalidValue { field, .. }) if field == "plants"
    ));
}

#[test]
fn given_illegal_values_when_assigning_then_each_rejected() {
    let (registry, mut basket) = setup();
    let grass = id(&registry, "Grass");

    for value in [
        Value::Fortnum(grass),
        Value::List(vec![]),
        Value::Int(1),
        Value::Bool(false),
        Value::Bool(true),
    ] {
        assert!(basket.fruit.set_value(&registry, &value).is_err(), "{value} accepted");
    }
    assert_eq!(basket.fruit.get(), Some(id(&registry, "Banana")));
}

#[test]
fn given_borrowed_member_when_assigning_to_second_tree_then_accepted() {
    let (registry, mut basket) = setup();

    basket.plant.set(&registry, Some(id(&registry, "Tomato"))).unwrap();

    let plant = basket.plant.get_in(&registry).unwrap().unwrap();
    assert_eq!(plant.name(), "Tomato");
    assert_eq!(plant.parent().unwrap().name(), "Fruits");
}
