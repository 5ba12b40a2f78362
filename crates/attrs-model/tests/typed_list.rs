//! # Typed List Mutation Tests
//!
//! Every insertion path of `TypedList` must leave each element equal to its
//! own re-coercion. Also covers item types named lazily, so two object types
//! can hold lists of each other.

use std::sync::Arc;

use attrs_model::{
    coerce, AttributeDecl, CoercionError, Instance, ObjectType, TargetType, TypeRegistry,
    TypedList, Value,
};
use proptest::prelude::*;
use serde_json::json;

fn registry() -> Arc<TypeRegistry> {
    TypeRegistry::builder()
        .register(
            ObjectType::new("Team")
                .attribute(AttributeDecl::new("name", TargetType::string()))
                .attribute(AttributeDecl::new(
                    "members",
                    TargetType::list_of(TargetType::deferred("Member")),
                )),
        )
        .register(
            ObjectType::new("Member")
                .attribute(AttributeDecl::new("handle", TargetType::symbol()))
                .attribute(AttributeDecl::new("active", TargetType::boolean()).default(true))
                .attribute(AttributeDecl::new(
                    "teams",
                    TargetType::list_of(TargetType::deferred("Team")),
                )),
        )
        .build()
        .expect("declarations are valid")
}

fn assert_all_coerced(r: &Arc<TypeRegistry>, list: &TypedList) {
    for element in list {
        let again = coerce(r, list.item_type(), element.clone()).unwrap();
        assert_eq!(&again, element);
    }
}

#[test]
fn test_every_mutation_path_coerces() {
    let r = registry();
    let mut list = TypedList::new(&r, TargetType::deferred("Member"), [json!({"handle": "a"})]).unwrap();
    assert_all_coerced(&r, &list);

    list.push(json!({"handle": "b", "active": "no"})).unwrap();
    assert_all_coerced(&r, &list);

    list.push_all([json!({"handle": "c"}), json!({"handle": "d"})])
        .unwrap();
    assert_all_coerced(&r, &list);

    let other = vec![Value::from(json!({"handle": "e", "active": 0}))];
    list.concat(&other).unwrap();
    assert_all_coerced(&r, &list);
    assert!(other[0].as_map().is_some());

    list.insert(0, json!({"handle": "z"})).unwrap();
    list.set(1, json!({"handle": "y"})).unwrap();
    assert_all_coerced(&r, &list);
    assert_eq!(list.len(), 6);

    list.replace([json!({"handle": "only"})]).unwrap();
    assert_all_coerced(&r, &list);
    assert_eq!(
        Value::List(list.flatten()).to_json(),
        json!([{"handle": "only", "active": true, "teams": []}])
    );
}

#[test]
fn test_mutual_references_resolve_lazily() {
    let r = registry();
    let team = Instance::build(
        &r,
        "Team",
        json!({
            "name": "core",
            "members": [{"handle": "ada", "teams": [{"name": "infra"}]}]
        }),
    )
    .unwrap();

    let members = team.get("members").and_then(Value::as_container).unwrap();
    let ada = members[0].as_object().unwrap();
    assert_eq!(ada.type_name(), "Member");
    assert_eq!(ada.get("active"), Some(&Value::from(true)));

    let teams = ada.get("teams").and_then(Value::as_container).unwrap();
    assert_eq!(teams[0].as_object().unwrap().type_name(), "Team");
    assert_eq!(
        team.to_json(),
        json!({
            "name": "core",
            "members": [{
                "handle": "ada",
                "active": true,
                "teams": [{"name": "infra", "members": []}]
            }]
        })
    );
}

#[test]
fn test_unresolved_item_type_surfaces_on_first_use() {
    let r = registry();
    let mut list = TypedList::empty(&r, TargetType::deferred("Ghost"));
    assert!(list.is_empty());
    let err = list.push(json!({})).unwrap_err();
    assert!(err.is_configuration());
    assert!(matches!(err.root_cause(), CoercionError::UnresolvedType(name) if name == "Ghost"));
}

#[test]
fn test_untyped_list_stores_items_unchanged() {
    let r = registry();
    let mixed = [Value::from(1), Value::from("two"), Value::from(json!({"three": 3}))];
    let list = TypedList::new(&r, TargetType::any(), mixed.clone()).unwrap();
    assert_eq!(list.as_slice(), &mixed);
}

#[test]
fn test_list_attribute_set_rebuilds_container() {
    let r = registry();
    let mut team = Instance::build(&r, "Team", json!({"name": "core"})).unwrap();
    team.set("members", json!([{"handle": "x"}, {"handle": "y"}]))
        .unwrap();
    let mut members = team.list_mut("members").unwrap();
    assert_eq!(members.len(), 2);
    members.pop();
    members.push(json!({"handle": "z", "active": "off"})).unwrap();
    assert_eq!(
        team.to_json()["members"],
        json!([
            {"handle": "x", "active": true, "teams": []},
            {"handle": "z", "active": false, "teams": []}
        ])
    );
}

proptest! {
    #[test]
    fn pushed_integers_are_coerced(values in prop::collection::vec(
        prop_oneof![
            (-10_000i64..10_000).prop_map(Value::from),
            (-10_000i64..10_000).prop_map(|n| Value::from(n.to_string())),
            (-1.0e6f64..1.0e6).prop_map(Value::from),
            any::<bool>().prop_map(Value::from),
        ],
        0..16,
    )) {
        let r = registry();
        let mut list = TypedList::empty(&r, TargetType::integer());
        for v in values.iter().cloned() {
            list.push(v).unwrap();
        }
        prop_assert_eq!(list.len(), values.len());
        for element in &list {
            prop_assert!(element.as_i64().is_some());
        }
    }
}
