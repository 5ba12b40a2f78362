//! # Coercion Engine
//!
//! `coerce(registry, target, value)` turns a loosely-typed [`Value`] into a
//! value of the declared target type. It is the single entry point used by
//! instance construction, attribute assignment, and every typed-list
//! mutation.
//!
//! ## Dispatch
//!
//! | Target              | Input                    | Result                                  |
//! |---------------------|--------------------------|-----------------------------------------|
//! | `Primitive(Any)`    | anything                 | unchanged                               |
//! | `Primitive(k)`      | scalar                   | `coerce_scalar(k, ..)`                  |
//! | `Primitive(k)`      | list, map, object        | `ConversionError`                       |
//! | `Object(t)`         | null                     | null                                    |
//! | `Object(t)`         | instance of `t` or below | unchanged, if built by the same registry |
//! | `Object(t)`         | other instance           | rebuilt from its flattened attributes   |
//! | `Object(t)`         | map                      | materialized as `t`                     |
//! | `Object(t)`         | anything else            | materialized from an empty map          |
//! | `List(item)`        | list or typed list       | `TypedList` with every element coerced  |
//! | `List(item)`        | anything else            | empty `TypedList`                       |
//! | `Custom(name)`      | anything                 | the registered coercer                  |
//!
//! Coercion is idempotent: feeding a coerced value back in yields an equal
//! value.

use std::sync::Arc;

use attrs_core::{coerce_scalar, CoercionError, ConversionError, PrimitiveKind};

use crate::instance::Instance;
use crate::list::TypedList;
use crate::registry::TypeRegistry;
use crate::types::TargetType;
use crate::value::Value;

/// A user-supplied conversion for `TargetType::Custom`.
///
/// Implementations must be idempotent: coercing an already-coerced value
/// returns an equal value.
pub trait Coercer: Send + Sync {
    fn coerce(&self, value: Value) -> Result<Value, CoercionError>;
}

impl<F> Coercer for F
where
    F: Fn(Value) -> Result<Value, CoercionError> + Send + Sync,
{
    fn coerce(&self, value: Value) -> Result<Value, CoercionError> {
        self(value)
    }
}

/// Coerce `value` into `target`.
///
/// # Errors
///
/// - `CoercionError::Conversion` when a primitive conversion fails.
/// - `CoercionError::UnresolvedType` / `UnresolvedCoercer` when a lazy
///   reference names nothing registered.
/// - Nested failures come back wrapped with their attribute path.
pub fn coerce(
    registry: &Arc<TypeRegistry>,
    target: &TargetType,
    value: Value,
) -> Result<Value, CoercionError> {
    match target {
        TargetType::Primitive(PrimitiveKind::Any) => Ok(value),
        TargetType::Primitive(kind) => coerce_primitive(registry, *kind, value),
        TargetType::Object(reference) => {
            let def = registry.resolve(reference.name())?;
            match value {
                Value::Scalar(s) if s.is_null() => Ok(Value::NULL),
                // A foreign registry may declare `t` differently under the same name.
                Value::Object(instance)
                    if Arc::ptr_eq(instance.registry(), registry) && instance.is_a(def.name()) =>
                {
                    Ok(Value::Object(instance))
                }
                Value::Object(instance) => {
                    let input = Value::Map(instance.flatten());
                    Instance::materialize(registry, def, input).map(Value::Object)
                }
                input @ Value::Map(_) => {
                    Instance::materialize(registry, def, input).map(Value::Object)
                }
                _ => Instance::materialize(registry, def, Value::Map(Default::default()))
                    .map(Value::Object),
            }
        }
        TargetType::List(item) => {
            let items = match value {
                Value::List(items) => items,
                Value::Container(list) => list.into_items(),
                _ => Vec::new(),
            };
            TypedList::new(registry, (**item).clone(), items).map(Value::Container)
        }
        TargetType::Custom(name) => registry.coercer(name)?.coerce(value),
    }
}

fn coerce_primitive(
    registry: &TypeRegistry,
    kind: PrimitiveKind,
    value: Value,
) -> Result<Value, CoercionError> {
    match value {
        Value::Scalar(s) => Ok(Value::Scalar(coerce_scalar(kind, s, registry.config())?)),
        other => Err(ConversionError::new(
            kind,
            other.kind_name(),
            "structured values do not convert to primitives",
        )
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AttributeDecl, ObjectType};
    use attrs_core::{EngineConfig, Scalar};
    use serde_json::json;

    fn registry() -> Arc<TypeRegistry> {
        TypeRegistry::builder()
            .register(
                ObjectType::new("City")
                    .attribute(AttributeDecl::new("name", TargetType::string()))
                    .attribute(AttributeDecl::new("size", TargetType::integer()).default(9000)),
            )
            .register(
                ObjectType::new("Capital")
                    .extends("City")
                    .attribute(AttributeDecl::new("country", TargetType::string())),
            )
            .register(
                ObjectType::new("Town").attribute(AttributeDecl::new("name", TargetType::string())),
            )
            .coercer("upper", |v: Value| match v.as_str() {
                Some(s) => Ok(Value::from(s.to_uppercase())),
                None => Err(CoercionError::custom("expected text")),
            })
            .build()
            .unwrap()
    }

    #[test]
    fn test_primitive_scalar() {
        let r = registry();
        assert_eq!(
            coerce(&r, &TargetType::integer(), Value::from("42")).unwrap(),
            Value::from(42)
        );
        assert_eq!(
            coerce(&r, &TargetType::string(), Value::NULL).unwrap(),
            Value::from("")
        );
    }

    #[test]
    fn test_primitive_rejects_structured_input() {
        let r = registry();
        let err = coerce(&r, &TargetType::integer(), Value::list([1, 2])).unwrap_err();
        assert!(matches!(err, CoercionError::Conversion(_)));
    }

    #[test]
    fn test_any_passes_through() {
        let r = registry();
        let v = Value::map([("x", Value::list([1]))]);
        assert_eq!(coerce(&r, &TargetType::any(), v.clone()).unwrap(), v);
    }

    #[test]
    fn test_object_from_map() {
        let r = registry();
        let v = coerce(&r, &TargetType::object("City"), Value::from(json!({"name": "NYC"}))).unwrap();
        let city = v.as_object().unwrap();
        assert_eq!(city.type_name(), "City");
        assert_eq!(city.get("size").unwrap().as_i64(), Some(9000));
    }

    #[test]
    fn test_object_null_stays_null() {
        let r = registry();
        assert!(coerce(&r, &TargetType::object("City"), Value::NULL)
            .unwrap()
            .is_null());
    }

    #[test]
    fn test_object_from_non_map_uses_defaults() {
        let r = registry();
        let v = coerce(&r, &TargetType::object("City"), Value::from(17)).unwrap();
        assert_eq!(v.to_json(), json!({"name": "", "size": 9000}));
    }

    #[test]
    fn test_subtype_instance_passes_through() {
        let r = registry();
        let capital = Instance::build(&r, "Capital", json!({"name": "Paris", "country": "FR"})).unwrap();
        let v = coerce(&r, &TargetType::object("City"), Value::Object(capital.clone())).unwrap();
        assert_eq!(v.as_object().unwrap(), &capital);
        assert_eq!(v.as_object().unwrap().type_name(), "Capital");
    }

    #[test]
    fn test_unrelated_instance_is_rebuilt() {
        let r = registry();
        let town = Instance::build(&r, "Town", json!({"name": "Hamlet"})).unwrap();
        let v = coerce(&r, &TargetType::object("City"), Value::Object(town)).unwrap();
        let city = v.as_object().unwrap();
        assert_eq!(city.type_name(), "City");
        assert_eq!(city.get("name").unwrap().as_str(), Some("Hamlet"));
        assert_eq!(city.get("size").unwrap().as_i64(), Some(9000));
    }

    #[test]
    fn test_list_from_plain_list() {
        let r = registry();
        let v = coerce(
            &r,
            &TargetType::list_of(TargetType::integer()),
            Value::list(["1", "2"]),
        )
        .unwrap();
        let list = v.as_container().unwrap();
        assert_eq!(list.flatten(), vec![Value::from(1), Value::from(2)]);
    }

    #[test]
    fn test_list_from_non_list_is_empty() {
        let r = registry();
        let v = coerce(&r, &TargetType::list_of(TargetType::integer()), Value::from("x")).unwrap();
        assert!(v.as_container().unwrap().is_empty());
    }

    #[test]
    fn test_list_failure_carries_index() {
        let r = registry();
        let err = coerce(
            &r,
            &TargetType::list_of(TargetType::integer()),
            Value::list(["1", "two"]),
        )
        .unwrap_err();
        assert_eq!(err.path(), Some("[1]"));
    }

    #[test]
    fn test_custom_coercer() {
        let r = registry();
        assert_eq!(
            coerce(&r, &TargetType::custom("upper"), Value::from("abc")).unwrap(),
            Value::from("ABC")
        );
        assert!(matches!(
            coerce(&r, &TargetType::custom("upper"), Value::from(1)),
            Err(CoercionError::Custom(_))
        ));
    }

    #[test]
    fn test_instance_from_other_registry_is_rebuilt() {
        let r = registry();
        let foreign = TypeRegistry::builder()
            .register(
                ObjectType::new("City")
                    .attribute(AttributeDecl::new("name", TargetType::string()))
                    .attribute(AttributeDecl::new("size", TargetType::string())),
            )
            .build()
            .unwrap();
        let city = Instance::build(&foreign, "City", json!({"name": "NYC", "size": "12"})).unwrap();

        let v = coerce(&r, &TargetType::object("City"), Value::Object(city)).unwrap();
        let rebuilt = v.as_object().unwrap();
        assert!(Arc::ptr_eq(rebuilt.registry(), &r));
        assert_eq!(rebuilt.get("size"), Some(&Value::from(12)));
        assert_eq!(rebuilt.get("name"), Some(&Value::from("NYC")));

        let same = coerce(&r, &TargetType::object("City"), v.clone()).unwrap();
        assert!(Arc::ptr_eq(same.as_object().unwrap().registry(), &r));
        assert_eq!(same, v);
    }

    #[test]
    fn test_unresolved_deferred_reference() {
        let r = registry();
        let err = coerce(&r, &TargetType::deferred("Ghost"), Value::NULL).unwrap_err();
        assert_eq!(err, CoercionError::UnresolvedType("Ghost".into()));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_unresolved_coercer_at_runtime() {
        let r = registry();
        let err = coerce(&r, &TargetType::custom("lower"), Value::from("A")).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_trim_strings_config() {
        let r = TypeRegistry::builder()
            .config(EngineConfig::default().with_trim_strings(true))
            .build()
            .unwrap();
        assert_eq!(
            coerce(&r, &TargetType::string(), Value::from("  padded ")).unwrap(),
            Value::Scalar(Scalar::String("padded".into()))
        );
    }
}
