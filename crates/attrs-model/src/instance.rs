//! # Value-Object Instances
//!
//! An `Instance` is one materialized value object: a resolved type
//! definition plus an [`AttributeStore`] holding one coerced value per
//! declared attribute.
//!
//! ## Materialization
//!
//! For each attribute in the type's flattened declaration table, in order:
//!
//! 1. An explicit `null` for an `allow_nil` attribute is stored as null.
//! 2. A provided value is coerced against the attribute's target.
//! 3. Otherwise the declared default (fixed or computed) is coerced.
//! 4. Otherwise the absent policy applies: `zero` coerces null, which yields
//!    the target's zero value; `omit` stores null, except that list targets
//!    still get an empty typed list.
//!
//! Input keys that match no declared attribute are dropped. Construction is
//! all-or-nothing and failures carry the dotted attribute path.
//!
//! ## Mutation
//!
//! `set`, `assign`, `replace_attributes` and `reset` all coerce before
//! storing. Nested objects and lists are reachable mutably only through the
//! `ObjectMut` / `ListMut` handles returned by `object_mut` / `list_mut`,
//! which forward to those coercing mutators and never hand out `&mut`.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use attrs_core::{AbsentPolicy, CanonicalizationError, CoercionError, ContentDigest};

use crate::coerce::coerce;
use crate::handle::{ListMut, ObjectMut};
use crate::list::TypedList;
use crate::registry::{TypeDef, TypeRegistry};
use crate::store::AttributeStore;
use crate::types::{AttributeDecl, TargetType};
use crate::value::{Attributes, Value};

/// A materialized value object.
#[derive(Clone)]
pub struct Instance {
    def: Arc<TypeDef>,
    registry: Arc<TypeRegistry>,
    store: AttributeStore,
}

impl Instance {
    /// Materialize `type_name` from `input`. Anything other than a mapping
    /// (including null) is treated as an empty mapping.
    ///
    /// # Errors
    ///
    /// `UnresolvedType` if `type_name` is not registered, or the first
    /// attribute that fails to coerce, wrapped with its path.
    pub fn build(
        registry: &Arc<TypeRegistry>,
        type_name: &str,
        input: impl Into<Value>,
    ) -> Result<Self, CoercionError> {
        let def = registry.resolve(type_name)?;
        Self::materialize(registry, def, input.into())
    }

    pub(crate) fn materialize(
        registry: &Arc<TypeRegistry>,
        def: Arc<TypeDef>,
        input: Value,
    ) -> Result<Self, CoercionError> {
        let mut input = into_mapping(input);
        let mut store = AttributeStore::with_capacity(def.attributes().len());
        for decl in def.attributes() {
            let provided = input.shift_remove(&decl.name);
            let value = slot_value(registry, decl, provided).map_err(|e| e.at(&decl.name))?;
            store.insert(decl.name.as_str(), value);
        }
        log_dropped(def.name(), &input);
        tracing::debug!(
            type_name = def.name(),
            attributes = store.len(),
            "instance built"
        );
        Ok(Self {
            def,
            registry: Arc::clone(registry),
            store,
        })
    }

    pub fn type_name(&self) -> &str {
        self.def.name()
    }

    pub fn type_def(&self) -> &TypeDef {
        &self.def
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// Whether this instance's type is `name` or extends it.
    pub fn is_a(&self, name: &str) -> bool {
        self.def.is_a(name)
    }

    /// The stored value of `name`, or `None` for an undeclared name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.store.get(name)
    }

    pub fn attributes(&self) -> &AttributeStore {
        &self.store
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.store.iter()
    }

    /// Coerce `value` against the declared type of `name` and store it.
    ///
    /// # Errors
    ///
    /// `UnknownAttribute` for an undeclared name, or the coercion failure
    /// wrapped with `name`. The stored value is unchanged on failure.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), CoercionError> {
        let decl = self.declaration(name)?;
        let value = assigned_value(&self.registry, decl, value.into()).map_err(|e| e.at(name))?;
        tracing::trace!(type_name = self.def.name(), attribute = name, "attribute set");
        self.store.insert(name, value);
        Ok(())
    }

    /// Coerce and set every declared key present in `mapping`. Keys that are
    /// not declared are dropped. All-or-nothing.
    pub fn assign(&mut self, mapping: impl Into<Value>) -> Result<(), CoercionError> {
        let mut input = into_mapping(mapping.into());
        let mut updates = Vec::with_capacity(input.len());
        for decl in self.def.attributes() {
            if let Some(value) = input.shift_remove(&decl.name) {
                let value =
                    assigned_value(&self.registry, decl, value).map_err(|e| e.at(&decl.name))?;
                updates.push((decl.name.clone(), value));
            }
        }
        log_dropped(self.def.name(), &input);
        for (name, value) in updates {
            self.store.insert(name, value);
        }
        Ok(())
    }

    /// Recompute every attribute from `mapping` or its default, as `build`
    /// would. All-or-nothing.
    pub fn replace_attributes(&mut self, mapping: impl Into<Value>) -> Result<(), CoercionError> {
        let rebuilt = Self::materialize(&self.registry, Arc::clone(&self.def), mapping.into())?;
        self.store = rebuilt.store;
        Ok(())
    }

    /// Restore `name` to its default, or to the absent-policy value when it
    /// has none. Computed defaults are evaluated again.
    pub fn reset(&mut self, name: &str) -> Result<(), CoercionError> {
        let decl = self.declaration(name)?;
        let value = initial_value(&self.registry, decl).map_err(|e| e.at(name))?;
        self.store.insert(name, value);
        Ok(())
    }

    /// Coercing handle to a nested object attribute. `None` when the
    /// attribute is undeclared, null, or not an object.
    pub fn object_mut(&mut self, name: &str) -> Option<ObjectMut<'_>> {
        self.store
            .get_mut(name)
            .and_then(Value::as_object_mut)
            .map(ObjectMut::new)
    }

    /// Coercing handle to a typed-list attribute.
    pub fn list_mut(&mut self, name: &str) -> Option<ListMut<'_>> {
        self.store
            .get_mut(name)
            .and_then(Value::as_container_mut)
            .map(ListMut::new)
    }

    /// Plain mapping of the attributes, recursively flattened. Null
    /// attributes are omitted.
    pub fn flatten(&self) -> Attributes {
        self.store
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k.clone(), v.flattened()))
            .collect()
    }

    /// The flattened mapping as JSON.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.flatten()
                .into_iter()
                .map(|(k, v)| (k, v.to_json()))
                .collect(),
        )
    }

    /// SHA-256 over the JCS-canonical bytes of the flattened mapping. Equal
    /// instances have equal fingerprints regardless of attribute order.
    pub fn fingerprint(&self) -> Result<ContentDigest, CanonicalizationError> {
        ContentDigest::of(&self.flatten())
    }

    fn declaration(&self, name: &str) -> Result<&AttributeDecl, CoercionError> {
        self.def
            .attribute(name)
            .ok_or_else(|| CoercionError::UnknownAttribute {
                type_name: self.def.name().to_string(),
                name: name.to_string(),
            })
    }
}

fn into_mapping(input: Value) -> IndexMap<String, Value> {
    match input {
        Value::Map(map) => map,
        _ => IndexMap::new(),
    }
}

fn log_dropped(type_name: &str, leftover: &IndexMap<String, Value>) {
    if !leftover.is_empty() {
        let keys: Vec<&str> = leftover.keys().map(String::as_str).collect();
        tracing::debug!(type_name, dropped = ?keys, "ignoring undeclared keys");
    }
}

fn slot_value(
    registry: &Arc<TypeRegistry>,
    decl: &AttributeDecl,
    provided: Option<Value>,
) -> Result<Value, CoercionError> {
    match provided {
        Some(value) => assigned_value(registry, decl, value),
        None => initial_value(registry, decl),
    }
}

fn assigned_value(
    registry: &Arc<TypeRegistry>,
    decl: &AttributeDecl,
    value: Value,
) -> Result<Value, CoercionError> {
    if decl.allow_nil && value.is_null() {
        return Ok(Value::NULL);
    }
    tracing::trace!(attribute = %decl.name, target = %decl.target, "coercing attribute");
    coerce(registry, &decl.target, value)
}

fn initial_value(registry: &Arc<TypeRegistry>, decl: &AttributeDecl) -> Result<Value, CoercionError> {
    if let Some(default) = decl.default.produce() {
        return coerce(registry, &decl.target, default);
    }
    match (registry.config().absent, &decl.target) {
        (AbsentPolicy::Zero, target) => coerce(registry, target, Value::NULL),
        (AbsentPolicy::Omit, TargetType::List(item)) => Ok(Value::Container(TypedList::empty(
            registry,
            (**item).clone(),
        ))),
        (AbsentPolicy::Omit, _) => Ok(Value::NULL),
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.def.name() == other.def.name() && self.store == other.store
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type", &self.def.name())
            .field("attributes", &self.store)
            .finish()
    }
}

impl Serialize for Instance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.flatten())
    }
}
