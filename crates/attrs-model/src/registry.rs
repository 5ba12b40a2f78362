//! # Type Registry
//!
//! Holds every declared object type, flattened, plus the named custom
//! coercers. Built once from declarations and immutable afterwards.
//!
//! ## Inheritance Flattening
//!
//! Each type's attribute table is computed at `build()` by walking its
//! `extends` chain from the root ancestor down. A redeclared name replaces
//! the inherited declaration in place, so the table order is "ancestor
//! attributes first, in their order, then the type's new attributes".
//!
//! ## Resolution
//!
//! `TypeRef::Declared` references, parents, and custom coercer names are
//! checked at `build()`. `TypeRef::Deferred` references are only looked up
//! when a value is coerced against them; a miss is
//! `CoercionError::UnresolvedType`.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use attrs_core::{CoercionError, EngineConfig, RegistryError};

use crate::coerce::Coercer;
use crate::instance::Instance;
use crate::types::{AttributeDecl, ObjectType, TargetType, TypeRef};
use crate::value::Value;

/// A registered type with its inherited attributes flattened into one
/// declaration table.
#[derive(Debug)]
pub struct TypeDef {
    name: String,
    /// Parent first, root last.
    ancestors: Vec<String>,
    attributes: Vec<AttributeDecl>,
    index: HashMap<String, usize>,
}

impl TypeDef {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ancestor names, nearest first.
    pub fn ancestors(&self) -> &[String] {
        &self.ancestors
    }

    /// The flattened declaration table, in build order.
    pub fn attributes(&self) -> &[AttributeDecl] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeDecl> {
        self.index.get(name).map(|&i| &self.attributes[i])
    }

    /// Whether this type is `name` or extends it.
    pub fn is_a(&self, name: &str) -> bool {
        self.name == name || self.ancestors.iter().any(|a| a == name)
    }
}

/// The set of declared object types and custom coercers.
pub struct TypeRegistry {
    config: EngineConfig,
    types: HashMap<String, Arc<TypeDef>>,
    coercers: HashMap<String, Arc<dyn Coercer>>,
}

impl TypeRegistry {
    pub fn builder() -> TypeRegistryBuilder {
        TypeRegistryBuilder::default()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Materialize an instance of `type_name`. Same as [`Instance::build`].
    pub fn build(
        self: &Arc<Self>,
        type_name: &str,
        input: impl Into<Value>,
    ) -> Result<Instance, CoercionError> {
        Instance::build(self, type_name, input)
    }

    /// Look up a type by name.
    ///
    /// # Errors
    ///
    /// `CoercionError::UnresolvedType` if no such type was registered.
    pub fn resolve(&self, name: &str) -> Result<Arc<TypeDef>, CoercionError> {
        self.types
            .get(name)
            .cloned()
            .ok_or_else(|| CoercionError::UnresolvedType(name.to_string()))
    }

    pub fn get(&self, name: &str) -> Option<&Arc<TypeDef>> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Returns the names of all registered types, sorted alphabetically.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Whether `child` is `ancestor` or extends it. Unknown names are never
    /// related.
    pub fn is_a(&self, child: &str, ancestor: &str) -> bool {
        self.types
            .get(child)
            .is_some_and(|def| def.is_a(ancestor))
    }

    /// Look up a custom coercer by name.
    ///
    /// # Errors
    ///
    /// `CoercionError::UnresolvedCoercer` if none is registered.
    pub fn coercer(&self, name: &str) -> Result<Arc<dyn Coercer>, CoercionError> {
        self.coercers
            .get(name)
            .cloned()
            .ok_or_else(|| CoercionError::UnresolvedCoercer(name.to_string()))
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut coercers: Vec<&str> = self.coercers.keys().map(String::as_str).collect();
        coercers.sort_unstable();
        f.debug_struct("TypeRegistry")
            .field("config", &self.config)
            .field("types", &self.type_names())
            .field("coercers", &coercers)
            .finish()
    }
}

/// Collects declarations and validates them into a [`TypeRegistry`].
#[derive(Default)]
pub struct TypeRegistryBuilder {
    config: EngineConfig,
    types: Vec<ObjectType>,
    coercers: HashMap<String, Arc<dyn Coercer>>,
}

impl TypeRegistryBuilder {
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn register(mut self, ty: ObjectType) -> Self {
        self.types.push(ty);
        self
    }

    /// Register a custom coercer for `TargetType::Custom(name)`. A later
    /// registration under the same name replaces the earlier one.
    pub fn coercer(mut self, name: impl Into<String>, coercer: impl Coercer + 'static) -> Self {
        self.coercers.insert(name.into(), Arc::new(coercer));
        self
    }

    /// Validate every declaration and flatten inheritance.
    ///
    /// # Errors
    ///
    /// - `DuplicateType` / `DuplicateAttribute` for repeated names.
    /// - `UnknownParent` / `InheritanceCycle` for a broken `extends` chain.
    /// - `UnknownType` / `UnknownCoercer` for eager references that do not
    ///   resolve.
    pub fn build(self) -> Result<Arc<TypeRegistry>, RegistryError> {
        let mut declared: HashMap<&str, &ObjectType> = HashMap::with_capacity(self.types.len());
        for ty in &self.types {
            if declared.insert(ty.name.as_str(), ty).is_some() {
                return Err(RegistryError::DuplicateType(ty.name.clone()));
            }
            let mut seen = HashSet::new();
            for decl in &ty.attributes {
                if !seen.insert(decl.name.as_str()) {
                    return Err(RegistryError::DuplicateAttribute {
                        type_name: ty.name.clone(),
                        name: decl.name.clone(),
                    });
                }
            }
        }

        for ty in &self.types {
            for decl in &ty.attributes {
                check_target(&declared, &self.coercers, ty, decl, &decl.target)?;
            }
        }

        let mut types = HashMap::with_capacity(self.types.len());
        for ty in &self.types {
            let chain = ancestry(&declared, ty)?;
            let def = flatten_chain(ty, &chain);
            types.insert(ty.name.clone(), Arc::new(def));
        }

        tracing::debug!(
            types = types.len(),
            coercers = self.coercers.len(),
            "type registry built"
        );

        Ok(Arc::new(TypeRegistry {
            config: self.config,
            types,
            coercers: self.coercers,
        }))
    }
}

/// The `extends` chain of `ty`, nearest parent first.
fn ancestry<'a>(
    declared: &HashMap<&str, &'a ObjectType>,
    ty: &'a ObjectType,
) -> Result<Vec<&'a ObjectType>, RegistryError> {
    let mut chain = Vec::new();
    let mut visited = HashSet::from([ty.name.as_str()]);
    let mut current = ty;
    while let Some(parent) = current.parent.as_deref() {
        let parent_ty = declared
            .get(parent)
            .copied()
            .ok_or_else(|| RegistryError::UnknownParent {
                type_name: current.name.clone(),
                parent: parent.to_string(),
            })?;
        if !visited.insert(parent_ty.name.as_str()) {
            return Err(RegistryError::InheritanceCycle(parent_ty.name.clone()));
        }
        chain.push(parent_ty);
        current = parent_ty;
    }
    Ok(chain)
}

fn flatten_chain(ty: &ObjectType, chain: &[&ObjectType]) -> TypeDef {
    let mut attributes: Vec<AttributeDecl> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for level in chain.iter().rev().copied().chain(std::iter::once(ty)) {
        for decl in &level.attributes {
            match index.get(&decl.name) {
                Some(&i) => attributes[i] = decl.clone(),
                None => {
                    index.insert(decl.name.clone(), attributes.len());
                    attributes.push(decl.clone());
                }
            }
        }
    }
    TypeDef {
        name: ty.name.clone(),
        ancestors: chain.iter().map(|t| t.name.clone()).collect(),
        attributes,
        index,
    }
}

fn check_target(
    declared: &HashMap<&str, &ObjectType>,
    coercers: &HashMap<String, Arc<dyn Coercer>>,
    ty: &ObjectType,
    decl: &AttributeDecl,
    target: &TargetType,
) -> Result<(), RegistryError> {
    match target {
        TargetType::Primitive(_) | TargetType::Object(TypeRef::Deferred(_)) => Ok(()),
        TargetType::Object(TypeRef::Declared(name)) => {
            if declared.contains_key(name.as_str()) {
                Ok(())
            } else {
                Err(RegistryError::UnknownType {
                    type_name: ty.name.clone(),
                    attribute: decl.name.clone(),
                    reference: name.clone(),
                })
            }
        }
        TargetType::List(item) => check_target(declared, coercers, ty, decl, item),
        TargetType::Custom(name) => {
            if coercers.contains_key(name) {
                Ok(())
            } else {
                Err(RegistryError::UnknownCoercer {
                    type_name: ty.name.clone(),
                    attribute: decl.name.clone(),
                    coercer: name.clone(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user() -> ObjectType {
        ObjectType::new("User")
            .attribute(AttributeDecl::new("name", TargetType::string()))
            .attribute(AttributeDecl::new("role", TargetType::symbol()).default("member"))
    }

    #[test]
    fn test_subtype_inherits_and_overrides_in_place() {
        let registry = TypeRegistry::builder()
            .register(
                ObjectType::new("Admin")
                    .extends("User")
                    .attribute(AttributeDecl::new("level", TargetType::integer()))
                    .attribute(AttributeDecl::new("role", TargetType::symbol()).default("admin")),
            )
            .register(user())
            .build()
            .unwrap();

        let admin = registry.resolve("Admin").unwrap();
        let names: Vec<&str> = admin.attributes().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["name", "role", "level"]);
        assert_eq!(
            admin.attribute("role").unwrap().default.produce(),
            Some(Value::from("admin"))
        );
        assert_eq!(admin.ancestors(), &["User".to_string()]);
        assert!(registry.is_a("Admin", "User"));
        assert!(!registry.is_a("User", "Admin"));
    }

    #[test]
    fn test_multi_level_ancestry() {
        let registry = TypeRegistry::builder()
            .register(user())
            .register(ObjectType::new("Admin").extends("User"))
            .register(
                ObjectType::new("Root")
                    .extends("Admin")
                    .attribute(AttributeDecl::new("shell", TargetType::string())),
            )
            .build()
            .unwrap();
        let root = registry.resolve("Root").unwrap();
        assert_eq!(root.ancestors(), &["Admin".to_string(), "User".to_string()]);
        assert_eq!(root.attributes().len(), 3);
        assert!(root.is_a("User"));
    }

    #[test]
    fn test_duplicate_type_rejected() {
        let err = TypeRegistry::builder()
            .register(user())
            .register(user())
            .build()
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateType("User".into()));
    }

    #[test]
    fn test_duplicate_attribute_rejected() {
        let err = TypeRegistry::builder()
            .register(
                ObjectType::new("City")
                    .attribute(AttributeDecl::new("name", TargetType::string()))
                    .attribute(AttributeDecl::new("name", TargetType::symbol())),
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateAttribute { .. }));
    }

    #[test]
    fn test_unknown_parent_rejected() {
        let err = TypeRegistry::builder()
            .register(ObjectType::new("Admin").extends("Ghost"))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::UnknownParent {
                type_name: "Admin".into(),
                parent: "Ghost".into()
            }
        );
    }

    #[test]
    fn test_inheritance_cycle_rejected() {
        let err = TypeRegistry::builder()
            .register(ObjectType::new("A").extends("B"))
            .register(ObjectType::new("B").extends("A"))
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistryError::InheritanceCycle(_)));
    }

    #[test]
    fn test_self_extension_is_a_cycle() {
        let err = TypeRegistry::builder()
            .register(ObjectType::new("A").extends("A"))
            .build()
            .unwrap_err();
        assert_eq!(err, RegistryError::InheritanceCycle("A".into()));
    }

    #[test]
    fn test_declared_reference_checked_at_build() {
        let err = TypeRegistry::builder()
            .register(
                ObjectType::new("Person")
                    .attribute(AttributeDecl::new("addresses", TargetType::list_of(TargetType::object("Address")))),
            )
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::UnknownType {
                type_name: "Person".into(),
                attribute: "addresses".into(),
                reference: "Address".into()
            }
        );
    }

    #[test]
    fn test_deferred_reference_not_checked_at_build() {
        let registry = TypeRegistry::builder()
            .register(
                ObjectType::new("Person")
                    .attribute(AttributeDecl::new("address", TargetType::deferred("Address"))),
            )
            .build()
            .unwrap();
        assert!(matches!(
            registry.resolve("Address"),
            Err(CoercionError::UnresolvedType(name)) if name == "Address"
        ));
    }

    #[test]
    fn test_unknown_coercer_rejected() {
        let err = TypeRegistry::builder()
            .register(
                ObjectType::new("Money").attribute(AttributeDecl::new("amount", TargetType::custom("cents"))),
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistryError::UnknownCoercer { .. }));
    }

    #[test]
    fn test_registry_builds_instances() {
        let registry = TypeRegistry::builder().register(user()).build().unwrap();
        let u = registry.build("User", json!({"name": "ada"})).unwrap();
        assert_eq!(u.to_json(), json!({"name": "ada", "role": "member"}));
    }

    #[test]
    fn test_type_names_sorted() {
        let registry = TypeRegistry::builder()
            .register(ObjectType::new("Zeta"))
            .register(ObjectType::new("Alpha"))
            .build()
            .unwrap();
        assert_eq!(registry.type_names(), vec!["Alpha", "Zeta"]);
        assert_eq!(registry.len(), 2);
        assert!(!registry.is_empty());
        assert!(registry.contains("Zeta"));
    }
}
