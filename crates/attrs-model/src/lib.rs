//! # attrs-model — Declared Value Objects
//!
//! Builds typed value objects out of loosely-typed input mappings and
//! flattens them back into plain mappings.
//!
//! ## Components
//!
//! - **Declarations** (`types.rs`): `TargetType`, `AttributeDecl`,
//!   `ObjectType`. A type lists its own attributes and optionally
//!   `extends` a parent.
//!
//! - **Type registry** (`registry.rs`): validates declarations once, flattens
//!   each type's inherited attributes into a single table, and resolves type
//!   names lazily at coercion time.
//!
//! - **Coercion** (`coerce.rs`): dispatches on `TargetType` into primitive
//!   conversion, value-object materialization, typed-list construction, or a
//!   registered custom coercer.
//!
//! - **Typed list** (`list.rs`): `TypedList`, an ordered container bound to
//!   one item type whose every insertion path coerces the new elements.
//!
//! - **Instances** (`instance.rs`, `store.rs`): `Instance` owns an
//!   `AttributeStore`; `set` always re-coerces; `flatten` is read-only.
//!
//! - **Handles** (`handle.rs`): `ObjectMut` / `ListMut`, the coercing
//!   mutable views onto nested objects and lists.
//!
//! ## Example
//!
//! ```
//! use attrs_model::{AttributeDecl, Instance, ObjectType, PrimitiveKind, TargetType, TypeRegistry};
//! use serde_json::json;
//!
//! let registry = TypeRegistry::builder()
//!     .register(
//!         ObjectType::new("City")
//!             .attribute(AttributeDecl::new("name", TargetType::Primitive(PrimitiveKind::String)))
//!             .attribute(AttributeDecl::new("size", TargetType::Primitive(PrimitiveKind::Integer)).default(9000)),
//!     )
//!     .build()?;
//!
//! let city = Instance::build(&registry, "City", json!({"name": "NYC"}))?;
//! assert_eq!(city.to_json(), json!({"name": "NYC", "size": 9000}));
//! # Ok::<(), attrs_model::AttrsError>(())
//! ```
//!
//! ## Concurrency
//!
//! Everything is synchronous. The registry is immutable after `build()` and
//! shared through `Arc`. An instance exclusively owns its store and the
//! lists inside it; cloning an instance deep-copies them.

pub mod coerce;
pub mod handle;
pub mod instance;
pub mod list;
pub mod registry;
pub mod store;
pub mod types;
pub mod value;

pub use attrs_core::{
    AbsentPolicy, AttrsError, CoercionError, ContentDigest, ConversionError, EngineConfig,
    PrimitiveKind, RegistryError, Scalar,
};
pub use coerce::{coerce, Coercer};
pub use handle::{ListMut, ObjectMut};
pub use instance::Instance;
pub use list::TypedList;
pub use registry::{TypeDef, TypeRegistry, TypeRegistryBuilder};
pub use store::AttributeStore;
pub use types::{AttributeDecl, DefaultValue, ObjectType, TargetType, TypeRef};
pub use value::{Attributes, Value};
