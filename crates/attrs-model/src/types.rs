//! # Declarations — Target Types, Attributes, Object Types
//!
//! These are the values the declaration layer hands to the registry: for
//! every attribute a `(name, target, default)` triple, grouped into named
//! object types that may extend one parent.

use std::fmt;
use std::sync::Arc;

use attrs_core::PrimitiveKind;

use crate::value::Value;

/// Reference to a declared object type by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// Checked when the registry is built; an unknown name is a
    /// `RegistryError::UnknownType`.
    Declared(String),
    /// Not checked until a value is coerced against it, so types may refer
    /// to each other regardless of registration order.
    Deferred(String),
}

impl TypeRef {
    /// The referenced type name.
    pub fn name(&self) -> &str {
        match self {
            Self::Declared(name) | Self::Deferred(name) => name,
        }
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }
}

/// The declared type of an attribute or list item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TargetType {
    /// A primitive scalar kind.
    Primitive(PrimitiveKind),
    /// A nested value object.
    Object(TypeRef),
    /// A typed list of the inner target.
    List(Box<TargetType>),
    /// A coercer registered on the registry under this name.
    Custom(String),
}

impl TargetType {
    pub fn string() -> Self {
        Self::Primitive(PrimitiveKind::String)
    }

    pub fn integer() -> Self {
        Self::Primitive(PrimitiveKind::Integer)
    }

    pub fn float() -> Self {
        Self::Primitive(PrimitiveKind::Float)
    }

    pub fn boolean() -> Self {
        Self::Primitive(PrimitiveKind::Boolean)
    }

    pub fn symbol() -> Self {
        Self::Primitive(PrimitiveKind::Symbol)
    }

    pub fn date() -> Self {
        Self::Primitive(PrimitiveKind::Date)
    }

    pub fn date_time() -> Self {
        Self::Primitive(PrimitiveKind::DateTime)
    }

    pub fn any() -> Self {
        Self::Primitive(PrimitiveKind::Any)
    }

    /// A value object checked at registry build time.
    pub fn object(name: impl Into<String>) -> Self {
        Self::Object(TypeRef::Declared(name.into()))
    }

    /// A value object resolved by name on first use.
    pub fn deferred(name: impl Into<String>) -> Self {
        Self::Object(TypeRef::Deferred(name.into()))
    }

    /// A typed list of `item`.
    pub fn list_of(item: TargetType) -> Self {
        Self::List(Box::new(item))
    }

    /// A value handled by a registered custom coercer.
    pub fn custom(name: impl Into<String>) -> Self {
        Self::Custom(name.into())
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(kind) => write!(f, "{kind}"),
            Self::Object(r) => f.write_str(r.name()),
            Self::List(item) => write!(f, "list<{item}>"),
            Self::Custom(name) => write!(f, "custom:{name}"),
        }
    }
}

/// Where an attribute's value comes from when its key is missing.
#[derive(Clone, Default)]
pub enum DefaultValue {
    /// No default declared.
    #[default]
    None,
    /// A fixed value, cloned and coerced at every build.
    Value(Value),
    /// A value computed at every build or reset.
    Computed(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl DefaultValue {
    /// Produce the default for one build, if any.
    pub fn produce(&self) -> Option<Value> {
        match self {
            Self::None => None,
            Self::Value(v) => Some(v.clone()),
            Self::Computed(f) => Some(f()),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// One declared attribute.
#[derive(Debug, Clone)]
pub struct AttributeDecl {
    /// Attribute name, unique within its type.
    pub name: String,
    /// Declared target type.
    pub target: TargetType,
    /// Default used when the input has no value for this name.
    pub default: DefaultValue,
    /// Keep an explicit `null` input as null instead of zero-filling it.
    pub allow_nil: bool,
}

impl AttributeDecl {
    pub fn new(name: impl Into<String>, target: TargetType) -> Self {
        Self {
            name: name.into(),
            target,
            default: DefaultValue::None,
            allow_nil: false,
        }
    }

    /// Declare a fixed default.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = DefaultValue::Value(value.into());
        self
    }

    /// Declare a default computed at every build.
    pub fn default_with<F>(mut self, f: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.default = DefaultValue::Computed(Arc::new(f));
        self
    }

    pub fn allow_nil(mut self, allow: bool) -> Self {
        self.allow_nil = allow;
        self
    }
}

/// A named object type: its own attributes plus an optional parent whose
/// attributes it inherits.
#[derive(Debug, Clone)]
pub struct ObjectType {
    pub name: String,
    pub parent: Option<String>,
    pub attributes: Vec<AttributeDecl>,
}

impl ObjectType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            attributes: Vec::new(),
        }
    }

    /// Inherit every attribute of `parent`. Attributes declared here with the
    /// same name override the parent's.
    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn attribute(mut self, decl: AttributeDecl) -> Self {
        self.attributes.push(decl);
        self
    }
}
