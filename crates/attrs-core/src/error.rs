//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types used throughout the attribute layer. All errors
//! use `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Registry errors are configuration errors: they surface once, when the
//!   type registry is built, and name the offending type and attribute.
//! - Coercion errors carry the attribute path where they occurred
//!   (`address.city.size`, `addresses[1].street`).
//! - Primitive conversion failures always raise; there is no zero-value
//!   fallback path.

use thiserror::Error;

use crate::primitive::PrimitiveKind;

/// Top-level error type for the attribute layer.
#[derive(Error, Debug)]
pub enum AttrsError {
    /// Coercing a value into its declared type failed.
    #[error("coercion error: {0}")]
    Coercion(#[from] CoercionError),

    /// The type registry could not be built from its declarations.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Engine configuration could not be loaded.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Canonicalization of flattened state failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}

/// A primitive conversion that could not interpret its input.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("cannot coerce {found} into {target}: {reason}")]
pub struct ConversionError {
    /// The primitive kind that was requested.
    pub target: PrimitiveKind,
    /// Kind name of the input value (`"string"`, `"map"`, ...).
    pub found: &'static str,
    /// Human-readable reason.
    pub reason: String,
}

impl ConversionError {
    /// Create a conversion error.
    pub fn new(target: PrimitiveKind, found: &'static str, reason: impl Into<String>) -> Self {
        Self {
            target,
            found,
            reason: reason.into(),
        }
    }
}

/// Error while coercing a value into a declared target type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoercionError {
    /// A type name could not be found in the type registry. This is a
    /// configuration error and is never retried.
    #[error("cannot resolve type reference {0:?}")]
    UnresolvedType(String),

    /// No custom coercer is registered under the given name.
    #[error("no coercer registered under {0:?}")]
    UnresolvedCoercer(String),

    /// The attribute is not declared on the type.
    #[error("type {type_name} declares no attribute {name:?}")]
    UnknownAttribute {
        /// Type the lookup was made against.
        type_name: String,
        /// The undeclared attribute name.
        name: String,
    },

    /// A primitive conversion failed.
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// A positional list operation addressed a missing index.
    #[error("index {index} out of bounds for list of length {len}")]
    IndexOutOfBounds {
        /// Requested index.
        index: usize,
        /// Current list length.
        len: usize,
    },

    /// A custom coercer rejected its input.
    #[error("{0}")]
    Custom(String),

    /// A failure nested under an attribute path.
    #[error("at {path}: {source}")]
    Attribute {
        /// Dotted attribute path, with `[i]` for list positions.
        path: String,
        /// The underlying failure.
        source: Box<CoercionError>,
    },
}

impl CoercionError {
    /// Construct a custom coercer failure.
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }

    /// Prefix the error path with an attribute name.
    pub fn at(self, name: &str) -> Self {
        self.prefixed(name.to_string())
    }

    /// Prefix the error path with a list position.
    pub fn at_index(self, index: usize) -> Self {
        self.prefixed(format!("[{index}]"))
    }

    fn prefixed(self, segment: String) -> Self {
        match self {
            Self::Attribute { path, source } => {
                let path = if path.starts_with('[') {
                    format!("{segment}{path}")
                } else {
                    format!("{segment}.{path}")
                };
                Self::Attribute { path, source }
            }
            other => Self::Attribute {
                path: segment,
                source: Box::new(other),
            },
        }
    }

    /// The attribute path where the error occurred, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Attribute { path, .. } => Some(path),
            _ => None,
        }
    }

    /// The innermost error, with any path wrapping removed.
    pub fn root_cause(&self) -> &CoercionError {
        match self {
            Self::Attribute { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Whether this is a configuration error (unresolvable reference)
    /// rather than a failure caused by the input value.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self.root_cause(),
            Self::UnresolvedType(_) | Self::UnresolvedCoercer(_)
        )
    }
}

/// Error while building the type registry from declarations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Two types were registered under the same name.
    #[error("type {0:?} registered twice")]
    DuplicateType(String),

    /// A type declares the same attribute twice.
    #[error("type {type_name} declares attribute {name:?} twice")]
    DuplicateAttribute {
        /// Declaring type.
        type_name: String,
        /// Repeated attribute name.
        name: String,
    },

    /// A type extends a parent that was never registered.
    #[error("type {type_name} extends unknown type {parent:?}")]
    UnknownParent {
        /// Declaring type.
        type_name: String,
        /// Missing parent name.
        parent: String,
    },

    /// A type appears in its own ancestry.
    #[error("inheritance cycle through type {0:?}")]
    InheritanceCycle(String),

    /// An eagerly-referenced type was never registered.
    #[error("attribute {type_name}.{attribute} references unknown type {reference:?}")]
    UnknownType {
        /// Declaring type.
        type_name: String,
        /// Declaring attribute.
        attribute: String,
        /// Missing type name.
        reference: String,
    },

    /// A custom target names a coercer that was never registered.
    #[error("attribute {type_name}.{attribute} references unknown coercer {coercer:?}")]
    UnknownCoercer {
        /// Declaring type.
        type_name: String,
        /// Declaring attribute.
        attribute: String,
        /// Missing coercer name.
        coercer: String,
    },
}

/// Error loading engine configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// YAML configuration text was invalid.
    #[error("invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON configuration text was invalid.
    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conversion() -> CoercionError {
        CoercionError::Conversion(ConversionError::new(
            PrimitiveKind::Integer,
            "string",
            "not a number",
        ))
    }

    #[test]
    fn test_path_builds_outward() {
        let err = conversion().at("size").at("city").at("address");
        assert_eq!(err.path(), Some("address.city.size"));
    }

    #[test]
    fn test_path_with_list_index() {
        let err = conversion().at("street").at_index(1).at("addresses");
        assert_eq!(err.path(), Some("addresses[1].street"));
    }

    #[test]
    fn test_root_cause_unwraps_paths() {
        let err = conversion().at("size").at("city");
        assert_eq!(err.root_cause(), &conversion());
    }

    #[test]
    fn test_configuration_classification() {
        let err = CoercionError::UnresolvedType("Ghost".into()).at("ghost");
        assert!(err.is_configuration());
        assert!(!conversion().is_configuration());
    }

    #[test]
    fn test_display_includes_path_and_reason() {
        let err = conversion().at("size");
        let s = err.to_string();
        assert!(s.contains("at size"));
        assert!(s.contains("not a number"));
    }
}
