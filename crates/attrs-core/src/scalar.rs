//! # Scalar Values
//!
//! `Scalar` is the leaf of every attribute value: the thing a primitive
//! attribute holds after coercion, and the leaf of every flattened mapping.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Serialize, Serializer};

use crate::temporal;

/// A single primitive value.
///
/// `Symbol` is an interned-name style string that flattens to plain text.
/// `Date` and `DateTime` flatten to ISO 8601 text.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Absent value.
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed 64-bit integer.
    Integer(i64),
    /// 64-bit float.
    Float(f64),
    /// UTF-8 text.
    String(String),
    /// Symbolic name (enum-of-string).
    Symbol(String),
    /// Calendar date.
    Date(NaiveDate),
    /// Instant in UTC.
    DateTime(DateTime<Utc>),
}

impl Scalar {
    /// Short name of the value's kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Symbol(_) => "symbol",
            Self::Date(_) => "date",
            Self::DateTime(_) => "datetime",
        }
    }

    /// Whether this is the absent value.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Text of a string or symbol.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// Convert to the equivalent JSON value.
    ///
    /// Non-finite floats have no JSON representation and become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Integer(n) => serde_json::Value::from(*n),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Self::String(s) | Self::Symbol(s) => serde_json::Value::String(s.clone()),
            Self::Date(d) => serde_json::Value::String(temporal::format_date(d)),
            Self::DateTime(dt) => serde_json::Value::String(temporal::format_datetime(dt)),
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Integer(n) => serializer.serialize_i64(*n),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::String(s) | Self::Symbol(s) => serializer.serialize_str(s),
            Self::Date(d) => serializer.serialize_str(&temporal::format_date(d)),
            Self::DateTime(dt) => serializer.serialize_str(&temporal::format_datetime(dt)),
        }
    }
}

impl std::fmt::Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) | Self::Symbol(s) => f.write_str(s),
            Self::Date(d) => f.write_str(&temporal::format_date(d)),
            Self::DateTime(dt) => f.write_str(&temporal::format_datetime(dt)),
        }
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<i32> for Scalar {
    fn from(n: i32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<f64> for Scalar {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<NaiveDate> for Scalar {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

impl From<DateTime<Utc>> for Scalar {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::DateTime(dt)
    }
}
