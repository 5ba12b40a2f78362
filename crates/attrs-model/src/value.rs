//! # Runtime Values
//!
//! `Value` is both the loosely-typed input to coercion and the typed result
//! stored in an instance. Raw input arrives as `Scalar`, `List` and `Map`;
//! coercion turns nested objects into `Object` and declared lists into
//! `Container`. Flattening turns them back into `Map` and `List`.

use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use attrs_core::Scalar;

use crate::instance::Instance;
use crate::list::TypedList;

/// A flattened attribute mapping, in declaration order.
pub type Attributes = IndexMap<String, Value>;

/// Any value that can be fed to, or held by, an attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A primitive value (including null).
    Scalar(Scalar),
    /// An untyped sequence.
    List(Vec<Value>),
    /// An untyped string-keyed mapping.
    Map(IndexMap<String, Value>),
    /// A materialized value object.
    Object(Instance),
    /// A typed list.
    Container(TypedList),
}

impl Value {
    /// The absent value.
    pub const NULL: Value = Value::Scalar(Scalar::Null);

    /// Build an untyped list.
    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Build an untyped mapping.
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Short name of the value's kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Scalar(s) => s.kind_name(),
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Object(_) => "object",
            Self::Container(_) => "typed list",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Scalar(Scalar::Null))
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Text of a string or symbol.
    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(Scalar::as_str)
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_scalar().and_then(Scalar::as_i64)
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_scalar().and_then(Scalar::as_f64)
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_scalar().and_then(Scalar::as_bool)
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        self.as_scalar().and_then(Scalar::as_date)
    }

    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        self.as_scalar().and_then(Scalar::as_datetime)
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Instance> {
        match self {
            Self::Object(instance) => Some(instance),
            _ => None,
        }
    }

    pub(crate) fn as_object_mut(&mut self) -> Option<&mut Instance> {
        match self {
            Self::Object(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn as_container(&self) -> Option<&TypedList> {
        match self {
            Self::Container(list) => Some(list),
            _ => None,
        }
    }

    pub(crate) fn as_container_mut(&mut self) -> Option<&mut TypedList> {
        match self {
            Self::Container(list) => Some(list),
            _ => None,
        }
    }

    /// Recursively replace objects with their attribute mappings and typed
    /// lists with plain lists. Scalars are cloned unchanged.
    pub fn flattened(&self) -> Value {
        match self {
            Self::Scalar(s) => Self::Scalar(s.clone()),
            Self::List(items) => Self::List(items.iter().map(Value::flattened).collect()),
            Self::Map(map) => Self::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.flattened()))
                    .collect(),
            ),
            Self::Object(instance) => Self::Map(instance.flatten()),
            Self::Container(list) => Self::List(list.flatten()),
        }
    }

    /// Convert to the equivalent flattened JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Scalar(s) => s.to_json(),
            Self::List(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
            Self::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            Self::Object(instance) => instance.to_json(),
            Self::Container(list) => {
                serde_json::Value::Array(list.iter().map(Value::to_json).collect())
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Scalar(s) => s.serialize(serializer),
            Self::List(items) => serializer.collect_seq(items),
            Self::Map(map) => serializer.collect_map(map),
            Self::Object(instance) => serializer.collect_map(instance.flatten()),
            Self::Container(list) => serializer.collect_seq(list.iter()),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::NULL
    }
}

impl From<Scalar> for Value {
    fn from(s: Scalar) -> Self {
        Self::Scalar(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Scalar(Scalar::Bool(b))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Scalar(Scalar::Integer(n))
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Scalar(Scalar::from(n))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Scalar(Scalar::Float(f))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Scalar(Scalar::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Scalar(Scalar::String(s))
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Self::Scalar(Scalar::Date(d))
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::Scalar(Scalar::DateTime(dt))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::NULL, Into::into)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(map: IndexMap<String, Value>) -> Self {
        Self::Map(map)
    }
}

impl From<Instance> for Value {
    fn from(instance: Instance) -> Self {
        Self::Object(instance)
    }
}

impl From<TypedList> for Value {
    fn from(list: TypedList) -> Self {
        Self::Container(list)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::NULL,
            serde_json::Value::Bool(b) => Self::from(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::from(i),
                None => Self::from(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Self::from(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Self::Map(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl TryFrom<serde_yaml::Value> for Value {
    type Error = String;

    /// Convert a YAML document tree. Tags are ignored; numeric and boolean
    /// map keys are stringified; other key types are rejected.
    fn try_from(yaml: serde_yaml::Value) -> Result<Self, Self::Error> {
        match yaml {
            serde_yaml::Value::Null => Ok(Self::NULL),
            serde_yaml::Value::Bool(b) => Ok(Self::from(b)),
            serde_yaml::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Self::from(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Self::from(f))
                } else {
                    Err(format!("unsupported YAML number: {n:?}"))
                }
            }
            serde_yaml::Value::String(s) => Ok(Self::from(s)),
            serde_yaml::Value::Sequence(seq) => seq
                .into_iter()
                .map(Value::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(Self::List),
            serde_yaml::Value::Mapping(mapping) => {
                let mut map = IndexMap::with_capacity(mapping.len());
                for (k, v) in mapping {
                    let key = match k {
                        serde_yaml::Value::String(s) => s,
                        serde_yaml::Value::Number(n) => n.to_string(),
                        serde_yaml::Value::Bool(b) => b.to_string(),
                        other => return Err(format!("unsupported YAML map key type: {other:?}")),
                    };
                    map.insert(key, Value::try_from(v)?);
                }
                Ok(Self::Map(map))
            }
            serde_yaml::Value::Tagged(tagged) => Value::try_from(tagged.value),
        }
    }
}
