//! # Attribute Store
//!
//! Per-instance storage of coerced attribute values, keyed by name in
//! declaration order. The store itself never coerces; writes go through
//! [`Instance`](crate::Instance), which coerces before inserting.

use indexmap::IndexMap;

use crate::value::Value;

/// Coerced attribute values of one instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeStore {
    values: IndexMap<String, Value>,
}

impl AttributeStore {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            values: IndexMap::with_capacity(capacity),
        }
    }

    /// The stored value for `name`, or `None` if the name was never set.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.values.iter()
    }

    /// Insert an already-coerced value. Replacing keeps the original
    /// position.
    pub(crate) fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.values.get_mut(name)
    }
}
