//! # Typed List
//!
//! An ordered, mutable container bound to one item type. Every path that
//! puts a value into the list coerces it first: construction, `push`,
//! `push_all`, `concat`, `replace`, `insert`, `set`. Removal and reads
//! never coerce.
//!
//! Bulk operations (`push_all`, `concat`, `replace`) are all-or-nothing: if
//! any element fails to coerce the list is left unchanged.
//!
//! There is no `&mut` access to elements, so a stored element can only
//! change through `set` (which coerces) or through the `ObjectMut` /
//! `ListMut` handles of `object_mut` / `list_mut`, which expose only
//! coercing mutators.

use std::fmt;
use std::ops::Index;
use std::sync::Arc;

use attrs_core::CoercionError;

use crate::coerce::coerce;
use crate::handle::{ListMut, ObjectMut};
use crate::registry::TypeRegistry;
use crate::types::TargetType;
use crate::value::Value;

/// A list whose elements are all coerced to `item`.
#[derive(Clone)]
pub struct TypedList {
    item: TargetType,
    registry: Arc<TypeRegistry>,
    items: Vec<Value>,
}

impl TypedList {
    /// Build a list, coercing every element of `items`.
    ///
    /// # Errors
    ///
    /// The first element failure, with its index in the error path.
    pub fn new(
        registry: &Arc<TypeRegistry>,
        item: TargetType,
        items: impl IntoIterator<Item = impl Into<Value>>,
    ) -> Result<Self, CoercionError> {
        let items = coerce_all(registry, &item, 0, items)?;
        tracing::trace!(item = %item, len = items.len(), "typed list built");
        Ok(Self {
            item,
            registry: Arc::clone(registry),
            items,
        })
    }

    pub fn empty(registry: &Arc<TypeRegistry>, item: TargetType) -> Self {
        Self {
            item,
            registry: Arc::clone(registry),
            items: Vec::new(),
        }
    }

    /// The declared element type.
    pub fn item_type(&self) -> &TargetType {
        &self.item
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    pub fn first(&self) -> Option<&Value> {
        self.items.first()
    }

    pub fn last(&self) -> Option<&Value> {
        self.items.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.items
    }

    /// Consume the list, returning its coerced elements.
    pub fn into_items(self) -> Vec<Value> {
        self.items
    }

    /// Coerce `value` and append it.
    pub fn push(&mut self, value: impl Into<Value>) -> Result<(), CoercionError> {
        let index = self.items.len();
        let coerced = self.coerce_at(index, value.into())?;
        tracing::trace!(index, "typed list push");
        self.items.push(coerced);
        Ok(())
    }

    /// Coerce every value and append them in order. All-or-nothing.
    pub fn push_all(
        &mut self,
        values: impl IntoIterator<Item = impl Into<Value>>,
    ) -> Result<(), CoercionError> {
        let coerced = coerce_all(&self.registry, &self.item, self.items.len(), values)?;
        tracing::trace!(added = coerced.len(), "typed list push_all");
        self.items.extend(coerced);
        Ok(())
    }

    /// Append clones of `values`, coercing each. All-or-nothing.
    pub fn concat(&mut self, values: &[Value]) -> Result<(), CoercionError> {
        self.push_all(values.iter().cloned())
    }

    /// Replace the entire contents with coerced `values`. All-or-nothing.
    pub fn replace(
        &mut self,
        values: impl IntoIterator<Item = impl Into<Value>>,
    ) -> Result<(), CoercionError> {
        let coerced = coerce_all(&self.registry, &self.item, 0, values)?;
        tracing::trace!(len = coerced.len(), "typed list replace");
        self.items = coerced;
        Ok(())
    }

    /// Coerce `value` and insert it at `index`, shifting later elements.
    ///
    /// # Errors
    ///
    /// `IndexOutOfBounds` when `index > len`.
    pub fn insert(&mut self, index: usize, value: impl Into<Value>) -> Result<(), CoercionError> {
        if index > self.items.len() {
            return Err(CoercionError::IndexOutOfBounds {
                index,
                len: self.items.len(),
            });
        }
        let coerced = self.coerce_at(index, value.into())?;
        tracing::trace!(index, "typed list insert");
        self.items.insert(index, coerced);
        Ok(())
    }

    /// Coerce `value` and overwrite the element at `index`.
    ///
    /// # Errors
    ///
    /// `IndexOutOfBounds` when `index >= len`.
    pub fn set(&mut self, index: usize, value: impl Into<Value>) -> Result<(), CoercionError> {
        if index >= self.items.len() {
            return Err(CoercionError::IndexOutOfBounds {
                index,
                len: self.items.len(),
            });
        }
        let coerced = self.coerce_at(index, value.into())?;
        tracing::trace!(index, "typed list set");
        self.items[index] = coerced;
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Option<Value> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    pub fn pop(&mut self) -> Option<Value> {
        self.items.pop()
    }

    pub fn truncate(&mut self, len: usize) {
        self.items.truncate(len);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Coercing handle to an object element.
    pub fn object_mut(&mut self, index: usize) -> Option<ObjectMut<'_>> {
        self.items
            .get_mut(index)
            .and_then(Value::as_object_mut)
            .map(ObjectMut::new)
    }

    /// Coercing handle to a nested typed-list element.
    pub fn list_mut(&mut self, index: usize) -> Option<ListMut<'_>> {
        self.items
            .get_mut(index)
            .and_then(Value::as_container_mut)
            .map(ListMut::new)
    }

    /// Plain list of flattened elements.
    pub fn flatten(&self) -> Vec<Value> {
        self.items.iter().map(Value::flattened).collect()
    }

    fn coerce_at(&self, index: usize, value: Value) -> Result<Value, CoercionError> {
        coerce(&self.registry, &self.item, value).map_err(|e| e.at_index(index))
    }
}

fn coerce_all(
    registry: &Arc<TypeRegistry>,
    item: &TargetType,
    offset: usize,
    values: impl IntoIterator<Item = impl Into<Value>>,
) -> Result<Vec<Value>, CoercionError> {
    values
        .into_iter()
        .enumerate()
        .map(|(i, v)| coerce(registry, item, v.into()).map_err(|e| e.at_index(offset + i)))
        .collect()
}

impl PartialEq for TypedList {
    fn eq(&self, other: &Self) -> bool {
        self.item == other.item && self.items == other.items
    }
}

impl fmt::Debug for TypedList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedList")
            .field("item", &self.item)
            .field("items", &self.items)
            .finish()
    }
}

impl Index<usize> for TypedList {
    type Output = Value;

    fn index(&self, index: usize) -> &Value {
        &self.items[index]
    }
}

impl<'a> IntoIterator for &'a TypedList {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AttributeDecl, ObjectType};
    use serde_json::json;

    fn registry() -> Arc<TypeRegistry> {
        TypeRegistry::builder()
            .register(
                ObjectType::new("Address")
                    .attribute(AttributeDecl::new("street", TargetType::string()))
                    .attribute(AttributeDecl::new("number", TargetType::integer())),
            )
            .build()
            .unwrap()
    }

    fn ints(r: &Arc<TypeRegistry>) -> TypedList {
        TypedList::new(r, TargetType::integer(), ["1", "2"]).unwrap()
    }

    #[test]
    fn test_construction_coerces() {
        let r = registry();
        let list = ints(&r);
        assert_eq!(list.as_slice(), &[Value::from(1), Value::from(2)]);
        assert_eq!(list.item_type(), &TargetType::integer());
    }

    #[test]
    fn test_push_coerces_maps_into_objects() {
        let r = registry();
        let mut list = TypedList::empty(&r, TargetType::object("Address"));
        list.push(Value::from(json!({"street": "Main", "number": "12"})))
            .unwrap();
        let address = list[0].as_object().unwrap();
        assert_eq!(address.type_name(), "Address");
        assert_eq!(address.get("number").unwrap().as_i64(), Some(12));
    }

    #[test]
    fn test_push_all_is_all_or_nothing() {
        let r = registry();
        let mut list = ints(&r);
        let err = list.push_all(["3", "four", "5"]).unwrap_err();
        assert_eq!(err.path(), Some("[3]"));
        assert_eq!(list.len(), 2);

        list.push_all(["3", "4"]).unwrap();
        assert_eq!(list.last(), Some(&Value::from(4)));
    }

    #[test]
    fn test_concat_coerces_clones() {
        let r = registry();
        let mut list = ints(&r);
        let extra = vec![Value::from("7"), Value::from(8.9)];
        list.concat(&extra).unwrap();
        assert_eq!(list.len(), 4);
        assert_eq!(list[2], Value::from(7));
        assert_eq!(list[3], Value::from(8));
        assert_eq!(extra[0], Value::from("7"));
    }

    #[test]
    fn test_replace_is_all_or_nothing() {
        let r = registry();
        let mut list = ints(&r);
        assert!(list.replace(["x"]).is_err());
        assert_eq!(list.len(), 2);
        list.replace(["10"]).unwrap();
        assert_eq!(list.as_slice(), &[Value::from(10)]);
    }

    #[test]
    fn test_insert_and_set_coerce() {
        let r = registry();
        let mut list = ints(&r);
        list.insert(0, "0").unwrap();
        list.set(2, "20").unwrap();
        assert_eq!(
            list.as_slice(),
            &[Value::from(0), Value::from(1), Value::from(20)]
        );
    }

    #[test]
    fn test_out_of_bounds_positions() {
        let r = registry();
        let mut list = ints(&r);
        assert_eq!(
            list.insert(5, "1").unwrap_err(),
            CoercionError::IndexOutOfBounds { index: 5, len: 2 }
        );
        assert_eq!(
            list.set(2, "1").unwrap_err(),
            CoercionError::IndexOutOfBounds { index: 2, len: 2 }
        );
        assert!(list.remove(9).is_none());
    }

    #[test]
    fn test_set_failure_leaves_element() {
        let r = registry();
        let mut list = ints(&r);
        let err = list.set(1, "nope").unwrap_err();
        assert_eq!(err.path(), Some("[1]"));
        assert_eq!(list[1], Value::from(2));
    }

    #[test]
    fn test_removal_does_not_coerce() {
        let r = registry();
        let mut list = ints(&r);
        assert_eq!(list.pop(), Some(Value::from(2)));
        assert_eq!(list.remove(0), Some(Value::from(1)));
        assert!(list.is_empty());
        list.push_all([1, 2, 3]).unwrap();
        list.truncate(1);
        assert_eq!(list.len(), 1);
        list.clear();
        assert!(list.first().is_none());
    }

    #[test]
    fn test_object_mut_edits_through_instance() {
        let r = registry();
        let mut list = TypedList::new(
            &r,
            TargetType::object("Address"),
            [Value::from(json!({"street": "Main"}))],
        )
        .unwrap();
        list.object_mut(0).unwrap().set("number", "42").unwrap();
        assert_eq!(list.flatten(), vec![Value::from(json!({"street": "Main", "number": 42}))]);
        assert!(list.list_mut(0).is_none());
    }

    #[test]
    fn test_nested_lists() {
        let r = registry();
        let item = TargetType::list_of(TargetType::integer());
        let mut grid = TypedList::new(&r, item, [Value::list(["1", "2"])]).unwrap();
        grid.list_mut(0).unwrap().push("3").unwrap();
        assert_eq!(grid.flatten(), vec![Value::list([1, 2, 3])]);
    }

    #[test]
    fn test_iteration() {
        let r = registry();
        let list = ints(&r);
        let total: i64 = (&list).into_iter().filter_map(Value::as_i64).sum();
        assert_eq!(total, 3);
        assert_eq!(list.iter().count(), 2);
    }
}
