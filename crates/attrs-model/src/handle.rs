//! # Mutable Handles to Nested Values
//!
//! `ObjectMut` and `ListMut` are the only mutable access to an object or a
//! typed list held inside another instance or list. Both deref to the held
//! value for reads, but neither implements `DerefMut`: the slot can change
//! only through the forwarded mutators, each of which coerces. Replacing the
//! held value wholesale is therefore impossible:
//!
//! ```compile_fail
//! # use attrs_model::{AttributeDecl, Instance, ObjectType, TargetType, TypeRegistry};
//! # use serde_json::json;
//! # let r = TypeRegistry::builder()
//! #     .register(ObjectType::new("City").attribute(AttributeDecl::new("name", TargetType::string())))
//! #     .register(ObjectType::new("Address").attribute(AttributeDecl::new("city", TargetType::object("City"))))
//! #     .build().unwrap();
//! let mut address = Instance::build(&r, "Address", json!({"city": {}})).unwrap();
//! let other = Instance::build(&r, "Address", json!({})).unwrap();
//! *address.object_mut("city").unwrap() = other;
//! ```
//!
//! ```compile_fail
//! # use attrs_model::{AttributeDecl, Instance, ObjectType, TargetType, TypeRegistry, TypedList};
//! # use serde_json::json;
//! # let r = TypeRegistry::builder()
//! #     .register(ObjectType::new("Bag").attribute(AttributeDecl::new("tags", TargetType::list_of(TargetType::symbol()))))
//! #     .build().unwrap();
//! let mut bag = Instance::build(&r, "Bag", json!({})).unwrap();
//! *bag.list_mut("tags").unwrap() = TypedList::new(&r, TargetType::integer(), [1]).unwrap();
//! ```

use std::ops::Deref;

use attrs_core::CoercionError;

use crate::instance::Instance;
use crate::list::TypedList;
use crate::value::Value;

/// Coercing mutable access to a nested [`Instance`].
#[derive(Debug)]
pub struct ObjectMut<'a> {
    inner: &'a mut Instance,
}

impl<'a> ObjectMut<'a> {
    pub(crate) fn new(inner: &'a mut Instance) -> Self {
        Self { inner }
    }

    /// See [`Instance::set`].
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), CoercionError> {
        self.inner.set(name, value)
    }

    /// See [`Instance::assign`].
    pub fn assign(&mut self, mapping: impl Into<Value>) -> Result<(), CoercionError> {
        self.inner.assign(mapping)
    }

    /// See [`Instance::replace_attributes`].
    pub fn replace_attributes(&mut self, mapping: impl Into<Value>) -> Result<(), CoercionError> {
        self.inner.replace_attributes(mapping)
    }

    /// See [`Instance::reset`].
    pub fn reset(&mut self, name: &str) -> Result<(), CoercionError> {
        self.inner.reset(name)
    }

    pub fn object_mut(&mut self, name: &str) -> Option<ObjectMut<'_>> {
        self.inner.object_mut(name)
    }

    pub fn list_mut(&mut self, name: &str) -> Option<ListMut<'_>> {
        self.inner.list_mut(name)
    }

    /// Like [`object_mut`](Self::object_mut), keeping the full borrow.
    pub fn into_object_mut(self, name: &str) -> Option<ObjectMut<'a>> {
        let inner = self.inner;
        inner.object_mut(name)
    }

    /// Like [`list_mut`](Self::list_mut), keeping the full borrow.
    pub fn into_list_mut(self, name: &str) -> Option<ListMut<'a>> {
        let inner = self.inner;
        inner.list_mut(name)
    }
}

impl Deref for ObjectMut<'_> {
    type Target = Instance;

    fn deref(&self) -> &Instance {
        &*self.inner
    }
}

/// Coercing mutable access to a nested [`TypedList`].
#[derive(Debug)]
pub struct ListMut<'a> {
    inner: &'a mut TypedList,
}

impl<'a> ListMut<'a> {
    pub(crate) fn new(inner: &'a mut TypedList) -> Self {
        Self { inner }
    }

    pub fn push(&mut self, value: impl Into<Value>) -> Result<(), CoercionError> {
        self.inner.push(value)
    }

    pub fn push_all(
        &mut self,
        values: impl IntoIterator<Item = impl Into<Value>>,
    ) -> Result<(), CoercionError> {
        self.inner.push_all(values)
    }

    pub fn concat(&mut self, values: &[Value]) -> Result<(), CoercionError> {
        self.inner.concat(values)
    }

    pub fn replace(
        &mut self,
        values: impl IntoIterator<Item = impl Into<Value>>,
    ) -> Result<(), CoercionError> {
        self.inner.replace(values)
    }

    pub fn insert(&mut self, index: usize, value: impl Into<Value>) -> Result<(), CoercionError> {
        self.inner.insert(index, value)
    }

    pub fn set(&mut self, index: usize, value: impl Into<Value>) -> Result<(), CoercionError> {
        self.inner.set(index, value)
    }

    pub fn remove(&mut self, index: usize) -> Option<Value> {
        self.inner.remove(index)
    }

    pub fn pop(&mut self) -> Option<Value> {
        self.inner.pop()
    }

    pub fn truncate(&mut self, len: usize) {
        self.inner.truncate(len);
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    pub fn object_mut(&mut self, index: usize) -> Option<ObjectMut<'_>> {
        self.inner.object_mut(index)
    }

    pub fn list_mut(&mut self, index: usize) -> Option<ListMut<'_>> {
        self.inner.list_mut(index)
    }

    /// Like [`object_mut`](Self::object_mut), keeping the full borrow.
    pub fn into_object_mut(self, index: usize) -> Option<ObjectMut<'a>> {
        let inner = self.inner;
        inner.object_mut(index)
    }

    /// Like [`list_mut`](Self::list_mut), keeping the full borrow.
    pub fn into_list_mut(self, index: usize) -> Option<ListMut<'a>> {
        let inner = self.inner;
        inner.list_mut(index)
    }
}

impl Deref for ListMut<'_> {
    type Target = TypedList;

    fn deref(&self) -> &TypedList {
        &*self.inner
    }
}
