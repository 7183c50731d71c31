//! The record base: identity, JSON serialization and extension slots.
//!
//! Every entity, collection and schema item is a [`Struct`]. Records that can
//! carry ad-hoc child records implement [`Extensible`], which is backed by an
//! [`Extensions`] side table owned by the host record.

use crate::FieldValue;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::any::Any;
use std::fmt;

/// A record that can be serialized to plain JSON and identified by type.
pub trait Struct: Any + fmt::Debug + Send + Sync {
    /// Concrete type tag, compared exactly by [`Extensible::get_extension_of_type`].
    fn type_tag(&self) -> &str;

    /// Identity string, if the record has one.
    fn id(&self) -> Option<&str> {
        None
    }

    /// Plain JSON rendering of every field.
    ///
    /// Timestamps render as RFC 3339 extended strings and nested records are
    /// serialized recursively. Cyclic graphs are not detected.
    fn json_serialize(&self) -> Value;

    fn clone_struct(&self) -> Box<dyn Struct>;

    fn as_any(&self) -> &dyn Any;
}

impl Clone for Box<dyn Struct> {
    fn clone(&self) -> Self {
        self.clone_struct()
    }
}

/// Named child records attached to a host record.
#[derive(Debug, Clone, Default)]
pub struct Extensions(IndexMap<String, Box<dyn Struct>>);

impl Extensions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or silently replaces the extension stored under `name`.
    pub fn insert(&mut self, name: impl Into<String>, extension: Box<dyn Struct>) {
        self.0.insert(name.into(), extension);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Struct> {
        self.0.get(name).map(Box::as_ref)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Removes the extension; absent names are a no-op.
    pub fn remove(&mut self, name: &str) -> Option<Box<dyn Struct>> {
        self.0.shift_remove(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn Struct)> {
        self.0.iter().map(|(name, ext)| (name.as_str(), ext.as_ref()))
    }

    /// Object of extension name to serialized extension.
    pub fn json_serialize(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(name, ext)| (name.clone(), ext.json_serialize()))
                .collect(),
        )
    }
}

impl PartialEq for Extensions {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len()
            && self.0.iter().zip(other.0.iter()).all(|((n1, e1), (n2, e2))| {
                n1 == n2
                    && e1.type_tag() == e2.type_tag()
                    && e1.json_serialize() == e2.json_serialize()
            })
    }
}

impl FromIterator<(String, Box<dyn Struct>)> for Extensions {
    fn from_iter<I: IntoIterator<Item = (String, Box<dyn Struct>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Extension management shared by every record that owns an [`Extensions`] table.
pub trait Extensible {
    fn extensions(&self) -> &Extensions;

    fn extensions_mut(&mut self) -> &mut Extensions;

    /// Attaches a child record, replacing any extension with the same name.
    fn add_extension<S: Struct>(&mut self, name: impl Into<String>, extension: S)
    where
        Self: Sized,
    {
        self.extensions_mut().insert(name, Box::new(extension));
    }

    /// Attaches every record-valued entry; plain JSON values and timestamps
    /// are skipped without error.
    fn add_extensions<I, K>(&mut self, extensions: I)
    where
        Self: Sized,
        I: IntoIterator<Item = (K, FieldValue)>,
        K: Into<String>,
    {
        for (name, value) in extensions {
            if let Some(record) = value.into_struct() {
                self.extensions_mut().insert(name, record);
            }
        }
    }

    fn get_extension(&self, name: &str) -> Option<&dyn Struct> {
        self.extensions().get(name)
    }

    /// Returns the extension only when its type tag is exactly `type_tag`.
    fn get_extension_of_type(&self, name: &str, type_tag: &str) -> Option<&dyn Struct> {
        self.get_extension(name).filter(|ext| ext.type_tag() == type_tag)
    }

    /// Downcasts the extension to a concrete Rust type.
    fn get_extension_as<T: Struct>(&self, name: &str) -> Option<&T>
    where
        Self: Sized,
    {
        self.get_extension(name)?.as_any().downcast_ref::<T>()
    }

    fn has_extension(&self, name: &str) -> bool {
        self.extensions().contains(name)
    }

    fn has_extension_of_type(&self, name: &str, type_tag: &str) -> bool {
        self.get_extension_of_type(name, type_tag).is_some()
    }

    fn remove_extension(&mut self, name: &str) {
        self.extensions_mut().remove(name);
    }

    fn get_extensions(&self) -> &Extensions {
        self.extensions()
    }

    /// Replaces the whole extension table.
    fn set_extensions(&mut self, extensions: Extensions) {
        *self.extensions_mut() = extensions;
    }
}

/// A generic record backed by a JSON object.
///
/// Used for extension data that has no dedicated type, such as the
/// `extensions` object of an API payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArrayStruct {
    data: Map<String, Value>,
    extensions: Extensions,
}

impl ArrayStruct {
    pub const TYPE_TAG: &'static str = "array_struct";

    #[must_use]
    pub fn new(data: Map<String, Value>) -> Self {
        Self {
            data,
            extensions: Extensions::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.data.insert(key.into(), value);
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn into_data(self) -> Map<String, Value> {
        self.data
    }
}

impl Struct for ArrayStruct {
    fn type_tag(&self) -> &str {
        Self::TYPE_TAG
    }

    fn id(&self) -> Option<&str> {
        self.data.get("id").and_then(Value::as_str)
    }

    fn json_serialize(&self) -> Value {
        let mut out = self.data.clone();
        if !self.extensions.is_empty() {
            out.insert("extensions".into(), self.extensions.json_serialize());
        }
        Value::Object(out)
    }

    fn clone_struct(&self) -> Box<dyn Struct> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Extensible for ArrayStruct {
    fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }
}
