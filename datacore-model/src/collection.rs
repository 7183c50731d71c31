//! Ordered, keyed, single-element-type container.
//!
//! Elements are stored in an insertion-ordered map. Keys are either supplied
//! by the caller or assigned from an auto-increment counter that sits one past
//! the largest integer key seen since the last [`Collection::clear`], or at 0
//! before any integer key was seen. A negative first key `n` makes the
//! counter continue at `n + 1`. Every insertion checks the element against
//! the collection's declared element type and leaves the store untouched on
//! rejection.

use crate::record::{Extensible, Extensions, Struct};
use datacore_types::{Error, Key, Result};
use indexmap::IndexMap;
use serde_json::Value;
use std::any::Any;
use std::cmp::Ordering;
use std::fmt;

/// A value that can live in a [`Collection`].
pub trait Element: Clone + fmt::Debug {
    /// Tag compared against the collection's declared element type.
    fn element_type(&self) -> &str;

    /// Membership predicate; exact tag match unless the element knows a
    /// richer is-a relation.
    fn is_instance_of(&self, expected: &str) -> bool {
        self.element_type() == expected
    }

    /// The record view used for JSON serialization, if the element has one.
    fn as_struct(&self) -> Option<&dyn Struct> {
        None
    }
}

#[derive(Debug, Clone)]
pub struct Collection<T: Element> {
    name: String,
    element_type: String,
    elements: IndexMap<Key, T>,
    /// `None` until the first integer key.
    next_index: Option<i64>,
    extensions: Extensions,
}

impl<T: Element> Collection<T> {
    /// Creates an empty collection named `<element_type>_collection`.
    #[must_use]
    pub fn new(element_type: impl Into<String>) -> Self {
        let element_type = element_type.into();
        Self::named(format!("{element_type}_collection"), element_type)
    }

    /// Creates an empty collection with an explicit collection type tag.
    #[must_use]
    pub fn named(name: impl Into<String>, element_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            element_type: element_type.into(),
            elements: IndexMap::new(),
            next_index: None,
            extensions: Extensions::new(),
        }
    }

    /// Builds a collection from a plain list; keys are `0..n`.
    pub fn from_elements<I>(element_type: impl Into<String>, elements: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
    {
        let mut collection = Self::new(element_type);
        for element in elements {
            collection.add(element)?;
        }
        Ok(collection)
    }

    /// Builds a collection from key/element pairs, keeping the keys.
    pub fn from_keyed<I, K>(element_type: impl Into<String>, elements: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, T)>,
        K: Into<Key>,
    {
        let mut collection = Self::new(element_type);
        for (key, element) in elements {
            let key: Key = key.into();
            collection.set(key, element)?;
        }
        Ok(collection)
    }

    /// Collection type tag.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The element type every member must satisfy.
    pub fn element_type(&self) -> &str {
        &self.element_type
    }

    pub(crate) fn validate(&self, element: &T) -> Result<()> {
        if element.is_instance_of(&self.element_type) {
            Ok(())
        } else {
            Err(Error::TypeMismatch {
                expected: self.element_type.clone(),
                actual: element.element_type().to_string(),
            })
        }
    }

    fn bump_index(&mut self, key: &Key) {
        if let Key::Index(i) = key {
            let candidate = i.saturating_add(1);
            self.next_index = Some(self.next_index.map_or(candidate, |n| n.max(candidate)));
        }
    }

    /// Appends the element under the next integer key.
    ///
    /// Fails when that key is already taken, which only happens once the
    /// counter has reached `i64::MAX`.
    pub fn add(&mut self, element: T) -> Result<()> {
        self.validate(&element)?;
        let key = Key::Index(self.next_index.unwrap_or(0));
        if self.elements.contains_key(&key) {
            return Err(Error::InvalidArgument(format!(
                "cannot add element to {}: the next key {key} is already occupied",
                self.name
            )));
        }
        self.bump_index(&key);
        self.elements.insert(key, element);
        Ok(())
    }

    /// Inserts or overwrites the element at `key`; `None` behaves like [`add`](Self::add).
    ///
    /// Overwriting keeps the key's original position.
    pub fn set(&mut self, key: impl Into<Option<Key>>, element: T) -> Result<()> {
        let Some(key) = key.into() else {
            return self.add(element);
        };
        self.validate(&element)?;
        self.bump_index(&key);
        self.elements.insert(key, element);
        Ok(())
    }

    pub fn get(&self, key: impl Into<Key>) -> Option<&T> {
        self.elements.get(&key.into())
    }

    pub fn get_mut(&mut self, key: impl Into<Key>) -> Option<&mut T> {
        self.elements.get_mut(&key.into())
    }

    pub fn has(&self, key: impl Into<Key>) -> bool {
        self.elements.contains_key(&key.into())
    }

    /// Removes the element at `key`, preserving the order of the rest.
    pub fn remove(&mut self, key: impl Into<Key>) -> Option<T> {
        self.elements.shift_remove(&key.into())
    }

    /// Removes every element and resets the auto-increment counter.
    pub fn clear(&mut self) {
        self.elements.clear();
        self.next_index = None;
    }

    pub fn count(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.elements.keys()
    }

    /// Keys in insertion order.
    pub fn get_keys(&self) -> Vec<Key> {
        self.elements.keys().cloned().collect()
    }

    /// Read-only view of the store, in insertion order.
    pub fn elements(&self) -> &IndexMap<Key, T> {
        &self.elements
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.elements.values()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, Key, T> {
        self.elements.iter()
    }

    /// First element by iteration order.
    pub fn first(&self) -> Option<&T> {
        self.elements.first().map(|(_, element)| element)
    }

    /// Last element by iteration order.
    pub fn last(&self) -> Option<&T> {
        self.elements.last().map(|(_, element)| element)
    }

    /// Removes and returns every element in order, resetting the key counter.
    pub(crate) fn drain_values(&mut self) -> Vec<T> {
        self.next_index = None;
        std::mem::take(&mut self.elements).into_values().collect()
    }

    /// Empty collection of the same type tags, used by the derived constructors.
    fn empty_like(&self) -> Self {
        Self::named(self.name.clone(), self.element_type.clone())
    }

    fn push_unchecked(&mut self, key: Key, element: T) {
        self.bump_index(&key);
        self.elements.insert(key, element);
    }

    /// New collection of the elements matching `predicate`, keys preserved.
    #[must_use]
    pub fn filter(&self, mut predicate: impl FnMut(&T) -> bool) -> Self {
        let mut filtered = self.empty_like();
        for (key, element) in &self.elements {
            if predicate(element) {
                filtered.push_unchecked(key.clone(), element.clone());
            }
        }
        filtered
    }

    /// New collection over a positional range, keys preserved.
    ///
    /// A negative `offset` counts from the end. `length` of `None` runs to
    /// the end; a negative `length` stops that many elements before the end.
    #[must_use]
    pub fn slice(&self, offset: i64, length: Option<i64>) -> Self {
        let count = i64::try_from(self.elements.len()).unwrap_or(i64::MAX);
        let start = if offset < 0 {
            (count + offset).max(0)
        } else {
            offset.min(count)
        };
        let end = match length {
            None => count,
            Some(len) if len < 0 => (count + len).max(start),
            Some(len) => start.saturating_add(len).min(count),
        };

        let mut sliced = self.empty_like();
        let (start, end) = (start as usize, end as usize);
        for (key, element) in self.elements.iter().skip(start).take(end - start) {
            sliced.push_unchecked(key.clone(), element.clone());
        }
        sliced
    }

    /// Stable, key-preserving, in-place sort.
    pub fn sort(&mut self, mut compare: impl FnMut(&T, &T) -> Ordering) {
        self.elements.sort_by(|_, a, _, b| compare(a, b));
    }

    /// One output per element, keyed like the input.
    pub fn map<R>(&self, mut f: impl FnMut(&T) -> R) -> IndexMap<Key, R> {
        self.elements
            .iter()
            .map(|(key, element)| (key.clone(), f(element)))
            .collect()
    }

    /// Like [`map`](Self::map), dropping elements whose output is `None`.
    pub fn fmap<R>(&self, mut f: impl FnMut(&T) -> Option<R>) -> IndexMap<Key, R> {
        self.elements
            .iter()
            .filter_map(|(key, element)| f(element).map(|out| (key.clone(), out)))
            .collect()
    }

    /// Left fold in iteration order.
    pub fn reduce<A>(&self, f: impl FnMut(A, &T) -> A, initial: A) -> A {
        self.elements.values().fold(initial, f)
    }

    /// Reinterprets the collection under new type tags without copying elements.
    ///
    /// Every element must satisfy the new element type.
    pub fn create_from(
        name: impl Into<String>,
        element_type: impl Into<String>,
        source: Self,
    ) -> Result<Self> {
        let name = name.into();
        let element_type = element_type.into();
        if let Some(stray) = source
            .elements
            .values()
            .find(|element| !element.is_instance_of(&element_type))
        {
            return Err(Error::Construction {
                target: name,
                reason: format!(
                    "element of type {} is not a {element_type}",
                    stray.element_type()
                ),
            });
        }

        Ok(Self {
            name,
            element_type,
            elements: source.elements,
            next_index: source.next_index,
            extensions: source.extensions,
        })
    }
}

impl<T: Element> PartialEq for Collection<T>
where
    T: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.element_type == other.element_type
            && self.elements.len() == other.elements.len()
            && self.elements.iter().eq(other.elements.iter())
            && self.extensions == other.extensions
    }
}

impl<'a, T: Element> IntoIterator for &'a Collection<T> {
    type Item = (&'a Key, &'a T);
    type IntoIter = indexmap::map::Iter<'a, Key, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl<T: Element> IntoIterator for Collection<T> {
    type Item = (Key, T);
    type IntoIter = indexmap::map::IntoIter<Key, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}

impl<T: Element + Send + Sync + 'static> Struct for Collection<T> {
    fn type_tag(&self) -> &str {
        &self.name
    }

    /// Dense array of each element's serialization (`null` for elements that
    /// are not records); keys are discarded.
    fn json_serialize(&self) -> Value {
        Value::Array(
            self.elements
                .values()
                .map(|element| {
                    element
                        .as_struct()
                        .map_or(Value::Null, |record| record.json_serialize())
                })
                .collect(),
        )
    }

    fn clone_struct(&self) -> Box<dyn Struct> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<T: Element> Extensible for Collection<T> {
    fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }
}
