//! Id-oriented helpers for collections of entities.

use crate::{Collection, Entity, FieldValue};
use datacore_types::{Key, Result};

/// A [`Collection`] whose elements are entities.
pub type EntityCollection = Collection<Entity>;

impl Collection<Entity> {
    /// Ids of every element in order; elements without a non-empty id are
    /// skipped. `"0"` is a real id and is kept.
    pub fn get_ids(&self) -> Vec<String> {
        self.fmap(|entity| entity.id().filter(|id| !id.is_empty()).map(str::to_string))
            .into_values()
            .collect()
    }

    /// Elements whose `property` equals `value`. Unassigned properties compare
    /// as null.
    #[must_use]
    pub fn filter_by_property(&self, property: &str, value: &FieldValue) -> Self {
        self.filter(|entity| entity.get_property(property).unwrap_or(&FieldValue::NULL) == value)
    }

    /// Looks an element up by its id, first by key and then by scanning.
    pub fn get_by_id(&self, id: &str) -> Option<&Entity> {
        self.get(id)
            .filter(|entity| entity.id() == Some(id))
            .or_else(|| self.values().find(|entity| entity.id() == Some(id)))
    }

    /// Rebuilds the collection with `entity` placed before the element
    /// currently at `position` (appended when `position` is past the end).
    ///
    /// This re-indexes: every key becomes its position, explicit keys are lost.
    pub fn insert(&mut self, position: usize, entity: Entity) -> Result<()> {
        self.validate(&entity)?;

        let mut items = self.drain_values();
        let position = position.min(items.len());
        items.insert(position, entity);
        for item in items {
            self.add(item)?;
        }
        Ok(())
    }

    /// Appends every element of `other` whose id is not already present.
    ///
    /// An element counts as present when this collection has it under the key
    /// equal to its id, or holds another element with the same id. Elements
    /// without an id are always appended. Appended elements get fresh integer
    /// keys.
    pub fn merge(&mut self, other: &EntityCollection) -> Result<()> {
        for entity in other.values() {
            if let Some(id) = entity.id().filter(|id| !id.is_empty()) {
                if self.has(Key::from(id)) || self.get_by_id(id).is_some() {
                    continue;
                }
            }
            self.add(entity.clone())?;
        }
        Ok(())
    }
}
