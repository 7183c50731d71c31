use crate::definition::{
    CollectionDefinition, EntityDefinition, FieldDescriptor, RESERVED_FIELDS,
};
use crate::hydrate::hydrate_collection;
use crate::schema::{Schema, SchemaCollection};
use crate::{Entity, EntityCollection};
use datacore_types::{Error, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Lookup table of entity and collection types by name.
///
/// Built once at startup; hydration resolves nested entity and collection
/// kinds through it.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entities: HashMap<String, Arc<EntityDefinition>>,
    collections: HashMap<String, Arc<CollectionDefinition>>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an entity type and, unless already present, its collection type.
    pub fn register(&mut self, definition: EntityDefinition) -> Arc<EntityDefinition> {
        debug!(
            entity = definition.name(),
            collection = definition.collection(),
            fields = definition.fields().count(),
            "registering entity definition"
        );
        let definition = Arc::new(definition);
        self.collections
            .entry(definition.collection().to_string())
            .or_insert_with(|| {
                Arc::new(CollectionDefinition::new(
                    definition.collection(),
                    definition.name(),
                ))
            });
        self.entities
            .insert(definition.name().to_string(), Arc::clone(&definition));
        definition
    }

    /// Registers a collection type whose elements are `element_type` entities.
    pub fn register_collection(
        &mut self,
        name: impl Into<String>,
        element_type: impl Into<String>,
    ) -> Arc<CollectionDefinition> {
        let definition = Arc::new(CollectionDefinition::new(name, element_type));
        self.collections
            .insert(definition.name().to_string(), Arc::clone(&definition));
        definition
    }

    /// Derives and registers an entity definition from schema metadata.
    ///
    /// Reserved fields keep their built-in handling; every other property is
    /// declared with the kind [`Property::field_kind`](crate::schema::Property::field_kind)
    /// reports, nullable unless flagged `required`.
    pub fn register_schema(&mut self, schema: &Schema) -> Arc<EntityDefinition> {
        let fields = schema
            .properties
            .values()
            .filter(|property| !RESERVED_FIELDS.contains(&property.name.as_str()))
            .map(|property| FieldDescriptor {
                name: property.name.clone(),
                kind: property.field_kind(),
                nullable: !property.flags.has("required"),
            });
        let definition = EntityDefinition::builder(schema.entity.clone())
            .fields(fields)
            .schema(Arc::new(schema.clone()))
            .build();
        self.register(definition)
    }

    pub fn register_schemas(&mut self, schemas: &SchemaCollection) {
        for schema in schemas.values() {
            self.register_schema(schema);
        }
    }

    pub fn entity(&self, name: &str) -> Result<&Arc<EntityDefinition>> {
        self.entities
            .get(name)
            .ok_or_else(|| Error::UnknownType(name.to_string()))
    }

    pub fn collection(&self, name: &str) -> Result<&Arc<CollectionDefinition>> {
        self.collections
            .get(name)
            .ok_or_else(|| Error::UnknownType(name.to_string()))
    }

    pub fn contains_entity(&self, name: &str) -> bool {
        self.entities.contains_key(name)
    }

    /// Bare, unhydrated entity of the named type.
    pub fn create_entity(&self, name: &str) -> Result<Entity> {
        Entity::new(Arc::clone(self.entity(name)?))
    }

    /// Empty collection of the named collection type.
    pub fn create_collection(&self, name: &str) -> Result<EntityCollection> {
        let definition = self.collection(name)?;
        Ok(EntityCollection::named(
            definition.name(),
            definition.element_type(),
        ))
    }

    /// See [`Entity::create_from_array`].
    pub fn create_from_array(&self, entity_type: &str, attributes: &Value) -> Result<Entity> {
        Entity::create_from_array(self, entity_type, attributes)
    }

    /// Hydrates a collection of the named collection type from a JSON array of objects.
    pub fn create_collection_from_array(
        &self,
        collection_type: &str,
        items: &Value,
    ) -> Result<EntityCollection> {
        match items {
            Value::Array(items) => hydrate_collection(self, collection_type, items),
            other => Err(Error::unexpected("an array", other)),
        }
    }
}
