use super::{Property, PropertyCollection, RawProperty};
use crate::{Collection, Element, Struct};
use datacore_types::Result;
use serde_json::{Map, Value};
use std::any::Any;

/// The schema of one entity: its name and properties keyed by name.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub entity: String,
    pub properties: PropertyCollection,
}

impl Schema {
    pub const TYPE_TAG: &'static str = "schema";

    pub fn new(entity: impl Into<String>, properties: PropertyCollection) -> Self {
        Self {
            entity: entity.into(),
            properties,
        }
    }

    /// Builds a schema from raw metadata: property name → `{type, flags, ...}`.
    ///
    /// Fails with a serialization error when an entry lacks `type` or has
    /// malformed fields.
    pub fn create_from_raw(
        entity: impl Into<String>,
        properties: &Map<String, Value>,
    ) -> Result<Self> {
        let properties = properties
            .iter()
            .map(|(name, raw)| -> Result<Property> {
                let raw: RawProperty = serde_json::from_value(raw.clone())?;
                Property::from_raw(name.clone(), raw)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(entity, PropertyCollection::from_properties(properties)?))
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }
}

impl Struct for Schema {
    fn type_tag(&self) -> &str {
        Self::TYPE_TAG
    }

    fn json_serialize(&self) -> Value {
        let properties = self
            .properties
            .values()
            .map(|property| (property.name.clone(), property.json_serialize()))
            .collect();
        let mut out = Map::new();
        out.insert("entity".into(), Value::String(self.entity.clone()));
        out.insert("properties".into(), Value::Object(properties));
        Value::Object(out)
    }

    fn clone_struct(&self) -> Box<dyn Struct> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Element for Schema {
    fn element_type(&self) -> &str {
        Self::TYPE_TAG
    }

    fn as_struct(&self) -> Option<&dyn Struct> {
        Some(self)
    }
}

/// Schemas keyed by entity name.
pub type SchemaCollection = Collection<Schema>;

impl Collection<Schema> {
    pub fn from_schemas(schemas: impl IntoIterator<Item = Schema>) -> Result<Self> {
        Self::from_keyed(
            Schema::TYPE_TAG,
            schemas.into_iter().map(|schema| (schema.entity.clone(), schema)),
        )
    }

    /// Builds every schema from a raw map of entity name → properties map.
    /// Entries whose properties are not an object are rejected.
    pub fn create_from_raw(raw: &Map<String, Value>) -> Result<Self> {
        let schemas = raw
            .iter()
            .map(|(entity, properties)| match properties {
                Value::Object(properties) => Schema::create_from_raw(entity.clone(), properties),
                other => Err(datacore_types::Error::unexpected("an object", other)),
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_schemas(schemas)
    }
}
