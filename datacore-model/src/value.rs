use crate::{Entity, EntityCollection, Struct};
use datacore_types::{Timestamp, json_kind};
use serde_json::Value;

/// A field value after coercion.
///
/// Plain payload data stays [`FieldValue::Json`]; the hydration engine turns
/// values into the other variants according to the field's declared kind.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Json(Value),
    Timestamp(Timestamp),
    Entity(Box<Entity>),
    Collection(EntityCollection),
}

impl FieldValue {
    pub const NULL: Self = Self::Json(Value::Null);

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Json(Value::Null))
    }

    /// True for values that are records (entities or collections).
    pub fn is_record(&self) -> bool {
        matches!(self, Self::Entity(_) | Self::Collection(_))
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_json().and_then(Value::as_str)
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_json().and_then(Value::as_bool)
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_json().and_then(Value::as_f64)
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_json().and_then(Value::as_i64)
    }

    pub fn as_timestamp(&self) -> Option<&Timestamp> {
        match self {
            Self::Timestamp(ts) => Some(ts),
            _ => None,
        }
    }

    pub fn as_entity(&self) -> Option<&Entity> {
        match self {
            Self::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    pub fn as_entity_mut(&mut self) -> Option<&mut Entity> {
        match self {
            Self::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&EntityCollection> {
        match self {
            Self::Collection(collection) => Some(collection),
            _ => None,
        }
    }

    pub fn as_collection_mut(&mut self) -> Option<&mut EntityCollection> {
        match self {
            Self::Collection(collection) => Some(collection),
            _ => None,
        }
    }

    /// Boxes record values as [`Struct`]s; other variants yield `None`.
    pub fn into_struct(self) -> Option<Box<dyn Struct>> {
        match self {
            Self::Entity(entity) => Some(entity as Box<dyn Struct>),
            Self::Collection(collection) => Some(Box::new(collection)),
            Self::Json(_) | Self::Timestamp(_) => None,
        }
    }

    /// Short description of the value's shape for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Json(value) => json_kind(value),
            Self::Timestamp(_) => "timestamp",
            Self::Entity(_) => "entity",
            Self::Collection(_) => "collection",
        }
    }

    /// Plain JSON rendering; timestamps use the RFC 3339 extended form.
    pub fn json_serialize(&self) -> Value {
        match self {
            Self::Json(value) => value.clone(),
            Self::Timestamp(ts) => Value::String(ts.to_rfc3339_extended()),
            Self::Entity(entity) => entity.json_serialize(),
            Self::Collection(collection) => collection.json_serialize(),
        }
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<&Value> for FieldValue {
    fn from(value: &Value) -> Self {
        Self::Json(value.clone())
    }
}

impl From<Timestamp> for FieldValue {
    fn from(ts: Timestamp) -> Self {
        Self::Timestamp(ts)
    }
}

impl From<Entity> for FieldValue {
    fn from(entity: Entity) -> Self {
        Self::Entity(Box::new(entity))
    }
}

impl From<EntityCollection> for FieldValue {
    fn from(collection: EntityCollection) -> Self {
        Self::Collection(collection)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Json(Value::String(s.to_string()))
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Json(Value::String(s))
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Json(Value::Bool(b))
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        Self::Json(Value::from(n))
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        Self::Json(Value::from(n))
    }
}
