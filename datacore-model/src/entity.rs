use crate::definition::EntityDefinition;
use crate::record::{ArrayStruct, Extensible, Extensions, Struct};
use crate::{Element, EntityCollection, FieldValue};
use datacore_types::{Error, Result, Timestamp};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::any::Any;
use std::sync::Arc;

/// A hydrated record of one entity type.
///
/// Declared fields live in `fields` (only those that have been assigned);
/// keys the definition does not declare land in `extra`. Translations and
/// custom fields are side maps that hydration assigns but never coerces.
#[derive(Debug, Clone)]
pub struct Entity {
    definition: Arc<EntityDefinition>,
    fields: IndexMap<String, FieldValue>,
    extra: IndexMap<String, FieldValue>,
    translated: Map<String, Value>,
    /// `None` = not loaded, empty map = loaded but empty.
    custom_fields: Option<Map<String, Value>>,
    entity_name: Option<String>,
    extensions: Extensions,
    assigned: AssignedSideMaps,
}

/// Side maps that were explicitly assigned, so serialization can emit them
/// even when empty (or, for custom fields, null).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct AssignedSideMaps {
    translated: bool,
    custom_fields: bool,
    extensions: bool,
}

impl Entity {
    /// Instantiates a bare entity with no fields assigned.
    pub fn new(definition: Arc<EntityDefinition>) -> Result<Self> {
        if definition.is_abstract() {
            return Err(Error::Construction {
                target: definition.name().to_string(),
                reason: "definition is abstract".into(),
            });
        }
        Ok(Self::bare(definition))
    }

    pub(crate) fn bare(definition: Arc<EntityDefinition>) -> Self {
        Self {
            definition,
            fields: IndexMap::new(),
            extra: IndexMap::new(),
            translated: Map::new(),
            custom_fields: None,
            entity_name: None,
            extensions: Extensions::new(),
            assigned: AssignedSideMaps::default(),
        }
    }

    pub fn definition(&self) -> &Arc<EntityDefinition> {
        &self.definition
    }

    // ── Identity ─────────────────────────────────────────────────

    pub fn id(&self) -> Option<&str> {
        self.get_str("id")
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.fields
            .insert("id".into(), FieldValue::Json(Value::String(id.into())));
    }

    pub fn unique_identifier(&self) -> Option<&str> {
        self.get_str("_uniqueIdentifier")
    }

    pub fn api_alias(&self) -> Option<&str> {
        self.get_str("apiAlias")
    }

    pub fn version_id(&self) -> Option<&str> {
        self.get_str("versionId")
    }

    pub fn created_at(&self) -> Option<&Timestamp> {
        self.get_timestamp("createdAt")
    }

    pub fn updated_at(&self) -> Option<&Timestamp> {
        self.get_timestamp("updatedAt")
    }

    /// The entity-name tag set by whoever created this entity.
    pub fn entity_name(&self) -> Option<&str> {
        self.entity_name.as_deref()
    }

    pub fn internal_set_entity_name(&mut self, entity_name: impl Into<String>) -> &mut Self {
        self.entity_name = Some(entity_name.into());
        self
    }

    // ── Field access ─────────────────────────────────────────────

    /// True for declared fields and for undeclared fields assigned so far.
    pub fn has(&self, property: &str) -> bool {
        self.definition.has_field(property) || self.extra.contains_key(property)
    }

    /// Value of an assigned field, declared or not.
    pub fn get_property(&self, property: &str) -> Option<&FieldValue> {
        self.fields.get(property).or_else(|| self.extra.get(property))
    }

    pub fn get_property_mut(&mut self, property: &str) -> Option<&mut FieldValue> {
        match self.fields.get_mut(property) {
            Some(value) => Some(value),
            None => self.extra.get_mut(property),
        }
    }

    pub fn get_str(&self, property: &str) -> Option<&str> {
        self.get_property(property).and_then(FieldValue::as_str)
    }

    pub fn get_bool(&self, property: &str) -> Option<bool> {
        self.get_property(property).and_then(FieldValue::as_bool)
    }

    pub fn get_number(&self, property: &str) -> Option<f64> {
        self.get_property(property).and_then(FieldValue::as_f64)
    }

    pub fn get_timestamp(&self, property: &str) -> Option<&Timestamp> {
        self.get_property(property).and_then(FieldValue::as_timestamp)
    }

    pub fn get_entity(&self, property: &str) -> Option<&Entity> {
        self.get_property(property).and_then(FieldValue::as_entity)
    }

    pub fn get_collection(&self, property: &str) -> Option<&EntityCollection> {
        self.get_property(property).and_then(FieldValue::as_collection)
    }

    /// Assigned declared fields, in assignment order.
    pub fn fields(&self) -> &IndexMap<String, FieldValue> {
        &self.fields
    }

    /// Undeclared fields captured during hydration.
    pub fn extra_fields(&self) -> &IndexMap<String, FieldValue> {
        &self.extra
    }

    /// Writes an already coerced value, routing reserved names to their
    /// dedicated storage.
    pub(crate) fn store(&mut self, name: &str, value: FieldValue) -> Result<()> {
        match name {
            "id" => match value {
                FieldValue::Json(Value::String(id)) => self.set_id(id),
                other => {
                    return Err(Error::InvalidArgument(format!(
                        "expected the id to be a string, got {}",
                        other.kind_name()
                    )));
                }
            },
            "translated" => self.set_translated(side_map(value)?),
            "customFields" => match value {
                FieldValue::Json(Value::Null) => self.set_custom_fields(None),
                other => self.set_custom_fields(Some(side_map(other)?)),
            },
            "extensions" => {
                for (ext_name, data) in side_map(value)? {
                    if let Value::Object(data) = data {
                        self.add_extension(ext_name, ArrayStruct::new(data));
                    }
                }
                self.assigned.extensions = true;
            }
            _ if self.definition.has_field(name) => {
                self.fields.insert(name.to_string(), value);
            }
            _ => {
                self.extra.insert(name.to_string(), value);
            }
        }
        Ok(())
    }

    // ── Translations & custom fields ─────────────────────────────

    pub fn add_translated(&mut self, key: impl Into<String>, value: Value) {
        self.translated.insert(key.into(), value);
        self.assigned.translated = true;
    }

    pub fn get_translated(&self) -> &Map<String, Value> {
        &self.translated
    }

    pub fn get_translation(&self, field: &str) -> Option<&Value> {
        self.translated.get(field)
    }

    pub fn set_translated(&mut self, translated: Map<String, Value>) {
        self.translated = translated;
        self.assigned.translated = true;
    }

    pub fn get_custom_fields(&self) -> Option<&Map<String, Value>> {
        self.custom_fields.as_ref()
    }

    /// Assigns the custom fields; `None` is kept as an explicit null.
    pub fn set_custom_fields(&mut self, custom_fields: Option<Map<String, Value>>) {
        self.custom_fields = custom_fields;
        self.assigned.custom_fields = true;
    }

    // ── Retag ────────────────────────────────────────────────────

    /// Reinterprets `source` as an entity of `definition`, moving its data
    /// without re-running coercion. Fields the target declares become
    /// declared fields, the rest become extra fields. The entity-name tag is
    /// carried over.
    pub fn create_from(definition: Arc<EntityDefinition>, source: Entity) -> Result<Self> {
        let mut target = Self::new(definition)?;
        let Entity {
            fields,
            extra,
            translated,
            custom_fields,
            entity_name,
            extensions,
            assigned,
            ..
        } = source;

        for (name, value) in fields.into_iter().chain(extra) {
            if target.definition.has_field(&name) {
                target.fields.insert(name, value);
            } else {
                target.extra.insert(name, value);
            }
        }
        target.translated = translated;
        target.custom_fields = custom_fields;
        target.entity_name = entity_name;
        target.extensions = extensions;
        target.assigned = assigned;
        Ok(target)
    }
}

/// Side maps arrive as objects, or as an empty list when they hold nothing.
fn side_map(value: FieldValue) -> Result<Map<String, Value>> {
    match value {
        FieldValue::Json(Value::Object(map)) => Ok(map),
        FieldValue::Json(Value::Array(items)) if items.is_empty() => Ok(Map::new()),
        other => Err(shape_error("an object", &other)),
    }
}

pub(crate) fn shape_error(expected: &str, got: &FieldValue) -> Error {
    match got {
        FieldValue::Json(value) => Error::unexpected(expected, value),
        other => Error::InvalidArgument(format!(
            "expected the value to be {expected}, got {}",
            other.kind_name()
        )),
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.definition.name() == other.definition.name()
            && self.fields == other.fields
            && self.extra == other.extra
            && self.translated == other.translated
            && self.custom_fields == other.custom_fields
            && self.entity_name == other.entity_name
            && self.extensions == other.extensions
            && self.assigned == other.assigned
    }
}

impl Struct for Entity {
    fn type_tag(&self) -> &str {
        self.definition.name()
    }

    fn id(&self) -> Option<&str> {
        Entity::id(self)
    }

    /// Every assigned field plus the side maps that were assigned or are
    /// non-empty. Unassigned fields are omitted so a hydrated payload
    /// serializes back to its own keys.
    fn json_serialize(&self) -> Value {
        let mut out: Map<String, Value> = self
            .fields
            .iter()
            .chain(self.extra.iter())
            .map(|(name, value)| (name.clone(), value.json_serialize()))
            .collect();
        if self.assigned.translated || !self.translated.is_empty() {
            out.insert("translated".into(), Value::Object(self.translated.clone()));
        }
        match &self.custom_fields {
            Some(custom_fields) => {
                out.insert("customFields".into(), Value::Object(custom_fields.clone()));
            }
            None if self.assigned.custom_fields => {
                out.insert("customFields".into(), Value::Null);
            }
            None => {}
        }
        if self.assigned.extensions || !self.extensions.is_empty() {
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

impl Element for Entity {
    fn element_type(&self) -> &str {
        self.definition.name()
    }

    /// Is-a check over the definition's ancestor chain.
    fn is_instance_of(&self, expected: &str) -> bool {
        self.definition.is_a(expected)
    }

    fn as_struct(&self) -> Option<&dyn Struct> {
        Some(self)
    }
}

impl Extensible for Entity {
    fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }
}
