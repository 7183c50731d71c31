use super::{Flag, FlagCollection};
use crate::definition::{FieldKind, Primitive, collection_name_for};
use crate::{Collection, Element, Struct};
use datacore_types::{Result, json_kind};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::any::Any;

const JSON_TYPES: &[&str] = &["json_list", "json_object"];

const SCALAR_TYPES: &[&str] = &[
    "uuid", "int", "text", "password", "float", "string", "blob", "boolean", "date",
];

const STRING_TYPES: &[&str] = &["uuid", "string", "password", "text", "blob"];

/// Raw property metadata as delivered by the API.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProperty {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default, deserialize_with = "flags_map")]
    pub flags: Map<String, Value>,
    pub relation: Option<String>,
    pub local: Option<String>,
    pub local_field: Option<String>,
    pub reference: Option<String>,
    pub reference_field: Option<String>,
    pub entity: Option<String>,
    pub mapping: Option<String>,
    pub properties: Option<Value>,
}

/// Flags arrive as an object, or as an empty list when there are none.
fn flags_map<'de, D>(deserializer: D) -> std::result::Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        Value::Array(items) if items.is_empty() => Ok(Map::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected flags to be an object, got {}",
            json_kind(&other)
        ))),
    }
}

/// One property of an entity schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub type_name: String,
    pub flags: FlagCollection,
    pub relation: Option<String>,
    pub local: Option<String>,
    pub local_field: Option<String>,
    pub reference: Option<String>,
    pub reference_field: Option<String>,
    pub entity: Option<String>,
    pub mapping: Option<String>,
    /// Sub-properties of composite types, kept raw.
    pub properties: Option<Value>,
}

impl Property {
    pub const TYPE_TAG: &'static str = "property";

    pub fn from_raw(name: impl Into<String>, raw: RawProperty) -> Result<Self> {
        let flags = FlagCollection::from_flags(
            raw.flags
                .into_iter()
                .map(|(flag, value)| Flag::new(flag, value)),
        )?;
        Ok(Self {
            name: name.into(),
            type_name: raw.type_name,
            flags,
            relation: raw.relation,
            local: raw.local,
            local_field: raw.local_field,
            reference: raw.reference,
            reference_field: raw.reference_field,
            entity: raw.entity,
            mapping: raw.mapping,
            properties: raw.properties,
        })
    }

    /// A relation to another entity.
    pub fn is_association(&self) -> bool {
        self.relation.is_some() && self.type_name == "association"
    }

    /// `json_list` or `json_object`.
    pub fn is_json_field(&self) -> bool {
        JSON_TYPES.contains(&self.type_name.as_str())
    }

    pub fn is_json_list_field(&self) -> bool {
        self.type_name == "json_list"
    }

    pub fn is_json_object_field(&self) -> bool {
        self.type_name == "json_object"
    }

    /// uuid, int, text, password, float, string, blob, boolean or date.
    pub fn is_scalar_field(&self) -> bool {
        SCALAR_TYPES.contains(&self.type_name.as_str())
    }

    pub fn is_string_field(&self) -> bool {
        STRING_TYPES.contains(&self.type_name.as_str())
    }

    /// One-to-many or many-to-many association.
    pub fn is_to_many_association(&self) -> bool {
        self.is_association()
            && self.entity.is_some()
            && matches!(
                self.relation.as_deref(),
                Some("one_to_many" | "many_to_many")
            )
    }

    /// Many-to-one or one-to-one association.
    pub fn is_to_one_association(&self) -> bool {
        self.is_association()
            && self.entity.is_some()
            && matches!(
                self.relation.as_deref(),
                Some("many_to_one" | "one_to_one")
            )
    }

    /// String or text field flagged `translatable`.
    pub fn is_translatable_field(&self) -> bool {
        (self.type_name == "string" || self.type_name == "text") && self.flags.has("translatable")
    }

    /// Hydration kind implied by this property's metadata.
    pub fn field_kind(&self) -> FieldKind {
        match self.entity.as_deref() {
            Some(entity) if self.is_to_one_association() => {
                return FieldKind::Entity(entity.to_string());
            }
            Some(entity) if self.is_to_many_association() => {
                return FieldKind::Collection(collection_name_for(entity));
            }
            _ => {}
        }

        match self.type_name.as_str() {
            "uuid" | "string" | "text" | "password" | "blob" => {
                FieldKind::Primitive(Primitive::String)
            }
            "int" => FieldKind::Primitive(Primitive::Int),
            "float" => FieldKind::Primitive(Primitive::Float),
            "boolean" => FieldKind::Primitive(Primitive::Bool),
            "json_list" => FieldKind::Primitive(Primitive::Array),
            "json_object" => FieldKind::Primitive(Primitive::Object),
            "date" => FieldKind::Timestamp,
            _ => FieldKind::Untyped,
        }
    }
}

impl Struct for Property {
    fn type_tag(&self) -> &str {
        Self::TYPE_TAG
    }

    /// Renders the raw metadata layout, so the output feeds back into
    /// [`Schema::create_from_raw`](super::Schema::create_from_raw).
    fn json_serialize(&self) -> Value {
        let mut out = Map::new();
        out.insert("type".into(), Value::String(self.type_name.clone()));
        out.insert(
            "flags".into(),
            Value::Object(
                self.flags
                    .values()
                    .map(|flag| (flag.flag.clone(), flag.value.clone()))
                    .collect(),
            ),
        );
        let relation_fields = [
            ("relation", &self.relation),
            ("local", &self.local),
            ("localField", &self.local_field),
            ("reference", &self.reference),
            ("referenceField", &self.reference_field),
            ("entity", &self.entity),
            ("mapping", &self.mapping),
        ];
        for (key, value) in relation_fields {
            if let Some(value) = value {
                out.insert(key.into(), Value::String(value.clone()));
            }
        }
        if let Some(properties) = &self.properties {
            out.insert("properties".into(), properties.clone());
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

impl Element for Property {
    fn element_type(&self) -> &str {
        Self::TYPE_TAG
    }

    fn as_struct(&self) -> Option<&dyn Struct> {
        Some(self)
    }
}

/// Properties keyed by property name.
pub type PropertyCollection = Collection<Property>;

impl Collection<Property> {
    pub fn from_properties(properties: impl IntoIterator<Item = Property>) -> Result<Self> {
        Self::from_keyed(
            Property::TYPE_TAG,
            properties
                .into_iter()
                .map(|property| (property.name.clone(), property)),
        )
    }
}
