//! Type descriptors driving hydration.
//!
//! An [`EntityDefinition`] is the static field table of one entity type:
//! field name → [`FieldDescriptor`] (declared [`FieldKind`] plus
//! nullability). Nested entity and collection kinds refer to other types by
//! name; the [`Registry`](crate::Registry) resolves them at hydration time.

use crate::schema::Schema;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Fields whose storage lives outside the generic field map.
pub const RESERVED_FIELDS: &[&str] = &["id", "translated", "customFields", "extensions"];

/// Default collection type name for an entity type.
pub fn collection_name_for(entity: &str) -> String {
    format!("{entity}_collection")
}

/// Opaque kinds assigned verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Primitive {
    String,
    Bool,
    Int,
    Float,
    Array,
    Object,
    Resource,
}

/// The declared type of a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "type")]
pub enum FieldKind {
    /// No declared type; values are assigned as-is.
    Untyped,
    Primitive(Primitive),
    /// Nested entity of the named type.
    Entity(String),
    /// Nested entity collection of the named collection type.
    Collection(String),
    Timestamp,
    /// Union or intersection of several types. Hydration rejects these.
    Union(Vec<String>),
    /// Any other declared type; values are assigned as-is.
    Opaque(String),
}

/// One entry of an entity's field table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
}

fn default_nullable() -> bool {
    true
}

impl FieldDescriptor {
    /// A nullable field of the given kind.
    pub fn new(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            nullable: true,
        }
    }

    /// Marks the field as not accepting null.
    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn untyped(name: &str) -> Self {
        Self::new(name, FieldKind::Untyped)
    }

    pub fn string(name: &str) -> Self {
        Self::new(name, FieldKind::Primitive(Primitive::String))
    }

    pub fn bool(name: &str) -> Self {
        Self::new(name, FieldKind::Primitive(Primitive::Bool))
    }

    pub fn int(name: &str) -> Self {
        Self::new(name, FieldKind::Primitive(Primitive::Int))
    }

    pub fn float(name: &str) -> Self {
        Self::new(name, FieldKind::Primitive(Primitive::Float))
    }

    pub fn array(name: &str) -> Self {
        Self::new(name, FieldKind::Primitive(Primitive::Array))
    }

    pub fn object(name: &str) -> Self {
        Self::new(name, FieldKind::Primitive(Primitive::Object))
    }

    pub fn timestamp(name: &str) -> Self {
        Self::new(name, FieldKind::Timestamp)
    }

    /// A nested entity of type `entity`.
    pub fn entity(name: &str, entity: &str) -> Self {
        Self::new(name, FieldKind::Entity(entity.into()))
    }

    /// A nested collection of type `collection`.
    pub fn collection(name: &str, collection: &str) -> Self {
        Self::new(name, FieldKind::Collection(collection.into()))
    }

    pub fn union(name: &str, types: &[&str]) -> Self {
        Self::new(
            name,
            FieldKind::Union(types.iter().map(|t| (*t).to_string()).collect()),
        )
    }

    pub fn opaque(name: &str, type_name: &str) -> Self {
        Self::new(name, FieldKind::Opaque(type_name.into()))
    }
}

/// Fields every entity declares.
fn base_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::string("id").not_null(),
        FieldDescriptor::string("_uniqueIdentifier").not_null(),
        FieldDescriptor::string("apiAlias"),
        FieldDescriptor::timestamp("createdAt"),
        FieldDescriptor::timestamp("updatedAt"),
        FieldDescriptor::string("versionId"),
        FieldDescriptor::object("translated").not_null(),
        FieldDescriptor::object("customFields"),
        FieldDescriptor::object("extensions").not_null(),
    ]
}

/// The field table and identity of one entity type.
#[derive(Debug, Clone)]
pub struct EntityDefinition {
    name: String,
    collection: String,
    ancestors: Vec<String>,
    is_abstract: bool,
    fields: IndexMap<String, FieldDescriptor>,
    schema: Option<Arc<Schema>>,
}

impl EntityDefinition {
    /// Starts a definition that already declares the base entity fields.
    pub fn builder(name: impl Into<String>) -> EntityDefinitionBuilder {
        EntityDefinitionBuilder::new(name.into())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the collection type holding this entity.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Supertype names, nearest first.
    pub fn ancestors(&self) -> &[String] {
        &self.ancestors
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// True when this type is `type_name` or extends it.
    pub fn is_a(&self, type_name: &str) -> bool {
        self.name == type_name || self.ancestors.iter().any(|a| a == type_name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Declared fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.values()
    }

    /// The schema this definition was derived from, if any.
    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_deref()
    }
}

#[derive(Debug, Clone)]
pub struct EntityDefinitionBuilder {
    definition: EntityDefinition,
}

impl EntityDefinitionBuilder {
    fn new(name: String) -> Self {
        let fields = base_fields()
            .into_iter()
            .map(|field| (field.name.clone(), field))
            .collect();
        Self {
            definition: EntityDefinition {
                collection: collection_name_for(&name),
                name,
                ancestors: Vec::new(),
                is_abstract: false,
                fields,
                schema: None,
            },
        }
    }

    /// Declares a field, replacing an earlier declaration of the same name.
    #[must_use]
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.definition.fields.insert(field.name.clone(), field);
        self
    }

    #[must_use]
    pub fn fields(self, fields: impl IntoIterator<Item = FieldDescriptor>) -> Self {
        fields.into_iter().fold(self, Self::field)
    }

    /// Overrides the collection type name (default `<name>_collection`).
    #[must_use]
    pub fn collection(mut self, collection: impl Into<String>) -> Self {
        self.definition.collection = collection.into();
        self
    }

    /// Inherits the parent's fields and is-a chain.
    #[must_use]
    pub fn extends(mut self, parent: &EntityDefinition) -> Self {
        for field in parent.fields() {
            self.definition
                .fields
                .entry(field.name.clone())
                .or_insert_with(|| field.clone());
        }
        self.definition.ancestors = std::iter::once(parent.name.clone())
            .chain(parent.ancestors.iter().cloned())
            .collect();
        self
    }

    /// Abstract types cannot be instantiated.
    #[must_use]
    pub fn make_abstract(mut self) -> Self {
        self.definition.is_abstract = true;
        self
    }

    #[must_use]
    pub fn schema(mut self, schema: Arc<Schema>) -> Self {
        self.definition.schema = Some(schema);
        self
    }

    pub fn build(self) -> EntityDefinition {
        self.definition
    }
}

/// A collection type: its name and the entity type of its elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionDefinition {
    name: String,
    element_type: String,
}

impl CollectionDefinition {
    pub fn new(name: impl Into<String>, element_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            element_type: element_type.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn element_type(&self) -> &str {
        &self.element_type
    }
}
