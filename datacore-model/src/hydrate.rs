//! Type-directed hydration of entities from decoded payloads.
//!
//! [`Entity::set_property`] classifies one incoming value against the
//! field's declared [`FieldKind`] and either assigns it verbatim, builds a
//! nested entity, builds a nested collection, parses a timestamp, or retags an
//! already hydrated record. [`Entity::assign_properties`] runs it over a whole
//! payload in strict or best-effort mode.

use crate::definition::{FieldDescriptor, FieldKind};
use crate::entity::shape_error;
use crate::{Entity, EntityCollection, FieldValue, Registry};
use datacore_types::{Error, Result, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// How bulk assignment treats a field that fails to coerce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HydrationMode {
    /// The first failing field aborts the assignment.
    Strict,
    /// Failing fields are skipped and reported; the rest are assigned.
    #[default]
    BestEffort,
}

/// A field that could not be assigned during best-effort hydration.
#[derive(Debug)]
pub struct FieldFailure {
    pub field: String,
    pub error: Error,
}

/// Outcome of [`Entity::assign_properties`].
#[derive(Debug, Default)]
pub struct HydrationReport {
    failures: Vec<FieldFailure>,
}

impl HydrationReport {
    /// True when every field was assigned.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures(&self) -> &[FieldFailure] {
        &self.failures
    }

    pub fn failed_fields(&self) -> impl Iterator<Item = &str> {
        self.failures.iter().map(|f| f.field.as_str())
    }

    pub fn into_failures(self) -> Vec<FieldFailure> {
        self.failures
    }
}

impl Entity {
    /// Creates an entity of `entity_type` and hydrates it from `attributes`.
    ///
    /// Object members are assigned through [`set_property`](Self::set_property)
    /// and any failure is returned. A JSON array carries only positional keys,
    /// which are skipped, so it yields a bare entity.
    pub fn create_from_array(
        registry: &Registry,
        entity_type: &str,
        attributes: &Value,
    ) -> Result<Entity> {
        let mut entity = registry.create_entity(entity_type)?;
        match attributes {
            Value::Object(map) => {
                for (name, value) in map {
                    entity.set_property(registry, name, value)?;
                }
            }
            Value::Array(_) => {}
            other => return Err(Error::unexpected("an object", other)),
        }
        Ok(entity)
    }

    /// Assigns one property, coercing the value by the field's declared kind.
    ///
    /// Undeclared names are kept verbatim as extra fields and never fail.
    pub fn set_property(
        &mut self,
        registry: &Registry,
        name: &str,
        value: impl Into<FieldValue>,
    ) -> Result<()> {
        let value = value.into();
        let definition = Arc::clone(self.definition());
        let Some(descriptor) = definition.field(name) else {
            trace!(
                entity = definition.name(),
                field = name,
                "assigning undeclared field"
            );
            return self.store(name, value);
        };

        let value = coerce(registry, descriptor, value)?;
        self.store(name, value)
    }

    /// Bulk hydration from key/value pairs.
    ///
    /// `id` must be a string; anything else fails immediately in either mode.
    /// Other fields go through [`set_property`](Self::set_property); in
    /// [`HydrationMode::BestEffort`] their failures are collected into the
    /// report and the remaining fields are still assigned.
    pub fn assign_properties<I, K, V>(
        &mut self,
        registry: &Registry,
        attributes: I,
        mode: HydrationMode,
    ) -> Result<HydrationReport>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<FieldValue>,
    {
        let mut report = HydrationReport::default();
        for (name, value) in attributes {
            let name = name.as_ref();
            let value = value.into();

            if name == "id" {
                match value {
                    FieldValue::Json(Value::String(id)) => self.set_id(id),
                    other => {
                        return Err(Error::InvalidArgument(format!(
                            "expected the id to be a string, got {}",
                            other.kind_name()
                        )));
                    }
                }
                continue;
            }

            if let Err(error) = self.set_property(registry, name, value) {
                match mode {
                    HydrationMode::Strict => return Err(error),
                    HydrationMode::BestEffort => {
                        warn!(
                            entity = self.definition().name(),
                            field = name,
                            %error,
                            "skipping field that failed to hydrate"
                        );
                        report.failures.push(FieldFailure {
                            field: name.to_string(),
                            error,
                        });
                    }
                }
            }
        }
        Ok(report)
    }
}

/// Builds a collection of type `collection_type` from a list of objects.
pub(crate) fn hydrate_collection(
    registry: &Registry,
    collection_type: &str,
    items: &[Value],
) -> Result<EntityCollection> {
    let mut collection = registry.create_collection(collection_type)?;
    let element_type = collection.element_type().to_string();
    for item in items {
        if !item.is_object() {
            return Err(Error::InvalidArgument(format!(
                "expected the item to be an object, got {}",
                datacore_types::json_kind(item)
            )));
        }
        collection.add(Entity::create_from_array(registry, &element_type, item)?)?;
    }
    Ok(collection)
}

fn coerce(
    registry: &Registry,
    descriptor: &FieldDescriptor,
    value: FieldValue,
) -> Result<FieldValue> {
    match &descriptor.kind {
        FieldKind::Union(_) => Err(Error::UnsupportedType {
            field: descriptor.name.clone(),
        }),
        FieldKind::Untyped => Ok(value),
        _ if descriptor.nullable && value.is_null() => Ok(value),
        FieldKind::Primitive(_) | FieldKind::Opaque(_) => Ok(value),
        FieldKind::Entity(entity_type) => coerce_entity(registry, entity_type, value),
        FieldKind::Collection(collection_type) => {
            coerce_collection(registry, collection_type, value)
        }
        FieldKind::Timestamp => coerce_timestamp(value),
    }
}

fn coerce_entity(registry: &Registry, entity_type: &str, value: FieldValue) -> Result<FieldValue> {
    match value {
        FieldValue::Entity(source) => {
            debug!(
                target_type = entity_type,
                source_type = source.definition().name(),
                "retagging entity"
            );
            let definition = Arc::clone(registry.entity(entity_type)?);
            Ok(Entity::create_from(definition, *source)?.into())
        }
        FieldValue::Collection(source) => Err(Error::Construction {
            target: entity_type.to_string(),
            reason: format!(
                "cannot reinterpret collection {} as an entity",
                source.name()
            ),
        }),
        FieldValue::Json(attributes @ Value::Object(_)) => {
            Ok(Entity::create_from_array(registry, entity_type, &attributes)?.into())
        }
        other => Err(shape_error("an object", &other)),
    }
}

fn coerce_collection(
    registry: &Registry,
    collection_type: &str,
    value: FieldValue,
) -> Result<FieldValue> {
    match value {
        FieldValue::Collection(source) => {
            debug!(
                target_type = collection_type,
                source_type = source.name(),
                "retagging collection"
            );
            let definition = registry.collection(collection_type)?;
            let retagged = EntityCollection::create_from(
                definition.name(),
                definition.element_type(),
                source,
            )?;
            Ok(retagged.into())
        }
        FieldValue::Entity(source) => Err(Error::Construction {
            target: collection_type.to_string(),
            reason: format!(
                "cannot reinterpret entity {} as a collection",
                source.definition().name()
            ),
        }),
        FieldValue::Json(Value::Array(items)) => {
            Ok(hydrate_collection(registry, collection_type, &items)?.into())
        }
        other => Err(shape_error("an array", &other)),
    }
}

fn coerce_timestamp(value: FieldValue) -> Result<FieldValue> {
    match value {
        FieldValue::Json(Value::String(raw)) => Ok(Timestamp::parse(&raw)?.into()),
        ts @ FieldValue::Timestamp(_) => Ok(ts),
        other => Err(shape_error("a string", &other)),
    }
}
