//! Entity hydration and generic containers for datacore.
//!
//! Turns decoded API payloads into typed record graphs:
//! - [`Struct`] / [`Extensible`]: the record base with JSON serialization and named extensions
//! - [`Collection`]: ordered, keyed container that enforces a single element type
//! - [`Entity`] / [`EntityCollection`]: hydrated records and id-aware collections of them
//! - [`EntityDefinition`] / [`Registry`]: field tables that direct hydration, keyed by type name
//! - [`schema`]: read-only entity metadata, which can derive entity definitions
//!
//! Hydration is driven by each field's declared [`FieldKind`]. Nested objects
//! become entities, nested lists become collections, date strings become
//! [`Timestamp`]s and everything else is assigned verbatim.

mod collection;
mod definition;
mod entity;
mod entity_collection;
mod hydrate;
mod record;
mod registry;
pub mod schema;
mod value;

pub use collection::{Collection, Element};
pub use definition::{
    CollectionDefinition, EntityDefinition, EntityDefinitionBuilder, FieldDescriptor, FieldKind,
    Primitive, RESERVED_FIELDS, collection_name_for,
};
pub use entity::Entity;
pub use entity_collection::EntityCollection;
pub use hydrate::{FieldFailure, HydrationMode, HydrationReport};
pub use record::{ArrayStruct, Extensible, Extensions, Struct};
pub use registry::Registry;
pub use value::FieldValue;

pub use datacore_types::{Error, Key, Result, Timestamp};
