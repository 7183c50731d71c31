//! Read-only schema metadata describing an API's entities.
//!
//! Built once from raw metadata via [`Schema::create_from_raw`] and never
//! mutated. A [`Schema`] can drive hydration through
//! [`Registry::register_schema`](crate::Registry::register_schema).

mod flag;
mod property;
#[allow(clippy::module_inception)]
mod schema;

pub use flag::{Flag, FlagCollection};
pub use property::{Property, PropertyCollection, RawProperty};
pub use schema::{Schema, SchemaCollection};
