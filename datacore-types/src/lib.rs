//! Core type definitions for datacore.
//!
//! This crate defines the small, domain-agnostic values the hydration engine
//! is built on:
//! - [`Timestamp`]: immutable temporal value rendered as RFC 3339 extended
//! - [`Key`]: collection key (explicit string/integer or auto-incremented)
//! - [`Error`] / [`Result`]: the error taxonomy shared by every datacore crate
//!
//! Entities, collections and schema metadata live in `datacore-model`.

mod key;
mod timestamp;

pub use key::Key;
pub use timestamp::Timestamp;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building, hydrating or serializing records.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A collection rejected an element of the wrong type.
    #[error("expected collection element of type {expected} got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// A value had the wrong shape for the field it was assigned to.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The declared field type is a union or intersection.
    #[error("properties with union types and intersection types are not supported: {field}")]
    UnsupportedType { field: String },

    /// A record could not be instantiated without its normal constructor.
    #[error("cannot construct {target}: {reason}")]
    Construction { target: String, reason: String },

    /// A type name that is not registered.
    #[error("unknown type: {0}")]
    UnknownType(String),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for an [`Error::InvalidArgument`] describing an unexpected JSON shape.
    pub fn unexpected(expected: &str, got: &serde_json::Value) -> Self {
        Self::InvalidArgument(format!(
            "expected the value to be {expected}, got {}",
            json_kind(got)
        ))
    }
}

/// Human readable kind of a JSON value, used in error messages.
pub fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(n) if n.is_f64() => "float",
        serde_json::Value::Number(_) => "integer",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
