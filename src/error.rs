//! Error types for schema-shaped records

use thiserror::Error;

/// Result type for record operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Record and schema errors
///
/// Only `TypeMismatch` is raised by the instance accessors. Unknown fields and
/// collection schema mismatches are silent no-ops (logged at `warn`).
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Type mismatch on field '{field}': expected {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Index {index} out of range for collection of {len} item(s)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Schema not found: {name}{}", did_you_mean(.suggestion))]
    NotFound {
        name: String,
        suggestion: Option<String>,
    },

    #[error("Schema already exists: {name}")]
    AlreadyExists { name: String },

    #[error("Cyclic schema reference: {0}")]
    CyclicReference(String),

    #[error("Invalid declaration format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

fn did_you_mean(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean '{s}'?)"),
        None => String::new(),
    }
}

impl SchemaError {
    pub(crate) fn not_found(name: impl Into<String>, suggestion: Option<String>) -> Self {
        SchemaError::NotFound {
            name: name.into(),
            suggestion,
        }
    }

    /// True for the only error kind the accessors surface to callers
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, SchemaError::TypeMismatch { .. })
    }
}
