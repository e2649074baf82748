//! Error types for the value model.
//!
//! Model errors represent programming mistakes rather than bad user input:
//! every variant-specific accessor on [`crate::model::Value`] is expressed as
//! an exhaustive match, so a `TypeMismatch` can only surface through the
//! fallible `TryFrom` conversions.

use thiserror::Error;

/// Structured error types for value-model operations.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ModelError {
    /// A typed accessor was used on a value of a different variant.
    #[error("type mismatch: expected {expected}, found {actual}")]
    TypeMismatch { expected: String, actual: String },
}

impl ModelError {
    /// Check if this error is a type mismatch.
    pub fn is_type_error(&self) -> bool {
        matches!(self, ModelError::TypeMismatch { .. })
    }
}

// Conversion from ModelError to the main Error type
impl From<ModelError> for crate::Error {
    fn from(err: ModelError) -> Self {
        crate::Error::Model(err)
    }
}
