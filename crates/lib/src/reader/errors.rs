//! Error types for host-input conversion.
//!
//! Every variant is an invalid-argument class error: malformed or
//! out-of-range host input, detected synchronously during conversion and
//! surfaced before any mutation is built.

use thiserror::Error;

use crate::model::PathError;

/// Structured error types for converting host-supplied input.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum InputError {
    /// Top-level input must be a map in this context.
    #[error("invalid data: expected a map, found {actual}")]
    NotAnObject { actual: String },

    /// A sentinel marker appeared inside an array element. Transforms are
    /// only valid as direct field values.
    #[error("{sentinel}() is not supported inside arrays")]
    SentinelInArray { sentinel: String },

    /// A delete sentinel appeared where deletion is not expressible (set
    /// data, or below the top level of update data).
    #[error("delete() is not supported {context}")]
    DeleteNotAllowed { context: String },

    /// An unsigned integer exceeded the 64-bit signed range.
    #[error("integer value {value} is outside the supported 64-bit signed range")]
    IntegerOutOfRange { value: u64 },

    /// A document reference belongs to a different database than the one
    /// this reader was configured for.
    #[error("document reference is from a different database ({actual}, expected {expected})")]
    DatabaseMismatch { expected: String, actual: String },

    /// Input nests deeper than the conversion recursion limit.
    #[error("invalid nesting: input data is nested deeper than {limit} levels")]
    NestingTooDeep { limit: usize },

    /// A map contained an empty string as a field name. `parent` is the
    /// path of the enclosing map, empty for the top level.
    #[error("empty field name in map at '{parent}'")]
    EmptyFieldName { parent: String },

    /// An update-data key failed to parse as a dotted field path.
    #[error("invalid field path '{path}'")]
    InvalidPath {
        path: String,
        #[source]
        source: PathError,
    },

    /// A sentinel marker appeared where only plain values are accepted
    /// (for example a bare query argument).
    #[error("{sentinel}() can only be used as a field value in set or update data")]
    SentinelNotAllowed { sentinel: String },

    /// An increment operand did not convert to an Int or Double.
    #[error("increment() operand must be an integer or a double, found {actual}")]
    NonNumericIncrement { actual: String },
}

impl InputError {
    /// Check if this error was caused by invalid caller input.
    ///
    /// Always true: the reader has no other failure mode.
    pub fn is_invalid_argument(&self) -> bool {
        true
    }

    /// Check if this error is path-related.
    pub fn is_path_error(&self) -> bool {
        matches!(
            self,
            InputError::InvalidPath { .. } | InputError::EmptyFieldName { .. }
        )
    }
}

// Conversion from InputError to the main Error type
impl From<InputError> for crate::Error {
    fn from(err: InputError) -> Self {
        crate::Error::Input(err)
    }
}
