//! Error types for mutation construction.

use thiserror::Error;

/// Structured error types for mutation construction.
///
/// Every variant is an invalid-argument class error: it is detected
/// synchronously while building a mutation, before anything is enqueued.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum MutationError {
    /// Two field transforms in one mutation target the same path or an
    /// ancestor/descendant pair. Application order would be observable, so
    /// this is rejected outright.
    #[error("overlapping transform paths '{first}' and '{second}'")]
    OverlappingTransforms { first: String, second: String },
}

impl MutationError {
    /// Check if this error was caused by invalid caller input.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, MutationError::OverlappingTransforms { .. })
    }
}

// Conversion from MutationError to the main Error type
impl From<MutationError> for crate::Error {
    fn from(err: MutationError) -> Self {
        crate::Error::Mutation(err)
    }
}
