//!
//! Lodestone: the document-value model and write-encoding core of an
//! offline-first document database client.
//!
//! This crate converts arbitrary application-supplied data into a canonical,
//! strongly-typed value tree and encodes writes (sets, patches, deletes,
//! array/numeric transforms) into immutable mutation objects that can be
//! queued locally and later reconciled against server state.
//!
//! ## Core Concepts
//!
//! * **Values (`model::Value`)**: A closed tagged union of every storable
//!   kind, with one canonical cross-type ordering and deep equality that all
//!   other subsystems (indexing, queries, conflict resolution) depend on.
//! * **Objects (`model::ObjectValue`)**: Nested field maps with pure,
//!   path-addressed get/set/delete and mask-directed merging.
//! * **Field paths (`model::FieldPath`, `model::FieldMask`)**: Locations
//!   inside a document, and minimal sets of locations for patch masks.
//! * **Reading (`reader::UserDataReader`)**: Conversion of loosely-typed
//!   host input into an `ObjectValue` plus extracted field transforms, with
//!   all validation up front.
//! * **Mutations (`mutation::Mutation`)**: Immutable document-level write
//!   intents (set / patch / delete / verify) with optional preconditions.
//! * **Transforms (`mutation::Transform`)**: Deferred operations (server
//!   timestamp, array union/remove, increment) resolved by the sync layer
//!   once prior state is known.
//!
//! Everything here is an immutable value type: no I/O, no interior
//! mutability, safe to share across threads once built.

pub mod model;
pub mod mutation;
pub mod reader;

pub use model::{ObjectValue, Value};
pub use mutation::Mutation;
pub use reader::{UserDataReader, UserValue};

/// Result type used throughout the Lodestone library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Lodestone library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Structured value-model errors from the model module
    #[error(transparent)]
    Model(model::ModelError),

    /// Structured conversion errors from the reader module
    #[error(transparent)]
    Input(reader::InputError),

    /// Structured construction errors from the mutation module
    #[error(transparent)]
    Mutation(mutation::MutationError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Model(_) => "model",
            Error::Input(_) => "reader",
            Error::Mutation(_) => "mutation",
        }
    }

    /// Check if this error was caused by invalid caller input.
    ///
    /// These errors are detected synchronously during conversion or
    /// construction, before any mutation is built.
    pub fn is_invalid_argument(&self) -> bool {
        match self {
            Error::Input(input_err) => input_err.is_invalid_argument(),
            Error::Mutation(mutation_err) => mutation_err.is_invalid_argument(),
            Error::Model(_) => false,
        }
    }

    /// Check if this error is a type mismatch from a typed accessor.
    pub fn is_type_error(&self) -> bool {
        match self {
            Error::Model(model_err) => model_err.is_type_error(),
            _ => false,
        }
    }

    /// Check if this error is path-related.
    pub fn is_path_error(&self) -> bool {
        match self {
            Error::Input(input_err) => input_err.is_path_error(),
            _ => false,
        }
    }
}
