//! The canonical document value model.
//!
//! This module is the single source of truth for value identity, ordering,
//! and equality. Every other subsystem (indexing, query evaluation, conflict
//! resolution, wire serialization) builds on the semantics defined here.
//!
//! - [`Value`] — closed tagged union of every storable kind, with a total
//!   canonical ordering across variants.
//! - [`ObjectValue`] — nested field map with pure, path-addressed access.
//! - [`FieldPath`] / [`FieldMask`] — locations inside a document and minimal
//!   sets of locations.
//! - [`DatabaseId`] / [`DocumentKey`] / [`GeoPoint`] — identity and scalar
//!   carrier types shared with collaborating layers.

mod errors;
mod field_path;
mod keys;
mod object_value;
mod value;


pub use errors::ModelError;
pub use field_path::{FieldMask, FieldPath, PathError};
pub use keys::{DEFAULT_DATABASE, DatabaseId, DocumentKey, GeoPoint};
pub use object_value::ObjectValue;
pub use value::Value;
