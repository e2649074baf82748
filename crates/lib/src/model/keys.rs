//! Identity types consumed from collaborating layers.
//!
//! [`DatabaseId`] and [`DocumentKey`] are opaque identifiers compared by
//! value. They appear inside reference values and on every mutation, but
//! their internal structure (resource naming, routing) is owned by the
//! transport layer, not by the model.

use std::{cmp::Ordering, fmt};

use serde::{Deserialize, Serialize};

/// Identifies one database within one project.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DatabaseId {
    project: String,
    database: String,
}

/// Name of the database used when none is specified.
pub const DEFAULT_DATABASE: &str = "(default)";

impl DatabaseId {
    /// Creates a database identity from a project and database name.
    pub fn new(project: impl Into<String>, database: impl Into<String>) -> Self {
        DatabaseId {
            project: project.into(),
            database: database.into(),
        }
    }

    /// Creates an identity for the project's default database.
    pub fn with_default_database(project: impl Into<String>) -> Self {
        Self::new(project, DEFAULT_DATABASE)
    }

    /// The project component.
    pub fn project(&self) -> &str {
        &self.project
    }

    /// The database component.
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Returns true if this is the project's default database.
    pub fn is_default_database(&self) -> bool {
        self.database == DEFAULT_DATABASE
    }
}

impl fmt::Display for DatabaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "projects/{}/databases/{}", self.project, self.database)
    }
}

/// Opaque key identifying one document, compared by value.
///
/// The key is a slash-separated resource path owned by the outer client
/// layers; the model only stores and compares it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocumentKey {
    path: String,
}

impl DocumentKey {
    /// Creates a document key from its path.
    pub fn new(path: impl Into<String>) -> Self {
        DocumentKey { path: path.into() }
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)
    }
}

impl From<&str> for DocumentKey {
    fn from(path: &str) -> Self {
        DocumentKey::new(path)
    }
}

impl From<String> for DocumentKey {
    fn from(path: String) -> Self {
        DocumentKey::new(path)
    }
}

/// A latitude/longitude pair.
///
/// Coordinates are range-unchecked at this layer. Ordering is total, by
/// latitude then longitude using `f64::total_cmp`, so geo points can
/// participate in the canonical value ordering without panics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Creates a geo point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        GeoPoint {
            latitude,
            longitude,
        }
    }
}

impl PartialEq for GeoPoint {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for GeoPoint {}

impl PartialOrd for GeoPoint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GeoPoint {
    fn cmp(&self, other: &Self) -> Ordering {
        self.latitude
            .total_cmp(&other.latitude)
            .then_with(|| self.longitude.total_cmp(&other.longitude))
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}
