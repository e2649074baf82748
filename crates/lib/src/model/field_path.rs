//! Field paths and field masks.
//!
//! A [`FieldPath`] addresses one location inside a nested document as an
//! ordered list of field-name segments. The empty path is the document root.
//! A [`FieldMask`] is a minimal, ordered set of field paths, used by patch
//! mutations to declare exactly which fields they replace.
//!
//! # Usage
//!
//! ```
//! use std::str::FromStr;
//! use lodestone::model::{FieldMask, FieldPath};
//!
//! let path = FieldPath::from_str("user.profile.name")?;
//! assert_eq!(path.len(), 3);
//! assert_eq!(path.to_string(), "user.profile.name");
//!
//! // Masks are minimized: an ancestor subsumes its descendants.
//! let mask = FieldMask::new([
//!     FieldPath::from_str("a")?,
//!     FieldPath::from_str("a.b")?,
//! ]);
//! assert_eq!(mask.len(), 1);
//! # Ok::<(), lodestone::model::PathError>(())
//! ```

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for field-path parsing and construction failures.
#[non_exhaustive]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    /// A dotted path string contained an empty segment (leading, trailing,
    /// or consecutive dots).
    #[error("invalid field path '{path}': empty segment")]
    EmptySegment { path: String },

    /// An empty string was parsed where a non-root path is required.
    #[error("invalid field path: empty path")]
    EmptyPath,
}

/// An ordered sequence of field-name segments addressing a location inside a
/// document.
///
/// Segments are immutable once constructed and always non-empty. Equality,
/// hashing, and ordering are lexicographic over segments, so a path sorts
/// immediately before its own extensions (`a` < `a.b` < `b`).
///
/// The root path ([`FieldPath::root`]) has no segments and denotes the whole
/// document.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Returns the empty path, addressing the document root.
    pub fn root() -> Self {
        FieldPath {
            segments: Vec::new(),
        }
    }

    /// Creates a path from pre-split segments.
    ///
    /// # Errors
    /// Returns [`PathError::EmptySegment`] if any segment is empty.
    pub fn new(segments: impl IntoIterator<Item = impl Into<String>>) -> Result<Self, PathError> {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if let Some(_empty) = segments.iter().find(|s| s.is_empty()) {
            return Err(PathError::EmptySegment {
                path: segments.join("."),
            });
        }
        Ok(FieldPath { segments })
    }

    /// Returns the segments of this path.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments in this path.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns true if this is the root path.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns true if this path has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The first segment, if any.
    pub fn first(&self) -> Option<&str> {
        self.segments.first().map(String::as_str)
    }

    /// The last segment, if any.
    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Returns a new path with `segment` appended.
    ///
    /// The segment must be non-empty; callers constructing paths from user
    /// input validate segments before appending.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let segment = segment.into();
        debug_assert!(!segment.is_empty(), "field path segments must be non-empty");
        let mut segments = self.segments.clone();
        segments.push(segment);
        FieldPath { segments }
    }

    /// Returns a new path with all of `other`'s segments appended.
    pub fn append(&self, other: &FieldPath) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        FieldPath { segments }
    }

    /// Returns the parent path, or `None` if this is the root.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        Some(FieldPath {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Returns true if `self` is a (non-strict) prefix of `other`.
    ///
    /// The root path is a prefix of every path, and every path is a prefix
    /// of itself.
    pub fn is_prefix_of(&self, other: &FieldPath) -> bool {
        self.segments.len() <= other.segments.len()
            && self
                .segments
                .iter()
                .zip(other.segments.iter())
                .all(|(a, b)| a == b)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

impl FromStr for FieldPath {
    type Err = PathError;

    /// Parses dotted notation, e.g. `"user.profile.name"`.
    ///
    /// Unlike filesystem-style paths there is no normalization: an empty
    /// string or an empty segment is an error, since silently dropping
    /// segments would change which field a write lands on.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(PathError::EmptyPath);
        }
        if s.split('.').any(|segment| segment.is_empty()) {
            return Err(PathError::EmptySegment {
                path: s.to_string(),
            });
        }
        Ok(FieldPath {
            segments: s.split('.').map(str::to_string).collect(),
        })
    }
}

/// A minimal, ordered set of field paths.
///
/// Patch mutations carry a mask declaring which fields they replace. Masks
/// are minimal by construction: if both `a` and `a.b` are inserted, only `a`
/// is retained, since writing `a` already covers everything beneath it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMask {
    // Sorted and free of covered paths.
    paths: Vec<FieldPath>,
}

impl FieldMask {
    /// Builds a mask from the given paths, sorting, deduplicating, and
    /// dropping any path covered by an ancestor also present.
    pub fn new(paths: impl IntoIterator<Item = FieldPath>) -> Self {
        let mut sorted: Vec<FieldPath> = paths.into_iter().collect();
        sorted.sort();
        sorted.dedup();

        // Lexicographic order places a path directly before its extensions,
        // so only the most recently kept path can cover the next candidate.
        let mut paths: Vec<FieldPath> = Vec::with_capacity(sorted.len());
        for path in sorted {
            if paths.last().is_some_and(|kept| kept.is_prefix_of(&path)) {
                continue;
            }
            paths.push(path);
        }
        FieldMask { paths }
    }

    /// Returns true if the mask contains exactly this path.
    pub fn contains(&self, path: &FieldPath) -> bool {
        self.paths.binary_search(path).is_ok()
    }

    /// Returns true if some mask entry equals `path` or is an ancestor of it.
    pub fn covers(&self, path: &FieldPath) -> bool {
        self.paths.iter().any(|p| p.is_prefix_of(path))
    }

    /// Iterates the mask paths in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldPath> {
        self.paths.iter()
    }

    /// Number of paths in the mask.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Returns true if the mask is empty.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl fmt::Display for FieldMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, path) in self.paths.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{path}")?;
        }
        write!(f, "}}")
    }
}

impl FromIterator<FieldPath> for FieldMask {
    fn from_iter<T: IntoIterator<Item = FieldPath>>(iter: T) -> Self {
        FieldMask::new(iter)
    }
}
