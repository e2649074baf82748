//! Document-level write intents.
//!
//! A [`Mutation`] describes one write against one document: a full
//! replacement ([`SetMutation`]), a masked partial update
//! ([`PatchMutation`]), a deletion ([`DeleteMutation`]), or a bare
//! existence check ([`VerifyMutation`]). Mutations are immutable once built;
//! the mutation queue consumes them as-is and the sync layer later resolves
//! their field transforms against known document state.
//!
//! # Usage
//!
//! ```
//! use lodestone::model::{DocumentKey, ObjectValue};
//! use lodestone::mutation::{Mutation, Precondition};
//!
//! let key = DocumentKey::new("rooms/eros");
//! let mutation = Mutation::set(key, ObjectValue::empty(), vec![], Precondition::None)?;
//! assert!(mutation.precondition().is_none());
//! # Ok::<(), lodestone::Error>(())
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::model::{DocumentKey, FieldMask, ObjectValue};

mod errors;
mod transform;

pub use errors::MutationError;
pub use transform::{FieldTransform, Transform};

/// Guard applied to a mutation before the server commits it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Precondition {
    /// No guard: the write applies unconditionally.
    #[default]
    None,
    /// The document must exist.
    Exists,
    /// The document must not exist.
    NotExists,
    /// The document's last update time must match exactly.
    UpdateTime(DateTime<Utc>),
}

impl Precondition {
    /// Returns true if this is the unconditional precondition.
    pub fn is_none(&self) -> bool {
        matches!(self, Precondition::None)
    }
}

/// Replaces the entire document with a converted payload.
///
/// There is no mask: everything the document previously held is discarded.
/// Field transforms are applied in a second phase on top of the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetMutation {
    key: DocumentKey,
    data: ObjectValue,
    transforms: Vec<FieldTransform>,
    precondition: Precondition,
}

impl SetMutation {
    /// The payload that replaces the document.
    pub fn data(&self) -> &ObjectValue {
        &self.data
    }
}

/// Updates only the fields named by the mask.
///
/// Transform paths are tracked separately from the mask: they are applied
/// without needing to appear in the payload tree. A mask path absent from
/// the payload means "delete this field".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchMutation {
    key: DocumentKey,
    data: ObjectValue,
    mask: FieldMask,
    transforms: Vec<FieldTransform>,
    precondition: Precondition,
}

impl PatchMutation {
    /// The partial payload.
    pub fn data(&self) -> &ObjectValue {
        &self.data
    }

    /// The minimal set of field paths this patch replaces.
    pub fn mask(&self) -> &FieldMask {
        &self.mask
    }
}

/// Deletes the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteMutation {
    key: DocumentKey,
    precondition: Precondition,
}

/// Asserts the precondition without writing anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyMutation {
    key: DocumentKey,
    precondition: Precondition,
}

/// One immutable document-level write intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mutation {
    Set(SetMutation),
    Patch(PatchMutation),
    Delete(DeleteMutation),
    Verify(VerifyMutation),
}

impl Mutation {
    /// Builds a set mutation, replacing the whole document with `data`.
    ///
    /// # Errors
    /// Fails if any two transform paths overlap.
    pub fn set(
        key: DocumentKey,
        data: ObjectValue,
        transforms: Vec<FieldTransform>,
        precondition: Precondition,
    ) -> crate::Result<Self> {
        validate_disjoint_transforms(&transforms)?;
        trace!(key = %key, transforms = transforms.len(), "built set mutation");
        Ok(Mutation::Set(SetMutation {
            key,
            data,
            transforms,
            precondition,
        }))
    }

    /// Builds a patch mutation updating only the fields named by `mask`.
    ///
    /// # Errors
    /// Fails if any two transform paths overlap.
    pub fn patch(
        key: DocumentKey,
        data: ObjectValue,
        mask: FieldMask,
        transforms: Vec<FieldTransform>,
        precondition: Precondition,
    ) -> crate::Result<Self> {
        validate_disjoint_transforms(&transforms)?;
        trace!(key = %key, mask = %mask, transforms = transforms.len(), "built patch mutation");
        Ok(Mutation::Patch(PatchMutation {
            key,
            data,
            mask,
            transforms,
            precondition,
        }))
    }

    /// Builds a delete mutation.
    pub fn delete(key: DocumentKey, precondition: Precondition) -> Self {
        Mutation::Delete(DeleteMutation { key, precondition })
    }

    /// Builds a verify mutation, asserting the precondition without writing.
    pub fn verify(key: DocumentKey, precondition: Precondition) -> Self {
        Mutation::Verify(VerifyMutation { key, precondition })
    }

    /// The document this mutation targets.
    pub fn key(&self) -> &DocumentKey {
        match self {
            Mutation::Set(m) => &m.key,
            Mutation::Patch(m) => &m.key,
            Mutation::Delete(m) => &m.key,
            Mutation::Verify(m) => &m.key,
        }
    }

    /// The precondition guarding this mutation.
    pub fn precondition(&self) -> &Precondition {
        match self {
            Mutation::Set(m) => &m.precondition,
            Mutation::Patch(m) => &m.precondition,
            Mutation::Delete(m) => &m.precondition,
            Mutation::Verify(m) => &m.precondition,
        }
    }

    /// The field transforms carried by this mutation, in conversion
    /// encounter order. Delete and verify mutations carry none.
    pub fn field_transforms(&self) -> &[FieldTransform] {
        match self {
            Mutation::Set(m) => &m.transforms,
            Mutation::Patch(m) => &m.transforms,
            Mutation::Delete(_) | Mutation::Verify(_) => &[],
        }
    }
}

/// Rejects transform lists where one path equals or contains another.
///
/// Application order over overlapping structures would be observable, so
/// such mutations are never constructed.
fn validate_disjoint_transforms(transforms: &[FieldTransform]) -> Result<(), MutationError> {
    for (i, a) in transforms.iter().enumerate() {
        for b in &transforms[i + 1..] {
            if a.field().is_prefix_of(b.field()) || b.field().is_prefix_of(a.field()) {
                return Err(MutationError::OverlappingTransforms {
                    first: a.field().to_string(),
                    second: b.field().to_string(),
                });
            }
        }
    }
    Ok(())
}
