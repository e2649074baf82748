//! Path-addressed nested objects.
//!
//! [`ObjectValue`] is the map at the root of every document payload. All
//! operations are pure: "mutation" is structural replacement returning a new
//! object, so already-built trees can be shared freely across threads and
//! consumers without copying.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{FieldMask, FieldPath, Value};

/// A nested mapping from field name to [`Value`].
///
/// Keys within one level are unique; insertion order carries no meaning
/// (objects compare by sorted key set). Fields are addressed by
/// [`FieldPath`], with intermediate maps created implicitly on `set`.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use lodestone::model::{FieldPath, ObjectValue, Value};
///
/// let path = FieldPath::from_str("a.b.c")?;
/// let obj = ObjectValue::empty().set(&path, Value::Int(7));
///
/// assert_eq!(obj.get(&path), Some(&Value::Int(7)));
/// // Intermediate maps were created along the way.
/// assert!(obj.get(&FieldPath::from_str("a.b")?).is_some());
///
/// let obj = obj.delete(&path);
/// assert_eq!(obj.get(&path), None);
/// # Ok::<(), lodestone::model::PathError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectValue {
    fields: BTreeMap<String, Value>,
}

impl ObjectValue {
    /// The canonical object with zero fields.
    pub fn empty() -> Self {
        ObjectValue {
            fields: BTreeMap::new(),
        }
    }

    /// Wraps an existing field map.
    pub fn new(fields: BTreeMap<String, Value>) -> Self {
        ObjectValue { fields }
    }

    /// Number of top-level fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the object has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates the top-level fields in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    /// The underlying field map.
    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    /// Consumes the object into a [`Value::Map`].
    pub fn into_value(self) -> Value {
        Value::Map(self.fields)
    }

    /// Reads the value at `path`.
    ///
    /// Returns `None` if any intermediate segment is missing or resolves to
    /// a non-map value before the path is exhausted. The root path addresses
    /// the object itself rather than a field, so it also yields `None`.
    pub fn get(&self, path: &FieldPath) -> Option<&Value> {
        let (leaf, parents) = path.segments().split_last()?;
        let mut current = &self.fields;
        for segment in parents {
            match current.get(segment) {
                Some(Value::Map(child)) => current = child,
                _ => return None,
            }
        }
        current.get(leaf)
    }

    /// Returns a new object with `value` stored at `path`.
    ///
    /// Intermediate maps are created as needed; any non-map value along the
    /// way is replaced by a fresh map. Setting at the root path is a no-op
    /// since the root is not a field.
    pub fn set(&self, path: &FieldPath, value: Value) -> Self {
        let Some((leaf, parents)) = path.segments().split_last() else {
            return self.clone();
        };
        let mut fields = self.fields.clone();
        let mut current = &mut fields;
        for segment in parents {
            let entry = current
                .entry(segment.clone())
                .or_insert_with(|| Value::Map(BTreeMap::new()));
            if !matches!(entry, Value::Map(_)) {
                *entry = Value::Map(BTreeMap::new());
            }
            match entry {
                Value::Map(child) => current = child,
                _ => unreachable!("entry was just replaced with a map"),
            }
        }
        current.insert(leaf.clone(), value);
        ObjectValue { fields }
    }

    /// Returns a new object with the field at `path` removed.
    ///
    /// A missing path is a no-op, not an error. Empty intermediate maps left
    /// behind by the removal are kept, matching the behavior of an explicit
    /// empty-map write.
    pub fn delete(&self, path: &FieldPath) -> Self {
        let Some((leaf, parents)) = path.segments().split_last() else {
            return self.clone();
        };
        let mut fields = self.fields.clone();
        let mut current = &mut fields;
        for segment in parents {
            match current.get_mut(segment) {
                Some(Value::Map(child)) => current = child,
                _ => return ObjectValue { fields },
            }
        }
        current.remove(leaf);
        ObjectValue { fields }
    }

    /// Overlays `other` onto `self` at the paths named by `mask`.
    ///
    /// For each mask path, the value from `other` replaces whatever `self`
    /// holds there; a path absent from `other` is deleted. This is the merge
    /// primitive the sync layer uses to apply a patch payload over known
    /// document state.
    pub fn apply_patch(&self, other: &ObjectValue, mask: &FieldMask) -> Self {
        let mut result = self.clone();
        for path in mask.iter() {
            match other.get(path) {
                Some(value) => result = result.set(path, value.clone()),
                None => result = result.delete(path),
            }
        }
        result
    }
}

impl From<BTreeMap<String, Value>> for ObjectValue {
    fn from(fields: BTreeMap<String, Value>) -> Self {
        ObjectValue::new(fields)
    }
}

impl FromIterator<(String, Value)> for ObjectValue {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        ObjectValue {
            fields: iter.into_iter().collect(),
        }
    }
}
