//! Conversion of host-supplied input into the canonical model.
//!
//! Application code hands the client loosely-typed trees of maps, sequences,
//! primitives, and sentinel markers. [`UserDataReader`] walks such a tree
//! ([`UserValue`]) and produces an [`ObjectValue`] payload plus the list of
//! field transforms extracted along the way, applying every type-coercion
//! and validation rule before any mutation is built.
//!
//! # Usage
//!
//! ```
//! use lodestone::model::DatabaseId;
//! use lodestone::reader::{UserDataReader, UserValue};
//!
//! let reader = UserDataReader::new(DatabaseId::with_default_database("demo"));
//! let parsed = reader.parse_set_data(UserValue::map([
//!     ("name", UserValue::from("Ada")),
//!     ("visits", UserValue::increment(1i64)),
//! ]))?;
//!
//! assert_eq!(parsed.data().len(), 1); // "visits" became a transform
//! assert_eq!(parsed.transforms().len(), 1);
//! # Ok::<(), lodestone::reader::InputError>(())
//! ```

use std::{collections::BTreeMap, str::FromStr};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::{
    model::{DatabaseId, DocumentKey, FieldMask, FieldPath, GeoPoint, ObjectValue, Value},
    mutation::{FieldTransform, Mutation, Precondition, Transform},
};

mod errors;

pub use errors::InputError;

/// Maximum nesting depth accepted during conversion.
///
/// Unbounded or cyclic host input is rejected up front instead of risking
/// unbounded recursion.
pub const MAX_NESTING_DEPTH: usize = 100;

/// Host-supplied, dynamically-typed input.
///
/// `UserValue` is the boundary type between the application's loosely-typed
/// data and the canonical model. It mirrors the storable kinds one-to-one
/// and additionally carries the sentinel markers (delete, server timestamp,
/// array union/remove, increment) that are extracted into transforms rather
/// than stored.
#[derive(Debug, Clone, PartialEq)]
pub enum UserValue {
    /// Host null / absent marker
    Null,
    /// Boolean primitive; never routed through the integer path
    Bool(bool),
    /// Signed integer, up to 64 bits
    Int(i64),
    /// Unsigned integer, up to 64 bits; rejected if above `i64::MAX`
    UInt(u64),
    /// Floating-point primitive, preserved bit-exactly
    Double(f64),
    /// Date/time primitive
    Timestamp(DateTime<Utc>),
    /// Text primitive
    Text(String),
    /// Byte-sequence primitive, copied by value
    Bytes(Vec<u8>),
    /// Latitude/longitude pair, range-unchecked
    Geo(GeoPoint),
    /// Reference to a document; must match the reader's database
    Reference {
        database: DatabaseId,
        key: DocumentKey,
    },
    /// Ordered sequence
    Array(Vec<UserValue>),
    /// String-keyed map; author order preserved, duplicate keys
    /// last-write-wins
    Map(Vec<(String, UserValue)>),

    // Sentinel markers, extracted during conversion
    /// Removes the field (update data only)
    FieldDelete,
    /// Resolves to the commit timestamp
    ServerTimestamp,
    /// Appends elements not already present
    ArrayUnion(Vec<UserValue>),
    /// Removes all deeply-equal elements
    ArrayRemove(Vec<UserValue>),
    /// Adds a numeric amount to the previous value
    Increment(Box<UserValue>),
}

impl UserValue {
    /// Builds a map input from key/value pairs, preserving author order.
    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, UserValue)>) -> Self {
        UserValue::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Builds an array input.
    pub fn array(elements: impl IntoIterator<Item = UserValue>) -> Self {
        UserValue::Array(elements.into_iter().collect())
    }

    /// Builds a byte-blob input.
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        UserValue::Bytes(bytes.into())
    }

    /// Builds a document-reference input.
    pub fn reference(database: DatabaseId, key: impl Into<DocumentKey>) -> Self {
        UserValue::Reference {
            database,
            key: key.into(),
        }
    }

    /// The delete-field sentinel.
    pub fn delete() -> Self {
        UserValue::FieldDelete
    }

    /// The server-timestamp sentinel.
    pub fn server_timestamp() -> Self {
        UserValue::ServerTimestamp
    }

    /// The array-union sentinel.
    pub fn array_union(elements: impl IntoIterator<Item = UserValue>) -> Self {
        UserValue::ArrayUnion(elements.into_iter().collect())
    }

    /// The array-remove sentinel.
    pub fn array_remove(elements: impl IntoIterator<Item = UserValue>) -> Self {
        UserValue::ArrayRemove(elements.into_iter().collect())
    }

    /// The numeric-increment sentinel.
    pub fn increment(amount: impl Into<UserValue>) -> Self {
        UserValue::Increment(Box::new(amount.into()))
    }

    /// Returns the input kind as a string, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            UserValue::Null => "null",
            UserValue::Bool(_) => "bool",
            UserValue::Int(_) => "int",
            UserValue::UInt(_) => "uint",
            UserValue::Double(_) => "double",
            UserValue::Timestamp(_) => "timestamp",
            UserValue::Text(_) => "text",
            UserValue::Bytes(_) => "bytes",
            UserValue::Geo(_) => "geo",
            UserValue::Reference { .. } => "reference",
            UserValue::Array(_) => "array",
            UserValue::Map(_) => "map",
            UserValue::FieldDelete => "delete",
            UserValue::ServerTimestamp => "server_timestamp",
            UserValue::ArrayUnion(_) => "array_union",
            UserValue::ArrayRemove(_) => "array_remove",
            UserValue::Increment(_) => "increment",
        }
    }

    /// Returns true if this is any sentinel marker.
    pub fn is_sentinel(&self) -> bool {
        matches!(
            self,
            UserValue::FieldDelete
                | UserValue::ServerTimestamp
                | UserValue::ArrayUnion(_)
                | UserValue::ArrayRemove(_)
                | UserValue::Increment(_)
        )
    }
}

impl From<bool> for UserValue {
    fn from(value: bool) -> Self {
        UserValue::Bool(value)
    }
}

impl From<i8> for UserValue {
    fn from(value: i8) -> Self {
        UserValue::Int(value as i64)
    }
}

impl From<i16> for UserValue {
    fn from(value: i16) -> Self {
        UserValue::Int(value as i64)
    }
}

impl From<i32> for UserValue {
    fn from(value: i32) -> Self {
        UserValue::Int(value as i64)
    }
}

impl From<i64> for UserValue {
    fn from(value: i64) -> Self {
        UserValue::Int(value)
    }
}

impl From<u8> for UserValue {
    fn from(value: u8) -> Self {
        UserValue::Int(value as i64)
    }
}

impl From<u16> for UserValue {
    fn from(value: u16) -> Self {
        UserValue::Int(value as i64)
    }
}

impl From<u32> for UserValue {
    fn from(value: u32) -> Self {
        UserValue::Int(value as i64)
    }
}

impl From<u64> for UserValue {
    fn from(value: u64) -> Self {
        // Range-checked during conversion, not here
        UserValue::UInt(value)
    }
}

impl From<f32> for UserValue {
    fn from(value: f32) -> Self {
        // f32 -> f64 widening is exact
        UserValue::Double(value as f64)
    }
}

impl From<f64> for UserValue {
    fn from(value: f64) -> Self {
        UserValue::Double(value)
    }
}

impl From<&str> for UserValue {
    fn from(value: &str) -> Self {
        UserValue::Text(value.to_string())
    }
}

impl From<String> for UserValue {
    fn from(value: String) -> Self {
        UserValue::Text(value)
    }
}

impl From<DateTime<Utc>> for UserValue {
    fn from(value: DateTime<Utc>) -> Self {
        UserValue::Timestamp(value)
    }
}

impl From<GeoPoint> for UserValue {
    fn from(value: GeoPoint) -> Self {
        UserValue::Geo(value)
    }
}

/// Which caller-facing operation the input belongs to; governs how the
/// delete sentinel is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DataSource {
    Set,
    Update,
    Argument,
}

impl DataSource {
    fn delete_context(self) -> &'static str {
        match self {
            DataSource::Set => "in set data",
            DataSource::Update => "below the top level of update data",
            DataSource::Argument => "in this context",
        }
    }
}

/// Converted set-data: a payload plus the transforms stripped out of it.
#[derive(Debug, Clone)]
pub struct ParsedSetData {
    data: ObjectValue,
    transforms: Vec<FieldTransform>,
}

impl ParsedSetData {
    /// The payload with transform sentinels removed.
    pub fn data(&self) -> &ObjectValue {
        &self.data
    }

    /// The extracted field transforms, in encounter order.
    pub fn transforms(&self) -> &[FieldTransform] {
        &self.transforms
    }

    /// Builds the set mutation for this payload.
    pub fn into_mutation(
        self,
        key: DocumentKey,
        precondition: Precondition,
    ) -> crate::Result<Mutation> {
        Mutation::set(key, self.data, self.transforms, precondition)
    }
}

/// Converted update-data: a partial payload, its minimal field mask, and the
/// transforms stripped out of it.
#[derive(Debug, Clone)]
pub struct ParsedUpdateData {
    data: ObjectValue,
    mask: FieldMask,
    transforms: Vec<FieldTransform>,
}

impl ParsedUpdateData {
    /// The partial payload.
    pub fn data(&self) -> &ObjectValue {
        &self.data
    }

    /// The minimal mask over the explicitly named paths. Transform-only
    /// paths are excluded; delete-sentinel paths are included.
    pub fn mask(&self) -> &FieldMask {
        &self.mask
    }

    /// The extracted field transforms, in encounter order.
    pub fn transforms(&self) -> &[FieldTransform] {
        &self.transforms
    }

    /// Builds the patch mutation for this payload.
    pub fn into_mutation(
        self,
        key: DocumentKey,
        precondition: Precondition,
    ) -> crate::Result<Mutation> {
        Mutation::patch(key, self.data, self.mask, self.transforms, precondition)
    }
}

/// Converts host input trees into canonical values and transform lists.
///
/// The reader is configured with the client's [`DatabaseId`] so that
/// document references from other databases are rejected. Conversion is a
/// single synchronous computation with no I/O; readers are cheap to build
/// and safe to share.
#[derive(Debug, Clone)]
pub struct UserDataReader {
    database: DatabaseId,
}

impl UserDataReader {
    /// Creates a reader for the given database.
    pub fn new(database: DatabaseId) -> Self {
        UserDataReader { database }
    }

    /// The database this reader validates references against.
    pub fn database(&self) -> &DatabaseId {
        &self.database
    }

    /// Converts set-data: the full payload a set mutation writes.
    ///
    /// The input must be a map. Transform sentinels at field positions are
    /// extracted into the transform list and omitted from the payload tree;
    /// the delete sentinel is not expressible in set data.
    pub fn parse_set_data(&self, input: UserValue) -> Result<ParsedSetData, InputError> {
        let entries = match input {
            UserValue::Map(entries) => entries,
            other => {
                return Err(InputError::NotAnObject {
                    actual: other.kind_name().to_string(),
                });
            }
        };
        let mut transforms = Vec::new();
        let fields = self.convert_entries(
            entries,
            &FieldPath::root(),
            1,
            DataSource::Set,
            false,
            &mut transforms,
        )?;
        debug!(
            fields = fields.len(),
            transforms = transforms.len(),
            "parsed set data"
        );
        Ok(ParsedSetData {
            data: ObjectValue::new(fields),
            transforms,
        })
    }

    /// Converts update-data: a list of (dotted field path, value) entries.
    ///
    /// Each key names the exact path being written. A delete sentinel at the
    /// top level contributes its path to the mask with no payload; transform
    /// sentinels are recorded without entering the mask; everything else
    /// contributes payload and mask. The resulting mask is minimal.
    pub fn parse_update_data(
        &self,
        entries: Vec<(String, UserValue)>,
    ) -> Result<ParsedUpdateData, InputError> {
        let entries = dedup_last_write(entries);
        let mut data = ObjectValue::empty();
        let mut transforms = Vec::new();
        let mut mask_paths = Vec::new();

        for (raw_path, value) in entries {
            let path = FieldPath::from_str(&raw_path).map_err(|source| InputError::InvalidPath {
                path: raw_path.clone(),
                source,
            })?;
            match value {
                UserValue::FieldDelete => mask_paths.push(path),
                other => {
                    match self.convert_value(
                        other,
                        &path,
                        1,
                        DataSource::Update,
                        false,
                        &mut transforms,
                    )? {
                        Some(converted) => {
                            data = data.set(&path, converted);
                            mask_paths.push(path);
                        }
                        // A transform sentinel: recorded, excluded from the mask.
                        None => {}
                    }
                }
            }
        }
        let mask = FieldMask::new(mask_paths);
        debug!(
            mask = %mask,
            transforms = transforms.len(),
            "parsed update data"
        );
        Ok(ParsedUpdateData {
            data,
            mask,
            transforms,
        })
    }

    /// Converts a single bare value, as used for query arguments and
    /// single-field contexts. Sentinels are not valid here.
    pub fn parse_argument(&self, input: UserValue) -> Result<Value, InputError> {
        let mut transforms = Vec::new();
        match self.convert_value(
            input,
            &FieldPath::root(),
            1,
            DataSource::Argument,
            false,
            &mut transforms,
        )? {
            Some(value) => Ok(value),
            // Sentinels fail above; conversion in argument context is total.
            None => Err(InputError::SentinelNotAllowed {
                sentinel: "sentinel".to_string(),
            }),
        }
    }

    fn convert_entries(
        &self,
        entries: Vec<(String, UserValue)>,
        parent: &FieldPath,
        depth: usize,
        source: DataSource,
        in_array: bool,
        transforms: &mut Vec<FieldTransform>,
    ) -> Result<BTreeMap<String, Value>, InputError> {
        if depth > MAX_NESTING_DEPTH {
            return Err(InputError::NestingTooDeep {
                limit: MAX_NESTING_DEPTH,
            });
        }
        let entries = dedup_last_write(entries);
        let mut fields = BTreeMap::new();
        for (key, value) in entries {
            if key.is_empty() {
                return Err(InputError::EmptyFieldName {
                    parent: parent.to_string(),
                });
            }
            let path = parent.child(key.clone());
            if let Some(converted) =
                self.convert_value(value, &path, depth, source, in_array, transforms)?
            {
                fields.insert(key, converted);
            }
        }
        Ok(fields)
    }

    /// Converts one input value at `path`.
    ///
    /// Returns `None` when the value was a transform sentinel that has been
    /// extracted into `transforms` instead of entering the value tree.
    fn convert_value(
        &self,
        input: UserValue,
        path: &FieldPath,
        depth: usize,
        source: DataSource,
        in_array: bool,
        transforms: &mut Vec<FieldTransform>,
    ) -> Result<Option<Value>, InputError> {
        if input.is_sentinel() {
            // Anywhere below an array element, sentinels are invalid; in a
            // bare-argument context they are invalid at any depth.
            if in_array {
                return Err(InputError::SentinelInArray {
                    sentinel: input.kind_name().to_string(),
                });
            }
            if source == DataSource::Argument {
                return Err(InputError::SentinelNotAllowed {
                    sentinel: input.kind_name().to_string(),
                });
            }
        }
        match input {
            UserValue::FieldDelete => Err(InputError::DeleteNotAllowed {
                context: source.delete_context().to_string(),
            }),
            UserValue::ServerTimestamp => {
                transforms.push(FieldTransform::new(path.clone(), Transform::ServerTimestamp));
                Ok(None)
            }
            UserValue::ArrayUnion(elements) => {
                let values = self.convert_operand_elements(elements, path, depth)?;
                transforms.push(FieldTransform::new(
                    path.clone(),
                    Transform::ArrayUnion(values),
                ));
                Ok(None)
            }
            UserValue::ArrayRemove(elements) => {
                let values = self.convert_operand_elements(elements, path, depth)?;
                transforms.push(FieldTransform::new(
                    path.clone(),
                    Transform::ArrayRemove(values),
                ));
                Ok(None)
            }
            UserValue::Increment(amount) => {
                let amount = *amount;
                if amount.is_sentinel() {
                    return Err(InputError::NonNumericIncrement {
                        actual: amount.kind_name().to_string(),
                    });
                }
                match self.convert_value(
                    amount,
                    path,
                    depth,
                    DataSource::Argument,
                    true,
                    transforms,
                )? {
                    Some(operand @ (Value::Int(_) | Value::Double(_))) => {
                        transforms.push(FieldTransform::new(
                            path.clone(),
                            Transform::Increment(operand),
                        ));
                        Ok(None)
                    }
                    Some(other) => Err(InputError::NonNumericIncrement {
                        actual: other.type_name().to_string(),
                    }),
                    None => Err(InputError::NonNumericIncrement {
                        actual: "sentinel".to_string(),
                    }),
                }
            }
            UserValue::Map(entries) => {
                let fields =
                    self.convert_entries(entries, path, depth + 1, source, in_array, transforms)?;
                Ok(Some(Value::Map(fields)))
            }
            UserValue::Array(elements) => {
                if depth + 1 > MAX_NESTING_DEPTH {
                    return Err(InputError::NestingTooDeep {
                        limit: MAX_NESTING_DEPTH,
                    });
                }
                let mut items = Vec::with_capacity(elements.len());
                for element in elements {
                    // Everything below an array element is "inside an array":
                    // sentinels are rejected at any depth.
                    if let Some(converted) =
                        self.convert_value(element, path, depth + 1, source, true, transforms)?
                    {
                        items.push(converted);
                    }
                }
                Ok(Some(Value::Array(items)))
            }
            UserValue::Null => Ok(Some(Value::Null)),
            UserValue::Bool(b) => Ok(Some(Value::Bool(b))),
            UserValue::Int(i) => Ok(Some(Value::Int(i))),
            UserValue::UInt(u) => {
                if u > i64::MAX as u64 {
                    return Err(InputError::IntegerOutOfRange { value: u });
                }
                Ok(Some(Value::Int(u as i64)))
            }
            UserValue::Double(d) => Ok(Some(Value::Double(d))),
            UserValue::Timestamp(t) => Ok(Some(Value::Timestamp(t))),
            UserValue::Text(s) => Ok(Some(Value::Text(s))),
            UserValue::Bytes(b) => Ok(Some(Value::Bytes(b))),
            UserValue::Geo(g) => Ok(Some(Value::Geo(g))),
            UserValue::Reference { database, key } => {
                if database != self.database {
                    return Err(InputError::DatabaseMismatch {
                        expected: self.database.to_string(),
                        actual: database.to_string(),
                    });
                }
                Ok(Some(Value::Reference { database, key }))
            }
        }
    }

    /// Converts the element list of an array-union or array-remove operand.
    /// Elements follow array rules: no sentinels at any depth.
    fn convert_operand_elements(
        &self,
        elements: Vec<UserValue>,
        path: &FieldPath,
        depth: usize,
    ) -> Result<Vec<Value>, InputError> {
        let mut scratch = Vec::new();
        let mut values = Vec::with_capacity(elements.len());
        for element in elements {
            if let Some(converted) = self.convert_value(
                element,
                path,
                depth + 1,
                DataSource::Argument,
                true,
                &mut scratch,
            )? {
                values.push(converted);
            }
        }
        Ok(values)
    }
}

/// Collapses duplicate keys, keeping first position but the last value.
fn dedup_last_write(entries: Vec<(String, UserValue)>) -> Vec<(String, UserValue)> {
    let mut out: Vec<(String, UserValue)> = Vec::with_capacity(entries.len());
    for (key, value) in entries {
        if let Some(existing) = out.iter_mut().find(|entry| entry.0 == key) {
            existing.1 = value;
        } else {
            out.push((key, value));
        }
    }
    out
}
