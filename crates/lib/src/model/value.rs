//! The canonical document value type.
//!
//! This module provides the [`Value`] enum representing every kind of data a
//! document can store, along with the canonical cross-type ordering that
//! indexing, query evaluation, and conflict resolution all rely on. Values
//! are immutable, exclusively-owned trees: arrays and maps embed their
//! children by value, and construction is strictly bottom-up, so cycles are
//! unrepresentable.

use std::{cmp::Ordering, collections::BTreeMap, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DatabaseId, DocumentKey, GeoPoint, ModelError, ObjectValue};

/// One piece of document data.
///
/// `Value` is a closed tagged union: every storable kind is a variant, and
/// every accessor and comparison site matches exhaustively, so there is no
/// dynamic type-check-and-cast path anywhere in the model.
///
/// # Canonical type order
///
/// Cross-type comparison follows a fixed ranking:
///
/// Null < Bool < Int/Double < Timestamp < Text < Bytes < Reference < Geo <
/// Array < Map
///
/// Int and Double share a rank and compare by numeric value, so
/// `Int(1) == Double(1.0)`. NaN is equal only to NaN and sorts below every
/// other number. Booleans are never numbers: `Bool(true) != Int(1)`.
///
/// ```
/// use lodestone::model::Value;
///
/// assert!(Value::Null < Value::Bool(false));
/// assert!(Value::Bool(true) < Value::Int(0));
/// assert_eq!(Value::Int(1), Value::Double(1.0));
/// assert_ne!(Value::Bool(true), Value::Int(1));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// IEEE-754 double, stored bit-exactly
    Double(f64),
    /// Point in time, nanosecond precision
    Timestamp(DateTime<Utc>),
    /// UTF-8 text
    Text(String),
    /// Opaque byte blob
    Bytes(#[serde(with = "serde_bytes")] Vec<u8>),
    /// Reference to a document in a specific database
    Reference {
        database: DatabaseId,
        key: DocumentKey,
    },
    /// Latitude/longitude pair
    Geo(GeoPoint),
    /// Ordered collection of values
    Array(Vec<Value>),
    /// Nested string-keyed mapping
    Map(BTreeMap<String, Value>),
}

/// Compares two doubles totally: NaN equals NaN and sorts below every other
/// number, and `-0.0` equals `0.0`.
fn cmp_doubles(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

// 2^63 as f64. Exactly representable; every i64 is strictly below it and
// i64::MIN equals its negation.
const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;

/// Compares an integer with a double exactly.
///
/// Converting the integer to f64 would round above 2^53 and collapse
/// distinct integers onto one double, breaking transitivity. Instead the
/// double is range-checked against the i64 domain and, within it, compared
/// via its exact truncation.
fn cmp_int_double(a: i64, b: f64) -> Ordering {
    if b.is_nan() {
        // NaN sorts below every other number.
        return Ordering::Greater;
    }
    if b >= TWO_POW_63 {
        return Ordering::Less;
    }
    if b < -TWO_POW_63 {
        return Ordering::Greater;
    }
    // In range, the truncated double is an integer f64 can hold exactly, so
    // the cast is lossless.
    let truncated = b.trunc() as i64;
    a.cmp(&truncated).then_with(|| {
        if b.fract() > 0.0 {
            Ordering::Less
        } else if b.fract() < 0.0 {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    })
}

impl Value {
    /// Returns the rank of this value's variant in the canonical type order.
    ///
    /// Int and Double share a rank; within it, values compare numerically.
    pub fn type_order(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) | Value::Double(_) => 2,
            Value::Timestamp(_) => 3,
            Value::Text(_) => 4,
            Value::Bytes(_) => 5,
            Value::Reference { .. } => 6,
            Value::Geo(_) => 7,
            Value::Array(_) => 8,
            Value::Map(_) => 9,
        }
    }

    /// Returns the variant name as a string.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Double(_) => "double",
            Value::Timestamp(_) => "timestamp",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::Reference { .. } => "reference",
            Value::Geo(_) => "geo",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
        }
    }

    /// Returns true if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true if this is an Int or Double.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Double(_))
    }

    /// Returns true if this is an Array or Map.
    pub fn is_composite(&self) -> bool {
        matches!(self, Value::Array(_) | Value::Map(_))
    }

    /// Attempts to read this value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to read this value as an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to read this value as a double.
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    /// Attempts to read this value as a timestamp.
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    /// Attempts to read this value as text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to read this value as a byte blob.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Attempts to read this value as a geo point.
    pub fn as_geo(&self) -> Option<GeoPoint> {
        match self {
            Value::Geo(g) => Some(*g),
            _ => None,
        }
    }

    /// Attempts to read this value as an array slice.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Attempts to read this value as a map.
    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(fields) => Some(fields),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        use Value::*;
        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Int(a), Int(b)) => a.cmp(b),
            (Int(a), Double(b)) => cmp_int_double(*a, *b),
            (Double(a), Int(b)) => cmp_int_double(*b, *a).reverse(),
            (Double(a), Double(b)) => cmp_doubles(*a, *b),
            (Timestamp(a), Timestamp(b)) => a.cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            (Bytes(a), Bytes(b)) => a.cmp(b),
            (
                Reference {
                    database: da,
                    key: ka,
                },
                Reference {
                    database: db,
                    key: kb,
                },
            ) => da.cmp(db).then_with(|| ka.cmp(kb)),
            (Geo(a), Geo(b)) => a.cmp(b),
            // Element-wise, then by length
            (Array(a), Array(b)) => a.cmp(b),
            // BTreeMap iterates in key order: sorted key, then value, then length
            (Map(a), Map(b)) => a.cmp(b),
            _ => self.type_order().cmp(&other.type_order()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Double(d) => write!(f, "{d}"),
            Value::Timestamp(t) => write!(f, "{}", t.to_rfc3339()),
            Value::Text(s) => write!(f, "\"{}\"", s.replace('\"', "\\\"")),
            Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Value::Reference { database, key } => write!(f, "{database}/{key}"),
            Value::Geo(g) => write!(f, "{g}"),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Map(fields) => {
                write!(f, "{{")?;
                for (i, (key, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

// Convenient From implementations for common types
impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        // f32 -> f64 widening is exact
        Value::Double(value as f64)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Timestamp(value)
    }
}

impl From<GeoPoint> for Value {
    fn from(value: GeoPoint) -> Self {
        Value::Geo(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(value: BTreeMap<String, Value>) -> Self {
        Value::Map(value)
    }
}

impl From<ObjectValue> for Value {
    fn from(value: ObjectValue) -> Self {
        value.into_value()
    }
}

// TryFrom implementations for typed extraction with a structured error
impl TryFrom<&Value> for bool {
    type Error = ModelError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        value.as_bool().ok_or_else(|| ModelError::TypeMismatch {
            expected: "bool".to_string(),
            actual: value.type_name().to_string(),
        })
    }
}

impl TryFrom<&Value> for i64 {
    type Error = ModelError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        value.as_int().ok_or_else(|| ModelError::TypeMismatch {
            expected: "int".to_string(),
            actual: value.type_name().to_string(),
        })
    }
}

impl TryFrom<&Value> for f64 {
    type Error = ModelError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        value.as_double().ok_or_else(|| ModelError::TypeMismatch {
            expected: "double".to_string(),
            actual: value.type_name().to_string(),
        })
    }
}

impl TryFrom<&Value> for String {
    type Error = ModelError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        value
            .as_text()
            .map(str::to_string)
            .ok_or_else(|| ModelError::TypeMismatch {
                expected: "text".to_string(),
                actual: value.type_name().to_string(),
            })
    }
}

impl<'a> TryFrom<&'a Value> for &'a str {
    type Error = ModelError;

    fn try_from(value: &'a Value) -> Result<Self, Self::Error> {
        value.as_text().ok_or_else(|| ModelError::TypeMismatch {
            expected: "text".to_string(),
            actual: value.type_name().to_string(),
        })
    }
}

impl TryFrom<&Value> for GeoPoint {
    type Error = ModelError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        value.as_geo().ok_or_else(|| ModelError::TypeMismatch {
            expected: "geo".to_string(),
            actual: value.type_name().to_string(),
        })
    }
}

impl TryFrom<&Value> for DateTime<Utc> {
    type Error = ModelError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        value.as_timestamp().ok_or_else(|| ModelError::TypeMismatch {
            expected: "timestamp".to_string(),
            actual: value.type_name().to_string(),
        })
    }
}

impl TryFrom<&Value> for ObjectValue {
    type Error = ModelError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Map(fields) => Ok(ObjectValue::new(fields.clone())),
            _ => Err(ModelError::TypeMismatch {
                expected: "map".to_string(),
                actual: value.type_name().to_string(),
            }),
        }
    }
}
