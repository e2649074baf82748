//! Field transforms and their resolution.
//!
//! A [`Transform`] is a write operation that cannot be fully resolved on the
//! client: its result depends on state (the prior field value, the server
//! commit time) that is only known later. Transforms are carried on mutations
//! as data and resolved by the sync layer once the prior value is available.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{FieldPath, Value};

/// A deferred, non-idempotent field operation.
///
/// Each variant carries the operands needed to compute its result once the
/// previous value is known. Resolution ([`Transform::resolve`]) is a pure,
/// total function and is never performed during construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transform {
    /// Resolves to the commit timestamp supplied by the sync layer.
    ///
    /// Before a write is acknowledged, the sync layer passes its local clock
    /// as an estimate; after acknowledgement it passes the server's commit
    /// time.
    ServerTimestamp,
    /// Appends each operand element unless a deeply-equal element already
    /// exists. First-occurrence order is preserved.
    ArrayUnion(Vec<Value>),
    /// Drops every element deeply-equal to any operand element.
    ArrayRemove(Vec<Value>),
    /// Adds a numeric operand to the previous value.
    ///
    /// The operand is always `Int` or `Double`; the reader guarantees this
    /// during conversion.
    Increment(Value),
}

impl Transform {
    /// Computes the concrete value of this transform given the previous
    /// field value (absent if the field or document did not exist).
    ///
    /// `commit_time` is only consulted by [`Transform::ServerTimestamp`].
    ///
    /// # Numeric promotion
    ///
    /// Increment follows the numeric-promotion rule: Int + Int stays Int
    /// with **saturating** overflow at the i64 bounds; if either side is a
    /// Double the result is a Double. A missing or non-numeric previous
    /// value contributes a base of `Int(0)` or `Double(0.0)` matching the
    /// operand.
    pub fn resolve(&self, previous: Option<&Value>, commit_time: DateTime<Utc>) -> Value {
        match self {
            Transform::ServerTimestamp => Value::Timestamp(commit_time),
            Transform::Increment(operand) => resolve_increment(operand, previous),
            Transform::ArrayUnion(elements) => {
                let mut result = previous_array(previous);
                for element in elements {
                    if !result.contains(element) {
                        result.push(element.clone());
                    }
                }
                Value::Array(result)
            }
            Transform::ArrayRemove(elements) => {
                let mut result = previous_array(previous);
                result.retain(|existing| !elements.contains(existing));
                Value::Array(result)
            }
        }
    }

    /// Returns the operation name, used in logs and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Transform::ServerTimestamp => "server_timestamp",
            Transform::ArrayUnion(_) => "array_union",
            Transform::ArrayRemove(_) => "array_remove",
            Transform::Increment(_) => "increment",
        }
    }
}

/// Treats a missing or non-array previous value as an empty array.
fn previous_array(previous: Option<&Value>) -> Vec<Value> {
    match previous {
        Some(Value::Array(items)) => items.clone(),
        _ => Vec::new(),
    }
}

fn resolve_increment(operand: &Value, previous: Option<&Value>) -> Value {
    // Base is the previous value when numeric, otherwise zero of the
    // operand's numeric kind.
    let base = match previous {
        Some(value @ (Value::Int(_) | Value::Double(_))) => value.clone(),
        _ => match operand {
            Value::Double(_) => Value::Double(0.0),
            _ => Value::Int(0),
        },
    };
    match (&base, operand) {
        (Value::Int(prev), Value::Int(amount)) => Value::Int(prev.saturating_add(*amount)),
        (Value::Int(prev), Value::Double(amount)) => Value::Double(*prev as f64 + amount),
        (Value::Double(prev), Value::Int(amount)) => Value::Double(prev + *amount as f64),
        (Value::Double(prev), Value::Double(amount)) => Value::Double(prev + amount),
        // Unreachable for reader-built transforms; stay total regardless.
        _ => base,
    }
}

/// A [`Transform`] bound to the field path it applies to.
///
/// Within one mutation, field transforms keep the order in which their paths
/// were encountered during conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldTransform {
    field: FieldPath,
    transform: Transform,
}

impl FieldTransform {
    /// Binds a transform to a field path.
    pub fn new(field: FieldPath, transform: Transform) -> Self {
        FieldTransform { field, transform }
    }

    /// The path this transform applies to.
    pub fn field(&self) -> &FieldPath {
        &self.field
    }

    /// The transform operation.
    pub fn transform(&self) -> &Transform {
        &self.transform
    }
}
