//! Canonical type ordering and equality across all value variants.

use std::collections::BTreeMap;

use lodestone::model::{DatabaseId, DocumentKey, GeoPoint, Value};

use crate::helpers::{test_database, ts};

fn reference(path: &str) -> Value {
    Value::Reference {
        database: test_database(),
        key: DocumentKey::new(path),
    }
}

/// The cross-type ordering chain from the contract: every variant outranks
/// the one before it regardless of payload.
#[test]
fn test_canonical_type_order_chain() {
    let chain = vec![
        Value::Null,
        Value::Bool(false),
        Value::Int(-5),
        Value::Double(0.0),
        Value::Timestamp(ts(1_700_000_000)),
        Value::Text(String::new()),
        Value::Bytes(Vec::new()),
        reference("rooms/eros"),
        Value::Geo(GeoPoint::new(-90.0, -180.0)),
        Value::Array(vec![]),
        Value::Map(BTreeMap::new()),
    ];
    for (i, a) in chain.iter().enumerate() {
        for (j, b) in chain.iter().enumerate() {
            match i.cmp(&j) {
                std::cmp::Ordering::Less => assert!(a < b, "{a} should sort before {b}"),
                std::cmp::Ordering::Equal => assert_eq!(a, b),
                std::cmp::Ordering::Greater => assert!(a > b, "{a} should sort after {b}"),
            }
        }
    }
}

#[test]
fn test_ordering_is_transitive_within_numbers() {
    let values = [
        Value::Double(f64::NAN),
        Value::Double(f64::NEG_INFINITY),
        Value::Int(i64::MIN),
        Value::Double(-1.5),
        Value::Int(0),
        Value::Double(1e-320), // subnormal
        Value::Double(0.5),
        Value::Int(1),
        Value::Double(f64::INFINITY),
    ];
    for window in values.windows(2) {
        assert!(window[0] <= window[1], "{} > {}", window[0], window[1]);
    }
    // Spot-check the endpoints directly.
    assert!(Value::Double(f64::NAN) < Value::Double(f64::INFINITY));
}

/// Equality must stay an equivalence relation past f64 precision: two
/// neighboring integers above 2^53 cannot both equal the same double.
#[test]
fn test_numeric_equality_is_transitive_beyond_double_precision() {
    let small_int = Value::Int(1 << 53);
    let big_int = Value::Int((1 << 53) + 1);
    let double = Value::Double(9_007_199_254_740_992.0);

    assert_eq!(small_int, double);
    assert!(big_int > double);
    assert!(big_int > small_int);
    assert_ne!(big_int, small_int);
    assert_ne!(big_int, double);
}

#[test]
fn test_booleans_never_equal_numbers() {
    assert_ne!(Value::Bool(false), Value::Int(0));
    assert_ne!(Value::Bool(true), Value::Int(1));
    assert_ne!(Value::Bool(true), Value::Double(1.0));
    assert!(Value::Bool(true) < Value::Int(0));
}

#[test]
fn test_null_equals_null() {
    assert_eq!(Value::Null, Value::Null);
    assert!(!(Value::Null < Value::Null));
}

#[test]
fn test_deep_equality_of_composites() {
    let a = Value::Array(vec![
        Value::Int(1),
        Value::Map(BTreeMap::from([("k".to_string(), Value::Text("v".into()))])),
    ]);
    let b = Value::Array(vec![
        Value::Int(1),
        Value::Map(BTreeMap::from([("k".to_string(), Value::Text("v".into()))])),
    ]);
    assert_eq!(a, b);

    // Int/Double cross-type equality applies element-wise too.
    let c = Value::Array(vec![Value::Int(1)]);
    let d = Value::Array(vec![Value::Double(1.0)]);
    assert_eq!(c, d);
}

#[test]
fn test_map_ordering_by_sorted_key_then_value() {
    let a = Value::Map(BTreeMap::from([("a".to_string(), Value::Int(1))]));
    let b = Value::Map(BTreeMap::from([("a".to_string(), Value::Int(2))]));
    let c = Value::Map(BTreeMap::from([("b".to_string(), Value::Int(0))]));
    assert!(a < b);
    assert!(b < c);

    // A map with an extra later key sorts after its prefix map.
    let d = Value::Map(BTreeMap::from([
        ("a".to_string(), Value::Int(1)),
        ("b".to_string(), Value::Int(0)),
    ]));
    assert!(a < d);
}

#[test]
fn test_references_compare_by_database_then_key() {
    let home = Value::Reference {
        database: DatabaseId::new("p1", "(default)"),
        key: DocumentKey::new("users/b"),
    };
    let other = Value::Reference {
        database: DatabaseId::new("p2", "(default)"),
        key: DocumentKey::new("users/a"),
    };
    assert!(home < other);
}

#[test]
fn test_value_serde_round_trip() {
    let original = Value::Map(BTreeMap::from([
        ("text".to_string(), Value::Text("hello".into())),
        ("int".to_string(), Value::Int(42)),
        ("double".to_string(), Value::Double(2.5)),
        ("bytes".to_string(), Value::Bytes(vec![0, 1, 2])),
        ("when".to_string(), Value::Timestamp(ts(1_700_000_000))),
        ("geo".to_string(), Value::Geo(GeoPoint::new(48.85, 2.35))),
        (
            "items".to_string(),
            Value::Array(vec![Value::Null, Value::Bool(true)]),
        ),
    ]));
    let encoded = serde_json::to_string(&original).unwrap();
    let decoded: Value = serde_json::from_str(&encoded).unwrap();
    assert_eq!(original, decoded);
}
