//! Conversion rules for set data: type coercion, sentinel extraction, and
//! validation.

use lodestone::model::{DatabaseId, GeoPoint, Value};
use lodestone::mutation::Transform;
use lodestone::reader::{InputError, UserValue};

use crate::helpers::{doc_key, path, test_database, test_reader, ts};

#[test]
fn test_primitive_round_trip() {
    let parsed = test_reader()
        .parse_set_data(UserValue::map([
            ("null", UserValue::Null),
            ("bool", UserValue::from(true)),
            ("int", UserValue::from(-42i64)),
            ("double", UserValue::from(1.5f64)),
            ("text", UserValue::from("hello")),
            ("when", UserValue::from(ts(1_700_000_000))),
            ("geo", UserValue::from(GeoPoint::new(48.85, 2.35))),
            ("blob", UserValue::bytes(vec![0xde, 0xad])),
        ]))
        .unwrap();
    let data = parsed.data();

    assert_eq!(data.get(&path("null")), Some(&Value::Null));
    assert_eq!(data.get(&path("bool")), Some(&Value::Bool(true)));
    assert_eq!(data.get(&path("int")), Some(&Value::Int(-42)));
    assert_eq!(data.get(&path("double")), Some(&Value::Double(1.5)));
    assert_eq!(data.get(&path("text")), Some(&Value::Text("hello".into())));
    assert_eq!(
        data.get(&path("when")),
        Some(&Value::Timestamp(ts(1_700_000_000)))
    );
    assert_eq!(
        data.get(&path("geo")),
        Some(&Value::Geo(GeoPoint::new(48.85, 2.35)))
    );
    assert_eq!(data.get(&path("blob")), Some(&Value::Bytes(vec![0xde, 0xad])));
    assert!(parsed.transforms().is_empty());
}

/// Special doubles survive conversion bit-exactly: no rounding or
/// normalization of -0.0, infinities, NaN, or subnormals.
#[test]
fn test_special_doubles_preserved_bit_exactly() {
    let cases = [
        -0.0f64,
        f64::INFINITY,
        f64::NEG_INFINITY,
        f64::NAN,
        1e-320, // subnormal
        f64::MIN_POSITIVE,
    ];
    for original in cases {
        let parsed = test_reader()
            .parse_set_data(UserValue::map([("d", UserValue::from(original))]))
            .unwrap();
        let Some(Value::Double(converted)) = parsed.data().get(&path("d")) else {
            panic!("expected a double for {original}");
        };
        assert_eq!(
            converted.to_bits(),
            original.to_bits(),
            "bit pattern changed for {original}"
        );
    }
}

#[test]
fn test_booleans_never_route_through_integers() {
    let parsed = test_reader()
        .parse_set_data(UserValue::map([("flag", UserValue::from(true))]))
        .unwrap();
    let flag = parsed.data().get(&path("flag")).unwrap();
    assert_eq!(flag, &Value::Bool(true));
    assert_ne!(flag, &Value::Int(1));
}

#[test]
fn test_integer_widths_widen_exactly() {
    let parsed = test_reader()
        .parse_set_data(UserValue::map([
            ("i8", UserValue::from(i8::MIN)),
            ("i16", UserValue::from(i16::MAX)),
            ("u16", UserValue::from(u16::MAX)),
            ("u32", UserValue::from(u32::MAX)),
            ("u64", UserValue::from(12345u64)),
        ]))
        .unwrap();
    let data = parsed.data();
    assert_eq!(data.get(&path("i8")), Some(&Value::Int(i8::MIN as i64)));
    assert_eq!(data.get(&path("i16")), Some(&Value::Int(i16::MAX as i64)));
    assert_eq!(data.get(&path("u16")), Some(&Value::Int(u16::MAX as i64)));
    assert_eq!(data.get(&path("u32")), Some(&Value::Int(u32::MAX as i64)));
    assert_eq!(data.get(&path("u64")), Some(&Value::Int(12345)));
}

#[test]
fn test_arrays_preserve_order() {
    let parsed = test_reader()
        .parse_set_data(UserValue::map([(
            "items",
            UserValue::array([
                UserValue::from(3i64),
                UserValue::from(1i64),
                UserValue::from(2i64),
            ]),
        )]))
        .unwrap();
    assert_eq!(
        parsed.data().get(&path("items")),
        Some(&Value::Array(vec![
            Value::Int(3),
            Value::Int(1),
            Value::Int(2)
        ]))
    );
}

#[test]
fn test_nested_maps_convert_recursively() {
    let parsed = test_reader()
        .parse_set_data(UserValue::map([(
            "user",
            UserValue::map([
                ("name", UserValue::from("Ada")),
                ("tags", UserValue::array([UserValue::from("a")])),
            ]),
        )]))
        .unwrap();
    assert_eq!(
        parsed.data().get(&path("user.name")),
        Some(&Value::Text("Ada".into()))
    );
}

#[test]
fn test_reference_from_same_database_accepted() {
    let parsed = test_reader()
        .parse_set_data(UserValue::map([(
            "friend",
            UserValue::reference(test_database(), doc_key("users/ada")),
        )]))
        .unwrap();
    assert!(matches!(
        parsed.data().get(&path("friend")),
        Some(Value::Reference { .. })
    ));
}

#[test]
fn test_reference_from_other_database_rejected() {
    let err = test_reader()
        .parse_set_data(UserValue::map([(
            "friend",
            UserValue::reference(
                DatabaseId::with_default_database("other-project"),
                doc_key("users/ada"),
            ),
        )]))
        .unwrap_err();
    assert!(matches!(err, InputError::DatabaseMismatch { .. }));
    assert!(format!("{err}").contains("different database"));
}

#[test]
fn test_top_level_non_object_rejected() {
    let err = test_reader()
        .parse_set_data(UserValue::from(42i64))
        .unwrap_err();
    assert!(matches!(err, InputError::NotAnObject { .. }));
}

#[test]
fn test_server_timestamp_extracted_from_tree() {
    let parsed = test_reader()
        .parse_set_data(UserValue::map([
            ("name", UserValue::from("Ada")),
            ("updated", UserValue::server_timestamp()),
        ]))
        .unwrap();

    assert_eq!(parsed.data().get(&path("updated")), None);
    assert_eq!(parsed.data().len(), 1);
    assert_eq!(parsed.transforms().len(), 1);
    assert_eq!(parsed.transforms()[0].field(), &path("updated"));
    assert_eq!(
        parsed.transforms()[0].transform(),
        &Transform::ServerTimestamp
    );
}

#[test]
fn test_nested_sentinel_keyed_by_full_path() {
    let parsed = test_reader()
        .parse_set_data(UserValue::map([(
            "meta",
            UserValue::map([("updated", UserValue::server_timestamp())]),
        )]))
        .unwrap();
    assert_eq!(parsed.transforms()[0].field(), &path("meta.updated"));
    // The enclosing map stays in the payload, now empty.
    assert!(matches!(
        parsed.data().get(&path("meta")),
        Some(Value::Map(fields)) if fields.is_empty()
    ));
}

#[test]
fn test_array_union_operands_converted() {
    let parsed = test_reader()
        .parse_set_data(UserValue::map([(
            "tags",
            UserValue::array_union([UserValue::from("a"), UserValue::from(1i64)]),
        )]))
        .unwrap();
    assert_eq!(
        parsed.transforms()[0].transform(),
        &Transform::ArrayUnion(vec![Value::Text("a".into()), Value::Int(1)])
    );
}

#[test]
fn test_increment_operand_kinds() {
    let parsed = test_reader()
        .parse_set_data(UserValue::map([
            ("hits", UserValue::increment(1i64)),
            ("score", UserValue::increment(0.5f64)),
        ]))
        .unwrap();
    assert_eq!(
        parsed.transforms()[0].transform(),
        &Transform::Increment(Value::Int(1))
    );
    assert_eq!(
        parsed.transforms()[1].transform(),
        &Transform::Increment(Value::Double(0.5))
    );
}

#[test]
fn test_non_numeric_increment_rejected() {
    let err = test_reader()
        .parse_set_data(UserValue::map([(
            "hits",
            UserValue::increment(UserValue::from("one")),
        )]))
        .unwrap_err();
    assert!(matches!(err, InputError::NonNumericIncrement { .. }));
}

#[test]
fn test_sentinel_inside_array_rejected() {
    let err = test_reader()
        .parse_set_data(UserValue::map([(
            "items",
            UserValue::array([UserValue::server_timestamp()]),
        )]))
        .unwrap_err();
    assert!(matches!(err, InputError::SentinelInArray { .. }));
}

#[test]
fn test_sentinel_below_array_element_rejected() {
    // A sentinel hidden inside a map that is itself an array element.
    let err = test_reader()
        .parse_set_data(UserValue::map([(
            "items",
            UserValue::array([UserValue::map([("inner", UserValue::increment(1i64))])]),
        )]))
        .unwrap_err();
    assert!(matches!(err, InputError::SentinelInArray { .. }));
}

#[test]
fn test_delete_sentinel_rejected_in_set_data() {
    let err = test_reader()
        .parse_set_data(UserValue::map([("gone", UserValue::delete())]))
        .unwrap_err();
    assert!(matches!(err, InputError::DeleteNotAllowed { .. }));
}

#[test]
fn test_transform_order_follows_input_field_order() {
    let parsed = test_reader()
        .parse_set_data(UserValue::map([
            ("z", UserValue::server_timestamp()),
            ("a", UserValue::increment(1i64)),
            ("m", UserValue::array_union([UserValue::from(1i64)])),
        ]))
        .unwrap();
    let order: Vec<String> = parsed
        .transforms()
        .iter()
        .map(|t| t.field().to_string())
        .collect();
    assert_eq!(order, ["z", "a", "m"]);
}

/// Structurally identical input produces deeply-equal payloads and
/// identically-ordered transform lists.
#[test]
fn test_conversion_is_deterministic() {
    let build = || {
        UserValue::map([
            ("b", UserValue::from(2i64)),
            ("a", UserValue::map([("x", UserValue::server_timestamp())])),
            ("c", UserValue::increment(3i64)),
        ])
    };
    let first = test_reader().parse_set_data(build()).unwrap();
    let second = test_reader().parse_set_data(build()).unwrap();

    assert_eq!(first.data(), second.data());
    assert_eq!(first.transforms(), second.transforms());
}
