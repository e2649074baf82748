//! Full pipeline: host input through the reader into a mutation, then
//! transform resolution against prior document state.

use lodestone::model::Value;
use lodestone::mutation::{Mutation, Precondition};
use lodestone::reader::UserValue;

use crate::helpers::{doc_key, path, test_reader, ts};

#[test]
fn test_set_flow_from_input_to_mutation() {
    let mutation = test_reader()
        .parse_set_data(UserValue::map([
            ("name", UserValue::from("Ada")),
            ("visits", UserValue::increment(1i64)),
            ("updated", UserValue::server_timestamp()),
        ]))
        .unwrap()
        .into_mutation(doc_key("users/ada"), Precondition::None)
        .unwrap();

    let Mutation::Set(set) = &mutation else {
        panic!("expected a set mutation");
    };
    assert_eq!(set.data().get(&path("name")), Some(&Value::Text("Ada".into())));
    assert_eq!(set.data().len(), 1);
    assert_eq!(mutation.field_transforms().len(), 2);
}

#[test]
fn test_update_flow_from_input_to_mutation() {
    let mutation = test_reader()
        .parse_update_data(vec![
            ("user.name".to_string(), UserValue::from("Ada")),
            ("stale".to_string(), UserValue::delete()),
            ("hits".to_string(), UserValue::increment(1i64)),
        ])
        .unwrap()
        .into_mutation(doc_key("users/ada"), Precondition::Exists)
        .unwrap();

    let Mutation::Patch(patch) = &mutation else {
        panic!("expected a patch mutation");
    };
    assert!(patch.mask().contains(&path("user.name")));
    assert!(patch.mask().contains(&path("stale")));
    assert!(!patch.mask().contains(&path("hits")));
    assert_eq!(mutation.field_transforms().len(), 1);
    assert_eq!(mutation.precondition(), &Precondition::Exists);
}

/// Duplicate paths: the reader collapses duplicate keys before building the
/// transform list, so the builder's overlap check passes.
#[test]
fn test_duplicate_transform_keys_collapse_before_build() {
    let mutation = test_reader()
        .parse_set_data(UserValue::map([
            ("hits", UserValue::increment(1i64)),
            ("hits", UserValue::increment(5i64)),
        ]))
        .unwrap()
        .into_mutation(doc_key("users/ada"), Precondition::None)
        .unwrap();
    assert_eq!(mutation.field_transforms().len(), 1);
    assert_eq!(
        mutation.field_transforms()[0].transform(),
        &lodestone::mutation::Transform::Increment(Value::Int(5))
    );
}

#[test]
fn test_resolving_transforms_against_previous_state() {
    let parsed = test_reader()
        .parse_set_data(UserValue::map([
            ("visits", UserValue::increment(2i64)),
            (
                "tags",
                UserValue::array_union([UserValue::from("new"), UserValue::from("old")]),
            ),
            ("updated", UserValue::server_timestamp()),
        ]))
        .unwrap();

    let commit_time = ts(1_700_000_000);
    let previous_visits = Value::Int(40);
    let previous_tags = Value::Array(vec![Value::Text("old".into())]);

    let resolved: Vec<Value> = parsed
        .transforms()
        .iter()
        .map(|ft| {
            let previous = match ft.field().to_string().as_str() {
                "visits" => Some(&previous_visits),
                "tags" => Some(&previous_tags),
                _ => None,
            };
            ft.transform().resolve(previous, commit_time)
        })
        .collect();

    assert_eq!(resolved[0], Value::Int(42));
    assert_eq!(
        resolved[1],
        Value::Array(vec![Value::Text("old".into()), Value::Text("new".into())])
    );
    assert_eq!(resolved[2], Value::Timestamp(commit_time));
}

#[test]
fn test_patch_payload_applies_over_existing_document() {
    let existing = test_reader()
        .parse_set_data(UserValue::map([
            ("name", UserValue::from("Ada")),
            ("age", UserValue::from(36i64)),
            ("stale", UserValue::from(true)),
        ]))
        .unwrap();

    let update = test_reader()
        .parse_update_data(vec![
            ("age".to_string(), UserValue::from(37i64)),
            ("stale".to_string(), UserValue::delete()),
        ])
        .unwrap();

    let merged = existing.data().apply_patch(update.data(), update.mask());
    assert_eq!(merged.get(&path("name")), Some(&Value::Text("Ada".into())));
    assert_eq!(merged.get(&path("age")), Some(&Value::Int(37)));
    assert_eq!(merged.get(&path("stale")), None);
}
