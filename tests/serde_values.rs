//! Serialized forms of the value types.
#![cfg(feature = "serde")]

use graph_changeset::{Cardinality, FieldKind, Id, Op, Value};

#[test]
fn test_values_round_trip_through_json() {
    let values = vec![
        Value::Bool(true),
        Value::Int(-3),
        Value::Float(1.5),
        Value::String("gear".into()),
        Value::Time(1_700_000_000_000_000_000),
        Value::Enum("DONE".into()),
        Value::Strings(vec!["a".into(), "b".into()]),
        Value::Json(r#"{"k":1}"#.into()),
    ];
    let json = serde_json::to_string(&values).unwrap();
    let back: Vec<Value> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, values);
}

#[test]
fn test_id_is_transparent() {
    assert_eq!(serde_json::to_string(&Id(42)).unwrap(), "42");
    assert_eq!(serde_json::from_str::<Id>("7").unwrap(), Id(7));
}

#[test]
fn test_op_and_cardinality_names() {
    assert_eq!(serde_json::to_string(&Op::UpdateOne).unwrap(), r#""UpdateOne""#);
    assert_eq!(
        serde_json::from_str::<Op>(r#""DeleteOne""#).unwrap(),
        Op::DeleteOne
    );
    assert_eq!(serde_json::to_string(&Cardinality::Many).unwrap(), r#""Many""#);
}

#[test]
fn test_field_kind_serializes_enum_members() {
    let kind = FieldKind::Enum(&["PLANNED", "DONE"]);
    assert_eq!(
        serde_json::to_string(&kind).unwrap(),
        r#"{"Enum":["PLANNED","DONE"]}"#
    );
    assert_eq!(serde_json::to_string(&FieldKind::Int).unwrap(), r#""Int""#);
}
