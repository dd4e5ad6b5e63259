use pretty_assertions::assert_eq;

use crate::{
    ast::InputValue,
    meta::{Argument, EnumValue, Field},
    ExecuteOptions, GraphQLError, Resolution, Schema, SchemaBuilder, Type, Value, Variables,
};

fn echo_schema() -> Schema {
    SchemaBuilder::new()
        .query(|obj| {
            obj.field(
                Field::new("echo", Type::named("String"))
                    .argument(Argument::new("word", Type::named("String").non_null()))
                    .resolver(|args, _| {
                        Resolution::ok(args.get_str("word").unwrap_or_default())
                    }),
            )
            .field(
                Field::new("sum", Type::named("Int"))
                    .argument(Argument::new(
                        "ints",
                        Type::list(Type::named("Int").non_null()),
                    ))
                    .resolver(|args, _| {
                        let total = args
                            .get("ints")
                            .and_then(Value::as_list_value)
                            .map(|l| l.iter().filter_map(Value::as_int_value).sum::<i64>())
                            .unwrap_or_default();
                        Resolution::ok(total)
                    }),
            )
            .field(
                Field::new("channel", Type::named("Channel"))
                    .argument(Argument::new("c", Type::named("Channel").non_null()))
                    .resolver(|args, _| {
                        Resolution::ok(args.get("c").cloned().unwrap_or(Value::Null))
                    }),
            )
        })
        .enum_type("channel", |e| {
            e.value(EnumValue::new("RED").value("r"))
                .value(EnumValue::new("BLUE").value("b"))
        })
        .build()
        .unwrap()
}

fn raw_variables(pairs: &[(&str, InputValue)]) -> Variables {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), v.clone()))
        .collect()
}

#[test]
fn variables_flow_into_arguments() {
    let response = crate::run_sync(
        &echo_schema(),
        r#"query Echo($w: String!) { echo(word: $w) }"#,
        ExecuteOptions {
            variables: raw_variables(&[("w", InputValue::String("hello".into()))]),
            ..Default::default()
        },
    );
    let (data, errors) = response.into_inner().unwrap();
    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(
        serde_json::to_value(&data).unwrap(),
        serde_json::json!({"echo": "hello"}),
    );
}

#[test]
fn missing_required_variables_are_fatal() {
    let response = crate::run_sync(
        &echo_schema(),
        r#"query Echo($w: String!) { echo(word: $w) }"#,
        ExecuteOptions::default(),
    );
    match response.into_inner() {
        Err(GraphQLError::VariableCoercionError(errors)) => {
            assert_eq!(errors.len(), 1);
            assert_eq!(
                errors[0].message(),
                r#"Variable "$w" of required type "String!" was not provided."#,
            );
        }
        other => panic!("expected a variable coercion error, got {other:?}"),
    }
}

#[test]
fn defaults_apply_when_no_value_is_provided() {
    let response = crate::run_sync(
        &echo_schema(),
        r#"query Echo($w: String! = "fallback") { echo(word: $w) }"#,
        ExecuteOptions::default(),
    );
    let (data, _) = response.into_inner().unwrap();
    assert_eq!(
        serde_json::to_value(&data).unwrap(),
        serde_json::json!({"echo": "fallback"}),
    );
}

#[test]
fn invalid_values_are_fatal_with_a_path() {
    let response = crate::run_sync(
        &echo_schema(),
        r#"query Sum($ints: [Int!]) { sum(ints: $ints) }"#,
        ExecuteOptions {
            variables: raw_variables(&[(
                "ints",
                InputValue::List(vec![InputValue::Int(1), InputValue::Boolean(true)]),
            )]),
            ..Default::default()
        },
    );
    match response.into_inner() {
        Err(GraphQLError::VariableCoercionError(errors)) => {
            assert_eq!(errors.len(), 1);
            assert!(
                errors[0].message().starts_with(
                    r#"Variable "$ints" got invalid value. In element #1: "#
                ),
                "unexpected message: {}",
                errors[0].message(),
            );
        }
        other => panic!("expected a variable coercion error, got {other:?}"),
    }
}

#[test]
fn single_values_coerce_into_lists() {
    let response = crate::run_sync(
        &echo_schema(),
        r#"{ sum(ints: 41) }"#,
        ExecuteOptions::default(),
    );
    let (data, _) = response.into_inner().unwrap();
    assert_eq!(
        serde_json::to_value(&data).unwrap(),
        serde_json::json!({"sum": 41}),
    );
}

#[test]
fn variables_nested_in_list_literals_resolve() {
    let response = crate::run_sync(
        &echo_schema(),
        r#"query Sum($a: Int!, $b: Int!) { sum(ints: [$a, $b, 3]) }"#,
        ExecuteOptions {
            variables: raw_variables(&[
                ("a", InputValue::Int(1)),
                ("b", InputValue::Int(2)),
            ]),
            ..Default::default()
        },
    );
    let (data, errors) = response.into_inner().unwrap();
    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(
        serde_json::to_value(&data).unwrap(),
        serde_json::json!({"sum": 6}),
    );
}

#[test]
fn enum_variables_arrive_as_strings() {
    // Raw transports have no enum literals; a string naming the value works.
    let response = crate::run_sync(
        &echo_schema(),
        r#"query C($c: Channel!) { channel(c: $c) }"#,
        ExecuteOptions {
            variables: raw_variables(&[("c", InputValue::String("BLUE".into()))]),
            ..Default::default()
        },
    );
    let (data, errors) = response.into_inner().unwrap();
    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(
        serde_json::to_value(&data).unwrap(),
        serde_json::json!({"channel": "BLUE"}),
    );
}
