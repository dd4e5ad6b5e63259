use std::collections::HashMap;

use pretty_assertions::assert_eq;

use crate::{
    meta::{Argument, Field},
    value::Object,
    Cancellation, ExecuteOptions, ExecutionContext, GraphQLError, PathSegment, Resolution,
    Schema, SchemaBuilder, Type, Value,
};

fn encode(response: &crate::Response) -> String {
    serde_json::to_string(response).expect("response serializes")
}

fn version_schema() -> Schema {
    SchemaBuilder::new()
        .query(|obj| {
            obj.field(
                Field::new("version", Type::named("String"))
                    .resolver(|_, _| Resolution::ok("0.1")),
            )
        })
        .build()
        .unwrap()
}

struct ThingStore(HashMap<String, Value>);

fn thing(id: &str, name: &str, value: i64) -> Value {
    Value::Object(
        [
            ("id", Value::from(id)),
            ("name", Value::from(name)),
            ("value", Value::from(value)),
        ]
        .into_iter()
        .collect(),
    )
}

fn thing_schema() -> Schema {
    SchemaBuilder::new()
        .query(|obj| {
            obj.field(
                Field::new("thing", Type::named("Thing"))
                    .argument(Argument::new("id", Type::named("ID").non_null()))
                    .resolver(|args, info| {
                        let store = info.context.data::<ThingStore>().expect("store in context");
                        let id = args.get_str("id").expect("id argument");
                        Resolution::ok(
                            store
                                .0
                                .get(id)
                                .cloned()
                                // Unknown ids resolve to an empty record; the
                                // non-null `id` field then fails to complete.
                                .unwrap_or(Value::Object(Object::with_capacity(0))),
                        )
                    }),
            )
        })
        .object("thing", |obj| {
            obj.field(Field::new("id", Type::named("ID").non_null()))
                .field(Field::new("name", Type::named("String")))
                .field(Field::new("value", Type::named("Int")))
        })
        .build()
        .unwrap()
}

fn thing_context() -> ExecutionContext {
    ExecutionContext::new(ThingStore(
        [("foo".to_owned(), thing("foo", "Foo", 4))].into_iter().collect(),
    ))
}

#[test]
fn resolves_a_scalar_field() {
    let response = crate::run_sync(&version_schema(), "{ version }", ExecuteOptions::default());
    assert_eq!(encode(&response), r#"{"data":{"version":"0.1"}}"#);
}

#[test]
fn resolves_nested_objects_from_a_store() {
    let response = crate::run_sync(
        &thing_schema(),
        r#"{ thing(id: "foo") { id name value } }"#,
        ExecuteOptions {
            context: thing_context(),
            ..Default::default()
        },
    );
    assert_eq!(
        encode(&response),
        r#"{"data":{"thing":{"id":"foo","name":"Foo","value":4}}}"#,
    );
}

#[test]
fn null_for_a_non_null_field_bubbles_to_the_nullable_parent() {
    let response = crate::run_sync(
        &thing_schema(),
        r#"{ thing(id: "missing") { id } }"#,
        ExecuteOptions {
            context: thing_context(),
            ..Default::default()
        },
    );

    let (data, errors) = response.into_inner().unwrap();
    assert_eq!(
        data,
        Value::Object([("thing", Value::Null)].into_iter().collect()),
    );
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].path(),
        &[
            PathSegment::Field("thing".into()),
            PathSegment::Field("id".into()),
        ],
    );
    assert_eq!(
        errors[0].error().message(),
        "Cannot return null for non-nullable field",
    );
}

#[test]
fn aliases_rename_response_keys() {
    let response = crate::run_sync(
        &version_schema(),
        "{ a: version b: version }",
        ExecuteOptions::default(),
    );
    assert_eq!(encode(&response), r#"{"data":{"a":"0.1","b":"0.1"}}"#);
}

#[test]
fn fields_sharing_a_response_key_merge_their_selections() {
    let response = crate::run_sync(
        &thing_schema(),
        r#"{ thing(id: "foo") { id } thing(id: "foo") { name } }"#,
        ExecuteOptions {
            context: thing_context(),
            ..Default::default()
        },
    );
    assert_eq!(
        encode(&response),
        r#"{"data":{"thing":{"id":"foo","name":"Foo"}}}"#,
    );
}

#[test]
fn skip_and_include_drop_selections() {
    let response = crate::run_sync(
        &version_schema(),
        r#"{
            skipped: version @skip(if: true)
            dropped: version @include(if: false)
            kept: version @include(if: true)
        }"#,
        ExecuteOptions::default(),
    );
    assert_eq!(encode(&response), r#"{"data":{"kept":"0.1"}}"#);
}

#[test]
fn typename_reports_the_runtime_type() {
    let response = crate::run_sync(
        &thing_schema(),
        r#"{ __typename thing(id: "foo") { __typename } }"#,
        ExecuteOptions {
            context: thing_context(),
            ..Default::default()
        },
    );
    assert_eq!(
        encode(&response),
        r#"{"data":{"__typename":"RootQueryType","thing":{"__typename":"Thing"}}}"#,
    );
}

fn pet_schema() -> Schema {
    SchemaBuilder::new()
        .query(|obj| {
            obj.field(Field::new("pets", Type::list(Type::named("Pet").non_null())).resolver(
                |_, _| {
                    Resolution::ok(Value::List(vec![
                        Value::Object(
                            [("name", Value::from("Odie")), ("barkVolume", Value::from(11))]
                                .into_iter()
                                .collect(),
                        ),
                        Value::Object(
                            [("name", Value::from("Garfield")), ("lasagna", Value::from(true))]
                                .into_iter()
                                .collect(),
                        ),
                    ]))
                },
            ))
        })
        .interface("pet", |i| {
            i.field(Field::new("name", Type::named("String")))
                .resolve_type(|value| {
                    let is_dog = value
                        .as_object_value()
                        .is_some_and(|o| o.contains_field("barkVolume"));
                    Some(if is_dog { "Dog".into() } else { "Cat".into() })
                })
        })
        .object("dog", |obj| {
            obj.interfaces(&["Pet"])
                .field(Field::new("name", Type::named("String")))
                .field(Field::new("barkVolume", Type::named("Int")))
        })
        .object("cat", |obj| {
            obj.interfaces(&["Pet"])
                .field(Field::new("name", Type::named("String")))
                .field(Field::new("lasagna", Type::named("Boolean")))
        })
        .build()
        .unwrap()
}

#[test]
fn fragments_apply_by_runtime_type() {
    let response = crate::run_sync(
        &pet_schema(),
        r#"
        {
          pets {
            __typename
            ...petName
            ... on Dog { barkVolume }
            ... on Cat { lasagna }
          }
        }
        fragment petName on Pet { name }
        "#,
        ExecuteOptions::default(),
    );
    assert_eq!(
        encode(&response),
        concat!(
            r#"{"data":{"pets":["#,
            r#"{"__typename":"Dog","name":"Odie","barkVolume":11},"#,
            r#"{"__typename":"Cat","name":"Garfield","lasagna":true}"#,
            r#"]}}"#,
        ),
    );
}

#[test]
fn resolver_errors_null_the_field_and_keep_siblings() {
    let schema = SchemaBuilder::new()
        .query(|obj| {
            obj.field(
                Field::new("broken", Type::named("String"))
                    .resolver(|_, _| Resolution::err("broke on purpose")),
            )
            .field(
                Field::new("fine", Type::named("String"))
                    .resolver(|_, _| Resolution::ok("ok")),
            )
        })
        .build()
        .unwrap();

    let response = crate::run_sync(&schema, "{ broken fine }", ExecuteOptions::default());
    let (data, errors) = response.into_inner().unwrap();
    assert_eq!(
        data,
        Value::Object(
            [("broken", Value::Null), ("fine", Value::from("ok"))]
                .into_iter()
                .collect(),
        ),
    );
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].error().message(), "broke on purpose");
    assert_eq!(errors[0].path(), &[PathSegment::Field("broken".into())]);
}

#[test]
fn validation_failures_omit_the_data_key() {
    let response = crate::run_sync(&version_schema(), "{ nope }", ExecuteOptions::default());
    assert!(!response.is_ok());
    let encoded = encode(&response);
    assert!(!encoded.contains(r#""data""#), "{encoded}");
    assert!(
        encoded.contains(r#"Unknown field \"nope\" on type \"RootQueryType\""#),
        "{encoded}",
    );
}

#[test]
fn parse_failures_omit_the_data_key() {
    let response = crate::run_sync(&version_schema(), "<>?><", ExecuteOptions::default());
    assert!(!response.is_ok());
    assert!(!encode(&response).contains(r#""data""#));
}

#[test]
fn mutations_require_a_mutation_root() {
    let response = crate::run_sync(
        &version_schema(),
        "mutation { version }",
        ExecuteOptions::default(),
    );
    assert!(matches!(
        response.into_inner(),
        Err(GraphQLError::UnsupportedOperation(
            crate::OperationType::Mutation
        )),
    ));
}

#[test]
fn selecting_among_multiple_operations_requires_a_name() {
    let schema = version_schema();
    let source = "query A { version } query B { a: version }";

    let unnamed = crate::run_sync(&schema, source, ExecuteOptions::default());
    assert!(matches!(
        unnamed.into_inner(),
        Err(GraphQLError::MultipleOperationsProvided),
    ));

    let named = crate::run_sync(
        &schema,
        source,
        ExecuteOptions {
            operation_name: Some("B".into()),
            ..Default::default()
        },
    );
    assert_eq!(encode(&named), r#"{"data":{"a":"0.1"}}"#);

    let unknown = crate::run_sync(
        &schema,
        source,
        ExecuteOptions {
            operation_name: Some("C".into()),
            ..Default::default()
        },
    );
    assert!(matches!(
        unknown.into_inner(),
        Err(GraphQLError::UnknownOperationName),
    ));
}

#[test]
fn subscriptions_resolve_a_single_initial_payload() {
    let schema = SchemaBuilder::new()
        .query(|obj| obj.field(Field::new("unused", Type::named("Int"))))
        .subscription(|obj| {
            obj.field(
                Field::new("ticker", Type::named("Int")).resolver(|_, _| Resolution::ok(1)),
            )
        })
        .build()
        .unwrap();

    let response = crate::run_sync(
        &schema,
        "subscription { ticker }",
        ExecuteOptions::default(),
    );
    assert_eq!(encode(&response), r#"{"data":{"ticker":1}}"#);
}

#[test]
fn the_root_value_feeds_the_default_resolver() {
    let schema = SchemaBuilder::new()
        .query(|obj| obj.field(Field::new("motd", Type::named("String"))))
        .build()
        .unwrap();

    let response = crate::run_sync(
        &schema,
        "{ motd }",
        ExecuteOptions {
            root_value: Value::Object([("motd", Value::from("hello"))].into_iter().collect()),
            ..Default::default()
        },
    );
    assert_eq!(encode(&response), r#"{"data":{"motd":"hello"}}"#);
}

#[test]
fn cancellation_fails_the_operation() {
    let cancellation = Cancellation::new();
    cancellation.cancel();

    let response = crate::run_sync(
        &version_schema(),
        "{ version }",
        ExecuteOptions {
            context: ExecutionContext::default().with_cancellation(cancellation),
            ..Default::default()
        },
    );
    assert!(matches!(response.into_inner(), Err(GraphQLError::Cancelled)));
}
