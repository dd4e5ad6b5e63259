use pretty_assertions::assert_eq;

use crate::{
    meta::{Argument, EnumValue, Field},
    ExecuteOptions, Resolution, Schema, SchemaBuilder, Type, Value,
};

fn sample_schema() -> Schema {
    SchemaBuilder::new()
        .query(|obj| {
            obj.field(
                Field::new("thing", Type::named("Thing"))
                    .argument(Argument::new("id", Type::named("ID").non_null()))
                    .resolver(|_, _| Resolution::ok(Value::Null)),
            )
        })
        .object("thing", |obj| {
            obj.description("A thing in the store.")
                .field(Field::new("id", Type::named("ID").non_null()))
                .field(Field::new("name", Type::named("String")))
                .field(
                    Field::new("tags", Type::list(Type::named("String").non_null()))
                        .deprecated(Some("use labels")),
                )
        })
        .enum_type("channel", |e| {
            e.value(EnumValue::new("RED").value("r"))
                .value(
                    EnumValue::new("PUCE")
                        .value("p")
                        .deprecated(Some("it's ugly")),
                )
        })
        .build()
        .unwrap()
}

fn run(schema: &Schema, source: &str) -> serde_json::Value {
    let response = crate::run_sync(schema, source, ExecuteOptions::default());
    let (data, errors) = response.into_inner().expect("introspection executes");
    assert!(errors.is_empty(), "{errors:?}");
    serde_json::to_value(&data).unwrap()
}

#[test]
fn schema_reports_its_default_query_root() {
    let data = run(&sample_schema(), "{ __schema { queryType { name } } }");
    assert_eq!(
        data,
        serde_json::json!({"__schema": {"queryType": {"name": "RootQueryType"}}}),
    );
}

#[test]
fn type_lookup_by_name() {
    let data = run(
        &sample_schema(),
        r#"{ __type(name: "Thing") { kind name description } }"#,
    );
    assert_eq!(
        data,
        serde_json::json!({
            "__type": {
                "kind": "OBJECT",
                "name": "Thing",
                "description": "A thing in the store.",
            }
        }),
    );
}

#[test]
fn unknown_type_lookup_is_null() {
    let data = run(&sample_schema(), r#"{ __type(name: "Nope") { name } }"#);
    assert_eq!(data, serde_json::json!({"__type": null}));
}

#[test]
fn field_types_unwrap_through_of_type() {
    let data = run(
        &sample_schema(),
        r#"{
            __type(name: "Thing") {
                fields {
                    name
                    type { kind name ofType { kind name } }
                }
            }
        }"#,
    );
    assert_eq!(
        data,
        serde_json::json!({
            "__type": {
                "fields": [
                    {
                        "name": "id",
                        "type": {
                            "kind": "NON_NULL",
                            "name": null,
                            "ofType": {"kind": "SCALAR", "name": "ID"},
                        },
                    },
                    {
                        "name": "name",
                        "type": {
                            "kind": "SCALAR",
                            "name": "String",
                            "ofType": null,
                        },
                    },
                ],
            }
        }),
    );
}

#[test]
fn deprecated_fields_are_hidden_unless_requested() {
    let data = run(
        &sample_schema(),
        r#"{
            __type(name: "Thing") {
                all: fields(includeDeprecated: true) {
                    name
                    isDeprecated
                    deprecationReason
                }
                current: fields { name }
            }
        }"#,
    );
    assert_eq!(
        data,
        serde_json::json!({
            "__type": {
                "all": [
                    {"name": "id", "isDeprecated": false, "deprecationReason": null},
                    {"name": "name", "isDeprecated": false, "deprecationReason": null},
                    {"name": "tags", "isDeprecated": true, "deprecationReason": "use labels"},
                ],
                "current": [{"name": "id"}, {"name": "name"}],
            }
        }),
    );
}

#[test]
fn enum_values_carry_deprecation() {
    let data = run(
        &sample_schema(),
        r#"{
            __type(name: "Channel") {
                kind
                current: enumValues { name }
                all: enumValues(includeDeprecated: true) { name deprecationReason }
            }
        }"#,
    );
    assert_eq!(
        data,
        serde_json::json!({
            "__type": {
                "kind": "ENUM",
                "current": [{"name": "RED"}],
                "all": [
                    {"name": "RED", "deprecationReason": null},
                    {"name": "PUCE", "deprecationReason": "it's ugly"},
                ],
            }
        }),
    );
}

#[test]
fn field_arguments_expose_types_and_defaults() {
    let schema = SchemaBuilder::new()
        .query(|obj| {
            obj.field(
                Field::new("greet", Type::named("String"))
                    .argument(
                        Argument::new("name", Type::named("String")).default_value("world"),
                    )
                    .resolver(|_, _| Resolution::ok("hi")),
            )
        })
        .build()
        .unwrap();

    let data = run(
        &schema,
        r#"{
            __schema {
                queryType {
                    fields {
                        name
                        args { name defaultValue type { name } }
                    }
                }
            }
        }"#,
    );
    assert_eq!(
        data,
        serde_json::json!({
            "__schema": {
                "queryType": {
                    "fields": [{
                        "name": "greet",
                        "args": [{
                            "name": "name",
                            "defaultValue": "\"world\"",
                            "type": {"name": "String"},
                        }],
                    }],
                }
            }
        }),
    );
}

#[test]
fn built_in_directives_are_listed() {
    let data = run(
        &sample_schema(),
        r#"{ __schema { directives { name locations args { name type { kind } } } } }"#,
    );
    assert_eq!(
        data,
        serde_json::json!({
            "__schema": {
                "directives": [
                    {
                        "name": "skip",
                        "locations": ["FIELD", "FRAGMENT_SPREAD", "INLINE_FRAGMENT"],
                        "args": [{"name": "if", "type": {"kind": "NON_NULL"}}],
                    },
                    {
                        "name": "include",
                        "locations": ["FIELD", "FRAGMENT_SPREAD", "INLINE_FRAGMENT"],
                        "args": [{"name": "if", "type": {"kind": "NON_NULL"}}],
                    },
                ],
            }
        }),
    );
}

#[test]
fn no_reachable_type_is_hidden() {
    let data = run(&sample_schema(), "{ __schema { types { name } } }");
    let names: Vec<&str> = data["__schema"]["types"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();

    for expected in [
        "Int", "Float", "String", "Boolean", "ID", "RootQueryType", "Thing", "Channel",
        "__Schema", "__Type", "__Field", "__InputValue", "__EnumValue", "__Directive",
        "__TypeKind", "__DirectiveLocation",
    ] {
        assert!(names.contains(&expected), "missing {expected} in {names:?}");
    }
}

#[test]
fn typename_is_selectable_everywhere() {
    let data = run(
        &sample_schema(),
        r#"{ __schema { queryType { __typename } } __type(name: "Thing") { __typename } }"#,
    );
    assert_eq!(
        data,
        serde_json::json!({
            "__schema": {"queryType": {"__typename": "__Type"}},
            "__type": {"__typename": "__Type"},
        }),
    );
}
