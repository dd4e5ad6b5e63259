use pretty_assertions::assert_eq;

use crate::{
    meta::{Argument, EnumValue, Field},
    ExecuteOptions, PathSegment, Resolution, Schema, SchemaBuilder, Type, Value,
};

fn channel_schema() -> Schema {
    SchemaBuilder::new()
        .query(|obj| {
            obj.field(
                Field::new("info", Type::named("ChannelInfo"))
                    .argument(Argument::new("channel", Type::named("Channel").non_null()))
                    .resolver(|args, _| {
                        let internal = args.get_str("channel").expect("coerced channel");
                        Resolution::ok(Value::Object(
                            [
                                ("name", Value::from(internal.to_uppercase())),
                                ("value", Value::from(-100)),
                                ("channel", Value::from(internal)),
                            ]
                            .into_iter()
                            .collect(),
                        ))
                    }),
            )
        })
        .object("channel_info", |obj| {
            obj.field(Field::new("name", Type::named("String")))
                .field(Field::new("value", Type::named("Int")))
                .field(Field::new("channel", Type::named("Channel")))
        })
        .enum_type("channel", |e| {
            e.value(EnumValue::new("RED").value("r"))
                .value(EnumValue::new("GREEN").value("g"))
                .value(EnumValue::new("BLUE").value("b"))
                .value(
                    EnumValue::new("PUCE")
                        .value("p")
                        .deprecated(Some("it's ugly")),
                )
        })
        .build()
        .unwrap()
}

#[test]
fn enum_literals_coerce_to_their_internal_value() {
    let response = crate::run_sync(
        &channel_schema(),
        "{ info(channel: BLUE) { name value } }",
        ExecuteOptions::default(),
    );
    let (data, errors) = response.into_inner().unwrap();
    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(
        serde_json::to_value(&data).unwrap(),
        serde_json::json!({"info": {"name": "B", "value": -100}}),
    );
}

#[test]
fn deprecated_enum_values_warn_but_still_execute() {
    let response = crate::run_sync(
        &channel_schema(),
        "{ info(channel: PUCE) { name value } }",
        ExecuteOptions::default(),
    );
    let (data, errors) = response.into_inner().unwrap();

    assert_eq!(
        serde_json::to_value(&data).unwrap(),
        serde_json::json!({"info": {"name": "P", "value": -100}}),
    );

    assert_eq!(errors.len(), 1);
    assert!(
        errors[0].error().message().contains("deprecated"),
        "unexpected message: {}",
        errors[0].error().message(),
    );
    assert!(
        errors[0].error().message().contains("it's ugly"),
        "warning carries the reason",
    );
    assert_eq!(errors[0].path(), &[PathSegment::Field("info".into())]);
}

#[test]
fn enum_output_serializes_back_to_its_name() {
    let response = crate::run_sync(
        &channel_schema(),
        "{ info(channel: GREEN) { channel } }",
        ExecuteOptions::default(),
    );
    let (data, errors) = response.into_inner().unwrap();
    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(
        serde_json::to_value(&data).unwrap(),
        serde_json::json!({"info": {"channel": "GREEN"}}),
    );
}

#[test]
fn every_enum_value_round_trips() {
    // serialize(parse(name)) == name, for each declared value.
    for name in ["RED", "GREEN", "BLUE", "PUCE"] {
        let response = crate::run_sync(
            &channel_schema(),
            &format!("{{ info(channel: {name}) {{ channel }} }}"),
            ExecuteOptions::default(),
        );
        let (data, _) = response.into_inner().unwrap();
        let round_tripped = data
            .as_object_value()
            .and_then(|o| o.get_field_value("info"))
            .and_then(Value::as_object_value)
            .and_then(|o| o.get_field_value("channel"))
            .and_then(Value::as_enum_value);
        assert_eq!(round_tripped, Some(name));
    }
}

#[test]
fn unmapped_internal_values_are_field_errors() {
    let schema = SchemaBuilder::new()
        .query(|obj| {
            obj.field(
                Field::new("channel", Type::named("Channel"))
                    .resolver(|_, _| Resolution::ok("chartreuse")),
            )
        })
        .enum_type("channel", |e| e.value(EnumValue::new("RED").value("r")))
        .build()
        .unwrap();

    let response = crate::run_sync(&schema, "{ channel }", ExecuteOptions::default());
    let (data, errors) = response.into_inner().unwrap();
    assert_eq!(
        data,
        Value::Object([("channel", Value::Null)].into_iter().collect()),
    );
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].error().message(),
        r#"Cannot serialize value as enum "Channel""#,
    );
}
