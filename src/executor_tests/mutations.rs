use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;

use crate::{
    meta::{Argument, Field},
    ExecuteOptions, ExecutionContext, Resolution, Schema, SchemaBuilder, Type, Value,
};

#[derive(Default)]
struct Ledger {
    values: Mutex<std::collections::HashMap<String, i64>>,
    /// `(field, event)` pairs in observation order.
    log: Mutex<Vec<(String, &'static str)>>,
}

fn ledger_schema() -> Schema {
    SchemaBuilder::new()
        .query(|obj| {
            obj.field(
                Field::new("value", Type::named("Int"))
                    .argument(Argument::new("id", Type::named("ID").non_null()))
                    .resolver(|args, info| {
                        let ledger = info.context.data::<Arc<Ledger>>().expect("ledger");
                        let id = args.get_str("id").expect("id");
                        Resolution::ok(
                            ledger
                                .values
                                .lock()
                                .unwrap()
                                .get(id)
                                .copied()
                                .map_or(Value::Null, Value::Int),
                        )
                    }),
            )
        })
        .mutation(|obj| {
            obj.field(
                Field::new("update", Type::named("UpdateResult"))
                    .argument(Argument::new("id", Type::named("ID").non_null()))
                    .argument(Argument::new("value", Type::named("Int").non_null()))
                    .resolver(|args, info| {
                        let ledger = info.context.data::<Arc<Ledger>>().expect("ledger").clone();
                        let id = args.get_str("id").expect("id").to_owned();
                        let value = args.get_int("value").expect("value");
                        let field = info.path.first().cloned();

                        // Resolve through a future so serial scheduling is
                        // actually exercised, not just synchronous calls.
                        Resolution::future(async move {
                            let key = match field {
                                Some(crate::PathSegment::Field(name)) => name,
                                _ => String::new(),
                            };
                            ledger.log.lock().unwrap().push((key.clone(), "start"));
                            ledger.values.lock().unwrap().insert(id, value);
                            ledger.log.lock().unwrap().push((key, "end"));
                            Resolution::ok(Value::Object(
                                [("value", Value::Int(value))].into_iter().collect(),
                            ))
                        })
                    }),
            )
        })
        .object("update_result", |obj| {
            obj.field(Field::new("value", Type::named("Int")))
        })
        .build()
        .unwrap()
}

#[test]
fn top_level_mutation_fields_run_in_order() {
    let ledger = Arc::new(Ledger::default());
    let response = crate::run_sync(
        &ledger_schema(),
        r#"mutation {
            a: update(id: "foo", value: 1) { value }
            b: update(id: "foo", value: 2) { value }
        }"#,
        ExecuteOptions {
            context: ExecutionContext::new(ledger.clone()),
            ..Default::default()
        },
    );

    let (data, errors) = response.into_inner().unwrap();
    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(
        serde_json::to_string(&data).unwrap(),
        r#"{"a":{"value":1},"b":{"value":2}}"#,
    );

    // The last write wins, and `a` fully completes before `b` starts.
    assert_eq!(ledger.values.lock().unwrap().get("foo"), Some(&2));
    let log = ledger.log.lock().unwrap();
    assert_eq!(
        *log,
        vec![
            ("a".to_owned(), "start"),
            ("a".to_owned(), "end"),
            ("b".to_owned(), "start"),
            ("b".to_owned(), "end"),
        ],
    );
}

#[test]
fn mutation_errors_do_not_abort_later_siblings() {
    let ledger = Arc::new(Ledger::default());
    let schema = SchemaBuilder::new()
        .query(|obj| obj.field(Field::new("unused", Type::named("Int"))))
        .mutation(|obj| {
            obj.field(
                Field::new("fail", Type::named("Int"))
                    .resolver(|_, _| Resolution::err("nope")),
            )
            .field(
                Field::new("succeed", Type::named("Int"))
                    .resolver(|_, _| Resolution::ok(7)),
            )
        })
        .build()
        .unwrap();

    let response = crate::run_sync(
        &schema,
        "mutation { fail succeed }",
        ExecuteOptions {
            context: ExecutionContext::new(ledger),
            ..Default::default()
        },
    );
    let (data, errors) = response.into_inner().unwrap();
    assert_eq!(
        serde_json::to_string(&data).unwrap(),
        r#"{"fail":null,"succeed":7}"#,
    );
    assert_eq!(errors.len(), 1);
}
