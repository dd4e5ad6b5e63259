use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use pretty_assertions::assert_eq;

use crate::{
    meta::Field, ExecuteOptions, ExecutionContext, Resolution, SchemaBuilder, Type, Value,
};

#[tokio::test]
async fn pending_resolutions_are_awaited() {
    let schema = SchemaBuilder::new()
        .query(|obj| {
            obj.field(Field::new("deferred", Type::named("String")).resolver(|_, _| {
                Resolution::future(async { Resolution::ok("later") })
            }))
        })
        .build()
        .unwrap();

    let response = crate::run(&schema, "{ deferred }", ExecuteOptions::default()).await;
    let (data, errors) = response.into_inner().unwrap();
    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(
        serde_json::to_value(&data).unwrap(),
        serde_json::json!({"deferred": "later"}),
    );
}

#[tokio::test]
async fn chained_pending_resolutions_run_to_completion() {
    let schema = SchemaBuilder::new()
        .query(|obj| {
            obj.field(Field::new("twice", Type::named("Int")).resolver(|_, _| {
                Resolution::future(async {
                    Resolution::future(async { Resolution::ok(2) })
                })
            }))
        })
        .build()
        .unwrap();

    let response = crate::run(&schema, "{ twice }", ExecuteOptions::default()).await;
    let (data, _) = response.into_inner().unwrap();
    assert_eq!(
        serde_json::to_value(&data).unwrap(),
        serde_json::json!({"twice": 2}),
    );
}

#[tokio::test]
async fn sibling_query_fields_all_complete_in_declaration_order() {
    let counter = Arc::new(AtomicUsize::new(0));

    let schema = SchemaBuilder::new()
        .query(|obj| {
            obj.field(Field::new("first", Type::named("Int")).resolver(|_, info| {
                let counter = info.context.data::<Arc<AtomicUsize>>().unwrap().clone();
                Resolution::future(async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Resolution::ok(1)
                })
            }))
            .field(Field::new("second", Type::named("Int")).resolver(|_, info| {
                let counter = info.context.data::<Arc<AtomicUsize>>().unwrap().clone();
                Resolution::future(async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Resolution::ok(2)
                })
            }))
        })
        .build()
        .unwrap();

    let response = crate::run(
        &schema,
        "{ second first }",
        ExecuteOptions {
            context: ExecutionContext::new(counter.clone()),
            ..Default::default()
        },
    )
    .await;
    let (data, _) = response.into_inner().unwrap();

    assert_eq!(counter.load(Ordering::SeqCst), 2);
    // Response keys follow the selection, not completion timing.
    assert_eq!(
        serde_json::to_string(&data).unwrap(),
        r#"{"second":2,"first":1}"#,
    );
}

#[tokio::test]
async fn async_field_errors_null_bubble_like_sync_ones() {
    let schema = SchemaBuilder::new()
        .query(|obj| {
            obj.field(
                Field::new("strict", Type::named("Int").non_null())
                    .resolver(|_, _| Resolution::future(async { Resolution::ok(Value::Null) })),
            )
        })
        .build()
        .unwrap();

    let response = crate::run(&schema, "{ strict }", ExecuteOptions::default()).await;
    let (data, errors) = response.into_inner().unwrap();
    assert_eq!(data, Value::Null);
    assert_eq!(errors.len(), 1);
}
