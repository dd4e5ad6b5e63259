//! Fixtures for exercising single validation rules.

use crate::{
    ast::{Document, Type},
    parser::parse,
    schema::{
        builder::SchemaBuilder,
        meta::{Argument, EnumValue, Field},
        model::Schema,
    },
    validation::ValidatorContext,
};

fn test_schema() -> Schema {
    SchemaBuilder::new()
        .query(|obj| {
            obj.name("QueryRoot")
                .field(Field::new("dog", Type::named("Dog")))
                .field(Field::new("cat", Type::named("Cat")))
                .field(Field::new("pet", Type::named("Pet")))
                .field(Field::new("catOrDog", Type::named("CatOrDog")))
                .field(
                    Field::new("human", Type::named("Human"))
                        .argument(Argument::new("id", Type::named("ID"))),
                )
                .field(Field::new("complicatedArgs", Type::named("ComplicatedArgs")))
        })
        .interface("pet", |i| i.field(Field::new("name", Type::named("String"))))
        .enum_type("dog_command", |e| {
            e.value(EnumValue::new("SIT"))
                .value(EnumValue::new("HEEL"))
                .value(EnumValue::new("DOWN"))
        })
        .object("dog", |obj| {
            obj.interfaces(&["Pet"])
                .field(Field::new("name", Type::named("String")))
                .field(Field::new("nickname", Type::named("String")))
                .field(Field::new("barkVolume", Type::named("Int")))
                .field(
                    Field::new("doesKnowCommand", Type::named("Boolean")).argument(
                        Argument::new("dogCommand", Type::named("DogCommand").non_null()),
                    ),
                )
        })
        .object("cat", |obj| {
            obj.interfaces(&["Pet"])
                .field(Field::new("name", Type::named("String")))
                .field(Field::new("meowVolume", Type::named("Int")))
        })
        .union("cat_or_dog", &["Cat", "Dog"], |u| u)
        .object("human", |obj| {
            obj.field(Field::new("name", Type::named("String")))
                .field(Field::new("pets", Type::list(Type::named("Pet"))))
                .field(Field::new("relatives", Type::list(Type::named("Human").non_null())))
        })
        .input_object("complex_input", |input| {
            input
                .input_field(Argument::new("requiredField", Type::named("Boolean").non_null()))
                .input_field(Argument::new("stringField", Type::named("String")))
        })
        .object("complicated_args", |obj| {
            obj.field(
                Field::new("intArgField", Type::named("String"))
                    .argument(Argument::new("intArg", Type::named("Int"))),
            )
            .field(
                Field::new("nonNullIntArgField", Type::named("String")).argument(
                    Argument::new("nonNullIntArg", Type::named("Int").non_null()),
                ),
            )
            .field(
                Field::new("stringListArgField", Type::named("String")).argument(
                    Argument::new("stringListArg", Type::list(Type::named("String"))),
                ),
            )
            .field(
                Field::new("complexArgField", Type::named("String")).argument(
                    Argument::new("complexArg", Type::named("ComplexInput")),
                ),
            )
            .field(
                Field::new("multipleReqs", Type::named("String"))
                    .argument(Argument::new("req1", Type::named("Int").non_null()))
                    .argument(Argument::new("req2", Type::named("Int").non_null())),
            )
        })
        .build()
        .expect("valid test schema")
}

fn validate_rule<F>(run: F, q: &str) -> Vec<String>
where
    F: for<'a> FnOnce(&mut ValidatorContext<'a>, &'a Document),
{
    let schema = test_schema();
    let doc = parse(q).expect("parse error in rule test");
    let mut ctx = ValidatorContext::new(&schema, &doc);
    run(&mut ctx, &doc);
    ctx.into_errors()
        .into_iter()
        .map(|e| e.message().to_owned())
        .collect()
}

pub(crate) fn expect_passes_rule<F>(run: F, q: &str)
where
    F: for<'a> FnOnce(&mut ValidatorContext<'a>, &'a Document),
{
    let errors = validate_rule(run, q);
    assert!(
        errors.is_empty(),
        "expected rule to pass, but errors found: {errors:?}",
    );
}

pub(crate) fn expect_fails_rule<F>(run: F, q: &str, expected: &[&str])
where
    F: for<'a> FnOnce(&mut ValidatorContext<'a>, &'a Document),
{
    let mut errors = validate_rule(run, q);
    let mut expected: Vec<String> = expected.iter().map(|&s| s.to_owned()).collect();
    errors.sort();
    expected.sort();
    assert!(
        !expected.is_empty(),
        "malformed test: no expected errors given",
    );
    assert_eq!(errors, expected, "rule failed with unexpected errors");
}
