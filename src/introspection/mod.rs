//! The schema-derived meta-model, queryable through the regular executor.
//!
//! The `__`-prefixed meta-types are registered next to the user types when a
//! schema is built. Their resolvers read the schema's type graph directly: a
//! `__Type` value travels through the execution domain as its type literal
//! notation (e.g. `"[Int!]!"`) and is re-parsed against the schema by each
//! field resolver; fields, enum values, input values and directives are
//! materialized as plain object values the default property resolver serves.

use arcstr::ArcStr;
use indexmap::IndexMap;

use crate::{
    ast::Type,
    resolve::{Arguments, ResolveInfo, Resolution},
    schema::{
        meta::{
            Argument as MetaArgument, EnumMeta, EnumValue as MetaEnumValue, Field as MetaField,
            InputObjectMeta, InterfaceMeta, MetaType, ObjectMeta,
        },
        model::DirectiveType,
    },
    value::{Object, Value},
};

/// Registers the meta-types and adds the two reserved fields to the query
/// root.
pub(crate) fn install(types: &mut IndexMap<ArcStr, MetaType>, query_type_name: &ArcStr) {
    for meta in meta_types() {
        types.insert(meta.name().clone(), meta);
    }

    let Some(MetaType::Object(ObjectMeta { fields, .. })) = types.get_mut(query_type_name)
    else {
        return;
    };
    fields.push(
        MetaField::new("__schema", Type::named("__Schema").non_null())
            .resolver(|_, _| Resolution::ok(Value::Object(Object::with_capacity(0)))),
    );
    fields.push(
        MetaField::new("__type", Type::named("__Type"))
            .argument(MetaArgument::new("name", Type::named("String").non_null()))
            .resolver(|args, info| {
                let name = args.get_str("name").unwrap_or_default();
                match info.schema.concrete_type_by_name(name) {
                    Some(meta) => Resolution::ok(type_reference(&meta.as_type())),
                    None => Resolution::ok(Value::Null),
                }
            }),
    );
}

/// A `__Type` value: the literal notation of the referenced type.
fn type_reference(t: &Type) -> Value {
    Value::String(t.to_string())
}

/// The type literal a `__Type` field resolver was invoked on.
fn parent_type(info: &ResolveInfo<'_>) -> Option<Type> {
    info.parent_value
        .as_string_value()
        .and_then(|s| s.parse().ok())
}

fn include_deprecated(args: &Arguments) -> bool {
    args.get_bool("includeDeprecated").unwrap_or(false)
}

fn optional_string(s: Option<&str>) -> Value {
    s.map_or(Value::Null, |s| Value::String(s.into()))
}

fn meta_types() -> Vec<MetaType> {
    vec![
        schema_meta(),
        type_meta(),
        field_meta(),
        input_value_meta(),
        enum_value_meta(),
        directive_meta(),
        type_kind_meta(),
        directive_location_meta(),
    ]
}

fn schema_meta() -> MetaType {
    ObjectMeta::new("__Schema")
        .field(
            MetaField::new("types", Type::list(Type::named("__Type").non_null()).non_null())
                .resolver(|_, info| {
                    Resolution::ok(Value::List(
                        info.schema
                            .concrete_type_list()
                            .into_iter()
                            .map(|t| type_reference(&t.as_type()))
                            .collect(),
                    ))
                }),
        )
        .field(
            MetaField::new("queryType", Type::named("__Type").non_null()).resolver(|_, info| {
                Resolution::ok(Value::String(info.schema.query_type_name().to_string()))
            }),
        )
        .field(
            MetaField::new("mutationType", Type::named("__Type")).resolver(|_, info| {
                Resolution::ok(optional_string(
                    info.schema.mutation_type_name().map(|n| n.as_str()),
                ))
            }),
        )
        .field(
            MetaField::new("subscriptionType", Type::named("__Type")).resolver(|_, info| {
                Resolution::ok(optional_string(
                    info.schema.subscription_type_name().map(|n| n.as_str()),
                ))
            }),
        )
        .field(
            MetaField::new(
                "directives",
                Type::list(Type::named("__Directive").non_null()).non_null(),
            )
            .resolver(|_, info| {
                Resolution::ok(Value::List(
                    info.schema
                        .directive_list()
                        .into_iter()
                        .map(directive_value)
                        .collect(),
                ))
            }),
        )
        .into_meta()
}

fn type_meta() -> MetaType {
    ObjectMeta::new("__Type")
        .field(
            MetaField::new("kind", Type::named("__TypeKind").non_null()).resolver(|_, info| {
                let Some(t) = parent_type(info) else {
                    return Resolution::err("Malformed type reference");
                };
                let kind = match &t {
                    Type::NonNullNamed(_) | Type::NonNullList(_) => "NON_NULL",
                    Type::List(_) => "LIST",
                    Type::Named(name) => match info.schema.concrete_type_by_name(name) {
                        Some(meta) => meta.type_kind().as_str(),
                        None => return Resolution::err(format!(r#"Unknown type "{name}""#)),
                    },
                };
                Resolution::ok(kind)
            }),
        )
        .field(MetaField::new("name", Type::named("String")).resolver(|_, info| {
            Resolution::ok(match parent_type(info) {
                Some(Type::Named(name)) => Value::String(name.to_string()),
                _ => Value::Null,
            })
        }))
        .field(
            MetaField::new("description", Type::named("String")).resolver(|_, info| {
                Resolution::ok(match parent_type(info) {
                    Some(Type::Named(name)) => optional_string(
                        info.schema
                            .concrete_type_by_name(&name)
                            .and_then(|t| t.description())
                            .map(|d| d.as_str()),
                    ),
                    _ => Value::Null,
                })
            }),
        )
        .field(
            MetaField::new("fields", Type::list(Type::named("__Field").non_null()))
                .argument(
                    MetaArgument::new("includeDeprecated", Type::named("Boolean"))
                        .default_value(false),
                )
                .resolver(|args, info| {
                    let fields = match parent_type(info) {
                        Some(Type::Named(name)) => {
                            match info.schema.concrete_type_by_name(&name) {
                                Some(MetaType::Object(ObjectMeta { fields, .. }))
                                | Some(MetaType::Interface(InterfaceMeta { fields, .. })) => {
                                    fields.clone()
                                }
                                _ => return Resolution::ok(Value::Null),
                            }
                        }
                        _ => return Resolution::ok(Value::Null),
                    };
                    let include_deprecated = include_deprecated(args);
                    Resolution::ok(Value::List(
                        fields
                            .iter()
                            .filter(|f| !f.is_builtin())
                            .filter(|f| {
                                include_deprecated || !f.deprecation_status.is_deprecated()
                            })
                            .map(field_value)
                            .collect(),
                    ))
                }),
        )
        .field(
            MetaField::new("interfaces", Type::list(Type::named("__Type").non_null()))
                .resolver(|_, info| {
                    Resolution::ok(match parent_type(info) {
                        Some(Type::Named(name)) => match info.schema.concrete_type_by_name(&name)
                        {
                            Some(MetaType::Object(ObjectMeta {
                                interface_names, ..
                            })) => Value::List(
                                interface_names
                                    .iter()
                                    .map(|n| Value::String(n.to_string()))
                                    .collect(),
                            ),
                            _ => Value::Null,
                        },
                        _ => Value::Null,
                    })
                }),
        )
        .field(
            MetaField::new("possibleTypes", Type::list(Type::named("__Type").non_null()))
                .resolver(|_, info| {
                    Resolution::ok(match parent_type(info) {
                        Some(Type::Named(name)) => match info.schema.concrete_type_by_name(&name)
                        {
                            Some(meta @ (MetaType::Interface(_) | MetaType::Union(_))) => {
                                Value::List(
                                    info.schema
                                        .possible_types(meta)
                                        .into_iter()
                                        .map(|t| type_reference(&t.as_type()))
                                        .collect(),
                                )
                            }
                            _ => Value::Null,
                        },
                        _ => Value::Null,
                    })
                }),
        )
        .field(
            MetaField::new("enumValues", Type::list(Type::named("__EnumValue").non_null()))
                .argument(
                    MetaArgument::new("includeDeprecated", Type::named("Boolean"))
                        .default_value(false),
                )
                .resolver(|args, info| {
                    let values = match parent_type(info) {
                        Some(Type::Named(name)) => {
                            match info.schema.concrete_type_by_name(&name) {
                                Some(MetaType::Enum(EnumMeta { values, .. })) => values.clone(),
                                _ => return Resolution::ok(Value::Null),
                            }
                        }
                        _ => return Resolution::ok(Value::Null),
                    };
                    let include_deprecated = include_deprecated(args);
                    Resolution::ok(Value::List(
                        values
                            .iter()
                            .filter(|v| {
                                include_deprecated || !v.deprecation_status.is_deprecated()
                            })
                            .map(enum_value_value)
                            .collect(),
                    ))
                }),
        )
        .field(
            MetaField::new("inputFields", Type::list(Type::named("__InputValue").non_null()))
                .resolver(|_, info| {
                    Resolution::ok(match parent_type(info) {
                        Some(Type::Named(name)) => match info.schema.concrete_type_by_name(&name)
                        {
                            Some(MetaType::InputObject(InputObjectMeta {
                                input_fields, ..
                            })) => Value::List(input_fields.iter().map(input_value_value).collect()),
                            _ => Value::Null,
                        },
                        _ => Value::Null,
                    })
                }),
        )
        .field(MetaField::new("ofType", Type::named("__Type")).resolver(|_, info| {
            Resolution::ok(match parent_type(info) {
                Some(t @ (Type::NonNullNamed(_) | Type::NonNullList(_))) => {
                    type_reference(&t.into_nullable())
                }
                Some(Type::List(inner)) => type_reference(&inner),
                _ => Value::Null,
            })
        }))
        .into_meta()
}

fn field_meta() -> MetaType {
    ObjectMeta::new("__Field")
        .field(MetaField::new("name", Type::named("String").non_null()))
        .field(MetaField::new("description", Type::named("String")))
        .field(MetaField::new(
            "args",
            Type::list(Type::named("__InputValue").non_null()).non_null(),
        ))
        .field(MetaField::new("type", Type::named("__Type").non_null()))
        .field(MetaField::new("isDeprecated", Type::named("Boolean").non_null()))
        .field(MetaField::new("deprecationReason", Type::named("String")))
        .into_meta()
}

fn input_value_meta() -> MetaType {
    ObjectMeta::new("__InputValue")
        .field(MetaField::new("name", Type::named("String").non_null()))
        .field(MetaField::new("description", Type::named("String")))
        .field(MetaField::new("type", Type::named("__Type").non_null()))
        .field(MetaField::new("defaultValue", Type::named("String")))
        .into_meta()
}

fn enum_value_meta() -> MetaType {
    ObjectMeta::new("__EnumValue")
        .field(MetaField::new("name", Type::named("String").non_null()))
        .field(MetaField::new("description", Type::named("String")))
        .field(MetaField::new("isDeprecated", Type::named("Boolean").non_null()))
        .field(MetaField::new("deprecationReason", Type::named("String")))
        .into_meta()
}

fn directive_meta() -> MetaType {
    ObjectMeta::new("__Directive")
        .field(MetaField::new("name", Type::named("String").non_null()))
        .field(MetaField::new("description", Type::named("String")))
        .field(MetaField::new(
            "locations",
            Type::list(Type::named("__DirectiveLocation").non_null()).non_null(),
        ))
        .field(MetaField::new(
            "args",
            Type::list(Type::named("__InputValue").non_null()).non_null(),
        ))
        .into_meta()
}

fn type_kind_meta() -> MetaType {
    let mut meta = EnumMeta::new("__TypeKind");
    for kind in [
        "SCALAR",
        "OBJECT",
        "INTERFACE",
        "UNION",
        "ENUM",
        "INPUT_OBJECT",
        "LIST",
        "NON_NULL",
    ] {
        meta = meta.value(MetaEnumValue::new(kind));
    }
    meta.into_meta()
}

fn directive_location_meta() -> MetaType {
    let mut meta = EnumMeta::new("__DirectiveLocation");
    for location in [
        "QUERY",
        "MUTATION",
        "SUBSCRIPTION",
        "FIELD",
        "FRAGMENT_DEFINITION",
        "FRAGMENT_SPREAD",
        "INLINE_FRAGMENT",
    ] {
        meta = meta.value(MetaEnumValue::new(location));
    }
    meta.into_meta()
}

fn field_value(field: &MetaField) -> Value {
    Value::Object(
        [
            ("name", Value::String(field.name.to_string())),
            (
                "description",
                optional_string(field.description.as_deref()),
            ),
            (
                "args",
                Value::List(field.arguments.iter().map(input_value_value).collect()),
            ),
            ("type", type_reference(&field.field_type)),
            (
                "isDeprecated",
                Value::Boolean(field.deprecation_status.is_deprecated()),
            ),
            (
                "deprecationReason",
                optional_string(field.deprecation_status.reason()),
            ),
        ]
        .into_iter()
        .collect(),
    )
}

fn input_value_value(arg: &MetaArgument) -> Value {
    Value::Object(
        [
            ("name", Value::String(arg.name.to_string())),
            ("description", optional_string(arg.description.as_deref())),
            ("type", type_reference(&arg.arg_type)),
            (
                "defaultValue",
                arg.default_value
                    .as_ref()
                    .map_or(Value::Null, |v| Value::String(v.to_string())),
            ),
        ]
        .into_iter()
        .collect(),
    )
}

fn enum_value_value(value: &MetaEnumValue) -> Value {
    Value::Object(
        [
            ("name", Value::String(value.name.to_string())),
            (
                "description",
                optional_string(value.description.as_deref()),
            ),
            (
                "isDeprecated",
                Value::Boolean(value.deprecation_status.is_deprecated()),
            ),
            (
                "deprecationReason",
                optional_string(value.deprecation_status.reason()),
            ),
        ]
        .into_iter()
        .collect(),
    )
}

fn directive_value(directive: &DirectiveType) -> Value {
    Value::Object(
        [
            ("name", Value::String(directive.name.to_string())),
            (
                "description",
                optional_string(directive.description.as_deref()),
            ),
            (
                "locations",
                Value::List(
                    directive
                        .locations
                        .iter()
                        .map(|l| Value::String(l.as_str().into()))
                        .collect(),
                ),
            ),
            (
                "args",
                Value::List(directive.arguments.iter().map(input_value_value).collect()),
            ),
        ]
        .into_iter()
        .collect(),
    )
}
