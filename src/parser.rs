//! Bridge to the external parser.
//!
//! Lexing and parsing are delegated to the `graphql-parser` crate; this
//! module translates its syntax tree into the crate's own [`ast`] so the
//! validator and executor stay independent of the parser's representation.

use derive_more::with_trait::{Display, Error};
use graphql_parser::{query as q, Pos};

use crate::ast::{
    Definition, Directive, Document, Field, Fragment, FragmentSpread, InlineFragment, InputValue,
    Operation, OperationType, Selection, SourcePosition, Spanning, Type, VariableDefinition,
};

/// Rejection of a source document by the parser.
#[derive(Debug, Display, Error)]
#[display("{_0}")]
pub struct ParseError(q::ParseError);

/// Parse a source document into a [`Document`].
pub fn parse(source: &str) -> Result<Document, ParseError> {
    let document = q::parse_query::<String>(source).map_err(ParseError)?;
    Ok(document
        .definitions
        .into_iter()
        .map(translate_definition)
        .collect())
}

fn position(pos: Pos) -> SourcePosition {
    SourcePosition::new(pos.line, pos.column)
}

fn translate_definition<'a>(def: q::Definition<'a, String>) -> Definition {
    match def {
        q::Definition::Operation(op) => Definition::Operation(translate_operation(op)),
        q::Definition::Fragment(fragment) => Definition::Fragment(translate_fragment(fragment)),
    }
}

fn translate_operation<'a>(op: q::OperationDefinition<'a, String>) -> Spanning<Operation> {
    match op {
        q::OperationDefinition::SelectionSet(set) => Spanning::new(
            position(set.span.0),
            Operation {
                operation_type: OperationType::Query,
                name: None,
                variable_definitions: vec![],
                directives: vec![],
                selection_set: translate_selection_set(set),
            },
        ),
        q::OperationDefinition::Query(query) => Spanning::new(
            position(query.position),
            Operation {
                operation_type: OperationType::Query,
                name: query
                    .name
                    .map(|n| Spanning::new(position(query.position), n)),
                variable_definitions: translate_variable_definitions(query.variable_definitions),
                directives: translate_directives(query.directives),
                selection_set: translate_selection_set(query.selection_set),
            },
        ),
        q::OperationDefinition::Mutation(mutation) => Spanning::new(
            position(mutation.position),
            Operation {
                operation_type: OperationType::Mutation,
                name: mutation
                    .name
                    .map(|n| Spanning::new(position(mutation.position), n)),
                variable_definitions: translate_variable_definitions(
                    mutation.variable_definitions,
                ),
                directives: translate_directives(mutation.directives),
                selection_set: translate_selection_set(mutation.selection_set),
            },
        ),
        q::OperationDefinition::Subscription(subscription) => Spanning::new(
            position(subscription.position),
            Operation {
                operation_type: OperationType::Subscription,
                name: subscription
                    .name
                    .map(|n| Spanning::new(position(subscription.position), n)),
                variable_definitions: translate_variable_definitions(
                    subscription.variable_definitions,
                ),
                directives: translate_directives(subscription.directives),
                selection_set: translate_selection_set(subscription.selection_set),
            },
        ),
    }
}

fn translate_fragment<'a>(fragment: q::FragmentDefinition<'a, String>) -> Spanning<Fragment> {
    let q::TypeCondition::On(type_condition) = fragment.type_condition;
    Spanning::new(
        position(fragment.position),
        Fragment {
            name: Spanning::new(position(fragment.position), fragment.name),
            type_condition: Spanning::new(position(fragment.position), type_condition),
            directives: translate_directives(fragment.directives),
            selection_set: translate_selection_set(fragment.selection_set),
        },
    )
}

fn translate_variable_definitions<'a>(
    definitions: Vec<q::VariableDefinition<'a, String>>,
) -> Vec<(Spanning<String>, VariableDefinition)> {
    definitions
        .into_iter()
        .map(|def| {
            let pos = position(def.position);
            (
                Spanning::new(pos, def.name),
                VariableDefinition {
                    var_type: Spanning::new(pos, translate_type(def.var_type)),
                    default_value: def
                        .default_value
                        .map(|v| Spanning::new(pos, translate_value(v))),
                },
            )
        })
        .collect()
}

fn translate_selection_set<'a>(set: q::SelectionSet<'a, String>) -> Vec<Selection> {
    set.items.into_iter().map(translate_selection).collect()
}

fn translate_selection<'a>(selection: q::Selection<'a, String>) -> Selection {
    match selection {
        q::Selection::Field(field) => {
            let pos = position(field.position);
            Selection::Field(Spanning::new(
                pos,
                Field {
                    alias: field.alias.map(|a| Spanning::new(pos, a)),
                    name: Spanning::new(pos, field.name),
                    arguments: translate_arguments(pos, field.arguments),
                    directives: translate_directives(field.directives),
                    selection_set: translate_selection_set(field.selection_set),
                },
            ))
        }
        q::Selection::FragmentSpread(spread) => {
            let pos = position(spread.position);
            Selection::FragmentSpread(Spanning::new(
                pos,
                FragmentSpread {
                    name: Spanning::new(pos, spread.fragment_name),
                    directives: translate_directives(spread.directives),
                },
            ))
        }
        q::Selection::InlineFragment(fragment) => {
            let pos = position(fragment.position);
            Selection::InlineFragment(Spanning::new(
                pos,
                InlineFragment {
                    type_condition: fragment.type_condition.map(|q::TypeCondition::On(name)| {
                        Spanning::new(pos, name)
                    }),
                    directives: translate_directives(fragment.directives),
                    selection_set: translate_selection_set(fragment.selection_set),
                },
            ))
        }
    }
}

fn translate_directives<'a>(
    directives: Vec<q::Directive<'a, String>>,
) -> Vec<Spanning<Directive>> {
    directives
        .into_iter()
        .map(|d| {
            let pos = position(d.position);
            Spanning::new(
                pos,
                Directive {
                    name: Spanning::new(pos, d.name),
                    arguments: translate_arguments(pos, d.arguments),
                },
            )
        })
        .collect()
}

fn translate_arguments<'a>(
    pos: SourcePosition,
    arguments: Vec<(String, q::Value<'a, String>)>,
) -> Vec<(Spanning<String>, Spanning<InputValue>)> {
    arguments
        .into_iter()
        .map(|(name, value)| {
            (
                Spanning::new(pos, name),
                Spanning::new(pos, translate_value(value)),
            )
        })
        .collect()
}

fn translate_value<'a>(value: q::Value<'a, String>) -> InputValue {
    match value {
        q::Value::Variable(name) => InputValue::Variable(name),
        q::Value::Int(n) => InputValue::Int(n.as_i64().unwrap_or_default()),
        q::Value::Float(f) => InputValue::Float(f),
        q::Value::String(s) => InputValue::String(s),
        q::Value::Boolean(b) => InputValue::Boolean(b),
        q::Value::Null => InputValue::Null,
        q::Value::Enum(e) => InputValue::Enum(e),
        q::Value::List(l) => InputValue::List(l.into_iter().map(translate_value).collect()),
        q::Value::Object(o) => {
            InputValue::Object(o.into_iter().map(|(k, v)| (k, translate_value(v))).collect())
        }
    }
}

fn translate_type<'a>(t: q::Type<'a, String>) -> Type {
    match t {
        q::Type::NamedType(name) => Type::Named(name.into()),
        q::Type::ListType(inner) => Type::list(translate_type(*inner)),
        q::Type::NonNullType(inner) => translate_type(*inner).non_null(),
    }
}
