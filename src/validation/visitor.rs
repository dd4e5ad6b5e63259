use crate::{
    ast::{
        Arguments, Definition, Directive, Document, Field, FragmentSpread, InlineFragment,
        InputValue, OperationType, Selection, Spanning, Type, VariableDefinition,
    },
    schema::meta::Argument as MetaArgument,
    validation::{ValidatorContext, Visitor},
};

/// Walks a document, maintaining the context's type stacks and calling the
/// visitor's hooks.
#[doc(hidden)]
pub fn visit<'a, V: Visitor<'a>>(v: &mut V, ctx: &mut ValidatorContext<'a>, d: &'a Document) {
    v.enter_document(ctx, d);
    visit_definitions(v, ctx, d);
    v.exit_document(ctx, d);
}

fn visit_definitions<'a, V: Visitor<'a>>(
    v: &mut V,
    ctx: &mut ValidatorContext<'a>,
    d: &'a Document,
) {
    for def in d {
        let def_type = match def {
            Definition::Fragment(f) => Some(Type::NonNullNamed(
                f.item.type_condition.item.as_str().into(),
            )),
            Definition::Operation(op) => match op.item.operation_type {
                OperationType::Query => Some(Type::NonNullNamed(
                    ctx.schema.concrete_query_type().name().clone(),
                )),
                OperationType::Mutation => ctx
                    .schema
                    .concrete_mutation_type()
                    .map(|t| Type::NonNullNamed(t.name().clone())),
                OperationType::Subscription => ctx
                    .schema
                    .concrete_subscription_type()
                    .map(|t| Type::NonNullNamed(t.name().clone())),
            },
        };

        ctx.with_pushed_type(def_type.as_ref(), |ctx| match def {
            Definition::Operation(op) => {
                v.enter_operation_definition(ctx, op);
                visit_variable_definitions(v, ctx, &op.item.variable_definitions);
                visit_directives(v, ctx, &op.item.directives);
                visit_selection_set(v, ctx, &op.item.selection_set);
                v.exit_operation_definition(ctx, op);
            }
            Definition::Fragment(f) => {
                v.enter_fragment_definition(ctx, f);
                visit_directives(v, ctx, &f.item.directives);
                visit_selection_set(v, ctx, &f.item.selection_set);
                v.exit_fragment_definition(ctx, f);
            }
        });
    }
}

fn visit_variable_definitions<'a, V: Visitor<'a>>(
    v: &mut V,
    ctx: &mut ValidatorContext<'a>,
    defs: &'a [(Spanning<String>, VariableDefinition)],
) {
    for def in defs {
        let var_type = def.1.var_type.item.clone();

        ctx.with_pushed_input_type(Some(&var_type), |ctx| {
            v.enter_variable_definition(ctx, def);

            if let Some(default_value) = &def.1.default_value {
                visit_input_value(v, ctx, default_value.start, &default_value.item);
            }

            v.exit_variable_definition(ctx, def);
        });
    }
}

fn visit_directives<'a, V: Visitor<'a>>(
    v: &mut V,
    ctx: &mut ValidatorContext<'a>,
    directives: &'a [Spanning<Directive>],
) {
    for directive in directives {
        let directive_arguments = ctx
            .schema
            .directive_by_name(&directive.item.name.item)
            .map(|d| &d.arguments);

        v.enter_directive(ctx, directive);
        visit_arguments(v, ctx, directive_arguments, &directive.item.arguments);
        v.exit_directive(ctx, directive);
    }
}

fn visit_arguments<'a, V: Visitor<'a>>(
    v: &mut V,
    ctx: &mut ValidatorContext<'a>,
    meta_args: Option<&Vec<MetaArgument>>,
    arguments: &'a Arguments,
) {
    for argument in arguments {
        let arg_type = meta_args
            .and_then(|args| args.iter().find(|a| a.name == argument.0.item))
            .map(|a| a.arg_type.clone());

        ctx.with_pushed_input_type(arg_type.as_ref(), |ctx| {
            v.enter_argument(ctx, argument);

            visit_input_value(v, ctx, argument.1.start, &argument.1.item);

            v.exit_argument(ctx, argument);
        });
    }
}

fn visit_selection_set<'a, V: Visitor<'a>>(
    v: &mut V,
    ctx: &mut ValidatorContext<'a>,
    selection_set: &'a [Selection],
) {
    ctx.with_pushed_parent_type(|ctx| {
        v.enter_selection_set(ctx, selection_set);

        for selection in selection_set {
            visit_selection(v, ctx, selection);
        }

        v.exit_selection_set(ctx, selection_set);
    });
}

fn visit_selection<'a, V: Visitor<'a>>(
    v: &mut V,
    ctx: &mut ValidatorContext<'a>,
    selection: &'a Selection,
) {
    match selection {
        Selection::Field(field) => visit_field(v, ctx, field),
        Selection::FragmentSpread(spread) => visit_fragment_spread(v, ctx, spread),
        Selection::InlineFragment(fragment) => visit_inline_fragment(v, ctx, fragment),
    }
}

fn visit_field<'a, V: Visitor<'a>>(
    v: &mut V,
    ctx: &mut ValidatorContext<'a>,
    field: &'a Spanning<Field>,
) {
    let meta_field = ctx
        .parent_type()
        .and_then(|t| t.field_by_name(&field.item.name.item));

    let field_type = meta_field.map(|f| f.field_type.clone());
    let field_args = meta_field.map(|f| &f.arguments);

    ctx.with_pushed_type(field_type.as_ref(), |ctx| {
        v.enter_field(ctx, field);

        visit_arguments(v, ctx, field_args, &field.item.arguments);
        visit_directives(v, ctx, &field.item.directives);

        if !field.item.selection_set.is_empty() {
            visit_selection_set(v, ctx, &field.item.selection_set);
        }

        v.exit_field(ctx, field);
    });
}

fn visit_fragment_spread<'a, V: Visitor<'a>>(
    v: &mut V,
    ctx: &mut ValidatorContext<'a>,
    spread: &'a Spanning<FragmentSpread>,
) {
    v.enter_fragment_spread(ctx, spread);

    visit_directives(v, ctx, &spread.item.directives);

    v.exit_fragment_spread(ctx, spread);
}

fn visit_inline_fragment<'a, V: Visitor<'a>>(
    v: &mut V,
    ctx: &mut ValidatorContext<'a>,
    fragment: &'a Spanning<InlineFragment>,
) {
    let mut visit_fn = move |ctx: &mut ValidatorContext<'a>| {
        v.enter_inline_fragment(ctx, fragment);

        visit_directives(v, ctx, &fragment.item.directives);
        visit_selection_set(v, ctx, &fragment.item.selection_set);

        v.exit_inline_fragment(ctx, fragment);
    };

    if let Some(type_condition) = &fragment.item.type_condition {
        ctx.with_pushed_type(
            Some(&Type::NonNullNamed(type_condition.item.as_str().into())),
            visit_fn,
        );
    } else {
        visit_fn(ctx);
    }
}

fn visit_input_value<'a, V: Visitor<'a>>(
    v: &mut V,
    ctx: &mut ValidatorContext<'a>,
    pos: crate::ast::SourcePosition,
    input_value: &'a InputValue,
) {
    match input_value {
        InputValue::Object(fields) => {
            for (name, value) in fields {
                let inner_type = ctx
                    .current_input_type_literal()
                    .and_then(|t| match t {
                        Type::NonNullNamed(name) | Type::Named(name) => {
                            ctx.schema.concrete_type_by_name(name)
                        }
                        _ => None,
                    })
                    .and_then(|ct| ct.input_field_by_name(name))
                    .map(|f| f.arg_type.clone());

                ctx.with_pushed_input_type(inner_type.as_ref(), |ctx| {
                    visit_input_value(v, ctx, pos, value);
                });
            }
        }
        InputValue::List(ls) => {
            let inner_type = ctx.current_input_type_literal().and_then(|t| match t {
                Type::List(inner) | Type::NonNullList(inner) => Some(inner.as_ref().clone()),
                _ => None,
            });

            ctx.with_pushed_input_type(inner_type.as_ref(), |ctx| {
                for value in ls {
                    visit_input_value(v, ctx, pos, value);
                }
            });
        }
        InputValue::Variable(name) => {
            v.enter_variable_value(ctx, Spanning::new(pos, name));
        }
        _ => (),
    }
}
