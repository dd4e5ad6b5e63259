use crate::{
    ast::{Directive, Field, Spanning},
    validation::{ValidatorContext, Visitor},
};

pub fn factory() -> ProvidedNonNullArguments {
    ProvidedNonNullArguments
}

pub struct ProvidedNonNullArguments;

impl<'a> Visitor<'a> for ProvidedNonNullArguments {
    fn enter_field(&mut self, ctx: &mut ValidatorContext<'a>, field: &'a Spanning<Field>) {
        let field_name = &field.item.name.item;

        let Some(meta_field) = ctx.parent_type().and_then(|t| t.field_by_name(field_name))
        else {
            return;
        };

        for meta_arg in &meta_field.arguments {
            if meta_arg.arg_type.is_non_null()
                && meta_arg.default_value.is_none()
                && !field
                    .item
                    .arguments
                    .iter()
                    .any(|(name, _)| name.item == meta_arg.name)
            {
                ctx.report_error(
                    &field_error_message(
                        field_name,
                        &meta_arg.name,
                        &meta_arg.arg_type.to_string(),
                    ),
                    &[field.start],
                );
            }
        }
    }

    fn enter_directive(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        directive: &'a Spanning<Directive>,
    ) {
        let directive_name = &directive.item.name.item;

        let Some(directive_type) = ctx.schema.directive_by_name(directive_name) else {
            return;
        };

        for meta_arg in &directive_type.arguments {
            if meta_arg.arg_type.is_non_null()
                && meta_arg.default_value.is_none()
                && !directive
                    .item
                    .arguments
                    .iter()
                    .any(|(name, _)| name.item == meta_arg.name)
            {
                ctx.report_error(
                    &directive_error_message(
                        directive_name,
                        &meta_arg.name,
                        &meta_arg.arg_type.to_string(),
                    ),
                    &[directive.start],
                );
            }
        }
    }
}

fn field_error_message(field_name: &str, arg_name: &str, type_name: &str) -> String {
    format!(
        r#"Field "{field_name}" argument "{arg_name}" of type "{type_name}" is required but not provided"#
    )
}

fn directive_error_message(directive_name: &str, arg_name: &str, type_name: &str) -> String {
    format!(
        r#"Directive "@{directive_name}" argument "{arg_name}" of type "{type_name}" is required but not provided"#
    )
}
