use crate::{
    ast::{Field, Spanning},
    validation::{ValidatorContext, Visitor},
};

pub fn factory() -> FieldsOnCorrectType {
    FieldsOnCorrectType
}

pub struct FieldsOnCorrectType;

impl<'a> Visitor<'a> for FieldsOnCorrectType {
    fn enter_field(&mut self, ctx: &mut ValidatorContext<'a>, field: &'a Spanning<Field>) {
        let Some(parent_type) = ctx.parent_type() else {
            return;
        };

        let field_name = &field.item.name.item;

        // Unions carry no fields of their own; the meta field is still
        // selectable on every composite type.
        if field_name == "__typename" && parent_type.is_composite() {
            return;
        }

        if parent_type.field_by_name(field_name).is_none() {
            ctx.report_error(
                &error_message(field_name, parent_type.name()),
                &[field.start],
            );
        }
    }
}

fn error_message(field: &str, type_name: &str) -> String {
    format!(r#"Unknown field "{field}" on type "{type_name}""#)
}
