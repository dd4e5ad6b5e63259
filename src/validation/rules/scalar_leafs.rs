use crate::{
    ast::{Field, Spanning},
    validation::{ValidatorContext, Visitor},
};

pub fn factory() -> ScalarLeafs {
    ScalarLeafs
}

pub struct ScalarLeafs;

impl<'a> Visitor<'a> for ScalarLeafs {
    fn enter_field(&mut self, ctx: &mut ValidatorContext<'a>, field: &'a Spanning<Field>) {
        let field_name = &field.item.name.item;

        let Some((t, meta_type)) = ctx.current_type_literal().zip(ctx.current_type()) else {
            return;
        };

        let has_selection = !field.item.selection_set.is_empty();

        if meta_type.is_leaf() && has_selection {
            ctx.report_error(
                &no_allowed_error_message(field_name, &t.to_string()),
                &[field.start],
            );
        } else if !meta_type.is_leaf() && !has_selection {
            ctx.report_error(
                &required_error_message(field_name, &t.to_string()),
                &[field.start],
            );
        }
    }
}

fn no_allowed_error_message(field_name: &str, type_name: &str) -> String {
    format!(
        r#"Field "{field_name}" must not have a selection since type "{type_name}" has no subfields"#
    )
}

fn required_error_message(field_name: &str, type_name: &str) -> String {
    format!(
        r#"Field "{field_name}" of type "{type_name}" must have a selection of subfields. Did you mean "{field_name} {{ ... }}"?"#
    )
}
