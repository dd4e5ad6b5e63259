use fnv::FnvHashMap;

use crate::{
    ast::{Operation, SourcePosition, Spanning},
    validation::{ValidatorContext, Visitor},
};

pub fn factory<'a>() -> UniqueOperationNames<'a> {
    UniqueOperationNames {
        names: FnvHashMap::default(),
    }
}

pub struct UniqueOperationNames<'a> {
    names: FnvHashMap<&'a str, SourcePosition>,
}

impl<'a> Visitor<'a> for UniqueOperationNames<'a> {
    fn enter_operation_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        op: &'a Spanning<Operation>,
    ) {
        if let Some(op_name) = &op.item.name {
            match self.names.get(op_name.item.as_str()) {
                Some(prev_pos) => {
                    ctx.report_error(&error_message(&op_name.item), &[*prev_pos, op.start]);
                }
                None => {
                    self.names.insert(&op_name.item, op.start);
                }
            }
        }
    }
}

fn error_message(op_name: &str) -> String {
    format!(r#"There can only be one operation named "{op_name}""#)
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};

    use crate::validation::{
        test_harness::{expect_fails_rule, expect_passes_rule},
        visit,
    };

    #[test]
    fn no_operations() {
        expect_passes_rule(
            |ctx, doc| visit(&mut factory(), ctx, doc),
            r#"
          fragment fragA on Dog { name }
        "#,
        );
    }

    #[test]
    fn one_anon_operation() {
        expect_passes_rule(|ctx, doc| visit(&mut factory(), ctx, doc), "{ dog { name } }");
    }

    #[test]
    fn multiple_operations_with_distinct_names() {
        expect_passes_rule(
            |ctx, doc| visit(&mut factory(), ctx, doc),
            r#"
          query Foo { dog { name } }
          query Bar { cat { name } }
        "#,
        );
    }

    #[test]
    fn fragment_and_operation_with_the_same_name() {
        expect_passes_rule(
            |ctx, doc| visit(&mut factory(), ctx, doc),
            r#"
          query Foo { dog { ...Foo } }
          fragment Foo on Dog { name }
        "#,
        );
    }

    #[test]
    fn multiple_operations_with_the_same_name() {
        expect_fails_rule(
            |ctx, doc| visit(&mut factory(), ctx, doc),
            r#"
          query Foo { dog { name } }
          query Foo { cat { name } }
        "#,
            &[&error_message("Foo")],
        );
    }
}
