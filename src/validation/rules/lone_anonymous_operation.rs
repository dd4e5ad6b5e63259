use crate::{
    ast::{Definition, Document, Operation, Spanning},
    validation::{ValidatorContext, Visitor},
};

pub fn factory() -> LoneAnonymousOperation {
    LoneAnonymousOperation { operation_count: 0 }
}

pub struct LoneAnonymousOperation {
    operation_count: usize,
}

impl<'a> Visitor<'a> for LoneAnonymousOperation {
    fn enter_document(&mut self, _: &mut ValidatorContext<'a>, doc: &'a Document) {
        self.operation_count = doc
            .iter()
            .filter(|d| matches!(d, Definition::Operation(_)))
            .count();
    }

    fn enter_operation_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        op: &'a Spanning<Operation>,
    ) {
        if op.item.name.is_none() && self.operation_count > 1 {
            ctx.report_error(error_message(), &[op.start]);
        }
    }
}

fn error_message() -> &'static str {
    "This anonymous operation must be the only defined operation"
}
