//! One module per validation rule.

pub mod fields_on_correct_type;
pub mod known_directives;
pub mod known_fragment_names;
pub mod lone_anonymous_operation;
pub mod no_fragment_cycles;
pub mod overlapping_fields_can_be_merged;
pub mod provided_non_null_arguments;
pub mod scalar_leafs;
pub mod unique_operation_names;
pub mod variables_in_allowed_position;

use crate::{
    ast::Document,
    validation::{visitor::visit, MultiVisitorNil, ValidatorContext},
};

/// Runs every rule against the document in a single walk.
pub fn visit_all_rules<'a>(ctx: &mut ValidatorContext<'a>, doc: &'a Document) {
    let mut mv = MultiVisitorNil
        .with(self::fields_on_correct_type::factory())
        .with(self::known_directives::factory())
        .with(self::known_fragment_names::factory())
        .with(self::lone_anonymous_operation::factory())
        .with(self::no_fragment_cycles::factory())
        .with(self::overlapping_fields_can_be_merged::factory())
        .with(self::provided_non_null_arguments::factory())
        .with(self::scalar_leafs::factory())
        .with(self::unique_operation_names::factory())
        .with(self::variables_in_allowed_position::factory());

    visit(&mut mv, ctx, doc);
}
