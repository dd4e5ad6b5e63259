use fnv::FnvHashMap;

use crate::{
    ast::{Field, Selection, Spanning},
    validation::{ValidatorContext, Visitor},
};

pub fn factory() -> OverlappingFieldsCanBeMerged {
    OverlappingFieldsCanBeMerged
}

/// Two fields that land on the same response key must be mergeable: the
/// same underlying field, invoked with the same argument literals. Checked
/// per selection set; the selections a key collects at execution time merge
/// deterministically once this holds.
pub struct OverlappingFieldsCanBeMerged;

impl<'a> Visitor<'a> for OverlappingFieldsCanBeMerged {
    fn enter_selection_set(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        selection_set: &'a [Selection],
    ) {
        let mut seen: FnvHashMap<&str, &Spanning<Field>> = FnvHashMap::default();

        for selection in selection_set {
            let Selection::Field(field) = selection else {
                continue;
            };
            let response_key = field.item.response_key();

            match seen.get(response_key) {
                None => {
                    seen.insert(response_key, field);
                }
                Some(prev) => {
                    if prev.item.name.item != field.item.name.item {
                        ctx.report_error(
                            &error_message(
                                response_key,
                                &format!(
                                    r#""{}" and "{}" are different fields"#,
                                    prev.item.name.item, field.item.name.item,
                                ),
                            ),
                            &[prev.start, field.start],
                        );
                    } else if !same_arguments(prev, field) {
                        ctx.report_error(
                            &error_message(response_key, "they have differing arguments"),
                            &[prev.start, field.start],
                        );
                    }
                }
            }
        }
    }
}

fn same_arguments(a: &Spanning<Field>, b: &Spanning<Field>) -> bool {
    if a.item.arguments.len() != b.item.arguments.len() {
        return false;
    }
    a.item.arguments.iter().all(|(name, value)| {
        b.item
            .arguments
            .iter()
            .any(|(other_name, other_value)| {
                name.item == other_name.item && value.item == other_value.item
            })
    })
}

fn error_message(response_key: &str, reason: &str) -> String {
    format!(r#"Fields "{response_key}" conflict because {reason}"#)
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};

    use crate::validation::{
        test_harness::{expect_fails_rule, expect_passes_rule},
        visit,
    };

    #[test]
    fn unique_fields() {
        expect_passes_rule(
            |ctx, doc| visit(&mut factory(), ctx, doc),
            r#"
          fragment uniqueFields on Dog {
            name
            nickname
          }
        "#,
        );
    }

    #[test]
    fn identical_fields() {
        expect_passes_rule(
            |ctx, doc| visit(&mut factory(), ctx, doc),
            r#"
          fragment mergeIdenticalFields on Dog {
            name
            name
          }
        "#,
        );
    }

    #[test]
    fn identical_fields_with_identical_args() {
        expect_passes_rule(
            |ctx, doc| visit(&mut factory(), ctx, doc),
            r#"
          fragment mergeIdenticalFieldsWithIdenticalArgs on Dog {
            doesKnowCommand(dogCommand: SIT)
            doesKnowCommand(dogCommand: SIT)
          }
        "#,
        );
    }

    #[test]
    fn different_args_with_different_aliases() {
        expect_passes_rule(
            |ctx, doc| visit(&mut factory(), ctx, doc),
            r#"
          fragment differentArgsWithDifferentAliases on Dog {
            knowsSit: doesKnowCommand(dogCommand: SIT)
            knowsDown: doesKnowCommand(dogCommand: DOWN)
          }
        "#,
        );
    }

    #[test]
    fn conflicting_aliases() {
        expect_fails_rule(
            |ctx, doc| visit(&mut factory(), ctx, doc),
            r#"
          fragment sameAliasesWithDifferentFieldTargets on Dog {
            fido: name
            fido: nickname
          }
        "#,
            &[&error_message(
                "fido",
                r#""name" and "nickname" are different fields"#,
            )],
        );
    }

    #[test]
    fn conflicting_args() {
        expect_fails_rule(
            |ctx, doc| visit(&mut factory(), ctx, doc),
            r#"
          fragment conflictingArgs on Dog {
            doesKnowCommand(dogCommand: SIT)
            doesKnowCommand(dogCommand: HEEL)
          }
        "#,
            &[&error_message(
                "doesKnowCommand",
                "they have differing arguments",
            )],
        );
    }

    #[test]
    fn missing_argument_set_conflicts() {
        expect_fails_rule(
            |ctx, doc| visit(&mut factory(), ctx, doc),
            r#"
          fragment conflictingArgs on Dog {
            doesKnowCommand
            doesKnowCommand(dogCommand: HEEL)
          }
        "#,
            &[&error_message(
                "doesKnowCommand",
                "they have differing arguments",
            )],
        );
    }
}
