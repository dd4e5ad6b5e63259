use crate::{
    ast::{FragmentSpread, Spanning},
    validation::{ValidatorContext, Visitor},
};

pub fn factory() -> KnownFragmentNames {
    KnownFragmentNames
}

pub struct KnownFragmentNames;

impl<'a> Visitor<'a> for KnownFragmentNames {
    fn enter_fragment_spread(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        spread: &'a Spanning<FragmentSpread>,
    ) {
        if !ctx.is_known_fragment(&spread.item.name.item) {
            ctx.report_error(&error_message(&spread.item.name.item), &[spread.start]);
        }
    }
}

fn error_message(frag_name: &str) -> String {
    format!(r#"Unknown fragment: "{frag_name}""#)
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};

    use crate::validation::{
        test_harness::{expect_fails_rule, expect_passes_rule},
        visit,
    };

    #[test]
    fn known_fragment_names_are_valid() {
        expect_passes_rule(
            |ctx, doc| visit(&mut factory(), ctx, doc),
            r#"
          {
            human(id: 4) {
              ...HumanFields1
              ... on Human {
                ...HumanFields2
              }
            }
          }
          fragment HumanFields1 on Human {
            name
            ...HumanFields3
          }
          fragment HumanFields2 on Human { name }
          fragment HumanFields3 on Human { name }
        "#,
        );
    }

    #[test]
    fn unknown_fragment_names_are_invalid() {
        expect_fails_rule(
            |ctx, doc| visit(&mut factory(), ctx, doc),
            r#"
          {
            human(id: 4) {
              ...UnknownFragment1
              ... on Human {
                ...UnknownFragment2
              }
            }
          }
        "#,
            &[
                &error_message("UnknownFragment1"),
                &error_message("UnknownFragment2"),
            ],
        );
    }
}
