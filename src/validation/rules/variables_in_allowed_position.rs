use std::collections::hash_map::Entry;

use fnv::{FnvHashMap, FnvHashSet};

use crate::{
    ast::{Fragment, FragmentSpread, Operation, Spanning, Type, VariableDefinition},
    validation::{ValidatorContext, Visitor},
};

pub fn factory<'a>() -> VariablesInAllowedPosition<'a> {
    VariablesInAllowedPosition {
        spreads: FnvHashMap::default(),
        variable_usages: FnvHashMap::default(),
        variable_defs: FnvHashMap::default(),
        current_scope: None,
    }
}

#[derive(Clone, Copy, Eq, Hash, PartialEq)]
enum Scope<'a> {
    Operation(Option<&'a str>),
    Fragment(&'a str),
}

pub struct VariablesInAllowedPosition<'a> {
    spreads: FnvHashMap<Scope<'a>, FnvHashSet<&'a str>>,
    variable_usages: FnvHashMap<Scope<'a>, Vec<(Spanning<&'a String>, Type)>>,
    variable_defs: FnvHashMap<Scope<'a>, Vec<&'a (Spanning<String>, VariableDefinition)>>,
    current_scope: Option<Scope<'a>>,
}

impl<'a> VariablesInAllowedPosition<'a> {
    fn collect_incorrect_usages(
        &self,
        from: Scope<'a>,
        var_defs: &[&'a (Spanning<String>, VariableDefinition)],
        ctx: &mut ValidatorContext<'a>,
        visited: &mut FnvHashSet<Scope<'a>>,
    ) {
        if visited.contains(&from) {
            return;
        }
        visited.insert(from);

        if let Some(usages) = self.variable_usages.get(&from) {
            for (var_name, expected_type) in usages {
                let Some((_, var_def)) = var_defs
                    .iter()
                    .find(|(name, _)| name.item == *var_name.item)
                else {
                    continue;
                };

                // A declared default lets a nullable variable stand in a
                // non-null position.
                let mut var_type = var_def.var_type.item.clone();
                if var_def.default_value.is_some() {
                    var_type = var_type.non_null();
                }

                if !ctx.schema.is_subtype(&var_type, expected_type) {
                    ctx.report_error(
                        &error_message(
                            var_name.item,
                            &var_def.var_type.item.to_string(),
                            &expected_type.to_string(),
                        ),
                        &[var_name.start],
                    );
                }
            }
        }

        if let Some(spreads) = self.spreads.get(&from) {
            for spread in spreads {
                self.collect_incorrect_usages(Scope::Fragment(spread), var_defs, ctx, visited);
            }
        }
    }
}

impl<'a> Visitor<'a> for VariablesInAllowedPosition<'a> {
    fn exit_document(&mut self, ctx: &mut ValidatorContext<'a>, _: &'a crate::ast::Document) {
        for (op_scope, var_defs) in &self.variable_defs {
            let mut visited = FnvHashSet::default();
            self.collect_incorrect_usages(*op_scope, var_defs, ctx, &mut visited);
        }
    }

    fn enter_fragment_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        fragment: &'a Spanning<Fragment>,
    ) {
        self.current_scope = Some(Scope::Fragment(&fragment.item.name.item));
    }

    fn enter_operation_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        op: &'a Spanning<Operation>,
    ) {
        self.current_scope = Some(Scope::Operation(
            op.item.name.as_ref().map(|n| n.item.as_str()),
        ));
    }

    fn enter_fragment_spread(
        &mut self,
        _: &mut ValidatorContext<'a>,
        spread: &'a Spanning<FragmentSpread>,
    ) {
        if let Some(scope) = self.current_scope {
            self.spreads
                .entry(scope)
                .or_default()
                .insert(&spread.item.name.item);
        }
    }

    fn enter_variable_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        def: &'a (Spanning<String>, VariableDefinition),
    ) {
        if let Some(scope) = self.current_scope {
            match self.variable_defs.entry(scope) {
                Entry::Occupied(mut e) => e.get_mut().push(def),
                Entry::Vacant(e) => {
                    e.insert(vec![def]);
                }
            }
        }
    }

    fn enter_variable_value(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        var_name: Spanning<&'a String>,
    ) {
        if let Some((scope, expected_type)) =
            self.current_scope.zip(ctx.current_input_type_literal())
        {
            self.variable_usages
                .entry(scope)
                .or_default()
                .push((var_name, expected_type.clone()));
        }
    }
}

fn error_message(var_name: &str, type_name: &str, expected_type_name: &str) -> String {
    format!(
        r#"Variable "${var_name}" of type "{type_name}" used in position expecting type "{expected_type_name}""#
    )
}
