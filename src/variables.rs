//! Coercion of raw input into the execution value domain.
//!
//! Two callers share the recursive rules here: variable coercion before
//! execution starts, and argument coercion at each field. A single failure
//! while coercing variables is fatal for the whole operation.

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;

use crate::{
    ast::{InputValue, Operation, Type},
    schema::{meta::MetaType, model::Schema},
    validation::RuleError,
    value::{Object, Value},
};

/// The raw variable map handed in next to a query, e.g. decoded out of an
/// HTTP request body.
pub type Variables = HashMap<String, InputValue>;

/// Variable values coerced against the operation's declarations, in
/// definition order.
pub type VariableValues = IndexMap<String, Value>;

/// Position inside a structured input value, for error messages.
pub(crate) enum Path<'a> {
    Root,
    ArrayElement(usize, &'a Path<'a>),
    ObjectField(&'a str, &'a Path<'a>),
}

impl fmt::Display for Path<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Path::Root => write!(f, ""),
            Path::ArrayElement(idx, prev) => write!(f, "{prev}In element #{idx}: "),
            Path::ObjectField(name, prev) => write!(f, r#"{prev}In field "{name}": "#),
        }
    }
}

/// Turns the raw variable map into a typed one, walking the operation's
/// variable definitions in order.
pub(crate) fn coerce_variable_values(
    schema: &Schema,
    operation: &Operation,
    values: &Variables,
    warnings: &mut Vec<String>,
) -> Result<VariableValues, Vec<RuleError>> {
    let mut coerced = VariableValues::new();
    let mut errors = Vec::new();

    for (name, def) in &operation.variable_definitions {
        let var_type = &def.var_type.item;

        match schema.concrete_type_by_name(var_type.innermost_name()) {
            Some(t) if t.is_input() => {}
            _ => {
                errors.push(RuleError::new(
                    &format!(
                        r#"Variable "${}" expected value of type "{}" which cannot be used as an input type."#,
                        name.item, var_type,
                    ),
                    &[name.start],
                ));
                continue;
            }
        }

        match values.get(&name.item) {
            Some(raw) => {
                match coerce_input_value(schema, var_type, raw, None, &Path::Root, warnings) {
                    Ok(v) => {
                        coerced.insert(name.item.clone(), v);
                    }
                    Err(message) => errors.push(RuleError::new(
                        &format!(
                            r#"Variable "${}" got invalid value. {}."#,
                            name.item, message,
                        ),
                        &[name.start],
                    )),
                }
            }
            None => {
                if let Some(default) = &def.default_value {
                    match coerce_input_value(
                        schema,
                        &var_type.clone().into_nullable(),
                        &default.item,
                        None,
                        &Path::Root,
                        warnings,
                    ) {
                        Ok(v) => {
                            coerced.insert(name.item.clone(), v);
                        }
                        Err(message) => errors.push(RuleError::new(
                            &format!(
                                r#"Variable "${}" got invalid default value. {}."#,
                                name.item, message,
                            ),
                            &[name.start],
                        )),
                    }
                } else if var_type.is_non_null() {
                    errors.push(RuleError::new(
                        &format!(
                            r#"Variable "${}" of required type "{}" was not provided."#,
                            name.item, var_type,
                        ),
                        &[name.start],
                    ));
                } else {
                    coerced.insert(name.item.clone(), Value::Null);
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(coerced)
    } else {
        errors.sort();
        Err(errors)
    }
}

/// Coerces one uncoerced value against a declared type.
///
/// `vars` supplies already-coerced variable values for references nested in
/// literals; variable coercion itself passes `None`, since raw maps and
/// document defaults are constant. Deprecated enum values and input fields
/// consumed along the way are reported through `warnings`.
pub(crate) fn coerce_input_value(
    schema: &Schema,
    t: &Type,
    value: &InputValue,
    vars: Option<&VariableValues>,
    path: &Path<'_>,
    warnings: &mut Vec<String>,
) -> Result<Value, String> {
    if let InputValue::Variable(name) = value {
        let Some(vars) = vars else {
            return Err(format!(r#"{path}Unexpected variable "${name}""#));
        };
        let resolved = vars.get(name).cloned().unwrap_or(Value::Null);
        if t.is_non_null() && resolved.is_null() {
            return Err(format!(r#"{path}Expected "{t}", found null"#));
        }
        return Ok(resolved);
    }

    match t {
        Type::NonNullNamed(_) | Type::NonNullList(_) => {
            if value.is_null() {
                Err(format!(r#"{path}Expected "{t}", found null"#))
            } else {
                coerce_input_value(schema, &t.clone().into_nullable(), value, vars, path, warnings)
            }
        }

        _ if value.is_null() => Ok(Value::Null),

        Type::List(inner) => match value {
            InputValue::List(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    out.push(coerce_input_value(
                        schema,
                        inner,
                        item,
                        vars,
                        &Path::ArrayElement(i, path),
                        warnings,
                    )?);
                }
                Ok(Value::List(out))
            }
            // A single value coerces to a one-element list.
            single => Ok(Value::List(vec![coerce_input_value(
                schema, inner, single, vars, path, warnings,
            )?])),
        },

        Type::Named(name) => {
            let meta = schema
                .concrete_type_by_name(name)
                .ok_or_else(|| format!(r#"{path}Unknown type "{name}""#))?;
            match meta {
                MetaType::Scalar(scalar) => {
                    (scalar.parse_fn)(value).map_err(|e| format!("{path}{e}"))
                }
                MetaType::Enum(enum_meta) => {
                    let literal = match value {
                        InputValue::Enum(n) => Some(n.as_str()),
                        InputValue::String(s) => Some(s.as_str()),
                        _ => None,
                    };
                    if let Some(ev) = literal.and_then(|l| enum_meta.value_by_name(l)) {
                        if ev.deprecation_status.is_deprecated() {
                            warnings.push(deprecated_note(
                                &format!(r#"Enum value "{}" of enum "{name}""#, ev.name),
                                ev.deprecation_status.reason(),
                            ));
                        }
                        return Ok(ev.value.clone());
                    }
                    // An already-coerced internal value passes through
                    // unchanged, keeping coercion idempotent.
                    if let Some(candidate) = scalar_literal_value(value) {
                        if enum_meta.name_for_value(&candidate).is_some() {
                            return Ok(candidate);
                        }
                    }
                    if literal.is_some() {
                        Err(format!(r#"{path}Invalid value for enum "{name}""#))
                    } else {
                        Err(format!(
                            r#"{path}Expected "{name}", found not a string or enum"#
                        ))
                    }
                }
                MetaType::InputObject(input) => {
                    let InputValue::Object(fields) = value else {
                        return Err(format!(r#"{path}Expected "{name}", found not an object"#));
                    };

                    for (key, _) in fields {
                        if input.input_fields.iter().all(|f| f.name != key.as_str()) {
                            return Err(format!(
                                r#"{}Unknown field"#,
                                Path::ObjectField(key, path),
                            ));
                        }
                    }

                    let mut out = Object::with_capacity(input.input_fields.len());
                    for input_field in &input.input_fields {
                        let supplied = fields
                            .iter()
                            .find(|(k, _)| *k == input_field.name)
                            .map(|(_, v)| v);
                        let field_path = Path::ObjectField(&input_field.name, path);
                        match supplied {
                            Some(v) => {
                                if input_field.deprecation_status.is_deprecated() {
                                    warnings.push(deprecated_note(
                                        &format!(
                                            r#"Input field "{}" of "{name}""#,
                                            input_field.name,
                                        ),
                                        input_field.deprecation_status.reason(),
                                    ));
                                }
                                out.add_field(
                                    input_field.name.to_string(),
                                    coerce_input_value(
                                        schema,
                                        &input_field.arg_type,
                                        v,
                                        vars,
                                        &field_path,
                                        warnings,
                                    )?,
                                );
                            }
                            None => match &input_field.default_value {
                                // Defaults are pre-coerced; no re-validation.
                                Some(default) => {
                                    out.add_field(input_field.name.to_string(), default.clone());
                                }
                                None if input_field.arg_type.is_non_null() => {
                                    return Err(format!(
                                        r#"{field_path}Expected "{}", found null"#,
                                        input_field.arg_type,
                                    ));
                                }
                                None => {
                                    out.add_field(input_field.name.to_string(), Value::Null);
                                }
                            },
                        }
                    }
                    Ok(Value::Object(out))
                }
                _ => Err(format!(
                    r#"{path}Type "{name}" cannot be used as an input type"#
                )),
            }
        }
    }
}

fn scalar_literal_value(value: &InputValue) -> Option<Value> {
    match value {
        InputValue::Int(i) => Some(Value::Int(*i)),
        InputValue::Float(f) => Some(Value::Float(*f)),
        InputValue::String(s) => Some(Value::String(s.clone())),
        InputValue::Boolean(b) => Some(Value::Boolean(*b)),
        _ => None,
    }
}

pub(crate) fn deprecated_note(subject: &str, reason: Option<&str>) -> String {
    match reason {
        Some(reason) => format!("{subject} is deprecated: {reason}"),
        None => format!("{subject} is deprecated"),
    }
}
