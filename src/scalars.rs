//! Parse and serialize functions for the built-in scalar types.
//!
//! These are the functions the [`ScalarMeta`](crate::meta::ScalarMeta)
//! records of the five built-in scalars point at. Parsing turns an uncoerced
//! input into an execution value; serializing checks a resolved value on its
//! way out.

use crate::{
    ast::InputValue,
    resolve::{FieldError, FieldResult},
    value::Value,
};

pub(crate) fn parse_int(v: &InputValue) -> FieldResult {
    match v {
        InputValue::Int(i) => Ok(Value::Int(*i)),
        _ => Err(FieldError::new(format!("Expected `Int`, found: {v}"))),
    }
}

pub(crate) fn serialize_int(v: &Value) -> FieldResult {
    match v {
        Value::Int(_) => Ok(v.clone()),
        _ => Err(FieldError::new("Int cannot represent non-integer value")),
    }
}

pub(crate) fn parse_float(v: &InputValue) -> FieldResult {
    match v {
        InputValue::Int(i) => Ok(Value::Float(*i as f64)),
        InputValue::Float(f) => Ok(Value::Float(*f)),
        _ => Err(FieldError::new(format!("Expected `Float`, found: {v}"))),
    }
}

pub(crate) fn serialize_float(v: &Value) -> FieldResult {
    match v {
        Value::Float(_) => Ok(v.clone()),
        Value::Int(i) => Ok(Value::Float(*i as f64)),
        _ => Err(FieldError::new("Float cannot represent non-numeric value")),
    }
}

pub(crate) fn parse_string(v: &InputValue) -> FieldResult {
    match v {
        InputValue::String(s) => Ok(Value::String(s.clone())),
        _ => Err(FieldError::new(format!("Expected `String`, found: {v}"))),
    }
}

pub(crate) fn serialize_string(v: &Value) -> FieldResult {
    match v {
        Value::String(_) => Ok(v.clone()),
        _ => Err(FieldError::new("String cannot represent non-string value")),
    }
}

pub(crate) fn parse_boolean(v: &InputValue) -> FieldResult {
    match v {
        InputValue::Boolean(b) => Ok(Value::Boolean(*b)),
        _ => Err(FieldError::new(format!("Expected `Boolean`, found: {v}"))),
    }
}

pub(crate) fn serialize_boolean(v: &Value) -> FieldResult {
    match v {
        Value::Boolean(_) => Ok(v.clone()),
        _ => Err(FieldError::new(
            "Boolean cannot represent non-boolean value",
        )),
    }
}

// An ID is input as a string or an integer, and always carried as a string.
pub(crate) fn parse_id(v: &InputValue) -> FieldResult {
    match v {
        InputValue::String(s) => Ok(Value::String(s.clone())),
        InputValue::Int(i) => Ok(Value::String(i.to_string())),
        _ => Err(FieldError::new(format!("Expected `ID`, found: {v}"))),
    }
}

pub(crate) fn serialize_id(v: &Value) -> FieldResult {
    match v {
        Value::String(_) => Ok(v.clone()),
        Value::Int(i) => Ok(Value::String(i.to_string())),
        _ => Err(FieldError::new("ID cannot represent value")),
    }
}
