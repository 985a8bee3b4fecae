//! Typed field access on `serde_json` values, reporting failures as [`DecodeError`]s located at
//! the offending key or index.

use serde_json::{Map, Value};

use crate::diagnostics::{DecodeError, DecodeResultExt};

pub type Object = Map<String, Value>;

pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn type_error(expected: &str, actual: Option<&Value>) -> DecodeError {
    match actual {
        None => DecodeError::new(format!("expected {expected} to be present")),
        Some(value) => DecodeError::new(format!(
            "expected {expected} but got {}",
            kind_name(value)
        )),
    }
}

pub fn as_object(value: &Value) -> Result<&Object, DecodeError> {
    value
        .as_object()
        .ok_or_else(|| type_error("an object", Some(value)))
}

pub fn as_array(value: &Value) -> Result<&Vec<Value>, DecodeError> {
    value
        .as_array()
        .ok_or_else(|| type_error("an array", Some(value)))
}

/// The value at `key`, which may be `null` but must be present.
pub fn get<'a>(obj: &'a Object, key: &str) -> Result<&'a Value, DecodeError> {
    obj.get(key)
        .ok_or_else(|| DecodeError::at("expected a value to be present", key))
}

pub fn get_str<'a>(obj: &'a Object, key: &str) -> Result<&'a str, DecodeError> {
    match obj.get(key) {
        Some(Value::String(s)) => Ok(s),
        other => Err(type_error("a string", other).prepend(key)),
    }
}

pub fn get_string(obj: &Object, key: &str) -> Result<String, DecodeError> {
    get_str(obj, key).map(str::to_string)
}

pub fn get_i64(obj: &Object, key: &str) -> Result<i64, DecodeError> {
    match obj.get(key) {
        Some(value @ Value::Number(n)) => n
            .as_i64()
            .ok_or_else(|| type_error("an integer", Some(value)).prepend(key)),
        other => Err(type_error("an integer", other).prepend(key)),
    }
}

pub fn get_i32(obj: &Object, key: &str) -> Result<i32, DecodeError> {
    let value = get_i64(obj, key)?;
    i32::try_from(value).map_err(|_| {
        DecodeError::at(
            format!("expected a 32-bit integer but got {value}"),
            key,
        )
    })
}

pub fn get_object<'a>(obj: &'a Object, key: &str) -> Result<&'a Object, DecodeError> {
    match obj.get(key) {
        Some(Value::Object(o)) => Ok(o),
        other => Err(type_error("an object", other).prepend(key)),
    }
}

pub fn get_array<'a>(obj: &'a Object, key: &str) -> Result<&'a Vec<Value>, DecodeError> {
    match obj.get(key) {
        Some(Value::Array(a)) => Ok(a),
        other => Err(type_error("an array", other).prepend(key)),
    }
}

pub fn ensure_strings(arr: &[Value]) -> Result<Vec<String>, DecodeError> {
    arr.iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::String(s) => Ok(s.clone()),
            other => Err(type_error("a string", Some(other)).prepend(i)),
        })
        .collect()
}

pub fn ensure_objects(arr: &[Value]) -> Result<Vec<&Object>, DecodeError> {
    arr.iter()
        .enumerate()
        .map(|(i, item)| as_object(item).at(i))
        .collect()
}

pub fn get_strings(obj: &Object, key: &str) -> Result<Vec<String>, DecodeError> {
    ensure_strings(get_array(obj, key)?).at(key)
}

pub fn get_objects<'a>(obj: &'a Object, key: &str) -> Result<Vec<&'a Object>, DecodeError> {
    ensure_objects(get_array(obj, key)?).at(key)
}

/// Like [`get_strings`], but an absent or `null` field is `None`.
pub fn get_optional_strings(obj: &Object, key: &str) -> Result<Option<Vec<String>>, DecodeError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(_) => get_strings(obj, key).map(Some),
    }
}
