//! Decoding of the embedded SMT term language: identifiers, sorts, terms and attribute values.

use serde_json::Value;

use crate::diagnostics::{DecodeError, DecodeResultExt};
use crate::json::{self, Object};
use crate::types::{
    AttributeValue, BitVector, Identifier, Index, MatchCase, QuantifierKind, Sort, Term, TypedTerm,
    TypedVar,
};

pub const TERM_TYPE_FIELD: &str = "$termType";

pub fn decode_index(value: &Value) -> Result<Index, DecodeError> {
    match value {
        Value::String(s) => Ok(Index::Text(s.clone())),
        Value::Number(n) => n.as_i64().map(Index::Int).ok_or_else(|| {
            DecodeError::new(format!("identifier index {n} is not a 64-bit integer"))
        }),
        _ => Err(DecodeError::new(
            "identifier index must either be a string or integer constant",
        )),
    }
}

/// `"name"`, `["name", index...]` or `{"kind": "name", "params": [index...]}`.
pub fn decode_identifier(value: &Value) -> Result<Identifier, DecodeError> {
    match value {
        Value::String(name) => Ok(Identifier::new(name.clone())),
        Value::Array(items) => {
            let Some(first) = items.first() else {
                return Err(DecodeError::new("identifier must include a name"));
            };
            let Value::String(name) = first else {
                return Err(DecodeError::at("identifier name must be a string", 0usize));
            };
            let indices = items
                .iter()
                .enumerate()
                .skip(1)
                .map(|(i, item)| decode_index(item).at(i))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Identifier::indexed(name.clone(), indices))
        }
        Value::Object(obj) => {
            let name = json::get_string(obj, "kind")?;
            let indices = json::get_array(obj, "params")?
                .iter()
                .enumerate()
                .map(|(i, item)| decode_index(item).at(i).at("params"))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Identifier::indexed(name, indices))
        }
        other => Err(DecodeError::new(format!(
            "identifier must be a string, an array or an object, got {}",
            json::kind_name(other)
        ))),
    }
}

pub fn identifier_at(obj: &Object, key: &str) -> Result<Identifier, DecodeError> {
    decode_identifier(json::get(obj, key)?).at(key)
}

/// An identifier, or `{"kind": identifier, "params": [sort...]}` for a parametric sort.
///
/// An object whose params are all numbers is the parameter-style encoding of an indexed
/// identifier (`{"kind": "BitVec", "params": [32]}`) rather than a parametric sort.
pub fn decode_sort(value: &Value) -> Result<Sort, DecodeError> {
    let Value::Object(obj) = value else {
        return decode_identifier(value).map(Sort::new);
    };
    let kind = json::get(obj, "kind")?;
    let params = match obj.get("params") {
        None => {
            return Err(DecodeError::new(
                "parametric sort is missing its parameters",
            ));
        }
        Some(Value::Array(params)) => params,
        Some(_) => {
            return Err(DecodeError::at(
                "parametric sort parameters must be specified as a list",
                "params",
            ));
        }
    };
    if params.is_empty() {
        return Err(DecodeError::at(
            "parametric sort must have at least one parameter",
            "params",
        ));
    }
    if params.iter().all(Value::is_number) {
        return decode_identifier(value).map(Sort::new);
    }
    let identifier = decode_identifier(kind).at("kind")?;
    let params = decode_sorts(params).at("params")?;
    Ok(Sort::parametric(identifier, params))
}

pub fn decode_sorts(items: &[Value]) -> Result<Vec<Sort>, DecodeError> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| decode_sort(item).at(i))
        .collect()
}

pub fn sort_at(obj: &Object, key: &str) -> Result<Sort, DecodeError> {
    decode_sort(json::get(obj, key)?).at(key)
}

pub fn sorts_at(obj: &Object, key: &str) -> Result<Vec<Sort>, DecodeError> {
    decode_sorts(json::get_array(obj, key)?).at(key)
}

pub fn decode_attribute_value(value: &Value) -> Result<AttributeValue, DecodeError> {
    match value {
        Value::Null => Ok(AttributeValue::Unit),
        Value::String(s) => Ok(AttributeValue::Text(s.clone())),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| decode_attribute_value(item).at(i))
            .collect::<Result<Vec<_>, _>>()
            .map(AttributeValue::List),
        other => Err(DecodeError::new(format!(
            "could not decode attribute value from {}",
            json::kind_name(other)
        ))),
    }
}

pub fn attribute_value_at(obj: &Object, key: &str) -> Result<AttributeValue, DecodeError> {
    decode_attribute_value(json::get(obj, key)?).at(key)
}

pub fn decode_term(value: &Value) -> Result<Term, DecodeError> {
    match value {
        Value::Number(n) => n.as_i64().map(Term::Integer).ok_or_else(|| {
            DecodeError::new(format!("numeric constant {n} is not a 64-bit integer"))
        }),
        Value::String(s) => Ok(Term::String(s.clone())),
        Value::Object(obj) => {
            let tag = json::get_str(obj, TERM_TYPE_FIELD)?;
            match tag {
                "application" => decode_application(obj),
                "exists" => decode_quantifier(obj, QuantifierKind::Exists),
                "forall" => decode_quantifier(obj, QuantifierKind::ForAll),
                "lambda" => decode_lambda(obj),
                "match" => decode_match(obj),
                "variable" => decode_variable(obj),
                "bitvector" => decode_bitvector(obj).map(Term::BitVector),
                _ => Err(DecodeError::at(
                    format!("unknown term type \"{tag}\""),
                    TERM_TYPE_FIELD,
                )),
            }
        }
        other => Err(DecodeError::new(format!(
            "could not decode SMT term from {}",
            json::kind_name(other)
        ))),
    }
}

pub fn term_at(obj: &Object, key: &str) -> Result<Term, DecodeError> {
    decode_term(json::get(obj, key)?).at(key)
}

fn decode_application(obj: &Object) -> Result<Term, DecodeError> {
    let function = identifier_at(obj, "name")?;
    let return_sort = sort_at(obj, "returnSort")?;

    let arg_sorts = json::get_array(obj, "argumentSorts")?;
    let args = json::get_array(obj, "arguments")?;
    if arg_sorts.len() != args.len() {
        return Err(DecodeError::new(format!(
            "argument sorts and arguments of SMT function application have different lengths {} != {}",
            arg_sorts.len(),
            args.len()
        )));
    }

    let mut arguments = Vec::with_capacity(args.len());
    for (i, (sort, term)) in arg_sorts.iter().zip(args).enumerate() {
        let sort = decode_sort(sort).at(i).at("argumentSorts")?;
        let term = decode_term(term).at(i).at("arguments")?;
        arguments.push(TypedTerm { sort, term });
    }

    Ok(Term::apply(function, return_sort, arguments))
}

fn decode_binding(obj: &Object) -> Result<TypedVar, DecodeError> {
    let name = json::get_string(obj, "name")?;
    let sort = sort_at(obj, "sort")?;
    Ok(TypedVar::new(name, sort))
}

fn decode_quantifier(obj: &Object, kind: QuantifierKind) -> Result<Term, DecodeError> {
    let bindings = json::get_objects(obj, "bindings")?
        .into_iter()
        .enumerate()
        .map(|(i, binding)| decode_binding(binding).at(i).at("bindings"))
        .collect::<Result<Vec<_>, _>>()?;
    let body = term_at(obj, "child")?;
    Ok(Term::Quantifier {
        kind,
        bindings,
        body: Box::new(body),
    })
}

fn decode_lambda(obj: &Object) -> Result<Term, DecodeError> {
    let arguments = json::get_strings(obj, "arguments")?;
    let body = term_at(obj, "body")?;
    Ok(Term::Lambda {
        arguments,
        body: Box::new(body),
    })
}

fn decode_match_case(obj: &Object) -> Result<MatchCase, DecodeError> {
    Ok(MatchCase {
        operator: json::get_string(obj, "operator")?,
        arguments: json::get_strings(obj, "arguments")?,
        body: term_at(obj, "child")?,
    })
}

fn decode_match(obj: &Object) -> Result<Term, DecodeError> {
    let scrutinee = term_at(obj, "term")?;
    let cases = json::get_objects(obj, "binders")?
        .into_iter()
        .enumerate()
        .map(|(i, binder)| decode_match_case(binder).at(i).at("binders"))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Term::Match {
        scrutinee: Box::new(scrutinee),
        cases,
    })
}

fn decode_variable(obj: &Object) -> Result<Term, DecodeError> {
    let name = json::get_string(obj, "name")?;
    let sort = sort_at(obj, "sort")?;
    Ok(Term::variable(name, sort))
}

/// `{"size": n, "value": "0x..."}`. The hex digits are packed least-significant byte first;
/// with an odd digit count the leading digit forms the top byte on its own.
pub fn decode_bitvector(obj: &Object) -> Result<BitVector, DecodeError> {
    let size = json::get_i32(obj, "size")?;
    let Ok(width) = u32::try_from(size) else {
        return Err(DecodeError::at(
            "bit vector size must be non-negative",
            "size",
        ));
    };

    let text = json::get_str(obj, "value")?;
    let bytes = unpack_hex(text).at("value")?;
    BitVector::from_le_bytes(width, &bytes).ok_or_else(|| {
        DecodeError::new(format!(
            "bit vector value {text} is wider than bit vector size {width}"
        ))
    })
}

fn unpack_hex(text: &str) -> Result<Vec<u8>, DecodeError> {
    if !text.starts_with("0x") {
        return Err(DecodeError::new("bit vector value must start with \"0x\""));
    }
    if let Some(bad) = text.chars().find(|c| !c.is_ascii()) {
        return Err(DecodeError::new(format!(
            "not a valid hexadecimal character: {bad}"
        )));
    }

    let digits = text.as_bytes();
    let len = digits.len();
    let paired = len / 2 - 1;
    let mut bytes = vec![0u8; paired + len % 2];
    if len % 2 == 1 {
        bytes[paired] = hex_value(digits[2])?;
    }
    for (i, byte) in bytes.iter_mut().enumerate().take(paired) {
        let low = hex_value(digits[len - i * 2 - 1])?;
        let high = hex_value(digits[len - i * 2 - 2])?;
        *byte = low | (high << 4);
    }
    Ok(bytes)
}

fn hex_value(digit: u8) -> Result<u8, DecodeError> {
    (digit as char)
        .to_digit(16)
        .map(|v| v as u8)
        .ok_or_else(|| {
            DecodeError::new(format!(
                "not a valid hexadecimal character: {}",
                digit as char
            ))
        })
}
