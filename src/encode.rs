//! Canonical wire encoding of identifiers, sorts, terms and attribute values. Decoding the
//! output with [`crate::term`] yields a structurally equal value.

use serde_json::{Value, json};

use crate::term::TERM_TYPE_FIELD;
use crate::types::{AttributeValue, BitVector, Identifier, Index, Sort, Term, TypedVar};

pub fn encode_index(index: &Index) -> Value {
    match index {
        Index::Int(i) => json!(i),
        Index::Text(s) => json!(s),
    }
}

/// A bare string for plain identifiers, `[name, index...]` for indexed ones.
pub fn encode_identifier(identifier: &Identifier) -> Value {
    if !identifier.is_indexed() {
        return Value::String(identifier.name.clone());
    }
    let mut items = vec![Value::String(identifier.name.clone())];
    items.extend(identifier.indices.iter().map(encode_index));
    Value::Array(items)
}

pub fn encode_sort(sort: &Sort) -> Value {
    if !sort.is_parametric() {
        return encode_identifier(&sort.identifier);
    }
    json!({
        "kind": encode_identifier(&sort.identifier),
        "params": sort.params.iter().map(encode_sort).collect::<Vec<_>>(),
    })
}

pub fn encode_bitvector(bv: &BitVector) -> Value {
    json!({
        TERM_TYPE_FIELD: "bitvector",
        "size": bv.width(),
        "value": bv.to_hex(),
    })
}

fn encode_binding(var: &TypedVar) -> Value {
    json!({ "name": var.name, "sort": encode_sort(&var.sort) })
}

pub fn encode_term(term: &Term) -> Value {
    match term {
        Term::Application {
            function,
            return_sort,
            arguments,
        } => json!({
            TERM_TYPE_FIELD: "application",
            "name": encode_identifier(function),
            "returnSort": encode_sort(return_sort),
            "argumentSorts": arguments.iter().map(|a| encode_sort(&a.sort)).collect::<Vec<_>>(),
            "arguments": arguments.iter().map(|a| encode_term(&a.term)).collect::<Vec<_>>(),
        }),
        Term::Quantifier {
            kind,
            bindings,
            body,
        } => json!({
            TERM_TYPE_FIELD: kind.as_str(),
            "bindings": bindings.iter().map(encode_binding).collect::<Vec<_>>(),
            "child": encode_term(body),
        }),
        Term::Lambda { arguments, body } => json!({
            TERM_TYPE_FIELD: "lambda",
            "arguments": arguments,
            "body": encode_term(body),
        }),
        Term::Match { scrutinee, cases } => json!({
            TERM_TYPE_FIELD: "match",
            "term": encode_term(scrutinee),
            "binders": cases
                .iter()
                .map(|case| json!({
                    "operator": case.operator,
                    "arguments": case.arguments,
                    "child": encode_term(&case.body),
                }))
                .collect::<Vec<_>>(),
        }),
        Term::Variable { name, sort } => json!({
            TERM_TYPE_FIELD: "variable",
            "name": name,
            "sort": encode_sort(sort),
        }),
        Term::String(value) => Value::String(value.clone()),
        Term::Integer(value) => json!(value),
        Term::BitVector(bv) => encode_bitvector(bv),
    }
}

pub fn encode_attribute_value(value: &AttributeValue) -> Value {
    match value {
        AttributeValue::Unit => Value::Null,
        AttributeValue::Text(s) => Value::String(s.clone()),
        AttributeValue::List(items) => {
            Value::Array(items.iter().map(encode_attribute_value).collect())
        }
    }
}
