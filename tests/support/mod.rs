#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use serde_json::{Value, json};

pub fn fixture_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(relative)
}

pub fn read_fixture(relative: &str) -> String {
    fs::read_to_string(fixture_path(relative)).expect("fixture should be readable")
}

pub fn variable(name: &str, sort: &str) -> Value {
    json!({ "$termType": "variable", "name": name, "sort": sort })
}

/// Application of `name` to `(sort, term)` pairs.
pub fn apply(name: &str, return_sort: &str, args: &[(&str, Value)]) -> Value {
    json!({
        "$termType": "application",
        "name": name,
        "returnSort": return_sort,
        "argumentSorts": args.iter().map(|(sort, _)| *sort).collect::<Vec<_>>(),
        "arguments": args.iter().map(|(_, term)| term.clone()).collect::<Vec<_>>(),
    })
}

pub fn bitvector(size: i64, value: &str) -> Value {
    json!({ "$termType": "bitvector", "size": size, "value": value })
}

pub fn set_info(keyword: &str, value: Value) -> Value {
    json!({ "$event": "set-info", "keyword": keyword, "value": value })
}

pub fn declare_term_type(name: &str) -> Value {
    json!({ "$event": "declare-term-type", "name": name })
}

pub fn define_term_type(name: &str, constructors: &[(&str, &[&str])]) -> Value {
    let constructors = constructors
        .iter()
        .map(|(ctor, children)| json!({ "name": ctor, "children": children }))
        .collect::<Vec<_>>();
    json!({ "$event": "define-term-type", "name": name, "constructors": constructors })
}

pub fn relation(name: &str, args: &[(&str, &str)]) -> Value {
    json!({
        "name": name,
        "signature": args.iter().map(|(_, sort)| *sort).collect::<Vec<_>>(),
        "arguments": args.iter().map(|(arg, _)| *arg).collect::<Vec<_>>(),
    })
}

/// A Horn clause for `constructor` of `term_type` whose child term variables are `children`.
pub fn chc(
    term_type: &str,
    constructor: &str,
    children: &[&str],
    head: Value,
    body: Vec<Value>,
    constraint: Value,
    variables: &[&str],
) -> Value {
    json!({
        "$event": "chc",
        "constructor": {
            "name": constructor,
            "returnSort": term_type,
            "arguments": children,
            "argumentSorts": children.iter().map(|_| term_type).collect::<Vec<_>>(),
        },
        "head": head,
        "bodyRelations": body,
        "constraint": constraint,
        "variables": variables,
    })
}

pub fn constraint(term: Value) -> Value {
    json!({ "$event": "constraint", "constraint": term })
}

pub fn synth_fun(
    name: &str,
    term_type: &str,
    non_terminals: &[(&str, &str)],
    productions: &[(&str, &str, &[&str])],
) -> Value {
    json!({
        "$event": "synth-fun",
        "name": name,
        "termType": term_type,
        "grammar": {
            "nonTerminals": non_terminals
                .iter()
                .map(|(nt, tt)| json!({ "name": nt, "termType": tt }))
                .collect::<Vec<_>>(),
            "productions": productions
                .iter()
                .map(|(instance, op, occurrences)| json!({
                    "instance": instance,
                    "operator": op,
                    "occurrences": occurrences,
                }))
                .collect::<Vec<_>>(),
        },
    })
}

pub fn zero_rule() -> Value {
    let mut event = chc(
        "E",
        "zero",
        &[],
        relation("E.Sem", &[("et", "E"), ("r", "Int")]),
        vec![],
        apply("=", "Bool", &[("Int", variable("r", "Int")), ("Int", json!(0))]),
        &["et", "r"],
    );
    event["inputVariables"] = json!(["et"]);
    event["outputVariables"] = json!(["r"]);
    event
}

pub fn succ_rule() -> Value {
    let plus_one = apply("+", "Int", &[("Int", variable("r1", "Int")), ("Int", json!(1))]);
    let mut event = chc(
        "E",
        "succ",
        &["e1"],
        relation("E.Sem", &[("et", "E"), ("r", "Int")]),
        vec![relation("E.Sem", &[("e1", "E"), ("r1", "Int")])],
        apply("=", "Bool", &[("Int", variable("r", "Int")), ("Int", plus_one)]),
        &["et", "r", "e1", "r1"],
    );
    event["inputVariables"] = json!(["et"]);
    event["outputVariables"] = json!(["r"]);
    event
}

/// Term type `E` with `zero` and `succ(E)`, a grammar `N -> zero | succ N` and one constraint.
pub fn nat_events() -> Vec<Value> {
    vec![
        set_info("logic", json!("LIA")),
        declare_term_type("E"),
        define_term_type("E", &[("zero", &[]), ("succ", &["E"])]),
        zero_rule(),
        succ_rule(),
        synth_fun(
            "f",
            "E",
            &[("N", "E")],
            &[("N", "zero", &[]), ("N", "succ", &["N"])],
        ),
        constraint(apply(
            "=",
            "Bool",
            &[("Int", json!(1)), ("Int", json!(1))],
        )),
        json!({ "$event": "check-synth" }),
        json!({ "$event": "end-of-stream" }),
    ]
}
