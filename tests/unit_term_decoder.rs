mod support;

use semgus::term::{decode_attribute_value, decode_identifier, decode_sort, decode_term};
use semgus::types::{MatchCase, QuantifierKind};
use semgus::{AttributeValue, BitVector, Identifier, Index, Sort, Term};
use serde_json::json;
use support::{apply, bitvector, variable};

#[test]
fn identifier_accepts_string_array_and_object_forms() {
    assert_eq!(decode_identifier(&json!("x")).expect("bare"), Identifier::new("x"));

    let indexed = Identifier::indexed("BitVec", vec![Index::Int(32)]);
    assert_eq!(decode_identifier(&json!(["BitVec", 32])).expect("array"), indexed);
    assert_eq!(
        decode_identifier(&json!({ "kind": "BitVec", "params": [32] })).expect("object"),
        indexed
    );

    let mixed = decode_identifier(&json!(["extract", 7, "lo"])).expect("mixed indices");
    assert_eq!(mixed.indices, vec![Index::Int(7), Index::Text("lo".into())]);
}

#[test]
fn identifier_rejects_other_shapes() {
    let err = decode_identifier(&json!(3)).expect_err("number is not an identifier");
    assert_eq!(err.path_text(), "<root>");

    let err = decode_identifier(&json!(["f", true])).expect_err("bool index");
    assert_eq!(err.path_text(), "1");

    let err = decode_identifier(&json!([])).expect_err("empty array");
    assert!(err.message.contains("name"));
}

#[test]
fn sort_decodes_parametric_form() {
    let sort = decode_sort(&json!({ "kind": "Array", "params": ["Int", ["BitVec", 8]] }))
        .expect("parametric sort");
    assert_eq!(
        sort,
        Sort::parametric(
            Identifier::new("Array"),
            vec![
                Sort::named("Int"),
                Sort::new(Identifier::indexed("BitVec", vec![Index::Int(8)])),
            ],
        )
    );
    assert_eq!(sort.to_string(), "(Array Int (_ BitVec 8))");
}

#[test]
fn sort_requires_a_params_list() {
    let err = decode_sort(&json!({ "kind": "Seq" })).expect_err("missing params");
    assert!(err.message.contains("missing its parameters"));

    let err = decode_sort(&json!({ "kind": "Seq", "params": "Int" })).expect_err("not a list");
    assert_eq!(err.path_text(), "params");

    let err = decode_sort(&json!({ "kind": "Seq", "params": [] })).expect_err("empty list");
    assert_eq!(err.path_text(), "params");

    let err = decode_sort(&json!({ "kind": "Seq", "params": [true] })).expect_err("bad param");
    assert_eq!(err.path_text(), "params.0");
}

#[test]
fn literals_decode_from_bare_values() {
    assert_eq!(decode_term(&json!(42)).expect("int"), Term::Integer(42));
    assert_eq!(decode_term(&json!(-7)).expect("negative"), Term::Integer(-7));
    assert_eq!(
        decode_term(&json!("hi")).expect("string"),
        Term::String("hi".to_string())
    );
    assert!(decode_term(&json!(1.5)).is_err());
    assert!(decode_term(&json!(true)).is_err());
}

#[test]
fn application_pairs_sorts_with_arguments() {
    let term = decode_term(&apply(
        "+",
        "Int",
        &[("Int", variable("x", "Int")), ("Int", json!(1))],
    ))
    .expect("application");

    let Term::Application {
        function,
        return_sort,
        arguments,
    } = &term
    else {
        panic!("expected an application, got {term:?}");
    };
    assert_eq!(function.name, "+");
    assert_eq!(return_sort, &Sort::named("Int"));
    assert_eq!(arguments.len(), 2);
    assert_eq!(arguments[1].term, Term::Integer(1));
    assert_eq!(term.to_string(), "(+ x 1)");
}

#[test]
fn application_length_mismatch_names_both_lengths() {
    let value = json!({
        "$termType": "application",
        "name": "f",
        "returnSort": "Int",
        "argumentSorts": ["Int"],
        "arguments": [1, 2],
    });
    let err = decode_term(&value).expect_err("mismatch");
    assert!(err.message.contains("1 != 2"), "{}", err.message);
}

#[test]
fn nested_errors_carry_the_full_path() {
    let value = apply(
        "and",
        "Bool",
        &[("Bool", apply("not", "Bool", &[("Bool", json!({ "$termType": "mystery" }))]))],
    );
    let err = decode_term(&value).expect_err("unknown tag");
    assert_eq!(err.path_text(), "arguments.0.arguments.0.$termType");
    assert!(err.message.contains("mystery"));
}

#[test]
fn quantifier_lambda_and_match_decode() {
    let forall = json!({
        "$termType": "forall",
        "bindings": [{ "name": "x", "sort": "Int" }],
        "child": variable("x", "Int"),
    });
    let Term::Quantifier { kind, bindings, .. } = decode_term(&forall).expect("forall") else {
        panic!("expected a quantifier");
    };
    assert_eq!(kind, QuantifierKind::ForAll);
    assert_eq!(bindings[0].name, "x");

    let lambda = json!({ "$termType": "lambda", "arguments": ["a", "b"], "body": 0 });
    assert_eq!(
        decode_term(&lambda).expect("lambda").to_string(),
        "(lambda (a b) 0)"
    );

    let matched = json!({
        "$termType": "match",
        "term": variable("l", "List"),
        "binders": [
            { "operator": "nil", "arguments": [], "child": 0 },
            { "operator": "cons", "arguments": ["h", "t"], "child": variable("h", "Int") },
        ],
    });
    let Term::Match { cases, .. } = decode_term(&matched).expect("match") else {
        panic!("expected a match");
    };
    assert_eq!(
        cases[1],
        MatchCase {
            operator: "cons".into(),
            arguments: vec!["h".into(), "t".into()],
            body: Term::variable("h", Sort::named("Int")),
        }
    );
}

#[test]
fn bitvector_packs_hex_little_endian() {
    let term = decode_term(&bitvector(16, "0x1234")).expect("bitvector");
    let Term::BitVector(bv) = term else {
        panic!("expected a bit vector");
    };
    assert_eq!(bv.width(), 16);
    assert_eq!(bv.bytes(), &[0x34, 0x12]);
    assert_eq!(bv.to_hex(), "0x1234");
}

#[test]
fn bitvector_odd_digit_count_keeps_leading_nibble() {
    let Term::BitVector(bv) = decode_term(&bitvector(12, "0xabc")).expect("odd") else {
        panic!("expected a bit vector");
    };
    assert_eq!(bv.bytes(), &[0xbc, 0x0a]);
    assert_eq!(bv, BitVector::from_u64(12, 0xabc).expect("fits"));
}

#[test]
fn bitvector_rejects_bits_beyond_the_width() {
    let err = decode_term(&bitvector(4, "0x1F")).expect_err("bit 4 is set");
    assert!(err.message.contains("wider than bit vector size 4"), "{}", err.message);

    assert!(decode_term(&bitvector(5, "0x1F")).is_ok());
    assert!(decode_term(&bitvector(4, "0x0F")).is_ok());
}

#[test]
fn bitvector_storage_follows_the_payload_not_the_width() {
    let Term::BitVector(bv) = decode_term(&bitvector(2_147_483_647, "0x1")).expect("wide") else {
        panic!("expected a bit vector");
    };
    assert_eq!(bv.width(), 2_147_483_647);
    assert_eq!(bv.bytes(), &[0x01]);
    assert!(bv.bit(0));
    assert!(!bv.bit(2_147_483_646));
    assert_eq!(bv.to_hex(), "0x01");

    let Term::BitVector(zero) = decode_term(&bitvector(64, "0x0000")).expect("zero") else {
        panic!("expected a bit vector");
    };
    assert!(zero.bytes().is_empty());
    assert_eq!(zero.to_hex(), "0x0");
    assert_eq!(zero, BitVector::zero(64));
}

#[test]
fn bitvector_rejects_bad_sizes_and_prefixes() {
    let err = decode_term(&bitvector(-1, "0x0")).expect_err("negative size");
    assert_eq!(err.path_text(), "size");

    let err = decode_term(&bitvector(1 << 40, "0x0")).expect_err("size beyond 32 bits");
    assert_eq!(err.path_text(), "size");

    let err = decode_term(&bitvector(8, "ff")).expect_err("missing prefix");
    assert_eq!(err.path_text(), "value");

    let err = decode_term(&bitvector(8, "0xzz")).expect_err("bad digit");
    assert_eq!(err.path_text(), "value");
}

#[test]
fn attribute_values_decode_recursively() {
    assert_eq!(
        decode_attribute_value(&json!(null)).expect("unit"),
        AttributeValue::Unit
    );
    assert_eq!(
        decode_attribute_value(&json!(["a", ["b", null]])).expect("list"),
        AttributeValue::List(vec![
            AttributeValue::Text("a".into()),
            AttributeValue::List(vec![AttributeValue::Text("b".into()), AttributeValue::Unit]),
        ])
    );

    let err = decode_attribute_value(&json!(["a", 1])).expect_err("number element");
    assert_eq!(err.path_text(), "1");
}
