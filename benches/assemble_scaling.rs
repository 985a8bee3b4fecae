use std::hint::black_box;
use std::time::Duration;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use semgus::{assemble, parse_events, parse_problem};
use serde_json::{Value, json};

fn bench_term_type_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("assemble/term_type_scaling");
    for term_type_count in [10usize, 40, 160, 640] {
        let documents = build_ring_grammar(term_type_count);
        let events = parse_events(&documents).expect("decode");
        group.bench_with_input(
            BenchmarkId::from_parameter(term_type_count),
            &events,
            |b, events| b.iter(|| assemble(black_box(events.clone())).expect("assemble")),
        );
    }
    group.finish();
}

fn bench_document_decoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_problem/document_size");
    for term_type_count in [10usize, 40, 160] {
        let src = serde_json::to_string(&build_ring_grammar(term_type_count)).expect("serialize");
        group.bench_with_input(
            BenchmarkId::from_parameter(term_type_count),
            &src,
            |b, src| b.iter(|| parse_problem(black_box(src)).expect("parse")),
        );
    }
    group.finish();
}

/// `count` term types `T{i}`, each with a leaf constructor and a step constructor whose child is
/// the next term type, one semantic rule per constructor and one non-terminal per term type.
fn build_ring_grammar(count: usize) -> Vec<Value> {
    let mut documents = Vec::new();
    for i in 0..count {
        documents.push(json!({ "$event": "declare-term-type", "name": format!("T{i}") }));
    }
    for i in 0..count {
        let next = format!("T{}", (i + 1) % count);
        documents.push(json!({
            "$event": "define-term-type",
            "name": format!("T{i}"),
            "constructors": [
                { "name": format!("leaf{i}"), "children": [] },
                { "name": format!("step{i}"), "children": [next] },
            ],
        }));
    }
    for i in 0..count {
        for (ctor, children) in [(format!("leaf{i}"), vec![]), (format!("step{i}"), vec!["c"])] {
            documents.push(json!({
                "$event": "chc",
                "constructor": {
                    "name": ctor,
                    "returnSort": format!("T{i}"),
                    "arguments": children,
                    "argumentSorts": children.iter().map(|_| format!("T{}", (i + 1) % count)).collect::<Vec<_>>(),
                },
                "head": { "name": format!("T{i}.Sem"), "signature": [format!("T{i}"), "Int"], "arguments": ["t", "r"] },
                "bodyRelations": [],
                "constraint": { "$termType": "variable", "name": "r", "sort": "Int" },
                "variables": ["t", "r", "c"],
                "inputVariables": ["t"],
                "outputVariables": ["r"],
            }));
        }
    }

    let non_terminals = (0..count)
        .map(|i| json!({ "name": format!("N{i}"), "termType": format!("T{i}") }))
        .collect::<Vec<_>>();
    let productions = (0..count)
        .flat_map(|i| {
            let next = format!("N{}", (i + 1) % count);
            [
                json!({ "instance": format!("N{i}"), "operator": format!("leaf{i}"), "occurrences": [] }),
                json!({ "instance": format!("N{i}"), "operator": format!("step{i}"), "occurrences": [next] }),
            ]
        })
        .collect::<Vec<_>>();
    documents.push(json!({
        "$event": "synth-fun",
        "name": "f",
        "termType": "T0",
        "grammar": { "nonTerminals": non_terminals, "productions": productions },
    }));
    documents
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .sample_size(20)
        .measurement_time(Duration::from_secs(3));
    targets = bench_term_type_scaling, bench_document_decoding
}
criterion_main!(benches);
