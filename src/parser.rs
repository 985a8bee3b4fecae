use std::collections::BTreeMap;

use tracing::trace;
use serde_json::{Deserializer, Value};

use crate::config::InputMode;
use crate::diagnostics::{DecodeError, DecodeResultExt};
use crate::error::SemgusError;
use crate::event::{
    ChcConstructor, ConstraintEvent, DatatypeConstructorSpec, DeclareDatatypeEvent,
    DeclareFunctionEvent, DeclareTermTypeEvent, DefineDatatypeEvent, DefineFunctionEvent,
    DefineTermTypeEvent, EVENT_FIELD, EventKind, Grammar, GrammarNonTerminal, GrammarProduction,
    HornClauseEvent, SetInfoEvent, SpecEvent, SynthFunEvent, TermConstructorSpec,
};
use crate::json::{self, Object};
use crate::term::{attribute_value_at, sort_at, sorts_at, term_at};
use crate::types::{
    AnnotatedVar, AttributeValue, INPUT_ATTRIBUTE, OUTPUT_ATTRIBUTE, RelationApp, Term, TypedVar,
};

/// Decodes a whole input document. In `Auto` mode a leading `[` selects batch mode (one JSON
/// array of events); anything else is read as a stream of whitespace-separated events.
pub fn parse_document(src: &str, mode: InputMode) -> Result<Vec<SpecEvent>, SemgusError> {
    let batch = match mode {
        InputMode::Batch => true,
        InputMode::Stream => false,
        InputMode::Auto => src.trim_start().starts_with('['),
    };
    if batch {
        let value: Value = serde_json::from_str(src)?;
        return Ok(parse_event_array(&value)?);
    }

    let mut documents = Vec::new();
    for document in Deserializer::from_str(src).into_iter::<Value>() {
        let document = document?;
        trace!("read stream document {}", documents.len());
        documents.push(document);
    }
    Ok(parse_events(&documents)?)
}

/// Decodes a single event from its JSON text.
pub fn parse_event_str(src: &str) -> Result<SpecEvent, SemgusError> {
    let value: Value = serde_json::from_str(src)?;
    Ok(parse_event(&value)?)
}

pub fn parse_event_array(value: &Value) -> Result<Vec<SpecEvent>, DecodeError> {
    let Value::Array(documents) = value else {
        return Err(DecodeError::new(format!(
            "event array must be a JSON array, got {}",
            json::kind_name(value)
        )));
    };
    parse_events(documents)
}

/// Decodes documents in order, stopping at the first one that fails.
pub fn parse_events(documents: &[Value]) -> Result<Vec<SpecEvent>, DecodeError> {
    documents
        .iter()
        .enumerate()
        .map(|(i, document)| parse_event(document).at(i))
        .collect()
}

pub fn parse_event(value: &Value) -> Result<SpecEvent, DecodeError> {
    let obj = json::as_object(value)?;
    let raw = json::get_str(obj, EVENT_FIELD)?;
    let Some(kind) = EventKind::parse(raw) else {
        return Err(DecodeError::at(
            format!("unknown specification event \"{raw}\""),
            EVENT_FIELD,
        ));
    };

    match kind {
        EventKind::SetInfo => parse_set_info(obj),
        EventKind::EndOfStream => Ok(SpecEvent::StreamEnd),
        EventKind::DeclareFunction => parse_declare_function(obj),
        EventKind::DefineFunction => parse_define_function(obj),
        EventKind::DeclareDatatype => parse_declare_datatype(obj),
        EventKind::DefineDatatype => parse_define_datatype(obj),
        EventKind::CheckSynth => Ok(SpecEvent::CheckSynth),
        EventKind::DeclareTermType => Ok(SpecEvent::DeclareTermType(DeclareTermTypeEvent {
            name: json::get_string(obj, "name")?,
        })),
        EventKind::DefineTermType => parse_define_term_type(obj),
        EventKind::HornClause => parse_horn_clause(obj),
        EventKind::Constraint => Ok(SpecEvent::Constraint(ConstraintEvent {
            constraint: term_at(obj, "constraint")?,
        })),
        EventKind::SynthFun => parse_synth_fun(obj),
    }
}

fn parse_set_info(obj: &Object) -> Result<SpecEvent, DecodeError> {
    Ok(SpecEvent::SetInfo(SetInfoEvent {
        keyword: json::get_string(obj, "keyword")?,
        value: attribute_value_at(obj, "value")?,
    }))
}

fn parse_declare_function(obj: &Object) -> Result<SpecEvent, DecodeError> {
    let name = json::get_string(obj, "name")?;
    let rank = json::get_object(obj, "rank")?;
    let return_sort = sort_at(rank, "returnSort").at("rank")?;
    let argument_sorts = sorts_at(rank, "argumentSorts").at("rank")?;
    Ok(SpecEvent::DeclareFunction(DeclareFunctionEvent {
        name,
        return_sort,
        argument_sorts,
    }))
}

fn parse_define_function(obj: &Object) -> Result<SpecEvent, DecodeError> {
    let name = json::get_string(obj, "name")?;
    let rank = json::get_object(obj, "rank")?;
    let return_sort = sort_at(rank, "returnSort").at("rank")?;
    let argument_sorts = sorts_at(rank, "argumentSorts").at("rank")?;

    let definition = json::get_object(obj, "definition")?;
    let (argument_names, body, annotations) = parse_definition(definition).at("definition")?;
    if argument_names.len() != argument_sorts.len() {
        return Err(DecodeError::at(
            format!(
                "argument sorts and arguments of function definition have different lengths {} != {}",
                argument_sorts.len(),
                argument_names.len()
            ),
            "definition",
        ));
    }

    Ok(SpecEvent::DefineFunction(DefineFunctionEvent {
        name,
        return_sort,
        arguments: TypedVar::zip(argument_names, argument_sorts),
        body,
        annotations,
    }))
}

type Definition = (Vec<String>, Term, BTreeMap<String, AttributeValue>);

fn parse_definition(obj: &Object) -> Result<Definition, DecodeError> {
    let arguments = json::get_strings(obj, "arguments")?;
    let body = term_at(obj, "body")?;

    let mut annotations = BTreeMap::new();
    if let Some(raw) = obj.get("annotations").filter(|v| !v.is_null()) {
        let entries = json::as_array(raw)
            .and_then(|arr| json::ensure_objects(arr))
            .at("annotations")?;
        for (i, entry) in entries.into_iter().enumerate() {
            let (keyword, value) = parse_annotation(entry).at(i).at("annotations")?;
            if annotations.insert(keyword.clone(), value).is_some() {
                return Err(DecodeError::at(
                    format!("duplicate annotation \"{keyword}\""),
                    "keyword",
                )
                .prepend(i)
                .prepend("annotations"));
            }
        }
    }

    Ok((arguments, body, annotations))
}

fn parse_annotation(obj: &Object) -> Result<(String, AttributeValue), DecodeError> {
    Ok((
        json::get_string(obj, "keyword")?,
        attribute_value_at(obj, "value")?,
    ))
}

fn parse_declare_datatype(obj: &Object) -> Result<SpecEvent, DecodeError> {
    let name = json::get_string(obj, "name")?;
    let arity = match obj.get("arity") {
        None | Some(Value::Null) => 0,
        Some(_) => {
            let raw = json::get_i32(obj, "arity")?;
            u32::try_from(raw)
                .map_err(|_| DecodeError::at("datatype arity must be non-negative", "arity"))?
        }
    };
    Ok(SpecEvent::DeclareDatatype(DeclareDatatypeEvent { name, arity }))
}

fn parse_define_datatype(obj: &Object) -> Result<SpecEvent, DecodeError> {
    let name = json::get_string(obj, "name")?;
    let constructors = json::get_objects(obj, "constructors")?
        .into_iter()
        .enumerate()
        .map(|(i, ctor)| parse_datatype_constructor(ctor).at(i).at("constructors"))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(SpecEvent::DefineDatatype(DefineDatatypeEvent {
        name,
        constructors,
    }))
}

fn parse_datatype_constructor(obj: &Object) -> Result<DatatypeConstructorSpec, DecodeError> {
    Ok(DatatypeConstructorSpec {
        name: json::get_string(obj, "name")?,
        argument_sorts: sorts_at(obj, "children")?,
    })
}

fn parse_define_term_type(obj: &Object) -> Result<SpecEvent, DecodeError> {
    let name = json::get_string(obj, "name")?;
    let constructors = json::get_objects(obj, "constructors")?
        .into_iter()
        .enumerate()
        .map(|(i, ctor)| parse_term_constructor(ctor).at(i).at("constructors"))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(SpecEvent::DefineTermType(DefineTermTypeEvent {
        name,
        constructors,
    }))
}

fn parse_term_constructor(obj: &Object) -> Result<TermConstructorSpec, DecodeError> {
    Ok(TermConstructorSpec {
        name: json::get_string(obj, "name")?,
        children: json::get_strings(obj, "children")?,
    })
}

fn parse_relation_app(obj: &Object) -> Result<RelationApp, DecodeError> {
    let name = json::get_string(obj, "name")?;
    let signature = json::get_array(obj, "signature")?;
    let arguments = json::get_strings(obj, "arguments")?;
    if signature.len() != arguments.len() {
        return Err(DecodeError::new(format!(
            "signature and arguments of relation application have different lengths {} != {}",
            signature.len(),
            arguments.len()
        )));
    }
    let sorts = sorts_at(obj, "signature")?;
    Ok(RelationApp {
        name,
        arguments: TypedVar::zip(arguments, sorts),
    })
}

fn parse_chc_constructor(obj: &Object) -> Result<ChcConstructor, DecodeError> {
    let name = json::get_string(obj, "name")?;
    let return_type = json::get_string(obj, "returnSort")?;
    let arguments = json::get_strings(obj, "arguments")?;
    let argument_sorts = sorts_at(obj, "argumentSorts")?;
    if arguments.len() != argument_sorts.len() {
        return Err(DecodeError::new(format!(
            "argument sorts and arguments of CHC constructor have different lengths {} != {}",
            argument_sorts.len(),
            arguments.len()
        )));
    }
    Ok(ChcConstructor {
        name,
        arguments: TypedVar::zip(arguments, argument_sorts),
        return_type,
    })
}

fn parse_horn_clause(obj: &Object) -> Result<SpecEvent, DecodeError> {
    let constructor = parse_chc_constructor(json::get_object(obj, "constructor")?).at("constructor")?;
    let head = parse_relation_app(json::get_object(obj, "head")?).at("head")?;
    let body_relations = json::get_objects(obj, "bodyRelations")?
        .into_iter()
        .enumerate()
        .map(|(i, rel)| parse_relation_app(rel).at(i).at("bodyRelations"))
        .collect::<Result<Vec<_>, _>>()?;
    let constraint = term_at(obj, "constraint")?;

    let mut variables: BTreeMap<String, AnnotatedVar> = BTreeMap::new();
    for (i, name) in json::get_strings(obj, "variables")?.into_iter().enumerate() {
        if variables.contains_key(&name) {
            return Err(DecodeError::at(format!("duplicate variable \"{name}\""), i)
                .prepend("variables"));
        }
        variables.insert(name.clone(), AnnotatedVar::new(name));
    }
    mark_variables(obj, "inputVariables", INPUT_ATTRIBUTE, &mut variables)?;
    mark_variables(obj, "outputVariables", OUTPUT_ATTRIBUTE, &mut variables)?;

    Ok(SpecEvent::HornClause(HornClauseEvent {
        constructor,
        head,
        body_relations,
        constraint,
        variables,
    }))
}

/// Tags each variable listed under `key` with a unit-valued `attribute`.
fn mark_variables(
    obj: &Object,
    key: &str,
    attribute: &str,
    variables: &mut BTreeMap<String, AnnotatedVar>,
) -> Result<(), DecodeError> {
    let Some(names) = json::get_optional_strings(obj, key)? else {
        return Ok(());
    };
    for (i, name) in names.iter().enumerate() {
        let Some(variable) = variables.get_mut(name) else {
            return Err(DecodeError::at(
                format!("unknown variable \"{name}\" declared as {attribute}"),
                i,
            )
            .prepend(key));
        };
        variable
            .attributes
            .insert(attribute.to_string(), AttributeValue::Unit);
    }
    Ok(())
}

fn parse_synth_fun(obj: &Object) -> Result<SpecEvent, DecodeError> {
    let name = json::get_string(obj, "name")?;
    let term_type = json::get_string(obj, "termType")?;
    let grammar = parse_grammar(json::get_object(obj, "grammar")?).at("grammar")?;
    Ok(SpecEvent::SynthFun(SynthFunEvent {
        name,
        term_type,
        grammar,
    }))
}

fn parse_grammar(obj: &Object) -> Result<Grammar, DecodeError> {
    let non_terminal_objs = json::get_objects(obj, "nonTerminals")?;
    let production_objs = json::get_objects(obj, "productions")?;

    let mut grammar = Grammar::default();
    for (i, nt) in non_terminal_objs.into_iter().enumerate() {
        let non_terminal = parse_non_terminal(nt, &grammar).at(i).at("nonTerminals")?;
        grammar.non_terminals.push(non_terminal);
    }

    for (i, prod) in production_objs.into_iter().enumerate() {
        let (owner, production) = parse_production(prod, &grammar).at(i).at("productions")?;
        grammar.non_terminals[owner].productions.push(production);
    }

    Ok(grammar)
}

fn parse_non_terminal(obj: &Object, grammar: &Grammar) -> Result<GrammarNonTerminal, DecodeError> {
    let name = json::get_string(obj, "name")?;
    if grammar.contains(&name) {
        return Err(DecodeError::at(
            format!("duplicate nonterminal declaration \"{name}\""),
            "name",
        ));
    }
    Ok(GrammarNonTerminal {
        name,
        term_type: json::get_string(obj, "termType")?,
        productions: Vec::new(),
    })
}

/// Returns the position of the owning non-terminal together with the production.
fn parse_production(
    obj: &Object,
    grammar: &Grammar,
) -> Result<(usize, GrammarProduction), DecodeError> {
    let instance = json::get_string(obj, "instance")?;
    let operator = json::get_string(obj, "operator")?;
    let occurrences = json::get_strings(obj, "occurrences")?;

    let Some(owner) = grammar
        .non_terminals
        .iter()
        .position(|nt| nt.name == instance)
    else {
        return Err(DecodeError::at(
            format!("unknown nonterminal \"{instance}\" referenced in production"),
            "instance",
        ));
    };
    if grammar.non_terminals[owner].production(&operator).is_some() {
        return Err(DecodeError::at(
            format!("duplicate production \"{operator}\" for nonterminal \"{instance}\""),
            "operator",
        ));
    }
    for (j, occurrence) in occurrences.iter().enumerate() {
        if !grammar.contains(occurrence) {
            return Err(DecodeError::at(
                format!("unknown nonterminal \"{occurrence}\" referenced in production child"),
                j,
            )
            .prepend("occurrences"));
        }
    }

    Ok((owner, GrammarProduction {
        operator,
        occurrences,
    }))
}
