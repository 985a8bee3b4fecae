use std::collections::BTreeMap;

use crate::types::{AnnotatedVar, AttributeValue, RelationApp, Sort, Term, TypedVar};

pub const EVENT_FIELD: &str = "$event";

/// The wire-level `$event` discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    SetInfo,
    EndOfStream,
    DeclareFunction,
    DefineFunction,
    DeclareDatatype,
    DefineDatatype,
    CheckSynth,
    DeclareTermType,
    DefineTermType,
    HornClause,
    Constraint,
    SynthFun,
}

impl EventKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "set-info" => Some(Self::SetInfo),
            "end-of-stream" => Some(Self::EndOfStream),
            "declare-function" => Some(Self::DeclareFunction),
            "define-function" => Some(Self::DefineFunction),
            "declare-datatype" => Some(Self::DeclareDatatype),
            "define-datatype" => Some(Self::DefineDatatype),
            "check-synth" => Some(Self::CheckSynth),
            "declare-term-type" => Some(Self::DeclareTermType),
            "define-term-type" => Some(Self::DefineTermType),
            "chc" => Some(Self::HornClause),
            "constraint" => Some(Self::Constraint),
            "synth-fun" => Some(Self::SynthFun),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SetInfo => "set-info",
            Self::EndOfStream => "end-of-stream",
            Self::DeclareFunction => "declare-function",
            Self::DefineFunction => "define-function",
            Self::DeclareDatatype => "declare-datatype",
            Self::DefineDatatype => "define-datatype",
            Self::CheckSynth => "check-synth",
            Self::DeclareTermType => "declare-term-type",
            Self::DefineTermType => "define-term-type",
            Self::HornClause => "chc",
            Self::Constraint => "constraint",
            Self::SynthFun => "synth-fun",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecEvent {
    SetInfo(SetInfoEvent),
    StreamEnd,
    DeclareFunction(DeclareFunctionEvent),
    DefineFunction(DefineFunctionEvent),
    DeclareDatatype(DeclareDatatypeEvent),
    DefineDatatype(DefineDatatypeEvent),
    CheckSynth,
    DeclareTermType(DeclareTermTypeEvent),
    DefineTermType(DefineTermTypeEvent),
    HornClause(HornClauseEvent),
    Constraint(ConstraintEvent),
    SynthFun(SynthFunEvent),
}

impl SpecEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            SpecEvent::SetInfo(_) => EventKind::SetInfo,
            SpecEvent::StreamEnd => EventKind::EndOfStream,
            SpecEvent::DeclareFunction(_) => EventKind::DeclareFunction,
            SpecEvent::DefineFunction(_) => EventKind::DefineFunction,
            SpecEvent::DeclareDatatype(_) => EventKind::DeclareDatatype,
            SpecEvent::DefineDatatype(_) => EventKind::DefineDatatype,
            SpecEvent::CheckSynth => EventKind::CheckSynth,
            SpecEvent::DeclareTermType(_) => EventKind::DeclareTermType,
            SpecEvent::DefineTermType(_) => EventKind::DefineTermType,
            SpecEvent::HornClause(_) => EventKind::HornClause,
            SpecEvent::Constraint(_) => EventKind::Constraint,
            SpecEvent::SynthFun(_) => EventKind::SynthFun,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetInfoEvent {
    pub keyword: String,
    pub value: AttributeValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclareFunctionEvent {
    pub name: String,
    pub return_sort: Sort,
    pub argument_sorts: Vec<Sort>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefineFunctionEvent {
    pub name: String,
    pub return_sort: Sort,
    pub arguments: Vec<TypedVar>,
    pub body: Term,
    pub annotations: BTreeMap<String, AttributeValue>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclareDatatypeEvent {
    pub name: String,
    pub arity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefineDatatypeEvent {
    pub name: String,
    pub constructors: Vec<DatatypeConstructorSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatatypeConstructorSpec {
    pub name: String,
    pub argument_sorts: Vec<Sort>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclareTermTypeEvent {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefineTermTypeEvent {
    pub name: String,
    pub constructors: Vec<TermConstructorSpec>,
}

/// A syntactic constructor of a term type, naming its child term types in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermConstructorSpec {
    pub name: String,
    pub children: Vec<String>,
}

/// The constructor a Horn clause gives semantics to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChcConstructor {
    pub name: String,
    pub arguments: Vec<TypedVar>,
    pub return_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HornClauseEvent {
    pub constructor: ChcConstructor,
    pub head: RelationApp,
    pub body_relations: Vec<RelationApp>,
    pub constraint: Term,
    pub variables: BTreeMap<String, AnnotatedVar>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintEvent {
    pub constraint: Term,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthFunEvent {
    pub name: String,
    pub term_type: String,
    pub grammar: Grammar,
}

/// A regular tree grammar, with non-terminals and their productions in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Grammar {
    pub non_terminals: Vec<GrammarNonTerminal>,
}

impl Grammar {
    pub fn non_terminal(&self, name: &str) -> Option<&GrammarNonTerminal> {
        self.non_terminals.iter().find(|nt| nt.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.non_terminal(name).is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarNonTerminal {
    pub name: String,
    pub term_type: String,
    pub productions: Vec<GrammarProduction>,
}

impl GrammarNonTerminal {
    pub fn production(&self, operator: &str) -> Option<&GrammarProduction> {
        self.productions.iter().find(|p| p.operator == operator)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarProduction {
    pub operator: String,
    pub occurrences: Vec<String>,
}
