//! The assembled synthesis problem.
//!
//! Non-terminals live in one arena owned by [`SemgusProblem`]; productions refer to their
//! children by [`NonTerminalId`], so the grammar graph may be cyclic without shared ownership.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::types::{AnnotatedVar, AttributeValue, RelationApp, Sort, Term, TypedVar};

/// Position of a non-terminal in [`SemgusProblem::non_terminals`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NonTerminalId(pub(crate) usize);

impl NonTerminalId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A constrained Horn clause giving meaning to one term constructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SemanticRule {
    pub child_term_vars: Vec<TypedVar>,
    pub head: RelationApp,
    pub body_relations: Vec<RelationApp>,
    pub constraint: Term,
    pub variables: BTreeMap<String, AnnotatedVar>,
}

impl SemanticRule {
    pub fn input_variables(&self) -> impl Iterator<Item = &AnnotatedVar> {
        self.variables.values().filter(|v| v.is_input())
    }

    pub fn output_variables(&self) -> impl Iterator<Item = &AnnotatedVar> {
        self.variables.values().filter(|v| v.is_output())
    }
}

impl fmt::Display for SemanticRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} :- ", self.head)?;
        for rel in &self.body_relations {
            write!(f, "{rel} ∧ ")?;
        }
        write!(f, "{}", self.constraint)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SemgusProduction {
    pub operator: String,
    pub child_non_terminals: Vec<NonTerminalId>,
    pub semantic_rules: Vec<SemanticRule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SemgusNonTerminal {
    pub name: String,
    pub term_type: String,
    pub productions: BTreeMap<String, SemgusProduction>,
}

impl fmt::Display for SemgusNonTerminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatatypeConstructor {
    pub name: String,
    pub argument_sorts: Vec<Sort>,
}

impl fmt::Display for DatatypeConstructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.argument_sorts.is_empty() {
            return write!(f, "{}", self.name);
        }
        write!(f, "({}", self.name)?;
        for sort in &self.argument_sorts {
            write!(f, " {sort}")?;
        }
        write!(f, ")")
    }
}

/// An inductive datatype from `define-datatype`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Datatype {
    pub name: String,
    pub constructors: BTreeMap<String, DatatypeConstructor>,
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ctors = self
            .constructors
            .values()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" | ");
        write!(f, "{} {{ {ctors} }}", self.name)
    }
}

/// A function from `define-function`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Function {
    pub name: String,
    pub return_sort: Sort,
    pub arguments: Vec<TypedVar>,
    pub body: Term,
    pub annotations: BTreeMap<String, AttributeValue>,
}

impl Function {
    /// The definition as an anonymous function over the argument names.
    pub fn to_lambda(&self) -> Term {
        Term::Lambda {
            arguments: self.arguments.iter().map(|a| a.name.clone()).collect(),
            body: Box::new(self.body.clone()),
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(define-fun {} (", self.name)?;
        for (i, arg) in self.arguments.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{arg}")?;
        }
        write!(f, ") {} {})", self.return_sort, self.body)
    }
}

/// Auxiliary theory definitions the semantics may refer to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SmtContext {
    pub datatypes: BTreeMap<String, Datatype>,
    pub functions: BTreeMap<String, Function>,
}

impl fmt::Display for SmtContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let datatypes = self.datatypes.keys().cloned().collect::<Vec<_>>().join(", ");
        let functions = self.functions.keys().cloned().collect::<Vec<_>>().join(", ");
        match (datatypes.is_empty(), functions.is_empty()) {
            (true, true) => write!(f, "{{}}"),
            (true, false) => write!(f, "{{;{functions}}}"),
            (false, true) => write!(f, "{{{datatypes};}}"),
            (false, false) => write!(f, "{{{datatypes}; {functions}}}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SemgusProblem {
    target_name: String,
    target: NonTerminalId,
    non_terminals: Vec<SemgusNonTerminal>,
    #[serde(skip)]
    by_term_type: BTreeMap<String, NonTerminalId>,
    constraints: Vec<Term>,
    metadata: BTreeMap<String, AttributeValue>,
    smt_context: SmtContext,
}

impl SemgusProblem {
    /// Every id in `by_term_type`, `target` and the productions indexes `non_terminals`.
    pub(crate) fn from_parts(
        target_name: String,
        target: NonTerminalId,
        non_terminals: Vec<SemgusNonTerminal>,
        by_term_type: BTreeMap<String, NonTerminalId>,
        constraints: Vec<Term>,
        metadata: BTreeMap<String, AttributeValue>,
        smt_context: SmtContext,
    ) -> Self {
        Self {
            target_name,
            target,
            non_terminals,
            by_term_type,
            constraints,
            metadata,
            smt_context,
        }
    }

    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    pub fn target_id(&self) -> NonTerminalId {
        self.target
    }

    pub fn target_non_terminal(&self) -> &SemgusNonTerminal {
        &self.non_terminals[self.target.0]
    }

    /// `None` for an id that belongs to another problem.
    pub fn non_terminal(&self, id: NonTerminalId) -> Option<&SemgusNonTerminal> {
        self.non_terminals.get(id.0)
    }

    pub fn non_terminals(&self) -> &[SemgusNonTerminal] {
        &self.non_terminals
    }

    pub fn non_terminal_for(&self, term_type: &str) -> Option<&SemgusNonTerminal> {
        self.by_term_type
            .get(term_type)
            .and_then(|id| self.non_terminal(*id))
    }

    pub fn children<'a>(
        &'a self,
        production: &'a SemgusProduction,
    ) -> impl Iterator<Item = &'a SemgusNonTerminal> + 'a {
        production
            .child_non_terminals
            .iter()
            .filter_map(|id| self.non_terminal(*id))
    }

    pub fn production_count(&self) -> usize {
        self.non_terminals.iter().map(|nt| nt.productions.len()).sum()
    }

    pub fn constraints(&self) -> &[Term] {
        &self.constraints
    }

    pub fn metadata(&self) -> &BTreeMap<String, AttributeValue> {
        &self.metadata
    }

    pub fn smt_context(&self) -> &SmtContext {
        &self.smt_context
    }
}
