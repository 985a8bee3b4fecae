use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use tracing::{debug, warn};
use serde_json::Value;

use crate::config::InputMode;
use crate::error::{AssembleError, SemgusError};
use crate::event::{
    DefineDatatypeEvent, DefineFunctionEvent, DefineTermTypeEvent, HornClauseEvent, SpecEvent,
    SynthFunEvent,
};
use crate::parser::{parse_document, parse_event_array};
use crate::problem::{
    Datatype, DatatypeConstructor, Function, NonTerminalId, SemanticRule, SemgusNonTerminal,
    SemgusProblem, SemgusProduction, SmtContext,
};
use crate::types::{AttributeValue, Term};

#[derive(Debug, Default)]
struct TermType {
    constructors: BTreeMap<String, TermConstructor>,
}

#[derive(Debug)]
struct TermConstructor {
    children: Vec<String>,
    rules: Vec<SemanticRule>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblerState {
    Collecting,
    /// A consumed event was rejected; every later call fails with [`AssembleError::Poisoned`].
    Failed,
}

/// Collects events into the tables a [`SemgusProblem`] is built from.
///
/// Each run owns a fresh assembler. [`ProblemAssembler::end`] consumes it, so a finished run
/// cannot be fed more events.
#[derive(Debug)]
pub struct ProblemAssembler {
    state: AssemblerState,
    metadata: BTreeMap<String, AttributeValue>,
    datatypes: BTreeMap<String, Datatype>,
    functions: BTreeMap<String, Function>,
    term_types: BTreeMap<String, TermType>,
    constraints: Vec<Term>,
    synth_fun: Option<SynthFunEvent>,
}

impl Default for ProblemAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl ProblemAssembler {
    pub fn new() -> Self {
        Self {
            state: AssemblerState::Collecting,
            metadata: BTreeMap::new(),
            datatypes: BTreeMap::new(),
            functions: BTreeMap::new(),
            term_types: BTreeMap::new(),
            constraints: Vec::new(),
            synth_fun: None,
        }
    }

    pub fn state(&self) -> AssemblerState {
        self.state
    }

    pub fn consume(&mut self, event: SpecEvent) -> Result<(), AssembleError> {
        if self.state == AssemblerState::Failed {
            return Err(AssembleError::Poisoned);
        }
        debug!("consuming {} event", event.kind().as_str());
        let result = self.apply(event);
        if result.is_err() {
            self.state = AssemblerState::Failed;
        }
        result
    }

    fn apply(&mut self, event: SpecEvent) -> Result<(), AssembleError> {
        match event {
            SpecEvent::SetInfo(info) => {
                self.metadata.insert(info.keyword, info.value);
                Ok(())
            }
            SpecEvent::DefineFunction(def) => {
                self.define_function(def);
                Ok(())
            }
            SpecEvent::DefineDatatype(def) => {
                self.define_datatype(def);
                Ok(())
            }
            SpecEvent::DeclareTermType(decl) => match self.term_types.entry(decl.name) {
                Entry::Occupied(entry) => {
                    Err(AssembleError::DuplicateTermType(entry.key().clone()))
                }
                Entry::Vacant(entry) => {
                    entry.insert(TermType::default());
                    Ok(())
                }
            },
            SpecEvent::DefineTermType(def) => self.define_term_type(def),
            SpecEvent::HornClause(chc) => self.add_semantic_rule(chc),
            SpecEvent::Constraint(c) => {
                self.constraints.push(c.constraint);
                Ok(())
            }
            SpecEvent::SynthFun(synth) => {
                if self.synth_fun.is_some() {
                    return Err(AssembleError::DuplicateSynthFun(synth.name));
                }
                self.synth_fun = Some(synth);
                Ok(())
            }
            SpecEvent::StreamEnd
            | SpecEvent::CheckSynth
            | SpecEvent::DeclareFunction(_)
            | SpecEvent::DeclareDatatype(_) => Ok(()),
        }
    }

    fn define_function(&mut self, def: DefineFunctionEvent) {
        let function = Function {
            name: def.name.clone(),
            return_sort: def.return_sort,
            arguments: def.arguments,
            body: def.body,
            annotations: def.annotations,
        };
        self.functions.insert(def.name, function);
    }

    fn define_datatype(&mut self, def: DefineDatatypeEvent) {
        let constructors = def
            .constructors
            .into_iter()
            .map(|c| {
                (
                    c.name.clone(),
                    DatatypeConstructor {
                        name: c.name,
                        argument_sorts: c.argument_sorts,
                    },
                )
            })
            .collect();
        let datatype = Datatype {
            name: def.name.clone(),
            constructors,
        };
        self.datatypes.insert(def.name, datatype);
    }

    fn define_term_type(&mut self, def: DefineTermTypeEvent) -> Result<(), AssembleError> {
        if !self.term_types.contains_key(&def.name) {
            return Err(AssembleError::UndeclaredTermType(def.name));
        }
        for ctor in def.constructors {
            let duplicate = self
                .term_types
                .get(&def.name)
                .is_some_and(|tt| tt.constructors.contains_key(&ctor.name));
            if duplicate {
                return Err(AssembleError::DuplicateConstructor {
                    term_type: def.name,
                    constructor: ctor.name,
                });
            }
            if let Some(child) = ctor
                .children
                .iter()
                .find(|child| !self.term_types.contains_key(child.as_str()))
            {
                return Err(AssembleError::UndeclaredChildTermType {
                    constructor: ctor.name.clone(),
                    child: child.clone(),
                });
            }
            if let Some(term_type) = self.term_types.get_mut(&def.name) {
                term_type.constructors.insert(
                    ctor.name,
                    TermConstructor {
                        children: ctor.children,
                        rules: Vec::new(),
                    },
                );
            }
        }
        Ok(())
    }

    // Rules are not checked against the constructor's children or the relation signatures.
    fn add_semantic_rule(&mut self, chc: HornClauseEvent) -> Result<(), AssembleError> {
        let term_type_name = chc.constructor.return_type;
        let Some(term_type) = self.term_types.get_mut(&term_type_name) else {
            return Err(AssembleError::UnknownTermType(term_type_name));
        };
        let Some(ctor) = term_type.constructors.get_mut(&chc.constructor.name) else {
            return Err(AssembleError::UnknownConstructor {
                term_type: term_type_name,
                constructor: chc.constructor.name,
            });
        };
        ctor.rules.push(SemanticRule {
            child_term_vars: chc.constructor.arguments,
            head: chc.head,
            body_relations: chc.body_relations,
            constraint: chc.constraint,
            variables: chc.variables,
        });
        Ok(())
    }

    /// Resolves the grammar against the collected term types and builds the problem.
    ///
    /// Non-terminals are created first, one per term type, so that productions can refer to
    /// any of them by id in the second pass.
    pub fn end(self) -> Result<SemgusProblem, AssembleError> {
        if self.state == AssemblerState::Failed {
            return Err(AssembleError::Poisoned);
        }
        let Some(synth) = self.synth_fun else {
            return Err(AssembleError::MissingSynthFun);
        };

        let mut non_terminals: Vec<SemgusNonTerminal> = Vec::new();
        let mut by_term_type: BTreeMap<String, NonTerminalId> = BTreeMap::new();
        for nt in &synth.grammar.non_terminals {
            match by_term_type.get(&nt.term_type).copied() {
                Some(id) => {
                    let existing = &mut non_terminals[id.index()];
                    warn!(
                        "non-terminals {} and {} share term type {}; merging them as {}",
                        existing.name, nt.name, nt.term_type, nt.name
                    );
                    existing.name = nt.name.clone();
                }
                None => {
                    by_term_type.insert(nt.term_type.clone(), NonTerminalId(non_terminals.len()));
                    non_terminals.push(SemgusNonTerminal {
                        name: nt.name.clone(),
                        term_type: nt.term_type.clone(),
                        productions: BTreeMap::new(),
                    });
                }
            }
        }

        for nt in &synth.grammar.non_terminals {
            let Some(term_type) = self.term_types.get(&nt.term_type) else {
                return Err(AssembleError::UndeclaredNonTerminalTermType {
                    non_terminal: nt.name.clone(),
                    term_type: nt.term_type.clone(),
                });
            };
            let id = by_term_type[&nt.term_type];
            for production in &nt.productions {
                let Some(ctor) = term_type.constructors.get(&production.operator) else {
                    return Err(AssembleError::UnknownProductionOperator {
                        non_terminal: nt.name.clone(),
                        term_type: nt.term_type.clone(),
                        operator: production.operator.clone(),
                    });
                };
                let child_non_terminals = ctor
                    .children
                    .iter()
                    .map(|child| {
                        by_term_type.get(child).copied().ok_or_else(|| {
                            AssembleError::MissingChildNonTerminal {
                                constructor: production.operator.clone(),
                                term_type: child.clone(),
                            }
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                non_terminals[id.index()].productions.insert(
                    production.operator.clone(),
                    SemgusProduction {
                        operator: production.operator.clone(),
                        child_non_terminals,
                        semantic_rules: ctor.rules.clone(),
                    },
                );
            }
        }

        let Some(target) = by_term_type.get(&synth.term_type).copied() else {
            return Err(AssembleError::MissingTargetNonTerminal(synth.term_type));
        };

        debug!(
            "assembled {}: {} non-terminals, {} constraints",
            synth.name,
            non_terminals.len(),
            self.constraints.len()
        );

        Ok(SemgusProblem::from_parts(
            synth.name,
            target,
            non_terminals,
            by_term_type,
            self.constraints,
            self.metadata,
            SmtContext {
                datatypes: self.datatypes,
                functions: self.functions,
            },
        ))
    }
}

/// Runs one assembler over `events`. Errors carry the index of the rejected event; a failure
/// in finalization has none.
pub fn assemble<I>(events: I) -> Result<SemgusProblem, SemgusError>
where
    I: IntoIterator<Item = SpecEvent>,
{
    let mut assembler = ProblemAssembler::new();
    for (index, event) in events.into_iter().enumerate() {
        assembler
            .consume(event)
            .map_err(|source| SemgusError::Assemble {
                index: Some(index),
                source,
            })?;
    }
    Ok(assembler.end()?)
}

pub fn parse_problem(src: &str) -> Result<SemgusProblem, SemgusError> {
    parse_problem_with_mode(src, InputMode::Auto)
}

pub fn parse_problem_with_mode(src: &str, mode: InputMode) -> Result<SemgusProblem, SemgusError> {
    assemble(parse_document(src, mode)?)
}

/// Assembles a problem from an already-parsed JSON array of events.
pub fn parse_problem_value(value: &Value) -> Result<SemgusProblem, SemgusError> {
    assemble(parse_event_array(value)?)
}
