pub mod assembler;
pub mod config;
pub mod diagnostics;
pub mod encode;
pub mod error;
pub mod event;
pub mod fmt;
pub mod json;
pub mod parser;
pub mod problem;
pub mod term;
pub mod types;

pub use assembler::{
    AssemblerState, ProblemAssembler, assemble, parse_problem, parse_problem_value,
    parse_problem_with_mode,
};
pub use config::{Config, InputMode, LogLevel, OutputFormat};
pub use diagnostics::{DecodeError, DecodeResultExt, PathSegment};
pub use error::{AssembleError, SemgusError};
pub use event::{EventKind, SpecEvent};
pub use fmt::dump_problem;
pub use parser::{parse_document, parse_event, parse_event_array, parse_event_str, parse_events};
pub use problem::{
    NonTerminalId, SemanticRule, SemgusNonTerminal, SemgusProblem, SemgusProduction, SmtContext,
};
pub use types::{AttributeValue, BitVector, Identifier, Index, Sort, Term, TypedVar};
