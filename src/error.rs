use std::path::PathBuf;

use crate::diagnostics::DecodeError;

/// A consistency violation found while assembling events into a problem.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssembleError {
    #[error("duplicate term type declaration: {0}")]
    DuplicateTermType(String),

    #[error("undeclared term type for definition: {0}")]
    UndeclaredTermType(String),

    #[error("duplicate term constructor {constructor} in term type {term_type}")]
    DuplicateConstructor {
        term_type: String,
        constructor: String,
    },

    #[error("undeclared term type {child} for child of constructor {constructor}")]
    UndeclaredChildTermType { constructor: String, child: String },

    #[error("unknown term type in horn clause: {0}")]
    UnknownTermType(String),

    #[error("unknown term constructor {constructor} in term type {term_type}")]
    UnknownConstructor {
        term_type: String,
        constructor: String,
    },

    #[error("synthesis function already set, cannot add {0}")]
    DuplicateSynthFun(String),

    #[error("no synthesis function has been set")]
    MissingSynthFun,

    #[error("non-terminal {non_terminal} refers to undeclared term type {term_type}")]
    UndeclaredNonTerminalTermType {
        non_terminal: String,
        term_type: String,
    },

    #[error(
        "production {operator} of non-terminal {non_terminal} is not a constructor of term type {term_type}"
    )]
    UnknownProductionOperator {
        non_terminal: String,
        term_type: String,
        operator: String,
    },

    #[error("constructor {constructor} has child term type {term_type} with no grammar non-terminal")]
    MissingChildNonTerminal {
        constructor: String,
        term_type: String,
    },

    #[error("target term type {0} has no grammar non-terminal")]
    MissingTargetNonTerminal(String),

    #[error("assembler already failed; start a new run")]
    Poisoned,
}

/// The single error a failed decode or assembly run reports.
#[derive(Debug, thiserror::Error)]
pub enum SemgusError {
    #[error("{0}")]
    Decode(#[from] DecodeError),

    #[error("{source}: {}", event_path(.index))]
    Assemble {
        index: Option<usize>,
        source: AssembleError,
    },

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid configuration {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },
}

fn event_path(index: &Option<usize>) -> String {
    match index {
        Some(i) => i.to_string(),
        None => "<root>".to_string(),
    }
}

impl From<AssembleError> for SemgusError {
    fn from(source: AssembleError) -> Self {
        SemgusError::Assemble {
            index: None,
            source,
        }
    }
}

impl SemgusError {
    pub fn code(&self) -> &'static str {
        match self {
            SemgusError::Decode(_) => "E-DECODE",
            SemgusError::Assemble { .. } => "E-RESOLVE",
            SemgusError::Json(_) => "E-JSON",
            SemgusError::Io { .. } => "E-IO",
            SemgusError::Config { .. } => "E-CONFIG",
        }
    }

    pub fn hint(&self) -> Option<&'static str> {
        hint_for_code(self.code())
    }

    pub fn message(&self) -> String {
        match self {
            SemgusError::Decode(e) => e.message.clone(),
            SemgusError::Assemble { source, .. } => source.to_string(),
            SemgusError::Json(e) => e.to_string(),
            SemgusError::Io { source, .. } => source.to_string(),
            SemgusError::Config { message, .. } => message.clone(),
        }
    }

    /// Location of the fault: a document path for decode errors, the event index for
    /// assembly errors.
    pub fn path(&self) -> String {
        match self {
            SemgusError::Decode(e) => e.path_text(),
            SemgusError::Assemble { index, .. } => event_path(index),
            SemgusError::Json(e) => format!("line {} column {}", e.line(), e.column()),
            SemgusError::Io { path, .. } | SemgusError::Config { path, .. } => {
                path.display().to_string()
            }
        }
    }

    /// One line for a terminal: code, message, location and a hint when one exists.
    pub fn report(&self) -> String {
        match self.hint() {
            Some(hint) => format!("{}: {} (hint: {hint})", self.code(), self),
            None => format!("{}: {}", self.code(), self),
        }
    }
}

pub fn hint_for_code(code: &str) -> Option<&'static str> {
    match code {
        "E-IO" => Some("check the input path and read permissions"),
        "E-JSON" => Some("the input must be a JSON array of events or one event per document"),
        "E-DECODE" => Some("the event does not match the SemGuS JSON schema at the given path"),
        "E-RESOLVE" => Some(
            "check that term types are declared before use and that synth-fun appears once",
        ),
        "E-CONFIG" => Some("check the config version and the input/output tables"),
        _ => None,
    }
}
