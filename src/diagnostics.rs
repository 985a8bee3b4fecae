use std::fmt;

/// One step of a path into a JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "{key}"),
            PathSegment::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// A failure to decode part of a document, located by a path from the document root.
///
/// Decoders report errors relative to the value they were handed. Callers prepend the key or
/// index under which they found that value, so by the time the error reaches the top the path
/// is absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    pub message: String,
    pub path: Vec<PathSegment>,
}

impl DecodeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: Vec::new(),
        }
    }

    pub fn at(message: impl Into<String>, segment: impl Into<PathSegment>) -> Self {
        Self::new(message).prepend(segment)
    }

    pub fn prepend(mut self, segment: impl Into<PathSegment>) -> Self {
        self.path.insert(0, segment.into());
        self
    }

    pub fn path_text(&self) -> String {
        if self.path.is_empty() {
            return "<root>".to_string();
        }
        self.path
            .iter()
            .map(PathSegment::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.message, self.path_text())
    }
}

impl std::error::Error for DecodeError {}

/// Path bookkeeping for decode results. Only the error branch pays for it.
///
/// Segments are prepended, so chain them innermost first: `.at(i).at("arguments")` yields
/// `arguments.i`.
pub trait DecodeResultExt<T> {
    fn at(self, segment: impl Into<PathSegment>) -> Result<T, DecodeError>;
}

impl<T> DecodeResultExt<T> for Result<T, DecodeError> {
    fn at(self, segment: impl Into<PathSegment>) -> Result<T, DecodeError> {
        self.map_err(|e| e.prepend(segment))
    }
}
