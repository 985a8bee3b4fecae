use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde::ser::{SerializeStruct, Serializer};

/// An index attached to an identifier, as in `(_ BitVec 32)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum Index {
    Int(i64),
    Text(String),
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Index::Int(i) => write!(f, "{i}"),
            Index::Text(s) => write!(f, "\"{s}\""),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Identifier {
    pub name: String,
    pub indices: Vec<Index>,
}

impl Identifier {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            indices: Vec::new(),
        }
    }

    pub fn indexed(name: impl Into<String>, indices: Vec<Index>) -> Self {
        Self {
            name: name.into(),
            indices,
        }
    }

    pub fn is_indexed(&self) -> bool {
        !self.indices.is_empty()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.indices.is_empty() {
            return write!(f, "{}", self.name);
        }
        write!(f, "(_ {}", self.name)?;
        for index in &self.indices {
            write!(f, " {index}")?;
        }
        write!(f, ")")
    }
}

/// A sort: an identifier, optionally applied to sort parameters (`(Seq Int)`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Sort {
    pub identifier: Identifier,
    pub params: Vec<Sort>,
}

impl Sort {
    pub fn new(identifier: Identifier) -> Self {
        Self {
            identifier,
            params: Vec::new(),
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::new(Identifier::new(name))
    }

    pub fn parametric(identifier: Identifier, params: Vec<Sort>) -> Self {
        Self { identifier, params }
    }

    pub fn is_parametric(&self) -> bool {
        !self.params.is_empty()
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.params.is_empty() {
            return write!(f, "{}", self.identifier);
        }
        write!(f, "({}", self.identifier)?;
        for param in &self.params {
            write!(f, " {param}")?;
        }
        write!(f, ")")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TypedVar {
    pub name: String,
    pub sort: Sort,
}

impl TypedVar {
    pub fn new(name: impl Into<String>, sort: Sort) -> Self {
        Self {
            name: name.into(),
            sort,
        }
    }

    /// Pairs names with sorts positionally. Callers check the lengths first.
    pub fn zip(names: Vec<String>, sorts: Vec<Sort>) -> Vec<TypedVar> {
        names
            .into_iter()
            .zip(sorts)
            .map(|(name, sort)| TypedVar { name, sort })
            .collect()
    }
}

impl fmt::Display for TypedVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {})", self.name, self.sort)
    }
}

/// Value of an SMT-LIB attribute, used for problem metadata and variable annotations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Unit,
    Text(String),
    List(Vec<AttributeValue>),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Unit => write!(f, "()"),
            AttributeValue::Text(s) => write!(f, "\"{s}\""),
            AttributeValue::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
        }
    }
}

pub const INPUT_ATTRIBUTE: &str = "input";
pub const OUTPUT_ATTRIBUTE: &str = "output";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotatedVar {
    pub name: String,
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl AnnotatedVar {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn is_input(&self) -> bool {
        self.attributes.contains_key(INPUT_ATTRIBUTE)
    }

    pub fn is_output(&self) -> bool {
        self.attributes.contains_key(OUTPUT_ATTRIBUTE)
    }
}

impl fmt::Display for AnnotatedVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.attributes.is_empty() {
            return write!(f, "{}", self.name);
        }
        let attrs = self
            .attributes
            .iter()
            .map(|(k, v)| match v {
                AttributeValue::Unit => k.clone(),
                v => format!("{k} = {v}"),
            })
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "{} [{attrs}]", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationApp {
    pub name: String,
    pub arguments: Vec<TypedVar>,
}

impl fmt::Display for RelationApp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.name)?;
        for arg in &self.arguments {
            write!(f, " {}", arg.name)?;
        }
        write!(f, ")")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantifierKind {
    Exists,
    ForAll,
}

impl QuantifierKind {
    pub fn as_str(self) -> &'static str {
        match self {
            QuantifierKind::Exists => "exists",
            QuantifierKind::ForAll => "forall",
        }
    }
}

/// A fixed-width bit pattern. Bit `i` lives in `bytes[i / 8]` at position `i % 8`. Only the
/// bytes up to the highest set bit are stored; every bit past them is zero, and no bit at or
/// beyond `width` is set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitVector {
    width: u32,
    bytes: Vec<u8>,
}

impl BitVector {
    pub fn zero(width: u32) -> Self {
        Self {
            width,
            bytes: Vec::new(),
        }
    }

    /// Builds a vector from little-endian bytes. Returns `None` if a bit at or beyond `width`
    /// is set.
    pub fn from_le_bytes(width: u32, bytes: &[u8]) -> Option<Self> {
        let used = bytes.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        let bytes = &bytes[..used];
        if let Some(&top) = bytes.last() {
            let highest = (used as u64 - 1) * 8 + u64::from(7 - top.leading_zeros());
            if highest >= u64::from(width) {
                return None;
            }
        }
        Some(Self {
            width,
            bytes: bytes.to_vec(),
        })
    }

    pub fn from_u64(width: u32, value: u64) -> Option<Self> {
        Self::from_le_bytes(width, &value.to_le_bytes())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    /// The stored bytes, without trailing zero bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn bit(&self, index: u32) -> bool {
        if index >= self.width {
            return false;
        }
        self.bytes
            .get((index / 8) as usize)
            .is_some_and(|byte| byte & (1 << (index % 8)) != 0)
    }

    /// `0x`-prefixed hex covering the stored bytes, capped at one digit per started nibble of
    /// the width. A zero vector of non-zero width is `0x0`.
    pub fn to_hex(&self) -> String {
        let stored = self.bytes.len() * 2;
        let digits = (self.width.div_ceil(4) as usize).min(stored.max(1));
        let mut out = String::with_capacity(digits + 2);
        out.push_str("0x");
        for nibble in (0..digits).rev() {
            let byte = self.bytes.get(nibble / 2).copied().unwrap_or(0);
            let value = (byte >> (4 * (nibble % 2))) & 0xF;
            out.push(char::from_digit(u32::from(value), 16).unwrap_or('0'));
        }
        out
    }
}

impl fmt::Display for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#b")?;
        for i in (0..self.width).rev() {
            write!(f, "{}", if self.bit(i) { '1' } else { '0' })?;
        }
        Ok(())
    }
}

impl Serialize for BitVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("BitVector", 2)?;
        state.serialize_field("width", &self.width)?;
        state.serialize_field("value", &self.to_hex())?;
        state.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypedTerm {
    pub sort: Sort,
    pub term: Term,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchCase {
    pub operator: String,
    pub arguments: Vec<String>,
    pub body: Term,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "term", content = "value", rename_all = "snake_case")]
pub enum Term {
    Application {
        function: Identifier,
        return_sort: Sort,
        arguments: Vec<TypedTerm>,
    },
    Quantifier {
        kind: QuantifierKind,
        bindings: Vec<TypedVar>,
        body: Box<Term>,
    },
    Lambda {
        arguments: Vec<String>,
        body: Box<Term>,
    },
    Match {
        scrutinee: Box<Term>,
        cases: Vec<MatchCase>,
    },
    Variable {
        name: String,
        sort: Sort,
    },
    String(String),
    Integer(i64),
    BitVector(BitVector),
}

impl Term {
    pub fn variable(name: impl Into<String>, sort: Sort) -> Self {
        Term::Variable {
            name: name.into(),
            sort,
        }
    }

    pub fn apply(function: Identifier, return_sort: Sort, arguments: Vec<TypedTerm>) -> Self {
        Term::Application {
            function,
            return_sort,
            arguments,
        }
    }
}

fn write_string_literal(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    write!(f, "\"{}\"", value.replace('"', "\"\""))
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Application {
                function,
                arguments,
                ..
            } => {
                if arguments.is_empty() {
                    return write!(f, "{function}");
                }
                write!(f, "({function}")?;
                for arg in arguments {
                    write!(f, " {}", arg.term)?;
                }
                write!(f, ")")
            }
            Term::Quantifier {
                kind,
                bindings,
                body,
            } => {
                write!(f, "({} (", kind.as_str())?;
                for (i, binding) in bindings.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{binding}")?;
                }
                write!(f, ") {body})")
            }
            Term::Lambda { arguments, body } => {
                write!(f, "(lambda ({}) {body})", arguments.join(" "))
            }
            Term::Match { scrutinee, cases } => {
                write!(f, "(match {scrutinee} (")?;
                for (i, case) in cases.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    if case.arguments.is_empty() {
                        write!(f, "({} {})", case.operator, case.body)?;
                    } else {
                        write!(
                            f,
                            "(({} {}) {})",
                            case.operator,
                            case.arguments.join(" "),
                            case.body
                        )?;
                    }
                }
                write!(f, "))")
            }
            Term::Variable { name, .. } => write!(f, "{name}"),
            Term::String(value) => write_string_literal(f, value),
            Term::Integer(value) => write!(f, "{value}"),
            Term::BitVector(bv) => write!(f, "{bv}"),
        }
    }
}
