//! Error types for registration, lookup, and document parsing.
//!
//! Two disjoint failure kinds cross the registry boundary:
//!
//! - [`FormatError`]: the schema definitions themselves are invalid, or a
//!   request references an unregistered or misused type. Not recoverable by
//!   retrying the same document.
//! - [`ParseError`]: a document does not conform to an otherwise valid
//!   schema. Reject the document and carry on with the next one.

use std::fmt;

use crate::types::LeafKind;

/// Any failure surfaced by the registry.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A constructor rejected a fully validated parameter list.
    #[error("failed to construct {type_name}: {detail}")]
    Construct { type_name: String, detail: String },
}

impl ConfigError {
    /// Shorthand for a caller-defined construction failure.
    pub fn construct(type_name: impl Into<String>, detail: impl Into<String>) -> Self {
        ConfigError::Construct {
            type_name: type_name.into(),
            detail: detail.into(),
        }
    }

    pub fn is_format(&self) -> bool {
        matches!(self, ConfigError::Format(_))
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, ConfigError::Parse(_))
    }

    pub fn as_parse(&self) -> Option<&ParseError> {
        match self {
            ConfigError::Parse(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_format(&self) -> Option<&FormatError> {
        match self {
            ConfigError::Format(e) => Some(e),
            _ => None,
        }
    }

    /// Apply `f` to the inner error if this is a parse error. Format and
    /// construction errors pass through untouched.
    pub(crate) fn map_parse(self, f: impl FnOnce(ParseError) -> ParseError) -> Self {
        match self {
            ConfigError::Parse(e) => ConfigError::Parse(f(e)),
            other => other,
        }
    }
}

/// The schema set is inconsistent or a request cannot be resolved against it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormatError {
    #[error("cannot define array type {type_name} as a configuration type")]
    ArrayRegistration { type_name: String },

    #[error("configuration type {type_name} defines configuration key \"{key}\" more than once")]
    DuplicateKey { type_name: String, key: String },

    #[error("cannot redefine configuration type {type_name}")]
    Redefinition { type_name: String },

    #[error("no configuration format defined for {type_name}")]
    UnknownType { type_name: String },

    #[error(
        "configuration key \"{key}\" of {type_name} refers to undefined configuration type {referenced}"
    )]
    UnresolvedReference {
        type_name: String,
        key: String,
        referenced: String,
    },

    #[error("default for configuration key \"{key}\" of {type_name} is {found}, expected {expected}")]
    DefaultMismatch {
        type_name: String,
        key: String,
        expected: String,
        found: String,
    },

    #[error("cannot parse an array into non-array type {type_name}")]
    NotAnArray { type_name: String },

    #[error("cannot parse a single value into array type {type_name}")]
    ArrayTarget { type_name: String },

    #[error("duplicate entity id \"{id}\"")]
    DuplicateEntityId { id: String },

    #[error("unknown entity id \"{id}\"")]
    UnknownEntityId { id: String },

    #[error("entity id \"{id}\" must name an object type, got {type_name}")]
    EntityNotObject { id: String, type_name: String },

    #[error("entity id \"{id}\" refers to undefined configuration type {type_name}")]
    UnknownEntityType { id: String, type_name: String },

    #[error("constructor of {type_name} cannot take \"{key}\": {detail}")]
    Argument {
        type_name: String,
        key: String,
        detail: String,
    },

    #[error("{type_name} does not produce a {expected}")]
    TypeMismatch {
        type_name: String,
        expected: &'static str,
    },
}

/// The innermost rule a document violated.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("expected {expected}, got {found}")]
    UnexpectedShape { expected: String, found: &'static str },

    #[error("value {value} for {target} is not an integer")]
    NotAnInteger { target: LeafKind, value: String },

    #[error("value {value} is out of range for {target}")]
    OutOfRange { target: LeafKind, value: String },

    #[error("illegal configuration key \"{key}\" for {type_name}")]
    UnknownKey { type_name: String, key: String },

    #[error("required configuration key \"{key}\" for {type_name} is missing")]
    MissingKey { type_name: String, key: String },

    #[error("nesting depth exceeds {limit}")]
    DepthExceeded { limit: usize },
}

/// One step of the location of a parse failure inside the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Entered an object of this schema type.
    Type(String),
    /// Entered the value of this configuration key.
    Key(String),
    /// Entered this array element.
    Index(usize),
}

/// A document failed to conform to its schema.
///
/// Context is accumulated while the error unwinds, so `path()` locates the
/// violation from the document root down to the offending value.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    kind: ParseErrorKind,
    // Innermost segment first; segments are appended while unwinding.
    trail: Vec<PathSegment>,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind) -> Self {
        Self {
            kind,
            trail: Vec::new(),
        }
    }

    pub fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }

    /// Location segments from the document root inwards.
    pub fn path(&self) -> impl Iterator<Item = &PathSegment> {
        self.trail.iter().rev()
    }

    /// Array indices along the path, outermost first.
    pub fn indices(&self) -> Vec<usize> {
        self.path()
            .filter_map(|s| match s {
                PathSegment::Index(i) => Some(*i),
                _ => None,
            })
            .collect()
    }

    /// Renders the path as `Terminal.gates[2].capacity`. Type names below the
    /// root are implied by the keys and left out.
    pub fn location(&self) -> String {
        let mut out = String::new();
        for segment in self.path() {
            match segment {
                PathSegment::Type(name) if out.is_empty() => out.push_str(name),
                PathSegment::Type(_) => {}
                PathSegment::Key(key) if out.is_empty() => out.push_str(key),
                PathSegment::Key(key) => {
                    out.push('.');
                    out.push_str(key);
                }
                PathSegment::Index(i) => {
                    out.push('[');
                    out.push_str(&i.to_string());
                    out.push(']');
                }
            }
        }
        out
    }

    pub(crate) fn at_key(mut self, key: &str) -> Self {
        self.trail.push(PathSegment::Key(key.to_string()));
        self
    }

    pub(crate) fn at_index(mut self, index: usize) -> Self {
        self.trail.push(PathSegment::Index(index));
        self
    }

    pub(crate) fn within(mut self, type_name: &str) -> Self {
        self.trail.push(PathSegment::Type(type_name.to_string()));
        self
    }

    /// Names the element type when the path starts at an array index, so a
    /// top-level array failure reads `Door[1].width` rather than `[1].width`.
    pub(crate) fn rooted_in(self, element: &str) -> Self {
        match self.trail.last() {
            Some(PathSegment::Index(_)) => self.within(element),
            _ => self,
        }
    }
}

impl From<ParseErrorKind> for ParseError {
    fn from(kind: ParseErrorKind) -> Self {
        ParseError::new(kind)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let location = self.location();
        if location.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "at {location}: {}", self.kind)
        }
    }
}

// Display already prints the kind, so it is not exposed again as a source.
impl std::error::Error for ParseError {}
