//! Located parse diagnostics.

use std::fmt;

/// A position in the stylesheet source (both 1-indexed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Location {
    /// Line number.
    pub line: u32,
    /// Column number.
    pub column: u32,
}

impl Location {
    /// Create a location.
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Category of a parse diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Reported by the token source (bad tokens, malformed rules).
    Lexical,
    /// A declaration names a property the compiler does not know.
    UnknownProperty,
    /// A selector carries a `:state` outside normal/focus/hover/active.
    UnknownState,
    /// A color value could not be parsed.
    MalformedColor,
    /// A texture or font source reference could not be parsed.
    MalformedTextureReference,
    /// A dimension was expected, or it used a unit other than `px`.
    MalformedDimension,
    /// A `prefix|name` selector used an undeclared namespace prefix.
    UnknownNamespacePrefix,
    /// The selector grammar was violated.
    UnexpectedToken,
    /// A required `@font-face` declaration is missing.
    MissingRequiredDeclaration,
    /// A `:state` rule appeared before any base rule for its selector.
    MissingBaseStyle,
}

/// CSS parse error with location information.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// What kind of failure this is.
    pub kind: ErrorKind,
    /// The error message describing what went wrong.
    pub message: String,
    /// Line number where the error occurred (1-indexed).
    pub line: u32,
    /// Column number where the error occurred (1-indexed).
    pub column: u32,
}

impl ParseError {
    /// Create a new parse error with the given message and location.
    pub fn new(kind: ErrorKind, message: impl Into<String>, location: Location) -> Self {
        Self {
            kind,
            message: message.into(),
            line: location.line,
            column: location.column,
        }
    }

    /// Create a token source error.
    pub fn lexical(message: impl Into<String>, location: Location) -> Self {
        Self::new(ErrorKind::Lexical, message, location)
    }

    /// Where the error occurred.
    pub fn location(&self) -> Location {
        Location::new(self.line, self.column)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CSS parse error at {}:{}: {}", self.line, self.column, self.message)
    }
}

impl std::error::Error for ParseError {}

/// Result of a single compiler step; the first structural error aborts.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
