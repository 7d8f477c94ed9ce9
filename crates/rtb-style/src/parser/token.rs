//! Owned token and raw rule types produced by the token source.

use super::error::{Location, ParseError};

/// A single owned token with its source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The token payload.
    pub kind: TokenKind,
    /// Where the token starts.
    pub location: Location,
}

impl Token {
    /// Create a token.
    pub fn new(kind: TokenKind, location: Location) -> Self {
        Self { kind, location }
    }

    /// Whether this is a whitespace token.
    pub fn is_whitespace(&self) -> bool {
        matches!(self.kind, TokenKind::Whitespace)
    }

    /// Short description used in diagnostics.
    pub fn describe(&self) -> String {
        self.kind.describe()
    }
}

/// Token payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// An identifier.
    Ident(String),
    /// `#` followed by a name (hash or id-hash).
    Hash(String),
    /// A function call with its argument tokens.
    Function { name: String, content: Vec<Token> },
    /// A number with a unit.
    Dimension { value: f64, unit: String },
    /// A bare number.
    Number(f64),
    /// A percentage (value as written, e.g. `50` for `50%`).
    Percentage(f64),
    /// A quoted string.
    String(String),
    /// `url(...)`, quoted or not.
    Uri(String),
    /// A single delimiter character.
    Delim(char),
    /// `:`
    Colon,
    /// `,`
    Comma,
    /// One or more whitespace characters.
    Whitespace,
    /// Anything else, kept as source text.
    Other(String),
}

impl TokenKind {
    /// Short description used in diagnostics.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Ident(s) => format!("identifier \"{}\"", s),
            TokenKind::Hash(s) => format!("hash \"#{}\"", s),
            TokenKind::Function { name, .. } => format!("function \"{}()\"", name),
            TokenKind::Dimension { value, unit } => format!("dimension \"{}{}\"", value, unit),
            TokenKind::Number(n) => format!("number \"{}\"", n),
            TokenKind::Percentage(p) => format!("percentage \"{}%\"", p),
            TokenKind::String(s) => format!("string \"{}\"", s),
            TokenKind::Uri(s) => format!("url \"{}\"", s),
            TokenKind::Delim(c) => format!("\"{}\"", c),
            TokenKind::Colon => "\":\"".to_string(),
            TokenKind::Comma => "\",\"".to_string(),
            TokenKind::Whitespace => "whitespace".to_string(),
            TokenKind::Other(s) => format!("\"{}\"", s),
        }
    }
}

/// A `name: value` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    /// Lower-cased property name.
    pub name: String,
    /// Value tokens with surrounding whitespace removed.
    pub value: Vec<Token>,
    /// Location of the property name.
    pub location: Location,
}

impl Declaration {
    /// Value tokens with interior whitespace removed.
    pub fn significant(&self) -> impl Iterator<Item = &Token> {
        self.value.iter().filter(|t| !t.is_whitespace())
    }
}

/// A top-level rule as produced by the token source.
#[derive(Debug, Clone, PartialEq)]
pub enum RawRule {
    /// `@namespace [prefix] "<uri>";`
    Namespace {
        prefix: Option<String>,
        uri: String,
        location: Location,
    },
    /// `@font-face { ... }`
    FontFace {
        declarations: Vec<Declaration>,
        location: Location,
    },
    /// `selector { declarations }`
    Qualified {
        selector: Vec<Token>,
        declarations: Vec<Declaration>,
        location: Location,
    },
}

/// Everything the token source extracted from one document.
#[derive(Debug, Clone, Default)]
pub struct TokenizedSheet {
    /// Rules in document order.
    pub rules: Vec<RawRule>,
    /// Lexical and structural errors, in the order they were found.
    pub errors: Vec<ParseError>,
}

/// Remove leading and trailing whitespace tokens.
pub(crate) fn trim_whitespace(mut tokens: Vec<Token>) -> Vec<Token> {
    while tokens.last().is_some_and(Token::is_whitespace) {
        tokens.pop();
    }
    let leading = tokens.iter().take_while(|t| t.is_whitespace()).count();
    tokens.drain(..leading);
    tokens
}
