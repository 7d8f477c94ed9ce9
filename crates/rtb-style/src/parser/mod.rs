//! CSS token source and parse diagnostics.

mod css_parser;
mod error;
mod token;

pub use css_parser::tokenize;
pub use error::{ErrorKind, Location, ParseError, ParseResult};
pub use token::{Declaration, RawRule, Token, TokenKind, TokenizedSheet};
