//! Selector resolution into canonical style keys.
//!
//! A selector's tokens are read from the right, so the accumulated key grows
//! leftwards: `button.pressed` is read as `pressed`, then `.`, then `button`.
//! Each comma-separated group becomes one [`SelectorKey`].

use std::collections::HashMap;
use std::fmt;

use crate::parser::{ErrorKind, Location, ParseError, ParseResult, Token, TokenKind};
use crate::rules::NamespaceBinding;

/// A canonical selector key, optionally qualified by a pseudo-state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectorKey {
    /// The style type name, namespace included (e.g. `http://x.button`).
    pub name: String,
    /// The `:state` suffix, if the selector carried one.
    pub state: Option<String>,
}

impl SelectorKey {
    /// A key without a state.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: None,
        }
    }

    /// A key qualified by a state.
    pub fn with_state(name: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Some(state.into()),
        }
    }
}

impl fmt::Display for SelectorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            Some(state) => write!(f, "{}:{}", self.name, state),
            None => f.write_str(&self.name),
        }
    }
}

/// Resolves selector token runs against the namespaces declared so far.
#[derive(Debug, Clone, Copy)]
pub struct SelectorResolver<'a> {
    namespaces: &'a HashMap<String, NamespaceBinding>,
    default_namespace: Option<&'a NamespaceBinding>,
}

impl<'a> SelectorResolver<'a> {
    /// Create a resolver over prefixed namespaces and the active default.
    pub fn new(
        namespaces: &'a HashMap<String, NamespaceBinding>,
        default_namespace: Option<&'a NamespaceBinding>,
    ) -> Self {
        Self {
            namespaces,
            default_namespace,
        }
    }

    /// Resolve a full selector list into keys, in document order.
    ///
    /// Repeated groups resolve to a single key.
    pub fn resolve(&self, tokens: &[Token]) -> ParseResult<Vec<SelectorKey>> {
        let mut cursor = Cursor::new(tokens);
        let mut groups = vec![];

        while let Some(token) = cursor.pop() {
            match &token.kind {
                TokenKind::Comma | TokenKind::Whitespace => continue,
                TokenKind::Ident(name) => {
                    groups.push(self.resolve_group(name, token.location, &mut cursor)?);
                }
                _ => return Err(unexpected(token)),
            }
        }

        // Groups were read right to left.
        let mut keys: Vec<SelectorKey> = Vec::with_capacity(groups.len());
        for key in groups.into_iter().rev() {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }

        Ok(keys)
    }

    /// Resolve one comma-separated group whose last token was `name`.
    fn resolve_group(
        &self,
        name: &str,
        location: Location,
        cursor: &mut Cursor<'_>,
    ) -> ParseResult<SelectorKey> {
        let mut namespace = self.default_namespace;
        let mut value = name.to_string();

        loop {
            let Some(token) = cursor.peek() else {
                break;
            };

            match &token.kind {
                TokenKind::Comma => break,
                TokenKind::Ident(ident) => {
                    cursor.pop();
                    value.insert_str(0, ident);
                }
                TokenKind::Delim('|') => {
                    cursor.pop();
                    namespace = Some(self.explicit_namespace(token, cursor)?);
                }
                TokenKind::Delim('.') => {
                    cursor.pop();
                    value.insert(0, '.');
                }
                TokenKind::Colon => {
                    cursor.pop();

                    if cursor.peek().is_some_and(|t| t.kind == TokenKind::Colon) {
                        // `selector::pseudo` is shorthand for `selector.pseudo`
                        let second = cursor.pop().unwrap_or(token);
                        match cursor.pop() {
                            Some(Token {
                                kind: TokenKind::Ident(ident),
                                ..
                            }) => {
                                value.insert(0, '.');
                                value.insert_str(0, ident);
                            }
                            Some(other) => return Err(unexpected(other)),
                            None => return Err(unexpected(second)),
                        }
                    } else {
                        value.insert(0, ':');
                    }
                }
                TokenKind::Whitespace => {
                    cursor.pop();
                    value.insert(0, ' ');
                }
                _ => return Err(unexpected(token)),
            }
        }

        let value = value.trim_start();
        let (name, state) = match value.split_once(':') {
            Some(("", _)) => {
                return Err(ParseError::new(
                    ErrorKind::UnexpectedToken,
                    format!("unexpected \":\" at the start of selector \"{}\"", value),
                    location,
                ));
            }
            Some((name, state)) => (name, Some(state.to_string())),
            None => (value, None),
        };

        let name = match namespace {
            Some(ns) => format!("{}.{}", ns.uri, name),
            None => name.to_string(),
        };

        tracing::trace!(key = %name, state = ?state, "resolved selector");
        Ok(SelectorKey { name, state })
    }

    /// Look up the prefix preceding a `|` delimiter.
    fn explicit_namespace(
        &self,
        bar: &Token,
        cursor: &mut Cursor<'_>,
    ) -> ParseResult<&'a NamespaceBinding> {
        match cursor.pop() {
            Some(Token {
                kind: TokenKind::Ident(prefix),
                location,
            }) => self.namespaces.get(prefix).ok_or_else(|| {
                ParseError::new(
                    ErrorKind::UnknownNamespacePrefix,
                    format!("unknown namespace \"{}\"", prefix),
                    *location,
                )
            }),
            Some(other) => Err(unexpected(other)),
            None => Err(unexpected(bar)),
        }
    }
}

/// Index-based cursor walking a token slice from the end.
#[derive(Debug)]
struct Cursor<'t> {
    tokens: &'t [Token],
    end: usize,
}

impl<'t> Cursor<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        Self {
            tokens,
            end: tokens.len(),
        }
    }

    fn peek(&self) -> Option<&'t Token> {
        self.end.checked_sub(1).and_then(|i| self.tokens.get(i))
    }

    fn pop(&mut self) -> Option<&'t Token> {
        let token = self.peek()?;
        self.end -= 1;
        Some(token)
    }
}

fn unexpected(token: &Token) -> ParseError {
    ParseError::new(
        ErrorKind::UnexpectedToken,
        format!("unexpected {}", token.describe()),
        token.location,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{RawRule, tokenize};

    fn selector_tokens(selector: &str) -> Vec<Token> {
        let sheet = tokenize(&format!("{} {{}}", selector));
        match sheet.rules.into_iter().next() {
            Some(RawRule::Qualified { selector, .. }) => selector,
            other => panic!("expected a qualified rule, got {:?}", other),
        }
    }

    fn resolve(selector: &str) -> ParseResult<Vec<SelectorKey>> {
        let namespaces = HashMap::new();
        SelectorResolver::new(&namespaces, None).resolve(&selector_tokens(selector))
    }

    fn binding(uri: &str, prefix: Option<&str>) -> NamespaceBinding {
        NamespaceBinding::new(uri, prefix.map(String::from), Location::default())
    }

    #[test]
    fn plain_type_selector() {
        assert_eq!(resolve("button").unwrap(), vec![SelectorKey::new("button")]);
    }

    #[test]
    fn class_and_double_colon_are_equivalent() {
        assert_eq!(resolve("button.pressed").unwrap(), resolve("button::pressed").unwrap());
        assert_eq!(
            resolve("button::pressed").unwrap(),
            vec![SelectorKey::new("button.pressed")]
        );
    }

    #[test]
    fn single_colon_extracts_state() {
        assert_eq!(
            resolve("button:hover").unwrap(),
            vec![SelectorKey::with_state("button", "hover")]
        );
        assert_eq!(
            resolve("knob.thumb:active").unwrap(),
            vec![SelectorKey::with_state("knob.thumb", "active")]
        );
    }

    #[test]
    fn selector_list_keeps_document_order() {
        assert_eq!(
            resolve("label, button ,knob, label").unwrap(),
            vec![
                SelectorKey::new("label"),
                SelectorKey::new("button"),
                SelectorKey::new("knob"),
            ]
        );
    }

    #[test]
    fn descendant_whitespace_is_kept() {
        assert_eq!(
            resolve("container .child").unwrap(),
            vec![SelectorKey::new("container .child")]
        );
    }

    #[test]
    fn double_colon_requires_identifier() {
        let err = resolve("::pressed").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedToken);
    }

    #[test]
    fn leading_state_is_rejected() {
        let err = resolve(":hover").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedToken);
    }

    #[test]
    fn unexpected_tokens_are_rejected() {
        let err = resolve("button > label").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedToken);
        assert!(err.message.contains('>'));

        let err = resolve("#main").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedToken);
    }

    #[test]
    fn explicit_namespace_prefix() {
        let mut namespaces = HashMap::new();
        namespaces.insert("ui".to_string(), binding("http://x", Some("ui")));
        let default = binding("http://y", None);

        let keys = SelectorResolver::new(&namespaces, Some(&default))
            .resolve(&selector_tokens("ui|button:hover, label"))
            .unwrap();

        assert_eq!(
            keys,
            vec![
                SelectorKey::with_state("http://x.button", "hover"),
                SelectorKey::new("http://y.label"),
            ]
        );
    }

    #[test]
    fn unknown_namespace_prefix() {
        let err = resolve("nope|button").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownNamespacePrefix);
        assert!(err.message.contains("nope"));
        assert_eq!((err.line, err.column), (1, 1));
    }

    #[test]
    fn key_display_round_trips_state() {
        assert_eq!(SelectorKey::with_state("button", "hover").to_string(), "button:hover");
        assert_eq!(SelectorKey::new("button").to_string(), "button");
    }
}
