//! CSS token source built on the `cssparser` crate.
//!
//! This module walks a stylesheet once and turns it into [`RawRule`]s made of
//! owned [`Token`]s. It knows the rule-level grammar (qualified rules,
//! `@namespace`, `@font-face`, declaration blocks) but nothing about what the
//! selectors or values mean; that is left to the selector resolver and the
//! property compiler.
//!
//! # Error Recovery
//!
//! Problems found here never stop the walk. Each one is recorded in
//! [`TokenizedSheet::errors`] with its location, the offending construct is
//! skipped, and parsing continues with the next rule or declaration. The
//! caller decides what to do with the collected errors.

use cssparser::{
    Delimiter, Delimiters, ParseError as CssParseError, Parser, ParserInput, Token as CssToken,
};

use super::error::{Location, ParseError};
use super::token::{Declaration, RawRule, Token, TokenKind, TokenizedSheet, trim_whitespace};

/// Tokenize a stylesheet into raw rules plus collected lexical errors.
///
/// # Example
///
/// ```
/// use rtb_style::parser::{tokenize, RawRule};
///
/// let sheet = tokenize("button { color: #fff; }");
/// assert!(sheet.errors.is_empty());
/// assert!(matches!(sheet.rules[0], RawRule::Qualified { .. }));
/// ```
pub fn tokenize(css: &str) -> TokenizedSheet {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    let mut sheet = TokenizedSheet::default();

    loop {
        // Skip whitespace and comments
        parser.skip_whitespace();

        if parser.is_exhausted() {
            break;
        }

        let location = location_of(&parser);
        let state = parser.state();

        match parser.next().cloned() {
            Ok(CssToken::AtKeyword(name)) => {
                let name = name.to_ascii_lowercase();
                parse_at_rule(&mut parser, &name, location, &mut sheet);
            }
            Ok(CssToken::CDO) | Ok(CssToken::CDC) => {}
            Ok(_) => {
                parser.reset(&state);
                parse_qualified_rule(&mut parser, location, &mut sheet);
            }
            Err(_) => break,
        }
    }

    tracing::debug!(
        rules = sheet.rules.len(),
        errors = sheet.errors.len(),
        "tokenized stylesheet"
    );

    sheet
}

/// Parse a qualified rule: selector { declarations }
fn parse_qualified_rule(parser: &mut Parser<'_, '_>, location: Location, sheet: &mut TokenizedSheet) {
    let selector = trim_whitespace(collect_until(
        parser,
        Delimiter::CurlyBracketBlock,
        &mut sheet.errors,
    ));

    if !matches!(parser.next(), Ok(CssToken::CurlyBracketBlock)) {
        sheet
            .errors
            .push(ParseError::lexical("expected '{' after selector", location));
        return;
    }

    let declarations = parse_declaration_block(parser, &mut sheet.errors);

    if selector.is_empty() {
        sheet
            .errors
            .push(ParseError::lexical("empty selector", location));
        return;
    }

    sheet.rules.push(RawRule::Qualified {
        selector,
        declarations,
        location,
    });
}

fn parse_at_rule(
    parser: &mut Parser<'_, '_>,
    name: &str,
    location: Location,
    sheet: &mut TokenizedSheet,
) {
    let prelude = trim_whitespace(collect_until(
        parser,
        Delimiter::Semicolon | Delimiter::CurlyBracketBlock,
        &mut sheet.errors,
    ));
    let has_block = matches!(parser.next(), Ok(CssToken::CurlyBracketBlock));

    match name {
        "namespace" => {
            if has_block {
                sheet.errors.push(ParseError::lexical(
                    "@namespace rule cannot have a block",
                    location,
                ));
                return;
            }

            match parse_namespace(prelude, location) {
                Ok(rule) => sheet.rules.push(rule),
                Err(e) => sheet.errors.push(e),
            }
        }

        "font-face" => {
            if !has_block {
                sheet
                    .errors
                    .push(ParseError::lexical("missing block in @font-face rule", location));
                return;
            }

            if let Some(extra) = prelude.first() {
                sheet.errors.push(ParseError::lexical(
                    format!("unexpected {} in @font-face rule", extra.describe()),
                    extra.location,
                ));
            }

            let declarations = parse_declaration_block(parser, &mut sheet.errors);
            sheet.rules.push(RawRule::FontFace {
                declarations,
                location,
            });
        }

        _ => {
            tracing::debug!("Ignoring unknown at-rule @{}", name);
            sheet.errors.push(ParseError::lexical(
                format!("unknown at-rule in stylesheet context: @{}", name),
                location,
            ));
        }
    }
}

/// Parse the prelude of `@namespace [prefix] "<uri>";`.
fn parse_namespace(prelude: Vec<Token>, location: Location) -> Result<RawRule, ParseError> {
    let mut tokens = prelude.into_iter().filter(|t| !t.is_whitespace()).peekable();

    let prefix = tokens
        .next_if(|t| matches!(t.kind, TokenKind::Ident(_)))
        .and_then(|t| match t.kind {
            TokenKind::Ident(prefix) => Some(prefix),
            _ => None,
        });

    let uri = match tokens.next() {
        Some(Token {
            kind: TokenKind::String(uri) | TokenKind::Uri(uri),
            ..
        }) => uri,
        Some(other) => {
            return Err(ParseError::lexical(
                format!("expected namespace URI, got {}", other.describe()),
                other.location,
            ));
        }
        None => {
            return Err(ParseError::lexical(
                "expected namespace for @namespace",
                location,
            ));
        }
    };

    if let Some(extra) = tokens.next() {
        return Err(ParseError::lexical(
            "extraneous arguments to @namespace",
            extra.location,
        ));
    }

    Ok(RawRule::Namespace {
        prefix,
        uri,
        location,
    })
}

/// Parse the contents of a `{ ... }` block as declarations.
///
/// Must be called right after the block token has been consumed.
fn parse_declaration_block<'i>(
    parser: &mut Parser<'i, '_>,
    errors: &mut Vec<ParseError>,
) -> Vec<Declaration> {
    parser
        .parse_nested_block(|block| {
            let mut declarations = vec![];

            loop {
                block.skip_whitespace();

                if block.is_exhausted() {
                    break;
                }

                let location = location_of(block);
                let start = block.position();

                match block.next().cloned() {
                    Ok(CssToken::Semicolon) => {}
                    Ok(CssToken::Ident(name)) => {
                        let rest = collect_until_after(block, Delimiter::Semicolon, errors);
                        match declaration(name.to_ascii_lowercase(), rest, location) {
                            Ok(decl) => declarations.push(decl),
                            Err(e) => errors.push(e),
                        }
                    }
                    Ok(CssToken::AtKeyword(name)) => {
                        errors.push(ParseError::lexical(
                            format!("unknown at-rule in declaration list: @{}", name),
                            location,
                        ));
                        collect_until_after(block, Delimiter::Semicolon, errors);
                    }
                    Ok(_) => {
                        let text = block.slice_from(start).to_string();
                        errors.push(ParseError::lexical(
                            format!("expected a property name, got \"{}\"", text),
                            location,
                        ));
                        collect_until_after(block, Delimiter::Semicolon, errors);
                    }
                    Err(_) => break,
                }
            }

            Ok::<_, CssParseError<'i, ()>>(declarations)
        })
        .unwrap_or_default()
}

/// Build a declaration from the tokens following its name.
fn declaration(name: String, rest: Vec<Token>, location: Location) -> Result<Declaration, ParseError> {
    let mut rest = trim_whitespace(rest);

    match rest.first() {
        Some(Token {
            kind: TokenKind::Colon,
            ..
        }) => {
            rest.remove(0);
        }
        Some(other) => {
            return Err(ParseError::lexical(
                format!("expected ':', got {}", other.describe()),
                other.location,
            ));
        }
        None => {
            return Err(ParseError::lexical(
                format!("expected ':' after \"{}\"", name),
                location,
            ));
        }
    }

    let value = trim_whitespace(rest);
    if value.is_empty() {
        return Err(ParseError::lexical(
            format!("expected a property value for \"{}\"", name),
            location,
        ));
    }

    Ok(Declaration {
        name,
        value,
        location,
    })
}

fn collect_until<'i>(
    parser: &mut Parser<'i, '_>,
    delimiters: Delimiters,
    errors: &mut Vec<ParseError>,
) -> Vec<Token> {
    parser
        .parse_until_before(delimiters, |p| {
            Ok::<_, CssParseError<'i, ()>>(collect_tokens(p, errors))
        })
        .unwrap_or_default()
}

fn collect_until_after<'i>(
    parser: &mut Parser<'i, '_>,
    delimiters: Delimiters,
    errors: &mut Vec<ParseError>,
) -> Vec<Token> {
    parser
        .parse_until_after(delimiters, |p| {
            Ok::<_, CssParseError<'i, ()>>(collect_tokens(p, errors))
        })
        .unwrap_or_default()
}

/// Convert everything left in `parser` into owned tokens.
fn collect_tokens<'i>(parser: &mut Parser<'i, '_>, errors: &mut Vec<ParseError>) -> Vec<Token> {
    let mut tokens = vec![];

    loop {
        let location = location_of(parser);
        let start = parser.position();

        let token = match parser.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };

        let kind = match token {
            CssToken::Comment(_) => continue,
            CssToken::WhiteSpace(_) => TokenKind::Whitespace,
            CssToken::Ident(s) => TokenKind::Ident(s.to_string()),
            CssToken::Hash(s) | CssToken::IDHash(s) => TokenKind::Hash(s.to_string()),
            CssToken::QuotedString(s) => TokenKind::String(s.to_string()),
            CssToken::UnquotedUrl(s) => TokenKind::Uri(s.to_string()),
            CssToken::Delim(c) => TokenKind::Delim(c),
            CssToken::Colon => TokenKind::Colon,
            CssToken::Comma => TokenKind::Comma,
            CssToken::Number { value, .. } => {
                TokenKind::Number(numeric(parser.slice_from(start), "", value))
            }
            CssToken::Percentage { unit_value, .. } => {
                TokenKind::Percentage(numeric(parser.slice_from(start), "%", unit_value * 100.0))
            }
            CssToken::Dimension { value, unit, .. } => TokenKind::Dimension {
                value: numeric(parser.slice_from(start), &unit, value),
                unit: unit.to_ascii_lowercase(),
            },
            CssToken::Function(name) => {
                let content = parser
                    .parse_nested_block(|inner| {
                        Ok::<_, CssParseError<'i, ()>>(collect_tokens(inner, errors))
                    })
                    .unwrap_or_default();
                function_token(name.to_ascii_lowercase(), content)
            }
            CssToken::ParenthesisBlock
            | CssToken::SquareBracketBlock
            | CssToken::CurlyBracketBlock => {
                let _ = parser.parse_nested_block(|inner| {
                    collect_tokens(inner, errors);
                    Ok::<_, CssParseError<'i, ()>>(())
                });
                TokenKind::Other(parser.slice_from(start).to_string())
            }
            CssToken::BadUrl(url) => {
                errors.push(ParseError::lexical(format!("bad url \"{}\"", url), location));
                TokenKind::Other(parser.slice_from(start).to_string())
            }
            CssToken::BadString(_) => {
                errors.push(ParseError::lexical("unterminated string", location));
                TokenKind::Other(parser.slice_from(start).to_string())
            }
            CssToken::CloseParenthesis
            | CssToken::CloseSquareBracket
            | CssToken::CloseCurlyBracket => {
                let text = parser.slice_from(start).to_string();
                errors.push(ParseError::lexical(format!("unmatched \"{}\"", text), location));
                TokenKind::Other(text)
            }
            _ => TokenKind::Other(parser.slice_from(start).to_string()),
        };

        tokens.push(Token::new(kind, location));
    }

    tokens
}

/// `url("...")` arrives as a function; fold it into a URI token.
fn function_token(name: String, content: Vec<Token>) -> TokenKind {
    if name == "url" {
        let args: Vec<&Token> = content.iter().filter(|t| !t.is_whitespace()).collect();
        if let [Token {
            kind: TokenKind::String(path),
            ..
        }] = args.as_slice()
        {
            return TokenKind::Uri(path.clone());
        }
    }

    TokenKind::Function { name, content }
}

/// Re-read a number from its source text so the f64 keeps what was written.
fn numeric(text: &str, unit: &str, fallback: f32) -> f64 {
    let digits = if unit.is_empty() {
        Some(text)
    } else {
        text.len()
            .checked_sub(unit.len())
            .and_then(|end| text.get(..end))
    };

    digits
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(f64::from(fallback))
}

fn location_of(parser: &Parser<'_, '_>) -> Location {
    let loc = parser.current_source_location();
    Location::new(loc.line + 1, loc.column)
}
