//! Stylesheet parsing and ownership of the compiled model.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::{FontFace, NamespaceBinding};
use crate::assets::{AssetKind, AssetOwner, AssetReference, AssetRegistry};
use crate::parser::{
    Declaration, ErrorKind, Location, ParseError, ParseResult, RawRule, Token, TokenKind,
};
use crate::selector::SelectorResolver;
use crate::style::{self, StateName, Style};
use crate::types::DEFAULT_FONT_WEIGHT;
use crate::{Error, Result};

/// A parsed stylesheet: styles in document order plus the assets, fonts and
/// namespaces they reference.
///
/// # Example
///
/// ```
/// use rtb_style::{StateName, Stylesheet};
///
/// let sheet = Stylesheet::from_css(
///     "button { color: #fff; }
///      button:hover { color: #000; }",
/// )
/// .unwrap();
///
/// let button = sheet.style("button").unwrap();
/// assert_eq!(button.state(StateName::Hover).len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Stylesheet {
    namespaces: HashMap<String, NamespaceBinding>,
    in_namespace: Option<NamespaceBinding>,
    styles: Vec<Style>,
    index: HashMap<String, usize>,
    assets: AssetRegistry,
    fonts: Vec<FontFace>,
    source_path: Option<PathBuf>,
}

impl Stylesheet {
    /// Create an empty stylesheet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a stylesheet from CSS text.
    pub fn from_css(css: &str) -> Result<Self> {
        let mut sheet = Self::new();
        sheet.parse(css)?;
        Ok(sheet)
    }

    /// Load and parse a stylesheet file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;

        let mut sheet = Self::new();
        sheet.source_path = Some(path.to_path_buf());
        sheet.parse(&content)?;
        Ok(sheet)
    }

    /// Parse CSS text into this stylesheet.
    ///
    /// Rules are processed in document order. Parsing stops at the first
    /// structural error; the returned error carries every lexical error the
    /// token source reported, followed by that structural error.
    pub fn parse(&mut self, css: &str) -> Result<()> {
        let tokenized = crate::parser::tokenize(css);
        let mut errors = tokenized.errors;

        for rule in &tokenized.rules {
            if let Err(e) = self.parse_rule(rule) {
                errors.push(e);
                break;
            }
        }

        if !errors.is_empty() {
            return Err(Error::parse(errors));
        }

        self.done_parsing();

        tracing::info!(
            styles = self.styles.len(),
            embedded = self.assets.embedded().len(),
            external = self.assets.external().len(),
            fonts = self.fonts.len(),
            "compiled stylesheet"
        );
        Ok(())
    }

    fn parse_rule(&mut self, rule: &RawRule) -> ParseResult<()> {
        match rule {
            RawRule::Namespace {
                prefix,
                uri,
                location,
            } => {
                let binding = NamespaceBinding::new(uri.as_str(), prefix.clone(), *location);
                tracing::debug!(uri = %uri, prefix = ?prefix, "namespace");
                match prefix {
                    Some(prefix) => {
                        self.namespaces.insert(prefix.clone(), binding);
                    }
                    None => self.in_namespace = Some(binding),
                }
                Ok(())
            }
            RawRule::FontFace {
                declarations,
                location,
            } => self.parse_font_face(declarations, *location),
            RawRule::Qualified {
                selector,
                declarations,
                location,
            } => self.parse_style_rule(selector, declarations, *location),
        }
    }

    fn parse_style_rule(
        &mut self,
        selector: &[Token],
        declarations: &[Declaration],
        location: Location,
    ) -> ParseResult<()> {
        let keys = SelectorResolver::new(&self.namespaces, self.in_namespace.as_ref())
            .resolve(selector)?;

        for key in keys {
            let state = match &key.state {
                Some(state) => state.parse::<StateName>().map_err(|e| {
                    ParseError::new(ErrorKind::UnknownState, e.to_string(), location)
                })?,
                None => StateName::Normal,
            };

            let index = match self.index.get(&key.name) {
                Some(&index) => index,
                None if state == StateName::Normal => {
                    tracing::debug!(selector = %key.name, "new style");
                    self.styles.push(Style::new(key.name.as_str()));
                    self.index.insert(key.name.clone(), self.styles.len() - 1);
                    self.styles.len() - 1
                }
                None => {
                    return Err(ParseError::new(
                        ErrorKind::MissingBaseStyle,
                        format!("\"{}\" has no base style to add a state to", key),
                        location,
                    ));
                }
            };

            self.styles[index].add_state(state, declarations, &mut self.assets)?;
        }

        Ok(())
    }

    fn parse_font_face(
        &mut self,
        declarations: &[Declaration],
        location: Location,
    ) -> ParseResult<()> {
        let mut family = None;
        let mut src = None;
        let mut weight = None;

        // Later declarations of the same descriptor win.
        for decl in declarations {
            let tokens: Vec<&Token> = decl.significant().collect();
            let Some((first, rest)) = tokens.split_first() else {
                continue;
            };

            match decl.name.as_str() {
                "font-family" => family = Some(style::family(&decl.name, first, rest)?),
                "src" => {
                    // A `format()` hint is accepted and ignored
                    let rest = match rest.split_first() {
                        Some((hint, rest)) if is_format_hint(hint) => rest,
                        _ => rest,
                    };
                    if let Some(extra) = rest.first() {
                        return Err(ParseError::new(
                            ErrorKind::MalformedTextureReference,
                            format!("unexpected {} after font source", extra.describe()),
                            extra.location,
                        ));
                    }
                    src = Some(AssetReference::from_token(first)?);
                }
                "font-weight" => {
                    weight = Some(match &first.kind {
                        TokenKind::Ident(w) => w.clone(),
                        TokenKind::Number(w) => w.to_string(),
                        _ => {
                            return Err(ParseError::new(
                                ErrorKind::UnexpectedToken,
                                format!("unexpected {} in \"font-weight\"", first.describe()),
                                first.location,
                            ));
                        }
                    });
                }
                other => {
                    tracing::warn!(descriptor = other, "ignoring unknown @font-face descriptor");
                }
            }
        }

        let family = family.ok_or_else(|| required("font-family", location))?;
        let src = src.ok_or_else(|| required("src", location))?;
        let weight = weight.unwrap_or_else(|| DEFAULT_FONT_WEIGHT.to_string());

        let owner = AssetOwner::FontFace {
            family: family.clone(),
            weight: weight.clone(),
        };
        let source = self.assets.register(&src, AssetKind::Font, owner);

        tracing::debug!(%family, %weight, path = %src.path, "font face");

        let face = match self.fonts.iter().position(|f| f.family() == family) {
            Some(i) => &mut self.fonts[i],
            None => {
                self.fonts.push(FontFace::new(family));
                let last = self.fonts.len() - 1;
                &mut self.fonts[last]
            }
        };
        face.add_weight(weight, source);

        Ok(())
    }

    /// Finish every style (font assembly).
    pub fn done_parsing(&mut self) {
        for style in &mut self.styles {
            style.done_parsing();
        }
    }

    /// Styles in the order their base rules appeared.
    pub fn styles(&self) -> &[Style] {
        &self.styles
    }

    /// Look up a style by selector key.
    pub fn style(&self, key: &str) -> Option<&Style> {
        self.index.get(key).and_then(|&i| self.styles.get(i))
    }

    /// Embedded and external assets referenced by the styles and fonts.
    pub fn assets(&self) -> &AssetRegistry {
        &self.assets
    }

    /// Font families in the order they were first declared.
    pub fn fonts(&self) -> &[FontFace] {
        &self.fonts
    }

    /// Look up a font family.
    pub fn font(&self, family: &str) -> Option<&FontFace> {
        self.fonts.iter().find(|f| f.family() == family)
    }

    /// A prefixed namespace binding.
    pub fn namespace(&self, prefix: &str) -> Option<&NamespaceBinding> {
        self.namespaces.get(prefix)
    }

    /// The default namespace in effect at the end of the document.
    pub fn default_namespace(&self) -> Option<&NamespaceBinding> {
        self.in_namespace.as_ref()
    }

    /// The file this stylesheet was loaded from.
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// Number of styles.
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// Whether no styles were declared.
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

fn required(descriptor: &str, location: Location) -> ParseError {
    ParseError::new(
        ErrorKind::MissingRequiredDeclaration,
        format!("\"{}\" is a required property", descriptor),
        location,
    )
}

fn is_format_hint(token: &Token) -> bool {
    matches!(&token.kind, TokenKind::Function { name, .. } if name == "format")
}
