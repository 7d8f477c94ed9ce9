//! Asset registry: embedded and external resources referenced by styles.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::parser::{ErrorKind, ParseError, ParseResult, Token, TokenKind};
use crate::style::StateName;

static NON_IDENTIFIER: OnceLock<Regex> = OnceLock::new();

/// Derive the generated identifier for an embedded asset path.
///
/// Every run of characters outside `[A-Za-z0-9_]` becomes a single `_` and
/// the result is upper-cased. Distinct paths may map to the same identifier;
/// no attempt is made to tell them apart.
///
/// # Example
///
/// ```
/// use rtb_style::assets::sanitize_identifier;
///
/// assert_eq!(sanitize_identifier("assets/knob-bg.tga"), "ASSETS_KNOB_BG_TGA");
/// ```
pub fn sanitize_identifier(path: &str) -> String {
    let pattern = NON_IDENTIFIER.get_or_init(|| {
        Regex::new(r"[^A-Za-z0-9_]+").unwrap_or_else(|e| unreachable!("invalid pattern: {e}"))
    });
    pattern.replace_all(path, "_").to_uppercase()
}

/// Where an asset's bytes come from at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetLocation {
    /// Compiled into the binary through a generated header.
    Embedded,
    /// Loaded from the filesystem by the toolkit.
    External,
}

/// What an asset is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// Image used by a texture property.
    Texture,
    /// Font file used by an `@font-face` weight.
    Font,
}

/// Back-reference from an asset to the declaration that created it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AssetOwner {
    /// A texture property on a style state.
    Property {
        /// Selector key of the owning style.
        selector: String,
        /// State holding the property.
        state: StateName,
        /// Property name.
        property: String,
    },
    /// A weight of an `@font-face` family.
    FontFace {
        /// Font family.
        family: String,
        /// Weight name.
        weight: String,
    },
}

impl fmt::Display for AssetOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetOwner::Property {
                selector,
                state,
                property,
            } => write!(f, "{}:{} {}", selector, state, property),
            AssetOwner::FontFace { family, weight } => write!(f, "@font-face {} {}", family, weight),
        }
    }
}

/// A parsed `url()` / `embed()` / `extern()` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetReference {
    /// Requested location.
    pub location: AssetLocation,
    /// Path as written.
    pub path: String,
}

impl AssetReference {
    /// Parse a reference token.
    ///
    /// `url(path)` embeds by default, `embed("path")` embeds and
    /// `extern("path")` keeps the path for runtime loading.
    pub fn from_token(token: &Token) -> ParseResult<Self> {
        match &token.kind {
            TokenKind::Uri(path) if path.is_empty() => {
                Err(malformed(token, "url() is missing a path"))
            }
            TokenKind::Uri(path) => Ok(Self {
                location: AssetLocation::Embedded,
                path: path.clone(),
            }),
            TokenKind::Function { name, content } => {
                let location = match name.as_str() {
                    "url" | "embed" => AssetLocation::Embedded,
                    "extern" => AssetLocation::External,
                    _ => {
                        return Err(malformed(
                            token,
                            "valid texture reference functions are embed(), extern(), and url()",
                        ));
                    }
                };

                let mut args = content.iter().filter(|t| !t.is_whitespace());
                let path = match args.next() {
                    Some(Token {
                        kind: TokenKind::String(path) | TokenKind::Uri(path),
                        ..
                    }) => path.clone(),
                    Some(other) => {
                        return Err(malformed(
                            other,
                            format!("expected a quoted path in {}(), got {}", name, other.describe()),
                        ));
                    }
                    None => return Err(malformed(token, format!("{}() is missing a path", name))),
                };

                if let Some(extra) = args.next() {
                    return Err(malformed(
                        extra,
                        format!("{}() takes a single path, got {}", name, extra.describe()),
                    ));
                }

                if path.is_empty() {
                    return Err(malformed(token, format!("{}() is missing a path", name)));
                }

                Ok(Self { location, path })
            }
            _ => Err(malformed(
                token,
                format!("expected url(), embed() or extern(), got {}", token.describe()),
            )),
        }
    }
}

fn malformed(token: &Token, message: impl Into<String>) -> ParseError {
    ParseError::new(ErrorKind::MalformedTextureReference, message, token.location)
}

/// How a compiled property refers to its asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AssetSource {
    /// Bytes come from the generated `<identifier>_DATA` symbol.
    Embedded {
        /// Path as written.
        path: String,
        /// Generated identifier.
        identifier: String,
    },
    /// Path is loaded at runtime.
    External {
        /// Path as written.
        path: String,
    },
}

impl AssetSource {
    /// The path as written in the stylesheet.
    pub fn path(&self) -> &str {
        match self {
            AssetSource::Embedded { path, .. } | AssetSource::External { path } => path,
        }
    }

    /// The generated identifier, for embedded assets.
    pub fn identifier(&self) -> Option<&str> {
        match self {
            AssetSource::Embedded { identifier, .. } => Some(identifier),
            AssetSource::External { .. } => None,
        }
    }
}

/// An asset compiled into the binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedAsset {
    /// Path as written.
    pub path: String,
    /// Generated identifier (`<identifier>_DATA`, `<identifier>_SIZE`).
    pub identifier: String,
    /// What the asset is.
    pub kind: AssetKind,
    /// Declaration that registered it.
    pub owner: AssetOwner,
}

/// An asset loaded from disk at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalAsset {
    /// Path as written.
    pub path: String,
    /// What the asset is.
    pub kind: AssetKind,
    /// Declaration that registered it.
    pub owner: AssetOwner,
}

/// Embedded and external assets, in registration order.
///
/// Registration never deduplicates: two declarations naming the same path
/// produce two entries.
#[derive(Debug, Clone, Default)]
pub struct AssetRegistry {
    embedded: Vec<EmbeddedAsset>,
    external: Vec<ExternalAsset>,
}

impl AssetRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an asset and return how properties should refer to it.
    pub fn register(
        &mut self,
        reference: &AssetReference,
        kind: AssetKind,
        owner: AssetOwner,
    ) -> AssetSource {
        let path = reference.path.clone();

        match reference.location {
            AssetLocation::Embedded => {
                let identifier = sanitize_identifier(&path);

                if let Some(other) = self
                    .embedded
                    .iter()
                    .find(|a| a.identifier == identifier && a.path != path)
                {
                    tracing::warn!(
                        "Embedded assets '{}' and '{}' share the identifier {}",
                        other.path,
                        path,
                        identifier
                    );
                }

                tracing::debug!(%path, %identifier, %owner, "registered embedded asset");
                self.embedded.push(EmbeddedAsset {
                    path: path.clone(),
                    identifier: identifier.clone(),
                    kind,
                    owner,
                });
                AssetSource::Embedded { path, identifier }
            }
            AssetLocation::External => {
                tracing::debug!(%path, %owner, "registered external asset");
                self.external.push(ExternalAsset {
                    path: path.clone(),
                    kind,
                    owner,
                });
                AssetSource::External { path }
            }
        }
    }

    /// Embedded assets in registration order.
    pub fn embedded(&self) -> &[EmbeddedAsset] {
        &self.embedded
    }

    /// External assets in registration order.
    pub fn external(&self) -> &[ExternalAsset] {
        &self.external
    }

    /// Total number of registered assets.
    pub fn len(&self) -> usize {
        self.embedded.len() + self.external.len()
    }

    /// Whether nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
