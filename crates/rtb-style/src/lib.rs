//! Stylesheet compiler for the rutabaga widget toolkit.
//!
//! This crate turns a CSS-like stylesheet into C struct initializers the
//! toolkit links against:
//!
//! - **Parsing**: `cssparser`-based token source with located diagnostics
//! - **Selectors**: type and class keys, `::` sugar, `:state` suffixes and
//!   `@namespace` prefixes
//! - **Properties**: colors, textures (embedded or external, 9-slice
//!   borders), pixel lengths and fonts
//! - **Cascade**: four independent states per style (normal, focus, hover,
//!   active)
//! - **Assets**: embedded files become generated headers, external files are
//!   loaded at runtime
//! - **Watch**: recompile when a stylesheet changes (`watch` feature)
//!
//! # Example
//!
//! ```
//! use rtb_style::prelude::*;
//!
//! let sheet = Stylesheet::from_css(
//!     "button { color: #fff; background-color: rgba(#000, 0.5); }
//!      button:hover { color: #f80; }",
//! )?;
//!
//! let source = emit(&sheet, &AssetManifest::new(), &EmitOptions::default());
//! assert!(source.contains("static struct rtb_style default_style[] = {"));
//! # Ok::<(), rtb_style::Error>(())
//! ```

pub mod assets;
pub mod embed;
pub mod emit;
pub mod parser;
pub mod rules;
pub mod selector;
pub mod style;
pub mod types;

#[cfg(feature = "watch")]
pub mod watch;

mod error;

pub use error::{Error, Result};
pub use rules::Stylesheet;
pub use style::StateName;

/// Prelude module with commonly used types.
pub mod prelude {
    pub use crate::assets::{AssetRegistry, AssetSource, sanitize_identifier};
    pub use crate::embed::{AssetManifest, EmbedOptions, EmbeddedHeader, embed_assets};
    pub use crate::emit::{EmitOptions, Emitter, emit};
    pub use crate::parser::{ErrorKind, Location, ParseError};
    pub use crate::rules::{FontFace, NamespaceBinding, Stylesheet};
    pub use crate::selector::SelectorKey;
    pub use crate::style::{Property, StateName, Style, StyleState, Texture};
    pub use crate::types::{Border, Color, Font, TextureFlags};
    pub use crate::{Error, Result};

    #[cfg(feature = "watch")]
    pub use crate::watch::StylesheetWatcher;
}
