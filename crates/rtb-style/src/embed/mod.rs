//! Asset embedding: turning embedded assets into C headers.
//!
//! Parsing only records which files should be compiled in and under which
//! identifier. This pass reads each file, writes a header declaring
//! `<IDENTIFIER>_DATA` and `<IDENTIFIER>_SIZE`, and returns an
//! [`AssetManifest`] telling the emitter which header holds which
//! identifier. Callers with their own build step can fill a manifest by hand
//! instead.
//!
//! # Example
//!
//! ```no_run
//! use rtb_style::embed::{embed_assets, EmbedOptions};
//! use rtb_style::Stylesheet;
//!
//! let sheet = Stylesheet::from_file("theme/default.css")?;
//! let options = EmbedOptions::new("build/assets").with_base_dir("theme");
//! let manifest = embed_assets(&sheet, &options)?;
//! # Ok::<(), rtb_style::Error>(())
//! ```

mod bin2h;
mod targa;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub use bin2h::{PREAMBLE, render_header, write_hex_data};
pub use targa::{HEADER_LEN as TGA_HEADER_LEN, TargaHeader};

use crate::assets::{AssetKind, EmbeddedAsset};
use crate::rules::Stylesheet;
use crate::{Error, Result};

/// Default width of a hex line (a 79 column line minus one tab stop).
pub const DEFAULT_LINE_WRAP: usize = 79 - 8;

/// Settings for [`embed_assets`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedOptions {
    /// Directory generated headers are written to.
    pub output_dir: PathBuf,
    /// Directory asset paths are relative to.
    pub base_dir: PathBuf,
    /// Maximum width of a line of hex bytes.
    pub line_wrap: usize,
    /// Storage qualifier for the data arrays; may be empty.
    pub variable_prefix: String,
    /// Directory written in front of header names in `#include` lines,
    /// relative to the generated C file. `None` writes the bare header
    /// name, for C files generated into `output_dir` itself.
    pub include_dir: Option<PathBuf>,
}

impl Default for EmbedOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            base_dir: PathBuf::from("."),
            line_wrap: DEFAULT_LINE_WRAP,
            variable_prefix: "static".to_string(),
            include_dir: None,
        }
    }
}

impl EmbedOptions {
    /// Write headers into `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    /// Resolve asset paths against `base_dir`.
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    /// Set the hex line width.
    pub fn with_line_wrap(mut self, line_wrap: usize) -> Self {
        self.line_wrap = line_wrap;
        self
    }

    /// Set the storage qualifier.
    pub fn with_variable_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.variable_prefix = prefix.into();
        self
    }

    /// Include headers through `include_dir` instead of by bare name.
    pub fn with_include_dir(mut self, include_dir: impl Into<PathBuf>) -> Self {
        self.include_dir = Some(include_dir.into());
        self
    }
}

/// Dimensions read from an embedded image header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub bits_per_pixel: u8,
}

impl From<TargaHeader> for ImageInfo {
    fn from(header: TargaHeader) -> Self {
        Self {
            width: u32::from(header.width),
            height: u32::from(header.height),
            bits_per_pixel: header.bpp,
        }
    }
}

/// Where an embedded identifier's data lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedHeader {
    /// Path written into the `#include` line.
    pub header_path: PathBuf,
    /// Number of data bytes.
    pub size: usize,
    /// Image dimensions, for decoded textures.
    pub image: Option<ImageInfo>,
}

impl EmbeddedHeader {
    /// A header with no size or image information.
    pub fn new(header_path: impl Into<PathBuf>) -> Self {
        Self {
            header_path: header_path.into(),
            size: 0,
            image: None,
        }
    }

    /// Attach image dimensions.
    pub fn with_image(mut self, image: ImageInfo) -> Self {
        self.image = Some(image);
        self
    }
}

/// Identifier to header lookup table handed to the emitter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetManifest {
    headers: HashMap<String, EmbeddedHeader>,
}

impl AssetManifest {
    /// Create an empty manifest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the header for an identifier, returning any previous entry.
    pub fn insert(
        &mut self,
        identifier: impl Into<String>,
        header: EmbeddedHeader,
    ) -> Option<EmbeddedHeader> {
        self.headers.insert(identifier.into(), header)
    }

    /// Header for an identifier.
    pub fn get(&self, identifier: &str) -> Option<&EmbeddedHeader> {
        self.headers.get(identifier)
    }

    /// Whether an identifier has a header.
    pub fn contains(&self, identifier: &str) -> bool {
        self.headers.contains_key(identifier)
    }

    /// Number of identifiers.
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Whether the manifest is empty.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

/// Write a header for every embedded asset of `sheet`.
///
/// Assets are processed in registration order. An identifier that was
/// already written is not written again, so two references to one file
/// share a header. TGA textures must be uncompressed true-colour images;
/// their dimensions are recorded in the manifest.
pub fn embed_assets(sheet: &Stylesheet, options: &EmbedOptions) -> Result<AssetManifest> {
    fs::create_dir_all(&options.output_dir).map_err(|e| Error::io(&options.output_dir, e))?;

    let mut manifest = AssetManifest::new();

    for asset in sheet.assets().embedded() {
        if manifest.contains(&asset.identifier) {
            tracing::debug!(identifier = %asset.identifier, "header already written");
            continue;
        }

        let header = embed_asset(asset, options)?;
        manifest.insert(asset.identifier.clone(), header);
    }

    Ok(manifest)
}

fn embed_asset(asset: &EmbeddedAsset, options: &EmbedOptions) -> Result<EmbeddedHeader> {
    let source = options.base_dir.join(&asset.path);
    let data = fs::read(&source).map_err(|e| Error::io(&source, e))?;

    let image = if asset.kind == AssetKind::Texture && is_tga(&asset.path) {
        let header =
            TargaHeader::parse_simple(&data).map_err(|m| Error::invalid_image(&source, m))?;
        Some(ImageInfo::from(header))
    } else {
        None
    };

    let file_name = format!("{}.h", asset.identifier.to_lowercase());
    let written = options.output_dir.join(&file_name);
    let text = render_header(
        &asset.identifier,
        &data,
        &options.variable_prefix,
        options.line_wrap,
    );
    fs::write(&written, text).map_err(|e| Error::io(&written, e))?;

    tracing::info!(
        asset = %asset.path,
        header = %written.display(),
        bytes = data.len(),
        "embedded asset"
    );

    let header_path = match &options.include_dir {
        Some(dir) => dir.join(&file_name),
        None => PathBuf::from(file_name),
    };

    Ok(EmbeddedHeader {
        header_path,
        size: data.len(),
        image,
    })
}

fn is_tga(path: &str) -> bool {
    Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("tga"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, bytes: &[u8]) {
        fs::write(dir.join(name), bytes).unwrap();
    }

    #[test]
    fn embeds_textures_and_fonts() {
        let assets = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();

        let mut tga = targa::encode_simple(16, 8, 32);
        tga.extend_from_slice(&[0xFF; 4]);
        write(assets.path(), "knob.tga", &tga);
        write(assets.path(), "sans.ttf", b"font");

        let sheet = Stylesheet::from_css(
            "@font-face { font-family: Sans; src: url(sans.ttf); }
             knob { background-image: url(knob.tga); }",
        )
        .unwrap();

        let options = EmbedOptions::new(out.path()).with_base_dir(assets.path());
        let manifest = embed_assets(&sheet, &options).unwrap();

        assert_eq!(manifest.len(), 2);

        let knob = manifest.get("KNOB_TGA").unwrap();
        assert_eq!(knob.header_path, PathBuf::from("knob_tga.h"));
        assert!(out.path().join("knob_tga.h").exists());
        assert_eq!(knob.size, tga.len());
        assert_eq!(
            knob.image,
            Some(ImageInfo {
                width: 16,
                height: 8,
                bits_per_pixel: 32,
            })
        );

        let font = manifest.get("SANS_TTF").unwrap();
        assert_eq!(font.image, None);

        let text = fs::read_to_string(out.path().join("sans_ttf.h")).unwrap();
        assert!(text.contains("static const uint8_t SANS_TTF_DATA[] = {\n\t0x66, 0x6F, 0x6E, 0x74\n};"));
        assert!(text.contains("#define SANS_TTF_SIZE 4"));
    }

    #[test]
    fn duplicate_identifiers_share_a_header() {
        let assets = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write(assets.path(), "a.tga", &targa::encode_simple(1, 1, 24));

        let sheet = Stylesheet::from_css(
            "a { background-image: url(a.tga); }
             b { background-image: url(a.tga); }",
        )
        .unwrap();
        assert_eq!(sheet.assets().embedded().len(), 2);

        let manifest = embed_assets(
            &sheet,
            &EmbedOptions::new(out.path()).with_base_dir(assets.path()),
        )
        .unwrap();
        assert_eq!(manifest.len(), 1);
    }

    #[test]
    fn include_dir_prefixes_header_paths() {
        let assets = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write(assets.path(), "sans.ttf", b"font");

        let sheet = Stylesheet::from_css("@font-face { font-family: Sans; src: url(sans.ttf); }")
            .unwrap();
        let options = EmbedOptions::new(out.path())
            .with_base_dir(assets.path())
            .with_include_dir("assets");
        let manifest = embed_assets(&sheet, &options).unwrap();

        let font = manifest.get("SANS_TTF").unwrap();
        assert_eq!(font.header_path, Path::new("assets").join("sans_ttf.h"));
        assert!(out.path().join("sans_ttf.h").exists());
    }

    #[test]
    fn rejects_compressed_tga() {
        let assets = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let mut tga = targa::encode_simple(1, 1, 24);
        tga[2] = 10;
        write(assets.path(), "rle.tga", &tga);

        let sheet = Stylesheet::from_css("a { background-image: url(rle.tga); }").unwrap();
        let err = embed_assets(
            &sheet,
            &EmbedOptions::new(out.path()).with_base_dir(assets.path()),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidImage { .. }));
    }

    #[test]
    fn missing_asset_is_an_io_error() {
        let out = tempfile::tempdir().unwrap();
        let sheet = Stylesheet::from_css("a { background-image: url(nope.tga); }").unwrap();
        let err = embed_assets(&sheet, &EmbedOptions::new(out.path()).with_base_dir(out.path()))
            .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn external_assets_are_not_embedded() {
        let out = tempfile::tempdir().unwrap();
        let sheet =
            Stylesheet::from_css("a { background-image: extern(\"/nowhere/a.tga\"); }").unwrap();
        let manifest = embed_assets(&sheet, &EmbedOptions::new(out.path())).unwrap();
        assert!(manifest.is_empty());
    }
}
