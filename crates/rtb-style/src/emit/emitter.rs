//! Stylesheet to C serialization.
//!
//! Output layout, top to bottom:
//!
//! 1. a generated-file comment,
//! 2. `#include` lines for embedded asset headers, in registration order,
//! 3. one `struct rtb_font_face` per font family,
//! 4. the `struct rtb_style` array, one entry per style, each with all four
//!    state slots, terminated by `{NULL}`.
//!
//! Emission cannot fail: every value was validated when it was parsed.

use std::fmt::Write;

use super::EmitOptions;
use crate::assets::{AssetSource, sanitize_identifier};
use crate::embed::AssetManifest;
use crate::rules::{FontFace, Stylesheet};
use crate::style::{Property, Style, StyleState, Texture};
use crate::types::TextureFlags;

const GENERATED: &str = "\
/**
 * file autogenerated by rtb-stylec.
 * you probably don't want to edit this.
 */
";

/// Serialize `sheet` with the default emitter.
pub fn emit(sheet: &Stylesheet, manifest: &AssetManifest, options: &EmitOptions) -> String {
    Emitter::new(sheet, manifest, options).emit()
}

/// Writes a parsed stylesheet as C source.
///
/// The manifest supplies header paths and image sizes for embedded assets.
/// Assets missing from it get no `#include` line and a zero texture size.
#[derive(Debug, Clone, Copy)]
pub struct Emitter<'a> {
    sheet: &'a Stylesheet,
    manifest: &'a AssetManifest,
    options: &'a EmitOptions,
}

impl<'a> Emitter<'a> {
    /// Create an emitter.
    pub fn new(sheet: &'a Stylesheet, manifest: &'a AssetManifest, options: &'a EmitOptions) -> Self {
        Self {
            sheet,
            manifest,
            options,
        }
    }

    /// Produce the C source.
    pub fn emit(&self) -> String {
        let mut out = String::new();
        out.push_str(GENERATED);

        self.write_includes(&mut out);
        for face in self.sheet.fonts() {
            self.write_font_face(&mut out, face);
        }
        self.write_styles(&mut out);

        tracing::debug!(bytes = out.len(), var = %self.options.var_name, "emitted stylesheet");
        out
    }

    fn write_includes(&self, out: &mut String) {
        if self.options.forward_declared {
            return;
        }

        let headers: Vec<_> = self
            .sheet
            .assets()
            .embedded()
            .iter()
            .filter_map(|asset| self.manifest.get(&asset.identifier))
            .collect();

        if headers.is_empty() {
            return;
        }

        out.push('\n');
        for header in headers {
            let path = header.header_path.to_string_lossy();
            let _ = writeln!(out, "#include {}", c_string(&path));
        }
    }

    fn write_font_face(&self, out: &mut String, face: &FontFace) {
        let _ = writeln!(
            out,
            "\nstatic struct rtb_font_face {}_FACE = {{",
            sanitize_identifier(face.family())
        );
        let _ = writeln!(out, "\t{},", c_string(face.family()));
        out.push_str("\t.weights = {\n");

        for (weight, source) in face.weights() {
            let _ = writeln!(out, "\t\t{{{}, {{", c_string(weight));
            write_fields(out, 3, &asset_fields(source));
            out.push_str("}},\n");
        }

        out.push_str("\t\t{NULL}\n\t}\n};\n");
    }

    fn write_styles(&self, out: &mut String) {
        let _ = writeln!(
            out,
            "\nstatic struct rtb_style {}[] = {{",
            self.options.var_name
        );

        for style in self.sheet.styles() {
            self.write_style(out, style);
            out.push_str(",\n\n");
        }

        out.push_str("\t{NULL}\n};\n");
    }

    fn write_style(&self, out: &mut String, style: &Style) {
        let mask: Vec<_> = style
            .available_states()
            .map(|state| state.style_constant())
            .collect();

        let _ = writeln!(out, "\t{{{},", c_string(style.key()));
        let _ = writeln!(out, "\t\t{},\n", mask.join(" | "));
        out.push_str("\t\t.properties = {\n");

        let mut first = true;
        for (state, props) in style.states() {
            if !first {
                out.push_str(",\n");
            }
            first = false;

            let _ = write!(out, "\t\t\t[{}] = ", state.draw_constant());
            self.write_state(out, props);
        }

        out.push_str("\n\t\t}\n\t}");
    }

    fn write_state(&self, out: &mut String, state: &StyleState) {
        if state.is_empty() {
            out.push_str("NULL");
            return;
        }

        out.push_str("(struct rtb_style_property_definition []) {\n");
        for (name, property) in state.properties() {
            let _ = writeln!(out, "\t\t\t\t{{{},", c_string(name));
            write_fields(out, 5, &self.property_fields(property));
            out.push_str("},\n\n");
        }
        out.push_str("\t\t\t\t{NULL}\n\t\t\t}");
    }

    /// Designated initializer lines for a property, one field per entry.
    fn property_fields(&self, property: &Property) -> Vec<String> {
        let mut fields = vec![format!(".type = {}", property.type_constant())];

        match property {
            Property::Color(c) => {
                fields.push(format!(
                    ".color = {{ .r = {}, .g = {}, .b = {}, .a = {} }}",
                    c.r, c.g, c.b, c.a
                ));
            }
            Property::Float(value) => fields.push(format!(".flt = {}", value)),
            Property::Font(font) => {
                fields.push(".font = {".to_string());
                fields.push(format!("\t.family = {},", c_string(&font.family)));
                fields.push(format!("\t.weight = {},", c_string(&font.weight)));
                fields.push(format!("\t.size = {},", font.size));
                fields.push(format!("\t.lcd_gamma = {}", font.gamma));
                fields.push("}".to_string());
            }
            Property::Texture(texture) => {
                fields.push(".texture = {".to_string());
                fields.extend(
                    self.texture_fields(texture)
                        .into_iter()
                        .map(|f| format!("\t{}", f)),
                );
                fields.push("}".to_string());
            }
        }

        fields
    }

    fn texture_fields(&self, texture: &Texture) -> Vec<String> {
        let mut fields = asset_fields(&texture.source);

        if let AssetSource::Embedded { identifier, .. } = &texture.source {
            let image = self
                .manifest
                .get(identifier)
                .and_then(|header| header.image)
                .unwrap_or_default();
            fields.push(format!(".w = {}", image.width));
            fields.push(format!(".h = {}", image.height));
        }

        let [top, right, bottom, left] = texture.border.sides();
        fields.push(format!(
            ".border = {{ .top = {}, .right = {}, .bottom = {}, .left = {} }}",
            top, right, bottom, left
        ));
        fields.push(format!(".flags = {}", flags(texture.flags)));
        fields
    }
}

/// Location fields shared by textures and font faces.
fn asset_fields(source: &AssetSource) -> Vec<String> {
    match source {
        AssetSource::Embedded { identifier, .. } => vec![
            ".location = RTB_ASSET_EMBEDDED".to_string(),
            ".compression = RTB_ASSET_UNCOMPRESSED".to_string(),
            format!(".embedded.base = {}_DATA", identifier),
            format!(".embedded.size = {}_SIZE", identifier),
        ],
        AssetSource::External { path } => vec![
            ".location = RTB_ASSET_EXTERNAL".to_string(),
            ".compression = RTB_ASSET_UNCOMPRESSED".to_string(),
            format!(".external.path = {}", c_string(path)),
        ],
    }
}

/// Write `fields` as a comma-separated initializer body at `depth` tabs.
///
/// Lines opening a nested `{` or preceding its closing `}` get no separator.
fn write_fields(out: &mut String, depth: usize, fields: &[String]) {
    let indent = "\t".repeat(depth);
    let last = fields.len().saturating_sub(1);

    for (i, field) in fields.iter().enumerate() {
        out.push_str(&indent);
        out.push_str(field);

        // The caller closes the initializer on the last line.
        if i == last {
            break;
        }

        let opens = field.ends_with('{');
        let closes_next = fields.get(i + 1).is_some_and(|next| next == "}");
        if opens || closes_next || field.ends_with(',') {
            out.push('\n');
        } else {
            out.push_str(",\n");
        }
    }
}

fn flags(flags: TextureFlags) -> String {
    if flags.is_empty() {
        return "0".to_string();
    }

    flags
        .iter_names()
        .map(|(name, _)| format!("RTB_TEXTURE_{}", name))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Quote a string as a C literal.
fn c_string(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for c in s.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}
