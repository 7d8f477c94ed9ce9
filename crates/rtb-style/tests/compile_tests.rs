//! End-to-end tests: stylesheet text in, C source and headers out.

use std::fs;
use std::path::Path;

use rtb_style::embed::TGA_HEADER_LEN;
use rtb_style::prelude::*;
use rtb_style::types::FontDescriptor;

fn color_of(sheet: &Stylesheet, key: &str, property: &str) -> Color {
    match sheet.style(key).unwrap().state(StateName::Normal).get(property) {
        Some(Property::Color(color)) => *color,
        other => panic!("expected a color for {key} {property}, got {other:?}"),
    }
}

fn border_of(css: &str) -> Border {
    let sheet = Stylesheet::from_css(css).unwrap();
    match sheet.styles()[0].state(StateName::Normal).get("border-image") {
        Some(Property::Texture(texture)) => texture.border,
        other => panic!("expected a texture, got {other:?}"),
    }
}

fn first_error(css: &str) -> ParseError {
    let err = Stylesheet::from_css(css).unwrap_err();
    err.diagnostics().last().cloned().unwrap()
}

fn approx(a: Color, b: Color) -> bool {
    [a.r - b.r, a.g - b.g, a.b - b.b, a.a - b.a]
        .iter()
        .all(|d| d.abs() < 1e-9)
}

#[test]
fn hex_colors_normalize_per_digit() {
    let sheet = Stylesheet::from_css(
        "a { color: #18f; }
         b { color: #0080ff; }",
    )
    .unwrap();

    assert_eq!(
        color_of(&sheet, "a", "color"),
        Color::rgba(1.0 / 15.0, 8.0 / 15.0, 1.0, 1.0)
    );
    assert_eq!(
        color_of(&sheet, "b", "color"),
        Color::rgba(0.0, 128.0 / 255.0, 1.0, 1.0)
    );
}

#[test]
fn rgba_forms_agree() {
    let sheet = Stylesheet::from_css(
        "a { color: rgba(#fff, 0.5); }
         b { color: rgba(1, 1, 1, 0.5); }",
    )
    .unwrap();

    assert!(approx(
        color_of(&sheet, "a", "color"),
        color_of(&sheet, "b", "color")
    ));
    assert_eq!(color_of(&sheet, "a", "color").a, 0.5);
}

#[test]
fn border_shorthand_expansion() {
    assert_eq!(
        border_of("k { border-image: url(k.tga) 2px; }"),
        Border::new(2.0, 2.0, 2.0, 2.0)
    );
    assert_eq!(
        border_of("k { border-image: url(k.tga) 2px 4px; }"),
        Border::new(4.0, 2.0, 4.0, 2.0)
    );
    assert_eq!(
        border_of("k { border-image: url(k.tga) 1px 2px 3px; }"),
        Border::new(1.0, 2.0, 3.0, 2.0)
    );
    assert_eq!(
        border_of("k { border-image: url(k.tga) 1px 2px 3px 4px; }"),
        Border::new(1.0, 2.0, 3.0, 4.0)
    );
}

#[test]
fn state_rule_needs_a_base_rule() {
    let err = first_error("button:hover { color: #fff; }");
    assert_eq!(err.kind, ErrorKind::MissingBaseStyle);
    assert_eq!((err.line, err.column), (1, 1));

    let sheet = Stylesheet::from_css(
        "button { }
         button:hover { color: #fff; }",
    )
    .unwrap();
    let button = sheet.style("button").unwrap();
    assert!(button.state(StateName::Normal).is_empty());
    assert_eq!(button.state(StateName::Hover).len(), 1);
}

#[test]
fn unknown_property_is_named() {
    let err = first_error("label {\n  color: #000;\n  foo: bar;\n}");
    assert_eq!(err.kind, ErrorKind::UnknownProperty);
    assert!(err.message.contains("\"foo\""));
    assert_eq!(err.line, 3);
}

#[test]
fn duplicate_embedded_texture_is_not_deduplicated() {
    let sheet = Stylesheet::from_css(
        "a { background-image: url(x.tga); }
         b { background-image: url(x.tga); }",
    )
    .unwrap();

    let embedded = sheet.assets().embedded();
    assert_eq!(embedded.len(), 2);
    assert_eq!(embedded[0].identifier, embedded[1].identifier);

    let mut manifest = AssetManifest::new();
    manifest.insert("X_TGA", EmbeddedHeader::new("x_tga.h"));
    let source = emit(&sheet, &manifest, &EmitOptions::default());
    assert_eq!(source.matches("#include \"x_tga.h\"").count(), 2);
}

#[test]
fn empty_asset_paths_fail_to_parse() {
    for css in [
        "a { background-image: url(); }",
        "a { background-image: url(\"\"); }",
        "a { background-image: embed(\"\"); }",
        "a { border-image: extern(\"\") 2px; }",
        "@font-face { font-family: Sans; src: url(); }",
    ] {
        let err = first_error(css);
        assert_eq!(err.kind, ErrorKind::MalformedTextureReference, "{css}");
        assert!(err.message.ends_with("is missing a path"), "{css}: {}", err.message);
    }
}

#[test]
fn font_faces_merge_by_family() {
    let sheet = Stylesheet::from_css(
        "@font-face { font-family: \"Sans\"; src: url(sans.ttf); font-weight: bold; }
         @font-face { font-family: \"Sans\"; src: url(sans-regular.ttf); font-weight: normal; }",
    )
    .unwrap();

    assert_eq!(sheet.fonts().len(), 1);
    let sans = sheet.font("Sans").unwrap();
    let weights: Vec<_> = sans.weights().map(|(w, s)| (w, s.path())).collect();
    assert_eq!(weights, [("bold", "sans.ttf"), ("normal", "sans-regular.ttf")]);
}

#[test]
fn namespaces_prefix_selector_keys() {
    let sheet = Stylesheet::from_css(
        "@namespace ui \"http://x\";
         ui|button { color: #fff; }",
    )
    .unwrap();
    assert!(sheet.style("http://x.button").is_some());

    let sheet = Stylesheet::from_css(
        "@namespace \"http://y\";
         button { color: #fff; }",
    )
    .unwrap();
    assert!(sheet.style("http://y.button").is_some());
}

#[test]
fn font_fields_assemble_into_font() {
    let sheet = Stylesheet::from_css(
        "label { font-family: DejaVu Sans; font-size: 12px; font-weight: bold; }",
    )
    .unwrap();

    let normal = sheet.style("label").unwrap().state(StateName::Normal);
    assert_eq!(
        normal.get("font"),
        Some(&Property::Font(Font {
            family: "DejaVu Sans".into(),
            weight: "bold".into(),
            size: 12.0,
            gamma: 2.2,
        }))
    );
    assert_ne!(*normal.font_descriptor(), FontDescriptor::default());
}

#[test]
fn lexical_errors_come_first() {
    let err = Stylesheet::from_css("@bogus;\na { nope: 1; }").unwrap_err();
    let kinds: Vec<_> = err.diagnostics().iter().map(|e| e.kind).collect();
    assert_eq!(kinds, [ErrorKind::Lexical, ErrorKind::UnknownProperty]);
}

#[test]
fn full_emission() {
    let sheet = Stylesheet::from_css(
        "button { color: #fff; width: 10px; }
         button:focus { color: #000; }
         slider { background-image: extern(\"/opt/s.tga\"); }",
    )
    .unwrap();

    let options = EmitOptions::new().with_var_name("theme");
    let source = Emitter::new(&sheet, &AssetManifest::new(), &options).emit();

    assert!(source.contains("static struct rtb_style theme[] = {"));
    assert!(source.contains("\t{\"button\",\n\t\tRTB_STYLE_NORMAL | RTB_STYLE_FOCUS,\n"));
    assert!(source.contains("[RTB_DRAW_HOVER] = NULL"));
    assert!(source.contains(".type = RTB_STYLE_PROP_FLOAT"));
    assert!(source.contains(".external.path = \"/opt/s.tga\","));
    assert!(source.trim_end().ends_with("\t{NULL}\n};"));

    let button = source.find("\"button\"").unwrap();
    let slider = source.find("\"slider\"").unwrap();
    assert!(button < slider);
}

fn write_tga(path: &Path, width: u16, height: u16) {
    let mut bytes = vec![0u8; TGA_HEADER_LEN];
    bytes[2] = 2;
    bytes[12..14].copy_from_slice(&width.to_le_bytes());
    bytes[14..16].copy_from_slice(&height.to_le_bytes());
    bytes[16] = 32;
    bytes.extend(std::iter::repeat_n(0xAB, usize::from(width * height) * 4));
    fs::write(path, bytes).unwrap();
}

#[test]
fn embed_then_emit() {
    let assets = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    fs::create_dir(assets.path().join("img")).unwrap();
    write_tga(&assets.path().join("img/knob.tga"), 4, 2);
    fs::write(assets.path().join("sans.ttf"), b"ttf").unwrap();

    let css = "@font-face { font-family: Sans; src: url(sans.ttf); }
               knob { border-image: url(img/knob.tga) 1px fill; font-family: Sans; }";
    let css_path = assets.path().join("theme.css");
    fs::write(&css_path, css).unwrap();

    let sheet = Stylesheet::from_file(&css_path).unwrap();
    assert_eq!(sheet.source_path(), Some(css_path.as_path()));

    let options = EmbedOptions::new(out.path()).with_base_dir(assets.path());
    let manifest = embed_assets(&sheet, &options).unwrap();
    assert_eq!(manifest.len(), 2);

    let header = fs::read_to_string(out.path().join("img_knob_tga.h")).unwrap();
    assert!(header.contains("#pragma once"));
    assert!(header.contains("static const uint8_t IMG_KNOB_TGA_DATA[] = {"));
    assert!(header.contains(&format!("#define IMG_KNOB_TGA_SIZE {}", 18 + 4 * 2 * 4)));

    let source = emit(&sheet, &manifest, &EmitOptions::default());
    let font_include = source.find("sans_ttf.h\"").unwrap();
    let knob_include = source.find("img_knob_tga.h\"").unwrap();
    assert!(font_include < knob_include);
    assert!(source.contains(".embedded.base = IMG_KNOB_TGA_DATA,"));
    assert!(source.contains(".w = 4,"));
    assert!(source.contains(".h = 2,"));
    assert!(source.contains(".flags = RTB_TEXTURE_FILL"));
    assert!(source.contains("static struct rtb_font_face SANS_FACE = {"));
    assert!(source.contains(".type = RTB_STYLE_PROP_FONT"));
}

#[test]
fn missing_asset_file_is_an_io_error() {
    let out = tempfile::tempdir().unwrap();
    let sheet = Stylesheet::from_css("a { background-image: url(nowhere.tga); }").unwrap();

    let err = embed_assets(&sheet, &EmbedOptions::new(out.path()).with_base_dir(out.path()))
        .unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}
