//! Typed style properties and the declaration compiler.
//!
//! Every recognized property name maps to one value parser. Colors, textures
//! and floats become a [`Property`] right away; the `font-*` fields are
//! collected on the state and only turn into a `font` property once the
//! state is complete.

use super::StateName;
use crate::assets::{AssetKind, AssetOwner, AssetReference, AssetRegistry, AssetSource};
use crate::parser::{Declaration, ErrorKind, ParseError, ParseResult, Token, TokenKind};
use crate::types::{Border, Color, Font, TextureFlags};

/// A texture reference with its slicing and layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    /// Where the image comes from.
    pub source: AssetSource,
    /// 9-slice insets; zero for plain textures.
    pub border: Border,
    /// Fill and repeat flags.
    pub flags: TextureFlags,
}

/// A compiled, typed property value.
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    /// An RGBA color.
    Color(Color),
    /// An image, embedded or external.
    Texture(Texture),
    /// A pixel length.
    Float(f64),
    /// A font assembled from the `font-*` fields of a state.
    Font(Font),
}

impl Property {
    /// `RTB_STYLE_PROP_*` type tag for the property.
    pub fn type_constant(&self) -> &'static str {
        match self {
            Property::Color(_) => "RTB_STYLE_PROP_COLOR",
            Property::Texture(_) => "RTB_STYLE_PROP_TEXTURE",
            Property::Float(_) => "RTB_STYLE_PROP_FLOAT",
            Property::Font(_) => "RTB_STYLE_PROP_FONT",
        }
    }
}

/// One `font-*` declaration waiting for font assembly.
#[derive(Debug, Clone, PartialEq)]
pub enum FontField {
    /// `font-family`
    Family(String),
    /// `font-weight`
    Weight(String),
    /// `font-size`
    Size(f64),
    /// `-rtb-font-lcd-gamma`
    Gamma(f64),
}

/// Result of compiling one declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum Compiled {
    /// A finished property.
    Property(Property),
    /// A deferred font field.
    Font(FontField),
}

/// Value parser selected for a property name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Compiler {
    Color,
    Texture,
    BorderTexture,
    Float,
    FontFamily,
    FontWeight,
    FontSize,
    FontGamma,
}

fn compiler_for(name: &str) -> Option<Compiler> {
    let compiler = match name {
        "color" | "background-color" | "border-color" => Compiler::Color,
        "background-image" => Compiler::Texture,
        "border-image" => Compiler::BorderTexture,
        "width" | "height" | "min-width" | "min-height" | "max-width" | "max-height"
        | "border-width" | "border-radius" | "padding-top" | "padding-right"
        | "padding-bottom" | "padding-left" => Compiler::Float,
        "font-family" => Compiler::FontFamily,
        "font-weight" => Compiler::FontWeight,
        "font-size" => Compiler::FontSize,
        "-rtb-font-lcd-gamma" => Compiler::FontGamma,
        _ => return None,
    };
    Some(compiler)
}

/// Whether `name` is a property this compiler understands.
pub fn is_known_property(name: &str) -> bool {
    compiler_for(name).is_some()
}

/// Where a declaration is being compiled.
#[derive(Debug)]
pub struct CompileContext<'a> {
    /// Receives texture assets.
    pub assets: &'a mut AssetRegistry,
    /// Selector key of the style being built.
    pub selector: &'a str,
    /// State the declaration belongs to.
    pub state: StateName,
}

/// Compile one declaration.
///
/// Textures register their asset with the context's registry as a side
/// effect.
pub fn compile(decl: &Declaration, ctx: &mut CompileContext<'_>) -> ParseResult<Compiled> {
    let compiler = compiler_for(&decl.name).ok_or_else(|| {
        ParseError::new(
            ErrorKind::UnknownProperty,
            format!("unknown property \"{}\"", decl.name),
            decl.location,
        )
    })?;

    let tokens: Vec<&Token> = decl.significant().collect();
    let Some((first, rest)) = tokens.split_first() else {
        return Err(ParseError::new(
            ErrorKind::UnexpectedToken,
            format!("expected a property value for \"{}\"", decl.name),
            decl.location,
        ));
    };

    let compiled = match compiler {
        Compiler::Color => Compiled::Property(Property::Color(color(first, rest)?)),
        Compiler::Texture | Compiler::BorderTexture => {
            let reference = AssetReference::from_token(first)?;
            let (border, flags) = if compiler == Compiler::BorderTexture {
                border_slices(rest)?
            } else {
                expect_end(rest, ErrorKind::MalformedTextureReference)?;
                (Border::default(), TextureFlags::empty())
            };

            let owner = AssetOwner::Property {
                selector: ctx.selector.to_string(),
                state: ctx.state,
                property: decl.name.clone(),
            };
            let source = ctx.assets.register(&reference, AssetKind::Texture, owner);

            Compiled::Property(Property::Texture(Texture {
                source,
                border,
                flags,
            }))
        }
        Compiler::Float => {
            let value = pixels(first, "non-pixel units are not supported")?;
            expect_end(rest, ErrorKind::MalformedDimension)?;
            Compiled::Property(Property::Float(value))
        }
        Compiler::FontFamily => Compiled::Font(FontField::Family(family(&decl.name, first, rest)?)),
        Compiler::FontWeight => {
            let weight = match &first.kind {
                TokenKind::Ident(weight) => weight.clone(),
                TokenKind::Number(weight) => weight.to_string(),
                _ => return Err(font_value(&decl.name, first)),
            };
            expect_end(rest, ErrorKind::UnexpectedToken)?;
            Compiled::Font(FontField::Weight(weight))
        }
        Compiler::FontSize => {
            // Unit is ignored; the toolkit interprets the number.
            let size = match first.kind {
                TokenKind::Dimension { value, .. } | TokenKind::Number(value) => value,
                _ => return Err(font_value(&decl.name, first)),
            };
            expect_end(rest, ErrorKind::UnexpectedToken)?;
            Compiled::Font(FontField::Size(size))
        }
        Compiler::FontGamma => {
            let TokenKind::Number(gamma) = first.kind else {
                return Err(font_value(&decl.name, first));
            };
            expect_end(rest, ErrorKind::UnexpectedToken)?;
            Compiled::Font(FontField::Gamma(gamma))
        }
    };

    Ok(compiled)
}

/// Parse a `font-family` value: a quoted string or a run of identifiers.
pub(crate) fn family(property: &str, first: &Token, rest: &[&Token]) -> ParseResult<String> {
    match &first.kind {
        TokenKind::String(family) => {
            expect_end(rest, ErrorKind::UnexpectedToken)?;
            Ok(family.clone())
        }
        TokenKind::Ident(name) => {
            let mut family = name.clone();
            for token in rest {
                match &token.kind {
                    TokenKind::Ident(word) => {
                        family.push(' ');
                        family.push_str(word);
                    }
                    _ => return Err(font_value(property, token)),
                }
            }
            Ok(family)
        }
        _ => Err(font_value(property, first)),
    }
}

fn color(first: &Token, rest: &[&Token]) -> ParseResult<Color> {
    let color = match &first.kind {
        TokenKind::Hash(hex) => Color::from_hex(hex).ok_or_else(|| {
            ParseError::new(
                ErrorKind::MalformedColor,
                format!("couldn't parse hex color \"#{}\"", hex),
                first.location,
            )
        })?,
        TokenKind::Function { name, content } if name.eq_ignore_ascii_case("rgba") => {
            rgba(first, content)?
        }
        _ => {
            return Err(ParseError::new(
                ErrorKind::MalformedColor,
                format!("expected hex color or rgba(), got {}", first.describe()),
                first.location,
            ));
        }
    };

    expect_end(rest, ErrorKind::MalformedColor)?;

    if !color.is_normalized() {
        return Err(ParseError::new(
            ErrorKind::MalformedColor,
            "color components must lie between 0 and 1",
            first.location,
        ));
    }

    Ok(color)
}

fn rgba(function: &Token, content: &[Token]) -> ParseResult<Color> {
    let args: Vec<&Token> = content
        .iter()
        .filter(|t| !matches!(t.kind, TokenKind::Whitespace | TokenKind::Comma))
        .collect();

    let shape = || {
        ParseError::new(
            ErrorKind::MalformedColor,
            "function rgba() takes either 4 numeric arguments or a hex color and alpha",
            function.location,
        )
    };

    match args.as_slice() {
        [
            Token {
                kind: TokenKind::Hash(hex),
                ..
            },
            Token {
                kind: TokenKind::Number(alpha),
                ..
            },
        ] => Color::from_hex(hex)
            .map(|c| c.with_alpha(*alpha))
            .ok_or_else(shape),
        [r, g, b, a] => {
            let channels = [r, g, b, a].map(|t| match t.kind {
                TokenKind::Number(n) => Some(n),
                _ => None,
            });
            match channels {
                [Some(r), Some(g), Some(b), Some(a)] => Ok(Color::rgba(r, g, b, a)),
                _ => Err(shape()),
            }
        }
        _ => Err(shape()),
    }
}

/// Border slices, then an optional `fill`, then `repeat*` keywords.
fn border_slices(tokens: &[&Token]) -> ParseResult<(Border, TextureFlags)> {
    let mut rest = tokens.iter().copied().peekable();
    let mut slices = Vec::with_capacity(4);

    while let Some(token) = rest.next_if(|t| matches!(t.kind, TokenKind::Dimension { .. })) {
        if slices.len() == 4 {
            return Err(ParseError::new(
                ErrorKind::MalformedDimension,
                "at most 4 border slices may be given",
                token.location,
            ));
        }
        slices.push(pixels(token, "slices can only be specified in pixels")?);
    }

    let border = Border::from_slices(&slices).unwrap_or_default();
    let mut flags = TextureFlags::empty();

    if rest
        .next_if(|t| matches!(&t.kind, TokenKind::Ident(kw) if kw.eq_ignore_ascii_case("fill")))
        .is_some()
    {
        flags |= TextureFlags::FILL;
    }

    for token in rest {
        let repeat = match &token.kind {
            TokenKind::Ident(kw) => TextureFlags::from_repeat_keyword(&kw.to_ascii_lowercase()),
            _ => None,
        };
        match repeat {
            Some(repeat) => flags |= repeat,
            None => {
                return Err(ParseError::new(
                    ErrorKind::MalformedTextureReference,
                    format!("unexpected {} in border image", token.describe()),
                    token.location,
                ));
            }
        }
    }

    Ok((border, flags))
}

fn pixels(token: &Token, wrong_unit: &str) -> ParseResult<f64> {
    match &token.kind {
        TokenKind::Dimension { value, unit } if unit.eq_ignore_ascii_case("px") => Ok(*value),
        TokenKind::Dimension { .. } => Err(ParseError::new(
            ErrorKind::MalformedDimension,
            wrong_unit,
            token.location,
        )),
        _ => Err(ParseError::new(
            ErrorKind::MalformedDimension,
            format!("expected dimension, got {}", token.describe()),
            token.location,
        )),
    }
}

fn expect_end(rest: &[&Token], kind: ErrorKind) -> ParseResult<()> {
    match rest.first() {
        Some(token) => Err(ParseError::new(
            kind,
            format!("unexpected {} after value", token.describe()),
            token.location,
        )),
        None => Ok(()),
    }
}

fn font_value(property: &str, token: &Token) -> ParseError {
    ParseError::new(
        ErrorKind::UnexpectedToken,
        format!("unexpected {} in \"{}\"", token.describe(), property),
        token.location,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{RawRule, tokenize};

    fn declaration(css: &str) -> Declaration {
        let sheet = tokenize(&format!("button {{ {} }}", css));
        assert!(sheet.errors.is_empty(), "{:?}", sheet.errors);
        match sheet.rules.into_iter().next() {
            Some(RawRule::Qualified { declarations, .. }) => {
                declarations.into_iter().next().unwrap()
            }
            other => panic!("expected a qualified rule, got {:?}", other),
        }
    }

    fn compile_with(css: &str, assets: &mut AssetRegistry) -> ParseResult<Compiled> {
        let mut ctx = CompileContext {
            assets,
            selector: "button",
            state: StateName::Normal,
        };
        compile(&declaration(css), &mut ctx)
    }

    fn compile_one(css: &str) -> ParseResult<Compiled> {
        compile_with(css, &mut AssetRegistry::new())
    }

    fn property(css: &str) -> Property {
        match compile_one(css).unwrap() {
            Compiled::Property(p) => p,
            other => panic!("expected a property, got {:?}", other),
        }
    }

    fn texture(css: &str) -> Texture {
        match property(css) {
            Property::Texture(t) => t,
            other => panic!("expected a texture, got {:?}", other),
        }
    }

    fn error(css: &str) -> ParseError {
        compile_one(css).unwrap_err()
    }

    #[test]
    fn hex_colors() {
        assert_eq!(
            property("color: #fff;"),
            Property::Color(Color::rgba(1.0, 1.0, 1.0, 1.0))
        );
        assert_eq!(
            property("background-color: #336699;"),
            Property::Color(Color::rgba(0.2, 0.4, 0.6, 1.0))
        );
    }

    #[test]
    fn rgba_forms_agree() {
        let from_hex = property("color: rgba(#fff, 0.5);");
        let from_numbers = property("color: rgba(1, 1, 1, 0.5);");
        assert_eq!(from_hex, from_numbers);
        assert_eq!(from_hex, Property::Color(Color::rgba(1.0, 1.0, 1.0, 0.5)));
    }

    #[test]
    fn malformed_colors() {
        assert_eq!(error("color: #abcd;").kind, ErrorKind::MalformedColor);
        assert_eq!(error("color: rgba(1, 1, 0.5);").kind, ErrorKind::MalformedColor);
        assert_eq!(error("color: rgba(#fff);").kind, ErrorKind::MalformedColor);
        assert_eq!(error("color: rgba(255, 0, 0, 1);").kind, ErrorKind::MalformedColor);
        assert_eq!(error("color: red;").kind, ErrorKind::MalformedColor);
        assert_eq!(error("color: #fff #000;").kind, ErrorKind::MalformedColor);
    }

    #[test]
    fn float_requires_pixels() {
        assert_eq!(property("width: 12.5px;"), Property::Float(12.5));
        assert_eq!(property("padding-left: 0.1px;"), Property::Float(0.1));

        let err = error("height: 2em;");
        assert_eq!(err.kind, ErrorKind::MalformedDimension);
        assert_eq!(error("height: 2;").kind, ErrorKind::MalformedDimension);
    }

    #[test]
    fn unknown_property_names_the_offender() {
        let err = error("foo: bar;");
        assert_eq!(err.kind, ErrorKind::UnknownProperty);
        assert_eq!(err.message, "unknown property \"foo\"");
        assert_eq!((err.line, err.column), (1, 10));
    }

    #[test]
    fn plain_texture_sources() {
        let t = texture("background-image: url(img/knob.tga);");
        assert_eq!(
            t.source,
            AssetSource::Embedded {
                path: "img/knob.tga".into(),
                identifier: "IMG_KNOB_TGA".into(),
            }
        );
        assert_eq!(t.border, Border::default());
        assert!(t.flags.is_empty());

        let t = texture("background-image: extern(\"/usr/share/knob.tga\");");
        assert_eq!(
            t.source,
            AssetSource::External {
                path: "/usr/share/knob.tga".into()
            }
        );
    }

    #[test]
    fn textures_register_assets() {
        let mut assets = AssetRegistry::new();
        compile_with("background-image: url(a.tga);", &mut assets).unwrap();
        compile_with("background-image: extern(\"b.tga\");", &mut assets).unwrap();

        assert_eq!(assets.embedded().len(), 1);
        assert_eq!(assets.external().len(), 1);
        assert_eq!(
            assets.embedded()[0].owner,
            AssetOwner::Property {
                selector: "button".into(),
                state: StateName::Normal,
                property: "background-image".into(),
            }
        );
    }

    #[test]
    fn border_slice_expansion() {
        assert_eq!(texture("border-image: url(a.tga) 2px;").border, Border::uniform(2.0));
        assert_eq!(
            texture("border-image: url(a.tga) 2px 4px;").border,
            Border::new(4.0, 2.0, 4.0, 2.0)
        );
        assert_eq!(
            texture("border-image: url(a.tga) 1px 2px 3px;").border,
            Border::new(1.0, 2.0, 3.0, 2.0)
        );
        assert_eq!(
            texture("border-image: url(a.tga) 1px 2px 3px 4px;").border,
            Border::new(1.0, 2.0, 3.0, 4.0)
        );
    }

    #[test]
    fn border_fill_and_repeat() {
        let t = texture("border-image: url(a.tga) 3px fill repeat-x;");
        assert_eq!(t.flags, TextureFlags::FILL | TextureFlags::REPEAT_X);

        let t = texture("border-image: url(a.tga) 3px repeat;");
        assert_eq!(t.flags, TextureFlags::REPEAT_X | TextureFlags::REPEAT_Y);
    }

    #[test]
    fn border_errors() {
        assert_eq!(
            error("border-image: url(a.tga) 2px 50%;").kind,
            ErrorKind::MalformedTextureReference
        );
        assert_eq!(
            error("border-image: url(a.tga) 2em;").kind,
            ErrorKind::MalformedDimension
        );
        assert_eq!(
            error("border-image: url(a.tga) 1px 1px 1px 1px 1px;").kind,
            ErrorKind::MalformedDimension
        );
        assert_eq!(
            error("background-image: url(a.tga) 2px;").kind,
            ErrorKind::MalformedTextureReference
        );
    }

    #[test]
    fn bad_texture_functions() {
        let err = error("background-image: load(\"a.tga\");");
        assert_eq!(err.kind, ErrorKind::MalformedTextureReference);
        assert!(err.message.contains("embed(), extern(), and url()"));
    }

    #[test]
    fn font_fields_are_deferred() {
        assert_eq!(
            compile_one("font-family: \"DejaVu Sans\";").unwrap(),
            Compiled::Font(FontField::Family("DejaVu Sans".into()))
        );
        assert_eq!(
            compile_one("font-family: DejaVu Sans;").unwrap(),
            Compiled::Font(FontField::Family("DejaVu Sans".into()))
        );
        assert_eq!(
            compile_one("font-size: 12pt;").unwrap(),
            Compiled::Font(FontField::Size(12.0))
        );
        assert_eq!(
            compile_one("font-weight: 700;").unwrap(),
            Compiled::Font(FontField::Weight("700".into()))
        );
        assert_eq!(
            compile_one("-rtb-font-lcd-gamma: 1.8;").unwrap(),
            Compiled::Font(FontField::Gamma(1.8))
        );
        assert_eq!(error("font-size: big;").kind, ErrorKind::UnexpectedToken);
    }

    #[test]
    fn vocabulary_is_closed() {
        assert!(is_known_property("border-radius"));
        assert!(is_known_property("-rtb-font-lcd-gamma"));
        assert!(!is_known_property("font"));
        assert!(!is_known_property("margin"));
    }
}
