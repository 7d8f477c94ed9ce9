//! Style property value types.
//!
//! These are the normalized payloads carried by compiled properties. Values
//! are normalized once, when they are built: colors always hold channels in
//! `[0, 1]` and borders always hold four sides, whatever form the source used.
//!
//! # Example
//!
//! ```
//! use rtb_style::types::{Border, Color};
//!
//! let color = Color::from_hex("#f80").unwrap();
//! assert_eq!(color.r, 1.0);
//! assert_eq!(color.a, 1.0);
//!
//! // Two slices pair up as (horizontal, vertical)
//! let border = Border::from_slices(&[2.0, 4.0]).unwrap();
//! assert_eq!((border.top, border.right, border.bottom, border.left), (4.0, 2.0, 4.0, 2.0));
//! ```

use bitflags::bitflags;

/// Default LCD gamma applied to fonts that do not set one.
pub const DEFAULT_FONT_GAMMA: f64 = 2.2;

/// Default font weight name.
pub const DEFAULT_FONT_WEIGHT: &str = "normal";

/// An RGBA color with channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red channel.
    pub r: f64,
    /// Green channel.
    pub g: f64,
    /// Blue channel.
    pub b: f64,
    /// Alpha channel.
    pub a: f64,
}

impl Default for Color {
    fn default() -> Self {
        Self::rgba(0.0, 0.0, 0.0, 1.0)
    }
}

impl Color {
    /// Create a color from normalized channels.
    pub fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rgb` or `#rrggbb` (the leading `#` is optional).
    ///
    /// Three-digit colors scale each digit by `1/15`, six-digit colors each
    /// pair by `1/255`. Alpha is `1.0`. Returns `None` for any other length
    /// or for non-hex digits.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }

        let value = u32::from_str_radix(digits, 16).ok()?;

        let (r, g, b, max) = match digits.len() {
            3 => ((value >> 8) & 0xF, (value >> 4) & 0xF, value & 0xF, 15.0),
            6 => ((value >> 16) & 0xFF, (value >> 8) & 0xFF, value & 0xFF, 255.0),
            _ => return None,
        };

        Some(Self::rgba(
            f64::from(r) / max,
            f64::from(g) / max,
            f64::from(b) / max,
            1.0,
        ))
    }

    /// Replace the alpha channel.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.a = alpha;
        self
    }

    /// Whether every channel lies in `[0, 1]`.
    pub fn is_normalized(&self) -> bool {
        [self.r, self.g, self.b, self.a]
            .iter()
            .all(|c| (0.0..=1.0).contains(c))
    }
}

/// Border slice insets (for 9-slice texture scaling), in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Border {
    /// Top inset.
    pub top: f64,
    /// Right inset.
    pub right: f64,
    /// Bottom inset.
    pub bottom: f64,
    /// Left inset.
    pub left: f64,
}

impl Border {
    /// Same inset on all four sides.
    pub fn uniform(value: f64) -> Self {
        Self::new(value, value, value, value)
    }

    /// Symmetric insets (vertical, horizontal).
    pub fn symmetric(vertical: f64, horizontal: f64) -> Self {
        Self::new(vertical, horizontal, vertical, horizontal)
    }

    /// Create from 4 values (top, right, bottom, left).
    pub fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Expand a 1-4 value slice list.
    ///
    /// - 1 value: all sides.
    /// - 2 values: `top = bottom = v1`, `right = left = v0`.
    /// - 3 values: `top = v0`, `right = left = v1`, `bottom = v2`.
    /// - 4 values: `top, right, bottom, left`.
    ///
    /// No slices means no inset. More than four is `None`.
    pub fn from_slices(slices: &[f64]) -> Option<Self> {
        match *slices {
            [] => Some(Self::default()),
            [v] => Some(Self::uniform(v)),
            [v0, v1] => Some(Self::symmetric(v1, v0)),
            [v0, v1, v2] => Some(Self::new(v0, v1, v2, v1)),
            [v0, v1, v2, v3] => Some(Self::new(v0, v1, v2, v3)),
            _ => None,
        }
    }

    /// The four sides in emission order.
    pub fn sides(&self) -> [f64; 4] {
        [self.top, self.right, self.bottom, self.left]
    }
}

bitflags! {
    /// How a texture is laid out over its target.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TextureFlags: u8 {
        /// Draw the center slice as well as the border.
        const FILL = 1 << 0;
        /// Tile horizontally instead of stretching.
        const REPEAT_X = 1 << 1;
        /// Tile vertically instead of stretching.
        const REPEAT_Y = 1 << 2;
    }
}

impl TextureFlags {
    /// Parse one `repeat*` keyword.
    pub fn from_repeat_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "repeat" => Some(Self::REPEAT_X | Self::REPEAT_Y),
            "repeat-x" => Some(Self::REPEAT_X),
            "repeat-y" => Some(Self::REPEAT_Y),
            _ => None,
        }
    }
}

/// Font fields accumulated on a state before the `font` property exists.
#[derive(Debug, Clone, PartialEq)]
pub struct FontDescriptor {
    /// Font family; the font property is only built once this is set.
    pub family: Option<String>,
    /// Weight name, as written.
    pub weight: Option<String>,
    /// Size, unit ignored.
    pub size: Option<f64>,
    /// LCD gamma.
    pub gamma: f64,
}

impl Default for FontDescriptor {
    fn default() -> Self {
        Self {
            family: None,
            weight: None,
            size: None,
            gamma: DEFAULT_FONT_GAMMA,
        }
    }
}

impl FontDescriptor {
    /// Whether any font field was declared.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Build the final font, if a family was declared.
    pub fn assemble(&self) -> Option<Font> {
        let family = self.family.clone()?;
        Some(Font {
            family,
            weight: self
                .weight
                .clone()
                .unwrap_or_else(|| DEFAULT_FONT_WEIGHT.to_string()),
            size: self.size.unwrap_or(0.0),
            gamma: self.gamma,
        })
    }
}

/// A fully assembled font reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    /// Font family name.
    pub family: String,
    /// Weight name.
    pub weight: String,
    /// Size; `0` leaves the choice to the toolkit.
    pub size: f64,
    /// LCD gamma.
    pub gamma: f64,
}
