//! Normalized style value types.

mod value;

pub use value::{
    Border, Color, DEFAULT_FONT_GAMMA, DEFAULT_FONT_WEIGHT, Font, FontDescriptor, TextureFlags,
};
