//! Stylesheets and the at-rule records they own.

mod font_face;
mod namespace;
mod stylesheet;

pub use font_face::FontFace;
pub use namespace::NamespaceBinding;
pub use stylesheet::Stylesheet;
