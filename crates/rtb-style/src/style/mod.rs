//! Style states, typed properties and the per-selector cascade.

mod cascade;
mod property;
mod state;

pub use cascade::{Style, StyleState};
pub(crate) use property::family;
pub use property::{
    CompileContext, Compiled, FontField, Property, Texture, compile, is_known_property,
};
pub use state::{StateName, UnknownState};
