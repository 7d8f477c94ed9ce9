//! C struct-initializer output for compiled stylesheets.

mod emitter;
mod options;

pub use emitter::{Emitter, emit};
pub use options::{DEFAULT_VAR_NAME, EmitOptions};
