//! Emitter settings.

/// Default name of the emitted style array.
pub const DEFAULT_VAR_NAME: &str = "default_style";

/// Settings for [`Emitter`](super::Emitter).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    /// Name of the `struct rtb_style` array.
    pub var_name: String,
    /// Asset headers are included by the surrounding translation unit, so no
    /// `#include` lines are written.
    pub forward_declared: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            var_name: DEFAULT_VAR_NAME.to_string(),
            forward_declared: false,
        }
    }
}

impl EmitOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the array name.
    pub fn with_var_name(mut self, var_name: impl Into<String>) -> Self {
        self.var_name = var_name.into();
        self
    }

    /// Skip include lines.
    pub fn forward_declared(mut self, forward_declared: bool) -> Self {
        self.forward_declared = forward_declared;
        self
    }
}
