//! `@namespace` bindings.

use crate::parser::Location;

/// A namespace declared with `@namespace [prefix] "<uri>";`.
///
/// A binding with a prefix is used by `prefix|name` selectors; one without
/// becomes the default namespace for every following rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceBinding {
    /// Namespace URI, prepended to selector keys as `<uri>.`.
    pub uri: String,
    /// Prefix, if one was declared.
    pub prefix: Option<String>,
    /// Where the rule appeared.
    pub location: Location,
}

impl NamespaceBinding {
    /// Create a binding.
    pub fn new(uri: impl Into<String>, prefix: Option<String>, location: Location) -> Self {
        Self {
            uri: uri.into(),
            prefix,
            location,
        }
    }
}
