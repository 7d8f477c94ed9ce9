//! Selector resolution.

mod resolver;

pub use resolver::{SelectorKey, SelectorResolver};
