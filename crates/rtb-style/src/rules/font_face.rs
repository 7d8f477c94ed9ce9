//! `@font-face` families.

use crate::assets::AssetSource;

/// One font family and the source of each declared weight.
#[derive(Debug, Clone, PartialEq)]
pub struct FontFace {
    family: String,
    weights: Vec<(String, AssetSource)>,
}

impl FontFace {
    /// Create a family with no weights.
    pub fn new(family: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            weights: vec![],
        }
    }

    /// Family name.
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Add a weight, replacing any earlier source for the same weight.
    pub fn add_weight(&mut self, weight: impl Into<String>, source: AssetSource) {
        let weight = weight.into();
        match self.weights.iter_mut().find(|(w, _)| *w == weight) {
            Some((_, slot)) => {
                tracing::warn!(family = %self.family, %weight, "font weight declared twice");
                *slot = source;
            }
            None => self.weights.push((weight, source)),
        }
    }

    /// Source for a weight.
    pub fn weight(&self, weight: &str) -> Option<&AssetSource> {
        self.weights
            .iter()
            .find(|(w, _)| w == weight)
            .map(|(_, s)| s)
    }

    /// Weights in declaration order.
    pub fn weights(&self) -> impl Iterator<Item = (&str, &AssetSource)> {
        self.weights.iter().map(|(w, s)| (w.as_str(), s))
    }
}
