//! Per-selector state tables.
//!
//! A [`Style`] holds one [`StyleState`] for each of the four interaction
//! states. States are independent: nothing is merged from `normal` into the
//! others, the toolkit decides on fallbacks when it draws.

use super::property::{self, CompileContext, Compiled, FontField, Property};
use super::StateName;
use crate::assets::AssetRegistry;
use crate::parser::{Declaration, ParseResult};
use crate::types::FontDescriptor;

/// Properties declared for one state, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleState {
    properties: Vec<(String, Property)>,
    font: FontDescriptor,
}

impl StyleState {
    /// Create an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property.
    ///
    /// A property that is already present keeps its position and takes the
    /// new value.
    pub fn set(&mut self, name: impl Into<String>, value: Property) {
        let name = name.into();
        match self.properties.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.properties.push((name, value)),
        }
    }

    /// Look up a property by name.
    pub fn get(&self, name: &str) -> Option<&Property> {
        self.properties
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, p)| p)
    }

    /// Properties in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &Property)> {
        self.properties.iter().map(|(n, p)| (n.as_str(), p))
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Whether no properties were declared.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Font fields collected so far.
    pub fn font_descriptor(&self) -> &FontDescriptor {
        &self.font
    }

    /// Compile a declaration block into this state.
    pub(crate) fn apply(
        &mut self,
        declarations: &[Declaration],
        ctx: &mut CompileContext<'_>,
    ) -> ParseResult<()> {
        for decl in declarations {
            match property::compile(decl, ctx)? {
                Compiled::Property(value) => self.set(decl.name.as_str(), value),
                Compiled::Font(field) => self.set_font_field(field),
            }
        }
        Ok(())
    }

    fn set_font_field(&mut self, field: FontField) {
        match field {
            FontField::Family(family) => self.font.family = Some(family),
            FontField::Weight(weight) => self.font.weight = Some(weight),
            FontField::Size(size) => self.font.size = Some(size),
            FontField::Gamma(gamma) => self.font.gamma = gamma,
        }
    }

    /// Materialize the `font` property if a family was declared.
    pub(crate) fn assemble_font(&mut self) {
        if let Some(font) = self.font.assemble() {
            self.set("font", Property::Font(font));
        }
    }
}

/// All four state tables for one selector key.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    key: String,
    states: [StyleState; 4],
}

impl Style {
    /// Create a style with four empty states.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            states: Default::default(),
        }
    }

    /// The selector key this style applies to.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// One state's table.
    pub fn state(&self, state: StateName) -> &StyleState {
        &self.states[state.index()]
    }

    /// All states in enumeration order.
    pub fn states(&self) -> impl Iterator<Item = (StateName, &StyleState)> {
        StateName::ALL.into_iter().zip(self.states.iter())
    }

    /// States to advertise: `normal`, plus every state holding properties.
    pub fn available_states(&self) -> impl Iterator<Item = StateName> + '_ {
        self.states()
            .filter(|(name, state)| *name == StateName::Normal || !state.is_empty())
            .map(|(name, _)| name)
    }

    /// Compile a declaration block into one state.
    pub fn add_state(
        &mut self,
        state: StateName,
        declarations: &[Declaration],
        assets: &mut AssetRegistry,
    ) -> ParseResult<()> {
        tracing::debug!(
            selector = %self.key,
            %state,
            declarations = declarations.len(),
            "adding style state"
        );

        let mut ctx = CompileContext {
            assets,
            selector: &self.key,
            state,
        };
        self.states[state.index()].apply(declarations, &mut ctx)
    }

    /// Finish every state; called once after the whole document is parsed.
    pub fn done_parsing(&mut self) {
        for state in &mut self.states {
            state.assemble_font();
        }
    }
}
