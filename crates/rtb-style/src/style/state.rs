//! The fixed set of widget interaction states.

use std::fmt;
use std::str::FromStr;

/// A widget interaction state a style can target.
///
/// The set is closed: every style carries exactly these four slots, in this
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StateName {
    /// Resting state; always populated.
    Normal,
    /// Keyboard focus.
    Focus,
    /// Pointer over the widget.
    Hover,
    /// Widget being pressed or dragged.
    Active,
}

impl StateName {
    /// All states in enumeration order.
    pub const ALL: [StateName; 4] = [Self::Normal, Self::Focus, Self::Hover, Self::Active];

    /// Name as written after `:` in a selector.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Focus => "focus",
            Self::Hover => "hover",
            Self::Active => "active",
        }
    }

    /// Slot index into a style's state table.
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// `RTB_DRAW_*` constant used as the state's array designator.
    pub fn draw_constant(&self) -> &'static str {
        match self {
            Self::Normal => "RTB_DRAW_NORMAL",
            Self::Focus => "RTB_DRAW_FOCUS",
            Self::Hover => "RTB_DRAW_HOVER",
            Self::Active => "RTB_DRAW_ACTIVE",
        }
    }

    /// `RTB_STYLE_*` flag ORed into a style's available-states mask.
    pub fn style_constant(&self) -> &'static str {
        match self {
            Self::Normal => "RTB_STYLE_NORMAL",
            Self::Focus => "RTB_STYLE_FOCUS",
            Self::Hover => "RTB_STYLE_HOVER",
            Self::Active => "RTB_STYLE_ACTIVE",
        }
    }
}

impl fmt::Display for StateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a selector names a state outside the fixed set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownState(pub String);

impl fmt::Display for UnknownState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" is not a valid state", self.0)
    }
}

impl std::error::Error for UnknownState {}

impl FromStr for StateName {
    type Err = UnknownState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| UnknownState(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_states() {
        for state in StateName::ALL {
            assert_eq!(state.as_str().parse::<StateName>(), Ok(state));
        }
    }

    #[test]
    fn reject_unknown_states() {
        let err = "pressed".parse::<StateName>().unwrap_err();
        assert_eq!(err.to_string(), "\"pressed\" is not a valid state");
        assert!("Hover".parse::<StateName>().is_err());
    }

    #[test]
    fn enumeration_order_is_stable() {
        let indices: Vec<_> = StateName::ALL.iter().map(StateName::index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        assert_eq!(StateName::Hover.draw_constant(), "RTB_DRAW_HOVER");
        assert_eq!(StateName::Active.style_constant(), "RTB_STYLE_ACTIVE");
    }
}
