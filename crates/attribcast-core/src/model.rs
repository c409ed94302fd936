//! Attribution model kinds.
//!
//! The set of supported models is closed: five canonical credit-distribution
//! strategies dispatched through a single match in the calculator. Custom
//! formulas beyond these are out of scope.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named attribution model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// 100% of the credit to the first touchpoint in the path.
    FirstTouch,
    /// 100% of the credit to the last touchpoint before conversion.
    LastTouch,
    /// Equal share to every touchpoint.
    Linear,
    /// Exponential decay by distance from conversion with a configurable
    /// half-life; touchpoints closer to the conversion earn strictly more.
    TimeDecay,
    /// U-shaped: 40% to the first touchpoint, 40% to the last, 20% split
    /// equally among interior touchpoints.
    PositionBased,
}

impl ModelKind {
    /// All supported models.
    pub const ALL: &'static [ModelKind] = &[
        ModelKind::FirstTouch,
        ModelKind::LastTouch,
        ModelKind::Linear,
        ModelKind::TimeDecay,
        ModelKind::PositionBased,
    ];

    /// Returns the model name as used in the registry and on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ModelKind::FirstTouch => "first_touch",
            ModelKind::LastTouch => "last_touch",
            ModelKind::Linear => "linear",
            ModelKind::TimeDecay => "time_decay",
            ModelKind::PositionBased => "position_based",
        }
    }

    /// Parse a model from its registry name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "first_touch" => Some(ModelKind::FirstTouch),
            "last_touch" => Some(ModelKind::LastTouch),
            "linear" => Some(ModelKind::Linear),
            "time_decay" => Some(ModelKind::TimeDecay),
            "position_based" => Some(ModelKind::PositionBased),
            _ => None,
        }
    }

    /// Returns true if the model depends on touchpoint timestamps rather
    /// than path positions alone.
    #[must_use]
    pub const fn is_temporal(&self) -> bool {
        matches!(self, ModelKind::TimeDecay)
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_count() {
        assert_eq!(ModelKind::ALL.len(), 5);
    }

    #[test]
    fn test_parse_round_trip() {
        for kind in ModelKind::ALL {
            assert_eq!(ModelKind::parse(kind.as_str()), Some(*kind));
        }
        assert_eq!(ModelKind::parse("w_shaped"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(ModelKind::TimeDecay.to_string(), "time_decay");
        assert_eq!(ModelKind::PositionBased.to_string(), "position_based");
    }

    #[test]
    fn test_serde_names_match_registry_names() {
        let json = serde_json::to_string(&ModelKind::FirstTouch).unwrap();
        assert_eq!(json, "\"first_touch\"");
    }

    #[test]
    fn test_temporal_classification() {
        assert!(ModelKind::TimeDecay.is_temporal());
        assert!(!ModelKind::Linear.is_temporal());
    }
}
