//! Confidence scoring for computed attributions.
//!
//! The score is advisory metadata in [0, 1] attached to an attribution
//! result; it never alters credit amounts. It combines:
//! - the identity group's match confidence
//! - a path-length factor that approaches 1 as corroborating touchpoints
//!   accumulate, saturating at `path_saturation`
//! - a recency factor that decays linearly toward `recency_floor` as the gap
//!   between the last touchpoint and the conversion approaches the lookback
//!   window

use crate::types::AttributionPath;
use attribcast_core::config::EngineConfig;

/// Derives confidence scores for attribution results.
#[derive(Debug, Clone)]
pub struct ConfidenceScorer {
    config: EngineConfig,
}

impl ConfidenceScorer {
    /// Create a scorer with the given configuration.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Score one non-empty attribution path.
    #[must_use]
    pub fn score(&self, path: &AttributionPath) -> f64 {
        let identity = path.identity_confidence;
        let length_factor = self.path_length_factor(path.len());
        let recency_factor = self.recency_factor(path);
        (identity * length_factor * recency_factor).clamp(0.0, 1.0)
    }

    /// `min(1, n / saturation)`: more corroborating touchpoints, more trust.
    fn path_length_factor(&self, n: usize) -> f64 {
        (n as f64 / self.config.path_saturation as f64).min(1.0)
    }

    /// Linear decay from 1.0 at zero gap to the floor at the full lookback
    /// window, clamped at the floor.
    fn recency_factor(&self, path: &AttributionPath) -> f64 {
        let Some(last) = path.last() else {
            return self.config.recency_floor;
        };
        let gap_secs = (path.conversion_at - last.timestamp).num_seconds().max(0) as f64;
        let window_secs = self.config.lookback_secs() as f64;
        let fraction = (gap_secs / window_secs).clamp(0.0, 1.0);
        1.0 - (1.0 - self.config.recency_floor) * fraction
    }
}
