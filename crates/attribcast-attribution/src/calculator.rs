//! Attribution calculator.
//!
//! Applies a model to a path and conversion value, producing per-touchpoint
//! credits in integer minor units. The calculator is a pure function of
//! (path, value, model); it owns no persistent state.

use crate::models;
use crate::types::{AttributionPath, Credit};
use attribcast_core::config::EngineConfig;
use attribcast_core::model::ModelKind;

/// Converts model weights into exact minor-unit credits.
#[derive(Debug, Clone)]
pub struct AttributionCalculator {
    config: EngineConfig,
}

impl AttributionCalculator {
    /// Create a calculator with the given configuration.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Distribute a conversion value across a path under a model.
    ///
    /// Invariants: every touchpoint on the path receives a credit >= 0 and
    /// the amounts sum to `value_minor_units` exactly. Reconciliation uses
    /// largest-remainder apportionment: each weighted share is floored, and
    /// the leftover minor units (always fewer than the path length) go one
    /// at a time to the shares with the largest fractional parts, path order
    /// on ties. Floors never oversubscribe the value, so no credit can go
    /// negative on small values the way naive per-share rounding does.
    #[must_use]
    pub fn distribute(
        &self,
        kind: ModelKind,
        path: &AttributionPath,
        value_minor_units: i64,
    ) -> Vec<Credit> {
        let n = path.len();
        let weights = match kind {
            ModelKind::FirstTouch => models::first_touch(n),
            ModelKind::LastTouch => models::last_touch(n),
            ModelKind::Linear => models::linear(n),
            ModelKind::TimeDecay => models::time_decay(path, self.config.half_life_days),
            ModelKind::PositionBased => models::position_based(n),
        };

        let shares: Vec<f64> = weights
            .iter()
            .map(|w| w * value_minor_units as f64)
            .collect();
        let mut amounts: Vec<i64> = shares.iter().map(|s| s.floor() as i64).collect();

        let mut leftover = value_minor_units - amounts.iter().sum::<i64>();
        let mut by_fraction: Vec<usize> = (0..n).collect();
        by_fraction.sort_by(|&a, &b| {
            let fa = shares[a] - shares[a].floor();
            let fb = shares[b] - shares[b].floor();
            fb.total_cmp(&fa).then(a.cmp(&b))
        });
        for &i in &by_fraction {
            if leftover == 0 {
                break;
            }
            amounts[i] += 1;
            leftover -= 1;
        }

        path.touchpoints
            .iter()
            .zip(weights)
            .zip(amounts)
            .map(|((t, weight), amount_minor_units)| Credit {
                touchpoint_id: t.id,
                amount_minor_units,
                weight,
            })
            .collect()
    }
}
