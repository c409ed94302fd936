//! Engine configuration.
//!
//! All tunables of the attribution pipeline live here: the lookback window,
//! path bounds, model parameters, identity signal strengths, and the
//! confidence scoring curve. Defaults match the documented behavior of the
//! engine; `validate` rejects configurations that would break invariants.

use crate::error::{AttributionError, Result};
use serde::{Deserialize, Serialize};

/// Edge strengths for identity signals, each in (0, 1].
///
/// A union of two events carries the strength of the signal connecting them;
/// a group's confidence is the minimum edge strength inside it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalStrengths {
    /// Shared authenticated user id. Deterministic.
    pub user: f64,
    /// Shared session id.
    pub session: f64,
    /// Shared device fingerprint or IP/user-agent hash within the
    /// fingerprint window.
    pub fingerprint: f64,
}

impl Default for SignalStrengths {
    fn default() -> Self {
        Self {
            user: 1.0,
            session: 0.9,
            fingerprint: 0.6,
        }
    }
}

/// Configuration for the attribution engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Lookback window before a conversion, in days.
    pub lookback_days: i64,
    /// Maximum touchpoints per path; oldest are truncated beyond this.
    pub max_path_length: usize,
    /// Half-life for the time-decay model, in days.
    pub half_life_days: f64,
    /// Identity signal edge strengths.
    pub signals: SignalStrengths,
    /// Maximum time delta for fingerprint-only matches, in seconds.
    pub fingerprint_window_secs: i64,
    /// Timestamp rounding granularity for exposure dedup, in seconds.
    pub dedup_granularity_secs: i64,
    /// Floor of the recency factor reached at the full lookback window.
    pub recency_floor: f64,
    /// Path length at which the path-length confidence factor saturates at 1.
    pub path_saturation: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lookback_days: 30,
            max_path_length: 20,
            half_life_days: 7.0,
            signals: SignalStrengths::default(),
            fingerprint_window_secs: 6 * 3600,
            dedup_granularity_secs: 60,
            recency_floor: 0.5,
            path_saturation: 5,
        }
    }
}

impl EngineConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.lookback_days <= 0 {
            return Err(AttributionError::invalid_config(
                "lookback_days must be positive",
            ));
        }
        if self.max_path_length == 0 {
            return Err(AttributionError::invalid_config(
                "max_path_length must be positive",
            ));
        }
        if !(self.half_life_days > 0.0) {
            return Err(AttributionError::invalid_config(
                "half_life_days must be positive",
            ));
        }
        for (name, strength) in [
            ("user", self.signals.user),
            ("session", self.signals.session),
            ("fingerprint", self.signals.fingerprint),
        ] {
            if !(strength > 0.0 && strength <= 1.0) {
                return Err(AttributionError::invalid_config(format!(
                    "signal strength '{name}' must be in (0, 1]"
                )));
            }
        }
        if self.fingerprint_window_secs <= 0 {
            return Err(AttributionError::invalid_config(
                "fingerprint_window_secs must be positive",
            ));
        }
        if self.dedup_granularity_secs <= 0 {
            return Err(AttributionError::invalid_config(
                "dedup_granularity_secs must be positive",
            ));
        }
        if !(0.0..=1.0).contains(&self.recency_floor) {
            return Err(AttributionError::invalid_config(
                "recency_floor must be in [0, 1]",
            ));
        }
        if self.path_saturation == 0 {
            return Err(AttributionError::invalid_config(
                "path_saturation must be positive",
            ));
        }
        Ok(())
    }

    /// Lookback window length in seconds.
    #[must_use]
    pub fn lookback_secs(&self) -> i64 {
        self.lookback_days * 86_400
    }
}
