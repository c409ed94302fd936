//! Credit weight functions for the five canonical models.
//!
//! Each function is pure: given an ordered path (oldest first), it returns
//! one weight per touchpoint, summing to 1.0 for any non-empty path. The
//! calculator converts weights into exact minor-unit amounts.

use crate::types::AttributionPath;

/// First-touch: the full weight to the oldest touchpoint.
#[must_use]
pub fn first_touch(n: usize) -> Vec<f64> {
    let mut weights = vec![0.0; n];
    if let Some(first) = weights.first_mut() {
        *first = 1.0;
    }
    weights
}

/// Last-touch: the full weight to the touchpoint closest to conversion.
#[must_use]
pub fn last_touch(n: usize) -> Vec<f64> {
    let mut weights = vec![0.0; n];
    if let Some(last) = weights.last_mut() {
        *last = 1.0;
    }
    weights
}

/// Linear: an equal share to every touchpoint.
#[must_use]
pub fn linear(n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    vec![1.0 / n as f64; n]
}

/// Time-decay: `2^(-Δdays / half_life)` per touchpoint, normalized.
///
/// Δdays is the distance from the touchpoint to the conversion, so for a
/// positive half-life a touchpoint closer to the conversion always earns
/// strictly more than a farther one.
#[must_use]
pub fn time_decay(path: &AttributionPath, half_life_days: f64) -> Vec<f64> {
    if path.is_empty() {
        return Vec::new();
    }
    let raw: Vec<f64> = path
        .touchpoints
        .iter()
        .map(|t| {
            let delta_days =
                (path.conversion_at - t.timestamp).num_seconds() as f64 / 86_400.0;
            2f64.powf(-delta_days / half_life_days)
        })
        .collect();
    let total: f64 = raw.iter().sum();
    raw.into_iter().map(|w| w / total).collect()
}

/// Position-based (U-shaped): 40% to the first touchpoint, 40% to the last,
/// 20% split equally among the interior. A single touchpoint takes 100%;
/// with two touchpoints the middle share folds into the endpoints for a
/// 50/50 split.
#[must_use]
pub fn position_based(n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![1.0],
        2 => vec![0.5, 0.5],
        _ => {
            let interior = 0.2 / (n - 2) as f64;
            let mut weights = vec![interior; n];
            weights[0] = 0.4;
            weights[n - 1] = 0.4;
            weights
        }
    }
}
