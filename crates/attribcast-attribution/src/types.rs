//! Attribution domain types and data structures.

use attribcast_core::events::{RejectedEvent, TouchpointEvent};
use attribcast_core::model::ModelKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Identity Types
// ============================================================================

/// A set of events believed to share a real-world actor.
///
/// Built fresh per resolution run, never mutated; a re-computation supersedes
/// earlier groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityGroup {
    /// Identifiers of the member events (touchpoints and conversions).
    pub event_ids: Vec<Uuid>,
    /// Match confidence in [0, 1]: the minimum edge strength inside the
    /// group (worst-case chain). Singletons are 1.0.
    pub confidence: f64,
}

impl IdentityGroup {
    /// Returns true if the group contains the given event.
    #[must_use]
    pub fn contains(&self, event_id: Uuid) -> bool {
        self.event_ids.contains(&event_id)
    }

    /// Number of member events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.event_ids.len()
    }

    /// Returns true if the group has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.event_ids.is_empty()
    }
}

// ============================================================================
// Path Types
// ============================================================================

/// Ordered, deduplicated, time-windowed sequence of touchpoints preceding
/// one conversion.
///
/// Invariant: touchpoints are sorted oldest to newest, every timestamp is
/// strictly before `conversion_at`, and every member belongs to the same
/// identity group as the conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributionPath {
    /// The conversion this path leads to.
    pub conversion_id: Uuid,
    /// Conversion timestamp; the exclusive upper bound of the path.
    pub conversion_at: DateTime<Utc>,
    /// Touchpoints, oldest first.
    pub touchpoints: Vec<TouchpointEvent>,
    /// Confidence of the identity group the path was built from.
    pub identity_confidence: f64,
}

impl AttributionPath {
    /// Number of touchpoints on the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.touchpoints.len()
    }

    /// Returns true if the path has no touchpoints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.touchpoints.is_empty()
    }

    /// The earliest touchpoint.
    #[must_use]
    pub fn first(&self) -> Option<&TouchpointEvent> {
        self.touchpoints.first()
    }

    /// The touchpoint closest to the conversion.
    #[must_use]
    pub fn last(&self) -> Option<&TouchpointEvent> {
        self.touchpoints.last()
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// Credit assigned to one touchpoint by a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credit {
    /// The credited touchpoint.
    pub touchpoint_id: Uuid,
    /// Credit amount in currency minor units.
    pub amount_minor_units: i64,
    /// Weight fraction of the conversion value, in [0, 1].
    pub weight: f64,
}

/// A computed attribution for one conversion under one model.
///
/// Immutable; recomputation produces a new result rather than mutating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributionResult {
    /// The attributed conversion.
    pub conversion_id: Uuid,
    /// The model that produced the credits.
    pub model: ModelKind,
    /// Per-touchpoint credits, in path order. Sums exactly to the
    /// conversion value in minor units.
    pub credits: Vec<Credit>,
    /// Advisory confidence in [0, 1]; never alters credit amounts.
    pub confidence: f64,
    /// When the result was computed.
    pub computed_at: DateTime<Utc>,
}

impl AttributionResult {
    /// Total credited amount in minor units.
    #[must_use]
    pub fn total_minor_units(&self) -> i64 {
        self.credits.iter().map(|c| c.amount_minor_units).sum()
    }
}

/// Outcome of attributing a single conversion.
///
/// A conversion with zero qualifying touchpoints is a valid, reportable
/// zero-credit outcome, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AttributionOutcome {
    /// Credits were computed.
    Attributed(AttributionResult),
    /// No qualifying touchpoint preceded the conversion.
    NoPath {
        /// The conversion with an empty path.
        conversion_id: Uuid,
    },
}

impl AttributionOutcome {
    /// Returns true if credits were computed.
    #[must_use]
    pub fn is_attributed(&self) -> bool {
        matches!(self, AttributionOutcome::Attributed(_))
    }

    /// The computed result, if any.
    #[must_use]
    pub fn result(&self) -> Option<&AttributionResult> {
        match self {
            AttributionOutcome::Attributed(result) => Some(result),
            AttributionOutcome::NoPath { .. } => None,
        }
    }

    /// The conversion this outcome belongs to.
    #[must_use]
    pub fn conversion_id(&self) -> Uuid {
        match self {
            AttributionOutcome::Attributed(result) => result.conversion_id,
            AttributionOutcome::NoPath { conversion_id } => *conversion_id,
        }
    }
}

/// A conversion whose pipeline failed, with the reason surfaced for
/// operator visibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionFailure {
    /// The unattributable conversion.
    pub conversion_id: Uuid,
    /// Failure reason.
    pub reason: String,
}

/// Report for one batch attribution run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    /// Per-conversion outcomes, in batch order.
    pub outcomes: Vec<AttributionOutcome>,
    /// Conversions that could not be processed.
    pub failures: Vec<ConversionFailure>,
    /// Events excluded as malformed during resolution.
    pub rejected_events: Vec<RejectedEvent>,
}

impl BatchReport {
    /// Number of conversions that received credits.
    #[must_use]
    pub fn attributed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_attributed()).count()
    }

    /// Number of conversions with no qualifying touchpoints.
    #[must_use]
    pub fn no_path_count(&self) -> usize {
        self.outcomes.len() - self.attributed_count()
    }

    /// Number of conversions whose pipeline failed.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }
}

// ============================================================================
// Validation Types
// ============================================================================

/// The independently verified true attribution for one historical path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GroundTruth {
    /// The touchpoint known to have driven the conversion, typically
    /// identified by a unique promo code.
    ConvertingTouchpoint {
        /// The true touchpoint.
        touchpoint_id: Uuid,
    },
    /// An exact known credit split.
    ExactSplit {
        /// Expected per-touchpoint amounts in minor units.
        shares: Vec<ExactShare>,
    },
}

/// One expected share of an exact ground-truth split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExactShare {
    /// The touchpoint expected to receive the amount.
    pub touchpoint_id: Uuid,
    /// Expected amount in minor units.
    pub amount_minor_units: i64,
}

/// One historical path with a known true outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundTruthSample {
    /// The replayed path.
    pub path: AttributionPath,
    /// Conversion value in minor units.
    pub value_minor_units: i64,
    /// The verified truth.
    pub truth: GroundTruth,
}

/// Per-sample validation detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleError {
    /// The conversion the sample belongs to.
    pub conversion_id: Uuid,
    /// For plurality samples: whether the model put the plurality of credit
    /// on the true touchpoint.
    pub hit: Option<bool>,
    /// For exact-split samples: mean absolute error in minor units.
    pub abs_error_minor_units: Option<f64>,
}

/// Accuracy of one model over one validation run.
///
/// Used only for reporting; never feeds back automatically into live
/// model selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// The validated model.
    pub model: ModelKind,
    /// Number of ground-truth samples replayed.
    pub sample_size: usize,
    /// Fraction of plurality samples where the model credited the true
    /// touchpoint with the largest share.
    pub accuracy: f64,
    /// Mean absolute error over exact-split samples, if any were present.
    pub mean_abs_error_minor_units: Option<f64>,
    /// Per-sample detail.
    pub per_sample: Vec<SampleError>,
    /// When the validation ran.
    pub generated_at: DateTime<Utc>,
}
