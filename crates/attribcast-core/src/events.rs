//! Touchpoint and conversion event records.
//!
//! These mirror the input contract of the ingestion layer: events are created
//! externally and consumed read-only here. Both record types carry the raw
//! identity signals (session, device, authenticated user, IP/user-agent hash)
//! that feed cross-device identity resolution.

use crate::error::{AttributionError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Event Records
// ============================================================================

/// Immutable record of one exposure to a sponsor promotion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchpointEvent {
    /// Event ID.
    pub id: Uuid,
    /// Campaign the promotion belongs to.
    pub campaign_id: Uuid,
    /// Episode the promotion aired in.
    pub episode_id: Uuid,
    /// Podcast the episode belongs to.
    pub podcast_id: Uuid,
    /// Exposure timestamp.
    pub timestamp: DateTime<Utc>,
    /// Listening channel/platform (e.g. "apple_podcasts", "spotify").
    pub channel: String,
    /// Session identifier, if the platform reported one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Device fingerprint, if available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    /// Authenticated user id, if the listener was signed in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Hash of IP + user agent, if available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_hash: Option<String>,
}

impl TouchpointEvent {
    /// Validate required identifiers.
    pub fn validate(&self) -> Result<()> {
        if self.id.is_nil() {
            return Err(AttributionError::malformed(self.id, "missing event id"));
        }
        if self.campaign_id.is_nil() {
            return Err(AttributionError::malformed(self.id, "missing campaign id"));
        }
        if self.episode_id.is_nil() {
            return Err(AttributionError::malformed(self.id, "missing episode id"));
        }
        Ok(())
    }

    /// Returns true if the event carries at least one identity signal.
    #[must_use]
    pub fn has_identity_signal(&self) -> bool {
        self.user_id.is_some()
            || self.session_id.is_some()
            || self.device_id.is_some()
            || self.ip_hash.is_some()
    }
}

/// Immutable record of a monetized action being credited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionEvent {
    /// Event ID.
    pub id: Uuid,
    /// Campaign the conversion is credited against.
    pub campaign_id: Uuid,
    /// Conversion timestamp.
    pub timestamp: DateTime<Utc>,
    /// Monetary value in currency minor units (e.g. cents).
    pub value_minor_units: i64,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Session identifier, if available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Device fingerprint, if available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    /// Authenticated user id, if available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Hash of IP + user agent, if available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_hash: Option<String>,
    /// Explicit attribution hint (e.g. unique promo code used).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promo_code: Option<String>,
}

impl ConversionEvent {
    /// Validate required identifiers and value.
    pub fn validate(&self) -> Result<()> {
        if self.id.is_nil() {
            return Err(AttributionError::malformed(self.id, "missing event id"));
        }
        if self.campaign_id.is_nil() {
            return Err(AttributionError::malformed(self.id, "missing campaign id"));
        }
        if self.value_minor_units < 0 {
            return Err(AttributionError::malformed(
                self.id,
                "negative conversion value",
            ));
        }
        if self.currency.is_empty() {
            return Err(AttributionError::malformed(self.id, "missing currency"));
        }
        Ok(())
    }

    /// Returns true if the event carries at least one identity signal.
    #[must_use]
    pub fn has_identity_signal(&self) -> bool {
        self.user_id.is_some()
            || self.session_id.is_some()
            || self.device_id.is_some()
            || self.ip_hash.is_some()
    }
}

// ============================================================================
// Batch Container
// ============================================================================

/// An event excluded at the batch boundary, with the exclusion reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedEvent {
    /// Identifier of the rejected event.
    pub id: Uuid,
    /// Why the event was rejected.
    pub reason: String,
}

/// A bounded batch of events within one lookback window, as handed over by
/// the ingestion layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventBatch {
    /// Touchpoint exposures, in ingestion stream order.
    pub touchpoints: Vec<TouchpointEvent>,
    /// Conversions to attribute.
    pub conversions: Vec<ConversionEvent>,
}

impl EventBatch {
    /// Create a batch from pre-fetched events.
    #[must_use]
    pub fn new(touchpoints: Vec<TouchpointEvent>, conversions: Vec<ConversionEvent>) -> Self {
        Self {
            touchpoints,
            conversions,
        }
    }

    /// Total number of events in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.touchpoints.len() + self.conversions.len()
    }

    /// Returns true if the batch holds no events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.touchpoints.is_empty() && self.conversions.is_empty()
    }

    /// Split the batch into well-formed events and rejected ones.
    ///
    /// Malformed events never abort the batch; they are returned with their
    /// reasons so the caller can surface them. Insertion order of surviving
    /// events is preserved, which keeps the path builder's timestamp
    /// tie-break deterministic.
    #[must_use]
    pub fn sanitize(self) -> (EventBatch, Vec<RejectedEvent>) {
        let mut rejected = Vec::new();

        let touchpoints = self
            .touchpoints
            .into_iter()
            .filter(|t| match t.validate() {
                Ok(()) => true,
                Err(err) => {
                    rejected.push(RejectedEvent {
                        id: t.id,
                        reason: err.to_string(),
                    });
                    false
                }
            })
            .collect();

        let conversions = self
            .conversions
            .into_iter()
            .filter(|c| match c.validate() {
                Ok(()) => true,
                Err(err) => {
                    rejected.push(RejectedEvent {
                        id: c.id,
                        reason: err.to_string(),
                    });
                    false
                }
            })
            .collect();

        (
            EventBatch {
                touchpoints,
                conversions,
            },
            rejected,
        )
    }
}
