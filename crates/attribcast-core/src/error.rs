//! Error types for the attribution engine.

use thiserror::Error;
use uuid::Uuid;

/// Result type alias using `AttributionError`.
pub type Result<T> = std::result::Result<T, AttributionError>;

/// Errors that can occur during attribution computation.
///
/// Every per-conversion failure is isolated: one conversion's failure never
/// aborts batch processing of the others.
#[derive(Debug, Error)]
pub enum AttributionError {
    /// Event is missing required identifiers or carries invalid values.
    ///
    /// The event is excluded from resolution and logged; the batch continues.
    #[error("Malformed event {id}: {reason}")]
    MalformedEvent {
        /// Identifier of the offending event.
        id: Uuid,
        /// What was missing or invalid.
        reason: String,
    },

    /// Requested model name is not in the registry.
    ///
    /// Fails only the single request.
    #[error("Unknown attribution model: {0}")]
    UnknownModel(String),

    /// Model name already present in the registry.
    #[error("Model already registered: {0}")]
    ModelAlreadyRegistered(String),

    /// No identity could be established for a conversion.
    ///
    /// Fatal for that conversion's pipeline; the conversion is reported as
    /// unattributable rather than silently dropped.
    #[error("Identity resolution failed for conversion {conversion_id}: {reason}")]
    IdentityResolution {
        /// The conversion that could not be attributed.
        conversion_id: Uuid,
        /// Why identity could not be established.
        reason: String,
    },

    /// Requested conversion is not present in the prepared batch.
    #[error("Conversion not found in batch: {0}")]
    ConversionNotFound(Uuid),

    /// Configuration validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AttributionError {
    /// Create a malformed-event error.
    #[must_use]
    pub fn malformed(id: Uuid, reason: impl Into<String>) -> Self {
        AttributionError::MalformedEvent {
            id,
            reason: reason.into(),
        }
    }

    /// Create an unknown-model error.
    #[must_use]
    pub fn unknown_model(name: impl Into<String>) -> Self {
        AttributionError::UnknownModel(name.into())
    }

    /// Create an identity-resolution error.
    #[must_use]
    pub fn identity(conversion_id: Uuid, reason: impl Into<String>) -> Self {
        AttributionError::IdentityResolution {
            conversion_id,
            reason: reason.into(),
        }
    }

    /// Create an invalid-configuration error.
    #[must_use]
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        AttributionError::InvalidConfig(msg.into())
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        AttributionError::Internal(msg.into())
    }

    /// Returns true if this failure is scoped to a single event or request
    /// and batch processing may continue past it.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AttributionError::MalformedEvent { .. }
                | AttributionError::UnknownModel(_)
                | AttributionError::IdentityResolution { .. }
                | AttributionError::ConversionNotFound(_)
        )
    }

    /// Returns the conversion id this failure is tied to, if any.
    #[must_use]
    pub fn conversion_id(&self) -> Option<Uuid> {
        match self {
            AttributionError::IdentityResolution { conversion_id, .. } => Some(*conversion_id),
            AttributionError::ConversionNotFound(id) => Some(*id),
            _ => None,
        }
    }
}
