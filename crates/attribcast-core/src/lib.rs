//! # Attribcast Core
//!
//! Core abstractions for the attribcast attribution engine.
//!
//! This crate provides:
//! - Touchpoint and conversion event records matching the ingestion contract
//! - Engine configuration with validated defaults
//! - The closed set of attribution model kinds
//! - The immutable model registry used for lookup by name
//! - The shared error taxonomy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod events;
pub mod model;
pub mod registry;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::{EngineConfig, SignalStrengths};
    pub use crate::error::{AttributionError, Result};
    pub use crate::events::{ConversionEvent, EventBatch, RejectedEvent, TouchpointEvent};
    pub use crate::model::ModelKind;
    pub use crate::registry::{ModelEntry, ModelRegistry, RegistryStats};
}

pub use config::EngineConfig;
pub use error::{AttributionError, Result};
pub use events::{ConversionEvent, EventBatch, RejectedEvent, TouchpointEvent};
pub use model::ModelKind;
pub use registry::ModelRegistry;
