//! # Attribcast Attribution
//!
//! The attribution computation engine for podcast sponsorship campaigns.
//!
//! ## Components
//! - `IdentityResolver` - cross-device identity grouping via union-find
//! - `PathBuilder` - ordered, deduplicated, time-windowed touchpoint paths
//! - `AttributionCalculator` - credit distribution under the five models
//! - `ConfidenceScorer` - advisory [0, 1] confidence per result
//! - `AttributionEngine` - the per-batch pipeline and operational surface
//! - `ValidationHarness` - model accuracy against ground-truth campaigns
//!
//! The engine is a pure computation library: callers pre-fetch events and
//! persist results; no I/O happens inside the core. Conversions are
//! independent units of work, and identical input yields identical credits.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod calculator;
pub mod confidence;
pub mod engine;
pub mod identity;
pub mod models;
pub mod paths;
pub mod types;
pub mod validation;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::calculator::AttributionCalculator;
    pub use crate::confidence::ConfidenceScorer;
    pub use crate::engine::{AttributionEngine, RunContext};
    pub use crate::identity::{IdentityResolver, ResolutionOutput};
    pub use crate::paths::PathBuilder;
    pub use crate::types::*;
    pub use crate::validation::ValidationHarness;
    pub use attribcast_core::prelude::*;
}

pub use calculator::AttributionCalculator;
pub use confidence::ConfidenceScorer;
pub use engine::{AttributionEngine, RunContext};
pub use identity::{IdentityResolver, ResolutionOutput};
pub use paths::PathBuilder;
pub use types::{
    AttributionOutcome, AttributionPath, AttributionResult, BatchReport, ConversionFailure,
    Credit, ExactShare, GroundTruth, GroundTruthSample, IdentityGroup, SampleError,
    ValidationResult,
};
pub use validation::ValidationHarness;
