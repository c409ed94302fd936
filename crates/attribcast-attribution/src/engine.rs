//! The attribution engine and its per-batch run context.
//!
//! The engine wires the pipeline together: identity resolution feeds path
//! construction, the calculator splits the conversion value, and the scorer
//! attaches advisory confidence. All grouping state lives in a `RunContext`
//! built per batch and discarded after the run; the engine itself holds only
//! the configuration and the read-only model registry, so conversions can be
//! attributed independently and re-runs on the same input are idempotent.

use crate::calculator::AttributionCalculator;
use crate::confidence::ConfidenceScorer;
use crate::identity::{IdentityResolver, ResolutionOutput};
use crate::paths::PathBuilder;
use crate::types::{
    AttributionOutcome, AttributionPath, AttributionResult, BatchReport, ConversionFailure,
    GroundTruthSample, ValidationResult,
};
use crate::validation::ValidationHarness;
use attribcast_core::config::EngineConfig;
use attribcast_core::error::{AttributionError, Result};
use attribcast_core::events::{ConversionEvent, EventBatch, TouchpointEvent};
use attribcast_core::model::ModelKind;
use attribcast_core::registry::ModelRegistry;
use chrono::Utc;
use std::collections::HashMap;
use tracing::{info, warn};
use uuid::Uuid;

/// Transient state for one attribution run: the event batch plus its
/// resolved identity groups. Discarded after the run; nothing is cached
/// across runs.
#[derive(Debug, Clone)]
pub struct RunContext {
    touchpoints: Vec<TouchpointEvent>,
    conversions: Vec<ConversionEvent>,
    conversion_index: HashMap<Uuid, usize>,
    resolution: ResolutionOutput,
}

impl RunContext {
    /// The conversions in this batch, in stream order.
    #[must_use]
    pub fn conversions(&self) -> &[ConversionEvent] {
        &self.conversions
    }

    /// Look up a conversion by id.
    #[must_use]
    pub fn conversion(&self, id: Uuid) -> Option<&ConversionEvent> {
        self.conversion_index.get(&id).map(|&i| &self.conversions[i])
    }

    /// The identity resolution output for this batch.
    #[must_use]
    pub fn resolution(&self) -> &ResolutionOutput {
        &self.resolution
    }
}

/// The attribution computation engine.
pub struct AttributionEngine {
    config: EngineConfig,
    registry: ModelRegistry,
    resolver: IdentityResolver,
    builder: PathBuilder,
    calculator: AttributionCalculator,
    scorer: ConfidenceScorer,
}

impl AttributionEngine {
    /// Create an engine with a validated configuration and a model registry.
    pub fn new(config: EngineConfig, registry: ModelRegistry) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            resolver: IdentityResolver::new(config.clone()),
            builder: PathBuilder::new(config.clone()),
            calculator: AttributionCalculator::new(config.clone()),
            scorer: ConfidenceScorer::new(config.clone()),
            registry,
            config,
        })
    }

    /// Create an engine with default configuration and the five canonical
    /// models.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(EngineConfig::default(), ModelRegistry::with_defaults())
            .expect("default config is valid")
    }

    /// The engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The model registry.
    #[must_use]
    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Resolve identities for a batch and build the run context.
    #[must_use]
    pub fn prepare(&self, batch: EventBatch) -> RunContext {
        let resolution = self.resolver.resolve(&batch.touchpoints, &batch.conversions);
        let conversion_index = batch
            .conversions
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id, i))
            .collect();
        RunContext {
            touchpoints: batch.touchpoints,
            conversions: batch.conversions,
            conversion_index,
            resolution,
        }
    }

    /// Compute attribution for one conversion under a named model.
    ///
    /// Returns `NoPath` when no qualifying touchpoint exists (a valid
    /// outcome), `UnknownModel` for an unregistered name, and
    /// `IdentityResolution` when the conversion's own identity cannot be
    /// established.
    pub fn compute_attribution(
        &self,
        ctx: &RunContext,
        conversion_id: Uuid,
        model_name: &str,
    ) -> Result<AttributionOutcome> {
        let kind = self.registry.resolve(model_name)?;
        self.compute_with_kind(ctx, conversion_id, kind)
    }

    /// Compute attribution for one conversion under each of the named
    /// models. The path is built once and re-used across models.
    pub fn compare_models(
        &self,
        ctx: &RunContext,
        conversion_id: Uuid,
        model_names: &[String],
    ) -> Result<HashMap<String, AttributionOutcome>> {
        let mut kinds: Vec<(String, ModelKind)> = Vec::with_capacity(model_names.len());
        for name in model_names {
            kinds.push((name.clone(), self.registry.resolve(name)?));
        }

        let conversion = self.lookup_conversion(ctx, conversion_id)?;
        let path = self.build_path(ctx, conversion)?;

        let mut outcomes = HashMap::with_capacity(kinds.len());
        for (name, kind) in kinds {
            let outcome = match &path {
                Some(path) => AttributionOutcome::Attributed(self.attribute(kind, path, conversion)),
                None => AttributionOutcome::NoPath { conversion_id },
            };
            outcomes.insert(name, outcome);
        }
        Ok(outcomes)
    }

    /// Attribute every conversion in the batch under one model.
    ///
    /// Per-conversion failures are isolated: each is reported with its
    /// conversion id and reason, and never aborts the rest of the batch.
    pub fn run_batch(&self, ctx: &RunContext, model_name: &str) -> Result<BatchReport> {
        let kind = self.registry.resolve(model_name)?;

        let mut report = BatchReport {
            rejected_events: ctx.resolution.rejected.clone(),
            ..Default::default()
        };
        for conversion in &ctx.conversions {
            match self.compute_with_kind(ctx, conversion.id, kind) {
                Ok(outcome) => report.outcomes.push(outcome),
                Err(err) => {
                    warn!(conversion_id = %conversion.id, %err, "Conversion unattributable");
                    report.failures.push(ConversionFailure {
                        conversion_id: conversion.id,
                        reason: err.to_string(),
                    });
                }
            }
        }

        info!(
            model = %kind,
            attributed = report.attributed_count(),
            no_path = report.no_path_count(),
            failed = report.failure_count(),
            "Batch attribution complete"
        );
        Ok(report)
    }

    /// Replay ground-truth samples through each of the named models.
    pub fn run_validation(
        &self,
        samples: &[GroundTruthSample],
        model_names: &[String],
    ) -> Result<Vec<ValidationResult>> {
        let mut kinds = Vec::with_capacity(model_names.len());
        for name in model_names {
            kinds.push(self.registry.resolve(name)?);
        }
        let harness = ValidationHarness::new(self.config.clone());
        Ok(harness.run(samples, &kinds))
    }

    fn compute_with_kind(
        &self,
        ctx: &RunContext,
        conversion_id: Uuid,
        kind: ModelKind,
    ) -> Result<AttributionOutcome> {
        let conversion = self.lookup_conversion(ctx, conversion_id)?;
        match self.build_path(ctx, conversion)? {
            Some(path) => Ok(AttributionOutcome::Attributed(
                self.attribute(kind, &path, conversion),
            )),
            None => Ok(AttributionOutcome::NoPath { conversion_id }),
        }
    }

    fn lookup_conversion<'a>(
        &self,
        ctx: &'a RunContext,
        conversion_id: Uuid,
    ) -> Result<&'a ConversionEvent> {
        ctx.conversion(conversion_id)
            .ok_or(AttributionError::ConversionNotFound(conversion_id))
    }

    /// Build the path for a conversion, surfacing identity failures.
    fn build_path(
        &self,
        ctx: &RunContext,
        conversion: &ConversionEvent,
    ) -> Result<Option<AttributionPath>> {
        if ctx.resolution.was_rejected(conversion.id) {
            return Err(AttributionError::identity(
                conversion.id,
                "conversion event is malformed",
            ));
        }
        if !conversion.has_identity_signal() {
            return Err(AttributionError::identity(
                conversion.id,
                "conversion carries no identity signals",
            ));
        }
        let group = ctx.resolution.group_of(conversion.id).ok_or_else(|| {
            AttributionError::identity(conversion.id, "conversion missing from resolution output")
        })?;
        Ok(self.builder.build(conversion, group, &ctx.touchpoints))
    }

    fn attribute(
        &self,
        kind: ModelKind,
        path: &AttributionPath,
        conversion: &ConversionEvent,
    ) -> AttributionResult {
        let credits = self
            .calculator
            .distribute(kind, path, conversion.value_minor_units);
        AttributionResult {
            conversion_id: conversion.id,
            model: kind,
            credits,
            confidence: self.scorer.score(path),
            computed_at: Utc::now(),
        }
    }
}
