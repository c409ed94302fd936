//! Attribution path construction.
//!
//! Assembles the ordered, deduplicated, time-windowed sequence of touchpoints
//! preceding one conversion:
//! - only touchpoints strictly before the conversion and within the lookback
//!   window qualify
//! - ascending timestamp order, ties broken by the insertion order of the
//!   original event stream (stable sort)
//! - repeated exposures with the same (campaign, episode, minute-rounded
//!   timestamp) collapse to the earliest occurrence
//! - beyond the maximum path length the oldest touchpoints are dropped
//!   first, since the models weight early touches least

use crate::types::{AttributionPath, IdentityGroup};
use attribcast_core::config::EngineConfig;
use attribcast_core::events::{ConversionEvent, TouchpointEvent};
use std::collections::HashSet;
use tracing::debug;
use uuid::Uuid;

/// Builds attribution paths from identity-resolved events.
#[derive(Debug, Clone)]
pub struct PathBuilder {
    config: EngineConfig,
}

impl PathBuilder {
    /// Create a path builder with the given configuration.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Build the path for one conversion from its identity group.
    ///
    /// `touchpoints` is the full batch in ingestion stream order; only
    /// members of `group` qualify. Returns `None` when no touchpoint
    /// qualifies, which is a valid, reportable outcome rather than an error.
    #[must_use]
    pub fn build(
        &self,
        conversion: &ConversionEvent,
        group: &IdentityGroup,
        touchpoints: &[TouchpointEvent],
    ) -> Option<AttributionPath> {
        let window_start =
            conversion.timestamp - chrono::Duration::seconds(self.config.lookback_secs());
        let members: HashSet<Uuid> = group.event_ids.iter().copied().collect();

        let mut qualifying: Vec<&TouchpointEvent> = touchpoints
            .iter()
            .filter(|t| members.contains(&t.id))
            .filter(|t| t.timestamp < conversion.timestamp && t.timestamp >= window_start)
            .collect();

        // Stable: equal timestamps keep ingestion stream order.
        qualifying.sort_by_key(|t| t.timestamp);

        // Collapse repeated exposures; ascending order makes the first
        // occurrence per key the earliest.
        let granularity = self.config.dedup_granularity_secs;
        let mut seen: HashSet<(Uuid, Uuid, i64)> = HashSet::new();
        let mut deduped: Vec<TouchpointEvent> = Vec::with_capacity(qualifying.len());
        for t in qualifying {
            let key = (t.campaign_id, t.episode_id, t.timestamp.timestamp() / granularity);
            if seen.insert(key) {
                deduped.push(t.clone());
            }
        }

        if deduped.len() > self.config.max_path_length {
            let drop = deduped.len() - self.config.max_path_length;
            debug!(
                conversion_id = %conversion.id,
                dropped = drop,
                "Truncating oldest touchpoints beyond path cap"
            );
            deduped.drain(..drop);
        }

        if deduped.is_empty() {
            return None;
        }

        Some(AttributionPath {
            conversion_id: conversion.id,
            conversion_at: conversion.timestamp,
            touchpoints: deduped,
            identity_confidence: group.confidence,
        })
    }
}
