//! Validation harness for model accuracy.
//!
//! Replays historical paths with known ground-truth outcomes, typically test
//! campaigns whose unique promo codes deterministically identify the
//! converting touchpoint, and measures every requested model against them.
//! Results are reporting material for choosing a default model per tenant or
//! campaign type; they never mutate live model selection.

use crate::calculator::AttributionCalculator;
use crate::types::{
    Credit, GroundTruth, GroundTruthSample, SampleError, ValidationResult,
};
use attribcast_core::config::EngineConfig;
use attribcast_core::model::ModelKind;
use chrono::Utc;
use tracing::info;

/// Replays ground-truth samples through attribution models.
#[derive(Debug, Clone)]
pub struct ValidationHarness {
    calculator: AttributionCalculator,
}

impl ValidationHarness {
    /// Create a harness with the given configuration.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            calculator: AttributionCalculator::new(config),
        }
    }

    /// Run every requested model over the sample set, producing one
    /// `ValidationResult` per model.
    ///
    /// Accuracy counts the plurality samples (known converting touchpoint)
    /// where the model put the largest credit on the true touchpoint; a tie
    /// for the largest credit counts as a hit, since the true touchpoint
    /// shares the plurality. Exact-split samples contribute to the mean
    /// absolute error instead.
    #[must_use]
    pub fn run(&self, samples: &[GroundTruthSample], models: &[ModelKind]) -> Vec<ValidationResult> {
        models
            .iter()
            .map(|&kind| self.run_model(samples, kind))
            .collect()
    }

    /// The model with the highest accuracy in a validation run, for
    /// operators to adopt explicitly. Ties keep the first result. Accuracy
    /// only ranks models that saw at least one plurality sample; a run with
    /// exact-split samples alone falls back to the lowest mean absolute
    /// error, and a run with neither recommends nothing.
    #[must_use]
    pub fn recommend(results: &[ValidationResult]) -> Option<ModelKind> {
        let mut best: Option<&ValidationResult> = None;
        for result in results {
            if result.per_sample.iter().all(|s| s.hit.is_none()) {
                continue;
            }
            match best {
                Some(current) if result.accuracy <= current.accuracy => {}
                _ => best = Some(result),
            }
        }
        if best.is_none() {
            for result in results {
                let Some(error) = result.mean_abs_error_minor_units else {
                    continue;
                };
                match best.and_then(|b| b.mean_abs_error_minor_units) {
                    Some(current) if current <= error => {}
                    _ => best = Some(result),
                }
            }
        }
        best.map(|r| r.model)
    }

    fn run_model(&self, samples: &[GroundTruthSample], kind: ModelKind) -> ValidationResult {
        let mut per_sample = Vec::with_capacity(samples.len());
        let mut hits = 0usize;
        let mut plurality_samples = 0usize;
        let mut split_errors: Vec<f64> = Vec::new();

        for sample in samples {
            let credits =
                self.calculator
                    .distribute(kind, &sample.path, sample.value_minor_units);
            match &sample.truth {
                GroundTruth::ConvertingTouchpoint { touchpoint_id } => {
                    plurality_samples += 1;
                    let hit = Self::plurality_hit(&credits, *touchpoint_id);
                    if hit {
                        hits += 1;
                    }
                    per_sample.push(SampleError {
                        conversion_id: sample.path.conversion_id,
                        hit: Some(hit),
                        abs_error_minor_units: None,
                    });
                }
                GroundTruth::ExactSplit { shares } => {
                    let error = Self::mean_abs_error(&credits, shares);
                    split_errors.push(error);
                    per_sample.push(SampleError {
                        conversion_id: sample.path.conversion_id,
                        hit: None,
                        abs_error_minor_units: Some(error),
                    });
                }
            }
        }

        let accuracy = if plurality_samples == 0 {
            0.0
        } else {
            hits as f64 / plurality_samples as f64
        };
        let mean_abs_error_minor_units = if split_errors.is_empty() {
            None
        } else {
            Some(split_errors.iter().sum::<f64>() / split_errors.len() as f64)
        };

        info!(
            model = %kind,
            samples = samples.len(),
            accuracy,
            "Validation run complete"
        );

        ValidationResult {
            model: kind,
            sample_size: samples.len(),
            accuracy,
            mean_abs_error_minor_units,
            per_sample,
            generated_at: Utc::now(),
        }
    }

    /// True if the touchpoint holds the largest credit (ties included).
    fn plurality_hit(credits: &[Credit], touchpoint_id: uuid::Uuid) -> bool {
        let max = credits.iter().map(|c| c.amount_minor_units).max();
        match max {
            Some(max) => credits
                .iter()
                .any(|c| c.touchpoint_id == touchpoint_id && c.amount_minor_units == max),
            None => false,
        }
    }

    /// Mean absolute deviation from the expected split, in minor units.
    /// Expected amounts default to zero for touchpoints the truth omits.
    fn mean_abs_error(credits: &[Credit], shares: &[crate::types::ExactShare]) -> f64 {
        if credits.is_empty() {
            return 0.0;
        }
        let total: i64 = credits
            .iter()
            .map(|c| {
                let expected = shares
                    .iter()
                    .find(|s| s.touchpoint_id == c.touchpoint_id)
                    .map_or(0, |s| s.amount_minor_units);
                (c.amount_minor_units - expected).abs()
            })
            .sum();
        total as f64 / credits.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AttributionPath, ExactShare};
    use attribcast_core::events::TouchpointEvent;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn path_with_offsets(offsets_days: &[i64]) -> AttributionPath {
        let conversion_at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let touchpoints = offsets_days
            .iter()
            .map(|&d| TouchpointEvent {
                id: Uuid::new_v4(),
                campaign_id: Uuid::new_v4(),
                episode_id: Uuid::new_v4(),
                podcast_id: Uuid::new_v4(),
                timestamp: conversion_at - chrono::Duration::days(d),
                channel: "rss".to_string(),
                session_id: None,
                device_id: None,
                user_id: None,
                ip_hash: None,
            })
            .collect();
        AttributionPath {
            conversion_id: Uuid::new_v4(),
            conversion_at,
            touchpoints,
            identity_confidence: 1.0,
        }
    }

    fn harness() -> ValidationHarness {
        ValidationHarness::new(EngineConfig::default())
    }

    /// Promo-code campaigns where the last exposure converted.
    fn last_touch_truth_samples(count: usize) -> Vec<GroundTruthSample> {
        (0..count)
            .map(|_| {
                let path = path_with_offsets(&[12, 6, 1]);
                let truth = GroundTruth::ConvertingTouchpoint {
                    touchpoint_id: path.last().unwrap().id,
                };
                GroundTruthSample {
                    path,
                    value_minor_units: 5000,
                    truth,
                }
            })
            .collect()
    }

    #[test]
    fn test_last_touch_truth_scores_recency_models_highest() {
        let samples = last_touch_truth_samples(10);
        let models = [ModelKind::FirstTouch, ModelKind::LastTouch, ModelKind::TimeDecay];
        let results = harness().run(&samples, &models);

        assert_eq!(results.len(), 3);
        let by_model = |kind: ModelKind| {
            results
                .iter()
                .find(|r| r.model == kind)
                .unwrap()
                .accuracy
        };
        assert_eq!(by_model(ModelKind::FirstTouch), 0.0);
        assert_eq!(by_model(ModelKind::LastTouch), 1.0);
        // Time-decay puts the largest weight on the most recent touchpoint.
        assert_eq!(by_model(ModelKind::TimeDecay), 1.0);
    }

    #[test]
    fn test_sample_size_and_per_sample_detail() {
        let samples = last_touch_truth_samples(4);
        let results = harness().run(&samples, &[ModelKind::LastTouch]);
        let result = &results[0];
        assert_eq!(result.sample_size, 4);
        assert_eq!(result.per_sample.len(), 4);
        assert!(result.per_sample.iter().all(|s| s.hit == Some(true)));
        assert!(result.mean_abs_error_minor_units.is_none());
    }

    #[test]
    fn test_exact_split_reports_numeric_error() {
        let path = path_with_offsets(&[9, 5, 1]);
        // Truth matches the position-based split for value 10000.
        let shares = vec![
            ExactShare {
                touchpoint_id: path.touchpoints[0].id,
                amount_minor_units: 4000,
            },
            ExactShare {
                touchpoint_id: path.touchpoints[1].id,
                amount_minor_units: 2000,
            },
            ExactShare {
                touchpoint_id: path.touchpoints[2].id,
                amount_minor_units: 4000,
            },
        ];
        let samples = vec![GroundTruthSample {
            path,
            value_minor_units: 10_000,
            truth: GroundTruth::ExactSplit { shares },
        }];

        let results = harness().run(&samples, &[ModelKind::PositionBased, ModelKind::FirstTouch]);
        let position = &results[0];
        assert_eq!(position.mean_abs_error_minor_units, Some(0.0));
        // First-touch: |10000-4000| + |0-2000| + |0-4000| over 3 touchpoints.
        let first = &results[1];
        assert_eq!(first.mean_abs_error_minor_units, Some(4000.0));
    }

    #[test]
    fn test_plurality_tie_counts_as_hit() {
        let path = path_with_offsets(&[4, 2]);
        let truth = GroundTruth::ConvertingTouchpoint {
            touchpoint_id: path.touchpoints[0].id,
        };
        let samples = vec![GroundTruthSample {
            path,
            value_minor_units: 1000,
            truth,
        }];
        // Linear n=2 splits 500/500: the true touchpoint shares the plurality.
        let results = harness().run(&samples, &[ModelKind::Linear]);
        assert_eq!(results[0].accuracy, 1.0);
    }

    #[test]
    fn test_recommend_picks_highest_accuracy() {
        let samples = last_touch_truth_samples(6);
        let results = harness().run(
            &samples,
            &[ModelKind::FirstTouch, ModelKind::LastTouch, ModelKind::Linear],
        );
        assert_eq!(
            ValidationHarness::recommend(&results),
            Some(ModelKind::LastTouch)
        );
    }

    #[test]
    fn test_recommend_on_split_only_run_uses_lowest_error() {
        // No plurality samples anywhere: every accuracy is 0.0, so ranking
        // by accuracy alone would pick whichever model happened to be first.
        let path = path_with_offsets(&[9, 5, 1]);
        let shares = vec![
            ExactShare {
                touchpoint_id: path.touchpoints[0].id,
                amount_minor_units: 4000,
            },
            ExactShare {
                touchpoint_id: path.touchpoints[1].id,
                amount_minor_units: 2000,
            },
            ExactShare {
                touchpoint_id: path.touchpoints[2].id,
                amount_minor_units: 4000,
            },
        ];
        let samples = vec![GroundTruthSample {
            path,
            value_minor_units: 10_000,
            truth: GroundTruth::ExactSplit { shares },
        }];

        let results = harness().run(&samples, &[ModelKind::FirstTouch, ModelKind::PositionBased]);
        assert_eq!(results[0].accuracy, results[1].accuracy);
        assert_eq!(
            ValidationHarness::recommend(&results),
            Some(ModelKind::PositionBased)
        );
    }

    #[test]
    fn test_empty_sample_set() {
        let results = harness().run(&[], &[ModelKind::Linear]);
        assert_eq!(results[0].sample_size, 0);
        assert_eq!(results[0].accuracy, 0.0);
        // Neither plurality hits nor split errors: nothing to recommend.
        assert!(ValidationHarness::recommend(&results).is_none());
        assert!(ValidationHarness::recommend(&[]).is_none());
    }
}
