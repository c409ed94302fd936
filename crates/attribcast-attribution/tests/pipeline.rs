//! End-to-end pipeline tests: raw events through identity resolution, path
//! construction, credit distribution, and confidence scoring.

use attribcast_attribution::prelude::*;
use attribcast_core::events::{ConversionEvent, EventBatch, TouchpointEvent};
use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

fn conversion_time() -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap()
}

fn touchpoint_days_before(days: i64, user: &str) -> TouchpointEvent {
    TouchpointEvent {
        id: Uuid::new_v4(),
        campaign_id: Uuid::new_v4(),
        episode_id: Uuid::new_v4(),
        podcast_id: Uuid::new_v4(),
        timestamp: conversion_time() - chrono::Duration::days(days),
        channel: "apple_podcasts".to_string(),
        session_id: None,
        device_id: None,
        user_id: Some(user.to_string()),
        ip_hash: None,
    }
}

fn ninety_dollar_conversion(user: &str) -> ConversionEvent {
    ConversionEvent {
        id: Uuid::new_v4(),
        campaign_id: Uuid::new_v4(),
        timestamp: conversion_time(),
        value_minor_units: 9000,
        currency: "USD".to_string(),
        session_id: None,
        device_id: None,
        user_id: Some(user.to_string()),
        ip_hash: None,
        promo_code: Some("POD90".to_string()),
    }
}

/// Three exposures at 10, 3, and 1 days before a $90 conversion under
/// time-decay with a 7-day half-life: weights follow 2^(-d/7) normalized,
/// and the cents reconcile exactly to $90.00.
#[test]
fn time_decay_three_touchpoint_scenario() {
    let engine = AttributionEngine::with_defaults();
    let t10 = touchpoint_days_before(10, "listener-42");
    let t3 = touchpoint_days_before(3, "listener-42");
    let t1 = touchpoint_days_before(1, "listener-42");
    let conversion = ninety_dollar_conversion("listener-42");

    let ctx = engine.prepare(EventBatch::new(
        vec![t10.clone(), t3.clone(), t1.clone()],
        vec![conversion.clone()],
    ));
    let outcome = engine
        .compute_attribution(&ctx, conversion.id, "time_decay")
        .unwrap();
    let result = outcome.result().unwrap();

    assert_eq!(result.credits.len(), 3);
    assert_eq!(result.total_minor_units(), 9000);

    // Path is oldest first.
    let ids: Vec<Uuid> = result.credits.iter().map(|c| c.touchpoint_id).collect();
    assert_eq!(ids, vec![t10.id, t3.id, t1.id]);

    // 2^(-10/7) : 2^(-3/7) : 2^(-1/7), normalized, over 9000 cents.
    assert_eq!(result.credits[0].amount_minor_units, 1655);
    assert_eq!(result.credits[1].amount_minor_units, 3310);
    assert_eq!(result.credits[2].amount_minor_units, 4035);

    // Authenticated user id gave a deterministic identity group.
    assert!(result.confidence > 0.0 && result.confidence <= 1.0);
}

/// The full comparison surface over the same prepared context.
#[test]
fn compare_all_five_models() {
    let engine = AttributionEngine::with_defaults();
    let touchpoints = vec![
        touchpoint_days_before(10, "listener-7"),
        touchpoint_days_before(3, "listener-7"),
        touchpoint_days_before(1, "listener-7"),
    ];
    let conversion = ninety_dollar_conversion("listener-7");
    let ctx = engine.prepare(EventBatch::new(touchpoints, vec![conversion.clone()]));

    let names: Vec<String> = ModelKind::ALL.iter().map(|k| k.as_str().to_string()).collect();
    let outcomes = engine.compare_models(&ctx, conversion.id, &names).unwrap();

    assert_eq!(outcomes.len(), 5);
    for (name, outcome) in &outcomes {
        let result = outcome.result().unwrap();
        assert_eq!(result.total_minor_units(), 9000, "model {name}");
        assert!(result.credits.iter().all(|c| c.amount_minor_units >= 0));
    }

    let first = outcomes["first_touch"].result().unwrap();
    let last = outcomes["last_touch"].result().unwrap();
    let position = outcomes["position_based"].result().unwrap();
    assert_eq!(first.credits[0].amount_minor_units, 9000);
    assert_eq!(last.credits[2].amount_minor_units, 9000);
    assert_eq!(position.credits[0].amount_minor_units, 3600);
    assert_eq!(position.credits[1].amount_minor_units, 1800);
    assert_eq!(position.credits[2].amount_minor_units, 3600);
}

/// Cross-device journey: a session-linked exposure chained to a
/// device-linked purchase resolves into one group whose worst edge caps
/// the confidence.
#[test]
fn cross_device_resolution_feeds_the_path() {
    let engine = AttributionEngine::with_defaults();

    let mut phone = touchpoint_days_before(2, "ignored");
    phone.user_id = None;
    phone.session_id = Some("session-a".to_string());

    let mut laptop = touchpoint_days_before(1, "ignored");
    laptop.user_id = None;
    laptop.session_id = Some("session-a".to_string());
    laptop.device_id = Some("laptop-fp".to_string());

    let mut conversion = ninety_dollar_conversion("ignored");
    conversion.user_id = None;
    // Same device as the laptop exposure, one hour later.
    conversion.timestamp = laptop.timestamp + chrono::Duration::hours(1);
    conversion.device_id = Some("laptop-fp".to_string());

    let ctx = engine.prepare(EventBatch::new(
        vec![phone.clone(), laptop.clone()],
        vec![conversion.clone()],
    ));
    let outcome = engine
        .compute_attribution(&ctx, conversion.id, "linear")
        .unwrap();
    let result = outcome.result().unwrap();

    // Both devices' exposures made it into the path.
    assert_eq!(result.credits.len(), 2);
    let group = ctx.resolution().group_of(conversion.id).unwrap();
    assert_eq!(group.confidence, 0.6);
    // Confidence reflects the weak fingerprint link.
    assert!(result.confidence <= 0.6);
}

/// Replaying the exact same batch yields identical credit lists.
#[test]
fn recomputation_is_deterministic() {
    let engine = AttributionEngine::with_defaults();
    let touchpoints = vec![
        touchpoint_days_before(20, "listener-9"),
        touchpoint_days_before(9, "listener-9"),
        touchpoint_days_before(2, "listener-9"),
    ];
    let conversion = ninety_dollar_conversion("listener-9");
    let batch = EventBatch::new(touchpoints, vec![conversion.clone()]);

    for model in ModelKind::ALL {
        let a = engine
            .compute_attribution(&engine.prepare(batch.clone()), conversion.id, model.as_str())
            .unwrap();
        let b = engine
            .compute_attribution(&engine.prepare(batch.clone()), conversion.id, model.as_str())
            .unwrap();
        assert_eq!(a.result().unwrap().credits, b.result().unwrap().credits);
    }
}

/// Ground-truth validation: promo-code campaigns where the final exposure is
/// known to have converted score the recency models highest.
#[test]
fn validation_recommends_a_recency_model_for_promo_code_truth() {
    let engine = AttributionEngine::with_defaults();

    let mut samples = Vec::new();
    for i in 0..8 {
        let user = format!("listener-{i}");
        let touchpoints = vec![
            touchpoint_days_before(12, &user),
            touchpoint_days_before(5, &user),
            touchpoint_days_before(1, &user),
        ];
        let conversion = ninety_dollar_conversion(&user);
        let truth = GroundTruth::ConvertingTouchpoint {
            touchpoint_id: touchpoints.last().unwrap().id,
        };
        samples.push(GroundTruthSample {
            path: AttributionPath {
                conversion_id: conversion.id,
                conversion_at: conversion.timestamp,
                touchpoints,
                identity_confidence: 1.0,
            },
            value_minor_units: conversion.value_minor_units,
            truth,
        });
    }

    let names: Vec<String> = vec![
        "first_touch".to_string(),
        "last_touch".to_string(),
        "time_decay".to_string(),
    ];
    let results = engine.run_validation(&samples, &names).unwrap();
    assert_eq!(results.len(), 3);

    let accuracy = |name: &str| {
        results
            .iter()
            .find(|r| r.model.as_str() == name)
            .unwrap()
            .accuracy
    };
    assert_eq!(accuracy("first_touch"), 0.0);
    assert_eq!(accuracy("last_touch"), 1.0);
    assert_eq!(accuracy("time_decay"), 1.0);
    assert_eq!(
        ValidationHarness::recommend(&results),
        Some(ModelKind::LastTouch)
    );
}
