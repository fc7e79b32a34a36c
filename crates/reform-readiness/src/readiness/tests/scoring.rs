use super::common::*;
use crate::readiness::domain::Identity;
use crate::readiness::features::{extract_features, FeatureRecord};
use crate::readiness::scoring::{
    score, ReadinessClass, ReadinessScorer, ScoreComponent, ScoreRecord, ScoringConfig,
    ScoringConfigError,
};

fn single_score(records: &[FeatureRecord], config: &ScoringConfig) -> ScoreRecord {
    let mut scores = score(records, config).expect("valid config");
    assert_eq!(scores.len(), 1);
    scores.remove(0)
}

#[test]
fn fresh_quote_request_is_nurture_under_default_weights() {
    let events = vec![categorized("anon-a", days_ago(1), "submit_quote", "floor")];
    let records = extract_features(&events, reference_time());

    let record = single_score(&records, &ScoringConfig::default());

    assert_eq!(record.score, 54.0);
    assert_eq!(record.class_label, ReadinessClass::Nurture);
    assert_eq!(record.score_date, reference_time().date_naive());
}

#[test]
fn fresh_quote_request_is_ready_when_weights_favor_intent() {
    let events = vec![categorized("anon-a", days_ago(1), "submit_quote", "floor")];
    let records = extract_features(&events, reference_time());

    let record = single_score(&records, &intent_heavy_config());

    assert_eq!(record.score, 81.85);
    assert_eq!(record.class_label, ReadinessClass::Ready);
    let drivers: Vec<ScoreComponent> = record.top_drivers.iter().map(|d| d.component).collect();
    assert_eq!(
        drivers,
        vec![
            ScoreComponent::Recency,
            ScoreComponent::HighIntent,
            ScoreComponent::Diversity
        ]
    );
    assert_eq!(record.top_drivers[0].contribution, 45.0);
    assert_eq!(record.top_drivers[1].contribution, 36.0);
}

#[test]
fn abandoned_cart_lifts_bundle_abandon_component() {
    let events = vec![categorized("anon-b", days_ago(2), "add_to_cart", "tile")];
    let records = extract_features(&events, reference_time());
    assert_eq!(records[0].cart_abandon_7d, 1);

    let scorer = ReadinessScorer::new(ScoringConfig::default()).expect("valid config");
    let breakdown = scorer.explain(&records[0]);
    let bundles_abandon = breakdown.components[4];

    assert_eq!(bundles_abandon.component, ScoreComponent::BundlesAbandon);
    assert!((bundles_abandon.normalized - 15.0).abs() < 1e-9);
    assert!(bundles_abandon.contribution > 0.0);
}

#[test]
fn completed_bundle_dominates_bundle_abandon_component() {
    let events = vec![
        categorized("anon-c", days_ago(3), "page_view", "paint"),
        categorized("anon-c", days_ago(5), "page_view", "filler"),
        categorized("anon-c", days_ago(9), "page_view", "sandpaper"),
    ];
    let records = extract_features(&events, reference_time());
    assert_eq!(records[0].reform_bundle_14d, 1);

    let scorer = ReadinessScorer::new(ScoringConfig::default()).expect("valid config");
    let breakdown = scorer.explain(&records[0]);

    assert!((breakdown.components[4].normalized - 70.0).abs() < 1e-9);
}

#[test]
fn dormant_identity_gets_no_recency_credit() {
    let events = vec![
        categorized("anon-d", days_ago(40), "submit_quote", "door"),
        categorized("anon-d", days_ago(45), "add_to_cart", "lock"),
    ];
    let records = extract_features(&events, reference_time());
    assert_eq!(records[0].recency_days, None);

    let record = single_score(&records, &ScoringConfig::default());

    assert_eq!(record.score, 0.0);
    assert_eq!(record.class_label, ReadinessClass::DoNotApproach);
    assert!(record
        .top_drivers
        .iter()
        .all(|driver| driver.contribution == 0.0));
}

#[test]
fn negative_zero_weight_keeps_canonical_driver_order() {
    let mut config = ScoringConfig::default();
    config.weights.recency = -0.0;
    let record = FeatureRecord::dormant(Identity::new("anon-signed"), reference_time());

    let scored = single_score(&[record], &config);

    let drivers: Vec<ScoreComponent> = scored.top_drivers.iter().map(|d| d.component).collect();
    assert_eq!(
        drivers,
        vec![
            ScoreComponent::Recency,
            ScoreComponent::HighIntent,
            ScoreComponent::Frequency
        ]
    );
    assert_eq!(scored.top_drivers[0].contribution.to_bits(), 0.0_f64.to_bits());
}

#[test]
fn zero_contribution_ties_keep_canonical_order() {
    let record = FeatureRecord::dormant(Identity::new("anon-zero"), reference_time());

    let scored = single_score(&[record], &ScoringConfig::default());

    let drivers: Vec<ScoreComponent> = scored.top_drivers.iter().map(|d| d.component).collect();
    assert_eq!(
        drivers,
        vec![
            ScoreComponent::Recency,
            ScoreComponent::HighIntent,
            ScoreComponent::Frequency
        ]
    );
}

#[test]
fn saturated_record_is_capped_at_one_hundred() {
    let mut record = FeatureRecord::dormant(Identity::new("anon-max"), reference_time());
    record.recency_days = Some(0.0);
    record.freq_7d = 500;
    record.freq_14d = 500;
    record.freq_30d = 500;
    record.high_intent_7d = 50;
    record.category_diversity_14d = 20;
    record.cart_abandon_7d = 10;
    record.reform_bundle_14d = 5;

    let mut config = ScoringConfig::default();
    config.weights.recency = 0.9;

    let scored = single_score(&[record], &config);

    assert_eq!(scored.score, 100.0);
    assert_eq!(scored.class_label, ReadinessClass::Ready);
}

#[test]
fn score_preserves_input_order() {
    let mut later = FeatureRecord::dormant(Identity::new("anon-z"), reference_time());
    later.recency_days = Some(0.5);
    let earlier = FeatureRecord::dormant(Identity::new("anon-a"), reference_time());

    let scores = score(&[later, earlier], &ScoringConfig::default()).expect("valid config");

    let identities: Vec<&str> = scores.iter().map(|s| s.identity.as_str()).collect();
    assert_eq!(identities, vec!["anon-z", "anon-a"]);
}

#[test]
fn invalid_config_fails_before_scoring() {
    let mut config = ScoringConfig::default();
    config.thresholds.ready_floor = 30.0;
    let records = vec![FeatureRecord::dormant(
        Identity::new("anon-x"),
        reference_time(),
    )];

    match score(&records, &config) {
        Err(ScoringConfigError::InvertedThresholds {
            nurture_floor,
            ready_floor,
        }) => {
            assert_eq!(nurture_floor, 40.0);
            assert_eq!(ready_floor, 30.0);
        }
        other => panic!("expected inverted thresholds, got {other:?}"),
    }
}

#[test]
fn unnormalized_weights_are_accepted_and_clamped() {
    let mut config = ScoringConfig::default();
    config.weights.recency = 3.0;
    let mut record = FeatureRecord::dormant(Identity::new("anon-w"), reference_time());
    record.recency_days = Some(0.0);

    let scored = single_score(&[record], &config);

    assert_eq!(scored.score, 100.0);
}

#[test]
fn explain_matches_scored_record() {
    let events = vec![
        categorized("anon-e", days_ago(2), "page_view", "window"),
        categorized("anon-e", days_ago(4), "scan_service_code", "blinds"),
        event("anon-e", days_ago(12), "page_view"),
    ];
    let records = extract_features(&events, reference_time());
    let scorer = ReadinessScorer::new(ScoringConfig::default()).expect("valid config");

    let breakdown = scorer.explain(&records[0]);
    let scored = scorer.score_record(&records[0]);

    assert_eq!(breakdown.score, scored.score);
    assert_eq!(breakdown.class_label, scored.class_label);
    for driver in &scored.top_drivers {
        let component = breakdown
            .components
            .iter()
            .find(|c| c.component == driver.component)
            .expect("driver component in breakdown");
        assert!((component.contribution - driver.contribution).abs() < 0.005 + 1e-9);
    }
}
