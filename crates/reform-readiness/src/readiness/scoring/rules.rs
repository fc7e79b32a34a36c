use super::config::ScoringConfig;
use super::curves::clamp_component;
use super::{ComponentScore, ScoreComponent};
use crate::readiness::features::FeatureRecord;

/// Normalized score in [0, 100] for one component of a feature record.
pub(crate) fn normalized_component(
    component: ScoreComponent,
    record: &FeatureRecord,
    config: &ScoringConfig,
) -> f64 {
    let curves = &config.curves;
    match component {
        ScoreComponent::Recency => curves.recency.apply(record.recency_days),
        ScoreComponent::HighIntent => curves.high_intent.apply(f64::from(record.high_intent_7d)),
        ScoreComponent::Frequency => {
            curves
                .frequency
                .apply(record.freq_7d, record.freq_14d, record.freq_30d)
        }
        ScoreComponent::Diversity => curves
            .diversity
            .apply(f64::from(record.category_diversity_14d)),
        ScoreComponent::BundlesAbandon => curves
            .bundles_abandon
            .apply(record.reform_bundle_14d, record.cart_abandon_7d),
    }
}

/// All five components in canonical order, each with its weighted contribution.
pub(crate) fn score_components(
    record: &FeatureRecord,
    config: &ScoringConfig,
) -> [ComponentScore; 5] {
    ScoreComponent::ordered().map(|component| {
        let normalized = normalized_component(component, record, config);
        let weight = config.weights.weight_for(component);
        ComponentScore {
            component,
            normalized,
            weight,
            contribution: weight * normalized,
        }
    })
}

/// Weighted sum clamped to [0, 100] and rounded to two decimals. Non-finite sums resolve to 0.
pub(crate) fn composite_score(components: &[ComponentScore]) -> f64 {
    let total: f64 = components.iter().map(|score| score.contribution).sum();
    round2(clamp_component(total))
}

pub(crate) fn round2(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}
