use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::readiness::domain::{Channel, Event, Identity};
use crate::readiness::features::FeatureRecord;
use crate::readiness::scoring::{ComponentWeights, ScoringConfig};

pub(super) fn reference_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 1, 9, 0, 0)
        .single()
        .expect("valid reference time")
}

pub(super) fn hours_ago(hours: i64) -> DateTime<Utc> {
    reference_time() - Duration::hours(hours)
}

pub(super) fn days_ago(days: i64) -> DateTime<Utc> {
    reference_time() - Duration::days(days)
}

pub(super) fn event(identity: &str, at: DateTime<Utc>, name: &str) -> Event {
    Event::new(at, Channel::Web, identity, name)
}

pub(super) fn categorized(identity: &str, at: DateTime<Utc>, name: &str, category: &str) -> Event {
    event(identity, at, name).with_category(category)
}

pub(super) fn record_for<'a>(records: &'a [FeatureRecord], identity: &str) -> &'a FeatureRecord {
    records
        .iter()
        .find(|record| record.identity == Identity::new(identity))
        .unwrap_or_else(|| panic!("record for {identity} present"))
}

/// Weights that lean on recency and intent so one fresh quote request is enough for READY.
pub(super) fn intent_heavy_config() -> ScoringConfig {
    ScoringConfig {
        weights: ComponentWeights {
            recency: 0.45,
            high_intent: 0.45,
            frequency: 0.05,
            diversity: 0.03,
            bundles_abandon: 0.02,
        },
        ..ScoringConfig::default()
    }
}
