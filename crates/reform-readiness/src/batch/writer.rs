use crate::readiness::features::FeatureRecord;
use crate::readiness::scoring::ScoreRecord;
use chrono::SecondsFormat;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub(crate) struct ScoreRow<'a> {
    identity: &'a str,
    score: f64,
    class_label: &'static str,
    top_drivers: String,
    score_date: String,
}

impl<'a> ScoreRow<'a> {
    pub(crate) fn from_record(record: &'a ScoreRecord) -> Result<Self, serde_json::Error> {
        Ok(Self {
            identity: record.identity.as_str(),
            score: record.score,
            class_label: record.class_label.label(),
            top_drivers: serde_json::to_string(&record.top_drivers)?,
            score_date: record.score_date.format("%Y-%m-%d").to_string(),
        })
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct FeatureRow<'a> {
    identity: &'a str,
    reference_time: String,
    recency_days: Option<f64>,
    freq_7d: u32,
    freq_14d: u32,
    freq_30d: u32,
    high_intent_7d: u32,
    category_diversity_14d: u32,
    cart_abandon_7d: u32,
    reform_bundle_14d: u32,
}

impl<'a> From<&'a FeatureRecord> for FeatureRow<'a> {
    fn from(record: &'a FeatureRecord) -> Self {
        Self {
            identity: record.identity.as_str(),
            reference_time: record
                .reference_time
                .to_rfc3339_opts(SecondsFormat::Secs, true),
            recency_days: record.recency_days,
            freq_7d: record.freq_7d,
            freq_14d: record.freq_14d,
            freq_30d: record.freq_30d,
            high_intent_7d: record.high_intent_7d,
            category_diversity_14d: record.category_diversity_14d,
            cart_abandon_7d: record.cart_abandon_7d,
            reform_bundle_14d: record.reform_bundle_14d,
        }
    }
}
