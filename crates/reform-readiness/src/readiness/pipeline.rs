use super::domain::Event;
use super::features::{FeatureConfig, FeatureConfigError, FeatureExtractor, FeatureRecord};
use super::scoring::{
    ReadinessScorer, ScoreBreakdown, ScoreRecord, ScoringConfig, ScoringConfigError,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Complete reference data for a run: extraction rules plus scoring weights.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessSettings {
    pub features: FeatureConfig,
    pub scoring: ScoringConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum ReadinessConfigError {
    #[error("invalid feature configuration: {0}")]
    Features(#[from] FeatureConfigError),
    #[error("invalid scoring configuration: {0}")]
    Scoring(#[from] ScoringConfigError),
}

/// Result of one batch run: features and scores for every identity in the batch.
#[derive(Debug, Clone)]
pub struct ScoringRun {
    pub reference_time: DateTime<Utc>,
    pub events: usize,
    pub features: Vec<FeatureRecord>,
    pub scores: Vec<ScoreRecord>,
}

/// Events → features → scores, with both configurations validated up front.
#[derive(Debug, Clone)]
pub struct ReadinessPipeline {
    extractor: FeatureExtractor,
    scorer: ReadinessScorer,
}

impl ReadinessPipeline {
    pub fn new(settings: &ReadinessSettings) -> Result<Self, ReadinessConfigError> {
        let extractor = FeatureExtractor::new(&settings.features)?;
        let scorer = ReadinessScorer::new(settings.scoring.clone())?;
        Ok(Self { extractor, scorer })
    }

    pub fn run(&self, events: &[Event], reference_time: DateTime<Utc>) -> ScoringRun {
        let features = self.extractor.extract(events, reference_time);
        info!(
            events = events.len(),
            identities = features.len(),
            "calculated readiness features"
        );

        let scores = self.scorer.score_all(&features);
        info!(scores = scores.len(), %reference_time, "calculated readiness scores");

        ScoringRun {
            reference_time,
            events: events.len(),
            features,
            scores,
        }
    }

    /// Component breakdown for one identity, or `None` if it has no events in the batch.
    pub fn explain(
        &self,
        events: &[Event],
        identity: &str,
        reference_time: DateTime<Utc>,
    ) -> Option<(FeatureRecord, ScoreBreakdown)> {
        let own: Vec<Event> = events
            .iter()
            .filter(|event| event.identity.as_str() == identity)
            .cloned()
            .collect();

        let record = self.extractor.extract(&own, reference_time).pop()?;
        let breakdown = self.scorer.explain(&record);
        Some((record, breakdown))
    }
}
