//! Deterministic composition of feature records into a bounded readiness score and tier.

mod config;
mod curves;
mod policy;
mod rules;

pub use config::{
    ComponentCurves, ComponentWeights, ReadinessThresholds, ScoringConfig, ScoringConfigError,
};
pub use curves::{BundleAbandonBlend, FrequencyBlend, RecencyCurve, SaturationCurve};
pub use policy::{Driver, ReadinessClass};

use crate::readiness::domain::Identity;
use crate::readiness::features::FeatureRecord;
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Named feature group contributing to the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreComponent {
    Recency,
    HighIntent,
    Frequency,
    Diversity,
    BundlesAbandon,
}

impl ScoreComponent {
    /// Canonical order, also used to break contribution ties between drivers.
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Recency,
            Self::HighIntent,
            Self::Frequency,
            Self::Diversity,
            Self::BundlesAbandon,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Recency => "recency",
            Self::HighIntent => "high_intent",
            Self::Frequency => "frequency",
            Self::Diversity => "diversity",
            Self::BundlesAbandon => "bundles_abandon",
        }
    }

    pub(crate) const fn rank(self) -> u8 {
        match self {
            Self::Recency => 0,
            Self::HighIntent => 1,
            Self::Frequency => 2,
            Self::Diversity => 3,
            Self::BundlesAbandon => 4,
        }
    }
}

impl fmt::Display for ScoreComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Discrete contribution to a score, kept for audits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentScore {
    pub component: ScoreComponent,
    /// Component score on the 0-100 scale before weighting.
    pub normalized: f64,
    pub weight: f64,
    pub contribution: f64,
}

/// Scoring output for one identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub identity: Identity,
    pub score: f64,
    pub class_label: ReadinessClass,
    pub top_drivers: Vec<Driver>,
    pub score_date: NaiveDate,
}

/// Every component behind a score, not just the top drivers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub identity: Identity,
    pub components: [ComponentScore; 5],
    pub score: f64,
    pub class_label: ReadinessClass,
}

/// Validated scorer. Pure: identical records and config always give identical output.
#[derive(Debug, Clone)]
pub struct ReadinessScorer {
    config: ScoringConfig,
}

impl ReadinessScorer {
    pub fn new(config: ScoringConfig) -> Result<Self, ScoringConfigError> {
        config.validate()?;
        if !config.weights.is_normalized() {
            warn!(
                total = config.weights.total(),
                "component weights do not sum to 1.0; scores will be clamped to [0, 100]"
            );
        }
        Ok(Self { config })
    }

    pub fn score_record(&self, record: &FeatureRecord) -> ScoreRecord {
        let components = rules::score_components(record, &self.config);
        let score = rules::composite_score(&components);

        ScoreRecord {
            identity: record.identity.clone(),
            score,
            class_label: self.config.thresholds.classify(score),
            top_drivers: policy::rank_drivers(&components),
            score_date: record.reference_time.date_naive(),
        }
    }

    pub fn explain(&self, record: &FeatureRecord) -> ScoreBreakdown {
        let components = rules::score_components(record, &self.config);
        let score = rules::composite_score(&components);

        ScoreBreakdown {
            identity: record.identity.clone(),
            components,
            score,
            class_label: self.config.thresholds.classify(score),
        }
    }

    /// Scores records in parallel; output order matches input order.
    pub fn score_all(&self, features: &[FeatureRecord]) -> Vec<ScoreRecord> {
        debug!(records = features.len(), "scoring feature records");
        features
            .par_iter()
            .map(|record| self.score_record(record))
            .collect()
    }
}

/// Validates `config` before touching any record, then scores every record.
pub fn score(
    features: &[FeatureRecord],
    config: &ScoringConfig,
) -> Result<Vec<ScoreRecord>, ScoringConfigError> {
    let scorer = ReadinessScorer::new(config.clone())?;
    Ok(scorer.score_all(features))
}
