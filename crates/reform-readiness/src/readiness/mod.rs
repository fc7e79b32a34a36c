pub mod domain;
pub mod features;
pub mod pipeline;
pub mod report;
pub mod scoring;

#[cfg(test)]
mod tests;

pub use domain::{Channel, Event, EventProperties, Identity};
pub use features::{extract_features, FeatureConfig, FeatureExtractor, FeatureRecord};
pub use pipeline::{ReadinessConfigError, ReadinessPipeline, ReadinessSettings, ScoringRun};
pub use report::ScoringRunSummary;
pub use scoring::{
    score, Driver, ReadinessClass, ReadinessScorer, ScoreBreakdown, ScoreComponent, ScoreRecord,
    ScoringConfig, ScoringConfigError,
};
