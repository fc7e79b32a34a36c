//! Readiness scoring for anonymous omnichannel renovation journeys.
//!
//! Raw behavioral events are aggregated into one feature record per anonymous identity
//! ([`readiness::features`]) and composed into a bounded 0-100 score with an outreach tier
//! ([`readiness::scoring`]). The `batch` module is the thin CSV shell used by the daily job.

pub mod batch;
pub mod config;
pub mod error;
pub mod readiness;
pub mod telemetry;

pub use readiness::features::{extract_features, FeatureRecord};
pub use readiness::scoring::{score, ScoreRecord, ScoringConfig};
