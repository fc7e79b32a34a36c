//! Windowed aggregation of raw events into one fixed-shape feature record per identity.

mod config;
mod sequence;
mod windows;

pub use config::{
    BundlePattern, FeatureConfig, FeatureConfigError, WindowConfig, MAX_WINDOW_DAYS,
};

use crate::readiness::domain::{normalize_token, Event, Identity};
use chrono::{DateTime, Duration, Utc};
use rayon::prelude::*;
use sequence::Timeline;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::debug;
use windows::TrailingWindow;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Engagement features for one identity, relative to a fixed reference instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub identity: Identity,
    pub reference_time: DateTime<Utc>,
    /// Days since the latest event at or before the reference instant; `None` when no such
    /// event falls inside the maximum lookback.
    pub recency_days: Option<f64>,
    pub freq_7d: u32,
    pub freq_14d: u32,
    pub freq_30d: u32,
    pub high_intent_7d: u32,
    pub category_diversity_14d: u32,
    pub cart_abandon_7d: u32,
    pub reform_bundle_14d: u32,
}

impl FeatureRecord {
    /// Record with no engagement at all: sentinel recency and zeroed counters.
    pub fn dormant(identity: Identity, reference_time: DateTime<Utc>) -> Self {
        Self {
            identity,
            reference_time,
            recency_days: None,
            freq_7d: 0,
            freq_14d: 0,
            freq_30d: 0,
            high_intent_7d: 0,
            category_diversity_14d: 0,
            cart_abandon_7d: 0,
            reform_bundle_14d: 0,
        }
    }
}

/// Validated configuration in the shape the per-identity scan consumes.
#[derive(Debug, Clone)]
pub(crate) struct CompiledRules {
    pub(crate) windows: WindowConfig,
    pub(crate) max_lookback_days: u32,
    pub(crate) high_intent: HashSet<String>,
    pub(crate) cart_add: String,
    pub(crate) checkout: String,
    pub(crate) abandon_grace: Duration,
    pub(crate) bundles: Vec<BTreeSet<String>>,
}

impl CompiledRules {
    pub(crate) fn compile(config: &FeatureConfig) -> Self {
        let mut bundles: Vec<BTreeSet<String>> = Vec::with_capacity(config.bundles.len());
        for bundle in config.bundles.iter().map(BundlePattern::normalized) {
            if !bundles.contains(&bundle) {
                bundles.push(bundle);
            }
        }

        Self {
            windows: config.windows,
            max_lookback_days: config.max_lookback_days,
            high_intent: config
                .high_intent_events
                .iter()
                .filter_map(|name| normalize_token(name))
                .collect(),
            cart_add: normalize_token(&config.cart_add_event).unwrap_or_default(),
            checkout: normalize_token(&config.checkout_event).unwrap_or_default(),
            abandon_grace: Duration::hours(i64::from(config.cart_abandon_hours)),
            bundles,
        }
    }
}

/// Stateless extractor; each call is a pure function of the events and the reference instant.
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    rules: CompiledRules,
}

impl FeatureExtractor {
    pub fn new(config: &FeatureConfig) -> Result<Self, FeatureConfigError> {
        config.validate()?;
        Ok(Self {
            rules: CompiledRules::compile(config),
        })
    }

    /// Extractor over the default reference data.
    pub fn standard() -> Self {
        Self {
            rules: CompiledRules::compile(&FeatureConfig::default()),
        }
    }

    /// Produces exactly one record per distinct identity in `events`, ordered by identity.
    pub fn extract(&self, events: &[Event], reference_time: DateTime<Utc>) -> Vec<FeatureRecord> {
        let mut grouped: BTreeMap<&Identity, Vec<&Event>> = BTreeMap::new();
        for event in events {
            grouped.entry(&event.identity).or_default().push(event);
        }

        debug!(
            events = events.len(),
            identities = grouped.len(),
            %reference_time,
            "extracting readiness features"
        );

        let groups: Vec<(&Identity, Vec<&Event>)> = grouped.into_iter().collect();
        groups
            .into_par_iter()
            .map(|(identity, events)| self.extract_identity(identity, &events, reference_time))
            .collect()
    }

    fn extract_identity(
        &self,
        identity: &Identity,
        events: &[&Event],
        reference_time: DateTime<Utc>,
    ) -> FeatureRecord {
        let rules = &self.rules;
        let timeline = Timeline::build(events, rules);

        let short = TrailingWindow::days(reference_time, rules.windows.short_days);
        let medium = TrailingWindow::days(reference_time, rules.windows.medium_days);
        let long = TrailingWindow::days(reference_time, rules.windows.long_days);
        let lookback = TrailingWindow::days(reference_time, rules.max_lookback_days);

        let mut record = FeatureRecord::dormant(identity.clone(), reference_time);
        let mut categories: BTreeSet<&str> = BTreeSet::new();

        for entry in timeline.entries() {
            if long.contains(entry.at) {
                record.freq_30d += 1;
            }
            if medium.contains(entry.at) {
                record.freq_14d += 1;
                if let Some(category) = entry.category.as_deref() {
                    categories.insert(category);
                }
            }
            if short.contains(entry.at) {
                record.freq_7d += 1;
                if entry.high_intent {
                    record.high_intent_7d += 1;
                }
            }
        }

        record.recency_days = timeline
            .latest_at_or_before(reference_time)
            .filter(|latest| lookback.contains(*latest))
            .map(|latest| (reference_time - latest).num_milliseconds() as f64 / MILLIS_PER_DAY);

        record.category_diversity_14d = categories.len() as u32;
        record.reform_bundle_14d = rules
            .bundles
            .iter()
            .filter(|bundle| {
                bundle
                    .iter()
                    .all(|category| categories.contains(category.as_str()))
            })
            .count() as u32;
        record.cart_abandon_7d = timeline.abandoned_carts(short, rules.abandon_grace);

        record
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::standard()
    }
}

/// Extracts feature records with the default reference data.
pub fn extract_features(events: &[Event], reference_time: DateTime<Utc>) -> Vec<FeatureRecord> {
    FeatureExtractor::standard().extract(events, reference_time)
}
