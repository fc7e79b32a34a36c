use super::curves::{BundleAbandonBlend, FrequencyBlend, RecencyCurve, SaturationCurve};
use super::ScoreComponent;
use serde::{Deserialize, Serialize};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-3;

/// Business weights and tier boundaries for the readiness score. Injected by the caller and
/// never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: ComponentWeights,
    pub thresholds: ReadinessThresholds,
    pub curves: ComponentCurves,
}

/// Relative weight of each component. Expected to sum to 1.0, but the final score is clamped
/// either way.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentWeights {
    pub recency: f64,
    pub high_intent: f64,
    pub frequency: f64,
    pub diversity: f64,
    pub bundles_abandon: f64,
}

impl Default for ComponentWeights {
    fn default() -> Self {
        Self {
            recency: 0.30,
            high_intent: 0.25,
            frequency: 0.20,
            diversity: 0.15,
            bundles_abandon: 0.10,
        }
    }
}

impl ComponentWeights {
    pub fn weight_for(&self, component: ScoreComponent) -> f64 {
        match component {
            ScoreComponent::Recency => self.recency,
            ScoreComponent::HighIntent => self.high_intent,
            ScoreComponent::Frequency => self.frequency,
            ScoreComponent::Diversity => self.diversity,
            ScoreComponent::BundlesAbandon => self.bundles_abandon,
        }
    }

    pub fn total(&self) -> f64 {
        ScoreComponent::ordered()
            .into_iter()
            .map(|component| self.weight_for(component))
            .sum()
    }

    pub fn is_normalized(&self) -> bool {
        (self.total() - 1.0).abs() <= WEIGHT_SUM_TOLERANCE
    }
}

/// Lower bounds (inclusive) of the NURTURE and READY bands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessThresholds {
    pub nurture_floor: f64,
    pub ready_floor: f64,
}

impl Default for ReadinessThresholds {
    fn default() -> Self {
        Self {
            nurture_floor: 40.0,
            ready_floor: 70.0,
        }
    }
}

/// Transform per component. Swappable without touching the composition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentCurves {
    pub recency: RecencyCurve,
    pub high_intent: SaturationCurve,
    pub frequency: FrequencyBlend,
    pub diversity: SaturationCurve,
    pub bundles_abandon: BundleAbandonBlend,
}

impl Default for ComponentCurves {
    fn default() -> Self {
        Self {
            recency: RecencyCurve::default(),
            high_intent: SaturationCurve::Geometric { first_share: 0.8 },
            frequency: FrequencyBlend::default(),
            diversity: SaturationCurve::Linear {
                points_per_unit: 20.0,
            },
            bundles_abandon: BundleAbandonBlend::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringConfigError {
    #[error("{component} weight must be a non-negative number, got {weight}")]
    InvalidWeight {
        component: ScoreComponent,
        weight: f64,
    },
    #[error("{name} must be a finite number, got {value}")]
    NonFiniteThreshold { name: &'static str, value: f64 },
    #[error("nurture_floor ({nurture_floor}) must be below ready_floor ({ready_floor})")]
    InvertedThresholds { nurture_floor: f64, ready_floor: f64 },
    #[error("invalid {component} curve: {reason}")]
    InvalidCurve {
        component: ScoreComponent,
        reason: String,
    },
}

impl ScoringConfig {
    /// Rejects configurations that cannot yield a meaningful classification.
    pub fn validate(&self) -> Result<(), ScoringConfigError> {
        for component in ScoreComponent::ordered() {
            let weight = self.weights.weight_for(component);
            if !weight.is_finite() || weight < 0.0 {
                return Err(ScoringConfigError::InvalidWeight { component, weight });
            }
        }

        let ReadinessThresholds {
            nurture_floor,
            ready_floor,
        } = self.thresholds;
        for (name, value) in [("nurture_floor", nurture_floor), ("ready_floor", ready_floor)] {
            if !value.is_finite() {
                return Err(ScoringConfigError::NonFiniteThreshold { name, value });
            }
        }
        if nurture_floor >= ready_floor {
            return Err(ScoringConfigError::InvertedThresholds {
                nurture_floor,
                ready_floor,
            });
        }

        let curves = &self.curves;
        let checks = [
            (ScoreComponent::Recency, curves.recency.check()),
            (ScoreComponent::HighIntent, curves.high_intent.check()),
            (ScoreComponent::Frequency, curves.frequency.check()),
            (ScoreComponent::Diversity, curves.diversity.check()),
            (ScoreComponent::BundlesAbandon, curves.bundles_abandon.check()),
        ];
        for (component, check) in checks {
            check.map_err(|reason| ScoringConfigError::InvalidCurve { component, reason })?;
        }

        Ok(())
    }
}
