//! Monotone transforms mapping raw features onto the 0-100 component scale.

use serde::{Deserialize, Serialize};

pub(crate) const MAX_COMPONENT: f64 = 100.0;

/// Non-increasing map from `recency_days` to a component score. The sentinel maps to 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecencyCurve {
    /// Full score up to `full_until_days`, linear decay to 0 at `zero_at_days`.
    Linear {
        full_until_days: f64,
        zero_at_days: f64,
    },
    /// Halves every `half_life_days`.
    Exponential { half_life_days: f64 },
}

impl Default for RecencyCurve {
    fn default() -> Self {
        Self::Linear {
            full_until_days: 1.0,
            zero_at_days: 30.0,
        }
    }
}

impl RecencyCurve {
    pub fn apply(&self, recency_days: Option<f64>) -> f64 {
        let Some(days) = recency_days.filter(|days| days.is_finite()) else {
            return 0.0;
        };
        let days = days.max(0.0);

        let score = match *self {
            Self::Linear {
                full_until_days,
                zero_at_days,
            } => {
                if days <= full_until_days {
                    MAX_COMPONENT
                } else if days >= zero_at_days {
                    0.0
                } else {
                    MAX_COMPONENT
                        * (1.0 - (days - full_until_days) / (zero_at_days - full_until_days))
                }
            }
            Self::Exponential { half_life_days } => {
                MAX_COMPONENT * 0.5_f64.powf(days / half_life_days)
            }
        };

        clamp_component(score)
    }

    pub(crate) fn check(&self) -> Result<(), String> {
        match *self {
            Self::Linear {
                full_until_days,
                zero_at_days,
            } => {
                if !full_until_days.is_finite() || !zero_at_days.is_finite() {
                    return Err("linear recency bounds must be finite".to_string());
                }
                if full_until_days < 0.0 || full_until_days >= zero_at_days {
                    return Err(format!(
                        "linear recency needs 0 <= full_until_days ({full_until_days}) < zero_at_days ({zero_at_days})"
                    ));
                }
                Ok(())
            }
            Self::Exponential { half_life_days } => {
                if half_life_days.is_finite() && half_life_days > 0.0 {
                    Ok(())
                } else {
                    Err(format!(
                        "half_life_days must be positive and finite, got {half_life_days}"
                    ))
                }
            }
        }
    }
}

/// Non-decreasing map from a non-negative amount to a component score, capped at 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SaturationCurve {
    /// `min(100, amount * points_per_unit)`.
    Linear { points_per_unit: f64 },
    /// `100 * (1 - (1 - first_share)^amount)`: the first unit already earns `first_share`.
    Geometric { first_share: f64 },
}

impl SaturationCurve {
    pub fn apply(&self, amount: f64) -> f64 {
        if !amount.is_finite() || amount <= 0.0 {
            return 0.0;
        }

        let score = match *self {
            Self::Linear { points_per_unit } => amount * points_per_unit,
            Self::Geometric { first_share } => {
                MAX_COMPONENT * (1.0 - (1.0 - first_share).powf(amount))
            }
        };

        clamp_component(score)
    }

    pub(crate) fn check(&self) -> Result<(), String> {
        match *self {
            Self::Linear { points_per_unit } => {
                if points_per_unit.is_finite() && points_per_unit > 0.0 {
                    Ok(())
                } else {
                    Err(format!(
                        "points_per_unit must be positive and finite, got {points_per_unit}"
                    ))
                }
            }
            Self::Geometric { first_share } => {
                if first_share > 0.0 && first_share <= 1.0 {
                    Ok(())
                } else {
                    Err(format!("first_share must be in (0, 1], got {first_share}"))
                }
            }
        }
    }
}

/// Blend of the three frequency windows, shorter windows weighted more heavily.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrequencyBlend {
    pub short_weight: f64,
    pub medium_weight: f64,
    pub long_weight: f64,
    pub curve: SaturationCurve,
}

impl Default for FrequencyBlend {
    fn default() -> Self {
        Self {
            short_weight: 0.5,
            medium_weight: 0.3,
            long_weight: 0.2,
            curve: SaturationCurve::Linear {
                points_per_unit: 5.0,
            },
        }
    }
}

impl FrequencyBlend {
    pub fn apply(&self, freq_7d: u32, freq_14d: u32, freq_30d: u32) -> f64 {
        let blended = self.short_weight * f64::from(freq_7d)
            + self.medium_weight * f64::from(freq_14d)
            + self.long_weight * f64::from(freq_30d);
        self.curve.apply(blended)
    }

    pub(crate) fn check(&self) -> Result<(), String> {
        for (name, weight) in [
            ("short_weight", self.short_weight),
            ("medium_weight", self.medium_weight),
            ("long_weight", self.long_weight),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(format!("{name} must be non-negative, got {weight}"));
            }
        }
        self.curve.check()
    }
}

/// Bundle matches and abandoned carts both signal unresolved purchase intent; each saturates
/// on its own curve and the two are combined by share.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BundleAbandonBlend {
    pub bundle_share: f64,
    pub bundle_curve: SaturationCurve,
    pub abandon_share: f64,
    pub abandon_curve: SaturationCurve,
}

impl Default for BundleAbandonBlend {
    fn default() -> Self {
        Self {
            bundle_share: 0.7,
            bundle_curve: SaturationCurve::Linear {
                points_per_unit: 100.0,
            },
            abandon_share: 0.3,
            abandon_curve: SaturationCurve::Linear {
                points_per_unit: 50.0,
            },
        }
    }
}

impl BundleAbandonBlend {
    pub fn apply(&self, reform_bundle_14d: u32, cart_abandon_7d: u32) -> f64 {
        let bundles = self.bundle_curve.apply(f64::from(reform_bundle_14d));
        let abandons = self.abandon_curve.apply(f64::from(cart_abandon_7d));
        clamp_component(self.bundle_share * bundles + self.abandon_share * abandons)
    }

    pub(crate) fn check(&self) -> Result<(), String> {
        for (name, share) in [
            ("bundle_share", self.bundle_share),
            ("abandon_share", self.abandon_share),
        ] {
            if !share.is_finite() || share < 0.0 {
                return Err(format!("{name} must be non-negative, got {share}"));
            }
        }
        if self.bundle_share + self.abandon_share > 1.0 + 1e-9 {
            return Err(format!(
                "bundle_share + abandon_share must not exceed 1.0, got {}",
                self.bundle_share + self.abandon_share
            ));
        }
        self.bundle_curve.check()?;
        self.abandon_curve.check()
    }
}

pub(crate) fn clamp_component(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, MAX_COMPONENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_recency_decays_between_bounds() {
        let curve = RecencyCurve::default();

        assert_eq!(curve.apply(Some(0.0)), 100.0);
        assert_eq!(curve.apply(Some(1.0)), 100.0);
        assert!((curve.apply(Some(15.5)) - 50.0).abs() < 1e-9);
        assert_eq!(curve.apply(Some(30.0)), 0.0);
        assert_eq!(curve.apply(Some(400.0)), 0.0);
    }

    #[test]
    fn recency_sentinel_and_nan_score_zero() {
        let curve = RecencyCurve::Exponential {
            half_life_days: 7.0,
        };

        assert_eq!(curve.apply(None), 0.0);
        assert_eq!(curve.apply(Some(f64::NAN)), 0.0);
        assert!((curve.apply(Some(7.0)) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn recency_is_non_increasing() {
        for curve in [
            RecencyCurve::default(),
            RecencyCurve::Exponential {
                half_life_days: 3.0,
            },
        ] {
            let mut previous = f64::INFINITY;
            for step in 0..200 {
                let score = curve.apply(Some(step as f64 * 0.25));
                assert!(score <= previous, "{curve:?} increased at step {step}");
                previous = score;
            }
        }
    }

    #[test]
    fn geometric_saturation_front_loads_the_first_unit() {
        let curve = SaturationCurve::Geometric { first_share: 0.8 };

        assert_eq!(curve.apply(0.0), 0.0);
        assert!((curve.apply(1.0) - 80.0).abs() < 1e-9);
        assert!((curve.apply(2.0) - 96.0).abs() < 1e-9);
        assert!(curve.apply(50.0) <= 100.0);
    }

    #[test]
    fn linear_saturation_caps_at_maximum() {
        let curve = SaturationCurve::Linear {
            points_per_unit: 20.0,
        };

        assert_eq!(curve.apply(3.0), 60.0);
        assert_eq!(curve.apply(5.0), 100.0);
        assert_eq!(curve.apply(12.0), 100.0);
        assert_eq!(curve.apply(-1.0), 0.0);
    }

    #[test]
    fn frequency_blend_weights_recent_windows() {
        let blend = FrequencyBlend::default();
        // 0.5 * 4 + 0.3 * 6 + 0.2 * 10 = 5.8 weighted events, 5 points each.
        assert!((blend.apply(4, 6, 10) - 29.0).abs() < 1e-9);
        assert_eq!(blend.apply(0, 0, 0), 0.0);
    }

    #[test]
    fn bundle_abandon_blend_matches_signal_shares() {
        let blend = BundleAbandonBlend::default();

        assert!((blend.apply(1, 0) - 70.0).abs() < 1e-9);
        assert!((blend.apply(0, 1) - 15.0).abs() < 1e-9);
        assert!((blend.apply(3, 5) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn curve_checks_reject_degenerate_parameters() {
        assert!(RecencyCurve::Linear {
            full_until_days: 5.0,
            zero_at_days: 5.0
        }
        .check()
        .is_err());
        assert!(SaturationCurve::Geometric { first_share: 0.0 }
            .check()
            .is_err());
        assert!(SaturationCurve::Linear {
            points_per_unit: f64::INFINITY
        }
        .check()
        .is_err());

        let blend = BundleAbandonBlend {
            bundle_share: 0.8,
            abandon_share: 0.4,
            ..BundleAbandonBlend::default()
        };
        assert!(blend.check().is_err());
    }

    #[test]
    fn curves_round_trip_through_tagged_json() {
        let curve: RecencyCurve =
            serde_json::from_str(r#"{"kind": "exponential", "half_life_days": 5.0}"#)
                .expect("tagged curve parses");
        assert_eq!(
            curve,
            RecencyCurve::Exponential {
                half_life_days: 5.0
            }
        );
    }
}
