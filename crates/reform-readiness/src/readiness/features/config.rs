use crate::readiness::domain::normalize_token;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Upper bound for every window and the lookback, roughly a century.
pub const MAX_WINDOW_DAYS: u32 = 36_500;
/// Upper bound for the cart-abandon grace period.
pub const MAX_ABANDON_HOURS: u32 = MAX_WINDOW_DAYS * 24;

/// Reference data driving feature extraction: windows, intent vocabulary and bundle taxonomy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    pub windows: WindowConfig,
    pub max_lookback_days: u32,
    pub high_intent_events: Vec<String>,
    pub cart_add_event: String,
    pub checkout_event: String,
    pub cart_abandon_hours: u32,
    pub bundles: Vec<BundlePattern>,
}

/// Trailing window lengths in days. The record fields are named after the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub short_days: u32,
    pub medium_days: u32,
    pub long_days: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            short_days: 7,
            medium_days: 14,
            long_days: 30,
        }
    }
}

/// Set of categories that, co-occurring, signal a compound renovation project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BundlePattern {
    pub categories: Vec<String>,
}

impl BundlePattern {
    pub fn new<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            categories: categories.into_iter().map(Into::into).collect(),
        }
    }

    pub(crate) fn normalized(&self) -> BTreeSet<String> {
        self.categories
            .iter()
            .filter_map(|category| normalize_token(category))
            .collect()
    }
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            windows: WindowConfig::default(),
            max_lookback_days: 30,
            high_intent_events: [
                "submit_quote",
                "messaging_quote_request",
                "whatsapp_quote_request",
                "scan_service_code",
                "scan_qr_service",
                "talk_to_consultant",
                "begin_checkout",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
            cart_add_event: "add_to_cart".to_string(),
            checkout_event: "begin_checkout".to_string(),
            cart_abandon_hours: 24,
            bundles: vec![
                BundlePattern::new(["floor", "baseboard"]),
                BundlePattern::new(["paint", "filler", "sandpaper"]),
                BundlePattern::new(["tile", "grout"]),
                BundlePattern::new(["door", "lock"]),
                BundlePattern::new(["window", "blinds"]),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FeatureConfigError {
    #[error("window lengths must be non-zero (short {short}, medium {medium}, long {long})")]
    ZeroWindow { short: u32, medium: u32, long: u32 },
    #[error("windows must be nested: short {short} <= medium {medium} <= long {long}")]
    WindowsNotNested { short: u32, medium: u32, long: u32 },
    #[error("max_lookback_days must be at least 1")]
    ZeroLookback,
    #[error("{field} is {days} days, above the 36500-day limit")]
    WindowTooLong { field: &'static str, days: u32 },
    #[error("cart_abandon_hours is {0}, above the 876000-hour limit")]
    GraceTooLong(u32),
    #[error("{field} must name an event")]
    BlankEventName { field: &'static str },
    #[error("cart_add_event and checkout_event must differ (both '{0}')")]
    SameCartEvents(String),
    #[error("bundle pattern #{index} needs at least two distinct categories, found {found}")]
    UndersizedBundle { index: usize, found: usize },
}

impl FeatureConfig {
    pub fn validate(&self) -> Result<(), FeatureConfigError> {
        let WindowConfig {
            short_days: short,
            medium_days: medium,
            long_days: long,
        } = self.windows;

        if short == 0 || medium == 0 || long == 0 {
            return Err(FeatureConfigError::ZeroWindow {
                short,
                medium,
                long,
            });
        }
        if short > medium || medium > long {
            return Err(FeatureConfigError::WindowsNotNested {
                short,
                medium,
                long,
            });
        }
        if self.max_lookback_days == 0 {
            return Err(FeatureConfigError::ZeroLookback);
        }
        for (field, days) in [
            ("long_days", long),
            ("max_lookback_days", self.max_lookback_days),
        ] {
            if days > MAX_WINDOW_DAYS {
                return Err(FeatureConfigError::WindowTooLong { field, days });
            }
        }
        if self.cart_abandon_hours > MAX_ABANDON_HOURS {
            return Err(FeatureConfigError::GraceTooLong(self.cart_abandon_hours));
        }
        if normalize_token(&self.cart_add_event).is_none() {
            return Err(FeatureConfigError::BlankEventName {
                field: "cart_add_event",
            });
        }
        if normalize_token(&self.checkout_event).is_none() {
            return Err(FeatureConfigError::BlankEventName {
                field: "checkout_event",
            });
        }

        if normalize_token(&self.cart_add_event) == normalize_token(&self.checkout_event) {
            return Err(FeatureConfigError::SameCartEvents(
                self.cart_add_event.trim().to_string(),
            ));
        }

        for (index, bundle) in self.bundles.iter().enumerate() {
            let found = bundle.normalized().len();
            if found < 2 {
                return Err(FeatureConfigError::UndersizedBundle { index, found });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(FeatureConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_windows_that_are_not_nested() {
        let mut config = FeatureConfig::default();
        config.windows.medium_days = 40;

        assert_eq!(
            config.validate(),
            Err(FeatureConfigError::WindowsNotNested {
                short: 7,
                medium: 40,
                long: 30
            })
        );
    }

    #[test]
    fn rejects_bundles_that_collapse_to_one_category() {
        let mut config = FeatureConfig::default();
        config.bundles.push(BundlePattern::new(["Tile", " tile "]));

        assert_eq!(
            config.validate(),
            Err(FeatureConfigError::UndersizedBundle { index: 5, found: 1 })
        );
    }

    #[test]
    fn rejects_unbounded_lookback_and_grace() {
        let mut config = FeatureConfig::default();
        config.max_lookback_days = u32::MAX;
        assert_eq!(
            config.validate(),
            Err(FeatureConfigError::WindowTooLong {
                field: "max_lookback_days",
                days: u32::MAX
            })
        );

        let mut config = FeatureConfig::default();
        config.windows.long_days = MAX_WINDOW_DAYS + 1;
        config.windows.medium_days = MAX_WINDOW_DAYS + 1;
        assert_eq!(
            config.validate(),
            Err(FeatureConfigError::WindowTooLong {
                field: "long_days",
                days: MAX_WINDOW_DAYS + 1
            })
        );

        let mut config = FeatureConfig::default();
        config.cart_abandon_hours = u32::MAX;
        assert_eq!(
            config.validate(),
            Err(FeatureConfigError::GraceTooLong(u32::MAX))
        );

        let mut config = FeatureConfig::default();
        config.max_lookback_days = MAX_WINDOW_DAYS;
        config.cart_abandon_hours = MAX_ABANDON_HOURS;
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: FeatureConfig =
            serde_json::from_str(r#"{"cart_abandon_hours": 48, "windows": {"short_days": 3}}"#)
                .expect("partial config parses");

        assert_eq!(config.cart_abandon_hours, 48);
        assert_eq!(config.windows.short_days, 3);
        assert_eq!(config.windows.long_days, 30);
        assert_eq!(config.bundles.len(), 5);
    }
}
