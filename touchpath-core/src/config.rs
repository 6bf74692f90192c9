//! Configuration for an attribution run.
//!
//! Everything here is validated once, before any record is touched:
//! a bad window or a split that does not add up to one aborts the run
//! instead of quietly producing wrong credits.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default trailing lookback window in days
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Longest accepted lookback window, one hundred years
pub const MAX_WINDOW_DAYS: i64 = 36_500;

/// Default minimum occurrences for a path to appear in the grouped report
pub const DEFAULT_MIN_PATH_OCCURRENCES: usize = 2;

/// Default separator between channels in a pathway string
pub const DEFAULT_PATH_SEPARATOR: &str = " → ";

/// Complete attribution configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributionConfig {
    #[serde(default)]
    pub window: WindowConfig,

    #[serde(default)]
    pub position_split: PositionSplit,

    #[serde(default)]
    pub pathway: PathwayConfig,
}

impl AttributionConfig {
    /// Parse a config from TOML text; missing sections take their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Check every section, returning the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.window.validate()?;
        self.position_split.validate()?;
        self.pathway.validate()
    }
}

/// Lookback window settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Touchpoints older than this many days before a conversion are ignored (default: 30)
    pub days: i64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            days: DEFAULT_WINDOW_DAYS,
        }
    }
}

impl WindowConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.days <= 0 {
            return Err(ConfigError::NonPositiveWindow(self.days));
        }
        if self.days > MAX_WINDOW_DAYS {
            return Err(ConfigError::WindowTooLong {
                days: self.days,
                max: MAX_WINDOW_DAYS,
            });
        }
        Ok(())
    }

    pub fn duration(&self) -> Result<chrono::Duration, ConfigError> {
        self.validate()?;
        chrono::Duration::try_days(self.days).ok_or(ConfigError::WindowTooLong {
            days: self.days,
            max: MAX_WINDOW_DAYS,
        })
    }
}

/// Weights for the U-shaped position-based model.
///
/// With three or more touchpoints the first and last touch receive their
/// weights and the middle weight is shared evenly by everything between.
/// Weights are written as plain TOML numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionSplit {
    /// Share for the first touchpoint (default: 0.4)
    #[serde(with = "rust_decimal::serde::float")]
    pub first_touch: Decimal,
    /// Share for the last touchpoint (default: 0.4)
    #[serde(with = "rust_decimal::serde::float")]
    pub last_touch: Decimal,
    /// Share divided across middle touchpoints (default: 0.2)
    #[serde(with = "rust_decimal::serde::float")]
    pub middle: Decimal,
}

impl Default for PositionSplit {
    fn default() -> Self {
        Self {
            first_touch: Decimal::new(4, 1),
            last_touch: Decimal::new(4, 1),
            middle: Decimal::new(2, 1),
        }
    }
}

impl PositionSplit {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("first_touch", self.first_touch),
            ("last_touch", self.last_touch),
            ("middle", self.middle),
        ] {
            if value < Decimal::ZERO {
                return Err(ConfigError::NegativeWeight { name, value });
            }
        }

        let sum = self.first_touch + self.last_touch + self.middle;
        if sum != Decimal::ONE {
            return Err(ConfigError::SplitSum {
                first_touch: self.first_touch,
                last_touch: self.last_touch,
                middle: self.middle,
                sum,
            });
        }
        Ok(())
    }

    /// Shares for a two-touch journey as (first, last).
    ///
    /// The endpoint weights are renormalised so the pair sums to one; with
    /// the symmetric defaults that is an even 50/50. Falls back to 50/50
    /// when both endpoint weights are zero.
    pub fn two_touch_shares(&self) -> (Decimal, Decimal) {
        let endpoints = self.first_touch + self.last_touch;
        if endpoints.is_zero() {
            let half = Decimal::new(5, 1);
            return (half, half);
        }
        let first = self.first_touch / endpoints;
        (first, Decimal::ONE - first)
    }
}

/// Pathway report settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathwayConfig {
    /// Paths seen fewer times than this are left out of the grouped report (default: 2)
    pub min_occurrences: usize,
    /// Text placed between channels in a path string (default: " → ")
    pub separator: String,
}

impl Default for PathwayConfig {
    fn default() -> Self {
        Self {
            min_occurrences: DEFAULT_MIN_PATH_OCCURRENCES,
            separator: DEFAULT_PATH_SEPARATOR.to_string(),
        }
    }
}

impl PathwayConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.separator.is_empty() {
            return Err(ConfigError::EmptySeparator);
        }
        Ok(())
    }
}
