use std::path::PathBuf;

use rust_decimal::Decimal;
use serde::Deserialize;
use touchpath_core::{AttributionConfig, PathwayConfig, PositionSplit, WindowConfig};

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawAttributionConfig {
    #[serde(default)]
    pub window: RawWindowConfig,

    #[serde(default)]
    pub position_split: RawPositionSplit,

    #[serde(default)]
    pub pathway: RawPathwayConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawWindowConfig {
    /// Lookback window in days
    pub days: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawPositionSplit {
    pub first_touch: Option<Decimal>,
    pub last_touch: Option<Decimal>,
    pub middle: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawPathwayConfig {
    /// Minimum conversions for a path to be listed
    pub min_occurrences: Option<usize>,

    /// Text between channels in a path
    pub separator: Option<String>,
}

impl RawAttributionConfig {
    /// Apply defaults to every unset field
    pub fn finalize(self) -> AttributionConfig {
        let window = WindowConfig::default();
        let split = PositionSplit::default();
        let pathway = PathwayConfig::default();

        AttributionConfig {
            window: WindowConfig {
                days: self.window.days.unwrap_or(window.days),
            },
            position_split: PositionSplit {
                first_touch: self.position_split.first_touch.unwrap_or(split.first_touch),
                last_touch: self.position_split.last_touch.unwrap_or(split.last_touch),
                middle: self.position_split.middle.unwrap_or(split.middle),
            },
            pathway: PathwayConfig {
                min_occurrences: self
                    .pathway
                    .min_occurrences
                    .unwrap_or(pathway.min_occurrences),
                separator: self.pathway.separator.unwrap_or(pathway.separator),
            },
        }
    }
}

/// Command-line layers applied on top of the config files
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Extra config file, applied after user and project files
    pub config_file: Option<PathBuf>,
    pub window_days: Option<i64>,
    pub min_occurrences: Option<usize>,
}
