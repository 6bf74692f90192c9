use super::types::{
    ConfigOverrides, RawAttributionConfig, RawPathwayConfig, RawPositionSplit, RawWindowConfig,
};
use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use touchpath_core::AttributionConfig;
use tracing::debug;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user + project)
    pub fn load() -> Result<AttributionConfig> {
        Self::load_with(&ConfigOverrides::default())
    }

    /// Load merged configuration with command-line layers on top
    ///
    /// Precedence, lowest first: defaults, user file, project file,
    /// `--config` file, flags.
    pub fn load_with(overrides: &ConfigOverrides) -> Result<AttributionConfig> {
        let mut raw = RawAttributionConfig::default();

        // Layer 1: User config
        let user_path = Self::user_config_path();
        if user_path.exists() {
            raw = Self::merge_raw(raw, Self::read_raw(&user_path)?);
        }

        // Layer 2: Project config
        let project_path = Self::project_config_path();
        if project_path.exists() {
            raw = Self::merge_raw(raw, Self::read_raw(&project_path)?);
        }

        // Layer 3: Explicit config file (must exist)
        if let Some(path) = &overrides.config_file {
            if !path.exists() {
                bail!("Config file not found: {}", path.display());
            }
            raw = Self::merge_raw(raw, Self::read_raw(path)?);
        }

        // Layer 4: Flags
        raw = Self::merge_raw(
            raw,
            RawAttributionConfig {
                window: RawWindowConfig {
                    days: overrides.window_days,
                },
                pathway: RawPathwayConfig {
                    min_occurrences: overrides.min_occurrences,
                    separator: None,
                },
                ..Default::default()
            },
        );

        Ok(raw.finalize())
    }

    /// Get user config path
    pub fn user_config_path() -> PathBuf {
        touchpath_paths::user_config_file()
    }

    /// Get project config path
    /// Can be overridden with TOUCHPATH_PROJECT_CONFIG_DIR env var (useful for isolated e2e tests)
    pub fn project_config_path() -> PathBuf {
        touchpath_paths::project_config_file()
    }

    fn read_raw(path: &Path) -> Result<RawAttributionConfig> {
        debug!(path = %path.display(), "Reading config layer");
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("Invalid config in {}", path.display()))
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawAttributionConfig, overlay: RawAttributionConfig) -> RawAttributionConfig {
        RawAttributionConfig {
            window: RawWindowConfig {
                days: overlay.window.days.or(base.window.days),
            },
            position_split: RawPositionSplit {
                first_touch: overlay
                    .position_split
                    .first_touch
                    .or(base.position_split.first_touch),
                last_touch: overlay
                    .position_split
                    .last_touch
                    .or(base.position_split.last_touch),
                middle: overlay.position_split.middle.or(base.position_split.middle),
            },
            pathway: RawPathwayConfig {
                min_occurrences: overlay
                    .pathway
                    .min_occurrences
                    .or(base.pathway.min_occurrences),
                separator: overlay.pathway.separator.or(base.pathway.separator),
            },
        }
    }

    /// Load config from a specific path (for testing)
    #[cfg(test)]
    pub fn load_from_path(path: &Path) -> Result<AttributionConfig> {
        if path.exists() {
            Ok(Self::read_raw(path)?.finalize())
        } else {
            Ok(AttributionConfig::default())
        }
    }
}
