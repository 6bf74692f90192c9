pub mod channels;
pub mod config;
pub mod pathways;
pub mod run;

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use touchpath_core::{AttributionConfig, AttributionPipeline, AttributionReport};

use crate::config::{ConfigLoader, ConfigOverrides};
use crate::input::load_batch;

/// Source files for a run
#[derive(Args, Debug)]
pub struct InputArgs {
    /// Web analytics events, one JSON object per line
    #[arg(long)]
    pub events: PathBuf,

    /// Ad impressions, one JSON object per line
    #[arg(long)]
    pub impressions: Option<PathBuf>,
}

/// Config layers given on the command line
#[derive(Args, Debug)]
pub struct TuningArgs {
    /// Extra config file, applied over user and project config
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Lookback window in days
    #[arg(long)]
    pub window_days: Option<i64>,

    /// Minimum conversions for a path to be listed
    #[arg(long)]
    pub min_occurrences: Option<usize>,
}

impl TuningArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config_file: self.config.clone(),
            window_days: self.window_days,
            min_occurrences: self.min_occurrences,
        }
    }
}

/// Load config and sources, then run the pipeline.
fn attribute(
    input: &InputArgs,
    tuning: &TuningArgs,
) -> Result<(AttributionConfig, AttributionReport)> {
    let config = ConfigLoader::load_with(&tuning.overrides())?;
    let pipeline = AttributionPipeline::new(config.clone())?;
    let batch = load_batch(&input.events, input.impressions.as_deref())?;
    let report = pipeline.run(&batch)?;
    Ok((config, report))
}
