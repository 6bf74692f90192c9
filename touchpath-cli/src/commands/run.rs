//! Full attribution run: compute and write every output collection.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::info;

use super::{InputArgs, TuningArgs, attribute};
use crate::display::summary_table;
use crate::output::write_report;

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub tuning: TuningArgs,

    /// Output directory (default: <data dir>/runs)
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

pub fn run(args: RunArgs) -> Result<()> {
    let (config, report) = attribute(&args.input, &args.tuning)?;

    let output = args
        .output
        .unwrap_or_else(|| touchpath_paths::data_dir().join("runs"));
    let written = write_report(&output, &report, &config)?;
    info!(dir = %output.display(), files = written.len(), "Wrote attribution output");

    println!("{}", summary_table(&report));
    println!();
    println!("Output written to {}", output.display());
    if !report.unattributed.is_empty() {
        println!(
            "{} conversion(s) had no touchpoint in the {}-day window; see unattributed.jsonl",
            report.unattributed.len(),
            config.window.days
        );
    }
    Ok(())
}
