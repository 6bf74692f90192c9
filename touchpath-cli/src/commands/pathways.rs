use anyhow::Result;
use clap::Args;

use super::{InputArgs, TuningArgs, attribute};
use crate::display::pathway_table;

#[derive(Args, Debug)]
pub struct PathwaysArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub tuning: TuningArgs,

    /// Show at most this many paths
    #[arg(long)]
    pub limit: Option<usize>,
}

pub fn run(args: PathwaysArgs) -> Result<()> {
    let (config, report) = attribute(&args.input, &args.tuning)?;

    if report.pathway_summary.is_empty() {
        println!(
            "No path was seen at least {} time(s).",
            config.pathway.min_occurrences
        );
        return Ok(());
    }

    println!("{}", pathway_table(&report.pathway_summary, args.limit));
    Ok(())
}
