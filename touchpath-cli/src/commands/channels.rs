use anyhow::Result;
use clap::Args;

use super::{InputArgs, TuningArgs, attribute};
use crate::display::channel_table;

#[derive(Args, Debug)]
pub struct ChannelsArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub tuning: TuningArgs,
}

pub fn run(args: ChannelsArgs) -> Result<()> {
    let (_, report) = attribute(&args.input, &args.tuning)?;

    if report.channel_summary.is_empty() {
        println!("No attributed conversions.");
        return Ok(());
    }

    println!("{}", channel_table(&report.channel_summary));
    Ok(())
}
