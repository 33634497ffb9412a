//! Pipeline Binary
//!
//! Runs any of preprocess, visualize, cluster, retrain, always in that order.
//!
//! Options: --steps, --max-k, --clusters, --seed, --strict

use clap::Parser;
use segments::*;

fn main() -> anyhow::Result<()> {
    let args = cli::PipelineArgs::parse();
    Logs::new("pipeline").dir(&args.paths.logs).init()?;
    cli::Runner::from(args).run()
}
