//! Retrain Binary
//!
//! Retrains the model every `--every-days`, skipping a tick while a run is
//! still in flight.
//!
//! Options: --now, --once, --clusters

use anyhow::Context;
use clap::Parser;
use segments::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::RetrainArgs::parse();
    Logs::new("retrain").dir(&args.paths.logs).init()?;
    let every = args.every();
    let job = retrain::Retrainer::new(Paths::from(args.paths)).clusters(args.clusters);
    if args.once {
        use retrain::Retrain;
        return tokio::task::spawn_blocking(move || job.retrain())
            .await?
            .context("retrain");
    }
    retrain::Scheduler::new(job, every)
        .immediate(args.now)
        .run(shutdown())
        .await;
    Ok(())
}
