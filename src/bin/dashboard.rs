//! Dashboard Binary
//!
//! Serves the clustered table as filterable scatter data.

use anyhow::Context;
use clap::Parser;
use segments::*;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::DashboardArgs::parse();
    Logs::new("dashboard").dir(&args.logs).init()?;
    let dashboard = visualize::Dashboard::load(&args.clustered)
        .with_context(|| format!("load {}", args.clustered.display()))?;
    visualize::DashboardServer::run(dashboard, &args.bind, args.workers).await?;
    Ok(())
}
