//! Inference Binary
//!
//! Loads the saved model and serves POST /predict.

use anyhow::Context;
use clap::Parser;
use segments::*;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::ServeArgs::parse();
    Logs::new("serve").dir(&args.logs).init()?;
    let store = store::Store::new(&args.model);
    let service = inference::Service::load(store, inference::LogAudit).context("load model")?;
    inference::Server::run(service, &args.bind, args.workers).await?;
    Ok(())
}
