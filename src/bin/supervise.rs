//! Supervisor Binary
//!
//! Runs the inference server and the dashboard as children and tears both
//! down on Ctrl+C, SIGTERM, or when either one exits.

use clap::Parser;
use segments::supervisor::*;
use segments::*;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::SuperviseArgs::parse();
    Logs::new("supervise").dir(&args.logs).init()?;
    let serve = match args.serve {
        Some(path) => path,
        None => cli::SuperviseArgs::sibling("serve")?,
    };
    let dashboard = match args.dashboard {
        Some(path) => path,
        None => cli::SuperviseArgs::sibling("dashboard")?,
    };
    let programs = vec![
        Program::new("inference", serve.to_string_lossy()),
        Program::new("dashboard", dashboard.to_string_lossy()),
    ];
    let mut supervisor = Supervisor::new(Duration::from_secs(args.grace));
    match supervisor.run(programs, shutdown()).await? {
        Watch::Shutdown => Ok(()),
        Watch::Exited { name, .. } => anyhow::bail!("{} exited, supervisor stopped", name),
    }
}
