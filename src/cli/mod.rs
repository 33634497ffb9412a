//! Command line surface of the five binaries.
//!
//! - [`PipelineArgs`] + [`Runner`] — `pipeline --steps …`
//! - [`ServeArgs`], [`DashboardArgs`], [`RetrainArgs`], [`SuperviseArgs`] — one per process
mod args;
mod runner;

pub use args::*;
pub use runner::*;
