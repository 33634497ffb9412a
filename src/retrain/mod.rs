//! Periodic retraining.
//!
//! - [`Scheduler`] — fixed-interval timer with skip-if-running ticks
//! - [`Retrainer`] — the pipeline one tick runs, raw CSV to saved model
mod retrainer;
mod scheduler;

pub use retrainer::*;
pub use scheduler::*;
