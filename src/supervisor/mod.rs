//! Child process supervision.
//!
//! - [`Program`] — what to launch
//! - [`Supervised`] — one running child, owned from launch to reap
//! - [`Supervisor`] — launch, watch, terminate
mod supervised;
mod supervisor;

pub use supervised::*;
pub use supervisor::*;
