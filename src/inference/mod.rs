//! Nearest-centroid prediction behind a schema contract.
//!
//! - [`Service`] — holds the current [`Artifact`](crate::store::Artifact), validates and predicts
//! - [`Audit`] — sink for one record per served batch
//! - [`Server`] — the HTTP endpoint (`server` feature)
mod audit;
mod service;

#[cfg(feature = "server")]
mod server;

pub use audit::*;
pub use service::*;

#[cfg(feature = "server")]
pub use server::*;
