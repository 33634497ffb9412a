//! Cluster quality scores.
//!
//! - [`Evaluator`] — Validates a partition and computes all three scores
//! - [`Scores`] — Silhouette, Davies–Bouldin, Calinski–Harabasz
//! - [`Groups`] — Populated clusters with their members and centroids
mod calinski;
mod davies;
mod evaluator;
mod groups;
mod silhouette;

pub use calinski::*;
pub use davies::*;
pub use evaluator::*;
pub use groups::*;
pub use silhouette::*;
