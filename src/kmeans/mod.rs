//! Centroid clustering primitive.
//!
//! Everything above this module sees clustering only through [`Partitioner`]:
//! `partition(points, k, seed) → (assignment, centroids, inertia)`.
//!
//! ## Core Types
//!
//! - [`Partitioner`] — The clustering contract
//! - [`Partition`] — Labels, centroids and inertia of one clustering
//! - [`Assignment`] — Row → cluster id mapping
//!
//! ## Algorithms
//!
//! - [`Elkan`] — Lloyd iteration with triangle-inequality pruning, k-means++ seeding
//! - [`Lloyd`] — The same without pruning, for reference and benchmarks
//! - [`Bounds`] — Per-point distance bounds maintained by [`Elkan`]
mod assignment;
mod bounds;
mod elkan;
mod lloyd;
mod partition;

pub use assignment::*;
pub use bounds::*;
pub use elkan::*;
pub use lloyd::*;
pub use partition::*;

use crate::Energy;

/// Euclidean distance.
pub fn distance(a: &[Energy], b: &[Energy]) -> Energy {
    sqdistance(a, b).sqrt()
}

/// Squared Euclidean distance.
pub fn sqdistance(a: &[Energy], b: &[Energy]) -> Energy {
    debug_assert!(a.len() == b.len());
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Index and distance of the nearest centroid. Ties go to the lower index.
pub fn nearest(x: &[Energy], centroids: &[Vec<Energy>]) -> (usize, Energy) {
    centroids
        .iter()
        .map(|c| distance(c, x))
        .enumerate()
        .fold((0, Energy::INFINITY), |(j, best), (i, d)| {
            if d < best { (i, d) } else { (j, best) }
        })
}
