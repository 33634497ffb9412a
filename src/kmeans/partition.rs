use super::*;
use crate::Energy;

/// Result of clustering `n` points into `k` groups.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    pub assignment: Assignment,
    pub centroids: Vec<Vec<Energy>>,
    /// Sum of squared distances from each point to its assigned centroid.
    pub inertia: Energy,
    /// Lloyd iterations used by the winning run.
    pub iterations: usize,
}

/// Centroid clustering contract.
///
/// Implementations must be deterministic for a fixed `seed`, produce labels
/// in `[0, k)`, and report inertia. Callers guarantee `1 ≤ k ≤ points.len()`
/// and that every point has the same nonzero dimension.
pub trait Partitioner: Send + Sync {
    fn partition(&self, points: &[Vec<Energy>], k: usize, seed: u64) -> Partition;
}
