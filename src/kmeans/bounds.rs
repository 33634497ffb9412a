use crate::Energy;

/// Per-point metadata for Elkan's accelerated k-means.
///
/// If we know d(x, c) ≤ u and d(c, c') ≥ 2u, then c' cannot be closer to x
/// than c, so d(x, c') never needs computing.
///
/// - `j` — index of the assigned centroid, c(x)
/// - `lower` — lower bounds l(x, c) for every centroid
/// - `upper` — upper bound u(x) on d(x, c(x))
/// - `stale` — whether `upper` has been loosened by centroid drift
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds {
    j: usize,
    lower: Vec<Energy>,
    upper: Energy,
    stale: bool,
}

impl Bounds {
    /// Exact bounds from the distances to every centroid.
    pub fn exact(distances: Vec<Energy>) -> Self {
        let (j, upper) = distances
            .iter()
            .copied()
            .enumerate()
            .fold((0, Energy::INFINITY), |(j, best), (i, d)| {
                if d < best { (i, d) } else { (j, best) }
            });
        Self {
            j,
            lower: distances,
            upper,
            stale: false,
        }
    }
    pub fn j(&self) -> usize {
        self.j
    }
    pub fn u(&self) -> Energy {
        self.upper
    }
    pub fn stale(&self) -> bool {
        self.stale
    }
    /// Whether centroid j could be closer than the current assignment.
    ///
    /// 1. j ≠ c(x)
    /// 2. u(x) > l(x, j)
    /// 3. u(x) > d(c(x), j) / 2
    pub fn has_shifted(&self, pairwise: &[Vec<Energy>], j: usize) -> bool {
        self.j != j && self.upper > self.lower[j] && self.upper > 0.5 * pairwise[self.j][j]
    }
    /// Tightens the upper bound with the true distance to c(x).
    pub fn refresh(&mut self, distance: Energy) {
        self.lower[self.j] = distance;
        self.upper = distance;
        self.stale = false;
    }
    /// Records the true distance to centroid j, reassigning if closer.
    pub fn witness(&mut self, distance: Energy, j: usize) {
        self.lower[j] = distance;
        if distance < self.upper {
            self.j = j;
            self.upper = distance;
        }
    }
    /// Moves the point to centroid j at a known distance.
    pub fn assign(&mut self, distance: Energy, j: usize) {
        self.j = j;
        self.lower[j] = distance;
        self.upper = distance;
        self.stale = false;
    }
    /// Loosens bounds after centroids move: lowers shrink, upper grows.
    pub fn update(&mut self, drifts: &[Energy]) {
        self.lower
            .iter_mut()
            .zip(drifts.iter())
            .for_each(|(lower, drift)| *lower = (*lower - drift).max(0.));
        self.upper += drifts[self.j];
        self.stale = true;
    }
}
