use super::*;
use super::elkan::Run;
use super::elkan::best_of;
use crate::Energy;
use crate::KMEANS_ITERATIONS;
use crate::KMEANS_RESTARTS;
use crate::KMEANS_TOLERANCE;

/// Plain Lloyd iteration: every point against every centroid, every step.
///
/// Same seeding, stopping rule and restarts as [`Elkan`], without the
/// distance bounds. Kept as the reference the accelerated version is
/// measured against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lloyd {
    iterations: usize,
    tolerance: Energy,
    restarts: usize,
}

impl Default for Lloyd {
    fn default() -> Self {
        Self {
            iterations: KMEANS_ITERATIONS,
            tolerance: KMEANS_TOLERANCE,
            restarts: KMEANS_RESTARTS,
        }
    }
}

impl Lloyd {
    pub fn new(iterations: usize, tolerance: Energy, restarts: usize) -> Self {
        Self {
            iterations,
            tolerance,
            restarts: restarts.max(1),
        }
    }
}

impl Partitioner for Lloyd {
    fn partition(&self, points: &[Vec<Energy>], k: usize, seed: u64) -> Partition {
        best_of(points, k, seed, self.iterations, self.tolerance, self.restarts, Run::naive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agrees_with_elkan_on_separated_data() {
        let points = (0..30)
            .map(|i| {
                let center = (i % 3) as Energy * 10.;
                vec![center + (i as Energy * 0.37).sin(), center - (i as Energy * 0.91).cos()]
            })
            .collect::<Vec<_>>();
        let naive = Lloyd::default().partition(&points, 3, 7);
        let elkan = Elkan::default().partition(&points, 3, 7);
        assert_eq!(naive.assignment, elkan.assignment);
        assert!((naive.inertia - elkan.inertia).abs() < 1e-9);
    }
}
