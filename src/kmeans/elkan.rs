use super::*;
use crate::Energy;
use crate::KMEANS_ITERATIONS;
use crate::KMEANS_RESTARTS;
use crate::KMEANS_TOLERANCE;
use rayon::prelude::*;

/// Triangle-inequality accelerated k-means (Elkan 2003).
///
/// Maintains upper/lower bounds on point-centroid distances so most
/// distance computations are skipped, while producing the same centroids as
/// naive Lloyd iteration at every step.
///
/// - k-means++ seeding from a `SmallRng` seeded with `seed + restart`
/// - empty clusters are healed by moving their centroid onto the point
///   farthest from its own centroid
/// - iteration stops when the summed squared centroid drift falls below
///   `tolerance × mean feature variance`, or after `iterations` steps
/// - the lowest-inertia restart wins; ties keep the earliest
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Elkan {
    iterations: usize,
    tolerance: Energy,
    restarts: usize,
}

impl Default for Elkan {
    fn default() -> Self {
        Self {
            iterations: KMEANS_ITERATIONS,
            tolerance: KMEANS_TOLERANCE,
            restarts: KMEANS_RESTARTS,
        }
    }
}

impl Elkan {
    pub fn new(iterations: usize, tolerance: Energy, restarts: usize) -> Self {
        Self {
            iterations,
            tolerance,
            restarts: restarts.max(1),
        }
    }
}

impl Partitioner for Elkan {
    fn partition(&self, points: &[Vec<Energy>], k: usize, seed: u64) -> Partition {
        best_of(points, k, seed, self.iterations, self.tolerance, self.restarts, Run::step)
    }
}

/// Lowest-inertia partition over `restarts` runs seeded `seed, seed + 1, …`.
/// Ties keep the earliest run.
pub(crate) fn best_of<'a>(
    points: &'a [Vec<Energy>],
    k: usize,
    seed: u64,
    iterations: usize,
    tolerance: Energy,
    restarts: usize,
    step: fn(&mut Run<'a>) -> Energy,
) -> Partition {
    debug_assert!(k >= 1 && k <= points.len());
    let threshold = tolerance * variance(points);
    let restart = |r: u64| {
        let mut run = Run::new(points, k, seed.wrapping_add(r));
        let mut t = 0;
        while t < iterations {
            t += 1;
            if step(&mut run) <= threshold {
                break;
            }
        }
        let p = run.finish(t);
        log::trace!("{:<32}{:<32}", "kmeans restart inertia", p.inertia);
        p
    };
    let first = restart(0);
    (1..restarts.max(1) as u64)
        .map(restart)
        .fold(first, |best, next| if next.inertia < best.inertia { next } else { best })
}

/// Mean per-feature population variance.
fn variance(points: &[Vec<Energy>]) -> Energy {
    let n = points.len() as Energy;
    let d = points.first().map(Vec::len).unwrap_or(0);
    if d == 0 {
        return 0.;
    }
    (0..d)
        .map(|f| {
            let mean = points.iter().map(|p| p[f]).sum::<Energy>() / n;
            points.iter().map(|p| (p[f] - mean) * (p[f] - mean)).sum::<Energy>() / n
        })
        .sum::<Energy>()
        / d as Energy
}

/// State of one seeded k-means run.
pub(crate) struct Run<'a> {
    points: &'a [Vec<Energy>],
    kmeans: Vec<Vec<Energy>>,
    bounds: Vec<Bounds>,
}

impl<'a> Run<'a> {
    pub(crate) fn new(points: &'a [Vec<Energy>], k: usize, seed: u64) -> Self {
        let kmeans = Self::init_kmeans(points, k, seed);
        let bounds = points
            .par_iter()
            .map(|x| kmeans.iter().map(|c| distance(c, x)).collect())
            .map(Bounds::exact)
            .collect();
        Self {
            points,
            kmeans,
            bounds,
        }
    }

    pub(crate) fn kmeans(&self) -> &[Vec<Energy>] {
        &self.kmeans
    }

    /// k-means++ initialization: first centroid uniform, then each next one
    /// sampled proportionally to squared distance from the nearest chosen.
    /// When every remaining point coincides with a chosen centroid the
    /// lowest unchosen index is taken instead.
    fn init_kmeans(points: &[Vec<Energy>], k: usize, seed: u64) -> Vec<Vec<Energy>> {
        use rand::Rng;
        use rand::SeedableRng;
        use rand::distr::Distribution;
        use rand::distr::weighted::WeightedIndex;
        use rand::rngs::SmallRng;
        let ref mut rng = SmallRng::seed_from_u64(seed);
        let n = points.len();
        let mut chosen = vec![rng.random_range(0..n)];
        let mut potentials = points
            .par_iter()
            .map(|p| sqdistance(p, &points[chosen[0]]))
            .collect::<Vec<Energy>>();
        while chosen.len() < k {
            let i = match WeightedIndex::new(potentials.iter()) {
                Ok(weights) => weights.sample(rng),
                Err(_) => (0..n).find(|i| !chosen.contains(i)).unwrap_or(0),
            };
            chosen.push(i);
            let ref x = points[i];
            potentials = points
                .par_iter()
                .map(|p| sqdistance(p, x))
                .collect::<Vec<Energy>>()
                .into_iter()
                .zip(potentials.iter())
                .map(|(d0, d1)| Energy::min(d0, *d1))
                .collect();
        }
        chosen.into_iter().map(|i| points[i].clone()).collect()
    }

    /// Computes d(c, c') for all centroid pairs.
    fn pairwise(&self) -> Vec<Vec<Energy>> {
        self.kmeans
            .par_iter()
            .map(|a| self.kmeans.iter().map(|b| distance(a, b)).collect())
            .collect()
    }

    /// Computes s(c) = (1/2) min_{c'≠c} d(c, c').
    fn midpoints(pairwise: &[Vec<Energy>]) -> Vec<Energy> {
        pairwise
            .iter()
            .enumerate()
            .map(|(i, row)| {
                row.iter()
                    .enumerate()
                    .filter(|(j, _)| *j != i)
                    .map(|(_, d)| d * 0.5)
                    .fold(Energy::INFINITY, Energy::min)
            })
            .collect()
    }

    /// Executes one Elkan iteration and returns the summed squared drift.
    ///
    /// 1. Update bounds and reassign points against current centroids
    /// 2. Recompute centroids from assignments, healing empty clusters
    /// 3. Loosen bounds by how far each centroid moved
    pub(crate) fn step(&mut self) -> Energy {
        let pairwise = self.pairwise();
        let midpoints = Self::midpoints(&pairwise);
        let points: &[Vec<Energy>] = self.points;
        let kmeans = &self.kmeans;
        self.bounds
            .par_iter_mut()
            .enumerate()
            .filter(|(_, b)| b.u() > midpoints[b.j()])
            .for_each(|(i, b)| {
                let ref x = points[i];
                if b.stale() {
                    b.refresh(distance(x, &kmeans[b.j()]));
                }
                for j in 0..kmeans.len() {
                    if b.has_shifted(&pairwise, j) {
                        b.witness(distance(x, &kmeans[j]), j);
                    }
                }
            });
        let news = self.centroids();
        let drifts = news
            .iter()
            .zip(self.kmeans.iter())
            .map(|(new, old)| distance(new, old))
            .collect::<Vec<Energy>>();
        self.bounds.par_iter_mut().for_each(|b| b.update(&drifts));
        self.kmeans = news;
        drifts.iter().map(|d| d * d).sum()
    }

    /// Means of assigned points. An empty cluster takes over the point
    /// farthest from its centroid, if any point is off its centroid at all.
    fn centroids(&mut self) -> Vec<Vec<Energy>> {
        let k = self.kmeans.len();
        let d = self.kmeans[0].len();
        let mut sums = vec![vec![0.; d]; k];
        let mut counts = vec![0usize; k];
        for (b, x) in self.bounds.iter().zip(self.points.iter()) {
            counts[b.j()] += 1;
            sums[b.j()].iter_mut().zip(x.iter()).for_each(|(s, v)| *s += v);
        }
        let mean = |sum: &[Energy], count: usize| -> Vec<Energy> {
            sum.iter().map(|s| s / count as Energy).collect()
        };
        let mut news = (0..k)
            .map(|j| match counts[j] {
                0 => self.kmeans[j].clone(),
                c => mean(&sums[j], c),
            })
            .collect::<Vec<_>>();
        for j in 0..k {
            if counts[j] > 0 {
                continue;
            }
            let (far, gap) = self
                .points
                .iter()
                .zip(self.bounds.iter())
                .map(|(x, b)| distance(x, &news[b.j()]))
                .enumerate()
                .fold((0, 0.), |(i, best), (m, g)| {
                    if g > best { (m, g) } else { (i, best) }
                });
            if gap <= 0. {
                continue;
            }
            let ref x = self.points[far];
            let old = self.bounds[far].j();
            counts[old] -= 1;
            counts[j] += 1;
            sums[old].iter_mut().zip(x.iter()).for_each(|(s, v)| *s -= v);
            news[old] = mean(&sums[old], counts[old]);
            news[j] = x.clone();
            self.bounds[far].assign(0., j);
            log::debug!("{:<32}{:<32}", "healed empty cluster", j);
        }
        news
    }

    /// Naive Lloyd iteration: full reassignment, then means. Returns the
    /// summed squared drift.
    pub(crate) fn naive(&mut self) -> Energy {
        let news = self.lloyd();
        let drift = news
            .iter()
            .zip(self.kmeans.iter())
            .map(|(new, old)| sqdistance(new, old))
            .sum();
        self.kmeans = news;
        drift
    }

    /// Naive Lloyd step against the current centroids, without touching state.
    pub(crate) fn lloyd(&self) -> Vec<Vec<Energy>> {
        let labels = self
            .points
            .par_iter()
            .map(|x| nearest(x, &self.kmeans).0)
            .collect::<Vec<usize>>();
        (0..self.kmeans.len())
            .map(|j| {
                let members = labels
                    .iter()
                    .zip(self.points.iter())
                    .filter(|(l, _)| **l == j)
                    .map(|(_, x)| x)
                    .collect::<Vec<_>>();
                match members.len() {
                    0 => self.kmeans[j].clone(),
                    m => (0..self.kmeans[j].len())
                        .map(|f| members.iter().map(|x| x[f]).sum::<Energy>() / m as Energy)
                        .collect(),
                }
            })
            .collect()
    }

    /// Exact final assignment against the final centroids.
    ///
    /// If that leaves a cluster empty, its centroid moves onto the point
    /// farthest from its own centroid and the assignment is redone, so labels
    /// and centroids stay consistent.
    pub(crate) fn finish(mut self, iterations: usize) -> Partition {
        let k = self.kmeans.len();
        let mut nearest = self.relabel();
        for _ in 0..self.points.len() {
            let mut counts = vec![0usize; k];
            nearest.iter().for_each(|(j, _)| counts[*j] += 1);
            let Some(empty) = counts.iter().position(|c| *c == 0) else {
                break;
            };
            let (far, gap) = nearest
                .iter()
                .enumerate()
                .fold((0, 0.), |(i, best), (m, (_, g))| {
                    if *g > best { (m, *g) } else { (i, best) }
                });
            if gap <= 0. {
                break;
            }
            self.kmeans[empty] = self.points[far].clone();
            nearest = self.relabel();
        }
        let inertia = nearest.iter().map(|(_, d)| d * d).sum();
        let labels = nearest.into_iter().map(|(j, _)| j).collect();
        Partition {
            assignment: Assignment::new(labels, k),
            centroids: self.kmeans,
            inertia,
            iterations,
        }
    }

    fn relabel(&self) -> Vec<(usize, Energy)> {
        self.points
            .par_iter()
            .map(|x| nearest(x, &self.kmeans))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn uniform(n: usize, seed: u64) -> Vec<Vec<Energy>> {
        use rand::Rng;
        use rand::SeedableRng;
        let ref mut rng = rand::rngs::SmallRng::seed_from_u64(seed);
        (0..n)
            .map(|_| (0..2).map(|_| rng.random_range(-1.0..1.0)).collect())
            .collect()
    }

    /// Three well separated blobs of 20 points each.
    fn blobs() -> Vec<Vec<Energy>> {
        [[0., 0.], [10., 10.], [-10., 10.]]
            .iter()
            .zip(0u64..)
            .flat_map(|(center, seed)| {
                uniform(20, seed)
                    .into_iter()
                    .map(|p| vec![p[0] + center[0], p[1] + center[1]])
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    #[test]
    fn recovers_separated_blobs() {
        let points = blobs();
        let p = Elkan::default().partition(&points, 3, 0);
        let labels = p.assignment.labels();
        for blob in labels.chunks(20) {
            assert!(blob.iter().all(|l| *l == blob[0]), "blob split: {:?}", blob);
        }
        assert_ne!(labels[0], labels[20]);
        assert_ne!(labels[20], labels[40]);
        assert_ne!(labels[0], labels[40]);
        assert_eq!(p.assignment.counts(), vec![20, 20, 20]);
    }

    #[test]
    fn elkan_matches_naive() {
        let points = uniform(200, 11);
        let mut run = Run::new(&points, 4, 3);
        for _ in 0..10 {
            let expected = run.lloyd();
            run.step();
            for (a, b) in run.kmeans().iter().zip(expected.iter()) {
                assert!(distance(a, b) < 1e-9, "{:?} != {:?}", a, b);
            }
        }
    }

    #[test]
    fn identical_points_leave_one_populated_cluster() {
        let points = vec![vec![1., 2.]; 6];
        let p = Elkan::default().partition(&points, 2, 0);
        assert_eq!(p.assignment.populated(), 1);
        assert_eq!(p.inertia, 0.);
    }

    #[test]
    fn inertia_is_sum_of_squared_distances() {
        let points = blobs();
        let p = Elkan::default().partition(&points, 3, 0);
        let expected = points
            .iter()
            .zip(p.assignment.labels())
            .map(|(x, j)| sqdistance(x, &p.centroids[*j]))
            .sum::<Energy>();
        assert!((p.inertia - expected).abs() < 1e-9);
    }

    fn dataset() -> impl Strategy<Value = (Vec<Vec<Energy>>, usize)> {
        (1usize..4, 2usize..40).prop_flat_map(|(d, n)| {
            (
                prop::collection::vec(prop::collection::vec(-100.0..100.0f64, d), n),
                1..=n,
            )
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn labels_cover_every_cluster((points, k) in dataset()) {
            let p = Elkan::new(50, 1e-4, 2).partition(&points, k, 0);
            prop_assert_eq!(p.assignment.n(), points.len());
            prop_assert!(p.assignment.labels().iter().all(|j| *j < k));
            prop_assert_eq!(p.assignment.populated(), k);
            prop_assert!(p.inertia >= 0. && p.inertia.is_finite());
        }

        #[test]
        fn fixed_seed_is_deterministic((points, k) in dataset(), seed in 0u64..1000) {
            let a = Elkan::new(50, 1e-4, 3).partition(&points, k, seed);
            let b = Elkan::new(50, 1e-4, 3).partition(&points, k, seed);
            prop_assert_eq!(a, b);
        }
    }
}
