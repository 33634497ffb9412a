/// Cluster id for every row, each in `[0, k)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    labels: Vec<usize>,
    k: usize,
}

impl Assignment {
    pub fn new(labels: Vec<usize>, k: usize) -> Self {
        debug_assert!(labels.iter().all(|j| *j < k));
        Self { labels, k }
    }
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }
    pub fn k(&self) -> usize {
        self.k
    }
    pub fn n(&self) -> usize {
        self.labels.len()
    }
    /// Members per cluster id.
    pub fn counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.k];
        self.labels.iter().for_each(|j| counts[*j] += 1);
        counts
    }
    /// Number of cluster ids with at least one member.
    pub fn populated(&self) -> usize {
        self.counts().iter().filter(|c| **c > 0).count()
    }
    /// Row indices assigned to cluster `j`.
    pub fn members(&self, j: usize) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, label)| **label == j)
            .map(|(i, _)| i)
            .collect()
    }
}
