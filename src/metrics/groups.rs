use crate::Energy;
use crate::kmeans::Assignment;

/// Populated clusters of a partition, in ascending id order.
///
/// Empty ids are skipped; every score is defined over the clusters that
/// actually hold rows.
#[derive(Debug, Clone)]
pub struct Groups {
    members: Vec<Vec<usize>>,
    centroids: Vec<Vec<Energy>>,
}

impl Groups {
    pub fn new(points: &[Vec<Energy>], assignment: &Assignment) -> Self {
        let members = (0..assignment.k())
            .map(|j| assignment.members(j))
            .filter(|m| !m.is_empty())
            .collect::<Vec<_>>();
        let d = points.first().map(Vec::len).unwrap_or(0);
        let centroids = members
            .iter()
            .map(|m| {
                (0..d)
                    .map(|f| m.iter().map(|i| points[*i][f]).sum::<Energy>() / m.len() as Energy)
                    .collect()
            })
            .collect();
        Self { members, centroids }
    }
    /// Number of populated clusters.
    pub fn m(&self) -> usize {
        self.members.len()
    }
    pub fn members(&self) -> &[Vec<usize>] {
        &self.members
    }
    pub fn centroids(&self) -> &[Vec<Energy>] {
        &self.centroids
    }
    /// Size of the smallest populated cluster.
    pub fn smallest(&self) -> usize {
        self.members.iter().map(Vec::len).min().unwrap_or(0)
    }
}
