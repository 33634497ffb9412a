use super::*;
use crate::Energy;
use crate::Score;
use crate::kmeans::distance;

/// Davies–Bouldin index: mean over clusters of the worst
/// (S_i + S_j) / d(c_i, c_j), where S is the mean member-to-centroid
/// distance. Coincident centroids contribute 0.
pub fn davies_bouldin(points: &[Vec<Energy>], groups: &Groups) -> Score {
    let scatter = groups
        .members()
        .iter()
        .zip(groups.centroids())
        .map(|(members, c)| {
            members.iter().map(|i| distance(&points[*i], c)).sum::<Energy>()
                / members.len() as Energy
        })
        .collect::<Vec<Energy>>();
    let m = groups.m();
    (0..m)
        .map(|i| {
            (0..m)
                .filter(|j| *j != i)
                .map(|j| match distance(&groups.centroids()[i], &groups.centroids()[j]) {
                    d if d > 0. => (scatter[i] + scatter[j]) / d,
                    _ => 0.,
                })
                .fold(0., Energy::max)
        })
        .sum::<Score>()
        / m as Score
}
