use super::*;
use crate::Energy;
use crate::Score;
use crate::kmeans::sqdistance;

/// Calinski–Harabasz index: between-cluster dispersion over within-cluster
/// dispersion, each divided by its degrees of freedom. 1 when every
/// cluster is a single repeated point.
pub fn calinski_harabasz(points: &[Vec<Energy>], groups: &Groups) -> Score {
    let n = points.len();
    let m = groups.m();
    let d = points[0].len();
    let mean = (0..d)
        .map(|f| points.iter().map(|x| x[f]).sum::<Energy>() / n as Energy)
        .collect::<Vec<Energy>>();
    let between = groups
        .members()
        .iter()
        .zip(groups.centroids())
        .map(|(members, c)| members.len() as Energy * sqdistance(c, &mean))
        .sum::<Energy>();
    let within = groups
        .members()
        .iter()
        .zip(groups.centroids())
        .map(|(members, c)| members.iter().map(|i| sqdistance(&points[*i], c)).sum::<Energy>())
        .sum::<Energy>();
    if within == 0. {
        1.
    } else {
        between * (n - m) as Energy / (within * (m - 1) as Energy)
    }
}
