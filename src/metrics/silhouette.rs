use super::*;
use crate::Energy;
use crate::Score;
use crate::kmeans::distance;
use rayon::prelude::*;

/// Mean silhouette coefficient over all rows.
///
/// s(i) = (b(i) - a(i)) / max(a(i), b(i))
///
/// where a(i) is the mean distance to the other members of its cluster and
/// b(i) the smallest mean distance to the members of another cluster.
/// Singletons score 0, as does any row with max(a, b) = 0.
pub fn silhouette(points: &[Vec<Energy>], groups: &Groups) -> Score {
    let coefficients = groups
        .members()
        .iter()
        .enumerate()
        .flat_map(|(g, members)| members.iter().map(move |i| (g, *i)))
        .collect::<Vec<(usize, usize)>>()
        .into_par_iter()
        .map(|(g, i)| coefficient(points, groups, g, i))
        .collect::<Vec<Score>>();
    coefficients.iter().sum::<Score>() / coefficients.len() as Score
}

fn coefficient(points: &[Vec<Energy>], groups: &Groups, own: usize, i: usize) -> Score {
    let ref x = points[i];
    let mean = |members: &[usize]| -> Energy {
        members
            .iter()
            .filter(|m| **m != i)
            .map(|m| distance(x, &points[*m]))
            .sum::<Energy>()
            / members.iter().filter(|m| **m != i).count() as Energy
    };
    let members = &groups.members()[own];
    if members.len() < 2 {
        return 0.;
    }
    let a = mean(members);
    let b = groups
        .members()
        .iter()
        .enumerate()
        .filter(|(g, _)| *g != own)
        .map(|(_, others)| mean(others))
        .fold(Energy::INFINITY, Energy::min);
    match a.max(b) {
        m if m > 0. => (b - a) / m,
        _ => 0.,
    }
}
