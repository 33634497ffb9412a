use super::*;
use crate::CLUSTER_COLUMN;
use crate::Energy;
use crate::Error;
use crate::Result;
use crate::Score;
use crate::kmeans::Assignment;
use crate::kmeans::sqdistance;
use crate::table::Table;
use serde::Deserialize;
use serde::Serialize;

/// Quality of one partition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    /// Cohesion vs separation, in [-1, 1]. Higher is better.
    pub silhouette: Score,
    /// Within-cluster scatter vs centroid separation, ≥ 0. Lower is better.
    pub davies_bouldin: Score,
    /// Between vs within variance, ≥ 0. Higher is better.
    pub calinski_harabasz: Score,
}

impl std::fmt::Display for Scores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "silhouette={:.4} davies-bouldin={:.4} calinski-harabasz={:.4}",
            self.silhouette, self.davies_bouldin, self.calinski_harabasz
        )
    }
}

/// Computes [`Scores`] for a table and an assignment over its rows.
///
/// A partition is degenerate, and refused, when it has fewer than two
/// populated clusters, as many clusters as rows, no spread at all, or a
/// populated cluster smaller than `min_members`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluator {
    min_members: usize,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self { min_members: 1 }
    }
}

impl Evaluator {
    /// Every populated cluster must hold at least two rows.
    pub fn strict() -> Self {
        Self { min_members: 2 }
    }

    pub fn evaluate(&self, table: &Table, assignment: &Assignment) -> Result<Scores> {
        if table.index(CLUSTER_COLUMN).is_some() {
            return Err(Error::Validation(format!(
                "{:?} is derived and cannot be scored as a feature",
                CLUSTER_COLUMN
            )));
        }
        self.score(table.rows(), assignment)
    }

    pub fn score(&self, points: &[Vec<Energy>], assignment: &Assignment) -> Result<Scores> {
        if assignment.n() != points.len() {
            return Err(Error::Validation(format!(
                "assignment covers {} rows, table has {}",
                assignment.n(),
                points.len()
            )));
        }
        let groups = Groups::new(points, assignment);
        if groups.m() < 2 {
            return Err(Error::DegenerateClustering(format!(
                "{} populated cluster(s), need at least 2",
                groups.m()
            )));
        }
        if groups.m() >= points.len() {
            return Err(Error::DegenerateClustering(format!(
                "{} clusters over {} rows leaves no cohesion to measure",
                groups.m(),
                points.len()
            )));
        }
        if groups.smallest() < self.min_members {
            return Err(Error::DegenerateClustering(format!(
                "smallest cluster has {} member(s), need at least {}",
                groups.smallest(),
                self.min_members
            )));
        }
        if points.iter().all(|x| sqdistance(x, &points[0]) == 0.) {
            return Err(Error::DegenerateClustering(
                "every row is identical, partition has zero variance".to_string(),
            ));
        }
        Ok(Scores {
            silhouette: silhouette(points, &groups),
            davies_bouldin: davies_bouldin(points, &groups),
            calinski_harabasz: calinski_harabasz(points, &groups),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(xs: &[Energy]) -> Vec<Vec<Energy>> {
        xs.iter().map(|x| vec![*x]).collect()
    }

    #[test]
    fn scores_two_tight_pairs() {
        let points = line(&[0., 1., 10., 11.]);
        let scores = Evaluator::strict()
            .score(&points, &Assignment::new(vec![0, 0, 1, 1], 2))
            .unwrap();
        let silhouette = (9.5 / 10.5 + 8.5 / 9.5) / 2.;
        assert!((scores.silhouette - silhouette).abs() < 1e-12);
        assert!((scores.davies_bouldin - 0.1).abs() < 1e-12);
        assert!((scores.calinski_harabasz - 200.).abs() < 1e-9);
    }

    #[test]
    fn empty_cluster_ids_are_ignored() {
        let points = line(&[0., 1., 10., 11.]);
        let dense = Evaluator::strict()
            .score(&points, &Assignment::new(vec![0, 0, 1, 1], 2))
            .unwrap();
        let sparse = Evaluator::strict()
            .score(&points, &Assignment::new(vec![0, 0, 2, 2], 3))
            .unwrap();
        assert_eq!(dense, sparse);
    }

    #[test]
    fn single_cluster_is_degenerate() {
        let points = line(&[0., 1., 2.]);
        let result = Evaluator::default().score(&points, &Assignment::new(vec![1, 1, 1], 2));
        assert!(matches!(result, Err(Error::DegenerateClustering(_))));
    }

    #[test]
    fn identical_rows_never_score() {
        let points = line(&[3., 3., 3., 3.]);
        let result = Evaluator::default().score(&points, &Assignment::new(vec![0, 0, 1, 1], 2));
        assert!(matches!(result, Err(Error::DegenerateClustering(_))));
    }

    #[test]
    fn singletons_depend_on_min_members() {
        let points = line(&[0., 1., 10.]);
        let assignment = Assignment::new(vec![0, 0, 1], 2);
        let lenient = Evaluator::default().score(&points, &assignment).unwrap();
        assert!((-1. ..=1.).contains(&lenient.silhouette));
        assert!(lenient.davies_bouldin >= 0.);
        assert!(lenient.calinski_harabasz >= 0.);
        let strict = Evaluator::strict().score(&points, &assignment);
        assert!(matches!(strict, Err(Error::DegenerateClustering(_))));
    }

    #[test]
    fn one_cluster_per_row_is_degenerate() {
        let points = line(&[0., 1., 2.]);
        let result = Evaluator::default().score(&points, &Assignment::new(vec![0, 1, 2], 3));
        assert!(matches!(result, Err(Error::DegenerateClustering(_))));
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let points = line(&[0., 1., 2.]);
        let result = Evaluator::default().score(&points, &Assignment::new(vec![0, 1], 2));
        assert!(matches!(result, Err(Error::Validation(_))));
    }
}
