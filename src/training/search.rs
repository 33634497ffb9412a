use super::*;
use crate::Error;
use crate::Result;
use crate::kmeans::Elkan;
use crate::kmeans::Partitioner;
use crate::table::Table;

/// Sweeps the cluster count and records inertia and quality at each k.
///
/// Stops at the first k that fails to train or score; a partial sweep is
/// never returned.
#[derive(Debug, Clone)]
pub struct Search<P: Partitioner = Elkan> {
    trainer: Trainer<P>,
}

impl Default for Search<Elkan> {
    fn default() -> Self {
        Self::from(Trainer::default())
    }
}

impl<P: Partitioner> From<Trainer<P>> for Search<P> {
    fn from(trainer: Trainer<P>) -> Self {
        Self { trainer }
    }
}

impl<P: Partitioner> Search<P> {
    pub fn sweep(&self, table: &Table, max_k: usize) -> Result<Curves> {
        if max_k < 2 {
            return Err(Error::Training(format!("max k = {} is below 2", max_k)));
        }
        if max_k > table.n() {
            return Err(Error::Training(format!(
                "max k = {} exceeds the {} available rows",
                max_k,
                table.n()
            )));
        }
        log::info!("{:<32}{:<32}", "sweeping cluster counts", format!("2..={}", max_k));
        (2..=max_k)
            .map(|k| {
                let trained = self.trainer.train(table, k)?;
                log::info!(
                    "{:<32}{:<32}",
                    format!("k={:<3} inertia={:.3}", k, trained.inertia),
                    trained.scores
                );
                Ok(Point {
                    k,
                    inertia: trained.inertia,
                    scores: trained.scores,
                })
            })
            .collect::<Result<Vec<Point>>>()
            .map(Curves::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Evaluator;
    use crate::training::customers;

    #[test]
    fn sweep_covers_every_k_in_order() {
        let curves = Search::default().sweep(&customers(), 5).unwrap();
        assert_eq!(curves.ks(), vec![2, 3, 4, 5]);
        for p in curves.points() {
            assert!((-1. ..=1.).contains(&p.scores.silhouette));
            assert!(p.scores.davies_bouldin >= 0.);
            assert!(p.scores.calinski_harabasz >= 0.);
        }
    }

    #[test]
    fn sweep_agrees_with_single_fits() {
        let table = customers();
        let curves = Search::default().sweep(&table, 4).unwrap();
        let trained = Trainer::default().train(&table, 3).unwrap();
        let point = curves.points()[1];
        assert_eq!(point.k, 3);
        assert_eq!(point.inertia, trained.inertia);
        assert_eq!(point.scores, trained.scores);
    }

    #[test]
    fn first_failure_aborts_the_sweep() {
        // strict scoring rejects singletons, which 6 clusters over 7 rows must have
        let search = Search::from(Trainer::default().evaluator(Evaluator::strict()));
        assert!(search.sweep(&customers(), 6).is_err());
        assert!(matches!(
            Search::default().sweep(&customers(), 8),
            Err(Error::Training(_))
        ));
        assert!(matches!(
            Search::default().sweep(&customers(), 1),
            Err(Error::Training(_))
        ));
    }
}
