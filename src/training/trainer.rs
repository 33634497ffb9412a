use crate::CLUSTER_COLUMN;
use crate::Energy;
use crate::Error;
use crate::KMEANS_SEED;
use crate::Result;
use crate::kmeans::Assignment;
use crate::kmeans::Elkan;
use crate::kmeans::Partitioner;
use crate::metrics::Evaluator;
use crate::metrics::Scores;
use crate::store::Artifact;
use crate::table::Table;

/// Outcome of fitting one cluster count. Nothing here has been persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Trained {
    pub assignment: Assignment,
    pub artifact: Artifact,
    pub scores: Scores,
    pub inertia: Energy,
    pub iterations: usize,
}

/// Fits k-means for a requested k and scores the result.
#[derive(Debug, Clone)]
pub struct Trainer<P: Partitioner = Elkan> {
    partitioner: P,
    evaluator: Evaluator,
    seed: u64,
}

impl Default for Trainer<Elkan> {
    fn default() -> Self {
        Self::new(Elkan::default())
    }
}

impl<P: Partitioner> Trainer<P> {
    pub fn new(partitioner: P) -> Self {
        Self {
            partitioner,
            evaluator: Evaluator::default(),
            seed: KMEANS_SEED,
        }
    }
    pub fn evaluator(mut self, evaluator: Evaluator) -> Self {
        self.evaluator = evaluator;
        self
    }
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn train(&self, table: &Table, k: usize) -> Result<Trained> {
        if table.is_empty() {
            return Err(Error::Training("table has no rows".to_string()));
        }
        if table.d() == 0 {
            return Err(Error::Training("table has no feature columns".to_string()));
        }
        if table.index(CLUSTER_COLUMN).is_some() {
            return Err(Error::Training(format!(
                "{:?} is derived and cannot be a feature",
                CLUSTER_COLUMN
            )));
        }
        if k < 2 {
            return Err(Error::Training(format!("k = {} is below 2", k)));
        }
        if k > table.n() {
            return Err(Error::Training(format!(
                "k = {} exceeds the {} available rows",
                k,
                table.n()
            )));
        }
        let partition = self.partitioner.partition(table.rows(), k, self.seed);
        let scores = self.evaluator.evaluate(table, &partition.assignment)?;
        let artifact = Artifact::new(table.columns().to_vec(), partition.centroids)?;
        log::debug!("{:<32}{:<32}", format!("trained k={}", k), scores);
        Ok(Trained {
            assignment: partition.assignment,
            artifact,
            scores,
            inertia: partition.inertia,
            iterations: partition.iterations,
        })
    }
}
