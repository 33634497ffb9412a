use super::*;
use crate::DEFAULT_CLUSTERS;
use crate::Paths;
use crate::Result;
use crate::store::Store;
use crate::table::Preprocessor;
use crate::table::Raw;
use crate::training::Trainer;

/// Raw CSV → preprocessing → fixed-k training → saved model → tables.
///
/// Nothing is written until training succeeds, so a failed run leaves the
/// previous artifact and tables in place. The tables follow the model and
/// are each replaced atomically, so the clustered table never describes a
/// model that was not saved.
#[derive(Debug, Clone)]
pub struct Retrainer {
    paths: Paths,
    preprocessor: Preprocessor,
    trainer: Trainer,
    k: usize,
}

impl Retrainer {
    pub fn new(paths: Paths) -> Self {
        Self {
            paths,
            preprocessor: Preprocessor::default(),
            trainer: Trainer::default(),
            k: DEFAULT_CLUSTERS,
        }
    }
    pub fn clusters(mut self, k: usize) -> Self {
        self.k = k;
        self
    }
    pub fn preprocessor(mut self, preprocessor: Preprocessor) -> Self {
        self.preprocessor = preprocessor;
        self
    }
    pub fn trainer(mut self, trainer: Trainer) -> Self {
        self.trainer = trainer;
        self
    }
}

impl Retrain for Retrainer {
    fn retrain(&self) -> Result<()> {
        let raw = Raw::read(&self.paths.raw)?;
        let table = self.preprocessor.apply(&raw)?;
        log::info!("{:<32}{:<32}", "retraining on rows", table.n());
        let trained = self.trainer.train(&table, self.k)?;
        log::info!("{:<32}{:<32}", format!("retrained k={}", self.k), trained.scores);
        let labeled = table.labeled(&trained.assignment)?;
        Store::new(&self.paths.model).save(&trained.artifact)?;
        table.write(&self.paths.processed)?;
        labeled.write(&self.paths.clustered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CLUSTER_COLUMN;
    use crate::Error;
    use crate::table::Table;
    use crate::training::MALL_CUSTOMERS as CUSTOMERS;
    use std::path::Path;

    fn paths(name: &str) -> Paths {
        let dir = std::env::temp_dir().join(format!("segments-retrain-{}-{}", name, std::process::id()));
        std::fs::remove_dir_all(&dir).ok();
        Paths {
            raw: dir.join("data").join("Mall_Customers.csv"),
            processed: dir.join("data").join("processed_customers.csv"),
            clustered: dir.join("data").join("clustered_customers.csv"),
            model: dir.join("models").join("kmeans_model.bin"),
            logs: dir.join("logs"),
        }
    }

    fn raw(path: &Path, text: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, text).unwrap();
    }

    #[test]
    fn run_writes_model_then_labels() {
        let paths = paths("ok");
        raw(&paths.raw, CUSTOMERS);
        Retrainer::new(paths.clone()).clusters(3).retrain().unwrap();
        let model = Store::new(&paths.model).load().unwrap();
        assert_eq!(model.k(), 3);
        assert_eq!(
            model.columns(),
            [
                "Age",
                "Annual Income (k$)",
                "Spending Score (1-100)",
                "Gender_Female",
                "Gender_Male"
            ]
        );
        let clustered = Table::read(&paths.clustered).unwrap();
        assert_eq!(clustered.n(), 12);
        assert_eq!(clustered.columns().last().unwrap(), CLUSTER_COLUMN);
        assert!(clustered.labels().unwrap().iter().all(|j| *j < 3));
        std::fs::remove_dir_all(paths.logs.parent().unwrap()).ok();
    }

    #[test]
    fn failed_run_keeps_previous_model() {
        let paths = paths("failed");
        raw(&paths.raw, CUSTOMERS);
        Retrainer::new(paths.clone()).clusters(3).retrain().unwrap();
        let before = std::fs::read(&paths.model).unwrap();
        // three rows cannot hold five clusters
        raw(&paths.raw, &CUSTOMERS.lines().take(4).collect::<Vec<_>>().join("\n"));
        let result = Retrainer::new(paths.clone()).retrain();
        assert!(matches!(result, Err(Error::Training(_))));
        assert_eq!(std::fs::read(&paths.model).unwrap(), before);
        std::fs::remove_dir_all(paths.logs.parent().unwrap()).ok();
    }

    #[test]
    fn failed_save_keeps_previous_tables() {
        let paths = paths("blocked");
        raw(&paths.raw, CUSTOMERS);
        Retrainer::new(paths.clone()).clusters(3).retrain().unwrap();
        let clustered = std::fs::read(&paths.clustered).unwrap();
        let processed = std::fs::read(&paths.processed).unwrap();
        // a non-empty directory where the model belongs cannot be replaced
        std::fs::remove_file(&paths.model).unwrap();
        std::fs::create_dir_all(paths.model.join("occupied")).unwrap();
        let result = Retrainer::new(paths.clone()).clusters(2).retrain();
        assert!(matches!(result, Err(Error::Io(_))));
        assert_eq!(std::fs::read(&paths.clustered).unwrap(), clustered);
        assert_eq!(std::fs::read(&paths.processed).unwrap(), processed);
        std::fs::remove_dir_all(paths.logs.parent().unwrap()).ok();
    }
}
