use super::*;
use crate::Paths;
use crate::metrics::Evaluator;
use crate::retrain::Retrain;
use crate::retrain::Retrainer;
use crate::store::Store;
use crate::table::Preprocessor;
use crate::table::Raw;
use crate::table::Table;
use crate::training::Search;
use crate::training::Trainer;
use crate::visualize::Report;
use anyhow::Context;
use std::collections::BTreeSet;

/// Executes the selected pipeline steps in their fixed order.
///
/// Each step hands its table to the next. A step that needs a table nobody
/// produced in this run reads the last persisted processed table instead.
#[derive(Debug, Clone)]
pub struct Runner {
    steps: BTreeSet<Step>,
    paths: Paths,
    preprocessor: Preprocessor,
    trainer: Trainer,
    max_k: usize,
    k: usize,
}

impl From<PipelineArgs> for Runner {
    fn from(args: PipelineArgs) -> Self {
        let evaluator = match args.strict {
            true => Evaluator::strict(),
            false => Evaluator::default(),
        };
        Self::new(&args.steps, Paths::from(args.paths))
            .trainer(Trainer::default().seed(args.seed).evaluator(evaluator))
            .clusters(args.max_k, args.clusters)
    }
}

impl Runner {
    pub fn new(steps: &[Step], paths: Paths) -> Self {
        Self {
            steps: steps.iter().copied().collect(),
            paths,
            preprocessor: Preprocessor::default(),
            trainer: Trainer::default(),
            max_k: crate::DEFAULT_MAX_K,
            k: crate::DEFAULT_CLUSTERS,
        }
    }
    pub fn trainer(mut self, trainer: Trainer) -> Self {
        self.trainer = trainer;
        self
    }
    pub fn clusters(mut self, max_k: usize, k: usize) -> Self {
        self.max_k = max_k;
        self.k = k;
        self
    }

    /// Selected steps, deduplicated, in execution order.
    pub fn order(&self) -> Vec<Step> {
        self.steps.iter().copied().collect()
    }

    pub fn run(&self) -> anyhow::Result<()> {
        let mut table = None;
        for step in self.order() {
            log::info!("{:<32}{:<32}", "running step", step);
            match step {
                Step::Preprocess => table = Some(self.preprocess()?),
                Step::Visualize => self.visualize(self.table(&mut table)?)?,
                Step::Cluster => self.cluster(self.table(&mut table)?)?,
                Step::Retrain => self.retrain()?,
            }
        }
        Ok(())
    }

    fn table<'a>(&self, cached: &'a mut Option<Table>) -> anyhow::Result<&'a Table> {
        if cached.is_none() {
            let path = &self.paths.processed;
            let table = Table::read(path)
                .with_context(|| format!("read processed table {}", path.display()))?;
            *cached = Some(table.features());
        }
        cached.as_ref().context("processed table")
    }

    fn preprocess(&self) -> anyhow::Result<Table> {
        let raw = Raw::read(&self.paths.raw)
            .with_context(|| format!("read raw table {}", self.paths.raw.display()))?;
        let table = self.preprocessor.apply(&raw).context("preprocess")?;
        table.write(&self.paths.processed).context("write processed table")?;
        log::info!("{:<32}{:<32}", "preprocessed rows", table.n());
        Ok(table)
    }

    fn visualize(&self, table: &Table) -> anyhow::Result<()> {
        let report = Report::from(table);
        report.log();
        report.save(&self.paths.visualization()).context("write visualization")?;
        Ok(())
    }

    fn cluster(&self, table: &Table) -> anyhow::Result<()> {
        let curves = Search::from(self.trainer.clone())
            .sweep(table, self.max_k)
            .context("cluster-count sweep")?;
        curves.save(&self.paths.curves()).context("write metric curves")?;
        let trained = self
            .trainer
            .train(table, self.k)
            .with_context(|| format!("train k={}", self.k))?;
        log::info!("{:<32}{:<32}", format!("trained k={}", self.k), trained.scores);
        table
            .labeled(&trained.assignment)?
            .write(&self.paths.clustered)
            .context("write clustered table")?;
        Store::new(&self.paths.model)
            .save(&trained.artifact)
            .context("save model")?;
        Ok(())
    }

    fn retrain(&self) -> anyhow::Result<()> {
        Retrainer::new(self.paths.clone())
            .preprocessor(self.preprocessor.clone())
            .trainer(self.trainer.clone())
            .clusters(self.k)
            .retrain()
            .context("retrain")
    }
}
