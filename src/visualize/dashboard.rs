use super::*;
use crate::Energy;
use crate::Error;
use crate::Result;
use crate::table::Table;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;

/// Horizontal axis when the caller does not choose one.
pub const DEFAULT_X: &str = "Annual Income (k$)";
/// Vertical axis when the caller does not choose one.
pub const DEFAULT_Y: &str = "Spending Score (1-100)";

/// One scatter point, colored by cluster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Scatter {
    pub x: Energy,
    pub y: Energy,
    pub cluster: usize,
}

/// The clustered table, split back into features and labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    features: Table,
    labels: Vec<usize>,
}

impl Dashboard {
    pub fn new(clustered: &Table) -> Result<Self> {
        let labels = clustered.labels().ok_or_else(|| {
            Error::Validation(format!("table has no {:?} column", crate::CLUSTER_COLUMN))
        })?;
        Ok(Self {
            features: clustered.features(),
            labels,
        })
    }
    pub fn load(path: &Path) -> Result<Self> {
        Self::new(&Table::read(path)?)
    }

    pub fn columns(&self) -> &[String] {
        self.features.columns()
    }
    /// Distinct cluster ids, ascending.
    pub fn clusters(&self) -> Vec<usize> {
        self.labels
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Rows projected onto two columns. An empty filter keeps every cluster.
    pub fn points(&self, x: &str, y: &str, clusters: &[usize]) -> Result<Vec<Scatter>> {
        let column = |name: &str| {
            self.features
                .index(name)
                .ok_or_else(|| Error::Validation(format!("unknown column {:?}", name)))
        };
        let (i, j) = (column(x)?, column(y)?);
        Ok(self
            .features
            .rows()
            .iter()
            .zip(self.labels.iter())
            .filter(|(_, c)| clusters.is_empty() || clusters.contains(c))
            .map(|(row, c)| Scatter {
                x: row[i],
                y: row[j],
                cluster: *c,
            })
            .collect())
    }

    pub fn report(&self) -> Report {
        Report::from(&self.features)
    }
}
