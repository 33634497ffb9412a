//! Charts as data.
//!
//! Nothing here renders. The visualize step writes distributions and the
//! correlation matrix as JSON, and the dashboard serves scatter points over
//! HTTP for whatever front end draws them.
mod correlation;
mod dashboard;
mod summary;

#[cfg(feature = "server")]
mod server;

pub use correlation::*;
pub use dashboard::*;
pub use summary::*;

#[cfg(feature = "server")]
pub use server::*;

use crate::Result;
use crate::table::Table;
use serde::Serialize;
use std::path::Path;

/// Everything the visualize step produces for one table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub summary: Summary,
    pub correlation: Correlation,
}

impl From<&Table> for Report {
    fn from(table: &Table) -> Self {
        Self {
            summary: Summary::from(table),
            correlation: Correlation::from(table),
        }
    }
}

impl Report {
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(file), self)
            .map_err(std::io::Error::from)?;
        log::info!("{:<32}{:<32}", "saved visualization", path.display());
        Ok(())
    }

    /// One log line per column.
    pub fn log(&self) {
        for d in self.summary.columns.iter() {
            log::info!(
                "{:<32}{:<32}",
                d.column,
                format!("μ={:.3} σ={:.3} [{:.3}, {:.3}]", d.mean, d.std, d.min, d.max)
            );
        }
    }
}
