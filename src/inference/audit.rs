use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

/// What was served, for one prediction batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    pub at: DateTime<Utc>,
    /// Training time of the model that answered.
    pub model: DateTime<Utc>,
    pub rows: usize,
    pub clusters: Vec<usize>,
}

/// Destination for prediction audit entries.
///
/// A failing sink never fails the request it describes; the service logs
/// the error and answers anyway.
pub trait Audit: Send + Sync {
    fn record(&self, entry: &Entry) -> anyhow::Result<()>;
}

impl<A: Audit + ?Sized> Audit for Arc<A> {
    fn record(&self, entry: &Entry) -> anyhow::Result<()> {
        (**self).record(entry)
    }
}

/// Writes entries as JSON lines to the `audit` log target.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAudit;

impl Audit for LogAudit {
    fn record(&self, entry: &Entry) -> anyhow::Result<()> {
        log::info!(target: "audit", "{}", serde_json::to_string(entry)?);
        Ok(())
    }
}
