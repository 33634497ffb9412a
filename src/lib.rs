//! Customer segmentation lifecycle.
//!
//! Trains, evaluates, serves and periodically refreshes a k-means model
//! over a fixed tabular schema, and supervises the processes that expose it.
//!
//! ## Modules
//!
//! - [`table`] — Feature tables, raw CSV tables, preprocessing
//! - [`kmeans`] — The centroid clustering primitive (Elkan + k-means++)
//! - [`metrics`] — Silhouette, Davies–Bouldin, Calinski–Harabasz
//! - [`training`] — Model training and the cluster-count sweep
//! - [`store`] — Artifact format and atomic persistence
//! - [`inference`] — Schema validation, prediction, HTTP endpoint
//! - [`retrain`] — Fixed-interval retraining with skip-if-running
//! - [`supervisor`] — Child process launch, watch and teardown
//! - [`visualize`] — Distribution summaries and the dashboard service
//! - `cli` — Arguments of the five binaries and the `--steps` runner
#![allow(clippy::module_inception)]

pub mod error;
pub mod inference;
pub mod kmeans;
pub mod metrics;
pub mod store;
pub mod table;
pub mod training;
pub mod visualize;

#[cfg(feature = "server")]
pub mod cli;
#[cfg(feature = "server")]
pub mod retrain;
#[cfg(feature = "server")]
pub mod supervisor;

pub use error::*;

// ============================================================================
// TYPE ALIASES
// ============================================================================
/// Feature values, centroid coordinates, distances and inertia.
pub type Energy = f64;
/// Cluster quality scores.
pub type Score = f64;

// ============================================================================
// K-MEANS CLUSTERING
// ============================================================================
/// Seed for centroid initialization. Held constant so retraining on identical
/// data reproduces identical centroids.
pub const KMEANS_SEED: u64 = 0;
/// Lloyd iteration cap per restart.
pub const KMEANS_ITERATIONS: usize = 300;
/// Convergence threshold on squared centroid shift, relative to mean feature variance.
pub const KMEANS_TOLERANCE: Energy = 1e-4;
/// Independently seeded restarts; the lowest inertia wins.
pub const KMEANS_RESTARTS: usize = 10;

// ============================================================================
// MODEL SELECTION
// ============================================================================
/// Cluster count used by the cluster step and by scheduled retraining.
pub const DEFAULT_CLUSTERS: usize = 5;
/// Upper end of the cluster-count sweep.
pub const DEFAULT_MAX_K: usize = 10;
/// Name of the derived assignment column.
pub const CLUSTER_COLUMN: &str = "Cluster";

// ============================================================================
// PROCESS LIFECYCLE
// ============================================================================
/// Wall-clock interval between scheduled retraining runs (30 days).
pub const RETRAIN_INTERVAL: std::time::Duration = std::time::Duration::from_secs(30 * 24 * 3600);
/// How long a child gets to exit after being signalled.
pub const SHUTDOWN_GRACE: std::time::Duration = std::time::Duration::from_secs(10);

// ============================================================================
// FILESYSTEM LAYOUT
// ============================================================================
/// Raw customer table.
pub const RAW_DATA: &str = "data/Mall_Customers.csv";
/// Preprocessed feature table.
pub const PROCESSED_DATA: &str = "data/processed_customers.csv";
/// Feature table with the derived cluster column.
pub const CLUSTERED_DATA: &str = "data/clustered_customers.csv";
/// Persisted model artifact.
pub const MODEL_PATH: &str = "models/kmeans_model.bin";
/// Log files, metric curves and visualization summaries.
pub const LOGS_DIR: &str = "logs";

/// On-disk layout shared by the pipeline, the scheduler and the services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub raw: std::path::PathBuf,
    pub processed: std::path::PathBuf,
    pub clustered: std::path::PathBuf,
    pub model: std::path::PathBuf,
    pub logs: std::path::PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            raw: RAW_DATA.into(),
            processed: PROCESSED_DATA.into(),
            clustered: CLUSTERED_DATA.into(),
            model: MODEL_PATH.into(),
            logs: LOGS_DIR.into(),
        }
    }
}

impl Paths {
    /// Metric curves written by the cluster-count sweep.
    pub fn curves(&self) -> std::path::PathBuf {
        self.logs.join("cluster_evaluation_metrics.csv")
    }
    /// Distribution and correlation summaries written by the visualize step.
    pub fn visualization(&self) -> std::path::PathBuf {
        self.logs.join("visualization.json")
    }
}

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Logging context handed to each binary at startup.
///
/// Dual output: INFO to the terminal, DEBUG to `<dir>/<name>-<unix>.log`.
/// Only the first `init()` in a process installs the backends; later calls
/// are no-ops. Nothing needs tearing down before exit.
#[cfg(feature = "server")]
#[derive(Debug, Clone)]
pub struct Logs {
    name: &'static str,
    dir: std::path::PathBuf,
    term: log::LevelFilter,
    file: log::LevelFilter,
}

#[cfg(feature = "server")]
static LOGGER: std::sync::OnceLock<()> = std::sync::OnceLock::new();

#[cfg(feature = "server")]
impl Logs {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            dir: LOGS_DIR.into(),
            term: log::LevelFilter::Info,
            file: log::LevelFilter::Debug,
        }
    }
    pub fn dir(mut self, dir: impl Into<std::path::PathBuf>) -> Self {
        self.dir = dir.into();
        self
    }
    pub fn init(&self) -> anyhow::Result<()> {
        use anyhow::Context;
        if LOGGER.get().is_some() {
            return Ok(());
        }
        std::fs::create_dir_all(&self.dir).context("create logs directory")?;
        let config = simplelog::ConfigBuilder::new()
            .set_location_level(log::LevelFilter::Off)
            .set_target_level(log::LevelFilter::Off)
            .set_thread_level(log::LevelFilter::Off)
            .build();
        let time = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .context("time moves slow")?
            .as_secs();
        let path = self.dir.join(format!("{}-{}.log", self.name, time));
        let file = simplelog::WriteLogger::new(
            self.file,
            config.clone(),
            std::fs::File::create(&path).context("create log file")?,
        );
        let term = simplelog::TermLogger::new(
            self.term,
            config,
            simplelog::TerminalMode::Mixed,
            simplelog::ColorChoice::Auto,
        );
        if LOGGER.set(()).is_ok() {
            simplelog::CombinedLogger::init(vec![term, file]).context("initialize logger")?;
        }
        Ok(())
    }
}

/// Resolves when the process is asked to stop: Ctrl+C, or SIGTERM on unix.
/// This is the only place OS signals become cancellation.
#[cfg(feature = "server")]
pub async fn shutdown() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::SignalKind;
        use tokio::signal::unix::signal;
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => log::warn!("interrupt received"),
                    _ = term.recv() => log::warn!("terminate received"),
                }
            }
            Err(e) => {
                log::error!("cannot install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
                log::warn!("interrupt received");
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        log::warn!("interrupt received");
    }
}
