use crate::DEFAULT_CLUSTERS;
use crate::DEFAULT_MAX_K;
use crate::KMEANS_SEED;
use crate::Paths;
use clap::Args;
use clap::Parser;
use clap::ValueEnum;
use std::path::PathBuf;
use std::time::Duration;

/// Pipeline stages. Declaration order is execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum)]
pub enum Step {
    Preprocess,
    Visualize,
    Cluster,
    Retrain,
}

impl Step {
    pub fn all() -> Vec<Self> {
        vec![Self::Preprocess, Self::Visualize, Self::Cluster, Self::Retrain]
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Preprocess => write!(f, "preprocess"),
            Self::Visualize => write!(f, "visualize"),
            Self::Cluster => write!(f, "cluster"),
            Self::Retrain => write!(f, "retrain"),
        }
    }
}

/// On-disk layout, overridable per file.
#[derive(Debug, Clone, Args)]
pub struct PathArgs {
    #[arg(long, env = "RAW_DATA", default_value = crate::RAW_DATA)]
    pub raw: PathBuf,
    #[arg(long, env = "PROCESSED_DATA", default_value = crate::PROCESSED_DATA)]
    pub processed: PathBuf,
    #[arg(long, env = "CLUSTERED_DATA", default_value = crate::CLUSTERED_DATA)]
    pub clustered: PathBuf,
    #[arg(long, env = "MODEL_PATH", default_value = crate::MODEL_PATH)]
    pub model: PathBuf,
    #[arg(long, env = "LOGS_DIR", default_value = crate::LOGS_DIR)]
    pub logs: PathBuf,
}

impl From<PathArgs> for Paths {
    fn from(args: PathArgs) -> Self {
        Self {
            raw: args.raw,
            processed: args.processed,
            clustered: args.clustered,
            model: args.model,
            logs: args.logs,
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about = "Preprocess, visualize, cluster and retrain", long_about = None)]
pub struct PipelineArgs {
    /// Steps to run. They always execute in pipeline order.
    #[arg(long, value_enum, num_args = 1.., default_values_t = Step::all())]
    pub steps: Vec<Step>,
    /// Largest k evaluated by the cluster-count sweep.
    #[arg(long, default_value_t = DEFAULT_MAX_K)]
    pub max_k: usize,
    /// k used for the saved model.
    #[arg(long, env = "CLUSTERS", default_value_t = DEFAULT_CLUSTERS)]
    pub clusters: usize,
    #[arg(long, default_value_t = KMEANS_SEED)]
    pub seed: u64,
    /// Refuse clusters with a single member when scoring.
    #[arg(long)]
    pub strict: bool,
    #[command(flatten)]
    pub paths: PathArgs,
}

#[derive(Debug, Parser)]
#[command(author, version, about = "Serve cluster predictions over HTTP", long_about = None)]
pub struct ServeArgs {
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:5000")]
    pub bind: String,
    #[arg(long, env = "WORKERS", default_value_t = num_cpus::get())]
    pub workers: usize,
    #[arg(long, env = "MODEL_PATH", default_value = crate::MODEL_PATH)]
    pub model: PathBuf,
    #[arg(long, env = "LOGS_DIR", default_value = crate::LOGS_DIR)]
    pub logs: PathBuf,
}

#[derive(Debug, Parser)]
#[command(author, version, about = "Serve the clustered table as scatter data", long_about = None)]
pub struct DashboardArgs {
    #[arg(long, env = "DASHBOARD_ADDR", default_value = "127.0.0.1:8050")]
    pub bind: String,
    #[arg(long, env = "WORKERS", default_value_t = num_cpus::get())]
    pub workers: usize,
    #[arg(long, env = "CLUSTERED_DATA", default_value = crate::CLUSTERED_DATA)]
    pub clustered: PathBuf,
    #[arg(long, env = "LOGS_DIR", default_value = crate::LOGS_DIR)]
    pub logs: PathBuf,
}

#[derive(Debug, Parser)]
#[command(author, version, about = "Retrain the model on a fixed interval", long_about = None)]
pub struct RetrainArgs {
    /// Days between runs.
    #[arg(long, env = "RETRAIN_DAYS", default_value_t = 30)]
    pub every_days: u64,
    #[arg(long, env = "CLUSTERS", default_value_t = DEFAULT_CLUSTERS)]
    pub clusters: usize,
    /// Run once at startup instead of waiting a full interval.
    #[arg(long)]
    pub now: bool,
    /// Run once and exit.
    #[arg(long, conflicts_with = "now")]
    pub once: bool,
    #[command(flatten)]
    pub paths: PathArgs,
}

impl RetrainArgs {
    pub fn every(&self) -> Duration {
        Duration::from_secs(self.every_days.max(1) * 24 * 3600)
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about = "Run the inference and dashboard servers together", long_about = None)]
pub struct SuperviseArgs {
    /// Inference server binary. Defaults to `serve` next to this executable.
    #[arg(long, env = "SERVE_BIN")]
    pub serve: Option<PathBuf>,
    /// Dashboard binary. Defaults to `dashboard` next to this executable.
    #[arg(long, env = "DASHBOARD_BIN")]
    pub dashboard: Option<PathBuf>,
    /// Seconds each child gets to exit before it is killed.
    #[arg(long, default_value_t = crate::SHUTDOWN_GRACE.as_secs())]
    pub grace: u64,
    #[arg(long, env = "LOGS_DIR", default_value = crate::LOGS_DIR)]
    pub logs: PathBuf,
}

impl SuperviseArgs {
    /// Path of a sibling binary of the running executable.
    pub fn sibling(name: &str) -> std::io::Result<PathBuf> {
        let exe = std::env::current_exe()?;
        Ok(exe.with_file_name(format!("{}{}", name, std::env::consts::EXE_SUFFIX)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_default_to_all() {
        let args = PipelineArgs::parse_from(["pipeline"]);
        assert_eq!(args.steps, Step::all());
        assert_eq!(args.max_k, DEFAULT_MAX_K);
    }

    #[test]
    fn steps_parse_in_any_order() {
        let args = PipelineArgs::parse_from(["pipeline", "--steps", "retrain", "preprocess"]);
        assert_eq!(args.steps, vec![Step::Retrain, Step::Preprocess]);
        assert!(PipelineArgs::try_parse_from(["pipeline", "--steps", "deploy"]).is_err());
    }

    #[test]
    fn retrain_interval_is_whole_days() {
        let args = RetrainArgs::parse_from(["retrain", "--every-days", "2"]);
        assert_eq!(args.every(), Duration::from_secs(2 * 24 * 3600));
        assert!(RetrainArgs::try_parse_from(["retrain", "--now", "--once"]).is_err());
    }
}
