//! Error taxonomy for the segmentation lifecycle.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or incomplete request, table or configuration.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Cluster quality cannot be measured on this partition.
    #[error("degenerate clustering: {0}")]
    DegenerateClustering(String),

    /// Invalid cluster count or unusable training input.
    #[error("training failed: {0}")]
    Training(String),

    /// No artifact at the configured path.
    #[error("model not found at {}", .0.display())]
    ModelNotFound(std::path::PathBuf),

    /// Artifact bytes do not decode into a valid model.
    #[error("model at {} is corrupt: {reason}", path.display())]
    ModelCorrupt {
        path: std::path::PathBuf,
        reason: String,
    },

    /// A supervised child could not be started.
    #[error("failed to launch {name}: {source}")]
    Launch {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// A supervised child could not be signalled or reaped.
    #[error("failed to terminate {name}: {source}")]
    Terminate {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Whether the failure was caused by the caller rather than by us.
    pub fn is_client(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
