use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FunnelError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Missing input table: {}", path.display())]
    MissingInput { path: PathBuf },

    #[error("Cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Chart rendering failed for {name}: {message}")]
    Chart { name: &'static str, message: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type FunnelResult<T> = Result<T, FunnelError>;
