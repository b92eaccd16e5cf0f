use thiserror::Error;

/// Errors raised while loading inputs, building features or training.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bincode error: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("shape mismatch: {features} feature rows but {truth} truth rows")]
    ShapeMismatch { features: usize, truth: usize },

    #[error("ragged matrix in {path}: row {row} has {found} columns, expected {expected}")]
    RaggedRow {
        path: String,
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("no data: {0}")]
    Empty(String),

    #[error("classifier failed: {0}")]
    Model(String),

    #[error("thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
