#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("Input is empty")]
    EmptyInput,
    #[error("Too many attributes: {count} (limit {limit})")]
    TooManyAttributes { count: usize, limit: usize },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, NormalizeError>;
