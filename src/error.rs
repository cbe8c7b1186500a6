use thiserror::Error;

/// Errors reported by [`TopK`](crate::TopK).
///
/// Only construction and submission can fail; queries never do.
#[derive(Debug, Error)]
pub enum TopKError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("item submitted after drain; the ingestion queue is closed")]
    Drained,

    #[error("failed to spawn ingestion worker: {0}")]
    Spawn(#[from] std::io::Error),
}
