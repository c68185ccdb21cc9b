//! Error types for the pipeline runtime.

use kline_store::StoreError;
use thiserror::Error;

/// Errors raised while starting or running the pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The configuration cannot be run.
    #[error("Invalid pipeline configuration: {0}")]
    InvalidConfig(String),

    /// A table could not be provisioned at start-up.
    #[error("Failed to provision table '{table}': {source}")]
    Provision {
        /// The table being created.
        table: String,
        /// The underlying store error.
        source: StoreError,
    },

    /// A storage operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A blocking storage task panicked or was cancelled.
    #[error("Storage task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
