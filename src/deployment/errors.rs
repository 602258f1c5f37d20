//! Error types for deployment descriptions.

use std::io;
use thiserror::Error;

/// Result type for deployment loading.
pub type DeploymentResult<T> = Result<T, DeploymentError>;

/// Failures while loading a deployment description.
#[derive(Debug, Error)]
pub enum DeploymentError {
    /// Two entries share a server name.
    #[error("duplicate server name in deployment: {name}")]
    DuplicateServer {
        /// The repeated name.
        name: String,
    },

    /// The description file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The description is not valid JSON of the expected shape.
    #[error("invalid deployment description: {0}")]
    Parse(#[from] serde_json::Error),
}
