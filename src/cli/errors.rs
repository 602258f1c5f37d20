//! Error types for the CLI.

use thiserror::Error;

use crate::config::ConfigError;
use crate::deployment::DeploymentError;
use crate::transport::TransportError;

/// Result type for CLI commands.
pub type CliResult<T> = Result<T, CliError>;

/// Failures surfaced to the command line.
#[derive(Debug, Error)]
pub enum CliError {
    /// The named server is not in the deployment description.
    #[error("unknown server: {name}")]
    UnknownServer {
        /// The requested name.
        name: String,
    },

    /// The deployment description could not be loaded.
    #[error(transparent)]
    Deployment(#[from] DeploymentError),

    /// A configuration round trip failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A service-control command failed.
    #[error(transparent)]
    Command(#[from] TransportError),
}
