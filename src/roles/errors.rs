//! Error types for role transitions.

use thiserror::Error;

use crate::config::ConfigError;
use crate::transport::{SqlError, TransportError};

/// Result type for role transitions.
pub type RoleResult<T> = Result<T, RoleError>;

/// Failures during a role transition.
#[derive(Debug, Error)]
pub enum RoleError {
    /// Configuration fetch, parse or write failed. This is the class a
    /// transition swallows around its stop/write/start sequence.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A SQL statement of the transition failed.
    #[error(transparent)]
    Sql(#[from] SqlError),

    /// A service-control command failed.
    #[error(transparent)]
    Command(#[from] TransportError),
}

impl RoleError {
    /// True for the configuration-error class that transitions swallow.
    pub fn is_config(&self) -> bool {
        matches!(self, RoleError::Config(_))
    }
}
