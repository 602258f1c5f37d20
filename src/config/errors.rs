//! Error types for the configuration subsystem.

use std::io;
use thiserror::Error;

use crate::transport::TransportError;

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Failures of the configuration round trip.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An option was read or removed that the active section does not hold.
    ///
    /// Recoverable; callers removing an option usually treat this as
    /// "already absent".
    #[error("option not found: {option}")]
    OptionNotFound {
        /// The missing option.
        option: String,
    },

    /// The file did not match the expected grammar.
    #[error("configuration did not match the expected grammar: {message}")]
    Parse {
        /// What failed to parse.
        message: String,
    },

    /// The remote copy of the file failed.
    #[error(transparent)]
    Transfer(#[from] TransportError),

    /// Local scratch-file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
