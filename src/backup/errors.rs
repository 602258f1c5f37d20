//! Error types for backup and restore.

use std::io;
use thiserror::Error;

use crate::config::ConfigError;
use crate::replication::ReplicationError;
use crate::transport::{SqlError, TransportError};

/// Result type for backup operations.
pub type BackupResult<T> = Result<T, BackupError>;

/// Failures while imaging or restoring a server.
#[derive(Debug, Error)]
pub enum BackupError {
    /// The server's configuration does not name a data directory.
    #[error("server {server} has no datadir configured")]
    MissingDataDir {
        /// The offending server.
        server: String,
    },

    /// Reading the server configuration failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A locking or status statement failed.
    #[error(transparent)]
    Sql(#[from] SqlError),

    /// Archiving or shipping the image failed.
    #[error(transparent)]
    Command(#[from] TransportError),

    /// Capturing the image's position failed.
    #[error(transparent)]
    Replication(#[from] ReplicationError),

    /// Local scratch I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
