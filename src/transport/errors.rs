//! Error types for the transport seams.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for command execution and file transfer.
pub type TransportResult<T> = Result<T, TransportError>;

/// Failures of the remote-execution and file-transfer capabilities.
///
/// These propagate to the caller unchanged; the core never retries.
#[derive(Debug, Error)]
pub enum TransportError {
    /// A file copy to or from a remote host failed.
    #[error("transfer of {path} for host {host} failed: {message}")]
    Transfer {
        /// Host the copy involved.
        host: String,
        /// Remote path of the copy.
        path: PathBuf,
        /// Underlying failure.
        message: String,
    },

    /// A remote command could not be spawned or exited nonzero.
    #[error("command on {host} failed: {message}")]
    Command {
        /// Host the command ran on.
        host: String,
        /// Underlying failure.
        message: String,
    },

    /// Local I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for SQL execution.
pub type SqlResult<T> = Result<T, SqlError>;

/// Failures of the SQL execution seam.
#[derive(Debug, Clone, Error)]
pub enum SqlError {
    /// SQL was issued with no session and no way to establish one.
    #[error("no SQL session established")]
    NotConnected,

    /// A statement expected to return a row returned none.
    #[error("statement returned an empty result")]
    EmptyResult,

    /// A row was indexed by a column it does not carry.
    #[error("unknown column: {column}")]
    UnknownColumn {
        /// The requested column.
        column: String,
    },

    /// A column expected to hold a value was NULL.
    #[error("column {column} is NULL")]
    NullValue {
        /// The NULL column.
        column: String,
    },

    /// The server rejected or failed the statement.
    #[error("statement failed: {message}")]
    Execution {
        /// Server-reported failure.
        message: String,
    },
}
