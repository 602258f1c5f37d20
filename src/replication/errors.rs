//! Error types for replication operations.

use thiserror::Error;

use crate::transport::{SqlError, TransportError};

/// Result type for replication operations.
pub type ReplicationResult<T> = Result<T, ReplicationError>;

/// Failures of position reads and replica synchronization.
#[derive(Debug, Error)]
pub enum ReplicationError {
    /// The server is not acting as a master: it reports no write position,
    /// or carries no attached replication user for replicas to use.
    #[error("server {server} is not a master")]
    NotAMaster {
        /// The offending server.
        server: String,
    },

    /// The server is not configured as a replica.
    #[error("server {server} is not a replica")]
    NotAReplica {
        /// The offending server.
        server: String,
    },

    /// Replication is not running where it was expected to run.
    #[error("replication is not running on {server}")]
    ReplicaNotRunning {
        /// The offending server.
        server: String,
    },

    /// Two positions from different producers were compared.
    #[error("positions are for different producers: {left} and {right}")]
    MismatchedProducer {
        /// Producer id of the left-hand position.
        left: u64,
        /// Producer id of the right-hand position.
        right: u64,
    },

    /// A position could not be parsed from its textual or status-row form.
    #[error("malformed position: {input}")]
    MalformedPosition {
        /// The offending input.
        input: String,
    },

    /// A SQL statement failed. Carries `EmptyResult` when a status query
    /// expected to return a row returned none.
    #[error(transparent)]
    Sql(#[from] SqlError),

    /// A subprocess (binlog fetch) failed.
    #[error(transparent)]
    Command(#[from] TransportError),
}
