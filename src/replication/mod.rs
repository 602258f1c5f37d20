//! Replication positions and synchronization
//!
//! A [`Position`] locates a point in one producer's append-only event log.
//! The operations here read positions from live servers, point replicas at
//! sources, and block until a replica reaches a target — the blocking is
//! server-driven (`MASTER_POS_WAIT`), never client-side polling.
//!
//! Every operation takes its servers and positions as explicit arguments;
//! there is no ambient deployment state.

mod binlog;
mod errors;
mod ops;
mod position;

pub use binlog::fetch_binlog;
pub use errors::{ReplicationError, ReplicationResult};
pub use ops::{
    flush_and_lock, master_position, point_replica_at, replica_position, unlock,
    wait_and_stop_at, wait_for_position, wait_for_relay_drain,
};
pub use position::Position;
