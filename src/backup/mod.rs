//! Physical backups and replica provisioning
//!
//! A physical backup images the server's data directory behind the global
//! read lock and records the event-log position the image corresponds to,
//! so a restored server can be pointed at its source from exactly that
//! offset. [`clone_replica`] chains backup, restore and
//! [`point_replica_at`](crate::replication::point_replica_at) to provision
//! a new replica from a master or from a sibling replica.

mod clone;
mod errors;
mod physical;

pub use clone::clone_replica;
pub use errors::{BackupError, BackupResult};
pub use physical::PhysicalBackup;
