//! herd - role and replication management for fleets of MySQL servers
//!
//! A deployment is a set of servers, each bound to a topology role:
//! a [`Master`](roles::Role::Master) sources the event stream, a
//! [`Replica`](roles::Role::Replica) follows it, a
//! [`Relay`](roles::Role::Relay) forwards it without retaining table data,
//! and a [`Vagabond`](roles::Role::Vagabond) stands outside the topology.
//! Imbuing a server with a role edits its remote configuration file,
//! bounces the service and runs the role's SQL — see [`roles`]. Positions
//! in the event stream are compared and synchronized with [`replication`],
//! and [`backup`] images servers and clones new replicas.
//!
//! Everything is synchronous and blocking; callers orchestrating several
//! servers bring their own parallelism, one handle per caller.

pub mod backup;
pub mod cli;
pub mod config;
pub mod deployment;
pub mod replication;
pub mod roles;
pub mod server;
pub mod testkit;
pub mod transport;

pub use config::{ConfigDocument, ConfigError, ConfigTransport};
pub use replication::{Position, ReplicationError};
pub use roles::{Role, RoleError, Upstream};
pub use server::{LinuxMachine, Machine, ServerHandle, ServerSpec, SolarisMachine, User};
pub use transport::{SqlError, TransportError};
