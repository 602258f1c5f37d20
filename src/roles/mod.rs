//! Server roles
//!
//! A role is the configuration and SQL profile that makes a server act as a
//! particular member of the replication topology:
//! - `Vagabond`: not part of the deployment; both transitions are no-ops
//! - `Master`: event log enabled, replication user provisioned and attached
//! - `Replica`: event log disabled, inherits the upstream's replication user
//! - `Relay`: forwards events without retaining table contents (every user
//!   table converted to the BLACKHOLE engine)
//!
//! Transitions run through [`ServerHandle::imbue`](crate::server::ServerHandle::imbue):
//! the old role is reversed, the new one applied, and the stored role swaps
//! only once the application succeeds. Configuration fetch/parse failures
//! during a transition are swallowed so the service is always restarted —
//! a failed transition must never leave the instance stopped.

mod common;
mod errors;
mod master;
mod relay;
mod replica;
mod vagabond;

pub use errors::{RoleError, RoleResult};

use crate::server::{ServerHandle, User};

/// Reference to the upstream server a replica or relay reads from, captured
/// from the upstream's handle at role-construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upstream {
    name: String,
    repl_user: Option<User>,
}

impl Upstream {
    /// Capture the upstream reference from a handle. The replication user
    /// is present only if the upstream has been imbued as a master.
    pub fn of(server: &ServerHandle) -> Self {
        Self {
            name: server.name().to_string(),
            repl_user: server.repl_user().cloned(),
        }
    }

    /// Name of the upstream server.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The upstream's attached replication user, if any.
    pub fn repl_user(&self) -> Option<&User> {
        self.repl_user.as_ref()
    }
}

/// A topology role. Closed set; dispatch is by variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    /// A server outside the deployment. The explicit "no role" — a handle
    /// never carries an absent role.
    Vagabond,
    /// Event-stream source. Carries the replication user to provision and
    /// attach for downstream replicas to read.
    Master {
        /// SQL principal granted the replication privilege.
        repl_user: User,
    },
    /// Serves queries, never changes role; no event log of its own.
    Replica {
        /// The server this replica reads from.
        upstream: Upstream,
    },
    /// Forwards events without retaining queryable table contents.
    Relay {
        /// The server this relay reads from.
        upstream: Upstream,
    },
}

impl Role {
    /// Short name for logs and display.
    pub fn name(&self) -> &'static str {
        match self {
            Role::Vagabond => "vagabond",
            Role::Master { .. } => "master",
            Role::Replica { .. } => "replica",
            Role::Relay { .. } => "relay",
        }
    }

    pub(crate) fn imbue(&self, server: &mut ServerHandle) -> RoleResult<()> {
        match self {
            Role::Vagabond => vagabond::imbue(server),
            Role::Master { repl_user } => master::imbue(server, repl_user),
            Role::Replica { upstream } => replica::imbue(server, upstream),
            Role::Relay { upstream } => relay::imbue(server, upstream),
        }
    }

    pub(crate) fn unimbue(&self, server: &mut ServerHandle) -> RoleResult<()> {
        match self {
            Role::Vagabond => vagabond::unimbue(server),
            Role::Master { .. } => master::unimbue(server),
            Role::Replica { .. } => replica::unimbue(server),
            Role::Relay { .. } => relay::unimbue(server),
        }
    }
}
