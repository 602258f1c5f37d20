//! Deployment descriptions
//!
//! A deployment is a JSON description of the managed fleet: one entry per
//! server with its address, principals, machine family and declared role.
//! Loading a description builds a [`ServerHandle`] per entry wired to the
//! subprocess transports; the declared roles are a plan, applied against
//! live servers by the embedding application (role application needs a SQL
//! driver, which descriptions cannot carry).

mod errors;

pub use errors::{DeploymentError, DeploymentResult};

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::server::{
    LinuxMachine, Machine, ServerHandle, ServerSpec, SolarisMachine, User,
};
use crate::transport::{NullConnector, OpenSshRunner, ScpTransfer};

/// OS family of a managed host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MachineFamily {
    /// Debian-flavored Linux, init-script service control.
    #[default]
    Linux,
    /// Solaris, svcadm service control.
    Solaris,
}

impl MachineFamily {
    fn machine(self) -> Box<dyn Machine> {
        match self {
            MachineFamily::Linux => Box::new(LinuxMachine),
            MachineFamily::Solaris => Box::new(SolarisMachine),
        }
    }
}

/// Role a server is declared to play, by reference to other entries.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DeclaredRole {
    /// Not part of the topology.
    #[default]
    Vagabond,
    /// Event-stream source with its replication user.
    Master {
        /// Replication principal to provision.
        repl_user: User,
    },
    /// Final replica of the named upstream entry.
    Replica {
        /// Name of the upstream server entry.
        upstream: String,
    },
    /// Relay forwarding from the named upstream entry.
    Relay {
        /// Name of the upstream server entry.
        upstream: String,
    },
}

impl DeclaredRole {
    /// Short name for display.
    pub fn name(&self) -> &'static str {
        match self {
            DeclaredRole::Vagabond => "vagabond",
            DeclaredRole::Master { .. } => "master",
            DeclaredRole::Replica { .. } => "replica",
            DeclaredRole::Relay { .. } => "relay",
        }
    }
}

/// One server entry of a deployment description.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerEntry {
    /// Server name, unique within the deployment.
    pub name: String,
    /// Principal for SQL sessions.
    pub sql_user: User,
    /// Principal for remote command execution.
    pub ssh_user: User,
    /// Hostname; defaults to localhost.
    #[serde(default = "default_host")]
    pub host: String,
    /// TCP port; defaults to 3306.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Socket path for localhost connections.
    #[serde(default = "default_socket")]
    pub socket: PathBuf,
    /// Event-stream producer id, if pre-assigned.
    #[serde(default)]
    pub server_id: Option<u64>,
    /// Remote configuration file; machine default when absent.
    #[serde(default)]
    pub defaults_file: Option<PathBuf>,
    /// Configuration file section; defaults to `mysqld`.
    #[serde(default = "default_section")]
    pub config_section: String,
    /// OS family of the host.
    #[serde(default)]
    pub machine: MachineFamily,
    /// Role this server is declared to play.
    #[serde(default)]
    pub role: DeclaredRole,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    3306
}

fn default_socket() -> PathBuf {
    PathBuf::from("/tmp/mysqld.sock")
}

fn default_section() -> String {
    "mysqld".to_string()
}

impl ServerEntry {
    fn build(&self) -> ServerHandle {
        let mut spec = ServerSpec::new(&self.name, self.sql_user.clone(), self.ssh_user.clone());
        spec.host = self.host.clone();
        spec.port = self.port;
        spec.socket = self.socket.clone();
        spec.server_id = self.server_id;
        spec.defaults_file = self.defaults_file.clone();
        spec.config_section = self.config_section.clone();
        ServerHandle::new(
            spec,
            self.machine.machine(),
            Box::new(OpenSshRunner::new()),
            Box::new(ScpTransfer::new()),
            Box::new(NullConnector::new()),
        )
    }
}

/// The parsed form of a deployment description file.
#[derive(Debug, Clone, Deserialize)]
pub struct DeploymentSpec {
    /// The managed servers.
    pub servers: Vec<ServerEntry>,
}

/// A loaded deployment: one handle per described server plus the declared
/// role plan.
pub struct Deployment {
    servers: Vec<ServerHandle>,
    roles: HashMap<String, DeclaredRole>,
}

impl Deployment {
    /// Load a description file.
    pub fn load(path: &Path) -> DeploymentResult<Self> {
        let text = fs::read_to_string(path)?;
        let spec: DeploymentSpec = serde_json::from_str(&text)?;
        Self::from_spec(spec)
    }

    /// Build a deployment from an in-memory description.
    pub fn from_spec(spec: DeploymentSpec) -> DeploymentResult<Self> {
        let mut servers = Vec::new();
        let mut roles = HashMap::new();
        for entry in &spec.servers {
            if roles
                .insert(entry.name.clone(), entry.role.clone())
                .is_some()
            {
                return Err(DeploymentError::DuplicateServer {
                    name: entry.name.clone(),
                });
            }
            servers.push(entry.build());
        }
        Ok(Self { servers, roles })
    }

    /// All server handles, in description order.
    pub fn servers(&self) -> impl Iterator<Item = &ServerHandle> {
        self.servers.iter()
    }

    /// Look up a handle by name.
    pub fn server(&self, name: &str) -> Option<&ServerHandle> {
        self.servers.iter().find(|server| server.name() == name)
    }

    /// Look up a handle by name, mutably.
    pub fn server_mut(&mut self, name: &str) -> Option<&mut ServerHandle> {
        self.servers.iter_mut().find(|server| server.name() == name)
    }

    /// The role a server is declared to play.
    pub fn declared_role(&self, name: &str) -> Option<&DeclaredRole> {
        self.roles.get(name)
    }
}
