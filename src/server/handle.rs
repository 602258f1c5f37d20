//! The server handle aggregate.

use std::path::PathBuf;

use tracing::debug;

use crate::config::{ConfigDocument, ConfigResult, ConfigTransport};
use crate::roles::{Role, RoleResult};
use crate::transport::{
    CommandRunner, FileTransfer, SqlConnector, SqlEndpoint, SqlParam, SqlResult, SqlRows,
    SqlSession, TransportResult,
};

use super::machine::Machine;
use super::user::User;

/// Static description of a managed server, used to construct a handle.
///
/// Only the name and the two principals are mandatory; everything else has
/// the conventional MySQL defaults. A missing `defaults_file` falls back to
/// the machine's OS-family default.
#[derive(Debug, Clone)]
pub struct ServerSpec {
    /// Server name; used to derive event-log file names.
    pub name: String,
    /// Principal for SQL sessions.
    pub sql_user: User,
    /// Principal for remote command execution.
    pub ssh_user: User,
    /// Hostname; `localhost` selects the socket and plain-copy paths.
    pub host: String,
    /// TCP port used when `host` is not localhost.
    pub port: u16,
    /// Socket path used when `host` is localhost.
    pub socket: PathBuf,
    /// Event-stream producer id, if already known.
    pub server_id: Option<u64>,
    /// Remote configuration file; machine default when absent.
    pub defaults_file: Option<PathBuf>,
    /// Section of the configuration file this server reads.
    pub config_section: String,
}

impl ServerSpec {
    /// Describe a server with the conventional defaults.
    pub fn new(name: impl Into<String>, sql_user: User, ssh_user: User) -> Self {
        Self {
            name: name.into(),
            sql_user,
            ssh_user,
            host: "localhost".to_string(),
            port: 3306,
            socket: PathBuf::from("/tmp/mysqld.sock"),
            server_id: None,
            defaults_file: None,
            config_section: "mysqld".to_string(),
        }
    }
}

/// Proxy for operating on one MySQL server.
///
/// The SQL session is established lazily on first use and can be dropped
/// with [`disconnect`](Self::disconnect); the handle stays reusable and
/// reconnects on the next statement. The handle always carries a role —
/// a server outside the deployment is [`Role::Vagabond`], never "no role".
pub struct ServerHandle {
    name: String,
    host: String,
    port: u16,
    socket: PathBuf,
    server_id: Option<u64>,
    sql_user: User,
    ssh_user: User,
    defaults_file: PathBuf,
    config_section: String,
    machine: Box<dyn Machine>,
    runner: Box<dyn CommandRunner>,
    transfer: Box<dyn FileTransfer>,
    connector: Box<dyn SqlConnector>,
    session: Option<Box<dyn SqlSession>>,
    role: Role,
    repl_user: Option<User>,
}

impl ServerHandle {
    /// Create a handle bound to [`Role::Vagabond`]. Assign a real role with
    /// [`imbue`](Self::imbue).
    pub fn new(
        spec: ServerSpec,
        machine: Box<dyn Machine>,
        runner: Box<dyn CommandRunner>,
        transfer: Box<dyn FileTransfer>,
        connector: Box<dyn SqlConnector>,
    ) -> Self {
        let defaults_file = spec
            .defaults_file
            .unwrap_or_else(|| machine.defaults_file().to_path_buf());
        Self {
            name: spec.name,
            host: spec.host,
            port: spec.port,
            socket: spec.socket,
            server_id: spec.server_id,
            sql_user: spec.sql_user,
            ssh_user: spec.ssh_user,
            defaults_file,
            config_section: spec.config_section,
            machine,
            runner,
            transfer,
            connector,
            session: None,
            role: Role::Vagabond,
            repl_user: None,
        }
    }

    /// Server name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Hostname of the server.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// TCP port of the server.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Event-stream producer id, when known.
    pub fn server_id(&self) -> Option<u64> {
        self.server_id
    }

    /// Adopt a producer id (typically from the configuration file).
    pub fn set_server_id(&mut self, server_id: Option<u64>) {
        self.server_id = server_id;
    }

    /// Principal used for remote command execution.
    pub fn ssh_user(&self) -> &User {
        &self.ssh_user
    }

    /// Principal used for SQL sessions.
    pub fn sql_user(&self) -> &User {
        &self.sql_user
    }

    /// Remote path of the server's configuration file.
    pub fn defaults_file(&self) -> &std::path::Path {
        &self.defaults_file
    }

    /// Configuration file section this server reads.
    pub fn config_section(&self) -> &str {
        &self.config_section
    }

    /// The currently bound role.
    pub fn role(&self) -> &Role {
        &self.role
    }

    /// Replication user attached by a master imbue, read by replicas
    /// pointing at this server.
    pub fn repl_user(&self) -> Option<&User> {
        self.repl_user.as_ref()
    }

    /// Attach or detach the replication user.
    pub fn set_repl_user(&mut self, user: Option<User>) {
        self.repl_user = user;
    }

    /// SQL endpoint of this server.
    pub fn endpoint(&self) -> SqlEndpoint {
        SqlEndpoint {
            host: self.host.clone(),
            port: self.port,
            socket: self.socket.clone(),
        }
    }

    /// Establish the SQL session if none is open.
    pub fn connect(&mut self) -> SqlResult<()> {
        if self.session.is_none() {
            let session = self.connector.connect(&self.endpoint(), &self.sql_user)?;
            self.session = Some(session);
        }
        Ok(())
    }

    /// True if a SQL session is currently established.
    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// Drop the SQL session. The handle stays reusable; the next statement
    /// reconnects.
    pub fn disconnect(&mut self) {
        self.session = None;
    }

    /// Execute a SQL statement, establishing the session on first use.
    pub fn sql(&mut self, statement: &str, params: &[SqlParam]) -> SqlResult<SqlRows> {
        self.connect()?;
        match self.session.as_mut() {
            Some(session) => session.execute(statement, params),
            None => Err(crate::transport::SqlError::NotConnected),
        }
    }

    /// Run a shell command on the server's host as the ssh principal.
    pub fn ssh(&self, argv: &[String]) -> TransportResult<Vec<String>> {
        self.runner.run(&self.host, &self.ssh_user, argv)
    }

    /// Copy a file from the server's host to the local machine.
    pub fn fetch_file(&self, remote: &std::path::Path, local: &std::path::Path) -> TransportResult<()> {
        self.transfer
            .copy_from_remote(&self.host, &self.ssh_user, remote, local)
    }

    /// Copy a local file onto the server's host.
    pub fn put_file(&self, local: &std::path::Path, remote: &std::path::Path) -> TransportResult<()> {
        self.transfer
            .copy_to_remote(local, &self.host, &self.ssh_user, remote)
    }

    /// Stop the database service.
    pub fn stop(&self) -> TransportResult<()> {
        debug!(server = %self.name, "stopping service");
        self.ssh(&self.machine.stop_command()).map(|_| ())
    }

    /// Start the database service.
    pub fn start(&self) -> TransportResult<()> {
        debug!(server = %self.name, "starting service");
        self.ssh(&self.machine.start_command()).map(|_| ())
    }

    /// Fetch the remote configuration file into a document scoped to this
    /// server's section.
    pub fn fetch_config(&self) -> ConfigResult<ConfigDocument> {
        ConfigTransport::new(self.transfer.as_ref()).fetch(
            &self.host,
            &self.ssh_user,
            &self.defaults_file,
            &self.config_section,
        )
    }

    /// Ship a document back to the remote configuration file.
    pub fn replace_config(&self, config: &ConfigDocument) -> ConfigResult<()> {
        ConfigTransport::new(self.transfer.as_ref()).write(
            config,
            &self.host,
            &self.ssh_user,
            &self.defaults_file,
        )
    }

    /// Swap roles: reverse the old role's effects, then apply the new
    /// ones.
    ///
    /// The stored role changes only once the new role's `imbue` succeeds;
    /// a failed transition leaves the handle bound to [`Role::Vagabond`],
    /// since the old role's effects have already been reversed.
    pub fn imbue(&mut self, role: Role) -> RoleResult<()> {
        let old = std::mem::replace(&mut self.role, Role::Vagabond);
        debug!(server = %self.name, from = old.name(), to = role.name(), "role transition");
        old.unimbue(self)?;
        role.imbue(self)?;
        self.role = role;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::testkit::{RecordingRunner, ScriptedSql};

    fn handle(sql: &ScriptedSql) -> super::ServerHandle {
        let root = tempfile::tempdir().unwrap();
        crate::testkit::scripted_handle("alpha", Some(1), root.path(), sql, &RecordingRunner::new())
    }

    #[test]
    fn test_session_is_established_lazily() {
        let sql = ScriptedSql::new();
        let mut server = handle(&sql);
        assert!(!server.is_connected());
        server.sql("SELECT 1", &[]).unwrap();
        assert!(server.is_connected());
    }

    #[test]
    fn test_disconnect_leaves_the_handle_reusable() {
        let sql = ScriptedSql::new();
        let mut server = handle(&sql);
        server.sql("SELECT 1", &[]).unwrap();
        server.disconnect();
        assert!(!server.is_connected());
        server.sql("SELECT 2", &[]).unwrap();
        assert!(server.is_connected());
        assert_eq!(sql.statements(), ["SELECT 1", "SELECT 2"]);
    }

    #[test]
    fn test_connect_is_idempotent() {
        let sql = ScriptedSql::new();
        let mut server = handle(&sql);
        server.connect().unwrap();
        server.connect().unwrap();
        assert!(server.is_connected());
    }
}
