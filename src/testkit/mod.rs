//! Test doubles for the transport seams
//!
//! These stand in for live servers in unit and integration tests:
//! - [`ScriptedSql`] answers statements from scripted responses and keeps a
//!   journal of everything executed
//! - [`RecordingRunner`] records every remote command and returns scripted
//!   output
//! - [`DirTransfer`] maps remote paths into a local directory, so the real
//!   copy code paths run against scratch files
//!
//! All doubles are cheap clones sharing one interior state, so a test can
//! keep a handle for assertions after moving a clone into a
//! [`ServerHandle`](crate::server::ServerHandle).

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::server::{LinuxMachine, ServerHandle, ServerSpec, User};
use crate::transport::{
    CommandRunner, FileTransfer, SqlConnector, SqlEndpoint, SqlError, SqlParam, SqlResult,
    SqlRow, SqlRows, SqlSession, TransportError, TransportResult,
};

/// A sample configuration file with two server sections, a comment, a
/// valueless option and a blank line.
pub const SAMPLE_CONFIG: &str = "\
# Managed by herd
[mysqld1]
user = mysql
pid-file = /var/run/mysqld/mysqld1.pid
log-bin = /var/log/mysql/master-bin
slave-skip-start

[mysqld2]
user = mysql
";

/// Build a single result row from `(column, value)` pairs; `None` is NULL.
pub fn row(entries: &[(&str, Option<&str>)]) -> SqlRow {
    SqlRow::new(
        entries
            .iter()
            .map(|(name, value)| (name.to_string(), value.map(str::to_owned)))
            .collect(),
    )
}

/// Build a one-row cursor from `(column, value)` pairs.
pub fn status(entries: &[(&str, Option<&str>)]) -> SqlRows {
    SqlRows::one(row(entries))
}

/// One executed statement, as recorded by [`ScriptedSql`].
#[derive(Debug, Clone)]
pub struct ExecutedStatement {
    /// The statement text.
    pub statement: String,
    /// The bound parameters.
    pub params: Vec<SqlParam>,
}

struct SqlRule {
    needle: String,
    responses: VecDeque<Result<SqlRows, SqlError>>,
}

#[derive(Default)]
struct SqlState {
    rules: Vec<SqlRule>,
    journal: Vec<ExecutedStatement>,
    refuse_connections: bool,
}

/// Scripted SQL connector and session.
///
/// Statements are matched by substring against the registered rules, in
/// registration order; each match consumes one queued response. Unmatched
/// statements succeed with an empty cursor, which is what the action
/// statements (`STOP SLAVE`, `FLUSH TABLES ...`) want.
#[derive(Clone, Default)]
pub struct ScriptedSql {
    state: Rc<RefCell<SqlState>>,
}

impl ScriptedSql {
    /// A scripted connector with no rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response for statements containing `needle`.
    pub fn respond(&self, needle: &str, rows: SqlRows) {
        self.push(needle, Ok(rows));
    }

    /// Queue a failure for statements containing `needle`.
    pub fn fail(&self, needle: &str, error: SqlError) {
        self.push(needle, Err(error));
    }

    /// Make every connection attempt fail, like a handle with no SQL
    /// capability.
    pub fn refuse_connections(&self) {
        self.state.borrow_mut().refuse_connections = true;
    }

    /// Texts of every statement executed so far, in order.
    pub fn statements(&self) -> Vec<String> {
        self.state
            .borrow()
            .journal
            .iter()
            .map(|entry| entry.statement.clone())
            .collect()
    }

    /// Full journal of executed statements with their parameters.
    pub fn executed(&self) -> Vec<ExecutedStatement> {
        self.state.borrow().journal.clone()
    }

    fn push(&self, needle: &str, response: Result<SqlRows, SqlError>) {
        let mut state = self.state.borrow_mut();
        if let Some(rule) = state.rules.iter_mut().find(|rule| rule.needle == needle) {
            rule.responses.push_back(response);
            return;
        }
        state.rules.push(SqlRule {
            needle: needle.to_string(),
            responses: VecDeque::from([response]),
        });
    }
}

impl SqlConnector for ScriptedSql {
    fn connect(&self, _endpoint: &SqlEndpoint, _user: &User) -> SqlResult<Box<dyn SqlSession>> {
        if self.state.borrow().refuse_connections {
            return Err(SqlError::NotConnected);
        }
        Ok(Box::new(ScriptedSession {
            state: self.state.clone(),
        }))
    }
}

struct ScriptedSession {
    state: Rc<RefCell<SqlState>>,
}

impl SqlSession for ScriptedSession {
    fn execute(&mut self, statement: &str, params: &[SqlParam]) -> SqlResult<SqlRows> {
        let mut state = self.state.borrow_mut();
        state.journal.push(ExecutedStatement {
            statement: statement.to_string(),
            params: params.to_vec(),
        });
        for rule in &mut state.rules {
            if statement.contains(&rule.needle) {
                if let Some(response) = rule.responses.pop_front() {
                    return response;
                }
            }
        }
        Ok(SqlRows::empty())
    }
}

#[derive(Default)]
struct RunnerState {
    commands: Vec<(String, Vec<String>)>,
    failures: Vec<String>,
}

/// Command runner that records every invocation and returns no output.
#[derive(Clone, Default)]
pub struct RecordingRunner {
    state: Rc<RefCell<RunnerState>>,
}

impl RecordingRunner {
    /// A recording runner that succeeds on everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make commands whose argv contains `needle` fail.
    pub fn fail_matching(&self, needle: &str) {
        self.state.borrow_mut().failures.push(needle.to_string());
    }

    /// Every recorded command as `(host, argv)`.
    pub fn commands(&self) -> Vec<(String, Vec<String>)> {
        self.state.borrow().commands.clone()
    }

    /// The argv of every recorded command, joined for easy matching.
    pub fn command_lines(&self) -> Vec<String> {
        self.state
            .borrow()
            .commands
            .iter()
            .map(|(_, argv)| argv.join(" "))
            .collect()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, host: &str, _principal: &User, argv: &[String]) -> TransportResult<Vec<String>> {
        let mut state = self.state.borrow_mut();
        state.commands.push((host.to_string(), argv.to_vec()));
        let line = argv.join(" ");
        if state.failures.iter().any(|needle| line.contains(needle)) {
            return Err(TransportError::Command {
                host: host.to_string(),
                message: format!("scripted failure for: {line}"),
            });
        }
        Ok(Vec::new())
    }
}

/// File transfer that maps remote paths into a local root directory, so
/// tests exercise the production copy code against scratch files.
#[derive(Clone)]
pub struct DirTransfer {
    root: PathBuf,
}

impl DirTransfer {
    /// A transfer rooted at `root`; remote path `/etc/mysql/my.cnf` maps to
    /// `root/etc/mysql/my.cnf`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn map(&self, remote: &Path) -> PathBuf {
        let relative = remote.strip_prefix("/").unwrap_or(remote);
        self.root.join(relative)
    }

    fn transfer_error(&self, host: &str, remote: &Path, message: String) -> TransportError {
        TransportError::Transfer {
            host: host.to_string(),
            path: remote.to_path_buf(),
            message,
        }
    }
}

impl FileTransfer for DirTransfer {
    fn copy_to_remote(
        &self,
        local: &Path,
        host: &str,
        _principal: &User,
        remote: &Path,
    ) -> TransportResult<()> {
        let target = self.map(remote);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| self.transfer_error(host, remote, err.to_string()))?;
        }
        fs::copy(local, &target)
            .map(|_| ())
            .map_err(|err| self.transfer_error(host, remote, err.to_string()))
    }

    fn copy_from_remote(
        &self,
        host: &str,
        _principal: &User,
        remote: &Path,
        local: &Path,
    ) -> TransportResult<()> {
        fs::copy(self.map(remote), local)
            .map(|_| ())
            .map_err(|err| self.transfer_error(host, remote, err.to_string()))
    }
}

/// Build a handle wired to the test doubles: Linux machine, recording
/// runner, directory-mapped transfer, scripted SQL. The configuration file
/// is `/etc/mysql/my.cnf` under `config_root`, section `mysqld1`.
pub fn scripted_handle(
    name: &str,
    server_id: Option<u64>,
    config_root: &Path,
    sql: &ScriptedSql,
    runner: &RecordingRunner,
) -> ServerHandle {
    let mut spec = ServerSpec::new(name, User::new("root", ""), User::new("admin", ""));
    spec.server_id = server_id;
    spec.config_section = "mysqld1".to_string();
    ServerHandle::new(
        spec,
        Box::new(LinuxMachine),
        Box::new(runner.clone()),
        Box::new(DirTransfer::new(config_root)),
        Box::new(sql.clone()),
    )
}

/// Write [`SAMPLE_CONFIG`] where [`scripted_handle`] servers expect their
/// configuration file, and return that mapped path.
pub fn seed_sample_config(config_root: &Path) -> PathBuf {
    let path = config_root.join("etc/mysql/my.cnf");
    fs::create_dir_all(path.parent().expect("path has a parent")).expect("create config dir");
    fs::write(&path, SAMPLE_CONFIG).expect("write sample config");
    path
}
