//! Remote event-log fetch through `mysqlbinlog`.

use std::process::{Command, Stdio};

use chrono::NaiveDateTime;

use crate::server::ServerHandle;
use crate::transport::{SqlResult, TransportError};

use super::errors::ReplicationResult;

/// Fetch the textual dump of a server's binary logs by spawning a local
/// `mysqlbinlog --read-from-remote-server`.
///
/// Without an explicit file list, the logs are enumerated with
/// `SHOW BINARY LOGS`. The optional datetimes bound the dump to an
/// interval. Returns the dump one line per entry.
pub fn fetch_binlog(
    server: &mut ServerHandle,
    files: Option<Vec<String>>,
    start: Option<NaiveDateTime>,
    stop: Option<NaiveDateTime>,
) -> ReplicationResult<Vec<String>> {
    let files = match files {
        Some(files) => files,
        None => server
            .sql("SHOW BINARY LOGS", &[])?
            .map(|row| row.text("Log_name").map(str::to_owned))
            .collect::<SqlResult<Vec<_>>>()?,
    };

    let mut command = Command::new("mysqlbinlog");
    command
        .arg("--read-from-remote-server")
        .arg("--force")
        .arg(format!("--host={}", server.host()))
        .arg(format!("--user={}", server.sql_user().name()));
    if !server.sql_user().password().is_empty() {
        command.arg(format!("--password={}", server.sql_user().password()));
    }
    if let Some(start) = start {
        command.arg(format!("--start-datetime={}", start.format("%Y-%m-%d %H:%M:%S")));
    }
    if let Some(stop) = stop {
        command.arg(format!("--stop-datetime={}", stop.format("%Y-%m-%d %H:%M:%S")));
    }
    command.args(&files);
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let output = command.output().map_err(|err| TransportError::Command {
        host: server.host().to_string(),
        message: err.to_string(),
    })?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(TransportError::Command {
            host: server.host().to_string(),
            message: format!("mysqlbinlog: {} ({})", stderr.trim(), output.status),
        }
        .into());
    }
    Ok(String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_owned)
        .collect())
}
