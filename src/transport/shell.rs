//! Remote command execution.

use std::process::{Command, Stdio};

use crate::server::User;

use super::errors::{TransportError, TransportResult};

/// Capability to run a command on a host as a given principal.
///
/// Implementations must not allow interactive prompts; stdin is suppressed.
/// The returned lines are the command's standard output, one entry per line.
pub trait CommandRunner {
    /// Run `argv` on `host` as `principal` and return its output lines.
    fn run(&self, host: &str, principal: &User, argv: &[String]) -> TransportResult<Vec<String>>;
}

/// Subprocess-backed runner using the system `ssh` client.
///
/// Remote hosts are reached with `ssh -fqTx` (quiet, no tty, no X11
/// forwarding). Commands on localhost run directly under `sudo -u` with the
/// requested principal instead of going through the ssh client.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenSshRunner;

impl OpenSshRunner {
    /// Create a new runner.
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for OpenSshRunner {
    fn run(&self, host: &str, principal: &User, argv: &[String]) -> TransportResult<Vec<String>> {
        let mut command = if host == "localhost" {
            let mut command = Command::new("sudo");
            command.arg(format!("-u{}", principal.name()));
            command.args(argv);
            command
        } else {
            let mut command = Command::new("ssh");
            command.arg("-fqTx");
            command.arg(format!("{}@{}", principal.name(), host));
            command.arg(argv.join(" "));
            command
        };
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let output = command.output().map_err(|err| TransportError::Command {
            host: host.to_string(),
            message: err.to_string(),
        })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TransportError::Command {
                host: host.to_string(),
                message: format!("{} ({})", stderr.trim(), output.status),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().map(str::to_owned).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runner_reports_spawn_failure() {
        // Point sudo at a principal that cannot exist so the spawn either
        // fails outright or exits nonzero; either way the error is Command.
        let runner = OpenSshRunner::new();
        let user = User::new("no-such-principal-herd-test", "");
        let result = runner.run("localhost", &user, &["true".to_string()]);
        assert!(matches!(result, Err(TransportError::Command { .. })));
    }
}
