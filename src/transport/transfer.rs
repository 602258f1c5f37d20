//! File transfer to and from managed hosts.

use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::server::User;

use super::errors::{TransportError, TransportResult};

/// Capability to copy files between the local machine and a host.
pub trait FileTransfer {
    /// Copy a local file to `remote` on `host`.
    fn copy_to_remote(
        &self,
        local: &Path,
        host: &str,
        principal: &User,
        remote: &Path,
    ) -> TransportResult<()>;

    /// Copy `remote` on `host` to a local file.
    fn copy_from_remote(
        &self,
        host: &str,
        principal: &User,
        remote: &Path,
        local: &Path,
    ) -> TransportResult<()>;
}

/// Subprocess-backed transfer using the system `scp` client (`scp -qB`:
/// quiet, batch mode, no prompts). Transfers involving localhost degrade to
/// a plain filesystem copy.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScpTransfer;

impl ScpTransfer {
    /// Create a new transfer.
    pub fn new() -> Self {
        Self
    }

    fn scp(&self, source: &str, target: &str, host: &str, remote: &Path) -> TransportResult<()> {
        let output = Command::new("scp")
            .args(["-qB", source, target])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|err| TransportError::Transfer {
                host: host.to_string(),
                path: remote.to_path_buf(),
                message: err.to_string(),
            })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TransportError::Transfer {
                host: host.to_string(),
                path: remote.to_path_buf(),
                message: format!("{} ({})", stderr.trim(), output.status),
            });
        }
        Ok(())
    }

    fn local_copy(&self, source: &Path, target: &Path, remote: &Path) -> TransportResult<()> {
        fs::copy(source, target)
            .map(|_| ())
            .map_err(|err| TransportError::Transfer {
                host: "localhost".to_string(),
                path: remote.to_path_buf(),
                message: err.to_string(),
            })
    }
}

impl FileTransfer for ScpTransfer {
    fn copy_to_remote(
        &self,
        local: &Path,
        host: &str,
        principal: &User,
        remote: &Path,
    ) -> TransportResult<()> {
        if host == "localhost" {
            return self.local_copy(local, remote, remote);
        }
        let target = format!("{}@{}:{}", principal.name(), host, remote.display());
        self.scp(&local.display().to_string(), &target, host, remote)
    }

    fn copy_from_remote(
        &self,
        host: &str,
        principal: &User,
        remote: &Path,
        local: &Path,
    ) -> TransportResult<()> {
        if host == "localhost" {
            return self.local_copy(remote, local, remote);
        }
        let source = format!("{}@{}:{}", principal.name(), host, remote.display());
        self.scp(&source, &local.display().to_string(), host, remote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_localhost_transfer_is_a_plain_copy() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.cnf");
        let target = dir.path().join("target.cnf");
        fs::write(&source, "[mysqld]\nuser = mysql\n").unwrap();

        let transfer = ScpTransfer::new();
        let user = User::new("mysql", "");
        transfer
            .copy_to_remote(&source, "localhost", &user, &target)
            .unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "[mysqld]\nuser = mysql\n");
    }

    #[test]
    fn test_missing_source_is_a_transfer_failure() {
        let dir = tempfile::tempdir().unwrap();
        let transfer = ScpTransfer::new();
        let user = User::new("mysql", "");
        let result = transfer.copy_from_remote(
            "localhost",
            &user,
            &dir.path().join("absent.cnf"),
            &dir.path().join("out.cnf"),
        );
        assert!(matches!(result, Err(TransportError::Transfer { .. })));
    }
}
