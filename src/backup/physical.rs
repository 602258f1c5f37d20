//! Physical (data-directory) backups.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::ConfigError;
use crate::replication::{
    flush_and_lock, master_position, replica_position, unlock, Position, ReplicationResult,
};
use crate::server::ServerHandle;

use super::errors::{BackupError, BackupResult};

/// A physical backup image of a server's data directory, stored as a
/// compressed tar archive at a local path.
///
/// The archive is produced on the remote host by the system `tar` and
/// fetched over the file-transfer seam; its contents are never unpacked
/// locally.
pub struct PhysicalBackup {
    image: PathBuf,
}

impl PhysicalBackup {
    /// A backup whose image lives at `image` on the local machine.
    pub fn new(image: impl Into<PathBuf>) -> Self {
        Self {
            image: image.into(),
        }
    }

    /// Local path of the image.
    pub fn image(&self) -> &Path {
        &self.image
    }

    /// Image a master's databases and record its write position.
    ///
    /// With `databases` given, only those are archived; otherwise the whole
    /// data directory is. The server is held under the global read lock for
    /// the duration; the lock is released even when imaging fails.
    pub fn backup_server(
        &self,
        server: &mut ServerHandle,
        databases: Option<&[String]>,
    ) -> BackupResult<Position> {
        self.backup_with(server, databases, master_position)
    }

    /// Image a replica's databases and record its apply position. Used when
    /// cloning from a replica instead of loading the master.
    pub fn backup_replica(
        &self,
        server: &mut ServerHandle,
        databases: Option<&[String]>,
    ) -> BackupResult<Position> {
        self.backup_with(server, databases, replica_position)
    }

    fn backup_with(
        &self,
        server: &mut ServerHandle,
        databases: Option<&[String]>,
        capture: fn(&mut ServerHandle) -> ReplicationResult<Position>,
    ) -> BackupResult<Position> {
        let datadir = data_directory(server)?;
        flush_and_lock(server)?;
        let imaged = self.image_datadir(server, &datadir, databases, capture);
        let unlocked = unlock(server);
        let position = imaged?;
        unlocked?;
        info!(server = %server.name(), position = %position, "backup image captured");
        Ok(position)
    }

    fn image_datadir(
        &self,
        server: &mut ServerHandle,
        datadir: &str,
        databases: Option<&[String]>,
        capture: fn(&mut ServerHandle) -> ReplicationResult<Position>,
    ) -> BackupResult<Position> {
        let position = capture(server)?;
        let staging = staging_path(server, "backup");
        let mut argv = vec![
            "tar".to_string(),
            "zpcf".to_string(),
            staging.clone(),
            "-C".to_string(),
            datadir.to_string(),
        ];
        match databases {
            Some(databases) if !databases.is_empty() => argv.extend(databases.iter().cloned()),
            _ => argv.push(".".to_string()),
        }
        server.ssh(&argv)?;
        server.fetch_file(Path::new(&staging), &self.image)?;
        Ok(position)
    }

    /// Unpack the image into the server's data directory.
    ///
    /// The service is stopped for the unpack and restarted no matter how
    /// the unpack went, so a failed restore never leaves the instance
    /// stopped.
    pub fn restore_server(&self, server: &mut ServerHandle) -> BackupResult<()> {
        let datadir = data_directory(server)?;
        let staging = staging_path(server, "restore");
        let outcome = (|| -> BackupResult<()> {
            server.stop()?;
            server.put_file(&self.image, Path::new(&staging))?;
            server.ssh(&[
                "tar".to_string(),
                "zxf".to_string(),
                staging.clone(),
                "-C".to_string(),
                datadir.clone(),
            ])?;
            Ok(())
        })();
        let started = server.start();
        outcome?;
        started?;
        info!(server = %server.name(), "backup image restored");
        Ok(())
    }
}

fn data_directory(server: &mut ServerHandle) -> BackupResult<String> {
    let config = server.fetch_config()?;
    match config.get("datadir") {
        Ok(Some(datadir)) => Ok(datadir.to_string()),
        Ok(None) | Err(ConfigError::OptionNotFound { .. }) => Err(BackupError::MissingDataDir {
            server: server.name().to_string(),
        }),
        Err(err) => Err(err.into()),
    }
}

fn staging_path(server: &ServerHandle, kind: &str) -> String {
    format!("/tmp/{}-{kind}.tar.gz", server.name())
}
