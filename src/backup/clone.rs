//! Replica provisioning by cloning a running server.

use tempfile::NamedTempFile;
use tracing::info;

use crate::replication::point_replica_at;
use crate::server::ServerHandle;

use super::errors::BackupResult;
use super::physical::PhysicalBackup;

/// Provision `replica` with a copy of `source`'s data and point it at the
/// right spot in the event stream.
///
/// Cloning from a master: `master` is `None`; the image position is the
/// source's own write position and the replica is pointed at the source.
/// Cloning from a sibling replica: `master` names the shared source;
/// replication on the sibling is paused around the imaging so its apply
/// position stands still, and the new replica is pointed at the master.
pub fn clone_replica(
    replica: &mut ServerHandle,
    source: &mut ServerHandle,
    master: Option<&ServerHandle>,
) -> BackupResult<()> {
    let image = NamedTempFile::new()?;
    let backup = PhysicalBackup::new(image.path());

    let position = match master {
        Some(_) => {
            source.sql("STOP SLAVE", &[])?;
            let imaged = backup.backup_replica(source, None);
            let restarted = source.sql("START SLAVE", &[]);
            let position = imaged?;
            restarted?;
            position
        }
        None => backup.backup_server(source, None)?,
    };

    backup.restore_server(replica)?;
    point_replica_at(replica, master.unwrap_or(source), Some(&position))?;
    info!(
        replica = %replica.name(),
        source = %source.name(),
        position = %position,
        "replica cloned"
    );
    Ok(())
}
