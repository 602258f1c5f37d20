//! Replication synchronization operations.

use tracing::debug;

use crate::server::ServerHandle;
use crate::transport::SqlError;

use super::errors::{ReplicationError, ReplicationResult};
use super::position::Position;

const CHANGE_MASTER: &str = "CHANGE MASTER TO \
    MASTER_HOST = ?, MASTER_PORT = ?, MASTER_USER = ?, MASTER_PASSWORD = ?";

const CHANGE_MASTER_WITH_POSITION: &str = "CHANGE MASTER TO \
    MASTER_HOST = ?, MASTER_PORT = ?, MASTER_USER = ?, MASTER_PASSWORD = ?, \
    MASTER_LOG_FILE = ?, MASTER_LOG_POS = ?";

const START_SLAVE_UNTIL: &str = "START SLAVE UNTIL MASTER_LOG_FILE = ?, MASTER_LOG_POS = ?";

const MASTER_POS_WAIT: &str = "SELECT MASTER_POS_WAIT(?, ?)";

/// Position of the next event the server will write to its event log.
///
/// Fails with [`ReplicationError::NotAMaster`] when the server reports no
/// master status.
pub fn master_position(server: &mut ServerHandle) -> ReplicationResult<Position> {
    let row = match server.sql("SHOW MASTER STATUS", &[])?.single() {
        Ok(row) => row,
        Err(SqlError::EmptyResult) => {
            return Err(ReplicationError::NotAMaster {
                server: server.name().to_string(),
            })
        }
        Err(err) => return Err(err.into()),
    };
    let stream = row.text("File")?.to_string();
    let offset = parse_offset(row.text("Position")?)?;
    Ok(Position::new(server.server_id(), stream, offset))
}

/// Position of the next source event the replica will apply.
///
/// The empty-result failure means the server is not configured as a
/// replica.
pub fn replica_position(server: &mut ServerHandle) -> ReplicationResult<Position> {
    let row = server.sql("SHOW SLAVE STATUS", &[])?.single()?;
    let stream = row.text("Relay_Master_Log_File")?.to_string();
    let offset = parse_offset(row.text("Exec_Master_Log_Pos")?)?;
    Ok(Position::new(server.server_id(), stream, offset))
}

/// Point `replica` at `source` and (re)start replication.
///
/// Fails with [`ReplicationError::NotAMaster`] when `source` carries no
/// attached replication user — it was never imbued as a master. With a
/// `position`, replication starts from that explicit offset; without one it
/// resumes from whatever offset the replica last recorded.
pub fn point_replica_at(
    replica: &mut ServerHandle,
    source: &ServerHandle,
    position: Option<&Position>,
) -> ReplicationResult<()> {
    let user = source
        .repl_user()
        .ok_or_else(|| ReplicationError::NotAMaster {
            server: source.name().to_string(),
        })?
        .clone();
    debug!(replica = %replica.name(), source = %source.name(), "pointing replica at source");
    replica.sql("STOP SLAVE", &[])?;
    match position {
        Some(position) => replica.sql(
            CHANGE_MASTER_WITH_POSITION,
            &[
                source.host().into(),
                source.port().into(),
                user.name().into(),
                user.password().into(),
                position.stream().into(),
                position.offset().into(),
            ],
        )?,
        None => replica.sql(
            CHANGE_MASTER,
            &[
                source.host().into(),
                source.port().into(),
                user.name().into(),
                user.password().into(),
            ],
        )?,
    };
    replica.sql("START SLAVE", &[])?;
    replica.disconnect();
    Ok(())
}

/// Block until the replica's apply position is at or past `target`.
///
/// The wait runs on the server (`MASTER_POS_WAIT`); the calling thread
/// suspends until the server reports the position reached. A NULL answer
/// means no progress is possible and maps to
/// [`ReplicationError::ReplicaNotRunning`].
pub fn wait_for_position(replica: &mut ServerHandle, target: &Position) -> ReplicationResult<()> {
    let row = replica
        .sql(
            MASTER_POS_WAIT,
            &[target.stream().into(), target.offset().into()],
        )?
        .single()?;
    match row.value_at(0)? {
        Some(_) => Ok(()),
        None => Err(ReplicationError::ReplicaNotRunning {
            server: replica.name().to_string(),
        }),
    }
}

/// Run replication until exactly `target` and stop there.
///
/// On return the replica's apply position equals `target` — not merely
/// at-or-past — even if the source has advanced further: the bounded
/// `START SLAVE UNTIL` halts the applier at the target before the wait
/// completes.
pub fn wait_and_stop_at(replica: &mut ServerHandle, target: &Position) -> ReplicationResult<()> {
    replica.sql("STOP SLAVE", &[])?;
    replica.sql(
        START_SLAVE_UNTIL,
        &[target.stream().into(), target.offset().into()],
    )?;
    wait_for_position(replica, target)
}

/// Block until the replica has applied everything it has already received
/// from its source.
///
/// Fails with [`ReplicationError::NotAReplica`] when the server has no
/// replica status at all, and [`ReplicationError::ReplicaNotRunning`] when
/// replication is configured but not currently active.
pub fn wait_for_relay_drain(replica: &mut ServerHandle) -> ReplicationResult<()> {
    let row = match replica.sql("SHOW SLAVE STATUS", &[])?.single() {
        Ok(row) => row,
        Err(SqlError::EmptyResult) => {
            return Err(ReplicationError::NotAReplica {
                server: replica.name().to_string(),
            })
        }
        Err(err) => return Err(err.into()),
    };
    let stream = row.text("Master_Log_File")?.to_string();
    let offset = parse_offset(row.text("Read_Master_Log_Pos")?)?;
    let wait = replica
        .sql(MASTER_POS_WAIT, &[stream.into(), offset.into()])?
        .single()?;
    match wait.value_at(0)? {
        Some(_) => Ok(()),
        None => Err(ReplicationError::ReplicaNotRunning {
            server: replica.name().to_string(),
        }),
    }
}

/// Flush all tables and take the global read lock.
pub fn flush_and_lock(server: &mut ServerHandle) -> ReplicationResult<()> {
    server.sql("FLUSH TABLES WITH READ LOCK", &[])?;
    Ok(())
}

/// Release the global read lock.
pub fn unlock(server: &mut ServerHandle) -> ReplicationResult<()> {
    server.sql("UNLOCK TABLES", &[])?;
    Ok(())
}

fn parse_offset(value: &str) -> ReplicationResult<u64> {
    value
        .parse()
        .map_err(|_| ReplicationError::MalformedPosition {
            input: value.to_string(),
        })
}
