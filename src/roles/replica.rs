//! The replica role: answers queries, never becomes a source.

use tracing::info;

use crate::server::ServerHandle;

use super::common::{
    disable_event_log, reconcile_server_id, reconfigure_and_restart, stop_replication,
};
use super::errors::RoleResult;
use super::Upstream;

/// Configure the server as a final replica of `upstream`: no event log of
/// its own, server id reconciled, and the upstream's replication user
/// inherited — no new principal is created.
pub(crate) fn imbue(server: &mut ServerHandle, upstream: &Upstream) -> RoleResult<()> {
    reconfigure_and_restart(server, |server| {
        let mut config = server.fetch_config()?;
        reconcile_server_id(server, &mut config)?;
        disable_event_log(&mut config);
        server.stop()?;
        server.replace_config(&config)?;
        Ok(())
    })?;
    server.set_repl_user(upstream.repl_user().cloned());
    info!(server = %server.name(), upstream = upstream.name(), "imbued as replica");
    Ok(())
}

/// Reverse the replica profile: stop replication and detach the inherited
/// user. The event-log options are left as they are — what the file held
/// before the imbue is unknowable here.
pub(crate) fn unimbue(server: &mut ServerHandle) -> RoleResult<()> {
    stop_replication(server)?;
    server.set_repl_user(None);
    Ok(())
}
