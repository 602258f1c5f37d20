//! The master role.

use tracing::info;

use crate::server::{ServerHandle, User};

use super::common::{
    disable_event_log, enable_event_log, provision_repl_user, reconcile_server_id,
    reconfigure_and_restart,
};
use super::errors::RoleResult;

/// Make the server an event-stream source: event log on, server id
/// reconciled, replication user provisioned and attached to the handle for
/// downstream replicas to read.
pub(crate) fn imbue(server: &mut ServerHandle, repl_user: &User) -> RoleResult<()> {
    server.connect()?;
    reconfigure_and_restart(server, |server| {
        let mut config = server.fetch_config()?;
        reconcile_server_id(server, &mut config)?;
        enable_event_log(server, &mut config);
        server.stop()?;
        server.replace_config(&config)?;
        Ok(())
    })?;
    provision_repl_user(server, repl_user)?;
    server.set_repl_user(Some(repl_user.clone()));
    server.disconnect();
    info!(server = %server.name(), "imbued as master");
    Ok(())
}

/// Reverse the master profile: event log off, replication user detached.
/// The SQL principal itself is left in place; other masters may share it.
pub(crate) fn unimbue(server: &mut ServerHandle) -> RoleResult<()> {
    reconfigure_and_restart(server, |server| {
        let mut config = server.fetch_config()?;
        disable_event_log(&mut config);
        server.stop()?;
        server.replace_config(&config)?;
        Ok(())
    })?;
    server.set_repl_user(None);
    Ok(())
}
