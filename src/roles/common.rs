//! Helpers shared by the non-vagabond role transitions.

use tracing::{debug, warn};

use crate::config::{ConfigDocument, ConfigError};
use crate::server::{ServerHandle, User};
use crate::transport::SqlError;

use super::errors::RoleResult;

/// Align the handle's producer id with the configuration file.
///
/// If the file already declares a `server-id`, the handle adopts it;
/// otherwise the handle's id is written into the file. Exactly one of the
/// two directions executes. A valueless `server-id` counts as undeclared.
pub(crate) fn reconcile_server_id(
    server: &mut ServerHandle,
    config: &mut ConfigDocument,
) -> RoleResult<()> {
    let declared = config
        .get("server-id")
        .map(|value| value.map(str::to_owned));
    match declared {
        Ok(Some(value)) => {
            let id = value.parse::<u64>().map_err(|_| ConfigError::Parse {
                message: format!("server-id is not numeric: {value}"),
            })?;
            server.set_server_id(Some(id));
        }
        Ok(None) | Err(ConfigError::OptionNotFound { .. }) => match server.server_id() {
            Some(id) => config.set("server-id", Some(&id.to_string())),
            None => warn!(
                server = %server.name(),
                "neither handle nor configuration carries a server id"
            ),
        },
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

/// Enable the event log unless it is already configured.
///
/// Sets `log-bin` and `log-bin-index` derived from the server's name; an
/// existing `log-bin` is assumed correct and left untouched, making the
/// helper idempotent.
pub(crate) fn enable_event_log(server: &ServerHandle, config: &mut ConfigDocument) {
    if config.get("log-bin").is_err() {
        config.set("log-bin", Some(&format!("{}-bin", server.name())));
        config.set("log-bin-index", Some(&format!("{}-bin.index", server.name())));
    }
}

/// Disable the event log. Absence of either option is tolerated.
pub(crate) fn disable_event_log(config: &mut ConfigDocument) {
    for option in ["log-bin", "log-bin-index"] {
        let _ = config.remove(option);
    }
}

/// Drop and (re)create the replication user, then grant it the replication
/// privilege. A failed drop means the principal did not exist and is
/// swallowed; a failed create or grant propagates.
pub(crate) fn provision_repl_user(server: &mut ServerHandle, user: &User) -> RoleResult<()> {
    if let Err(err) = server.sql("DROP USER ?", &[user.name().into()]) {
        match err {
            SqlError::Execution { .. } => debug!(
                server = %server.name(),
                user = user.name(),
                "replication user did not exist before provisioning"
            ),
            other => return Err(other.into()),
        }
    }
    server.sql(
        "CREATE USER ? IDENTIFIED BY ?",
        &[user.name().into(), user.password().into()],
    )?;
    server.sql("GRANT REPLICATION SLAVE ON *.* TO ?", &[user.name().into()])?;
    Ok(())
}

/// Run the configuration phase of a transition, then start the service no
/// matter how the phase went.
///
/// The instance must never end up stopped because a transition failed:
/// `apply` (fetch, edit, stop, write) runs first, the start is attempted
/// unconditionally, and only then are errors sorted out. Configuration
/// errors are logged and swallowed, leaving the server un-reconfigured but
/// running; every other error propagates.
pub(crate) fn reconfigure_and_restart(
    server: &mut ServerHandle,
    apply: impl FnOnce(&mut ServerHandle) -> RoleResult<()>,
) -> RoleResult<()> {
    let outcome = apply(server);
    let started = server.start();
    match outcome {
        Ok(()) => {}
        Err(err) if err.is_config() => {
            warn!(
                server = %server.name(),
                error = %err,
                "configuration update skipped; service restarted unchanged"
            );
        }
        Err(err) => return Err(err),
    }
    started?;
    Ok(())
}

/// Stop replication, tolerating a server where it is not running.
pub(crate) fn stop_replication(server: &mut ServerHandle) -> RoleResult<()> {
    if let Err(err) = server.sql("STOP SLAVE", &[]) {
        match err {
            SqlError::Execution { .. } => {
                debug!(server = %server.name(), "replication was not running")
            }
            other => return Err(other.into()),
        }
    }
    Ok(())
}
