//! The relay role: forwards events without retaining table contents.

use tracing::info;

use crate::server::ServerHandle;
use crate::transport::SqlResult;

use super::common::{
    disable_event_log, enable_event_log, reconcile_server_id, reconfigure_and_restart,
    stop_replication,
};
use super::errors::RoleResult;
use super::Upstream;

/// Schemas that are never converted.
const SYSTEM_SCHEMAS: [&str; 4] = ["information_schema", "mysql", "performance_schema", "sys"];

/// Configure the server as a relay: event log on, replica updates logged,
/// and every user table converted to the no-storage BLACKHOLE engine so the
/// server forwards events without answering queries from its own data.
///
/// The conversion runs with local event logging suspended and is not
/// transactional — a transition that fails mid-loop leaves some tables
/// converted, and re-running it is safe (converting an already-converted
/// table is a no-op on the server).
pub(crate) fn imbue(server: &mut ServerHandle, upstream: &Upstream) -> RoleResult<()> {
    reconfigure_and_restart(server, |server| {
        let mut config = server.fetch_config()?;
        reconcile_server_id(server, &mut config)?;
        enable_event_log(server, &mut config);
        config.set("log-slave-updates", None);
        server.stop()?;
        server.replace_config(&config)?;
        Ok(())
    })?;
    server.connect()?;
    server.sql("SET SQL_LOG_BIN = 0", &[])?;
    convert_user_tables(server)?;
    server.sql("SET SQL_LOG_BIN = 1", &[])?;
    info!(server = %server.name(), upstream = upstream.name(), "imbued as relay");
    Ok(())
}

/// Reverse the relay's configuration: drop the event-log and
/// `log-slave-updates` options and stop replication. The engine conversion
/// is irreversible and is left alone.
pub(crate) fn unimbue(server: &mut ServerHandle) -> RoleResult<()> {
    reconfigure_and_restart(server, |server| {
        let mut config = server.fetch_config()?;
        disable_event_log(&mut config);
        let _ = config.remove("log-slave-updates");
        server.stop()?;
        server.replace_config(&config)?;
        Ok(())
    })?;
    stop_replication(server)?;
    Ok(())
}

fn convert_user_tables(server: &mut ServerHandle) -> RoleResult<()> {
    let databases = server
        .sql("SHOW DATABASES", &[])?
        .map(|row| row.text("Database").map(str::to_owned))
        .collect::<SqlResult<Vec<_>>>()?;
    for database in databases {
        if SYSTEM_SCHEMAS.contains(&database.as_str()) {
            continue;
        }
        let column = format!("Tables_in_{database}");
        let tables = server
            .sql(&format!("SHOW TABLES FROM `{database}`"), &[])?
            .map(|row| row.text(&column).map(str::to_owned))
            .collect::<SqlResult<Vec<_>>>()?;
        for table in tables {
            server.sql(
                &format!("ALTER TABLE `{database}`.`{table}` ENGINE = BLACKHOLE"),
                &[],
            )?;
        }
    }
    Ok(())
}
