//! Role transition tests
//!
//! Transitions run against scripted transports: the configuration file
//! lives in a scratch directory, remote commands are recorded, and SQL is
//! answered from scripts. The cases cover:
//! 1. Master imbue: server id reconciled, event log respected, replication
//!    user provisioned, service bounced.
//! 2. The always-restart discipline when the configuration cannot be
//!    fetched.
//! 3. Role symmetry: what master imbue enables, the following unimbue
//!    disables.
//! 4. Replica and relay imbues, including relay re-run safety.

use std::fs;
use std::path::Path;

use herd::config::ConfigDocument;
use herd::roles::{Role, Upstream};
use herd::server::User;
use herd::testkit::{row, scripted_handle, seed_sample_config, RecordingRunner, ScriptedSql};
use herd::transport::{SqlError, SqlRows};

fn repl_user() -> User {
    User::new("repl_user", "xyzzy")
}

fn master_role() -> Role {
    Role::Master {
        repl_user: repl_user(),
    }
}

fn read_config(root: &Path) -> ConfigDocument {
    let text = fs::read_to_string(root.join("etc/mysql/my.cnf")).unwrap();
    ConfigDocument::parse(&text, "mysqld1")
}

#[test]
fn master_imbue_reconciles_id_and_respects_existing_log_settings() {
    let root = tempfile::tempdir().unwrap();
    seed_sample_config(root.path());
    let sql = ScriptedSql::new();
    let runner = RecordingRunner::new();
    let mut server = scripted_handle("alpha", Some(7), root.path(), &sql, &runner);

    server.imbue(master_role()).unwrap();

    // The handle's id was written into the file; the existing log-bin was
    // assumed correct and left untouched.
    let config = read_config(root.path());
    assert_eq!(config.get("server-id").unwrap(), Some("7"));
    assert_eq!(
        config.get("log-bin").unwrap(),
        Some("/var/log/mysql/master-bin")
    );
    assert!(config.get("log-bin-index").is_err());

    // Service bounced: stop before the config landed, start after.
    let commands = runner.command_lines();
    assert_eq!(
        commands,
        ["/etc/init.d/mysql stop", "/etc/init.d/mysql start"]
    );

    // Replication user provisioned and attached; session released.
    let statements = sql.statements();
    assert!(statements.iter().any(|s| s.starts_with("DROP USER")));
    assert!(statements.iter().any(|s| s.starts_with("CREATE USER")));
    assert!(statements.iter().any(|s| s.starts_with("GRANT REPLICATION SLAVE")));
    assert_eq!(server.repl_user(), Some(&repl_user()));
    assert!(!server.is_connected());
    assert_eq!(server.role().name(), "master");
}

#[test]
fn master_imbue_adopts_a_declared_server_id() {
    let root = tempfile::tempdir().unwrap();
    let path = root.path().join("etc/mysql/my.cnf");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "[mysqld1]\nserver-id = 12\n").unwrap();
    let sql = ScriptedSql::new();
    let runner = RecordingRunner::new();
    let mut server = scripted_handle("alpha", Some(7), root.path(), &sql, &runner);

    server.imbue(master_role()).unwrap();

    // The file already declared an id; the handle adopted it and the file
    // kept it.
    assert_eq!(server.server_id(), Some(12));
    let config = read_config(root.path());
    assert_eq!(config.get("server-id").unwrap(), Some("12"));
}

#[test]
fn master_imbue_restarts_the_service_when_config_fetch_fails() {
    // No configuration file is seeded, so the fetch fails; the transition
    // must swallow that and still (re)start the service and provision the
    // replication user.
    let root = tempfile::tempdir().unwrap();
    let sql = ScriptedSql::new();
    let runner = RecordingRunner::new();
    let mut server = scripted_handle("alpha", Some(7), root.path(), &sql, &runner);

    server.imbue(master_role()).unwrap();

    let commands = runner.command_lines();
    assert_eq!(commands, ["/etc/init.d/mysql start"]);
    assert!(sql.statements().iter().any(|s| s.starts_with("CREATE USER")));
    assert_eq!(server.role().name(), "master");
}

#[test]
fn failed_provisioning_leaves_the_server_a_vagabond_but_running() {
    let root = tempfile::tempdir().unwrap();
    seed_sample_config(root.path());
    let sql = ScriptedSql::new();
    sql.fail(
        "CREATE USER",
        SqlError::Execution {
            message: "access denied".to_string(),
        },
    );
    let runner = RecordingRunner::new();
    let mut server = scripted_handle("alpha", Some(7), root.path(), &sql, &runner);

    let result = server.imbue(master_role());
    assert!(result.is_err());
    assert_eq!(server.role().name(), "vagabond");
    assert!(runner
        .command_lines()
        .contains(&"/etc/init.d/mysql start".to_string()));
}

#[test]
fn drop_of_a_missing_principal_is_swallowed() {
    let root = tempfile::tempdir().unwrap();
    seed_sample_config(root.path());
    let sql = ScriptedSql::new();
    sql.fail(
        "DROP USER",
        SqlError::Execution {
            message: "operation DROP USER failed".to_string(),
        },
    );
    let runner = RecordingRunner::new();
    let mut server = scripted_handle("alpha", Some(7), root.path(), &sql, &runner);

    server.imbue(master_role()).unwrap();
    assert_eq!(server.repl_user(), Some(&repl_user()));
}

#[test]
fn role_symmetry_master_then_vagabond() {
    // Start from a config with no event-log settings so the master imbue
    // introduces them and the following unimbue must remove them again.
    let root = tempfile::tempdir().unwrap();
    let path = root.path().join("etc/mysql/my.cnf");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "[mysqld1]\nuser = mysql\n").unwrap();
    let sql = ScriptedSql::new();
    let runner = RecordingRunner::new();
    let mut server = scripted_handle("alpha", Some(7), root.path(), &sql, &runner);

    server.imbue(master_role()).unwrap();
    let config = read_config(root.path());
    assert_eq!(config.get("log-bin").unwrap(), Some("alpha-bin"));
    assert_eq!(config.get("log-bin-index").unwrap(), Some("alpha-bin.index"));

    server.imbue(Role::Vagabond).unwrap();
    let config = read_config(root.path());
    assert!(config.get("log-bin").is_err());
    assert!(config.get("log-bin-index").is_err());
    assert_eq!(server.repl_user(), None);
    assert_eq!(server.role().name(), "vagabond");
}

#[test]
fn replica_imbue_disables_the_event_log_and_inherits_the_user() {
    let root = tempfile::tempdir().unwrap();
    seed_sample_config(root.path());
    let master_sql = ScriptedSql::new();
    let master_runner = RecordingRunner::new();
    let mut master = scripted_handle("alpha", Some(1), root.path(), &master_sql, &master_runner);
    master.imbue(master_role()).unwrap();

    let replica_root = tempfile::tempdir().unwrap();
    seed_sample_config(replica_root.path());
    let sql = ScriptedSql::new();
    let runner = RecordingRunner::new();
    let mut replica = scripted_handle("beta", Some(2), replica_root.path(), &sql, &runner);

    replica
        .imbue(Role::Replica {
            upstream: Upstream::of(&master),
        })
        .unwrap();

    let config = read_config(replica_root.path());
    assert!(config.get("log-bin").is_err());
    assert_eq!(config.get("server-id").unwrap(), Some("2"));
    // The upstream's replication user is inherited, not re-created.
    assert_eq!(replica.repl_user(), Some(&repl_user()));
    assert!(!sql.statements().iter().any(|s| s.starts_with("CREATE USER")));
}

#[test]
fn replica_of_an_unimbued_upstream_carries_no_user() {
    let root = tempfile::tempdir().unwrap();
    seed_sample_config(root.path());
    let sql = ScriptedSql::new();
    let runner = RecordingRunner::new();
    let vagabond = scripted_handle("alpha", Some(1), root.path(), &sql, &runner);

    let replica_root = tempfile::tempdir().unwrap();
    seed_sample_config(replica_root.path());
    let replica_sql = ScriptedSql::new();
    let replica_runner = RecordingRunner::new();
    let mut replica =
        scripted_handle("beta", Some(2), replica_root.path(), &replica_sql, &replica_runner);

    replica
        .imbue(Role::Replica {
            upstream: Upstream::of(&vagabond),
        })
        .unwrap();
    assert_eq!(replica.repl_user(), None);
}

fn script_relay_inventory(sql: &ScriptedSql) {
    sql.respond(
        "SHOW DATABASES",
        SqlRows::new(vec![
            row(&[("Database", Some("information_schema"))]),
            row(&[("Database", Some("mysql"))]),
            row(&[("Database", Some("app"))]),
        ]),
    );
    sql.respond(
        "SHOW TABLES FROM `app`",
        SqlRows::new(vec![
            row(&[("Tables_in_app", Some("orders"))]),
            row(&[("Tables_in_app", Some("customers"))]),
        ]),
    );
}

#[test]
fn relay_imbue_converts_user_tables_with_logging_suspended() {
    let root = tempfile::tempdir().unwrap();
    seed_sample_config(root.path());
    let sql = ScriptedSql::new();
    script_relay_inventory(&sql);
    let runner = RecordingRunner::new();
    let mut server = scripted_handle("gamma", Some(3), root.path(), &sql, &runner);

    let upstream_root = tempfile::tempdir().unwrap();
    seed_sample_config(upstream_root.path());
    let upstream_sql = ScriptedSql::new();
    let upstream_runner = RecordingRunner::new();
    let upstream =
        scripted_handle("alpha", Some(1), upstream_root.path(), &upstream_sql, &upstream_runner);

    server
        .imbue(Role::Relay {
            upstream: Upstream::of(&upstream),
        })
        .unwrap();

    let config = read_config(root.path());
    assert_eq!(config.get("log-slave-updates").unwrap(), None);
    assert_eq!(
        config.get("log-bin").unwrap(),
        Some("/var/log/mysql/master-bin")
    );

    let statements = sql.statements();
    let suspend = statements
        .iter()
        .position(|s| s == "SET SQL_LOG_BIN = 0")
        .unwrap();
    let resume = statements
        .iter()
        .position(|s| s == "SET SQL_LOG_BIN = 1")
        .unwrap();
    let orders = statements
        .iter()
        .position(|s| s == "ALTER TABLE `app`.`orders` ENGINE = BLACKHOLE")
        .unwrap();
    let customers = statements
        .iter()
        .position(|s| s == "ALTER TABLE `app`.`customers` ENGINE = BLACKHOLE")
        .unwrap();
    assert!(suspend < orders && orders < customers && customers < resume);

    // System schemas are never enumerated.
    assert!(!statements
        .iter()
        .any(|s| s.contains("SHOW TABLES FROM `information_schema`")
            || s.contains("SHOW TABLES FROM `mysql`")));
}

#[test]
fn relay_imbue_is_safe_to_run_twice() {
    let root = tempfile::tempdir().unwrap();
    seed_sample_config(root.path());
    let sql = ScriptedSql::new();
    script_relay_inventory(&sql);
    script_relay_inventory(&sql);
    let runner = RecordingRunner::new();
    let mut server = scripted_handle("gamma", Some(3), root.path(), &sql, &runner);

    let upstream_root = tempfile::tempdir().unwrap();
    seed_sample_config(upstream_root.path());
    let upstream_sql = ScriptedSql::new();
    let upstream_runner = RecordingRunner::new();
    let upstream =
        scripted_handle("alpha", Some(1), upstream_root.path(), &upstream_sql, &upstream_runner);
    let role = Role::Relay {
        upstream: Upstream::of(&upstream),
    };

    server.imbue(role.clone()).unwrap();
    server.imbue(role).unwrap();

    // The same tables were converted again without error.
    let conversions = sql
        .statements()
        .iter()
        .filter(|s| s.starts_with("ALTER TABLE `app`."))
        .count();
    assert_eq!(conversions, 4);
    assert_eq!(server.role().name(), "relay");
}

#[test]
fn stop_failure_propagates_but_the_service_is_restarted() {
    let root = tempfile::tempdir().unwrap();
    seed_sample_config(root.path());
    let sql = ScriptedSql::new();
    let runner = RecordingRunner::new();
    runner.fail_matching("stop");
    let mut server = scripted_handle("alpha", Some(7), root.path(), &sql, &runner);

    let result = server.imbue(master_role());
    assert!(result.is_err());
    // The start was still attempted after the failed stop.
    assert!(runner
        .command_lines()
        .contains(&"/etc/init.d/mysql start".to_string()));
    // The config write never happened.
    assert!(read_config(root.path()).get("server-id").is_err());
}
