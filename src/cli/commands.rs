//! CLI command dispatch.

use tracing_subscriber::EnvFilter;

use crate::deployment::Deployment;
use crate::server::ServerHandle;

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};

/// Parse arguments, load the deployment and run the requested command.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut deployment = Deployment::load(&cli.deployment)?;
    match cli.command {
        Command::Show => show(&deployment),
        Command::ConfigGet { server, option } => {
            config_get(lookup(&mut deployment, &server)?, &option)
        }
        Command::ConfigSet {
            server,
            option,
            value,
        } => config_set(lookup(&mut deployment, &server)?, &option, value.as_deref()),
        Command::ConfigRemove { server, option } => {
            config_remove(lookup(&mut deployment, &server)?, &option)
        }
        Command::Start { server } => Ok(lookup(&mut deployment, &server)?.start()?),
        Command::Stop { server } => Ok(lookup(&mut deployment, &server)?.stop()?),
    }
}

fn lookup<'a>(deployment: &'a mut Deployment, name: &str) -> CliResult<&'a mut ServerHandle> {
    deployment
        .server_mut(name)
        .ok_or_else(|| CliError::UnknownServer {
            name: name.to_string(),
        })
}

fn show(deployment: &Deployment) -> CliResult<()> {
    for server in deployment.servers() {
        let role = deployment
            .declared_role(server.name())
            .map(|role| role.name())
            .unwrap_or("vagabond");
        println!(
            "{}\t{}:{}\t{}\t{}",
            server.name(),
            server.host(),
            server.port(),
            role,
            server.defaults_file().display(),
        );
    }
    Ok(())
}

fn config_get(server: &ServerHandle, option: &str) -> CliResult<()> {
    let config = server.fetch_config()?;
    match config.get(option)? {
        Some(value) => println!("{value}"),
        None => println!("(no value)"),
    }
    Ok(())
}

fn config_set(server: &ServerHandle, option: &str, value: Option<&str>) -> CliResult<()> {
    let mut config = server.fetch_config()?;
    config.set(option, value);
    server.replace_config(&config)?;
    Ok(())
}

fn config_remove(server: &ServerHandle, option: &str) -> CliResult<()> {
    let mut config = server.fetch_config()?;
    config.remove(option)?;
    server.replace_config(&config)?;
    Ok(())
}
