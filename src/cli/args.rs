//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// herd - role and replication management for fleets of MySQL servers
#[derive(Parser, Debug)]
#[command(name = "herd")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the deployment description
    #[arg(long, default_value = "./deployment.json")]
    pub deployment: PathBuf,

    /// Enable debug logging
    #[arg(long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the deployment's servers and their declared roles
    Show,

    /// Read one option from a server's configuration file
    ConfigGet {
        /// Server name from the deployment description
        server: String,
        /// Option to read
        option: String,
    },

    /// Write one option in a server's configuration file
    ConfigSet {
        /// Server name from the deployment description
        server: String,
        /// Option to write
        option: String,
        /// Value to store; omit for a valueless option
        #[arg(long)]
        value: Option<String>,
    },

    /// Remove one option from a server's configuration file
    ConfigRemove {
        /// Server name from the deployment description
        server: String,
        /// Option to remove
        option: String,
    },

    /// Start a server's database service
    Start {
        /// Server name from the deployment description
        server: String,
    },

    /// Stop a server's database service
    Stop {
        /// Server name from the deployment description
        server: String,
    },
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
