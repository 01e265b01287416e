use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Sitedeck - hot-deploy engine for device-hosted web servers
#[derive(Parser, Debug)]
#[command(name = "sitedeck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (default: <home>/etc/sitedeck.toml, then the user config)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Server home holding webapps/, contexts/ and etc/
    #[arg(long, global = true, env = "SITEDECK_HOME")]
    pub home: Option<PathBuf>,

    /// Emit deployment events and results as NDJSON on stdout
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the server and keep deploying until Ctrl+C
    Serve {
        /// Override the listening port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Scan both deployment roots once and list the bundles found
    Scan,

    /// Build a context for one bundle without publishing it
    Inspect {
        /// Webapp directory or context descriptor file
        bundle: PathBuf,
    },
}
