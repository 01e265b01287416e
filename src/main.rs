//! Sitedeck CLI - hot-deploy engine for device-hosted web servers
//!
//! Usage: sitedeck <COMMAND>
//!
//! Commands:
//!   serve    Start the server and keep deploying until Ctrl+C
//!   scan     Scan both deployment roots once
//!   inspect  Build a context for one bundle without publishing it

mod cli;
mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sitedeck::Config;

use crate::cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(&cli)?;

    match cli.command {
        Commands::Serve { port } => commands::serve::cmd_serve(config, port, cli.json),
        Commands::Scan => commands::scan::cmd_scan(&config, cli.json),
        Commands::Inspect { bundle } => commands::inspect::cmd_inspect(&config, &bundle, cli.json),
    }
}

/// `RUST_LOG` wins; otherwise `-v` raises the level from `info`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "sitedeck=debug,info",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let (mut config, warnings) = Config::discover(cli.config.as_deref(), cli.home.as_deref())
        .context("failed to load configuration")?;

    for warning in &warnings {
        tracing::warn!("{warning}");
    }
    if let Some(home) = &cli.home {
        config.server.home = home.clone();
    }
    Ok(config)
}
