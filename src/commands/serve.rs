use std::sync::mpsc;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use sitedeck::infrastructure::JsonEventSink;
use sitedeck::{Config, StartOutcome, Supervisor};

pub fn cmd_serve(mut config: Config, port: Option<u16>, json: bool) -> Result<()> {
    if let Some(port) = port {
        config.server.port = port;
    }

    let mut supervisor = Supervisor::new(config.server_plan(), config.host_services());
    if json {
        supervisor = supervisor.with_event_sink(Arc::new(JsonEventSink::stdout()));
    }

    // Set up Ctrl+C handler
    let (tx, rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = tx.send(());
    })
    .context("failed to install Ctrl+C handler")?;

    if supervisor.start().context("server failed to start")? == StartOutcome::AlreadyRunning {
        info!("server already running");
    }

    for addr in supervisor.local_addrs() {
        info!(%addr, "listening");
    }
    for context in supervisor.registry().list() {
        info!(app = %context.identity(), path = %context.context_path(), "serving");
    }

    let _ = rx.recv();
    info!("shutting down");
    supervisor.stop();
    Ok(())
}
