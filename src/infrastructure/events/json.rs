//! JSON Event Sink
//!
//! Outputs deploy events as NDJSON for automation consumption.

use crate::domain::ports::{DeployEvent, DeployEventSink};
use std::io::{self, Write};
use std::sync::Mutex;

/// Event sink that outputs NDJSON events to stdout
pub struct JsonEventSink {
    /// Mutex to ensure thread-safe writes
    writer: Mutex<Box<dyn Write + Send>>,
    timestamps: bool,
}

impl JsonEventSink {
    /// Create a new JSON event sink writing timestamped events to stdout
    pub fn stdout() -> Self {
        Self {
            writer: Mutex::new(Box::new(io::stdout())),
            timestamps: true,
        }
    }

    /// Create a JSON event sink writing to a custom writer, without timestamps
    pub fn with_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
            timestamps: false,
        }
    }

    pub fn with_timestamps(mut self, timestamps: bool) -> Self {
        self.timestamps = timestamps;
        self
    }

    fn write_event(&self, mut event: serde_json::Value) {
        if self.timestamps {
            if let Some(obj) = event.as_object_mut() {
                obj.insert(
                    "timestamp".to_string(),
                    serde_json::json!(chrono::Utc::now().to_rfc3339()),
                );
            }
        }
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", event);
            let _ = writer.flush();
        }
    }
}

impl DeployEventSink for JsonEventSink {
    fn on_event(&self, event: DeployEvent) {
        let json = match event {
            DeployEvent::ScanStarted { deployer, root } => {
                serde_json::json!({
                    "event": "scan_started",
                    "deployer": deployer,
                    "root": root.display().to_string(),
                })
            }

            DeployEvent::RootMissing { deployer, root } => {
                serde_json::json!({
                    "event": "root_missing",
                    "deployer": deployer,
                    "root": root.display().to_string(),
                })
            }

            DeployEvent::Deployed {
                deployer,
                identity,
                context_path,
                units,
                rejected_units,
            } => {
                serde_json::json!({
                    "event": "deployed",
                    "deployer": deployer,
                    "identity": identity,
                    "context_path": context_path,
                    "units": units,
                    "rejected_units": rejected_units,
                })
            }

            DeployEvent::Updated {
                deployer,
                identity,
                context_path,
            } => {
                serde_json::json!({
                    "event": "updated",
                    "deployer": deployer,
                    "identity": identity,
                    "context_path": context_path,
                })
            }

            DeployEvent::Undeployed { deployer, identity } => {
                serde_json::json!({
                    "event": "undeployed",
                    "deployer": deployer,
                    "identity": identity,
                })
            }

            DeployEvent::DeployFailed {
                deployer,
                identity,
                error,
                retained,
            } => {
                serde_json::json!({
                    "event": "deploy_failed",
                    "deployer": deployer,
                    "identity": identity,
                    "error": error,
                    "retained": retained,
                })
            }

            DeployEvent::DuplicateRejected {
                deployer,
                identity,
                owner,
            } => {
                serde_json::json!({
                    "event": "duplicate_rejected",
                    "deployer": deployer,
                    "identity": identity,
                    "owner": owner,
                })
            }

            DeployEvent::ScanCompleted {
                deployer,
                bundles,
                deployed,
                updated,
                undeployed,
                failed,
            } => {
                let status = if failed == 0 { "success" } else { "partial" };
                serde_json::json!({
                    "event": "scan_completed",
                    "deployer": deployer,
                    "status": status,
                    "bundles": bundles,
                    "deployed": deployed,
                    "updated": updated,
                    "undeployed": undeployed,
                    "failed": failed,
                })
            }
        };

        self.write_event(json);
    }

    fn wants_detailed_events(&self) -> bool {
        true // JSON mode wants all events
    }
}
