//! Deploy Event Port
//!
//! Provides an observable interface for scan cycles.
//! Enables JSON event streams for automation and recording in tests.

use std::path::PathBuf;

use crate::domain::value_objects::{ContextPath, Identity};

/// Event emitted during a scan cycle
#[derive(Debug, Clone, PartialEq)]
pub enum DeployEvent {
    /// Scan cycle started
    ScanStarted { deployer: String, root: PathBuf },

    /// Scan root does not exist (reported once until it reappears)
    RootMissing { deployer: String, root: PathBuf },

    /// A new context went live
    Deployed {
        deployer: String,
        identity: Identity,
        context_path: ContextPath,
        units: usize,
        rejected_units: usize,
    },

    /// A live context was replaced by a rebuilt one
    Updated {
        deployer: String,
        identity: Identity,
        context_path: ContextPath,
    },

    /// A context was withdrawn because its bundle disappeared
    Undeployed { deployer: String, identity: Identity },

    /// Building a context failed; `retained` is true when a previous
    /// context for the identity is still live
    DeployFailed {
        deployer: String,
        identity: Identity,
        error: String,
        retained: bool,
    },

    /// Identity already live from another deployer
    DuplicateRejected {
        deployer: String,
        identity: Identity,
        owner: String,
    },

    /// Scan cycle finished
    ScanCompleted {
        deployer: String,
        bundles: usize,
        deployed: usize,
        updated: usize,
        undeployed: usize,
        failed: usize,
    },
}

/// Trait for receiving deploy events
///
/// Implementations can be:
/// - JsonEventSink: NDJSON event stream for automation
/// - NoopEventSink: Silent operation
pub trait DeployEventSink: Send + Sync {
    /// Handle a deploy event
    fn on_event(&self, event: DeployEvent);

    /// Check if this sink wants per-bundle events
    ///
    /// Summary-only sinks receive `ScanCompleted` and failures.
    fn wants_detailed_events(&self) -> bool {
        true
    }
}

/// No-op event sink for silent operation
pub struct NoopEventSink;

impl DeployEventSink for NoopEventSink {
    fn on_event(&self, _event: DeployEvent) {
        // Do nothing
    }

    fn wants_detailed_events(&self) -> bool {
        false
    }
}
