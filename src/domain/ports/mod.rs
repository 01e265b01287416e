//! Domain Ports (Interfaces)
//!
//! Capabilities the engine consumes from its host. Infrastructure provides the
//! shipped implementations; embedders may supply their own.

pub mod code_loader;
pub mod deploy_events;
pub mod request_router;

pub use code_loader::{CodeLoadError, CodeLoader, LoadScope, LoadedUnit};
pub use deploy_events::{DeployEvent, DeployEventSink, NoopEventSink};
pub use request_router::{NullRouter, RequestRouter};
