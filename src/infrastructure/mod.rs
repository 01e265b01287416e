//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `loader` - `DigestCodeLoader`, the shipped `CodeLoader`
//! - `realm_file` - properties-style realm files
//! - `connector` - listening sockets bound by the supervisor
//! - `events/` - `DeployEventSink` implementations

pub mod connector;
pub mod events;
pub mod loader;
pub mod realm_file;

// Re-export for convenience
pub use connector::{Connector, ConnectorSpec};
pub use events::JsonEventSink;
pub use loader::{DigestCodeLoader, DEFAULT_LIB_EXTENSIONS};
pub use realm_file::{load_realm, parse_realm};
