//! Application Layer
//!
//! Use cases that orchestrate the deployment flow.
//! This layer:
//! - Depends on Domain layer (entities, value objects, ports)
//! - Never performs transport or host-specific work (that is behind ports)
//!
//! ## Components
//!
//! - `BundleScanner` - Lists deployable bundles under a scan root
//! - `ClassloadComposer` - Builds the per-application loading scope
//! - `ContextBuilder` - Runs the configuration pipeline for one bundle
//! - `ContextRegistry` - Copy-on-write collection of live contexts
//! - `Deployer` - Diffs scans and drives lifecycle transitions
//! - `ScanSchedule` - Poll or watch triggered rescans

pub mod compose;
pub mod deploy;
pub mod pipeline;
pub mod registry;
pub mod scan;
pub mod schedule;

pub use compose::ClassloadComposer;
pub use deploy::{Deployer, DeployerConfig, FailedBundle, ScanReport};
pub use pipeline::{resolve, ContextBuilder};
pub use registry::{ContextRegistry, RegistryError};
pub use scan::{webapp_timestamp, BundleScanner, ScanOutcome, CONTEXT_FILE_EXTENSION};
pub use schedule::{ScanSchedule, ScanTrigger, ScheduleHandle, WatcherState, DEBOUNCE_MS};
