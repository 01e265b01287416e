//! Sitedeck - hot-deploy engine for device-hosted web servers
//!
//! Sitedeck discovers web-application bundles on persistent storage, composes an
//! isolated loading scope for each application (including platform-compiled library
//! artifacts), publishes the configured contexts to a live registry consumed by the
//! request router, and rescans storage to deploy, update or undeploy applications
//! without restarting the host process.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod supervisor;

// Re-exports for convenience
pub use application::{
    BundleScanner, ClassloadComposer, ContextBuilder, ContextRegistry, Deployer, DeployerConfig,
    RegistryError, ScanReport, ScanSchedule, ScanTrigger,
};
pub use config::Config;
pub use domain::entities::{ApplicationContext, AttributeValue, Bundle, BundleKind, Realm};
pub use domain::ports::{CodeLoader, DeployEvent, DeployEventSink, LoadScope, RequestRouter};
pub use domain::value_objects::{ConfigurationStep, ContextPath, Identity, LifecycleState};
pub use error::{SitedeckError, SitedeckResult};
pub use supervisor::{HostServices, Route, RoutingChain, StartOutcome, Supervisor, SupervisorError};
