//! Deploy Module
//!
//! Deployment lifecycle management for one scan root.
//!
//! ## Structure
//!
//! - `options` - Configuration types (`DeployerConfig`)
//! - `report` - Result types (`ScanReport`)
//! - `deployer` - Scan diffing and lifecycle transitions (`Deployer`)
//!
//! ## Usage
//!
//! ```ignore
//! use sitedeck::application::deploy::{Deployer, DeployerConfig};
//!
//! let deployer = Deployer::new(builder, registry);
//! let report = deployer.start();
//! ```

mod deployer;
mod options;
mod report;

pub use deployer::Deployer;
pub use options::{DeployerConfig, CONTEXTS_SCAN_INTERVAL};
pub use report::{FailedBundle, ScanReport};
