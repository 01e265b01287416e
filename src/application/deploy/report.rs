//! Scan Report
//!
//! What one scan cycle did.

use serde::Serialize;

use crate::domain::value_objects::Identity;

/// A bundle whose context could not be built
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedBundle {
    pub identity: Identity,
    pub error: String,
    /// A previous context for the identity is still live
    pub retained: bool,
}

/// Result of a scan cycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    /// Deployer that ran the cycle
    pub deployer: String,
    /// Bundles found by the scanner
    pub bundles: usize,
    /// New contexts that went live
    pub deployed: Vec<Identity>,
    /// Live contexts replaced by a rebuild
    pub updated: Vec<Identity>,
    /// Contexts withdrawn because their bundle disappeared
    pub undeployed: Vec<Identity>,
    /// Builds that failed
    pub failed: Vec<FailedBundle>,
    /// Bundles skipped because the identity is live from another deployer
    pub rejected: Vec<Identity>,
    /// Bundles whose timestamp did not change
    pub unchanged: usize,
    /// The scan root could not be read; nothing was changed
    pub skipped: bool,
}

impl ScanReport {
    pub fn new(deployer: impl Into<String>) -> Self {
        Self {
            deployer: deployer.into(),
            ..Default::default()
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && !self.skipped
    }

    /// Whether the cycle changed what is registered
    pub fn has_changes(&self) -> bool {
        !self.deployed.is_empty() || !self.updated.is_empty() || !self.undeployed.is_empty()
    }
}
