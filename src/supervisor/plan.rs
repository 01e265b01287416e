//! What the supervisor brings up

use std::path::PathBuf;

use crate::application::DeployerConfig;
use crate::infrastructure::ConnectorSpec;

/// Credential store setup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealmPlan {
    pub name: String,
    /// Missing file means an empty realm
    pub file: PathBuf,
    /// Installed as the `admin` user with the `admin` role
    pub console_password: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ServerPlan {
    pub connectors: Vec<ConnectorSpec>,
    pub deployers: Vec<DeployerConfig>,
    pub realm: Option<RealmPlan>,
}

impl ServerPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_connector(mut self, spec: ConnectorSpec) -> Self {
        self.connectors.push(spec);
        self
    }

    pub fn with_deployer(mut self, config: DeployerConfig) -> Self {
        self.deployers.push(config);
        self
    }

    pub fn with_realm(mut self, realm: RealmPlan) -> Self {
        self.realm = Some(realm);
        self
    }
}
