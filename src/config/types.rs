//! Configuration type definitions

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::application::{DeployerConfig, ScanTrigger};
use crate::domain::entities::BundleKind;
use crate::error::SitedeckResult;
use crate::infrastructure::{ConnectorSpec, DigestCodeLoader, DEFAULT_LIB_EXTENSIONS};
use crate::supervisor::{HostServices, RealmPlan, ServerPlan};

use super::loader;
use super::ConfigWarning;

/// Server home, listening address and console credential
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub home: PathBuf,
    pub host: String,
    pub port: u16,
    pub console_password: Option<String>,
    /// Overrides the `sitedeck/<version>` banner
    pub server_info: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            home: PathBuf::from("/sdcard/jetty"),
            host: "0.0.0.0".to_string(),
            port: 8080,
            console_password: None,
            server_info: None,
        }
    }
}

/// One deployer section (`[webapps]` or `[contexts]`)
///
/// Unset fields fall back to the defaults of the deployer kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployerSection {
    pub enabled: bool,
    /// Scan root, relative to the server home
    pub dir: Option<PathBuf>,
    /// Seconds between rescans; 0 scans once at startup
    pub scan_interval: Option<u64>,
    pub trigger: ScanTrigger,
    /// Relative to the server home; an empty path disables the defaults descriptor
    pub defaults_descriptor: Option<PathBuf>,
    pub allow_duplicates: bool,
    pub attributes: BTreeMap<String, String>,
}

impl Default for DeployerSection {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
            scan_interval: None,
            trigger: ScanTrigger::default(),
            defaults_descriptor: None,
            allow_duplicates: false,
            attributes: BTreeMap::new(),
        }
    }
}

impl DeployerSection {
    /// Resolve against the built-in deployer defaults.
    fn resolve(&self, base: DeployerConfig, home: &Path) -> DeployerConfig {
        let mut config = base.with_trigger(self.trigger);
        if let Some(dir) = &self.dir {
            config.scan_root = home.join(dir);
        }
        if let Some(secs) = self.scan_interval {
            config = config.with_scan_interval(Duration::from_secs(secs));
        }
        match &self.defaults_descriptor {
            Some(path) if path.as_os_str().is_empty() => {
                config = config.without_defaults_descriptor()
            }
            Some(path) => config = config.with_defaults_descriptor(home.join(path)),
            None => {}
        }
        config = config.with_allow_duplicates(self.allow_duplicates);
        for (name, value) in &self.attributes {
            config = config.with_attribute(name, value);
        }
        config
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassloadConfig {
    /// Library artifact extensions registered from `WEB-INF/lib`
    pub lib_extensions: Vec<String>,
}

impl Default for ClassloadConfig {
    fn default() -> Self {
        Self {
            lib_extensions: DEFAULT_LIB_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RealmConfig {
    pub name: String,
    /// Relative to the server home
    pub file: PathBuf,
}

impl Default for RealmConfig {
    fn default() -> Self {
        Self {
            name: "Console".to_string(),
            file: PathBuf::from("etc/realm.properties"),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub webapps: DeployerSection,
    pub contexts: DeployerSection,
    pub classload: ClassloadConfig,
    pub realm: RealmConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> SitedeckResult<Self> {
        let (config, _warnings) = loader::load_with_warnings(path)?;
        Ok(config)
    }

    /// Load configuration and collect non-fatal warnings (e.g. unknown keys).
    pub fn load_with_warnings(path: &Path) -> SitedeckResult<(Self, Vec<ConfigWarning>)> {
        loader::load_with_warnings(path)
    }

    /// Resolve the configuration file (see [`config_candidates`](super::config_candidates)),
    /// then apply environment overrides.
    ///
    /// An explicit path must exist; the other candidates are optional.
    pub fn discover(
        explicit: Option<&Path>,
        home: Option<&Path>,
    ) -> SitedeckResult<(Self, Vec<ConfigWarning>)> {
        loader::discover(explicit, home)
    }

    /// Apply environment variable overrides (SITEDECK_* prefix)
    pub fn with_env_overrides(self) -> Self {
        loader::apply_env_overrides(self, |key| std::env::var(key).ok())
    }

    pub fn home(&self) -> &Path {
        &self.server.home
    }

    /// Deployers for the enabled sections, webapps first
    pub fn deployer_configs(&self) -> Vec<DeployerConfig> {
        let home = self.home();
        let mut configs = Vec::new();
        if self.webapps.enabled {
            configs.push(self.webapps.resolve(DeployerConfig::webapps(home), home));
        }
        if self.contexts.enabled {
            configs.push(self.contexts.resolve(DeployerConfig::contexts(home), home));
        }
        configs
    }

    pub fn deployer_config(&self, kind: BundleKind) -> DeployerConfig {
        let home = self.home();
        match kind {
            BundleKind::Webapp => self.webapps.resolve(DeployerConfig::webapps(home), home),
            BundleKind::ContextFile => self.contexts.resolve(DeployerConfig::contexts(home), home),
        }
    }

    pub fn server_plan(&self) -> ServerPlan {
        let mut plan = ServerPlan::new().with_connector(ConnectorSpec::new(
            "http",
            self.server.host.clone(),
            self.server.port,
        ));
        for config in self.deployer_configs() {
            plan = plan.with_deployer(config);
        }
        plan.with_realm(RealmPlan {
            name: self.realm.name.clone(),
            file: self.home().join(&self.realm.file),
            console_password: self.server.console_password.clone(),
        })
    }

    /// Host services with the configured code loader; capability handles are
    /// added by the embedding host.
    pub fn host_services(&self) -> HostServices {
        let loader = DigestCodeLoader::with_extensions(&self.classload.lib_extensions);
        let services = HostServices::new(self.home(), Arc::new(loader));
        match &self.server.server_info {
            Some(info) => services.with_server_info(info),
            None => services,
        }
    }
}
