//! Deployer Options
//!
//! Configuration for one deployer (scan root, schedule, descriptor defaults).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::application::schedule::ScanTrigger;
use crate::domain::entities::BundleKind;

/// Default scan interval of the context-file deployer
pub const CONTEXTS_SCAN_INTERVAL: Duration = Duration::from_secs(10);

/// Options for one deployer
#[derive(Debug, Clone)]
pub struct DeployerConfig {
    /// Name used in logs, events and as the context origin
    pub name: String,
    /// What the scanner looks for
    pub kind: BundleKind,
    /// Directory scanned for bundles
    pub scan_root: PathBuf,
    /// Time between scans; zero scans once at start
    pub scan_interval: Duration,
    /// How rescans are triggered
    pub trigger: ScanTrigger,
    /// Defaults descriptor merged under every application descriptor
    pub defaults_descriptor: Option<PathBuf>,
    /// Allow an identity to be live from more than one deployer
    pub allow_duplicates: bool,
    /// Text attributes injected into every context
    pub attributes: BTreeMap<String, String>,
    /// Server home; relative context-file `war` paths resolve against it
    pub home: PathBuf,
}

impl DeployerConfig {
    pub fn new(name: impl Into<String>, kind: BundleKind, scan_root: impl Into<PathBuf>) -> Self {
        let scan_root = scan_root.into();
        let home = scan_root
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            name: name.into(),
            kind,
            scan_root,
            scan_interval: Duration::ZERO,
            trigger: ScanTrigger::default(),
            defaults_descriptor: None,
            allow_duplicates: false,
            attributes: BTreeMap::new(),
            home,
        }
    }

    /// `<home>/webapps`, scanned once, with `etc/webdefault.toml` as defaults
    pub fn webapps(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        Self::new("webapps", BundleKind::Webapp, home.join("webapps"))
            .with_defaults_descriptor(home.join("etc").join("webdefault.toml"))
            .with_home(home)
    }

    /// `<home>/contexts`, rescanned every ten seconds
    pub fn contexts(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        Self::new("contexts", BundleKind::ContextFile, home.join("contexts"))
            .with_scan_interval(CONTEXTS_SCAN_INTERVAL)
            .with_defaults_descriptor(home.join("etc").join("webdefault.toml"))
            .with_home(home)
    }

    pub fn with_scan_interval(mut self, interval: Duration) -> Self {
        self.scan_interval = interval;
        self
    }

    pub fn with_trigger(mut self, trigger: ScanTrigger) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn with_defaults_descriptor(mut self, path: impl Into<PathBuf>) -> Self {
        self.defaults_descriptor = Some(path.into());
        self
    }

    pub fn without_defaults_descriptor(mut self) -> Self {
        self.defaults_descriptor = None;
        self
    }

    pub fn with_allow_duplicates(mut self, allow: bool) -> Self {
        self.allow_duplicates = allow;
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = home.into();
        self
    }
}
