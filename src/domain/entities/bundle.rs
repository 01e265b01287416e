//! Bundle entity - a deployable unit found on persistent storage
//!
//! Bundles are created when the scanner first sees them, updated when their
//! modification time changes and dropped when they disappear from a scan.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::Identity;

/// Private configuration directory inside a webapp bundle
pub const WEB_INF: &str = "WEB-INF";
/// Application descriptor file name (inside `WEB-INF/`)
pub const DESCRIPTOR_FILE: &str = "web.toml";
/// Platform-specific overrides file name (inside `WEB-INF/`)
pub const PLATFORM_FILE: &str = "platform.toml";
/// Private library directory name (inside `WEB-INF/`)
pub const LIB_DIR: &str = "lib";

/// Kind of bundle a deployer looks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BundleKind {
    /// Directory holding a complete web application
    Webapp,
    /// Standalone context descriptor pointing at an application root
    ContextFile,
}

impl fmt::Display for BundleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BundleKind::Webapp => f.write_str("webapp"),
            BundleKind::ContextFile => f.write_str("context"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    identity: Identity,
    path: PathBuf,
    kind: BundleKind,
    modified: SystemTime,
}

impl Bundle {
    pub fn new(
        identity: Identity,
        path: impl Into<PathBuf>,
        kind: BundleKind,
        modified: SystemTime,
    ) -> Self {
        Self {
            identity,
            path: path.into(),
            kind,
            modified,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Bundle directory (webapps) or descriptor file (context files)
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> BundleKind {
        self.kind
    }

    /// Last observed modification time
    pub fn modified(&self) -> SystemTime {
        self.modified
    }
}

/// Well-known locations inside an application root
#[derive(Debug, Clone)]
pub struct BundleLayout {
    root: PathBuf,
}

impl BundleLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Application root, also the document root
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn web_inf(&self) -> PathBuf {
        self.root.join(WEB_INF)
    }

    pub fn descriptor(&self) -> PathBuf {
        self.web_inf().join(DESCRIPTOR_FILE)
    }

    pub fn platform_overrides(&self) -> PathBuf {
        self.web_inf().join(PLATFORM_FILE)
    }

    pub fn lib_dir(&self) -> PathBuf {
        self.web_inf().join(LIB_DIR)
    }
}

/// Result of one scan, keyed and ordered by identity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleSet {
    bundles: BTreeMap<Identity, Bundle>,
}

impl BundleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a bundle. A later bundle with the same identity replaces the earlier one.
    pub fn insert(&mut self, bundle: Bundle) {
        self.bundles.insert(bundle.identity.clone(), bundle);
    }

    pub fn get(&self, identity: &Identity) -> Option<&Bundle> {
        self.bundles.get(identity)
    }

    pub fn contains(&self, identity: &Identity) -> bool {
        self.bundles.contains_key(identity)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bundle> {
        self.bundles.values()
    }

    pub fn identities(&self) -> impl Iterator<Item = &Identity> {
        self.bundles.keys()
    }

    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }
}

impl FromIterator<Bundle> for BundleSet {
    fn from_iter<I: IntoIterator<Item = Bundle>>(iter: I) -> Self {
        let mut set = BundleSet::new();
        for bundle in iter {
            set.insert(bundle);
        }
        set
    }
}
