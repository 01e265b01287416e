//! Bundle Scanner
//!
//! Walks a scan root and reports the deployable bundles found directly under it:
//! subdirectories for webapp roots, `*.toml` files for context roots. Hidden
//! entries are skipped. Scanning never mutates anything, so repeated scans of an
//! unchanged root yield equal sets.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use tracing::{debug, info};

use crate::domain::entities::{Bundle, BundleKind, BundleLayout, BundleSet};
use crate::domain::value_objects::Identity;

/// Extension of standalone context descriptors
pub const CONTEXT_FILE_EXTENSION: &str = "toml";

/// Outcome of one scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Found(BundleSet),
    /// The scan root does not exist. `first_notice` is true only for the first
    /// scan that noticed it missing.
    RootMissing { first_notice: bool },
}

impl ScanOutcome {
    pub fn into_bundles(self) -> BundleSet {
        match self {
            ScanOutcome::Found(bundles) => bundles,
            ScanOutcome::RootMissing { .. } => BundleSet::new(),
        }
    }
}

#[derive(Debug)]
pub struct BundleScanner {
    root: PathBuf,
    kind: BundleKind,
    root_missing: AtomicBool,
}

impl BundleScanner {
    pub fn new(root: impl Into<PathBuf>, kind: BundleKind) -> Self {
        Self {
            root: root.into(),
            kind,
            root_missing: AtomicBool::new(false),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn kind(&self) -> BundleKind {
        self.kind
    }

    /// Current bundle set. A missing or unreadable root yields an empty set.
    pub fn scan(&self) -> BundleSet {
        match self.try_scan() {
            Ok(outcome) => outcome.into_bundles(),
            Err(e) => {
                debug!(root = %self.root.display(), error = %e, "scan root unreadable");
                BundleSet::new()
            }
        }
    }

    /// Scan, distinguishing a missing root from an unreadable one.
    ///
    /// A missing root is expected (storage not mounted yet) and is logged once
    /// until it reappears. Any other IO error on the root is returned.
    pub fn try_scan(&self) -> io::Result<ScanOutcome> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let first_notice = !self.root_missing.swap(true, Ordering::SeqCst);
                if first_notice {
                    info!(root = %self.root.display(), "scan root does not exist");
                }
                return Ok(ScanOutcome::RootMissing { first_notice });
            }
            Err(e) => return Err(e),
        };

        if self.root_missing.swap(false, Ordering::SeqCst) {
            info!(root = %self.root.display(), "scan root is available again");
        }

        let mut bundles = BundleSet::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!(root = %self.root.display(), error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            if let Some(bundle) = self.bundle_for(&entry.path()) {
                bundles.insert(bundle);
            }
        }
        Ok(ScanOutcome::Found(bundles))
    }

    fn bundle_for(&self, path: &Path) -> Option<Bundle> {
        let name = path.file_name()?.to_str()?;
        if is_hidden(name) {
            return None;
        }

        // Follows symlinks; entries that vanish mid-scan are skipped.
        let metadata = fs::metadata(path).ok()?;

        match self.kind {
            BundleKind::Webapp if metadata.is_dir() => Some(Bundle::new(
                Identity::new(name),
                path,
                BundleKind::Webapp,
                webapp_timestamp(path),
            )),
            BundleKind::ContextFile if metadata.is_file() => {
                if path.extension().and_then(|e| e.to_str()) != Some(CONTEXT_FILE_EXTENSION) {
                    return None;
                }
                let stem = path.file_stem()?.to_str()?;
                Some(Bundle::new(
                    Identity::new(stem),
                    path,
                    BundleKind::ContextFile,
                    metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
                ))
            }
            _ => None,
        }
    }
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Newest modification time among the paths that define a webapp
///
/// Covers the bundle directory, `WEB-INF/`, both descriptor files, the library
/// directory and every library entry, so replacing a descriptor or dropping a new
/// library in counts as a change even when the bundle directory itself is untouched.
pub fn webapp_timestamp(root: &Path) -> SystemTime {
    let layout = BundleLayout::new(root);
    let lib_dir = layout.lib_dir();

    let mut candidates = vec![
        root.to_path_buf(),
        layout.web_inf(),
        layout.descriptor(),
        layout.platform_overrides(),
        lib_dir.clone(),
    ];
    if let Ok(entries) = fs::read_dir(&lib_dir) {
        candidates.extend(entries.filter_map(|e| e.ok()).map(|e| e.path()));
    }

    candidates
        .iter()
        .filter_map(|p| modified(p))
        .max()
        .unwrap_or(SystemTime::UNIX_EPOCH)
}

#[cfg(test)]
mod tests;
