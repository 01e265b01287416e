//! Classload Composer
//!
//! Registers every regular file in an application's private library directory
//! with a fresh loading scope. Units are offered one at a time in name order;
//! a unit the host refuses is logged and left out, the rest still register.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::entities::{BundleLayout, ClassloadUnit, ClassloadingContext};
use crate::domain::ports::CodeLoader;
use crate::domain::value_objects::Identity;

#[derive(Clone)]
pub struct ClassloadComposer {
    loader: Arc<dyn CodeLoader>,
}

impl ClassloadComposer {
    pub fn new(loader: Arc<dyn CodeLoader>) -> Self {
        Self { loader }
    }

    /// Compose the classloading context for an application root.
    pub fn compose(&self, identity: &Identity, app_root: &Path) -> ClassloadingContext {
        self.compose_dir(identity, &BundleLayout::new(app_root).lib_dir())
    }

    /// Compose from an explicit library directory.
    pub fn compose_dir(&self, identity: &Identity, lib_dir: &Path) -> ClassloadingContext {
        let mut scope = self.loader.open_scope(identity);

        let candidates = match library_files(lib_dir) {
            Ok(files) => files,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(app = %identity, lib_dir = %lib_dir.display(), "no library directory");
                Vec::new()
            }
            Err(e) => {
                warn!(app = %identity, lib_dir = %lib_dir.display(), error = %e, "library directory unreadable");
                Vec::new()
            }
        };

        let mut units = Vec::new();
        let mut rejected = Vec::new();
        for path in candidates {
            match scope.register(&path) {
                Ok(loaded) => {
                    debug!(app = %identity, unit = %loaded.path.display(), digest = %loaded.digest, "registered unit");
                    units.push(ClassloadUnit::registered(loaded.path, loaded.digest));
                }
                Err(e) => {
                    warn!(app = %identity, unit = %path.display(), error = %e, "failed to register unit");
                    rejected.push(ClassloadUnit::failed(path, e.to_string()));
                }
            }
        }

        ClassloadingContext::new(scope, units, rejected)
    }
}

/// Regular files directly inside `dir`, sorted by name
fn library_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    Ok(files)
}
