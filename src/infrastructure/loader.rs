//! Digest-recording code loader
//!
//! Accepts regular, non-empty files with a known extension and records their
//! SHA-256 digest. Each scope only tracks what was registered into it, so
//! releasing one application's scope never affects another's.

use std::collections::BTreeSet;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::domain::ports::{CodeLoadError, CodeLoader, LoadScope, LoadedUnit};
use crate::domain::value_objects::Identity;

/// Library extensions accepted when none are configured
pub const DEFAULT_LIB_EXTENSIONS: &[&str] = &["dex", "jar"];

#[derive(Debug, Clone)]
pub struct DigestCodeLoader {
    extensions: BTreeSet<String>,
}

impl Default for DigestCodeLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DigestCodeLoader {
    pub fn new() -> Self {
        Self::with_extensions(DEFAULT_LIB_EXTENSIONS.iter().copied())
    }

    /// Extensions are matched case-insensitively, without the leading dot.
    pub fn with_extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| self.extensions.contains(&e.to_ascii_lowercase()))
    }
}

impl CodeLoader for DigestCodeLoader {
    fn open_scope(&self, owner: &Identity) -> Box<dyn LoadScope> {
        Box::new(DigestScope {
            owner: owner.clone(),
            loader: self.clone(),
            loaded: Vec::new(),
            released: false,
        })
    }
}

struct DigestScope {
    owner: Identity,
    loader: DigestCodeLoader,
    loaded: Vec<PathBuf>,
    released: bool,
}

impl LoadScope for DigestScope {
    fn register(&mut self, path: &Path) -> Result<LoadedUnit, CodeLoadError> {
        if self.released {
            return Err(CodeLoadError::Released {
                owner: self.owner.clone(),
            });
        }
        if !self.loader.accepts(path) {
            return Err(CodeLoadError::Unsupported {
                path: path.to_path_buf(),
            });
        }

        let io_error = |source: io::Error| CodeLoadError::Io {
            path: path.to_path_buf(),
            source,
        };
        let mut file = File::open(path).map_err(io_error)?;
        let mut hasher = Sha256::new();
        let length = io::copy(&mut file, &mut hasher).map_err(io_error)?;
        if length == 0 {
            return Err(CodeLoadError::Empty {
                path: path.to_path_buf(),
            });
        }

        let digest = format!("sha256:{:x}", hasher.finalize());
        self.loaded.push(path.to_path_buf());
        Ok(LoadedUnit {
            path: path.to_path_buf(),
            digest,
        })
    }

    fn loaded(&self) -> Vec<PathBuf> {
        self.loaded.clone()
    }

    fn release(&mut self) {
        self.loaded.clear();
        self.released = true;
    }
}
