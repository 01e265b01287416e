//! CodeLoader port - the host's code-loading primitive
//!
//! The engine never assumes an artifact format: a path is either accepted or
//! rejected by the host. Each application gets its own `LoadScope`, so a unit
//! registered for one application is never visible to another and a rejected
//! unit leaves the scope untouched.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::value_objects::Identity;

/// A unit the host accepted into a scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedUnit {
    pub path: PathBuf,
    /// Content digest reported by the host (e.g. `sha256:...`)
    pub digest: String,
}

/// Reasons the host may refuse a unit
#[derive(Debug, Error)]
pub enum CodeLoadError {
    #[error("unsupported artifact type: {path}")]
    Unsupported { path: PathBuf },

    #[error("artifact is empty: {path}")]
    Empty { path: PathBuf },

    #[error("scope for '{owner}' has already been released")]
    Released { owner: Identity },

    #[error("failed to read artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("artifact rejected: {path}: {reason}")]
    Rejected { path: PathBuf, reason: String },
}

/// Isolated loading scope for one application
pub trait LoadScope: Send {
    /// Register a supplementary code artifact.
    ///
    /// On error the scope must be left exactly as it was.
    fn register(&mut self, path: &Path) -> Result<LoadedUnit, CodeLoadError>;

    /// Paths currently registered in this scope
    fn loaded(&self) -> Vec<PathBuf>;

    /// Drop every registered unit. Further registrations fail.
    fn release(&mut self);
}

/// Host code-loading primitive
pub trait CodeLoader: Send + Sync {
    /// Open a fresh, empty scope for an application.
    fn open_scope(&self, owner: &Identity) -> Box<dyn LoadScope>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_load_error_display() {
        let err = CodeLoadError::Unsupported {
            path: PathBuf::from("WEB-INF/lib/readme.txt"),
        };
        assert!(err.to_string().contains("readme.txt"));

        let err = CodeLoadError::Released {
            owner: Identity::new("console"),
        };
        assert!(err.to_string().contains("'console'"));
    }
}
