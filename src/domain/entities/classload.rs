//! Classloading context - the loading scope composed for one application
//!
//! Holds the host scope plus a record of every supplementary unit that was
//! offered to it. Only registered units count as part of the context; rejected
//! units are kept for diagnostics.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::domain::ports::LoadScope;

/// Registration outcome for a single unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOutcome {
    Registered { digest: String },
    Failed { reason: String },
}

/// One supplementary code artifact from an application's library directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassloadUnit {
    path: PathBuf,
    outcome: UnitOutcome,
}

impl ClassloadUnit {
    pub fn registered(path: impl Into<PathBuf>, digest: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            outcome: UnitOutcome::Registered {
                digest: digest.into(),
            },
        }
    }

    pub fn failed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            outcome: UnitOutcome::Failed {
                reason: reason.into(),
            },
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn outcome(&self) -> &UnitOutcome {
        &self.outcome
    }

    pub fn is_registered(&self) -> bool {
        matches!(self.outcome, UnitOutcome::Registered { .. })
    }
}

pub struct ClassloadingContext {
    units: Vec<ClassloadUnit>,
    rejected: Vec<ClassloadUnit>,
    scope: Mutex<Option<Box<dyn LoadScope>>>,
}

impl ClassloadingContext {
    /// Context without a host scope and without units
    pub fn empty() -> Self {
        Self {
            units: Vec::new(),
            rejected: Vec::new(),
            scope: Mutex::new(None),
        }
    }

    pub fn new(
        scope: Box<dyn LoadScope>,
        units: Vec<ClassloadUnit>,
        rejected: Vec<ClassloadUnit>,
    ) -> Self {
        Self {
            units,
            rejected,
            scope: Mutex::new(Some(scope)),
        }
    }

    /// Units that were registered with the host
    pub fn units(&self) -> &[ClassloadUnit] {
        &self.units
    }

    /// Units the host refused
    pub fn rejected(&self) -> &[ClassloadUnit] {
        &self.rejected
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Paths the host scope currently holds (empty once released)
    pub fn loaded_paths(&self) -> Vec<PathBuf> {
        let scope = self.scope.lock().unwrap_or_else(|e| e.into_inner());
        scope.as_ref().map(|s| s.loaded()).unwrap_or_default()
    }

    /// Release the host scope. Returns false if it was already released.
    pub fn release(&self) -> bool {
        let mut scope = self.scope.lock().unwrap_or_else(|e| e.into_inner());
        match scope.take() {
            Some(mut s) => {
                s.release();
                true
            }
            None => false,
        }
    }

    pub fn is_released(&self) -> bool {
        self.scope
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_none()
    }
}

impl Drop for ClassloadingContext {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for ClassloadingContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassloadingContext")
            .field("units", &self.units)
            .field("rejected", &self.rejected)
            .field("released", &self.is_released())
            .finish()
    }
}
