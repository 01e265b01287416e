//! Error types for Sitedeck
//!
//! Library errors use `thiserror`; each component owns a focused error enum and
//! `SitedeckError` wraps them at the crate boundary.

use std::path::PathBuf;
use thiserror::Error;

use crate::application::RegistryError;
use crate::domain::entities::{DescriptorError, RealmError};
use crate::supervisor::SupervisorError;

/// Result type alias for Sitedeck operations
pub type SitedeckResult<T> = Result<T, SitedeckError>;

/// Main error type for Sitedeck operations
#[derive(Error, Debug)]
pub enum SitedeckError {
    /// Configuration file could not be parsed
    #[error("invalid configuration in {file}: {message}")]
    InvalidConfig { file: PathBuf, message: String },

    /// Bundle path given on the command line does not exist
    #[error("bundle not found: {path}")]
    BundleNotFound { path: PathBuf },

    /// Descriptor or configuration-step failure
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    /// Context registry rejected a mutation
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Realm file could not be loaded
    #[error(transparent)]
    Realm(#[from] RealmError),

    /// Supervisor failed to start
    #[error(transparent)]
    Supervisor(#[from] SupervisorError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
