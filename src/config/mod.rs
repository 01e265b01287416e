//! Configuration module for Sitedeck
//!
//! Configuration hierarchy:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (SITEDECK_*)
//! 3. Explicit `--config` file, else `<home>/etc/sitedeck.toml`, else the user
//!    config (`~/.config/sitedeck/config.toml`)
//! 4. Built-in defaults (lowest priority)

mod loader;
#[cfg(test)]
mod tests;
mod types;

pub use crate::domain::value_objects::ConfigWarning;

pub use loader::{apply_env_overrides, config_candidates, HOME_CONFIG_FILE};
pub use types::{ClassloadConfig, Config, DeployerSection, RealmConfig, ServerConfig};
