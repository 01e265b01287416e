//! Configuration steps applied to a context before it goes live
//!
//! Steps are plain data; `application::pipeline` interprets them in order.

use std::path::PathBuf;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ConfigurationStep {
    /// Register every supplementary code artifact found in `lib_dir`
    ComposeClassloader { lib_dir: PathBuf },

    /// Merge the defaults descriptor and the application descriptor, then
    /// register servlets and filters
    ApplyDescriptor {
        defaults: Option<PathBuf>,
        descriptor: PathBuf,
    },

    /// Apply platform-specific overrides
    ApplyPlatformOverrides { overrides: PathBuf },

    /// Register declared and discovered tag libraries
    RegisterTagLibraries { search_root: PathBuf },
}

impl ConfigurationStep {
    pub fn name(&self) -> &'static str {
        match self {
            ConfigurationStep::ComposeClassloader { .. } => "compose_classloader",
            ConfigurationStep::ApplyDescriptor { .. } => "apply_descriptor",
            ConfigurationStep::ApplyPlatformOverrides { .. } => "apply_platform_overrides",
            ConfigurationStep::RegisterTagLibraries { .. } => "register_tag_libraries",
        }
    }
}
