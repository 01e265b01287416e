//! Descriptor entities
//!
//! - `WebDescriptor` - `WEB-INF/web.toml` and the server-wide defaults descriptor
//! - `PlatformOverrides` - `WEB-INF/platform.toml`
//! - `ContextDescriptor` - standalone `contexts/<name>.toml`
//! - `TagLibraryFile` - `*.tld` files discovered under `WEB-INF/`
//!
//! Descriptors are strict: unknown keys are parse errors, so a typo fails the
//! deploy instead of silently dropping configuration.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Descriptor and configuration-step failures. Any of these abandons the build.
#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid descriptor {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("{path}: {kind} entry is missing '{field}'")]
    MissingField {
        path: PathBuf,
        kind: &'static str,
        field: &'static str,
    },

    #[error("{path}: invalid url pattern '{pattern}' for '{name}'")]
    InvalidUrlPattern {
        path: PathBuf,
        name: String,
        pattern: String,
    },

    #[error("{path}: url pattern '{pattern}' is mapped by both '{first}' and '{second}'")]
    ConflictingMapping {
        path: PathBuf,
        pattern: String,
        first: String,
        second: String,
    },

    #[error("invalid context path '{value}'")]
    InvalidContextPath { value: String },

    #[error("tag library '{uri}' not found at {location}")]
    MissingTagLibrary { uri: String, location: PathBuf },

    #[error("{location} escapes application root {root}")]
    EscapesRoot { location: PathBuf, root: PathBuf },

    #[error("application root {path} does not exist")]
    MissingApplicationRoot { path: PathBuf },
}

/// Read and deserialize a TOML descriptor.
pub fn read_toml<T: DeserializeOwned>(path: &Path) -> Result<T, DescriptorError> {
    let content = fs::read_to_string(path).map_err(|source| DescriptorError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|e| DescriptorError::Parse {
        path: path.to_path_buf(),
        message: e.message().to_string(),
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServletDef {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub url_patterns: Vec<String>,
    #[serde(default)]
    pub load_on_startup: Option<i32>,
    #[serde(default)]
    pub init_params: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterDef {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub url_patterns: Vec<String>,
}

/// Tag library declared in a descriptor; `location` is relative to the application root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TagLibDecl {
    pub uri: String,
    pub location: PathBuf,
}

/// Application descriptor (`WEB-INF/web.toml`) or defaults descriptor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WebDescriptor {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub context_path: Option<String>,
    #[serde(default)]
    pub welcome_files: Vec<String>,
    #[serde(default)]
    pub init_params: BTreeMap<String, String>,
    #[serde(default)]
    pub mime_types: BTreeMap<String, String>,
    #[serde(default, rename = "servlet")]
    pub servlets: Vec<ServletDef>,
    #[serde(default, rename = "filter")]
    pub filters: Vec<FilterDef>,
    #[serde(default, rename = "taglib")]
    pub taglibs: Vec<TagLibDecl>,
}

impl WebDescriptor {
    pub fn load(path: &Path) -> Result<Self, DescriptorError> {
        read_toml(path)
    }

    /// Layer this descriptor over `defaults`; this descriptor wins on conflict.
    ///
    /// Servlets and filters are keyed by name, tag libraries by uri. A url
    /// pattern claimed by an application servlet is taken away from any
    /// defaults servlet that also claimed it.
    pub fn merged_over(self, defaults: WebDescriptor) -> WebDescriptor {
        let claimed: Vec<&String> = self
            .servlets
            .iter()
            .flat_map(|s| s.url_patterns.iter())
            .collect();

        let mut servlets: Vec<ServletDef> = defaults
            .servlets
            .into_iter()
            .map(|mut s| {
                s.url_patterns.retain(|p| !claimed.contains(&p));
                s
            })
            .collect();
        for servlet in self.servlets.iter().cloned() {
            upsert_by(&mut servlets, servlet, |a, b| a.name == b.name);
        }

        let mut filters = defaults.filters;
        for filter in self.filters {
            upsert_by(&mut filters, filter, |a, b| a.name == b.name);
        }

        let mut taglibs = defaults.taglibs;
        for taglib in self.taglibs {
            upsert_by(&mut taglibs, taglib, |a, b| a.uri == b.uri);
        }

        let mut init_params = defaults.init_params;
        init_params.extend(self.init_params);
        let mut mime_types = defaults.mime_types;
        mime_types.extend(self.mime_types);

        WebDescriptor {
            display_name: self.display_name.or(defaults.display_name),
            context_path: self.context_path.or(defaults.context_path),
            welcome_files: if self.welcome_files.is_empty() {
                defaults.welcome_files
            } else {
                self.welcome_files
            },
            init_params,
            mime_types,
            servlets,
            filters,
            taglibs,
        }
    }

    /// Check servlet and filter registrations. `path` is used for error reporting.
    pub fn validate(&self, path: &Path) -> Result<(), DescriptorError> {
        let mut owners: HashMap<&str, &str> = HashMap::new();

        for servlet in &self.servlets {
            require(path, "servlet", "name", &servlet.name)?;
            require(path, "servlet", "class", &servlet.class)?;
            for pattern in &servlet.url_patterns {
                check_pattern(path, &servlet.name, pattern)?;
                if let Some(first) = owners.insert(pattern, &servlet.name) {
                    if first != servlet.name {
                        return Err(DescriptorError::ConflictingMapping {
                            path: path.to_path_buf(),
                            pattern: pattern.clone(),
                            first: first.to_string(),
                            second: servlet.name.clone(),
                        });
                    }
                }
            }
        }

        for filter in &self.filters {
            require(path, "filter", "name", &filter.name)?;
            require(path, "filter", "class", &filter.class)?;
            for pattern in &filter.url_patterns {
                check_pattern(path, &filter.name, pattern)?;
            }
        }

        Ok(())
    }
}

fn upsert_by<T>(items: &mut Vec<T>, item: T, same: impl Fn(&T, &T) -> bool) {
    match items.iter_mut().find(|existing| same(existing, &item)) {
        Some(existing) => *existing = item,
        None => items.push(item),
    }
}

fn require(
    path: &Path,
    kind: &'static str,
    field: &'static str,
    value: &str,
) -> Result<(), DescriptorError> {
    if value.trim().is_empty() {
        return Err(DescriptorError::MissingField {
            path: path.to_path_buf(),
            kind,
            field,
        });
    }
    Ok(())
}

/// Valid patterns: path mappings (`/`, `/api/*`, `/index`) and extension
/// mappings (`*.jsp`).
fn check_pattern(path: &Path, name: &str, pattern: &str) -> Result<(), DescriptorError> {
    let valid = if let Some(ext) = pattern.strip_prefix("*.") {
        !ext.is_empty() && !ext.contains('/') && !ext.contains('*')
    } else if pattern.starts_with('/') {
        !pattern.contains(char::is_whitespace)
            && pattern.find('*').map_or(true, |i| i == pattern.len() - 1 && pattern.ends_with("/*"))
    } else {
        false
    };

    if valid {
        Ok(())
    } else {
        Err(DescriptorError::InvalidUrlPattern {
            path: path.to_path_buf(),
            name: name.to_string(),
            pattern: pattern.to_string(),
        })
    }
}

/// Platform-specific overrides (`WEB-INF/platform.toml`), applied after the descriptor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlatformOverrides {
    #[serde(default)]
    pub context_path: Option<String>,
    #[serde(default)]
    pub virtual_hosts: Vec<String>,
    #[serde(default)]
    pub parent_loader_priority: Option<bool>,
    #[serde(default)]
    pub max_form_content_size: Option<usize>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub init_params: BTreeMap<String, String>,
}

impl PlatformOverrides {
    pub fn load(path: &Path) -> Result<Self, DescriptorError> {
        read_toml(path)
    }
}

/// Standalone context definition (`contexts/<name>.toml`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContextDescriptor {
    #[serde(default)]
    pub context_path: Option<String>,
    /// Application root; relative paths resolve against the server home
    pub war: PathBuf,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub init_params: BTreeMap<String, String>,
}

impl ContextDescriptor {
    pub fn load(path: &Path) -> Result<Self, DescriptorError> {
        read_toml(path)
    }

    /// Absolute application root
    pub fn application_root(&self, home: &Path) -> PathBuf {
        if self.war.is_absolute() {
            self.war.clone()
        } else {
            home.join(&self.war)
        }
    }
}

/// Tag library descriptor file discovered under `WEB-INF/`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagLibraryFile {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub short_name: Option<String>,
}
