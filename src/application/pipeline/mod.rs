//! Configuration Pipeline
//!
//! Turns a bundle into a fully configured `ApplicationContext`:
//!
//! 1. `resolve` lists the configuration steps for an application root
//! 2. `ContextBuilder` seeds a draft (attributes, context path) and runs every
//!    step through a single interpreter
//! 3. the finished context is returned; any step error drops the draft, which
//!    releases its classloading scope
//!
//! Nothing here touches the registry.

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use ignore::WalkBuilder;
use tracing::{debug, debug_span};

use crate::application::compose::ClassloadComposer;
use crate::application::deploy::DeployerConfig;
use crate::domain::entities::{
    read_toml, ApplicationContext, AttributeValue, Attributes, Bundle, BundleKind, BundleLayout,
    ContextDescriptor, ContextDraft, DescriptorError, PlatformOverrides, TagLibDecl, TagLibrary,
    TagLibraryFile, WebDescriptor,
};
use crate::domain::value_objects::{ConfigurationStep, ContextPath};

/// Extension of tag library descriptors
pub const TAG_LIBRARY_EXTENSION: &str = "tld";

/// Configuration steps for the application rooted at `app_root`, in application order.
///
/// Platform overrides are only listed when `WEB-INF/platform.toml` exists.
pub fn resolve(app_root: &Path, defaults: Option<&Path>) -> Vec<ConfigurationStep> {
    let layout = BundleLayout::new(app_root);

    let mut steps = vec![
        ConfigurationStep::ComposeClassloader {
            lib_dir: layout.lib_dir(),
        },
        ConfigurationStep::ApplyDescriptor {
            defaults: defaults.map(Path::to_path_buf),
            descriptor: layout.descriptor(),
        },
    ];

    let overrides = layout.platform_overrides();
    if overrides.is_file() {
        steps.push(ConfigurationStep::ApplyPlatformOverrides { overrides });
    }

    steps.push(ConfigurationStep::RegisterTagLibraries {
        search_root: layout.web_inf(),
    });
    steps
}

/// Builds contexts for one deployer
#[derive(Clone)]
pub struct ContextBuilder {
    composer: ClassloadComposer,
    config: DeployerConfig,
    host_attributes: Attributes,
}

impl ContextBuilder {
    pub fn new(composer: ClassloadComposer, config: DeployerConfig, host_attributes: Attributes) -> Self {
        Self {
            composer,
            config,
            host_attributes,
        }
    }

    pub fn config(&self) -> &DeployerConfig {
        &self.config
    }

    /// Build a context for `bundle`. The result is in the `Deploying` state.
    pub fn build(&self, bundle: &Bundle) -> Result<ApplicationContext, DescriptorError> {
        let _span = debug_span!("build", app = %bundle.identity(), deployer = %self.config.name).entered();

        let context_file = match bundle.kind() {
            BundleKind::Webapp => None,
            BundleKind::ContextFile => Some(ContextDescriptor::load(bundle.path())?),
        };

        let app_root = match &context_file {
            Some(descriptor) => {
                let root = descriptor.application_root(&self.config.home);
                if !root.is_dir() {
                    return Err(DescriptorError::MissingApplicationRoot { path: root });
                }
                root
            }
            None => bundle.path().to_path_buf(),
        };

        let mut draft = ContextDraft::new(
            bundle.identity().clone(),
            self.config.name.clone(),
            &app_root,
            bundle.modified(),
        );
        draft.set_allow_duplicates(self.config.allow_duplicates);

        for (name, value) in &self.host_attributes {
            draft.set_attribute(name.clone(), value.clone());
        }
        for (name, value) in &self.config.attributes {
            draft.set_attribute(name.clone(), AttributeValue::Text(value.clone()));
        }

        let mut path_pinned = false;
        if let Some(descriptor) = &context_file {
            for (name, value) in &descriptor.attributes {
                draft.set_attribute(name.clone(), AttributeValue::Text(value.clone()));
            }
            draft.init_params.extend(descriptor.init_params.clone());
            if let Some(raw) = &descriptor.context_path {
                draft.set_context_path(parse_context_path(raw)?);
                path_pinned = true;
            }
        }

        let steps = resolve(&app_root, self.config.defaults_descriptor.as_deref());
        let mut interpreter = Interpreter {
            composer: &self.composer,
            draft,
            path_pinned,
            declared_taglibs: Vec::new(),
        };
        for step in &steps {
            debug!(step = step.name(), "applying configuration step");
            interpreter.apply(step)?;
        }

        let mut draft = interpreter.draft;
        draft.steps = steps;
        Ok(draft.finish())
    }
}

fn parse_context_path(raw: &str) -> Result<ContextPath, DescriptorError> {
    ContextPath::parse(raw).ok_or_else(|| DescriptorError::InvalidContextPath {
        value: raw.to_string(),
    })
}

/// Applies configuration steps to a draft, in order
struct Interpreter<'a> {
    composer: &'a ClassloadComposer,
    draft: ContextDraft,
    /// A context file fixed the context path; descriptors may not change it
    path_pinned: bool,
    declared_taglibs: Vec<TagLibDecl>,
}

impl Interpreter<'_> {
    fn apply(&mut self, step: &ConfigurationStep) -> Result<(), DescriptorError> {
        match step {
            ConfigurationStep::ComposeClassloader { lib_dir } => {
                self.draft.classloading = self.composer.compose_dir(&self.draft.identity, lib_dir);
                Ok(())
            }
            ConfigurationStep::ApplyDescriptor {
                defaults,
                descriptor,
            } => self.apply_descriptor(defaults.as_deref(), descriptor),
            ConfigurationStep::ApplyPlatformOverrides { overrides } => {
                self.apply_platform_overrides(overrides)
            }
            ConfigurationStep::RegisterTagLibraries { search_root } => {
                self.register_tag_libraries(search_root)
            }
        }
    }

    fn apply_descriptor(
        &mut self,
        defaults: Option<&Path>,
        descriptor: &Path,
    ) -> Result<(), DescriptorError> {
        let defaults = match defaults {
            Some(path) if path.is_file() => WebDescriptor::load(path)?,
            Some(path) => {
                debug!(defaults = %path.display(), "defaults descriptor not found, skipping");
                WebDescriptor::default()
            }
            None => WebDescriptor::default(),
        };

        let application = if descriptor.is_file() {
            WebDescriptor::load(descriptor)?
        } else {
            debug!(descriptor = %descriptor.display(), "no application descriptor, serving static content");
            WebDescriptor::default()
        };

        let merged = application.merged_over(defaults);
        merged.validate(descriptor)?;

        if let Some(raw) = &merged.context_path {
            let path = parse_context_path(raw)?;
            if !self.path_pinned {
                self.draft.set_context_path(path);
            }
        }

        let draft = &mut self.draft;
        draft.display_name = merged.display_name;
        draft.welcome_files = merged.welcome_files;
        draft.mime_types = merged.mime_types;
        draft.servlets = merged.servlets;
        draft.filters = merged.filters;
        for (name, value) in merged.init_params {
            draft.init_params.entry(name).or_insert(value);
        }
        self.declared_taglibs = merged.taglibs;
        Ok(())
    }

    fn apply_platform_overrides(&mut self, path: &Path) -> Result<(), DescriptorError> {
        if !path.is_file() {
            debug!(overrides = %path.display(), "platform overrides disappeared, skipping");
            return Ok(());
        }
        let overrides = PlatformOverrides::load(path)?;
        let draft = &mut self.draft;

        if let Some(raw) = &overrides.context_path {
            let path = parse_context_path(raw)?;
            if !self.path_pinned {
                draft.set_context_path(path);
            }
        }
        if !overrides.virtual_hosts.is_empty() {
            draft.virtual_hosts = overrides.virtual_hosts;
        }
        if let Some(priority) = overrides.parent_loader_priority {
            draft.parent_loader_priority = priority;
        }
        if overrides.max_form_content_size.is_some() {
            draft.max_form_content_size = overrides.max_form_content_size;
        }
        for (name, value) in overrides.attributes {
            draft.set_attribute(name, AttributeValue::Text(value));
        }
        draft.init_params.extend(overrides.init_params);
        Ok(())
    }

    fn register_tag_libraries(&mut self, search_root: &Path) -> Result<(), DescriptorError> {
        let app_root = self.draft.document_root.clone();
        let mut seen = BTreeSet::new();
        let mut taglibs = Vec::new();

        for decl in std::mem::take(&mut self.declared_taglibs) {
            let location = confine(&app_root, &decl.location)?;
            if !location.is_file() {
                return Err(DescriptorError::MissingTagLibrary {
                    uri: decl.uri,
                    location,
                });
            }
            let file: TagLibraryFile = read_toml(&location)?;
            let short_name = file.short_name;
            seen.insert(location.clone());
            taglibs.push(TagLibrary {
                uri: decl.uri,
                location,
                short_name,
            });
        }

        for location in discover_tag_libraries(search_root) {
            if seen.contains(&location) {
                continue;
            }
            let file: TagLibraryFile = read_toml(&location)?;
            let uri = match file.uri {
                Some(uri) => uri,
                None => bundle_relative(&app_root, &location),
            };
            if taglibs.iter().any(|t: &TagLibrary| t.uri == uri) {
                debug!(uri = %uri, location = %location.display(), "tag library uri already registered");
                continue;
            }
            taglibs.push(TagLibrary {
                uri,
                location,
                short_name: file.short_name,
            });
        }

        self.draft.taglibs = taglibs;
        Ok(())
    }
}

/// Resolve `location` against `root`, refusing anything that leaves `root`.
fn confine(root: &Path, location: &Path) -> Result<PathBuf, DescriptorError> {
    let escapes = || DescriptorError::EscapesRoot {
        location: location.to_path_buf(),
        root: root.to_path_buf(),
    };

    let mut depth = 0usize;
    for component in location.components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir => depth = depth.checked_sub(1).ok_or_else(escapes)?,
            Component::RootDir | Component::Prefix(_) => return Err(escapes()),
        }
    }

    let joined = root.join(location);
    // Symlinks may still point outside.
    if let (Ok(real_root), Ok(real)) = (root.canonicalize(), joined.canonicalize()) {
        if !real.starts_with(&real_root) {
            return Err(escapes());
        }
    }
    Ok(joined)
}

/// `*.tld` files under `root`, sorted
fn discover_tag_libraries(root: &Path) -> Vec<PathBuf> {
    if !root.is_dir() {
        return Vec::new();
    }
    let mut found: Vec<PathBuf> = WalkBuilder::new(root)
        .standard_filters(false)
        .hidden(true)
        .build()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some(TAG_LIBRARY_EXTENSION))
        .collect();
    found.sort();
    found
}

fn bundle_relative(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    format!("/{}", parts.join("/"))
}
