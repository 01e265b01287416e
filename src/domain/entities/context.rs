//! Application context - a fully configured, routable web application
//!
//! Contexts are assembled in a mutable `ContextDraft` by the configuration
//! pipeline and frozen with `finish()`. Only a finished context is ever handed
//! to the registry, so readers never see a half-configured application.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use super::classload::ClassloadingContext;
use super::descriptor::{FilterDef, ServletDef};
use crate::domain::value_objects::{ConfigurationStep, ContextPath, Identity, LifecycleState};

/// Attribute carrying the host content-resolver handle
pub const CONTENT_RESOLVER_ATTRIBUTE: &str = "sitedeck.contentResolver";
/// Attribute carrying the host application-context handle
pub const HOST_CONTEXT_ATTRIBUTE: &str = "sitedeck.hostContext";

/// Attribute value: plain text from configuration or an opaque host handle
#[derive(Clone)]
pub enum AttributeValue {
    Text(String),
    Handle(Arc<dyn Any + Send + Sync>),
}

impl AttributeValue {
    pub fn handle<T: Any + Send + Sync>(value: T) -> Self {
        AttributeValue::Handle(Arc::new(value))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(text) => Some(text),
            AttributeValue::Handle(_) => None,
        }
    }

    /// Borrow the handle as `T`, if it is one.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            AttributeValue::Handle(handle) => handle.downcast_ref::<T>(),
            AttributeValue::Text(_) => None,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(text: &str) -> Self {
        AttributeValue::Text(text.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(text: String) -> Self {
        AttributeValue::Text(text)
    }
}

impl fmt::Debug for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Text(text) => f.debug_tuple("Text").field(text).finish(),
            AttributeValue::Handle(_) => f.write_str("Handle(..)"),
        }
    }
}

impl PartialEq for AttributeValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AttributeValue::Text(a), AttributeValue::Text(b)) => a == b,
            (AttributeValue::Handle(a), AttributeValue::Handle(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

pub type Attributes = BTreeMap<String, AttributeValue>;

/// Tag library registered with a context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagLibrary {
    pub uri: String,
    pub location: PathBuf,
    pub short_name: Option<String>,
}

/// Mutable context under construction
#[derive(Debug)]
pub struct ContextDraft {
    pub(crate) identity: Identity,
    pub(crate) origin: String,
    pub(crate) allow_duplicates: bool,
    pub(crate) context_path: ContextPath,
    pub(crate) document_root: PathBuf,
    pub(crate) bundle_modified: SystemTime,
    pub(crate) steps: Vec<ConfigurationStep>,
    pub(crate) classloading: ClassloadingContext,
    pub(crate) attributes: Attributes,
    pub(crate) init_params: BTreeMap<String, String>,
    pub(crate) servlets: Vec<ServletDef>,
    pub(crate) filters: Vec<FilterDef>,
    pub(crate) taglibs: Vec<TagLibrary>,
    pub(crate) welcome_files: Vec<String>,
    pub(crate) mime_types: BTreeMap<String, String>,
    pub(crate) virtual_hosts: Vec<String>,
    pub(crate) parent_loader_priority: bool,
    pub(crate) max_form_content_size: Option<usize>,
    pub(crate) display_name: Option<String>,
}

impl ContextDraft {
    pub fn new(
        identity: Identity,
        origin: impl Into<String>,
        document_root: impl Into<PathBuf>,
        bundle_modified: SystemTime,
    ) -> Self {
        let context_path = ContextPath::for_identity(&identity);
        Self {
            identity,
            origin: origin.into(),
            allow_duplicates: false,
            context_path,
            document_root: document_root.into(),
            bundle_modified,
            steps: Vec::new(),
            classloading: ClassloadingContext::empty(),
            attributes: Attributes::new(),
            init_params: BTreeMap::new(),
            servlets: Vec::new(),
            filters: Vec::new(),
            taglibs: Vec::new(),
            welcome_files: Vec::new(),
            mime_types: BTreeMap::new(),
            virtual_hosts: Vec::new(),
            parent_loader_priority: false,
            max_form_content_size: None,
            display_name: None,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn document_root(&self) -> &Path {
        &self.document_root
    }

    pub fn set_context_path(&mut self, path: ContextPath) {
        self.context_path = path;
    }

    pub fn set_allow_duplicates(&mut self, allow: bool) {
        self.allow_duplicates = allow;
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: AttributeValue) {
        self.attributes.insert(name.into(), value);
    }

    /// Freeze the draft into a context in the `Deploying` state.
    pub fn finish(self) -> ApplicationContext {
        ApplicationContext {
            identity: self.identity,
            origin: self.origin,
            allow_duplicates: self.allow_duplicates,
            context_path: self.context_path,
            document_root: self.document_root,
            bundle_modified: self.bundle_modified,
            steps: self.steps,
            classloading: self.classloading,
            attributes: self.attributes,
            init_params: self.init_params,
            servlets: self.servlets,
            filters: self.filters,
            taglibs: self.taglibs,
            welcome_files: self.welcome_files,
            mime_types: self.mime_types,
            virtual_hosts: self.virtual_hosts,
            parent_loader_priority: self.parent_loader_priority,
            max_form_content_size: self.max_form_content_size,
            display_name: self.display_name,
            state: RwLock::new(LifecycleState::Deploying),
        }
    }
}

/// A configured application. Immutable apart from its lifecycle state.
#[derive(Debug)]
pub struct ApplicationContext {
    identity: Identity,
    origin: String,
    allow_duplicates: bool,
    context_path: ContextPath,
    document_root: PathBuf,
    bundle_modified: SystemTime,
    steps: Vec<ConfigurationStep>,
    classloading: ClassloadingContext,
    attributes: Attributes,
    init_params: BTreeMap<String, String>,
    servlets: Vec<ServletDef>,
    filters: Vec<FilterDef>,
    taglibs: Vec<TagLibrary>,
    welcome_files: Vec<String>,
    mime_types: BTreeMap<String, String>,
    virtual_hosts: Vec<String>,
    parent_loader_priority: bool,
    max_form_content_size: Option<usize>,
    display_name: Option<String>,
    state: RwLock<LifecycleState>,
}

impl ApplicationContext {
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Name of the deployer that produced this context
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn allows_duplicates(&self) -> bool {
        self.allow_duplicates
    }

    pub fn context_path(&self) -> &ContextPath {
        &self.context_path
    }

    pub fn document_root(&self) -> &Path {
        &self.document_root
    }

    /// Bundle timestamp the context was built from
    pub fn bundle_modified(&self) -> SystemTime {
        self.bundle_modified
    }

    pub fn steps(&self) -> &[ConfigurationStep] {
        &self.steps
    }

    pub fn classloading(&self) -> &ClassloadingContext {
        &self.classloading
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    pub fn init_params(&self) -> &BTreeMap<String, String> {
        &self.init_params
    }

    pub fn servlets(&self) -> &[ServletDef] {
        &self.servlets
    }

    pub fn filters(&self) -> &[FilterDef] {
        &self.filters
    }

    pub fn taglibs(&self) -> &[TagLibrary] {
        &self.taglibs
    }

    pub fn welcome_files(&self) -> &[String] {
        &self.welcome_files
    }

    pub fn mime_types(&self) -> &BTreeMap<String, String> {
        &self.mime_types
    }

    pub fn virtual_hosts(&self) -> &[String] {
        &self.virtual_hosts
    }

    pub fn parent_loader_priority(&self) -> bool {
        self.parent_loader_priority
    }

    pub fn max_form_content_size(&self) -> Option<usize> {
        self.max_form_content_size
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Move to `next`. Returns false (and leaves the state alone) when the
    /// transition is not allowed.
    pub fn set_state(&self, next: LifecycleState) -> bool {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        if !state.can_transition_to(next) {
            return false;
        }
        *state = next;
        true
    }

    /// Release the classloading scope. Safe to call more than once.
    pub fn release(&self) -> bool {
        self.classloading.release()
    }
}
