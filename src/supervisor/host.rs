//! Host services
//!
//! Everything the engine needs from the hosting process, passed explicitly:
//! server home, the code-loading primitive and the capability handles injected
//! into every context.

use std::any::Any;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::application::ClassloadComposer;
use crate::domain::entities::{
    AttributeValue, Attributes, CONTENT_RESOLVER_ATTRIBUTE, HOST_CONTEXT_ATTRIBUTE,
};
use crate::domain::ports::CodeLoader;

#[derive(Clone)]
pub struct HostServices {
    home: PathBuf,
    code_loader: Arc<dyn CodeLoader>,
    attributes: Attributes,
    server_info: String,
}

impl HostServices {
    pub fn new(home: impl Into<PathBuf>, code_loader: Arc<dyn CodeLoader>) -> Self {
        Self {
            home: home.into(),
            code_loader,
            attributes: Attributes::new(),
            server_info: format!("sitedeck/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Inject the host content resolver into every context.
    pub fn with_content_resolver<T: Any + Send + Sync>(self, resolver: T) -> Self {
        self.with_attribute(CONTENT_RESOLVER_ATTRIBUTE, AttributeValue::handle(resolver))
    }

    /// Inject the host application context into every context.
    pub fn with_host_context<T: Any + Send + Sync>(self, context: T) -> Self {
        self.with_attribute(HOST_CONTEXT_ATTRIBUTE, AttributeValue::handle(context))
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    pub fn with_server_info(mut self, info: impl Into<String>) -> Self {
        self.server_info = info.into();
        self
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn code_loader(&self) -> &Arc<dyn CodeLoader> {
        &self.code_loader
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn server_info(&self) -> &str {
        &self.server_info
    }

    pub fn composer(&self) -> ClassloadComposer {
        ClassloadComposer::new(Arc::clone(&self.code_loader))
    }
}

impl fmt::Debug for HostServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostServices")
            .field("home", &self.home)
            .field("attributes", &self.attributes.keys().collect::<Vec<_>>())
            .field("server_info", &self.server_info)
            .finish()
    }
}
