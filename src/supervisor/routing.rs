//! Routing chain
//!
//! Registry lookup first, a catch-all not-found handler last. The host
//! transport asks the chain where each request goes.

use std::fmt::Write;
use std::sync::Arc;

use crate::application::ContextRegistry;
use crate::domain::entities::ApplicationContext;

/// Where a request goes
#[derive(Debug, Clone)]
pub enum Route {
    Context(Arc<ApplicationContext>),
    NotFound(NotFoundPage),
}

/// Response of the catch-all handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotFoundPage {
    pub status: u16,
    pub body: String,
}

pub struct RoutingChain {
    registry: Arc<ContextRegistry>,
    server_info: String,
}

impl RoutingChain {
    pub fn new(registry: Arc<ContextRegistry>, server_info: impl Into<String>) -> Self {
        Self {
            registry,
            server_info: server_info.into(),
        }
    }

    pub fn route(&self, request_path: &str) -> Route {
        match self.registry.lookup(request_path) {
            Some(context) if context.state().is_routable() => Route::Context(context),
            _ => Route::NotFound(self.not_found(request_path)),
        }
    }

    /// 404 page; a request for `/` also lists the known contexts.
    fn not_found(&self, request_path: &str) -> NotFoundPage {
        let mut body = String::from("Error 404 - Not Found.\n");
        let _ = writeln!(
            body,
            "No context on this server matched or handled {request_path}."
        );

        if request_path == "/" {
            let contexts = self.registry.snapshot();
            if !contexts.is_empty() {
                body.push_str("Contexts known to this server are:\n");
                for context in contexts.iter() {
                    let _ = writeln!(
                        body,
                        "  {} ---> {}",
                        context.context_path(),
                        context.identity()
                    );
                }
            }
        }

        let _ = writeln!(body, "{}", self.server_info);
        NotFoundPage { status: 404, body }
    }
}
