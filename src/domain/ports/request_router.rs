//! RequestRouter port - the host transport's view of live contexts
//!
//! The registry calls `install` after a context becomes visible and `uninstall`
//! after it is withdrawn. The engine never parses or serves HTTP itself.

use std::sync::Arc;

use crate::domain::entities::ApplicationContext;

pub trait RequestRouter: Send + Sync {
    fn install(&self, contexts: &[Arc<ApplicationContext>]);

    fn uninstall(&self, contexts: &[Arc<ApplicationContext>]);
}

/// Router for headless use; the registry snapshot is the only routing table.
pub struct NullRouter;

impl RequestRouter for NullRouter {
    fn install(&self, _contexts: &[Arc<ApplicationContext>]) {}

    fn uninstall(&self, _contexts: &[Arc<ApplicationContext>]) {}
}
