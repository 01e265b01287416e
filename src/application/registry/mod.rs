//! Context Registry
//!
//! The live, ordered collection of contexts consumed by the request router.
//!
//! Readers load an immutable snapshot (`ArcSwap`) and never block. Writers
//! serialize on a mutex, build the next snapshot from the current one and
//! publish it in a single store, then tell the router what changed. A snapshot
//! only ever contains finished contexts, and a context is `Live` before any
//! snapshot holds it.

use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use arc_swap::ArcSwap;
use thiserror::Error;
use tracing::debug;

use crate::domain::entities::ApplicationContext;
use crate::domain::ports::{NullRouter, RequestRouter};
use crate::domain::value_objects::{Identity, LifecycleState};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("context '{identity}' is already live (deployed by {owner})")]
    Duplicate { identity: Identity, owner: String },

    #[error("context '{identity}' is not registered")]
    NotRegistered { identity: Identity },
}

pub type Snapshot = Arc<Vec<Arc<ApplicationContext>>>;

pub struct ContextRegistry {
    contexts: ArcSwap<Vec<Arc<ApplicationContext>>>,
    writer: Mutex<()>,
    router: RwLock<Arc<dyn RequestRouter>>,
}

impl Default for ContextRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextRegistry {
    pub fn new() -> Self {
        Self::with_router(Arc::new(NullRouter))
    }

    pub fn with_router(router: Arc<dyn RequestRouter>) -> Self {
        Self {
            contexts: ArcSwap::from_pointee(Vec::new()),
            writer: Mutex::new(()),
            router: RwLock::new(router),
        }
    }

    /// Route future publications to `router`.
    pub fn set_router(&self, router: Arc<dyn RequestRouter>) {
        *self.router.write().unwrap_or_else(|e| e.into_inner()) = router;
    }

    /// Current snapshot, in insertion order
    pub fn snapshot(&self) -> Snapshot {
        self.contexts.load_full()
    }

    pub fn list(&self) -> Vec<Arc<ApplicationContext>> {
        self.contexts.load().as_ref().clone()
    }

    pub fn len(&self) -> usize {
        self.contexts.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.load().is_empty()
    }

    pub fn find(&self, identity: &Identity) -> Option<Arc<ApplicationContext>> {
        self.contexts
            .load()
            .iter()
            .find(|c| c.identity() == identity)
            .cloned()
    }

    /// Context serving `request_path`: the longest matching context path wins,
    /// earlier registrations win ties.
    pub fn lookup(&self, request_path: &str) -> Option<Arc<ApplicationContext>> {
        let snapshot = self.contexts.load();
        let mut best: Option<&Arc<ApplicationContext>> = None;
        for ctx in snapshot.iter() {
            if !ctx.context_path().matches(request_path) {
                continue;
            }
            let deeper = best.map_or(true, |b| ctx.context_path().depth() > b.context_path().depth());
            if deeper {
                best = Some(ctx);
            }
        }
        best.cloned()
    }

    /// Publish a new context.
    ///
    /// Fails with `Duplicate` when the identity is already live and the new
    /// context does not allow duplicates.
    pub fn add(&self, context: Arc<ApplicationContext>) -> Result<(), RegistryError> {
        let _guard = self.lock_writer();
        let current = self.contexts.load_full();

        if !context.allows_duplicates() {
            if let Some(existing) = current.iter().find(|c| c.identity() == context.identity()) {
                return Err(RegistryError::Duplicate {
                    identity: context.identity().clone(),
                    owner: existing.origin().to_string(),
                });
            }
        }

        context.set_state(LifecycleState::Live);
        let mut next = current.as_ref().clone();
        next.push(context.clone());
        self.contexts.store(Arc::new(next));
        debug!(app = %context.identity(), path = %context.context_path(), "context published");

        self.router().install(&[context]);
        Ok(())
    }

    /// Swap `old` for `new` in one publication, keeping its position.
    pub fn replace(
        &self,
        old: &Arc<ApplicationContext>,
        new: Arc<ApplicationContext>,
    ) -> Result<(), RegistryError> {
        let _guard = self.lock_writer();
        let current = self.contexts.load_full();

        let position = current
            .iter()
            .position(|c| Arc::ptr_eq(c, old))
            .ok_or_else(|| RegistryError::NotRegistered {
                identity: old.identity().clone(),
            })?;

        new.set_state(LifecycleState::Live);
        let mut next = current.as_ref().clone();
        next[position] = new.clone();
        self.contexts.store(Arc::new(next));
        debug!(app = %new.identity(), path = %new.context_path(), "context replaced");

        let router = self.router();
        router.uninstall(&[old.clone()]);
        router.install(&[new]);
        Ok(())
    }

    /// Withdraw every context with `identity`. Returns what was removed.
    pub fn remove(&self, identity: &Identity) -> Vec<Arc<ApplicationContext>> {
        self.remove_where(|c| c.identity() == identity)
    }

    /// Withdraw one specific context.
    pub fn remove_context(&self, context: &Arc<ApplicationContext>) -> bool {
        !self.remove_where(|c| Arc::ptr_eq(c, context)).is_empty()
    }

    /// Withdraw everything. Returns what was removed.
    pub fn clear(&self) -> Vec<Arc<ApplicationContext>> {
        self.remove_where(|_| true)
    }

    fn remove_where(
        &self,
        predicate: impl Fn(&Arc<ApplicationContext>) -> bool,
    ) -> Vec<Arc<ApplicationContext>> {
        let _guard = self.lock_writer();
        let current = self.contexts.load_full();

        let (removed, kept): (Vec<_>, Vec<_>) =
            current.iter().cloned().partition(|c| predicate(c));
        if removed.is_empty() {
            return removed;
        }

        self.contexts.store(Arc::new(kept));
        self.router().uninstall(&removed);
        removed
    }

    fn lock_writer(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn router(&self) -> Arc<dyn RequestRouter> {
        self.router
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}
