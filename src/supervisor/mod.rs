//! Server supervisor
//!
//! Brings the engine up in a fixed order and tears it down in reverse:
//!
//! 1. Bind the listening connectors
//! 2. Install the routing chain on the registry
//! 3. Start the deployers (initial scan, then the rescan schedules)
//! 4. Load the credential realm
//!
//! Stop halts the deployers first, so no scan is in flight, then closes the
//! connectors and releases whatever is still registered. A failure part way
//! through start releases everything acquired so far.

mod host;
mod plan;
mod routing;


pub use host::HostServices;
pub use plan::{RealmPlan, ServerPlan};
pub use routing::{NotFoundPage, Route, RoutingChain};

use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;
use tracing::{info, warn};

use crate::application::{ContextBuilder, ContextRegistry, Deployer, ScanReport};
use crate::domain::entities::{Password, Realm, RealmError};
use crate::domain::ports::{DeployEventSink, NoopEventSink, NullRouter, RequestRouter};
use crate::infrastructure::{load_realm, Connector};

/// User the console password is installed for
pub const CONSOLE_USER: &str = "admin";

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("cannot bind connector '{name}' on {address}: {source}")]
    Bind {
        name: String,
        address: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Realm(#[from] RealmError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    AlreadyRunning,
}

/// Everything held while running
struct Running {
    connectors: Vec<Connector>,
    deployers: Vec<Deployer>,
    realm: Realm,
    _services: HostServices,
}

pub struct Supervisor {
    plan: ServerPlan,
    services: HostServices,
    registry: Arc<ContextRegistry>,
    routing: Arc<RoutingChain>,
    router: Arc<dyn RequestRouter>,
    events: Arc<dyn DeployEventSink>,
    running: Mutex<Option<Running>>,
}

impl Supervisor {
    pub fn new(plan: ServerPlan, services: HostServices) -> Self {
        let registry = Arc::new(ContextRegistry::new());
        let routing = Arc::new(RoutingChain::new(
            Arc::clone(&registry),
            services.server_info(),
        ));
        Self {
            plan,
            services,
            registry,
            routing,
            router: Arc::new(NullRouter),
            events: Arc::new(NoopEventSink),
            running: Mutex::new(None),
        }
    }

    /// Router notified when contexts are published or withdrawn
    pub fn with_router(mut self, router: Arc<dyn RequestRouter>) -> Self {
        self.router = router;
        self
    }

    pub fn with_event_sink(mut self, sink: Arc<dyn DeployEventSink>) -> Self {
        self.events = sink;
        self
    }

    pub fn start(&self) -> Result<StartOutcome, SupervisorError> {
        let mut running = self.lock_running();
        if running.is_some() {
            return Ok(StartOutcome::AlreadyRunning);
        }

        let home = self.services.home();
        if !home.is_dir() {
            warn!(home = %home.display(), "server home missing, nothing will deploy until it appears");
        }

        let connectors = self.bind_connectors()?;

        self.registry.set_router(Arc::clone(&self.router));

        let deployers: Vec<Deployer> = self
            .plan
            .deployers
            .iter()
            .map(|config| {
                let builder = ContextBuilder::new(
                    self.services.composer(),
                    config.clone(),
                    self.services.attributes().clone(),
                );
                let deployer = Deployer::new(builder, Arc::clone(&self.registry))
                    .with_event_sink(Arc::clone(&self.events));
                let report = deployer.start();
                info!(
                    deployer = deployer.name(),
                    bundles = report.bundles,
                    deployed = report.deployed.len(),
                    failed = report.failed.len(),
                    "deployer started"
                );
                deployer
            })
            .collect();

        let realm = match self.load_realm() {
            Ok(realm) => realm,
            Err(e) => {
                self.release(connectors, deployers);
                return Err(e);
            }
        };

        info!(
            connectors = connectors.len(),
            deployers = deployers.len(),
            contexts = self.registry.len(),
            "server started"
        );
        *running = Some(Running {
            connectors,
            deployers,
            realm,
            _services: self.services.clone(),
        });
        Ok(StartOutcome::Started)
    }

    /// Stop everything. Returns `false` if the server was not running.
    pub fn stop(&self) -> bool {
        let Some(running) = self.lock_running().take() else {
            return false;
        };
        self.release(running.connectors, running.deployers);
        info!("server stopped");
        true
    }

    pub fn is_running(&self) -> bool {
        self.lock_running().is_some()
    }

    pub fn registry(&self) -> &Arc<ContextRegistry> {
        &self.registry
    }

    pub fn routing(&self) -> &Arc<RoutingChain> {
        &self.routing
    }

    pub fn services(&self) -> &HostServices {
        &self.services
    }

    /// Bound addresses of the running connectors, in plan order
    pub fn local_addrs(&self) -> Vec<SocketAddr> {
        self.lock_running()
            .as_ref()
            .map(|r| {
                r.connectors
                    .iter()
                    .filter_map(|c| c.local_addr().ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Check credentials against the realm. Always `false` when stopped.
    pub fn authenticate(&self, user: &str, password: &str) -> bool {
        self.lock_running()
            .as_ref()
            .is_some_and(|r| r.realm.authenticate(user, password))
    }

    /// Run one scan cycle on every deployer.
    pub fn scan_now(&self) -> Vec<ScanReport> {
        self.lock_running()
            .as_ref()
            .map(|r| r.deployers.iter().map(Deployer::scan_now).collect())
            .unwrap_or_default()
    }

    fn bind_connectors(&self) -> Result<Vec<Connector>, SupervisorError> {
        let mut bound = Vec::with_capacity(self.plan.connectors.len());
        for spec in &self.plan.connectors {
            let address = spec.address();
            match Connector::bind(spec.clone()) {
                Ok(connector) => {
                    info!(connector = %spec.name, address = %address, "connector bound");
                    bound.push(connector);
                }
                Err(source) => {
                    for connector in bound {
                        connector.close();
                    }
                    return Err(SupervisorError::Bind {
                        name: spec.name.clone(),
                        address,
                        source,
                    });
                }
            }
        }
        Ok(bound)
    }

    fn load_realm(&self) -> Result<Realm, SupervisorError> {
        let Some(plan) = &self.plan.realm else {
            return Ok(Realm::new("default"));
        };

        let mut realm = if plan.file.is_file() {
            load_realm(&plan.name, &plan.file)?
        } else {
            info!(file = %plan.file.display(), "no realm file, starting with an empty realm");
            Realm::new(&plan.name)
        };

        if let Some(password) = &plan.console_password {
            realm.put_with_roles(
                CONSOLE_USER,
                Password::parse(password),
                vec![CONSOLE_USER.to_string()],
            );
        }
        info!(realm = realm.name(), users = realm.len(), "realm loaded");
        Ok(realm)
    }

    fn release(&self, connectors: Vec<Connector>, deployers: Vec<Deployer>) {
        for deployer in &deployers {
            deployer.stop();
        }
        for connector in connectors {
            connector.close();
        }
        for context in self.registry.clear() {
            context.release();
        }
    }

    fn lock_running(&self) -> MutexGuard<'_, Option<Running>> {
        self.running.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for Supervisor {
    fn drop(&mut self) {
        self.stop();
    }
}
