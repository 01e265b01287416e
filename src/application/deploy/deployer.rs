//! Deployer
//!
//! Owns the identity -> live context mapping for one scan root. Every scan
//! cycle diffs the scanner's bundle set against what is tracked:
//!
//! 1. Tracked identities missing from the scan are undeployed
//! 2. New bundles are built and published
//! 3. Bundles with a changed timestamp are rebuilt; the replacement is swapped
//!    in atomically, or the old context keeps serving if the rebuild fails
//!
//! A failed timestamp is remembered, so a broken bundle is not rebuilt on every
//! cycle, only once it changes again.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use tracing::{error, info, info_span, warn};

use crate::application::pipeline::ContextBuilder;
use crate::application::registry::{ContextRegistry, RegistryError};
use crate::application::scan::{BundleScanner, ScanOutcome};
use crate::application::schedule::{ScanSchedule, ScheduleHandle};
use crate::domain::entities::{ApplicationContext, Bundle};
use crate::domain::ports::{DeployEvent, DeployEventSink, NoopEventSink};
use crate::domain::value_objects::{Identity, LifecycleState};

use super::options::DeployerConfig;
use super::report::{FailedBundle, ScanReport};

/// What the deployer remembers about one identity
struct Tracked {
    /// Bundle as last attempted; its timestamp is the one compared next cycle
    bundle: Bundle,
    /// Live context, `None` after a failed or rejected deploy
    context: Option<Arc<ApplicationContext>>,
}

struct DeployerCore {
    scanner: BundleScanner,
    builder: ContextBuilder,
    registry: Arc<ContextRegistry>,
    events: RwLock<Arc<dyn DeployEventSink>>,
    /// Also serializes scan cycles
    tracked: Mutex<BTreeMap<Identity, Tracked>>,
    scans: AtomicUsize,
}

pub struct Deployer {
    core: Arc<DeployerCore>,
    schedule: Mutex<Option<ScheduleHandle>>,
}

impl Deployer {
    pub fn new(builder: ContextBuilder, registry: Arc<ContextRegistry>) -> Self {
        let config = builder.config();
        let scanner = BundleScanner::new(&config.scan_root, config.kind);
        Self {
            core: Arc::new(DeployerCore {
                scanner,
                builder,
                registry,
                events: RwLock::new(Arc::new(NoopEventSink)),
                tracked: Mutex::new(BTreeMap::new()),
                scans: AtomicUsize::new(0),
            }),
            schedule: Mutex::new(None),
        }
    }

    pub fn with_event_sink(self, sink: Arc<dyn DeployEventSink>) -> Self {
        self.set_event_sink(sink);
        self
    }

    pub fn set_event_sink(&self, sink: Arc<dyn DeployEventSink>) {
        *self.core.events.write().unwrap_or_else(|e| e.into_inner()) = sink;
    }

    pub fn name(&self) -> &str {
        &self.config().name
    }

    pub fn config(&self) -> &DeployerConfig {
        self.core.builder.config()
    }

    /// Run the initial scan, then arm the rescan schedule (if the interval is non-zero).
    ///
    /// Starting an already scheduled deployer only runs a scan.
    pub fn start(&self) -> ScanReport {
        let report = self.core.scan_cycle();

        let mut schedule = self.lock_schedule();
        if schedule.is_none() {
            let config = self.config();
            let plan = ScanSchedule::new(config.trigger, config.scan_interval, &config.scan_root);
            let core = Arc::clone(&self.core);
            match plan.spawn(&config.name, move || {
                core.scan_cycle();
            }) {
                Ok(handle) => *schedule = handle,
                Err(e) => warn!(deployer = %config.name, error = %e, "could not start scan schedule"),
            }
        }
        report
    }

    /// Halt the schedule (waiting for a scan in progress) and undeploy every
    /// context this deployer owns.
    pub fn stop(&self) {
        let handle = self.lock_schedule().take();
        if let Some(handle) = handle {
            handle.stop();
        }
        self.core.undeploy_all();
    }

    /// Run one scan cycle now.
    pub fn scan_now(&self) -> ScanReport {
        self.core.scan_cycle()
    }

    /// Whether a background schedule is running
    pub fn is_scheduled(&self) -> bool {
        self.lock_schedule().is_some()
    }

    /// Completed scan cycles since creation
    pub fn scan_count(&self) -> usize {
        self.core.scans.load(Ordering::SeqCst)
    }

    pub fn state_of(&self, identity: &Identity) -> LifecycleState {
        self.core
            .lock_tracked()
            .get(identity)
            .and_then(|t| t.context.as_ref())
            .map(|c| c.state())
            .unwrap_or_default()
    }

    /// Contexts this deployer currently has live
    pub fn contexts(&self) -> Vec<Arc<ApplicationContext>> {
        self.core
            .lock_tracked()
            .values()
            .filter_map(|t| t.context.clone())
            .collect()
    }

    fn lock_schedule(&self) -> MutexGuard<'_, Option<ScheduleHandle>> {
        self.schedule.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for Deployer {
    fn drop(&mut self) {
        if let Some(handle) = self.lock_schedule().take() {
            handle.stop();
        }
    }
}

impl DeployerCore {
    fn name(&self) -> &str {
        &self.builder.config().name
    }

    fn lock_tracked(&self) -> MutexGuard<'_, BTreeMap<Identity, Tracked>> {
        self.tracked.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn emit(&self, event: DeployEvent) {
        let sink = self
            .events
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        let always = matches!(
            event,
            DeployEvent::ScanCompleted { .. } | DeployEvent::DeployFailed { .. }
        );
        if always || sink.wants_detailed_events() {
            sink.on_event(event);
        }
    }

    fn scan_cycle(&self) -> ScanReport {
        let mut tracked = self.lock_tracked();
        let _span = info_span!("scan", deployer = %self.name()).entered();
        let mut report = ScanReport::new(self.name());

        self.emit(DeployEvent::ScanStarted {
            deployer: self.name().to_string(),
            root: self.scanner.root().to_path_buf(),
        });

        let bundles = match self.scanner.try_scan() {
            Ok(ScanOutcome::Found(bundles)) => bundles,
            Ok(ScanOutcome::RootMissing { first_notice }) => {
                if first_notice {
                    self.emit(DeployEvent::RootMissing {
                        deployer: self.name().to_string(),
                        root: self.scanner.root().to_path_buf(),
                    });
                }
                Default::default()
            }
            Err(e) => {
                // Treating an unreadable root as empty would undeploy everything.
                warn!(root = %self.scanner.root().display(), error = %e, "scan root unreadable, skipping cycle");
                report.skipped = true;
                self.finish_cycle(&report);
                return report;
            }
        };
        report.bundles = bundles.len();

        let gone: Vec<Identity> = tracked
            .keys()
            .filter(|identity| !bundles.contains(identity))
            .cloned()
            .collect();
        for identity in gone {
            if let Some(Tracked {
                context: Some(context),
                ..
            }) = tracked.remove(&identity)
            {
                self.undeploy(&context);
                report.undeployed.push(identity);
            }
        }

        for bundle in bundles.iter() {
            let identity = bundle.identity();
            match tracked.get_mut(identity) {
                None => {
                    let entry = self.deploy(bundle, &mut report);
                    tracked.insert(identity.clone(), entry);
                }
                Some(entry) if entry.bundle.modified() == bundle.modified() => {
                    report.unchanged += 1;
                }
                Some(entry) => match entry.context.clone() {
                    Some(old) => self.update(entry, old, bundle, &mut report),
                    None => *entry = self.deploy(bundle, &mut report),
                },
            }
        }

        self.finish_cycle(&report);
        report
    }

    fn finish_cycle(&self, report: &ScanReport) {
        self.scans.fetch_add(1, Ordering::SeqCst);
        self.emit(DeployEvent::ScanCompleted {
            deployer: self.name().to_string(),
            bundles: report.bundles,
            deployed: report.deployed.len(),
            updated: report.updated.len(),
            undeployed: report.undeployed.len(),
            failed: report.failed.len(),
        });
    }

    /// `Absent -> Deploying -> Live`, or back to `Absent` on failure
    fn deploy(&self, bundle: &Bundle, report: &mut ScanReport) -> Tracked {
        let identity = bundle.identity();
        let untracked = || Tracked {
            bundle: bundle.clone(),
            context: None,
        };

        if !self.builder.config().allow_duplicates {
            if let Some(existing) = self.registry.find(identity) {
                self.reject_duplicate(identity, existing.origin(), report);
                return untracked();
            }
        }

        let context = match self.builder.build(bundle) {
            Ok(context) => Arc::new(context),
            Err(e) => {
                self.fail(identity, e.to_string(), false, report);
                return untracked();
            }
        };

        match self.registry.add(Arc::clone(&context)) {
            Ok(()) => {
                info!(app = %identity, path = %context.context_path(), units = context.classloading().len(), "deployed");
                self.emit(DeployEvent::Deployed {
                    deployer: self.name().to_string(),
                    identity: identity.clone(),
                    context_path: context.context_path().clone(),
                    units: context.classloading().len(),
                    rejected_units: context.classloading().rejected().len(),
                });
                report.deployed.push(identity.clone());
                Tracked {
                    bundle: bundle.clone(),
                    context: Some(context),
                }
            }
            Err(e) => {
                context.release();
                context.set_state(LifecycleState::Absent);
                match e {
                    RegistryError::Duplicate { owner, .. } => {
                        self.reject_duplicate(identity, &owner, report)
                    }
                    other => self.fail(identity, other.to_string(), false, report),
                }
                untracked()
            }
        }
    }

    /// `Live -> Updating -> Live`. On failure the old context stays registered.
    fn update(
        &self,
        entry: &mut Tracked,
        old: Arc<ApplicationContext>,
        bundle: &Bundle,
        report: &mut ScanReport,
    ) {
        let identity = bundle.identity();
        old.set_state(LifecycleState::Updating);
        entry.bundle = bundle.clone();

        let replacement = match self.builder.build(bundle) {
            Ok(context) => Arc::new(context),
            Err(e) => {
                old.set_state(LifecycleState::Live);
                self.fail(identity, e.to_string(), true, report);
                return;
            }
        };

        if let Err(e) = self.registry.replace(&old, Arc::clone(&replacement)) {
            replacement.release();
            replacement.set_state(LifecycleState::Absent);
            old.set_state(LifecycleState::Live);
            self.fail(identity, e.to_string(), true, report);
            return;
        }

        old.set_state(LifecycleState::Undeploying);
        old.release();
        old.set_state(LifecycleState::Absent);
        entry.context = Some(Arc::clone(&replacement));

        info!(app = %identity, path = %replacement.context_path(), "updated");
        self.emit(DeployEvent::Updated {
            deployer: self.name().to_string(),
            identity: identity.clone(),
            context_path: replacement.context_path().clone(),
        });
        report.updated.push(identity.clone());
    }

    /// `Live -> Undeploying -> Absent`
    fn undeploy(&self, context: &Arc<ApplicationContext>) {
        context.set_state(LifecycleState::Undeploying);
        self.registry.remove_context(context);
        context.release();
        context.set_state(LifecycleState::Absent);

        info!(app = %context.identity(), "undeployed");
        self.emit(DeployEvent::Undeployed {
            deployer: self.name().to_string(),
            identity: context.identity().clone(),
        });
    }

    fn undeploy_all(&self) {
        let mut tracked = self.lock_tracked();
        for (_, entry) in std::mem::take(&mut *tracked) {
            if let Some(context) = entry.context {
                self.undeploy(&context);
            }
        }
    }

    fn fail(&self, identity: &Identity, error: String, retained: bool, report: &mut ScanReport) {
        error!(app = %identity, retained, "deploy failed: {error}");
        self.emit(DeployEvent::DeployFailed {
            deployer: self.name().to_string(),
            identity: identity.clone(),
            error: error.clone(),
            retained,
        });
        report.failed.push(FailedBundle {
            identity: identity.clone(),
            error,
            retained,
        });
    }

    fn reject_duplicate(&self, identity: &Identity, owner: &str, report: &mut ScanReport) {
        warn!(app = %identity, owner, "identity already live, skipping bundle");
        self.emit(DeployEvent::DuplicateRejected {
            deployer: self.name().to_string(),
            identity: identity.clone(),
            owner: owner.to_string(),
        });
        report.rejected.push(identity.clone());
    }
}
