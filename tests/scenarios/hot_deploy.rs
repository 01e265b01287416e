//! Rescans against a running server

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::common::*;

use sitedeck::{
    BundleKind, ContextBuilder, ContextRegistry, Deployer, Identity, LifecycleState, Route,
};

fn webapps_report(reports: &[sitedeck::ScanReport]) -> &sitedeck::ScanReport {
    reports.iter().find(|r| r.deployer == "webapps").unwrap()
}

#[test]
fn failed_update_keeps_previous_context_live() {
    let mut home = TestHome::new();
    home.webapp("console", SERVLET_DESCRIPTOR);
    let supervisor = home.supervisor(&home.config(), RecordingRouter::new());
    supervisor.start().unwrap();
    let original = supervisor.registry().find(&Identity::new("console")).unwrap();

    home.webapp("console", INVALID_DESCRIPTOR);
    let reports = supervisor.scan_now();
    let report = webapps_report(&reports);

    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].retained);
    let live = supervisor.registry().find(&Identity::new("console")).unwrap();
    assert!(Arc::ptr_eq(&live, &original));
    assert_eq!(live.state(), LifecycleState::Live);
    assert!(!live.classloading().is_released());
    assert!(matches!(supervisor.routing().route("/console"), Route::Context(_)));

    // The broken timestamp is remembered; nothing is retried until it changes.
    let reports = supervisor.scan_now();
    assert!(webapps_report(&reports).failed.is_empty());
}

#[test]
fn changed_bundle_is_swapped_in() {
    let mut home = TestHome::new();
    home.webapp("console", SERVLET_DESCRIPTOR);
    let router = RecordingRouter::new();
    let supervisor = home.supervisor(&home.config(), router.clone());
    supervisor.start().unwrap();
    let original = supervisor.registry().find(&Identity::new("console")).unwrap();

    home.lib("console", "plugin.dex", b"plugin");
    let reports = supervisor.scan_now();

    assert_eq!(webapps_report(&reports).updated, vec![Identity::new("console")]);
    let live = supervisor.registry().find(&Identity::new("console")).unwrap();
    assert!(!Arc::ptr_eq(&live, &original));
    assert_eq!(live.classloading().len(), 1);
    assert!(original.classloading().is_released());
    assert_eq!(original.state(), LifecycleState::Absent);
    assert_eq!(
        router.entries(),
        vec!["install console", "uninstall console", "install console"]
    );
}

#[test]
fn removed_bundle_is_no_longer_routed() {
    let mut home = TestHome::new();
    home.webapp("console", SERVLET_DESCRIPTOR);
    home.webapp("docs", SERVLET_DESCRIPTOR);
    let router = RecordingRouter::new();
    let supervisor = home.supervisor(&home.config(), router.clone());
    supervisor.start().unwrap();
    let docs = supervisor.registry().find(&Identity::new("docs")).unwrap();

    home.remove_webapp("docs");
    let reports = supervisor.scan_now();

    assert_eq!(webapps_report(&reports).undeployed, vec![Identity::new("docs")]);
    assert_eq!(docs.state(), LifecycleState::Absent);
    assert!(docs.classloading().is_released());
    assert!(supervisor.registry().find(&Identity::new("docs")).is_none());
    assert!(matches!(supervisor.routing().route("/docs/"), Route::NotFound(_)));
    assert!(router.entries().contains(&"uninstall docs".to_string()));
}

#[test]
fn unusable_libraries_are_left_out() {
    let mut home = TestHome::new();
    home.webapp("console", SERVLET_DESCRIPTOR);
    home.lib("console", "a.dex", b"first");
    home.lib("console", "b.dex", b"");
    home.lib("console", "notes.txt", b"readme");
    home.lib("console", "c.jar", b"third");

    let supervisor = home.supervisor(&home.config(), RecordingRouter::new());
    supervisor.start().unwrap();

    let console = supervisor.registry().find(&Identity::new("console")).unwrap();
    let classloading = console.classloading();
    assert_eq!(classloading.len(), 2);
    assert_eq!(classloading.rejected().len(), 2);
    assert_eq!(classloading.loaded_paths().len(), 2);
}

#[test]
fn zero_interval_scans_exactly_once() {
    let mut home = TestHome::new();
    home.webapp("console", SERVLET_DESCRIPTOR);
    let config = home.config();
    let services = config.host_services();

    let deployer = Deployer::new(
        ContextBuilder::new(
            services.composer(),
            config.deployer_config(BundleKind::Webapp),
            services.attributes().clone(),
        ),
        Arc::new(ContextRegistry::new()),
    );
    deployer.start();
    home.webapp("late", SERVLET_DESCRIPTOR);
    thread::sleep(Duration::from_millis(250));

    assert!(!deployer.is_scheduled());
    assert_eq!(deployer.scan_count(), 1);
    assert_eq!(deployer.state_of(&Identity::new("late")), LifecycleState::Absent);
    assert_eq!(deployer.contexts().len(), 1);
}

#[test]
fn short_interval_picks_up_new_bundles() {
    let mut home = TestHome::new();
    let mut config = home.config();
    config.webapps.scan_interval = Some(1);
    let supervisor = home.supervisor(&config, RecordingRouter::new());
    supervisor.start().unwrap();
    assert!(supervisor.registry().is_empty());

    home.webapp("late", SERVLET_DESCRIPTOR);
    let deadline = std::time::Instant::now() + Duration::from_secs(10);
    while supervisor.registry().is_empty() && std::time::Instant::now() < deadline {
        thread::sleep(Duration::from_millis(50));
    }

    assert!(supervisor.registry().find(&Identity::new("late")).is_some());
    supervisor.stop();
}
