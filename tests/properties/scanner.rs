//! Property tests for scan cycles.

use std::collections::BTreeSet;
use std::sync::Arc;

use proptest::prelude::*;

use crate::common::*;

use sitedeck::{BundleKind, ContextBuilder, ContextRegistry, Deployer, RequestRouter};

fn app_names() -> impl Strategy<Value = BTreeSet<String>> {
    proptest::collection::btree_set("[a-z][a-z0-9]{0,7}", 0..=6)
}

fn deployer(home: &TestHome, registry: Arc<ContextRegistry>) -> Deployer {
    let config = home.config();
    let services = config.host_services();
    Deployer::new(
        ContextBuilder::new(
            services.composer(),
            config.deployer_config(BundleKind::Webapp),
            services.attributes().clone(),
        ),
        registry,
    )
}

fn live_identities(registry: &ContextRegistry) -> BTreeSet<String> {
    registry
        .list()
        .iter()
        .map(|c| c.identity().to_string())
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 24,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: A second scan of an unchanged root mutates nothing.
    #[test]
    fn property_rescan_of_unchanged_root_is_idempotent(names in app_names()) {
        let mut home = TestHome::new();
        for name in &names {
            home.webapp(name, SERVLET_DESCRIPTOR);
        }
        let router = RecordingRouter::new();
        let registry = Arc::new(ContextRegistry::with_router(router.clone() as Arc<dyn RequestRouter>));
        let deployer = deployer(&home, registry.clone());

        let first = deployer.scan_now();
        prop_assert_eq!(first.deployed.len(), names.len());
        let mutations = router.mutations();
        let snapshot = registry.snapshot();

        let second = deployer.scan_now();
        prop_assert!(!second.has_changes());
        prop_assert_eq!(second.unchanged, names.len());
        prop_assert_eq!(router.mutations(), mutations);
        prop_assert!(Arc::ptr_eq(&snapshot, &registry.snapshot()));
    }

    /// PROPERTY: After every cycle the live identities equal the scanned bundles.
    #[test]
    fn property_registry_mirrors_scanned_bundles(
        before in app_names(),
        after in app_names(),
    ) {
        let mut home = TestHome::new();
        for name in &before {
            home.webapp(name, SERVLET_DESCRIPTOR);
        }
        let registry = Arc::new(ContextRegistry::new());
        let deployer = deployer(&home, registry.clone());

        deployer.scan_now();
        prop_assert_eq!(&live_identities(&registry), &before);

        for gone in before.difference(&after) {
            home.remove_webapp(gone);
        }
        for name in after.difference(&before) {
            home.webapp(name, SERVLET_DESCRIPTOR);
        }

        let report = deployer.scan_now();
        prop_assert_eq!(&live_identities(&registry), &after);
        prop_assert_eq!(report.undeployed.len(), before.difference(&after).count());
        prop_assert_eq!(report.deployed.len(), after.difference(&before).count());
    }
}
