//! Property tests for classload composition.

use std::sync::Arc;

use proptest::prelude::*;

use crate::common::*;

use sitedeck::infrastructure::DigestCodeLoader;
use sitedeck::{ClassloadComposer, Identity};

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 48,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: N artifacts of which k fail yield N - k units and k rejections.
    #[test]
    fn property_failing_units_are_excluded(
        outcomes in proptest::collection::vec(any::<bool>(), 0..=10),
    ) {
        let mut home = TestHome::new();
        home.webapp("console", SERVLET_DESCRIPTOR);
        for (index, ok) in outcomes.iter().enumerate() {
            let bytes: &[u8] = if *ok { b"unit" } else { b"" };
            home.lib("console", &format!("unit{index:02}.dex"), bytes);
        }
        let failing = outcomes.iter().filter(|ok| !**ok).count();

        let composer = ClassloadComposer::new(Arc::new(DigestCodeLoader::new()));
        let context = composer.compose(
            &Identity::new("console"),
            &home.path().join("webapps/console"),
        );

        prop_assert_eq!(context.len(), outcomes.len() - failing);
        prop_assert_eq!(context.rejected().len(), failing);
        prop_assert_eq!(context.loaded_paths().len(), outcomes.len() - failing);

        // Units register in name order.
        let paths: Vec<_> = context.units().iter().map(|u| u.path().to_path_buf()).collect();
        let mut sorted = paths.clone();
        sorted.sort();
        prop_assert_eq!(paths, sorted);
    }

    /// PROPERTY: The application deploys whatever its libraries do.
    #[test]
    fn property_library_failures_never_block_deploy(
        outcomes in proptest::collection::vec(any::<bool>(), 1..=6),
    ) {
        let mut home = TestHome::new();
        home.webapp("console", SERVLET_DESCRIPTOR);
        for (index, ok) in outcomes.iter().enumerate() {
            let bytes: &[u8] = if *ok { b"unit" } else { b"" };
            home.lib("console", &format!("unit{index}.jar"), bytes);
        }

        let supervisor = home.supervisor(&home.config(), RecordingRouter::new());
        supervisor.start().unwrap();

        let console = supervisor.registry().find(&Identity::new("console"));
        prop_assert!(console.is_some());
        let registered = outcomes.iter().filter(|ok| **ok).count();
        prop_assert_eq!(console.unwrap().classloading().len(), registered);
    }
}
