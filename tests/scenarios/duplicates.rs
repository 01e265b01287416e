//! One identity offered by both deployers

use crate::common::*;

use sitedeck::{Identity, Route};

fn home_with_duplicate() -> TestHome {
    let mut home = TestHome::new();
    home.webapp("console", SERVLET_DESCRIPTOR);
    home.standalone_app("console", SERVLET_DESCRIPTOR);
    home.context_file("console", "war = \"apps/console\"\n");
    home
}

#[test]
fn second_deployer_is_rejected_by_default() {
    let home = home_with_duplicate();
    let router = RecordingRouter::new();
    let supervisor = home.supervisor(&home.config(), router.clone());
    supervisor.start().unwrap();

    let live = supervisor.registry().list();
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].origin(), "webapps");
    assert_eq!(router.entries(), vec!["install console"]);

    // The rejection sticks until the context file changes.
    let reports = supervisor.scan_now();
    assert!(reports.iter().all(|r| r.rejected.is_empty()));
    assert_eq!(supervisor.registry().len(), 1);
}

#[test]
fn allowed_duplicates_are_both_live() {
    let home = home_with_duplicate();
    let mut config = home.config();
    config.contexts.allow_duplicates = true;
    let supervisor = home.supervisor(&config, RecordingRouter::new());
    supervisor.start().unwrap();

    let origins: Vec<String> = supervisor
        .registry()
        .list()
        .iter()
        .map(|c| c.origin().to_string())
        .collect();
    assert_eq!(origins, vec!["webapps", "contexts"]);

    // Equal context paths: the earlier registration serves.
    match supervisor.routing().route("/console") {
        Route::Context(context) => assert_eq!(context.origin(), "webapps"),
        Route::NotFound(page) => panic!("console not routed: {}", page.body),
    }

    assert_eq!(supervisor.registry().remove(&Identity::new("console")).len(), 2);
}
