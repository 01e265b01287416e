//! Startup and shutdown of a whole server

use crate::common::*;

use sitedeck::{Identity, LifecycleState, Route, StartOutcome};

#[test]
fn missing_home_starts_with_zero_applications() {
    let home = TestHome::missing();
    let router = RecordingRouter::new();
    let supervisor = home.supervisor(&home.config(), router.clone());

    assert_eq!(supervisor.start().unwrap(), StartOutcome::Started);
    assert!(supervisor.is_running());
    assert!(supervisor.registry().is_empty());
    assert!(router.entries().is_empty());
    assert_eq!(supervisor.local_addrs().len(), 1);

    assert!(supervisor.stop());
}

#[test]
fn missing_webapps_directory_still_deploys_contexts() {
    let mut home = TestHome::new();
    std::fs::remove_dir_all(home.path().join("webapps")).unwrap();
    home.standalone_app("docs", SERVLET_DESCRIPTOR);
    home.context_file("docs", "war = \"apps/docs\"\ncontext_path = \"/manual\"\n");

    let supervisor = home.supervisor(&home.config(), RecordingRouter::new());
    supervisor.start().unwrap();

    let contexts = supervisor.registry().list();
    assert_eq!(contexts.len(), 1);
    assert_eq!(contexts[0].identity().as_str(), "docs");
    assert_eq!(contexts[0].context_path().as_str(), "/manual");
    assert_eq!(contexts[0].origin(), "contexts");
}

#[test]
fn start_publishes_both_roots_and_stop_withdraws_them() {
    let mut home = TestHome::new();
    home.webapp("console", SERVLET_DESCRIPTOR);
    home.lib("console", "app.dex", b"dex\n035");
    home.standalone_app("docs", SERVLET_DESCRIPTOR);
    home.context_file("docs", "war = \"apps/docs\"\n");

    let router = RecordingRouter::new();
    let supervisor = home.supervisor(&home.config(), router.clone());
    supervisor.start().unwrap();

    let contexts = supervisor.registry().list();
    let identities: Vec<&str> = contexts.iter().map(|c| c.identity().as_str()).collect();
    assert_eq!(identities, vec!["console", "docs"]);
    assert!(contexts.iter().all(|c| c.state() == LifecycleState::Live));
    assert_eq!(contexts[0].classloading().len(), 1);

    match supervisor.routing().route("/docs/index.html") {
        Route::Context(context) => assert_eq!(context.identity(), &Identity::new("docs")),
        Route::NotFound(page) => panic!("docs not routed: {}", page.body),
    }

    assert!(supervisor.stop());
    assert!(supervisor.registry().is_empty());
    assert!(contexts.iter().all(|c| c.classloading().is_released()));
    assert_eq!(
        router.entries(),
        vec![
            "install console",
            "install docs",
            "uninstall console",
            "uninstall docs"
        ]
    );
}

#[test]
fn restart_after_stop_redeploys() {
    let mut home = TestHome::new();
    home.webapp("console", SERVLET_DESCRIPTOR);
    let supervisor = home.supervisor(&home.config(), RecordingRouter::new());

    supervisor.start().unwrap();
    supervisor.stop();
    assert_eq!(supervisor.start().unwrap(), StartOutcome::Started);
    assert_eq!(supervisor.registry().len(), 1);
}

#[test]
fn realm_file_and_console_password_authenticate() {
    let home = TestHome::new();
    home.etc_file("realm.properties", REALM_FILE);
    let mut config = home.config();
    config.server.console_password = Some("letmein".to_string());

    let supervisor = home.supervisor(&config, RecordingRouter::new());
    supervisor.start().unwrap();

    assert!(supervisor.authenticate("operator", "changeit"));
    assert!(supervisor.authenticate("admin", "letmein"));
    assert!(!supervisor.authenticate("admin", "changeit"));

    supervisor.stop();
    assert!(!supervisor.authenticate("operator", "changeit"));
}

#[test]
fn occupied_port_fails_start_cleanly() {
    let mut home = TestHome::new();
    home.webapp("console", SERVLET_DESCRIPTOR);
    let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let mut config = home.config();
    config.server.port = taken.local_addr().unwrap().port();

    let router = RecordingRouter::new();
    let supervisor = home.supervisor(&config, router.clone());

    assert!(supervisor.start().is_err());
    assert!(!supervisor.is_running());
    assert!(supervisor.registry().is_empty());
    assert!(router.entries().is_empty());
}
