//! Tests for the config module

use super::types::*;
use super::{apply_env_overrides, config_candidates, HOME_CONFIG_FILE};
use crate::application::ScanTrigger;
use crate::domain::entities::BundleKind;
use crate::error::SitedeckError;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::tempdir;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn test_config_default() {
    let config = Config::default();

    assert_eq!(config.server.home, PathBuf::from("/sdcard/jetty"));
    assert_eq!(config.server.port, 8080);
    assert!(config.webapps.enabled);
    assert!(config.contexts.enabled);
    assert_eq!(config.classload.lib_extensions, vec!["dex", "jar"]);
    assert_eq!(config.realm.name, "Console");
}

#[test]
fn test_default_deployers_follow_device_layout() {
    let config = Config::default();
    let deployers = config.deployer_configs();

    assert_eq!(deployers.len(), 2);
    let webapps = &deployers[0];
    assert_eq!(webapps.kind, BundleKind::Webapp);
    assert_eq!(webapps.scan_root, Path::new("/sdcard/jetty/webapps"));
    assert_eq!(webapps.scan_interval, Duration::ZERO);
    assert_eq!(
        webapps.defaults_descriptor.as_deref(),
        Some(Path::new("/sdcard/jetty/etc/webdefault.toml"))
    );

    let contexts = &deployers[1];
    assert_eq!(contexts.kind, BundleKind::ContextFile);
    assert_eq!(contexts.scan_root, Path::new("/sdcard/jetty/contexts"));
    assert_eq!(contexts.scan_interval, Duration::from_secs(10));
    assert!(!contexts.allow_duplicates);
}

#[test]
fn test_config_parse_toml() {
    let toml = r#"
[server]
home = "/data/www"
port = 9090
console_password = "hunter2"

[webapps]
dir = "apps"
scan_interval = 5
trigger = "watch"
defaults_descriptor = ""

[webapps.attributes]
"org.example.theme" = "dark"

[contexts]
enabled = false

[classload]
lib_extensions = ["dex"]
"#;

    let config: Config = toml::from_str(toml).unwrap();
    assert_eq!(config.server.port, 9090);
    assert_eq!(config.server.host, "0.0.0.0");

    let deployers = config.deployer_configs();
    assert_eq!(deployers.len(), 1);
    let webapps = &deployers[0];
    assert_eq!(webapps.scan_root, Path::new("/data/www/apps"));
    assert_eq!(webapps.scan_interval, Duration::from_secs(5));
    assert_eq!(webapps.trigger, ScanTrigger::Watch);
    assert!(webapps.defaults_descriptor.is_none());
    assert_eq!(webapps.attributes["org.example.theme"], "dark");
    assert_eq!(webapps.home, Path::new("/data/www"));

    // Disabled sections still resolve on request.
    let contexts = config.deployer_config(BundleKind::ContextFile);
    assert_eq!(contexts.scan_root, Path::new("/data/www/contexts"));
}

#[test]
fn test_server_plan_and_realm() {
    let mut config = Config::default();
    config.server.home = PathBuf::from("/srv/deck");
    config.server.host = "127.0.0.1".to_string();
    config.server.console_password = Some("pw".to_string());

    let plan = config.server_plan();
    assert_eq!(plan.connectors.len(), 1);
    assert_eq!(plan.connectors[0].address(), "127.0.0.1:8080");
    assert_eq!(plan.deployers.len(), 2);

    let realm = plan.realm.unwrap();
    assert_eq!(realm.name, "Console");
    assert_eq!(realm.file, Path::new("/srv/deck/etc/realm.properties"));
    assert_eq!(realm.console_password.as_deref(), Some("pw"));
}

#[test]
fn test_host_services_server_info() {
    let mut config = Config::default();
    assert!(config.host_services().server_info().starts_with("sitedeck/"));

    config.server.server_info = Some("kiosk".to_string());
    let services = config.host_services();
    assert_eq!(services.server_info(), "kiosk");
    assert_eq!(services.home(), Path::new("/sdcard/jetty"));
}

#[test]
fn test_invalid_trigger_is_a_config_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sitedeck.toml");
    fs::write(&path, "[webapps]\ntrigger = \"inotify\"\n").unwrap();

    let err = Config::load(&path).unwrap_err();
    assert!(matches!(err, SitedeckError::InvalidConfig { ref file, .. } if file == &path));
}

#[test]
fn test_env_overrides() {
    let config = apply_env_overrides(
        Config::default(),
        env(&[
            ("SITEDECK_HOME", "/mnt/deck"),
            ("SITEDECK_PORT", "8181"),
            ("SITEDECK_SCAN_INTERVAL", "30"),
            ("SITEDECK_ALLOW_DUPLICATES", "true"),
        ]),
    );

    assert_eq!(config.home(), Path::new("/mnt/deck"));
    assert_eq!(config.server.port, 8181);
    assert_eq!(config.contexts.scan_interval, Some(30));
    assert!(config.webapps.allow_duplicates);
    assert!(config.contexts.allow_duplicates);
}

#[test]
fn test_env_overrides_ignore_garbage() {
    let config = apply_env_overrides(
        Config::default(),
        env(&[
            ("SITEDECK_PORT", "eighty"),
            ("SITEDECK_SCAN_INTERVAL", "-1"),
            ("SITEDECK_ALLOW_DUPLICATES", "0"),
        ]),
    );

    assert_eq!(config, Config::default());
}

#[test]
fn test_discover_prefers_explicit_then_home() {
    let home = tempdir().unwrap();
    fs::create_dir_all(home.path().join("etc")).unwrap();
    fs::write(home.path().join(HOME_CONFIG_FILE), "[server]\nport = 7070\n").unwrap();

    let explicit = home.path().join("other.toml");
    fs::write(&explicit, "[server]\nport = 6060\n").unwrap();

    assert_eq!(config_candidates(Some(home.path()))[0], home.path().join(HOME_CONFIG_FILE));

    let (config, _) = Config::discover(None, Some(home.path())).unwrap();
    assert_eq!(config.server.port, 7070);

    let (config, _) = Config::discover(Some(&explicit), Some(home.path())).unwrap();
    assert_eq!(config.server.port, 6060);

    assert!(Config::discover(Some(&home.path().join("missing.toml")), None).is_err());
}

#[test]
fn test_config_load_with_warnings_reports_unknown_key_with_suggestion() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sitedeck.toml");

    fs::write(&path, "[webapps]\nscan_intervall = 5\n").unwrap();

    let (config, warnings) = Config::load_with_warnings(&path).unwrap();
    assert_eq!(config.webapps.scan_interval, None);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].key, "scan_intervall");
    assert_eq!(warnings[0].path, "webapps.scan_intervall");
    assert_eq!(warnings[0].line, Some(2));
    assert_eq!(warnings[0].suggestion, Some("scan_interval".to_string()));
    assert!(warnings[0]
        .to_string()
        .ends_with(":2 (did you mean 'scan_interval'?)"));
}
