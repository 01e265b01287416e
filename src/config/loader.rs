//! Configuration loading, discovery and environment overrides

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{SitedeckError, SitedeckResult};

use super::types::Config;
use super::ConfigWarning;

/// Configuration file inside the server home
pub const HOME_CONFIG_FILE: &str = "etc/sitedeck.toml";

/// Load configuration and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> SitedeckResult<(Config, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path)?;

    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(&content);

    let config: Config = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| SitedeckError::InvalidConfig {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            ConfigWarning {
                line: find_line_number(&content, &key),
                suggestion: suggest_key(&key),
                key,
                path: path_str,
                file: path.to_path_buf(),
            }
        })
        .collect();

    Ok((config, warnings))
}

/// Configuration files tried in order, most specific first
///
/// `home` is the server home if known before loading (CLI flag or
/// `SITEDECK_HOME`), otherwise the built-in default.
pub fn config_candidates(home: Option<&Path>) -> Vec<PathBuf> {
    let home = home
        .map(Path::to_path_buf)
        .unwrap_or_else(|| Config::default().server.home);
    let mut candidates = vec![home.join(HOME_CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("sitedeck").join("config.toml"));
    }
    candidates
}

pub(super) fn discover(
    explicit: Option<&Path>,
    home: Option<&Path>,
) -> SitedeckResult<(Config, Vec<ConfigWarning>)> {
    let (config, warnings) = match explicit {
        Some(path) => load_with_warnings(path)?,
        None => match config_candidates(home).into_iter().find(|p| p.is_file()) {
            Some(path) => {
                debug!(file = %path.display(), "loading configuration");
                load_with_warnings(&path)?
            }
            None => (Config::default(), Vec::new()),
        },
    };
    Ok((config.with_env_overrides(), warnings))
}

/// Apply `SITEDECK_*` overrides read through `lookup`.
///
/// Values that do not parse are ignored with a warning.
pub fn apply_env_overrides<F>(mut config: Config, lookup: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    // SITEDECK_HOME
    if let Some(home) = lookup("SITEDECK_HOME").filter(|h| !h.trim().is_empty()) {
        config.server.home = PathBuf::from(home.trim());
    }

    // SITEDECK_PORT
    if let Some(port) = lookup("SITEDECK_PORT") {
        match port.trim().parse::<u16>() {
            Ok(port) => config.server.port = port,
            Err(_) => warn!(value = %port, "ignoring SITEDECK_PORT, not a port number"),
        }
    }

    // SITEDECK_SCAN_INTERVAL (context deployer, seconds)
    if let Some(interval) = lookup("SITEDECK_SCAN_INTERVAL") {
        match interval.trim().parse::<u64>() {
            Ok(secs) => config.contexts.scan_interval = Some(secs),
            Err(_) => warn!(value = %interval, "ignoring SITEDECK_SCAN_INTERVAL, not a number of seconds"),
        }
    }

    // SITEDECK_ALLOW_DUPLICATES
    if let Some(val) = lookup("SITEDECK_ALLOW_DUPLICATES") {
        let allow = !matches!(val.trim().to_lowercase().as_str(), "false" | "0" | "no" | "");
        config.webapps.allow_duplicates = allow;
        config.contexts.allow_duplicates = allow;
    }

    config
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    for (i, line) in content.lines().enumerate() {
        if line.contains(needle) {
            return Some(i + 1);
        }
    }
    None
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "server",
        "home",
        "host",
        "port",
        "console_password",
        "server_info",
        "webapps",
        "contexts",
        "enabled",
        "dir",
        "scan_interval",
        "trigger",
        "defaults_descriptor",
        "allow_duplicates",
        "attributes",
        "classload",
        "lib_extensions",
        "realm",
        "name",
        "file",
    ];

    let mut best: Option<(&str, usize)> = None;
    for candidate in CANDIDATES {
        let dist = levenshtein(unknown, candidate);
        best = match best {
            None => Some((candidate, dist)),
            Some((_, best_dist)) if dist < best_dist => Some((candidate, dist)),
            Some(current) => Some(current),
        };
    }

    match best {
        Some((candidate, dist)) if dist <= 2 => Some(candidate.to_string()),
        _ => None,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut prev: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr = vec![0usize; b_bytes.len() + 1];

    for (i, &ac) in a_bytes.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &bc) in b_bytes.iter().enumerate() {
            let cost = if ac == bc { 0 } else { 1 };
            curr[j + 1] =
                std::cmp::min(std::cmp::min(prev[j + 1] + 1, curr[j] + 1), prev[j] + cost);
        }
        prev.clone_from_slice(&curr);
    }

    prev[b_bytes.len()]
}
