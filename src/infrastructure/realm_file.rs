//! Properties-style realm file
//!
//! ```text
//! # comment
//! admin: secret, admin, user
//! ops = SHA256:5e88...d8, user
//! ```

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::domain::entities::{Password, Realm, RealmError};

/// Load a realm from `path`.
pub fn load_realm(name: &str, path: &Path) -> Result<Realm, RealmError> {
    let content = fs::read_to_string(path).map_err(|source| RealmError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let realm = parse_realm(name, path, &content)?;
    debug!(realm = name, users = realm.len(), file = %path.display(), "realm loaded");
    Ok(realm)
}

/// Parse realm file content. `path` is only used in errors.
pub fn parse_realm(name: &str, path: &Path, content: &str) -> Result<Realm, RealmError> {
    let mut realm = Realm::new(name);

    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }

        let malformed = || RealmError::Malformed {
            path: path.to_path_buf(),
            line: index + 1,
        };

        let split_at = line.find([':', '=']).ok_or_else(malformed)?;
        let user = line[..split_at].trim();
        let mut fields = line[split_at + 1..].split(',').map(str::trim);
        let password = fields.next().unwrap_or_default();
        if user.is_empty() || password.is_empty() {
            return Err(malformed());
        }

        let roles = fields
            .filter(|role| !role.is_empty())
            .map(str::to_string)
            .collect();
        realm.put_with_roles(user, Password::parse(password), roles);
    }

    Ok(realm)
}
