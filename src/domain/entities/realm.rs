//! Realm - credential store for administrative authentication
//!
//! Loaded once at supervisor start; there is no refresh.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RealmError {
    #[error("failed to read realm file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}:{line}: malformed realm entry")]
    Malformed { path: PathBuf, line: usize },
}

/// Stored password
#[derive(Clone, PartialEq, Eq)]
pub enum Password {
    Plain(String),
    /// Lowercase hex SHA-256 digest
    Sha256(String),
}

impl Password {
    /// Parse a stored credential; `SHA256:<hex>` is a digest, anything else is plain.
    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix("SHA256:") {
            Some(hex) => Password::Sha256(hex.trim().to_ascii_lowercase()),
            None => Password::Plain(raw.to_string()),
        }
    }

    pub fn verify(&self, candidate: &str) -> bool {
        match self {
            Password::Plain(expected) => expected == candidate,
            Password::Sha256(expected) => {
                let digest = format!("{:x}", Sha256::digest(candidate.as_bytes()));
                *expected == digest
            }
        }
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Password::Plain(_) => f.write_str("Plain(***)"),
            Password::Sha256(_) => f.write_str("Sha256(***)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Credential {
    password: Password,
    roles: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Realm {
    name: String,
    users: BTreeMap<String, Credential>,
}

impl Realm {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            users: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add or replace a user without roles.
    pub fn put(&mut self, user: impl Into<String>, password: Password) {
        self.put_with_roles(user, password, Vec::new());
    }

    pub fn put_with_roles(&mut self, user: impl Into<String>, password: Password, roles: Vec<String>) {
        self.users
            .insert(user.into(), Credential { password, roles });
    }

    pub fn authenticate(&self, user: &str, password: &str) -> bool {
        self.users
            .get(user)
            .is_some_and(|c| c.password.verify(password))
    }

    pub fn roles(&self, user: &str) -> &[String] {
        self.users
            .get(user)
            .map(|c| c.roles.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_user_in_role(&self, user: &str, role: &str) -> bool {
        self.roles(user).iter().any(|r| r == role)
    }

    pub fn contains(&self, user: &str) -> bool {
        self.users.contains_key(user)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Realms never reload.
    pub fn refresh_interval(&self) -> Duration {
        Duration::ZERO
    }
}
