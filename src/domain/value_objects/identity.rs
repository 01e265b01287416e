//! Identity and context-path value objects
//!
//! An `Identity` names a deployable application; it is derived from the bundle's
//! filesystem name. A `ContextPath` is the URL prefix a context is routed under.

use std::fmt;

use serde::Serialize;

/// Identity of a deployable application
///
/// Webapp bundles use their directory name, context descriptors their file stem.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Identities named `root` (any case) are served at `/`.
    pub fn is_root(&self) -> bool {
        self.0.eq_ignore_ascii_case("root")
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// URL prefix under which a context is routed
///
/// Always starts with `/` and never ends with one, except for the root path `/`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ContextPath(String);

impl ContextPath {
    /// The root context path `/`
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Parse and normalize a context path.
    ///
    /// A missing leading slash is added and trailing slashes are dropped.
    /// Returns `None` for paths with whitespace, query/fragment markers or
    /// `.`/`..` segments.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.chars().any(|c| c.is_whitespace() || c == '?' || c == '#') {
            return None;
        }

        let segments: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();
        if segments.iter().any(|s| *s == "." || *s == "..") {
            return None;
        }

        if segments.is_empty() {
            return Some(Self::root());
        }
        Some(Self(format!("/{}", segments.join("/"))))
    }

    /// Default context path for an application identity.
    pub fn for_identity(identity: &Identity) -> Self {
        if identity.is_root() {
            return Self::root();
        }
        Self::parse(identity.as_str()).unwrap_or_else(|| Self(format!("/{}", identity)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Check whether a request path falls under this context.
    pub fn matches(&self, request_path: &str) -> bool {
        if self.is_root() {
            return true;
        }
        match request_path.strip_prefix(self.0.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'),
            None => false,
        }
    }

    /// Number of path segments, used to prefer the most specific context.
    pub fn depth(&self) -> usize {
        self.0.split('/').filter(|s| !s.is_empty()).count()
    }
}

impl fmt::Display for ContextPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
