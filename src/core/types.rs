//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`RefName`] - Validated branch or tag name
//! - [`CommitId`] - Commit identifier (allocated or supplied)
//! - [`UtcTimestamp`] - RFC3339 timestamp
//!
//! # Validation
//!
//! These types enforce validity at construction time. A name that would
//! collide with revision syntax (`HEAD~2`, `main^`) cannot be represented,
//! so the resolver never has to guess which reading was meant.
//!
//! # Examples
//!
//! ```
//! use gitsketch::core::types::{CommitId, RefName};
//!
//! let branch = RefName::new("feature/login").unwrap();
//! let id = CommitId::new("e137e9b").unwrap();
//! assert_eq!(id.short(4), "e137");
//!
//! assert!(RefName::new("bad..name").is_err());
//! assert!(CommitId::new("has space").is_err());
//! # let _ = branch;
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum TypeError {
    #[error("invalid ref name: {0}")]
    InvalidRefName(String),

    #[error("invalid commit id: {0}")]
    InvalidCommitId(String),
}

/// A validated branch or tag name.
///
/// Names follow the rules of `git check-ref-format --branch`:
/// - Cannot be empty or exactly `@` / `HEAD`
/// - Cannot start with `.` or `-`
/// - Cannot end with `.lock` or `/`
/// - Cannot contain `..`, `@{`, `//`, or ASCII control characters
/// - Cannot contain spaces, `~`, `^`, `:`, `\`, `?`, `*`, `[`
///
/// Names are case-sensitive.
///
/// # Example
///
/// ```
/// use gitsketch::core::types::RefName;
///
/// let name = RefName::new("origin/main").unwrap();
/// assert_eq!(name.strip_remote("origin"), Some("main"));
///
/// assert!(RefName::new("").is_err());
/// assert!(RefName::new("HEAD").is_err());
/// assert!(RefName::new("topic~1").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RefName(String);

impl RefName {
    /// Create a new validated ref name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidRefName` if the name violates the refname rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    /// Name of the remote-tracking ref for `branch` on `remote`.
    pub fn remote_tracking(remote: &str, branch: &RefName) -> Result<Self, TypeError> {
        Self::new(format!("{}/{}", remote, branch.as_str()))
    }

    fn validate(name: &str) -> Result<(), TypeError> {
        if name.is_empty() {
            return Err(TypeError::InvalidRefName("ref name cannot be empty".into()));
        }

        if name == "@" || name == "HEAD" {
            return Err(TypeError::InvalidRefName(format!(
                "'{name}' is reserved"
            )));
        }

        if name.starts_with('.') || name.starts_with('-') {
            return Err(TypeError::InvalidRefName(format!(
                "'{name}' cannot start with '{}'",
                &name[..1]
            )));
        }

        if name.ends_with(".lock") || name.ends_with('/') {
            return Err(TypeError::InvalidRefName(format!(
                "'{name}' has an invalid suffix"
            )));
        }

        for forbidden in ["..", "@{", "//"] {
            if name.contains(forbidden) {
                return Err(TypeError::InvalidRefName(format!(
                    "'{name}' cannot contain '{forbidden}'"
                )));
            }
        }

        const INVALID_CHARS: [char; 8] = [' ', '~', '^', ':', '\\', '?', '*', '['];
        if let Some(c) = name.chars().find(|c| INVALID_CHARS.contains(c)) {
            return Err(TypeError::InvalidRefName(format!(
                "'{name}' cannot contain '{c}'"
            )));
        }

        if name.chars().any(|c| c.is_ascii_control()) {
            return Err(TypeError::InvalidRefName(
                "ref name cannot contain control characters".into(),
            ));
        }

        for component in name.split('/') {
            if component.starts_with('.') || component.ends_with(".lock") {
                return Err(TypeError::InvalidRefName(format!(
                    "path component '{component}' is not allowed"
                )));
            }
        }

        Ok(())
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// If this is a remote-tracking name for `remote`, return the branch part.
    pub fn strip_remote(&self, remote: &str) -> Option<&str> {
        self.0
            .strip_prefix(remote)
            .and_then(|rest| rest.strip_prefix('/'))
    }
}

impl TryFrom<String> for RefName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl TryFrom<&str> for RefName {
    type Error = TypeError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RefName> for String {
    fn from(name: RefName) -> Self {
        name.0
    }
}

impl AsRef<str> for RefName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RefName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A commit identifier.
///
/// Allocated ids are seven lowercase hex characters, but scenario data may
/// supply any token that cannot be confused with revision syntax.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommitId(String);

impl CommitId {
    /// Create a new validated commit id.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidCommitId` for empty ids or ids containing
    /// whitespace or revision operators.
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into();
        if id.is_empty() {
            return Err(TypeError::InvalidCommitId("commit id cannot be empty".into()));
        }
        if id == "HEAD" {
            return Err(TypeError::InvalidCommitId("'HEAD' is reserved".into()));
        }
        if let Some(c) = id
            .chars()
            .find(|c| c.is_whitespace() || c.is_control() || matches!(c, '~' | '^' | ':'))
        {
            return Err(TypeError::InvalidCommitId(format!(
                "'{id}' cannot contain {c:?}"
            )));
        }
        Ok(Self(id))
    }

    /// Wrap an id produced by the graph's allocator (always lowercase hex).
    pub(crate) fn from_allocated(hex: String) -> Self {
        debug_assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
        Self(hex)
    }

    /// Get an abbreviated form of the id.
    ///
    /// Returns the first `len` characters, or the whole id if shorter.
    pub fn short(&self, len: usize) -> &str {
        match self.0.char_indices().nth(len) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CommitId {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<CommitId> for String {
    fn from(id: CommitId) -> Self {
        id.0
    }
}

impl AsRef<str> for CommitId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CommitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A UTC timestamp, serialized as RFC3339.
///
/// # Example
///
/// ```
/// use gitsketch::core::types::UtcTimestamp;
///
/// let now = UtcTimestamp::now();
/// println!("Recorded at: {}", now);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtcTimestamp(chrono::DateTime<chrono::Utc>);

impl UtcTimestamp {
    /// Create a timestamp for the current moment.
    pub fn now() -> Self {
        Self(chrono::Utc::now())
    }

    /// Create a timestamp from a chrono DateTime.
    pub fn from_datetime(dt: chrono::DateTime<chrono::Utc>) -> Self {
        Self(dt)
    }

    /// Get the underlying datetime.
    pub fn as_datetime(&self) -> &chrono::DateTime<chrono::Utc> {
        &self.0
    }
}

impl std::fmt::Display for UtcTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
