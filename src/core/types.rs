//! core::types
//!
//! Strong types for the values reposync reads back from git.
//!
//! # Types
//!
//! - [`BranchName`] - Validated git branch name (local or remote-stripped)
//! - [`Oid`] - Git object identifier (SHA)
//! - [`Remote`] - A configured `(name, url)` pair
//! - [`Commit`] - Read-only commit snapshot parsed from `git log`
//!
//! # Validation
//!
//! Names and ids are validated when constructed, so the reconciler and the
//! mirror never pass a malformed value back into a git command line.
//!
//! # Examples
//!
//! ```
//! use reposync::core::types::{BranchName, Oid};
//!
//! let branch = BranchName::new("feature/login").unwrap();
//! assert_eq!(branch.as_str(), "feature/login");
//!
//! assert!(BranchName::new("-rf").is_err());
//! assert!(Oid::new("not-a-sha").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),

    #[error("invalid object id: {0}")]
    InvalidOid(String),

    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("unsupported clone mode: {0}")]
    UnsupportedCloneMode(String),
}

/// A validated git branch name.
///
/// Follows the subset of `git check-ref-format --branch` that matters when a
/// name is spliced into a command line:
/// - Cannot be empty or exactly `@`
/// - Cannot start with `-` (would be read as an option) or `.`
/// - Cannot end with `.lock` or `/`
/// - Cannot contain `..`, `@{`, `//`, whitespace or control characters
/// - Cannot contain `~`, `^`, `:`, `\`, `?`, `*`, `[`
///
/// Equality is exact. Use [`BranchName::eq_ignore_case`] where branch sets
/// are compared the way the mirror compares them.
///
/// # Example
///
/// ```
/// use reposync::core::types::BranchName;
///
/// let a = BranchName::new("Release/1.0").unwrap();
/// let b = BranchName::new("release/1.0").unwrap();
/// assert_ne!(a, b);
/// assert!(a.eq_ignore_case(&b));
///
/// assert!(BranchName::new("").is_err());
/// assert!(BranchName::new("topic.lock").is_err());
/// assert!(BranchName::new("has space").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchName(String);

impl BranchName {
    /// Create a new validated branch name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidBranchName` describing the first rule the
    /// name breaks.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    fn validate(name: &str) -> Result<(), TypeError> {
        let reject = |why: &str| Err(TypeError::InvalidBranchName(format!("'{name}': {why}")));

        if name.is_empty() {
            return reject("name cannot be empty");
        }
        if name == "@" {
            return reject("'@' is reserved");
        }
        if name.starts_with('-') {
            return reject("name cannot start with '-'");
        }
        if name.ends_with('/') {
            return reject("name cannot end with '/'");
        }
        for pattern in ["..", "@{", "//"] {
            if name.contains(pattern) {
                return reject(&format!("name cannot contain '{pattern}'"));
            }
        }
        const INVALID_CHARS: [char; 7] = ['~', '^', ':', '\\', '?', '*', '['];
        if let Some(c) = name
            .chars()
            .find(|c| INVALID_CHARS.contains(c) || c.is_whitespace() || c.is_control())
        {
            return reject(&format!("name cannot contain {c:?}"));
        }
        // Per-component rules; `//` and a trailing `/` were rejected above.
        for component in name.split('/') {
            if component.starts_with('.') {
                return reject("path component cannot start with '.'");
            }
            if component.ends_with(".lock") {
                return reject("path component cannot end with '.lock'");
            }
        }
        Ok(())
    }

    /// Get the branch name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison used for branch-set differences.
    pub fn eq_ignore_case(&self, other: &BranchName) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }

    /// The `<remote>/<name>` form used for remote-tracking refs.
    ///
    /// ```
    /// use reposync::core::types::BranchName;
    ///
    /// let b = BranchName::new("main").unwrap();
    /// assert_eq!(b.on_remote("origin"), "origin/main");
    /// ```
    pub fn on_remote(&self, remote: &str) -> String {
        format!("{remote}/{}", self.0)
    }
}

impl TryFrom<String> for BranchName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<BranchName> for String {
    fn from(name: BranchName) -> Self {
        name.0
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A git object identifier (SHA-1 or SHA-256), normalized to lowercase.
///
/// # Example
///
/// ```
/// use reposync::core::types::Oid;
///
/// let oid = Oid::new("ABC123DEF4567890ABC123DEF4567890ABC12345").unwrap();
/// assert_eq!(oid.as_str(), "abc123def4567890abc123def4567890abc12345");
/// assert_eq!(oid.short(7), "abc123d");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Oid(String);

impl Oid {
    /// Create a new validated object id.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidOid` unless the input is 40 or 64 hex digits.
    pub fn new(oid: impl Into<String>) -> Result<Self, TypeError> {
        let oid = oid.into().trim().to_ascii_lowercase();
        if oid.len() != 40 && oid.len() != 64 {
            return Err(TypeError::InvalidOid(format!(
                "expected 40 or 64 hex characters, got {}",
                oid.len()
            )));
        }
        if !oid.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidOid(
                "object id must be hexadecimal".into(),
            ));
        }
        Ok(Self(oid))
    }

    /// Abbreviated form; the full id when `len` exceeds it.
    pub fn short(&self, len: usize) -> &str {
        &self.0[..len.min(self.0.len())]
    }

    /// Get the object id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Oid {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Oid> for String {
    fn from(oid: Oid) -> Self {
        oid.0
    }
}

impl std::fmt::Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A remote recorded in the workspace configuration.
///
/// Names are case-sensitive. The URL is stored exactly as git reports it,
/// which means it may still carry embedded credentials; compare it through
/// [`crate::core::endpoint::Endpoint::matches`], never directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Remote {
    /// Remote name (e.g. `origin`)
    pub name: String,
    /// Fetch URL
    #[serde(serialize_with = "serialize_redacted_url")]
    pub url: String,
}

fn serialize_redacted_url<S: serde::Serializer>(url: &str, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&crate::core::endpoint::strip_credentials(url))
}

/// A commit as reported by the log reader.
///
/// Snapshots are never mutated. Lists of commits are newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Commit {
    /// Author name
    pub author: String,
    /// Author email
    pub email: String,
    /// Subject line of the commit message
    pub message: String,
    /// Author timestamp
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Commit id
    pub hash: Oid,
}

#[cfg(test)]
mod tests {
    use super::*;

    mod branch_name {
        use super::*;

        #[test]
        fn accepts_common_names() {
            for name in ["main", "feature/x", "release-1.0", "user@topic", "v2_fix"] {
                assert!(BranchName::new(name).is_ok(), "{name} should be valid");
            }
        }

        #[test]
        fn rejects_option_like_names() {
            let err = BranchName::new("--force").unwrap_err();
            assert!(err.to_string().contains("'-'"));
        }

        #[test]
        fn rejects_refname_violations() {
            for name in [
                "", "@", ".hidden", "a..b", "a@{b", "a//b", "a/", "x.lock", "a/.b", "a/b.lock",
                "a b", "a~1", "a^", "a:b", "a\\b", "a?", "a*", "a[", "tab\there",
            ] {
                assert!(BranchName::new(name).is_err(), "{name:?} should be invalid");
            }
        }

        #[test]
        fn case_insensitive_comparison() {
            let upper = BranchName::new("MAIN").unwrap();
            let lower = BranchName::new("main").unwrap();
            assert!(upper.eq_ignore_case(&lower));
            assert_ne!(upper, lower);
        }

        #[test]
        fn serde_rejects_invalid() {
            let parsed: Result<BranchName, _> = serde_json::from_str("\"bad..name\"");
            assert!(parsed.is_err());
        }
    }

    mod oid {
        use super::*;

        #[test]
        fn accepts_sha1_and_sha256() {
            assert!(Oid::new("a".repeat(40)).is_ok());
            assert!(Oid::new("b".repeat(64)).is_ok());
        }

        #[test]
        fn trims_rev_parse_output() {
            let oid = Oid::new(format!("{}\n", "c".repeat(40))).unwrap();
            assert_eq!(oid.as_str().len(), 40);
        }

        #[test]
        fn rejects_wrong_length_or_alphabet() {
            assert!(Oid::new("abc").is_err());
            assert!(Oid::new("g".repeat(40)).is_err());
        }

        #[test]
        fn short_is_clamped() {
            let oid = Oid::new("d".repeat(40)).unwrap();
            assert_eq!(oid.short(100).len(), 40);
        }
    }

    #[test]
    fn remote_serializes_without_credentials() {
        let remote = Remote {
            name: "origin".into(),
            url: "https://token@example.com/org/repo.git".into(),
        };
        let json = serde_json::to_string(&remote).unwrap();
        assert!(!json.contains("token"));
        assert!(json.contains("https://example.com/org/repo.git"));
    }
}
