//! core::clone_mode
//!
//! How much history, tree and blob data a clone materializes.
//!
//! The mapping from mode to `git clone` flags is total: every variant has
//! exactly one flag set, and the only way to name a mode that does not exist
//! is through text (config or CLI), which fails in [`CloneMode::from_str`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::types::TypeError;

/// History/tree/blob completeness policy for a clone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CloneMode {
    /// Everything.
    #[default]
    Full,
    /// Commits only; trees and blobs fetched on demand.
    OnlyCommits,
    /// Commits and trees; blobs fetched on demand.
    CommitsAndTrees,
    /// Shallow clone of the tip commit.
    Depth1,
    /// No working tree.
    Bare,
    /// No working tree, commits only.
    BareWithOnlyCommits,
}

impl CloneMode {
    /// Every mode, in declaration order.
    pub const ALL: [CloneMode; 6] = [
        CloneMode::Full,
        CloneMode::OnlyCommits,
        CloneMode::CommitsAndTrees,
        CloneMode::Depth1,
        CloneMode::Bare,
        CloneMode::BareWithOnlyCommits,
    ];

    /// The `git clone` flags for this mode.
    ///
    /// # Example
    ///
    /// ```
    /// use reposync::core::clone_mode::CloneMode;
    ///
    /// assert!(CloneMode::Full.flags().is_empty());
    /// assert_eq!(CloneMode::Depth1.flags(), ["--depth", "1"]);
    /// assert_eq!(CloneMode::BareWithOnlyCommits.flags(), ["--bare", "--filter=tree:0"]);
    /// ```
    pub fn flags(self) -> &'static [&'static str] {
        match self {
            CloneMode::Full => &[],
            CloneMode::OnlyCommits => &["--filter=tree:0"],
            CloneMode::CommitsAndTrees => &["--filter=blob:none"],
            CloneMode::Depth1 => &["--depth", "1"],
            CloneMode::Bare => &["--bare"],
            CloneMode::BareWithOnlyCommits => &["--bare", "--filter=tree:0"],
        }
    }

    /// Whether the mode produces a repository without a working tree.
    pub fn is_bare(self) -> bool {
        matches!(self, CloneMode::Bare | CloneMode::BareWithOnlyCommits)
    }

    /// Canonical `snake_case` name, as used in config files.
    pub fn name(self) -> &'static str {
        match self {
            CloneMode::Full => "full",
            CloneMode::OnlyCommits => "only_commits",
            CloneMode::CommitsAndTrees => "commits_and_trees",
            CloneMode::Depth1 => "depth1",
            CloneMode::Bare => "bare",
            CloneMode::BareWithOnlyCommits => "bare_with_only_commits",
        }
    }
}

impl FromStr for CloneMode {
    type Err = TypeError;

    /// Accepts `snake_case`, `kebab-case` and `PascalCase`, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        CloneMode::ALL
            .into_iter()
            .find(|mode| mode.name().replace('_', "") == folded)
            .ok_or_else(|| {
                let valid: Vec<_> = CloneMode::ALL.iter().map(|m| m.name()).collect();
                TypeError::UnsupportedCloneMode(format!(
                    "'{}' (valid: {})",
                    s.trim(),
                    valid.join(", ")
                ))
            })
    }
}

impl TryFrom<String> for CloneMode {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<CloneMode> for String {
    fn from(mode: CloneMode) -> Self {
        mode.name().to_string()
    }
}

impl fmt::Display for CloneMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_mode_has_a_distinct_flag_set() {
        let mut seen = std::collections::HashSet::new();
        for mode in CloneMode::ALL {
            assert!(seen.insert(mode.flags()), "{mode} shares flags");
        }
    }

    #[test]
    fn bare_modes() {
        let bare: Vec<_> = CloneMode::ALL.into_iter().filter(|m| m.is_bare()).collect();
        assert_eq!(bare, [CloneMode::Bare, CloneMode::BareWithOnlyCommits]);
        for mode in bare {
            assert!(mode.flags().contains(&"--bare"));
        }
    }

    #[test]
    fn parses_all_spellings() {
        assert_eq!("OnlyCommits".parse(), Ok(CloneMode::OnlyCommits));
        assert_eq!("only-commits".parse(), Ok(CloneMode::OnlyCommits));
        assert_eq!("commits_and_trees".parse(), Ok(CloneMode::CommitsAndTrees));
        assert_eq!("DEPTH1".parse(), Ok(CloneMode::Depth1));
        assert_eq!(" bare ".parse(), Ok(CloneMode::Bare));
    }

    #[test]
    fn names_round_trip() {
        for mode in CloneMode::ALL {
            assert_eq!(mode.name().parse(), Ok(mode));
        }
    }

    #[test]
    fn unknown_mode_is_a_configuration_error() {
        let err = "mirror".parse::<CloneMode>().unwrap_err();
        assert!(matches!(err, TypeError::UnsupportedCloneMode(_)));
        assert!(err.to_string().contains("mirror"));
        assert!(err.to_string().contains("depth1"));
    }

    #[test]
    fn deserializes_from_toml() {
        #[derive(serde::Deserialize)]
        struct Doc {
            mode: CloneMode,
        }
        let doc: Doc = toml::from_str("mode = \"commits-and-trees\"").unwrap();
        assert_eq!(doc.mode, CloneMode::CommitsAndTrees);
        assert!(toml::from_str::<Doc>("mode = \"nope\"").is_err());
    }
}
