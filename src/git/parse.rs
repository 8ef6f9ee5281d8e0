//! git::parse
//!
//! Fixed record shapes for the text git prints.
//!
//! Each parser is a pure function over a string so it can be tested against
//! literal fixtures. The queries that produce the text live in
//! [`super::interface`]; the format strings they use are exported here so
//! the two cannot drift apart.

use chrono::{TimeZone, Utc};

use super::error::GitError;
use crate::core::types::{BranchName, Commit, Oid, Remote};

/// `git log --format` producing five lines per commit:
/// author, email, subject, unix timestamp, hash.
pub const COMMIT_FORMAT: &str = "--format=%an%n%ae%n%s%n%at%n%H";

const COMMIT_RECORD_LINES: usize = 5;

/// Parse `git log` output produced with [`COMMIT_FORMAT`].
///
/// Order is preserved, so the result is newest first.
///
/// # Errors
///
/// [`GitError::Parse`] if the line count is not a multiple of five or a
/// timestamp or hash is malformed.
///
/// # Example
///
/// ```
/// use reposync::git::parse::parse_commits;
///
/// let text = "Ada\nada@example.com\nAdd engine\n1700000000\n0123456789abcdef0123456789abcdef01234567\n";
/// let commits = parse_commits(text).unwrap();
/// assert_eq!(commits.len(), 1);
/// assert_eq!(commits[0].author, "Ada");
/// assert_eq!(commits[0].message, "Add engine");
/// ```
pub fn parse_commits(text: &str) -> Result<Vec<Commit>, GitError> {
    let mut lines: Vec<&str> = text.lines().collect();
    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }

    if lines.len() % COMMIT_RECORD_LINES != 0 {
        return Err(GitError::Parse {
            what: "commit log",
            message: format!(
                "expected {} lines per commit, got {} lines",
                COMMIT_RECORD_LINES,
                lines.len()
            ),
        });
    }

    lines
        .chunks(COMMIT_RECORD_LINES)
        .map(|record| {
            let seconds: i64 = record[3].trim().parse().map_err(|_| GitError::Parse {
                what: "commit log",
                message: format!("invalid timestamp '{}'", record[3].trim()),
            })?;
            let timestamp = Utc
                .timestamp_opt(seconds, 0)
                .single()
                .ok_or_else(|| GitError::Parse {
                    what: "commit log",
                    message: format!("timestamp {seconds} is out of range"),
                })?;
            Ok(Commit {
                author: record[0].to_string(),
                email: record[1].to_string(),
                message: record[2].to_string(),
                timestamp,
                hash: Oid::new(record[4])?,
            })
        })
        .collect()
}

/// Parse `git branch` output into local branch names.
///
/// Current-branch (`*`) and other-worktree (`+`) markers are stripped;
/// detached-HEAD entries such as `(HEAD detached at 1a2b3c)` are skipped.
pub fn parse_local_branches(text: &str) -> Result<Vec<BranchName>, GitError> {
    text.lines()
        .map(|line| {
            let line = line.trim();
            line.strip_prefix("* ")
                .or_else(|| line.strip_prefix("+ "))
                .unwrap_or(line)
                .trim()
        })
        .filter(|name| !name.is_empty() && !name.starts_with('('))
        .map(|name| BranchName::new(name).map_err(GitError::from))
        .collect()
}

/// Parse `git branch -r` output into bare branch names on `remote`.
///
/// Symbolic entries (`origin/HEAD -> origin/main`) and entries belonging to
/// other remotes are skipped; the `<remote>/` prefix is stripped.
///
/// # Example
///
/// ```
/// use reposync::git::parse::parse_remote_branches;
///
/// let text = "  origin/HEAD -> origin/main\n  origin/main\n  origin/dev\n  publish/main\n";
/// let names: Vec<String> = parse_remote_branches(text, "origin")
///     .unwrap()
///     .into_iter()
///     .map(String::from)
///     .collect();
/// assert_eq!(names, ["main", "dev"]);
/// ```
pub fn parse_remote_branches(text: &str, remote: &str) -> Result<Vec<BranchName>, GitError> {
    let prefix = format!("{remote}/");
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.contains("->"))
        .filter_map(|line| line.strip_prefix(prefix.as_str()))
        .map(|name| BranchName::new(name).map_err(GitError::from))
        .collect()
}

/// Parse `git remote -v` output.
///
/// Each remote appears once per direction; the fetch URL is kept and the
/// first-seen order is preserved.
pub fn parse_remotes(text: &str) -> Result<Vec<Remote>, GitError> {
    let mut remotes: Vec<Remote> = Vec::new();
    for line in text.lines().filter(|line| !line.trim().is_empty()) {
        let mut fields = line.split_whitespace();
        let (Some(name), Some(url)) = (fields.next(), fields.next()) else {
            return Err(GitError::Parse {
                what: "remote list",
                message: format!("malformed line '{}'", crate::core::endpoint::strip_credentials(line)),
            });
        };
        let direction = fields.next().unwrap_or("(fetch)");
        if direction == "(push)" && remotes.iter().any(|r| r.name == name) {
            continue;
        }
        if let Some(existing) = remotes.iter_mut().find(|r| r.name == name) {
            existing.url = url.to_string();
        } else {
            remotes.push(Remote {
                name: name.to_string(),
                url: url.to_string(),
            });
        }
    }
    Ok(remotes)
}

/// Parse a `true`/`false` line such as `rev-parse --is-bare-repository`.
pub fn parse_bool(what: &'static str, text: &str) -> Result<bool, GitError> {
    match text.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(GitError::Parse {
            what,
            message: format!("expected 'true' or 'false', got '{other}'"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH_A: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const HASH_B: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

    fn names(branches: Vec<BranchName>) -> Vec<String> {
        branches.into_iter().map(String::from).collect()
    }

    mod commits {
        use super::*;

        #[test]
        fn two_records_newest_first() {
            let text = format!(
                "Grace\ngrace@example.com\nSecond\n1700000100\n{HASH_B}\n\
                 Ada\nada@example.com\nFirst\n1700000000\n{HASH_A}\n"
            );
            let commits = parse_commits(&text).unwrap();
            assert_eq!(commits.len(), 2);
            assert_eq!(commits[0].message, "Second");
            assert_eq!(commits[0].hash.as_str(), HASH_B);
            assert_eq!(commits[1].email, "ada@example.com");
            assert!(commits[0].timestamp > commits[1].timestamp);
        }

        #[test]
        fn empty_output_is_empty_log() {
            assert!(parse_commits("").unwrap().is_empty());
            assert!(parse_commits("\n\n").unwrap().is_empty());
        }

        #[test]
        fn empty_subject_is_kept() {
            let text = format!("Ada\nada@example.com\n\n1700000000\n{HASH_A}\n");
            let commits = parse_commits(&text).unwrap();
            assert_eq!(commits[0].message, "");
        }

        #[test]
        fn truncated_record_is_an_error() {
            let err = parse_commits("Ada\nada@example.com\nFirst\n").unwrap_err();
            assert!(matches!(err, GitError::Parse { what: "commit log", .. }));
        }

        #[test]
        fn bad_timestamp_is_an_error() {
            let text = format!("Ada\nada@example.com\nFirst\nyesterday\n{HASH_A}\n");
            assert!(parse_commits(&text).is_err());
        }

        #[test]
        fn bad_hash_is_an_error() {
            let text = "Ada\nada@example.com\nFirst\n1700000000\nxyz\n";
            assert!(parse_commits(text).is_err());
        }
    }

    mod branches {
        use super::*;

        #[test]
        fn local_markers_stripped() {
            let text = "  dev\n* main\n+ wt-branch\n";
            assert_eq!(
                names(parse_local_branches(text).unwrap()),
                ["dev", "main", "wt-branch"]
            );
        }

        #[test]
        fn detached_head_skipped() {
            let text = "* (HEAD detached at 1a2b3c4)\n  main\n";
            assert_eq!(names(parse_local_branches(text).unwrap()), ["main"]);
        }

        #[test]
        fn remote_prefix_and_aliases() {
            let text = "  origin/HEAD -> origin/main\n  origin/feature/x\n  origin/main\n";
            assert_eq!(
                names(parse_remote_branches(text, "origin").unwrap()),
                ["feature/x", "main"]
            );
        }

        #[test]
        fn other_remotes_ignored() {
            let text = "  origin/main\n  originals/main\n  upstream/dev\n";
            assert_eq!(names(parse_remote_branches(text, "origin").unwrap()), ["main"]);
        }
    }

    mod remotes {
        use super::*;

        #[test]
        fn fetch_and_push_lines_collapse() {
            let text = "origin\thttps://example.com/r.git (fetch)\n\
                        origin\thttps://example.com/r.git (push)\n\
                        publish\thttps://mirror.example.com/r.git (fetch)\n\
                        publish\thttps://mirror.example.com/r.git (push)\n";
            let remotes = parse_remotes(text).unwrap();
            assert_eq!(remotes.len(), 2);
            assert_eq!(remotes[0].name, "origin");
            assert_eq!(remotes[1].url, "https://mirror.example.com/r.git");
        }

        #[test]
        fn malformed_line_does_not_leak_credentials() {
            let err = parse_remotes("https://tok@host/r.git\n").unwrap_err();
            assert!(!err.to_string().contains("tok@"));
        }
    }

    #[test]
    fn bool_flags() {
        assert!(parse_bool("bare flag", "true\n").unwrap());
        assert!(!parse_bool("bare flag", "false").unwrap());
        assert!(parse_bool("bare flag", "maybe").is_err());
    }
}
