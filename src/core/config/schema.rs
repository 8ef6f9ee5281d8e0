//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Validation
//!
//! Values are validated after parsing so that a typo in a clone mode or a
//! remote name fails at load time, not halfway through a reconcile.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::clone_mode::CloneMode;

/// Default name of the remote the reconciler synchronizes against.
pub const DEFAULT_ORIGIN_REMOTE: &str = "origin";

/// Default name of the remote reserved for outbound pushes.
pub const DEFAULT_PUSH_REMOTE: &str = "publish";

/// Global configuration.
///
/// # Example
///
/// ```toml
/// git_binary = "/usr/bin/git"
/// command_timeout_secs = 600
/// push_remote = "publish"
/// default_clone_mode = "commits_and_trees"
///
/// [fetch]
/// unit_ms = 1000
///
/// [credentials]
/// provider = "file"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Path or name of the git executable (default: `git` on `PATH`)
    pub git_binary: Option<String>,

    /// Hard limit on any single git process, in seconds (default: none).
    /// A fetch attempt cut off by it is retried like any timed-out attempt.
    pub command_timeout_secs: Option<u64>,

    /// Remote the reconciler and mirror synchronize against
    pub origin_remote: Option<String>,

    /// Remote reserved for `push`
    pub push_remote: Option<String>,

    /// Clone mode used when the command line does not name one
    pub default_clone_mode: Option<CloneMode>,

    /// Fetch retry settings
    pub fetch: Option<FetchConfig>,

    /// Credential storage settings
    pub credentials: Option<CredentialsConfig>,
}

impl GlobalConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(binary) = &self.git_binary {
            if binary.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "git_binary cannot be empty".to_string(),
                ));
            }
        }

        if self.command_timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue(
                "command_timeout_secs must be greater than zero".to_string(),
            ));
        }

        for (key, value) in [
            ("origin_remote", &self.origin_remote),
            ("push_remote", &self.push_remote),
        ] {
            if let Some(name) = value {
                validate_remote_name(key, name)?;
            }
        }

        if self.origin_remote() == self.push_remote() {
            return Err(ConfigError::InvalidValue(format!(
                "push_remote must differ from origin_remote (both are '{}')",
                self.push_remote()
            )));
        }

        if let Some(fetch) = &self.fetch {
            fetch.validate()?;
        }

        if let Some(credentials) = &self.credentials {
            credentials.validate()?;
        }

        Ok(())
    }

    /// The git executable to run.
    pub fn git_binary(&self) -> &str {
        self.git_binary.as_deref().unwrap_or("git")
    }

    /// Hard limit after which any single git process is killed.
    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout_secs.map(Duration::from_secs)
    }

    /// Remote name the reconciler synchronizes against.
    pub fn origin_remote(&self) -> &str {
        self.origin_remote
            .as_deref()
            .unwrap_or(DEFAULT_ORIGIN_REMOTE)
    }

    /// Remote name reserved for pushes.
    pub fn push_remote(&self) -> &str {
        self.push_remote.as_deref().unwrap_or(DEFAULT_PUSH_REMOTE)
    }

    /// Clone mode used when none is given.
    pub fn default_clone_mode(&self) -> CloneMode {
        self.default_clone_mode.unwrap_or_default()
    }
}

fn validate_remote_name(key: &str, name: &str) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::InvalidValue(format!("{key} cannot be empty")));
    }
    if name.starts_with('-') || name.contains(['/', ' ', ':']) {
        return Err(ConfigError::InvalidValue(format!(
            "{key} '{name}' is not a valid remote name"
        )));
    }
    Ok(())
}

/// Fetch retry settings.
///
/// Attempt `n` of a fetch times out after `n * 50 * unit_ms` milliseconds.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
    /// Length of one time unit in milliseconds (default: 1000)
    pub unit_ms: Option<u64>,

    /// Give up after this many timed-out attempts (default: never)
    pub max_attempts: Option<u32>,
}

impl FetchConfig {
    /// Validate the fetch settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.unit_ms == Some(0) {
            return Err(ConfigError::InvalidValue(
                "fetch.unit_ms must be greater than zero".to_string(),
            ));
        }
        if self.max_attempts == Some(0) {
            return Err(ConfigError::InvalidValue(
                "fetch.max_attempts must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }
}

/// Credential storage settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CredentialsConfig {
    /// Provider name: "file" or "env"
    pub provider: Option<String>,
}

impl CredentialsConfig {
    /// Validate the credentials configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(provider) = &self.provider {
            if !crate::secrets::valid_provider_names().contains(&provider.as_str()) {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid credentials provider '{}', must be one of: {}",
                    provider,
                    crate::secrets::valid_provider_names().join(", ")
                )));
            }
        }
        Ok(())
    }

    /// Provider name, defaulting to the file store.
    pub fn provider(&self) -> &str {
        self.provider
            .as_deref()
            .unwrap_or(crate::secrets::DEFAULT_PROVIDER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = GlobalConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.git_binary(), "git");
        assert_eq!(config.origin_remote(), "origin");
        assert_eq!(config.push_remote(), "publish");
        assert_eq!(config.default_clone_mode(), CloneMode::Full);
        assert_eq!(config.command_timeout(), None);
    }

    #[test]
    fn parses_full_document() {
        let config: GlobalConfig = toml::from_str(
            r#"
            git_binary = "/opt/git/bin/git"
            command_timeout_secs = 30
            origin_remote = "upstream"
            push_remote = "out"
            default_clone_mode = "depth1"

            [fetch]
            unit_ms = 20
            max_attempts = 3

            [credentials]
            provider = "file"
            "#,
        )
        .unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.default_clone_mode(), CloneMode::Depth1);
        assert_eq!(config.command_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.fetch.as_ref().and_then(|f| f.max_attempts), Some(3));
    }

    #[test]
    fn unknown_fields_rejected() {
        assert!(toml::from_str::<GlobalConfig>("trunk = \"main\"").is_err());
    }

    #[test]
    fn unknown_clone_mode_rejected_at_parse() {
        assert!(toml::from_str::<GlobalConfig>("default_clone_mode = \"mirror\"").is_err());
    }

    #[test]
    fn push_remote_must_differ_from_origin() {
        let config = GlobalConfig {
            push_remote: Some("origin".into()),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("push_remote"));
    }

    #[test]
    fn bad_remote_names_rejected() {
        for bad in ["", "-x", "a/b", "a b"] {
            let config = GlobalConfig {
                origin_remote: Some(bad.into()),
                ..Default::default()
            };
            assert!(config.validate().is_err(), "{bad:?} accepted");
        }
    }

    #[test]
    fn zero_values_rejected() {
        let config = GlobalConfig {
            fetch: Some(FetchConfig {
                unit_ms: Some(0),
                max_attempts: None,
            }),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = GlobalConfig {
            command_timeout_secs: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_credentials_provider_rejected() {
        let config = GlobalConfig {
            credentials: Some(CredentialsConfig {
                provider: Some("vault".into()),
            }),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
