//! secrets::env_store
//!
//! Read-only credentials from the environment, for CI and containers.
//!
//! `REPOSYNC_TOKEN` applies to every host. A host-specific variable takes
//! precedence: `REPOSYNC_TOKEN_<HOST>` with the host upper-cased and every
//! non-alphanumeric character replaced by `_` (so `git.example.com:8443`
//! reads `REPOSYNC_TOKEN_GIT_EXAMPLE_COM_8443`).

use super::traits::{CredentialError, CredentialStore};
use crate::core::endpoint::Credential;

/// Variable consulted for every host.
pub const TOKEN_ENV: &str = "REPOSYNC_TOKEN";

/// Credential store backed by environment variables.
#[derive(Debug, Default)]
pub struct EnvCredentialStore;

impl EnvCredentialStore {
    pub fn new() -> Self {
        Self
    }

    /// The host-specific variable name for `host`.
    ///
    /// ```
    /// use reposync::secrets::EnvCredentialStore;
    ///
    /// assert_eq!(
    ///     EnvCredentialStore::variable_for("git.example.com:8443"),
    ///     "REPOSYNC_TOKEN_GIT_EXAMPLE_COM_8443"
    /// );
    /// ```
    pub fn variable_for(host: &str) -> String {
        let suffix: String = host
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();
        format!("{TOKEN_ENV}_{suffix}")
    }
}

fn non_empty(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

impl CredentialStore for EnvCredentialStore {
    fn provider(&self) -> &'static str {
        "env"
    }

    fn get(&self, host: &str) -> Result<Option<Credential>, CredentialError> {
        Ok(non_empty(&Self::variable_for(host))
            .or_else(|| non_empty(TOKEN_ENV))
            .map(Credential::new))
    }

    fn set(&self, _host: &str, _credential: &Credential) -> Result<(), CredentialError> {
        Err(CredentialError::ReadOnly("env"))
    }

    fn delete(&self, _host: &str) -> Result<(), CredentialError> {
        Err(CredentialError::ReadOnly("env"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variable_names() {
        assert_eq!(
            EnvCredentialStore::variable_for("github.com"),
            "REPOSYNC_TOKEN_GITHUB_COM"
        );
    }

    #[test]
    fn writes_are_refused() {
        let store = EnvCredentialStore::new();
        assert!(matches!(
            store.set("h", &Credential::new("v")),
            Err(CredentialError::ReadOnly("env"))
        ));
        assert!(store.delete("h").is_err());
    }
}
