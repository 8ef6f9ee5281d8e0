//! secrets
//!
//! Credential storage for HTTP(S) endpoints.
//!
//! # Architecture
//!
//! Credentials are looked up by endpoint host through the
//! [`CredentialStore`] trait, which has two implementations:
//!
//! - [`FileCredentialStore`]: `~/.reposync/credentials.toml` (default)
//! - [`EnvCredentialStore`]: read-only, from `REPOSYNC_TOKEN[_<HOST>]`
//!
//! # Security
//!
//! - Credentials are **never** logged or included in error messages
//! - The file store uses 0600 permissions on Unix and atomic writes

mod env_store;
mod file_store;
mod traits;

pub use env_store::{EnvCredentialStore, TOKEN_ENV};
pub use file_store::FileCredentialStore;
pub use traits::{CredentialError, CredentialStore};

/// The default credential provider name.
pub const DEFAULT_PROVIDER: &str = "file";

/// Provider names accepted by [`create_store`].
pub fn valid_provider_names() -> &'static [&'static str] {
    &["file", "env"]
}

/// Create a credential store by provider name.
///
/// # Errors
///
/// Unknown provider names, or initialization errors from the store.
pub fn create_store(provider: &str) -> Result<Box<dyn CredentialStore>, CredentialError> {
    match provider {
        "file" => Ok(Box::new(FileCredentialStore::new()?)),
        "env" => Ok(Box::new(EnvCredentialStore::new())),
        other => Err(CredentialError::ProviderNotAvailable(format!(
            "unknown credential provider: '{}' (valid: {})",
            other,
            valid_provider_names().join(", ")
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_known_providers() {
        assert_eq!(create_store("env").expect("env").provider(), "env");
        assert_eq!(create_store("file").expect("file").provider(), "file");
    }

    #[test]
    fn create_unknown_provider() {
        match create_store("keychain") {
            Err(CredentialError::ProviderNotAvailable(msg)) => {
                assert!(msg.contains("keychain"));
                assert!(msg.contains("file, env"));
            }
            Err(e) => panic!("unexpected error type: {e:?}"),
            Ok(_) => panic!("expected error"),
        }
    }

    #[test]
    fn default_is_valid() {
        assert!(valid_provider_names().contains(&DEFAULT_PROVIDER));
    }
}
