//! secrets::traits
//!
//! Credential storage trait definition.
//!
//! # Design
//!
//! The `CredentialStore` trait is a small key-value interface. Keys are
//! endpoint hosts as returned by `Endpoint::host` (e.g. `git.example.com`
//! or `git.example.com:8443`); values are access tokens.
//!
//! # Security
//!
//! Implementations MUST:
//! - Never log, print, or include credentials in error messages
//! - Be thread-safe (Send + Sync)

use thiserror::Error;

use crate::core::endpoint::Credential;

/// Errors from credential storage operations.
///
/// Messages never include credential values.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Failed to read from credential storage.
    #[error("failed to read credentials: {0}")]
    ReadError(String),

    /// Failed to write to credential storage.
    #[error("failed to write credentials: {0}")]
    WriteError(String),

    /// The provider cannot be modified.
    #[error("credential provider '{0}' is read-only")]
    ReadOnly(&'static str),

    /// Provider not available or not configured.
    #[error("credential provider not available: {0}")]
    ProviderNotAvailable(String),
}

/// Trait for credential storage providers.
pub trait CredentialStore: Send + Sync {
    /// Provider name, as used in configuration.
    fn provider(&self) -> &'static str;

    /// Credential for `host`, if one is stored.
    fn get(&self, host: &str) -> Result<Option<Credential>, CredentialError>;

    /// Store a credential, replacing any existing one.
    fn set(&self, host: &str, credential: &Credential) -> Result<(), CredentialError>;

    /// Delete the credential for `host`. Deleting a missing entry succeeds.
    fn delete(&self, host: &str) -> Result<(), CredentialError>;

    /// Whether a credential exists for `host`.
    fn exists(&self, host: &str) -> Result<bool, CredentialError> {
        Ok(self.get(host)?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = CredentialError::ReadError("disk full".into());
        assert!(err.to_string().contains("read"));

        let err = CredentialError::WriteError("permission denied".into());
        assert!(err.to_string().contains("write"));

        let err = CredentialError::ReadOnly("env");
        assert!(err.to_string().contains("read-only"));

        let err = CredentialError::ProviderNotAvailable("vault".into());
        assert!(err.to_string().contains("provider"));
    }
}
