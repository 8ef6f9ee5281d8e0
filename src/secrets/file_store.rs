//! secrets::file_store
//!
//! File-based credential storage.
//!
//! # Security
//!
//! - Credentials are stored in `~/.reposync/credentials.toml`, keyed by host
//! - File permissions are set to 0600 on Unix (owner read/write only)
//! - All writes are atomic (write to temp file, then rename)
//! - Credentials are NEVER logged, printed, or included in error messages

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use super::traits::{CredentialError, CredentialStore};
use crate::core::endpoint::Credential;

/// File-based credential storage.
///
/// This is the default credential store for reposync.
///
/// # Example
///
/// ```
/// use reposync::core::endpoint::Credential;
/// use reposync::secrets::{CredentialStore, FileCredentialStore};
///
/// let dir = tempfile::TempDir::new().unwrap();
/// let store = FileCredentialStore::with_path(dir.path().join("credentials.toml"));
///
/// store.set("git.example.com", &Credential::new("glpat-xxxx")).unwrap();
/// assert!(store.exists("git.example.com").unwrap());
/// assert!(!store.exists("other.example.com").unwrap());
/// ```
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Store at the default location, `~/.reposync/credentials.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, CredentialError> {
        let home = dirs::home_dir()
            .ok_or_else(|| CredentialError::ReadError("cannot determine home directory".into()))?;
        Ok(Self::with_path(home.join(".reposync").join("credentials.toml")))
    }

    /// Store at a custom path.
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, CredentialError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| CredentialError::ReadError(format!("cannot read credentials file: {e}")))?;

        // toml's error text quotes the offending line, which could hold a token.
        toml::from_str(&content).map_err(|_| {
            CredentialError::ReadError(format!(
                "cannot parse credentials file '{}'",
                self.path.display()
            ))
        })
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), CredentialError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| CredentialError::WriteError(format!("cannot create directory: {e}")))?;
        }

        let content = toml::to_string_pretty(entries)
            .map_err(|_| CredentialError::WriteError("cannot serialize credentials".into()))?;

        let temp_path = self.path.with_extension("tmp");
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .map_err(|e| CredentialError::WriteError(format!("cannot create temp file: {e}")))?;

            // Restrict before any content lands on disk.
            #[cfg(unix)]
            file.set_permissions(fs::Permissions::from_mode(0o600))
                .map_err(|e| CredentialError::WriteError(format!("cannot set permissions: {e}")))?;

            file.write_all(content.as_bytes())
                .map_err(|e| CredentialError::WriteError(format!("cannot write credentials: {e}")))?;
            file.sync_all()
                .map_err(|e| CredentialError::WriteError(format!("cannot sync to disk: {e}")))?;
        }

        fs::rename(&temp_path, &self.path)
            .map_err(|e| CredentialError::WriteError(format!("cannot rename temp file: {e}")))
    }

    /// Whether the file is absent or has 0600 permissions.
    #[cfg(unix)]
    pub fn verify_permissions(&self) -> Result<bool, CredentialError> {
        if !self.path.exists() {
            return Ok(true);
        }
        let metadata = fs::metadata(&self.path)
            .map_err(|e| CredentialError::ReadError(format!("cannot read file metadata: {e}")))?;
        Ok(metadata.permissions().mode() & 0o777 == 0o600)
    }

    #[cfg(not(unix))]
    pub fn verify_permissions(&self) -> Result<bool, CredentialError> {
        Ok(true)
    }
}

impl CredentialStore for FileCredentialStore {
    fn provider(&self) -> &'static str {
        "file"
    }

    fn get(&self, host: &str) -> Result<Option<Credential>, CredentialError> {
        let key = host.to_ascii_lowercase();
        Ok(self.read_all()?.remove(&key).map(Credential::new))
    }

    fn set(&self, host: &str, credential: &Credential) -> Result<(), CredentialError> {
        let mut entries = self.read_all()?;
        entries.insert(host.to_ascii_lowercase(), credential.expose().to_string());
        self.write_all(&entries)
    }

    fn delete(&self, host: &str) -> Result<(), CredentialError> {
        let mut entries = self.read_all()?;
        if entries.remove(&host.to_ascii_lowercase()).is_none() {
            return Ok(());
        }
        self.write_all(&entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, FileCredentialStore) {
        let temp = TempDir::new().expect("create temp dir");
        let store = FileCredentialStore::with_path(temp.path().join("credentials.toml"));
        (temp, store)
    }

    fn token(store: &FileCredentialStore, host: &str) -> Option<String> {
        store
            .get(host)
            .expect("get")
            .map(|c| c.expose().to_string())
    }

    #[test]
    fn get_nonexistent_returns_none() {
        let (_temp, store) = create_test_store();
        assert!(store.get("git.example.com").expect("get").is_none());
    }

    #[test]
    fn set_get_overwrite() {
        let (_temp, store) = create_test_store();
        store.set("git.example.com", &Credential::new("one")).expect("set");
        store.set("git.example.com", &Credential::new("two")).expect("set");
        assert_eq!(token(&store, "git.example.com").as_deref(), Some("two"));
    }

    #[test]
    fn hosts_are_case_insensitive_and_ports_distinct() {
        let (_temp, store) = create_test_store();
        store.set("Git.Example.com", &Credential::new("a")).expect("set");
        store.set("git.example.com:8443", &Credential::new("b")).expect("set");
        assert_eq!(token(&store, "git.example.com").as_deref(), Some("a"));
        assert_eq!(token(&store, "git.example.com:8443").as_deref(), Some("b"));
    }

    #[test]
    fn delete_existing_and_missing() {
        let (_temp, store) = create_test_store();
        store.set("h", &Credential::new("v")).expect("set");
        store.delete("h").expect("delete");
        assert!(!store.exists("h").expect("exists"));
        store.delete("never-there").expect("delete missing");
    }

    #[test]
    fn creates_directory_if_missing() {
        let temp = TempDir::new().expect("create temp dir");
        let path = temp.path().join("subdir").join("credentials.toml");
        let store = FileCredentialStore::with_path(path.clone());
        store.set("h", &Credential::new("v")).expect("set");
        assert!(path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn permissions_0600_on_unix() {
        let (_temp, store) = create_test_store();
        assert!(store.verify_permissions().expect("verify before write"));
        store.set("h", &Credential::new("v")).expect("set");
        let mode = fs::metadata(store.path()).expect("metadata").permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
        assert!(store.verify_permissions().expect("verify after write"));
    }

    #[test]
    fn parse_errors_do_not_echo_contents() {
        let (_temp, store) = create_test_store();
        fs::write(store.path(), "\"h\" = \"tok-secret\nbroken").expect("write bad toml");
        let err = store.get("h").unwrap_err().to_string();
        assert!(err.contains("cannot parse"));
        assert!(!err.contains("tok-secret"));
    }

    #[test]
    fn persistence_across_instances() {
        let temp = TempDir::new().expect("create temp dir");
        let path = temp.path().join("credentials.toml");
        FileCredentialStore::with_path(path.clone())
            .set("h", &Credential::new("v"))
            .expect("set");
        let store = FileCredentialStore::with_path(path);
        assert_eq!(token(&store, "h").as_deref(), Some("v"));
    }
}
