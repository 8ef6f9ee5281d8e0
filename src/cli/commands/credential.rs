//! cli::commands::credential
//!
//! Manage stored tokens for HTTP(S) hosts.
//!
//! # Security
//!
//! Tokens are read without echo (or from stdin with `--stdin`) and are
//! never printed.

use std::io::{BufRead, IsTerminal};

use anyhow::{bail, Context as _, Result};

use super::{credential_store, verbosity};
use crate::core::endpoint::Credential;
use crate::engine::Context;
use crate::ui::output;

fn normalize_host(host: &str) -> Result<String> {
    let host = host.trim().to_ascii_lowercase();
    if host.is_empty() || host.contains(['/', '@', ' ']) {
        bail!("'{host}' is not a host name (expected e.g. git.example.com or git.example.com:8443)");
    }
    Ok(host)
}

fn read_token(from_stdin: bool) -> Result<String> {
    let token = if from_stdin || !std::io::stdin().is_terminal() {
        let mut line = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut line)
            .context("failed to read token from stdin")?;
        line
    } else {
        rpassword::prompt_password("Token: ").context("failed to read token")?
    };

    let token = token.trim().to_string();
    if token.is_empty() {
        bail!("token cannot be empty");
    }
    Ok(token)
}

/// Store a token for `host`.
pub fn set(ctx: &Context, host: &str, from_stdin: bool) -> Result<()> {
    let host = normalize_host(host)?;
    let store = credential_store(ctx)?;
    let token = read_token(from_stdin)?;
    store.set(&host, &Credential::new(token))?;
    output::print(format!("Stored credential for {host}"), verbosity(ctx));
    Ok(())
}

/// Delete the token for `host`.
pub fn delete(ctx: &Context, host: &str) -> Result<()> {
    let host = normalize_host(host)?;
    credential_store(ctx)?.delete(&host)?;
    output::print(format!("Deleted credential for {host}"), verbosity(ctx));
    Ok(())
}

/// Report whether a token is stored for `host`; fails if none is.
pub fn check(ctx: &Context, host: &str) -> Result<()> {
    let host = normalize_host(host)?;
    let store = credential_store(ctx)?;
    if !store.exists(&host)? {
        bail!("no credential stored for {host} (provider: {})", store.provider());
    }
    output::print(
        format!("Credential stored for {host} (provider: {})", store.provider()),
        verbosity(ctx),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hosts_are_normalized() {
        assert_eq!(normalize_host(" Git.Example.com:8443 ").unwrap(), "git.example.com:8443");
        assert!(normalize_host("https://git.example.com/x").is_err());
        assert!(normalize_host("user@host").is_err());
        assert!(normalize_host("").is_err());
    }
}
