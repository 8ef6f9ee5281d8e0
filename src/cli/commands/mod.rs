//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Validates command-specific arguments into core types
//! 2. Calls the engine to execute the command
//! 3. Formats and displays output through `ui::output`
//!
//! # Async Commands
//!
//! The engine is async because every git invocation is an `.await` point.
//! Handlers are synchronous wrappers that build a tokio runtime per command
//! with [`block_on`].

mod branches;
mod clone;
mod commit;
mod completion;
mod config_cmd;
mod credential;
mod fetch;
mod log_cmd;
mod mirror;
mod push;
mod reset;
mod status;
mod switch;

pub use branches::branches;
pub use clone::clone;
pub use commit::commit;
pub use completion::completion;
pub use config_cmd::{path as config_path, show as config_show};
pub use credential::{check as credential_check, delete as credential_delete, set as credential_set};
pub use fetch::fetch;
pub use log_cmd::log;
pub use mirror::mirror;
pub use push::push;
pub use reset::reset;
pub use status::status;
pub use switch::switch;

use std::future::Future;
use std::path::PathBuf;

use anyhow::{Context as _, Result};

use crate::cli::args::{Command, ConfigAction, CredentialAction, TargetArgs, WorkspaceArg};
use crate::core::clone_mode::CloneMode;
use crate::core::endpoint::{Credential, Endpoint};
use crate::core::types::BranchName;
use crate::engine::Context;
use crate::secrets::{create_store, CredentialStore, DEFAULT_PROVIDER};
use crate::ui::output::Verbosity;

pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Reset { workspace, target } => reset::reset(ctx, &workspace, &target),
        Command::Clone { workspace, target } => clone::clone(ctx, &workspace, &target),
        Command::Mirror {
            workspace,
            remote,
            json,
        } => mirror::mirror(ctx, &workspace, remote.as_deref(), json),
        Command::Switch {
            branch,
            workspace,
            overwrite,
        } => switch::switch(ctx, &workspace, &branch, overwrite),
        Command::Commit {
            workspace,
            message,
            branch,
        } => commit::commit(ctx, &workspace, &message, &branch),
        Command::Push {
            workspace,
            branch,
            endpoint,
            force,
        } => push::push(ctx, &workspace, &branch, &endpoint, force),
        Command::Fetch { workspace } => fetch::fetch(ctx, &workspace),
        Command::Status { workspace, json } => status::status(ctx, &workspace, json),
        Command::Log {
            workspace,
            limit,
            json,
        } => log_cmd::log(ctx, &workspace, limit, json),
        Command::Branches {
            workspace,
            remote,
            json,
        } => branches::branches(ctx, &workspace, remote.as_deref(), json),
        Command::Credential { action } => match action {
            CredentialAction::Set { host, stdin } => credential::set(ctx, &host, stdin),
            CredentialAction::Delete { host } => credential::delete(ctx, &host),
            CredentialAction::Check { host } => credential::check(ctx, &host),
        },
        Command::Config { action } => match action {
            ConfigAction::Show => config_cmd::show(ctx),
            ConfigAction::Path => config_cmd::path(ctx),
        },
        Command::Completion { shell } => completion::completion(shell),
    }
}

/// Run `future` to completion on a fresh runtime.
pub(crate) fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let rt = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    Ok(rt.block_on(future))
}

pub(crate) fn verbosity(ctx: &Context) -> Verbosity {
    Verbosity::from_flags(ctx.quiet, ctx.debug)
}

/// The workspace directory: the argument, or the current directory.
pub(crate) fn workspace_path(arg: &WorkspaceArg) -> Result<PathBuf> {
    match &arg.path {
        Some(path) => Ok(path.clone()),
        None => std::env::current_dir().context("cannot determine current directory"),
    }
}

pub(crate) fn parse_branch(name: &str) -> Result<BranchName> {
    BranchName::new(name).with_context(|| format!("'{name}' is not a usable branch name"))
}

pub(crate) fn parse_endpoint(url: &str) -> Result<Endpoint> {
    // The rejected text may carry a credential.
    Endpoint::new(url).map_err(|_| {
        anyhow::anyhow!(
            "'{}' is not a usable repository URL",
            crate::core::endpoint::strip_credentials(url)
        )
    })
}

/// Validated (branch, endpoint, mode) from `--branch/--endpoint/--mode`.
pub(crate) fn parse_target(
    ctx: &Context,
    target: &TargetArgs,
) -> Result<(Option<BranchName>, Endpoint, CloneMode)> {
    let branch = target.branch.as_deref().map(parse_branch).transpose()?;
    let endpoint = parse_endpoint(&target.endpoint)?;
    let mode = match &target.mode {
        Some(name) => name.parse::<CloneMode>()?,
        None => ctx.config.global.default_clone_mode(),
    };
    Ok((branch, endpoint, mode))
}

/// The configured credential store.
pub(crate) fn credential_store(ctx: &Context) -> Result<Box<dyn CredentialStore>> {
    let provider = ctx
        .config
        .global
        .credentials
        .as_ref()
        .map(|c| c.provider())
        .unwrap_or(DEFAULT_PROVIDER);
    Ok(create_store(provider)?)
}

/// Stored credential for the endpoint's host, for HTTP(S) endpoints only.
pub(crate) fn credential_for(ctx: &Context, endpoint: &Endpoint) -> Result<Option<Credential>> {
    if !endpoint.uses_http_transport() {
        return Ok(None);
    }
    let Some(host) = endpoint.host() else {
        return Ok(None);
    };
    let credential = credential_store(ctx)?.get(&host)?;
    tracing::debug!(%host, found = credential.is_some(), "credential lookup");
    Ok(credential)
}
