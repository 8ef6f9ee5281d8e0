//! cli::commands::push
//!
//! Push a branch through the dedicated push remote.
//!
//! A rejected push is an expected outcome when the remote moved on: it is
//! reported as a warning and the command still succeeds.

use anyhow::Result;

use super::{block_on, credential_for, parse_branch, parse_endpoint, verbosity, workspace_path};
use crate::cli::args::WorkspaceArg;
use crate::engine::{Context, PushOutcome};
use crate::ui::output;

/// Run the push command.
pub fn push(
    ctx: &Context,
    workspace: &WorkspaceArg,
    branch: &str,
    endpoint: &str,
    force: bool,
) -> Result<()> {
    let path = workspace_path(workspace)?;
    let branch = parse_branch(branch)?;
    let endpoint = parse_endpoint(endpoint)?;
    let credential = credential_for(ctx, &endpoint)?;

    let reconciler = ctx.reconciler().with_credential(credential);
    let outcome = block_on(reconciler.push(&path, &branch, &endpoint, force))??;

    match outcome {
        PushOutcome::Pushed => {
            output::print(
                format!("Pushed '{branch}' to {}", endpoint.redacted()),
                verbosity(ctx),
            );
            Ok(())
        }
        PushOutcome::Rejected => {
            output::warn(
                format!(
                    "push of '{branch}' was rejected by {} (use --force to overwrite)",
                    endpoint.redacted()
                ),
                verbosity(ctx),
            );
            Ok(())
        }
    }
}
