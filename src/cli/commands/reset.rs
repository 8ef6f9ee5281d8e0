//! cli::commands::reset
//!
//! Converge a directory onto a repository.

use anyhow::Result;

use super::{block_on, credential_for, parse_target, verbosity, workspace_path};
use crate::cli::args::{TargetArgs, WorkspaceArg};
use crate::engine::{Context, ResetOutcome};
use crate::ui::output;

/// Run the reset command.
pub fn reset(ctx: &Context, workspace: &WorkspaceArg, target: &TargetArgs) -> Result<()> {
    let path = workspace_path(workspace)?;
    let (branch, endpoint, mode) = parse_target(ctx, target)?;
    let credential = credential_for(ctx, &endpoint)?;

    let reconciler = ctx.reconciler().with_credential(credential);
    let outcome = block_on(reconciler.reset_repo(&path, branch.as_ref(), &endpoint, mode))??;

    let message = match outcome {
        ResetOutcome::Reset => "Reset to remote state",
        ResetOutcome::BareUpdated => "Updated bare repository",
        ResetOutcome::Recloned => "Cloned afresh",
    };
    output::print(
        format!("{message}: {} ({})", path.display(), endpoint.redacted()),
        verbosity(ctx),
    );
    Ok(())
}
