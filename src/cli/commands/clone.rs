//! cli::commands::clone

use anyhow::Result;

use super::{block_on, credential_for, parse_target, verbosity, workspace_path};
use crate::cli::args::{TargetArgs, WorkspaceArg};
use crate::engine::Context;
use crate::ui::output;

/// Run the clone command.
pub fn clone(ctx: &Context, workspace: &WorkspaceArg, target: &TargetArgs) -> Result<()> {
    let path = workspace_path(workspace)?;
    let (branch, endpoint, mode) = parse_target(ctx, target)?;
    let credential = credential_for(ctx, &endpoint)?;

    let reconciler = ctx.reconciler();
    block_on(reconciler.clone(&path, branch.as_ref(), &endpoint, mode, credential.as_ref()))??;

    output::print(
        format!("Cloned {} into {} ({mode})", endpoint.redacted(), path.display()),
        verbosity(ctx),
    );
    Ok(())
}
