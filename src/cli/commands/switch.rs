//! cli::commands::switch

use anyhow::Result;

use super::{block_on, parse_branch, verbosity, workspace_path};
use crate::cli::args::WorkspaceArg;
use crate::engine::{Context, SwitchOutcome};
use crate::ui::output;

/// Run the switch command.
pub fn switch(ctx: &Context, workspace: &WorkspaceArg, branch: &str, overwrite: bool) -> Result<()> {
    let path = workspace_path(workspace)?;
    let branch = parse_branch(branch)?;

    let outcome = block_on(ctx.reconciler().switch_to_branch(&path, &branch, overwrite))??;

    let message = match outcome {
        SwitchOutcome::AlreadyOn => format!("Already on '{branch}'"),
        SwitchOutcome::Created => format!("Switched to new branch '{branch}'"),
        SwitchOutcome::Recreated => format!("Recreated '{branch}' at HEAD"),
        SwitchOutcome::CheckedOut => format!("Switched to branch '{branch}'"),
    };
    output::print(message, verbosity(ctx));
    Ok(())
}
