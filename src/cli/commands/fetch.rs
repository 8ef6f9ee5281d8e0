//! cli::commands::fetch

use anyhow::Result;

use super::{block_on, verbosity, workspace_path};
use crate::cli::args::WorkspaceArg;
use crate::engine::Context;
use crate::ui::output;

/// Run the fetch command.
pub fn fetch(ctx: &Context, workspace: &WorkspaceArg) -> Result<()> {
    let path = workspace_path(workspace)?;
    let reconciler = ctx.reconciler();

    block_on(reconciler.fetch(&path))??;

    output::print(
        format!("Fetched '{}'", reconciler.origin_remote()),
        verbosity(ctx),
    );
    Ok(())
}
