//! `roster delete`: remove an incident from the roster.
//!
//! The service soft-deletes; the record disappears from every listing.
//! Confirmation is explicit: without `--yes` nothing is sent.

use crate::cmd::Context;
use crate::output::{CliError, fail, render_error, render_mode};
use clap::Args;
use serde::Serialize;

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Incident ID, e.g. INC-0042.
    pub id: String,

    /// Confirm the deletion.
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Debug, Serialize)]
struct DeleteOutput {
    ok: bool,
    id: String,
    total_count: usize,
}

/// Execute `roster delete <id> --yes`.
///
/// # Errors
///
/// Returns an error when `--yes` is missing or the service refuses.
pub fn run_delete(args: &DeleteArgs, ctx: &Context) -> anyhow::Result<()> {
    let id = args.id.trim();
    if !args.yes {
        render_error(
            ctx.output,
            &CliError::with_details(
                format!("refusing to delete {id} without confirmation"),
                format!("re-run with `roster delete {id} --yes`"),
                "confirmation_required",
            ),
        )?;
        anyhow::bail!("deletion of '{id}' not confirmed");
    }

    let mut engine = ctx.engine()?;
    engine.delete_incident(id).map_err(|e| fail(ctx.output, &e))?;

    let out = DeleteOutput {
        ok: true,
        id: id.to_string(),
        total_count: engine.all_incidents().len(),
    };
    render_mode(
        ctx.output,
        &out,
        |out, w| writeln!(w, "deleted\t{}", out.id),
        |out, w| {
            writeln!(w, "✓ Deleted {}", out.id)?;
            writeln!(w, "  {} incidents on the roster", out.total_count)
        },
    )
}
