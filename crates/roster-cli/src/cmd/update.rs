//! `roster update`: change fields of an existing incident.

use crate::cmd::Context;
use crate::output::{CliError, fail, render_error, render_mode};
use clap::Args;
use roster_core::error::ErrorCode;
use roster_core::model::{Incident, IncidentPatch, Priority, Status};
use std::io::Write;

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Incident ID, e.g. INC-0042.
    pub id: String,

    #[arg(short, long)]
    pub title: Option<String>,

    #[arg(short, long)]
    pub description: Option<String>,

    #[arg(short, long)]
    pub status: Option<Status>,

    #[arg(long)]
    pub priority: Option<Priority>,

    /// New assignee email.
    #[arg(short, long)]
    pub assignee: Option<String>,
}

impl UpdateArgs {
    fn patch(&self) -> IncidentPatch {
        IncidentPatch {
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status,
            priority: self.priority,
            assigned_to: self.assignee.clone(),
        }
    }
}

/// Execute `roster update <id>`.
///
/// # Errors
///
/// Returns an error when no field was given or the service rejects the patch.
pub fn run_update(args: &UpdateArgs, ctx: &Context) -> anyhow::Result<()> {
    let patch = args.patch();
    if patch.is_empty() {
        render_error(
            ctx.output,
            &CliError::coded("no fields provided for update", ErrorCode::ValidationFailed),
        )?;
        anyhow::bail!("no fields provided for update");
    }

    let mut engine = ctx.engine()?;
    let updated = engine
        .update_incident(args.id.trim(), &patch)
        .map_err(|e| fail(ctx.output, &e))?;

    render_mode(ctx.output, &updated, render_update_text, render_update_pretty)
}

fn render_update_text(incident: &Incident, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(
        w,
        "updated\t{}\t{}\t{}\t{}",
        incident.id, incident.status, incident.priority, incident.title
    )
}

fn render_update_pretty(incident: &Incident, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "✓ Updated {}: {}", incident.id, incident.title)?;
    writeln!(
        w,
        "  {} · {} · assigned to {}",
        incident.status, incident.priority, incident.assigned_to
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: UpdateArgs,
    }

    #[test]
    fn only_given_fields_are_patched() {
        let w = Wrapper::parse_from(["test", "INC-0003", "--status", "resolved"]);
        assert_eq!(
            w.args.patch(),
            IncidentPatch {
                status: Some(Status::Resolved),
                ..IncidentPatch::default()
            }
        );
    }

    #[test]
    fn bare_update_is_an_empty_patch() {
        let w = Wrapper::parse_from(["test", "INC-0003"]);
        assert!(w.args.patch().is_empty());
    }
}
