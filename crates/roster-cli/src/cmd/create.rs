//! `roster create`: open a new incident.

use crate::cmd::Context;
use crate::output::{fail, render_mode};
use clap::Args;
use roster_core::model::{Incident, IncidentDraft, Priority, Status};
use serde::Serialize;
use std::io::Write;

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Incident title (1-200 characters).
    #[arg(short, long)]
    pub title: String,

    /// Longer description.
    #[arg(short, long)]
    pub description: Option<String>,

    /// Initial status.
    #[arg(short, long, default_value_t = Status::Open)]
    pub status: Status,

    /// Priority: low, medium, high.
    #[arg(long, default_value_t = Priority::Medium)]
    pub priority: Priority,

    /// Email of the person the incident is assigned to.
    #[arg(short, long)]
    pub assignee: String,
}

impl CreateArgs {
    fn draft(&self) -> IncidentDraft {
        let draft = IncidentDraft::new(self.title.clone(), self.assignee.clone())
            .status(self.status)
            .priority(self.priority);
        match &self.description {
            Some(description) => draft.description(description.clone()),
            None => draft,
        }
    }
}

#[derive(Debug, Serialize)]
struct CreateOutput {
    ok: bool,
    title: String,
    /// Present when the service echoed the new record back.
    #[serde(skip_serializing_if = "Option::is_none")]
    incident: Option<Incident>,
    total_count: usize,
}

/// Execute `roster create`.
///
/// # Errors
///
/// Returns an error when the service rejects the draft.
pub fn run_create(args: &CreateArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut engine = ctx.engine()?;
    let draft = args.draft();
    let incident = engine
        .create_incident(&draft)
        .map_err(|e| fail(ctx.output, &e))?;

    let out = CreateOutput {
        ok: true,
        title: draft.title,
        incident,
        total_count: engine.all_incidents().len(),
    };

    render_mode(ctx.output, &out, render_create_text, render_create_pretty)
}

fn render_create_text(out: &CreateOutput, w: &mut dyn Write) -> std::io::Result<()> {
    match &out.incident {
        Some(incident) => writeln!(w, "created\t{}\t{}", incident.id, incident.title),
        None => writeln!(w, "created\t-\t{}", out.title),
    }
}

fn render_create_pretty(out: &CreateOutput, w: &mut dyn Write) -> std::io::Result<()> {
    match &out.incident {
        Some(incident) => writeln!(w, "✓ Created {}: {}", incident.id, incident.title)?,
        None => writeln!(w, "✓ Created: {}", out.title)?,
    }
    writeln!(w, "  {} incidents on the roster", out.total_count)
}
