//! `roster chat`: append a message to an incident's chat thread.

use crate::cmd::Context;
use crate::output::{fail, render_mode};
use clap::Args;
use serde::Serialize;
use std::io::Write;

#[derive(Args, Debug)]
pub struct ChatArgs {
    /// Incident ID, e.g. INC-0042.
    pub id: String,

    /// Message text (trimmed; 1-1000 characters).
    pub message: String,
}

#[derive(Debug, Serialize)]
struct ChatOutput {
    ok: bool,
    id: String,
    content: String,
    /// Thread length after the append, when the service echoed the record.
    #[serde(skip_serializing_if = "Option::is_none")]
    messages: Option<usize>,
}

/// Execute `roster chat <id> <message>`.
///
/// Blank messages are rejected before any request is made.
///
/// # Errors
///
/// Returns an error for empty or oversized messages and repository failures.
pub fn run_chat(args: &ChatArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut engine = ctx.engine()?;
    let id = args.id.trim();
    let echoed = engine
        .append_chat_message(id, &args.message)
        .map_err(|e| fail(ctx.output, &e))?;

    let out = ChatOutput {
        ok: true,
        id: id.to_string(),
        content: args.message.trim().to_string(),
        messages: echoed.map(|incident| incident.chat.len()),
    };
    render_mode(ctx.output, &out, render_chat_text, render_chat_pretty)
}

fn render_chat_text(out: &ChatOutput, w: &mut dyn Write) -> std::io::Result<()> {
    match out.messages {
        Some(count) => writeln!(w, "sent\t{}\t{count}", out.id),
        None => writeln!(w, "sent\t{}", out.id),
    }
}

fn render_chat_pretty(out: &ChatOutput, w: &mut dyn Write) -> std::io::Result<()> {
    match out.messages {
        Some(count) => writeln!(w, "✓ Message sent to {} ({count} in thread)", out.id),
        None => writeln!(w, "✓ Message sent to {}", out.id),
    }
}
