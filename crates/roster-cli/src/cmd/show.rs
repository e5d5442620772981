//! `roster show`: full record of one incident, chat thread included.

use crate::cmd::{Context, local_time};
use crate::output::{fail, pretty_kv, pretty_rule, pretty_section, render_mode};
use clap::Args;
use roster_core::model::Incident;
use std::io::Write;

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Incident ID, e.g. INC-0042.
    pub id: String,
}

/// Execute `roster show <id>`.
///
/// # Errors
///
/// Returns an error when the incident cannot be fetched.
pub fn run_show(args: &ShowArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut engine = ctx.engine()?;
    let incident = engine
        .get_incident(args.id.trim())
        .map_err(|e| fail(ctx.output, &e))?;

    render_mode(ctx.output, &incident, render_show_text, render_show_pretty)
}

fn render_show_text(incident: &Incident, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "id\t{}", incident.id)?;
    writeln!(w, "title\t{}", incident.title)?;
    writeln!(w, "status\t{}", incident.status)?;
    writeln!(w, "priority\t{}", incident.priority)?;
    writeln!(w, "assigned_to\t{}", incident.assigned_to)?;
    writeln!(w, "created\t{}\t{}", incident.created_on.to_rfc3339(), incident.created_by)?;
    writeln!(w, "updated\t{}\t{}", incident.updated_on.to_rfc3339(), incident.updated_by)?;
    if let Some(ref description) = incident.description {
        writeln!(w, "description\t{}", description.replace('\n', " "))?;
    }
    for message in &incident.chat {
        writeln!(
            w,
            "chat\t{}\t{}\t{}",
            message.timestamp.to_rfc3339(),
            message.author_email,
            message.content.replace('\n', " ")
        )?;
    }
    Ok(())
}

fn render_show_pretty(incident: &Incident, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, &format!("Incident {}", incident.id))?;
    writeln!(w, "{}", incident.title)?;
    pretty_rule(w)?;
    pretty_kv(w, "status", incident.status.as_str())?;
    pretty_kv(w, "priority", incident.priority.as_str())?;
    if !incident.assigned_to.is_empty() {
        pretty_kv(w, "assigned", &incident.assigned_to)?;
    }
    pretty_kv(
        w,
        "created",
        format!("{} by {}", local_time(incident.created_on), incident.created_by),
    )?;
    pretty_kv(
        w,
        "updated",
        format!("{} by {}", local_time(incident.updated_on), incident.updated_by),
    )?;

    if let Some(ref description) = incident.description {
        writeln!(w)?;
        pretty_section(w, "Description")?;
        for line in description.lines() {
            writeln!(w, "{line}")?;
        }
    }

    if !incident.chat.is_empty() {
        writeln!(w)?;
        pretty_section(w, &format!("Chat ({})", incident.chat.len()))?;
        for message in &incident.chat {
            writeln!(
                w,
                "[{}] {}: {}",
                local_time(message.timestamp),
                message.author_email,
                message.content
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use roster_core::model::{ChatMessage, Priority, Status};

    fn sample() -> Incident {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        Incident {
            id: "INC-0007".into(),
            title: "Checkout latency".into(),
            description: Some("p99 above 2s\nsince deploy".into()),
            status: Status::InProgress,
            priority: Priority::High,
            assigned_to: "dev@example.com".into(),
            created_on: ts,
            created_by: "ops@example.com".into(),
            updated_on: ts,
            updated_by: "ops@example.com".into(),
            chat: vec![ChatMessage {
                author_email: "dev@example.com".into(),
                content: "rolling back".into(),
                timestamp: ts,
            }],
            is_deleted: false,
        }
    }

    #[test]
    fn show_args_take_an_id() {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: ShowArgs,
        }
        let w = Wrapper::parse_from(["test", "INC-0007"]);
        assert_eq!(w.args.id, "INC-0007");
        assert!(Wrapper::try_parse_from(["test"]).is_err());
    }

    #[test]
    fn text_output_is_one_field_per_line() {
        let mut buf = Vec::new();
        render_show_text(&sample(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("status\tIn Progress\n"));
        assert!(text.contains("description\tp99 above 2s since deploy\n"));
        assert!(text.contains("chat\t2024-03-01T09:30:00+00:00\tdev@example.com\trolling back\n"));
    }

    #[test]
    fn pretty_output_has_chat_section() {
        let mut buf = Vec::new();
        render_show_pretty(&sample(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("Incident INC-0007\n"));
        assert!(text.contains("Chat (1)"));
        assert!(text.contains("dev@example.com: rolling back"));
    }
}
