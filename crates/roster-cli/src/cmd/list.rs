//! `roster list`: one page of the filtered, sorted roster.

use crate::cmd::{Context, local_time};
use crate::output::{CliError, fail, pretty_rule, pretty_section, render_error, render_mode};
use clap::Args;
use roster_core::model::{Incident, Priority, Status};
use roster_core::view::{SortKey, StatusFilter};
use serde::Serialize;
use std::io::Write;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Status filter: all, open, in-progress, resolved.
    #[arg(short, long)]
    pub status: Option<StatusFilter>,

    /// Sort by creation time: newest or oldest.
    #[arg(long)]
    pub sort: Option<SortKey>,

    /// Page to show (1-based).
    #[arg(short, long, default_value_t = 1)]
    pub page: usize,

    /// Rows per page.
    #[arg(short = 'n', long)]
    pub page_size: Option<usize>,
}

#[derive(Debug, Serialize)]
struct ListOutput {
    status_filter: String,
    sort: SortKey,
    page: usize,
    page_size: usize,
    total_pages: usize,
    total_count: usize,
    incidents: Vec<ListRow>,
}

#[derive(Debug, Serialize)]
struct ListRow {
    id: String,
    title: String,
    status: Status,
    priority: Priority,
    created_on: chrono::DateTime<chrono::Utc>,
    created_by: String,
}

impl From<&Incident> for ListRow {
    fn from(incident: &Incident) -> Self {
        Self {
            id: incident.id.clone(),
            title: incident.title.clone(),
            status: incident.status,
            priority: incident.priority,
            created_on: incident.created_on,
            created_by: incident.created_by.clone(),
        }
    }
}

/// Execute `roster list`.
///
/// # Errors
///
/// Returns an error when loading fails or the requested page does not exist.
pub fn run_list(args: &ListArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut engine = ctx.engine()?;
    if let Some(size) = args.page_size {
        engine.set_page_size(size);
    }
    if let Some(filter) = args.status {
        engine.set_status_filter(filter);
    }
    if let Some(sort) = args.sort {
        engine.set_sort_key(sort);
    }

    engine.load().map_err(|e| fail(ctx.output, &e))?;

    if args.page != 1 && !engine.go_to_page(args.page) {
        render_error(
            ctx.output,
            &CliError::with_details(
                format!("page {} does not exist", args.page),
                format!("choose a page between 1 and {}", engine.total_pages().max(1)),
                "page_out_of_range",
            ),
        )?;
        anyhow::bail!("page {} does not exist", args.page);
    }

    let out = ListOutput {
        status_filter: engine.status_filter().to_string(),
        sort: engine.sort_key(),
        page: engine.page(),
        page_size: engine.page_size(),
        total_pages: engine.total_pages(),
        total_count: engine.total_count(),
        incidents: engine.visible_page().into_iter().map(ListRow::from).collect(),
    };

    render_mode(ctx.output, &out, render_list_text, render_list_pretty)
}

fn render_list_text(out: &ListOutput, w: &mut dyn Write) -> std::io::Result<()> {
    for row in &out.incidents {
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}",
            row.id,
            row.status,
            row.priority,
            row.created_on.to_rfc3339(),
            row.title
        )?;
    }
    Ok(())
}

fn render_list_pretty(out: &ListOutput, w: &mut dyn Write) -> std::io::Result<()> {
    if out.incidents.is_empty() {
        return writeln!(w, "No incidents found.");
    }

    pretty_section(
        w,
        &format!(
            "Incidents ({}, status: {}, {} first)",
            out.total_count, out.status_filter, out.sort
        ),
    )?;
    writeln!(
        w,
        "{:<10} {:<12} {:<8} {:<19}  TITLE",
        "ID", "STATUS", "PRIORITY", "CREATED"
    )?;
    for row in &out.incidents {
        writeln!(
            w,
            "{:<10} {:<12} {:<8} {:<19}  {}",
            row.id,
            row.status.as_str(),
            row.priority.as_str(),
            local_time(row.created_on),
            row.title
        )?;
    }
    pretty_rule(w)?;
    writeln!(w, "page {} of {}", out.page, out.total_pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: ListArgs,
    }

    #[test]
    fn list_args_defaults() {
        let w = Wrapper::parse_from(["test"]);
        assert!(w.args.status.is_none());
        assert!(w.args.sort.is_none());
        assert_eq!(w.args.page, 1);
        assert!(w.args.page_size.is_none());
    }

    #[test]
    fn list_args_parse_filter_and_sort() {
        let w = Wrapper::parse_from([
            "test",
            "--status",
            "in-progress",
            "--sort",
            "oldest",
            "-p",
            "2",
            "-n",
            "10",
        ]);
        assert_eq!(w.args.status, Some(StatusFilter::Only(Status::InProgress)));
        assert_eq!(w.args.sort, Some(SortKey::Oldest));
        assert_eq!(w.args.page, 2);
        assert_eq!(w.args.page_size, Some(10));
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!(Wrapper::try_parse_from(["test", "--status", "closed"]).is_err());
    }

    #[test]
    fn empty_pretty_list_says_so() {
        let out = ListOutput {
            status_filter: "all".into(),
            sort: SortKey::Newest,
            page: 1,
            page_size: 5,
            total_pages: 0,
            total_count: 0,
            incidents: Vec::new(),
        };
        let mut buf = Vec::new();
        render_list_pretty(&out, &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "No incidents found.\n");
    }
}
