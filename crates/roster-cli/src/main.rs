#![forbid(unsafe_code)]

mod cmd;
mod fixture;
mod http;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode, render_error};
use roster_core::config;
use roster_core::error::ErrorCode;
use std::env;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "roster: browse and triage incidents from the terminal",
    long_about = None
)]
struct Cli {
    /// Output format (overrides FORMAT and the config file).
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true)]
    json: bool,

    /// Config file to use instead of `<config dir>/roster/config.toml`.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Work against a local JSON fixture instead of the incident service.
    #[arg(long, global = true, value_name = "FIXTURE")]
    offline: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// `--format` wins, then `--json`, then env/config/TTY resolution.
    fn output_mode(&self, config_output: Option<&str>) -> OutputMode {
        self.format.unwrap_or_else(|| {
            OutputMode::from_name(&config::resolve_output(self.json, config_output))
        })
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Read",
        about = "List incidents",
        long_about = "Show one page of incidents, filtered by status and sorted by creation time.",
        after_help = "EXAMPLES:\n    # Newest incidents first (default)\n    roster list\n\n    # Open incidents, oldest first, page 2\n    roster list --status open --sort oldest --page 2\n\n    # Emit machine-readable output\n    roster list --json"
    )]
    List(cmd::list::ListArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show one incident",
        long_about = "Show the full record of one incident, including its chat thread.",
        after_help = "EXAMPLES:\n    # Show an incident\n    roster show INC-0042\n\n    # Emit machine-readable output\n    roster show INC-0042 --json"
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        next_help_heading = "Write",
        about = "Create an incident",
        after_help = "EXAMPLES:\n    # Create with defaults (Open, Medium)\n    roster create --title \"Checkout 500s\" --assignee dev@example.com\n\n    # Create a high-priority incident\n    roster create -t \"DB down\" --priority high -a dba@example.com"
    )]
    Create(cmd::create::CreateArgs),

    #[command(
        next_help_heading = "Write",
        about = "Update an incident",
        after_help = "EXAMPLES:\n    # Resolve an incident\n    roster update INC-0042 --status resolved\n\n    # Reassign and reprioritize\n    roster update INC-0042 --assignee sre@example.com --priority high"
    )]
    Update(cmd::update::UpdateArgs),

    #[command(
        next_help_heading = "Write",
        about = "Delete an incident",
        after_help = "EXAMPLES:\n    # Delete after confirming\n    roster delete INC-0042 --yes"
    )]
    Delete(cmd::delete::DeleteArgs),

    #[command(
        next_help_heading = "Write",
        about = "Post a chat message on an incident",
        after_help = "EXAMPLES:\n    # Post an update\n    roster chat INC-0042 \"Rolled back the deploy\""
    )]
    Chat(cmd::chat::ChatArgs),

    #[command(
        next_help_heading = "Setup",
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    roster completions bash\n\n    # Generate zsh completions\n    roster completions zsh"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("ROSTER_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "roster=debug,info"
        } else {
            "roster=info,warn"
        })
    });

    let format = env::var("ROSTER_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    if let Commands::Completions(args) = &cli.command {
        let mut command = Cli::command();
        return cmd::completions::run_completions(args.shell, &mut command);
    }

    let config = match config::resolve_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            let output = cli.output_mode(None);
            render_error(
                output,
                &CliError::coded(format!("{err:#}"), ErrorCode::ConfigParseError),
            )?;
            return Err(err);
        }
    };

    let ctx = cmd::Context {
        output: cli.output_mode(config.output.as_deref()),
        config,
        offline: cli.offline.clone(),
    };
    debug!(output = ?ctx.output, offline = ctx.offline.is_some(), "roster starting");

    match &cli.command {
        Commands::List(args) => cmd::list::run_list(args, &ctx),
        Commands::Show(args) => cmd::show::run_show(args, &ctx),
        Commands::Create(args) => cmd::create::run_create(args, &ctx),
        Commands::Update(args) => cmd::update::run_update(args, &ctx),
        Commands::Delete(args) => cmd::delete::run_delete(args, &ctx),
        Commands::Chat(args) => cmd::chat::run_chat(args, &ctx),
        Commands::Completions(_) => Ok(()),
    }
}
