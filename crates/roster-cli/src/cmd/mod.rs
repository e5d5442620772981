pub mod chat;
pub mod completions;
pub mod create;
pub mod delete;
pub mod list;
pub mod show;
pub mod update;

use crate::fixture::FixtureRepository;
use crate::http::HttpRepository;
use crate::output::OutputMode;
use anyhow::Result;
use roster_core::config::ClientConfig;
use roster_core::{IncidentRepository, RosterEngine};
use std::path::PathBuf;
use tracing::debug;

pub type Engine = RosterEngine<Box<dyn IncidentRepository>>;

/// Everything a command needs besides its own arguments.
pub struct Context {
    pub output: OutputMode,
    pub config: ClientConfig,
    pub offline: Option<PathBuf>,
}

impl Context {
    /// Build an engine over the configured backend. Nothing is fetched yet.
    ///
    /// # Errors
    ///
    /// Returns an error when the offline fixture cannot be loaded or the
    /// configured status filter is invalid.
    pub fn engine(&self) -> Result<Engine> {
        let repo: Box<dyn IncidentRepository> = match &self.offline {
            Some(path) => {
                debug!(path = %path.display(), "using offline fixture");
                Box::new(FixtureRepository::open(path)?)
            }
            None => {
                debug!(base_url = %self.config.server.base_url, "using incident service");
                Box::new(HttpRepository::new(&self.config.server))
            }
        };

        let mut engine = RosterEngine::new(repo, self.config.roster.options());
        engine.set_status_filter(self.config.roster.status_filter()?);
        engine.set_sort_key(self.config.roster.sort);
        Ok(engine)
    }
}

/// Format a timestamp for human output in local time.
pub fn local_time(ts: chrono::DateTime<chrono::Utc>) -> String {
    ts.with_timezone(&chrono::Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}
