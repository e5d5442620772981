//! `--offline` backend: a JSON fixture file loaded into a
//! [`MemoryRepository`] and written back after every successful mutation.

use anyhow::{Context, Result};
use roster_core::error::RepoError;
use roster_core::model::{Incident, IncidentDraft, IncidentPage, IncidentPatch};
use roster_core::repo::memory::MemoryRepository;
use roster_core::repo::{IncidentRepository, RepoResult};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Recorded as creator, updater and chat author for offline writes.
pub const OFFLINE_ACTOR: &str = "offline@localhost";

pub struct FixtureRepository {
    inner: MemoryRepository,
    path: PathBuf,
}

impl FixtureRepository {
    /// Load `path`, a JSON array of incidents. A missing file starts empty.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but is not an incident array.
    pub fn open(path: &Path) -> Result<Self> {
        let incidents: Vec<Incident> = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read fixture {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse fixture {}", path.display()))?
        } else {
            Vec::new()
        };
        debug!(path = %path.display(), count = incidents.len(), "fixture loaded");

        Ok(Self {
            inner: MemoryRepository::new(OFFLINE_ACTOR).with_incidents(incidents),
            path: path.to_path_buf(),
        })
    }

    fn save(&self) -> RepoResult<()> {
        let json = serde_json::to_string_pretty(self.inner.stored())
            .map_err(|e| RepoError::Internal(format!("failed to encode fixture: {e}")))?;
        std::fs::write(&self.path, json).map_err(|e| {
            RepoError::Internal(format!(
                "failed to write fixture {}: {e}",
                self.path.display()
            ))
        })
    }
}

impl IncidentRepository for FixtureRepository {
    fn list(&mut self, limit: usize, offset: usize) -> RepoResult<IncidentPage> {
        self.inner.list(limit, offset)
    }

    fn get(&mut self, id: &str) -> RepoResult<Incident> {
        self.inner.get(id)
    }

    fn create(&mut self, draft: &IncidentDraft) -> RepoResult<Option<Incident>> {
        let created = self.inner.create(draft)?;
        self.save()?;
        Ok(created)
    }

    fn update(&mut self, id: &str, patch: &IncidentPatch) -> RepoResult<Incident> {
        let updated = self.inner.update(id, patch)?;
        self.save()?;
        Ok(updated)
    }

    fn delete(&mut self, id: &str) -> RepoResult<()> {
        self.inner.delete(id)?;
        self.save()
    }

    fn append_message(&mut self, id: &str, content: &str) -> RepoResult<Option<Incident>> {
        let updated = self.inner.append_message(id, content)?;
        self.save()?;
        Ok(updated)
    }
}
