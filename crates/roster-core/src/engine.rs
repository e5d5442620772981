//! The roster engine: a cached, filterable, sortable, paginated view over
//! the incident collection.
//!
//! The engine owns the cache and the view inputs. Every mutation goes
//! through the injected [`IncidentRepository`]; on success the cache is
//! refreshed from the repository rather than patched locally, so it always
//! mirrors the server's canonical records (ids, timestamps, ordering).
//!
//! Derived state is recomputed synchronously by [`derive_view`] after every
//! input change. Operations take `&mut self`, so calls through one engine
//! are serialized and the last completed write to the cache wins.

use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::error::RosterError;
use crate::model::{Incident, IncidentDraft, IncidentPatch, chat::normalize_message};
use crate::repo::{IncidentRepository, MAX_FETCH_LIMIT, RepoResult};
use crate::view::{DEFAULT_PAGE_SIZE, DerivedView, SortKey, StatusFilter, ViewState, derive_view};

/// Full offset walks `load` makes before settling for a shifting listing.
const MAX_LOAD_ATTEMPTS: usize = 3;

/// Construction-time knobs for [`RosterEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RosterOptions {
    /// Rows per roster page.
    pub page_size: usize,
    /// `limit` used for each `list` call while loading; clamped to
    /// `1..=MAX_FETCH_LIMIT`.
    pub fetch_limit: usize,
}

impl Default for RosterOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            fetch_limit: MAX_FETCH_LIMIT,
        }
    }
}

pub struct RosterEngine<R> {
    repo: R,
    fetch_limit: usize,
    incidents: Vec<Incident>,
    state: ViewState,
    view: DerivedView,
    loaded: bool,
    last_error: Option<RosterError>,
}

impl<R: IncidentRepository> RosterEngine<R> {
    /// An empty engine. Nothing is fetched until [`load`](Self::load).
    pub fn new(repo: R, options: RosterOptions) -> Self {
        let state = ViewState {
            page_size: options.page_size.max(1),
            ..ViewState::default()
        };
        Self {
            repo,
            fetch_limit: options.fetch_limit.clamp(1, MAX_FETCH_LIMIT),
            incidents: Vec::new(),
            view: derive_view(&[], &state),
            state,
            loaded: false,
            last_error: None,
        }
    }

    // -----------------------------------------------------------------------
    // Fetching
    // -----------------------------------------------------------------------

    /// Replace the cache with the repository's full incident collection.
    ///
    /// On failure the previous cache is kept and the error is recorded.
    ///
    /// # Errors
    ///
    /// Any [`RepoError`](crate::error::RepoError) from `list`.
    pub fn load(&mut self) -> Result<(), RosterError> {
        match self.fetch_all() {
            Ok(incidents) => {
                debug!(count = incidents.len(), "roster cache replaced");
                self.incidents = incidents;
                self.loaded = true;
                self.last_error = None;
                self.refresh_view();
                Ok(())
            }
            Err(err) => Err(self.record(err.into())),
        }
    }

    fn fetch_all(&mut self) -> RepoResult<Vec<Incident>> {
        let mut attempt = 1;
        loop {
            let (incidents, shifted) = self.fetch_pass()?;
            if !shifted {
                return Ok(incidents);
            }
            if attempt >= MAX_LOAD_ATTEMPTS {
                warn!(attempts = attempt, "listing kept changing during load; keeping last pass");
                return Ok(incidents);
            }
            debug!(attempt, "listing changed mid-load; restarting");
            attempt += 1;
        }
    }

    /// One offset walk over `list`. The flag is set when the listing moved
    /// underneath the walk: `total_count` changed or an id came back twice.
    /// Repeated ids are kept once either way.
    fn fetch_pass(&mut self) -> RepoResult<(Vec<Incident>, bool)> {
        let limit = self.fetch_limit;
        let mut offset = 0;
        let mut expected_total = None;
        let mut shifted = false;
        let mut seen = HashSet::new();
        let mut incidents = Vec::new();

        loop {
            let page = self.repo.list(limit, offset)?;
            let received = page.incidents.len();
            if *expected_total.get_or_insert(page.total_count) != page.total_count {
                shifted = true;
            }
            for incident in page.incidents {
                if incident.is_deleted {
                    continue;
                }
                if seen.insert(incident.id.clone()) {
                    incidents.push(incident);
                } else {
                    shifted = true;
                }
            }
            offset += received;

            if received < limit || offset >= page.total_count {
                break;
            }
        }

        Ok((incidents, shifted))
    }

    /// Fetch one incident with its chat thread and swap it into the cache.
    ///
    /// Records that are not cached are returned without being added.
    ///
    /// # Errors
    ///
    /// `NotFound` for stale ids, plus transport errors.
    pub fn get_incident(&mut self, id: &str) -> Result<Incident, RosterError> {
        match self.repo.get(id) {
            Ok(incident) => {
                self.last_error = None;
                self.replace_cached(incident.clone());
                Ok(incident)
            }
            Err(err) => Err(self.record(err.into())),
        }
    }

    // -----------------------------------------------------------------------
    // View inputs
    // -----------------------------------------------------------------------

    pub fn set_status_filter(&mut self, filter: StatusFilter) {
        self.state.status_filter = filter;
        self.refresh_view();
    }

    pub fn set_sort_key(&mut self, key: SortKey) {
        self.state.sort_key = key;
        self.refresh_view();
    }

    /// Change rows per page; 0 is treated as 1.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.state.page_size = page_size.max(1);
        self.refresh_view();
    }

    /// Move to page `n` when it exists. Returns whether the cursor moved.
    pub fn go_to_page(&mut self, n: usize) -> bool {
        if n == 0 || n > self.view.total_pages {
            return false;
        }
        self.state.page = n;
        self.refresh_view();
        true
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Create an incident, then reload the cache.
    ///
    /// A failed reload after a successful create is recorded in
    /// [`last_error`](Self::last_error) but does not fail the call.
    ///
    /// # Errors
    ///
    /// The repository's error when the create itself fails; the cache is
    /// untouched in that case.
    pub fn create_incident(
        &mut self,
        draft: &IncidentDraft,
    ) -> Result<Option<Incident>, RosterError> {
        let created = self.repo.create(draft).map_err(|e| self.record(e.into()))?;
        info!(title = %draft.title, "incident created");
        self.reload_after_mutation();
        Ok(created)
    }

    /// Update an incident, then reload the cache.
    ///
    /// # Errors
    ///
    /// The repository's error; the cache is untouched in that case.
    pub fn update_incident(
        &mut self,
        id: &str,
        patch: &IncidentPatch,
    ) -> Result<Incident, RosterError> {
        let updated = self
            .repo
            .update(id, patch)
            .map_err(|e| self.record(e.into()))?;
        info!(id, "incident updated");
        self.reload_after_mutation();
        Ok(updated)
    }

    /// Delete an incident, then reload the cache. Confirmation is the
    /// caller's job.
    ///
    /// # Errors
    ///
    /// The repository's error (including `NotFound`); the cache is untouched
    /// in that case.
    pub fn delete_incident(&mut self, id: &str) -> Result<(), RosterError> {
        self.repo.delete(id).map_err(|e| self.record(e.into()))?;
        info!(id, "incident deleted");
        self.reload_after_mutation();
        Ok(())
    }

    /// Append a chat message to an incident.
    ///
    /// Content is trimmed; blank or oversized content is rejected without
    /// contacting the repository. When the repository returns the updated
    /// incident it replaces the cached entry and is handed back. An echo
    /// for an engine that has never loaded leaves the empty cache alone;
    /// every other case reloads.
    ///
    /// # Errors
    ///
    /// [`RosterError::EmptyMessage`], [`RosterError::MessageTooLong`], or the
    /// repository's error.
    pub fn append_chat_message(
        &mut self,
        incident_id: &str,
        content: &str,
    ) -> Result<Option<Incident>, RosterError> {
        let content = match normalize_message(content) {
            Ok(Some(content)) => content,
            Ok(None) => return Err(self.record(RosterError::EmptyMessage)),
            Err(len) => return Err(self.record(RosterError::too_long(len))),
        };

        let updated = self
            .repo
            .append_message(incident_id, content)
            .map_err(|e| self.record(e.into()))?;
        debug!(id = incident_id, "chat message appended");

        match &updated {
            Some(incident) if self.is_cached(&incident.id) => {
                self.last_error = None;
                self.replace_cached(incident.clone());
            }
            Some(_) if !self.loaded => self.last_error = None,
            _ => self.reload_after_mutation(),
        }
        Ok(updated)
    }

    fn reload_after_mutation(&mut self) {
        self.last_error = None;
        if let Err(err) = self.load() {
            warn!(error = %err, "reload after mutation failed; cache may be stale");
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn record(&mut self, err: RosterError) -> RosterError {
        warn!(error = %err, code = %err.code(), "roster operation failed");
        self.last_error = Some(err.clone());
        err
    }

    fn is_cached(&self, id: &str) -> bool {
        self.incidents.iter().any(|i| i.id == id)
    }

    fn replace_cached(&mut self, incident: Incident) {
        if incident.is_deleted {
            self.incidents.retain(|i| i.id != incident.id);
        } else if let Some(slot) = self.incidents.iter_mut().find(|i| i.id == incident.id) {
            *slot = incident;
        } else {
            return;
        }
        self.refresh_view();
    }

    fn refresh_view(&mut self) {
        self.view = derive_view(&self.incidents, &self.state);
        if self.view.page != self.state.page {
            debug!(from = self.state.page, to = self.view.page, "page cursor reset");
        }
        self.state.page = self.view.page;
    }

    // -----------------------------------------------------------------------
    // Observable state
    // -----------------------------------------------------------------------

    /// Incidents on the current page, in roster order.
    #[must_use]
    pub fn visible_page(&self) -> Vec<&Incident> {
        self.view
            .visible_indices()
            .iter()
            .map(|&i| &self.incidents[i])
            .collect()
    }

    /// Every incident that passes the filter, in roster order.
    pub fn filtered_sorted(&self) -> impl Iterator<Item = &Incident> {
        self.view.order.iter().map(|&i| &self.incidents[i])
    }

    /// The cache, in the order the repository listed it.
    #[must_use]
    pub fn all_incidents(&self) -> &[Incident] {
        &self.incidents
    }

    #[must_use]
    pub fn incident(&self, id: &str) -> Option<&Incident> {
        self.incidents.iter().find(|i| i.id == id)
    }

    #[must_use]
    pub fn total_count(&self) -> usize {
        self.view.total_count()
    }

    #[must_use]
    pub const fn total_pages(&self) -> usize {
        self.view.total_pages
    }

    #[must_use]
    pub const fn page(&self) -> usize {
        self.state.page
    }

    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.state.page_size
    }

    #[must_use]
    pub const fn status_filter(&self) -> StatusFilter {
        self.state.status_filter
    }

    #[must_use]
    pub const fn sort_key(&self) -> SortKey {
        self.state.sort_key
    }

    /// True once a load has succeeded.
    #[must_use]
    pub const fn has_loaded(&self) -> bool {
        self.loaded
    }

    #[must_use]
    pub const fn last_error(&self) -> Option<&RosterError> {
        self.last_error.as_ref()
    }

    /// True when the most recent failure was an authentication failure.
    #[must_use]
    pub fn needs_reauth(&self) -> bool {
        self.last_error.as_ref().is_some_and(RosterError::is_auth)
    }

    #[must_use]
    pub const fn repo(&self) -> &R {
        &self.repo
    }

    pub fn repo_mut(&mut self) -> &mut R {
        &mut self.repo
    }
}
