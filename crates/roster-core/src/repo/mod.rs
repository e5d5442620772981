//! Data-access seam between the roster engine and the incident service.
//!
//! The engine only ever talks to an [`IncidentRepository`]. The CLI plugs in
//! an HTTP implementation; tests and offline use plug in
//! [`memory::MemoryRepository`].

pub mod memory;

use crate::error::RepoError;
use crate::model::{Incident, IncidentDraft, IncidentPage, IncidentPatch};

/// Largest `limit` the incident service accepts on `list`.
pub const MAX_FETCH_LIMIT: usize = 100;

pub type RepoResult<T> = Result<T, RepoError>;

/// CRUD and chat operations over the incident collection.
///
/// Implementations validate fields themselves; callers pass drafts and
/// patches through untouched.
pub trait IncidentRepository {
    /// One page of live (non-deleted) incidents.
    ///
    /// # Errors
    ///
    /// `Validation` when `limit` is outside `1..=MAX_FETCH_LIMIT`, `Auth` or
    /// `Network` on transport failures.
    fn list(&mut self, limit: usize, offset: usize) -> RepoResult<IncidentPage>;

    /// Full record, including the chat thread.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown or deleted ids.
    fn get(&mut self, id: &str) -> RepoResult<Incident>;

    /// Create an incident. Returns `None` when the service acknowledges the
    /// create without echoing the record back.
    ///
    /// # Errors
    ///
    /// `Validation` when the draft is rejected.
    fn create(&mut self, draft: &IncidentDraft) -> RepoResult<Option<Incident>>;

    /// # Errors
    ///
    /// `NotFound` for unknown ids, `Validation` for rejected or empty patches.
    fn update(&mut self, id: &str, patch: &IncidentPatch) -> RepoResult<Incident>;

    /// # Errors
    ///
    /// `NotFound` for unknown ids.
    fn delete(&mut self, id: &str) -> RepoResult<()>;

    /// Append to an incident's chat thread. Returns the updated incident when
    /// the service provides it.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown ids, `Validation` for rejected content.
    fn append_message(&mut self, id: &str, content: &str) -> RepoResult<Option<Incident>>;
}

impl<R: IncidentRepository + ?Sized> IncidentRepository for Box<R> {
    fn list(&mut self, limit: usize, offset: usize) -> RepoResult<IncidentPage> {
        (**self).list(limit, offset)
    }

    fn get(&mut self, id: &str) -> RepoResult<Incident> {
        (**self).get(id)
    }

    fn create(&mut self, draft: &IncidentDraft) -> RepoResult<Option<Incident>> {
        (**self).create(draft)
    }

    fn update(&mut self, id: &str, patch: &IncidentPatch) -> RepoResult<Incident> {
        (**self).update(id, patch)
    }

    fn delete(&mut self, id: &str) -> RepoResult<()> {
        (**self).delete(id)
    }

    fn append_message(&mut self, id: &str, content: &str) -> RepoResult<Option<Incident>> {
        (**self).append_message(id, content)
    }
}

/// `ceil(total / page_size)`, zero when there is nothing to page.
#[must_use]
pub const fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

#[cfg(test)]
mod tests {
    use super::page_count;

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(page_count(0, 5), 0);
        assert_eq!(page_count(1, 5), 1);
        assert_eq!(page_count(10, 5), 2);
        assert_eq!(page_count(11, 5), 3);
        assert_eq!(page_count(3, 0), 0);
    }
}
