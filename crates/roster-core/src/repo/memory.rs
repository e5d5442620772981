//! In-memory [`IncidentRepository`] with the incident service's validation
//! rules and soft-delete semantics.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use super::{IncidentRepository, MAX_FETCH_LIMIT, RepoResult, page_count};
use crate::error::RepoError;
use crate::model::{
    ChatMessage, Incident, IncidentDraft, IncidentPage, IncidentPatch, MAX_MESSAGE_CHARS,
    MAX_TITLE_CHARS,
};

#[derive(Debug, Clone)]
enum Clock {
    System,
    /// Starts at `next` and advances by `step` on every read.
    Stepped { next: DateTime<Utc>, step: Duration },
}

impl Clock {
    fn now(&mut self) -> DateTime<Utc> {
        match self {
            Self::System => Utc::now(),
            Self::Stepped { next, step } => {
                let now = *next;
                *next = now + *step;
                now
            }
        }
    }
}

/// Incident store held in a `Vec`, in insertion order.
#[derive(Debug, Clone)]
pub struct MemoryRepository {
    actor: String,
    incidents: Vec<Incident>,
    next_id: u64,
    clock: Clock,
    /// Successful requests still to serve, then the error to fail with.
    pending_failure: Option<(usize, RepoError)>,
    echo_writes: bool,
    requests: usize,
}

impl MemoryRepository {
    /// Empty store; `actor` is recorded as creator/updater/chat author.
    pub fn new(actor: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
            incidents: Vec::new(),
            next_id: 1,
            clock: Clock::System,
            pending_failure: None,
            echo_writes: true,
            requests: 0,
        }
    }

    /// Seed the store with existing records (ids are kept as-is).
    #[must_use]
    pub fn with_incidents(mut self, incidents: Vec<Incident>) -> Self {
        let highest = incidents
            .iter()
            .filter_map(|i| i.id.strip_prefix("INC-")?.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        self.next_id = self.next_id.max(highest + 1);
        self.incidents = incidents;
        self
    }

    /// Use a deterministic clock that starts at `start` and ticks by `step`.
    #[must_use]
    pub const fn with_clock(mut self, start: DateTime<Utc>, step: Duration) -> Self {
        self.clock = Clock::Stepped { next: start, step };
        self
    }

    /// When false, `create` and `append_message` acknowledge without
    /// returning the record, like the form-post endpoints do.
    #[must_use]
    pub const fn echo_writes(mut self, echo: bool) -> Self {
        self.echo_writes = echo;
        self
    }

    /// Fail the next request (of any kind) with `err`.
    pub fn fail_next(&mut self, err: RepoError) {
        self.fail_after(0, err);
    }

    /// Serve `successes` more requests normally, then fail the one after
    /// with `err`.
    pub fn fail_after(&mut self, successes: usize, err: RepoError) {
        self.pending_failure = Some((successes, err));
    }

    /// Number of requests served so far, failed ones included.
    #[must_use]
    pub const fn requests(&self) -> usize {
        self.requests
    }

    /// Every stored record, soft-deleted ones included.
    #[must_use]
    pub fn stored(&self) -> &[Incident] {
        &self.incidents
    }

    /// Live records in listing order.
    pub fn live(&self) -> impl Iterator<Item = &Incident> {
        self.incidents.iter().filter(|i| !i.is_deleted)
    }

    fn begin(&mut self) -> RepoResult<()> {
        self.requests += 1;
        match self.pending_failure.take() {
            Some((0, err)) => Err(err),
            Some((left, err)) => {
                self.pending_failure = Some((left - 1, err));
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn live_mut(&mut self, id: &str) -> RepoResult<&mut Incident> {
        self.incidents
            .iter_mut()
            .find(|i| i.id == id && !i.is_deleted)
            .ok_or_else(|| RepoError::NotFound(format!("Incident not found: {id}")))
    }
}

fn validate_title(title: &str) -> RepoResult<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(RepoError::Validation(
            "Title cannot be empty or just whitespace".to_string(),
        ));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(RepoError::Validation(format!(
            "Title must be at most {MAX_TITLE_CHARS} characters"
        )));
    }
    Ok(trimmed.to_string())
}

fn validate_assignee(assignee: &str) -> RepoResult<String> {
    let trimmed = assignee.trim();
    if trimmed.is_empty() {
        return Err(RepoError::Validation("assigned_to is required".to_string()));
    }
    Ok(trimmed.to_string())
}

impl IncidentRepository for MemoryRepository {
    fn list(&mut self, limit: usize, offset: usize) -> RepoResult<IncidentPage> {
        self.begin()?;
        if !(1..=MAX_FETCH_LIMIT).contains(&limit) {
            return Err(RepoError::Validation(format!(
                "limit must be between 1 and {MAX_FETCH_LIMIT}"
            )));
        }

        let live: Vec<&Incident> = self.live().collect();
        let total_count = live.len();
        let incidents = live
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|i| Incident {
                chat: Vec::new(),
                ..i.clone()
            })
            .collect();

        Ok(IncidentPage {
            incidents,
            total_count,
            page: offset / limit + 1,
            page_size: limit,
            total_pages: page_count(total_count, limit),
        })
    }

    fn get(&mut self, id: &str) -> RepoResult<Incident> {
        self.begin()?;
        self.live_mut(id).map(|i| i.clone())
    }

    fn create(&mut self, draft: &IncidentDraft) -> RepoResult<Option<Incident>> {
        self.begin()?;
        let title = validate_title(&draft.title)?;
        let assigned_to = validate_assignee(&draft.assigned_to)?;

        let now = self.clock.now();
        let incident = Incident {
            id: format!("INC-{:04}", self.next_id),
            title,
            description: draft.description.clone(),
            status: draft.status,
            priority: draft.priority,
            assigned_to,
            created_on: now,
            created_by: self.actor.clone(),
            updated_on: now,
            updated_by: self.actor.clone(),
            chat: Vec::new(),
            is_deleted: false,
        };
        self.next_id += 1;
        debug!(id = %incident.id, "memory repository created incident");
        self.incidents.push(incident.clone());

        Ok(self.echo_writes.then_some(incident))
    }

    fn update(&mut self, id: &str, patch: &IncidentPatch) -> RepoResult<Incident> {
        self.begin()?;
        if patch.is_empty() {
            return Err(RepoError::Validation(
                "No fields provided for update".to_string(),
            ));
        }
        let title = patch.title.as_deref().map(validate_title).transpose()?;
        let assignee = patch
            .assigned_to
            .as_deref()
            .map(validate_assignee)
            .transpose()?;

        let now = self.clock.now();
        let actor = self.actor.clone();
        let incident = self.live_mut(id)?;
        if let Some(title) = title {
            incident.title = title;
        }
        if let Some(description) = &patch.description {
            incident.description = Some(description.clone());
        }
        if let Some(status) = patch.status {
            incident.status = status;
        }
        if let Some(priority) = patch.priority {
            incident.priority = priority;
        }
        if let Some(assignee) = assignee {
            incident.assigned_to = assignee;
        }
        incident.updated_on = now;
        incident.updated_by = actor;

        Ok(incident.clone())
    }

    fn delete(&mut self, id: &str) -> RepoResult<()> {
        self.begin()?;
        let now = self.clock.now();
        let actor = self.actor.clone();
        let incident = self.live_mut(id)?;
        incident.is_deleted = true;
        incident.updated_on = now;
        incident.updated_by = actor;
        Ok(())
    }

    fn append_message(&mut self, id: &str, content: &str) -> RepoResult<Option<Incident>> {
        self.begin()?;
        if content.trim().is_empty() {
            return Err(RepoError::Validation("content must not be empty".to_string()));
        }
        if content.chars().count() > MAX_MESSAGE_CHARS {
            return Err(RepoError::Validation(format!(
                "content must be at most {MAX_MESSAGE_CHARS} characters"
            )));
        }

        let now = self.clock.now();
        let message = ChatMessage {
            author_email: self.actor.clone(),
            content: content.to_string(),
            timestamp: now,
        };
        let echo = self.echo_writes;
        let incident = self.live_mut(id)?;
        incident.chat.push(message);

        Ok(echo.then(|| incident.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Priority, Status};
    use chrono::TimeZone;

    fn repo() -> MemoryRepository {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        MemoryRepository::new("ops@example.com").with_clock(start, Duration::minutes(1))
    }

    fn create(repo: &mut MemoryRepository, title: &str) -> Incident {
        repo.create(&IncidentDraft::new(title, "dev@example.com"))
            .unwrap()
            .unwrap()
    }

    #[test]
    fn create_assigns_ids_and_timestamps() {
        let mut repo = repo();
        let a = create(&mut repo, "First");
        let b = create(&mut repo, "Second");
        assert_eq!(a.id, "INC-0001");
        assert_eq!(b.id, "INC-0002");
        assert!(b.created_on > a.created_on);
        assert_eq!(a.created_by, "ops@example.com");
        assert_eq!(a.status, Status::Open);
    }

    #[test]
    fn create_rejects_blank_title_and_missing_assignee() {
        let mut repo = repo();
        let err = repo
            .create(&IncidentDraft::new("   ", "dev@example.com"))
            .unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));

        let err = repo.create(&IncidentDraft::new("Title", "")).unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));

        let long = "t".repeat(MAX_TITLE_CHARS + 1);
        assert!(repo.create(&IncidentDraft::new(long, "dev@example.com")).is_err());
        assert!(repo.stored().is_empty());
    }

    #[test]
    fn list_pages_and_reports_totals() {
        let mut repo = repo();
        for n in 0..7 {
            create(&mut repo, &format!("Incident {n}"));
        }
        let page = repo.list(3, 3).unwrap();
        assert_eq!(page.total_count, 7);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.page, 2);
        let titles: Vec<_> = page.incidents.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, ["Incident 3", "Incident 4", "Incident 5"]);
    }

    #[test]
    fn list_rejects_out_of_range_limit() {
        let mut repo = repo();
        assert!(matches!(repo.list(0, 0), Err(RepoError::Validation(_))));
        assert!(matches!(
            repo.list(MAX_FETCH_LIMIT + 1, 0),
            Err(RepoError::Validation(_))
        ));
        assert!(repo.list(MAX_FETCH_LIMIT, 0).is_ok());
    }

    #[test]
    fn list_omits_chat_but_get_includes_it() {
        let mut repo = repo();
        let inc = create(&mut repo, "Chatty");
        repo.append_message(&inc.id, "first").unwrap();

        let page = repo.list(10, 0).unwrap();
        assert!(page.incidents[0].chat.is_empty());
        let full = repo.get(&inc.id).unwrap();
        assert_eq!(full.chat.len(), 1);
        assert_eq!(full.chat[0].author_email, "ops@example.com");
    }

    #[test]
    fn update_applies_only_present_fields() {
        let mut repo = repo();
        let inc = create(&mut repo, "Original");
        let updated = repo
            .update(
                &inc.id,
                &IncidentPatch {
                    priority: Some(Priority::High),
                    ..IncidentPatch::default()
                },
            )
            .unwrap();
        assert_eq!(updated.title, "Original");
        assert_eq!(updated.priority, Priority::High);
        assert!(updated.updated_on > inc.updated_on);
    }

    #[test]
    fn update_rejects_empty_patch() {
        let mut repo = repo();
        let inc = create(&mut repo, "Original");
        let err = repo.update(&inc.id, &IncidentPatch::default()).unwrap_err();
        assert_eq!(
            err,
            RepoError::Validation("No fields provided for update".to_string())
        );
    }

    #[test]
    fn delete_is_soft_and_hides_the_record() {
        let mut repo = repo();
        let inc = create(&mut repo, "Doomed");
        repo.delete(&inc.id).unwrap();

        assert!(repo.stored()[0].is_deleted);
        assert_eq!(repo.list(10, 0).unwrap().total_count, 0);
        assert!(matches!(repo.get(&inc.id), Err(RepoError::NotFound(_))));
        assert!(matches!(repo.delete(&inc.id), Err(RepoError::NotFound(_))));
    }

    #[test]
    fn fail_next_fails_exactly_one_request() {
        let mut repo = repo();
        repo.fail_next(RepoError::Network("connection reset".into()));
        assert!(matches!(repo.list(10, 0), Err(RepoError::Network(_))));
        assert!(repo.list(10, 0).is_ok());
        assert_eq!(repo.requests(), 2);
    }

    #[test]
    fn fail_after_lets_earlier_requests_through() {
        let mut repo = repo();
        let inc = create(&mut repo, "Flaky");
        repo.fail_after(1, RepoError::Network("down".into()));

        assert!(repo.get(&inc.id).is_ok());
        assert_eq!(
            repo.list(10, 0).unwrap_err(),
            RepoError::Network("down".into())
        );
        assert!(repo.list(10, 0).is_ok());
    }

    #[test]
    fn non_echoing_writes_return_none() {
        let mut repo = repo().echo_writes(false);
        let created = repo
            .create(&IncidentDraft::new("Quiet", "dev@example.com"))
            .unwrap();
        assert!(created.is_none());
        let id = repo.stored()[0].id.clone();
        assert!(repo.append_message(&id, "hello").unwrap().is_none());
        assert_eq!(repo.stored()[0].chat.len(), 1);
    }
}
