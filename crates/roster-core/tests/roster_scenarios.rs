//! End-to-end roster scenarios driven through the engine and an in-memory
//! repository.

use chrono::{Duration, TimeZone, Utc};
use roster_core::model::{IncidentDraft, IncidentPatch, Status};
use roster_core::repo::IncidentRepository;
use roster_core::repo::memory::MemoryRepository;
use roster_core::view::{SortKey, StatusFilter};
use roster_core::{RepoError, RosterEngine, RosterError, RosterOptions};

fn repo_starting(day: u32) -> MemoryRepository {
    let start = Utc.with_ymd_and_hms(2024, 1, day, 8, 0, 0).unwrap();
    MemoryRepository::new("ops@example.com").with_clock(start, Duration::days(1))
}

fn titles(engine: &RosterEngine<MemoryRepository>) -> Vec<String> {
    engine.visible_page().iter().map(|i| i.title.clone()).collect()
}

#[test]
fn open_incidents_newest_first_two_per_page() {
    // Open incidents on Jan 1-3, nine others on Jan 4-12.
    let mut repo = repo_starting(1);
    for day in 1..=3 {
        repo.create(&IncidentDraft::new(format!("open-jan-{day}"), "dev@example.com"))
            .unwrap();
    }
    for n in 0..9 {
        let status = if n % 3 == 0 {
            Status::InProgress
        } else {
            Status::Resolved
        };
        repo.create(&IncidentDraft::new(format!("other-{n}"), "dev@example.com").status(status))
            .unwrap();
    }

    let mut engine = RosterEngine::new(
        repo,
        RosterOptions {
            page_size: 2,
            ..RosterOptions::default()
        },
    );
    engine.load().unwrap();
    assert_eq!(engine.all_incidents().len(), 12);

    engine.set_status_filter(StatusFilter::Only(Status::Open));
    engine.set_sort_key(SortKey::Newest);

    assert_eq!(engine.total_pages(), 2);
    assert_eq!(titles(&engine), ["open-jan-3", "open-jan-2"]);
    assert!(engine.go_to_page(2));
    assert_eq!(titles(&engine), ["open-jan-1"]);
}

#[test]
fn deleting_from_a_full_last_page_resets_to_first() {
    let mut repo = repo_starting(1);
    for n in 0..11 {
        repo.create(&IncidentDraft::new(format!("I{n}"), "dev@example.com"))
            .unwrap();
    }
    let mut engine = RosterEngine::new(
        repo,
        RosterOptions {
            page_size: 5,
            ..RosterOptions::default()
        },
    );
    engine.load().unwrap();
    assert!(engine.go_to_page(3));
    assert_eq!(engine.total_count(), 11);

    let id = engine.visible_page()[0].id.clone();
    engine.delete_incident(&id).unwrap();

    assert_eq!(engine.total_count(), 10);
    assert_eq!(engine.total_pages(), 2);
    assert_eq!(engine.page(), 1);
}

#[test]
fn whitespace_chat_never_reaches_the_repository() {
    let mut repo = repo_starting(1);
    repo.create(&IncidentDraft::new("Pager storm", "dev@example.com"))
        .unwrap();
    let mut engine = RosterEngine::new(repo, RosterOptions::default());
    engine.load().unwrap();
    let before = engine.repo().requests();

    let id = engine.all_incidents()[0].id.clone();
    assert_eq!(
        engine.append_chat_message(&id, "   \n"),
        Err(RosterError::EmptyMessage)
    );
    assert_eq!(engine.repo().requests(), before);
}

#[test]
fn changes_from_other_clients_appear_after_reload() {
    let mut engine = RosterEngine::new(repo_starting(1), RosterOptions::default());
    engine.load().unwrap();
    assert_eq!(engine.total_count(), 0);

    // Another client writes straight to the service.
    let created = engine
        .repo_mut()
        .create(&IncidentDraft::new("Elsewhere", "dev@example.com"))
        .unwrap()
        .unwrap();
    assert_eq!(engine.total_count(), 0);

    engine.load().unwrap();
    assert_eq!(engine.incident(&created.id).unwrap().title, "Elsewhere");
}

#[test]
fn stale_update_reports_not_found_and_keeps_cache() {
    let mut repo = repo_starting(1);
    repo.create(&IncidentDraft::new("Keep me", "dev@example.com"))
        .unwrap();
    let mut engine = RosterEngine::new(repo, RosterOptions::default());
    engine.load().unwrap();
    let id = engine.all_incidents()[0].id.clone();

    engine.repo_mut().delete(&id).unwrap();
    let patch = IncidentPatch {
        title: Some("Renamed".into()),
        ..IncidentPatch::default()
    };
    let err = engine.update_incident(&id, &patch).unwrap_err();

    assert!(matches!(err, RosterError::Repo(RepoError::NotFound(_))));
    assert_eq!(engine.incident(&id).unwrap().title, "Keep me");
    assert_eq!(engine.last_error(), Some(&err));
}
