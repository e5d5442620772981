#![allow(dead_code)]

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use roster_core::model::{Incident, Priority, Status};
use roster_core::view::{SortKey, StatusFilter};

pub fn arb_status() -> impl Strategy<Value = Status> + Clone {
    prop_oneof![
        Just(Status::Open),
        Just(Status::InProgress),
        Just(Status::Resolved),
    ]
}

pub fn arb_filter() -> impl Strategy<Value = StatusFilter> + Clone {
    prop_oneof![
        Just(StatusFilter::All),
        arb_status().prop_map(StatusFilter::Only),
    ]
}

pub fn arb_sort() -> impl Strategy<Value = SortKey> + Clone {
    prop_oneof![Just(SortKey::Newest), Just(SortKey::Oldest)]
}

/// Incidents with unique ids and a narrow timestamp range so ties are common.
pub fn arb_incidents(max: usize) -> impl Strategy<Value = Vec<Incident>> + Clone {
    prop::collection::vec((arb_status(), 0i64..12), 0..max).prop_map(|rows| {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        rows.into_iter()
            .enumerate()
            .map(|(n, (status, hour))| {
                let ts = base + Duration::hours(hour);
                Incident {
                    id: format!("INC-{n:04}"),
                    title: format!("Incident {n}"),
                    description: None,
                    status,
                    priority: Priority::Medium,
                    assigned_to: "dev@example.com".to_string(),
                    created_on: ts,
                    created_by: "ops@example.com".to_string(),
                    updated_on: ts,
                    updated_by: "ops@example.com".to_string(),
                    chat: Vec::new(),
                    is_deleted: false,
                }
            })
            .collect()
    })
}
