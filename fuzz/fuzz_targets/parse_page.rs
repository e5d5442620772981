#![no_main]

use libfuzzer_sys::fuzz_target;
use roster_core::model::{IncidentPage, Status};
use roster_core::view::{SortKey, StatusFilter, ViewState, derive_view};

// Decode arbitrary bytes as a list response, then derive every view over it.
// Neither step may panic, and the visible page must stay within bounds.
fuzz_target!(|data: &[u8]| {
    let Ok(page) = serde_json::from_slice::<IncidentPage>(data) else {
        return;
    };

    let page_size = (data.len() % 7) + 1;
    for filter in [StatusFilter::All, StatusFilter::Only(Status::ALL[data.len() % 3])] {
        for sort_key in [SortKey::Newest, SortKey::Oldest] {
            let state = ViewState {
                status_filter: filter,
                sort_key,
                page: data.first().copied().map_or(1, usize::from),
                page_size,
            };
            let view = derive_view(&page.incidents, &state);
            assert!(view.visible_indices().len() <= page_size);
            assert!(view.page >= 1);
        }
    }
});
