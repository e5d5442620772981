//! Pure derivation of the roster view: filter → sort → paginate.
//!
//! [`derive_view`] is the only place the visible page is computed. It takes
//! the cached incidents plus the [`ViewState`] inputs and returns indices
//! into the cache, so the result can be stored next to the cache without
//! borrowing from it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use crate::model::{Incident, ParseEnumError, Status};
use crate::repo::page_count;

/// Default rows per roster page.
pub const DEFAULT_PAGE_SIZE: usize = 5;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Status filter for the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(Status),
}

impl StatusFilter {
    #[must_use]
    pub fn matches(self, incident: &Incident) -> bool {
        match self {
            Self::All => true,
            Self::Only(status) => incident.status == status,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(status) => fmt::Display::fmt(status, f),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse::<Status>().map(Self::Only).map_err(|_| ParseEnumError {
            expected: "status filter",
            got: s.to_string(),
        })
    }
}

/// Sort order over `created_on`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Most recently created first.
    #[default]
    Newest,
    /// Oldest first.
    Oldest,
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Newest => f.write_str("newest"),
            Self::Oldest => f.write_str("oldest"),
        }
    }
}

impl FromStr for SortKey {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "newest" | "created_desc" | "created-desc" => Ok(Self::Newest),
            "oldest" | "created_asc" | "created-asc" => Ok(Self::Oldest),
            _ => Err(ParseEnumError {
                expected: "sort key",
                got: s.to_string(),
            }),
        }
    }
}

/// Everything the visible page depends on besides the incidents themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewState {
    pub status_filter: StatusFilter,
    pub sort_key: SortKey,
    /// 1-based page cursor.
    pub page: usize,
    /// Rows per page, at least 1.
    pub page_size: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            status_filter: StatusFilter::All,
            sort_key: SortKey::Newest,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Result of [`derive_view`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DerivedView {
    /// Indices into the incident slice, filtered and sorted.
    pub order: Vec<usize>,
    pub total_pages: usize,
    /// Effective page after the reset rule; always >= 1.
    pub page: usize,
    /// Range into `order` covering the visible page.
    pub visible: Range<usize>,
}

impl DerivedView {
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.order.len()
    }

    /// Indices of the incidents on the visible page.
    #[must_use]
    pub fn visible_indices(&self) -> &[usize] {
        &self.order[self.visible.clone()]
    }
}

/// Filter, stable-sort and slice `incidents` according to `state`.
///
/// A page cursor beyond the last page (or 0) resets to 1.
#[must_use]
pub fn derive_view(incidents: &[Incident], state: &ViewState) -> DerivedView {
    let page_size = state.page_size.max(1);

    let mut order: Vec<usize> = incidents
        .iter()
        .enumerate()
        .filter(|(_, incident)| state.status_filter.matches(incident))
        .map(|(idx, _)| idx)
        .collect();

    // `sort_by` is stable: equal timestamps keep their fetch order.
    match state.sort_key {
        SortKey::Newest => {
            order.sort_by(|&a, &b| incidents[b].created_on.cmp(&incidents[a].created_on));
        }
        SortKey::Oldest => {
            order.sort_by(|&a, &b| incidents[a].created_on.cmp(&incidents[b].created_on));
        }
    }

    let total_pages = page_count(order.len(), page_size);
    let page = if state.page == 0 || state.page > total_pages {
        1
    } else {
        state.page
    };

    let start = ((page - 1) * page_size).min(order.len());
    let end = (start + page_size).min(order.len());

    DerivedView {
        order,
        total_pages,
        page,
        visible: start..end,
    }
}
