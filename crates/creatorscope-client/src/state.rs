//! Running state of one search session.

use creatorscope_core::{dedupe, merge_first_seen, CanonicalInfluencer, SearchPage};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    Errored,
}

/// Accumulated results and paging position of a session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    pub results: Vec<CanonicalInfluencer>,
    pub status: SearchStatus,
    pub loading: bool,
    pub error: Option<String>,
    /// Index of the last page merged into `results`.
    pub page: Option<u32>,
    pub cursor: Option<String>,
    pub has_more: bool,
    /// Upstream-reported total of the most recent page.
    pub total: u64,
}

impl SearchState {
    pub(crate) fn start_loading(&mut self) {
        self.loading = true;
        self.status = SearchStatus::Loading;
    }

    /// Replaces the accumulated results with the first page of a new search.
    pub(crate) fn apply_first_page(&mut self, page: SearchPage) {
        self.record_position(&page, 0);
        self.results = dedupe(page.results);
    }

    /// Merges a follow-up page; entries already shown are never replaced.
    pub(crate) fn apply_next_page(&mut self, page: SearchPage, requested: u32) {
        self.record_position(&page, requested);
        merge_first_seen(&mut self.results, page.results);
    }

    /// Records a failed fetch. Previously loaded results stay untouched.
    pub(crate) fn fail(&mut self, message: String) {
        self.loading = false;
        self.status = SearchStatus::Errored;
        self.error = Some(message);
    }

    /// Records a failed first page of a new search. The old results stay
    /// visible, but their paging position no longer matches the current
    /// filters and is dropped so `load_more` cannot extend them.
    pub(crate) fn fail_new_search(&mut self, message: String) {
        self.fail(message);
        self.has_more = false;
        self.cursor = None;
    }

    /// Settles the state after an in-flight request was cancelled.
    pub(crate) fn settle_cancelled(&mut self) {
        if self.loading {
            self.loading = false;
            self.status = if self.error.is_some() {
                SearchStatus::Errored
            } else if self.page.is_some() {
                SearchStatus::Loaded
            } else {
                SearchStatus::Idle
            };
        }
    }

    fn record_position(&mut self, page: &SearchPage, requested: u32) {
        self.loading = false;
        self.status = SearchStatus::Loaded;
        self.error = None;
        self.page = Some(page.page.unwrap_or(requested));
        self.cursor.clone_from(&page.next_cursor);
        self.has_more = page.has_more();
        self.total = page.total;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use creatorscope_core::Platform;

    fn rec(name: &str) -> CanonicalInfluencer {
        let mut r = CanonicalInfluencer::empty(Platform::Instagram);
        r.username = name.to_owned();
        r
    }

    #[test]
    fn failure_keeps_results_and_position() {
        let mut state = SearchState::default();
        state.apply_first_page(SearchPage {
            results: vec![rec("a")],
            total: 10,
            unique: 1,
            page: Some(0),
            total_pages: Some(2),
            next_cursor: None,
        });
        state.start_loading();
        state.fail("boom".to_owned());

        assert_eq!(state.results.len(), 1);
        assert_eq!(state.page, Some(0));
        assert!(state.has_more);
        assert!(!state.loading);
        assert_eq!(state.status, SearchStatus::Errored);
        assert_eq!(state.error.as_deref(), Some("boom"));
    }

    #[test]
    fn page_defaults_to_requested_index_when_unreported() {
        let mut state = SearchState::default();
        state.apply_next_page(
            SearchPage {
                next_cursor: Some("c2".to_owned()),
                ..SearchPage::default()
            },
            4,
        );
        assert_eq!(state.page, Some(4));
        assert_eq!(state.cursor.as_deref(), Some("c2"));
        assert!(state.has_more);
    }

    #[test]
    fn failed_new_search_drops_stale_paging_position() {
        let mut state = SearchState::default();
        state.apply_first_page(SearchPage {
            results: vec![rec("a")],
            next_cursor: Some("c1".to_owned()),
            ..SearchPage::default()
        });
        assert!(state.has_more);

        state.start_loading();
        state.fail_new_search("boom".to_owned());

        assert_eq!(state.results.len(), 1);
        assert!(!state.has_more);
        assert_eq!(state.cursor, None);
        assert_eq!(state.error.as_deref(), Some("boom"));
    }

    #[test]
    fn settle_cancelled_restores_status() {
        let mut state = SearchState::default();
        state.start_loading();
        state.settle_cancelled();
        assert_eq!(state.status, SearchStatus::Idle);
        assert!(!state.loading);
    }
}
