//! Client-side search session: filter state, paging and cancellation.
//!
//! A controller is single-flight. Every `run_search` or `load_more` cancels
//! the request it supersedes and stamps its own with a fresh request id; a
//! response is only applied if its id is still the latest when it lands, so
//! a stale response that slipped past cancellation is discarded as well.

mod load_all;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use creatorscope_core::{FilterState, FilterUpdate, Platform, SearchPage, SearchRequest};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::backend::SearchBackend;
use crate::error::ClientError;
use crate::query::build_query;
use crate::state::SearchState;

pub use load_all::MAX_LOAD_ALL_PAGES;

/// What became of one fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The page was merged into the session state.
    Loaded,
    /// Nothing to do: no further pages, or a fetch was already running.
    Skipped,
    /// A newer request or a reset took over; the result was dropped.
    Superseded,
    /// The fetch failed; the error is recorded in the session state.
    Failed,
}

struct Session {
    state: SearchState,
    filters: Arc<FilterState>,
    platforms: Vec<Platform>,
    in_flight: Option<CancellationToken>,
}

/// Which kind of page a started request will produce.
enum PageKind {
    First,
    Next(u32),
}

pub struct SearchController<B> {
    backend: B,
    session: Mutex<Session>,
    /// Id of the most recently started request.
    latest_request: AtomicU64,
    /// Bumped whenever the running request set is abandoned (new search,
    /// reset, platform change, explicit cancel). `load_all` watches it.
    generation: AtomicU64,
}

impl<B: SearchBackend> SearchController<B> {
    #[must_use]
    pub fn new(backend: B, platforms: Vec<Platform>, filters: FilterState) -> Self {
        Self {
            backend,
            session: Mutex::new(Session {
                state: SearchState::default(),
                filters: Arc::new(filters),
                platforms: unique_platforms(platforms),
                in_flight: None,
            }),
            latest_request: AtomicU64::new(0),
            generation: AtomicU64::new(0),
        }
    }

    /// A copy of the current session state.
    pub async fn snapshot(&self) -> SearchState {
        self.session.lock().await.state.clone()
    }

    pub async fn filters(&self) -> Arc<FilterState> {
        Arc::clone(&self.session.lock().await.filters)
    }

    pub async fn platforms(&self) -> Vec<Platform> {
        self.session.lock().await.platforms.clone()
    }

    /// Replaces the filter state with a copy carrying `update`. Results are
    /// kept until the next `run_search`.
    pub async fn update_filters(&self, update: FilterUpdate) {
        let mut session = self.session.lock().await;
        session.filters = Arc::new(session.filters.with(update));
    }

    /// Restores default filters, cancels in-flight work and clears results.
    pub async fn reset_filters(&self) {
        let mut session = self.session.lock().await;
        self.abandon(&mut session);
        session.filters = Arc::new(FilterState::default());
        session.state = SearchState::default();
    }

    /// Changes the platform selection. A different selection invalidates
    /// the session: in-flight work is cancelled and results are cleared.
    pub async fn set_platforms(&self, platforms: Vec<Platform>) {
        let platforms = unique_platforms(platforms);
        let mut session = self.session.lock().await;
        if session.platforms == platforms {
            return;
        }
        self.abandon(&mut session);
        session.platforms = platforms;
        session.state = SearchState::default();
    }

    /// Cancels any in-flight request and stops a running `load_all`.
    /// Accumulated results are kept.
    pub async fn cancel(&self) {
        let mut session = self.session.lock().await;
        self.abandon(&mut session);
        session.state.settle_cancelled();
    }

    /// Starts a new search from page 0 with the current filters.
    ///
    /// With `reset`, previous results and errors are cleared immediately;
    /// otherwise they stay visible until the first page arrives and replaces
    /// them.
    pub async fn run_search(&self, reset: bool) -> FetchOutcome {
        let started = {
            let mut session = self.session.lock().await;
            self.abandon(&mut session);
            if reset {
                session.state = SearchState::default();
            }
            if session.platforms.is_empty() {
                session.state.fail(ClientError::NoPlatforms.to_string());
                return FetchOutcome::Failed;
            }
            let request = build_query(&session.filters, &session.platforms, 0, None);
            let (id, token) = self.begin(&mut session);
            (id, token, request)
        };

        let (id, token, request) = started;
        self.finish(id, &token, PageKind::First, self.fetch(&token, request).await)
            .await
    }

    /// Fetches the next page and merges it into the accumulated results.
    ///
    /// A no-op returning [`FetchOutcome::Skipped`] when there is no further
    /// page or a fetch is already running.
    pub async fn load_more(&self) -> FetchOutcome {
        let started = {
            let mut session = self.session.lock().await;
            if !session.state.has_more || session.state.loading {
                return FetchOutcome::Skipped;
            }
            let next_page = session.state.page.map_or(0, |p| p.saturating_add(1));
            let request = build_query(
                &session.filters,
                &session.platforms,
                next_page,
                session.state.cursor.as_deref(),
            );
            let (id, token) = self.begin(&mut session);
            (id, token, request, next_page)
        };

        let (id, token, request, next_page) = started;
        self.finish(
            id,
            &token,
            PageKind::Next(next_page),
            self.fetch(&token, request).await,
        )
        .await
    }

    /// Cancels the current request (if any) and bumps the generation.
    fn abandon(&self, session: &mut Session) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.latest_request.fetch_add(1, Ordering::SeqCst);
        if let Some(token) = session.in_flight.take() {
            token.cancel();
        }
    }

    /// Registers a new request as the only one in flight.
    fn begin(&self, session: &mut Session) -> (u64, CancellationToken) {
        if let Some(previous) = session.in_flight.take() {
            previous.cancel();
        }
        let id = self.latest_request.fetch_add(1, Ordering::SeqCst) + 1;
        let token = CancellationToken::new();
        session.in_flight = Some(token.clone());
        session.state.start_loading();
        (id, token)
    }

    /// Runs the backend call unless `token` is cancelled first. `None` means
    /// cancelled.
    async fn fetch(
        &self,
        token: &CancellationToken,
        request: SearchRequest,
    ) -> Option<Result<SearchPage, ClientError>> {
        tokio::select! {
            biased;
            () = token.cancelled() => None,
            result = self.backend.search(request) => Some(result),
        }
    }

    async fn finish(
        &self,
        id: u64,
        token: &CancellationToken,
        kind: PageKind,
        result: Option<Result<SearchPage, ClientError>>,
    ) -> FetchOutcome {
        let Some(result) = result else {
            tracing::debug!(request_id = id, "search request cancelled");
            return FetchOutcome::Superseded;
        };

        let mut session = self.session.lock().await;
        if token.is_cancelled() || self.latest_request.load(Ordering::SeqCst) != id {
            tracing::debug!(
                request_id = id,
                "discarding response of superseded request"
            );
            return FetchOutcome::Superseded;
        }
        session.in_flight = None;

        match (result, kind) {
            (Ok(page), PageKind::First) => {
                tracing::debug!(
                    request_id = id,
                    rows = page.results.len(),
                    total = page.total,
                    "first page loaded"
                );
                session.state.apply_first_page(page);
                FetchOutcome::Loaded
            }
            (Ok(page), PageKind::Next(requested)) => {
                tracing::debug!(
                    request_id = id,
                    page = requested,
                    rows = page.results.len(),
                    "next page loaded"
                );
                session.state.apply_next_page(page, requested);
                FetchOutcome::Loaded
            }
            (Err(e), PageKind::First) => {
                tracing::warn!(request_id = id, error = %e, "search request failed");
                session.state.fail_new_search(e.to_string());
                FetchOutcome::Failed
            }
            (Err(e), PageKind::Next(requested)) => {
                tracing::warn!(
                    request_id = id,
                    page = requested,
                    error = %e,
                    "next page request failed"
                );
                session.state.fail(e.to_string());
                FetchOutcome::Failed
            }
        }
    }
}

impl<B> Drop for SearchController<B> {
    fn drop(&mut self) {
        if let Some(token) = self.session.get_mut().in_flight.take() {
            token.cancel();
        }
    }
}

/// Deduplicates a platform selection, keeping first-occurrence order.
fn unique_platforms(platforms: Vec<Platform>) -> Vec<Platform> {
    let mut out = Vec::with_capacity(platforms.len());
    for p in platforms {
        if !out.contains(&p) {
            out.push(p);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_platforms_keeps_first_occurrence_order() {
        let out = unique_platforms(vec![
            Platform::TikTok,
            Platform::YouTube,
            Platform::TikTok,
        ]);
        assert_eq!(out, [Platform::TikTok, Platform::YouTube]);
    }
}
