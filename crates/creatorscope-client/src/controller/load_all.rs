//! Repeated paging until the result set is exhausted.

use std::sync::atomic::Ordering;

use crate::backend::SearchBackend;

use super::{FetchOutcome, SearchController};

/// Upper bound on pages fetched by one `load_all` call. Prevents runaway
/// loops on backends that always report more data.
pub const MAX_LOAD_ALL_PAGES: usize = 200;

impl<B: SearchBackend> SearchController<B> {
    /// Calls [`Self::load_more`] until no pages remain, returning how many
    /// pages were merged.
    ///
    /// Stops early when a page fails, when another fetch is already running,
    /// or as soon as the request set is abandoned by a new search, a reset,
    /// a platform change or [`Self::cancel`]. Yields to the scheduler between
    /// pages.
    pub async fn load_all(&self) -> usize {
        let generation = self.generation.load(Ordering::SeqCst);
        let mut loaded = 0usize;

        for _ in 0..MAX_LOAD_ALL_PAGES {
            if self.generation.load(Ordering::SeqCst) != generation {
                break;
            }
            match self.load_more().await {
                FetchOutcome::Loaded => loaded += 1,
                FetchOutcome::Skipped | FetchOutcome::Superseded | FetchOutcome::Failed => break,
            }
            tokio::task::yield_now().await;
        }

        tracing::debug!(pages = loaded, "load_all finished");
        loaded
    }
}
