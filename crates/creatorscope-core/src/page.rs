//! Request and response envelopes shared by the gateway and its clients.

use serde::{Deserialize, Serialize};

use crate::influencer::CanonicalInfluencer;
use crate::platform::Platform;

/// Inbound search request: which platforms to query and the filter body
/// forwarded (after sanitizing) to each of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub platforms: Vec<Platform>,
    pub body: serde_json::Value,
}

/// One page of aggregated, deduplicated results.
///
/// `total` is the sum of the totals each platform reported and is not tied
/// to `results.len()`; `unique` is the deduplicated count on this page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    pub results: Vec<CanonicalInfluencer>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub unique: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

impl SearchPage {
    /// Whether another page can be requested after this one.
    ///
    /// Page-numbered responses decide by `page + 1 < total_pages`; otherwise
    /// a returned `next_cursor` means more data.
    #[must_use]
    pub fn has_more(&self) -> bool {
        match (self.page, self.total_pages) {
            (Some(page), Some(total_pages)) => page.saturating_add(1) < total_pages,
            _ => self.next_cursor.as_deref().is_some_and(|c| !c.is_empty()),
        }
    }
}
