//! Fan-out of one search request to every selected platform backend.
//!
//! Platforms are queried one after another, never concurrently: the relaxed
//! retry for a platform is decided before the next platform is touched, and
//! the first failure stops the whole request.

mod report;

use std::time::Duration;

use creatorscope_core::{dedupe, AppConfig, Platform, SearchPage};
use reqwest::{Client, Url};
use serde_json::Value;

use crate::envelope::{
    collect_records, parse_body, reported_next_cursor, reported_total, reported_total_pages,
    upstream_error_message,
};
use crate::error::GatewayError;
use crate::fields::strict_number;
use crate::normalize::normalize;
use crate::sanitize::{sanitizer_for, SanitizeOptions};

/// Everything the gateway needs from the outside world, passed in explicitly.
#[derive(Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    /// Bearer credential. `None` makes every search fail with
    /// [`GatewayError::MissingCredential`].
    pub token: Option<String>,
    /// Enables the single relaxed retry for platforms that support it.
    pub relaxed_fallback: bool,
    /// Rows per upstream page, used to derive `total_pages` when a backend
    /// does not report it.
    pub page_size: u32,
    pub user_agent: String,
}

impl GatewayConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            base_url: config.upstream_base_url.clone(),
            token: config.upstream_token.clone(),
            relaxed_fallback: config.youtube_relaxed_fallback,
            page_size: config.upstream_page_size,
            user_agent: config.user_agent.clone(),
        }
    }
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "[redacted]"))
            .field("relaxed_fallback", &self.relaxed_fallback)
            .field("page_size", &self.page_size)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Per-platform outcome folded into the aggregate page.
struct PlatformResponse {
    body: Value,
    total: u64,
}

pub struct SearchGateway {
    client: Client,
    base_url: Url,
    config: GatewayConfig,
}

impl SearchGateway {
    /// Builds a gateway with its own `reqwest` client.
    ///
    /// Only a connect timeout is set; overall request duration is left to the
    /// transport.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidBaseUrl`] if `config.base_url` does not
    /// parse, or [`GatewayError::Http`] if the client cannot be built.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&config.user_agent)
            .build()?;

        let normalised = format!("{}/", config.base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| GatewayError::InvalidBaseUrl {
            base_url: config.base_url.clone(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::InvalidBaseUrl {
                base_url: config.base_url.clone(),
                reason: "URL cannot be used as a base".to_owned(),
            });
        }

        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.config.token.is_some()
    }

    /// Searches every platform in `platforms` with `body` and aggregates the
    /// normalized, deduplicated results.
    ///
    /// All-or-nothing: if any platform fails, results gathered from earlier
    /// platforms are discarded and the error is returned.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::MissingCredential`] when no token is configured.
    /// - [`GatewayError::InvalidInput`] when `platforms` is empty.
    /// - [`GatewayError::Upstream`] for the first non-success upstream status.
    /// - [`GatewayError::Transport`] when a backend cannot be reached.
    pub async fn search(
        &self,
        platforms: &[Platform],
        body: &Value,
    ) -> Result<SearchPage, GatewayError> {
        let token = self
            .config
            .token
            .as_deref()
            .ok_or(GatewayError::MissingCredential)?;
        if platforms.is_empty() {
            return Err(GatewayError::InvalidInput(
                "platforms must be a non-empty array".to_owned(),
            ));
        }

        let mut records = Vec::new();
        let mut total: u64 = 0;
        let mut total_pages: Option<u32> = None;
        let mut next_cursor: Option<String> = None;

        for &platform in platforms {
            let response = self.search_platform(platform, body, token).await?;

            total = total.saturating_add(response.total);
            // Cursor-only backends report neither; leaving `total_pages` unset
            // keeps the cursor as the paging signal.
            let pages = reported_total_pages(&response.body)
                .or_else(|| self.derive_total_pages(response.total));
            if let Some(pages) = pages {
                total_pages = Some(total_pages.map_or(pages, |p| p.max(pages)));
            }
            if next_cursor.is_none() {
                next_cursor = reported_next_cursor(&response.body);
            }

            let rows = collect_records(&response.body);
            tracing::info!(
                platform = %platform,
                total = response.total,
                rows = rows.len(),
                "platform search complete"
            );
            records.extend(rows.into_iter().map(|raw| normalize(raw, platform)));
        }

        let results = dedupe(records);
        Ok(SearchPage {
            unique: results.len(),
            results,
            total,
            page: Some(request_page(body)),
            total_pages,
            next_cursor,
        })
    }

    /// One platform: strict query, then at most one relaxed retry when the
    /// strict query matched nothing.
    async fn search_platform(
        &self,
        platform: Platform,
        body: &Value,
        token: &str,
    ) -> Result<PlatformResponse, GatewayError> {
        let sanitizer = sanitizer_for(platform);
        let strict_body = sanitizer.sanitize(body, SanitizeOptions::default());
        let strict = self.post_search(platform, &strict_body, token).await?;

        if strict.total > 0 || !self.config.relaxed_fallback || !sanitizer.supports_relaxed_retry()
        {
            return Ok(strict);
        }

        tracing::warn!(platform = %platform, "strict query returned no rows, retrying relaxed");
        let relaxed_body = sanitizer.sanitize(body, SanitizeOptions::relaxed());
        let relaxed = self.post_search(platform, &relaxed_body, token).await?;
        if relaxed.total > 0 {
            tracing::info!(platform = %platform, total = relaxed.total, "relaxed query matched");
            Ok(relaxed)
        } else {
            Ok(strict)
        }
    }

    async fn post_search(
        &self,
        platform: Platform,
        body: &Value,
        token: &str,
    ) -> Result<PlatformResponse, GatewayError> {
        let url = self.endpoint(&[platform.as_str(), "search"]);
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::Transport {
                platform,
                source: e,
            })?;

        let status = response.status();
        // An unreadable body is treated the same as an empty one.
        let text = response.text().await.unwrap_or_default();
        let body = parse_body(&text);

        if !status.is_success() {
            let message = upstream_error_message(&body).unwrap_or_else(|| {
                format!("{platform} search failed with status {}", status.as_u16())
            });
            tracing::warn!(
                platform = %platform,
                status = status.as_u16(),
                error = %message,
                "upstream search failed"
            );
            return Err(GatewayError::Upstream {
                platform,
                status: status.as_u16(),
                message,
            });
        }

        Ok(PlatformResponse {
            total: reported_total(&body),
            body,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Page count implied by a reported total. `None` when nothing was
    /// reported, since a zero total carries no page information.
    fn derive_total_pages(&self, total: u64) -> Option<u32> {
        if total == 0 {
            return None;
        }
        let page_size = u64::from(self.config.page_size.max(1));
        Some(u32::try_from(total.div_ceil(page_size)).unwrap_or(u32::MAX))
    }
}

/// The page index requested in `body`, defaulting to 0.
fn request_page(body: &Value) -> u32 {
    body.get("page")
        .and_then(strict_number)
        .filter(|n| *n >= 0.0)
        .map_or(0, |n| {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let page = n.floor().min(f64::from(u32::MAX)) as u32;
            page
        })
}
