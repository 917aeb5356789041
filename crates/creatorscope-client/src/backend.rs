//! Transport seam between the controller and the search gateway.

use std::future::Future;
use std::time::Duration;

use creatorscope_core::{SearchPage, SearchRequest};
use reqwest::{Client, Url};

use crate::error::ClientError;

/// Anything that can answer a [`SearchRequest`] with a [`SearchPage`].
pub trait SearchBackend: Send + Sync {
    fn search(
        &self,
        request: SearchRequest,
    ) -> impl Future<Output = Result<SearchPage, ClientError>> + Send;
}

/// Calls the gateway's `POST /api/v1/search` route over HTTP.
pub struct HttpSearchBackend {
    client: Client,
    search_url: Url,
}

impl HttpSearchBackend {
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidApiUrl`] if `api_url` is not a valid base
    /// URL, or [`ClientError::Http`] if the client cannot be built.
    pub fn new(api_url: &str, user_agent: &str) -> Result<Self, ClientError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let base = format!("{}/", api_url.trim_end_matches('/'));
        let search_url = Url::parse(&base)
            .and_then(|u| u.join("api/v1/search"))
            .map_err(|e| ClientError::InvalidApiUrl {
                url: api_url.to_owned(),
                reason: e.to_string(),
            })?;

        Ok(Self { client, search_url })
    }
}

impl SearchBackend for HttpSearchBackend {
    async fn search(&self, request: SearchRequest) -> Result<SearchPage, ClientError> {
        let response = self
            .client
            .post(self.search_url.clone())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<serde_json::Value>(&text)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_owned))
                .unwrap_or_else(|| format!("search failed with status {}", status.as_u16()));
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str::<SearchPage>(&text).map_err(|e| ClientError::Deserialize {
            context: "search page".to_owned(),
            source: e,
        })
    }
}
