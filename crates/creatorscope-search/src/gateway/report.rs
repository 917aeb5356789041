//! Profile report lookup for an already-resolved identity.
//!
//! The report payload is opaque here; it is passed through to the caller
//! untouched.

use creatorscope_core::Platform;
use serde_json::Value;

use crate::envelope::{parse_body, upstream_error_message};
use crate::error::GatewayError;

use super::SearchGateway;

impl SearchGateway {
    /// Fetches the upstream report for `user_id` on `platform`.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::MissingCredential`] when no token is configured.
    /// - [`GatewayError::InvalidInput`] when `user_id` is blank.
    /// - [`GatewayError::Upstream`] / [`GatewayError::Transport`] as for search.
    pub async fn fetch_report(
        &self,
        platform: Platform,
        user_id: &str,
    ) -> Result<Value, GatewayError> {
        let token = self
            .config
            .token
            .as_deref()
            .ok_or(GatewayError::MissingCredential)?;
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(GatewayError::InvalidInput(
                "user id must not be empty".to_owned(),
            ));
        }

        let url = self.endpoint(&[platform.as_str(), "profile", user_id, "report"]);
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| GatewayError::Transport {
                platform,
                source: e,
            })?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let body = parse_body(&text);

        if !status.is_success() {
            let message = upstream_error_message(&body).unwrap_or_else(|| {
                format!("{platform} report failed with status {}", status.as_u16())
            });
            tracing::warn!(
                platform = %platform,
                status = status.as_u16(),
                error = %message,
                "report fetch failed"
            );
            return Err(GatewayError::Upstream {
                platform,
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }
}
