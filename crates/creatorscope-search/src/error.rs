use creatorscope_core::Platform;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// No bearer credential for the upstream backends was configured.
    #[error("upstream search credential is not configured")]
    MissingCredential,

    /// The caller's request was unusable; the message names the bad input.
    #[error("{0}")]
    InvalidInput(String),

    #[error("invalid upstream base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },

    /// A platform backend answered with a non-success status.
    #[error("{message}")]
    Upstream {
        platform: Platform,
        status: u16,
        message: String,
    },

    /// The request to a platform backend never produced a response.
    #[error("request to {platform} search backend failed: {source}")]
    Transport {
        platform: Platform,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
