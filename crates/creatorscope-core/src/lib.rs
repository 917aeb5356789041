pub mod app_config;
pub mod config;
pub mod dedupe;
pub mod filters;
pub mod influencer;
pub mod page;
pub mod platform;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use dedupe::{dedupe, merge_first_seen};
pub use filters::{
    AgeRange, AudienceFilter, FilterState, FilterUpdate, GrowthRate, Range, SortClause,
    SortDirection, TikTokFilters, YouTubeFilters,
};
pub use influencer::{CanonicalInfluencer, IdentityKey};
pub use page::{SearchPage, SearchRequest};
pub use platform::Platform;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read filter preset {path}: {source}")]
    PresetIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse filter preset {path}: {source}")]
    PresetParse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}
