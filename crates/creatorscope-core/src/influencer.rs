//! The canonical, platform-agnostic creator record and its identity key.

use serde::{Deserialize, Serialize};

use crate::platform::Platform;

/// A creator profile normalized from any platform's raw search record.
///
/// `followers` and `engagement_rate` are always finite numbers; unknown
/// values are `0.0`, never `NaN`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalInfluencer {
    pub platform: Platform,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub fullname: String,
    #[serde(default)]
    pub followers: f64,
    /// Ratio in `0..=1` as reported upstream.
    #[serde(default)]
    pub engagement_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engagements: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_views: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub is_private: bool,
}

/// `platform:lowercase(userId | username | url)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey(String);

impl IdentityKey {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl CanonicalInfluencer {
    /// Empty record for `platform`; every optional field absent, numerics zero.
    #[must_use]
    pub fn empty(platform: Platform) -> Self {
        Self {
            platform,
            user_id: None,
            username: String::new(),
            fullname: String::new(),
            followers: 0.0,
            engagement_rate: 0.0,
            engagements: None,
            average_views: None,
            picture: None,
            url: None,
            is_verified: false,
            is_private: false,
        }
    }

    /// Derives the identity key, preferring `user_id`, then `username`, then
    /// `url`. Blank values are skipped.
    ///
    /// Returns `None` when none of the three is usable; such records cannot
    /// take part in deduplication.
    #[must_use]
    pub fn identity_key(&self) -> Option<IdentityKey> {
        let raw = [
            self.user_id.as_deref(),
            Some(self.username.as_str()),
            self.url.as_deref(),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())?;

        Some(IdentityKey(format!(
            "{}:{}",
            self.platform.as_str(),
            raw.to_lowercase()
        )))
    }
}
