//! Client-side filter state.
//!
//! [`FilterState`] is treated as an immutable value: every change goes through
//! [`FilterState::with`], which returns a fresh copy carrying the update and
//! leaves the original untouched. Presets can be loaded from YAML with
//! [`FilterState::load_preset`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Inclusive numeric bounds; either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Range {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<u64>,
}

impl Range {
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgeRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
}

/// Growth of a metric over an upstream-defined interval (e.g. `"i3months"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthRate {
    pub interval: String,
    pub value: f64,
    #[serde(default = "default_operator")]
    pub operator: String,
}

fn default_operator() -> String {
    "gt".to_owned()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortClause {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl Default for SortClause {
    fn default() -> Self {
        Self {
            field: "followers".to_owned(),
            direction: SortDirection::Desc,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AudienceFilter {
    pub language: Option<String>,
    pub gender: Option<String>,
    pub age_range: Option<AgeRange>,
    /// Minimum audience share (`0..=1`) applied to each audience criterion.
    pub weight: Option<f64>,
}

impl AudienceFilter {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.language.is_none() && self.gender.is_none() && self.age_range.is_none()
    }
}

/// Filters only YouTube's backend understands.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct YouTubeFilters {
    pub views_growth_rate: Option<GrowthRate>,
}

/// Filters only TikTok's backend understands.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TikTokFilters {
    pub shares: Range,
    pub saves: Range,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterState {
    pub followers: Range,
    pub engagement_rate: Option<f64>,
    pub verified_only: bool,
    pub language: Option<String>,
    pub gender: Option<String>,
    pub age: Option<AgeRange>,
    pub last_posted_days: Option<u32>,
    pub keywords: Option<String>,
    pub audience: AudienceFilter,
    pub youtube: YouTubeFilters,
    pub tiktok: TikTokFilters,
    pub sort: Option<SortClause>,
}

/// A single change to one leaf of [`FilterState`].
#[derive(Debug, Clone, PartialEq)]
pub enum FilterUpdate {
    Followers(Range),
    EngagementRate(Option<f64>),
    VerifiedOnly(bool),
    Language(Option<String>),
    Gender(Option<String>),
    Age(Option<AgeRange>),
    LastPostedDays(Option<u32>),
    Keywords(Option<String>),
    AudienceLanguage(Option<String>),
    AudienceGender(Option<String>),
    AudienceAgeRange(Option<AgeRange>),
    AudienceWeight(Option<f64>),
    YouTubeViewsGrowthRate(Option<GrowthRate>),
    TikTokShares(Range),
    TikTokSaves(Range),
    Sort(Option<SortClause>),
}

impl FilterState {
    /// Returns a copy of `self` with `update` applied.
    #[must_use]
    pub fn with(&self, update: FilterUpdate) -> Self {
        let mut next = self.clone();
        match update {
            FilterUpdate::Followers(r) => next.followers = r,
            FilterUpdate::EngagementRate(v) => next.engagement_rate = v,
            FilterUpdate::VerifiedOnly(v) => next.verified_only = v,
            FilterUpdate::Language(v) => next.language = v,
            FilterUpdate::Gender(v) => next.gender = v,
            FilterUpdate::Age(v) => next.age = v,
            FilterUpdate::LastPostedDays(v) => next.last_posted_days = v,
            FilterUpdate::Keywords(v) => next.keywords = v,
            FilterUpdate::AudienceLanguage(v) => next.audience.language = v,
            FilterUpdate::AudienceGender(v) => next.audience.gender = v,
            FilterUpdate::AudienceAgeRange(v) => next.audience.age_range = v,
            FilterUpdate::AudienceWeight(v) => next.audience.weight = v,
            FilterUpdate::YouTubeViewsGrowthRate(v) => next.youtube.views_growth_rate = v,
            FilterUpdate::TikTokShares(r) => next.tiktok.shares = r,
            FilterUpdate::TikTokSaves(r) => next.tiktok.saves = r,
            FilterUpdate::Sort(v) => next.sort = v,
        }
        next
    }

    /// Loads a filter preset from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::PresetIo`] if the file cannot be read and
    /// [`ConfigError::PresetParse`] if it is not a valid preset.
    pub fn load_preset(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::PresetIo {
            path: path.display().to_string(),
            source: e,
        })?;
        serde_yaml::from_str(&content).map_err(|e| ConfigError::PresetParse {
            path: path.display().to_string(),
            source: e,
        })
    }
}
