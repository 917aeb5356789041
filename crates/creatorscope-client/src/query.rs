//! Projection of [`FilterState`] into the gateway's request body.
//!
//! Platform-exclusive filters are only emitted when their platform is part of
//! the selection: YouTube's views growth rate and TikTok's shares/saves
//! ranges would otherwise be forwarded to backends that reject them.

use creatorscope_core::{AgeRange, FilterState, Platform, Range, SearchRequest};
use serde_json::{json, Map, Value};

/// Builds the request for `page` (and optional continuation `cursor`) of a
/// search over `platforms` with `filters`.
#[must_use]
pub fn build_query(
    filters: &FilterState,
    platforms: &[Platform],
    page: u32,
    cursor: Option<&str>,
) -> SearchRequest {
    let mut body = Map::new();
    body.insert("page".to_owned(), json!(page));
    if let Some(cursor) = cursor.filter(|c| !c.is_empty()) {
        body.insert("cursor".to_owned(), json!(cursor));
    }
    if let Some(sort) = &filters.sort {
        body.insert("sort".to_owned(), json!(sort));
    }

    let mut filter = Map::new();
    filter.insert(
        "influencer".to_owned(),
        Value::Object(influencer_filter(filters, platforms)),
    );
    let audience = audience_filter(filters);
    if !audience.is_empty() {
        filter.insert("audience".to_owned(), Value::Object(audience));
    }
    body.insert("filter".to_owned(), Value::Object(filter));

    SearchRequest {
        platforms: platforms.to_vec(),
        body: Value::Object(body),
    }
}

fn influencer_filter(filters: &FilterState, platforms: &[Platform]) -> Map<String, Value> {
    let mut out = Map::new();

    if !filters.followers.is_open() {
        out.insert("followers".to_owned(), range(filters.followers));
    }
    if let Some(rate) = filters.engagement_rate {
        out.insert("engagementRate".to_owned(), json!(rate));
    }
    if filters.verified_only {
        out.insert("isVerified".to_owned(), json!(true));
    }
    if let Some(language) = &filters.language {
        out.insert("language".to_owned(), json!(language));
    }
    if let Some(gender) = &filters.gender {
        out.insert("gender".to_owned(), json!(gender));
    }
    if let Some(age) = filters.age.filter(|a| a.min.is_some() || a.max.is_some()) {
        out.insert("age".to_owned(), age_range(age));
    }
    if let Some(days) = filters.last_posted_days {
        out.insert("lastposted".to_owned(), json!(days));
    }
    if let Some(keywords) = filters.keywords.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
        out.insert("keywords".to_owned(), json!(keywords));
    }

    if platforms.contains(&Platform::YouTube) {
        if let Some(growth) = &filters.youtube.views_growth_rate {
            out.insert("viewsGrowthRate".to_owned(), json!(growth));
        }
    }

    if platforms.contains(&Platform::TikTok) {
        if !filters.tiktok.shares.is_open() {
            out.insert("shares".to_owned(), range(filters.tiktok.shares));
        }
        if !filters.tiktok.saves.is_open() {
            out.insert("saves".to_owned(), range(filters.tiktok.saves));
        }
    }

    out
}

fn audience_filter(filters: &FilterState) -> Map<String, Value> {
    let audience = &filters.audience;
    let weighted = |mut v: Map<String, Value>| {
        if let Some(weight) = audience.weight {
            v.insert("weight".to_owned(), json!(weight));
        }
        Value::Object(v)
    };

    let mut out = Map::new();
    if let Some(language) = &audience.language {
        let mut m = Map::new();
        m.insert("id".to_owned(), json!(language));
        out.insert("language".to_owned(), weighted(m));
    }
    if let Some(gender) = &audience.gender {
        let mut m = Map::new();
        m.insert("id".to_owned(), json!(gender));
        out.insert("gender".to_owned(), weighted(m));
    }
    if let Some(age) = audience
        .age_range
        .filter(|a| a.min.is_some() || a.max.is_some())
    {
        out.insert("ageRange".to_owned(), weighted(bounds(age.min, age.max)));
    }
    out
}

fn range(r: Range) -> Value {
    Value::Object(bounds(r.min, r.max))
}

fn age_range(a: AgeRange) -> Value {
    Value::Object(bounds(a.min, a.max))
}

fn bounds<T: Into<Value>>(min: Option<T>, max: Option<T>) -> Map<String, Value> {
    let mut m = Map::new();
    if let Some(min) = min {
        m.insert("min".to_owned(), min.into());
    }
    if let Some(max) = max {
        m.insert("max".to_owned(), max.into());
    }
    m
}
