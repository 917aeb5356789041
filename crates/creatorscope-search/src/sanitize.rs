//! Per-platform correction of search request bodies.
//!
//! YouTube's backend enforces a stricter filter grammar than the other
//! platforms and rejects or silently empties queries that the others accept.
//! [`YouTubeSanitizer`] rewrites a body into the shape it accepts; every other
//! platform only gets a default page index.
//!
//! ## YouTube rules
//!
//! - A sort clause is mandatory; missing or malformed → `followers desc`.
//! - `filter.influencer.lastposted` has a floor of 30 days.
//! - `filter.influencer.age` bounds must be one of `18, 25, 35, 45, 65`.
//!   Any other bound drops the whole `age` filter rather than failing.
//! - `filter.audience.age` and `filter.audience.ageRange` cannot be combined;
//!   `ageRange` is kept.
//! - `filterOperations` conflicts with sorting and is removed.
//!
//! Sanitizers never mutate their input; they work on a copy.

use creatorscope_core::Platform;
use serde_json::{json, Map, Value};

use crate::fields::strict_number;

const MIN_LAST_POSTED_DAYS: f64 = 30.0;
const ALLOWED_AGE_BOUNDS: [u64; 5] = [18, 25, 35, 45, 65];

/// Influencer-side filters removed in relaxed mode: growth rates, view and
/// engagement floors, and recency.
const RELAXED_INFLUENCER_KEYS: [&str; 6] = [
    "followersGrowthRate",
    "viewsGrowthRate",
    "views",
    "engagements",
    "engagementRate",
    "lastposted",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SanitizeOptions {
    /// Drop the most restrictive filter groups and force the default sort.
    /// Used for the single retry after a strict query returned nothing.
    pub relax: bool,
}

impl SanitizeOptions {
    #[must_use]
    pub fn relaxed() -> Self {
        Self { relax: true }
    }
}

/// Platform-specific request-shape correction.
pub trait BodySanitizer: Send + Sync {
    /// Returns a corrected copy of `body`.
    fn sanitize(&self, body: &Value, opts: SanitizeOptions) -> Value;

    /// Whether an empty strict result may be retried once in relaxed mode.
    fn supports_relaxed_retry(&self) -> bool {
        false
    }
}

/// Injects a default page index and nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageOnlySanitizer;

impl BodySanitizer for PageOnlySanitizer {
    fn sanitize(&self, body: &Value, _opts: SanitizeOptions) -> Value {
        let mut out = to_object(body);
        inject_default_page(&mut out);
        Value::Object(out)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct YouTubeSanitizer;

impl BodySanitizer for YouTubeSanitizer {
    fn sanitize(&self, body: &Value, opts: SanitizeOptions) -> Value {
        let mut out = to_object(body);
        inject_default_page(&mut out);

        if opts.relax || !has_usable_sort(&out) {
            out.insert("sort".to_owned(), default_sort());
        } else if let Some(sort) = out.get_mut("sort").and_then(Value::as_object_mut) {
            sort.entry("direction").or_insert_with(|| json!("desc"));
        }

        out.remove("filterOperations");

        if let Some(filter) = out.get_mut("filter").and_then(Value::as_object_mut) {
            if let Some(influencer) = filter.get_mut("influencer").and_then(Value::as_object_mut) {
                influencer.remove("filterOperations");
                clamp_last_posted(influencer);
                coerce_age(influencer);
                if opts.relax {
                    for key in RELAXED_INFLUENCER_KEYS {
                        influencer.remove(key);
                    }
                }
            }

            if opts.relax {
                filter.remove("audience");
            } else if let Some(audience) = filter.get_mut("audience").and_then(Value::as_object_mut)
            {
                if audience.contains_key("ageRange") {
                    audience.remove("age");
                }
            }
        }

        Value::Object(out)
    }

    fn supports_relaxed_retry(&self) -> bool {
        true
    }
}

/// Returns the sanitizer responsible for `platform`.
#[must_use]
pub fn sanitizer_for(platform: Platform) -> &'static dyn BodySanitizer {
    match platform {
        Platform::YouTube => &YouTubeSanitizer,
        Platform::Instagram | Platform::TikTok => &PageOnlySanitizer,
    }
}

/// Sanitizes `body` for `platform`. See [`BodySanitizer::sanitize`].
#[must_use]
pub fn sanitize(platform: Platform, body: &Value, opts: SanitizeOptions) -> Value {
    sanitizer_for(platform).sanitize(body, opts)
}

/// Shorthand for the YouTube rules.
#[must_use]
pub fn sanitize_youtube_body(body: &Value, opts: SanitizeOptions) -> Value {
    YouTubeSanitizer.sanitize(body, opts)
}

fn to_object(body: &Value) -> Map<String, Value> {
    body.as_object().cloned().unwrap_or_default()
}

fn inject_default_page(out: &mut Map<String, Value>) {
    if out.get("page").and_then(Value::as_u64).is_none() {
        out.insert("page".to_owned(), json!(0));
    }
}

fn default_sort() -> Value {
    json!({ "field": "followers", "direction": "desc" })
}

fn has_usable_sort(out: &Map<String, Value>) -> bool {
    out.get("sort")
        .and_then(|s| s.get("field"))
        .and_then(Value::as_str)
        .is_some_and(|f| !f.trim().is_empty())
}

fn clamp_last_posted(influencer: &mut Map<String, Value>) {
    let Some(days) = influencer.get("lastposted").and_then(strict_number) else {
        return;
    };
    if days < MIN_LAST_POSTED_DAYS {
        influencer.insert("lastposted".to_owned(), json!(30));
    }
}

/// Keeps `age` only when every present bound is an allowed value; otherwise
/// removes it entirely.
fn coerce_age(influencer: &mut Map<String, Value>) {
    let Some(age) = influencer.get("age") else {
        return;
    };

    let bound = |key: &str| -> Result<Option<u64>, ()> {
        match age.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(v) => {
                let n = strict_number(v).ok_or(())?;
                ALLOWED_AGE_BOUNDS
                    .into_iter()
                    .find(|allowed| {
                        #[allow(clippy::cast_precision_loss)]
                        let allowed = *allowed as f64;
                        (allowed - n).abs() < f64::EPSILON
                    })
                    .map(Some)
                    .ok_or(())
            }
        }
    };

    let coerced = match (age.is_object(), bound("min"), bound("max")) {
        (true, Ok(min), Ok(max)) if min.is_some() || max.is_some() => {
            let mut m = Map::new();
            if let Some(min) = min {
                m.insert("min".to_owned(), json!(min));
            }
            if let Some(max) = max {
                m.insert("max".to_owned(), json!(max));
            }
            Some(Value::Object(m))
        }
        _ => None,
    };

    match coerced {
        Some(age) => {
            influencer.insert("age".to_owned(), age);
        }
        None => {
            influencer.remove("age");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_last_posted_to_thirty_days() {
        let body = json!({ "filter": { "influencer": { "lastposted": 10 } } });
        let out = sanitize_youtube_body(&body, SanitizeOptions::default());
        assert_eq!(out["filter"]["influencer"]["lastposted"], 30);
    }

    #[test]
    fn leaves_last_posted_at_or_above_floor() {
        let body = json!({ "filter": { "influencer": { "lastposted": 90 } } });
        let out = sanitize_youtube_body(&body, SanitizeOptions::default());
        assert_eq!(out["filter"]["influencer"]["lastposted"], 90);
    }

    #[test]
    fn drops_age_when_bounds_are_not_allowed() {
        let body = json!({ "filter": { "influencer": { "age": { "min": 20, "max": 30 } } } });
        let out = sanitize_youtube_body(&body, SanitizeOptions::default());
        assert!(out["filter"]["influencer"].get("age").is_none());
    }

    #[test]
    fn drops_age_when_only_one_bound_is_invalid() {
        let body = json!({ "filter": { "influencer": { "age": { "min": 18, "max": 30 } } } });
        let out = sanitize_youtube_body(&body, SanitizeOptions::default());
        assert!(out["filter"]["influencer"].get("age").is_none());
    }

    #[test]
    fn keeps_and_coerces_allowed_age_bounds() {
        let body = json!({ "filter": { "influencer": { "age": { "min": "25", "max": 45 } } } });
        let out = sanitize_youtube_body(&body, SanitizeOptions::default());
        assert_eq!(
            out["filter"]["influencer"]["age"],
            json!({ "min": 25, "max": 45 })
        );
    }

    #[test]
    fn open_ended_age_with_allowed_bound_is_kept() {
        let body = json!({ "filter": { "influencer": { "age": { "min": 65 } } } });
        let out = sanitize_youtube_body(&body, SanitizeOptions::default());
        assert_eq!(out["filter"]["influencer"]["age"], json!({ "min": 65 }));
    }

    #[test]
    fn audience_age_range_wins_over_age_buckets() {
        let body = json!({ "filter": { "audience": {
            "age": [{ "id": "18-24", "weight": 0.3 }],
            "ageRange": { "min": "18", "max": "24", "weight": 0.3 }
        } } });
        let out = sanitize_youtube_body(&body, SanitizeOptions::default());
        let audience = &out["filter"]["audience"];
        assert!(audience.get("age").is_none());
        assert!(audience.get("ageRange").is_some());
    }

    #[test]
    fn audience_age_buckets_alone_are_kept() {
        let body = json!({
            "filter": { "audience": { "age": [{ "id": "25-34", "weight": 0.2 }] } }
        });
        let out = sanitize_youtube_body(&body, SanitizeOptions::default());
        assert!(out["filter"]["audience"].get("age").is_some());
    }

    #[test]
    fn strips_filter_operations() {
        let body = json!({
            "filterOperations": [{ "operator": "and" }],
            "filter": { "influencer": { "filterOperations": [{ "operator": "or" }] } }
        });
        let out = sanitize_youtube_body(&body, SanitizeOptions::default());
        assert!(out.get("filterOperations").is_none());
        assert!(out["filter"]["influencer"].get("filterOperations").is_none());
    }

    #[test]
    fn inserts_default_sort_and_keeps_a_valid_one() {
        let out = sanitize_youtube_body(&json!({}), SanitizeOptions::default());
        assert_eq!(out["sort"], json!({ "field": "followers", "direction": "desc" }));

        let body = json!({ "sort": { "field": "engagementRate", "direction": "asc" } });
        let out = sanitize_youtube_body(&body, SanitizeOptions::default());
        assert_eq!(out["sort"]["field"], "engagementRate");
        assert_eq!(out["sort"]["direction"], "asc");
    }

    #[test]
    fn relax_forces_default_sort_and_drops_restrictive_filters() {
        let body = json!({
            "page": 2,
            "sort": { "field": "engagementRate", "direction": "asc" },
            "filter": {
                "influencer": {
                    "followers": { "min": 1000 },
                    "engagementRate": 0.05,
                    "engagements": { "min": 10 },
                    "views": { "min": 5000 },
                    "viewsGrowthRate": { "interval": "i1month", "value": 0.2 },
                    "followersGrowthRate": { "interval": "i1month", "value": 0.1 },
                    "lastposted": 10,
                    "language": "en"
                },
                "audience": { "gender": { "id": "FEMALE", "weight": 0.5 } }
            }
        });
        let out = sanitize_youtube_body(&body, SanitizeOptions::relaxed());
        assert_eq!(out["sort"], json!({ "field": "followers", "direction": "desc" }));
        assert!(out["filter"].get("audience").is_none());
        let influencer = out["filter"]["influencer"].as_object().unwrap();
        for key in RELAXED_INFLUENCER_KEYS {
            assert!(!influencer.contains_key(key), "{key} should be dropped");
        }
        assert_eq!(influencer["followers"], json!({ "min": 1000 }));
        assert_eq!(influencer["language"], "en");
        assert_eq!(out["page"], 2);
    }

    #[test]
    fn relax_on_empty_body_still_yields_default_sort_and_no_audience() {
        let out = sanitize_youtube_body(&json!(null), SanitizeOptions::relaxed());
        assert_eq!(out["sort"], json!({ "field": "followers", "direction": "desc" }));
        assert!(out.get("filter").is_none_or(|f| f.get("audience").is_none()));
    }

    #[test]
    fn never_mutates_the_input() {
        let body = json!({
            "filter": {
                "influencer": { "lastposted": 5, "age": { "min": 20 } },
                "audience": { "age": [], "ageRange": {} }
            }
        });
        let before = body.clone();
        let _ = sanitize_youtube_body(&body, SanitizeOptions::relaxed());
        let _ = sanitize_youtube_body(&body, SanitizeOptions::default());
        assert_eq!(body, before);
    }

    #[test]
    fn other_platforms_only_get_a_page_index() {
        let body = json!({
            "filter": { "influencer": { "lastposted": 1, "age": { "min": 20 } } },
            "filterOperations": []
        });
        for platform in [Platform::Instagram, Platform::TikTok] {
            let out = sanitize(platform, &body, SanitizeOptions::relaxed());
            let mut expected = body.clone();
            expected["page"] = json!(0);
            assert_eq!(out, expected, "platform {platform}");
        }
    }

    #[test]
    fn existing_page_index_is_preserved() {
        let out = sanitize(Platform::Instagram, &json!({ "page": 4 }), SanitizeOptions::default());
        assert_eq!(out["page"], 4);
        let out = sanitize(Platform::TikTok, &json!({ "page": "x" }), SanitizeOptions::default());
        assert_eq!(out["page"], 0);
    }

    #[test]
    fn only_youtube_supports_relaxed_retry() {
        assert!(sanitizer_for(Platform::YouTube).supports_relaxed_retry());
        assert!(!sanitizer_for(Platform::Instagram).supports_relaxed_retry());
        assert!(!sanitizer_for(Platform::TikTok).supports_relaxed_retry());
    }
}
