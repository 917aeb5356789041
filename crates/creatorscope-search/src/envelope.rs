//! Reading the response envelopes of the platform search backends.
//!
//! Endpoints disagree on where they put result rows (`results`, `items`,
//! `lookalikes`, ...) and how they report totals and continuation. Everything
//! here reads defensively: a body that is not a JSON object behaves like `{}`.

use serde_json::{Map, Value};

use crate::fields::{non_empty_str, strict_number};

/// Every envelope key known to carry result rows. All are pooled.
pub const RESULT_ARRAY_KEYS: [&str; 7] = [
    "results",
    "items",
    "influencers",
    "directs",
    "lookalikes",
    "users",
    "channels",
];

const TOTAL_KEYS: [&str; 3] = ["total", "totalCount", "count"];
const TOTAL_PAGES_KEYS: [&str; 3] = ["totalPages", "total_pages", "pages"];
const CURSOR_KEYS: [&str; 3] = ["nextCursor", "next_cursor", "cursor"];

/// Parses a response body, treating anything that is not a JSON object as `{}`.
#[must_use]
pub fn parse_body(text: &str) -> Value {
    match serde_json::from_str::<Value>(text) {
        Ok(v @ Value::Object(_)) => v,
        _ => Value::Object(Map::new()),
    }
}

/// Collects the rows of every result array present in `body`, in
/// [`RESULT_ARRAY_KEYS`] order.
#[must_use]
pub fn collect_records(body: &Value) -> Vec<&Value> {
    RESULT_ARRAY_KEYS
        .iter()
        .filter_map(|key| body.get(*key).and_then(Value::as_array))
        .flatten()
        .collect()
}

/// The total the backend reports for the query; 0 when absent or malformed.
#[must_use]
pub fn reported_total(body: &Value) -> u64 {
    TOTAL_KEYS
        .iter()
        .find_map(|key| body.get(*key).and_then(strict_number))
        .map_or(0, to_count)
}

#[must_use]
pub fn reported_total_pages(body: &Value) -> Option<u32> {
    TOTAL_PAGES_KEYS
        .iter()
        .find_map(|key| body.get(*key).and_then(strict_number))
        .map(|n| u32::try_from(to_count(n)).unwrap_or(u32::MAX))
}

#[must_use]
pub fn reported_next_cursor(body: &Value) -> Option<String> {
    CURSOR_KEYS
        .iter()
        .find_map(|key| body.get(*key).and_then(non_empty_str))
}

/// Error text from a failed upstream response: `error` or `message`, either
/// as a string or as an object carrying a `message`.
#[must_use]
pub fn upstream_error_message(body: &Value) -> Option<String> {
    ["error", "message"].iter().find_map(|key| {
        let v = body.get(*key)?;
        non_empty_str(v).or_else(|| v.get("message").and_then(non_empty_str))
    })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_count(n: f64) -> u64 {
    if n <= 0.0 {
        0
    } else {
        n.floor() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_body_treats_garbage_as_empty_object() {
        assert_eq!(parse_body("<html>502</html>"), json!({}));
        assert_eq!(parse_body(""), json!({}));
        assert_eq!(parse_body("[1,2]"), json!({}));
        assert_eq!(parse_body(r#"{"total": 1}"#), json!({ "total": 1 }));
    }

    #[test]
    fn collect_records_pools_every_known_array() {
        let body = json!({
            "results": [{ "id": 1 }],
            "lookalikes": [{ "id": 2 }, { "id": 3 }],
            "channels": [{ "id": 4 }],
            "other": [{ "id": 99 }],
            "items": "not-an-array"
        });
        let ids: Vec<_> = collect_records(&body).iter().map(|r| r["id"].clone()).collect();
        assert_eq!(ids, [json!(1), json!(2), json!(3), json!(4)]);
    }

    #[test]
    fn reported_total_falls_back_and_clamps() {
        assert_eq!(reported_total(&json!({ "total": 12 })), 12);
        assert_eq!(reported_total(&json!({ "totalCount": "40" })), 40);
        assert_eq!(reported_total(&json!({ "total": -3 })), 0);
        assert_eq!(reported_total(&json!({})), 0);
    }

    #[test]
    fn page_info_readers() {
        let body = json!({ "totalPages": 7, "next_cursor": "abc" });
        assert_eq!(reported_total_pages(&body), Some(7));
        assert_eq!(reported_next_cursor(&body).as_deref(), Some("abc"));
        assert_eq!(reported_next_cursor(&json!({ "cursor": "" })), None);
    }

    #[test]
    fn upstream_error_message_reads_string_and_nested_forms() {
        assert_eq!(
            upstream_error_message(&json!({ "error": "bad filter" })).as_deref(),
            Some("bad filter")
        );
        assert_eq!(
            upstream_error_message(&json!({ "error": { "message": "quota" } })).as_deref(),
            Some("quota")
        );
        assert_eq!(
            upstream_error_message(&json!({ "error": true, "message": "nope" })).as_deref(),
            Some("nope")
        );
        assert_eq!(upstream_error_message(&json!({})), None);
    }
}
