use axum::{body::Bytes, extract::State, Extension, Json};
use creatorscope_core::{Platform, SearchPage};
use serde_json::Value;

use crate::middleware::RequestId;

use super::{map_gateway_error, ApiError, AppState};

/// `POST /api/v1/search` with `{ "platforms": [...], "body": {...} }`.
///
/// The raw bytes are parsed here rather than through `Json<T>` so that
/// malformed input yields the same `{ error }` shape as every other failure.
pub(super) async fn search(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Bytes,
) -> Result<Json<SearchPage>, ApiError> {
    if !state.gateway.is_configured() {
        tracing::error!("search rejected: upstream credential is not configured");
        return Err(ApiError::new(
            req_id.0,
            "configuration_error",
            "upstream search credential is not configured",
        ));
    }

    let request: Value = serde_json::from_slice(&payload)
        .map_err(|_| ApiError::new(req_id.0.clone(), "bad_request", "invalid JSON body"))?;

    let platforms = parse_platforms(request.get("platforms"))
        .map_err(|message| ApiError::new(req_id.0.clone(), "validation_error", message))?;
    let body = request.get("body").cloned().unwrap_or(Value::Null);

    tracing::info!(request_id = %req_id.0, platforms = ?platforms, "search request");

    let page = state
        .gateway
        .search(&platforms, &body)
        .await
        .map_err(|e| map_gateway_error(req_id.0.clone(), &e))?;

    Ok(Json(page))
}

/// Validates the inbound platform list. Duplicates collapse to their first
/// occurrence.
fn parse_platforms(value: Option<&Value>) -> Result<Vec<Platform>, String> {
    let Some(items) = value.and_then(Value::as_array).filter(|a| !a.is_empty()) else {
        return Err("platforms must be a non-empty array".to_owned());
    };

    let mut platforms = Vec::with_capacity(items.len());
    for item in items {
        let platform = item
            .as_str()
            .and_then(Platform::parse)
            .ok_or_else(|| format!("unsupported platform: {item}"))?;
        if !platforms.contains(&platform) {
            platforms.push(platform);
        }
    }
    Ok(platforms)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{app, send};
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn post(payload: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/search")
            .header("content-type", "application/json")
            .body(payload.into())
            .expect("request")
    }

    fn post_json(payload: &Value) -> Request<Body> {
        post(payload.to_string())
    }

    fn creator(user_id: &str, username: &str) -> Value {
        json!({
            "userId": user_id,
            "profile": { "username": username, "followers": 1000, "engagementRate": 0.05 }
        })
    }

    #[test]
    fn parse_platforms_rejects_bad_input() {
        assert!(parse_platforms(None).is_err());
        assert!(parse_platforms(Some(&json!([]))).is_err());
        assert!(parse_platforms(Some(&json!("youtube"))).is_err());

        let err = parse_platforms(Some(&json!(["youtube", "myspace"]))).unwrap_err();
        assert!(err.contains("myspace"), "message should name the bad value: {err}");
    }

    #[test]
    fn parse_platforms_collapses_duplicates() {
        let platforms = parse_platforms(Some(&json!(["tiktok", "youtube", "tiktok"])))
            .expect("valid platforms");
        assert_eq!(platforms, [Platform::TikTok, Platform::YouTube]);
    }

    #[tokio::test]
    async fn missing_credential_is_500() {
        let (status, json) = send(
            app("http://127.0.0.1:9", None),
            post_json(&json!({ "platforms": ["instagram"], "body": {} })),
        )
        .await;

        assert_eq!(status, 500);
        assert_eq!(json["error"], "upstream search credential is not configured");
    }

    #[tokio::test]
    async fn invalid_json_is_400() {
        let (status, json) = send(app("http://127.0.0.1:9", Some("t")), post("{not json")).await;

        assert_eq!(status, 400);
        assert_eq!(json["error"], "invalid JSON body");
        assert!(json["meta"]["request_id"].is_string());
    }

    #[tokio::test]
    async fn unsupported_platform_is_400() {
        let (status, json) = send(
            app("http://127.0.0.1:9", Some("t")),
            post_json(&json!({ "platforms": ["friendster"], "body": {} })),
        )
        .await;

        assert_eq!(status, 400);
        assert!(json["error"]
            .as_str()
            .is_some_and(|m| m.contains("friendster")));
    }

    #[tokio::test]
    async fn upstream_failure_is_502_with_upstream_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tiktok/search"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": "quota exhausted"
            })))
            .mount(&server)
            .await;

        let (status, json) = send(
            app(&server.uri(), Some("t")),
            post_json(&json!({ "platforms": ["tiktok"], "body": { "page": 0 } })),
        )
        .await;

        assert_eq!(status, 502);
        assert_eq!(json["error"], "quota exhausted");
    }

    #[tokio::test]
    async fn youtube_recency_filter_recovers_through_relaxed_retry() {
        let server = MockServer::start().await;

        // Relaxed request: recency dropped, sort forced back to the default.
        Mock::given(method("POST"))
            .and(path("/youtube/search"))
            .and(body_partial_json(json!({
                "sort": { "field": "followers", "direction": "desc" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total": 3,
                "lookalikes": [
                    creator("UC1", "one"),
                    creator("UC2", "two"),
                    creator("UC3", "three")
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/youtube/search"))
            .and(body_partial_json(json!({
                "filter": { "influencer": { "lastposted": 30 } }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total": 0,
                "lookalikes": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (status, json) = send(
            app(&server.uri(), Some("t")),
            post_json(&json!({
                "platforms": ["youtube"],
                "body": {
                    "sort": { "field": "engagements", "direction": "desc" },
                    "filter": { "influencer": { "lastposted": 5 } }
                }
            })),
        )
        .await;

        assert_eq!(status, 200);
        assert_eq!(json["total"], 3);
        assert_eq!(json["unique"], 3);
        assert_eq!(json["results"].as_array().map(Vec::len), Some(3));
        assert_eq!(json["results"][0]["platform"], "youtube");
    }
}
