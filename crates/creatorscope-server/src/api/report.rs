use axum::{
    extract::{Path, State},
    Extension, Json,
};
use creatorscope_core::Platform;
use serde_json::Value;

use crate::middleware::RequestId;

use super::{map_gateway_error, ApiError, ApiResponse, AppState, ResponseMeta};

/// `GET /api/v1/report/{platform}/{user_id}`: upstream profile report,
/// passed through untouched under `data`.
pub(super) async fn get_report(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((platform, user_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<Value>>, ApiError> {
    let platform = Platform::parse(&platform).ok_or_else(|| {
        ApiError::new(
            req_id.0.clone(),
            "validation_error",
            format!("unsupported platform: {platform}"),
        )
    })?;

    let data = state
        .gateway
        .fetch_report(platform, &user_id)
        .await
        .map_err(|e| map_gateway_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
