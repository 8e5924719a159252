use api_contract::ApiResponse;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use domain::time::format_log_time;

use crate::AppState;

pub async fn health(State(state): State<AppState>) -> Response {
    let refreshed_at = state
        .log_data
        .snapshot()
        .refreshed_at
        .map(|ts| format_log_time(&ts));
    (
        StatusCode::OK,
        Json(ApiResponse::success(serde_json::json!({
            "ok": true,
            "realtime": state.realtime.is_running(),
            "refreshedAt": refreshed_at,
        }))),
    )
        .into_response()
}
