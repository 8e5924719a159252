//! 计数器快照。
//!
//! - GET /api/metrics

use api_contract::{ApiResponse, MetricsSnapshotDto};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use hydro_telemetry::metrics;

pub async fn get_metrics() -> Response {
    let snapshot = metrics().snapshot();
    (
        StatusCode::OK,
        Json(ApiResponse::success(MetricsSnapshotDto {
            realtime_frames: snapshot.realtime_frames,
            realtime_frames_discarded: snapshot.realtime_frames_discarded,
            realtime_reconnects: snapshot.realtime_reconnects,
            watchdog_signals: snapshot.watchdog_signals,
            notification_signals: snapshot.notification_signals,
            data_refresh_success: snapshot.data_refresh_success,
            data_refresh_failure: snapshot.data_refresh_failure,
            notification_fetch_failure: snapshot.notification_fetch_failure,
            toasts_emitted: snapshot.toasts_emitted,
            reports_generated: snapshot.reports_generated,
            reports_failed: snapshot.reports_failed,
        })),
    )
        .into_response()
}
