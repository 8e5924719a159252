//! 通知 handlers
//!
//! - GET /api/notifications - 本地通知列表
//! - GET /api/notifications/unread-count - 未读数
//! - POST /api/notifications/refresh?includeRead= - 重新拉取
//! - POST /api/notifications/:id/read - 单条已读
//! - POST /api/notifications/read-all - 批量已读
//! - POST /api/notifications/:id/open - 点击通知（已读 + 地图定位）

use api_contract::{ApiResponse, MarkReadRequest, UnreadCountDto};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::AppState;
use crate::utils::{map_focus_to_dto, store_error};

#[derive(Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshQuery {
    #[serde(default)]
    include_read: bool,
}

pub async fn list_notifications(State(state): State<AppState>) -> Response {
    (
        StatusCode::OK,
        Json(ApiResponse::success(state.notifications.list())),
    )
        .into_response()
}

pub async fn unread_count(State(state): State<AppState>) -> Response {
    let data = UnreadCountDto {
        unread: state.notifications.unread_count(),
    };
    (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
}

/// 重新拉取，返回替换后的列表
pub async fn refresh_notifications(
    State(state): State<AppState>,
    Query(query): Query<RefreshQuery>,
) -> Response {
    match state
        .notifications
        .fetch_notifications(query.include_read)
        .await
    {
        Ok(_) => (
            StatusCode::OK,
            Json(ApiResponse::success(state.notifications.list())),
        )
            .into_response(),
        Err(err) => store_error(err),
    }
}

/// 返回是否实际发出了已读请求
pub async fn mark_notification_read(
    State(state): State<AppState>,
    Path(notification_id): Path<i64>,
) -> Response {
    match state.notifications.mark_read_by_id(notification_id).await {
        Ok(changed) => (StatusCode::OK, Json(ApiResponse::success(changed))).into_response(),
        Err(err) => store_error(err),
    }
}

pub async fn mark_all_notifications_read(
    State(state): State<AppState>,
    Json(req): Json<MarkReadRequest>,
) -> Response {
    match state
        .notifications
        .mark_all_read(&req.notification_ids)
        .await
    {
        Ok(changed) => (StatusCode::OK, Json(ApiResponse::success(changed))).into_response(),
        Err(err) => store_error(err),
    }
}

/// 点击通知
///
/// 将通知标记为已读，并从通知载荷中取出地图定位。
///
/// # 参数
///
/// - `state`: 应用状态，包含 `notifications` 存储
/// - `notification_id`: 路径参数，本地列表中的通知 ID
///
/// # 返回
///
/// 成功时返回 `200 OK` 和 `{lat, lon, zoom}`；载荷没有坐标时 `data` 为 `null`。
///
/// # 流程
///
/// 1. 在本地列表中查找通知，找不到时返回 `404`
/// 2. 未读时调用后端标记已读，已读则跳过
/// 3. 解析载荷中的 `coordinates`，生成地图定位
///
/// # 错误处理
///
/// - `404 NOT_FOUND`: 本地列表中没有该通知
/// - `502 BAD_GATEWAY`: 标记已读请求失败
pub async fn open_notification(
    State(state): State<AppState>,
    Path(notification_id): Path<i64>,
) -> Response {
    match state.notifications.open_notification(notification_id).await {
        Ok(focus) => (
            StatusCode::OK,
            Json(ApiResponse::success(focus.map(map_focus_to_dto))),
        )
            .into_response(),
        Err(err) => store_error(err),
    }
}
