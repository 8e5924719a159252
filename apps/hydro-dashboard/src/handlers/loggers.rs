//! 记录仪 handlers
//!
//! - GET /api/loggers?view=table|map|all - 合并视图（定义 + 最新读数 + 分级）
//! - POST /api/loggers/refresh - 手动刷新
//! - GET /api/loggers/:id/dates?metric=&totalizer= - 可选日期
//! - GET /api/loggers/:id/history?metric=&start=&end= - 图表时序
//! - GET /api/loggers/:id/config-log - 配置变更历史
//! - PATCH /api/loggers/:id/config、/api/loggers/:id/limits - 配置/阈值变更

use api_contract::{
    ApiResponse, ConfigChangeRequest, LoggerConfigFields, LoggerLimitsFields, LoggerViewDto,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use domain::{Logger, LoggerId};
use hydro_store::LoggerView;

use crate::AppState;
use crate::utils::{
    bad_request_error, merged_to_dto, not_found_error, parse_date_range, parse_metric,
    report_error, store_error,
};

#[derive(Debug, Default, serde::Deserialize)]
pub struct LoggerListQuery {
    view: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
pub struct DatesQuery {
    metric: String,
    #[serde(default)]
    totalizer: bool,
}

#[derive(Debug, serde::Deserialize)]
pub struct HistoryQuery {
    metric: String,
    start: String,
    end: String,
}

/// 快照中的记录仪；不存在时返回 404 响应。
fn known_logger(state: &AppState, logger_id: LoggerId) -> Result<Logger, Response> {
    state
        .log_data
        .logger(logger_id)
        .ok_or_else(|| not_found_error(format!("logger {logger_id} not found")))
}

/// 列出记录仪
pub async fn list_loggers(
    State(state): State<AppState>,
    Query(query): Query<LoggerListQuery>,
) -> Response {
    let view = match query.view.as_deref() {
        None => LoggerView::default(),
        Some(raw) => match LoggerView::parse(raw) {
            Some(view) => view,
            None => return bad_request_error(format!("unknown view: {raw}")),
        },
    };
    let data: Vec<LoggerViewDto> = state
        .log_data
        .view(view, Utc::now())
        .into_iter()
        .map(merged_to_dto)
        .collect();
    (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
}

/// 手动刷新
pub async fn refresh_loggers(State(state): State<AppState>) -> Response {
    match state.log_data.fetch_data().await {
        Ok(()) => {
            let data: Vec<LoggerViewDto> = state
                .log_data
                .merged(Utc::now())
                .into_iter()
                .map(merged_to_dto)
                .collect();
            (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
        }
        Err(err) => store_error(err),
    }
}

/// 可选日期
pub async fn logger_dates(
    State(state): State<AppState>,
    Path(logger_id): Path<LoggerId>,
    Query(query): Query<DatesQuery>,
) -> Response {
    let logger = match known_logger(&state, logger_id) {
        Ok(logger) => logger,
        Err(response) => return response,
    };
    let metric = match parse_metric(&query.metric) {
        Ok(metric) => metric,
        Err(response) => return response,
    };
    match state
        .reports
        .available_dates(&logger, metric, query.totalizer)
        .await
    {
        Ok(dates) => (StatusCode::OK, Json(ApiResponse::success(dates))).into_response(),
        Err(err) => report_error(err),
    }
}

/// 图表时序
pub async fn logger_history(
    State(state): State<AppState>,
    Path(logger_id): Path<LoggerId>,
    Query(query): Query<HistoryQuery>,
) -> Response {
    let logger = match known_logger(&state, logger_id) {
        Ok(logger) => logger,
        Err(response) => return response,
    };
    let metric = match parse_metric(&query.metric) {
        Ok(metric) => metric,
        Err(response) => return response,
    };
    let range = match parse_date_range(&query.start, &query.end) {
        Ok(range) => range,
        Err(response) => return response,
    };
    let kind = logger.log_kind_for(metric);
    match state.reports.history(&logger, kind, &range).await {
        Ok(rows) => (StatusCode::OK, Json(ApiResponse::success(rows))).into_response(),
        Err(err) => report_error(err),
    }
}

/// 配置变更历史
pub async fn logger_config_log(
    State(state): State<AppState>,
    Path(logger_id): Path<LoggerId>,
) -> Response {
    match state.config_editor.config_history(logger_id).await {
        Ok(entries) => (StatusCode::OK, Json(ApiResponse::success(entries))).into_response(),
        Err(err) => store_error(err),
    }
}

/// 修改基础配置
///
/// 校验并规范化名称、坐标、SIM 卡号等字段，连同变更前的值一起提交审计补丁。
///
/// # 参数
///
/// - `state`: 应用状态，包含 `config_editor` 与 `log_data`
/// - `logger_id`: 路径参数，记录仪 ID
/// - `req`: 变更请求，`changes` 为新的配置字段，`user` 为操作用户
///
/// # 返回
///
/// 成功时返回 `200 OK` 和刷新后的合并视图；刷新失败时 `data` 为 `null`。
///
/// # 流程
///
/// 1. 规范化并校验 `changes`，失败时不请求后端
/// 2. 从后端读取当前记录仪作为 `previous`
/// 3. 调用 `update_logger_config` 提交 `{previous, current, user}`
/// 4. 重新拉取记录仪与最新读数，返回该记录仪的合并视图
///
/// # 错误处理
///
/// - `400 BAD_REQUEST`: 字段校验失败（坐标、SIM 卡号等）
/// - `404 NOT_FOUND`: 记录仪不存在
/// - `502 BAD_GATEWAY`: 后端请求失败
pub async fn update_logger_config(
    State(state): State<AppState>,
    Path(logger_id): Path<LoggerId>,
    Json(req): Json<ConfigChangeRequest<LoggerConfigFields>>,
) -> Response {
    match state
        .config_editor
        .update_config(logger_id, req.changes, req.user)
        .await
    {
        Ok(()) => updated(&state, logger_id),
        Err(err) => store_error(err),
    }
}

/// 修改告警阈值
///
/// 流程与 [`update_logger_config`] 相同；阈值须为 `下限,上限` 且下限不大于上限。
pub async fn update_logger_limits(
    State(state): State<AppState>,
    Path(logger_id): Path<LoggerId>,
    Json(req): Json<ConfigChangeRequest<LoggerLimitsFields>>,
) -> Response {
    match state
        .config_editor
        .update_limits(logger_id, req.changes, req.user)
        .await
    {
        Ok(()) => updated(&state, logger_id),
        Err(err) => store_error(err),
    }
}

/// 变更后返回刷新过的合并视图；刷新失败时快照里可能没有该记录仪。
fn updated(state: &AppState, logger_id: LoggerId) -> Response {
    let data = state
        .log_data
        .merged(Utc::now())
        .into_iter()
        .find(|merged| merged.logger.logger_id == logger_id)
        .map(merged_to_dto);
    (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
}
