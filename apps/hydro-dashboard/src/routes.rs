//! 路由定义
//!
//! 集中管理所有 API 路由，将路径映射到对应的 handlers。
//! 路由挂载在 `/api` 下：
//! - 记录仪：/loggers/*
//! - 通知：/notifications/*
//! - 报表：/reports/*
//! - 计数器：/metrics

use super::AppState;
use super::handlers::*;
use axum::{
    Router,
    routing::{get, patch, post},
};

/// 创建 API 路由
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/loggers", get(list_loggers))
        .route("/loggers/refresh", post(refresh_loggers))
        .route("/loggers/:logger_id/dates", get(logger_dates))
        .route("/loggers/:logger_id/history", get(logger_history))
        .route("/loggers/:logger_id/config-log", get(logger_config_log))
        .route("/loggers/:logger_id/config", patch(update_logger_config))
        .route("/loggers/:logger_id/limits", patch(update_logger_limits))
        .route("/notifications", get(list_notifications))
        .route("/notifications/unread-count", get(unread_count))
        .route("/notifications/refresh", post(refresh_notifications))
        .route("/notifications/read-all", post(mark_all_notifications_read))
        .route(
            "/notifications/:notification_id/read",
            post(mark_notification_read),
        )
        .route("/notifications/:notification_id/open", post(open_notification))
        .route("/reports", post(generate_report))
        .route("/reports/download", get(download_report))
        .route("/metrics", get(get_metrics))
}
