//! 水务遥测看板服务：装配后端客户端、状态层、实时通道与报表服务，对外提供 JSON API。

mod handlers;
mod routes;
mod utils;

use axum::{
    Router,
    body::Body,
    http::{HeaderValue, Request},
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use hydro_backend::{Backend, HttpBackend};
use hydro_config::AppConfig;
use hydro_realtime::{RealtimeConfig, RealtimeService};
use hydro_report::ReportService;
use hydro_store::{
    ConfigEditor, LogDataStore, NotificationStore, ToastSink, TracingToastSink,
    spawn_notification_sync, spawn_watchdog_sync,
};
use hydro_telemetry::{init_tracing, new_request_ids};
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::{Instrument, info, warn};

#[derive(Clone)]
pub struct AppState {
    pub log_data: Arc<LogDataStore>,
    pub notifications: Arc<NotificationStore>,
    pub config_editor: Arc<ConfigEditor>,
    pub reports: Arc<ReportService>,
    pub realtime: Arc<RealtimeService>,
}

impl AppState {
    /// 基于同一个后端与提示接收器组装全部状态。
    pub fn new(
        backend: Arc<dyn Backend>,
        toasts: Arc<dyn ToastSink>,
        realtime: Arc<RealtimeService>,
    ) -> Self {
        let log_data = Arc::new(LogDataStore::new(backend.clone()));
        let notifications = Arc::new(NotificationStore::new(backend.clone(), toasts.clone()));
        let config_editor = Arc::new(ConfigEditor::new(backend.clone(), log_data.clone()));
        let reports = Arc::new(ReportService::new(backend, toasts));
        Self {
            log_data,
            notifications,
            config_editor,
            reports,
            realtime,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    // 从环境变量加载运行配置
    let config = AppConfig::from_env()?;
    // 初始化结构化日志
    init_tracing();
    info!(
        api = %config.api_base_url,
        ws = %config.ws_url,
        pocketbase = config.pocketbase_url.as_deref().unwrap_or("-"),
        "configuration loaded"
    );

    let backend: Arc<dyn Backend> = Arc::new(HttpBackend::new(
        config.api_base_url.clone(),
        config.http_timeout_ms.map(Duration::from_millis),
    )?);
    let toasts: Arc<dyn ToastSink> = Arc::new(TracingToastSink);
    let realtime = Arc::new(RealtimeService::new(RealtimeConfig::new(
        config.ws_url.clone(),
        Duration::from_millis(config.ws_reconnect_ms),
    )?));
    let state = AppState::new(backend, toasts, realtime.clone());

    // 实时信号驱动的刷新任务
    let mut sync_tasks = Vec::new();
    if config.realtime_enabled {
        sync_tasks.push(spawn_watchdog_sync(
            realtime.watchdog(),
            state.log_data.clone(),
        ));
        sync_tasks.push(spawn_notification_sync(
            realtime.notifications(),
            state.notifications.clone(),
        ));
        realtime.start();
    } else {
        info!("realtime channel disabled");
    }

    // 首次加载；失败只记录，等待下一次信号或手动刷新
    if let Err(err) = state.log_data.fetch_data().await {
        warn!(error = %err, "initial logger fetch failed");
    }
    if let Err(err) = state.notifications.fetch_notifications(false).await {
        warn!(error = %err, "initial notification fetch failed");
    }

    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    info!(addr = %config.http_addr, "dashboard api listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    realtime.stop().await;
    for task in sync_tasks {
        task.abort();
    }
    info!("dashboard stopped");
    Ok(())
}

/// 健康检查在根路径，业务接口挂在 `/api` 下。
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", routes::create_api_router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // 注入 request_id/trace_id
        .layer(middleware::from_fn(request_context))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "ctrl-c listener failed");
    }
    info!("shutdown requested");
}

async fn request_context(mut req: Request<Body>, next: Next) -> Response {
    // 生成 request_id 与 trace_id，并注入请求扩展与日志
    let ids = new_request_ids();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    req.extensions_mut().insert(ids.clone());

    let span = tracing::info_span!(
        "request",
        request_id = %ids.request_id,
        trace_id = %ids.trace_id,
        method = %method,
        path = %path
    );

    let mut response = next.run(req).instrument(span).await;
    response.headers_mut().insert(
        "x-request-id",
        HeaderValue::from_str(&ids.request_id).unwrap_or_else(|_| HeaderValue::from_static("")),
    );
    response.headers_mut().insert(
        "x-trace-id",
        HeaderValue::from_str(&ids.trace_id).unwrap_or_else(|_| HeaderValue::from_static("")),
    );
    response
}


#[cfg(test)]
mod tests {
    use super::test_support::{body_json, harness};
    use super::*;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_carries_request_ids() {
        let h = harness();
        let response = build_app(h.state)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        assert!(response.headers().contains_key("x-trace-id"));
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["realtime"], false);
    }
}
