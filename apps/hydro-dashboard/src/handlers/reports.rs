//! 报表 handlers
//!
//! - POST /api/reports - 生成报表；CSV/JSON 直接返回文件，XLSX 返回待下载状态
//! - GET /api/reports/download - 写出待下载的 XLSX 工作簿

use api_contract::{ApiResponse, ReportRequestDto, ReportStatusDto};
use axum::{
    Json,
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use domain::ReportRequest;
use hydro_report::ReportFile;

use crate::AppState;
use crate::utils::{not_found_error, parse_date_range, report_error};

/// 生成报表
///
/// 按所选指标与日期范围读取历史日志，整理成报表文件。
///
/// # 参数
///
/// - `state`: 应用状态，包含 `log_data` 快照与 `reports` 服务
/// - `req`: 报表请求，包含 `loggerId`、指标、起止日期、格式和操作用户
///
/// # 返回
///
/// CSV/JSON 以附件形式直接返回文件内容；XLSX 返回 `ReportStatusDto`，
/// 工作簿暂存到 `GET /api/reports/download` 写出。
///
/// # 流程
///
/// 1. 从快照查找记录仪，不存在时返回 `404`
/// 2. 解析起止日期
/// 3. 调用 `reports.generate` 读取日志并生成表格
/// 4. 按格式返回文件或待下载状态
///
/// # 错误处理
///
/// - `400 BAD_REQUEST`: 日期格式错误或起止颠倒
/// - `404 NOT_FOUND`: 记录仪不存在
/// - `502 BAD_GATEWAY`: 后端请求失败（同时推送错误提示）
pub async fn generate_report(
    State(state): State<AppState>,
    Json(req): Json<ReportRequestDto>,
) -> Response {
    let Some(logger) = state.log_data.logger(req.logger_id) else {
        return not_found_error(format!("logger {} not found", req.logger_id));
    };
    let range = match parse_date_range(&req.start, &req.end) {
        Ok(range) => range,
        Err(response) => return response,
    };
    let request = ReportRequest {
        logger,
        selection: req.selection(),
        range,
        format: req.format,
        user: req.user,
    };
    match state.reports.generate(request).await {
        Ok(outcome) => match outcome.file {
            Some(file) => file_response(file),
            None => (
                StatusCode::OK,
                Json(ApiResponse::success(ReportStatusDto {
                    file_name: outcome.file_name,
                    format: outcome.format,
                    rows: outcome.rows,
                    pending_download: true,
                })),
            )
                .into_response(),
        },
        Err(err) => report_error(err),
    }
}

pub async fn download_report(State(state): State<AppState>) -> Response {
    match state.reports.download() {
        Ok(file) => file_response(file),
        Err(err) => report_error(err),
    }
}

fn file_response(file: ReportFile) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", file.file_name.replace('"', ""));
    let mut response = (StatusCode::OK, file.bytes).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(file.content_type),
    );
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use crate::build_app;
    use crate::test_support::{body_json, harness};
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use domain::{LogKind, LogReading, Logger};
    use hydro_store::ToastKind;
    use serde_json::json;
    use tower::ServiceExt;

    fn logger() -> Logger {
        serde_json::from_value(json!({
            "LoggerId": 7,
            "Name": "Pressure_Brgy Lawa",
            "Enabled": true,
            "Capabilities": "pressure,voltage"
        }))
        .unwrap()
    }

    fn reading(time: &str, pressure: f64) -> LogReading {
        serde_json::from_value(json!({
            "LoggerId": 7,
            "LogTime": time,
            "CurrentPressure": pressure
        }))
        .unwrap()
    }

    fn generate(format: &str) -> Request<Body> {
        let body = json!({
            "loggerId": 7,
            "metric": "pressure",
            "start": "2024-05-01",
            "end": "2024-05-01",
            "format": format,
            "user": {"userId": "u-1", "username": "operator"}
        });
        Request::post("/api/reports")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn setup() -> axum::Router {
        let h = harness();
        h.backend.set_loggers(vec![logger()]);
        h.backend.set_series(
            LogKind::Pressure,
            7,
            vec![
                reading("2024-05-01 08:00:00", 41.5),
                reading("2024-05-01 09:00:00", 42.0),
            ],
        );
        h.state.log_data.fetch_data().await.unwrap();
        build_app(h.state)
    }

    #[tokio::test]
    async fn csv_is_returned_as_attachment() {
        let app = setup().await;
        let response = app.oneshot(generate("csv")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Pressure_Brgy_Lawa_pressure_2024-05-01_2024-05-01.csv\""
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.starts_with("Logger ID: 7,Name: Pressure_Brgy Lawa"));
        assert!(text.contains("2024-05-01 09:00:00,42"));
    }

    #[tokio::test]
    async fn xlsx_is_pending_until_download() {
        let app = setup().await;
        let response = app
            .clone()
            .oneshot(Request::get("/api/reports/download").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(app.clone().oneshot(generate("xlsx")).await.unwrap()).await;
        assert_eq!(body["data"]["pendingDownload"], true);
        assert_eq!(body["data"]["rows"], 2);

        let response = app
            .oneshot(Request::get("/api/reports/download").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[tokio::test]
    async fn unknown_logger_is_not_found() {
        let app = build_app(harness().state);
        let response = app.oneshot(generate("json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn backend_failure_shows_error_toast() {
        let h = harness();
        h.backend.set_loggers(vec![logger()]);
        h.state.log_data.fetch_data().await.unwrap();
        h.backend.set_failing(true);
        let response = build_app(h.state)
            .oneshot(generate("csv"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let toasts = h.toasts.toasts();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].kind, ToastKind::Error);
        assert_eq!(toasts[0].title, "Report generation failed");
    }
}
