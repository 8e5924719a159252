//! HTTP 响应辅助函数和 DTO 转换
//!
//! 提供统一的错误响应构造函数和 DTO 转换函数：
//! - 错误响应：bad_request_error, not_found_error, upstream_error, internal_error
//! - 错误映射：store_error, report_error
//! - DTO 转换：merged_to_dto, map_focus_to_dto
//!
//! 错误码与状态码对应：
//! - INVALID.REQUEST -> 400
//! - RESOURCE.NOT_FOUND -> 404
//! - UPSTREAM.ERROR -> 502（后端不可达或返回非 2xx）
//! - INTERNAL.ERROR -> 500

use api_contract::{ApiResponse, LoggerViewDto, MapFocusDto};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use domain::time::format_log_time;
use hydro_backend::BackendError;
use hydro_report::ReportError;
use hydro_store::{MapFocus, MergedLogger, StoreError};

/// 错误请求响应
pub fn bad_request_error(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<()>::error("INVALID.REQUEST", message.into())),
    )
        .into_response()
}

/// 资源未找到错误响应
pub fn not_found_error(message: impl Into<String>) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::error("RESOURCE.NOT_FOUND", message.into())),
    )
        .into_response()
}

/// 后端调用失败响应
pub fn upstream_error(err: BackendError) -> Response {
    (
        StatusCode::BAD_GATEWAY,
        Json(ApiResponse::<()>::error("UPSTREAM.ERROR", err.to_string())),
    )
        .into_response()
}

/// 内部错误响应
pub fn internal_error(message: impl Into<String>) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::error("INTERNAL.ERROR", message.into())),
    )
        .into_response()
}

/// 状态层错误响应
pub fn store_error(err: StoreError) -> Response {
    match err {
        StoreError::Backend(err) => upstream_error(err),
        StoreError::Validation(err) => bad_request_error(err.to_string()),
        StoreError::NotFound(what) => not_found_error(format!("{what} not found")),
        StoreError::Lock => internal_error("lock failed"),
    }
}

/// 报表错误响应
pub fn report_error(err: ReportError) -> Response {
    match err {
        ReportError::Backend(err) => upstream_error(err),
        ReportError::NothingPending => not_found_error(err.to_string()),
        other => internal_error(other.to_string()),
    }
}

pub fn merged_to_dto(merged: MergedLogger) -> LoggerViewDto {
    let coordinates = merged.logger.coordinates();
    let reading = merged.reading.as_ref();
    LoggerViewDto {
        logger_id: merged.logger.logger_id,
        name: merged.logger.name.clone(),
        logger_type: merged.logger.logger_type().map(str::to_string),
        location: merged.logger.location().to_string(),
        enabled: merged.logger.enabled,
        status: merged.classification.status.as_str().to_string(),
        last_log_time: reading.map(|r| format_log_time(&r.log_time)),
        voltage: reading.and_then(|r| r.average_voltage),
        pressure: reading.and_then(|r| r.current_pressure),
        flow: reading.and_then(|r| r.current_flow),
        total_flow_positive: reading.and_then(|r| r.total_flow_positive),
        total_flow_negative: reading.and_then(|r| r.total_flow_negative),
        voltage_level: merged
            .classification
            .voltage
            .map(|level| level.as_str().to_string()),
        pressure_level: merged
            .classification
            .pressure
            .map(|level| level.as_str().to_string()),
        lat: coordinates.map(|c| c.lat),
        lon: coordinates.map(|c| c.lon),
    }
}

pub fn map_focus_to_dto(focus: MapFocus) -> MapFocusDto {
    MapFocusDto {
        lat: focus.lat,
        lon: focus.lon,
        zoom: focus.zoom,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::DomainError;

    #[test]
    fn store_errors_map_to_status_codes() {
        let cases = [
            (
                store_error(StoreError::Backend(BackendError::Transport("refused".into()))),
                StatusCode::BAD_GATEWAY,
            ),
            (
                store_error(StoreError::Validation(DomainError::InvalidSimNumber("123".into()))),
                StatusCode::BAD_REQUEST,
            ),
            (
                store_error(StoreError::NotFound("logger 9".into())),
                StatusCode::NOT_FOUND,
            ),
            (store_error(StoreError::Lock), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (response, status) in cases {
            assert_eq!(response.status(), status);
        }
    }

    #[test]
    fn nothing_pending_is_not_found() {
        let response = report_error(ReportError::NothingPending);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
