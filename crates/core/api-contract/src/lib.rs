//! 稳定的 DTO 与 API 契约。
//!
//! - 看板 API 响应封装：ApiResponse
//! - 实时推送信封：RealtimeEnvelope / RealtimeMessage
//! - 后端请求体：通知查询、批量已读、带审计的配置变更、认证代理
//! - 看板 DTO：记录仪视图、未读数、地图定位、报表状态、指标快照

use domain::{Averaging, Metric, ReportFormat, ReportSelection, UserContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 标准 API 响应封装。
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

/// 失败响应的错误体。
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code: code.into(),
                message: message.into(),
            }),
        }
    }
}

// ============================================
// 实时推送
// ============================================

/// 服务端推送的 JSON 文本帧：`{type, event, ...}`。
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeEnvelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default, deserialize_with = "domain::de::option_i64")]
    pub notification_id: Option<i64>,
}

/// 可识别的推送消息。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RealtimeMessage {
    /// `{type: "watchdog", event: "update", filename?}`
    WatchdogUpdate { filename: Option<String> },
    /// `{type: "notification", event: "new", notificationId}`
    NewNotification { notification_id: i64 },
    /// 未识别的 type/event，忽略。
    Ignored,
}

impl RealtimeEnvelope {
    pub fn into_message(self) -> RealtimeMessage {
        match (self.kind.as_str(), self.event.as_deref()) {
            ("watchdog", Some("update")) => RealtimeMessage::WatchdogUpdate {
                filename: self.filename,
            },
            ("notification", Some("new")) => match self.notification_id {
                Some(notification_id) => RealtimeMessage::NewNotification { notification_id },
                None => RealtimeMessage::Ignored,
            },
            _ => RealtimeMessage::Ignored,
        }
    }
}

// ============================================
// 后端请求体
// ============================================

/// `GET /api/notifications` 查询参数。
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_read: Option<bool>,
}

/// `PATCH /api/notifications/mark-read` 请求体；也用作看板批量已读入参。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadRequest {
    pub notification_ids: Vec<i64>,
}

/// 记录仪基础配置字段（与后端字段名一致）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoggerConfigFields {
    pub name: String,
    pub enabled: bool,
    #[serde(default)]
    pub capabilities: Option<String>,
    #[serde(default)]
    pub visibility: Option<String>,
    #[serde(default)]
    pub coordinates: Option<String>,
    #[serde(default)]
    pub sim_number: Option<String>,
}

/// 记录仪告警阈值字段（`"min,max"`）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoggerLimitsFields {
    #[serde(default)]
    pub voltage_limit: Option<String>,
    #[serde(default)]
    pub pressure_limit: Option<String>,
    #[serde(default)]
    pub flow_limit: Option<String>,
}

/// 带审计信息的配置变更：旧值、新值与操作用户。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditedPatch<T> {
    pub previous: T,
    pub current: T,
    pub user: UserContext,
}

/// 看板侧配置变更入参：操作用户 + 新值。
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigChangeRequest<T> {
    pub user: UserContext,
    pub changes: T,
}

/// 登录请求体（后端 `/auth/login/` 与 `/auth/login-crms`）。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// 用户检查请求体。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckUserRequest {
    pub username: String,
}

/// 创建用户请求体。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// token 校验请求体。
#[derive(Debug, Clone, Serialize)]
pub struct ValidateTokenRequest {
    pub token: String,
}

/// 配置变更历史条目（`GET /auth/config-log`），字段原样透传。
pub type ConfigLogEntry = Value;

// ============================================
// 看板 DTO
// ============================================

/// 记录仪合并视图（定义 + 最新读数 + 分级）。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggerViewDto {
    pub logger_id: i64,
    pub name: String,
    pub logger_type: Option<String>,
    pub location: String,
    pub enabled: bool,
    pub status: String,
    pub last_log_time: Option<String>,
    pub voltage: Option<f64>,
    pub pressure: Option<f64>,
    pub flow: Option<f64>,
    pub total_flow_positive: Option<f64>,
    pub total_flow_negative: Option<f64>,
    pub voltage_level: Option<String>,
    pub pressure_level: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

/// 未读通知数。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountDto {
    pub unread: usize,
}

/// 点击通知后的地图定位请求。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapFocusDto {
    pub lat: f64,
    pub lon: f64,
    pub zoom: u8,
}

/// 看板报表生成入参。
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequestDto {
    pub logger_id: i64,
    pub metric: Metric,
    #[serde(default)]
    pub totalizer_positive: bool,
    #[serde(default)]
    pub totalizer_negative: bool,
    #[serde(default)]
    pub averaging: Averaging,
    /// `YYYY-MM-DD`
    pub start: String,
    /// `YYYY-MM-DD`
    pub end: String,
    pub format: ReportFormat,
    pub user: UserContext,
}

impl ReportRequestDto {
    pub fn selection(&self) -> ReportSelection {
        ReportSelection {
            metric: self.metric,
            totalizer_positive: self.totalizer_positive,
            totalizer_negative: self.totalizer_negative,
            averaging: self.averaging,
        }
    }
}

/// 报表生成结果（XLSX 等待显式下载）。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportStatusDto {
    pub file_name: String,
    pub format: ReportFormat,
    pub rows: usize,
    pub pending_download: bool,
}

/// 计数器快照。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshotDto {
    pub realtime_frames: u64,
    pub realtime_frames_discarded: u64,
    pub realtime_reconnects: u64,
    pub watchdog_signals: u64,
    pub notification_signals: u64,
    pub data_refresh_success: u64,
    pub data_refresh_failure: u64,
    pub notification_fetch_failure: u64,
    pub toasts_emitted: u64,
    pub reports_generated: u64,
    pub reports_failed: u64,
}
