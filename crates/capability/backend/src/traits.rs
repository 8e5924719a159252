//! 后端接口 Trait 定义
//!
//! 覆盖看板核心用到的 REST 资源：
//! - 记录仪：列表、单个、最新读数
//! - 时序：按指标种类的原始时序与可用日期
//! - 配置：基础配置/告警阈值变更（带审计）与变更历史
//! - 通知：列表、单条、单条已读、批量已读
//!
//! 所有 HTTP 调用一次性执行，不重试。

use crate::error::BackendError;
use api_contract::{AuditedPatch, ConfigLogEntry, LoggerConfigFields, LoggerLimitsFields};
use async_trait::async_trait;
use chrono::NaiveDate;
use domain::{DateRange, LogKind, LogReading, Logger, LoggerId, Notification};

#[async_trait]
pub trait Backend: Send + Sync {
    /// `GET /api/logger`
    async fn list_loggers(&self) -> Result<Vec<Logger>, BackendError>;

    /// `GET /api/logger/{id}`（响应为单元素数组）
    async fn get_logger(&self, logger_id: LoggerId) -> Result<Option<Logger>, BackendError>;

    /// `GET /api/latest_log`
    async fn latest_logs(&self) -> Result<Vec<LogReading>, BackendError>;

    /// `GET /api/{flow|pressure}_log/{id}`
    async fn log_series(
        &self,
        kind: LogKind,
        logger_id: LoggerId,
        range: &DateRange,
    ) -> Result<Vec<LogReading>, BackendError>;

    /// `GET /api/{flow|pressure}_log_dates/{id}`
    async fn log_dates(
        &self,
        kind: LogKind,
        logger_id: LoggerId,
    ) -> Result<Vec<NaiveDate>, BackendError>;

    /// `GET /api/totalizer_log_dates/{id}`
    async fn totalizer_log_dates(&self, logger_id: LoggerId)
    -> Result<Vec<NaiveDate>, BackendError>;

    /// `PATCH /api/logger_config/{id}`
    async fn update_logger_config(
        &self,
        logger_id: LoggerId,
        patch: &AuditedPatch<LoggerConfigFields>,
    ) -> Result<(), BackendError>;

    /// `PATCH /api/logger_limits/{id}`
    async fn update_logger_limits(
        &self,
        logger_id: LoggerId,
        patch: &AuditedPatch<LoggerLimitsFields>,
    ) -> Result<(), BackendError>;

    /// `GET /auth/config-log?loggerId=`
    async fn config_log(&self, logger_id: LoggerId) -> Result<Vec<ConfigLogEntry>, BackendError>;

    /// `GET /api/notifications?includeRead=`
    async fn list_notifications(&self, include_read: bool)
    -> Result<Vec<Notification>, BackendError>;

    /// `GET /api/notifications?notificationId=`
    async fn get_notification(&self, id: i64) -> Result<Option<Notification>, BackendError>;

    /// `PATCH /api/notification/{id}/read`
    async fn mark_notification_read(&self, id: i64) -> Result<(), BackendError>;

    /// `PATCH /api/notifications/mark-read`
    async fn mark_notifications_read(&self, ids: &[i64]) -> Result<(), BackendError>;
}
