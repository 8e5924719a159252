//! 内存后端实现
//!
//! 仅用于本地演示和测试：数据预置在内存中，并记录每个接口的调用次数与请求体，
//! 可通过 `set_failing` 模拟后端整体不可用。

use crate::error::BackendError;
use crate::traits::Backend;
use api_contract::{AuditedPatch, ConfigLogEntry, LoggerConfigFields, LoggerLimitsFields};
use async_trait::async_trait;
use chrono::NaiveDate;
use domain::{DateRange, LogKind, LogReading, Logger, LoggerId, Notification};
use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Default)]
struct State {
    loggers: Vec<Logger>,
    latest: Vec<LogReading>,
    series: HashMap<(LogKind, LoggerId), Vec<LogReading>>,
    dates: HashMap<(LogKind, LoggerId), Vec<NaiveDate>>,
    totalizer_dates: HashMap<LoggerId, Vec<NaiveDate>>,
    notifications: Vec<Notification>,
    config_log: HashMap<LoggerId, Vec<ConfigLogEntry>>,
    config_patches: Vec<(LoggerId, AuditedPatch<LoggerConfigFields>)>,
    limits_patches: Vec<(LoggerId, AuditedPatch<LoggerLimitsFields>)>,
    bulk_read_requests: Vec<Vec<i64>>,
    calls: HashMap<&'static str, usize>,
}

/// 内存后端。
#[derive(Default)]
pub struct InMemoryBackend {
    state: RwLock<State>,
    failing: AtomicBool,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// 之后的所有调用返回传输错误（用于失败路径测试）。
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_loggers(&self, loggers: Vec<Logger>) {
        if let Ok(mut state) = self.state.write() {
            state.loggers = loggers;
        }
    }

    pub fn set_latest(&self, latest: Vec<LogReading>) {
        if let Ok(mut state) = self.state.write() {
            state.latest = latest;
        }
    }

    pub fn set_series(&self, kind: LogKind, logger_id: LoggerId, rows: Vec<LogReading>) {
        if let Ok(mut state) = self.state.write() {
            state.series.insert((kind, logger_id), rows);
        }
    }

    pub fn set_dates(&self, kind: LogKind, logger_id: LoggerId, dates: Vec<NaiveDate>) {
        if let Ok(mut state) = self.state.write() {
            state.dates.insert((kind, logger_id), dates);
        }
    }

    pub fn set_totalizer_dates(&self, logger_id: LoggerId, dates: Vec<NaiveDate>) {
        if let Ok(mut state) = self.state.write() {
            state.totalizer_dates.insert(logger_id, dates);
        }
    }

    pub fn set_config_log(&self, logger_id: LoggerId, entries: Vec<ConfigLogEntry>) {
        if let Ok(mut state) = self.state.write() {
            state.config_log.insert(logger_id, entries);
        }
    }

    /// 模拟服务端新建通知。
    pub fn push_notification(&self, notification: Notification) {
        if let Ok(mut state) = self.state.write() {
            state.notifications.push(notification);
        }
    }

    /// 指定接口的调用次数。
    pub fn calls(&self, name: &str) -> usize {
        self.state
            .read()
            .ok()
            .and_then(|state| state.calls.get(name).copied())
            .unwrap_or(0)
    }

    pub fn config_patches(&self) -> Vec<(LoggerId, AuditedPatch<LoggerConfigFields>)> {
        self.state
            .read()
            .map(|state| state.config_patches.clone())
            .unwrap_or_default()
    }

    pub fn limits_patches(&self) -> Vec<(LoggerId, AuditedPatch<LoggerLimitsFields>)> {
        self.state
            .read()
            .map(|state| state.limits_patches.clone())
            .unwrap_or_default()
    }

    pub fn bulk_read_requests(&self) -> Vec<Vec<i64>> {
        self.state
            .read()
            .map(|state| state.bulk_read_requests.clone())
            .unwrap_or_default()
    }

    /// 记录调用并检查失败开关。
    fn enter(&self, name: &'static str) -> Result<(), BackendError> {
        let mut state = self.state.write().map_err(|_| BackendError::Lock)?;
        *state.calls.entry(name).or_insert(0) += 1;
        if self.failing.load(Ordering::SeqCst) {
            return Err(BackendError::Transport(format!("{name}: backend unavailable")));
        }
        Ok(())
    }

    fn read<T>(&self, f: impl FnOnce(&State) -> T) -> Result<T, BackendError> {
        let state = self.state.read().map_err(|_| BackendError::Lock)?;
        Ok(f(&state))
    }

    fn write<T>(&self, f: impl FnOnce(&mut State) -> T) -> Result<T, BackendError> {
        let mut state = self.state.write().map_err(|_| BackendError::Lock)?;
        Ok(f(&mut state))
    }
}

#[async_trait]
impl Backend for InMemoryBackend {
    async fn list_loggers(&self) -> Result<Vec<Logger>, BackendError> {
        self.enter("list_loggers")?;
        self.read(|state| state.loggers.clone())
    }

    async fn get_logger(&self, logger_id: LoggerId) -> Result<Option<Logger>, BackendError> {
        self.enter("get_logger")?;
        self.read(|state| {
            state
                .loggers
                .iter()
                .find(|logger| logger.logger_id == logger_id)
                .cloned()
        })
    }

    async fn latest_logs(&self) -> Result<Vec<LogReading>, BackendError> {
        self.enter("latest_logs")?;
        self.read(|state| state.latest.clone())
    }

    async fn log_series(
        &self,
        kind: LogKind,
        logger_id: LoggerId,
        _range: &DateRange,
    ) -> Result<Vec<LogReading>, BackendError> {
        self.enter("log_series")?;
        // 与真实后端一样原样返回，区间裁剪由调用方负责。
        self.read(|state| {
            state
                .series
                .get(&(kind, logger_id))
                .cloned()
                .unwrap_or_default()
        })
    }

    async fn log_dates(
        &self,
        kind: LogKind,
        logger_id: LoggerId,
    ) -> Result<Vec<NaiveDate>, BackendError> {
        self.enter("log_dates")?;
        self.read(|state| {
            state
                .dates
                .get(&(kind, logger_id))
                .cloned()
                .unwrap_or_default()
        })
    }

    async fn totalizer_log_dates(
        &self,
        logger_id: LoggerId,
    ) -> Result<Vec<NaiveDate>, BackendError> {
        self.enter("totalizer_log_dates")?;
        self.read(|state| {
            state
                .totalizer_dates
                .get(&logger_id)
                .cloned()
                .unwrap_or_default()
        })
    }

    async fn update_logger_config(
        &self,
        logger_id: LoggerId,
        patch: &AuditedPatch<LoggerConfigFields>,
    ) -> Result<(), BackendError> {
        self.enter("update_logger_config")?;
        self.write(|state| {
            if let Some(logger) = state
                .loggers
                .iter_mut()
                .find(|logger| logger.logger_id == logger_id)
            {
                let current = &patch.current;
                logger.name = current.name.clone();
                logger.enabled = current.enabled;
                logger.capabilities = current.capabilities.clone();
                logger.visibility = current.visibility.clone();
                logger.coordinates = current.coordinates.clone();
                logger.sim_number = current.sim_number.clone();
            }
            state.config_patches.push((logger_id, patch.clone()));
        })
    }

    async fn update_logger_limits(
        &self,
        logger_id: LoggerId,
        patch: &AuditedPatch<LoggerLimitsFields>,
    ) -> Result<(), BackendError> {
        self.enter("update_logger_limits")?;
        self.write(|state| {
            if let Some(logger) = state
                .loggers
                .iter_mut()
                .find(|logger| logger.logger_id == logger_id)
            {
                let current = &patch.current;
                logger.voltage_limit = current.voltage_limit.clone();
                logger.pressure_limit = current.pressure_limit.clone();
                logger.flow_limit = current.flow_limit.clone();
            }
            state.limits_patches.push((logger_id, patch.clone()));
        })
    }

    async fn config_log(&self, logger_id: LoggerId) -> Result<Vec<ConfigLogEntry>, BackendError> {
        self.enter("config_log")?;
        self.read(|state| state.config_log.get(&logger_id).cloned().unwrap_or_default())
    }

    async fn list_notifications(
        &self,
        include_read: bool,
    ) -> Result<Vec<Notification>, BackendError> {
        self.enter("list_notifications")?;
        self.read(|state| {
            state
                .notifications
                .iter()
                .filter(|item| include_read || !item.is_read)
                .cloned()
                .collect()
        })
    }

    async fn get_notification(&self, id: i64) -> Result<Option<Notification>, BackendError> {
        self.enter("get_notification")?;
        self.read(|state| {
            state
                .notifications
                .iter()
                .find(|item| item.id == Some(id))
                .cloned()
        })
    }

    async fn mark_notification_read(&self, id: i64) -> Result<(), BackendError> {
        self.enter("mark_notification_read")?;
        self.write(|state| {
            for item in state.notifications.iter_mut().filter(|item| item.id == Some(id)) {
                item.is_read = true;
            }
        })
    }

    async fn mark_notifications_read(&self, ids: &[i64]) -> Result<(), BackendError> {
        self.enter("mark_notifications_read")?;
        self.write(|state| {
            for item in state.notifications.iter_mut() {
                if item.id.is_some_and(|id| ids.contains(&id)) {
                    item.is_read = true;
                }
            }
            state.bulk_read_requests.push(ids.to_vec());
        })
    }
}
