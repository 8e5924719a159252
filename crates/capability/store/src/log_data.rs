//! 记录仪数据状态
//!
//! `fetch_data` 并发拉取记录仪列表与最新读数，两者都成功后一次性替换快照；
//! 任一请求失败时记录日志并保留原快照，不重试。

use chrono::{DateTime, Utc};
use domain::{LogReading, Logger, LoggerId};
use hydro_backend::Backend;
use hydro_status::{Classification, classify};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

use crate::error::StoreError;

/// 某一时刻的一致快照。
#[derive(Debug, Clone, Default)]
pub struct LogDataSnapshot {
    pub loggers: Vec<Logger>,
    pub latest: Vec<LogReading>,
    pub refreshed_at: Option<DateTime<Utc>>,
}

/// 记录仪定义与最新读数按 `LoggerId` 合并后的视图。
#[derive(Debug, Clone)]
pub struct MergedLogger {
    pub logger: Logger,
    pub reading: Option<LogReading>,
    pub classification: Classification,
}

/// 合并视图的筛选方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoggerView {
    /// 可见性含 `table`，无读数的记录仪也保留。
    Table,
    /// 可见性含 `map` 且有读数。
    Map,
    #[default]
    All,
}

impl LoggerView {
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "table" => Some(LoggerView::Table),
            "map" => Some(LoggerView::Map),
            "all" => Some(LoggerView::All),
            _ => None,
        }
    }
}

pub struct LogDataStore {
    backend: Arc<dyn Backend>,
    snapshot: RwLock<LogDataSnapshot>,
}

impl LogDataStore {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            snapshot: RwLock::new(LogDataSnapshot::default()),
        }
    }

    /// 拉取并原子替换快照。
    pub async fn fetch_data(&self) -> Result<(), StoreError> {
        let fetched = tokio::try_join!(self.backend.list_loggers(), self.backend.latest_logs());
        let (loggers, latest) = match fetched {
            Ok(result) => result,
            Err(err) => {
                hydro_telemetry::record_data_refresh(false);
                warn!(target: "hydro.store", error = %err, "logger data refresh failed");
                return Err(err.into());
            }
        };
        let mut snapshot = self.snapshot.write().map_err(|_| StoreError::Lock)?;
        info!(
            target: "hydro.store",
            loggers = loggers.len(),
            readings = latest.len(),
            "logger data refreshed"
        );
        *snapshot = LogDataSnapshot {
            loggers,
            latest,
            refreshed_at: Some(Utc::now()),
        };
        hydro_telemetry::record_data_refresh(true);
        Ok(())
    }

    pub fn snapshot(&self) -> LogDataSnapshot {
        self.snapshot
            .read()
            .map(|snapshot| snapshot.clone())
            .unwrap_or_default()
    }

    pub fn logger(&self, logger_id: LoggerId) -> Option<Logger> {
        self.snapshot.read().ok().and_then(|snapshot| {
            snapshot
                .loggers
                .iter()
                .find(|logger| logger.logger_id == logger_id)
                .cloned()
        })
    }

    /// 按记录仪合并最新读数并分级。
    pub fn merged(&self, now: DateTime<Utc>) -> Vec<MergedLogger> {
        let snapshot = self.snapshot();
        let readings: HashMap<LoggerId, LogReading> = snapshot
            .latest
            .into_iter()
            .map(|reading| (reading.logger_id, reading))
            .collect();
        snapshot
            .loggers
            .into_iter()
            .map(|logger| {
                let reading = readings.get(&logger.logger_id).cloned();
                let classification = classify(&logger, reading.as_ref(), now);
                MergedLogger {
                    logger,
                    reading,
                    classification,
                }
            })
            .collect()
    }

    pub fn view(&self, view: LoggerView, now: DateTime<Utc>) -> Vec<MergedLogger> {
        let merged = self.merged(now);
        match view {
            LoggerView::All => merged,
            LoggerView::Table => merged
                .into_iter()
                .filter(|item| item.logger.visible_on_table())
                .collect(),
            LoggerView::Map => merged
                .into_iter()
                .filter(|item| item.logger.visible_on_map() && item.reading.is_some())
                .collect(),
        }
    }

    pub fn table_view(&self, now: DateTime<Utc>) -> Vec<MergedLogger> {
        self.view(LoggerView::Table, now)
    }

    pub fn map_view(&self, now: DateTime<Utc>) -> Vec<MergedLogger> {
        self.view(LoggerView::Map, now)
    }
}
