//! 记录仪配置编辑
//!
//! 提交前在本地校验（坐标、SIM 卡号、阈值），校验失败时不发请求；
//! 提交成功后触发一次记录仪数据刷新。

use api_contract::{AuditedPatch, ConfigLogEntry, LoggerConfigFields, LoggerLimitsFields};
use domain::{Limits, Logger, LoggerId, UserContext, validate_coordinates, validate_sim_number};
use hydro_backend::Backend;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::StoreError;
use crate::log_data::LogDataStore;

pub struct ConfigEditor {
    backend: Arc<dyn Backend>,
    log_data: Arc<LogDataStore>,
}

impl ConfigEditor {
    pub fn new(backend: Arc<dyn Backend>, log_data: Arc<LogDataStore>) -> Self {
        Self { backend, log_data }
    }

    /// 修改基础配置（名称、启用、能力、可见性、坐标、SIM 卡号）。
    pub async fn update_config(
        &self,
        logger_id: LoggerId,
        changes: LoggerConfigFields,
        user: UserContext,
    ) -> Result<(), StoreError> {
        let current = normalize_config(changes)?;
        let logger = self.load(logger_id).await?;
        let patch = AuditedPatch {
            previous: config_fields(&logger),
            current,
            user,
        };
        self.backend.update_logger_config(logger_id, &patch).await?;
        info!(
            target: "hydro.config",
            logger_id,
            user = %patch.user.username,
            "logger config updated"
        );
        self.refresh().await;
        Ok(())
    }

    /// 修改告警阈值。
    pub async fn update_limits(
        &self,
        logger_id: LoggerId,
        changes: LoggerLimitsFields,
        user: UserContext,
    ) -> Result<(), StoreError> {
        let current = LoggerLimitsFields {
            voltage_limit: normalize_limit(changes.voltage_limit)?,
            pressure_limit: normalize_limit(changes.pressure_limit)?,
            flow_limit: normalize_limit(changes.flow_limit)?,
        };
        let logger = self.load(logger_id).await?;
        let patch = AuditedPatch {
            previous: limits_fields(&logger),
            current,
            user,
        };
        self.backend.update_logger_limits(logger_id, &patch).await?;
        info!(
            target: "hydro.config",
            logger_id,
            user = %patch.user.username,
            "logger limits updated"
        );
        self.refresh().await;
        Ok(())
    }

    /// 配置变更历史。
    pub async fn config_history(
        &self,
        logger_id: LoggerId,
    ) -> Result<Vec<ConfigLogEntry>, StoreError> {
        Ok(self.backend.config_log(logger_id).await?)
    }

    async fn load(&self, logger_id: LoggerId) -> Result<Logger, StoreError> {
        self.backend
            .get_logger(logger_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("logger {logger_id}")))
    }

    async fn refresh(&self) {
        if let Err(err) = self.log_data.fetch_data().await {
            warn!(target: "hydro.config", error = %err, "refresh after config change failed");
        }
    }
}

fn config_fields(logger: &Logger) -> LoggerConfigFields {
    LoggerConfigFields {
        name: logger.name.clone(),
        enabled: logger.enabled,
        capabilities: logger.capabilities.clone(),
        visibility: logger.visibility.clone(),
        coordinates: logger.coordinates.clone(),
        sim_number: logger.sim_number.clone(),
    }
}

fn limits_fields(logger: &Logger) -> LoggerLimitsFields {
    LoggerLimitsFields {
        voltage_limit: logger.voltage_limit.clone(),
        pressure_limit: logger.pressure_limit.clone(),
        flow_limit: logger.flow_limit.clone(),
    }
}

/// 空字符串视为未设置。
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

fn normalize_config(changes: LoggerConfigFields) -> Result<LoggerConfigFields, StoreError> {
    let coordinates = match non_empty(changes.coordinates) {
        Some(text) => {
            let coords = validate_coordinates(&text)?;
            Some(format!("{},{}", coords.lat, coords.lon))
        }
        None => None,
    };
    let sim_number = match non_empty(changes.sim_number) {
        Some(text) => Some(validate_sim_number(&text)?),
        None => None,
    };
    Ok(LoggerConfigFields {
        name: changes.name.trim().to_string(),
        enabled: changes.enabled,
        capabilities: non_empty(changes.capabilities),
        visibility: non_empty(changes.visibility),
        coordinates,
        sim_number,
    })
}

fn normalize_limit(value: Option<String>) -> Result<Option<String>, StoreError> {
    match non_empty(value) {
        Some(text) => Ok(Some(Limits::parse(&text)?.to_string())),
        None => Ok(None),
    }
}
