//! 记录仪与读数模型
//!
//! - Logger：记录仪定义（名称、启用状态、能力集、告警阈值、可见性、坐标）
//! - LogReading：某一时刻的采样读数（电压、压力、流量、正/反向累计流量）
//!
//! 字段名与后端 JSON 保持一致（PascalCase）。

use crate::report::LogKind;
use crate::validation::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 记录仪标识。
pub type LoggerId = i64;

/// 可采集的指标。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Voltage,
    Pressure,
    Flow,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Voltage => "voltage",
            Metric::Pressure => "pressure",
            Metric::Flow => "flow",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "voltage" => Some(Metric::Voltage),
            "pressure" => Some(Metric::Pressure),
            "flow" => Some(Metric::Flow),
            _ => None,
        }
    }
}

/// 记录仪能力集（{voltage, pressure, flow} 的子集）。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    pub voltage: bool,
    pub pressure: bool,
    pub flow: bool,
}

impl CapabilitySet {
    /// 解析逗号分隔的能力列表，未知项忽略。
    pub fn parse(list: &str) -> Self {
        let mut set = Self::default();
        for metric in list.split(',').filter_map(Metric::parse) {
            match metric {
                Metric::Voltage => set.voltage = true,
                Metric::Pressure => set.pressure = true,
                Metric::Flow => set.flow = true,
            }
        }
        set
    }

    pub fn contains(&self, metric: Metric) -> bool {
        match metric {
            Metric::Voltage => self.voltage,
            Metric::Pressure => self.pressure,
            Metric::Flow => self.flow,
        }
    }
}

/// 告警阈值（`"min,max"`，要求 min < max）。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limits {
    pub min: f64,
    pub max: f64,
}

impl Limits {
    pub fn new(min: f64, max: f64) -> Result<Self, DomainError> {
        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(DomainError::InvalidLimits(format!("{min},{max}")));
        }
        Ok(Self { min, max })
    }

    /// 解析 `"min,max"`。
    pub fn parse(text: &str) -> Result<Self, DomainError> {
        let invalid = || DomainError::InvalidLimits(text.to_string());
        let (min, max) = text.split_once(',').ok_or_else(invalid)?;
        let min = min.trim().parse::<f64>().map_err(|_| invalid())?;
        let max = max.trim().parse::<f64>().map_err(|_| invalid())?;
        Self::new(min, max).map_err(|_| invalid())
    }
}

impl fmt::Display for Limits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.min, self.max)
    }
}

/// 地理坐标。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// 记录仪定义。对核心层只读，由管理员通过配置表单维护。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Logger {
    #[serde(deserialize_with = "crate::de::i64_lenient")]
    pub logger_id: LoggerId,
    /// `{类型}_{位置}`，例如 `Pressure_Brgy Lawa Reservoir`。
    pub name: String,
    #[serde(default, deserialize_with = "crate::de::bool_lenient")]
    pub enabled: bool,
    #[serde(default)]
    pub capabilities: Option<String>,
    #[serde(default)]
    pub voltage_limit: Option<String>,
    #[serde(default)]
    pub pressure_limit: Option<String>,
    #[serde(default)]
    pub flow_limit: Option<String>,
    /// 逗号分隔的可见性列表（`map`、`table`）。
    #[serde(default)]
    pub visibility: Option<String>,
    /// `"lat,lon"`。
    #[serde(default)]
    pub coordinates: Option<String>,
    #[serde(default)]
    pub sim_number: Option<String>,
}

impl Logger {
    pub fn capability_set(&self) -> CapabilitySet {
        CapabilitySet::parse(self.capabilities.as_deref().unwrap_or_default())
    }

    /// 可见性列表中是否包含 `target`。
    pub fn has_visibility(&self, target: &str) -> bool {
        self.visibility
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .any(|item| item.trim().eq_ignore_ascii_case(target))
    }

    pub fn visible_on_table(&self) -> bool {
        self.has_visibility("table")
    }

    pub fn visible_on_map(&self) -> bool {
        self.has_visibility("map")
    }

    /// 名称中编码的类型段（第一个 `_` 之前）。
    pub fn logger_type(&self) -> Option<&str> {
        self.name
            .split_once('_')
            .map(|(kind, _)| kind.trim())
            .filter(|kind| !kind.is_empty())
    }

    /// 名称中编码的位置段；无分隔符时为整个名称。
    pub fn location(&self) -> &str {
        match self.name.split_once('_') {
            Some((_, location)) => location.trim(),
            None => self.name.trim(),
        }
    }

    /// 记录仪主数据源：具备流量能力或类型为 flow 时取流量日志，否则取压力日志。
    pub fn primary_log_kind(&self) -> LogKind {
        let typed_flow = self
            .logger_type()
            .is_some_and(|kind| kind.eq_ignore_ascii_case("flow"));
        if typed_flow || self.capability_set().flow {
            LogKind::Flow
        } else {
            LogKind::Pressure
        }
    }

    /// 指标对应的日志种类：压力与流量各自独立，电压跟随主数据源。
    pub fn log_kind_for(&self, metric: Metric) -> LogKind {
        match metric {
            Metric::Pressure => LogKind::Pressure,
            Metric::Flow => LogKind::Flow,
            Metric::Voltage => self.primary_log_kind(),
        }
    }

    /// 指定指标的告警阈值；缺失或格式错误时为 None。
    pub fn limits_for(&self, metric: Metric) -> Option<Limits> {
        let raw = match metric {
            Metric::Voltage => self.voltage_limit.as_deref(),
            Metric::Pressure => self.pressure_limit.as_deref(),
            Metric::Flow => self.flow_limit.as_deref(),
        }?;
        Limits::parse(raw).ok()
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        crate::validation::validate_coordinates(self.coordinates.as_deref()?).ok()
    }
}

/// 采样读数；接收后不可变。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LogReading {
    #[serde(
        default,
        deserialize_with = "crate::de::option_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub log_id: Option<i64>,
    #[serde(default, deserialize_with = "crate::de::i64_lenient")]
    pub logger_id: LoggerId,
    #[serde(with = "crate::time::log_time")]
    pub log_time: DateTime<Utc>,
    #[serde(default, deserialize_with = "crate::de::option_f64")]
    pub average_voltage: Option<f64>,
    #[serde(default, deserialize_with = "crate::de::option_f64")]
    pub current_pressure: Option<f64>,
    #[serde(default, deserialize_with = "crate::de::option_f64")]
    pub current_flow: Option<f64>,
    #[serde(default, deserialize_with = "crate::de::option_f64")]
    pub total_flow_positive: Option<f64>,
    #[serde(default, deserialize_with = "crate::de::option_f64")]
    pub total_flow_negative: Option<f64>,
}

impl LogReading {
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Voltage => self.average_voltage,
            Metric::Pressure => self.current_pressure,
            Metric::Flow => self.current_flow,
        }
    }
}
