//! 地图状态分级：纯函数，只依赖输入。
//!
//! - `check_voltage`：电压在阈值区间内的百分比分档（下沿包含）
//! - `check_pressure`：压力相对阈值的告警色
//! - `logger_status`：由启用状态与最近读数时间推导的运行状态，每次重新计算，不落存储

use chrono::{DateTime, Duration, Utc};
use domain::{Limits, LogReading, Logger, Metric};

/// 电压分档。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoltageLevel {
    Critical,
    Low,
    Medium,
    High,
    Full,
}

impl VoltageLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoltageLevel::Critical => "critical",
            VoltageLevel::Low => "low",
            VoltageLevel::Medium => "medium",
            VoltageLevel::High => "high",
            VoltageLevel::Full => "full",
        }
    }
}

/// 压力告警色。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressureLevel {
    Invalid,
    Red,
    Yellow,
    Normal,
}

impl PressureLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PressureLevel::Invalid => "invalid",
            PressureLevel::Red => "red",
            PressureLevel::Yellow => "yellow",
            PressureLevel::Normal => "normal",
        }
    }
}

/// 记录仪运行状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggerStatus {
    Active,
    Delayed,
    Inactive,
    Disabled,
}

impl LoggerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoggerStatus::Active => "Active",
            LoggerStatus::Delayed => "Delayed",
            LoggerStatus::Inactive => "Inactive",
            LoggerStatus::Disabled => "Disabled",
        }
    }
}

/// 低于该值的压力读数视为传感器异常。
pub const PRESSURE_INVALID_BELOW: f64 = -10.0;
/// 高于上限该值以上为红色。
pub const PRESSURE_RED_ABOVE_MAX: f64 = 20.0;
/// 低于下限该值以上为红色。
pub const PRESSURE_RED_BELOW_MIN: f64 = 5.0;
pub const ACTIVE_WITHIN_MINUTES: i64 = 30;
pub const DELAYED_WITHIN_MINUTES: i64 = 180;

/// 电压分档：`(v - min) * 100 / (max - min)` 后按 16/33/58/83 切分。
pub fn check_voltage(voltage: f64, limits: &Limits) -> VoltageLevel {
    let percent = (voltage - limits.min) * 100.0 / (limits.max - limits.min);
    if percent.is_nan() || percent < 16.0 {
        VoltageLevel::Critical
    } else if percent < 33.0 {
        VoltageLevel::Low
    } else if percent < 58.0 {
        VoltageLevel::Medium
    } else if percent < 83.0 {
        VoltageLevel::High
    } else {
        VoltageLevel::Full
    }
}

/// 压力告警色；`invalid` 判定先于阈值比较。
pub fn check_pressure(pressure: f64, limits: &Limits) -> PressureLevel {
    let Limits { min, max } = *limits;
    if pressure.is_nan() || pressure < PRESSURE_INVALID_BELOW {
        PressureLevel::Invalid
    } else if pressure >= max + PRESSURE_RED_ABOVE_MAX || pressure < min - PRESSURE_RED_BELOW_MIN
    {
        PressureLevel::Red
    } else if pressure >= max || pressure < min {
        PressureLevel::Yellow
    } else {
        PressureLevel::Normal
    }
}

/// 阈值为 `"min,max"` 字符串的版本；阈值无法解析时为 None。
pub fn check_voltage_str(voltage: f64, limits: &str) -> Option<VoltageLevel> {
    Limits::parse(limits)
        .ok()
        .map(|limits| check_voltage(voltage, &limits))
}

pub fn check_pressure_str(pressure: f64, limits: &str) -> Option<PressureLevel> {
    Limits::parse(limits)
        .ok()
        .map(|limits| check_pressure(pressure, &limits))
}

/// 运行状态。没有任何读数的启用记录仪为 Inactive；时间在未来时按 Active 处理。
pub fn logger_status(
    enabled: bool,
    last_reading: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> LoggerStatus {
    if !enabled {
        return LoggerStatus::Disabled;
    }
    let Some(last_reading) = last_reading else {
        return LoggerStatus::Inactive;
    };
    let age = now - last_reading;
    if age < Duration::minutes(ACTIVE_WITHIN_MINUTES) {
        LoggerStatus::Active
    } else if age < Duration::minutes(DELAYED_WITHIN_MINUTES) {
        LoggerStatus::Delayed
    } else {
        LoggerStatus::Inactive
    }
}

/// 单个记录仪的完整分级结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub status: LoggerStatus,
    pub voltage: Option<VoltageLevel>,
    pub pressure: Option<PressureLevel>,
}

/// 结合记录仪阈值与最新读数分级；缺少读数或阈值的指标不分级。
pub fn classify(logger: &Logger, reading: Option<&LogReading>, now: DateTime<Utc>) -> Classification {
    let status = logger_status(logger.enabled, reading.map(|r| r.log_time), now);
    let voltage = reading
        .and_then(|r| r.value(Metric::Voltage))
        .zip(logger.limits_for(Metric::Voltage))
        .map(|(value, limits)| check_voltage(value, &limits));
    let pressure = reading
        .and_then(|r| r.value(Metric::Pressure))
        .zip(logger.limits_for(Metric::Pressure))
        .map(|(value, limits)| check_pressure(value, &limits));
    Classification {
        status,
        voltage,
        pressure,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits(min: f64, max: f64) -> Limits {
        Limits::new(min, max).unwrap()
    }

    #[test]
    fn voltage_out_of_range_clamps_to_ends() {
        let range = limits(2.0, 4.5);
        assert_eq!(check_voltage(1.0, &range), VoltageLevel::Critical);
        assert_eq!(check_voltage(9.0, &range), VoltageLevel::Full);
        assert_eq!(check_voltage(f64::NAN, &range), VoltageLevel::Critical);
    }

    #[test]
    fn string_limits_must_parse() {
        assert_eq!(check_voltage_str(3.5, "2.0,4.5"), Some(VoltageLevel::High));
        assert_eq!(check_voltage_str(3.5, "4.5,2.0"), None);
        assert_eq!(check_pressure_str(30.0, ""), None);
    }
}
