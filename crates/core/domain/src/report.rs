//! 报表请求模型（仅在一次导出操作期间存在）。

use crate::UserContext;
use crate::logger::{Logger, Metric};
use crate::validation::DomainError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// 后端按指标种类拆分的时序资源。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    Flow,
    Pressure,
}

impl LogKind {
    /// `/api/{segment}_log/...` 中的资源段。
    pub fn segment(&self) -> &'static str {
        match self {
            LogKind::Flow => "flow",
            LogKind::Pressure => "pressure",
        }
    }
}

/// 平均方式。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Averaging {
    #[default]
    None,
    Hourly,
    Daily,
}

/// 导出格式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Csv,
    Xlsx,
    Json,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Csv => "csv",
            ReportFormat::Xlsx => "xlsx",
            ReportFormat::Json => "json",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ReportFormat::Csv => "text/csv",
            ReportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ReportFormat::Json => "application/json",
        }
    }
}

/// 指标选择：单一主指标 + 可选正/反向累计流量 + 平均方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSelection {
    pub metric: Metric,
    #[serde(default)]
    pub totalizer_positive: bool,
    #[serde(default)]
    pub totalizer_negative: bool,
    #[serde(default)]
    pub averaging: Averaging,
}

impl ReportSelection {
    pub fn new(metric: Metric) -> Self {
        Self {
            metric,
            totalizer_positive: false,
            totalizer_negative: false,
            averaging: Averaging::None,
        }
    }

    pub fn wants_totalizer(&self) -> bool {
        self.totalizer_positive || self.totalizer_negative
    }
}

/// 日期区间（两端包含）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DomainError> {
        if start > end {
            return Err(DomainError::InvalidDateRange(format!("{start} > {end}")));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, ts: &DateTime<Utc>) -> bool {
        let day = ts.date_naive();
        day >= self.start && day <= self.end
    }
}

/// 一次导出请求。
#[derive(Debug, Clone)]
pub struct ReportRequest {
    pub logger: Logger,
    pub selection: ReportSelection,
    pub range: DateRange,
    pub format: ReportFormat,
    pub user: UserContext,
}

impl ReportRequest {
    /// 数据源：压力 -> 压力日志；流量与累计流量 -> 流量日志；电压跟随记录仪主数据源。
    pub fn source_kind(&self) -> LogKind {
        self.logger.log_kind_for(self.selection.metric)
    }
}
