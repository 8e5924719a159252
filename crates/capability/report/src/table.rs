//! 报表行模型：时间戳 + 所选指标列。

use chrono::{DateTime, Utc};
use domain::{DateRange, LogKind, LogReading, Metric, ReportSelection};

/// 时间戳之后的数据列。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Metric(Metric),
    TotalizerPositive,
    TotalizerNegative,
}

impl Column {
    /// JSON 键与 XLSX 表头。
    pub fn key(&self) -> &'static str {
        match self {
            Column::Metric(Metric::Voltage) => "voltage",
            Column::Metric(Metric::Pressure) => "pressure",
            Column::Metric(Metric::Flow) => "flow",
            Column::TotalizerPositive => "totalFlowPositive",
            Column::TotalizerNegative => "totalFlowNegative",
        }
    }

    fn read(&self, reading: &LogReading) -> Option<f64> {
        match self {
            Column::Metric(metric) => reading.value(*metric),
            Column::TotalizerPositive => reading.total_flow_positive,
            Column::TotalizerNegative => reading.total_flow_negative,
        }
    }
}

/// 时间戳列的键。
pub const TIMESTAMP_KEY: &str = "timestamp";

#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub timestamp: DateTime<Utc>,
    /// 与 `ReportTable::columns` 一一对应。
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    pub columns: Vec<Column>,
    pub rows: Vec<ReportRow>,
}

/// 所选指标对应的列。累计流量只存在于流量日志中。
pub fn columns_for(selection: &ReportSelection, source: LogKind) -> Vec<Column> {
    let mut columns = vec![Column::Metric(selection.metric)];
    if source == LogKind::Flow {
        if selection.totalizer_positive {
            columns.push(Column::TotalizerPositive);
        }
        if selection.totalizer_negative {
            columns.push(Column::TotalizerNegative);
        }
    }
    columns
}

/// 裁剪到日期区间（两端包含）并按时间排序。
pub fn build_table(
    readings: &[LogReading],
    selection: &ReportSelection,
    source: LogKind,
    range: &DateRange,
) -> ReportTable {
    let columns = columns_for(selection, source);
    let mut rows: Vec<ReportRow> = readings
        .iter()
        .filter(|reading| range.contains(&reading.log_time))
        .map(|reading| ReportRow {
            timestamp: reading.log_time,
            values: columns.iter().map(|column| column.read(reading)).collect(),
        })
        .collect();
    rows.sort_by_key(|row| row.timestamp);
    ReportTable { columns, rows }
}
