//! 报表序列化
//!
//! - CSV：首行为记录仪身份与位置信息（不是列名），其后每行一条数据
//! - JSON：行数组，每行是 `{timestamp, <列>...}` 的扁平对象
//! - XLSX：单个工作表，首行列名

use domain::Logger;
use domain::time::format_log_time;
use rust_xlsxwriter::Workbook;
use serde_json::{Map, Value};

use crate::error::ReportError;
use crate::table::{ReportTable, TIMESTAMP_KEY};

const SHEET_NAME: &str = "Report";

/// CSV 首行：记录仪编号、名称、类型、位置。
pub fn metadata_record(logger: &Logger) -> Vec<String> {
    vec![
        format!("Logger ID: {}", logger.logger_id),
        format!("Name: {}", logger.name),
        format!("Type: {}", logger.logger_type().unwrap_or("Unknown")),
        format!("Location: {}", logger.location()),
    ]
}

fn cell(value: Option<f64>) -> String {
    value.map(|value| value.to_string()).unwrap_or_default()
}

pub fn to_csv(table: &ReportTable, logger: &Logger) -> Result<Vec<u8>, ReportError> {
    // 元数据行与数据行列数不同。
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());
    writer.write_record(metadata_record(logger))?;
    for row in &table.rows {
        let mut record = Vec::with_capacity(row.values.len() + 1);
        record.push(format_log_time(&row.timestamp));
        record.extend(row.values.iter().copied().map(cell));
        writer.write_record(&record)?;
    }
    writer
        .into_inner()
        .map_err(|err| ReportError::Export(err.to_string()))
}

/// 行转换为扁平 JSON 对象。
pub fn to_records(table: &ReportTable) -> Vec<Value> {
    table
        .rows
        .iter()
        .map(|row| {
            let mut record = Map::new();
            record.insert(
                TIMESTAMP_KEY.to_string(),
                Value::String(format_log_time(&row.timestamp)),
            );
            for (column, value) in table.columns.iter().zip(&row.values) {
                let value = value
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or(Value::Null);
                record.insert(column.key().to_string(), value);
            }
            Value::Object(record)
        })
        .collect()
}

pub fn to_json(table: &ReportTable) -> Result<Vec<u8>, ReportError> {
    Ok(serde_json::to_vec(&to_records(table))?)
}

pub fn to_xlsx(table: &ReportTable) -> Result<Vec<u8>, ReportError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;
    sheet.write_string(0, 0, TIMESTAMP_KEY)?;
    for (index, column) in table.columns.iter().enumerate() {
        sheet.write_string(0, sheet_col(index + 1)?, column.key())?;
    }
    for (index, row) in table.rows.iter().enumerate() {
        let line = u32::try_from(index + 1)
            .map_err(|_| ReportError::Export("too many rows".to_string()))?;
        sheet.write_string(line, 0, format_log_time(&row.timestamp))?;
        for (col, value) in row.values.iter().enumerate() {
            if let Some(value) = value {
                sheet.write_number(line, sheet_col(col + 1)?, *value)?;
            }
        }
    }
    Ok(workbook.save_to_buffer()?)
}

fn sheet_col(index: usize) -> Result<u16, ReportError> {
    u16::try_from(index).map_err(|_| ReportError::Export("too many columns".to_string()))
}
