//! 报表生成服务
//!
//! 生成流程：确定数据源 -> 按日期区间拉取原始行 -> 区间裁剪 -> 可选平均 -> 序列化。
//! CSV/JSON 直接返回文件内容；XLSX 暂存行数据，等显式下载时再写出工作簿。
//! 每次重新生成都会先清掉上一次未下载的结果；生成失败时弹出错误提示。

use domain::{DateRange, LogKind, LogReading, Logger, Metric, ReportFormat, ReportRequest};
use hydro_backend::Backend;
use hydro_store::{Toast, ToastSink};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use crate::averaging::average;
use crate::error::ReportError;
use crate::export::{to_csv, to_json, to_xlsx};
use crate::table::{ReportTable, build_table};

/// 可下载的文件。
#[derive(Debug, Clone)]
pub struct ReportFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// 一次生成的结果。
#[derive(Debug, Clone)]
pub struct ReportOutcome {
    pub file_name: String,
    pub format: ReportFormat,
    pub rows: usize,
    /// CSV/JSON 立即可下载；XLSX 为 None，需要调用 `download`。
    pub file: Option<ReportFile>,
}

impl ReportOutcome {
    pub fn pending_download(&self) -> bool {
        self.file.is_none()
    }
}

/// 等待下载的工作簿。
struct PendingWorkbook {
    file_name: String,
    table: ReportTable,
}

pub struct ReportService {
    backend: Arc<dyn Backend>,
    toasts: Arc<dyn ToastSink>,
    pending: Mutex<Option<PendingWorkbook>>,
}

impl ReportService {
    pub fn new(backend: Arc<dyn Backend>, toasts: Arc<dyn ToastSink>) -> Self {
        Self {
            backend,
            toasts,
            pending: Mutex::new(None),
        }
    }

    /// 是否有等待下载的工作簿。
    pub fn has_pending(&self) -> bool {
        self.pending
            .lock()
            .map(|pending| pending.is_some())
            .unwrap_or(false)
    }

    pub async fn generate(&self, request: ReportRequest) -> Result<ReportOutcome, ReportError> {
        self.clear_pending()?;
        match self.build(&request).await {
            Ok(outcome) => {
                hydro_telemetry::record_report(true);
                info!(
                    target: "hydro.report",
                    logger_id = request.logger.logger_id,
                    metric = request.selection.metric.as_str(),
                    format = request.format.extension(),
                    rows = outcome.rows,
                    user = %request.user.username,
                    "report generated"
                );
                Ok(outcome)
            }
            Err(err) => {
                hydro_telemetry::record_report(false);
                warn!(
                    target: "hydro.report",
                    logger_id = request.logger.logger_id,
                    error = %err,
                    "report generation failed"
                );
                self.toasts
                    .show(Toast::error("Report generation failed", err.to_string()));
                Err(err)
            }
        }
    }

    /// 写出暂存的 XLSX 工作簿；写出后暂存清空。
    pub fn download(&self) -> Result<ReportFile, ReportError> {
        let pending = self
            .pending
            .lock()
            .map_err(|_| ReportError::Lock)?
            .take()
            .ok_or(ReportError::NothingPending)?;
        let bytes = to_xlsx(&pending.table)?;
        info!(target: "hydro.report", file = %pending.file_name, "workbook written");
        Ok(ReportFile {
            file_name: pending.file_name,
            content_type: ReportFormat::Xlsx.content_type(),
            bytes,
        })
    }

    /// 日期选择器可用的日期。勾选累计流量时取累计流量日志的日期。
    pub async fn available_dates(
        &self,
        logger: &Logger,
        metric: Metric,
        totalizer: bool,
    ) -> Result<Vec<chrono::NaiveDate>, ReportError> {
        if totalizer {
            return Ok(self.backend.totalizer_log_dates(logger.logger_id).await?);
        }
        let kind = logger.log_kind_for(metric);
        Ok(self.backend.log_dates(kind, logger.logger_id).await?)
    }

    /// 图表用的原始时序（区间裁剪并按时间排序，不平均）。
    pub async fn history(
        &self,
        logger: &Logger,
        kind: LogKind,
        range: &DateRange,
    ) -> Result<Vec<LogReading>, ReportError> {
        let mut rows: Vec<LogReading> = self
            .backend
            .log_series(kind, logger.logger_id, range)
            .await?
            .into_iter()
            .filter(|reading| range.contains(&reading.log_time))
            .collect();
        rows.sort_by_key(|reading| reading.log_time);
        Ok(rows)
    }

    async fn build(&self, request: &ReportRequest) -> Result<ReportOutcome, ReportError> {
        let source = request.source_kind();
        let readings = self
            .backend
            .log_series(source, request.logger.logger_id, &request.range)
            .await?;
        let table = build_table(&readings, &request.selection, source, &request.range);
        let table = average(table, request.selection.averaging);
        let rows = table.rows.len();
        let file_name = file_name(request);

        let file = match request.format {
            ReportFormat::Csv => Some(to_csv(&table, &request.logger)?),
            ReportFormat::Json => Some(to_json(&table)?),
            ReportFormat::Xlsx => None,
        };
        let file = match file {
            Some(bytes) => Some(ReportFile {
                file_name: file_name.clone(),
                content_type: request.format.content_type(),
                bytes,
            }),
            None => {
                let mut pending = self.pending.lock().map_err(|_| ReportError::Lock)?;
                *pending = Some(PendingWorkbook {
                    file_name: file_name.clone(),
                    table,
                });
                None
            }
        };
        Ok(ReportOutcome {
            file_name,
            format: request.format,
            rows,
            file,
        })
    }

    fn clear_pending(&self) -> Result<(), ReportError> {
        let mut pending = self.pending.lock().map_err(|_| ReportError::Lock)?;
        *pending = None;
        Ok(())
    }
}

/// `{名称}_{指标}_{开始}_{结束}.{扩展名}`，空白替换为下划线。
pub fn file_name(request: &ReportRequest) -> String {
    let name: String = request
        .logger
        .name
        .chars()
        .map(|c| if c.is_whitespace() || c == '/' { '_' } else { c })
        .collect();
    format!(
        "{}_{}_{}_{}.{}",
        name,
        request.selection.metric.as_str(),
        request.range.start,
        request.range.end,
        request.format.extension()
    )
}
