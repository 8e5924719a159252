//! 报表生成：数据源选择、区间裁剪、平均与 CSV/XLSX/JSON 导出。

pub mod averaging;
pub mod error;
pub mod export;
pub mod service;
pub mod table;

pub use error::ReportError;
pub use service::{ReportFile, ReportOutcome, ReportService, file_name};
pub use table::{Column, ReportRow, ReportTable};
