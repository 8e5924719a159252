//! 报表生成错误类型

use hydro_backend::BackendError;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("xlsx export failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error("json export failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("export failed: {0}")]
    Export(String),
    #[error("no workbook pending download")]
    NothingPending,
    #[error("lock failed")]
    Lock,
}
