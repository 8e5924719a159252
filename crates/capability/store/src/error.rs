//! 看板状态层错误类型

use domain::DomainError;
use hydro_backend::BackendError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Validation(#[from] DomainError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("lock failed")]
    Lock,
}
