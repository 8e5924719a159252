//! 后端访问错误类型
//!
//! 区分三类失败：
//! - 传输失败（连接、超时）
//! - 非 2xx 状态码
//! - 响应体解析失败

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("http {status} from {path}")]
    Status { status: u16, path: String },
    #[error("decode error: {0}")]
    Decode(String),
    #[error("invalid config: {0}")]
    Config(String),
    #[error("lock failed")]
    Lock,
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
