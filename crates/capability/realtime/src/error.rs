/// 实时通道错误。连接类错误只用于日志，通道会自行重连。
#[derive(Debug, thiserror::Error)]
pub enum RealtimeError {
    #[error("invalid websocket url: {0}")]
    InvalidUrl(String),
    #[error("connect failed: {0}")]
    Connect(String),
    #[error("socket error: {0}")]
    Socket(String),
}

impl From<tokio_tungstenite::tungstenite::Error> for RealtimeError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::Socket(err.to_string())
    }
}
