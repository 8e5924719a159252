//! 实时通道：WebSocket 推送 -> 最新值信号。

pub mod error;
pub mod frame;
pub mod service;

pub use error::RealtimeError;
pub use frame::{FrameOutcome, parse_frame};
pub use service::{DEFAULT_RECONNECT_DELAY, RealtimeConfig, RealtimeService};
