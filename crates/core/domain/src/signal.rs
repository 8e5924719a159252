//! 实时通道对外暴露的信号。
//!
//! 每类信号只保留最近一次的值，不是队列：消费者错过的中间信号不可见。
//! `seq` 单调递增，用于区分内容相同的两次推送。

use chrono::{DateTime, Utc};

/// 读数已更新（watchdog update）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchdogSignal {
    pub seq: u64,
    pub filename: Option<String>,
    pub received_at: DateTime<Utc>,
}

/// 新通知到达。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationSignal {
    pub seq: u64,
    pub notification_id: i64,
    pub received_at: DateTime<Utc>,
}
