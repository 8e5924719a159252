//! 实时信号 -> 状态刷新
//!
//! 每观察到一次信号变化执行一次拉取；信号只保留最新值，处理期间到达的多次推送合并为一次。

use domain::{NotificationSignal, WatchdogSignal};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::log_data::LogDataStore;
use crate::notifications::NotificationStore;

/// watchdog 信号变化时刷新记录仪数据。信号发送端关闭后任务退出。
pub fn spawn_watchdog_sync(
    mut signal: watch::Receiver<Option<WatchdogSignal>>,
    store: Arc<LogDataStore>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while signal.changed().await.is_ok() {
            let latest = signal.borrow_and_update().clone();
            let Some(latest) = latest else {
                continue;
            };
            debug!(target: "hydro.sync", seq = latest.seq, "watchdog signal");
            // 失败已在状态层记录，这里不再处理。
            let _ = store.fetch_data().await;
        }
    })
}

/// 新通知信号变化时按 id 拉取该通知。
pub fn spawn_notification_sync(
    mut signal: watch::Receiver<Option<NotificationSignal>>,
    store: Arc<NotificationStore>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while signal.changed().await.is_ok() {
            let latest = signal.borrow_and_update().clone();
            let Some(latest) = latest else {
                continue;
            };
            debug!(
                target: "hydro.sync",
                seq = latest.seq,
                notification_id = latest.notification_id,
                "notification signal"
            );
            let _ = store.fetch_notification(latest.notification_id).await;
        }
    })
}
