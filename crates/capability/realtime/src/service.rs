//! 实时通道服务
//!
//! 连接配置的 WebSocket 端点，只接收服务端推送：
//! - watchdog 更新 -> 读数已变化，下游重新拉取记录仪数据
//! - 新通知 -> 下游按 id 拉取单条通知
//!
//! 连接关闭（出错或服务端关闭）后固定延迟重连，无退避、无次数上限。
//! 两类信号都只保留最近一次的值（`tokio::sync::watch`），不是队列。
//!
//! ## 生命周期
//!
//! 服务在启动时构造一次，由 `start()` / `stop()` 显式管理：
//! 同一时刻最多一个连接任务；`stop()` 关闭已打开的连接并取消待执行的重连。

use crate::error::RealtimeError;
use crate::frame::{FrameOutcome, parse_frame};
use api_contract::RealtimeMessage;
use chrono::Utc;
use domain::{NotificationSignal, WatchdogSignal};
use futures_util::StreamExt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};

/// 默认重连延迟。
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(5000);

/// 实时通道配置。
#[derive(Debug, Clone)]
pub struct RealtimeConfig {
    pub url: String,
    pub reconnect_delay: Duration,
}

impl RealtimeConfig {
    pub fn new(url: impl Into<String>, reconnect_delay: Duration) -> Result<Self, RealtimeError> {
        let url = url.into();
        if !(url.starts_with("ws://") || url.starts_with("wss://")) {
            return Err(RealtimeError::InvalidUrl(url));
        }
        Ok(Self {
            url,
            reconnect_delay,
        })
    }
}

/// 信号发布端：两个 watch 通道 + 递增序号。
struct Signals {
    watchdog: watch::Sender<Option<WatchdogSignal>>,
    notification: watch::Sender<Option<NotificationSignal>>,
    seq: AtomicU64,
}

impl Signals {
    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn handle_text(&self, text: &str) {
        hydro_telemetry::record_realtime_frame();
        match parse_frame(text) {
            FrameOutcome::NotJson => {
                hydro_telemetry::record_realtime_frame_discarded();
                debug!(target: "hydro.realtime", frame = %text, "discarding non-json frame");
            }
            FrameOutcome::Message(RealtimeMessage::WatchdogUpdate { filename }) => {
                hydro_telemetry::record_watchdog_signal();
                debug!(target: "hydro.realtime", filename = ?filename, "watchdog update");
                self.watchdog.send_replace(Some(WatchdogSignal {
                    seq: self.next_seq(),
                    filename,
                    received_at: Utc::now(),
                }));
            }
            FrameOutcome::Message(RealtimeMessage::NewNotification { notification_id }) => {
                hydro_telemetry::record_notification_signal();
                debug!(target: "hydro.realtime", notification_id, "new notification");
                self.notification.send_replace(Some(NotificationSignal {
                    seq: self.next_seq(),
                    notification_id,
                    received_at: Utc::now(),
                }));
            }
            FrameOutcome::Message(RealtimeMessage::Ignored) => {
                debug!(target: "hydro.realtime", "ignoring unrecognized message");
            }
        }
    }
}

struct Running {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// 实时通道服务。
pub struct RealtimeService {
    config: RealtimeConfig,
    signals: Arc<Signals>,
    running: Mutex<Option<Running>>,
}

impl RealtimeService {
    pub fn new(config: RealtimeConfig) -> Self {
        let (watchdog, _) = watch::channel(None);
        let (notification, _) = watch::channel(None);
        Self {
            config,
            signals: Arc::new(Signals {
                watchdog,
                notification,
                seq: AtomicU64::new(0),
            }),
            running: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &RealtimeConfig {
        &self.config
    }

    /// 最近一次 watchdog 信号。
    pub fn watchdog(&self) -> watch::Receiver<Option<WatchdogSignal>> {
        self.signals.watchdog.subscribe()
    }

    /// 最近一次新通知信号。
    pub fn notifications(&self) -> watch::Receiver<Option<NotificationSignal>> {
        self.signals.notification.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.running
            .lock()
            .map(|guard| {
                guard
                    .as_ref()
                    .is_some_and(|running| !running.handle.is_finished())
            })
            .unwrap_or(false)
    }

    /// 启动连接任务；已在运行时不做任何事并返回 false。需要在 tokio 运行时内调用。
    pub fn start(&self) -> bool {
        let Ok(mut guard) = self.running.lock() else {
            warn!(target: "hydro.realtime", "lifecycle lock poisoned");
            return false;
        };
        if guard
            .as_ref()
            .is_some_and(|running| !running.handle.is_finished())
        {
            return false;
        }
        let (shutdown, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(run(
            self.config.clone(),
            Arc::clone(&self.signals),
            shutdown_rx,
        ));
        *guard = Some(Running { shutdown, handle });
        info!(target: "hydro.realtime", url = %self.config.url, "realtime channel started");
        true
    }

    /// 停止连接任务：关闭当前连接并取消待执行的重连，等待任务退出。
    pub async fn stop(&self) {
        let running = match self.running.lock() {
            Ok(mut guard) => guard.take(),
            Err(_) => None,
        };
        let Some(running) = running else {
            return;
        };
        let _ = running.shutdown.send(true);
        if let Err(err) = running.handle.await {
            warn!(target: "hydro.realtime", error = %err, "realtime task join failed");
        }
        info!(target: "hydro.realtime", "realtime channel stopped");
    }
}

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// 一次连接结束的原因。
enum SessionEnd {
    Closed,
    Shutdown,
}

async fn run(config: RealtimeConfig, signals: Arc<Signals>, mut shutdown: watch::Receiver<bool>) {
    loop {
        info!(target: "hydro.realtime", url = %config.url, "connecting");
        let connected = tokio::select! {
            _ = shutdown.changed() => break,
            result = connect_async(config.url.as_str()) => result,
        };
        match connected {
            Ok((mut socket, _)) => {
                info!(target: "hydro.realtime", "connected");
                match session(&mut socket, &signals, &mut shutdown).await {
                    SessionEnd::Shutdown => {
                        let _ = socket.close(None).await;
                        break;
                    }
                    SessionEnd::Closed => {
                        info!(target: "hydro.realtime", "connection closed");
                    }
                }
            }
            Err(err) => {
                let err = RealtimeError::Connect(err.to_string());
                warn!(target: "hydro.realtime", error = %err, "connect failed");
            }
        }

        hydro_telemetry::record_realtime_reconnect();
        info!(
            target: "hydro.realtime",
            delay_ms = config.reconnect_delay.as_millis() as u64,
            "reconnect scheduled"
        );
        tokio::select! {
            _ = shutdown.changed() => break,
            _ = tokio::time::sleep(config.reconnect_delay) => {}
        }
    }
}

/// 读取帧直到连接关闭或收到停止信号。连接本身是空闲的，客户端不发送任何消息。
async fn session(
    socket: &mut Socket,
    signals: &Signals,
    shutdown: &mut watch::Receiver<bool>,
) -> SessionEnd {
    loop {
        let frame = tokio::select! {
            _ = shutdown.changed() => return SessionEnd::Shutdown,
            frame = socket.next() => frame,
        };
        match frame {
            Some(Ok(Message::Text(text))) => signals.handle_text(&text),
            Some(Ok(Message::Close(_))) | None => return SessionEnd::Closed,
            Some(Ok(_)) => {}
            Some(Err(err)) => {
                let err = RealtimeError::from(err);
                warn!(target: "hydro.realtime", error = %err, "socket error");
                let _ = socket.close(None).await;
                return SessionEnd::Closed;
            }
        }
    }
}
