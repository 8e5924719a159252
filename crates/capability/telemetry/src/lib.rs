//! 追踪、请求 ID 生成与进程级计数器。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 请求级追踪标识。
#[derive(Debug, Clone)]
pub struct RequestIds {
    pub request_id: String,
    pub trace_id: String,
}

/// 计数器快照。
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub realtime_frames: u64,
    pub realtime_frames_discarded: u64,
    pub realtime_reconnects: u64,
    pub watchdog_signals: u64,
    pub notification_signals: u64,
    pub data_refresh_success: u64,
    pub data_refresh_failure: u64,
    pub notification_fetch_failure: u64,
    pub toasts_emitted: u64,
    pub reports_generated: u64,
    pub reports_failed: u64,
}

/// 进程级计数器。
pub struct TelemetryMetrics {
    realtime_frames: AtomicU64,
    realtime_frames_discarded: AtomicU64,
    realtime_reconnects: AtomicU64,
    watchdog_signals: AtomicU64,
    notification_signals: AtomicU64,
    data_refresh_success: AtomicU64,
    data_refresh_failure: AtomicU64,
    notification_fetch_failure: AtomicU64,
    toasts_emitted: AtomicU64,
    reports_generated: AtomicU64,
    reports_failed: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self {
            realtime_frames: AtomicU64::new(0),
            realtime_frames_discarded: AtomicU64::new(0),
            realtime_reconnects: AtomicU64::new(0),
            watchdog_signals: AtomicU64::new(0),
            notification_signals: AtomicU64::new(0),
            data_refresh_success: AtomicU64::new(0),
            data_refresh_failure: AtomicU64::new(0),
            notification_fetch_failure: AtomicU64::new(0),
            toasts_emitted: AtomicU64::new(0),
            reports_generated: AtomicU64::new(0),
            reports_failed: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            realtime_frames: self.realtime_frames.load(Ordering::Relaxed),
            realtime_frames_discarded: self.realtime_frames_discarded.load(Ordering::Relaxed),
            realtime_reconnects: self.realtime_reconnects.load(Ordering::Relaxed),
            watchdog_signals: self.watchdog_signals.load(Ordering::Relaxed),
            notification_signals: self.notification_signals.load(Ordering::Relaxed),
            data_refresh_success: self.data_refresh_success.load(Ordering::Relaxed),
            data_refresh_failure: self.data_refresh_failure.load(Ordering::Relaxed),
            notification_fetch_failure: self.notification_fetch_failure.load(Ordering::Relaxed),
            toasts_emitted: self.toasts_emitted.load(Ordering::Relaxed),
            reports_generated: self.reports_generated.load(Ordering::Relaxed),
            reports_failed: self.reports_failed.load(Ordering::Relaxed),
        }
    }
}

impl Default for TelemetryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局计数器实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的 request_id 与 trace_id。
pub fn new_request_ids() -> RequestIds {
    RequestIds {
        request_id: uuid::Uuid::new_v4().to_string(),
        trace_id: uuid::Uuid::new_v4().to_string(),
    }
}

/// 记录收到的 WebSocket 文本帧。
pub fn record_realtime_frame() {
    metrics().realtime_frames.fetch_add(1, Ordering::Relaxed);
}

/// 记录被丢弃的非 JSON 帧。
pub fn record_realtime_frame_discarded() {
    metrics()
        .realtime_frames_discarded
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录已安排的重连次数。
pub fn record_realtime_reconnect() {
    metrics().realtime_reconnects.fetch_add(1, Ordering::Relaxed);
}

pub fn record_watchdog_signal() {
    metrics().watchdog_signals.fetch_add(1, Ordering::Relaxed);
}

pub fn record_notification_signal() {
    metrics().notification_signals.fetch_add(1, Ordering::Relaxed);
}

/// 记录数据刷新结果。
pub fn record_data_refresh(success: bool) {
    let metrics = metrics();
    if success {
        metrics.data_refresh_success.fetch_add(1, Ordering::Relaxed);
    } else {
        metrics.data_refresh_failure.fetch_add(1, Ordering::Relaxed);
    }
}

pub fn record_notification_fetch_failure() {
    metrics()
        .notification_fetch_failure
        .fetch_add(1, Ordering::Relaxed);
}

pub fn record_toast() {
    metrics().toasts_emitted.fetch_add(1, Ordering::Relaxed);
}

/// 记录报表生成结果。
pub fn record_report(success: bool) {
    let metrics = metrics();
    if success {
        metrics.reports_generated.fetch_add(1, Ordering::Relaxed);
    } else {
        metrics.reports_failed.fetch_add(1, Ordering::Relaxed);
    }
}
