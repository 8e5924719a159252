//! 用户提示（toast）
//!
//! 状态层只产出提示内容，由 `ToastSink` 决定如何呈现。

use std::sync::Mutex;
use tracing::{info, warn};

/// 优先级 1 的提示持续时间。
pub const ERROR_TOAST_MS: u64 = 60_000;
/// 其余提示的持续时间。
pub const DEFAULT_TOAST_MS: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Error,
    Warning,
    Success,
}

impl ToastKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToastKind::Error => "error",
            ToastKind::Warning => "warning",
            ToastKind::Success => "success",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub title: String,
    pub description: String,
    pub duration_ms: u64,
}

impl Toast {
    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Error,
            title: title.into(),
            description: description.into(),
            duration_ms: DEFAULT_TOAST_MS,
        }
    }
}

pub trait ToastSink: Send + Sync {
    fn show(&self, toast: Toast);
}

/// 以日志形式输出提示（无界面环境）。
#[derive(Debug, Default)]
pub struct TracingToastSink;

impl ToastSink for TracingToastSink {
    fn show(&self, toast: Toast) {
        hydro_telemetry::record_toast();
        match toast.kind {
            ToastKind::Error => warn!(
                target: "hydro.toast",
                title = %toast.title,
                description = %toast.description,
                duration_ms = toast.duration_ms,
                "error toast"
            ),
            kind => info!(
                target: "hydro.toast",
                kind = kind.as_str(),
                title = %toast.title,
                description = %toast.description,
                duration_ms = toast.duration_ms,
                "toast"
            ),
        }
    }
}

/// 记录所有提示，便于断言。
#[derive(Debug, Default)]
pub struct RecordingToastSink {
    toasts: Mutex<Vec<Toast>>,
}

impl RecordingToastSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts
            .lock()
            .map(|toasts| toasts.clone())
            .unwrap_or_default()
    }
}

impl ToastSink for RecordingToastSink {
    fn show(&self, toast: Toast) {
        hydro_telemetry::record_toast();
        if let Ok(mut toasts) = self.toasts.lock() {
            toasts.push(toast);
        }
    }
}
