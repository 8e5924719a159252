//! # Hydro Store 模块
//!
//! 看板的内存状态层，位于后端接口与展示层之间：
//!
//! - [`log_data`]：记录仪列表 + 最新读数快照，合并视图与状态分级
//! - [`notifications`]：通知列表、已读标记、新通知提示、地图定位
//! - [`config_editor`]：配置/阈值变更（本地校验 + 审计 + 刷新）
//! - [`toast`]：提示内容与输出接口
//! - [`sync`]：实时信号驱动的刷新任务
//!
//! 所有状态使用 `std::sync::RwLock` 保护，锁不跨越 await。

pub mod config_editor;
pub mod error;
pub mod log_data;
pub mod notifications;
pub mod sync;
pub mod toast;

pub use config_editor::ConfigEditor;
pub use error::StoreError;
pub use log_data::{LogDataSnapshot, LogDataStore, LoggerView, MergedLogger};
pub use notifications::{MAP_FOCUS_ZOOM, MapFocus, NotificationStore, notification_toast};
pub use sync::{spawn_notification_sync, spawn_watchdog_sync};
pub use toast::{RecordingToastSink, Toast, ToastKind, ToastSink, TracingToastSink};
