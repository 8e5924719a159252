//! 通知状态
//!
//! - `fetch_notifications`：整体替换列表
//! - `fetch_notification`：按 id 拉取单条，本地没有时插到最前并弹出提示
//! - `mark_read` / `mark_all_read`：先请求后端，再更新本地状态
//! - 未读数是派生值，不单独存储

use domain::{Notification, NotificationPriority};
use hydro_backend::Backend;
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::toast::{DEFAULT_TOAST_MS, ERROR_TOAST_MS, Toast, ToastKind, ToastSink};

/// 点击通知后地图定位使用的固定缩放级别。
pub const MAP_FOCUS_ZOOM: u8 = 17;

/// 地图定位请求。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapFocus {
    pub lat: f64,
    pub lon: f64,
    pub zoom: u8,
}

pub struct NotificationStore {
    backend: Arc<dyn Backend>,
    toasts: Arc<dyn ToastSink>,
    items: RwLock<Vec<Notification>>,
}

impl NotificationStore {
    pub fn new(backend: Arc<dyn Backend>, toasts: Arc<dyn ToastSink>) -> Self {
        Self {
            backend,
            toasts,
            items: RwLock::new(Vec::new()),
        }
    }

    pub fn list(&self) -> Vec<Notification> {
        self.items
            .read()
            .map(|items| items.clone())
            .unwrap_or_default()
    }

    pub fn unread_count(&self) -> usize {
        self.items
            .read()
            .map(|items| items.iter().filter(|item| !item.is_read).count())
            .unwrap_or(0)
    }

    /// 用后端结果替换整个列表。
    pub async fn fetch_notifications(&self, include_read: bool) -> Result<usize, StoreError> {
        let fetched = match self.backend.list_notifications(include_read).await {
            Ok(items) => items,
            Err(err) => {
                hydro_telemetry::record_notification_fetch_failure();
                warn!(target: "hydro.store", error = %err, "notification list fetch failed");
                return Err(err.into());
            }
        };
        let count = fetched.len();
        let mut items = self.items.write().map_err(|_| StoreError::Lock)?;
        *items = fetched;
        debug!(target: "hydro.store", count, include_read, "notifications replaced");
        Ok(count)
    }

    /// 按 id 拉取单条通知。首次出现时插入列表最前，优先级为 1/2/3 时弹出提示。
    pub async fn fetch_notification(&self, id: i64) -> Result<Option<Notification>, StoreError> {
        let fetched = match self.backend.get_notification(id).await {
            Ok(item) => item,
            Err(err) => {
                hydro_telemetry::record_notification_fetch_failure();
                warn!(target: "hydro.store", notification_id = id, error = %err, "notification fetch failed");
                return Err(err.into());
            }
        };
        let Some(notification) = fetched else {
            debug!(target: "hydro.store", notification_id = id, "notification not found");
            return Ok(None);
        };

        let inserted = {
            let mut items = self.items.write().map_err(|_| StoreError::Lock)?;
            let exists = notification.id.is_some()
                && items.iter().any(|item| item.id == notification.id);
            if !exists {
                items.insert(0, notification.clone());
            }
            !exists
        };
        if inserted {
            info!(target: "hydro.store", notification_id = id, "notification received");
            if let Some(toast) = notification_toast(&notification) {
                self.toasts.show(toast);
            }
        }
        Ok(Some(notification))
    }

    /// 标记单条已读。已读或没有 id 时不发请求，返回 false。
    pub async fn mark_read(&self, notification: &Notification) -> Result<bool, StoreError> {
        let Some(id) = notification.id else {
            return Ok(false);
        };
        if notification.is_read || self.is_read_locally(id) {
            return Ok(false);
        }
        self.backend.mark_notification_read(id).await?;
        let mut items = self.items.write().map_err(|_| StoreError::Lock)?;
        for item in items.iter_mut().filter(|item| item.id == Some(id)) {
            item.is_read = true;
        }
        Ok(true)
    }

    /// 按 id 标记本地列表中的通知为已读。
    pub async fn mark_read_by_id(&self, id: i64) -> Result<bool, StoreError> {
        let notification = self
            .find(id)
            .ok_or_else(|| StoreError::NotFound(format!("notification {id}")))?;
        self.mark_read(&notification).await
    }

    /// 批量已读：空输入不发请求；请求成功后本地列表全部标记为已读（不限于传入的 id）。
    pub async fn mark_all_read(&self, ids: &[i64]) -> Result<bool, StoreError> {
        if ids.is_empty() {
            return Ok(false);
        }
        self.backend.mark_notifications_read(ids).await?;
        let mut items = self.items.write().map_err(|_| StoreError::Lock)?;
        for item in items.iter_mut() {
            item.is_read = true;
        }
        Ok(true)
    }

    /// 点击通知：标记已读，载荷带坐标时返回地图定位。
    pub async fn open_notification(&self, id: i64) -> Result<Option<MapFocus>, StoreError> {
        let notification = self
            .find(id)
            .ok_or_else(|| StoreError::NotFound(format!("notification {id}")))?;
        self.mark_read(&notification).await?;
        Ok(notification.payload_coordinates().map(|coords| MapFocus {
            lat: coords.lat,
            lon: coords.lon,
            zoom: MAP_FOCUS_ZOOM,
        }))
    }

    fn find(&self, id: i64) -> Option<Notification> {
        self.items
            .read()
            .ok()
            .and_then(|items| items.iter().find(|item| item.id == Some(id)).cloned())
    }

    fn is_read_locally(&self, id: i64) -> bool {
        self.find(id).is_some_and(|item| item.is_read)
    }
}

/// 通知对应的提示；优先级不在 1..=3 时不提示。
pub fn notification_toast(notification: &Notification) -> Option<Toast> {
    let (kind, duration_ms) = match notification.priority_level()? {
        NotificationPriority::Error => (ToastKind::Error, ERROR_TOAST_MS),
        NotificationPriority::Warning => (ToastKind::Warning, DEFAULT_TOAST_MS),
        NotificationPriority::Success => (ToastKind::Success, DEFAULT_TOAST_MS),
    };
    let description = match notification.payload_value() {
        Some(value) => format!("Value: {value}"),
        None => notification.message.clone(),
    };
    Some(Toast {
        kind,
        title: notification.title.clone(),
        description,
        duration_ms,
    })
}
