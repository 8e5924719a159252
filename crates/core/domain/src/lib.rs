//! 水务遥测看板的领域模型：记录仪、读数、通知、报表请求与实时信号。

pub mod de;
pub mod logger;
pub mod notification;
pub mod report;
pub mod signal;
pub mod time;
pub mod validation;

pub use logger::{CapabilitySet, Coordinates, Limits, LogReading, Logger, LoggerId, Metric};
pub use notification::{Notification, NotificationPriority};
pub use report::{Averaging, DateRange, LogKind, ReportFormat, ReportRequest, ReportSelection};
pub use signal::{NotificationSignal, WatchdogSignal};
pub use validation::{DomainError, validate_coordinates, validate_sim_number};

use serde::{Deserialize, Serialize};

/// 当前操作用户：用于配置变更与报表导出的审计。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserContext {
    pub user_id: String,
    pub username: String,
}

impl UserContext {
    pub fn new(user_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
        }
    }

    /// 后台任务使用的系统身份。
    pub fn system() -> Self {
        Self::new("system", "system")
    }
}
