//! 告警/通知模型。
//!
//! 由服务端创建；客户端只做“标记已读”，不删除。

use crate::de::value_to_f64;
use crate::logger::Coordinates;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 通知优先级（1=错误，2=警告，3=成功）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPriority {
    Error,
    Warning,
    Success,
}

impl NotificationPriority {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Error),
            2 => Some(Self::Warning),
            3 => Some(Self::Success),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Notification {
    #[serde(default, deserialize_with = "crate::de::option_i64")]
    pub id: Option<i64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    /// 自由格式载荷：JSON 字符串或对象。
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default, deserialize_with = "crate::de::option_i64")]
    pub user_id: Option<i64>,
    #[serde(default, deserialize_with = "crate::de::bool_lenient")]
    pub is_read: bool,
    #[serde(default, deserialize_with = "crate::de::option_i64")]
    pub priority: Option<i64>,
    #[serde(default, alias = "CreatedAt")]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

impl Notification {
    pub fn priority_level(&self) -> Option<NotificationPriority> {
        self.priority.and_then(NotificationPriority::from_code)
    }

    /// 解析后的载荷；字符串载荷按 JSON 再解析一次。
    pub fn payload(&self) -> Option<Value> {
        match self.data.as_ref()? {
            Value::String(text) => serde_json::from_str(text).ok(),
            Value::Null => None,
            other => Some(other.clone()),
        }
    }

    /// 载荷中的 `value` 字段（用于提示正文）。
    pub fn payload_value(&self) -> Option<String> {
        match self.payload()?.get("value")? {
            Value::Null => None,
            Value::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        }
    }

    /// 载荷中的 `coordinates: {lat, lon}`。
    pub fn payload_coordinates(&self) -> Option<Coordinates> {
        let payload = self.payload()?;
        let coords = payload.get("coordinates")?;
        Some(Coordinates {
            lat: value_to_f64(coords.get("lat")?)?,
            lon: value_to_f64(coords.get("lon")?)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_from_json_string() {
        let notification: Notification = serde_json::from_value(json!({
            "Id": 12,
            "Title": "Low pressure",
            "Data": "{\"value\":5.2,\"coordinates\":{\"lat\":\"14.5\",\"lon\":121.1}}",
            "IsRead": 0,
            "Priority": 1
        }))
        .unwrap();
        assert_eq!(notification.priority_level(), Some(NotificationPriority::Error));
        assert_eq!(notification.payload_value().as_deref(), Some("5.2"));
        assert_eq!(
            notification.payload_coordinates(),
            Some(Coordinates { lat: 14.5, lon: 121.1 })
        );
        assert!(!notification.is_read);
    }

    #[test]
    fn payload_missing_or_malformed() {
        let notification: Notification = serde_json::from_value(json!({
            "Id": 1,
            "Data": "not json",
            "Priority": 9
        }))
        .unwrap();
        assert_eq!(notification.payload(), None);
        assert_eq!(notification.payload_value(), None);
        assert_eq!(notification.priority_level(), None);
    }
}
