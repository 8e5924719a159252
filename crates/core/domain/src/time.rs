//! 读数时间解析与格式化。
//!
//! 后端时间可能是 RFC 3339，也可能是不带时区的 `YYYY-MM-DD HH:MM:SS`；
//! 不带时区的值按 UTC 处理。

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// 报表与 DTO 输出使用的时间格式。
pub const LOG_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// 解析读数时间。
pub fn parse_log_time(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| naive.and_utc())
}

/// 格式化读数时间。
pub fn format_log_time(ts: &DateTime<Utc>) -> String {
    ts.format(LOG_TIME_FORMAT).to_string()
}

/// serde 适配：`DateTime<Utc>` <-> 读数时间字符串。
pub mod log_time {
    use super::*;

    pub fn serialize<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_log_time(ts))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        parse_log_time(&text)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid log time: {text}")))
    }
}
