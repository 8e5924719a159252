//! 宽松反序列化辅助函数
//!
//! 后端对同一字段可能返回数字、数字字符串或 0/1，统一在此收敛。

use serde::de::Error;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

/// 数字或数字字符串 -> `Option<f64>`；空字符串与 null 视为缺失。
///
/// 无法解析的值（如 `"N/A"`）同样视为缺失，单个异常单元格不影响整行与整个列表。
pub fn option_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) if text.trim().is_empty() => Ok(None),
        Some(value) => {
            let parsed = value_to_f64(&value);
            if parsed.is_none() {
                debug!(target: "hydro.decode", value = %value, "unparseable number treated as missing");
            }
            Ok(parsed)
        }
    }
}

/// 数字或数字字符串 -> `Option<i64>`。
pub fn option_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value_to_i64(&value)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("expected integer, got {value}"))),
    }
}

/// 数字或数字字符串 -> `i64`。
pub fn i64_lenient<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_to_i64(&value).ok_or_else(|| D::Error::custom(format!("expected integer, got {value}")))
}

/// bool、0/1 或 "true"/"false" -> `bool`；缺失或 null 为 false。
pub fn bool_lenient<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(flag)) => Ok(flag),
        Some(Value::Number(number)) => Ok(number.as_f64().is_some_and(|n| n != 0.0)),
        Some(Value::String(text)) => match text.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" | "" => Ok(false),
            other => Err(D::Error::custom(format!("expected boolean, got {other}"))),
        },
        Some(other) => Err(D::Error::custom(format!("expected boolean, got {other}"))),
    }
}

/// JSON 值转 f64（数字或可解析的字符串）。
pub fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
        }
        _ => None,
    }
}

fn value_to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    }
}
