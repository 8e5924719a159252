//! 文本帧解析。

use api_contract::{RealtimeEnvelope, RealtimeMessage};
use serde_json::Value;

/// 单个文本帧的解析结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    Message(RealtimeMessage),
    /// 非 JSON 文本，记录后丢弃。
    NotJson,
}

/// 解析服务端推送的文本帧。
///
/// 合法 JSON 但缺少 `type` 或结构不符时视为未识别消息，不算错误。
pub fn parse_frame(text: &str) -> FrameOutcome {
    let Ok(value) = serde_json::from_str::<Value>(text) else {
        return FrameOutcome::NotJson;
    };
    match serde_json::from_value::<RealtimeEnvelope>(value) {
        Ok(envelope) => FrameOutcome::Message(envelope.into_message()),
        Err(_) => FrameOutcome::Message(RealtimeMessage::Ignored),
    }
}
