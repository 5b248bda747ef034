//! 测试消息模板
//!
//! 默认模板覆盖内置配置中的每一条规则，外加一条走默认响应的消息。
//! 也可以从 JSON 文件加载自定义模板。

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde_json::{Value, json};
use tracing::{error, info};

use super::publisher::OutboundMessage;

/// 头部中标记消息来源的值
pub const PRODUCER_SOURCE: &str = "test-producer";

/// 默认测试消息
///
/// 在内置配置下依次触发 200、400、201、422、504、500。
pub fn default_messages() -> Vec<Value> {
    vec![
        json!({"id": 1, "status": "success", "data": "Test message 1"}),
        json!({"id": 2, "status": "error", "data": "Test message 2"}),
        json!({"id": 3, "priority": "high", "data": "Test message 3"}),
        json!({"id": 4, "action": "reject", "data": "Test message 4"}),
        json!({"id": 5, "simulate": "timeout", "data": "Test message 5"}),
        json!({"id": 6, "simulate": "server_error", "data": "Test message 6"}),
    ]
}

/// 从文件加载消息模板
///
/// 文件必须是非空的 JSON 对象数组；读取或解析失败时记录错误并回退到默认模板。
pub fn load_messages_from_file(path: impl AsRef<Path>) -> Vec<Value> {
    let path = path.as_ref();
    match read_templates(path) {
        Ok(templates) => {
            info!(path = %path.display(), count = templates.len(), "已从文件加载消息模板");
            templates
        }
        Err(reason) => {
            error!(path = %path.display(), %reason, "加载消息文件失败，使用默认模板");
            default_messages()
        }
    }
}

fn read_templates(path: &Path) -> Result<Vec<Value>, String> {
    let content = fs::read_to_string(path).map_err(|e| e.to_string())?;
    let value: Value = serde_json::from_str(&content).map_err(|e| e.to_string())?;

    let Value::Array(templates) = value else {
        return Err("message file must contain a JSON array of message objects".to_string());
    };
    if templates.is_empty() {
        return Err("message file contains no templates".to_string());
    }
    if let Some(index) = templates.iter().position(|t| !t.is_object()) {
        return Err(format!("template #{index} is not a JSON object"));
    }
    Ok(templates)
}

/// 由模板构造第 `index` 条（从 0 开始）待发送消息
///
/// - 模板没有 `id` 时补上 `index + 1`
/// - 写入 `timestamp`（unix 秒）
/// - key 为 `id` 的字符串形式
/// - header 包含 timestamp、source 与批次号（每轮模板为一批，从 1 开始）
pub fn build_message(
    templates: &[Value],
    index: usize,
    timestamp: i64,
    topic: Option<&str>,
) -> OutboundMessage {
    let mut payload = templates[index % templates.len()].clone();

    if let Some(fields) = payload.as_object_mut() {
        fields.entry("id").or_insert_with(|| json!(index + 1));
        fields.insert("timestamp".to_string(), json!(timestamp));
    }

    let key = payload.get("id").map(|id| match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    });

    let headers = HashMap::from([
        ("timestamp".to_string(), timestamp.to_string()),
        ("source".to_string(), PRODUCER_SOURCE.to_string()),
        (
            "batch".to_string(),
            (index / templates.len() + 1).to_string(),
        ),
    ]);

    OutboundMessage {
        payload,
        key,
        headers,
        topic: topic.map(str::to_string),
    }
}
