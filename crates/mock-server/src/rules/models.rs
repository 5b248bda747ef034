//! 响应规则领域模型
//!
//! 序列化形态与 `/config` 接口的 JSON 完全一致：规则列表字段名为 `configurations`。

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// 单条匹配规则
///
/// 入站消息顶层字段 `match_field` 的值与 `match_value` 严格相等时，
/// 返回 `response_code` 和 `response_body`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRule {
    pub match_field: String,
    pub match_value: Value,
    pub response_code: u16,
    pub response_body: Map<String, Value>,
}

impl MatchRule {
    pub fn new(
        match_field: impl Into<String>,
        match_value: impl Into<Value>,
        response_code: u16,
        response_body: Value,
    ) -> Self {
        Self {
            match_field: match_field.into(),
            match_value: match_value.into(),
            response_code,
            response_body: into_object(response_body),
        }
    }

    /// 规则命中时返回的响应
    pub fn response(&self) -> MockResponse {
        MockResponse {
            status: self.response_code,
            body: self.response_body.clone(),
        }
    }
}

/// 无规则命中时的默认响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultResponse {
    pub response_code: u16,
    pub response_body: Map<String, Value>,
}

impl DefaultResponse {
    pub fn response(&self) -> MockResponse {
        MockResponse {
            status: self.response_code,
            body: self.response_body.clone(),
        }
    }
}

impl Default for DefaultResponse {
    fn default() -> Self {
        Self {
            response_code: 200,
            response_body: into_object(json!({"message": "Message received successfully"})),
        }
    }
}

/// mock 服务的完整响应配置
///
/// 规则顺序有语义：按顺序扫描，第一条命中的规则生效。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockServerConfig {
    #[serde(default)]
    pub default: DefaultResponse,
    #[serde(rename = "configurations", alias = "rules", default)]
    pub rules: Vec<MatchRule>,
}

impl MockServerConfig {
    pub fn new(default: DefaultResponse, rules: Vec<MatchRule>) -> Self {
        Self { default, rules }
    }

    /// 只有默认响应、没有任何规则的配置
    pub fn empty() -> Self {
        Self::new(DefaultResponse::default(), Vec::new())
    }
}

/// 进程启动时的内置配置
impl Default for MockServerConfig {
    fn default() -> Self {
        Self::new(
            DefaultResponse::default(),
            vec![
                MatchRule::new(
                    "status",
                    "error",
                    400,
                    json!({"error": "Bad request due to status=error"}),
                ),
                MatchRule::new(
                    "priority",
                    "high",
                    201,
                    json!({"message": "High priority message processed"}),
                ),
                MatchRule::new(
                    "action",
                    "reject",
                    422,
                    json!({"error": "Message rejected as requested"}),
                ),
                MatchRule::new(
                    "simulate",
                    "timeout",
                    504,
                    json!({"error": "Gateway timeout simulated"}),
                ),
                MatchRule::new(
                    "simulate",
                    "server_error",
                    500,
                    json!({"error": "Internal server error simulated"}),
                ),
            ],
        )
    }
}

/// 规则引擎的评估结果：状态码 + JSON 响应体
#[derive(Debug, Clone, PartialEq)]
pub struct MockResponse {
    pub status: u16,
    pub body: Map<String, Value>,
}

/// 非对象值包一层空对象；仅供内置配置和测试构造使用
fn into_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
