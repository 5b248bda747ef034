//! 规则引擎
//!
//! 按顺序扫描规则，返回第一条命中规则的响应，没有命中则返回默认响应。
//! 评估是纯函数：不修改配置、不做 I/O、不会失败。

use serde_json::{Number, Value};

use super::models::{MatchRule, MockResponse, MockServerConfig};

/// 一次评估的详细结果
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation<'a> {
    pub response: MockResponse,
    /// 命中规则在列表中的下标与规则本身，`None` 表示走默认响应
    pub matched: Option<(usize, &'a MatchRule)>,
}

impl Evaluation<'_> {
    pub fn is_default(&self) -> bool {
        self.matched.is_none()
    }
}

/// 规则引擎
pub struct RuleEngine;

impl RuleEngine {
    /// 评估入站消息，返回应答的状态码和响应体
    pub fn evaluate(config: &MockServerConfig, message: &Value) -> MockResponse {
        Self::evaluate_detailed(config, message).response
    }

    /// 评估入站消息，同时返回命中的规则
    pub fn evaluate_detailed<'a>(config: &'a MockServerConfig, message: &Value) -> Evaluation<'a> {
        match Self::find_match(config, message) {
            Some((index, rule)) => Evaluation {
                response: rule.response(),
                matched: Some((index, rule)),
            },
            None => Evaluation {
                response: config.default.response(),
                matched: None,
            },
        }
    }

    /// 查找第一条命中的规则
    ///
    /// 只有对象形态的消息才可能命中；数组、标量一律返回 `None`。
    pub fn find_match<'a>(
        config: &'a MockServerConfig,
        message: &Value,
    ) -> Option<(usize, &'a MatchRule)> {
        let fields = message.as_object()?;

        config
            .rules
            .iter()
            .enumerate()
            .find(|(_, rule)| Self::matches(rule, fields))
    }

    /// 字段存在且值严格相等（同一 JSON 类型、同一值，不做类型转换）
    fn matches(rule: &MatchRule, fields: &serde_json::Map<String, Value>) -> bool {
        fields
            .get(&rule.match_field)
            .is_some_and(|value| json_equal(value, &rule.match_value))
    }
}

/// JSON 值相等
///
/// 字符串、布尔、null 要求同类型同值；数字按数值比较，`100`、`100.0`、`1e2` 相等。
/// 数组逐元素、对象逐键递归比较。
pub fn json_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => numbers_equal(a, b),
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| json_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, x)| b.get(key).is_some_and(|y| json_equal(x, y)))
        }
        _ => left == right,
    }
}

fn numbers_equal(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    // 一边是负整数、另一边超出 i64 的正整数
    if a.is_i64() && b.is_u64() || a.is_u64() && b.is_i64() {
        return false;
    }
    a.as_f64() == b.as_f64()
}
