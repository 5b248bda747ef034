//! 配置校验
//!
//! 把 `/config` 收到的 JSON 文档逐字段校验并转换为 `MockServerConfig`。
//! 任何一个字段不合法都整体拒绝，并指出具体字段路径（如 `configurations[1].response_code`）。

use serde_json::{Map, Value};
use thiserror::Error;

use super::models::{DefaultResponse, MatchRule, MockServerConfig};

/// 合法的 HTTP 状态码范围
const STATUS_RANGE: std::ops::RangeInclusive<u64> = 100..=599;

/// 配置文档中的单个违规字段
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct ConfigViolation {
    pub field: String,
    pub reason: String,
}

impl ConfigViolation {
    fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

type Result<T> = std::result::Result<T, ConfigViolation>;

/// 配置校验器
pub struct ConfigValidator;

impl ConfigValidator {
    /// 校验并构建配置
    ///
    /// - `default` 缺省时使用内置默认响应
    /// - `configurations`（或别名 `rules`）缺省时为空列表
    /// - 未知字段忽略
    pub fn parse(document: &Value) -> Result<MockServerConfig> {
        let root = document
            .as_object()
            .ok_or_else(|| ConfigViolation::new("$", "expected a JSON object"))?;

        let default = match root.get("default") {
            Some(value) => Self::parse_default(value)?,
            None => DefaultResponse::default(),
        };

        let (key, rules) = match (root.get("configurations"), root.get("rules")) {
            (Some(rules), _) => ("configurations", rules),
            (None, Some(rules)) => ("rules", rules),
            (None, None) => return Ok(MockServerConfig::new(default, Vec::new())),
        };

        let items = rules
            .as_array()
            .ok_or_else(|| ConfigViolation::new(key, "expected an array of rules"))?;

        let rules = items
            .iter()
            .enumerate()
            .map(|(i, item)| Self::parse_rule(item, &format!("{key}[{i}]")))
            .collect::<Result<Vec<_>>>()?;

        Ok(MockServerConfig::new(default, rules))
    }

    fn parse_default(value: &Value) -> Result<DefaultResponse> {
        let fields = expect_object(value, "default")?;
        Ok(DefaultResponse {
            response_code: parse_status(fields, "default")?,
            response_body: parse_body(fields, "default")?,
        })
    }

    fn parse_rule(value: &Value, path: &str) -> Result<MatchRule> {
        let fields = expect_object(value, path)?;

        let match_field = match fields.get("match_field") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(Value::String(_)) => {
                return Err(ConfigViolation::new(
                    format!("{path}.match_field"),
                    "must not be empty",
                ));
            }
            Some(_) => {
                return Err(ConfigViolation::new(
                    format!("{path}.match_field"),
                    "expected a string",
                ));
            }
            None => return Err(missing(path, "match_field")),
        };

        let match_value = fields
            .get("match_value")
            .cloned()
            .ok_or_else(|| missing(path, "match_value"))?;

        Ok(MatchRule {
            match_field,
            match_value,
            response_code: parse_status(fields, path)?,
            response_body: parse_body(fields, path)?,
        })
    }
}

fn expect_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| ConfigViolation::new(path, "expected a JSON object"))
}

fn missing(path: &str, field: &str) -> ConfigViolation {
    ConfigViolation::new(format!("{path}.{field}"), "field required")
}

fn parse_status(fields: &Map<String, Value>, path: &str) -> Result<u16> {
    let value = fields
        .get("response_code")
        .ok_or_else(|| missing(path, "response_code"))?;

    let field = format!("{path}.response_code");
    let code = value
        .as_u64()
        .ok_or_else(|| ConfigViolation::new(&field, "expected an integer"))?;

    if !STATUS_RANGE.contains(&code) {
        return Err(ConfigViolation::new(
            field,
            format!("{code} is not a valid HTTP status code (100-599)"),
        ));
    }
    Ok(code as u16)
}

fn parse_body(fields: &Map<String, Value>, path: &str) -> Result<Map<String, Value>> {
    match fields.get("response_body") {
        Some(Value::Object(body)) => Ok(body.clone()),
        Some(_) => Err(ConfigViolation::new(
            format!("{path}.response_body"),
            "expected a JSON object",
        )),
        None => Err(missing(path, "response_body")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rule(code: Value) -> Value {
        json!({
            "match_field": "custom",
            "match_value": "test",
            "response_code": code,
            "response_body": {"message": "teapot"}
        })
    }

    #[test]
    fn test_parse_full_document() {
        let document = json!({
            "default": {"response_code": 202, "response_body": {"message": "x"}},
            "configurations": [rule(json!(418))]
        });

        let config = ConfigValidator::parse(&document).unwrap();
        assert_eq!(config.default.response_code, 202);
        assert_eq!(config.rules.len(), 1);
        assert_eq!(config.rules[0].response_code, 418);

        // 序列化回去与输入一致
        assert_eq!(serde_json::to_value(&config).unwrap(), document);
    }

    #[test]
    fn test_parse_defaults_when_sections_missing() {
        let config = ConfigValidator::parse(&json!({})).unwrap();
        assert_eq!(config, MockServerConfig::empty());
    }

    #[test]
    fn test_parse_rules_alias() {
        let config = ConfigValidator::parse(&json!({"rules": [rule(json!(409))]})).unwrap();
        assert_eq!(config.rules[0].response_code, 409);
    }

    #[test]
    fn test_null_match_value_is_allowed() {
        let mut item = rule(json!(400));
        item["match_value"] = Value::Null;
        let config = ConfigValidator::parse(&json!({"configurations": [item]})).unwrap();
        assert_eq!(config.rules[0].match_value, Value::Null);
    }

    #[test]
    fn test_violations_name_the_field() {
        let mut missing_value = rule(json!(400));
        missing_value.as_object_mut().unwrap().remove("match_value");

        let cases = vec![
            (json!([]), "$"),
            (json!({"default": "ok"}), "default"),
            (json!({"default": {"response_body": {}}}), "default.response_code"),
            (json!({"default": {"response_code": 200}}), "default.response_body"),
            (json!({"default": {"response_code": 200, "response_body": []}}), "default.response_body"),
            (json!({"configurations": {}}), "configurations"),
            (json!({"rules": "x"}), "rules"),
            (json!({"configurations": [1]}), "configurations[0]"),
            (json!({"configurations": [rule(json!(200)), rule(json!("418"))]}), "configurations[1].response_code"),
            (json!({"configurations": [rule(json!(99))]}), "configurations[0].response_code"),
            (json!({"configurations": [rule(json!(600))]}), "configurations[0].response_code"),
            (json!({"configurations": [rule(json!(-1))]}), "configurations[0].response_code"),
            (json!({"configurations": [rule(json!(200.5))]}), "configurations[0].response_code"),
            (json!({"configurations": [missing_value]}), "configurations[0].match_value"),
        ];

        for (document, field) in cases {
            let err = ConfigValidator::parse(&document).unwrap_err();
            assert_eq!(err.field, field, "document: {document}");
        }
    }

    #[test]
    fn test_match_field_must_be_non_empty_string() {
        let mut empty = rule(json!(400));
        empty["match_field"] = json!("");
        let err = ConfigValidator::parse(&json!({"configurations": [empty]})).unwrap_err();
        assert_eq!(err.field, "configurations[0].match_field");
        assert_eq!(err.reason, "must not be empty");

        let mut number = rule(json!(400));
        number["match_field"] = json!(5);
        let err = ConfigValidator::parse(&json!({"configurations": [number]})).unwrap_err();
        assert_eq!(err.reason, "expected a string");
    }

    #[test]
    fn test_duplicate_rules_are_kept() {
        let config = ConfigValidator::parse(&json!({
            "configurations": [rule(json!(418)), rule(json!(419))]
        }))
        .unwrap();
        assert_eq!(config.rules.len(), 2);
    }
}
