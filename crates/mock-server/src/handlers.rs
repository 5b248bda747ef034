//! 路由处理器
//!
//! 健康检查、配置读取/替换，以及被测连接器实际调用的消息接收接口。

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;
use sink_shared::observability::metrics;
use tracing::{info, warn};

use crate::error::{ApiError, Result};
use crate::rules::{ConfigValidator, MockResponse, MockServerConfig, RuleEngine};
use crate::state::AppState;

/// 状态确认响应
#[derive(Debug, Serialize)]
pub struct StatusMessage {
    pub status: &'static str,
    pub message: &'static str,
}

impl StatusMessage {
    fn ok(message: &'static str) -> Json<Self> {
        Json(Self {
            status: "ok",
            message,
        })
    }
}

/// 健康检查
///
/// GET /
pub async fn health() -> Json<StatusMessage> {
    StatusMessage::ok("HTTP Mock Server is running")
}

/// 获取当前响应配置
///
/// GET /config
pub async fn get_config(State(state): State<AppState>) -> Json<MockServerConfig> {
    let snapshot = state.config.load();
    Json(snapshot.as_ref().clone())
}

/// 整体替换响应配置
///
/// POST /config
///
/// 请求体先解析为 JSON 再逐字段校验，任何失败都不会影响当前配置。
pub async fn update_config(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<StatusMessage>> {
    let document: Value = serde_json::from_slice(&body).map_err(|e| ApiError::InvalidConfig {
        field: "$".to_string(),
        reason: format!("request body is not valid JSON: {e}"),
    })?;

    let config = ConfigValidator::parse(&document)?;
    let rule_count = config.rules.len();

    state.config.replace(config);
    metrics::record_config_update(rule_count);
    info!(
        rules = rule_count,
        config = %document,
        "响应配置已更新"
    );

    Ok(StatusMessage::ok("Configuration updated successfully"))
}

/// 接收消息并按规则返回响应
///
/// POST /{*path}
///
/// 路径只记录日志，不参与匹配。
pub async fn handle_message(
    State(state): State<AppState>,
    uri: Uri,
    body: Bytes,
) -> Result<Response> {
    let path = uri.path();

    let message: Value = serde_json::from_slice(&body).map_err(|e| {
        warn!(path, error = %e, "收到非 JSON 消息");
        ApiError::MalformedJson
    })?;
    info!(path, message = %message, "收到消息");

    let config = state.config.load();
    let evaluation = RuleEngine::evaluate_detailed(&config, &message);

    match evaluation.matched {
        Some((index, rule)) => info!(
            rule_index = index,
            match_field = %rule.match_field,
            match_value = %rule.match_value,
            status = rule.response_code,
            "命中规则"
        ),
        None => info!(
            status = evaluation.response.status,
            "未命中任何规则，使用默认响应"
        ),
    }
    metrics::record_evaluation(!evaluation.is_default(), evaluation.response.status);

    json_response(&evaluation.response)
}

/// 把规则引擎的结果序列化为 HTTP 响应
fn json_response(response: &MockResponse) -> Result<Response> {
    let status = StatusCode::from_u16(response.status)
        .map_err(|e| ApiError::Internal(format!("invalid status code {}: {e}", response.status)))?;
    let body = serde_json::to_vec(&response.body)
        .map_err(|e| ApiError::Internal(format!("failed to serialize response body: {e}")))?;

    Ok((status, [(header::CONTENT_TYPE, "application/json")], body).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_health() {
        let Json(body) = health().await;
        assert_eq!(body.status, "ok");
        assert_eq!(body.message, "HTTP Mock Server is running");
    }

    #[tokio::test]
    async fn test_json_response_sets_status_and_content_type() {
        let response = json_response(&MockResponse {
            status: 418,
            body: json!({"message": "teapot"}).as_object().unwrap().clone(),
        })
        .unwrap();

        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
    }

    #[test]
    fn test_json_response_rejects_out_of_range_status() {
        let err = json_response(&MockResponse {
            status: 1000,
            body: serde_json::Map::new(),
        })
        .unwrap_err();

        assert!(matches!(err, ApiError::Internal(_)));
    }
}
