//! HTTP 层错误类型
//!
//! 三类错误都在 HTTP 层终结，不做内部重试；由被测连接器根据状态码自行决定重试策略。

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::rules::ConfigViolation;

/// intake 接口对非 JSON 请求体的固定响应
pub const INVALID_JSON_MESSAGE: &str = "Invalid JSON format";

/// 配置校验失败时响应体中的错误类别
pub const INVALID_CONFIG_KIND: &str = "invalid configuration shape";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("请求体不是合法的 JSON")]
    MalformedJson,

    #[error("配置格式无效: {field} - {reason}")]
    InvalidConfig { field: String, reason: String },

    #[error("内部错误: {0}")]
    Internal(String),
}

impl ApiError {
    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MalformedJson => StatusCode::BAD_REQUEST,
            Self::InvalidConfig { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> serde_json::Value {
        match self {
            Self::MalformedJson => json!({ "error": INVALID_JSON_MESSAGE }),
            Self::InvalidConfig { field, reason } => json!({
                "error": INVALID_CONFIG_KIND,
                "field": field,
                "message": reason,
            }),
            Self::Internal(message) => json!({ "error": format!("Server error: {message}") }),
        }
    }
}

impl From<ConfigViolation> for ApiError {
    fn from(violation: ConfigViolation) -> Self {
        Self::InvalidConfig {
            field: violation.field,
            reason: violation.reason,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Internal(message) => tracing::error!(error = %message, "处理请求失败"),
            other => tracing::debug!(error = %other, "请求被拒绝"),
        }

        // 固定的小 JSON 对象，序列化不会失败
        let body = self.body().to_string();
        (
            self.status_code(),
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response()
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn read(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_malformed_json_response() {
        let (status, body) = read(ApiError::MalformedJson).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Invalid JSON format"}));
    }

    #[tokio::test]
    async fn test_invalid_config_response() {
        let err: ApiError = ConfigViolation {
            field: "configurations[0].response_code".to_string(),
            reason: "expected an integer".to_string(),
        }
        .into();

        let (status, body) = read(err).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body,
            json!({
                "error": "invalid configuration shape",
                "field": "configurations[0].response_code",
                "message": "expected an integer"
            })
        );
    }

    #[tokio::test]
    async fn test_internal_response() {
        let (status, body) = read(ApiError::Internal("boom".to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Server error: boom"}));
    }
}
