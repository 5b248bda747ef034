//! 统一错误处理模块
//!
//! 定义 mock 服务与测试生产者共用的错误类型，使用 thiserror 提供良好的错误信息。

use thiserror::Error;

/// 共享错误类型
#[derive(Debug, Error)]
pub enum SinkError {
    // ==================== 配置错误 ====================
    #[error("配置加载失败: {0}")]
    Config(#[from] config::ConfigError),

    #[error("缺少必需的配置项: {0}")]
    MissingSetting(String),

    // ==================== Kafka 错误 ====================
    #[error("Kafka 错误: {0}")]
    Kafka(String),

    #[error("消息投递失败: topic={topic} - {message}")]
    Delivery { topic: String, message: String },

    // ==================== 数据错误 ====================
    #[error("序列化失败: {0}")]
    Serialization(#[from] serde_json::Error),

    // ==================== 通用错误 ====================
    #[error("内部错误: {0}")]
    Internal(String),
}

/// 错误结果类型别名
pub type Result<T> = std::result::Result<T, SinkError>;

impl SinkError {
    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::MissingSetting(_) => "MISSING_SETTING",
            Self::Kafka(_) => "KAFKA_ERROR",
            Self::Delivery { .. } => "DELIVERY_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 是否为可重试错误（Kafka 连接与投递类）
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Kafka(_) | Self::Delivery { .. })
    }
}
