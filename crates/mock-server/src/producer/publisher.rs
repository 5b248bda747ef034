//! 消息发布抽象
//!
//! 测试生产者只依赖 `MessagePublisher`，Kafka 实现与测试用的 mock 可以互换。

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sink_shared::error::SinkError;
use sink_shared::kafka::{DeliveryReport, KafkaPublisher};

/// 待发布的一条消息
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    pub payload: Value,
    pub key: Option<String>,
    pub headers: HashMap<String, String>,
    /// 覆盖发布器的默认 topic
    pub topic: Option<String>,
}

/// 消息发布接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePublisher: Send + Sync {
    /// 发布一条消息并等待确认
    async fn publish(&self, message: &OutboundMessage) -> Result<DeliveryReport, SinkError>;

    /// 等待在途消息确认，返回超时后仍未确认的条数
    async fn flush(&self, timeout: Duration) -> Result<usize, SinkError>;
}

#[async_trait]
impl MessagePublisher for KafkaPublisher {
    async fn publish(&self, message: &OutboundMessage) -> Result<DeliveryReport, SinkError> {
        let headers = (!message.headers.is_empty()).then_some(&message.headers);
        KafkaPublisher::publish(
            self,
            &message.payload,
            message.key.as_deref(),
            headers,
            message.topic.as_deref(),
        )
        .await
    }

    async fn flush(&self, timeout: Duration) -> Result<usize, SinkError> {
        KafkaPublisher::flush(self, timeout).await
    }
}
