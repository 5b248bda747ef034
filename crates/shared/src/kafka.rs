//! Kafka 基础设施封装
//!
//! 将 rdkafka 的 `FutureProducer` 封装为面向测试工具的消息发布器：
//! JSON 序列化、消息 key 与 header 附加、topic 覆盖，以及可上报剩余条数的 flush。
//! 生产者配置为 `acks=all` 并开启重试，投递语义为至少一次。

use std::collections::HashMap;
use std::time::Duration;

use rdkafka::config::ClientConfig;
use rdkafka::message::{Header, OwnedHeaders};
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::KafkaConfig;
use crate::error::{Result, SinkError};

/// 单条消息入队等待的上限
const QUEUE_TIMEOUT: Duration = Duration::from_secs(5);

/// 一条已被 broker 确认的消息的位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
}

/// Kafka 消息发布器
///
/// 内部的 `FutureProducer` 是 Arc 包装的，Clone 代价很低。
#[derive(Clone)]
pub struct KafkaPublisher {
    producer: FutureProducer,
    default_topic: String,
}

impl KafkaPublisher {
    /// 根据配置创建发布器
    pub fn new(config: &KafkaConfig) -> Result<Self> {
        let producer: FutureProducer = Self::client_config(config)
            .create()
            .map_err(|e| SinkError::Kafka(format!("创建生产者失败: {e}")))?;

        info!(
            brokers = %config.bootstrap_servers,
            topic = %config.topic,
            sasl = config.has_credentials(),
            "Kafka 生产者已初始化"
        );

        Ok(Self {
            producer,
            default_topic: config.topic.clone(),
        })
    }

    /// 构建 librdkafka 客户端配置
    ///
    /// 仅在用户名和密码同时存在时才写入安全协议相关参数，
    /// 方便对接本地无认证的 broker。
    pub fn client_config(config: &KafkaConfig) -> ClientConfig {
        let mut client = ClientConfig::new();
        client
            .set("bootstrap.servers", &config.bootstrap_servers)
            .set("acks", "all")
            .set("retries", "5")
            .set("retry.backoff.ms", "500")
            .set("socket.keepalive.enable", "true");

        if let Some(client_id) = &config.client_id {
            client.set("client.id", client_id);
        }

        if let (Some(username), Some(password)) = (&config.sasl_username, &config.sasl_password) {
            client
                .set("security.protocol", &config.security_protocol)
                .set("sasl.mechanisms", &config.sasl_mechanisms)
                .set("sasl.username", username)
                .set("sasl.password", password);
        }

        client
    }

    /// 默认 topic
    pub fn default_topic(&self) -> &str {
        &self.default_topic
    }

    /// 发布一条 JSON 消息并等待 broker 确认
    ///
    /// `topic` 为空时使用配置中的默认 topic。
    pub async fn publish(
        &self,
        message: &Value,
        key: Option<&str>,
        headers: Option<&HashMap<String, String>>,
        topic: Option<&str>,
    ) -> Result<DeliveryReport> {
        let topic = topic.unwrap_or(&self.default_topic);
        let payload = serde_json::to_vec(message)?;

        let mut record: FutureRecord<'_, str, Vec<u8>> = FutureRecord::to(topic).payload(&payload);
        if let Some(key) = key {
            record = record.key(key);
        }
        if let Some(headers) = headers {
            record = record.headers(to_owned_headers(headers));
        }

        let delivery = self
            .producer
            .send(record, QUEUE_TIMEOUT)
            .await
            .map_err(|(e, _)| SinkError::Delivery {
                topic: topic.to_string(),
                message: e.to_string(),
            })?;

        debug!(
            topic,
            key,
            partition = delivery.partition,
            offset = delivery.offset,
            "消息已投递"
        );

        Ok(DeliveryReport {
            topic: topic.to_string(),
            partition: delivery.partition,
            offset: delivery.offset,
        })
    }

    /// 等待所有在途消息被确认，返回超时后仍未确认的条数
    ///
    /// librdkafka 的 flush 是阻塞调用，放到 blocking 线程池里执行。
    pub async fn flush(&self, timeout: Duration) -> Result<usize> {
        let producer = self.producer.clone();
        let remaining = tokio::task::spawn_blocking(move || {
            if let Err(e) = producer.flush(timeout) {
                debug!(error = %e, "flush 未在超时内完成");
            }
            producer.in_flight_count().max(0) as usize
        })
        .await
        .map_err(|e| SinkError::Internal(format!("flush 任务异常退出: {e}")))?;

        if remaining > 0 {
            warn!(remaining, "超时后仍有消息未被确认");
        } else {
            info!("所有消息已确认");
        }
        Ok(remaining)
    }
}

/// 将字符串 header 转换为 rdkafka 的 header 集合
fn to_owned_headers(headers: &HashMap<String, String>) -> OwnedHeaders {
    headers
        .iter()
        .fold(OwnedHeaders::new_with_capacity(headers.len()), |acc, (k, v)| {
            acc.insert(Header {
                key: k.as_str(),
                value: Some(v.as_str()),
            })
        })
}

// ---------------------------------------------------------------------------
// 测试
// ---------------------------------------------------------------------------
