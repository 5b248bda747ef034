//! 测试生产者
//!
//! 按模板循环生成消息并逐条发布，单条失败只计数不中断，最后统一 flush。

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use sink_shared::observability::metrics;
use tracing::{error, info, warn};

use super::messages::{build_message, default_messages};
use super::publisher::MessagePublisher;

/// 发送结束后等待在途消息确认的时长
pub const FLUSH_TIMEOUT: Duration = Duration::from_secs(10);

/// 一次生产任务的参数
#[derive(Debug, Clone)]
pub struct ProducerOptions {
    pub count: usize,
    /// 两条消息之间的间隔，最后一条之后不等待
    pub delay: Duration,
    /// 不指定时使用发布器的默认 topic
    pub topic: Option<String>,
}

impl Default for ProducerOptions {
    fn default() -> Self {
        Self {
            count: 10,
            delay: Duration::from_millis(500),
            topic: None,
        }
    }
}

/// 生产结果汇总
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProduceReport {
    pub total: usize,
    pub sent: usize,
    pub failed: usize,
    pub errors: Vec<String>,
    /// flush 超时后仍未确认的消息数
    pub unflushed: usize,
}

impl ProduceReport {
    pub fn is_all_success(&self) -> bool {
        self.failed == 0 && self.unflushed == 0
    }

    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.sent as f64 / self.total as f64
    }
}

pub struct TestProducer {
    publisher: Arc<dyn MessagePublisher>,
    templates: Vec<Value>,
}

impl TestProducer {
    /// 使用默认模板
    pub fn new(publisher: Arc<dyn MessagePublisher>) -> Self {
        Self::with_templates(publisher, default_messages())
    }

    /// 使用自定义模板，空列表时退回默认模板
    pub fn with_templates(publisher: Arc<dyn MessagePublisher>, templates: Vec<Value>) -> Self {
        let templates = if templates.is_empty() {
            default_messages()
        } else {
            templates
        };
        Self {
            publisher,
            templates,
        }
    }

    pub fn templates(&self) -> &[Value] {
        &self.templates
    }

    /// 发送 `options.count` 条测试消息
    pub async fn run(&self, options: &ProducerOptions) -> ProduceReport {
        let mut report = ProduceReport {
            total: options.count,
            ..Default::default()
        };
        info!(count = options.count, delay = ?options.delay, "开始发送测试消息");

        for index in 0..options.count {
            let timestamp = chrono::Utc::now().timestamp();
            let message = build_message(
                &self.templates,
                index,
                timestamp,
                options.topic.as_deref(),
            );

            match self.publisher.publish(&message).await {
                Ok(delivery) => {
                    report.sent += 1;
                    metrics::record_publish(true);
                    info!(
                        seq = index + 1,
                        key = message.key.as_deref().unwrap_or_default(),
                        topic = %delivery.topic,
                        partition = delivery.partition,
                        offset = delivery.offset,
                        "消息已投递"
                    );
                }
                Err(e) => {
                    report.failed += 1;
                    report.errors.push(e.to_string());
                    metrics::record_publish(false);
                    error!(
                        seq = index + 1,
                        code = e.code(),
                        retryable = e.is_retryable(),
                        error = %e,
                        "消息投递失败"
                    );
                }
            }

            if index + 1 < options.count && !options.delay.is_zero() {
                tokio::time::sleep(options.delay).await;
            }
        }

        match self.publisher.flush(FLUSH_TIMEOUT).await {
            Ok(0) => {}
            Ok(remaining) => {
                report.unflushed = remaining;
                warn!(remaining, "flush 超时，仍有消息未确认");
            }
            Err(e) => {
                report.errors.push(e.to_string());
                error!(error = %e, "flush 失败");
            }
        }

        info!(
            total = report.total,
            sent = report.sent,
            failed = report.failed,
            unflushed = report.unflushed,
            "测试消息发送完成"
        );
        report
    }
}
