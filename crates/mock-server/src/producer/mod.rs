//! 测试消息生产者
//!
//! - `messages`: 默认模板、文件加载与单条消息构造
//! - `publisher`: 发布接口及其 Kafka 实现
//! - `runner`: 循环发送与结果汇总

pub mod messages;
pub mod publisher;
pub mod runner;

pub use messages::{build_message, default_messages, load_messages_from_file};
pub use publisher::{MessagePublisher, OutboundMessage};
pub use runner::{FLUSH_TIMEOUT, ProduceReport, ProducerOptions, TestProducer};
