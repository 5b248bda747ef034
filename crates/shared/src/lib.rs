//! 共享库
//!
//! 包含 mock 服务与测试消息生产者共用的配置、错误处理、Kafka 与可观测性基础设施代码。

pub mod config;
pub mod error;
pub mod kafka;
pub mod observability;
