//! HTTP Mock Server
//!
//! 用于测试 HTTP sink 连接器的 mock 端点：按可在运行时替换的规则，
//! 对收到的 JSON 消息返回预设的状态码与响应体。另附一个向 Kafka
//! 发送测试消息的生产者，用于端到端演练。
//!
//! # 主要模块
//!
//! - `rules`: 规则模型、规则引擎、配置校验与配置快照
//! - `handlers` / `routes`: HTTP 接口
//! - `producer`: Kafka 测试消息生产者
//! - `cli`: 命令行入口
//!
//! # 使用示例
//!
//! ```rust
//! use http_mock::rules::{MockServerConfig, RuleEngine};
//! use serde_json::json;
//!
//! let config = MockServerConfig::default();
//! let response = RuleEngine::evaluate(&config, &json!({"status": "error"}));
//! assert_eq!(response.status, 400);
//! ```

pub mod cli;
pub mod error;
pub mod handlers;
pub mod producer;
pub mod routes;
pub mod rules;
pub mod state;
