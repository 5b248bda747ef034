//! CLI 模块
//!
//! - `server` - 启动 HTTP mock 服务
//! - `produce` - 向 Kafka 发送测试消息
//! - `demo` - 同进程启动服务并发送测试消息
//!
//! # 使用示例
//!
//! ```bash
//! http-mock server --port 8000
//! http-mock produce --count 20 --delay 0.2 --message-file messages.json
//! http-mock --log-level debug demo --message-count 5
//! ```

pub mod commands;
pub mod runner;

pub use commands::{Cli, Commands};
pub use runner::CommandRunner;
