//! 响应规则
//!
//! - `models`: 规则与配置的数据模型、内置默认配置
//! - `engine`: 顺序扫描、首条命中的规则引擎
//! - `validator`: `/config` 文档的逐字段校验
//! - `store`: 可原子替换的配置快照

pub mod engine;
pub mod models;
pub mod store;
pub mod validator;

pub use engine::{Evaluation, RuleEngine, json_equal};
pub use models::{DefaultResponse, MatchRule, MockResponse, MockServerConfig};
pub use store::ConfigStore;
pub use validator::{ConfigValidator, ConfigViolation};
