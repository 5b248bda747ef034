//! 应用状态定义
//!
//! 包含 Axum 路由共享的应用状态

use crate::rules::{ConfigStore, MockServerConfig};

/// Axum 应用共享状态
///
/// 唯一的共享可变资源是响应配置，Clone 只复制内部的 Arc。
#[derive(Clone, Default)]
pub struct AppState {
    pub config: ConfigStore,
}

impl AppState {
    /// 用指定的初始配置创建状态
    pub fn new(config: MockServerConfig) -> Self {
        Self {
            config: ConfigStore::new(config),
        }
    }
}
