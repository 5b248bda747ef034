//! 响应配置存储
//!
//! 进程内唯一的可热替换配置。使用 `ArcSwap` 持有不可变快照：
//! 读取是一次原子 load，替换是整体 store，评估过程中看到的永远是某一个完整版本。

use std::sync::Arc;

use arc_swap::ArcSwap;

use super::models::MockServerConfig;

/// 配置存储
#[derive(Clone)]
pub struct ConfigStore {
    current: Arc<ArcSwap<MockServerConfig>>,
}

impl ConfigStore {
    /// 用初始配置创建存储
    pub fn new(config: MockServerConfig) -> Self {
        Self {
            current: Arc::new(ArcSwap::from_pointee(config)),
        }
    }

    /// 获取当前配置快照
    pub fn load(&self) -> Arc<MockServerConfig> {
        self.current.load_full()
    }

    /// 整体替换配置
    ///
    /// 返回被替换掉的旧快照。
    pub fn replace(&self, config: MockServerConfig) -> Arc<MockServerConfig> {
        self.current.swap(Arc::new(config))
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(MockServerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::models::{DefaultResponse, MatchRule};
    use serde_json::json;

    #[test]
    fn test_starts_with_builtin_config() {
        let store = ConfigStore::default();
        assert_eq!(*store.load(), MockServerConfig::default());
    }

    #[test]
    fn test_replace_is_total() {
        let store = ConfigStore::default();
        let replacement = MockServerConfig::new(
            DefaultResponse::default(),
            vec![MatchRule::new("custom", "test", 418, json!({"message": "teapot"}))],
        );

        let previous = store.replace(replacement.clone());

        assert_eq!(*previous, MockServerConfig::default());
        assert_eq!(*store.load(), replacement);
    }

    #[test]
    fn test_snapshot_is_unaffected_by_replace() {
        let store = ConfigStore::default();
        let snapshot = store.load();

        store.replace(MockServerConfig::empty());

        assert_eq!(snapshot.rules.len(), 5);
        assert!(store.load().rules.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_readers_see_whole_snapshots() {
        let store = ConfigStore::default();
        let a = MockServerConfig::default();
        let b = MockServerConfig::new(
            DefaultResponse {
                response_code: 202,
                response_body: serde_json::Map::new(),
            },
            Vec::new(),
        );

        let reader = {
            let store = store.clone();
            let (a, b) = (a.clone(), b.clone());
            tokio::spawn(async move {
                for _ in 0..1_000 {
                    let snapshot = store.load();
                    assert!(*snapshot == a || *snapshot == b);
                    tokio::task::yield_now().await;
                }
            })
        };

        for i in 0..1_000 {
            store.replace(if i % 2 == 0 { b.clone() } else { a.clone() });
            tokio::task::yield_now().await;
        }

        reader.await.unwrap();
    }
}
