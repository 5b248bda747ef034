//! 配置管理模块
//!
//! 支持配置文件加载、环境变量覆盖，以及类型安全的配置访问。
//! Kafka 连接参数沿用 `KAFKA_*` 环境变量约定，便于与 `.env` 文件共用。

use std::collections::HashMap;
use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::error::{Result, SinkError};
use crate::observability::ObservabilityConfig;

/// HTTP 服务配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub service_name: String,
    pub environment: String,
    pub server: ServerConfig,
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 加载顺序（后加载的会覆盖先加载的同名配置项）：
    /// 1. config/default.toml（默认配置）
    /// 2. config/{environment}.toml（环境特定配置）
    /// 3. 环境变量（MOCK_ 前缀，`__` 分隔层级，如 MOCK_SERVER__PORT -> server.port）
    pub fn load(service_name: &str) -> std::result::Result<Self, ConfigError> {
        let env = std::env::var("MOCK_ENV").unwrap_or_else(|_| "development".to_string());
        let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

        Self::build(
            service_name,
            &env,
            Path::new(&config_dir),
            Environment::with_prefix("MOCK")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
    }

    fn build(
        service_name: &str,
        env: &str,
        config_dir: &Path,
        environment: Environment,
    ) -> std::result::Result<Self, ConfigError> {
        let mut config: Self = Config::builder()
            .set_default("service_name", service_name)?
            .set_default("environment", env)?
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join(format!("{}.toml", env))).required(false))
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        config.observability.service_name = config.service_name.clone();
        Ok(config)
    }

    /// 获取服务监听地址
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Kafka 生产者配置
///
/// 对应环境变量：
/// - KAFKA_BOOTSTRAP_SERVERS（必需）
/// - KAFKA_TOPIC（必需）
/// - KAFKA_SASL_USERNAME / KAFKA_SASL_PASSWORD（可选，同时提供时启用 SASL）
/// - KAFKA_CLIENT_ID（可选）
/// - KAFKA_SECURITY_PROTOCOL（默认 SASL_PLAINTEXT）
/// - KAFKA_SASL_MECHANISMS（默认 PLAIN）
#[derive(Debug, Clone)]
pub struct KafkaConfig {
    pub bootstrap_servers: String,
    pub topic: String,
    pub client_id: Option<String>,
    pub security_protocol: String,
    pub sasl_mechanisms: String,
    pub sasl_username: Option<String>,
    pub sasl_password: Option<String>,
}

/// 环境变量的原始形态，全部可选，校验后再转换为 `KafkaConfig`
#[derive(Debug, Default, Deserialize)]
struct RawKafkaConfig {
    bootstrap_servers: Option<String>,
    topic: Option<String>,
    client_id: Option<String>,
    security_protocol: Option<String>,
    sasl_mechanisms: Option<String>,
    sasl_username: Option<String>,
    sasl_password: Option<String>,
}

impl KafkaConfig {
    /// 从进程环境变量加载
    pub fn from_env() -> Result<Self> {
        Self::from_environment(Environment::with_prefix("KAFKA").prefix_separator("_"))
    }

    /// 从给定的键值对加载（键名与环境变量一致，如 KAFKA_TOPIC）
    pub fn from_map(vars: HashMap<String, String>) -> Result<Self> {
        Self::from_environment(
            Environment::with_prefix("KAFKA")
                .prefix_separator("_")
                .source(Some(vars)),
        )
    }

    fn from_environment(environment: Environment) -> Result<Self> {
        let raw: RawKafkaConfig = Config::builder()
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        let bootstrap_servers = non_empty(raw.bootstrap_servers)
            .ok_or_else(|| SinkError::MissingSetting("KAFKA_BOOTSTRAP_SERVERS".to_string()))?;
        let topic = non_empty(raw.topic)
            .ok_or_else(|| SinkError::MissingSetting("KAFKA_TOPIC".to_string()))?;

        Ok(Self {
            bootstrap_servers,
            topic,
            client_id: non_empty(raw.client_id),
            security_protocol: non_empty(raw.security_protocol)
                .unwrap_or_else(|| "SASL_PLAINTEXT".to_string()),
            sasl_mechanisms: non_empty(raw.sasl_mechanisms).unwrap_or_else(|| "PLAIN".to_string()),
            sasl_username: non_empty(raw.sasl_username),
            sasl_password: non_empty(raw.sasl_password),
        })
    }

    /// 是否配置了 SASL 凭据
    pub fn has_credentials(&self) -> bool {
        self.sasl_username.is_some() && self.sasl_password.is_some()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
