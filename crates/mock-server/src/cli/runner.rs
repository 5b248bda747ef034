//! 命令执行器
//!
//! 将命令行参数与加载好的配置合并，执行各子命令。

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use sink_shared::config::{AppConfig, KafkaConfig};
use sink_shared::kafka::KafkaPublisher;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{error, info, warn};

use crate::producer::{ProduceReport, ProducerOptions, TestProducer, load_messages_from_file};
use crate::routes::build_app;
use crate::state::AppState;

/// demo 模式下检查服务就绪的次数与间隔
const READY_ATTEMPTS: u32 = 30;
const READY_INTERVAL: Duration = Duration::from_millis(100);

pub struct CommandRunner {
    config: AppConfig,
}

impl CommandRunner {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// 执行 server 命令
    pub async fn run_server(&self, host: Option<String>, port: Option<u16>) -> Result<()> {
        let listener = self.bind(host, port).await?;
        let addr = listener.local_addr().context("读取监听地址失败")?;

        info!("HTTP mock 服务已启动: http://{}", addr);
        info!("可用端点:");
        info!("  GET  /       - 健康检查");
        info!("  GET  /config - 查看响应配置");
        info!("  POST /config - 替换响应配置");
        info!("  POST /{{*}}   - 接收消息");
        info!("按 Ctrl+C 停止服务");

        axum::serve(listener, build_app(AppState::default()))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("服务器运行失败")?;

        info!("HTTP mock 服务已停止");
        Ok(())
    }

    /// 执行 produce 命令
    pub async fn run_produce(
        &self,
        count: usize,
        delay: f64,
        message_file: Option<PathBuf>,
        topic: Option<String>,
    ) -> Result<ProduceReport> {
        let options = ProducerOptions {
            count,
            delay: parse_delay(delay)?,
            topic,
        };
        let producer = build_producer(message_file)?;

        let report = producer.run(&options).await;
        if report.is_all_success() {
            info!(sent = report.sent, "全部消息发送成功");
        } else {
            warn!(
                sent = report.sent,
                failed = report.failed,
                unflushed = report.unflushed,
                success_rate = report.success_rate(),
                "部分消息发送失败"
            );
        }
        Ok(report)
    }

    /// 执行 demo 命令
    ///
    /// 同进程启动服务，就绪后发送测试消息，然后持续服务直到 Ctrl+C。
    pub async fn run_demo(
        &self,
        host: Option<String>,
        port: Option<u16>,
        message_count: usize,
        delay: f64,
    ) -> Result<()> {
        let delay = parse_delay(delay)?;
        let listener = self.bind(host, port).await?;
        let addr = listener.local_addr().context("读取监听地址失败")?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(async move {
            axum::serve(listener, build_app(AppState::default()))
                .with_graceful_shutdown(async move {
                    shutdown_rx.await.ok();
                })
                .await
        });
        info!("HTTP mock 服务已启动: http://{}", addr);

        if !wait_until_ready(addr).await {
            warn!(%addr, "服务未就绪，继续发送消息");
        }

        info!(count = message_count, "开始发送测试消息");
        let produced = match build_producer(None) {
            Ok(producer) => {
                let options = ProducerOptions {
                    count: message_count,
                    delay,
                    topic: None,
                };
                Ok(producer.run(&options).await)
            }
            Err(e) => Err(e),
        };

        match &produced {
            Ok(report) => {
                info!(sent = report.sent, failed = report.failed, "测试消息发送完成");
                info!("按 Ctrl+C 停止服务");
                shutdown_signal().await;
            }
            Err(e) => error!(error = %e, "测试消息发送失败，停止服务"),
        }

        shutdown_tx.send(()).ok();
        server
            .await
            .context("服务任务异常退出")?
            .context("服务器运行失败")?;
        info!("HTTP mock 服务已停止");

        produced.map(|_| ())
    }

    /// 绑定监听地址，命令行参数优先于配置
    async fn bind(&self, host: Option<String>, port: Option<u16>) -> Result<TcpListener> {
        let mut config = self.config.clone();
        if let Some(host) = host {
            config.server.host = host;
        }
        if let Some(port) = port {
            config.server.port = port;
        }
        let addr = config.server_addr();

        TcpListener::bind(&addr)
            .await
            .with_context(|| format!("绑定地址失败: {}", addr))
    }
}

/// 秒数转为 `Duration`，拒绝负数与非有限值
fn parse_delay(seconds: f64) -> Result<Duration> {
    if !seconds.is_finite() || seconds < 0.0 {
        bail!("delay 必须是非负秒数: {}", seconds);
    }
    Ok(Duration::from_secs_f64(seconds))
}

fn build_producer(message_file: Option<PathBuf>) -> Result<TestProducer> {
    let kafka_config = KafkaConfig::from_env().context("读取 Kafka 配置失败")?;
    let publisher = KafkaPublisher::new(&kafka_config).context("创建 Kafka 生产者失败")?;
    info!(
        brokers = %kafka_config.bootstrap_servers,
        topic = %kafka_config.topic,
        "Kafka 生产者已创建"
    );

    let producer = match message_file {
        Some(path) => TestProducer::with_templates(Arc::new(publisher), load_messages_from_file(path)),
        None => TestProducer::new(Arc::new(publisher)),
    };
    Ok(producer)
}

/// 轮询健康检查接口直到服务可用
async fn wait_until_ready(addr: SocketAddr) -> bool {
    let url = format!("http://{}/", loopback_addr(addr));
    let client = reqwest::Client::new();

    for attempt in 1..=READY_ATTEMPTS {
        match client.get(&url).send().await {
            Ok(response) if response.status().is_success() => return true,
            Ok(response) => warn!(attempt, status = %response.status(), "服务尚未就绪"),
            Err(e) => warn!(attempt, error = %e, "服务尚未就绪"),
        }
        tokio::time::sleep(READY_INTERVAL).await;
    }
    false
}

/// 监听在通配地址时改用回环地址访问
fn loopback_addr(addr: SocketAddr) -> SocketAddr {
    match addr.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => {
            SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), addr.port())
        }
        IpAddr::V6(ip) if ip.is_unspecified() => {
            SocketAddr::new(IpAddr::V6(std::net::Ipv6Addr::LOCALHOST), addr.port())
        }
        _ => addr,
    }
}

/// 等待 Ctrl+C
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "安装 CTRL+C 信号处理器失败");
        std::future::pending::<()>().await;
    }
    info!("收到关闭信号，正在停止服务...");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_delay() {
        assert_eq!(parse_delay(0.5).unwrap(), Duration::from_millis(500));
        assert_eq!(parse_delay(0.0).unwrap(), Duration::ZERO);
        assert!(parse_delay(-1.0).is_err());
        assert!(parse_delay(f64::NAN).is_err());
        assert!(parse_delay(f64::INFINITY).is_err());
    }

    #[test]
    fn test_loopback_addr() {
        let wildcard: SocketAddr = "0.0.0.0:8000".parse().unwrap();
        assert_eq!(loopback_addr(wildcard), "127.0.0.1:8000".parse().unwrap());

        let wildcard_v6: SocketAddr = "[::]:8000".parse().unwrap();
        assert_eq!(loopback_addr(wildcard_v6), "[::1]:8000".parse().unwrap());

        let concrete: SocketAddr = "10.0.0.5:8000".parse().unwrap();
        assert_eq!(loopback_addr(concrete), concrete);
    }

    #[tokio::test]
    async fn test_bind_prefers_cli_arguments() {
        let runner = CommandRunner::new(AppConfig::default());
        let listener = runner
            .bind(Some("127.0.0.1".to_string()), Some(0))
            .await
            .unwrap();

        let addr = listener.local_addr().unwrap();
        assert_eq!(addr.ip(), IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_ne!(addr.port(), 0);
    }

    #[tokio::test]
    async fn test_wait_until_ready() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, build_app(AppState::default()))
                .await
                .ok();
        });

        assert!(wait_until_ready(addr).await);
    }
}
