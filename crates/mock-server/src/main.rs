//! HTTP Mock Server CLI

use anyhow::Context;
use clap::Parser;
use http_mock::cli::{Cli, CommandRunner, Commands};
use sink_shared::config::AppConfig;
use sink_shared::observability;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 不存在时忽略
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = AppConfig::load("http-mock-server").context("加载配置失败")?;
    if let Some(level) = &cli.log_level {
        config.observability.log_level = level.clone();
    }
    let _guard = observability::init(&config.observability)
        .await
        .context("初始化可观测性失败")?;

    let runner = CommandRunner::new(config);

    match cli.command {
        Commands::Server { host, port } => {
            runner.run_server(host, port).await?;
        }
        Commands::Produce {
            count,
            delay,
            message_file,
            topic,
        } => {
            runner.run_produce(count, delay, message_file, topic).await?;
        }
        Commands::Demo {
            host,
            port,
            message_count,
            delay,
        } => {
            runner.run_demo(host, port, message_count, delay).await?;
        }
    }

    Ok(())
}
