//! CLI 命令定义

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// HTTP mock 服务命令行工具
///
/// 用于测试 HTTP sink 连接器：可配置响应的 mock 端点，外加 Kafka 测试消息生产者。
#[derive(Parser, Debug)]
#[command(name = "http-mock")]
#[command(version, about = "HTTP sink 连接器测试工具")]
#[command(propagate_version = true)]
pub struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)，覆盖配置文件
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 启动 mock 服务
    ///
    /// 未指定的参数取自配置文件或 MOCK_SERVER__HOST / MOCK_SERVER__PORT。
    Server {
        /// 监听地址
        #[arg(long)]
        host: Option<String>,

        /// 监听端口
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// 向 Kafka 发送测试消息
    ///
    /// 连接参数读取 KAFKA_* 环境变量。
    Produce {
        /// 发送条数
        #[arg(short, long, default_value = "10")]
        count: usize,

        /// 两条消息之间的间隔（秒）
        #[arg(short, long, default_value = "0.5")]
        delay: f64,

        /// 消息模板文件（JSON 数组）
        #[arg(short, long)]
        message_file: Option<PathBuf>,

        /// 覆盖 KAFKA_TOPIC
        #[arg(short, long)]
        topic: Option<String>,
    },

    /// 启动服务后发送测试消息，Ctrl+C 退出
    Demo {
        /// 监听地址
        #[arg(long)]
        host: Option<String>,

        /// 监听端口
        #[arg(short, long)]
        port: Option<u16>,

        /// 发送条数
        #[arg(long, default_value = "10")]
        message_count: usize,

        /// 两条消息之间的间隔（秒）
        #[arg(short, long, default_value = "1.0")]
        delay: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_server() {
        let cli = Cli::parse_from(["http-mock", "server"]);
        match cli.command {
            Commands::Server { host, port } => {
                assert!(host.is_none());
                assert!(port.is_none());
            }
            _ => panic!("预期 Server 命令"),
        }

        let cli = Cli::parse_from(["http-mock", "server", "--host", "127.0.0.1", "-p", "9000"]);
        match cli.command {
            Commands::Server { host, port } => {
                assert_eq!(host.as_deref(), Some("127.0.0.1"));
                assert_eq!(port, Some(9000));
            }
            _ => panic!("预期 Server 命令"),
        }
    }

    #[test]
    fn test_cli_parse_produce() {
        let cli = Cli::parse_from(["http-mock", "produce"]);
        match cli.command {
            Commands::Produce {
                count,
                delay,
                message_file,
                topic,
            } => {
                assert_eq!(count, 10);
                assert_eq!(delay, 0.5);
                assert!(message_file.is_none());
                assert!(topic.is_none());
            }
            _ => panic!("预期 Produce 命令"),
        }

        let cli = Cli::parse_from([
            "http-mock",
            "produce",
            "-c",
            "3",
            "--delay",
            "0",
            "--message-file",
            "messages.json",
            "--topic",
            "sink-test",
        ]);
        match cli.command {
            Commands::Produce {
                count,
                delay,
                message_file,
                topic,
            } => {
                assert_eq!(count, 3);
                assert_eq!(delay, 0.0);
                assert_eq!(message_file, Some(PathBuf::from("messages.json")));
                assert_eq!(topic.as_deref(), Some("sink-test"));
            }
            _ => panic!("预期 Produce 命令"),
        }
    }

    #[test]
    fn test_cli_parse_demo() {
        let cli = Cli::parse_from(["http-mock", "demo"]);
        match cli.command {
            Commands::Demo {
                host,
                port,
                message_count,
                delay,
            } => {
                assert!(host.is_none());
                assert!(port.is_none());
                assert_eq!(message_count, 10);
                assert_eq!(delay, 1.0);
            }
            _ => panic!("预期 Demo 命令"),
        }

        let cli = Cli::parse_from(["http-mock", "demo", "--message-count", "4", "-p", "8100"]);
        match cli.command {
            Commands::Demo {
                port,
                message_count,
                ..
            } => {
                assert_eq!(port, Some(8100));
                assert_eq!(message_count, 4);
            }
            _ => panic!("预期 Demo 命令"),
        }
    }

    #[test]
    fn test_cli_global_log_level() {
        let cli = Cli::parse_from(["http-mock", "--log-level", "debug", "server"]);
        assert_eq!(cli.log_level.as_deref(), Some("debug"));

        // global 参数也可以放在子命令之后
        let cli = Cli::parse_from(["http-mock", "produce", "-l", "warn"]);
        assert_eq!(cli.log_level.as_deref(), Some("warn"));

        let cli = Cli::parse_from(["http-mock", "server"]);
        assert!(cli.log_level.is_none());
    }

    #[test]
    fn test_cli_verify() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
