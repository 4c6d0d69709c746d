// apps/pb_cli/src/main.rs

//! PolyBal 命令行界面
//!
//! 驱动 0 维（均匀混合、多单元）群体平衡算例：
//!
//! ```text
//! pb_cli run --case cases/bubble_box.json -t 0.1
//! pb_cli info --family breakup
//! pb_cli validate --case cases/bubble_box.json --strict
//! ```
//!
//! 本模块属于 **Layer 5: Application**，只通过 `CaseConfig` 与
//! `PopulationBalanceModel` 访问下层。库层经 `log` 记录，这里的
//! `tracing-subscriber` 负责统一输出。

mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::Level;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::FmtSubscriber;

/// 固定节点群体平衡求解器
#[derive(Parser)]
#[command(name = "pb_cli", version, about, long_about = None)]
struct Cli {
    /// 日志级别
    #[arg(short, long, value_enum, default_value_t = LogLevel::Info, global = true)]
    log_level: LogLevel,

    /// 关闭彩色输出（重定向到文件时使用）
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 推进 0 维算例并输出组分数场
    Run(commands::run::RunArgs),
    /// 列出已注册的子模型
    Info(commands::info::InfoArgs),
    /// 检查算例配置并试算一步
    Validate(commands::validate::ValidateArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // try_init 同时安装 log -> tracing 桥，求解器的 log::info! 也会输出
    FmtSubscriber::builder()
        .with_max_level(Level::from(cli.log_level))
        .with_target(false)
        .with_ansi(!cli.no_color)
        .finish()
        .try_init()?;

    match cli.command {
        Commands::Run(args) => commands::run::execute(args),
        Commands::Info(args) => commands::info::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
    }
}
