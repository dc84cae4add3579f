//! # Mockbot API 服务
//!
//! ```bash
//! # 默认配置（localhost:5487，10Hz）
//! mockbot-api
//!
//! # 配置文件 + 覆盖项
//! mockbot-api --config mockbot.toml --port 8080
//! ROBOT_API_REFRESH_RATE=20 mockbot-api
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use mockbot_api::{ApiConfig, ConfigOverrides, CorsPolicy, build_app};
use mockbot_client::RobotService;
use mockbot_driver::EngineBuilder;
use std::path::PathBuf;
use tracing::info;

/// Mockbot API - 模拟机器人遥测服务
#[derive(Parser, Debug)]
#[command(name = "mockbot-api")]
#[command(about = "HTTP API for a simulated robot with live telemetry", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML 配置文件
    #[arg(short, long, env = "ROBOT_API_CONFIG")]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: ConfigOverrides,
}

fn load_config(cli: Cli) -> Result<ApiConfig> {
    let mut config = ApiConfig::load(cli.config.as_deref())?;
    config.apply_overrides(cli.overrides);
    config.validate()?;
    Ok(config)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config(Cli::parse())?;

    // 初始化日志（RUST_LOG 优先，否则使用配置中的级别）
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(config.level_filter()?.into())
                .from_env_lossy(),
        )
        .init();

    let engine = EngineBuilder::new()
        .config(config.simulation.clone())
        .build()
        .context("启动模拟引擎失败")?;
    let service = RobotService::from_engine(&engine);
    let app = build_app(service, CorsPolicy::new(config.allowed_origins.clone()));

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("监听失败: {address}"))?;
    info!("Mockbot API listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP 服务异常退出")?;

    engine.shutdown().context("停止模拟引擎失败")?;
    info!("Mockbot API stopped");
    Ok(())
}
