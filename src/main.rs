//! # 在线相框编辑器 — 网关入口
//!
//! 本文件仅负责日志、配置与 HTTP 服务的初始化。
//! 处理链路详见 `gateway` 模块文档。

use frame_editor::config::AppConfig;
use frame_editor::error::AppError;
use frame_editor::gateway::{self, GatewayState};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env()?;
    log::info!("setup: config loaded (version {})", config.version);

    let state = GatewayState::from_config(&config)?;
    log::info!("setup: upload dir {}", config.gateway.upload_dir.display());

    let app = gateway::router(state);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    log::info!("🚀 网关已启动: http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("网关已停止");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("监听退出信号失败: {err}");
    }
}
