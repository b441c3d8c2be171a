//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 各层保留自己的错误枚举（网关 `GatewayError`、客户端 `ClientError`），
//! 进程入口（两个二进制）统一返回 `Result<T, AppError>`，
//! 替代分散的 `.map_err(|e| e.to_string())`、`expect()` 等不一致模式。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为各层错误与 `std::io::Error` 提供 `From` 转换，入口处直接 `?`。

use crate::client::ClientError;
use crate::gateway::GatewayError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 配置缺失或非法
    #[error("配置错误: {0}")]
    Config(String),

    /// 网关处理链路错误（校验 / 暂存 / 合成）
    #[error("{0}")]
    Gateway(#[from] GatewayError),

    /// 客户端状态机或网络错误
    #[error("{0}")]
    Client(#[from] ClientError),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),
}
