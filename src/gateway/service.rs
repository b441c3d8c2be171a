//! # 服务层（可注入状态）
//!
//! ## 设计思路
//!
//! 使用 `GatewayState` 作为 axum 注入状态，替代全局单例。
//! 生命周期由 `main.rs` 统一管理，测试可创建独立实例。

use std::sync::Arc;

use super::{FrameGateway, GatewayError};
use crate::config::AppConfig;
use crate::protocol::AppInfo;

/// 网关服务状态。
pub struct GatewayState {
    gateway: FrameGateway,
    info: AppInfo,
}

impl GatewayState {
    pub fn new(gateway: FrameGateway, info: AppInfo) -> Self {
        Self { gateway, info }
    }

    /// 按应用配置创建默认服务状态。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use frame_editor::config::AppConfig;
    /// use frame_editor::gateway::GatewayState;
    ///
    /// let state = GatewayState::from_config(&AppConfig::default())?;
    /// # Ok::<(), frame_editor::gateway::GatewayError>(())
    /// ```
    pub fn from_config(config: &AppConfig) -> Result<Arc<Self>, GatewayError> {
        let gateway = FrameGateway::new(config.gateway.clone())?;
        Ok(Arc::new(Self::new(gateway, config.app_info())))
    }

    pub fn gateway(&self) -> &FrameGateway {
        &self.gateway
    }

    pub fn info(&self) -> &AppInfo {
        &self.info
    }
}
