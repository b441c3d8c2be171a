//! # 配置模块
//!
//! ## 设计思路
//!
//! 将网关所有“可调策略”集中到 `GatewayConfig`，保证运行时行为可观测、可调整、可测试。
//!
//! ## 实现思路
//!
//! - `Default` 提供生产可用的配置。
//! - `validate` 在启动阶段一次性校验，避免请求处理中途才发现非法配置。

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::GatewayError;

/// 网关处理配置。
///
/// 字段覆盖了接收、暂存、合成三个阶段。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// 暂存上传文件与合成产物的目录。
    pub upload_dir: PathBuf,
    /// 单次上传允许的最大请求体（字节）。
    pub max_upload_bytes: usize,
    /// 解码后的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
    /// 边框最小留白占图片短边的比例。
    pub frame_margin_ratio: f64,
    /// 边框最小留白（像素）。
    pub min_frame_margin_px: u32,
    /// 是否在处理结束后保留暂存文件（仅用于排查问题）。
    pub retain_transient_files: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            upload_dir: std::env::temp_dir().join("frame-editor"),
            max_upload_bytes: 25 * 1024 * 1024,
            max_decoded_pixels: 40_000_000,
            frame_margin_ratio: 0.05,
            min_frame_margin_px: 2,
            retain_transient_files: false,
        }
    }
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.max_upload_bytes < 1024 {
            return Err(GatewayError::InvalidConfig("max_upload_bytes 不能小于 1KB".to_string()));
        }
        if self.max_decoded_pixels == 0 {
            return Err(GatewayError::InvalidConfig("max_decoded_pixels 必须大于 0".to_string()));
        }
        if !(0.0..=1.0).contains(&self.frame_margin_ratio) {
            return Err(GatewayError::InvalidConfig("frame_margin_ratio 必须在 0~1 之间".to_string()));
        }
        if self.upload_dir.as_os_str().is_empty() {
            return Err(GatewayError::InvalidConfig("upload_dir 不能为空".to_string()));
        }
        Ok(())
    }
}
