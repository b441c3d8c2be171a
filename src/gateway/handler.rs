//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `FrameGateway` 只负责流程编排，不直接与 HTTP 框架绑定。
//! 处理链路固定为：
//! 1. 校验上传（体积 + 图片签名）
//! 2. 以唯一文件名写入暂存目录
//! 3. 调用合成能力
//! 4. 读回第一个产物
//!
//! ## 实现思路
//!
//! - 整条链路是同步磁盘 + CPU 工作，放进 `spawn_blocking`，不占用异步工作线程。
//! - 输入文件与所有产物都由 `TransientFile` 守卫持有，任何退出路径都会清理。
//! - 记录 `validate/store/composite/read/total` 阶段耗时，便于性能诊断。

use std::sync::Arc;
use std::time::Instant;

use super::compositor::{FrameCompositor, ImageFrameCompositor};
use super::loader::validate_upload;
use super::source::RawUpload;
use super::transient::TransientFile;
use super::{GatewayConfig, GatewayError};
use crate::protocol::EditParameters;

/// 网关处理器。
///
/// 内部全部为 `Arc`，克隆成本低，可直接移入阻塞任务。
#[derive(Clone)]
pub struct FrameGateway {
    config: Arc<GatewayConfig>,
    compositor: Arc<dyn FrameCompositor>,
}

impl FrameGateway {
    /// 使用默认合成实现创建处理器。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use frame_editor::gateway::{FrameGateway, GatewayConfig};
    ///
    /// let gateway = FrameGateway::new(GatewayConfig::default())?;
    /// # Ok::<(), frame_editor::gateway::GatewayError>(())
    /// ```
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let compositor = Arc::new(ImageFrameCompositor::new(&config));
        Self::with_compositor(config, compositor)
    }

    /// 注入自定义合成能力。
    pub fn with_compositor(
        config: GatewayConfig,
        compositor: Arc<dyn FrameCompositor>,
    ) -> Result<Self, GatewayError> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            compositor,
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// 处理主入口：原始字节 + 编辑参数 → 合成后的图片字节。
    pub async fn process_image(
        &self,
        raw: RawUpload,
        params: EditParameters,
    ) -> Result<Vec<u8>, GatewayError> {
        let gateway = self.clone();
        tokio::task::spawn_blocking(move || gateway.process_blocking(raw, &params))
            .await
            .map_err(|e| GatewayError::ProcessingFailed(format!("合成任务异常终止：{}", e)))?
    }

    fn process_blocking(
        &self,
        raw: RawUpload,
        params: &EditParameters,
    ) -> Result<Vec<u8>, GatewayError> {
        let total_start = Instant::now();

        let validate_start = Instant::now();
        let upload = validate_upload(raw, &self.config)?;
        let validate_elapsed = validate_start.elapsed();

        let store_start = Instant::now();
        let input = TransientFile::write(
            &self.config.upload_dir,
            upload.extension,
            &upload.raw.bytes,
            self.config.retain_transient_files,
        )?;
        let store_elapsed = store_start.elapsed();

        let composite_start = Instant::now();
        let artifacts = self
            .compositor
            .add_frame(&[input.path().to_path_buf()], params)?;
        let outputs: Vec<TransientFile> = artifacts
            .iter()
            .map(|artifact| {
                TransientFile::adopt(artifact.path.clone(), self.config.retain_transient_files)
            })
            .collect();
        let composite_elapsed = composite_start.elapsed();

        let read_start = Instant::now();
        let first = outputs
            .first()
            .ok_or_else(|| GatewayError::ProcessingFailed("合成能力没有返回任何产物".to_string()))?;
        let edited = std::fs::read(first.path())
            .map_err(|e| GatewayError::ProcessingFailed(format!("无法读取合成产物：{}", e)))?;
        let read_elapsed = read_start.elapsed();

        log::info!(
            "✅ 边框处理完成 - 输入: {} {}B 输出: {}B validate={}ms store={}ms composite={}ms read={}ms total={}ms",
            upload.mime,
            upload.raw.bytes.len(),
            edited.len(),
            validate_elapsed.as_millis(),
            store_elapsed.as_millis(),
            composite_elapsed.as_millis(),
            read_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(edited)
    }
}
