//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载网关链路中的所有错误来源，避免字符串拼接式错误处理。
//! 通过 `thiserror` 保持人类可读错误，同时让调用侧可按分支匹配。
//! `code()` / `stage()` 提供稳定标识，HTTP 层据此生成错误响应体。

/// 网关处理统一错误类型。
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// 请求体不是可识别的图片字节。
    #[error("无效载荷：{0}")]
    InvalidPayload(String),

    /// 合成能力本身失败（参数非法、文件不可读、编码失败）。
    #[error("处理失败：{0}")]
    ProcessingFailed(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),

    #[error("文件错误：{0}")]
    FileSystem(String),

    #[error("配置错误：{0}")]
    InvalidConfig(String),
}

impl GatewayError {
    /// 稳定错误码，供客户端按码分支。
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidPayload(_) => "E_INVALID_PAYLOAD",
            Self::ProcessingFailed(_) => "E_PROCESSING_FAILED",
            Self::ResourceLimit(_) => "E_RESOURCE_LIMIT",
            Self::FileSystem(_) => "E_FILE_SYSTEM",
            Self::InvalidConfig(_) => "E_INVALID_CONFIG",
        }
    }

    /// 出错所在阶段。
    pub fn stage(&self) -> &'static str {
        match self {
            Self::InvalidPayload(_) => "validate",
            Self::ResourceLimit(_) => "validate",
            Self::FileSystem(_) => "store",
            Self::ProcessingFailed(_) => "composite",
            Self::InvalidConfig(_) => "config",
        }
    }
}
