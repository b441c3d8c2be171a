//! # 客户端错误模型
//!
//! 控制器与 HTTP 客户端共用的错误枚举。网关返回的任何非 200 状态都归为 `Network`，
//! 消息中携带状态文本。

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// 尚未选择源图片就触发处理。
    #[error("尚未选择图片")]
    NoSourceSelected,

    /// 已有请求在途，不允许重复触发。
    #[error("已有处理请求正在进行")]
    AlreadyProcessing,

    /// 传输层失败或非 200 响应。
    #[error("网络错误：{0}")]
    Network(String),

    /// 响应无法解析为信封，或载荷不是合法 Base64。
    #[error("响应无效：{0}")]
    InvalidResponse(String),

    #[error("文件错误：{0}")]
    FileSystem(String),
}

impl ClientError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoSourceSelected => "E_NO_SOURCE",
            Self::AlreadyProcessing => "E_BUSY",
            Self::Network(_) => "E_NETWORK",
            Self::InvalidResponse(_) => "E_INVALID_RESPONSE",
            Self::FileSystem(_) => "E_FILE_SYSTEM",
        }
    }
}
