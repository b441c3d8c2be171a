//! # 数据源与中间模型
//!
//! ## 设计思路
//!
//! 将“外部输入类型”和“流水线中间结果”解耦：
//! - `UploadSource` 表示请求体的承载方式
//! - `RawUpload` 表示已接收但未校验的字节
//! - `FrameArtifact` 表示合成能力产出的文件描述

use std::path::PathBuf;

use bytes::Bytes;

/// 上传字节的承载方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadSource {
    /// `multipart/form-data` 中的 `file` 字段。
    Multipart,
    /// 整个请求体即图片字节。
    RawBody,
}

impl UploadSource {
    pub(crate) fn hint(self) -> &'static str {
        match self {
            Self::Multipart => "multipart",
            Self::RawBody => "raw-body",
        }
    }
}

/// 接收阶段输出：原始字节与来源标识。
#[derive(Debug, Clone)]
pub struct RawUpload {
    /// 原始图片字节。
    pub bytes: Bytes,
    /// 来源（用于日志与诊断）。
    pub source: UploadSource,
}

/// 合成产物描述。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameArtifact {
    /// 产物文件路径。
    pub path: PathBuf,
    /// 产物 MIME 类型。
    pub mime: &'static str,
}
