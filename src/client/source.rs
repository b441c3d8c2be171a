//! # 图片槽位模型
//!
//! - `PickedFile`：文件选择器交给控制器的原始输入
//! - `SourceImage`：源图槽位
//! - `ResultImage`：结果槽位，载荷来自网关响应而非文件选择器
//!
//! 宽高在图片解码完成前为 `None`，不是 0。

use std::path::Path;

use bytes::Bytes;
use chrono::{DateTime, Utc};

use super::ClientError;
use super::preview::PreviewHandle;

const FALLBACK_MIME: &str = "application/octet-stream";

/// 用户选中的文件。
#[derive(Debug, Clone)]
pub struct PickedFile {
    pub name: String,
    pub size_bytes: u64,
    pub last_modified: DateTime<Utc>,
    pub mime: String,
    pub data: Bytes,
}

impl PickedFile {
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let data = data.into();
        Self {
            name: name.into(),
            size_bytes: data.len() as u64,
            last_modified: Utc::now(),
            mime: sniff_mime(&data).to_string(),
            data,
        }
    }

    /// 从本地文件读取（名称、大小、修改时间、按魔数猜测的 MIME）。
    pub fn from_path(path: &Path) -> Result<Self, ClientError> {
        let data = std::fs::read(path)
            .map_err(|e| ClientError::FileSystem(format!("无法读取 {}：{}", path.display(), e)))?;
        let metadata = std::fs::metadata(path)
            .map_err(|e| ClientError::FileSystem(format!("无法读取文件信息：{}", e)))?;

        let last_modified = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        Ok(Self {
            name,
            size_bytes: metadata.len(),
            last_modified,
            mime: sniff_mime(&data).to_string(),
            data: Bytes::from(data),
        })
    }
}

/// 按魔数猜测 MIME；识别不了时回退为二进制流（客户端不做格式校验）。
pub(crate) fn sniff_mime(data: &[u8]) -> &'static str {
    infer::get(data).map(|kind| kind.mime_type()).unwrap_or(FALLBACK_MIME)
}

/// 源图槽位。
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub name: String,
    pub size_bytes: u64,
    pub last_modified: DateTime<Utc>,
    pub mime: String,
    pub preview: PreviewHandle,
    pub data: Bytes,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl SourceImage {
    pub(crate) fn from_picked(file: PickedFile, preview: PreviewHandle) -> Self {
        Self {
            name: file.name,
            size_bytes: file.size_bytes,
            last_modified: file.last_modified,
            mime: file.mime,
            preview,
            data: file.data,
            width: None,
            height: None,
        }
    }
}

/// 结果槽位。
#[derive(Debug, Clone)]
pub struct ResultImage {
    pub name: String,
    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
    pub mime: String,
    pub preview: PreviewHandle,
    pub data: Bytes,
    pub width: Option<u32>,
    pub height: Option<u32>,
}
