//! # 接收与校验模块
//!
//! ## 设计思路
//!
//! 在“尽可能早”的阶段执行输入校验，尽快失败，减少不必要的磁盘写入与解码开销：
//! 1. 体积上限
//! 2. 非空
//! 3. 文件签名必须是图片（`infer` 按魔数识别，不信任客户端声明的类型）

use super::source::RawUpload;
use super::{GatewayConfig, GatewayError};

/// 校验通过的上传：附带识别出的扩展名与 MIME。
#[derive(Debug, Clone)]
pub(crate) struct ValidatedUpload {
    pub(crate) raw: RawUpload,
    pub(crate) extension: &'static str,
    pub(crate) mime: &'static str,
}

pub(crate) fn validate_upload(
    raw: RawUpload,
    config: &GatewayConfig,
) -> Result<ValidatedUpload, GatewayError> {
    if raw.bytes.len() > config.max_upload_bytes {
        return Err(GatewayError::ResourceLimit(format!(
            "上传文件过大：{:.2} MB（限制：{:.2} MB）",
            raw.bytes.len() as f64 / 1024.0 / 1024.0,
            config.max_upload_bytes as f64 / 1024.0 / 1024.0
        )));
    }

    let kind = validate_image_signature(&raw.bytes)?;

    log::info!(
        "📥 收到上传 - 来源: {} 类型: {} 大小: {} bytes",
        raw.source.hint(),
        kind.mime_type(),
        raw.bytes.len()
    );

    Ok(ValidatedUpload {
        raw,
        extension: kind.extension(),
        mime: kind.mime_type(),
    })
}

fn validate_image_signature(bytes: &[u8]) -> Result<infer::Type, GatewayError> {
    if bytes.is_empty() {
        return Err(GatewayError::InvalidPayload("图片内容为空".to_string()));
    }

    let kind = infer::get(bytes)
        .ok_or_else(|| GatewayError::InvalidPayload("无法识别图片类型".to_string()))?;

    if kind.matcher_type() != infer::MatcherType::Image {
        return Err(GatewayError::InvalidPayload(format!(
            "文件签名不是图片类型：{}",
            kind.mime_type()
        )));
    }

    Ok(kind)
}
