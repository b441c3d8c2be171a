//! # HTTP 客户端
//!
//! ## 设计思路
//!
//! 控制器只依赖 `FrameTransport` trait，真实网络由 `FrameClient`（reqwest）实现，
//! 测试可注入桩实现。基础地址来自启动时构造的 `AppConfig`，不读取任何全局变量。
//!
//! ## 实现思路
//!
//! - 图片放进 `multipart/form-data` 的 `file` 字段，编辑参数拼到查询串。
//! - 只有 200 才解析信封；其余状态一律视为网络错误，消息携带状态文本。
//! - 请求总超时与连接超时都由配置给出，避免请求无限挂起。

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{StatusCode, Url};

use super::ClientError;
use crate::config::AppConfig;
use crate::protocol::{AppInfo, EditParameters, FILE_FIELD, FRAME_ROUTE, FrameEnvelope, INFO_ROUTE};

/// 一次上传的载荷。
#[derive(Debug, Clone)]
pub struct FrameUpload {
    pub file_name: String,
    pub mime: String,
    pub data: Bytes,
}

/// 把图片与参数送到网关并取回信封。
pub trait FrameTransport {
    fn send_frame(
        &self,
        upload: FrameUpload,
        params: EditParameters,
    ) -> impl Future<Output = Result<FrameEnvelope, ClientError>> + Send;
}

/// 基于 reqwest 的网关客户端。
#[derive(Debug, Clone)]
pub struct FrameClient {
    http: reqwest::Client,
    base_url: Url,
}

impl FrameClient {
    pub fn new(config: &AppConfig) -> Result<Self, ClientError> {
        let base_url = parse_base_url(&config.server_base_url)?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| ClientError::Network(format!("创建 HTTP 客户端失败：{}", e)))?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// 拼出带查询参数的上传地址。
    pub fn frame_url(&self, params: &EditParameters) -> Result<Url, ClientError> {
        let mut url = self
            .base_url
            .join(FRAME_ROUTE)
            .map_err(|e| ClientError::Network(format!("无效的请求地址：{}", e)))?;
        url.query_pairs_mut().extend_pairs(params.query_pairs());
        Ok(url)
    }

    /// 读取网关版本信息（页脚展示）。
    pub async fn fetch_info(&self) -> Result<AppInfo, ClientError> {
        let url = self
            .base_url
            .join(INFO_ROUTE)
            .map_err(|e| ClientError::Network(format!("无效的请求地址：{}", e)))?;

        let response = self.http.get(url).send().await.map_err(map_reqwest_error)?;
        ensure_ok(response.status())?;
        response.json::<AppInfo>().await.map_err(map_reqwest_error)
    }

    async fn post_frame(
        &self,
        upload: FrameUpload,
        params: EditParameters,
    ) -> Result<FrameEnvelope, ClientError> {
        let url = self.frame_url(&params)?;
        let part = Part::bytes(upload.data.to_vec())
            .file_name(upload.file_name.clone())
            .mime_str(&upload.mime)
            .map_err(|e| ClientError::Network(format!("无效的 MIME 类型：{}", e)))?;
        let form = Form::new().part(FILE_FIELD, part);

        log::info!(
            "📤 上传图片 - {} ({} bytes) -> {}",
            upload.file_name,
            upload.data.len(),
            url.path()
        );

        let response = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        ensure_ok(response.status())?;
        response.json::<FrameEnvelope>().await.map_err(map_reqwest_error)
    }
}

impl FrameTransport for FrameClient {
    fn send_frame(
        &self,
        upload: FrameUpload,
        params: EditParameters,
    ) -> impl Future<Output = Result<FrameEnvelope, ClientError>> + Send {
        self.post_frame(upload, params)
    }
}

/// 基础地址统一补齐结尾 `/`，否则 `join` 会替换掉最后一段路径。
fn parse_base_url(raw: &str) -> Result<Url, ClientError> {
    let trimmed = raw.trim();
    let normalized = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    };
    Url::parse(&normalized)
        .map_err(|e| ClientError::Network(format!("无效的服务地址 {:?}：{}", raw, e)))
}

fn ensure_ok(status: StatusCode) -> Result<(), ClientError> {
    if status == StatusCode::OK {
        return Ok(());
    }
    Err(ClientError::Network(format!(
        "Something went wrong: {}",
        status.canonical_reason().unwrap_or(status.as_str())
    )))
}

fn map_reqwest_error(error: reqwest::Error) -> ClientError {
    if error.is_decode() {
        return ClientError::InvalidResponse(format!("响应不是有效的 JSON 信封：{}", error));
    }
    if error.is_timeout() {
        return ClientError::Network(format!("请求超时：{}", error));
    }
    ClientError::Network(error.to_string())
}
