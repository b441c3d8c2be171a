//! # 上传 / 编辑控制器（状态机）
//!
//! ## 设计思路
//!
//! 控制器独占全部界面状态：源图、结果图、编辑参数、处理中标志与错误提示。
//! 状态由槽位内容推导，不单独存储：
//!
//! ```text
//!            select_file                begin_process
//!   Idle ───────────────▶ SourceSelected ─────────────▶ Processing
//!                            ▲   ▲                         │
//!                select_file │   │ 失败                    │ 成功
//!                            │   └─────────────────────────┤
//!                         ResultReady ◀────────────────────┘
//! ```
//!
//! ## 实现思路
//!
//! - 每个槽位独占自己的预览句柄；替换时先建新句柄再撤销旧句柄，拆除时两槽全部撤销。
//! - 每次选图把 `generation` 加一；请求派发时记录当时的 `generation`，
//!   响应回来时若已不一致则静默丢弃（不建句柄、不改槽位、不报错）。
//! - 处理拆成 `begin_process` / `complete_process` 两步，`process` 只是把两步串起来，
//!   UI 事件循环可以在两步之间继续处理用户输入。
//! - 失败时保留一条可关闭的错误提示，不做自动重试。

use base64::{Engine as _, engine::general_purpose};
use bytes::Bytes;
use chrono::Utc;

use super::ClientError;
use super::http::{FrameTransport, FrameUpload};
use super::preview::{PreviewHandle, PreviewStore};
use super::source::{PickedFile, ResultImage, SourceImage, sniff_mime};
use crate::protocol::{EditParameter, EditParameters, FrameEnvelope};

const RESULT_FALLBACK_MIME: &str = "image/png";

/// 控制器对外呈现的状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    Idle,
    SourceSelected,
    Processing,
    ResultReady,
}

/// 一次派发中的处理请求。
#[derive(Debug, Clone)]
pub struct ProcessTicket {
    generation: u64,
    upload: FrameUpload,
    params: EditParameters,
}

impl ProcessTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn upload(&self) -> &FrameUpload {
        &self.upload
    }

    pub fn params(&self) -> &EditParameters {
        &self.params
    }
}

/// 响应落地的结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// 响应已写入结果槽位。
    Applied,
    /// 响应属于已被新选图取代的请求，已丢弃。
    Discarded,
}

/// 可关闭的错误提示。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorNotice {
    pub code: &'static str,
    pub message: String,
}

impl From<&ClientError> for ErrorNotice {
    fn from(error: &ClientError) -> Self {
        Self {
            code: error.code(),
            message: error.to_string(),
        }
    }
}

/// 上传 / 编辑控制器。
pub struct EditorController<S: PreviewStore> {
    previews: S,
    source: Option<SourceImage>,
    result: Option<ResultImage>,
    params: EditParameters,
    processing: bool,
    generation: u64,
    notice: Option<ErrorNotice>,
}

impl<S: PreviewStore> EditorController<S> {
    pub fn new(previews: S) -> Self {
        Self::with_parameters(previews, EditParameters::default())
    }

    pub fn with_parameters(previews: S, params: EditParameters) -> Self {
        Self {
            previews,
            source: None,
            result: None,
            params,
            processing: false,
            generation: 0,
            notice: None,
        }
    }

    pub fn state(&self) -> EditorState {
        match (&self.source, self.processing, &self.result) {
            (None, _, _) => EditorState::Idle,
            (Some(_), true, _) => EditorState::Processing,
            (Some(_), false, Some(_)) => EditorState::ResultReady,
            (Some(_), false, None) => EditorState::SourceSelected,
        }
    }

    pub fn source(&self) -> Option<&SourceImage> {
        self.source.as_ref()
    }

    pub fn result(&self) -> Option<&ResultImage> {
        self.result.as_ref()
    }

    pub fn parameters(&self) -> &EditParameters {
        &self.params
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// 处理按钮是否可用。
    pub fn can_process(&self) -> bool {
        self.source.is_some() && !self.processing
    }

    pub fn notice(&self) -> Option<&ErrorNotice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn previews(&self) -> &S {
        &self.previews
    }

    /// 选中新文件。
    ///
    /// 新句柄先建好再撤销旧句柄；同时清空结果槽位并作废在途请求。
    pub fn select_file(&mut self, file: PickedFile) {
        let preview = self.previews.create(&file.data, &file.mime);
        let next = SourceImage::from_picked(file, preview);

        if let Some(previous) = self.source.replace(next) {
            self.previews.revoke(previous.preview);
        }
        self.clear_result();

        self.generation += 1;
        self.processing = false;

        if let Some(source) = &self.source {
            log::info!(
                "🖼️ 已选择图片 - {} ({} bytes) generation={}",
                source.name,
                source.size_bytes,
                self.generation
            );
        }
    }

    /// 源图解码完成后回填宽高；重复调用结果一致。
    pub fn on_source_image_decoded(&mut self, width: u32, height: u32) {
        if let Some(source) = self.source.as_mut() {
            source.width = Some(width);
            source.height = Some(height);
        }
    }

    /// 结果图解码完成后回填宽高；重复调用结果一致。
    pub fn on_result_image_decoded(&mut self, width: u32, height: u32) {
        if let Some(result) = self.result.as_mut() {
            result.width = Some(width);
            result.height = Some(height);
        }
    }

    /// 合并单个参数，不做校验。
    pub fn update_parameter(&mut self, field: EditParameter, value: impl Into<String>) {
        self.params.merge(field, value);
    }

    /// 派发处理请求：置处理中、撤销旧结果、打包上传载荷。
    pub fn begin_process(&mut self) -> Result<ProcessTicket, ClientError> {
        let Some(source) = self.source.as_ref() else {
            let error = ClientError::NoSourceSelected;
            self.notice = Some(ErrorNotice::from(&error));
            return Err(error);
        };
        if self.processing {
            return Err(ClientError::AlreadyProcessing);
        }

        let ticket = ProcessTicket {
            generation: self.generation,
            upload: FrameUpload {
                file_name: source.name.clone(),
                mime: source.mime.clone(),
                data: source.data.clone(),
            },
            params: self.params.clone(),
        };

        self.processing = true;
        self.clear_result();

        log::info!(
            "⏳ 开始处理 - {} generation={} params={:?}",
            ticket.upload.file_name,
            ticket.generation,
            ticket.params
        );

        Ok(ticket)
    }

    /// 落地处理响应。
    ///
    /// 过期响应直接丢弃；当前响应成功则建立新的结果槽位，失败则回到已选图状态并留下提示。
    pub fn complete_process(
        &mut self,
        ticket: ProcessTicket,
        response: Result<FrameEnvelope, ClientError>,
    ) -> Result<ProcessOutcome, ClientError> {
        if ticket.generation != self.generation || !self.processing {
            log::debug!(
                "⏭️ 丢弃过期响应 - ticket generation={} current={}",
                ticket.generation,
                self.generation
            );
            return Ok(ProcessOutcome::Discarded);
        }

        self.processing = false;

        let decoded = response.and_then(|envelope| decode_envelope(&envelope));
        let data = match decoded {
            Ok(data) => data,
            Err(error) => {
                log::warn!("❌ 处理失败 - {}", error);
                self.notice = Some(ErrorNotice::from(&error));
                return Err(error);
            }
        };

        let mime = match sniff_mime(&data) {
            mime if mime.starts_with("image/") => mime,
            _ => RESULT_FALLBACK_MIME,
        };
        let preview = self.previews.create(&data, mime);

        // 派发时已清空；这里兜底，保证旧句柄不泄漏
        self.clear_result();
        self.result = Some(ResultImage {
            name: ticket.upload.file_name,
            size_bytes: data.len() as u64,
            created_at: Utc::now(),
            mime: mime.to_string(),
            preview,
            data,
            width: None,
            height: None,
        });
        self.notice = None;

        log::info!("✅ 处理完成 - 结果预览 {}", preview);
        Ok(ProcessOutcome::Applied)
    }

    /// 派发并等待一次处理。
    ///
    /// 前置条件不满足时不会触达网关。
    pub async fn process<T: FrameTransport>(
        &mut self,
        transport: &T,
    ) -> Result<ProcessOutcome, ClientError> {
        let ticket = self.begin_process()?;
        let response = transport
            .send_frame(ticket.upload.clone(), ticket.params.clone())
            .await;
        self.complete_process(ticket, response)
    }

    /// 拆除控制器：撤销所有存活句柄。可重复调用。
    pub fn teardown(&mut self) {
        if let Some(source) = self.source.take() {
            self.previews.revoke(source.preview);
        }
        self.clear_result();
        self.processing = false;
        self.generation += 1;
    }

    fn clear_result(&mut self) {
        if let Some(result) = self.result.take() {
            self.previews.revoke(result.preview);
        }
    }

    /// 当前存活的预览句柄（源图、结果图）。
    pub fn live_previews(&self) -> (Option<PreviewHandle>, Option<PreviewHandle>) {
        (
            self.source.as_ref().map(|s| s.preview),
            self.result.as_ref().map(|r| r.preview),
        )
    }
}

impl<S: PreviewStore> Drop for EditorController<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn decode_envelope(envelope: &FrameEnvelope) -> Result<Bytes, ClientError> {
    let first = envelope
        .data
        .first()
        .ok_or_else(|| ClientError::InvalidResponse("响应信封中没有图片数据".to_string()))?;

    general_purpose::STANDARD
        .decode(first.trim())
        .map(Bytes::from)
        .map_err(|e| ClientError::InvalidResponse(format!("Base64 解码失败：{}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::preview::MemoryPreviewStore;

    fn envelope_of(bytes: &[u8]) -> FrameEnvelope {
        FrameEnvelope {
            data: vec![general_purpose::STANDARD.encode(bytes)],
        }
    }

    #[test]
    fn empty_envelope_is_invalid_response() {
        let result = decode_envelope(&FrameEnvelope { data: Vec::new() });
        assert!(matches!(result, Err(ClientError::InvalidResponse(_))));
    }

    #[test]
    fn garbage_base64_is_invalid_response() {
        let result = decode_envelope(&FrameEnvelope {
            data: vec!["***".to_string()],
        });
        assert!(matches!(result, Err(ClientError::InvalidResponse(_))));
    }

    #[test]
    fn bad_envelope_returns_to_source_selected() {
        let store = MemoryPreviewStore::new();
        let mut controller = EditorController::new(store.clone());
        controller.select_file(PickedFile::new("a.png", b"aaaa".to_vec()));

        let ticket = controller.begin_process().expect("ticket");
        let result = controller.complete_process(ticket, Ok(FrameEnvelope { data: Vec::new() }));

        assert!(matches!(result, Err(ClientError::InvalidResponse(_))));
        assert_eq!(controller.state(), EditorState::SourceSelected);
        assert_eq!(store.live_count(), 1);
    }

    #[test]
    fn second_dispatch_while_processing_is_rejected() {
        let mut controller = EditorController::new(MemoryPreviewStore::new());
        controller.select_file(PickedFile::new("a.png", b"aaaa".to_vec()));

        let _ticket = controller.begin_process().expect("first ticket");
        assert!(!controller.can_process());
        assert_eq!(controller.begin_process().err(), Some(ClientError::AlreadyProcessing));
    }

    #[test]
    fn result_mime_falls_back_to_png_for_unknown_bytes() {
        let mut controller = EditorController::new(MemoryPreviewStore::new());
        controller.select_file(PickedFile::new("a.png", b"aaaa".to_vec()));

        let ticket = controller.begin_process().expect("ticket");
        controller
            .complete_process(ticket, Ok(envelope_of(b"not really an image")))
            .expect("applied");

        assert_eq!(controller.result().map(|r| r.mime.as_str()), Some(RESULT_FALLBACK_MIME));
    }
}
