//! # HTTP 路由层
//!
//! ## 设计思路
//!
//! 路由层仅做请求解析与响应组装，不承载业务逻辑。
//! 所有实际处理交由 `FrameGateway`，保持处理函数薄、稳定、易测试。
//!
//! ## 实现思路
//!
//! - `POST /api/frame`：`multipart/form-data`（字段 `file`）或原始请求体二选一。
//! - 查询参数 `paperWidth / paperHeight / color` 均可缺省。
//! - 成功返回 `{ "data": [base64] }`；失败返回非 200 与 `{ code, stage, message }`。

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, FromRequest, Multipart, Query, Request, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::{Engine as _, engine::general_purpose};
use bytes::Bytes;

use super::source::{RawUpload, UploadSource};
use super::{GatewayError, GatewayState};
use crate::protocol::{AppInfo, EditParameters, ErrorBody, FILE_FIELD, FrameEnvelope};

/// multipart 边界与字段头的额外开销。
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// 构建网关路由。
pub fn router(state: Arc<GatewayState>) -> Router {
    let body_limit = state
        .gateway()
        .config()
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route("/api/frame", post(frame_image))
        .route("/api/info", get(app_info))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

async fn frame_image(
    State(state): State<Arc<GatewayState>>,
    Query(params): Query<EditParameters>,
    request: Request,
) -> Result<Json<FrameEnvelope>, GatewayError> {
    let raw = read_upload(request).await?;
    let edited = state.gateway().process_image(raw, params).await?;

    Ok(Json(FrameEnvelope {
        data: vec![general_purpose::STANDARD.encode(edited)],
    }))
}

async fn app_info(State(state): State<Arc<GatewayState>>) -> Json<AppInfo> {
    Json(state.info().clone())
}

async fn read_upload(request: Request) -> Result<RawUpload, GatewayError> {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.trim().to_ascii_lowercase().starts_with("multipart/form-data"));

    if !is_multipart {
        let bytes = Bytes::from_request(request, &())
            .await
            .map_err(|rejection| body_error(rejection.status(), rejection.body_text()))?;
        return Ok(RawUpload {
            bytes,
            source: UploadSource::RawBody,
        });
    }

    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|rejection| body_error(rejection.status(), rejection.body_text()))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| body_error(e.status(), e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|e| body_error(e.status(), e.body_text()))?;
        return Ok(RawUpload {
            bytes,
            source: UploadSource::Multipart,
        });
    }

    Err(GatewayError::InvalidPayload(format!(
        "multipart 请求缺少 `{}` 字段",
        FILE_FIELD
    )))
}

fn body_error(status: StatusCode, message: String) -> GatewayError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        GatewayError::ResourceLimit(format!("请求体过大：{}", message))
    } else {
        GatewayError::InvalidPayload(format!("请求体读取失败：{}", message))
    }
}

impl GatewayError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            Self::ResourceLimit(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::ProcessingFailed(_) | Self::FileSystem(_) | Self::InvalidConfig(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        log::warn!("❌ 请求失败 - status={} code={} {}", status.as_u16(), self.code(), self);

        let body = ErrorBody {
            code: self.code().to_string(),
            stage: self.stage().to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
