//! # 处理网关模块（gateway）
//!
//! ## 设计思路
//!
//! 该模块将“接收 → 校验 → 暂存 → 合成 → 读回 → HTTP 暴露”按职责拆分为多个子模块：
//!
//! - `routes`：仅做 HTTP 入参/出参适配（薄封装）
//! - `service`：承载可注入状态（`GatewayState`）
//! - `handler`：编排整条处理流水线
//! - `loader`：负责体积与图片签名校验
//! - `transient`：暂存文件的唯一命名与 RAII 清理
//! - `compositor`：外部合成能力的 trait 与默认实现
//! - `config/error/source`：配置、错误、中间数据模型
//!
//! ## 调用链
//!
//! ```text
//! POST /api/frame
//!    ↓
//! routes.rs（multipart / 原始请求体 → RawUpload）
//!    ↓
//! handler.rs（spawn_blocking + 阶段耗时日志）
//!    ├─ loader.rs（体积 + 签名校验）
//!    ├─ transient.rs（唯一暂存文件，离开作用域即删除）
//!    └─ compositor.rs（add_frame → 产物）
//!    ↓
//! { "data": [base64] } 或 { code, stage, message }
//! ```

mod compositor;
mod config;
mod error;
mod handler;
mod loader;
mod routes;
mod service;
mod source;
mod transient;

pub use compositor::{
    FrameCompositor, FrameLayout, FrameSpec, ImageFrameCompositor, compute_layout, parse_hex_color,
};
pub use config::GatewayConfig;
pub use error::GatewayError;
pub use handler::FrameGateway;
pub use routes::router;
pub use service::GatewayState;
pub use source::{FrameArtifact, RawUpload, UploadSource};
