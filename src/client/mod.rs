//! # 客户端模块（client）
//!
//! ## 设计思路
//!
//! 把界面状态机从具体界面技术中剥离出来：控制器只依赖两个接缝，
//! - `PreviewStore`：预览句柄的创建 / 撤销
//! - `FrameTransport`：把图片送到网关
//!
//! 因此整台状态机可以在没有浏览器、没有网络的情况下被完整测试。
//!
//! - `controller`：上传 / 处理 / 预览状态机（核心）
//! - `http`：reqwest 实现的网关客户端
//! - `preview`：预览句柄与内存账本
//! - `source`：源图 / 结果图槽位模型
//! - `outside_click` / `popover`：颜色选择弹出层的区域外点击关闭

pub mod controller;
mod error;
pub mod http;
pub mod outside_click;
pub mod popover;
pub mod preview;
pub mod source;

pub use controller::{EditorController, EditorState, ErrorNotice, ProcessOutcome, ProcessTicket};
pub use error::ClientError;
pub use http::{FrameClient, FrameTransport, FrameUpload};
pub use outside_click::{ClickRegion, OutsideClickDetector, PointerEvent};
pub use popover::ColorPickerPopover;
pub use preview::{MemoryPreviewStore, PreviewHandle, PreviewStore};
pub use source::{PickedFile, ResultImage, SourceImage};
